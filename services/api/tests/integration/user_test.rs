use foodgram_api::domain::types::ProfileChanges;
use foodgram_api::error::ApiError;
use foodgram_api::usecase::user::{
    GetUserUseCase, ListUsersUseCase, SetPasswordInput, SetPasswordUseCase, SignUpInput,
    SignUpUseCase, UpdateProfileUseCase,
};
use foodgram_domain::pagination::PageRequest;
use foodgram_domain::user::UserRole;

use crate::helpers::{MemoryDb, PlainHasher};

fn sign_up_input(username: &str, email: &str) -> SignUpInput {
    SignUpInput {
        username: Some(username.to_owned()),
        email: Some(email.to_owned()),
        first_name: Some("Alice".to_owned()),
        last_name: Some("Baker".to_owned()),
        password: Some("s3cret-pass".to_owned()),
    }
}

fn validation_fields(result: Result<impl std::fmt::Debug, ApiError>) -> Vec<String> {
    match result {
        Err(ApiError::Validation(errors)) => {
            let body = serde_json::to_value(&errors).unwrap();
            body.as_object().unwrap().keys().cloned().collect()
        }
        other => panic!("expected Validation, got {other:?}"),
    }
}

#[tokio::test]
async fn should_sign_up_with_hashed_password() {
    let db = MemoryDb::new();
    let usecase = SignUpUseCase {
        repo: db.users(),
        hasher: PlainHasher,
    };

    let user = usecase
        .execute(sign_up_input("alice_baker", "alice@example.com"))
        .await
        .unwrap();

    assert_eq!(user.role, UserRole::User);
    assert_eq!(user.password_hash, "plain:s3cret-pass");
    assert_eq!(db.lock().users.len(), 1);
}

#[tokio::test]
async fn should_reject_reserved_username() {
    let db = MemoryDb::new();
    let usecase = SignUpUseCase {
        repo: db.users(),
        hasher: PlainHasher,
    };

    let result = usecase
        .execute(sign_up_input("me", "me@example.com"))
        .await;

    assert_eq!(validation_fields(result), vec!["username"]);
    assert!(db.lock().users.is_empty());
}

#[tokio::test]
async fn should_reject_taken_username_and_email() {
    let db = MemoryDb::new();
    let existing = db.add_user("alice_baker");
    let usecase = SignUpUseCase {
        repo: db.users(),
        hasher: PlainHasher,
    };

    let result = usecase
        .execute(sign_up_input(&existing.username, &existing.email))
        .await;

    assert_eq!(validation_fields(result), vec!["email", "username"]);
}

#[tokio::test]
async fn should_require_every_sign_up_field() {
    let db = MemoryDb::new();
    let usecase = SignUpUseCase {
        repo: db.users(),
        hasher: PlainHasher,
    };

    let result = usecase.execute(SignUpInput::default()).await;

    assert_eq!(
        validation_fields(result),
        vec!["email", "first_name", "last_name", "password", "username"]
    );
}

#[tokio::test]
async fn should_change_password_after_verifying_current() {
    let db = MemoryDb::new();
    let user = db.add_user("alice_baker");
    let usecase = SetPasswordUseCase {
        repo: db.users(),
        hasher: PlainHasher,
    };

    let wrong = usecase
        .execute(
            user.id,
            SetPasswordInput {
                current_password: Some("not-my-password".to_owned()),
                new_password: Some("fresh-password".to_owned()),
            },
        )
        .await;
    assert_eq!(validation_fields(wrong), vec!["current_password"]);

    usecase
        .execute(
            user.id,
            SetPasswordInput {
                current_password: Some("password123".to_owned()),
                new_password: Some("fresh-password".to_owned()),
            },
        )
        .await
        .unwrap();
    assert_eq!(db.lock().users[0].password_hash, "plain:fresh-password");
}

#[tokio::test]
async fn should_reject_short_new_password() {
    let db = MemoryDb::new();
    let user = db.add_user("alice_baker");
    let usecase = SetPasswordUseCase {
        repo: db.users(),
        hasher: PlainHasher,
    };

    let result = usecase
        .execute(
            user.id,
            SetPasswordInput {
                current_password: Some("password123".to_owned()),
                new_password: Some("short".to_owned()),
            },
        )
        .await;

    assert_eq!(validation_fields(result), vec!["new_password"]);
    assert_eq!(db.lock().users[0].password_hash, "plain:password123");
}

#[tokio::test]
async fn should_update_profile_but_not_steal_username() {
    let db = MemoryDb::new();
    let alice = db.add_user("alice_baker");
    let bob = db.add_user("bob_the_cook");
    let usecase = UpdateProfileUseCase { repo: db.users() };

    let taken = usecase
        .execute(
            alice.id,
            ProfileChanges {
                username: Some(bob.username.clone()),
                ..Default::default()
            },
        )
        .await;
    assert_eq!(validation_fields(taken), vec!["username"]);

    let updated = usecase
        .execute(
            alice.id,
            ProfileChanges {
                username: Some(alice.username.clone()),
                first_name: Some("Alicia".to_owned()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.first_name, "Alicia");
    assert_eq!(updated.username, alice.username);
}

#[tokio::test]
async fn should_flag_subscriptions_only_for_signed_in_viewer() {
    let db = MemoryDb::new();
    let author = db.add_user("chef_alice");
    let reader = db.add_user("hungry_bob");
    db.lock().subscriptions.push((reader.id, author.id));
    let get = GetUserUseCase {
        repo: db.users(),
        subscriptions: db.subscriptions(),
    };
    let list = ListUsersUseCase {
        repo: db.users(),
        subscriptions: db.subscriptions(),
    };

    assert!(get.execute(Some(reader.id), author.id).await.unwrap().is_subscribed);
    assert!(!get.execute(None, author.id).await.unwrap().is_subscribed);
    assert!(!get.execute(Some(author.id), reader.id).await.unwrap().is_subscribed);

    let (views, total) = list
        .execute(Some(reader.id), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(total, 2);
    let subscribed: Vec<_> = views
        .iter()
        .filter(|v| v.is_subscribed)
        .map(|v| v.user.id)
        .collect();
    assert_eq!(subscribed, vec![author.id]);

    let missing = get.execute(None, uuid::Uuid::now_v7()).await;
    assert!(
        matches!(missing, Err(ApiError::UserNotFound)),
        "expected UserNotFound, got {missing:?}"
    );
}
