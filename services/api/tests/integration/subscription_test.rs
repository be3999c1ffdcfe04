use foodgram_api::error::ApiError;
use foodgram_api::usecase::subscription::{
    ListSubscriptionsUseCase, SubscribeUseCase, UnsubscribeUseCase,
};
use foodgram_domain::pagination::PageRequest;
use uuid::Uuid;

use crate::helpers::MemoryDb;

#[tokio::test]
async fn should_reject_self_subscription_even_when_author_missing() {
    let db = MemoryDb::new();
    let ghost = Uuid::now_v7();
    let usecase = SubscribeUseCase {
        users: db.users(),
        subscriptions: db.subscriptions(),
        recipes: db.recipes(),
    };

    let result = usecase.execute(ghost, ghost, 3).await;

    assert!(
        matches!(result, Err(ApiError::SelfSubscription)),
        "expected SelfSubscription, got {result:?}"
    );
}

#[tokio::test]
async fn should_subscribe_once_and_truncate_recipes() {
    let db = MemoryDb::new();
    let author = db.add_user("chef_alice");
    let reader = db.add_user("hungry_bob");
    let newest = db.add_recipe(&author, "newest", &[], &[], 1);
    let middle = db.add_recipe(&author, "middle", &[], &[], 2);
    db.add_recipe(&author, "oldest", &[], &[], 3);
    let usecase = SubscribeUseCase {
        users: db.users(),
        subscriptions: db.subscriptions(),
        recipes: db.recipes(),
    };

    let view = usecase.execute(reader.id, author.id, 2).await.unwrap();

    assert!(view.is_subscribed);
    assert_eq!(view.recipes_count, 3);
    let ids: Vec<i32> = view.recipes.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![newest.id, middle.id]);

    let again = usecase.execute(reader.id, author.id, 2).await;
    assert!(
        matches!(again, Err(ApiError::AlreadySubscribed)),
        "expected AlreadySubscribed, got {again:?}"
    );
}

#[tokio::test]
async fn should_report_unknown_author() {
    let db = MemoryDb::new();
    let reader = db.add_user("hungry_bob");
    let subscribe = SubscribeUseCase {
        users: db.users(),
        subscriptions: db.subscriptions(),
        recipes: db.recipes(),
    };
    let unsubscribe = UnsubscribeUseCase {
        users: db.users(),
        subscriptions: db.subscriptions(),
    };

    let result = subscribe.execute(reader.id, Uuid::now_v7(), 3).await;
    assert!(
        matches!(result, Err(ApiError::UserNotFound)),
        "expected UserNotFound, got {result:?}"
    );
    let result = unsubscribe.execute(reader.id, Uuid::now_v7()).await;
    assert!(
        matches!(result, Err(ApiError::UserNotFound)),
        "expected UserNotFound, got {result:?}"
    );
}

#[tokio::test]
async fn should_fail_on_second_unsubscribe() {
    let db = MemoryDb::new();
    let author = db.add_user("chef_alice");
    let reader = db.add_user("hungry_bob");
    db.lock().subscriptions.push((reader.id, author.id));
    let usecase = UnsubscribeUseCase {
        users: db.users(),
        subscriptions: db.subscriptions(),
    };

    usecase.execute(reader.id, author.id).await.unwrap();
    let again = usecase.execute(reader.id, author.id).await;

    assert!(
        matches!(again, Err(ApiError::NotSubscribed)),
        "expected NotSubscribed, got {again:?}"
    );
}

#[tokio::test]
async fn should_list_followed_authors_with_counts() {
    let db = MemoryDb::new();
    let alice = db.add_user("chef_alice");
    let carol = db.add_user("chef_carol");
    let reader = db.add_user("hungry_bob");
    db.add_recipe(&alice, "a1", &[], &[], 1);
    db.add_recipe(&alice, "a2", &[], &[], 2);
    db.add_recipe(&carol, "c1", &[], &[], 3);
    {
        let mut tables = db.lock();
        tables.subscriptions.push((reader.id, alice.id));
        tables.subscriptions.push((reader.id, carol.id));
    }
    let usecase = ListSubscriptionsUseCase {
        subscriptions: db.subscriptions(),
        recipes: db.recipes(),
    };

    let (views, total) = usecase
        .execute(reader.id, PageRequest::default(), 1)
        .await
        .unwrap();

    assert_eq!(total, 2);
    let of = |id: Uuid| views.iter().find(|v| v.author.id == id).unwrap();
    assert_eq!(of(alice.id).recipes_count, 2);
    assert_eq!(of(alice.id).recipes.len(), 1);
    assert_eq!(of(carol.id).recipes_count, 1);
    assert!(views.iter().all(|v| v.is_subscribed));
}
