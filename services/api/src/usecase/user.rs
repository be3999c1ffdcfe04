use chrono::Utc;
use uuid::Uuid;

use foodgram_domain::pagination::PageRequest;
use foodgram_domain::user::UserRole;

use crate::domain::repository::{CredentialHasher, SubscriptionRepository, UserRepository};
use crate::domain::types::{ProfileChanges, User, UserView};
use crate::domain::validation::{
    FieldErrors, validate_email, validate_password, validate_person_name, validate_username,
};
use crate::error::ApiError;
use crate::usecase::view::{user_view, user_views};

const USERNAME_TAKEN: &str = "a user with that username already exists";
const EMAIL_TAKEN: &str = "a user with that email already exists";

// ── SignUp ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct SignUpInput {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
}

pub struct SignUpUseCase<R: UserRepository, H: CredentialHasher> {
    pub repo: R,
    pub hasher: H,
}

impl<R: UserRepository, H: CredentialHasher> SignUpUseCase<R, H> {
    pub async fn execute(&self, input: SignUpInput) -> Result<User, ApiError> {
        let mut errors = FieldErrors::new();
        let username = errors.require("username", input.username, validate_username);
        let email = errors.require("email", input.email, validate_email);
        let first_name = errors.require("first_name", input.first_name, validate_person_name);
        let last_name = errors.require("last_name", input.last_name, validate_person_name);
        let password = errors.require("password", input.password, validate_password);

        if let Some(username) = &username {
            if self.repo.username_taken(username, None).await? {
                errors.add("username", USERNAME_TAKEN);
            }
        }
        if let Some(email) = &email {
            if self.repo.email_taken(email, None).await? {
                errors.add("email", EMAIL_TAKEN);
            }
        }

        let (Some(username), Some(email), Some(first_name), Some(last_name), Some(password)) =
            (username, email, first_name, last_name, password)
        else {
            return Err(ApiError::Validation(errors));
        };
        errors.into_result()?;

        let user = User {
            id: Uuid::now_v7(),
            username,
            email,
            first_name,
            last_name,
            password_hash: self.hasher.hash(&password).await?,
            role: UserRole::User,
            created_at: Utc::now(),
        };
        if !self.repo.create(&user).await? {
            return Err(ApiError::invalid(
                "non_field_errors",
                "a user with that username or email already exists",
            ));
        }
        tracing::info!(user_id = %user.id, "user signed up");
        Ok(user)
    }
}

// ── GetUser ──────────────────────────────────────────────────────────────────

pub struct GetUserUseCase<R: UserRepository, S: SubscriptionRepository> {
    pub repo: R,
    pub subscriptions: S,
}

impl<R: UserRepository, S: SubscriptionRepository> GetUserUseCase<R, S> {
    pub async fn execute(&self, viewer: Option<Uuid>, id: Uuid) -> Result<UserView, ApiError> {
        let user = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::UserNotFound)?;
        user_view(&self.subscriptions, viewer, user).await
    }
}

// ── ListUsers ────────────────────────────────────────────────────────────────

pub struct ListUsersUseCase<R: UserRepository, S: SubscriptionRepository> {
    pub repo: R,
    pub subscriptions: S,
}

impl<R: UserRepository, S: SubscriptionRepository> ListUsersUseCase<R, S> {
    pub async fn execute(
        &self,
        viewer: Option<Uuid>,
        page: PageRequest,
    ) -> Result<(Vec<UserView>, u64), ApiError> {
        let (users, total) = self.repo.list(page.clamped()).await?;
        let views = user_views(&self.subscriptions, viewer, users).await?;
        Ok((views, total))
    }
}

// ── UpdateProfile ────────────────────────────────────────────────────────────

pub struct UpdateProfileUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> UpdateProfileUseCase<R> {
    pub async fn execute(&self, user_id: Uuid, input: ProfileChanges) -> Result<User, ApiError> {
        let mut errors = FieldErrors::new();
        let changes = ProfileChanges {
            username: errors.optional("username", input.username, validate_username),
            email: errors.optional("email", input.email, validate_email),
            first_name: errors.optional("first_name", input.first_name, validate_person_name),
            last_name: errors.optional("last_name", input.last_name, validate_person_name),
        };
        if let Some(username) = &changes.username {
            if self.repo.username_taken(username, Some(user_id)).await? {
                errors.add("username", USERNAME_TAKEN);
            }
        }
        if let Some(email) = &changes.email {
            if self.repo.email_taken(email, Some(user_id)).await? {
                errors.add("email", EMAIL_TAKEN);
            }
        }
        errors.into_result()?;

        if !changes.is_empty() && !self.repo.update_profile(user_id, &changes).await? {
            return Err(ApiError::invalid(
                "non_field_errors",
                "a user with that username or email already exists",
            ));
        }
        self.repo
            .find_by_id(user_id)
            .await?
            .ok_or(ApiError::UserNotFound)
    }
}

// ── SetPassword ──────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct SetPasswordInput {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

pub struct SetPasswordUseCase<R: UserRepository, H: CredentialHasher> {
    pub repo: R,
    pub hasher: H,
}

impl<R: UserRepository, H: CredentialHasher> SetPasswordUseCase<R, H> {
    pub async fn execute(&self, user_id: Uuid, input: SetPasswordInput) -> Result<(), ApiError> {
        let user = self
            .repo
            .find_by_id(user_id)
            .await?
            .ok_or(ApiError::UserNotFound)?;

        let mut errors = FieldErrors::new();
        let current = errors.require("current_password", input.current_password, |_| Ok(()));
        let new = errors.require("new_password", input.new_password, validate_password);

        if let Some(current) = &current {
            if !self.hasher.verify(current, &user.password_hash).await? {
                errors.add("current_password", "current password is incorrect");
            }
            if new.as_deref() == Some(current.as_str()) {
                errors.add("new_password", "new password must differ from the current one");
            }
        }
        let Some(new) = new else {
            return Err(ApiError::Validation(errors));
        };
        errors.into_result()?;

        let password_hash = self.hasher.hash(&new).await?;
        self.repo.update_password_hash(user_id, &password_hash).await?;
        tracing::info!(%user_id, "password changed");
        Ok(())
    }
}
