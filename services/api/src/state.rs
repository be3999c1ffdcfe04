use std::path::PathBuf;

use sea_orm::DatabaseConnection;

use crate::infra::db::{
    DbFavoriteRepository, DbIngredientRepository, DbRecipeRepository, DbShoppingCartRepository,
    DbSubscriptionRepository, DbTagRepository, DbUserRepository,
};
use crate::infra::password::Argon2CredentialHasher;
use crate::infra::storage::LocalImageStorage;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub media_root: PathBuf,
    pub media_url: String,
    /// Recipes shown per author in subscription responses when the request
    /// does not pass `recipes_limit`.
    pub recipes_limit: u32,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn tag_repo(&self) -> DbTagRepository {
        DbTagRepository {
            db: self.db.clone(),
        }
    }

    pub fn ingredient_repo(&self) -> DbIngredientRepository {
        DbIngredientRepository {
            db: self.db.clone(),
        }
    }

    pub fn recipe_repo(&self) -> DbRecipeRepository {
        DbRecipeRepository {
            db: self.db.clone(),
        }
    }

    pub fn favorite_repo(&self) -> DbFavoriteRepository {
        DbFavoriteRepository {
            db: self.db.clone(),
        }
    }

    pub fn shopping_cart_repo(&self) -> DbShoppingCartRepository {
        DbShoppingCartRepository {
            db: self.db.clone(),
        }
    }

    pub fn subscription_repo(&self) -> DbSubscriptionRepository {
        DbSubscriptionRepository {
            db: self.db.clone(),
        }
    }

    pub fn image_storage(&self) -> LocalImageStorage {
        LocalImageStorage {
            root: self.media_root.clone(),
            base_url: self.media_url.clone(),
        }
    }

    pub fn password_hasher(&self) -> Argon2CredentialHasher {
        Argon2CredentialHasher
    }
}
