#![allow(async_fn_in_trait)]

use std::collections::HashSet;

use uuid::Uuid;

use foodgram_domain::pagination::PageRequest;

use crate::domain::image::DecodedImage;
use crate::domain::types::{
    Ingredient, Membership, NewIngredient, NewTag, ProfileChanges, Recipe, RecipeChanges,
    RecipeDetails, RecipeDraft, RecipeFilter, ShoppingListItem, Tag, User,
};
use crate::error::ApiError;

/// Repository for accounts.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError>;

    /// Ascending by id.
    async fn list(&self, page: PageRequest) -> Result<(Vec<User>, u64), ApiError>;

    /// True when another account (not `exclude`) already uses `username`.
    async fn username_taken(
        &self,
        username: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, ApiError>;

    async fn email_taken(&self, email: &str, exclude: Option<Uuid>) -> Result<bool, ApiError>;

    /// Returns `false` if the insert lost a race on username or email.
    async fn create(&self, user: &User) -> Result<bool, ApiError>;

    /// Returns `false` if the update lost a race on username or email.
    async fn update_profile(
        &self,
        id: Uuid,
        changes: &ProfileChanges,
    ) -> Result<bool, ApiError>;

    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> Result<(), ApiError>;
}

pub trait TagRepository: Send + Sync {
    /// Ordered by name.
    async fn list(&self) -> Result<Vec<Tag>, ApiError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<Tag>, ApiError>;
    /// The subset of `ids` that exist.
    async fn existing_ids(&self, ids: &[i32]) -> Result<HashSet<i32>, ApiError>;
    /// `None` when name, color or slug is already used.
    async fn create(&self, tag: &NewTag) -> Result<Option<Tag>, ApiError>;
}

pub trait IngredientRepository: Send + Sync {
    /// Ascending by id, optionally restricted to names starting with
    /// `name_prefix` (case-sensitive).
    async fn list(&self, name_prefix: Option<&str>) -> Result<Vec<Ingredient>, ApiError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<Ingredient>, ApiError>;
    async fn existing_ids(&self, ids: &[i32]) -> Result<HashSet<i32>, ApiError>;
    /// `None` when the (name, measurement_unit) pair already exists.
    async fn create(&self, ingredient: &NewIngredient) -> Result<Option<Ingredient>, ApiError>;
}

/// Repository for recipes and their ingredient/tag links.
pub trait RecipeRepository: Send + Sync {
    /// Newest first. Returns the page and the total number of matches.
    async fn list(
        &self,
        filter: &RecipeFilter,
        page: PageRequest,
    ) -> Result<(Vec<RecipeDetails>, u64), ApiError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Recipe>, ApiError>;

    async fn find_details(&self, id: i32) -> Result<Option<RecipeDetails>, ApiError>;

    /// Insert the recipe and its links atomically. Returns the new id.
    async fn create(&self, author_id: Uuid, draft: &RecipeDraft) -> Result<i32, ApiError>;

    /// Apply scalar changes and replace both link sets atomically.
    async fn update(&self, id: i32, changes: &RecipeChanges) -> Result<(), ApiError>;

    /// Returns `true` if a row was deleted.
    async fn delete(&self, id: i32) -> Result<bool, ApiError>;

    /// The author's newest recipes, at most `limit`.
    async fn list_by_author(&self, author_id: Uuid, limit: u32) -> Result<Vec<Recipe>, ApiError>;

    async fn count_by_author(&self, author_id: Uuid) -> Result<u64, ApiError>;
}

/// A per-user set of recipes (favorites, shopping cart).
pub trait RecipeMembershipRepository: Send + Sync {
    fn membership(&self) -> Membership;

    /// Returns `false` when the pair is already present.
    async fn add(&self, user_id: Uuid, recipe_id: i32) -> Result<bool, ApiError>;

    /// Returns `false` when there was nothing to remove.
    async fn remove(&self, user_id: Uuid, recipe_id: i32) -> Result<bool, ApiError>;

    /// The subset of `recipe_ids` present in the user's set.
    async fn recipe_ids_among(
        &self,
        user_id: Uuid,
        recipe_ids: &[i32],
    ) -> Result<HashSet<i32>, ApiError>;
}

/// Read side of the shopping cart used for the downloadable list.
pub trait ShoppingListRepository: Send + Sync {
    async fn has_entries(&self, user_id: Uuid) -> Result<bool, ApiError>;

    /// Ingredient totals across every recipe in the cart, grouped by
    /// (name, measurement_unit) and ordered by name then unit.
    async fn aggregate(&self, user_id: Uuid) -> Result<Vec<ShoppingListItem>, ApiError>;
}

pub trait SubscriptionRepository: Send + Sync {
    /// Returns `false` when the follower already follows the author.
    async fn add(&self, follower_id: Uuid, author_id: Uuid) -> Result<bool, ApiError>;

    /// Returns `false` when there was nothing to remove.
    async fn remove(&self, follower_id: Uuid, author_id: Uuid) -> Result<bool, ApiError>;

    /// Authors the follower follows, ascending by id, plus the total.
    async fn list_authors(
        &self,
        follower_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<User>, u64), ApiError>;

    /// The subset of `author_ids` the follower follows.
    async fn author_ids_among(
        &self,
        follower_id: Uuid,
        author_ids: &[Uuid],
    ) -> Result<HashSet<Uuid>, ApiError>;
}

/// Persists uploaded recipe images.
pub trait ImageStorage: Send + Sync {
    /// Store the image and return its public URL.
    async fn store(&self, image: &DecodedImage) -> Result<String, ApiError>;
    /// Delete a previously stored image. Unknown references are ignored.
    async fn remove(&self, url: &str) -> Result<(), ApiError>;
}

/// One-way password hashing.
pub trait CredentialHasher: Send + Sync {
    async fn hash(&self, password: &str) -> Result<String, ApiError>;
    async fn verify(&self, password: &str, password_hash: &str) -> Result<bool, ApiError>;
}
