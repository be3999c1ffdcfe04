use chrono::{DateTime, Utc};
use uuid::Uuid;

use foodgram_domain::user::UserRole;

use crate::error::ApiError;

/// Registered account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

/// Partial profile update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: i32,
    pub name: String,
    pub color: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTag {
    pub name: String,
    pub color: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingredient {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIngredient {
    pub name: String,
    pub measurement_unit: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub id: i32,
    pub author_id: Uuid,
    pub name: String,
    /// Public URL of the stored image.
    pub image: String,
    pub text: String,
    /// Minutes, at least 1.
    pub cooking_time: i32,
    pub pub_date: DateTime<Utc>,
}

/// Ingredient reference with the amount a recipe uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngredientAmount {
    pub ingredient_id: i32,
    pub amount: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeIngredient {
    pub ingredient: Ingredient,
    pub amount: i32,
}

/// A recipe with everything needed to render it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDetails {
    pub recipe: Recipe,
    pub author: User,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<RecipeIngredient>,
}

/// Validated recipe content ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDraft {
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
    pub ingredients: Vec<IngredientAmount>,
    pub tags: Vec<i32>,
}

/// Validated recipe update. Scalar fields are optional; ingredient and tag
/// sets always replace the stored ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeChanges {
    pub name: Option<String>,
    pub image: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i32>,
    pub ingredients: Vec<IngredientAmount>,
    pub tags: Vec<i32>,
}

/// Recipe list filter. Membership filters carry the viewer's id and are only
/// set for authenticated viewers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    /// Tag slugs; a recipe matches when it carries any of them.
    pub tags: Vec<String>,
    pub author: Option<Uuid>,
    pub favorited_by: Option<Uuid>,
    pub in_cart_of: Option<Uuid>,
}

impl RecipeFilter {
    /// Build from raw query flags. `is_favorited` and `is_in_shopping_cart`
    /// are ignored for anonymous viewers.
    pub fn new(
        tags: Vec<String>,
        author: Option<Uuid>,
        is_favorited: bool,
        is_in_shopping_cart: bool,
        viewer: Option<Uuid>,
    ) -> Self {
        Self {
            tags,
            author,
            favorited_by: viewer.filter(|_| is_favorited),
            in_cart_of: viewer.filter(|_| is_in_shopping_cart),
        }
    }
}

/// One aggregated line of the shopping list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListItem {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

/// User as seen by a particular viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserView {
    pub user: User,
    pub is_subscribed: bool,
}

/// Recipe as seen by a particular viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeView {
    pub recipe: Recipe,
    pub author: UserView,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<RecipeIngredient>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

/// Followed author with a preview of their most recent recipes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionView {
    pub author: User,
    pub is_subscribed: bool,
    pub recipes: Vec<Recipe>,
    pub recipes_count: u64,
}

/// Which per-user recipe set a toggle operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Favorite,
    ShoppingCart,
}

impl Membership {
    pub fn already_present(self) -> ApiError {
        match self {
            Self::Favorite => ApiError::AlreadyFavorited,
            Self::ShoppingCart => ApiError::AlreadyInShoppingCart,
        }
    }

    pub fn not_present(self) -> ApiError {
        match self {
            Self::Favorite => ApiError::NotFavorited,
            Self::ShoppingCart => ApiError::NotInShoppingCart,
        }
    }
}
