//! Add/remove toggles for per-user recipe sets (favorites, shopping cart).
//!
//! Repeating an action fails on the second call instead of being a no-op.

use uuid::Uuid;

use crate::domain::repository::{RecipeMembershipRepository, RecipeRepository};
use crate::domain::types::Recipe;
use crate::error::ApiError;

// ── AddRecipe ────────────────────────────────────────────────────────────────

pub struct AddRecipeToSetUseCase<R: RecipeRepository, M: RecipeMembershipRepository> {
    pub recipes: R,
    pub set: M,
}

impl<R: RecipeRepository, M: RecipeMembershipRepository> AddRecipeToSetUseCase<R, M> {
    /// Returns the recipe for the short read-shape.
    pub async fn execute(&self, user_id: Uuid, recipe_id: i32) -> Result<Recipe, ApiError> {
        let recipe = self
            .recipes
            .find_by_id(recipe_id)
            .await?
            .ok_or(ApiError::RecipeNotFound)?;
        if !self.set.add(user_id, recipe_id).await? {
            return Err(self.set.membership().already_present());
        }
        tracing::info!(%user_id, recipe_id, membership = ?self.set.membership(), "recipe added");
        Ok(recipe)
    }
}

// ── RemoveRecipe ─────────────────────────────────────────────────────────────

pub struct RemoveRecipeFromSetUseCase<R: RecipeRepository, M: RecipeMembershipRepository> {
    pub recipes: R,
    pub set: M,
}

impl<R: RecipeRepository, M: RecipeMembershipRepository> RemoveRecipeFromSetUseCase<R, M> {
    pub async fn execute(&self, user_id: Uuid, recipe_id: i32) -> Result<(), ApiError> {
        if self.recipes.find_by_id(recipe_id).await?.is_none() {
            return Err(ApiError::RecipeNotFound);
        }
        if !self.set.remove(user_id, recipe_id).await? {
            return Err(self.set.membership().not_present());
        }
        tracing::info!(%user_id, recipe_id, membership = ?self.set.membership(), "recipe removed");
        Ok(())
    }
}
