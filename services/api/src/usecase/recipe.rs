use uuid::Uuid;

use foodgram_auth_types::identity::IdentityHeaders;
use foodgram_domain::pagination::PageRequest;

use crate::domain::image::DecodedImage;
use crate::domain::repository::{
    ImageStorage, IngredientRepository, RecipeMembershipRepository, RecipeRepository,
    SubscriptionRepository, TagRepository,
};
use crate::domain::types::{
    IngredientAmount, Recipe, RecipeChanges, RecipeDraft, RecipeFilter, RecipeView,
};
use crate::domain::validation::{
    FieldErrors, IngredientAmountInput, validate_cooking_time, validate_ingredient_list,
    validate_recipe_name, validate_recipe_text, validate_tag_list,
};
use crate::error::ApiError;
use crate::usecase::view::RecipeViewer;

/// Raw recipe payload. Every member is optional so that missing fields are
/// reported per field instead of rejecting the whole body.
#[derive(Debug, Clone, Default)]
pub struct RecipeInput {
    pub name: Option<String>,
    pub image: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i32>,
    pub ingredients: Option<Vec<IngredientAmountInput>>,
    pub tags: Option<Vec<i32>>,
}

/// Only the author or an admin may change a recipe.
pub fn ensure_can_modify(actor: &IdentityHeaders, recipe: &Recipe) -> Result<(), ApiError> {
    if actor.user_id == recipe.author_id || actor.is_admin() {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

/// Shape and existence checks for the ingredient and tag sets.
async fn check_links<T: TagRepository, I: IngredientRepository>(
    tags: &T,
    ingredients: &I,
    errors: &mut FieldErrors,
    ingredient_input: Option<&[IngredientAmountInput]>,
    tag_input: Option<&[i32]>,
) -> Result<(Option<Vec<IngredientAmount>>, Option<Vec<i32>>), ApiError> {
    let amounts = errors.check("ingredients", validate_ingredient_list(ingredient_input));
    if let Some(amounts) = &amounts {
        let ids: Vec<i32> = amounts.iter().map(|a| a.ingredient_id).collect();
        let existing = ingredients.existing_ids(&ids).await?;
        for id in ids.iter().filter(|id| !existing.contains(id)) {
            errors.add("ingredients", format!("ingredient {id} does not exist"));
        }
    }

    let tag_ids = errors.check("tags", validate_tag_list(tag_input));
    if let Some(tag_ids) = &tag_ids {
        let existing = tags.existing_ids(tag_ids).await?;
        for id in tag_ids.iter().filter(|id| !existing.contains(id)) {
            errors.add("tags", format!("tag {id} does not exist"));
        }
    }
    Ok((amounts, tag_ids))
}

/// Remove an image stored for a write that did not go through.
async fn discard_image<M: ImageStorage>(images: &M, url: &str) {
    if let Err(e) = images.remove(url).await {
        tracing::warn!(error = ?e, image = url, "failed to remove orphaned image");
    }
}

fn decode_image(errors: &mut FieldErrors, image: Option<String>) -> Option<DecodedImage> {
    let image = image?;
    errors.check("image", DecodedImage::from_data_uri(&image))
}

// ── ListRecipes ──────────────────────────────────────────────────────────────

pub struct ListRecipesUseCase<R, F, C, S> {
    pub recipes: R,
    pub favorites: F,
    pub cart: C,
    pub subscriptions: S,
}

impl<R, F, C, S> ListRecipesUseCase<R, F, C, S>
where
    R: RecipeRepository,
    F: RecipeMembershipRepository,
    C: RecipeMembershipRepository,
    S: SubscriptionRepository,
{
    pub async fn execute(
        &self,
        viewer: Option<Uuid>,
        filter: RecipeFilter,
        page: PageRequest,
    ) -> Result<(Vec<RecipeView>, u64), ApiError> {
        let (details, total) = self.recipes.list(&filter, page.clamped()).await?;
        let views = RecipeViewer {
            favorites: &self.favorites,
            cart: &self.cart,
            subscriptions: &self.subscriptions,
        }
        .views(viewer, details)
        .await?;
        Ok((views, total))
    }
}

// ── GetRecipe ────────────────────────────────────────────────────────────────

pub struct GetRecipeUseCase<R, F, C, S> {
    pub recipes: R,
    pub favorites: F,
    pub cart: C,
    pub subscriptions: S,
}

impl<R, F, C, S> GetRecipeUseCase<R, F, C, S>
where
    R: RecipeRepository,
    F: RecipeMembershipRepository,
    C: RecipeMembershipRepository,
    S: SubscriptionRepository,
{
    pub async fn execute(&self, viewer: Option<Uuid>, id: i32) -> Result<RecipeView, ApiError> {
        let details = self
            .recipes
            .find_details(id)
            .await?
            .ok_or(ApiError::RecipeNotFound)?;
        RecipeViewer {
            favorites: &self.favorites,
            cart: &self.cart,
            subscriptions: &self.subscriptions,
        }
        .view(viewer, details)
        .await
    }
}

// ── CreateRecipe ─────────────────────────────────────────────────────────────

pub struct CreateRecipeUseCase<R, T, I, M> {
    pub recipes: R,
    pub tags: T,
    pub ingredients: I,
    pub images: M,
}

impl<R, T, I, M> CreateRecipeUseCase<R, T, I, M>
where
    R: RecipeRepository,
    T: TagRepository,
    I: IngredientRepository,
    M: ImageStorage,
{
    /// Validates the whole payload before writing anything. Returns the new id.
    pub async fn execute(&self, author_id: Uuid, input: RecipeInput) -> Result<i32, ApiError> {
        let mut errors = FieldErrors::new();
        let name = errors.require("name", input.name, validate_recipe_name);
        let text = errors.require("text", input.text, validate_recipe_text);
        let cooking_time = match input.cooking_time {
            Some(minutes) => errors.check(
                "cooking_time",
                validate_cooking_time(minutes).map(|()| minutes),
            ),
            None => {
                errors.add("cooking_time", "this field is required");
                None
            }
        };
        if input.image.is_none() {
            errors.add("image", "this field is required");
        }
        let image = decode_image(&mut errors, input.image);
        let (amounts, tag_ids) = check_links(
            &self.tags,
            &self.ingredients,
            &mut errors,
            input.ingredients.as_deref(),
            input.tags.as_deref(),
        )
        .await?;

        let (Some(name), Some(text), Some(cooking_time), Some(image), Some(amounts), Some(tags)) =
            (name, text, cooking_time, image, amounts, tag_ids)
        else {
            return Err(ApiError::Validation(errors));
        };
        errors.into_result()?;

        let draft = RecipeDraft {
            name,
            image: self.images.store(&image).await?,
            text,
            cooking_time,
            ingredients: amounts,
            tags,
        };
        let id = match self.recipes.create(author_id, &draft).await {
            Ok(id) => id,
            Err(e) => {
                discard_image(&self.images, &draft.image).await;
                return Err(e);
            }
        };
        tracing::info!(recipe_id = id, %author_id, "recipe created");
        Ok(id)
    }
}

// ── UpdateRecipe ─────────────────────────────────────────────────────────────

pub struct UpdateRecipeUseCase<R, T, I, M> {
    pub recipes: R,
    pub tags: T,
    pub ingredients: I,
    pub images: M,
}

impl<R, T, I, M> UpdateRecipeUseCase<R, T, I, M>
where
    R: RecipeRepository,
    T: TagRepository,
    I: IngredientRepository,
    M: ImageStorage,
{
    /// Scalar fields are optional; the ingredient and tag sets are required
    /// and replace the stored ones.
    pub async fn execute(
        &self,
        actor: &IdentityHeaders,
        id: i32,
        input: RecipeInput,
    ) -> Result<(), ApiError> {
        let recipe = self
            .recipes
            .find_by_id(id)
            .await?
            .ok_or(ApiError::RecipeNotFound)?;
        ensure_can_modify(actor, &recipe)?;

        let mut errors = FieldErrors::new();
        let name = errors.optional("name", input.name, validate_recipe_name);
        let text = errors.optional("text", input.text, validate_recipe_text);
        let cooking_time = input.cooking_time.and_then(|minutes| {
            errors.check("cooking_time", validate_cooking_time(minutes).map(|()| minutes))
        });
        let image = decode_image(&mut errors, input.image);
        let (amounts, tag_ids) = check_links(
            &self.tags,
            &self.ingredients,
            &mut errors,
            input.ingredients.as_deref(),
            input.tags.as_deref(),
        )
        .await?;

        let (Some(amounts), Some(tag_ids)) = (amounts, tag_ids) else {
            return Err(ApiError::Validation(errors));
        };
        errors.into_result()?;

        let image = match image {
            Some(image) => Some(self.images.store(&image).await?),
            None => None,
        };
        let changes = RecipeChanges {
            name,
            image,
            text,
            cooking_time,
            ingredients: amounts,
            tags: tag_ids,
        };
        if let Err(e) = self.recipes.update(id, &changes).await {
            if let Some(image) = &changes.image {
                discard_image(&self.images, image).await;
            }
            return Err(e);
        }
        tracing::info!(recipe_id = id, actor = %actor.user_id, "recipe updated");
        Ok(())
    }
}

// ── DeleteRecipe ─────────────────────────────────────────────────────────────

pub struct DeleteRecipeUseCase<R: RecipeRepository> {
    pub recipes: R,
}

impl<R: RecipeRepository> DeleteRecipeUseCase<R> {
    pub async fn execute(&self, actor: &IdentityHeaders, id: i32) -> Result<(), ApiError> {
        let recipe = self
            .recipes
            .find_by_id(id)
            .await?
            .ok_or(ApiError::RecipeNotFound)?;
        ensure_can_modify(actor, &recipe)?;
        if !self.recipes.delete(id).await? {
            return Err(ApiError::RecipeNotFound);
        }
        tracing::info!(recipe_id = id, actor = %actor.user_id, "recipe deleted");
        Ok(())
    }
}
