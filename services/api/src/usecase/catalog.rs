use foodgram_auth_types::identity::IdentityHeaders;

use crate::domain::repository::{IngredientRepository, TagRepository};
use crate::domain::types::{Ingredient, NewIngredient, NewTag, Tag};
use crate::domain::validation::{
    FieldErrors, INGREDIENT_NAME_MAX_LEN, MEASUREMENT_UNIT_MAX_LEN, TAG_NAME_MAX_LEN,
    validate_bounded, validate_color, validate_slug,
};
use crate::error::ApiError;

fn normalize(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_lowercase())
}

// ── Tags ─────────────────────────────────────────────────────────────────────

pub struct ListTagsUseCase<T: TagRepository> {
    pub repo: T,
}

impl<T: TagRepository> ListTagsUseCase<T> {
    pub async fn execute(&self) -> Result<Vec<Tag>, ApiError> {
        self.repo.list().await
    }
}

pub struct GetTagUseCase<T: TagRepository> {
    pub repo: T,
}

impl<T: TagRepository> GetTagUseCase<T> {
    pub async fn execute(&self, id: i32) -> Result<Tag, ApiError> {
        self.repo.find_by_id(id).await?.ok_or(ApiError::TagNotFound)
    }
}

#[derive(Debug, Default)]
pub struct CreateTagInput {
    pub name: Option<String>,
    pub color: Option<String>,
    pub slug: Option<String>,
}

pub struct CreateTagUseCase<T: TagRepository> {
    pub repo: T,
}

impl<T: TagRepository> CreateTagUseCase<T> {
    /// Admin only. Name and slug are trimmed and lowercased before checks.
    pub async fn execute(
        &self,
        actor: &IdentityHeaders,
        input: CreateTagInput,
    ) -> Result<Tag, ApiError> {
        if !actor.is_admin() {
            return Err(ApiError::Forbidden);
        }
        let mut errors = FieldErrors::new();
        let name = errors.require("name", normalize(input.name), |v| {
            validate_bounded(v, TAG_NAME_MAX_LEN)
        });
        let color = errors.require(
            "color",
            input.color.map(|c| c.trim().to_owned()),
            validate_color,
        );
        let slug = errors.require("slug", normalize(input.slug), validate_slug);
        let (Some(name), Some(color), Some(slug)) = (name, color, slug) else {
            return Err(ApiError::Validation(errors));
        };

        let tag = NewTag { name, color, slug };
        let created = self.repo.create(&tag).await?.ok_or_else(|| {
            ApiError::invalid(
                "non_field_errors",
                "a tag with this name, color or slug already exists",
            )
        })?;
        tracing::info!(tag_id = created.id, slug = %created.slug, "tag created");
        Ok(created)
    }
}

// ── Ingredients ──────────────────────────────────────────────────────────────

pub struct ListIngredientsUseCase<I: IngredientRepository> {
    pub repo: I,
}

impl<I: IngredientRepository> ListIngredientsUseCase<I> {
    /// `name` filters by case-sensitive prefix; an empty value means no filter.
    pub async fn execute(&self, name: Option<&str>) -> Result<Vec<Ingredient>, ApiError> {
        self.repo.list(name.filter(|n| !n.is_empty())).await
    }
}

pub struct GetIngredientUseCase<I: IngredientRepository> {
    pub repo: I,
}

impl<I: IngredientRepository> GetIngredientUseCase<I> {
    pub async fn execute(&self, id: i32) -> Result<Ingredient, ApiError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::IngredientNotFound)
    }
}

#[derive(Debug, Default)]
pub struct CreateIngredientInput {
    pub name: Option<String>,
    pub measurement_unit: Option<String>,
}

pub struct CreateIngredientUseCase<I: IngredientRepository> {
    pub repo: I,
}

impl<I: IngredientRepository> CreateIngredientUseCase<I> {
    pub async fn execute(
        &self,
        actor: &IdentityHeaders,
        input: CreateIngredientInput,
    ) -> Result<Ingredient, ApiError> {
        if !actor.is_admin() {
            return Err(ApiError::Forbidden);
        }
        let mut errors = FieldErrors::new();
        let name = errors.require("name", normalize(input.name), |v| {
            validate_bounded(v, INGREDIENT_NAME_MAX_LEN)
        });
        let measurement_unit = errors.require(
            "measurement_unit",
            normalize(input.measurement_unit),
            |v| validate_bounded(v, MEASUREMENT_UNIT_MAX_LEN),
        );
        let (Some(name), Some(measurement_unit)) = (name, measurement_unit) else {
            return Err(ApiError::Validation(errors));
        };

        let ingredient = NewIngredient {
            name,
            measurement_unit,
        };
        let created = self.repo.create(&ingredient).await?.ok_or_else(|| {
            ApiError::invalid(
                "non_field_errors",
                "this ingredient already exists with the same measurement unit",
            )
        })?;
        tracing::info!(ingredient_id = created.id, "ingredient created");
        Ok(created)
    }
}
