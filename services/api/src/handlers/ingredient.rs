use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use foodgram_auth_types::identity::IdentityHeaders;

use crate::domain::types::Ingredient;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiQuery};
use crate::state::AppState;
use crate::usecase::catalog::{
    CreateIngredientInput, CreateIngredientUseCase, GetIngredientUseCase, ListIngredientsUseCase,
};

#[derive(Serialize)]
pub struct IngredientResponse {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
}

impl From<Ingredient> for IngredientResponse {
    fn from(ingredient: Ingredient) -> Self {
        Self {
            id: ingredient.id,
            name: ingredient.name,
            measurement_unit: ingredient.measurement_unit,
        }
    }
}

// ── GET /ingredients ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct IngredientQuery {
    /// Case-sensitive name prefix.
    pub name: Option<String>,
}

pub async fn list_ingredients(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<IngredientQuery>,
) -> Result<Json<Vec<IngredientResponse>>, ApiError> {
    let usecase = ListIngredientsUseCase {
        repo: state.ingredient_repo(),
    };
    let ingredients = usecase.execute(query.name.as_deref()).await?;
    Ok(Json(
        ingredients
            .into_iter()
            .map(IngredientResponse::from)
            .collect(),
    ))
}

// ── GET /ingredients/{id} ────────────────────────────────────────────────────

pub async fn get_ingredient(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<IngredientResponse>, ApiError> {
    let usecase = GetIngredientUseCase {
        repo: state.ingredient_repo(),
    };
    Ok(Json(usecase.execute(id).await?.into()))
}

// ── POST /ingredients ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateIngredientRequest {
    pub name: Option<String>,
    pub measurement_unit: Option<String>,
}

pub async fn create_ingredient(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateIngredientRequest>,
) -> Result<(StatusCode, Json<IngredientResponse>), ApiError> {
    let usecase = CreateIngredientUseCase {
        repo: state.ingredient_repo(),
    };
    let ingredient = usecase
        .execute(
            &identity,
            CreateIngredientInput {
                name: body.name,
                measurement_unit: body.measurement_unit,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ingredient.into())))
}
