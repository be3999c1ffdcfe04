use axum::{
    Json,
    extract::{OriginalUri, Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use foodgram_auth_types::identity::IdentityHeaders;
use foodgram_core::pagination::paginate;
use foodgram_domain::pagination::{Page, PageRequest};

use crate::domain::types::{Recipe, RecipeFilter, RecipeIngredient, RecipeView};
use crate::domain::validation::IngredientAmountInput;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiQuery};
use crate::handlers::tag::TagResponse;
use crate::handlers::user::UserResponse;
use crate::state::AppState;
use crate::usecase::membership::{AddRecipeToSetUseCase, RemoveRecipeFromSetUseCase};
use crate::usecase::recipe::{
    CreateRecipeUseCase, DeleteRecipeUseCase, GetRecipeUseCase, ListRecipesUseCase, RecipeInput,
    UpdateRecipeUseCase,
};
use crate::usecase::shopping_list::DownloadShoppingListUseCase;

#[derive(Serialize)]
pub struct RecipeIngredientResponse {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

impl From<RecipeIngredient> for RecipeIngredientResponse {
    fn from(item: RecipeIngredient) -> Self {
        Self {
            id: item.ingredient.id,
            name: item.ingredient.name,
            measurement_unit: item.ingredient.measurement_unit,
            amount: item.amount,
        }
    }
}

#[derive(Serialize)]
pub struct RecipeResponse {
    pub id: i32,
    pub tags: Vec<TagResponse>,
    pub author: UserResponse,
    pub ingredients: Vec<RecipeIngredientResponse>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

impl From<RecipeView> for RecipeResponse {
    fn from(view: RecipeView) -> Self {
        Self {
            id: view.recipe.id,
            tags: view.tags.into_iter().map(TagResponse::from).collect(),
            author: view.author.into(),
            ingredients: view
                .ingredients
                .into_iter()
                .map(RecipeIngredientResponse::from)
                .collect(),
            is_favorited: view.is_favorited,
            is_in_shopping_cart: view.is_in_shopping_cart,
            name: view.recipe.name,
            image: view.recipe.image,
            text: view.recipe.text,
            cooking_time: view.recipe.cooking_time,
        }
    }
}

/// Short read-shape used by toggles and subscription listings.
#[derive(Serialize)]
pub struct RecipeShortResponse {
    pub id: i32,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl From<Recipe> for RecipeShortResponse {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name,
            image: recipe.image,
            cooking_time: recipe.cooking_time,
        }
    }
}

// ── GET /recipes ─────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct RecipeListQuery {
    #[serde(default)]
    pub tags: Vec<String>,
    pub author: Option<Uuid>,
    pub is_favorited: Option<String>,
    pub is_in_shopping_cart: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl RecipeListQuery {
    /// Tag slugs from repeated `tags=` params, each possibly comma-separated.
    fn tag_slugs(&self) -> Vec<String> {
        self.tags
            .iter()
            .flat_map(|value| value.split(','))
            .map(str::trim)
            .filter(|slug| !slug.is_empty())
            .map(str::to_owned)
            .collect()
    }

    fn filter(&self, viewer: Option<Uuid>) -> RecipeFilter {
        RecipeFilter::new(
            self.tag_slugs(),
            self.author,
            is_set(self.is_favorited.as_deref()),
            is_set(self.is_in_shopping_cart.as_deref()),
            viewer,
        )
    }
}

fn is_set(flag: Option<&str>) -> bool {
    matches!(flag, Some("1") | Some("true"))
}

pub async fn list_recipes(
    identity: Option<IdentityHeaders>,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    ApiQuery(query): ApiQuery<RecipeListQuery>,
) -> Result<Json<Page<RecipeResponse>>, ApiError> {
    let viewer = identity.map(|i| i.user_id);
    let usecase = ListRecipesUseCase {
        recipes: state.recipe_repo(),
        favorites: state.favorite_repo(),
        cart: state.shopping_cart_repo(),
        subscriptions: state.subscription_repo(),
    };
    let page = PageRequest::from_query(query.limit, query.page);
    let (views, total) = usecase.execute(viewer, query.filter(viewer), page).await?;
    Ok(Json(paginate(&uri, page, total, views).map(RecipeResponse::from)))
}

// ── GET /recipes/{id} ────────────────────────────────────────────────────────

async fn render_recipe(
    state: &AppState,
    viewer: Option<Uuid>,
    id: i32,
) -> Result<RecipeResponse, ApiError> {
    let usecase = GetRecipeUseCase {
        recipes: state.recipe_repo(),
        favorites: state.favorite_repo(),
        cart: state.shopping_cart_repo(),
        subscriptions: state.subscription_repo(),
    };
    Ok(usecase.execute(viewer, id).await?.into())
}

pub async fn get_recipe(
    identity: Option<IdentityHeaders>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<RecipeResponse>, ApiError> {
    let recipe = render_recipe(&state, identity.map(|i| i.user_id), id).await?;
    Ok(Json(recipe))
}

// ── POST /recipes, PATCH /recipes/{id} ───────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct IngredientAmountRequest {
    pub id: Option<i32>,
    pub amount: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct RecipeRequest {
    pub name: Option<String>,
    pub image: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i32>,
    pub ingredients: Option<Vec<IngredientAmountRequest>>,
    pub tags: Option<Vec<i32>>,
}

impl From<RecipeRequest> for RecipeInput {
    fn from(body: RecipeRequest) -> Self {
        Self {
            name: body.name,
            image: body.image,
            text: body.text,
            cooking_time: body.cooking_time,
            ingredients: body.ingredients.map(|items| {
                items
                    .into_iter()
                    .map(|item| IngredientAmountInput {
                        id: item.id,
                        amount: item.amount,
                    })
                    .collect()
            }),
            tags: body.tags,
        }
    }
}

pub async fn create_recipe(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RecipeRequest>,
) -> Result<(StatusCode, Json<RecipeResponse>), ApiError> {
    let usecase = CreateRecipeUseCase {
        recipes: state.recipe_repo(),
        tags: state.tag_repo(),
        ingredients: state.ingredient_repo(),
        images: state.image_storage(),
    };
    let id = usecase.execute(identity.user_id, body.into()).await?;
    let recipe = render_recipe(&state, Some(identity.user_id), id).await?;
    Ok((StatusCode::CREATED, Json(recipe)))
}

pub async fn update_recipe(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ApiJson(body): ApiJson<RecipeRequest>,
) -> Result<Json<RecipeResponse>, ApiError> {
    let usecase = UpdateRecipeUseCase {
        recipes: state.recipe_repo(),
        tags: state.tag_repo(),
        ingredients: state.ingredient_repo(),
        images: state.image_storage(),
    };
    usecase.execute(&identity, id, body.into()).await?;
    let recipe = render_recipe(&state, Some(identity.user_id), id).await?;
    Ok(Json(recipe))
}

/// Full replacement is not supported; clients send PATCH.
pub async fn reject_put() -> ApiError {
    ApiError::MethodNotAllowed
}

// ── DELETE /recipes/{id} ─────────────────────────────────────────────────────

pub async fn delete_recipe(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let usecase = DeleteRecipeUseCase {
        recipes: state.recipe_repo(),
    };
    usecase.execute(&identity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── /recipes/{id}/favorite ───────────────────────────────────────────────────

pub async fn add_favorite(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<(StatusCode, Json<RecipeShortResponse>), ApiError> {
    let usecase = AddRecipeToSetUseCase {
        recipes: state.recipe_repo(),
        set: state.favorite_repo(),
    };
    let recipe = usecase.execute(identity.user_id, id).await?;
    Ok((StatusCode::CREATED, Json(recipe.into())))
}

pub async fn remove_favorite(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let usecase = RemoveRecipeFromSetUseCase {
        recipes: state.recipe_repo(),
        set: state.favorite_repo(),
    };
    usecase.execute(identity.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── /recipes/{id}/shopping_cart ──────────────────────────────────────────────

pub async fn add_to_shopping_cart(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<(StatusCode, Json<RecipeShortResponse>), ApiError> {
    let usecase = AddRecipeToSetUseCase {
        recipes: state.recipe_repo(),
        set: state.shopping_cart_repo(),
    };
    let recipe = usecase.execute(identity.user_id, id).await?;
    Ok((StatusCode::CREATED, Json(recipe.into())))
}

pub async fn remove_from_shopping_cart(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let usecase = RemoveRecipeFromSetUseCase {
        recipes: state.recipe_repo(),
        set: state.shopping_cart_repo(),
    };
    usecase.execute(identity.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /recipes/download_shopping_cart ──────────────────────────────────────

pub async fn download_shopping_cart(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    let usecase = DownloadShoppingListUseCase {
        users: state.user_repo(),
        list: state.shopping_cart_repo(),
    };
    let file = usecase.execute(identity.user_id).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.filename),
            ),
        ],
        file.body,
    )
        .into_response())
}
