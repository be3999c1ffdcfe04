use axum::{
    Json,
    extract::{OriginalUri, Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use foodgram_auth_types::identity::IdentityHeaders;
use foodgram_core::pagination::paginate;
use foodgram_domain::pagination::{Page, PageRequest};

use crate::domain::types::SubscriptionView;
use crate::error::ApiError;
use crate::extract::ApiQuery;
use crate::handlers::recipe::RecipeShortResponse;
use crate::state::AppState;
use crate::usecase::subscription::{
    ListSubscriptionsUseCase, SubscribeUseCase, UnsubscribeUseCase,
};

#[derive(Serialize)]
pub struct SubscriptionResponse {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    pub recipes: Vec<RecipeShortResponse>,
    pub recipes_count: u64,
}

impl From<SubscriptionView> for SubscriptionResponse {
    fn from(view: SubscriptionView) -> Self {
        Self {
            id: view.author.id,
            email: view.author.email,
            username: view.author.username,
            first_name: view.author.first_name,
            last_name: view.author.last_name,
            is_subscribed: view.is_subscribed,
            recipes: view
                .recipes
                .into_iter()
                .map(RecipeShortResponse::from)
                .collect(),
            recipes_count: view.recipes_count,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RecipesLimitQuery {
    pub recipes_limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubscriptionListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub recipes_limit: Option<u32>,
}

// ── GET /users/subscriptions ─────────────────────────────────────────────────

pub async fn list_subscriptions(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    ApiQuery(query): ApiQuery<SubscriptionListQuery>,
) -> Result<Json<Page<SubscriptionResponse>>, ApiError> {
    let usecase = ListSubscriptionsUseCase {
        subscriptions: state.subscription_repo(),
        recipes: state.recipe_repo(),
    };
    let page = PageRequest::from_query(query.limit, query.page);
    let recipes_limit = query.recipes_limit.unwrap_or(state.recipes_limit);
    let (views, total) = usecase
        .execute(identity.user_id, page, recipes_limit)
        .await?;
    Ok(Json(
        paginate(&uri, page, total, views).map(SubscriptionResponse::from),
    ))
}

// ── POST /users/{id}/subscribe ───────────────────────────────────────────────

pub async fn subscribe(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(author_id): Path<Uuid>,
    ApiQuery(query): ApiQuery<RecipesLimitQuery>,
) -> Result<(StatusCode, Json<SubscriptionResponse>), ApiError> {
    let usecase = SubscribeUseCase {
        users: state.user_repo(),
        subscriptions: state.subscription_repo(),
        recipes: state.recipe_repo(),
    };
    let recipes_limit = query.recipes_limit.unwrap_or(state.recipes_limit);
    let view = usecase
        .execute(identity.user_id, author_id, recipes_limit)
        .await?;
    Ok((StatusCode::CREATED, Json(view.into())))
}

// ── DELETE /users/{id}/subscribe ─────────────────────────────────────────────

pub async fn unsubscribe(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(author_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let usecase = UnsubscribeUseCase {
        users: state.user_repo(),
        subscriptions: state.subscription_repo(),
    };
    usecase.execute(identity.user_id, author_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
