use axum::{
    Router,
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use foodgram_core::health::healthz;
use foodgram_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    health::readyz,
    ingredient::{create_ingredient, get_ingredient, list_ingredients},
    recipe::{
        add_favorite, add_to_shopping_cart, create_recipe, delete_recipe, download_shopping_cart,
        get_recipe, list_recipes, reject_put, remove_favorite, remove_from_shopping_cart,
        update_recipe,
    },
    subscription::{list_subscriptions, subscribe, unsubscribe},
    tag::{create_tag, get_tag, list_tags},
    user::{create_user, get_me, get_user, list_users, set_password, update_me},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let media = media_path(&state.media_url).map(|path| (path, ServeDir::new(&state.media_root)));

    let router = Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Users
        .route("/users", get(list_users).post(create_user))
        .route("/users/me", get(get_me).patch(update_me))
        .route("/users/set_password", post(set_password))
        .route("/users/subscriptions", get(list_subscriptions))
        .route("/users/{id}", get(get_user))
        .route("/users/{id}/subscribe", post(subscribe).delete(unsubscribe))
        // Recipes
        .route("/recipes", get(list_recipes).post(create_recipe))
        .route("/recipes/download_shopping_cart", get(download_shopping_cart))
        .route(
            "/recipes/{id}",
            get(get_recipe)
                .patch(update_recipe)
                .put(reject_put)
                .delete(delete_recipe),
        )
        .route(
            "/recipes/{id}/favorite",
            post(add_favorite).delete(remove_favorite),
        )
        .route(
            "/recipes/{id}/shopping_cart",
            post(add_to_shopping_cart).delete(remove_from_shopping_cart),
        )
        // Catalog
        .route("/tags", get(list_tags).post(create_tag))
        .route("/tags/{id}", get(get_tag))
        .route("/ingredients", get(list_ingredients).post(create_ingredient))
        .route("/ingredients/{id}", get(get_ingredient));

    let router = match media {
        Some((path, dir)) => router.nest_service(&path, dir),
        None => router,
    };

    router
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}

/// Mount point for uploaded media. `None` when `media_url` is not a local
/// path (e.g. an external CDN) or is the site root.
fn media_path(media_url: &str) -> Option<String> {
    let path = media_url.trim_end_matches('/');
    (path.starts_with('/') && path.len() > 1).then(|| path.to_owned())
}
