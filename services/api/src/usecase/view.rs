//! Attach viewer-relative flags to users and recipes.
//!
//! Anonymous viewers get every flag as `false` without touching storage.

use std::collections::HashSet;

use uuid::Uuid;

use crate::domain::repository::{RecipeMembershipRepository, SubscriptionRepository};
use crate::domain::types::{RecipeDetails, RecipeView, User, UserView};
use crate::error::ApiError;

pub async fn user_views<S: SubscriptionRepository>(
    subscriptions: &S,
    viewer: Option<Uuid>,
    users: Vec<User>,
) -> Result<Vec<UserView>, ApiError> {
    let followed = match viewer {
        Some(viewer) => {
            let ids: Vec<Uuid> = users.iter().map(|u| u.id).collect();
            subscriptions.author_ids_among(viewer, &ids).await?
        }
        None => HashSet::new(),
    };
    Ok(users
        .into_iter()
        .map(|user| UserView {
            is_subscribed: followed.contains(&user.id),
            user,
        })
        .collect())
}

pub async fn user_view<S: SubscriptionRepository>(
    subscriptions: &S,
    viewer: Option<Uuid>,
    user: User,
) -> Result<UserView, ApiError> {
    let mut views = user_views(subscriptions, viewer, vec![user]).await?;
    views
        .pop()
        .ok_or_else(|| anyhow::anyhow!("user view lost").into())
}

/// Repositories consulted for recipe flags.
pub struct RecipeViewer<'a, F, C, S> {
    pub favorites: &'a F,
    pub cart: &'a C,
    pub subscriptions: &'a S,
}

impl<F, C, S> RecipeViewer<'_, F, C, S>
where
    F: RecipeMembershipRepository,
    C: RecipeMembershipRepository,
    S: SubscriptionRepository,
{
    pub async fn views(
        &self,
        viewer: Option<Uuid>,
        details: Vec<RecipeDetails>,
    ) -> Result<Vec<RecipeView>, ApiError> {
        let (favorited, in_cart, followed) = match viewer {
            Some(viewer) => {
                let recipe_ids: Vec<i32> = details.iter().map(|d| d.recipe.id).collect();
                let mut author_ids: Vec<Uuid> = details.iter().map(|d| d.author.id).collect();
                author_ids.sort_unstable();
                author_ids.dedup();
                (
                    self.favorites.recipe_ids_among(viewer, &recipe_ids).await?,
                    self.cart.recipe_ids_among(viewer, &recipe_ids).await?,
                    self.subscriptions
                        .author_ids_among(viewer, &author_ids)
                        .await?,
                )
            }
            None => (HashSet::new(), HashSet::new(), HashSet::new()),
        };
        Ok(details
            .into_iter()
            .map(|d| RecipeView {
                is_favorited: favorited.contains(&d.recipe.id),
                is_in_shopping_cart: in_cart.contains(&d.recipe.id),
                author: UserView {
                    is_subscribed: followed.contains(&d.author.id),
                    user: d.author,
                },
                recipe: d.recipe,
                tags: d.tags,
                ingredients: d.ingredients,
            })
            .collect())
    }

    pub async fn view(
        &self,
        viewer: Option<Uuid>,
        details: RecipeDetails,
    ) -> Result<RecipeView, ApiError> {
        let mut views = self.views(viewer, vec![details]).await?;
        views
            .pop()
            .ok_or_else(|| anyhow::anyhow!("recipe view lost").into())
    }
}
