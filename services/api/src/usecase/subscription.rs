use uuid::Uuid;

use foodgram_domain::pagination::PageRequest;

use crate::domain::repository::{RecipeRepository, SubscriptionRepository, UserRepository};
use crate::domain::types::{SubscriptionView, User};
use crate::error::ApiError;

/// Build the followed-author read shape with at most `recipes_limit` recipes.
async fn subscription_view<P: RecipeRepository>(
    recipes: &P,
    author: User,
    recipes_limit: u32,
) -> Result<SubscriptionView, ApiError> {
    let preview = recipes.list_by_author(author.id, recipes_limit).await?;
    let recipes_count = recipes.count_by_author(author.id).await?;
    Ok(SubscriptionView {
        author,
        is_subscribed: true,
        recipes: preview,
        recipes_count,
    })
}

// ── Subscribe ────────────────────────────────────────────────────────────────

pub struct SubscribeUseCase<U: UserRepository, S: SubscriptionRepository, P: RecipeRepository> {
    pub users: U,
    pub subscriptions: S,
    pub recipes: P,
}

impl<U, S, P> SubscribeUseCase<U, S, P>
where
    U: UserRepository,
    S: SubscriptionRepository,
    P: RecipeRepository,
{
    pub async fn execute(
        &self,
        follower_id: Uuid,
        author_id: Uuid,
        recipes_limit: u32,
    ) -> Result<SubscriptionView, ApiError> {
        if follower_id == author_id {
            return Err(ApiError::SelfSubscription);
        }
        let author = self
            .users
            .find_by_id(author_id)
            .await?
            .ok_or(ApiError::UserNotFound)?;
        if !self.subscriptions.add(follower_id, author_id).await? {
            return Err(ApiError::AlreadySubscribed);
        }
        tracing::info!(%follower_id, %author_id, "subscribed");
        subscription_view(&self.recipes, author, recipes_limit).await
    }
}

// ── Unsubscribe ──────────────────────────────────────────────────────────────

pub struct UnsubscribeUseCase<U: UserRepository, S: SubscriptionRepository> {
    pub users: U,
    pub subscriptions: S,
}

impl<U: UserRepository, S: SubscriptionRepository> UnsubscribeUseCase<U, S> {
    pub async fn execute(&self, follower_id: Uuid, author_id: Uuid) -> Result<(), ApiError> {
        if self.users.find_by_id(author_id).await?.is_none() {
            return Err(ApiError::UserNotFound);
        }
        if !self.subscriptions.remove(follower_id, author_id).await? {
            return Err(ApiError::NotSubscribed);
        }
        tracing::info!(%follower_id, %author_id, "unsubscribed");
        Ok(())
    }
}

// ── ListSubscriptions ────────────────────────────────────────────────────────

pub struct ListSubscriptionsUseCase<S: SubscriptionRepository, P: RecipeRepository> {
    pub subscriptions: S,
    pub recipes: P,
}

impl<S: SubscriptionRepository, P: RecipeRepository> ListSubscriptionsUseCase<S, P> {
    pub async fn execute(
        &self,
        follower_id: Uuid,
        page: PageRequest,
        recipes_limit: u32,
    ) -> Result<(Vec<SubscriptionView>, u64), ApiError> {
        let (authors, total) = self
            .subscriptions
            .list_authors(follower_id, page.clamped())
            .await?;
        let mut views = Vec::with_capacity(authors.len());
        for author in authors {
            views.push(subscription_view(&self.recipes, author, recipes_limit).await?);
        }
        Ok((views, total))
    }
}
