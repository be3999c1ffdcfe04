use std::collections::{HashMap, HashSet};

use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Statement, TransactionTrait,
    sea_query::{Expr, Query},
};
use uuid::Uuid;

use foodgram_api_schema::{
    favorites, ingredients, recipe_ingredients, recipe_tags, recipes, shopping_cart_entries,
    subscriptions, tags, users,
};
use foodgram_core::sea_ext::DbErrExt as _;
use foodgram_domain::pagination::PageRequest;
use foodgram_domain::user::UserRole;

use crate::domain::repository::{
    IngredientRepository, RecipeMembershipRepository, RecipeRepository, ShoppingListRepository,
    SubscriptionRepository, TagRepository, UserRepository,
};
use crate::domain::types::{
    Ingredient, IngredientAmount, Membership, NewIngredient, NewTag, ProfileChanges, Recipe,
    RecipeChanges, RecipeDetails, RecipeDraft, RecipeFilter, RecipeIngredient, ShoppingListItem,
    Tag, User,
};
use crate::error::ApiError;

/// `Ok(false)` when the write was rejected by a unique constraint.
fn write_outcome<T>(result: Result<T, DbErr>, action: &'static str) -> Result<bool, ApiError> {
    match result {
        Ok(_) => Ok(true),
        Err(err) if err.is_unique_violation() => Ok(false),
        Err(err) => Err(anyhow::Error::new(err).context(action).into()),
    }
}

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl DbUserRepository {
    async fn column_taken(
        &self,
        column: users::Column,
        value: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, ApiError> {
        let mut query = users::Entity::find().filter(column.eq(value));
        if let Some(exclude) = exclude {
            query = query.filter(users::Column::Id.ne(exclude));
        }
        let count = query
            .count(&self.db)
            .await
            .context("check user uniqueness")?;
        Ok(count > 0)
    }
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn list(&self, page: PageRequest) -> Result<(Vec<User>, u64), ApiError> {
        let query = users::Entity::find();
        let total = query.clone().count(&self.db).await.context("count users")?;
        let models = query
            .order_by_asc(users::Column::Id)
            .offset(page.offset())
            .limit(u64::from(page.limit))
            .all(&self.db)
            .await
            .context("list users")?;
        Ok((models.into_iter().map(user_from_model).collect(), total))
    }

    async fn username_taken(
        &self,
        username: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, ApiError> {
        self.column_taken(users::Column::Username, username, exclude)
            .await
    }

    async fn email_taken(&self, email: &str, exclude: Option<Uuid>) -> Result<bool, ApiError> {
        self.column_taken(users::Column::Email, email, exclude).await
    }

    async fn create(&self, user: &User) -> Result<bool, ApiError> {
        let result = users::ActiveModel {
            id: Set(user.id),
            username: Set(user.username.clone()),
            email: Set(user.email.clone()),
            first_name: Set(user.first_name.clone()),
            last_name: Set(user.last_name.clone()),
            password_hash: Set(user.password_hash.clone()),
            role: Set(i16::from(user.role.as_u8())),
            created_at: Set(user.created_at),
        }
        .insert(&self.db)
        .await;
        write_outcome(result, "create user")
    }

    async fn update_profile(
        &self,
        id: Uuid,
        changes: &ProfileChanges,
    ) -> Result<bool, ApiError> {
        if changes.is_empty() {
            return Ok(true);
        }
        let mut am = users::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(username) = &changes.username {
            am.username = Set(username.clone());
        }
        if let Some(email) = &changes.email {
            am.email = Set(email.clone());
        }
        if let Some(first_name) = &changes.first_name {
            am.first_name = Set(first_name.clone());
        }
        if let Some(last_name) = &changes.last_name {
            am.last_name = Set(last_name.clone());
        }
        write_outcome(am.update(&self.db).await, "update user profile")
    }

    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> Result<(), ApiError> {
        users::ActiveModel {
            id: Set(id),
            password_hash: Set(password_hash.to_owned()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update password hash")?;
        Ok(())
    }
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        username: model.username,
        email: model.email,
        first_name: model.first_name,
        last_name: model.last_name,
        password_hash: model.password_hash,
        role: u8::try_from(model.role)
            .ok()
            .and_then(UserRole::from_u8)
            .unwrap_or_default(),
        created_at: model.created_at,
    }
}

// ── Tag repository ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbTagRepository {
    pub db: DatabaseConnection,
}

impl TagRepository for DbTagRepository {
    async fn list(&self) -> Result<Vec<Tag>, ApiError> {
        let models = tags::Entity::find()
            .order_by_asc(tags::Column::Name)
            .all(&self.db)
            .await
            .context("list tags")?;
        Ok(models.into_iter().map(tag_from_model).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Tag>, ApiError> {
        let model = tags::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find tag by id")?;
        Ok(model.map(tag_from_model))
    }

    async fn existing_ids(&self, ids: &[i32]) -> Result<HashSet<i32>, ApiError> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }
        let found: Vec<i32> = tags::Entity::find()
            .select_only()
            .column(tags::Column::Id)
            .filter(tags::Column::Id.is_in(ids.iter().copied()))
            .into_tuple()
            .all(&self.db)
            .await
            .context("find existing tag ids")?;
        Ok(found.into_iter().collect())
    }

    async fn create(&self, tag: &NewTag) -> Result<Option<Tag>, ApiError> {
        let result = tags::ActiveModel {
            name: Set(tag.name.clone()),
            color: Set(tag.color.clone()),
            slug: Set(tag.slug.clone()),
            ..Default::default()
        }
        .insert(&self.db)
        .await;
        match result {
            Ok(model) => Ok(Some(tag_from_model(model))),
            Err(err) if err.is_unique_violation() => Ok(None),
            Err(err) => Err(anyhow::Error::new(err).context("create tag").into()),
        }
    }
}

fn tag_from_model(model: tags::Model) -> Tag {
    Tag {
        id: model.id,
        name: model.name,
        color: model.color,
        slug: model.slug,
    }
}

// ── Ingredient repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbIngredientRepository {
    pub db: DatabaseConnection,
}

/// Escape `LIKE` wildcards so the prefix matches literally.
fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

impl IngredientRepository for DbIngredientRepository {
    async fn list(&self, name_prefix: Option<&str>) -> Result<Vec<Ingredient>, ApiError> {
        let mut query = ingredients::Entity::find();
        if let Some(prefix) = name_prefix {
            query = query.filter(ingredients::Column::Name.starts_with(escape_like(prefix)));
        }
        let models = query
            .order_by_asc(ingredients::Column::Id)
            .all(&self.db)
            .await
            .context("list ingredients")?;
        Ok(models.into_iter().map(ingredient_from_model).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Ingredient>, ApiError> {
        let model = ingredients::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find ingredient by id")?;
        Ok(model.map(ingredient_from_model))
    }

    async fn existing_ids(&self, ids: &[i32]) -> Result<HashSet<i32>, ApiError> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }
        let found: Vec<i32> = ingredients::Entity::find()
            .select_only()
            .column(ingredients::Column::Id)
            .filter(ingredients::Column::Id.is_in(ids.iter().copied()))
            .into_tuple()
            .all(&self.db)
            .await
            .context("find existing ingredient ids")?;
        Ok(found.into_iter().collect())
    }

    async fn create(&self, ingredient: &NewIngredient) -> Result<Option<Ingredient>, ApiError> {
        let result = ingredients::ActiveModel {
            name: Set(ingredient.name.clone()),
            measurement_unit: Set(ingredient.measurement_unit.clone()),
            ..Default::default()
        }
        .insert(&self.db)
        .await;
        match result {
            Ok(model) => Ok(Some(ingredient_from_model(model))),
            Err(err) if err.is_unique_violation() => Ok(None),
            Err(err) => Err(anyhow::Error::new(err).context("create ingredient").into()),
        }
    }
}

fn ingredient_from_model(model: ingredients::Model) -> Ingredient {
    Ingredient {
        id: model.id,
        name: model.name,
        measurement_unit: model.measurement_unit,
    }
}

// ── Recipe repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbRecipeRepository {
    pub db: DatabaseConnection,
}

fn filtered_recipes(filter: &RecipeFilter) -> Select<recipes::Entity> {
    let mut query = recipes::Entity::find();
    if !filter.tags.is_empty() {
        query = query.filter(
            recipes::Column::Id.in_subquery(
                Query::select()
                    .column(recipe_tags::Column::RecipeId)
                    .from(recipe_tags::Entity)
                    .inner_join(
                        tags::Entity,
                        Expr::col((tags::Entity, tags::Column::Id))
                            .equals((recipe_tags::Entity, recipe_tags::Column::TagId)),
                    )
                    .and_where(
                        Expr::col((tags::Entity, tags::Column::Slug))
                            .is_in(filter.tags.iter().cloned()),
                    )
                    .to_owned(),
            ),
        );
    }
    if let Some(author) = filter.author {
        query = query.filter(recipes::Column::AuthorId.eq(author));
    }
    if let Some(user_id) = filter.favorited_by {
        query = query.filter(
            recipes::Column::Id.in_subquery(
                Query::select()
                    .column(favorites::Column::RecipeId)
                    .from(favorites::Entity)
                    .and_where(Expr::col(favorites::Column::UserId).eq(user_id))
                    .to_owned(),
            ),
        );
    }
    if let Some(user_id) = filter.in_cart_of {
        query = query.filter(
            recipes::Column::Id.in_subquery(
                Query::select()
                    .column(shopping_cart_entries::Column::RecipeId)
                    .from(shopping_cart_entries::Entity)
                    .and_where(Expr::col(shopping_cart_entries::Column::UserId).eq(user_id))
                    .to_owned(),
            ),
        );
    }
    query
}

/// Attach authors, tags and ingredient amounts, keeping the input order.
async fn load_details<C: ConnectionTrait>(
    db: &C,
    models: Vec<recipes::Model>,
) -> Result<Vec<RecipeDetails>, ApiError> {
    if models.is_empty() {
        return Ok(Vec::new());
    }
    let recipe_ids: Vec<i32> = models.iter().map(|m| m.id).collect();
    let mut author_ids: Vec<Uuid> = models.iter().map(|m| m.author_id).collect();
    author_ids.sort_unstable();
    author_ids.dedup();

    let authors: HashMap<Uuid, User> = users::Entity::find()
        .filter(users::Column::Id.is_in(author_ids))
        .all(db)
        .await
        .context("load recipe authors")?
        .into_iter()
        .map(|m| (m.id, user_from_model(m)))
        .collect();

    let mut tags_by_recipe: HashMap<i32, Vec<Tag>> = HashMap::new();
    let tag_rows = recipe_tags::Entity::find()
        .filter(recipe_tags::Column::RecipeId.is_in(recipe_ids.iter().copied()))
        .order_by_asc(recipe_tags::Column::TagId)
        .find_also_related(tags::Entity)
        .all(db)
        .await
        .context("load recipe tags")?;
    for (link, tag) in tag_rows {
        if let Some(tag) = tag {
            tags_by_recipe
                .entry(link.recipe_id)
                .or_default()
                .push(tag_from_model(tag));
        }
    }

    let mut ingredients_by_recipe: HashMap<i32, Vec<RecipeIngredient>> = HashMap::new();
    let ingredient_rows = recipe_ingredients::Entity::find()
        .filter(recipe_ingredients::Column::RecipeId.is_in(recipe_ids.iter().copied()))
        .order_by_asc(recipe_ingredients::Column::IngredientId)
        .find_also_related(ingredients::Entity)
        .all(db)
        .await
        .context("load recipe ingredients")?;
    for (link, ingredient) in ingredient_rows {
        if let Some(ingredient) = ingredient {
            ingredients_by_recipe
                .entry(link.recipe_id)
                .or_default()
                .push(RecipeIngredient {
                    ingredient: ingredient_from_model(ingredient),
                    amount: link.amount,
                });
        }
    }

    models
        .into_iter()
        .map(|model| -> Result<RecipeDetails, ApiError> {
            let author = authors
                .get(&model.author_id)
                .cloned()
                .with_context(|| format!("author of recipe {} is missing", model.id))?;
            Ok(RecipeDetails {
                tags: tags_by_recipe.remove(&model.id).unwrap_or_default(),
                ingredients: ingredients_by_recipe.remove(&model.id).unwrap_or_default(),
                author,
                recipe: recipe_from_model(model),
            })
        })
        .collect()
}

async fn insert_links(
    txn: &DatabaseTransaction,
    recipe_id: i32,
    amounts: &[IngredientAmount],
    tag_ids: &[i32],
) -> Result<(), DbErr> {
    if !amounts.is_empty() {
        recipe_ingredients::Entity::insert_many(amounts.iter().map(|a| {
            recipe_ingredients::ActiveModel {
                recipe_id: Set(recipe_id),
                ingredient_id: Set(a.ingredient_id),
                amount: Set(a.amount),
            }
        }))
        .exec_without_returning(txn)
        .await?;
    }
    if !tag_ids.is_empty() {
        recipe_tags::Entity::insert_many(tag_ids.iter().map(|&tag_id| recipe_tags::ActiveModel {
            recipe_id: Set(recipe_id),
            tag_id: Set(tag_id),
        }))
        .exec_without_returning(txn)
        .await?;
    }
    Ok(())
}

impl RecipeRepository for DbRecipeRepository {
    async fn list(
        &self,
        filter: &RecipeFilter,
        page: PageRequest,
    ) -> Result<(Vec<RecipeDetails>, u64), ApiError> {
        let query = filtered_recipes(filter);
        let total = query
            .clone()
            .count(&self.db)
            .await
            .context("count recipes")?;
        let models = query
            .order_by_desc(recipes::Column::PubDate)
            .order_by_desc(recipes::Column::Id)
            .offset(page.offset())
            .limit(u64::from(page.limit))
            .all(&self.db)
            .await
            .context("list recipes")?;
        Ok((load_details(&self.db, models).await?, total))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Recipe>, ApiError> {
        let model = recipes::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find recipe by id")?;
        Ok(model.map(recipe_from_model))
    }

    async fn find_details(&self, id: i32) -> Result<Option<RecipeDetails>, ApiError> {
        let Some(model) = recipes::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find recipe by id")?
        else {
            return Ok(None);
        };
        Ok(load_details(&self.db, vec![model]).await?.pop())
    }

    async fn create(&self, author_id: Uuid, draft: &RecipeDraft) -> Result<i32, ApiError> {
        let id = self
            .db
            .transaction::<_, i32, DbErr>(|txn| {
                let draft = draft.clone();
                Box::pin(async move {
                    let recipe = recipes::ActiveModel {
                        author_id: Set(author_id),
                        name: Set(draft.name),
                        image: Set(draft.image),
                        text: Set(draft.text),
                        cooking_time: Set(draft.cooking_time),
                        pub_date: Set(Utc::now()),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;
                    insert_links(txn, recipe.id, &draft.ingredients, &draft.tags).await?;
                    Ok(recipe.id)
                })
            })
            .await
            .context("create recipe")?;
        Ok(id)
    }

    async fn update(&self, id: i32, changes: &RecipeChanges) -> Result<(), ApiError> {
        self.db
            .transaction::<_, (), DbErr>(|txn| {
                let changes = changes.clone();
                Box::pin(async move {
                    let mut am = recipes::ActiveModel {
                        id: Set(id),
                        ..Default::default()
                    };
                    let mut dirty = false;
                    if let Some(name) = changes.name {
                        am.name = Set(name);
                        dirty = true;
                    }
                    if let Some(image) = changes.image {
                        am.image = Set(image);
                        dirty = true;
                    }
                    if let Some(text) = changes.text {
                        am.text = Set(text);
                        dirty = true;
                    }
                    if let Some(cooking_time) = changes.cooking_time {
                        am.cooking_time = Set(cooking_time);
                        dirty = true;
                    }
                    if dirty {
                        am.update(txn).await?;
                    }

                    // Replace both link sets wholesale.
                    recipe_ingredients::Entity::delete_many()
                        .filter(recipe_ingredients::Column::RecipeId.eq(id))
                        .exec(txn)
                        .await?;
                    recipe_tags::Entity::delete_many()
                        .filter(recipe_tags::Column::RecipeId.eq(id))
                        .exec(txn)
                        .await?;
                    insert_links(txn, id, &changes.ingredients, &changes.tags).await?;
                    Ok(())
                })
            })
            .await
            .context("update recipe")?;
        Ok(())
    }

    async fn delete(&self, id: i32) -> Result<bool, ApiError> {
        let result = recipes::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete recipe")?;
        Ok(result.rows_affected > 0)
    }

    async fn list_by_author(&self, author_id: Uuid, limit: u32) -> Result<Vec<Recipe>, ApiError> {
        let models = recipes::Entity::find()
            .filter(recipes::Column::AuthorId.eq(author_id))
            .order_by_desc(recipes::Column::PubDate)
            .order_by_desc(recipes::Column::Id)
            .limit(u64::from(limit))
            .all(&self.db)
            .await
            .context("list recipes by author")?;
        Ok(models.into_iter().map(recipe_from_model).collect())
    }

    async fn count_by_author(&self, author_id: Uuid) -> Result<u64, ApiError> {
        let count = recipes::Entity::find()
            .filter(recipes::Column::AuthorId.eq(author_id))
            .count(&self.db)
            .await
            .context("count recipes by author")?;
        Ok(count)
    }
}

fn recipe_from_model(model: recipes::Model) -> Recipe {
    Recipe {
        id: model.id,
        author_id: model.author_id,
        name: model.name,
        image: model.image,
        text: model.text,
        cooking_time: model.cooking_time,
        pub_date: model.pub_date,
    }
}

// ── Favorite repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbFavoriteRepository {
    pub db: DatabaseConnection,
}

impl RecipeMembershipRepository for DbFavoriteRepository {
    fn membership(&self) -> Membership {
        Membership::Favorite
    }

    async fn add(&self, user_id: Uuid, recipe_id: i32) -> Result<bool, ApiError> {
        let existing = favorites::Entity::find_by_id((user_id, recipe_id))
            .one(&self.db)
            .await
            .context("find favorite")?;
        if existing.is_some() {
            return Ok(false);
        }
        let result = favorites::ActiveModel {
            user_id: Set(user_id),
            recipe_id: Set(recipe_id),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await;
        write_outcome(result, "insert favorite")
    }

    async fn remove(&self, user_id: Uuid, recipe_id: i32) -> Result<bool, ApiError> {
        let result = favorites::Entity::delete_many()
            .filter(favorites::Column::UserId.eq(user_id))
            .filter(favorites::Column::RecipeId.eq(recipe_id))
            .exec(&self.db)
            .await
            .context("delete favorite")?;
        Ok(result.rows_affected > 0)
    }

    async fn recipe_ids_among(
        &self,
        user_id: Uuid,
        recipe_ids: &[i32],
    ) -> Result<HashSet<i32>, ApiError> {
        if recipe_ids.is_empty() {
            return Ok(HashSet::new());
        }
        let found: Vec<i32> = favorites::Entity::find()
            .select_only()
            .column(favorites::Column::RecipeId)
            .filter(favorites::Column::UserId.eq(user_id))
            .filter(favorites::Column::RecipeId.is_in(recipe_ids.iter().copied()))
            .into_tuple()
            .all(&self.db)
            .await
            .context("find favorited recipe ids")?;
        Ok(found.into_iter().collect())
    }
}

// ── Shopping cart repository ─────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbShoppingCartRepository {
    pub db: DatabaseConnection,
}

impl RecipeMembershipRepository for DbShoppingCartRepository {
    fn membership(&self) -> Membership {
        Membership::ShoppingCart
    }

    async fn add(&self, user_id: Uuid, recipe_id: i32) -> Result<bool, ApiError> {
        let existing = shopping_cart_entries::Entity::find_by_id((user_id, recipe_id))
            .one(&self.db)
            .await
            .context("find shopping cart entry")?;
        if existing.is_some() {
            return Ok(false);
        }
        let result = shopping_cart_entries::ActiveModel {
            user_id: Set(user_id),
            recipe_id: Set(recipe_id),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await;
        write_outcome(result, "insert shopping cart entry")
    }

    async fn remove(&self, user_id: Uuid, recipe_id: i32) -> Result<bool, ApiError> {
        let result = shopping_cart_entries::Entity::delete_many()
            .filter(shopping_cart_entries::Column::UserId.eq(user_id))
            .filter(shopping_cart_entries::Column::RecipeId.eq(recipe_id))
            .exec(&self.db)
            .await
            .context("delete shopping cart entry")?;
        Ok(result.rows_affected > 0)
    }

    async fn recipe_ids_among(
        &self,
        user_id: Uuid,
        recipe_ids: &[i32],
    ) -> Result<HashSet<i32>, ApiError> {
        if recipe_ids.is_empty() {
            return Ok(HashSet::new());
        }
        let found: Vec<i32> = shopping_cart_entries::Entity::find()
            .select_only()
            .column(shopping_cart_entries::Column::RecipeId)
            .filter(shopping_cart_entries::Column::UserId.eq(user_id))
            .filter(shopping_cart_entries::Column::RecipeId.is_in(recipe_ids.iter().copied()))
            .into_tuple()
            .all(&self.db)
            .await
            .context("find recipe ids in shopping cart")?;
        Ok(found.into_iter().collect())
    }
}

impl ShoppingListRepository for DbShoppingCartRepository {
    async fn has_entries(&self, user_id: Uuid) -> Result<bool, ApiError> {
        let count = shopping_cart_entries::Entity::find()
            .filter(shopping_cart_entries::Column::UserId.eq(user_id))
            .count(&self.db)
            .await
            .context("count shopping cart entries")?;
        Ok(count > 0)
    }

    async fn aggregate(&self, user_id: Uuid) -> Result<Vec<ShoppingListItem>, ApiError> {
        #[derive(Debug, FromQueryResult)]
        struct ShoppingListRow {
            name: String,
            measurement_unit: String,
            amount: i64,
        }

        let rows = ShoppingListRow::find_by_statement(Statement::from_sql_and_values(
            self.db.get_database_backend(),
            r#"
            SELECT i.name AS name,
                   i.measurement_unit AS measurement_unit,
                   SUM(ri.amount)::BIGINT AS amount
            FROM shopping_cart_entries sc
            JOIN recipe_ingredients ri ON ri.recipe_id = sc.recipe_id
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE sc.user_id = $1
            GROUP BY i.name, i.measurement_unit
            ORDER BY i.name, i.measurement_unit
            "#,
            [user_id.into()],
        ))
        .all(&self.db)
        .await
        .context("aggregate shopping list")?;

        Ok(rows
            .into_iter()
            .map(|row| ShoppingListItem {
                name: row.name,
                measurement_unit: row.measurement_unit,
                amount: row.amount,
            })
            .collect())
    }
}

// ── Subscription repository ──────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbSubscriptionRepository {
    pub db: DatabaseConnection,
}

impl SubscriptionRepository for DbSubscriptionRepository {
    async fn add(&self, follower_id: Uuid, author_id: Uuid) -> Result<bool, ApiError> {
        let existing = subscriptions::Entity::find_by_id((follower_id, author_id))
            .one(&self.db)
            .await
            .context("find subscription")?;
        if existing.is_some() {
            return Ok(false);
        }
        let result = subscriptions::ActiveModel {
            user_id: Set(follower_id),
            author_id: Set(author_id),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await;
        write_outcome(result, "insert subscription")
    }

    async fn remove(&self, follower_id: Uuid, author_id: Uuid) -> Result<bool, ApiError> {
        let result = subscriptions::Entity::delete_many()
            .filter(subscriptions::Column::UserId.eq(follower_id))
            .filter(subscriptions::Column::AuthorId.eq(author_id))
            .exec(&self.db)
            .await
            .context("delete subscription")?;
        Ok(result.rows_affected > 0)
    }

    async fn list_authors(
        &self,
        follower_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<User>, u64), ApiError> {
        let query = users::Entity::find().filter(
            users::Column::Id.in_subquery(
                Query::select()
                    .column(subscriptions::Column::AuthorId)
                    .from(subscriptions::Entity)
                    .and_where(Expr::col(subscriptions::Column::UserId).eq(follower_id))
                    .to_owned(),
            ),
        );
        let total = query
            .clone()
            .count(&self.db)
            .await
            .context("count followed authors")?;
        let models = query
            .order_by_asc(users::Column::Id)
            .offset(page.offset())
            .limit(u64::from(page.limit))
            .all(&self.db)
            .await
            .context("list followed authors")?;
        Ok((models.into_iter().map(user_from_model).collect(), total))
    }

    async fn author_ids_among(
        &self,
        follower_id: Uuid,
        author_ids: &[Uuid],
    ) -> Result<HashSet<Uuid>, ApiError> {
        if author_ids.is_empty() {
            return Ok(HashSet::new());
        }
        let found: Vec<Uuid> = subscriptions::Entity::find()
            .select_only()
            .column(subscriptions::Column::AuthorId)
            .filter(subscriptions::Column::UserId.eq(follower_id))
            .filter(subscriptions::Column::AuthorId.is_in(author_ids.iter().copied()))
            .into_tuple()
            .all(&self.db)
            .await
            .context("find followed author ids")?;
        Ok(found.into_iter().collect())
    }
}
