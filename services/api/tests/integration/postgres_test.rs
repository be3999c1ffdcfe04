//! Repository SQL against a real Postgres.
//!
//! Ignored by default. Point `FOODGRAM_TEST_DATABASE_URL` at a throwaway
//! database (every table is dropped and recreated) and run with
//! `cargo test -- --ignored`.

use chrono::Utc;
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

use foodgram_api::domain::repository::{
    IngredientRepository, RecipeMembershipRepository, RecipeRepository, ShoppingListRepository,
    UserRepository,
};
use foodgram_api::domain::types::{
    Ingredient, IngredientAmount, NewIngredient, RecipeDraft, ShoppingListItem, User,
};
use foodgram_api::infra::db::{
    DbIngredientRepository, DbRecipeRepository, DbShoppingCartRepository, DbUserRepository,
};
use foodgram_api_migration::Migrator;
use foodgram_domain::user::UserRole;

async fn fresh_database() -> DatabaseConnection {
    let url = std::env::var("FOODGRAM_TEST_DATABASE_URL")
        .expect("FOODGRAM_TEST_DATABASE_URL must point at a test database");
    let db = Database::connect(&url).await.unwrap();
    Migrator::fresh(&db).await.unwrap();
    db
}

async fn ingredient(repo: &DbIngredientRepository, name: &str, unit: &str) -> Ingredient {
    repo.create(&NewIngredient {
        name: name.to_owned(),
        measurement_unit: unit.to_owned(),
    })
    .await
    .unwrap()
    .unwrap()
}

fn draft(name: &str, ingredients: &[(i32, i32)]) -> RecipeDraft {
    RecipeDraft {
        name: name.to_owned(),
        image: format!("/media/recipes/images/{name}.png"),
        text: "Mix and serve.".to_owned(),
        cooking_time: 10,
        ingredients: ingredients
            .iter()
            .map(|&(ingredient_id, amount)| IngredientAmount {
                ingredient_id,
                amount,
            })
            .collect(),
        tags: vec![],
    }
}

#[tokio::test]
#[ignore = "needs FOODGRAM_TEST_DATABASE_URL"]
async fn should_sum_cart_and_match_literal_prefix_in_postgres() {
    let db = fresh_database().await;
    let users = DbUserRepository { db: db.clone() };
    let ingredients = DbIngredientRepository { db: db.clone() };
    let recipes = DbRecipeRepository { db: db.clone() };
    let cart = DbShoppingCartRepository { db: db.clone() };

    let cook = User {
        id: Uuid::now_v7(),
        username: "home_cook".to_owned(),
        email: "cook@example.com".to_owned(),
        first_name: "Ann".to_owned(),
        last_name: "Lee".to_owned(),
        password_hash: "plain:password123".to_owned(),
        role: UserRole::User,
        created_at: Utc::now(),
    };
    assert!(users.create(&cook).await.unwrap());

    let salt = ingredient(&ingredients, "salt", "g").await;
    let tomato = ingredient(&ingredients, "tomato", "pcs").await;
    ingredient(&ingredients, "Tomato paste", "g").await;
    let tofu = ingredient(&ingredients, "to_fu", "g").await;

    let soup = recipes
        .create(cook.id, &draft("soup", &[(salt.id, 10), (tomato.id, 2)]))
        .await
        .unwrap();
    let bread = recipes
        .create(cook.id, &draft("bread", &[(salt.id, 5)]))
        .await
        .unwrap();
    assert!(cart.add(cook.id, soup).await.unwrap());
    assert!(cart.add(cook.id, bread).await.unwrap());
    assert!(!cart.add(cook.id, bread).await.unwrap());

    let items = cart.aggregate(cook.id).await.unwrap();
    assert_eq!(
        items,
        vec![
            ShoppingListItem {
                name: "salt".to_owned(),
                measurement_unit: "g".to_owned(),
                amount: 15,
            },
            ShoppingListItem {
                name: "tomato".to_owned(),
                measurement_unit: "pcs".to_owned(),
                amount: 2,
            },
        ]
    );

    let found: Vec<i32> = ingredients
        .list(Some("tom"))
        .await
        .unwrap()
        .iter()
        .map(|i| i.id)
        .collect();
    assert_eq!(found, vec![tomato.id]);

    let found: Vec<i32> = ingredients
        .list(Some("to_"))
        .await
        .unwrap()
        .iter()
        .map(|i| i.id)
        .collect();
    assert_eq!(found, vec![tofu.id]);
}
