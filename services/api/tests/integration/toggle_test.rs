use foodgram_api::error::ApiError;
use foodgram_api::usecase::membership::{AddRecipeToSetUseCase, RemoveRecipeFromSetUseCase};
use foodgram_api::usecase::shopping_list::DownloadShoppingListUseCase;

use crate::helpers::MemoryDb;

#[tokio::test]
async fn should_conflict_on_second_favorite() {
    let db = MemoryDb::new();
    let author = db.add_user("chef_alice");
    let reader = db.add_user("hungry_bob");
    let recipe = db.add_recipe(&author, "soup", &[], &[], 5);
    let usecase = AddRecipeToSetUseCase {
        recipes: db.recipes(),
        set: db.favorites(),
    };

    let added = usecase.execute(reader.id, recipe.id).await.unwrap();
    assert_eq!(added.id, recipe.id);
    assert_eq!(db.lock().favorites, vec![(reader.id, recipe.id)]);

    let again = usecase.execute(reader.id, recipe.id).await;
    assert!(
        matches!(again, Err(ApiError::AlreadyFavorited)),
        "expected AlreadyFavorited, got {again:?}"
    );
}

#[tokio::test]
async fn should_fail_on_second_removal_from_cart() {
    let db = MemoryDb::new();
    let author = db.add_user("chef_alice");
    let reader = db.add_user("hungry_bob");
    let recipe = db.add_recipe(&author, "soup", &[], &[], 5);
    db.lock().cart.push((reader.id, recipe.id));
    let usecase = RemoveRecipeFromSetUseCase {
        recipes: db.recipes(),
        set: db.cart(),
    };

    usecase.execute(reader.id, recipe.id).await.unwrap();
    assert!(db.lock().cart.is_empty());

    let again = usecase.execute(reader.id, recipe.id).await;
    assert!(
        matches!(again, Err(ApiError::NotInShoppingCart)),
        "expected NotInShoppingCart, got {again:?}"
    );
}

#[tokio::test]
async fn should_keep_favorites_and_cart_independent() {
    let db = MemoryDb::new();
    let author = db.add_user("chef_alice");
    let reader = db.add_user("hungry_bob");
    let recipe = db.add_recipe(&author, "soup", &[], &[], 5);

    AddRecipeToSetUseCase {
        recipes: db.recipes(),
        set: db.cart(),
    }
    .execute(reader.id, recipe.id)
    .await
    .unwrap();

    let result = RemoveRecipeFromSetUseCase {
        recipes: db.recipes(),
        set: db.favorites(),
    }
    .execute(reader.id, recipe.id)
    .await;
    assert!(
        matches!(result, Err(ApiError::NotFavorited)),
        "expected NotFavorited, got {result:?}"
    );
}

#[tokio::test]
async fn should_report_missing_recipe_on_toggle() {
    let db = MemoryDb::new();
    let reader = db.add_user("hungry_bob");
    let usecase = AddRecipeToSetUseCase {
        recipes: db.recipes(),
        set: db.favorites(),
    };

    let result = usecase.execute(reader.id, 42).await;

    assert!(
        matches!(result, Err(ApiError::RecipeNotFound)),
        "expected RecipeNotFound, got {result:?}"
    );
}

// ── shopping list ────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_sum_same_ingredient_across_recipes() {
    let db = MemoryDb::new();
    let author = db.add_user("chef_alice");
    let reader = db.add_user("hungry_bob");
    let salt = db.add_ingredient("salt", "g");
    let flour = db.add_ingredient("flour", "g");
    let bread = db.add_recipe(&author, "bread", &[(salt.id, 10), (flour.id, 500)], &[], 5);
    let soup = db.add_recipe(&author, "soup", &[(salt.id, 5)], &[], 4);
    {
        let mut tables = db.lock();
        tables.cart.push((reader.id, bread.id));
        tables.cart.push((reader.id, soup.id));
    }
    let usecase = DownloadShoppingListUseCase {
        users: db.users(),
        list: db.cart(),
    };

    let file = usecase.execute(reader.id).await.unwrap();

    assert_eq!(file.filename, "hungry_bob_shopping_list.txt");
    let lines: Vec<&str> = file.body.lines().collect();
    assert_eq!(lines[0], "Shopping list for:");
    assert_eq!(lines[2], "Test");
    assert!(lines[3].starts_with("Date: "));
    assert!(lines.contains(&"flour: 500 g"));
    assert!(lines.contains(&"salt: 15 g"));
    let flour_at = lines.iter().position(|l| *l == "flour: 500 g").unwrap();
    let salt_at = lines.iter().position(|l| *l == "salt: 15 g").unwrap();
    assert!(flour_at < salt_at);
    assert_eq!(lines.last(), Some(&"Happy shopping! Your Foodgram"));
}

#[tokio::test]
async fn should_refuse_download_of_empty_cart() {
    let db = MemoryDb::new();
    let reader = db.add_user("hungry_bob");
    let usecase = DownloadShoppingListUseCase {
        users: db.users(),
        list: db.cart(),
    };

    let result = usecase.execute(reader.id).await;

    assert!(
        matches!(result, Err(ApiError::EmptyShoppingCart)),
        "expected EmptyShoppingCart, got {result:?}"
    );
}
