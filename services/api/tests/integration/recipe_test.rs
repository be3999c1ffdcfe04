use foodgram_api::domain::types::RecipeFilter;
use foodgram_api::domain::validation::IngredientAmountInput;
use foodgram_api::error::ApiError;
use foodgram_api::usecase::recipe::{
    CreateRecipeUseCase, DeleteRecipeUseCase, GetRecipeUseCase, ListRecipesUseCase, RecipeInput,
    UpdateRecipeUseCase,
};
use foodgram_domain::pagination::PageRequest;

use crate::helpers::{
    MemoryDb, MockImageStorage, MockIngredientRepo, MockRecipeRepo, MockTagRepo, PNG_DATA_URI,
    admin_identity, identity,
};

fn create_usecase(
    db: &MemoryDb,
    images: MockImageStorage,
) -> CreateRecipeUseCase<MockRecipeRepo, MockTagRepo, MockIngredientRepo, MockImageStorage> {
    CreateRecipeUseCase {
        recipes: db.recipes(),
        tags: db.tags(),
        ingredients: db.ingredients(),
        images,
    }
}

fn update_usecase(
    db: &MemoryDb,
) -> UpdateRecipeUseCase<MockRecipeRepo, MockTagRepo, MockIngredientRepo, MockImageStorage> {
    UpdateRecipeUseCase {
        recipes: db.recipes(),
        tags: db.tags(),
        ingredients: db.ingredients(),
        images: MockImageStorage::default(),
    }
}

fn amount(id: i32, amount: i32) -> IngredientAmountInput {
    IngredientAmountInput {
        id: Some(id),
        amount: Some(amount),
    }
}

fn valid_input(ingredient_id: i32, tag_id: i32) -> RecipeInput {
    RecipeInput {
        name: Some("Tomato soup".to_owned()),
        image: Some(PNG_DATA_URI.to_owned()),
        text: Some("Simmer for twenty minutes".to_owned()),
        cooking_time: Some(25),
        ingredients: Some(vec![amount(ingredient_id, 3)]),
        tags: Some(vec![tag_id]),
    }
}

fn field_errors(result: Result<impl std::fmt::Debug, ApiError>) -> Vec<String> {
    match result {
        Err(ApiError::Validation(errors)) => {
            let body = serde_json::to_value(&errors).unwrap();
            body.as_object().unwrap().keys().cloned().collect()
        }
        other => panic!("expected Validation, got {other:?}"),
    }
}

// ── create ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_recipe_with_links_and_stored_image() {
    let db = MemoryDb::new();
    let author = db.add_user("chef_alice");
    let tomato = db.add_ingredient("tomato", "pcs");
    let lunch = db.add_tag("lunch", "lunch");
    let images = MockImageStorage::default();
    let stored = images.stored_handle();

    let id = create_usecase(&db, images)
        .execute(author.id, valid_input(tomato.id, lunch.id))
        .await
        .unwrap();

    assert_eq!(db.recipe_amounts(id), vec![(tomato.id, 3)]);
    assert_eq!(db.recipe_tag_ids(id), vec![lunch.id]);
    let stored = stored.lock().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].bytes, b"hello");
    let recipe = db.lock().recipes[0].clone();
    assert_eq!(recipe.author_id, author.id);
    assert_eq!(recipe.image, "/media/recipes/images/1.png");
}

#[tokio::test]
async fn should_reject_missing_or_empty_links() {
    let db = MemoryDb::new();
    let author = db.add_user("chef_alice");
    let tomato = db.add_ingredient("tomato", "pcs");
    let lunch = db.add_tag("lunch", "lunch");

    let mut input = valid_input(tomato.id, lunch.id);
    input.ingredients = Some(vec![]);
    input.tags = None;
    let result = create_usecase(&db, MockImageStorage::default())
        .execute(author.id, input)
        .await;

    assert_eq!(field_errors(result), vec!["ingredients", "tags"]);
    assert!(db.lock().recipes.is_empty());
}

#[tokio::test]
async fn should_reject_repeated_ingredient() {
    let db = MemoryDb::new();
    let author = db.add_user("chef_alice");
    let tomato = db.add_ingredient("tomato", "pcs");
    let lunch = db.add_tag("lunch", "lunch");

    let mut input = valid_input(tomato.id, lunch.id);
    input.ingredients = Some(vec![amount(tomato.id, 1), amount(tomato.id, 2)]);
    let result = create_usecase(&db, MockImageStorage::default())
        .execute(author.id, input)
        .await;

    match result {
        Err(ApiError::Validation(errors)) => {
            assert_eq!(
                errors.get("ingredients"),
                Some(&["ingredients must not repeat".to_owned()][..])
            );
        }
        other => panic!("expected Validation, got {other:?}"),
    }
}

#[tokio::test]
async fn should_reject_unknown_ingredient_and_tag_without_storing_image() {
    let db = MemoryDb::new();
    let author = db.add_user("chef_alice");
    let images = MockImageStorage::default();
    let stored = images.stored_handle();

    let result = create_usecase(&db, images)
        .execute(author.id, valid_input(404, 405))
        .await;

    assert_eq!(field_errors(result), vec!["ingredients", "tags"]);
    assert!(stored.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_report_every_missing_field() {
    let db = MemoryDb::new();
    let author = db.add_user("chef_alice");

    let result = create_usecase(&db, MockImageStorage::default())
        .execute(author.id, RecipeInput::default())
        .await;

    assert_eq!(
        field_errors(result),
        vec!["cooking_time", "image", "ingredients", "name", "tags", "text"]
    );
}

#[tokio::test]
async fn should_reject_zero_cooking_time_and_amount() {
    let db = MemoryDb::new();
    let author = db.add_user("chef_alice");
    let tomato = db.add_ingredient("tomato", "pcs");
    let lunch = db.add_tag("lunch", "lunch");

    let mut input = valid_input(tomato.id, lunch.id);
    input.cooking_time = Some(0);
    input.ingredients = Some(vec![amount(tomato.id, 0)]);
    let result = create_usecase(&db, MockImageStorage::default())
        .execute(author.id, input)
        .await;

    assert_eq!(field_errors(result), vec!["cooking_time", "ingredients"]);
}

#[tokio::test]
async fn should_remove_stored_image_when_insert_fails() {
    let db = MemoryDb::new();
    let author = db.add_user("chef_alice");
    let tomato = db.add_ingredient("tomato", "pcs");
    let lunch = db.add_tag("lunch", "lunch");
    db.lock().fail_recipe_writes = true;
    let images = MockImageStorage::default();
    let removed = images.removed_handle();

    let result = create_usecase(&db, images)
        .execute(author.id, valid_input(tomato.id, lunch.id))
        .await;

    assert!(
        matches!(result, Err(ApiError::Internal(_))),
        "expected Internal, got {result:?}"
    );
    assert_eq!(*removed.lock().unwrap(), vec!["/media/recipes/images/1.png"]);
    assert!(db.lock().recipes.is_empty());
}

// ── update ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_keep_tags_when_patch_sends_empty_tag_list() {
    let db = MemoryDb::new();
    let author = db.add_user("chef_alice");
    let tomato = db.add_ingredient("tomato", "pcs");
    let lunch = db.add_tag("lunch", "lunch");
    let recipe = db.add_recipe(&author, "soup", &[(tomato.id, 2)], &[lunch.id], 5);

    let input = RecipeInput {
        ingredients: Some(vec![amount(tomato.id, 4)]),
        tags: Some(vec![]),
        ..Default::default()
    };
    let result = update_usecase(&db)
        .execute(&identity(&author), recipe.id, input)
        .await;

    assert_eq!(field_errors(result), vec!["tags"]);
    assert_eq!(db.recipe_tag_ids(recipe.id), vec![lunch.id]);
    assert_eq!(db.recipe_amounts(recipe.id), vec![(tomato.id, 2)]);
}

#[tokio::test]
async fn should_replace_links_and_keep_unsent_fields_on_patch() {
    let db = MemoryDb::new();
    let author = db.add_user("chef_alice");
    let tomato = db.add_ingredient("tomato", "pcs");
    let basil = db.add_ingredient("basil", "g");
    let lunch = db.add_tag("lunch", "lunch");
    let dinner = db.add_tag("dinner", "dinner");
    let recipe = db.add_recipe(&author, "soup", &[(tomato.id, 2)], &[lunch.id], 5);

    let input = RecipeInput {
        name: Some("Basil soup".to_owned()),
        ingredients: Some(vec![amount(basil.id, 10)]),
        tags: Some(vec![dinner.id, dinner.id]),
        ..Default::default()
    };
    update_usecase(&db)
        .execute(&identity(&author), recipe.id, input)
        .await
        .unwrap();

    assert_eq!(db.recipe_amounts(recipe.id), vec![(basil.id, 10)]);
    assert_eq!(db.recipe_tag_ids(recipe.id), vec![dinner.id]);
    let stored = db.lock().recipes[0].clone();
    assert_eq!(stored.name, "Basil soup");
    assert_eq!(stored.text, recipe.text);
    assert_eq!(stored.image, recipe.image);
}

#[tokio::test]
async fn should_forbid_update_by_other_user() {
    let db = MemoryDb::new();
    let author = db.add_user("chef_alice");
    let stranger = db.add_user("hungry_bob");
    let recipe = db.add_recipe(&author, "soup", &[], &[], 5);

    let result = update_usecase(&db)
        .execute(&identity(&stranger), recipe.id, RecipeInput::default())
        .await;

    assert!(
        matches!(result, Err(ApiError::Forbidden)),
        "expected Forbidden, got {result:?}"
    );
}

#[tokio::test]
async fn should_report_missing_recipe_before_permissions() {
    let db = MemoryDb::new();
    let stranger = db.add_user("hungry_bob");

    let result = update_usecase(&db)
        .execute(&identity(&stranger), 99, RecipeInput::default())
        .await;

    assert!(
        matches!(result, Err(ApiError::RecipeNotFound)),
        "expected RecipeNotFound, got {result:?}"
    );
}

#[tokio::test]
async fn should_remove_replacement_image_when_update_fails() {
    let db = MemoryDb::new();
    let author = db.add_user("chef_alice");
    let tomato = db.add_ingredient("tomato", "pcs");
    let lunch = db.add_tag("lunch", "lunch");
    let recipe = db.add_recipe(&author, "soup", &[(tomato.id, 2)], &[lunch.id], 5);
    db.lock().fail_recipe_writes = true;
    let images = MockImageStorage::default();
    let removed = images.removed_handle();
    let usecase = UpdateRecipeUseCase {
        recipes: db.recipes(),
        tags: db.tags(),
        ingredients: db.ingredients(),
        images,
    };

    let input = RecipeInput {
        image: Some(PNG_DATA_URI.to_owned()),
        ingredients: Some(vec![amount(tomato.id, 4)]),
        tags: Some(vec![lunch.id]),
        ..Default::default()
    };
    let result = usecase.execute(&identity(&author), recipe.id, input).await;

    assert!(
        matches!(result, Err(ApiError::Internal(_))),
        "expected Internal, got {result:?}"
    );
    assert_eq!(*removed.lock().unwrap(), vec!["/media/recipes/images/1.png"]);
    assert_eq!(db.lock().recipes[0].image, recipe.image);
}

// ── delete ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_let_admin_delete_any_recipe() {
    let db = MemoryDb::new();
    let author = db.add_user("chef_alice");
    let recipe = db.add_recipe(&author, "soup", &[], &[], 5);
    let usecase = DeleteRecipeUseCase {
        recipes: db.recipes(),
    };

    usecase.execute(&admin_identity(), recipe.id).await.unwrap();

    assert!(db.lock().recipes.is_empty());
    let again = usecase.execute(&admin_identity(), recipe.id).await;
    assert!(
        matches!(again, Err(ApiError::RecipeNotFound)),
        "expected RecipeNotFound, got {again:?}"
    );
}

#[tokio::test]
async fn should_forbid_delete_by_other_user() {
    let db = MemoryDb::new();
    let author = db.add_user("chef_alice");
    let stranger = db.add_user("hungry_bob");
    let recipe = db.add_recipe(&author, "soup", &[], &[], 5);
    let usecase = DeleteRecipeUseCase {
        recipes: db.recipes(),
    };

    let result = usecase.execute(&identity(&stranger), recipe.id).await;

    assert!(
        matches!(result, Err(ApiError::Forbidden)),
        "expected Forbidden, got {result:?}"
    );
    assert_eq!(db.lock().recipes.len(), 1);
}

// ── read ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_list_newest_first_filtered_by_any_tag() {
    let db = MemoryDb::new();
    let author = db.add_user("chef_alice");
    let lunch = db.add_tag("lunch", "lunch");
    let dinner = db.add_tag("dinner", "dinner");
    let snack = db.add_tag("snack", "snack");
    let old = db.add_recipe(&author, "old", &[], &[lunch.id], 30);
    let new = db.add_recipe(&author, "new", &[], &[dinner.id], 1);
    db.add_recipe(&author, "other", &[], &[snack.id], 10);
    let usecase = ListRecipesUseCase {
        recipes: db.recipes(),
        favorites: db.favorites(),
        cart: db.cart(),
        subscriptions: db.subscriptions(),
    };

    let filter = RecipeFilter::new(
        vec!["lunch".to_owned(), "dinner".to_owned()],
        None,
        false,
        false,
        None,
    );
    let (views, total) = usecase
        .execute(None, filter, PageRequest::default())
        .await
        .unwrap();

    assert_eq!(total, 2);
    let ids: Vec<i32> = views.iter().map(|v| v.recipe.id).collect();
    assert_eq!(ids, vec![new.id, old.id]);
}

#[tokio::test]
async fn should_ignore_membership_filters_for_anonymous_viewer() {
    let db = MemoryDb::new();
    let author = db.add_user("chef_alice");
    let reader = db.add_user("hungry_bob");
    let liked = db.add_recipe(&author, "liked", &[], &[], 2);
    db.add_recipe(&author, "plain", &[], &[], 1);
    db.lock().favorites.push((reader.id, liked.id));
    let usecase = ListRecipesUseCase {
        recipes: db.recipes(),
        favorites: db.favorites(),
        cart: db.cart(),
        subscriptions: db.subscriptions(),
    };

    let anonymous = RecipeFilter::new(vec![], None, true, true, None);
    let (views, total) = usecase
        .execute(None, anonymous, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(total, 2);
    assert!(views.iter().all(|v| !v.is_favorited && !v.is_in_shopping_cart));

    let signed_in = RecipeFilter::new(vec![], None, true, false, Some(reader.id));
    let (views, total) = usecase
        .execute(Some(reader.id), signed_in, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(views[0].recipe.id, liked.id);
    assert!(views[0].is_favorited);
}

#[tokio::test]
async fn should_page_recipe_list() {
    let db = MemoryDb::new();
    let author = db.add_user("chef_alice");
    for age in 0..5 {
        db.add_recipe(&author, &format!("r{age}"), &[], &[], age);
    }
    let usecase = ListRecipesUseCase {
        recipes: db.recipes(),
        favorites: db.favorites(),
        cart: db.cart(),
        subscriptions: db.subscriptions(),
    };

    let (views, total) = usecase
        .execute(
            None,
            RecipeFilter::default(),
            PageRequest { limit: 2, page: 3 },
        )
        .await
        .unwrap();

    assert_eq!(total, 5);
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].recipe.name, "r4");
}

#[tokio::test]
async fn should_flag_viewer_relations_on_single_recipe() {
    let db = MemoryDb::new();
    let author = db.add_user("chef_alice");
    let reader = db.add_user("hungry_bob");
    let tomato = db.add_ingredient("tomato", "pcs");
    let recipe = db.add_recipe(&author, "soup", &[(tomato.id, 2)], &[], 5);
    {
        let mut tables = db.lock();
        tables.cart.push((reader.id, recipe.id));
        tables.subscriptions.push((reader.id, author.id));
    }
    let usecase = GetRecipeUseCase {
        recipes: db.recipes(),
        favorites: db.favorites(),
        cart: db.cart(),
        subscriptions: db.subscriptions(),
    };

    let view = usecase.execute(Some(reader.id), recipe.id).await.unwrap();
    assert!(!view.is_favorited);
    assert!(view.is_in_shopping_cart);
    assert!(view.author.is_subscribed);
    assert_eq!(view.ingredients[0].ingredient.name, "tomato");
    assert_eq!(view.ingredients[0].amount, 2);

    let anonymous = usecase.execute(None, recipe.id).await.unwrap();
    assert!(!anonymous.is_in_shopping_cart);
    assert!(!anonymous.author.is_subscribed);

    let missing = usecase.execute(None, 999).await;
    assert!(
        matches!(missing, Err(ApiError::RecipeNotFound)),
        "expected RecipeNotFound, got {missing:?}"
    );
}
