use foodgram_api::error::ApiError;
use foodgram_api::usecase::catalog::{
    CreateIngredientInput, CreateIngredientUseCase, CreateTagInput, CreateTagUseCase,
    GetIngredientUseCase, GetTagUseCase, ListIngredientsUseCase, ListTagsUseCase,
};

use crate::helpers::{MemoryDb, admin_identity, identity};

#[tokio::test]
async fn should_filter_ingredients_by_case_sensitive_prefix() {
    let db = MemoryDb::new();
    let tomato = db.add_ingredient("tomato", "pcs");
    db.add_ingredient("Tomato paste", "g");
    db.add_ingredient("potato", "kg");
    let tomatillo = db.add_ingredient("tomatillo", "pcs");
    let usecase = ListIngredientsUseCase {
        repo: db.ingredients(),
    };

    let found = usecase.execute(Some("tom")).await.unwrap();

    let ids: Vec<i32> = found.iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![tomato.id, tomatillo.id]);
}

#[tokio::test]
async fn should_list_all_ingredients_for_empty_name() {
    let db = MemoryDb::new();
    db.add_ingredient("tomato", "pcs");
    db.add_ingredient("potato", "kg");
    let usecase = ListIngredientsUseCase {
        repo: db.ingredients(),
    };

    assert_eq!(usecase.execute(Some("")).await.unwrap().len(), 2);
    assert_eq!(usecase.execute(None).await.unwrap().len(), 2);
}

#[tokio::test]
async fn should_report_missing_catalog_entries() {
    let db = MemoryDb::new();
    let tag = GetTagUseCase { repo: db.tags() }.execute(1).await;
    assert!(
        matches!(tag, Err(ApiError::TagNotFound)),
        "expected TagNotFound, got {tag:?}"
    );
    let ingredient = GetIngredientUseCase {
        repo: db.ingredients(),
    }
    .execute(1)
    .await;
    assert!(
        matches!(ingredient, Err(ApiError::IngredientNotFound)),
        "expected IngredientNotFound, got {ingredient:?}"
    );
}

#[tokio::test]
async fn should_sort_tags_by_name() {
    let db = MemoryDb::new();
    db.add_tag("lunch", "lunch");
    db.add_tag("breakfast", "breakfast");
    let usecase = ListTagsUseCase { repo: db.tags() };

    let names: Vec<String> = usecase
        .execute()
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();

    assert_eq!(names, vec!["breakfast", "lunch"]);
}

#[tokio::test]
async fn should_create_tag_as_admin_only() {
    let db = MemoryDb::new();
    let user = db.add_user("chef_alice");
    let usecase = CreateTagUseCase { repo: db.tags() };
    let input = || CreateTagInput {
        name: Some("  Dinner ".to_owned()),
        color: Some("#E26C2D".to_owned()),
        slug: Some("Dinner".to_owned()),
    };

    let denied = usecase.execute(&identity(&user), input()).await;
    assert!(
        matches!(denied, Err(ApiError::Forbidden)),
        "expected Forbidden, got {denied:?}"
    );

    let tag = usecase.execute(&admin_identity(), input()).await.unwrap();
    assert_eq!(tag.name, "dinner");
    assert_eq!(tag.slug, "dinner");

    let duplicate = usecase.execute(&admin_identity(), input()).await;
    assert!(
        matches!(&duplicate, Err(ApiError::Validation(e)) if e.contains("non_field_errors")),
        "expected Validation, got {duplicate:?}"
    );
}

#[tokio::test]
async fn should_lowercase_ingredient_and_reject_duplicate_pair() {
    let db = MemoryDb::new();
    let usecase = CreateIngredientUseCase {
        repo: db.ingredients(),
    };
    let input = |unit: &str| CreateIngredientInput {
        name: Some("Sea Salt".to_owned()),
        measurement_unit: Some(unit.to_owned()),
    };

    let created = usecase.execute(&admin_identity(), input("G")).await.unwrap();
    assert_eq!(created.name, "sea salt");
    assert_eq!(created.measurement_unit, "g");

    usecase
        .execute(&admin_identity(), input("pinch"))
        .await
        .unwrap();

    let duplicate = usecase.execute(&admin_identity(), input("g")).await;
    assert!(
        matches!(duplicate, Err(ApiError::Validation(_))),
        "expected Validation, got {duplicate:?}"
    );
}
