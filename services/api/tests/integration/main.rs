
mod catalog_test;
mod postgres_test;
mod recipe_test;
mod subscription_test;
mod toggle_test;
mod user_test;
