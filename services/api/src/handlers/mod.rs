pub mod health;
pub mod ingredient;
pub mod recipe;
pub mod subscription;
pub mod tag;
pub mod user;
