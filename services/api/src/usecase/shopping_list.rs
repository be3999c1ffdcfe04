use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::repository::{ShoppingListRepository, UserRepository};
use crate::domain::types::ShoppingListItem;
use crate::error::ApiError;

const DATE_TIME_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Rendered shopping list ready to be sent as an attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListFile {
    pub filename: String,
    pub body: String,
}

/// Header with the owner's first name and timestamp, one
/// `"<name>: <amount> <unit>"` line per item, then a closing line.
pub fn render_shopping_list(
    first_name: &str,
    generated_at: DateTime<Utc>,
    items: &[ShoppingListItem],
) -> String {
    let mut lines = Vec::with_capacity(items.len() + 2);
    lines.push(format!(
        "Shopping list for:\n\n{first_name}\nDate: {}\n",
        generated_at.format(DATE_TIME_FORMAT)
    ));
    for item in items {
        lines.push(format!(
            "{}: {} {}",
            item.name, item.amount, item.measurement_unit
        ));
    }
    lines.push("\nHappy shopping! Your Foodgram".to_owned());
    lines.join("\n")
}

pub struct DownloadShoppingListUseCase<U: UserRepository, L: ShoppingListRepository> {
    pub users: U,
    pub list: L,
}

impl<U: UserRepository, L: ShoppingListRepository> DownloadShoppingListUseCase<U, L> {
    pub async fn execute(&self, user_id: Uuid) -> Result<ShoppingListFile, ApiError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(ApiError::UserNotFound)?;
        if !self.list.has_entries(user_id).await? {
            return Err(ApiError::EmptyShoppingCart);
        }
        let items = self.list.aggregate(user_id).await?;
        Ok(ShoppingListFile {
            filename: format!("{}_shopping_list.txt", user.username),
            body: render_shopping_list(&user.first_name, Utc::now(), &items),
        })
    }
}
