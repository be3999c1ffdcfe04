//! Field-level validation rules for request payloads.
//!
//! Every check here is pure; rules that need storage (uniqueness, existence)
//! are applied by the usecases, which add to the same [`FieldErrors`].

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::types::IngredientAmount;

/// Field-keyed validation messages, serialized as `{"field": ["msg", ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
    }

    /// Record `result`'s error under `field`, passing any value through.
    pub fn check<T>(&mut self, field: &str, result: Result<T, String>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(message) => {
                self.add(field, message);
                None
            }
        }
    }

    /// Record a missing value, or one that breaks `rule`, under `field`.
    pub fn require(
        &mut self,
        field: &str,
        value: Option<String>,
        rule: impl FnOnce(&str) -> Result<(), String>,
    ) -> Option<String> {
        let Some(value) = value else {
            self.add(field, "this field is required");
            return None;
        };
        self.check(field, rule(&value)).map(|()| value)
    }

    /// Like [`FieldErrors::require`] but an absent value is fine.
    pub fn optional(
        &mut self,
        field: &str,
        value: Option<String>,
        rule: impl FnOnce(&str) -> Result<(), String>,
    ) -> Option<String> {
        let value = value?;
        self.check(field, rule(&value)).map(|()| value)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

pub const USERNAME_MIN_LEN: usize = 8;
pub const USERNAME_MAX_LEN: usize = 150;
pub const EMAIL_MAX_LEN: usize = 254;
pub const PERSON_NAME_MAX_LEN: usize = 150;
pub const PASSWORD_MIN_LEN: usize = 8;
pub const PASSWORD_MAX_LEN: usize = 150;
pub const RECIPE_NAME_MAX_LEN: usize = 200;
pub const TAG_NAME_MAX_LEN: usize = 200;
pub const INGREDIENT_NAME_MAX_LEN: usize = 200;
pub const MEASUREMENT_UNIT_MAX_LEN: usize = 24;

/// Username: 8–150 chars of word characters or `.@+-`; `me` is reserved in any case.
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.eq_ignore_ascii_case("me") {
        return Err("username \"me\" is reserved".to_owned());
    }
    let len = username.chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        return Err(format!(
            "username must be {USERNAME_MIN_LEN}-{USERNAME_MAX_LEN} characters long"
        ));
    }
    let allowed = |c: char| c.is_alphanumeric() || matches!(c, '_' | '.' | '@' | '+' | '-');
    if !username.chars().all(allowed) {
        return Err("username may only contain letters, digits and . @ + - _".to_owned());
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), String> {
    if email.len() > EMAIL_MAX_LEN {
        return Err(format!("email must be at most {EMAIL_MAX_LEN} characters long"));
    }
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err("enter a valid email address".to_owned());
    }
    Ok(())
}

/// First and last names are required and bounded.
pub fn validate_person_name(value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err("this field may not be blank".to_owned());
    }
    if value.chars().count() > PERSON_NAME_MAX_LEN {
        return Err(format!(
            "must be at most {PERSON_NAME_MAX_LEN} characters long"
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), String> {
    let len = password.chars().count();
    if !(PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&len) {
        return Err(format!(
            "password must be {PASSWORD_MIN_LEN}-{PASSWORD_MAX_LEN} characters long"
        ));
    }
    Ok(())
}

pub fn validate_recipe_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("this field may not be blank".to_owned());
    }
    if name.chars().count() > RECIPE_NAME_MAX_LEN {
        return Err(format!(
            "must be at most {RECIPE_NAME_MAX_LEN} characters long"
        ));
    }
    Ok(())
}

pub fn validate_recipe_text(text: &str) -> Result<(), String> {
    if text.trim().is_empty() {
        return Err("this field may not be blank".to_owned());
    }
    Ok(())
}

pub fn validate_cooking_time(minutes: i32) -> Result<(), String> {
    if minutes < 1 {
        return Err("cooking time must be at least 1 minute".to_owned());
    }
    Ok(())
}

/// One raw `{id, amount}` entry as received; both members may be missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngredientAmountInput {
    pub id: Option<i32>,
    pub amount: Option<i32>,
}

/// Shape rules for the `ingredients` list. Existence of each id is checked
/// separately against storage.
pub fn validate_ingredient_list(
    input: Option<&[IngredientAmountInput]>,
) -> Result<Vec<IngredientAmount>, String> {
    let Some(entries) = input else {
        return Err("this field is required".to_owned());
    };
    if entries.is_empty() {
        return Err("add at least one ingredient".to_owned());
    }
    let mut validated: Vec<IngredientAmount> = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(ingredient_id) = entry.id else {
            return Err("ingredient id is missing".to_owned());
        };
        let Some(amount) = entry.amount else {
            return Err(format!("amount is missing for ingredient {ingredient_id}"));
        };
        if amount < 1 {
            return Err(format!(
                "amount for ingredient {ingredient_id} must be at least 1"
            ));
        }
        if validated.iter().any(|v| v.ingredient_id == ingredient_id) {
            return Err("ingredients must not repeat".to_owned());
        }
        validated.push(IngredientAmount {
            ingredient_id,
            amount,
        });
    }
    Ok(validated)
}

/// Shape rules for the `tags` list. Repeated ids collapse to one.
pub fn validate_tag_list(input: Option<&[i32]>) -> Result<Vec<i32>, String> {
    let Some(ids) = input else {
        return Err("this field is required".to_owned());
    };
    if ids.is_empty() {
        return Err("add at least one tag".to_owned());
    }
    let mut unique = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(id) {
            unique.push(*id);
        }
    }
    Ok(unique)
}

/// `#` followed by six hex digits.
pub fn validate_color(color: &str) -> Result<(), String> {
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        return Err("color must be a hex value like #49B64E".to_owned());
    }
    Ok(())
}

pub fn validate_slug(slug: &str) -> Result<(), String> {
    if slug.is_empty() || slug.chars().count() > TAG_NAME_MAX_LEN {
        return Err(format!("slug must be 1-{TAG_NAME_MAX_LEN} characters long"));
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
    {
        return Err("slug may only contain lowercase letters, digits, - and _".to_owned());
    }
    Ok(())
}

pub fn validate_bounded(value: &str, max: usize) -> Result<(), String> {
    if value.is_empty() {
        return Err("this field may not be blank".to_owned());
    }
    if value.chars().count() > max {
        return Err(format!("must be at most {max} characters long"));
    }
    Ok(())
}
