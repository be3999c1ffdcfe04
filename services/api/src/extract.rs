//! Body and query extractors that reject with the API's validation payload.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use axum_extra::extract::{Query, QueryRejection};
use serde::de::DeserializeOwned;

use crate::domain::validation::FieldErrors;
use crate::error::ApiError;

/// JSON body whose deserialization failures become field-keyed 400s.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(json_rejection(&rejection).into()),
        }
    }
}

/// Query string (repeated keys allowed) with the same rejection shape.
#[derive(Debug)]
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(query_rejection(&rejection).into()),
        }
    }
}

fn json_rejection(rejection: &JsonRejection) -> FieldErrors {
    match rejection {
        JsonRejection::JsonDataError(err) => field_errors(&innermost(err), rejection.body_text()),
        _ => FieldErrors::single("non_field_errors", rejection.body_text()),
    }
}

fn query_rejection(rejection: &QueryRejection) -> FieldErrors {
    field_errors(&innermost(rejection), rejection.body_text())
}

/// Message of the deepest error in the source chain.
fn innermost(err: &(dyn std::error::Error + 'static)) -> String {
    let mut current = err;
    while let Some(next) = current.source() {
        current = next;
    }
    current.to_string()
}

/// Split a `path: message` deserializer error into a field entry keyed by
/// the top-level field. Anything without a usable path is a body error.
fn field_errors(detail: &str, fallback: String) -> FieldErrors {
    let Some((path, message)) = detail.split_once(": ") else {
        return FieldErrors::single("non_field_errors", fallback);
    };
    let field = path
        .split(['.', '['])
        .next()
        .unwrap_or_default();
    let is_path = !field.is_empty()
        && path
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '[' | ']'));
    if !is_path {
        return FieldErrors::single("non_field_errors", fallback);
    }
    if field == path {
        FieldErrors::single(field, message)
    } else {
        FieldErrors::single(field, detail)
    }
}
