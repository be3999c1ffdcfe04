//! Gateway-injected identity headers extractor.

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use http::request::Parts;
use http::{HeaderMap, StatusCode};
use uuid::Uuid;

use foodgram_domain::user::UserRole;

pub const USER_ID_HEADER: &str = "x-foodgram-user-id";
pub const USER_ROLE_HEADER: &str = "x-foodgram-user-role";

/// User identity injected by the token provider via `x-foodgram-user-id` and
/// `x-foodgram-user-role` headers.
///
/// As a required extractor it returns 401 if `x-foodgram-user-id` is absent or
/// malformed. As `Option<IdentityHeaders>` it yields `None` for anonymous
/// requests and still returns 401 for malformed headers.
/// Role enforcement (403) is done by usecases after extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityHeaders {
    pub user_id: Uuid,
    pub user_role: UserRole,
}

impl IdentityHeaders {
    pub fn is_admin(&self) -> bool {
        self.user_role.is_admin()
    }

    fn from_headers(headers: &HeaderMap) -> Result<Option<Self>, StatusCode> {
        let Some(raw_id) = headers.get(USER_ID_HEADER) else {
            return Ok(None);
        };
        let user_id = raw_id
            .to_str()
            .ok()
            .and_then(|s| s.parse::<Uuid>().ok())
            .ok_or(StatusCode::UNAUTHORIZED)?;
        let user_role = headers
            .get(USER_ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u8>().ok())
            .and_then(UserRole::from_u8)
            .ok_or(StatusCode::UNAUTHORIZED)?;
        Ok(Some(Self { user_id, user_role }))
    }
}

impl<S> FromRequestParts<S> for IdentityHeaders
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    // Values are extracted synchronously so the returned future is 'static.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let identity = Self::from_headers(&parts.headers);
        async move { identity?.ok_or(StatusCode::UNAUTHORIZED) }
    }
}

impl<S> OptionalFromRequestParts<S> for IdentityHeaders
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Option<Self>, Self::Rejection>> + Send {
        let identity = Self::from_headers(&parts.headers);
        async move { identity }
    }
}
