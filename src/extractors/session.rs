//! Read the `admin-session` cookie into an `AuthContext`.

use crate::auth::session::{cookie_header, read_cookie};
use crate::auth::AuthContext;
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::request::Parts,
};
use chrono::Utc;

/// Extractor for the caller's session. A missing, malformed, or expired cookie yields an
/// anonymous context; it never rejects.
#[derive(Clone, Debug, Default)]
pub struct Session(pub AuthContext);

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let cookies = cookie_header(&parts.headers);
        Ok(Session(AuthContext::from_cookie(read_cookie(cookies.as_deref(), Utc::now()))))
    }
}
