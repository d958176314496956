//! Caller identity extraction.
//!
//! Authentication itself lives in an upstream identity provider; by the time
//! a request reaches this service the gateway has already verified the
//! caller and forwards their id in the `X-User-Id` header. The extractor
//! only parses that header — it deliberately knows nothing about tokens.

use crate::errors::AppError;
use axum::{extract::FromRequestParts, http::StatusCode, http::request::Parts};
use uuid::Uuid;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller's user id.
#[derive(Debug, Clone, Copy)]
pub struct CallerId(pub Uuid);

impl<S> FromRequestParts<S> for CallerId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                AppError::new(StatusCode::UNAUTHORIZED, "missing X-User-Id header")
            })?;

        let user_id = Uuid::parse_str(raw).map_err(|_| {
            AppError::new(StatusCode::UNAUTHORIZED, "invalid X-User-Id header")
        })?;

        Ok(CallerId(user_id))
    }
}
