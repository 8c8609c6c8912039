//! Bearer token extractors.
//!
//! Provides extractors for requiring an authenticated caller, or an admin
//! caller, in route handlers. Tokens are read from
//! `Authorization: Bearer <token>`.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Json, Response},
};

use atelier_core::api::MessageResponse;

use crate::error::set_sentry_user;
use crate::services::Principal;
use crate::state::AppState;

/// Error returned when a request lacks a valid token or the required role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// No bearer token was supplied.
    MissingToken,
    /// The token failed verification.
    InvalidToken,
    /// The token is valid but its role is insufficient.
    Forbidden,
}

impl AuthRejection {
    const fn message(self) -> &'static str {
        match self {
            Self::MissingToken => "Unauthorized",
            Self::InvalidToken => "Invalid token",
            Self::Forbidden => "Insufficient permissions",
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let status = match self {
            Self::MissingToken | Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
        };
        (status, Json(MessageResponse::error(self.message()))).into_response()
    }
}

/// Extractor that requires a valid bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(principal): RequireAuth) -> String {
///     format!("Hello, user {}!", principal.user_id)
/// }
/// ```
pub struct RequireAuth(pub Principal);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AuthRejection::MissingToken)?;

        let principal = state.tokens().verify(token).map_err(|e| {
            tracing::debug!(error = %e, "bearer token rejected");
            AuthRejection::InvalidToken
        })?;

        set_sentry_user(&principal.user_id);
        Ok(Self(principal))
    }
}

/// Extractor that requires a bearer token carrying a catalog-admin role.
///
/// Missing or invalid tokens are rejected with 401, valid tokens without the
/// role with 403.
pub struct RequireAdmin(pub Principal);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(principal) = RequireAuth::from_request_parts(parts, state).await?;

        if !principal.role.can_manage_catalog() {
            tracing::warn!(user_id = %principal.user_id, role = %principal.role, "admin route refused");
            return Err(AuthRejection::Forbidden);
        }

        Ok(Self(principal))
    }
}

/// The token from an `Authorization: Bearer` header, if present.
fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/protected");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&parts(Some("Bearer abc.def"))), Some("abc.def"));
        assert_eq!(bearer_token(&parts(Some("bearer abc"))), Some("abc"));
        assert_eq!(bearer_token(&parts(Some("Basic abc"))), None);
        assert_eq!(bearer_token(&parts(Some("Bearer "))), None);
        assert_eq!(bearer_token(&parts(None)), None);
    }

    #[test]
    fn test_rejection_statuses() {
        assert_eq!(
            AuthRejection::MissingToken.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthRejection::InvalidToken.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthRejection::Forbidden.into_response().status(),
            StatusCode::FORBIDDEN
        );
    }
}
