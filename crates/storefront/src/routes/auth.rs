//! Account route handlers.

use axum::{Json, extract::State};

use atelier_core::api::{
    Credentials, DataResponse, MessageResponse, SignupRequest, TokenResponse, UserSummary,
};

use super::ApiJson;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::services::AuthService;
use crate::state::AppState;

/// Register a new shopper account.
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SignupRequest>,
) -> Result<Json<DataResponse<UserSummary>>> {
    let user = AuthService::new(state.users(), state.tokens())
        .signup(&request.name, &request.email, &request.password)
        .await?;
    Ok(Json(DataResponse::ok(user)))
}

/// Exchange credentials for a bearer token.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(credentials): ApiJson<Credentials>,
) -> Result<Json<TokenResponse>> {
    let token = AuthService::new(state.users(), state.tokens())
        .login(&credentials.email, &credentials.password)
        .await?;
    Ok(Json(TokenResponse {
        success: true,
        token,
    }))
}

/// Any valid token may call this.
pub async fn protected(RequireAuth(principal): RequireAuth) -> Json<MessageResponse> {
    tracing::debug!(user_id = %principal.user_id, "protected route accessed");
    Json(MessageResponse::ok("This is a protected route!"))
}
