use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::app::auth::AuthService;
use crate::http::AppError;
use crate::AppState;

/// Identity attached to a request once its bearer token resolves to a
/// stored account. Mutating routes take this as an extractor.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Unauthorized"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("Unauthorized"))?;

        let service = AuthService::new(state.db.clone());
        let session = service.authenticate_token(token).await.map_err(|err| {
            tracing::error!(error = ?err, "token lookup failed");
            AppError::bad_request("failed to authenticate")
        })?;

        let session = session.ok_or_else(|| AppError::unauthorized("Unauthorized"))?;
        Ok(AuthUser {
            user_id: session.user_id,
            username: session.username,
        })
    }
}
