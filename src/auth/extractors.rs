use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::warn;

use crate::{accounts::repo_types::Account, error::AccountError, state::AppState};

/// Resolves the bearer token in `Authorization` to the account it names.
pub struct AuthAccount(pub Account);

#[async_trait]
impl FromRequestParts<AppState> for AuthAccount {
    type Rejection = AccountError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer ").or_else(|| v.strip_prefix("bearer ")))
            .ok_or_else(|| {
                warn!("missing or malformed Authorization header");
                AccountError::InvalidToken
            })?;

        let account = state.accounts.resolve_from_token(token.trim()).await?;
        Ok(AuthAccount(account))
    }
}
