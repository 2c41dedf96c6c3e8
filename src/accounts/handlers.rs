use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{ListAccountsQuery, LoginRequest, LoginResponse, PublicAccount},
    repo_types::NewAccount,
};
use crate::{auth::extractors::AuthAccount, error::AccountError, state::AppState};

pub fn account_routes() -> Router<AppState> {
    Router::new().route("/accounts", post(create_account).get(list_accounts))
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn create_account(
    State(state): State<AppState>,
    Json(payload): Json<NewAccount>,
) -> Result<(StatusCode, Json<PublicAccount>), AccountError> {
    let account = state.accounts.create_account(payload).await?;
    Ok((StatusCode::CREATED, Json(account.into())))
}

#[instrument(skip(state))]
pub async fn list_accounts(
    State(state): State<AppState>,
    Query(q): Query<ListAccountsQuery>,
) -> Result<Json<Vec<PublicAccount>>, AccountError> {
    let accounts = state.accounts.list_accounts(&q.after_id, q.limit).await?;
    Ok(Json(accounts.into_iter().map(PublicAccount::from).collect()))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AccountError> {
    let outcome = state
        .accounts
        .login(&payload.email, &payload.password)
        .await?;
    Ok(Json(LoginResponse {
        token: outcome.token,
        account: outcome.account.into(),
    }))
}

#[instrument(skip_all)]
pub async fn get_me(AuthAccount(account): AuthAccount) -> Json<PublicAccount> {
    Json(account.into())
}
