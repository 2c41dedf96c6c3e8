use crate::state::AppState;
use axum::Router;

mod dto;
pub mod handlers;
pub mod notifier;
pub mod repo;
pub mod repo_types;
pub mod services;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::account_routes())
        .merge(handlers::auth_routes())
}
