mod dto;
pub mod engine;
pub mod handlers;
pub mod services;
pub mod slot;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::routes())
}
