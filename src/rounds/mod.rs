pub mod dto;
pub mod handlers;
pub mod repo;
pub mod scoring;

use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
