pub mod dto;
pub mod handlers;
pub mod presence;
pub mod repo;
pub mod validate;

use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
