pub mod handlers;
pub mod ollama;
pub mod prompts;

use axum::Router;

pub use ollama::ChatSessions;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
