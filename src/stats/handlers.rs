use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::auth::extractors::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;
use crate::stats::aggregate::{player_stats, rank_leaderboard, LeaderboardEntry, PlayerStats};
use crate::stats::repo;
use crate::users::repo::User;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/players/:id/stats", get(get_player_stats))
        .route("/leaderboard", get(leaderboard))
}

#[instrument(skip(state))]
pub async fn get_player_stats(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<PlayerStats>, ApiError> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("player not found".into()))?;
    let rows = repo::rounds_for_player(&state.db, id).await?;
    Ok(Json(player_stats(user.id, &user.username, &rows)))
}

#[instrument(skip(state))]
pub async fn leaderboard(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    let rows = repo::rounds_for_all(&state.db).await?;
    Ok(Json(rank_leaderboard(&rows)))
}
