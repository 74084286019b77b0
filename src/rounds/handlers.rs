use std::collections::{HashMap, HashSet};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::auth::extractors::AuthUser;
use crate::courses::repo::{Hole, Tee};
use crate::error::ApiError;
use crate::rounds::dto::{RoundDetails, RoundResponse, SubmitRoundRequest, UpdateRoundRequest};
use crate::rounds::repo::{Round, ScoredHole};
use crate::rounds::scoring::{validate_scorecard, ValidatedScore};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/rounds", post(submit_round).get(list_rounds))
        .route(
            "/rounds/:id",
            get(get_round).put(update_round).delete(delete_round),
        )
}

async fn validate_against_tee(
    state: &AppState,
    tee: &Tee,
    entries: &[crate::rounds::dto::HoleScoreEntry],
) -> Result<(Vec<ValidatedScore>, usize), ApiError> {
    let holes = Hole::list_for_tee(&state.db, tee.id).await?;
    let known: HashSet<Uuid> = holes.iter().map(|h| h.id).collect();
    let (valid, skipped) = validate_scorecard(entries, &known).map_err(ApiError::BadRequest)?;
    if skipped > 0 {
        warn!(skipped, tee_id = %tee.id, "scorecard entries dropped for unknown holes");
    }
    Ok((valid, skipped))
}

#[instrument(skip(state, payload))]
pub async fn submit_round(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<SubmitRoundRequest>,
) -> Result<(StatusCode, Json<RoundResponse>), ApiError> {
    let tee = Tee::find_by_id(&state.db, payload.tee_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("tee not found".into()))?;

    let (valid, skipped) = validate_against_tee(&state, &tee, &payload.hole_scores).await?;
    let is_complete = valid.len() as i32 >= tee.number_of_holes;

    let round_id = Round::create(
        &state.db,
        user_id,
        tee.course_id,
        tee.id,
        payload.date_played,
        payload.notes.as_deref().unwrap_or(""),
        is_complete,
        &valid,
    )
    .await?;

    let round = Round::find_for_player(&state.db, user_id, round_id)
        .await?
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("round vanished after insert")))?;
    let scores = Round::scores_for_round(&state.db, round_id).await?;

    info!(round_id = %round_id, user_id = %user_id, holes = scores.len(), "round recorded");
    let mut response = RoundResponse::build(round, &scores);
    if skipped > 0 {
        response.skipped_entries = Some(skipped);
    }
    Ok((StatusCode::CREATED, Json(response)))
}

#[instrument(skip(state))]
pub async fn list_rounds(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<RoundResponse>>, ApiError> {
    let rounds = Round::list_for_player(&state.db, user_id).await?;
    let ids: Vec<Uuid> = rounds.iter().map(|r| r.id).collect();
    let all_scores = Round::scores_for_rounds(&state.db, &ids).await?;

    let mut by_round: HashMap<Uuid, Vec<ScoredHole>> = HashMap::new();
    for score in all_scores {
        by_round.entry(score.round_id).or_default().push(score);
    }

    let responses = rounds
        .into_iter()
        .map(|round| {
            let scores = by_round.remove(&round.id).unwrap_or_default();
            RoundResponse::build(round, &scores)
        })
        .collect();
    Ok(Json(responses))
}

#[instrument(skip(state))]
pub async fn get_round(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<RoundDetails>, ApiError> {
    let round = Round::find_for_player(&state.db, user_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("round not found".into()))?;
    let scores = Round::scores_for_round(&state.db, id).await?;
    Ok(Json(RoundDetails {
        round: RoundResponse::build(round, &scores),
        hole_scores: scores,
    }))
}

#[instrument(skip(state, payload))]
pub async fn update_round(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRoundRequest>,
) -> Result<Json<RoundDetails>, ApiError> {
    let round = Round::find_for_player(&state.db, user_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("round not found".into()))?;

    let mut validated = None;
    let mut is_complete = None;
    let mut skipped = 0;
    if let Some(entries) = payload.hole_scores.as_deref() {
        let tee = Tee::find_by_id(&state.db, round.tee_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("tee not found".into()))?;
        let (valid, dropped) = validate_against_tee(&state, &tee, entries).await?;
        is_complete = Some(valid.len() as i32 >= tee.number_of_holes);
        validated = Some(valid);
        skipped = dropped;
    }

    Round::update(
        &state.db,
        id,
        payload.notes.as_deref(),
        is_complete,
        validated.as_deref(),
    )
    .await?;

    let round = Round::find_for_player(&state.db, user_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("round not found".into()))?;
    let scores = Round::scores_for_round(&state.db, id).await?;
    info!(round_id = %id, user_id = %user_id, "round updated");
    let mut response = RoundResponse::build(round, &scores);
    if skipped > 0 {
        response.skipped_entries = Some(skipped);
    }
    Ok(Json(RoundDetails {
        round: response,
        hole_scores: scores,
    }))
}

#[instrument(skip(state))]
pub async fn delete_round(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !Round::delete_for_player(&state.db, user_id, id).await? {
        return Err(ApiError::NotFound("round not found".into()));
    }
    info!(round_id = %id, user_id = %user_id, "round deleted");
    Ok(StatusCode::NO_CONTENT)
}
