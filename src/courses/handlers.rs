use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::auth::extractors::AuthUser;
use crate::courses::client::CourseApiClient;
use crate::courses::dto::{CourseDetails, SearchParams, TeeWithHoles};
use crate::courses::repo::{Course, Hole, Tee};
use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/courses/search", get(search_courses))
        .route("/courses", get(list_courses))
        .route("/courses/:id", get(get_course))
        .route("/courses/:id/tees", get(course_tees))
        .route("/tees/:id/holes", get(tee_holes))
}

async fn load_details(state: &AppState, course: Course) -> Result<CourseDetails, ApiError> {
    let tees = Tee::list_for_course(&state.db, course.id).await?;
    let mut with_holes = Vec::with_capacity(tees.len());
    for tee in tees {
        let holes = Hole::list_for_tee(&state.db, tee.id).await?;
        with_holes.push(TeeWithHoles { tee, holes });
    }
    Ok(CourseDetails {
        course,
        tees: with_holes,
    })
}

/// Proxies the external course API and caches every hit locally.
#[instrument(skip(state))]
pub async fn search_courses(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<CourseDetails>>, ApiError> {
    let query = params.search.trim();
    if query.is_empty() {
        return Err(ApiError::BadRequest("search query is required".into()));
    }

    let client = CourseApiClient::new(&state.http, &state.config.course_api);
    let imports = client.search(query).await.map_err(|e| {
        error!(error = %e, "course api search failed");
        ApiError::Upstream(e.to_string())
    })?;

    let mut results = Vec::with_capacity(imports.len());
    for import in &imports {
        let course = Course::upsert_imported(&state.db, import).await?;
        results.push(load_details(&state, course).await?);
    }

    info!(query, count = results.len(), "course search served");
    Ok(Json(results))
}

#[instrument(skip(state))]
pub async fn list_courses(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
) -> Result<Json<Vec<Course>>, ApiError> {
    let courses = Course::list(&state.db).await?;
    Ok(Json(courses))
}

#[instrument(skip(state))]
pub async fn get_course(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<CourseDetails>, ApiError> {
    let course = Course::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("course not found".into()))?;
    Ok(Json(load_details(&state, course).await?))
}

#[instrument(skip(state))]
pub async fn course_tees(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<TeeWithHoles>>, ApiError> {
    if Course::find_by_id(&state.db, id).await?.is_none() {
        return Err(ApiError::NotFound("course not found".into()));
    }
    let tees = Tee::list_for_course(&state.db, id).await?;
    let mut out = Vec::with_capacity(tees.len());
    for tee in tees {
        let holes = Hole::list_for_tee(&state.db, tee.id).await?;
        out.push(TeeWithHoles { tee, holes });
    }
    Ok(Json(out))
}

#[instrument(skip(state))]
pub async fn tee_holes(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Hole>>, ApiError> {
    if Tee::find_by_id(&state.db, id).await?.is_none() {
        return Err(ApiError::NotFound("tee not found".into()));
    }
    Ok(Json(Hole::list_for_tee(&state.db, id).await?))
}
