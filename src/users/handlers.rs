use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::extractors::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::dto::{DirectoryUser, PublicUser, UpdateProfileRequest};
use crate::users::repo::{ProfileUpdate, User};
use crate::users::validate::{is_valid_email, is_valid_phone};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me).put(update_me))
        .route("/users", get(list_users))
        .route("/users/:id", get(get_user).delete(delete_user))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("user no longer exists".into()))?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    if let Some(email) = payload.email.as_deref() {
        if !is_valid_email(email) {
            return Err(ApiError::BadRequest("invalid email".into()));
        }
    }
    if let Some(phone) = payload.phone_number.as_deref() {
        if !phone.is_empty() && !is_valid_phone(phone) {
            return Err(ApiError::BadRequest(
                "phone number must be 9-15 digits, optionally prefixed with '+'".into(),
            ));
        }
    }

    let update = ProfileUpdate {
        email: payload.email,
        first_name: payload.first_name,
        last_name: payload.last_name,
        phone_number: payload.phone_number,
        home_course: payload.home_course,
    };
    let user = User::update_profile(&state.db, user_id, &update).await?;
    info!(user_id = %user_id, "profile updated");
    Ok(Json(user.into()))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
) -> Result<Json<Vec<DirectoryUser>>, ApiError> {
    let users = User::list(&state.db).await?;
    Ok(Json(users.into_iter().map(DirectoryUser::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DirectoryUser>, ApiError> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;
    Ok(Json(user.into()))
}

/// Users may only delete their own account.
#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<axum::http::StatusCode, ApiError> {
    if id != user_id {
        return Err(ApiError::Forbidden(
            "cannot delete another user's account".into(),
        ));
    }
    if !User::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("user not found".into()));
    }
    info!(user_id = %id, "account deleted");
    Ok(axum::http::StatusCode::NO_CONTENT)
}
