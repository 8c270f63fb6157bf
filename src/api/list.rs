use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, ListEntryRequest, MessageResponse};
use crate::api::validation::validate_id;
use crate::models::WatchListEntry;
use crate::services::auth::AuthenticatedIdentity;

/// POST /user/list/{film_id}
pub async fn add_to_list(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<AuthenticatedIdentity>,
    Path(film_id): Path<i32>,
    Json(payload): Json<ListEntryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MessageResponse>>), ApiError> {
    validate_id("film", film_id)?;

    state
        .watchlist
        .add_to_list(&identity, film_id, &payload.list_type)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(MessageResponse::new(
            "Film added to list successfully",
        ))),
    ))
}

/// PUT /user/list/{film_id}
pub async fn update_list_status(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<AuthenticatedIdentity>,
    Path(film_id): Path<i32>,
    Json(payload): Json<ListEntryRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    validate_id("film", film_id)?;

    state
        .watchlist
        .update_status(&identity, film_id, &payload.list_type)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "List status updated successfully",
    ))))
}

/// GET /user/list/{user_id}
pub async fn get_user_list(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<WatchListEntry>>>, ApiError> {
    validate_id("user", user_id)?;

    let list = state.watchlist.list_for_user(user_id).await?;
    Ok(Json(ApiResponse::success(list)))
}
