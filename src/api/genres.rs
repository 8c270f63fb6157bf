use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, CreatedResponse, GenreRequest, MessageResponse};
use crate::api::validation::validate_id;
use crate::models::Genre;

/// GET /genres
pub async fn list_genres(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Genre>>>, ApiError> {
    let genres = state.store.list_genres().await?;
    Ok(Json(ApiResponse::success(genres)))
}

/// POST /genres (admin)
pub async fn add_genre(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<GenreRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedResponse>>), ApiError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::validation("Please fill all fields"));
    }

    if state.store.get_genre_by_name(name).await?.is_some() {
        return Err(ApiError::Conflict(format!(
            "Genre '{}' already exists",
            name
        )));
    }

    let id = state.store.create_genre(name).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CreatedResponse {
            id,
            message: "Genre added successfully".to_string(),
        })),
    ))
}

/// PUT /genres/{id} (admin)
pub async fn update_genre(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<GenreRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    validate_id("genre", id)?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::validation("Please provide both id and name"));
    }

    let updated = state.store.update_genre(id, name).await?;
    if !updated {
        return Err(ApiError::not_found("Genre", id));
    }

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Genre updated successfully",
    ))))
}
