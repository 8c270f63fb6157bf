use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, CreatedResponse, FilmRequest, MessageResponse};
use crate::api::validation::{parse_genre_ids, validate_id, validate_search_title};
use crate::db::FilmInput;
use crate::models::{Film, FilmStatus};

#[derive(Deserialize)]
pub struct SearchQuery {
    pub title: String,
}

fn validate_film_request(payload: &FilmRequest) -> Result<FilmInput, ApiError> {
    if payload.title.trim().is_empty()
        || payload.synopsis.trim().is_empty()
        || payload.status.trim().is_empty()
        || payload.release_date.trim().is_empty()
    {
        return Err(ApiError::validation("Please fill all fields"));
    }

    if payload.status.parse::<FilmStatus>().is_err() {
        return Err(ApiError::validation(
            "Status must be one of 'not_yet_aired', 'airing' or 'finished_airing'",
        ));
    }

    if payload.total_episodes <= 0 {
        return Err(ApiError::validation("Total episodes must be positive"));
    }

    Ok(FilmInput {
        title: payload.title.trim().to_string(),
        synopsis: payload.synopsis.clone(),
        status: payload.status.clone(),
        total_episodes: payload.total_episodes,
        release_date: payload.release_date.clone(),
    })
}

/// GET /films
pub async fn list_films(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Film>>>, ApiError> {
    let films = state.store.list_films().await?;
    Ok(Json(ApiResponse::success(films)))
}

/// GET /films/{id}
pub async fn get_film(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Film>>, ApiError> {
    validate_id("film", id)?;

    let film = state
        .store
        .get_film(id)
        .await?
        .ok_or_else(|| ApiError::film_not_found(id))?;

    Ok(Json(ApiResponse::success(film)))
}

/// GET /films/by-genre/{ids}
/// `ids` is a comma-separated genre id list.
pub async fn films_by_genre(
    State(state): State<Arc<AppState>>,
    Path(ids): Path<String>,
) -> Result<Json<ApiResponse<Vec<Film>>>, ApiError> {
    let genre_ids = parse_genre_ids(&ids)?;

    let films = state.store.films_by_genres(&genre_ids).await?;
    Ok(Json(ApiResponse::success(films)))
}

/// GET /films/search?title=...
pub async fn search_films(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<Film>>>, ApiError> {
    let title = validate_search_title(&params.title)?;

    let films = state.store.search_films_by_title(title).await?;
    Ok(Json(ApiResponse::success(films)))
}

/// POST /films (admin)
pub async fn add_film(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<FilmRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedResponse>>), ApiError> {
    let input = validate_film_request(&payload)?;

    let id = state.store.create_film(&input, &payload.genres).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CreatedResponse {
            id,
            message: "Film added successfully".to_string(),
        })),
    ))
}

/// PUT /films/{id} (admin)
pub async fn update_film(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<FilmRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    validate_id("film", id)?;
    let input = validate_film_request(&payload)?;

    let updated = state.store.update_film(id, &input, &payload.genres).await?;
    if !updated {
        return Err(ApiError::film_not_found(id));
    }

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Film updated successfully",
    ))))
}

/// DELETE /films/{id} (admin)
pub async fn delete_film(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    validate_id("film", id)?;

    let deleted = state.store.delete_film(id).await?;
    if !deleted {
        return Err(ApiError::film_not_found(id));
    }

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Film deleted successfully",
    ))))
}
