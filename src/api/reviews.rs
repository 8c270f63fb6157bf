use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::{
    ApiError, ApiResponse, AppState, CreatedResponse, MessageResponse, ReactionRequest,
    ReviewRequest,
};
use crate::api::validation::validate_id;
use crate::models::FilmReview;
use crate::services::auth::AuthenticatedIdentity;

/// Presence check mirroring the write contract: both fields are required
/// before any gate runs.
fn unpack_review_request(payload: &ReviewRequest) -> Result<(i32, &str), ApiError> {
    match (payload.rating, payload.comment.as_deref()) {
        (Some(rating), Some(comment)) if !comment.trim().is_empty() => Ok((rating, comment)),
        _ => Err(ApiError::validation(
            "Please provide both rating and comment",
        )),
    }
}

/// POST /reviews/film/{film_id}
pub async fn add_review(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<AuthenticatedIdentity>,
    Path(film_id): Path<i32>,
    Json(payload): Json<ReviewRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedResponse>>), ApiError> {
    validate_id("film", film_id)?;
    let (rating, comment) = unpack_review_request(&payload)?;

    let id = state
        .reviews
        .add_review(&identity, film_id, rating, comment)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CreatedResponse {
            id,
            message: "Review added successfully".to_string(),
        })),
    ))
}

/// GET /reviews/film/{film_id}
pub async fn reviews_for_film(
    State(state): State<Arc<AppState>>,
    Path(film_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<FilmReview>>>, ApiError> {
    validate_id("film", film_id)?;

    let reviews = state.reviews.reviews_for_film(film_id).await?;
    Ok(Json(ApiResponse::success(reviews)))
}

/// PUT /reviews/{review_id}
pub async fn update_review(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<AuthenticatedIdentity>,
    Path(review_id): Path<i32>,
    Json(payload): Json<ReviewRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    validate_id("review", review_id)?;
    let (rating, comment) = unpack_review_request(&payload)?;

    state
        .reviews
        .update_review(&identity, review_id, rating, comment)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Review updated successfully",
    ))))
}

/// DELETE /reviews/{review_id}
pub async fn delete_review(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<AuthenticatedIdentity>,
    Path(review_id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    validate_id("review", review_id)?;

    state.reviews.delete_review(&identity, review_id).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Review deleted successfully",
    ))))
}

/// POST /reviews/{review_id}/reaction
pub async fn react_to_review(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<AuthenticatedIdentity>,
    Path(review_id): Path<i32>,
    Json(payload): Json<ReactionRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    validate_id("review", review_id)?;

    let reaction = state
        .reviews
        .react_to_review(&identity, review_id, &payload.reaction)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(format!(
        "Review {}d successfully",
        reaction
    )))))
}
