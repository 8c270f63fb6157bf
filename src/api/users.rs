use axum::{
    Extension, Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::{
    ApiError, ApiResponse, AppState, MessageResponse, ProfileResponse, UpdateProfileRequest,
};
use crate::api::validation::validate_id;
use crate::services::auth::AuthenticatedIdentity;

/// GET /user/profile/{user_id}
/// Public profile plus the user's watch-list.
pub async fn view_profile(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
) -> Result<Json<ApiResponse<ProfileResponse>>, ApiError> {
    validate_id("user", user_id)?;

    let profile = state
        .store
        .get_user_profile(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let film_list = state.watchlist.list_for_user(user_id).await?;

    Ok(Json(ApiResponse::success(ProfileResponse {
        profile,
        film_list,
    })))
}

/// PUT /user/profile
/// Partial update of the caller's own profile.
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<AuthenticatedIdentity>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    if payload.display_name.is_none() && payload.bio.is_none() {
        return Err(ApiError::validation(
            "Please provide at least one field to update (display_name or bio)",
        ));
    }

    let updated = state
        .store
        .update_user_profile(
            identity.id,
            payload.display_name.as_deref(),
            payload.bio.as_deref(),
        )
        .await?;

    if !updated {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Profile updated successfully",
    ))))
}
