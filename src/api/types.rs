use serde::{Deserialize, Serialize};

use crate::db::UserProfile;
use crate::models::WatchListEntry;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub bio: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct FilmRequest {
    pub title: String,
    pub synopsis: String,
    pub status: String,
    pub total_episodes: i32,
    pub release_date: String,
    pub genres: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenreRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReactionRequest {
    pub reaction: String,
}

#[derive(Debug, Deserialize)]
pub struct ListEntryRequest {
    pub list_type: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: i32,
    pub message: String,
}

/// Public profile page: identity plus the user's watch-list.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile: UserProfile,
    pub film_list: Vec<WatchListEntry>,
}
