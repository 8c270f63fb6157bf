use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reaction {
    Like,
    Dislike,
}

impl Reaction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Dislike => "dislike",
        }
    }
}

impl FromStr for Reaction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(Self::Like),
            "dislike" => Ok(Self::Dislike),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A review joined with the reviewer's public identity and its aggregated
/// reaction tallies.
#[derive(Debug, Clone, Serialize)]
pub struct FilmReview {
    pub review_id: i32,
    pub rating: i32,
    pub comment: String,
    pub created_at: String,
    pub updated_at: String,
    pub user_id: i32,
    pub username: String,
    pub display_name: String,
    pub likes: i64,
    pub dislikes: i64,
}
