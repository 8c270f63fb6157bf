use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Global airing state of a film in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilmStatus {
    NotYetAired,
    Airing,
    FinishedAiring,
}

impl FilmStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotYetAired => "not_yet_aired",
            Self::Airing => "airing",
            Self::FinishedAiring => "finished_airing",
        }
    }
}

impl FromStr for FilmStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_yet_aired" => Ok(Self::NotYetAired),
            "airing" => Ok(Self::Airing),
            "finished_airing" => Ok(Self::FinishedAiring),
            _ => Err(()),
        }
    }
}

impl fmt::Display for FilmStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Film {
    pub id: i32,
    pub title: String,
    pub synopsis: String,
    pub status: String,
    pub total_episodes: i32,
    pub release_date: String,
    pub genres: Vec<Genre>,
    /// Mean review rating rounded to 2 decimal places, 0 when unreviewed.
    pub average_rating: f64,
}

/// Round a mean rating to two decimal places.
#[must_use]
pub fn round_rating(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
