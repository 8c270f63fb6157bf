use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A user's personal status label for a film. The five values are an
/// unordered label set, not a transition graph: any value may replace any
/// other through a status update. The only gate is at creation time, where
/// a `not_yet_aired` film admits nothing but `PlanToWatch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListType {
    PlanToWatch,
    Watching,
    Completed,
    OnHold,
    Dropped,
}

impl ListType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PlanToWatch => "plan_to_watch",
            Self::Watching => "watching",
            Self::Completed => "completed",
            Self::OnHold => "on_hold",
            Self::Dropped => "dropped",
        }
    }
}

impl FromStr for ListType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plan_to_watch" => Ok(Self::PlanToWatch),
            "watching" => Ok(Self::Watching),
            "completed" => Ok(Self::Completed),
            "on_hold" => Ok(Self::OnHold),
            "dropped" => Ok(Self::Dropped),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ListType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A watch-list row joined with the film it points at.
#[derive(Debug, Clone, Serialize)]
pub struct WatchListEntry {
    pub film_id: i32,
    pub title: String,
    pub film_status: String,
    pub list_type: String,
    pub updated_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_type_round_trip() {
        for s in [
            "plan_to_watch",
            "watching",
            "completed",
            "on_hold",
            "dropped",
        ] {
            assert_eq!(s.parse::<ListType>().unwrap().as_str(), s);
        }
        assert!("finished".parse::<ListType>().is_err());
        assert!("Plan_To_Watch".parse::<ListType>().is_err());
    }
}
