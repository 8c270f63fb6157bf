pub mod film;
pub mod list;
pub mod review;

pub use film::{Film, FilmStatus, Genre, round_rating};
pub use list::{ListType, WatchListEntry};
pub use review::{FilmReview, Reaction};
