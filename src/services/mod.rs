pub mod auth;
pub mod reviews;
pub mod watchlist;

pub use auth::{AuthError, AuthService, AuthenticatedIdentity, TokenService};
pub use reviews::{ReviewError, ReviewService};
pub use watchlist::{ListError, WatchlistService};
