use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Store;
use crate::services::{AuthService, ReviewService, TokenService, WatchlistService};

pub mod auth;
mod error;
mod films;
mod genres;
mod list;
mod reviews;
mod types;
mod users;
mod validation;

pub use error::ApiError;
pub use types::*;

pub struct AppState {
    pub store: Store,
    pub config: Config,
    pub tokens: TokenService,
    pub auth: AuthService,
    pub reviews: ReviewService,
    pub watchlist: WatchlistService,
}

pub async fn create_app_state(config: Config) -> anyhow::Result<Arc<AppState>> {
    let store = Store::new(&config.general.database_path).await?;

    let tokens = TokenService::new(&config.auth);
    let auth = AuthService::new(store.clone(), config.security.clone());
    let reviews = ReviewService::new(store.clone());
    let watchlist = WatchlistService::new(store.clone());

    Ok(Arc::new(AppState {
        store,
        config,
        tokens,
        auth,
        reviews,
        watchlist,
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config.server.cors_allowed_origins.clone();

    let admin_routes = Router::new()
        .route("/films", post(films::add_film))
        .route("/films/{id}", put(films::update_film))
        .route("/films/{id}", delete(films::delete_film))
        .route("/genres", post(genres::add_genre))
        .route("/genres/{id}", put(genres::update_genre))
        .route_layer(middleware::from_fn(auth::require_admin));

    let protected_routes = Router::new()
        .route("/reviews/film/{film_id}", post(reviews::add_review))
        .route("/reviews/{review_id}", put(reviews::update_review))
        .route("/reviews/{review_id}", delete(reviews::delete_review))
        .route(
            "/reviews/{review_id}/reaction",
            post(reviews::react_to_review),
        )
        .route("/user/list/{id}", post(list::add_to_list))
        .route("/user/list/{id}", put(list::update_list_status))
        .route("/user/profile", put(users::update_profile))
        .merge(admin_routes)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::authenticate,
        ));

    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/films", get(films::list_films))
        .route("/films/search", get(films::search_films))
        .route("/films/by-genre/{ids}", get(films::films_by_genre))
        .route("/films/{id}", get(films::get_film))
        .route("/genres", get(genres::list_genres))
        .route("/reviews/film/{film_id}", get(reviews::reviews_for_film))
        .route("/user/list/{id}", get(list::get_user_list))
        .route("/user/profile/{user_id}", get(users::view_profile));

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
