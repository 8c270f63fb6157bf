use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

use crate::config::SecurityConfig;
use crate::models::{Film, FilmReview, Genre, WatchListEntry};

pub use repositories::film::FilmInput;
pub use repositories::user::{NewUser, User, UserProfile};

/// Facade over the per-aggregate repositories. Cloning is cheap; the
/// underlying connection pool is shared.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        if db_url.contains(":memory:") {
            // A pooled in-memory SQLite gives every connection its own
            // database; pin the pool to a single long-lived connection.
            opt.max_connections(1).min_connections(1);
        } else {
            opt.max_connections(max_connections)
                .min_connections(min_connections)
                .idle_timeout(Duration::from_secs(300))
                .max_lifetime(Duration::from_secs(600));
        }

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn film_repo(&self) -> repositories::film::FilmRepository {
        repositories::film::FilmRepository::new(self.conn.clone())
    }

    fn genre_repo(&self) -> repositories::genre::GenreRepository {
        repositories::genre::GenreRepository::new(self.conn.clone())
    }

    fn list_repo(&self) -> repositories::list::ListRepository {
        repositories::list::ListRepository::new(self.conn.clone())
    }

    fn review_repo(&self) -> repositories::review::ReviewRepository {
        repositories::review::ReviewRepository::new(self.conn.clone())
    }

    // ========================================================================
    // Users
    // ========================================================================

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn get_user_by_id(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn username_or_email_taken(&self, username: &str, email: &str) -> Result<bool> {
        self.user_repo()
            .username_or_email_taken(username, email)
            .await
    }

    pub async fn create_user(&self, new_user: NewUser, config: &SecurityConfig) -> Result<User> {
        self.user_repo().create(new_user, config).await
    }

    pub async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>> {
        self.user_repo().verify_credentials(username, password).await
    }

    pub async fn get_user_profile(&self, user_id: i32) -> Result<Option<UserProfile>> {
        self.user_repo().get_profile(user_id).await
    }

    pub async fn update_user_profile(
        &self,
        user_id: i32,
        display_name: Option<&str>,
        bio: Option<&str>,
    ) -> Result<bool> {
        self.user_repo()
            .update_profile(user_id, display_name, bio)
            .await
    }

    // ========================================================================
    // Film Catalog
    // ========================================================================

    pub async fn list_films(&self) -> Result<Vec<Film>> {
        self.film_repo().list().await
    }

    pub async fn get_film(&self, id: i32) -> Result<Option<Film>> {
        self.film_repo().get(id).await
    }

    pub async fn get_film_status(&self, id: i32) -> Result<Option<String>> {
        self.film_repo().status(id).await
    }

    pub async fn films_by_genres(&self, genre_ids: &[i32]) -> Result<Vec<Film>> {
        self.film_repo().by_genres(genre_ids).await
    }

    pub async fn search_films_by_title(&self, title: &str) -> Result<Vec<Film>> {
        self.film_repo().search_by_title(title).await
    }

    pub async fn create_film(&self, input: &FilmInput, genre_names: &[String]) -> Result<i32> {
        self.film_repo().create(input, genre_names).await
    }

    pub async fn update_film(
        &self,
        id: i32,
        input: &FilmInput,
        genre_names: &[String],
    ) -> Result<bool> {
        self.film_repo().update(id, input, genre_names).await
    }

    pub async fn delete_film(&self, id: i32) -> Result<bool> {
        self.film_repo().delete(id).await
    }

    // ========================================================================
    // Genres
    // ========================================================================

    pub async fn list_genres(&self) -> Result<Vec<Genre>> {
        self.genre_repo().list().await
    }

    pub async fn get_genre_by_name(&self, name: &str) -> Result<Option<Genre>> {
        self.genre_repo().get_by_name(name).await
    }

    pub async fn create_genre(&self, name: &str) -> Result<i32> {
        self.genre_repo().create(name).await
    }

    pub async fn update_genre(&self, id: i32, name: &str) -> Result<bool> {
        self.genre_repo().update(id, name).await
    }

    // ========================================================================
    // Watch-List Ledger
    // ========================================================================

    pub async fn list_status_for(&self, user_id: i32, film_id: i32) -> Result<Option<String>> {
        self.list_repo().status_for(user_id, film_id).await
    }

    pub async fn add_list_entry(
        &self,
        user_id: i32,
        film_id: i32,
        list_type: &str,
    ) -> Result<bool> {
        self.list_repo().insert(user_id, film_id, list_type).await
    }

    pub async fn update_list_entry(
        &self,
        user_id: i32,
        film_id: i32,
        list_type: &str,
    ) -> Result<bool> {
        self.list_repo()
            .update_status(user_id, film_id, list_type)
            .await
    }

    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<WatchListEntry>> {
        self.list_repo().for_user(user_id).await
    }

    // ========================================================================
    // Reviews & Reactions
    // ========================================================================

    pub async fn add_review(
        &self,
        user_id: i32,
        film_id: i32,
        rating: i32,
        comment: &str,
    ) -> Result<Option<i32>> {
        self.review_repo()
            .insert(user_id, film_id, rating, comment)
            .await
    }

    pub async fn update_review_owned(
        &self,
        review_id: i32,
        user_id: i32,
        rating: i32,
        comment: &str,
    ) -> Result<bool> {
        self.review_repo()
            .update_owned(review_id, user_id, rating, comment)
            .await
    }

    pub async fn delete_review_owned(&self, review_id: i32, user_id: i32) -> Result<bool> {
        self.review_repo().delete_owned(review_id, user_id).await
    }

    pub async fn review_exists(&self, review_id: i32) -> Result<bool> {
        self.review_repo().exists(review_id).await
    }

    pub async fn reviews_for_film(&self, film_id: i32) -> Result<Vec<FilmReview>> {
        self.review_repo().for_film(film_id).await
    }

    pub async fn react_to_review(
        &self,
        review_id: i32,
        user_id: i32,
        reaction: &str,
    ) -> Result<()> {
        self.review_repo().react(review_id, user_id, reaction).await
    }

    pub async fn reaction_of(&self, review_id: i32, user_id: i32) -> Result<Option<String>> {
        self.review_repo().reaction_of(review_id, user_id).await
    }
}
