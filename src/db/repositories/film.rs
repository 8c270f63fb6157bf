use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
    TransactionTrait,
};
use std::collections::HashMap;
use tracing::info;

use crate::entities::{film_genres, films, genres, prelude::*, review_reactions, reviews, user_film_list};
use crate::models::{Film, Genre, round_rating};

/// Fields required to create or replace a film row.
pub struct FilmInput {
    pub title: String,
    pub synopsis: String,
    pub status: String,
    pub total_episodes: i32,
    pub release_date: String,
}

#[derive(Debug, FromQueryResult)]
struct RatingAggRow {
    film_id: i32,
    rating_sum: Option<i64>,
    rating_count: i64,
}

pub struct FilmRepository {
    conn: DatabaseConnection,
}

impl FilmRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    // ========================================================================
    // Model Conversion Helpers
    // ========================================================================

    fn map_model_to_film(
        model: films::Model,
        genres: Vec<Genre>,
        average_rating: f64,
    ) -> Film {
        Film {
            id: model.id,
            title: model.title,
            synopsis: model.synopsis,
            status: model.status,
            total_episodes: model.total_episodes,
            release_date: model.release_date,
            genres,
            average_rating,
        }
    }

    /// Genres per film for the given film ids.
    async fn genres_for_films(&self, film_ids: &[i32]) -> Result<HashMap<i32, Vec<Genre>>> {
        if film_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = FilmGenres::find()
            .find_also_related(Genres)
            .filter(film_genres::Column::FilmId.is_in(film_ids.iter().copied()))
            .all(&self.conn)
            .await?;

        let mut map: HashMap<i32, Vec<Genre>> = HashMap::new();
        for (link, genre) in rows {
            if let Some(genre) = genre {
                map.entry(link.film_id).or_default().push(Genre {
                    id: genre.id,
                    name: genre.name,
                });
            }
        }

        Ok(map)
    }

    /// Mean review rating per film, rounded to 2 decimal places. Films with
    /// no reviews are simply absent from the map. Computed at read time;
    /// nothing is cached.
    async fn average_ratings(&self, film_ids: &[i32]) -> Result<HashMap<i32, f64>> {
        if film_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = Reviews::find()
            .select_only()
            .column(reviews::Column::FilmId)
            .column_as(reviews::Column::Rating.sum(), "rating_sum")
            .column_as(reviews::Column::Rating.count(), "rating_count")
            .filter(reviews::Column::FilmId.is_in(film_ids.iter().copied()))
            .group_by(reviews::Column::FilmId)
            .into_model::<RatingAggRow>()
            .all(&self.conn)
            .await?;

        let mut map = HashMap::new();
        for row in rows {
            if row.rating_count > 0 {
                let sum = row.rating_sum.unwrap_or(0) as f64;
                map.insert(row.film_id, round_rating(sum / row.rating_count as f64));
            }
        }

        Ok(map)
    }

    async fn assemble(&self, models: Vec<films::Model>) -> Result<Vec<Film>> {
        let ids: Vec<i32> = models.iter().map(|f| f.id).collect();
        let mut genre_map = self.genres_for_films(&ids).await?;
        let rating_map = self.average_ratings(&ids).await?;

        Ok(models
            .into_iter()
            .map(|model| {
                let genres = genre_map.remove(&model.id).unwrap_or_default();
                let rating = rating_map.get(&model.id).copied().unwrap_or(0.0);
                Self::map_model_to_film(model, genres, rating)
            })
            .collect())
    }

    // ========================================================================
    // Catalog Reads
    // ========================================================================

    pub async fn list(&self) -> Result<Vec<Film>> {
        let models = Films::find()
            .order_by_asc(films::Column::Id)
            .all(&self.conn)
            .await?;

        self.assemble(models).await
    }

    pub async fn get(&self, id: i32) -> Result<Option<Film>> {
        let model = Films::find_by_id(id).one(&self.conn).await?;

        let Some(model) = model else {
            return Ok(None);
        };

        Ok(self.assemble(vec![model]).await?.into_iter().next())
    }

    /// Global catalog status of a film, or None when the film is unknown.
    pub async fn status(&self, id: i32) -> Result<Option<String>> {
        let model = Films::find_by_id(id).one(&self.conn).await?;
        Ok(model.map(|f| f.status))
    }

    pub async fn by_genres(&self, genre_ids: &[i32]) -> Result<Vec<Film>> {
        let models = Films::find()
            .join(JoinType::InnerJoin, films::Relation::FilmGenres.def())
            .filter(film_genres::Column::GenreId.is_in(genre_ids.iter().copied()))
            .distinct()
            .order_by_asc(films::Column::Id)
            .all(&self.conn)
            .await?;

        self.assemble(models).await
    }

    /// Case-insensitive substring match on the title.
    pub async fn search_by_title(&self, title: &str) -> Result<Vec<Film>> {
        let models = Films::find()
            .filter(films::Column::Title.contains(title))
            .order_by_asc(films::Column::Id)
            .all(&self.conn)
            .await?;

        self.assemble(models).await
    }

    // ========================================================================
    // Catalog Writes (transactional)
    // ========================================================================

    /// Insert a film and its genre links in one transaction. Genres are
    /// resolved by name, created when missing.
    pub async fn create(&self, input: &FilmInput, genre_names: &[String]) -> Result<i32> {
        let txn = self.conn.begin().await?;

        let active = films::ActiveModel {
            title: Set(input.title.clone()),
            synopsis: Set(input.synopsis.clone()),
            status: Set(input.status.clone()),
            total_episodes: Set(input.total_episodes),
            release_date: Set(input.release_date.clone()),
            ..Default::default()
        };

        let film_id = Films::insert(active).exec(&txn).await?.last_insert_id;

        Self::link_genres(&txn, film_id, genre_names).await?;

        txn.commit().await?;

        info!("Added film {} ({})", input.title, film_id);
        Ok(film_id)
    }

    /// Replace a film's fields and genre links in one transaction.
    /// Returns false when the film does not exist.
    pub async fn update(&self, id: i32, input: &FilmInput, genre_names: &[String]) -> Result<bool> {
        let txn = self.conn.begin().await?;

        let Some(existing) = Films::find_by_id(id).one(&txn).await? else {
            txn.rollback().await?;
            return Ok(false);
        };

        let mut active: films::ActiveModel = existing.into();
        active.title = Set(input.title.clone());
        active.synopsis = Set(input.synopsis.clone());
        active.status = Set(input.status.clone());
        active.total_episodes = Set(input.total_episodes);
        active.release_date = Set(input.release_date.clone());
        active.update(&txn).await?;

        film_genres::Entity::delete_many()
            .filter(film_genres::Column::FilmId.eq(id))
            .exec(&txn)
            .await?;

        Self::link_genres(&txn, id, genre_names).await?;

        txn.commit().await?;

        info!("Updated film {}", id);
        Ok(true)
    }

    /// Delete a film and everything hanging off it (genre links, list
    /// entries, reviews and their reactions) in one transaction.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        let review_ids: Vec<i32> = Reviews::find()
            .select_only()
            .column(reviews::Column::Id)
            .filter(reviews::Column::FilmId.eq(id))
            .into_tuple()
            .all(&txn)
            .await?;

        if !review_ids.is_empty() {
            review_reactions::Entity::delete_many()
                .filter(review_reactions::Column::ReviewId.is_in(review_ids))
                .exec(&txn)
                .await?;
        }

        reviews::Entity::delete_many()
            .filter(reviews::Column::FilmId.eq(id))
            .exec(&txn)
            .await?;

        user_film_list::Entity::delete_many()
            .filter(user_film_list::Column::FilmId.eq(id))
            .exec(&txn)
            .await?;

        film_genres::Entity::delete_many()
            .filter(film_genres::Column::FilmId.eq(id))
            .exec(&txn)
            .await?;

        let result = Films::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;

        let removed = result.rows_affected > 0;
        if removed {
            info!("Removed film with ID: {}", id);
        }
        Ok(removed)
    }

    /// Resolve genre names to ids (creating missing ones) and link them to
    /// the film. Duplicate names in the input are linked once.
    async fn link_genres<C: ConnectionTrait>(
        txn: &C,
        film_id: i32,
        genre_names: &[String],
    ) -> Result<()> {
        let mut seen: Vec<i32> = Vec::new();

        for name in genre_names {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }

            let genre_id = match Genres::find()
                .filter(genres::Column::Name.eq(name))
                .one(txn)
                .await?
            {
                Some(genre) => genre.id,
                None => {
                    let active = genres::ActiveModel {
                        name: Set(name.to_string()),
                        ..Default::default()
                    };
                    Genres::insert(active).exec(txn).await?.last_insert_id
                }
            };

            if seen.contains(&genre_id) {
                continue;
            }
            seen.push(genre_id);

            let link = film_genres::ActiveModel {
                film_id: Set(film_id),
                genre_id: Set(genre_id),
            };
            FilmGenres::insert(link).exec(txn).await?;
        }

        Ok(())
    }
}
