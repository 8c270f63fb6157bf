use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::info;

use crate::entities::{genres, prelude::*};
use crate::models::Genre;

pub struct GenreRepository {
    conn: DatabaseConnection,
}

impl GenreRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(model: genres::Model) -> Genre {
        Genre {
            id: model.id,
            name: model.name,
        }
    }

    pub async fn list(&self) -> Result<Vec<Genre>> {
        let rows = Genres::find()
            .order_by_asc(genres::Column::Name)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Self::map_model).collect())
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<Genre>> {
        let row = Genres::find()
            .filter(genres::Column::Name.eq(name))
            .one(&self.conn)
            .await?;

        Ok(row.map(Self::map_model))
    }

    pub async fn create(&self, name: &str) -> Result<i32> {
        let active = genres::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        };

        let id = Genres::insert(active).exec(&self.conn).await?.last_insert_id;
        info!("Added genre {} ({})", name, id);
        Ok(id)
    }

    /// Rename a genre. Returns false when the genre does not exist.
    pub async fn update(&self, id: i32, name: &str) -> Result<bool> {
        let Some(existing) = Genres::find_by_id(id).one(&self.conn).await? else {
            return Ok(false);
        };

        let mut active: genres::ActiveModel = existing.into();
        active.name = Set(name.to_string());
        active.update(&self.conn).await?;

        Ok(true)
    }
}
