use anyhow::Result;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set, SqlErr,
};
use tracing::info;

use crate::entities::{films, prelude::*, user_film_list};
use crate::models::WatchListEntry;

#[derive(Debug, FromQueryResult)]
struct WatchListRow {
    film_id: i32,
    title: String,
    film_status: String,
    list_type: String,
    updated_at: String,
}

/// Repository for the per-(user, film) watch-list ledger.
pub struct ListRepository {
    conn: DatabaseConnection,
}

impl ListRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// The list_type of a user's entry for a film, if one exists.
    pub async fn status_for(&self, user_id: i32, film_id: i32) -> Result<Option<String>> {
        let entry = UserFilmList::find_by_id((user_id, film_id))
            .one(&self.conn)
            .await?;

        Ok(entry.map(|e| e.list_type))
    }

    /// Insert a new entry. Returns false when the (user, film) pair already
    /// has one; the composite primary key enforces this even under
    /// concurrent inserts.
    pub async fn insert(&self, user_id: i32, film_id: i32, list_type: &str) -> Result<bool> {
        let active = user_film_list::ActiveModel {
            user_id: Set(user_id),
            film_id: Set(film_id),
            list_type: Set(list_type.to_string()),
            updated_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        match UserFilmList::insert(active).exec(&self.conn).await {
            Ok(_) => {
                info!("User {} listed film {} as {}", user_id, film_id, list_type);
                Ok(true)
            }
            Err(e) => match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Ok(false),
                _ => Err(e.into()),
            },
        }
    }

    /// Overwrite the list_type of an existing entry. Returns false when the
    /// pair has no entry.
    pub async fn update_status(&self, user_id: i32, film_id: i32, list_type: &str) -> Result<bool> {
        let result = user_film_list::Entity::update_many()
            .col_expr(
                user_film_list::Column::ListType,
                sea_orm::sea_query::Expr::value(list_type),
            )
            .col_expr(
                user_film_list::Column::UpdatedAt,
                sea_orm::sea_query::Expr::value(chrono::Utc::now().to_rfc3339()),
            )
            .filter(user_film_list::Column::UserId.eq(user_id))
            .filter(user_film_list::Column::FilmId.eq(film_id))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// All of a user's entries joined with the films they point at.
    pub async fn for_user(&self, user_id: i32) -> Result<Vec<WatchListEntry>> {
        let rows = UserFilmList::find()
            .select_only()
            .column(user_film_list::Column::FilmId)
            .column_as(films::Column::Title, "title")
            .column_as(films::Column::Status, "film_status")
            .column(user_film_list::Column::ListType)
            .column(user_film_list::Column::UpdatedAt)
            .join(JoinType::InnerJoin, user_film_list::Relation::Films.def())
            .filter(user_film_list::Column::UserId.eq(user_id))
            .order_by_asc(user_film_list::Column::FilmId)
            .into_model::<WatchListRow>()
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| WatchListEntry {
                film_id: r.film_id,
                title: r.title,
                film_status: r.film_status,
                list_type: r.list_type,
                updated_at: r.updated_at,
            })
            .collect())
    }
}
