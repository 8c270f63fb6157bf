use anyhow::Result;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set, SqlErr, TransactionTrait,
    sea_query::{Expr, OnConflict},
};
use std::collections::HashMap;
use tracing::info;

use crate::entities::{prelude::*, review_reactions, reviews, users};
use crate::models::FilmReview;

#[derive(Debug, FromQueryResult)]
struct FilmReviewRow {
    review_id: i32,
    rating: i32,
    comment: String,
    created_at: String,
    updated_at: String,
    user_id: i32,
    username: String,
    display_name: String,
}

#[derive(Debug, FromQueryResult)]
struct ReactionCountRow {
    review_id: i32,
    reaction: String,
    count: i64,
}

pub struct ReviewRepository {
    conn: DatabaseConnection,
}

impl ReviewRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert a review with created_at = updated_at = now. Returns the new
    /// review id, or None when the (user, film) pair already has one.
    pub async fn insert(
        &self,
        user_id: i32,
        film_id: i32,
        rating: i32,
        comment: &str,
    ) -> Result<Option<i32>> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = reviews::ActiveModel {
            user_id: Set(user_id),
            film_id: Set(film_id),
            rating: Set(rating),
            comment: Set(comment.to_string()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        match Reviews::insert(active).exec(&self.conn).await {
            Ok(res) => {
                info!("User {} reviewed film {}", user_id, film_id);
                Ok(Some(res.last_insert_id))
            }
            Err(e) => match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Ok(None),
                _ => Err(e.into()),
            },
        }
    }

    /// Update rating/comment/updated_at through a compound WHERE on both the
    /// review id and the owner. Zero rows affected means the review is
    /// absent or owned by someone else; the two cases are indistinguishable
    /// on purpose.
    pub async fn update_owned(
        &self,
        review_id: i32,
        user_id: i32,
        rating: i32,
        comment: &str,
    ) -> Result<bool> {
        let result = reviews::Entity::update_many()
            .col_expr(reviews::Column::Rating, Expr::value(rating))
            .col_expr(reviews::Column::Comment, Expr::value(comment))
            .col_expr(
                reviews::Column::UpdatedAt,
                Expr::value(chrono::Utc::now().to_rfc3339()),
            )
            .filter(reviews::Column::Id.eq(review_id))
            .filter(reviews::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Delete with the same compound-WHERE ownership semantics as
    /// [`Self::update_owned`]. Reactions go with the review, in one
    /// transaction.
    pub async fn delete_owned(&self, review_id: i32, user_id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        // Compound filter keeps "absent" and "not owned" indistinguishable.
        let Some(review) = Reviews::find()
            .filter(reviews::Column::Id.eq(review_id))
            .filter(reviews::Column::UserId.eq(user_id))
            .one(&txn)
            .await?
        else {
            txn.rollback().await?;
            return Ok(false);
        };

        review_reactions::Entity::delete_many()
            .filter(review_reactions::Column::ReviewId.eq(review.id))
            .exec(&txn)
            .await?;

        Reviews::delete_by_id(review.id).exec(&txn).await?;

        txn.commit().await?;

        info!("User {} deleted review {}", user_id, review_id);
        Ok(true)
    }

    pub async fn exists(&self, review_id: i32) -> Result<bool> {
        let review = Reviews::find_by_id(review_id).one(&self.conn).await?;
        Ok(review.is_some())
    }

    /// Reaction tallies per review, split into likes and dislikes.
    async fn reaction_counts(&self, review_ids: &[i32]) -> Result<HashMap<i32, (i64, i64)>> {
        if review_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = ReviewReactions::find()
            .select_only()
            .column(review_reactions::Column::ReviewId)
            .column(review_reactions::Column::Reaction)
            .column_as(review_reactions::Column::UserId.count(), "count")
            .filter(review_reactions::Column::ReviewId.is_in(review_ids.iter().copied()))
            .group_by(review_reactions::Column::ReviewId)
            .group_by(review_reactions::Column::Reaction)
            .into_model::<ReactionCountRow>()
            .all(&self.conn)
            .await?;

        let mut map: HashMap<i32, (i64, i64)> = HashMap::new();
        for row in rows {
            let entry = map.entry(row.review_id).or_default();
            match row.reaction.as_str() {
                "like" => entry.0 = row.count,
                "dislike" => entry.1 = row.count,
                _ => {}
            }
        }

        Ok(map)
    }

    /// All reviews for a film joined with the reviewer's public identity and
    /// reaction tallies, in insertion order.
    pub async fn for_film(&self, film_id: i32) -> Result<Vec<FilmReview>> {
        let rows = Reviews::find()
            .select_only()
            .column_as(reviews::Column::Id, "review_id")
            .column(reviews::Column::Rating)
            .column(reviews::Column::Comment)
            .column(reviews::Column::CreatedAt)
            .column(reviews::Column::UpdatedAt)
            .column_as(users::Column::Id, "user_id")
            .column(users::Column::Username)
            .column(users::Column::DisplayName)
            .join(JoinType::InnerJoin, reviews::Relation::Users.def())
            .filter(reviews::Column::FilmId.eq(film_id))
            .order_by_asc(reviews::Column::Id)
            .into_model::<FilmReviewRow>()
            .all(&self.conn)
            .await?;

        let ids: Vec<i32> = rows.iter().map(|r| r.review_id).collect();
        let counts = self.reaction_counts(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|r| {
                let (likes, dislikes) = counts.get(&r.review_id).copied().unwrap_or((0, 0));
                FilmReview {
                    review_id: r.review_id,
                    rating: r.rating,
                    comment: r.comment,
                    created_at: r.created_at,
                    updated_at: r.updated_at,
                    user_id: r.user_id,
                    username: r.username,
                    display_name: r.display_name,
                    likes,
                    dislikes,
                }
            })
            .collect())
    }

    /// Upsert a reaction keyed on (review_id, user_id): insert when absent,
    /// overwrite reaction + updated_at when present. Repeating the same
    /// reaction leaves state unchanged but still writes.
    pub async fn react(&self, review_id: i32, user_id: i32, reaction: &str) -> Result<()> {
        let active = review_reactions::ActiveModel {
            review_id: Set(review_id),
            user_id: Set(user_id),
            reaction: Set(reaction.to_string()),
            updated_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        ReviewReactions::insert(active)
            .on_conflict(
                OnConflict::columns([
                    review_reactions::Column::ReviewId,
                    review_reactions::Column::UserId,
                ])
                .update_columns([
                    review_reactions::Column::Reaction,
                    review_reactions::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        info!("User {} {}d review {}", user_id, reaction, review_id);
        Ok(())
    }

    /// The stored reaction of a user on a review, if any.
    pub async fn reaction_of(&self, review_id: i32, user_id: i32) -> Result<Option<String>> {
        let row = ReviewReactions::find_by_id((review_id, user_id))
            .one(&self.conn)
            .await?;

        Ok(row.map(|r| r.reaction))
    }
}
