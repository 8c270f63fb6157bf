//! The review engine.
//!
//! Reviewing a film is gated by the caller's relationship to it: the film
//! must be on their watch-list under a label other than `plan_to_watch`,
//! and must have aired. Gates run in a fixed order and the first failure
//! wins; nothing is written unless every gate passes.

use thiserror::Error;

use crate::db::Store;
use crate::models::{FilmReview, FilmStatus, ListType, Reaction};
use crate::services::auth::AuthenticatedIdentity;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 10;

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("{0}")]
    Validation(String),

    #[error("You can only review films that are in your list")]
    NotInList,

    #[error("You cannot review a film with the 'plan_to_watch' status")]
    PlanToWatch,

    #[error("You cannot review a film that has not yet aired")]
    NotYetAired,

    #[error("You have already reviewed this film")]
    AlreadyReviewed,

    #[error("Review not found")]
    ReviewNotFound,

    /// Absent review and foreign review are indistinguishable on purpose,
    /// so ownership checks don't leak other users' review ids.
    #[error("Review not found or not authorized")]
    NotFoundOrUnauthorized,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for ReviewError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

fn validate_rating_and_comment(rating: i32, comment: &str) -> Result<(), ReviewError> {
    if comment.trim().is_empty() {
        return Err(ReviewError::Validation(
            "Please provide both rating and comment".to_string(),
        ));
    }

    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(ReviewError::Validation(format!(
            "Rating must be between {MIN_RATING} and {MAX_RATING}"
        )));
    }

    Ok(())
}

pub struct ReviewService {
    store: Store,
}

impl ReviewService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Create a review. Preconditions, first failure wins:
    /// 1. rating in range, comment non-empty;
    /// 2. the film is on the caller's list;
    /// 3. the entry is not `plan_to_watch`;
    /// 4. the film is not `not_yet_aired`.
    /// Returns the new review id.
    pub async fn add_review(
        &self,
        identity: &AuthenticatedIdentity,
        film_id: i32,
        rating: i32,
        comment: &str,
    ) -> Result<i32, ReviewError> {
        validate_rating_and_comment(rating, comment)?;

        let list_status = self
            .store
            .list_status_for(identity.id, film_id)
            .await?
            .ok_or(ReviewError::NotInList)?;

        if list_status.parse::<ListType>() == Ok(ListType::PlanToWatch) {
            return Err(ReviewError::PlanToWatch);
        }

        let film_status = self.store.get_film_status(film_id).await?;
        if film_status.as_deref().and_then(|s| s.parse::<FilmStatus>().ok())
            == Some(FilmStatus::NotYetAired)
        {
            return Err(ReviewError::NotYetAired);
        }

        self.store
            .add_review(identity.id, film_id, rating, comment)
            .await?
            .ok_or(ReviewError::AlreadyReviewed)
    }

    /// Update a review the caller owns. Ownership is enforced by the storage
    /// layer's compound WHERE; a miss never says whether the review exists.
    pub async fn update_review(
        &self,
        identity: &AuthenticatedIdentity,
        review_id: i32,
        rating: i32,
        comment: &str,
    ) -> Result<(), ReviewError> {
        validate_rating_and_comment(rating, comment)?;

        let updated = self
            .store
            .update_review_owned(review_id, identity.id, rating, comment)
            .await?;

        if !updated {
            return Err(ReviewError::NotFoundOrUnauthorized);
        }

        Ok(())
    }

    /// Delete a review the caller owns, with the same ownership ambiguity
    /// as [`Self::update_review`].
    pub async fn delete_review(
        &self,
        identity: &AuthenticatedIdentity,
        review_id: i32,
    ) -> Result<(), ReviewError> {
        let deleted = self
            .store
            .delete_review_owned(review_id, identity.id)
            .await?;

        if !deleted {
            return Err(ReviewError::NotFoundOrUnauthorized);
        }

        Ok(())
    }

    /// React to a review with a like or dislike. One reaction per user per
    /// review; a repeat overwrites (last write wins).
    pub async fn react_to_review(
        &self,
        identity: &AuthenticatedIdentity,
        review_id: i32,
        reaction: &str,
    ) -> Result<Reaction, ReviewError> {
        let reaction: Reaction = reaction.parse().map_err(|()| {
            ReviewError::Validation("Invalid reaction. Must be 'like' or 'dislike'".to_string())
        })?;

        if !self.store.review_exists(review_id).await? {
            return Err(ReviewError::ReviewNotFound);
        }

        self.store
            .react_to_review(review_id, identity.id, reaction.as_str())
            .await?;

        Ok(reaction)
    }

    pub async fn reviews_for_film(&self, film_id: i32) -> Result<Vec<FilmReview>, ReviewError> {
        Ok(self.store.reviews_for_film(film_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_and_comment_validation() {
        assert!(validate_rating_and_comment(1, "fine").is_ok());
        assert!(validate_rating_and_comment(10, "great").is_ok());
        assert!(validate_rating_and_comment(0, "too low").is_err());
        assert!(validate_rating_and_comment(11, "too high").is_err());
        assert!(validate_rating_and_comment(5, "").is_err());
        assert!(validate_rating_and_comment(5, "   ").is_err());
    }
}
