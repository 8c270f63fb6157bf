//! The watch-list status machine.
//!
//! The five list labels carry no transition rules among themselves; the one
//! business gate sits at creation time, where a film that has not yet aired
//! only admits `plan_to_watch`. Status updates deliberately skip that gate.

use thiserror::Error;

use crate::db::Store;
use crate::models::{FilmStatus, ListType, WatchListEntry};
use crate::services::auth::AuthenticatedIdentity;

#[derive(Debug, Error)]
pub enum ListError {
    #[error("Invalid list type")]
    InvalidListType,

    #[error("Film not found")]
    FilmNotFound,

    #[error("Films not yet aired can only be added as 'plan_to_watch'")]
    NotYetAired,

    #[error("Film is already in the user's list")]
    AlreadyInList,

    #[error("Film not found in the user's list")]
    NotInList,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for ListError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

pub struct WatchlistService {
    store: Store,
}

impl WatchlistService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Create a list entry for (user, film). Gates, in order: the label must
    /// be one of the five list types; the film must exist; a not-yet-aired
    /// film only accepts `plan_to_watch`. An existing entry is a conflict —
    /// `update_status` is the mutation path.
    pub async fn add_to_list(
        &self,
        identity: &AuthenticatedIdentity,
        film_id: i32,
        list_type: &str,
    ) -> Result<(), ListError> {
        let list_type: ListType = list_type.parse().map_err(|()| ListError::InvalidListType)?;

        let film_status = self
            .store
            .get_film_status(film_id)
            .await?
            .ok_or(ListError::FilmNotFound)?;

        if film_status.parse::<FilmStatus>() == Ok(FilmStatus::NotYetAired)
            && list_type != ListType::PlanToWatch
        {
            return Err(ListError::NotYetAired);
        }

        let inserted = self
            .store
            .add_list_entry(identity.id, film_id, list_type.as_str())
            .await?;

        if !inserted {
            return Err(ListError::AlreadyInList);
        }

        Ok(())
    }

    /// Overwrite the label of an existing entry. Any label may replace any
    /// other; the not-yet-aired gate applies only at creation.
    pub async fn update_status(
        &self,
        identity: &AuthenticatedIdentity,
        film_id: i32,
        list_type: &str,
    ) -> Result<(), ListError> {
        let list_type: ListType = list_type.parse().map_err(|()| ListError::InvalidListType)?;

        let updated = self
            .store
            .update_list_entry(identity.id, film_id, list_type.as_str())
            .await?;

        if !updated {
            return Err(ListError::NotInList);
        }

        Ok(())
    }

    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<WatchListEntry>, ListError> {
        Ok(self.store.list_for_user(user_id).await?)
    }
}
