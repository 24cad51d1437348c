//! Event repository.

use std::sync::Arc;

use crate::entities::{Event, event};
use crate::repositories::map_write_err;
use gather_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// Event repository for database operations.
#[derive(Clone)]
pub struct EventRepository {
    db: Arc<DatabaseConnection>,
}

impl EventRepository {
    /// Create a new event repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an event by ID, in any canceled state.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<event::Model>> {
        Event::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an active event by ID.
    pub async fn find_active_by_id(&self, id: &str) -> AppResult<Option<event::Model>> {
        Event::find_by_id(id)
            .filter(event::Column::Canceled.eq(false))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an active event by ID, returning an error if not found.
    pub async fn get_active_by_id(&self, id: &str) -> AppResult<event::Model> {
        self.find_active_by_id(id)
            .await?
            .ok_or_else(|| AppError::EventNotFound(id.to_string()))
    }

    /// Find an active event by description.
    pub async fn find_active_by_description(
        &self,
        description: &str,
    ) -> AppResult<Option<event::Model>> {
        Event::find()
            .filter(event::Column::Description.eq(description))
            .filter(event::Column::Canceled.eq(false))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List active events.
    pub async fn find_active(&self) -> AppResult<Vec<event::Model>> {
        Event::find()
            .filter(event::Column::Canceled.eq(false))
            .order_by_asc(event::Column::StartTime)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find events by IDs, in any canceled state.
    ///
    /// The suggestion engine reads interest categories from canceled events
    /// too, so no canceled filter here.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<event::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Event::find()
            .filter(event::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find active events by IDs.
    pub async fn find_active_by_ids(&self, ids: &[String]) -> AppResult<Vec<event::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Event::find()
            .filter(event::Column::Id.is_in(ids.to_vec()))
            .filter(event::Column::Canceled.eq(false))
            .order_by_asc(event::Column::StartTime)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find active events in the given categories, excluding known ids.
    pub async fn find_active_in_categories_excluding(
        &self,
        categories: &[String],
        excluded_ids: &[String],
    ) -> AppResult<Vec<event::Model>> {
        if categories.is_empty() {
            return Ok(vec![]);
        }

        let mut query = Event::find()
            .filter(event::Column::Category.is_in(categories.to_vec()))
            .filter(event::Column::Canceled.eq(false));

        if !excluded_ids.is_empty() {
            query = query.filter(event::Column::Id.is_not_in(excluded_ids.to_vec()));
        }

        query
            .order_by_asc(event::Column::StartTime)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new event.
    pub async fn create(&self, model: event::ActiveModel) -> AppResult<event::Model> {
        model.insert(self.db.as_ref()).await.map_err(map_write_err)
    }

    /// Update an event.
    pub async fn update(&self, model: event::ActiveModel) -> AppResult<event::Model> {
        model.update(self.db.as_ref()).await.map_err(map_write_err)
    }
}
