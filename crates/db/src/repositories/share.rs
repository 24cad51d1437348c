//! Share repository.

use std::sync::Arc;

use crate::entities::{Share, share};
use crate::repositories::map_write_err;
use gather_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
};

/// Share repository for database operations.
#[derive(Clone)]
pub struct ShareRepository {
    db: Arc<DatabaseConnection>,
}

impl ShareRepository {
    /// Create a new share repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Count all shares for an event. Shares are never canceled.
    pub async fn count_by_event(&self, event_id: &str) -> AppResult<u64> {
        Share::find()
            .filter(share::Column::EventId.eq(event_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new share.
    pub async fn create(&self, model: share::ActiveModel) -> AppResult<share::Model> {
        model.insert(self.db.as_ref()).await.map_err(map_write_err)
    }
}
