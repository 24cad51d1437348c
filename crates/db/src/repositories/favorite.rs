//! Favorite repository.

use std::sync::Arc;

use crate::entities::{Favorite, favorite};
use crate::repositories::map_write_err;
use gather_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QuerySelect,
};

/// Favorite repository for database operations.
#[derive(Clone)]
pub struct FavoriteRepository {
    db: Arc<DatabaseConnection>,
}

impl FavoriteRepository {
    /// Create a new favorite repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the favorite for an (event, user) pair, in any canceled state.
    ///
    /// The unique index guarantees at most one row; more than one is a
    /// data-integrity bug and surfaces as `MultipleResults`.
    pub async fn find_by_event_and_user(
        &self,
        event_id: &str,
        user_id: &str,
    ) -> AppResult<Option<favorite::Model>> {
        Self::find_by_event_and_user_in_conn(self.db.as_ref(), event_id, user_id).await
    }

    /// Same lookup on an explicit connection, for use inside a transaction.
    pub async fn find_by_event_and_user_in_conn<C: ConnectionTrait>(
        conn: &C,
        event_id: &str,
        user_id: &str,
    ) -> AppResult<Option<favorite::Model>> {
        let rows = Favorite::find()
            .filter(favorite::Column::EventId.eq(event_id))
            .filter(favorite::Column::UserId.eq(user_id))
            .limit(2)
            .all(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if rows.len() > 1 {
            return Err(AppError::MultipleResults(format!(
                "favorite for event {event_id} and user {user_id}"
            )));
        }

        Ok(rows.into_iter().next())
    }

    /// Event ids with an active favorite for the user.
    pub async fn find_active_event_ids_by_user(&self, user_id: &str) -> AppResult<Vec<String>> {
        Favorite::find()
            .select_only()
            .column(favorite::Column::EventId)
            .filter(favorite::Column::UserId.eq(user_id))
            .filter(favorite::Column::Canceled.eq(false))
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Event ids the user has ever favorited, in any canceled state.
    pub async fn find_event_ids_by_user(&self, user_id: &str) -> AppResult<Vec<String>> {
        Favorite::find()
            .select_only()
            .column(favorite::Column::EventId)
            .filter(favorite::Column::UserId.eq(user_id))
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count active favorites for an event.
    pub async fn count_active_by_event(&self, event_id: &str) -> AppResult<u64> {
        Favorite::find()
            .filter(favorite::Column::EventId.eq(event_id))
            .filter(favorite::Column::Canceled.eq(false))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a new favorite on an explicit connection.
    pub async fn create_in_conn<C: ConnectionTrait>(
        conn: &C,
        model: favorite::ActiveModel,
    ) -> AppResult<favorite::Model> {
        model.insert(conn).await.map_err(map_write_err)
    }

    /// Update a favorite.
    pub async fn update(&self, model: favorite::ActiveModel) -> AppResult<favorite::Model> {
        Self::update_in_conn(self.db.as_ref(), model).await
    }

    /// Update a favorite on an explicit connection.
    pub async fn update_in_conn<C: ConnectionTrait>(
        conn: &C,
        model: favorite::ActiveModel,
    ) -> AppResult<favorite::Model> {
        model.update(conn).await.map_err(map_write_err)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};

    fn create_test_favorite(id: &str, event_id: &str, user_id: &str) -> favorite::Model {
        favorite::Model {
            id: id.to_string(),
            event_id: event_id.to_string(),
            user_id: user_id.to_string(),
            canceled: false,
        }
    }

    #[tokio::test]
    async fn test_find_by_event_and_user_none() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<favorite::Model>::new()])
                .into_connection(),
        );

        let repo = FavoriteRepository::new(db);
        let result = repo.find_by_event_and_user("event1", "user1").await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_find_by_event_and_user_found() {
        let fav = create_test_favorite("fav1", "event1", "user1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[fav]])
                .into_connection(),
        );

        let repo = FavoriteRepository::new(db);
        let result = repo.find_by_event_and_user("event1", "user1").await.unwrap();

        assert_eq!(result.unwrap().id, "fav1");
    }

    #[tokio::test]
    async fn test_find_event_ids_by_user_includes_canceled() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[btreemap! {"event_id" => Value::from("event1")}]])
                .into_connection(),
        );

        let repo = FavoriteRepository::new(db);
        let result = repo.find_event_ids_by_user("user1").await.unwrap();

        assert_eq!(result, vec!["event1".to_string()]);
    }
}
