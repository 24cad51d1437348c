//! Registration repository.

use std::sync::Arc;

use crate::entities::{Registration, registration};
use crate::repositories::map_write_err;
use gather_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QuerySelect,
};

/// Registration repository for database operations.
#[derive(Clone)]
pub struct RegistrationRepository {
    db: Arc<DatabaseConnection>,
}

impl RegistrationRepository {
    /// Create a new registration repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the registration for an (event, user) pair, in any canceled
    /// state.
    ///
    /// The unique index guarantees at most one row; more than one is a
    /// data-integrity bug and surfaces as `MultipleResults`.
    pub async fn find_by_event_and_user(
        &self,
        event_id: &str,
        user_id: &str,
    ) -> AppResult<Option<registration::Model>> {
        Self::find_by_event_and_user_in_conn(self.db.as_ref(), event_id, user_id).await
    }

    /// Same lookup on an explicit connection, for use inside a transaction.
    pub async fn find_by_event_and_user_in_conn<C: ConnectionTrait>(
        conn: &C,
        event_id: &str,
        user_id: &str,
    ) -> AppResult<Option<registration::Model>> {
        let rows = Registration::find()
            .filter(registration::Column::EventId.eq(event_id))
            .filter(registration::Column::UserId.eq(user_id))
            .limit(2)
            .all(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if rows.len() > 1 {
            return Err(AppError::MultipleResults(format!(
                "registration for event {event_id} and user {user_id}"
            )));
        }

        Ok(rows.into_iter().next())
    }

    /// Event ids with an active registration for the user.
    pub async fn find_active_event_ids_by_user(&self, user_id: &str) -> AppResult<Vec<String>> {
        Registration::find()
            .select_only()
            .column(registration::Column::EventId)
            .filter(registration::Column::UserId.eq(user_id))
            .filter(registration::Column::Canceled.eq(false))
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Event ids the user has ever registered for, in any canceled state.
    ///
    /// Cancellation never shrinks this set; the suggestion engine relies on
    /// that to keep once-known events out of the candidate pool.
    pub async fn find_event_ids_by_user(&self, user_id: &str) -> AppResult<Vec<String>> {
        Registration::find()
            .select_only()
            .column(registration::Column::EventId)
            .filter(registration::Column::UserId.eq(user_id))
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count active registrations for an event.
    pub async fn count_active_by_event(&self, event_id: &str) -> AppResult<u64> {
        Registration::find()
            .filter(registration::Column::EventId.eq(event_id))
            .filter(registration::Column::Canceled.eq(false))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a new registration on an explicit connection.
    pub async fn create_in_conn<C: ConnectionTrait>(
        conn: &C,
        model: registration::ActiveModel,
    ) -> AppResult<registration::Model> {
        model.insert(conn).await.map_err(map_write_err)
    }

    /// Update a registration.
    pub async fn update(&self, model: registration::ActiveModel) -> AppResult<registration::Model> {
        Self::update_in_conn(self.db.as_ref(), model).await
    }

    /// Update a registration on an explicit connection.
    pub async fn update_in_conn<C: ConnectionTrait>(
        conn: &C,
        model: registration::ActiveModel,
    ) -> AppResult<registration::Model> {
        model.update(conn).await.map_err(map_write_err)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};

    fn create_test_registration(id: &str, event_id: &str, user_id: &str) -> registration::Model {
        registration::Model {
            id: id.to_string(),
            event_id: event_id.to_string(),
            user_id: user_id.to_string(),
            canceled: false,
        }
    }

    #[tokio::test]
    async fn test_find_by_event_and_user() {
        let reg = create_test_registration("reg1", "event1", "user1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[reg.clone()]])
                .into_connection(),
        );

        let repo = RegistrationRepository::new(db);
        let result = repo.find_by_event_and_user("event1", "user1").await.unwrap();

        assert_eq!(result.unwrap().id, "reg1");
    }

    #[tokio::test]
    async fn test_find_by_event_and_user_multiple_is_critical() {
        let reg1 = create_test_registration("reg1", "event1", "user1");
        let reg2 = create_test_registration("reg2", "event1", "user1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[reg1, reg2]])
                .into_connection(),
        );

        let repo = RegistrationRepository::new(db);
        let result = repo.find_by_event_and_user("event1", "user1").await;

        assert!(matches!(result, Err(AppError::MultipleResults(_))));
    }

    #[tokio::test]
    async fn test_find_active_event_ids_by_user() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    btreemap! {"event_id" => Value::from("event1")},
                    btreemap! {"event_id" => Value::from("event2")},
                ]])
                .into_connection(),
        );

        let repo = RegistrationRepository::new(db);
        let result = repo.find_active_event_ids_by_user("user1").await.unwrap();

        assert_eq!(result, vec!["event1".to_string(), "event2".to_string()]);
    }

    #[tokio::test]
    async fn test_count_active_by_event() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[btreemap! {"num_items" => Value::from(2i64)}]])
                .into_connection(),
        );

        let repo = RegistrationRepository::new(db);
        let result = repo.count_active_by_event("event1").await.unwrap();

        assert_eq!(result, 2);
    }
}
