//! Engagement toggle engine.
//!
//! Registrations and favorites share the same toggle semantics: at most one
//! logical row per (event, user) pair, created on first use and flipped
//! between active and canceled afterwards. Setting an engagement is
//! idempotent; clearing one is no-op safe.

use std::sync::Arc;

use gather_common::{AppError, AppResult, IdGenerator};
use gather_db::{
    entities::{event, favorite, registration},
    repositories::{EventRepository, FavoriteRepository, RegistrationRepository},
};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, IntoActiveModel, Set,
    TransactionTrait,
};
use serde::Serialize;

/// Kind of engagement a user can have with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngagementKind {
    /// The user registered for the event.
    Registration,
    /// The user favorited the event.
    Favorite,
}

impl EngagementKind {
    /// Human-readable noun for error messages.
    #[must_use]
    pub const fn noun(self) -> &'static str {
        match self {
            Self::Registration => "Registration",
            Self::Favorite => "Favorite",
        }
    }
}

/// A registration or favorite row, unified across kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Engagement {
    pub id: String,
    pub event_id: String,
    pub user_id: String,
    pub canceled: bool,
}

impl From<registration::Model> for Engagement {
    fn from(m: registration::Model) -> Self {
        Self {
            id: m.id,
            event_id: m.event_id,
            user_id: m.user_id,
            canceled: m.canceled,
        }
    }
}

impl From<favorite::Model> for Engagement {
    fn from(m: favorite::Model) -> Self {
        Self {
            id: m.id,
            event_id: m.event_id,
            user_id: m.user_id,
            canceled: m.canceled,
        }
    }
}

/// Engagement service managing registration and favorite toggles.
#[derive(Clone)]
pub struct EngagementService {
    db: Arc<DatabaseConnection>,
    registration_repo: RegistrationRepository,
    favorite_repo: FavoriteRepository,
    event_repo: EventRepository,
    id_gen: IdGenerator,
}

impl EngagementService {
    /// Create a new engagement service.
    ///
    /// Takes the connection directly as well as the repositories: the toggle
    /// write path runs its lookup and insert in one transaction.
    #[must_use]
    pub const fn new(
        db: Arc<DatabaseConnection>,
        registration_repo: RegistrationRepository,
        favorite_repo: FavoriteRepository,
        event_repo: EventRepository,
    ) -> Self {
        Self {
            db,
            registration_repo,
            favorite_repo,
            event_repo,
            id_gen: IdGenerator::new(),
        }
    }

    async fn begin(&self) -> AppResult<DatabaseTransaction> {
        self.db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or reactivate an engagement. Idempotent.
    ///
    /// A unique-constraint violation during insert means a concurrent toggle
    /// created the row first; it is recovered by reactivating that row, never
    /// surfaced to the caller.
    pub async fn set(
        &self,
        kind: EngagementKind,
        event_id: &str,
        user_id: &str,
    ) -> AppResult<Engagement> {
        match kind {
            EngagementKind::Registration => self
                .set_registration(event_id, user_id)
                .await
                .map(Into::into),
            EngagementKind::Favorite => {
                self.set_favorite(event_id, user_id).await.map(Into::into)
            }
        }
    }

    /// Cancel an engagement. NotFound when no row has ever existed for the
    /// pair; clearing an already-canceled row succeeds and returns it.
    pub async fn clear(
        &self,
        kind: EngagementKind,
        event_id: &str,
        user_id: &str,
    ) -> AppResult<Engagement> {
        match kind {
            EngagementKind::Registration => {
                let row = self
                    .registration_repo
                    .find_by_event_and_user(event_id, user_id)
                    .await?
                    .ok_or_else(|| not_found(kind, event_id, user_id))?;
                if row.canceled {
                    return Ok(row.into());
                }
                let mut active = row.into_active_model();
                active.canceled = Set(true);
                self.registration_repo.update(active).await.map(Into::into)
            }
            EngagementKind::Favorite => {
                let row = self
                    .favorite_repo
                    .find_by_event_and_user(event_id, user_id)
                    .await?
                    .ok_or_else(|| not_found(kind, event_id, user_id))?;
                if row.canceled {
                    return Ok(row.into());
                }
                let mut active = row.into_active_model();
                active.canceled = Set(true);
                self.favorite_repo.update(active).await.map(Into::into)
            }
        }
    }

    /// Active events the user has an active engagement of `kind` with.
    ///
    /// Canceled engagements and canceled events are both filtered out.
    pub async fn list_active_events(
        &self,
        kind: EngagementKind,
        user_id: &str,
    ) -> AppResult<Vec<event::Model>> {
        let event_ids = match kind {
            EngagementKind::Registration => {
                self.registration_repo
                    .find_active_event_ids_by_user(user_id)
                    .await?
            }
            EngagementKind::Favorite => {
                self.favorite_repo
                    .find_active_event_ids_by_user(user_id)
                    .await?
            }
        };

        self.event_repo.find_active_by_ids(&event_ids).await
    }

    async fn set_registration(
        &self,
        event_id: &str,
        user_id: &str,
    ) -> AppResult<registration::Model> {
        let txn = self.begin().await?;

        if let Some(existing) =
            RegistrationRepository::find_by_event_and_user_in_conn(&txn, event_id, user_id).await?
        {
            let row = reactivate_registration(&txn, existing).await?;
            commit(txn).await?;
            return Ok(row);
        }

        let model = registration::ActiveModel {
            id: Set(self.id_gen.generate()),
            event_id: Set(event_id.to_string()),
            user_id: Set(user_id.to_string()),
            canceled: Set(false),
        };

        match RegistrationRepository::create_in_conn(&txn, model).await {
            Ok(row) => {
                commit(txn).await?;
                Ok(row)
            }
            Err(e) => {
                // The failed insert poisoned this transaction.
                let _ = txn.rollback().await;
                self.recover_registration_insert(e, event_id, user_id).await
            }
        }
    }

    /// Fallback when the first-time insert loses a race: a unique violation
    /// means a concurrent toggle created the row between our lookup and
    /// insert, so reactivate that row instead of surfacing the error. Any
    /// other insert error passes through.
    async fn recover_registration_insert(
        &self,
        err: AppError,
        event_id: &str,
        user_id: &str,
    ) -> AppResult<registration::Model> {
        let AppError::AlreadyExists(_) = err else {
            return Err(err);
        };

        tracing::debug!(event_id, user_id, "Registration insert raced, reactivating");
        let existing = self
            .registration_repo
            .find_by_event_and_user(event_id, user_id)
            .await?
            .ok_or_else(|| {
                AppError::Internal("registration vanished after unique violation".to_string())
            })?;
        reactivate_registration(self.db.as_ref(), existing).await
    }

    async fn set_favorite(&self, event_id: &str, user_id: &str) -> AppResult<favorite::Model> {
        let txn = self.begin().await?;

        if let Some(existing) =
            FavoriteRepository::find_by_event_and_user_in_conn(&txn, event_id, user_id).await?
        {
            let row = reactivate_favorite(&txn, existing).await?;
            commit(txn).await?;
            return Ok(row);
        }

        let model = favorite::ActiveModel {
            id: Set(self.id_gen.generate()),
            event_id: Set(event_id.to_string()),
            user_id: Set(user_id.to_string()),
            canceled: Set(false),
        };

        match FavoriteRepository::create_in_conn(&txn, model).await {
            Ok(row) => {
                commit(txn).await?;
                Ok(row)
            }
            Err(e) => {
                let _ = txn.rollback().await;
                self.recover_favorite_insert(e, event_id, user_id).await
            }
        }
    }

    /// Favorite counterpart of [`Self::recover_registration_insert`].
    async fn recover_favorite_insert(
        &self,
        err: AppError,
        event_id: &str,
        user_id: &str,
    ) -> AppResult<favorite::Model> {
        let AppError::AlreadyExists(_) = err else {
            return Err(err);
        };

        tracing::debug!(event_id, user_id, "Favorite insert raced, reactivating");
        let existing = self
            .favorite_repo
            .find_by_event_and_user(event_id, user_id)
            .await?
            .ok_or_else(|| {
                AppError::Internal("favorite vanished after unique violation".to_string())
            })?;
        reactivate_favorite(self.db.as_ref(), existing).await
    }
}

async fn commit(txn: DatabaseTransaction) -> AppResult<()> {
    txn.commit()
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}

async fn reactivate_registration<C: ConnectionTrait>(
    conn: &C,
    row: registration::Model,
) -> AppResult<registration::Model> {
    if !row.canceled {
        return Ok(row);
    }
    let mut active = row.into_active_model();
    active.canceled = Set(false);
    RegistrationRepository::update_in_conn(conn, active).await
}

async fn reactivate_favorite<C: ConnectionTrait>(
    conn: &C,
    row: favorite::Model,
) -> AppResult<favorite::Model> {
    if !row.canceled {
        return Ok(row);
    }
    let mut active = row.into_active_model();
    active.canceled = Set(false);
    FavoriteRepository::update_in_conn(conn, active).await
}

fn not_found(kind: EngagementKind, event_id: &str, user_id: &str) -> AppError {
    AppError::NotFound(format!(
        "{} for event {event_id} and user {user_id}",
        kind.noun()
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::sync::Arc;

    fn create_test_registration(id: &str, canceled: bool) -> registration::Model {
        registration::Model {
            id: id.to_string(),
            event_id: "event1".to_string(),
            user_id: "user1".to_string(),
            canceled,
        }
    }

    fn create_test_event(id: &str) -> event::Model {
        event::Model {
            id: id.to_string(),
            description: format!("Event {id}"),
            category: "music".to_string(),
            location: "Town Hall".to_string(),
            cost: "free".to_string(),
            start_time: Utc::now().into(),
            end_time: Utc::now().into(),
            event_link: None,
            creator_id: "user9".to_string(),
            updated_at: Utc::now().into(),
            canceled: false,
        }
    }

    fn service(db: Arc<sea_orm::DatabaseConnection>) -> EngagementService {
        EngagementService::new(
            Arc::clone(&db),
            RegistrationRepository::new(Arc::clone(&db)),
            FavoriteRepository::new(Arc::clone(&db)),
            EventRepository::new(db),
        )
    }

    #[tokio::test]
    async fn test_set_creates_when_absent() {
        let created = create_test_registration("reg1", false);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // lookup: no existing row
                .append_query_results([Vec::<registration::Model>::new()])
                // insert returning
                .append_query_results([[created.clone()]])
                .into_connection(),
        );

        let result = service(db)
            .set(EngagementKind::Registration, "event1", "user1")
            .await
            .unwrap();

        assert_eq!(result.id, "reg1");
        assert!(!result.canceled);
    }

    #[tokio::test]
    async fn test_set_is_idempotent() {
        // An existing active row is returned as-is; no second row, no write.
        let existing = create_test_registration("reg1", false);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing.clone()]])
                .append_query_results([[existing]])
                .into_connection(),
        );

        let svc = service(db);
        let first = svc
            .set(EngagementKind::Registration, "event1", "user1")
            .await
            .unwrap();
        let second = svc
            .set(EngagementKind::Registration, "event1", "user1")
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert!(!first.canceled);
        assert!(!second.canceled);
    }

    #[tokio::test]
    async fn test_set_reactivates_canceled_row() {
        // Registered, canceled, registered again: same row id all the way.
        let canceled = create_test_registration("reg1", true);
        let reactivated = create_test_registration("reg1", false);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // lookup finds the canceled row
                .append_query_results([[canceled]])
                // update returning
                .append_query_results([[reactivated.clone()]])
                .into_connection(),
        );

        let result = service(db)
            .set(EngagementKind::Registration, "event1", "user1")
            .await
            .unwrap();

        assert_eq!(result.id, "reg1");
        assert!(!result.canceled);
    }

    #[tokio::test]
    async fn test_set_clear_set_keeps_one_row() {
        // Register, cancel, register again: one logical row throughout.
        let created = create_test_registration("reg1", false);
        let canceled = create_test_registration("reg1", true);
        let reactivated = create_test_registration("reg1", false);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // set: lookup empty, insert
                .append_query_results([Vec::<registration::Model>::new()])
                .append_query_results([[created.clone()]])
                // clear: lookup, update
                .append_query_results([[created]])
                .append_query_results([[canceled.clone()]])
                // set: lookup finds canceled row, update
                .append_query_results([[canceled]])
                .append_query_results([[reactivated]])
                .into_connection(),
        );

        let svc = service(db);
        let first = svc
            .set(EngagementKind::Registration, "event1", "user1")
            .await
            .unwrap();
        let cleared = svc
            .clear(EngagementKind::Registration, "event1", "user1")
            .await
            .unwrap();
        let second = svc
            .set(EngagementKind::Registration, "event1", "user1")
            .await
            .unwrap();

        assert_eq!(first.id, "reg1");
        assert_eq!(cleared.id, "reg1");
        assert_eq!(second.id, "reg1");
        assert!(cleared.canceled);
        assert!(!second.canceled);
    }

    #[tokio::test]
    async fn test_clear_marks_canceled() {
        let active = create_test_registration("reg1", false);
        let canceled = create_test_registration("reg1", true);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[active]])
                .append_query_results([[canceled.clone()]])
                .into_connection(),
        );

        let result = service(db)
            .clear(EngagementKind::Registration, "event1", "user1")
            .await
            .unwrap();

        assert_eq!(result.id, "reg1");
        assert!(result.canceled);
    }

    #[tokio::test]
    async fn test_clear_twice_is_noop_safe() {
        // Second clear finds an already-canceled row and returns it unchanged.
        let canceled = create_test_registration("reg1", true);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[canceled]])
                .into_connection(),
        );

        let result = service(db)
            .clear(EngagementKind::Registration, "event1", "user1")
            .await
            .unwrap();

        assert_eq!(result.id, "reg1");
        assert!(result.canceled);
    }

    #[tokio::test]
    async fn test_clear_unknown_pair_is_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<favorite::Model>::new()])
                .into_connection(),
        );

        let result = service(db)
            .clear(EngagementKind::Favorite, "event1", "user1")
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_active_events_filters_cleared() {
        // Only event2 still has an active registration.
        let event2 = create_test_event("event2");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[btreemap! {"event_id" => Value::from("event2")}]])
                .append_query_results([[event2]])
                .into_connection(),
        );

        let result = service(db)
            .list_active_events(EngagementKind::Registration, "user1")
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "event2");
    }

    #[tokio::test]
    async fn test_lost_insert_race_reactivates_winner_row() {
        // A unique violation from the first-time insert means a concurrent
        // toggle created the row; the recovery path refetches it and flips
        // it active instead of surfacing the error.
        let winner = create_test_registration("reg1", true);
        let reactivated = create_test_registration("reg1", false);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // refetch finds the winner's row
                .append_query_results([[winner]])
                // update returning
                .append_query_results([[reactivated]])
                .into_connection(),
        );

        let result = service(db)
            .recover_registration_insert(
                AppError::AlreadyExists("duplicate key".to_string()),
                "event1",
                "user1",
            )
            .await
            .unwrap();

        assert_eq!(result.id, "reg1");
        assert!(!result.canceled);
    }

    #[tokio::test]
    async fn test_lost_insert_race_keeps_active_winner_row_unchanged() {
        // The winner's row is already active; recovery returns it without a
        // second write.
        let winner = create_test_registration("reg1", false);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[winner]])
                .into_connection(),
        );

        let result = service(db)
            .recover_registration_insert(
                AppError::AlreadyExists("duplicate key".to_string()),
                "event1",
                "user1",
            )
            .await
            .unwrap();

        assert_eq!(result.id, "reg1");
        assert!(!result.canceled);
    }

    #[tokio::test]
    async fn test_insert_recovery_passes_other_errors_through() {
        // Only unique violations are treated as a lost race; a referential
        // failure surfaces as-is, with no refetch.
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = service(db)
            .recover_registration_insert(
                AppError::BadRequest("no such event".to_string()),
                "event1",
                "user1",
            )
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_favorite_lost_insert_race_reactivates_winner_row() {
        let winner = favorite::Model {
            id: "fav1".to_string(),
            event_id: "event1".to_string(),
            user_id: "user1".to_string(),
            canceled: true,
        };
        let reactivated = favorite::Model {
            canceled: false,
            ..winner.clone()
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[winner]])
                .append_query_results([[reactivated]])
                .into_connection(),
        );

        let result = service(db)
            .recover_favorite_insert(
                AppError::AlreadyExists("duplicate key".to_string()),
                "event1",
                "user1",
            )
            .await
            .unwrap();

        assert_eq!(result.id, "fav1");
        assert!(!result.canceled);
    }

    #[tokio::test]
    async fn test_set_favorite_reactivates_canceled_row() {
        let canceled = favorite::Model {
            id: "fav1".to_string(),
            event_id: "event1".to_string(),
            user_id: "user1".to_string(),
            canceled: true,
        };
        let reactivated = favorite::Model {
            canceled: false,
            ..canceled.clone()
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[canceled]])
                .append_query_results([[reactivated]])
                .into_connection(),
        );

        let result = service(db)
            .set(EngagementKind::Favorite, "event1", "user1")
            .await
            .unwrap();

        assert_eq!(result.id, "fav1");
        assert!(!result.canceled);
    }
}
