//! Role-based authorization checks for destructive operations.

use gather_common::{AppResult, Config};
use gather_db::{entities::event, repositories::UserRepository};

/// Authorization gate for destructive operations.
///
/// Checks are evaluated fully server-side per request; no session or token
/// state is cached.
#[derive(Clone)]
pub struct AuthorizationGate {
    user_repo: UserRepository,
    admin_role_id: String,
}

impl AuthorizationGate {
    /// Create a new authorization gate.
    #[must_use]
    pub fn new(user_repo: UserRepository, config: &Config) -> Self {
        Self {
            user_repo,
            admin_role_id: config.roles.admin_role_id.clone(),
        }
    }

    /// Whether the requester may cancel another user.
    ///
    /// True iff the requester resolves to an active user holding the Admin
    /// role.
    pub async fn can_delete_user(&self, requester_id: &str) -> AppResult<bool> {
        self.is_admin(requester_id).await
    }

    /// Whether the requester may mutate or cancel the given event.
    ///
    /// True iff the requester is the event's creator or an active Admin.
    pub async fn can_delete_event(
        &self,
        requester_id: &str,
        event: &event::Model,
    ) -> AppResult<bool> {
        if requester_id == event.creator_id {
            return Ok(true);
        }
        self.is_admin(requester_id).await
    }

    async fn is_admin(&self, user_id: &str) -> AppResult<bool> {
        Ok(self
            .user_repo
            .find_active_by_id(user_id)
            .await?
            .is_some_and(|u| u.role_id == self.admin_role_id))
    }
}
