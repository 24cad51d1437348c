//! Role management. The built-in User and Admin roles are seeded at startup;
//! operators can add more.

use gather_common::{AppError, AppResult, IdGenerator, config::RoleConfig};
use gather_db::{entities::role, repositories::RoleRepository};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Input for creating a role.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoleInput {
    #[validate(length(min = 1, max = 64))]
    pub name: String,
}

/// Role service.
#[derive(Clone)]
pub struct RoleService {
    role_repo: RoleRepository,
    id_gen: IdGenerator,
}

impl RoleService {
    /// Create a new role service.
    #[must_use]
    pub const fn new(role_repo: RoleRepository) -> Self {
        Self {
            role_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// All active roles, ordered by name.
    pub async fn list(&self) -> AppResult<Vec<role::Model>> {
        self.role_repo.find_active().await
    }

    /// Role by id, error if it never existed.
    pub async fn get(&self, id: &str) -> AppResult<role::Model> {
        self.role_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Role {id}")))
    }

    /// Create a role with a unique name.
    pub async fn create(&self, input: CreateRoleInput) -> AppResult<role::Model> {
        input.validate()?;

        if self.role_repo.find_by_name(&input.name).await?.is_some() {
            return Err(AppError::AlreadyExists(format!(
                "Role {} already exists",
                input.name
            )));
        }

        let model = role::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(input.name),
            canceled: Set(false),
        };

        self.role_repo.create(model).await
    }

    /// Ensure the built-in User and Admin roles exist under their configured
    /// ids. Called once at startup; existing rows are left untouched.
    pub async fn ensure_seed_roles(&self, roles: &RoleConfig) -> AppResult<()> {
        self.seed_role(&roles.user_role_id, "User").await?;
        self.seed_role(&roles.admin_role_id, "Admin").await
    }

    async fn seed_role(&self, id: &str, name: &str) -> AppResult<()> {
        if self.role_repo.find_by_id(id).await?.is_some() {
            return Ok(());
        }

        let model = role::ActiveModel {
            id: Set(id.to_string()),
            name: Set(name.to_string()),
            canceled: Set(false),
        };

        match self.role_repo.create(model).await {
            Ok(_) => {
                tracing::info!(role_id = id, role_name = name, "Seeded built-in role");
                Ok(())
            }
            // Another instance seeded it between our check and insert.
            Err(AppError::AlreadyExists(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_role(id: &str, name: &str) -> role::Model {
        role::Model {
            id: id.to_string(),
            name: name.to_string(),
            canceled: false,
        }
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_name() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_role("role1", "Organizer")]])
                .into_connection(),
        );
        let service = RoleService::new(RoleRepository::new(db));

        let result = service
            .create(CreateRoleInput {
                name: "Organizer".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_empty_name() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = RoleService::new(RoleRepository::new(db));

        let result = service
            .create(CreateRoleInput {
                name: String::new(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_seed_roles_skips_existing() {
        // Both built-in roles already present: no inserts are queued in the
        // mock, so reaching one would fail the test.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_role("role_user", "User")]])
                .append_query_results([[create_test_role("role_admin", "Admin")]])
                .into_connection(),
        );
        let service = RoleService::new(RoleRepository::new(db));

        let roles = RoleConfig {
            user_role_id: "role_user".to_string(),
            admin_role_id: "role_admin".to_string(),
        };

        service.ensure_seed_roles(&roles).await.unwrap();
    }

    #[tokio::test]
    async fn test_seed_roles_creates_missing() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<role::Model>::new()])
                .append_query_results([[create_test_role("role_user", "User")]])
                .append_query_results([Vec::<role::Model>::new()])
                .append_query_results([[create_test_role("role_admin", "Admin")]])
                .into_connection(),
        );
        let service = RoleService::new(RoleRepository::new(db));

        let roles = RoleConfig {
            user_role_id: "role_user".to_string(),
            admin_role_id: "role_admin".to_string(),
        };

        service.ensure_seed_roles(&roles).await.unwrap();
    }
}
