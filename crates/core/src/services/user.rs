//! User service.

use crate::services::authorization::AuthorizationGate;
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use gather_common::{AppError, AppResult, IdGenerator};
use gather_db::{entities::user, repositories::UserRepository};
use sea_orm::{IntoActiveModel, Set};
use serde::Deserialize;
use validator::Validate;

/// Input for creating a new user.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserInput {
    #[validate(length(min = 1, max = 128))]
    pub username: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    /// Role to assign; defaults to the built-in User role.
    pub role_id: Option<String>,
}

/// Credentials for logging in.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    #[validate(length(min = 1, max = 128))]
    pub username: String,

    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// User service for account lifecycle and login.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    gate: AuthorizationGate,
    default_role_id: String,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service. `default_role_id` is the configured id of
    /// the built-in User role.
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        gate: AuthorizationGate,
        default_role_id: String,
    ) -> Self {
        Self {
            user_repo,
            gate,
            default_role_id,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a new user account. Usernames are case-insensitive and unique
    /// across all accounts; a canceled account keeps its name, backed by the
    /// unconditional unique index on username.
    pub async fn create(&self, input: CreateUserInput) -> AppResult<user::Model> {
        input.validate()?;

        let username = input.username.to_lowercase();
        if self.user_repo.find_by_username(&username).await?.is_some() {
            return Err(AppError::AlreadyExists(format!(
                "Username {username} is taken"
            )));
        }

        let password_hash = hash_password(&input.password)?;
        let role_id = input
            .role_id
            .unwrap_or_else(|| self.default_role_id.clone());

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(username),
            role_id: Set(role_id),
            password_hash: Set(password_hash),
            canceled: Set(false),
        };

        let created = self.user_repo.create(model).await?;
        tracing::info!(user_id = %created.id, "Created user");
        Ok(created)
    }

    /// Verify credentials and return the account. Unknown usernames and wrong
    /// passwords are indistinguishable to the caller.
    pub async fn login(&self, input: LoginInput) -> AppResult<user::Model> {
        input.validate()?;

        let username = input.username.to_lowercase();
        let Some(found) = self.user_repo.find_active_by_username(&username).await? else {
            // Burn a hash so missing and present usernames take similar time.
            let _ = hash_password(&input.password);
            return Err(AppError::Unauthorized);
        };

        if !verify_password(&input.password, &found.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        Ok(found)
    }

    /// Active user by id.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_active_by_id(id).await
    }

    /// All active users.
    pub async fn list(&self) -> AppResult<Vec<user::Model>> {
        self.user_repo.find_active().await
    }

    /// Soft-delete a user. Only an active Admin may do this; on refusal the
    /// target account is untouched.
    pub async fn cancel(&self, id: &str, requester_id: &str) -> AppResult<user::Model> {
        if !self.gate.can_delete_user(requester_id).await? {
            return Err(AppError::BadRequest(
                "Requester may not delete users".to_string(),
            ));
        }

        let target = self.user_repo.get_active_by_id(id).await?;
        let mut active = target.into_active_model();
        active.canceled = Set(true);
        let canceled = self.user_repo.update(active).await?;
        tracing::info!(user_id = id, requester_id, "Canceled user");
        Ok(canceled)
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
