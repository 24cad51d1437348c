//! Database repositories.

use gather_common::AppError;
use sea_orm::{DbErr, SqlErr};

pub mod event;
pub mod favorite;
pub mod registration;
pub mod role;
pub mod share;
pub mod user;

pub use event::EventRepository;
pub use favorite::FavoriteRepository;
pub use registration::RegistrationRepository;
pub use role::RoleRepository;
pub use share::ShareRepository;
pub use user::UserRepository;

/// Map a write-path database error, distinguishing constraint failures.
///
/// Unique violations become [`AppError::AlreadyExists`] so the engagement
/// engine can recover from its lookup-then-insert race; referential
/// violations become [`AppError::BadRequest`].
pub(crate) fn map_write_err(e: DbErr) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => AppError::AlreadyExists(msg),
        Some(SqlErr::ForeignKeyConstraintViolation(msg)) => AppError::BadRequest(msg),
        _ => AppError::Database(e.to_string()),
    }
}
