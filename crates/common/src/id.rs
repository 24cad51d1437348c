//! ID generation utilities.

use uuid::Uuid;

/// ID generator for entities.
///
/// Identifiers are opaque 32-hex-character tokens with no embedded
/// timestamp, so an id reveals nothing about when a row was created.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new entity id (UUID v4, simple form).
    #[must_use]
    pub fn generate(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}
