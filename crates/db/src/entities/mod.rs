//! Database entities.

pub mod event;
pub mod favorite;
pub mod registration;
pub mod role;
pub mod share;
pub mod user;

pub use event::Entity as Event;
pub use favorite::Entity as Favorite;
pub use registration::Entity as Registration;
pub use role::Entity as Role;
pub use share::Entity as Share;
pub use user::Entity as User;
