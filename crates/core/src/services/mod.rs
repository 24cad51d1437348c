//! Business logic services.

#![allow(missing_docs)]

pub mod authorization;
pub mod engagement;
pub mod event;
pub mod metrics;
pub mod notification;
pub mod role;
pub mod share;
pub mod suggestion;
pub mod user;

pub use authorization::AuthorizationGate;
pub use engagement::{Engagement, EngagementKind, EngagementService};
pub use event::{CreateEventInput, EventService, UpdateEventInput};
pub use metrics::{EventMetrics, MetricsService};
pub use notification::{NotificationSender, SmtpNotifier};
pub use role::{CreateRoleInput, RoleService};
pub use share::ShareService;
pub use suggestion::SuggestionService;
pub use user::{CreateUserInput, LoginInput, UserService};
