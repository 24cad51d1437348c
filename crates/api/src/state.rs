//! Shared application state.

use gather_core::{
    EngagementService, EventService, MetricsService, RoleService, ShareService, SuggestionService,
    UserService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub role_service: RoleService,
    pub user_service: UserService,
    pub event_service: EventService,
    pub engagement_service: EngagementService,
    pub suggestion_service: SuggestionService,
    pub metrics_service: MetricsService,
    pub share_service: ShareService,
}
