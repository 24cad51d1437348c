//! Category-interest event suggestions.

use gather_common::AppResult;
use gather_db::{
    entities::event,
    repositories::{EventRepository, FavoriteRepository, RegistrationRepository},
};
use std::collections::BTreeSet;

/// Suggests events a user has not engaged with, based on the categories of
/// events they have registered for or favorited.
#[derive(Clone)]
pub struct SuggestionService {
    registration_repo: RegistrationRepository,
    favorite_repo: FavoriteRepository,
    event_repo: EventRepository,
}

impl SuggestionService {
    /// Create a new suggestion service.
    #[must_use]
    pub const fn new(
        registration_repo: RegistrationRepository,
        favorite_repo: FavoriteRepository,
        event_repo: EventRepository,
    ) -> Self {
        Self {
            registration_repo,
            favorite_repo,
            event_repo,
        }
    }

    /// Active events in the user's interest categories, excluding every event
    /// the user has ever registered for or favorited.
    ///
    /// Known events include canceled engagements: canceling a registration
    /// keeps the event's category as an interest signal and keeps the event
    /// itself out of the suggestions. A user with no engagement history gets
    /// an empty list rather than a global feed.
    pub async fn suggest_for_user(&self, user_id: &str) -> AppResult<Vec<event::Model>> {
        let mut known_event_ids: BTreeSet<String> = self
            .registration_repo
            .find_event_ids_by_user(user_id)
            .await?
            .into_iter()
            .collect();
        known_event_ids.extend(self.favorite_repo.find_event_ids_by_user(user_id).await?);

        if known_event_ids.is_empty() {
            return Ok(Vec::new());
        }

        let known: Vec<String> = known_event_ids.into_iter().collect();
        // Categories come from every known event, canceled ones included.
        let categories: BTreeSet<String> = self
            .event_repo
            .find_by_ids(&known)
            .await?
            .into_iter()
            .map(|e| e.category)
            .collect();
        let categories: Vec<String> = categories.into_iter().collect();

        self.event_repo
            .find_active_in_categories_excluding(&categories, &known)
            .await
    }
}
