//! Per-event engagement metrics.

use gather_common::{AppError, AppResult};
use gather_db::repositories::{
    EventRepository, FavoriteRepository, RegistrationRepository, ShareRepository,
};
use serde::Serialize;

const REGISTRATION_WEIGHT: f64 = 0.8;
const FAVORITE_WEIGHT: f64 = 0.15;
const SHARE_WEIGHT: f64 = 0.05;

/// Engagement counts and the weighted popularity score for one event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMetrics {
    pub event_id: String,
    pub registrations: u64,
    pub favorites: u64,
    pub shares: u64,
    pub popularity_score: f64,
}

/// Metrics service computing engagement counts per event.
#[derive(Clone)]
pub struct MetricsService {
    event_repo: EventRepository,
    registration_repo: RegistrationRepository,
    favorite_repo: FavoriteRepository,
    share_repo: ShareRepository,
}

impl MetricsService {
    /// Create a new metrics service.
    #[must_use]
    pub const fn new(
        event_repo: EventRepository,
        registration_repo: RegistrationRepository,
        favorite_repo: FavoriteRepository,
        share_repo: ShareRepository,
    ) -> Self {
        Self {
            event_repo,
            registration_repo,
            favorite_repo,
            share_repo,
        }
    }

    /// Compute metrics for an event. Canceled events still report their
    /// metrics; only a never-existing id is an error.
    ///
    /// Registrations and favorites count active rows only. Shares are
    /// append-only delivery records, so every row counts.
    pub async fn for_event(&self, event_id: &str) -> AppResult<EventMetrics> {
        if self.event_repo.find_by_id(event_id).await?.is_none() {
            return Err(AppError::EventNotFound(event_id.to_string()));
        }

        let registrations = self.registration_repo.count_active_by_event(event_id).await?;
        let favorites = self.favorite_repo.count_active_by_event(event_id).await?;
        let shares = self.share_repo.count_by_event(event_id).await?;

        Ok(EventMetrics {
            event_id: event_id.to_string(),
            registrations,
            favorites,
            shares,
            popularity_score: popularity_score(registrations, favorites, shares),
        })
    }
}

fn popularity_score(registrations: u64, favorites: u64, shares: u64) -> f64 {
    registrations as f64 * REGISTRATION_WEIGHT
        + favorites as f64 * FAVORITE_WEIGHT
        + shares as f64 * SHARE_WEIGHT
}
