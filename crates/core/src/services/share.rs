//! Event sharing by email.
//!
//! A share row is a delivery record: it is written only after the mail has
//! actually gone out. A failed delivery leaves no row behind, so share counts
//! in the metrics only ever reflect delivered mail.

use crate::services::notification::NotificationSender;
use gather_common::{AppError, AppResult, IdGenerator};
use gather_db::{
    entities::share,
    repositories::{EventRepository, ShareRepository, UserRepository},
};
use sea_orm::Set;
use std::sync::Arc;

/// Share service delivering event announcements by email.
#[derive(Clone)]
pub struct ShareService {
    event_repo: EventRepository,
    user_repo: UserRepository,
    share_repo: ShareRepository,
    sender: Option<Arc<dyn NotificationSender>>,
    id_gen: IdGenerator,
}

impl ShareService {
    /// Create a new share service. `sender` is None when no email backend is
    /// configured; sharing then fails up front instead of at delivery time.
    #[must_use]
    pub fn new(
        event_repo: EventRepository,
        user_repo: UserRepository,
        share_repo: ShareRepository,
        sender: Option<Arc<dyn NotificationSender>>,
    ) -> Self {
        Self {
            event_repo,
            user_repo,
            share_repo,
            sender,
            id_gen: IdGenerator::new(),
        }
    }

    /// Email an event announcement to `recipient_address` on behalf of the
    /// sharing user, then record the share.
    pub async fn share_event(
        &self,
        event_id: &str,
        sharer_user_id: &str,
        recipient_address: &str,
    ) -> AppResult<share::Model> {
        let event = self
            .event_repo
            .find_active_by_id(event_id)
            .await?
            .ok_or_else(|| AppError::BadRequest("Event not found or canceled".to_string()))?;
        let sharer = self
            .user_repo
            .find_active_by_id(sharer_user_id)
            .await?
            .ok_or_else(|| AppError::BadRequest("Sharing user not found".to_string()))?;

        let sender = self
            .sender
            .as_ref()
            .ok_or_else(|| AppError::BadRequest("Email delivery is not configured".to_string()))?;

        let subject = format!("{} shared an event with you", sharer.username);
        let body = format!(
            "{} thought you would be interested in this event:\n\n\
             {}\n\
             Category: {}\n\
             Location: {}\n\
             Cost: {}\n\
             Starts: {}",
            sharer.username,
            event.description,
            event.category,
            event.location,
            event.cost,
            event.start_time,
        );

        if let Err(e) = sender.send(recipient_address, &subject, &body).await {
            tracing::warn!(
                event_id,
                sharer_user_id,
                error = %e,
                "Share email delivery failed, no share recorded"
            );
            return Err(AppError::BadRequest(format!(
                "Could not deliver share email: {e}"
            )));
        }

        let model = share::ActiveModel {
            id: Set(self.id_gen.generate()),
            event_id: Set(event_id.to_string()),
            sharer_user_id: Set(sharer_user_id.to_string()),
            recipient_address: Set(recipient_address.to_string()),
        };

        self.share_repo.create(model).await
    }
}
