//! Event service.

use crate::services::authorization::AuthorizationGate;
use chrono::Utc;
use gather_common::{AppError, AppResult, IdGenerator};
use gather_db::{entities::event, repositories::EventRepository};
use sea_orm::{IntoActiveModel, Set};
use serde::Deserialize;
use validator::{Validate, ValidateUrl};

/// Input for creating an event.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventInput {
    #[validate(length(min = 1, max = 512))]
    pub description: String,

    #[validate(length(min = 1, max = 128))]
    pub category: String,

    #[validate(length(min = 1, max = 256))]
    pub location: String,

    #[validate(length(min = 1, max = 64))]
    pub cost: String,

    pub start_time: chrono::DateTime<chrono::FixedOffset>,
    pub end_time: chrono::DateTime<chrono::FixedOffset>,

    #[validate(url)]
    pub event_link: Option<String>,

    pub creator_id: String,
}

/// Marks a present field as `Some`, so an explicit `"eventLink": null`
/// (clear the link) stays distinguishable from the field being omitted
/// (keep it).
fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

/// Input for updating an event. Unset fields keep their current value.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventInput {
    /// Who is asking for the change.
    pub user_id: String,

    #[validate(length(min = 1, max = 512))]
    pub description: Option<String>,

    #[validate(length(min = 1, max = 128))]
    pub category: Option<String>,

    #[validate(length(min = 1, max = 256))]
    pub location: Option<String>,

    #[validate(length(min = 1, max = 64))]
    pub cost: Option<String>,

    pub start_time: Option<chrono::DateTime<chrono::FixedOffset>>,
    pub end_time: Option<chrono::DateTime<chrono::FixedOffset>>,

    /// `Some(Some(url))` replaces the link, `Some(None)` clears it, `None`
    /// keeps it. Checked by hand in `update`; the derive cannot reach
    /// through the outer `Option`.
    #[serde(default, deserialize_with = "double_option")]
    pub event_link: Option<Option<String>>,
}

/// Event service for event lifecycle.
#[derive(Clone)]
pub struct EventService {
    event_repo: EventRepository,
    gate: AuthorizationGate,
    id_gen: IdGenerator,
}

impl EventService {
    /// Create a new event service.
    #[must_use]
    pub const fn new(event_repo: EventRepository, gate: AuthorizationGate) -> Self {
        Self {
            event_repo,
            gate,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create an event. Descriptions are unique among active events; a
    /// canceled event's description may be reused.
    pub async fn create(&self, input: CreateEventInput) -> AppResult<event::Model> {
        input.validate()?;

        if input.end_time < input.start_time {
            return Err(AppError::BadRequest(
                "Event ends before it starts".to_string(),
            ));
        }

        if self
            .event_repo
            .find_active_by_description(&input.description)
            .await?
            .is_some()
        {
            return Err(AppError::AlreadyExists(format!(
                "An active event with description {:?} already exists",
                input.description
            )));
        }

        let model = event::ActiveModel {
            id: Set(self.id_gen.generate()),
            description: Set(input.description),
            category: Set(input.category),
            location: Set(input.location),
            cost: Set(input.cost),
            start_time: Set(input.start_time),
            end_time: Set(input.end_time),
            event_link: Set(input.event_link),
            creator_id: Set(input.creator_id),
            updated_at: Set(Utc::now().into()),
            canceled: Set(false),
        };

        let created = self.event_repo.create(model).await?;
        tracing::info!(event_id = %created.id, "Created event");
        Ok(created)
    }

    /// Active event by id.
    pub async fn get(&self, id: &str) -> AppResult<event::Model> {
        self.event_repo.get_active_by_id(id).await
    }

    /// All active events, soonest first.
    pub async fn list(&self) -> AppResult<Vec<event::Model>> {
        self.event_repo.find_active().await
    }

    /// Update an event. Only its creator or an active Admin may change it; on
    /// refusal the stored event is untouched.
    pub async fn update(&self, id: &str, input: UpdateEventInput) -> AppResult<event::Model> {
        input.validate()?;
        if let Some(Some(link)) = &input.event_link {
            if !link.validate_url() {
                return Err(AppError::BadRequest(format!(
                    "Event link {link:?} is not a valid URL"
                )));
            }
        }

        let current = self.event_repo.get_active_by_id(id).await?;
        if !self.gate.can_delete_event(&input.user_id, &current).await? {
            return Err(AppError::BadRequest(
                "Requester may not modify this event".to_string(),
            ));
        }

        if let Some(description) = &input.description {
            if description != &current.description
                && self
                    .event_repo
                    .find_active_by_description(description)
                    .await?
                    .is_some()
            {
                return Err(AppError::AlreadyExists(format!(
                    "An active event with description {description:?} already exists"
                )));
            }
        }

        let mut active = current.into_active_model();
        if let Some(v) = input.description {
            active.description = Set(v);
        }
        if let Some(v) = input.category {
            active.category = Set(v);
        }
        if let Some(v) = input.location {
            active.location = Set(v);
        }
        if let Some(v) = input.cost {
            active.cost = Set(v);
        }
        if let Some(v) = input.start_time {
            active.start_time = Set(v);
        }
        if let Some(v) = input.end_time {
            active.end_time = Set(v);
        }
        if let Some(v) = input.event_link {
            active.event_link = Set(v);
        }
        active.updated_at = Set(Utc::now().into());

        self.event_repo.update(active).await
    }

    /// Soft-delete an event. Only its creator or an active Admin may do this;
    /// on refusal the stored event is untouched.
    pub async fn cancel(&self, id: &str, requester_id: &str) -> AppResult<event::Model> {
        let current = self.event_repo.get_active_by_id(id).await?;
        if !self.gate.can_delete_event(requester_id, &current).await? {
            return Err(AppError::BadRequest(
                "Requester may not delete this event".to_string(),
            ));
        }

        let mut active = current.into_active_model();
        active.canceled = Set(true);
        active.updated_at = Set(Utc::now().into());
        let canceled = self.event_repo.update(active).await?;
        tracing::info!(event_id = id, requester_id, "Canceled event");
        Ok(canceled)
    }
}
