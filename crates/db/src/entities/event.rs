//! Event entity.

use sea_orm::entity::prelude::*;

/// Event entity.
///
/// Descriptions are unique among active events; the check lives in the
/// service layer because canceled rows keep their description.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "event")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub description: String,

    /// Category used by the suggestion engine as an interest signal.
    pub category: String,

    pub location: String,

    /// Free-form cost text ("free", "$10", ...).
    pub cost: String,

    pub start_time: DateTimeWithTimeZone,

    pub end_time: DateTimeWithTimeZone,

    /// Optional external link for the event.
    pub event_link: Option<String>,

    /// User who created the event. Immutable after creation.
    pub creator_id: String,

    /// When the event was last updated.
    pub updated_at: DateTimeWithTimeZone,

    /// Soft-delete flag. Canceled rows are retained for history.
    pub canceled: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatorId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::registration::Entity")]
    Registration,
    #[sea_orm(has_many = "super::favorite::Entity")]
    Favorite,
    #[sea_orm(has_many = "super::share::Entity")]
    Share,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
