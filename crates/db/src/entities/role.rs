//! Role entity.

use sea_orm::entity::prelude::*;

/// Role entity.
///
/// The "User" and "Admin" roles are seeded at startup under well-known ids
/// from configuration.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "role")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Role name, unique across all roles.
    pub name: String,

    /// Soft-delete flag. Canceled rows are retained for history.
    pub canceled: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user::Entity")]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
