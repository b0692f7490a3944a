//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Case-preserving display form.
    #[sea_orm(unique)]
    pub username: String,

    /// Lowercase shadow copy for case-insensitive lookup.
    #[sea_orm(unique)]
    pub username_lower: String,

    /// Lowercase-normalized, unique across deleted and live users alike.
    #[sea_orm(unique)]
    pub email: String,

    pub password_hash: String,

    /// Cleared (NULL) once the account is activated.
    #[sea_orm(unique, nullable)]
    pub activation_id: Option<String>,

    /// Soft-delete flag; the record itself is never removed.
    #[sea_orm(default_value = false)]
    pub is_deleted: bool,

    #[sea_orm(default_value = false)]
    pub is_activated: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::session::Entity")]
    Sessions,

    #[sea_orm(has_many = "super::story::Entity")]
    Stories,
}

impl Related<super::session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sessions.def()
    }
}

impl Related<super::story::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
