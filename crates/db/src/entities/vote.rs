//! Vote entity.
//!
//! Votes are append-only. Only the latest vote by a user on a question is
//! active and counted; earlier votes stay behind with `is_latest = false`,
//! which keeps the full history of vote changes without a separate audit
//! log. The `story_pretty_id` records where the vote was cast from and is
//! never read back.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vote")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub user_id: String,

    pub question_id: String,

    /// Chosen answer index, 0..=4.
    pub answer: i32,

    pub story_pretty_id: i64,

    /// The only mutable field: flipped to `false` when the vote is
    /// superseded.
    #[sea_orm(default_value = true)]
    pub is_latest: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    Voter,

    #[sea_orm(
        belongs_to = "super::question::Entity",
        from = "Column::QuestionId",
        to = "super::question::Column::Id"
    )]
    Question,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Voter.def()
    }
}

impl Related<super::question::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Question.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
