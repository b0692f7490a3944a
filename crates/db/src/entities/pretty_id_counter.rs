//! Pretty-ID counter entity.
//!
//! A table with zero or one rows holding the next pretty ID to allocate.
//! The row is created lazily by the allocator's first-ever allocation.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pretty_id_counter")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Next value to hand out.
    pub value: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
