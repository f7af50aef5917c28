use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::partner;

/// Closure-table row mapping a partner to one ancestor at a hop distance.
/// Level 1 is the direct recruiter, level 2 the grandparent, and so on up
/// to the payable-depth cap. The composite key keeps each child to a
/// single ancestor per level.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "hierarchy_edges")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub child_id: i64,
  #[sea_orm(primary_key, auto_increment = false)]
  pub level: i32,
  pub ancestor_id: i64,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "partner::Entity",
    from = "Column::ChildId",
    to = "partner::Column::Id"
  )]
  Child,
  #[sea_orm(
    belongs_to = "partner::Entity",
    from = "Column::AncestorId",
    to = "partner::Column::Id"
  )]
  Ancestor,
}

impl Related<partner::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Ancestor.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
