use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{commission_payment, referral};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "partners")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  pub display_name: String,
  /// Recruiting partner, `None` for roots. Assigned once, never moved.
  pub parent_partner_id: Option<i64>,
  /// Manually administered tier (1..=3), independent of hierarchy depth.
  pub partner_level: i32,
  #[sea_orm(unique)]
  pub referral_code: String,
  pub joined_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "Entity",
    from = "Column::ParentPartnerId",
    to = "Column::Id"
  )]
  Recruiter,
  #[sea_orm(has_many = "referral::Entity")]
  Referrals,
  #[sea_orm(has_many = "commission_payment::Entity")]
  Payments,
}

impl Related<referral::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Referrals.def()
  }
}

impl Related<commission_payment::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Payments.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
