use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::partner;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum ReferralStatus {
  #[sea_orm(string_value = "submitted")]
  #[default]
  Submitted,
  #[sea_orm(string_value = "quoted")]
  Quoted,
  #[sea_orm(string_value = "approved")]
  Approved,
  #[sea_orm(string_value = "paid")]
  Paid,
  #[sea_orm(string_value = "rejected")]
  Rejected,
}

impl ReferralStatus {
  pub fn is_terminal(self) -> bool {
    matches!(self, Self::Paid | Self::Rejected)
  }

  /// Legal pipeline moves. `Rejected` is reachable from any live state,
  /// everything else advances one step.
  pub fn can_transition_to(self, next: Self) -> bool {
    matches!(
      (self, next),
      (Self::Submitted, Self::Quoted)
        | (Self::Quoted, Self::Approved)
        | (Self::Approved, Self::Paid)
    ) || (!self.is_terminal() && next == Self::Rejected)
  }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "referrals")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  pub referrer_id: i64,
  pub business_name: String,
  pub status: ReferralStatus,
  /// Base commission in pence, computed upstream at submission.
  pub commission_pence: i64,
  pub created_at: DateTime,
  pub paid_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "partner::Entity",
    from = "Column::ReferrerId",
    to = "partner::Column::Id"
  )]
  Referrer,
}

impl Related<partner::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Referrer.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
