use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{partner, referral};

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
  #[sea_orm(string_value = "pending")]
  #[default]
  Pending,
  #[sea_orm(string_value = "processing")]
  Processing,
  #[sea_orm(string_value = "paid")]
  Paid,
  #[sea_orm(string_value = "failed")]
  Failed,
}

/// One commission payout owed to one member of the referrer's upline.
/// Amount and percentage are snapshot at generation, rule changes never
/// rewrite rows that already exist. Rows are kept forever as the audit
/// trail, settlement only moves `status`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "commission_payments")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  pub referral_id: i64,
  pub recipient_id: i64,
  /// Recipient's distance from the referral's referrer, plus one: the
  /// referrer itself is level 1, its recruiter level 2.
  pub level: i32,
  pub amount_pence: i64,
  pub percentage: i32,
  pub status: PaymentStatus,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "referral::Entity",
    from = "Column::ReferralId",
    to = "referral::Column::Id"
  )]
  Referral,
  #[sea_orm(
    belongs_to = "partner::Entity",
    from = "Column::RecipientId",
    to = "partner::Column::Id"
  )]
  Recipient,
}

impl Related<referral::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Referral.def()
  }
}

impl Related<partner::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Recipient.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
