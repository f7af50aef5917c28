use sea_orm_migration::prelude::*;

use super::{
  m20260702_000001_create_partners::Partners,
  m20260702_000002_create_referrals::Referrals,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(CommissionPayments::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(CommissionPayments::Id)
              .big_integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(
            ColumnDef::new(CommissionPayments::ReferralId)
              .big_integer()
              .not_null(),
          )
          .col(
            ColumnDef::new(CommissionPayments::RecipientId)
              .big_integer()
              .not_null(),
          )
          .col(
            ColumnDef::new(CommissionPayments::Level).integer().not_null(),
          )
          .col(
            ColumnDef::new(CommissionPayments::AmountPence)
              .big_integer()
              .not_null(),
          )
          .col(
            ColumnDef::new(CommissionPayments::Percentage)
              .integer()
              .not_null(),
          )
          .col(
            ColumnDef::new(CommissionPayments::Status)
              .string()
              .not_null()
              .default("pending"),
          )
          .col(
            ColumnDef::new(CommissionPayments::CreatedAt)
              .date_time()
              .not_null(),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_commission_payments_referral")
              .from(CommissionPayments::Table, CommissionPayments::ReferralId)
              .to(Referrals::Table, Referrals::Id),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_commission_payments_recipient")
              .from(
                CommissionPayments::Table,
                CommissionPayments::RecipientId,
              )
              .to(Partners::Table, Partners::Id),
          )
          .to_owned(),
      )
      .await?;

    // One payment per referral per level. Concurrent generators race on
    // this index, losers read back the winner's rows.
    manager
      .create_index(
        Index::create()
          .name("idx_commission_payments_referral_level")
          .table(CommissionPayments::Table)
          .col(CommissionPayments::ReferralId)
          .col(CommissionPayments::Level)
          .unique()
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_commission_payments_recipient")
          .table(CommissionPayments::Table)
          .col(CommissionPayments::RecipientId)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(CommissionPayments::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum CommissionPayments {
  Table,
  Id,
  ReferralId,
  RecipientId,
  Level,
  AmountPence,
  Percentage,
  Status,
  CreatedAt,
}
