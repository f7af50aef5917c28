use sea_orm_migration::prelude::*;

use super::m20260702_000001_create_partners::Partners;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Referrals::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Referrals::Id)
              .big_integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Referrals::ReferrerId).big_integer().not_null())
          .col(ColumnDef::new(Referrals::BusinessName).string().not_null())
          .col(
            ColumnDef::new(Referrals::Status)
              .string()
              .not_null()
              .default("submitted"),
          )
          .col(
            ColumnDef::new(Referrals::CommissionPence)
              .big_integer()
              .not_null(),
          )
          .col(ColumnDef::new(Referrals::CreatedAt).date_time().not_null())
          .col(ColumnDef::new(Referrals::PaidAt).date_time().null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_referrals_referrer")
              .from(Referrals::Table, Referrals::ReferrerId)
              .to(Partners::Table, Partners::Id),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_referrals_referrer")
          .table(Referrals::Table)
          .col(Referrals::ReferrerId)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Referrals::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Referrals {
  Table,
  Id,
  ReferrerId,
  BusinessName,
  Status,
  CommissionPence,
  CreatedAt,
  PaidAt,
}
