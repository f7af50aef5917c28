use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Partners::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Partners::Id)
              .big_integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Partners::DisplayName).string().not_null())
          .col(
            ColumnDef::new(Partners::ParentPartnerId).big_integer().null(),
          )
          .col(
            ColumnDef::new(Partners::PartnerLevel)
              .integer()
              .not_null()
              .default(1),
          )
          .col(ColumnDef::new(Partners::ReferralCode).string().not_null())
          .col(ColumnDef::new(Partners::JoinedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_partners_parent")
              .from(Partners::Table, Partners::ParentPartnerId)
              .to(Partners::Table, Partners::Id),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_partners_referral_code")
          .table(Partners::Table)
          .col(Partners::ReferralCode)
          .unique()
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_partners_parent")
          .table(Partners::Table)
          .col(Partners::ParentPartnerId)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Partners::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Partners {
  Table,
  Id,
  DisplayName,
  ParentPartnerId,
  PartnerLevel,
  ReferralCode,
  JoinedAt,
}
