use sea_orm_migration::prelude::*;

use super::m20260702_000001_create_partners::Partners;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    // Closure table: one row per (descendant, ancestor) pair, keyed by
    // hop distance. The (child_id, level) primary key caps each child at
    // a single ancestor per level.
    manager
      .create_table(
        Table::create()
          .table(HierarchyEdges::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(HierarchyEdges::ChildId).big_integer().not_null(),
          )
          .col(ColumnDef::new(HierarchyEdges::Level).integer().not_null())
          .col(
            ColumnDef::new(HierarchyEdges::AncestorId)
              .big_integer()
              .not_null(),
          )
          .col(
            ColumnDef::new(HierarchyEdges::CreatedAt).date_time().not_null(),
          )
          .primary_key(
            Index::create()
              .col(HierarchyEdges::ChildId)
              .col(HierarchyEdges::Level),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_hierarchy_edges_child")
              .from(HierarchyEdges::Table, HierarchyEdges::ChildId)
              .to(Partners::Table, Partners::Id),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_hierarchy_edges_ancestor")
              .from(HierarchyEdges::Table, HierarchyEdges::AncestorId)
              .to(Partners::Table, Partners::Id),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_hierarchy_edges_ancestor")
          .table(HierarchyEdges::Table)
          .col(HierarchyEdges::AncestorId)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(HierarchyEdges::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum HierarchyEdges {
  Table,
  ChildId,
  Level,
  AncestorId,
  CreatedAt,
}
