pub use sea_orm_migration::prelude::*;

mod m20260702_000001_create_partners;
mod m20260702_000002_create_referrals;
mod m20260702_000003_create_hierarchy_edges;
mod m20260702_000004_create_commission_payments;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
  fn migrations() -> Vec<Box<dyn MigrationTrait>> {
    vec![
      Box::new(m20260702_000001_create_partners::Migration),
      Box::new(m20260702_000002_create_referrals::Migration),
      Box::new(m20260702_000003_create_hierarchy_edges::Migration),
      Box::new(m20260702_000004_create_commission_payments::Migration),
    ]
  }
}
