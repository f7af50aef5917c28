//! Shared test utilities for database setup

#[cfg(test)]
pub mod test_db {
  use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, DbBackend, Schema,
    sea_query::{Alias, Index},
  };

  use crate::entity::*;

  /// Creates an in-memory SQLite database with all required tables
  pub async fn setup() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let schema = Schema::new(DbBackend::Sqlite);

    // Create partner table
    let stmt = schema.create_table_from_entity(partner::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    // Create hierarchy_edge table
    let stmt = schema.create_table_from_entity(hierarchy_edge::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    // Create referral table
    let stmt = schema.create_table_from_entity(referral::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    // Create commission_payment table
    let stmt = schema.create_table_from_entity(commission_payment::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    // The generator's idempotency guard, mirrors the migration's unique
    // index.
    let stmt = Index::create()
      .name("idx_commission_payments_referral_level")
      .table(Alias::new("commission_payments"))
      .col(Alias::new("referral_id"))
      .col(Alias::new("level"))
      .unique()
      .to_owned();
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    db
  }
}
