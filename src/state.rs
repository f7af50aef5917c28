use migration::Migrator;

use crate::prelude::*;

pub struct Config {
  pub port: u16,
}

impl Config {
  pub fn from_env() -> Self {
    let port = std::env::var("PORT")
      .ok()
      .and_then(|p| p.parse().ok())
      .unwrap_or(3000);
    Self { port }
  }
}

pub struct AppState {
  pub db: DatabaseConnection,
  pub config: Config,
}

impl AppState {
  pub async fn new(db_url: &str) -> Self {
    let db = Database::connect(db_url)
      .await
      .expect("Failed to connect to database");

    Migrator::up(&db, None).await.expect("Failed to run migrations");

    Self { db, config: Config::from_env() }
  }
}
