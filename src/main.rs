mod entity;
mod error;
mod handlers;
mod prelude;
mod state;
mod sv;

use std::{env, net::SocketAddr};

use axum::{
  Router,
  routing::{get, post},
};
use tower::ServiceBuilder;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{
  cors::{Any, CorsLayer},
  trace::TraceLayer,
};
use tracing_subscriber::{
  EnvFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::{prelude::*, state::AppState};

#[tokio::main]
async fn main() {
  dotenvy::dotenv().ok();

  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
      "partner_connector=debug,tower_http=debug,axum=trace,sea_orm=warn"
        .into()
    }))
    .with(tracing_subscriber::fmt::layer())
    .init();

  let db_url = env::var("DATABASE_URL")
    .unwrap_or_else(|_| "sqlite:partners.db?mode=rwc".into());

  info!("Starting PartnerConnector v{}", env!("CARGO_PKG_VERSION"));

  let app_state = Arc::new(AppState::new(&db_url).await);

  let governor_conf = Arc::new(
    GovernorConfigBuilder::default()
      .per_second(2)
      .burst_size(100)
      .finish()
      .expect("Failed to build rate limiter config"),
  );

  let governor_limiter = governor_conf.limiter().clone();

  tokio::spawn(async move {
    loop {
      tokio::time::sleep(Duration::from_secs(60)).await;
      governor_limiter.retain_recent();
    }
  });

  let port = app_state.config.port;

  let app = Router::new()
    .route("/api/partners", post(handlers::register_partner))
    .route("/api/partners/{id}", get(handlers::get_partner))
    .route("/api/partners/{id}/attach", post(handlers::attach_partner))
    .route("/api/partners/{id}/upline", get(handlers::upline))
    .route("/api/partners/{id}/downline", get(handlers::downline))
    .route("/api/partners/{id}/stats", get(handlers::partner_stats))
    .route(
      "/api/partners/{id}/referrals",
      get(handlers::partner_referrals),
    )
    .route("/api/referrals", post(handlers::submit_referral))
    .route(
      "/api/referrals/{id}/status",
      post(handlers::transition_referral),
    )
    .route(
      "/api/referrals/{id}/commissions",
      get(handlers::referral_commissions),
    )
    .route("/api/payments/pending", get(handlers::pending_payments))
    .route("/api/payments/{id}/status", post(handlers::settle_payment))
    .route("/health", get(handlers::health))
    .layer(
      ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(GovernorLayer::new(governor_conf))
        .layer(
          CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        ),
    )
    .with_state(app_state)
    .into_make_service_with_connect_info::<SocketAddr>();

  let addr = SocketAddr::from(([0, 0, 0, 0], port));

  info!("HTTP server listening on {}", addr);

  let listener =
    tokio::net::TcpListener::bind(addr).await.expect("Failed to bind");
  axum::serve(listener, app).await.expect("Server error");
}
