use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
  #[error("partner not found")]
  PartnerNotFound,
  #[error("referral not found")]
  ReferralNotFound,
  #[error("commission payment not found")]
  PaymentNotFound,
  #[error("attachment would create a recruitment cycle")]
  CycleDetected,
  #[error("partner already has a recruiter")]
  AlreadyAttached,
  #[error("referral is not in the paid state")]
  ReferralNotEligible,
  #[error("invalid transition: {0}")]
  InvalidTransition(String),
  #[error("invalid arguments: {0}")]
  InvalidArgs(String),
  #[error("database error: {0}")]
  Db(#[from] sea_orm::DbErr),
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = match &self {
      Error::PartnerNotFound
      | Error::ReferralNotFound
      | Error::PaymentNotFound => StatusCode::NOT_FOUND,
      Error::CycleDetected
      | Error::AlreadyAttached
      | Error::InvalidTransition(_) => StatusCode::CONFLICT,
      Error::ReferralNotEligible => StatusCode::UNPROCESSABLE_ENTITY,
      Error::InvalidArgs(_) => StatusCode::BAD_REQUEST,
      Error::Db(err) => {
        tracing::error!("database error: {err}");
        StatusCode::INTERNAL_SERVER_ERROR
      }
    };

    let msg = match &self {
      Error::Db(_) => "internal error".to_string(),
      other => other.to_string(),
    };

    (status, Json(json::json!({ "success": false, "msg": msg })))
      .into_response()
  }
}
