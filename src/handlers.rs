use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::{
  entity::{
    PaymentStatus, ReferralStatus, commission_payment, hierarchy_edge,
    partner, referral,
  },
  prelude::*,
  state::AppState,
  sv::{self, stats::PartnerStats, tree::TreeNode},
};

#[derive(Serialize)]
pub struct Status {
  success: bool,
  msg: Option<String>,
}

pub async fn health() -> Json<Status> {
  Json(Status { success: true, msg: None })
}

#[derive(Deserialize)]
pub struct RegisterReq {
  display_name: String,
  #[serde(default = "default_level")]
  partner_level: i32,
}

fn default_level() -> i32 {
  1
}

pub async fn register_partner(
  State(app): State<Arc<AppState>>,
  Json(req): Json<RegisterReq>,
) -> Result<(StatusCode, Json<partner::Model>)> {
  let partner = sv::Partner::new(&app.db)
    .register(&req.display_name, req.partner_level)
    .await?;

  Ok((StatusCode::CREATED, Json(partner)))
}

#[derive(Deserialize)]
pub struct AttachReq {
  referral_code: String,
}

pub async fn attach_partner(
  State(app): State<Arc<AppState>>,
  Path(id): Path<i64>,
  Json(req): Json<AttachReq>,
) -> Result<Json<partner::Model>> {
  let recruiter = sv::Partner::new(&app.db)
    .attach_by_code(id, &req.referral_code)
    .await?;

  Ok(Json(recruiter))
}

pub async fn get_partner(
  State(app): State<Arc<AppState>>,
  Path(id): Path<i64>,
) -> Result<Json<partner::Model>> {
  Ok(Json(sv::Partner::new(&app.db).get(id).await?))
}

pub async fn upline(
  State(app): State<Arc<AppState>>,
  Path(id): Path<i64>,
) -> Result<Json<Vec<hierarchy_edge::Model>>> {
  Ok(Json(sv::Tree::new(&app.db).upline(id).await?))
}

#[derive(Deserialize)]
pub struct DownlineQuery {
  max_depth: Option<u32>,
}

pub async fn downline(
  State(app): State<Arc<AppState>>,
  Path(id): Path<i64>,
  Query(query): Query<DownlineQuery>,
) -> Result<Json<TreeNode>> {
  Ok(Json(sv::Tree::new(&app.db).downline(id, query.max_depth).await?))
}

pub async fn partner_stats(
  State(app): State<Arc<AppState>>,
  Path(id): Path<i64>,
) -> Result<Json<PartnerStats>> {
  Ok(Json(sv::Stats::new(&app.db).for_partner(id).await?))
}

#[derive(Deserialize)]
pub struct SubmitReferralReq {
  referrer_id: i64,
  business_name: String,
  commission_pence: i64,
}

pub async fn submit_referral(
  State(app): State<Arc<AppState>>,
  Json(req): Json<SubmitReferralReq>,
) -> Result<(StatusCode, Json<referral::Model>)> {
  let referral = sv::Referral::new(&app.db)
    .submit(req.referrer_id, &req.business_name, req.commission_pence)
    .await?;

  Ok((StatusCode::CREATED, Json(referral)))
}

#[derive(Deserialize)]
pub struct TransitionReq {
  status: ReferralStatus,
}

#[derive(Serialize)]
pub struct TransitionResp {
  referral: referral::Model,
  payments: Vec<commission_payment::Model>,
}

/// Moving a referral to `paid` also returns the commission payments
/// generated by the close (or the existing set on a duplicate event).
pub async fn transition_referral(
  State(app): State<Arc<AppState>>,
  Path(id): Path<i64>,
  Json(req): Json<TransitionReq>,
) -> Result<Json<TransitionResp>> {
  let svc = sv::Referral::new(&app.db);

  let payments = if req.status == ReferralStatus::Paid {
    svc.mark_paid(id).await?
  } else {
    svc.transition(id, req.status).await?;
    Vec::new()
  };

  let referral = svc.get(id).await?;
  Ok(Json(TransitionResp { referral, payments }))
}

pub async fn referral_commissions(
  State(app): State<Arc<AppState>>,
  Path(id): Path<i64>,
) -> Result<Json<Vec<commission_payment::Model>>> {
  sv::Referral::new(&app.db).get(id).await?;

  Ok(Json(sv::Commission::new(&app.db).for_referral(id).await?))
}

pub async fn partner_referrals(
  State(app): State<Arc<AppState>>,
  Path(id): Path<i64>,
) -> Result<Json<Vec<referral::Model>>> {
  sv::Partner::new(&app.db).get(id).await?;

  Ok(Json(sv::Referral::new(&app.db).by_referrer(id).await?))
}

pub async fn pending_payments(
  State(app): State<Arc<AppState>>,
) -> Result<Json<Vec<commission_payment::Model>>> {
  Ok(Json(sv::Settlement::new(&app.db).pending().await?))
}

#[derive(Deserialize)]
pub struct SettleReq {
  status: PaymentStatus,
}

/// Settlement workflow endpoint. Only the legal moves are accepted,
/// `pending` is not a reachable target.
pub async fn settle_payment(
  State(app): State<Arc<AppState>>,
  Path(id): Path<i64>,
  Json(req): Json<SettleReq>,
) -> Result<Json<commission_payment::Model>> {
  let settlement = sv::Settlement::new(&app.db);

  let payment = match req.status {
    PaymentStatus::Processing => settlement.mark_processing(id).await?,
    PaymentStatus::Paid => settlement.mark_paid(id).await?,
    PaymentStatus::Failed => settlement.mark_failed(id).await?,
    PaymentStatus::Pending => {
      return Err(Error::InvalidTransition("-> Pending".into()));
    }
  };

  Ok(Json(payment))
}
