use sea_orm::SqlErr;

use crate::{
  entity::{
    PaymentStatus, ReferralStatus, commission_payment, hierarchy_edge,
    referral,
  },
  prelude::*,
};

/// Payout schedule keyed by the recipient's distance from the referrer:
/// the referrer itself takes level 1, its recruiter the level-2 override,
/// the grandparent the level-3 override.
pub const RATES: [(i32, i32); 3] = [(1, 60), (2, 20), (3, 10)];

pub fn rate_for(level: i32) -> Option<i32> {
  RATES.iter().find(|(l, _)| *l == level).map(|(_, rate)| *rate)
}

pub struct Commission<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Commission<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Payments already generated for a referral, ordered by level.
  pub async fn for_referral(
    &self,
    referral_id: i64,
  ) -> Result<Vec<commission_payment::Model>> {
    Ok(
      commission_payment::Entity::find()
        .filter(commission_payment::Column::ReferralId.eq(referral_id))
        .order_by_asc(commission_payment::Column::Level)
        .all(self.db)
        .await?,
    )
  }

  /// Convert one paid referral into its payment rows.
  ///
  /// Generation happens at most once per referral: a repeat call (or a
  /// concurrent one racing on the `(referral_id, level)` index) hands
  /// back the rows that already exist instead of erroring. Partial
  /// uplines yield fewer rows, never zero-amount placeholders. Amount
  /// and percentage are snapshot from [`RATES`] at creation.
  pub async fn generate(
    &self,
    referral_id: i64,
  ) -> Result<Vec<commission_payment::Model>> {
    let referral = referral::Entity::find_by_id(referral_id)
      .one(self.db)
      .await?
      .ok_or(Error::ReferralNotFound)?;

    if referral.status != ReferralStatus::Paid {
      return Err(Error::ReferralNotEligible);
    }

    let existing = self.for_referral(referral_id).await?;
    if !existing.is_empty() {
      debug!("commissions already generated for referral {referral_id}");
      return Ok(existing);
    }

    let txn = self.db.begin().await?;
    let now = Utc::now().naive_utc();

    let (_, direct_rate) = RATES[0];
    let mut rows =
      vec![payment(&referral, referral.referrer_id, 1, direct_rate, now)];

    let upline = hierarchy_edge::Entity::find()
      .filter(hierarchy_edge::Column::ChildId.eq(referral.referrer_id))
      .order_by_asc(hierarchy_edge::Column::Level)
      .all(&txn)
      .await?;

    for edge in upline {
      let level = edge.level + 1;
      let Some(rate) = rate_for(level) else { continue };
      rows.push(payment(&referral, edge.ancestor_id, level, rate, now));
    }

    let mut created = Vec::with_capacity(rows.len());
    for row in rows {
      match row.insert(&txn).await {
        Ok(model) => created.push(model),
        // Lost the race against a concurrent generator, hand back the
        // winner's rows.
        Err(err)
          if matches!(
            err.sql_err(),
            Some(SqlErr::UniqueConstraintViolation(_))
          ) =>
        {
          txn.rollback().await?;
          return self.for_referral(referral_id).await;
        }
        Err(err) => return Err(Error::Db(err)),
      }
    }

    txn.commit().await?;

    info!(
      "generated {} commission payment(s) for referral {referral_id}",
      created.len()
    );
    Ok(created)
  }
}

fn payment(
  referral: &referral::Model,
  recipient_id: i64,
  level: i32,
  rate: i32,
  now: DateTime,
) -> commission_payment::ActiveModel {
  commission_payment::ActiveModel {
    id: NotSet,
    referral_id: Set(referral.id),
    recipient_id: Set(recipient_id),
    level: Set(level),
    amount_pence: Set(referral.commission_pence * rate as i64 / 100),
    percentage: Set(rate),
    status: Set(PaymentStatus::Pending),
    created_at: Set(now),
  }
}
