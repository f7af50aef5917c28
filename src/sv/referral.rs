use crate::{
  entity::{ReferralStatus, commission_payment, partner, referral},
  prelude::*,
  sv::Commission,
};

pub struct Referral<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Referral<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Submit a new business lead on behalf of a partner. The base
  /// commission is computed upstream from business-type and volume rules
  /// and arrives here as a settled amount.
  pub async fn submit(
    &self,
    referrer_id: i64,
    business_name: &str,
    commission_pence: i64,
  ) -> Result<referral::Model> {
    let business_name = business_name.trim();
    if business_name.is_empty() {
      return Err(Error::InvalidArgs("business name must not be empty".into()));
    }
    if commission_pence <= 0 {
      return Err(Error::InvalidArgs("commission must be positive".into()));
    }

    partner::Entity::find_by_id(referrer_id)
      .one(self.db)
      .await?
      .ok_or(Error::PartnerNotFound)?;

    let now = Utc::now().naive_utc();
    let referral = referral::ActiveModel {
      id: NotSet,
      referrer_id: Set(referrer_id),
      business_name: Set(business_name.to_string()),
      status: Set(ReferralStatus::Submitted),
      commission_pence: Set(commission_pence),
      created_at: Set(now),
      paid_at: Set(None),
    };

    Ok(referral.insert(self.db).await?)
  }

  pub async fn get(&self, id: i64) -> Result<referral::Model> {
    referral::Entity::find_by_id(id)
      .one(self.db)
      .await?
      .ok_or(Error::ReferralNotFound)
  }

  pub async fn by_referrer(
    &self,
    referrer_id: i64,
  ) -> Result<Vec<referral::Model>> {
    Ok(
      referral::Entity::find()
        .filter(referral::Column::ReferrerId.eq(referrer_id))
        .order_by_desc(referral::Column::CreatedAt)
        .all(self.db)
        .await?,
    )
  }

  /// Advance the pipeline one step. Landing on `paid` stamps `paid_at`.
  pub async fn transition(
    &self,
    referral_id: i64,
    next: ReferralStatus,
  ) -> Result<referral::Model> {
    let referral = self.get(referral_id).await?;

    if !referral.status.can_transition_to(next) {
      return Err(Error::InvalidTransition(format!(
        "{:?} -> {:?}",
        referral.status, next
      )));
    }

    let now = Utc::now().naive_utc();
    let mut active: referral::ActiveModel = referral.into();
    active.status = Set(next);
    if next == ReferralStatus::Paid {
      active.paid_at = Set(Some(now));
    }

    Ok(active.update(self.db).await?)
  }

  /// Close a referral as paid and generate its commission payments. A
  /// duplicate paid event skips the transition and falls through to the
  /// generator, whose idempotency guard hands back the existing rows.
  pub async fn mark_paid(
    &self,
    referral_id: i64,
  ) -> Result<Vec<commission_payment::Model>> {
    let referral = self.get(referral_id).await?;

    if referral.status != ReferralStatus::Paid {
      self.transition(referral_id, ReferralStatus::Paid).await?;
    }

    Commission::new(self.db).generate(referral_id).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::{Hierarchy, Partner, test_utils::test_db};

  async fn seed_partner(db: &DatabaseConnection) -> partner::Model {
    Partner::new(db).register("Referrer", 1).await.unwrap()
  }

  #[tokio::test]
  async fn test_submit_starts_in_submitted() {
    let db = test_db::setup().await;
    let referrer = seed_partner(&db).await;

    let referral = Referral::new(&db)
      .submit(referrer.id, "Acme Ltd", 100_000)
      .await
      .unwrap();

    assert_eq!(referral.status, ReferralStatus::Submitted);
    assert_eq!(referral.commission_pence, 100_000);
    assert!(referral.paid_at.is_none());
  }

  #[tokio::test]
  async fn test_submit_validates_input() {
    let db = test_db::setup().await;
    let referrer = seed_partner(&db).await;
    let svc = Referral::new(&db);

    assert!(matches!(
      svc.submit(referrer.id, " ", 100).await,
      Err(Error::InvalidArgs(_))
    ));
    assert!(matches!(
      svc.submit(referrer.id, "Acme", 0).await,
      Err(Error::InvalidArgs(_))
    ));
    assert!(matches!(
      svc.submit(404, "Acme", 100).await,
      Err(Error::PartnerNotFound)
    ));
  }

  #[tokio::test]
  async fn test_pipeline_advances_in_order() {
    let db = test_db::setup().await;
    let referrer = seed_partner(&db).await;
    let svc = Referral::new(&db);

    let referral =
      svc.submit(referrer.id, "Acme Ltd", 100_000).await.unwrap();

    let referral = svc
      .transition(referral.id, ReferralStatus::Quoted)
      .await
      .unwrap();
    assert_eq!(referral.status, ReferralStatus::Quoted);

    let referral = svc
      .transition(referral.id, ReferralStatus::Approved)
      .await
      .unwrap();
    assert_eq!(referral.status, ReferralStatus::Approved);

    let referral = svc
      .transition(referral.id, ReferralStatus::Paid)
      .await
      .unwrap();
    assert_eq!(referral.status, ReferralStatus::Paid);
    assert!(referral.paid_at.is_some());
  }

  #[tokio::test]
  async fn test_skipping_steps_rejected() {
    let db = test_db::setup().await;
    let referrer = seed_partner(&db).await;
    let svc = Referral::new(&db);

    let referral =
      svc.submit(referrer.id, "Acme Ltd", 100_000).await.unwrap();

    let result = svc.transition(referral.id, ReferralStatus::Paid).await;
    assert!(matches!(result, Err(Error::InvalidTransition(_))));
  }

  #[tokio::test]
  async fn test_terminal_states_are_final() {
    let db = test_db::setup().await;
    let referrer = seed_partner(&db).await;
    let svc = Referral::new(&db);

    let referral =
      svc.submit(referrer.id, "Acme Ltd", 100_000).await.unwrap();
    svc
      .transition(referral.id, ReferralStatus::Rejected)
      .await
      .unwrap();

    let result = svc.transition(referral.id, ReferralStatus::Quoted).await;
    assert!(matches!(result, Err(Error::InvalidTransition(_))));
  }

  #[tokio::test]
  async fn test_mark_paid_generates_and_tolerates_duplicates() {
    let db = test_db::setup().await;
    let svc = Referral::new(&db);

    let parent = Partner::new(&db).register("Parent", 1).await.unwrap();
    let referrer = Partner::new(&db).register("Referrer", 1).await.unwrap();
    Hierarchy::new(&db).attach(referrer.id, parent.id).await.unwrap();

    let referral =
      svc.submit(referrer.id, "Acme Ltd", 100_000).await.unwrap();
    svc
      .transition(referral.id, ReferralStatus::Quoted)
      .await
      .unwrap();
    svc
      .transition(referral.id, ReferralStatus::Approved)
      .await
      .unwrap();

    let first = svc.mark_paid(referral.id).await.unwrap();
    assert_eq!(first.len(), 2);

    // Duplicate status event fires again, nothing new is written.
    let second = svc.mark_paid(referral.id).await.unwrap();
    assert_eq!(first, second);

    let stored =
      commission_payment::Entity::find().count(&db).await.unwrap();
    assert_eq!(stored, 2);
  }
}
