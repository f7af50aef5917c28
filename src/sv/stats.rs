use serde::Serialize;

use crate::{
  entity::{PaymentStatus, commission_payment, partner, referral},
  prelude::*,
};

/// Team-analytics summary for one partner's dashboard card.
#[derive(Debug, Serialize)]
pub struct PartnerStats {
  pub direct_recruits: u64,
  pub downline_size: u64,
  pub referrals_submitted: u64,
  pub pending_pence: i64,
  pub paid_pence: i64,
  pub lifetime_pence: i64,
}

pub struct Stats<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Stats<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn for_partner(&self, partner_id: i64) -> Result<PartnerStats> {
    partner::Entity::find_by_id(partner_id)
      .one(self.db)
      .await?
      .ok_or(Error::PartnerNotFound)?;

    let direct_recruits = partner::Entity::find()
      .filter(partner::Column::ParentPartnerId.eq(partner_id))
      .count(self.db)
      .await?;

    let referrals_submitted = referral::Entity::find()
      .filter(referral::Column::ReferrerId.eq(partner_id))
      .count(self.db)
      .await?;

    Ok(PartnerStats {
      direct_recruits,
      downline_size: self.downline_count(partner_id).await?,
      referrals_submitted,
      pending_pence: self
        .earned(partner_id, Some(PaymentStatus::Pending))
        .await?,
      paid_pence: self.earned(partner_id, Some(PaymentStatus::Paid)).await?,
      lifetime_pence: self.earned(partner_id, None).await?,
    })
  }

  /// Size of the whole downline, unbounded depth.
  async fn downline_count(&self, partner_id: i64) -> Result<u64> {
    let mut total = 0u64;
    let mut frontier = vec![partner_id];

    while !frontier.is_empty() {
      let children: Vec<i64> = partner::Entity::find()
        .select_only()
        .column(partner::Column::Id)
        .filter(partner::Column::ParentPartnerId.is_in(frontier))
        .into_tuple()
        .all(self.db)
        .await?;

      total += children.len() as u64;
      frontier = children;
    }

    Ok(total)
  }

  async fn earned(
    &self,
    partner_id: i64,
    status: Option<PaymentStatus>,
  ) -> Result<i64> {
    use sea_orm::sea_query::Expr;

    let mut query = commission_payment::Entity::find()
      .select_only()
      .column_as(
        Expr::col(commission_payment::Column::AmountPence).sum(),
        "pence",
      )
      .filter(commission_payment::Column::RecipientId.eq(partner_id));

    if let Some(status) = status {
      query = query.filter(commission_payment::Column::Status.eq(status));
    }

    let sum: Option<Option<i64>> = query.into_tuple().one(self.db).await?;
    Ok(sum.flatten().unwrap_or(0))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::{
    Hierarchy, Partner, Referral, Settlement, test_utils::test_db,
  };

  #[tokio::test]
  async fn test_stats_for_mid_tree_partner() {
    let db = test_db::setup().await;
    let partners = Partner::new(&db);

    let grandparent = partners.register("Grandparent", 3).await.unwrap();
    let parent = partners.register("Parent", 2).await.unwrap();
    let referrer = partners.register("Referrer", 1).await.unwrap();

    let hierarchy = Hierarchy::new(&db);
    hierarchy.attach(parent.id, grandparent.id).await.unwrap();
    hierarchy.attach(referrer.id, parent.id).await.unwrap();

    let referrals = Referral::new(&db);
    let referral = referrals
      .submit(referrer.id, "Acme Ltd", 100_000)
      .await
      .unwrap();
    referrals
      .transition(referral.id, crate::entity::ReferralStatus::Quoted)
      .await
      .unwrap();
    referrals
      .transition(referral.id, crate::entity::ReferralStatus::Approved)
      .await
      .unwrap();
    let payments = referrals.mark_paid(referral.id).await.unwrap();

    // Settle the parent's £200 override, leave the rest pending.
    let override_payment =
      payments.iter().find(|p| p.recipient_id == parent.id).unwrap();
    let settlement = Settlement::new(&db);
    settlement.mark_processing(override_payment.id).await.unwrap();
    settlement.mark_paid(override_payment.id).await.unwrap();

    let stats = Stats::new(&db).for_partner(parent.id).await.unwrap();
    assert_eq!(stats.direct_recruits, 1);
    assert_eq!(stats.downline_size, 1);
    assert_eq!(stats.referrals_submitted, 0);
    assert_eq!(stats.pending_pence, 0);
    assert_eq!(stats.paid_pence, 20_000);
    assert_eq!(stats.lifetime_pence, 20_000);

    let stats = Stats::new(&db).for_partner(referrer.id).await.unwrap();
    assert_eq!(stats.referrals_submitted, 1);
    assert_eq!(stats.pending_pence, 60_000);
    assert_eq!(stats.paid_pence, 0);
    assert_eq!(stats.lifetime_pence, 60_000);

    let stats =
      Stats::new(&db).for_partner(grandparent.id).await.unwrap();
    assert_eq!(stats.direct_recruits, 1);
    assert_eq!(stats.downline_size, 2);
    assert_eq!(stats.pending_pence, 10_000);
  }

  #[tokio::test]
  async fn test_stats_empty_partner() {
    let db = test_db::setup().await;
    let partner = Partner::new(&db).register("Fresh", 1).await.unwrap();

    let stats = Stats::new(&db).for_partner(partner.id).await.unwrap();
    assert_eq!(stats.direct_recruits, 0);
    assert_eq!(stats.downline_size, 0);
    assert_eq!(stats.lifetime_pence, 0);
  }

  #[tokio::test]
  async fn test_stats_unknown_partner() {
    let db = test_db::setup().await;

    let result = Stats::new(&db).for_partner(404).await;
    assert!(matches!(result, Err(Error::PartnerNotFound)));
  }
}
