use crate::{
  entity::{PaymentStatus, commission_payment},
  prelude::*,
};

/// Sole mutator of a payment's status after generation. Rows themselves
/// are never deleted, the ledger is the audit trail.
pub struct Settlement<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Settlement<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn mark_processing(
    &self,
    payment_id: i64,
  ) -> Result<commission_payment::Model> {
    self.advance(payment_id, PaymentStatus::Processing).await
  }

  pub async fn mark_paid(
    &self,
    payment_id: i64,
  ) -> Result<commission_payment::Model> {
    self.advance(payment_id, PaymentStatus::Paid).await
  }

  pub async fn mark_failed(
    &self,
    payment_id: i64,
  ) -> Result<commission_payment::Model> {
    self.advance(payment_id, PaymentStatus::Failed).await
  }

  pub async fn pending(&self) -> Result<Vec<commission_payment::Model>> {
    Ok(
      commission_payment::Entity::find()
        .filter(
          commission_payment::Column::Status.eq(PaymentStatus::Pending),
        )
        .order_by_asc(commission_payment::Column::CreatedAt)
        .all(self.db)
        .await?,
    )
  }

  async fn advance(
    &self,
    payment_id: i64,
    next: PaymentStatus,
  ) -> Result<commission_payment::Model> {
    let txn = self.db.begin().await?;

    let payment = commission_payment::Entity::find_by_id(payment_id)
      .one(&txn)
      .await?
      .ok_or(Error::PaymentNotFound)?;

    let legal = matches!(
      (payment.status, next),
      (PaymentStatus::Pending, PaymentStatus::Processing)
        | (PaymentStatus::Processing, PaymentStatus::Paid)
        | (PaymentStatus::Processing, PaymentStatus::Failed)
    );
    if !legal {
      return Err(Error::InvalidTransition(format!(
        "{:?} -> {:?}",
        payment.status, next
      )));
    }

    let updated =
      commission_payment::ActiveModel { status: Set(next), ..payment.into() }
        .update(&txn)
        .await?;

    txn.commit().await?;
    Ok(updated)
  }
}
