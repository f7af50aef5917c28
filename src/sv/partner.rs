use uuid::Uuid;

use crate::{entity::partner, prelude::*, sv::Hierarchy};

pub struct Partner<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Partner<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Register a partner and issue its referral code. The tier is an
  /// administrative setting, not a hierarchy position.
  pub async fn register(
    &self,
    display_name: &str,
    partner_level: i32,
  ) -> Result<partner::Model> {
    let display_name = display_name.trim();
    if display_name.is_empty() {
      return Err(Error::InvalidArgs("display name must not be empty".into()));
    }
    if !(1..=3).contains(&partner_level) {
      return Err(Error::InvalidArgs("partner level must be 1..=3".into()));
    }

    let now = Utc::now().naive_utc();
    let partner = partner::ActiveModel {
      id: NotSet,
      display_name: Set(display_name.to_string()),
      parent_partner_id: Set(None),
      partner_level: Set(partner_level),
      referral_code: Set(issue_code()),
      joined_at: Set(now),
    };

    Ok(partner.insert(self.db).await?)
  }

  pub async fn get(&self, id: i64) -> Result<partner::Model> {
    partner::Entity::find_by_id(id)
      .one(self.db)
      .await?
      .ok_or(Error::PartnerNotFound)
  }

  pub async fn by_referral_code(&self, code: &str) -> Result<partner::Model> {
    partner::Entity::find()
      .filter(partner::Column::ReferralCode.eq(code))
      .one(self.db)
      .await?
      .ok_or(Error::PartnerNotFound)
  }

  /// Join an existing partner's team using their referral code. Returns
  /// the recruiter. Recruiting yourself with your own code is a cycle.
  pub async fn attach_by_code(
    &self,
    child_id: i64,
    code: &str,
  ) -> Result<partner::Model> {
    let recruiter = self.by_referral_code(code).await?;
    Hierarchy::new(self.db).attach(child_id, recruiter.id).await?;
    Ok(recruiter)
  }
}

/// Codes are immutable once issued; collisions land on the unique index.
fn issue_code() -> String {
  Uuid::new_v4().simple().to_string()[..10].to_uppercase()
}
