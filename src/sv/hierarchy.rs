use sea_orm::{DatabaseTransaction, SqlErr, sea_query::Expr};

use crate::{
  entity::{hierarchy_edge, partner},
  prelude::*,
};

/// Depth cap of the ancestor index. Ancestors past this level never earn
/// an override, so they are not indexed.
pub const MAX_TRACKED_LEVEL: i32 = 3;

pub struct Hierarchy<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Hierarchy<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Recruit `child_id` under `parent_id` and extend the ancestor index.
  ///
  /// The child must still be a root. On success one edge per ancestor of
  /// the new parent is written, shifted one level deeper and discarded
  /// past [`MAX_TRACKED_LEVEL`]. Payments are never touched here.
  pub async fn attach(&self, child_id: i64, parent_id: i64) -> Result<()> {
    if child_id == parent_id {
      return Err(Error::CycleDetected);
    }

    let txn = self.db.begin().await?;

    let child = partner::Entity::find_by_id(child_id)
      .one(&txn)
      .await?
      .ok_or(Error::PartnerNotFound)?;

    if child.parent_partner_id.is_some() {
      return Err(Error::AlreadyAttached);
    }

    partner::Entity::find_by_id(parent_id)
      .one(&txn)
      .await?
      .ok_or(Error::PartnerNotFound)?;

    ensure_no_cycle(&txn, child_id, parent_id).await?;

    // First writer wins: the claim only lands if the child is still a
    // root at write time, a concurrent attach sees zero rows affected.
    let claimed = partner::Entity::update_many()
      .col_expr(partner::Column::ParentPartnerId, Expr::value(parent_id))
      .filter(partner::Column::Id.eq(child_id))
      .filter(partner::Column::ParentPartnerId.is_null())
      .exec(&txn)
      .await?;

    if claimed.rows_affected == 0 {
      return Err(Error::AlreadyAttached);
    }

    let now = Utc::now().naive_utc();
    let mut edges = vec![hierarchy_edge::ActiveModel {
      child_id: Set(child_id),
      level: Set(1),
      ancestor_id: Set(parent_id),
      created_at: Set(now),
    }];

    let upline = hierarchy_edge::Entity::find()
      .filter(hierarchy_edge::Column::ChildId.eq(parent_id))
      .filter(hierarchy_edge::Column::Level.lt(MAX_TRACKED_LEVEL))
      .order_by_asc(hierarchy_edge::Column::Level)
      .all(&txn)
      .await?;

    for edge in upline {
      edges.push(hierarchy_edge::ActiveModel {
        child_id: Set(child_id),
        level: Set(edge.level + 1),
        ancestor_id: Set(edge.ancestor_id),
        created_at: Set(now),
      });
    }

    hierarchy_edge::Entity::insert_many(edges)
      .exec_without_returning(&txn)
      .await
      .map_err(|err| match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => Error::AlreadyAttached,
        _ => Error::Db(err),
      })?;

    txn.commit().await?;
    Ok(())
  }
}

/// Walks the raw parent pointers upward from `parent_id`. The index is
/// truncated at [`MAX_TRACKED_LEVEL`] and cannot witness deeper ancestry,
/// so the pointer chain is the source of truth for cycle checks.
async fn ensure_no_cycle(
  txn: &DatabaseTransaction,
  child_id: i64,
  parent_id: i64,
) -> Result<()> {
  let mut seen = HashSet::new();
  let mut cursor = Some(parent_id);

  while let Some(id) = cursor {
    if id == child_id {
      return Err(Error::CycleDetected);
    }
    if !seen.insert(id) {
      break;
    }
    cursor = partner::Entity::find_by_id(id)
      .one(txn)
      .await?
      .and_then(|p| p.parent_partner_id);
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::test_utils::test_db;

  async fn seed(db: &DatabaseConnection, name: &str) -> partner::Model {
    let now = Utc::now().naive_utc();
    partner::ActiveModel {
      id: NotSet,
      display_name: Set(name.to_string()),
      parent_partner_id: Set(None),
      partner_level: Set(1),
      referral_code: Set(format!("CODE-{name}")),
      joined_at: Set(now),
    }
    .insert(db)
    .await
    .unwrap()
  }

  async fn edges_of(
    db: &DatabaseConnection,
    child_id: i64,
  ) -> Vec<hierarchy_edge::Model> {
    hierarchy_edge::Entity::find()
      .filter(hierarchy_edge::Column::ChildId.eq(child_id))
      .order_by_asc(hierarchy_edge::Column::Level)
      .all(db)
      .await
      .unwrap()
  }

  #[tokio::test]
  async fn test_attach_writes_direct_edge() {
    let db = test_db::setup().await;
    let root = seed(&db, "root").await;
    let child = seed(&db, "child").await;

    Hierarchy::new(&db).attach(child.id, root.id).await.unwrap();

    let edges = edges_of(&db, child.id).await;
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].level, 1);
    assert_eq!(edges[0].ancestor_id, root.id);

    let child = partner::Entity::find_by_id(child.id)
      .one(&db)
      .await
      .unwrap()
      .unwrap();
    assert_eq!(child.parent_partner_id, Some(root.id));
  }

  #[tokio::test]
  async fn test_chain_indexes_each_ancestor_once_per_level() {
    let db = test_db::setup().await;
    let a = seed(&db, "a").await;
    let b = seed(&db, "b").await;
    let c = seed(&db, "c").await;
    let d = seed(&db, "d").await;

    let hierarchy = Hierarchy::new(&db);
    hierarchy.attach(b.id, a.id).await.unwrap();
    hierarchy.attach(c.id, b.id).await.unwrap();
    hierarchy.attach(d.id, c.id).await.unwrap();

    let edges = edges_of(&db, d.id).await;
    let levels: Vec<i32> = edges.iter().map(|e| e.level).collect();
    let ancestors: Vec<i64> = edges.iter().map(|e| e.ancestor_id).collect();

    assert_eq!(levels, vec![1, 2, 3]);
    assert_eq!(ancestors, vec![c.id, b.id, a.id]);
  }

  #[tokio::test]
  async fn test_index_stops_at_tracked_depth() {
    let db = test_db::setup().await;

    let hierarchy = Hierarchy::new(&db);
    let mut chain = vec![seed(&db, "p0").await];
    for i in 1..6 {
      let next = seed(&db, &format!("p{i}")).await;
      hierarchy.attach(next.id, chain.last().unwrap().id).await.unwrap();
      chain.push(next);
    }

    let deepest = chain.last().unwrap();
    let edges = edges_of(&db, deepest.id).await;
    assert_eq!(edges.len(), MAX_TRACKED_LEVEL as usize);
    assert!(edges.iter().all(|e| e.level <= MAX_TRACKED_LEVEL));
  }

  #[tokio::test]
  async fn test_no_self_ancestry() {
    let db = test_db::setup().await;
    let a = seed(&db, "a").await;
    let b = seed(&db, "b").await;
    let c = seed(&db, "c").await;

    let hierarchy = Hierarchy::new(&db);
    hierarchy.attach(b.id, a.id).await.unwrap();
    hierarchy.attach(c.id, b.id).await.unwrap();

    let all = hierarchy_edge::Entity::find().all(&db).await.unwrap();
    assert!(all.iter().all(|e| e.child_id != e.ancestor_id));
  }

  #[tokio::test]
  async fn test_attach_twice_rejected() {
    let db = test_db::setup().await;
    let a = seed(&db, "a").await;
    let b = seed(&db, "b").await;
    let c = seed(&db, "c").await;

    let hierarchy = Hierarchy::new(&db);
    hierarchy.attach(c.id, a.id).await.unwrap();

    let result = hierarchy.attach(c.id, b.id).await;
    assert!(matches!(result, Err(Error::AlreadyAttached)));
  }

  #[tokio::test]
  async fn test_self_attach_rejected() {
    let db = test_db::setup().await;
    let a = seed(&db, "a").await;

    let result = Hierarchy::new(&db).attach(a.id, a.id).await;
    assert!(matches!(result, Err(Error::CycleDetected)));
  }

  #[tokio::test]
  async fn test_direct_cycle_rejected() {
    let db = test_db::setup().await;
    let a = seed(&db, "a").await;
    let b = seed(&db, "b").await;

    let hierarchy = Hierarchy::new(&db);
    hierarchy.attach(b.id, a.id).await.unwrap();

    let result = hierarchy.attach(a.id, b.id).await;
    assert!(matches!(result, Err(Error::CycleDetected)));
  }

  #[tokio::test]
  async fn test_deep_cycle_rejected() {
    let db = test_db::setup().await;
    let a = seed(&db, "a").await;
    let b = seed(&db, "b").await;
    let c = seed(&db, "c").await;
    let d = seed(&db, "d").await;

    let hierarchy = Hierarchy::new(&db);
    hierarchy.attach(b.id, a.id).await.unwrap();
    hierarchy.attach(c.id, b.id).await.unwrap();
    hierarchy.attach(d.id, c.id).await.unwrap();

    // `a` under its own great-grandchild, deeper than the index tracks.
    let result = hierarchy.attach(a.id, d.id).await;
    assert!(matches!(result, Err(Error::CycleDetected)));
  }

  #[tokio::test]
  async fn test_unknown_partner_rejected() {
    let db = test_db::setup().await;
    let a = seed(&db, "a").await;

    let hierarchy = Hierarchy::new(&db);
    assert!(matches!(
      hierarchy.attach(a.id, 999).await,
      Err(Error::PartnerNotFound)
    ));
    assert!(matches!(
      hierarchy.attach(999, a.id).await,
      Err(Error::PartnerNotFound)
    ));
  }
}
