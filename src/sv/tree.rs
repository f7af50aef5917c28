use serde::Serialize;

use crate::{
  entity::{hierarchy_edge, partner},
  prelude::*,
};

/// Nested downline view, keyed by direct-child relationships.
#[derive(Debug, Serialize)]
pub struct TreeNode {
  pub partner: partner::Model,
  pub children: Vec<TreeNode>,
}

pub struct Tree<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Tree<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Ancestor chain of a partner, nearest first. Empty for roots.
  pub async fn upline(
    &self,
    partner_id: i64,
  ) -> Result<Vec<hierarchy_edge::Model>> {
    partner::Entity::find_by_id(partner_id)
      .one(self.db)
      .await?
      .ok_or(Error::PartnerNotFound)?;

    Ok(
      hierarchy_edge::Entity::find()
        .filter(hierarchy_edge::Column::ChildId.eq(partner_id))
        .order_by_asc(hierarchy_edge::Column::Level)
        .all(self.db)
        .await?,
    )
  }

  /// Everyone recruited under a partner, directly or transitively.
  ///
  /// Walks the `parent_partner_id` adjacency breadth-first, so display
  /// depth is independent of the payable-depth cap on the index. Depth
  /// is unbounded unless `max_depth` is given. Reads the latest
  /// committed state, no snapshot guarantee.
  pub async fn downline(
    &self,
    partner_id: i64,
    max_depth: Option<u32>,
  ) -> Result<TreeNode> {
    let root = partner::Entity::find_by_id(partner_id)
      .one(self.db)
      .await?
      .ok_or(Error::PartnerNotFound)?;

    let mut by_parent: HashMap<i64, Vec<partner::Model>> = HashMap::new();
    let mut frontier = vec![partner_id];
    let mut depth = 0u32;

    while !frontier.is_empty() {
      if max_depth.is_some_and(|cap| depth >= cap) {
        break;
      }

      let children = partner::Entity::find()
        .filter(partner::Column::ParentPartnerId.is_in(frontier))
        .order_by_asc(partner::Column::Id)
        .all(self.db)
        .await?;

      frontier = children.iter().map(|p| p.id).collect();
      for child in children {
        if let Some(parent_id) = child.parent_partner_id {
          by_parent.entry(parent_id).or_default().push(child);
        }
      }
      depth += 1;
    }

    Ok(assemble(root, &mut by_parent))
  }
}

fn assemble(
  partner: partner::Model,
  by_parent: &mut HashMap<i64, Vec<partner::Model>>,
) -> TreeNode {
  let children = by_parent
    .remove(&partner.id)
    .unwrap_or_default()
    .into_iter()
    .map(|child| assemble(child, by_parent))
    .collect();

  TreeNode { partner, children }
}
