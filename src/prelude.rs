pub use std::{
  collections::{HashMap, HashSet},
  sync::Arc,
  time::Duration,
};

pub use chrono::{NaiveDateTime as DateTime, Utc};
pub use sea_orm::{
  ActiveModelTrait, ColumnTrait, ConnectionTrait, Database,
  DatabaseConnection, EntityTrait, NotSet, PaginatorTrait, QueryFilter,
  QueryOrder, QuerySelect, Set, TransactionTrait,
};
pub use migration::MigratorTrait;
pub use tracing::{debug, error, info, trace, warn};

pub use crate::error::{Error, Result};
