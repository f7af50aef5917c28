pub mod commission;
pub mod hierarchy;
pub mod partner;
pub mod referral;
pub mod settlement;
pub mod stats;
#[cfg(test)]
pub mod test_utils;
pub mod tree;

pub use commission::Commission;
pub use hierarchy::Hierarchy;
pub use partner::Partner;
pub use referral::Referral;
pub use settlement::Settlement;
pub use stats::Stats;
pub use tree::Tree;
