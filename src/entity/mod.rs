pub mod commission_payment;
pub mod hierarchy_edge;
pub mod partner;
pub mod referral;

pub use commission_payment::PaymentStatus;
#[allow(unused_imports)]
pub use referral::ReferralStatus;
