//! Hunter policies.
//!
//! Every way of driving a hunter (learned table, target arbitration,
//! hand-coded chase, random play, or an external provider) sits behind
//! the same [`HunterPolicy`] contract: observation in, decision out.

pub mod arbitrated;
#[cfg(feature = "serde")]
pub mod external;
pub mod greedy;
pub mod random;
pub mod table;
pub mod trait_;

pub use arbitrated::ArbitratedPolicy;
#[cfg(feature = "serde")]
pub use external::ExternalPolicy;
pub use greedy::GreedyChasePolicy;
pub use random::RandomPolicy;
pub use table::TablePolicy;
pub use trait_::HunterPolicy;
