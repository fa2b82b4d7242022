//! hunter_task - tabular Q-learning hunters on a toroidal grid
//!
//! Hunters learn to capture stochastically moving prey with tabular
//! Q-learning. Two independently trained hunters can then share a map and
//! divide the prey between them, optionally reasoning about which prey the
//! partner is going for.
//!
//! The crate is organised leaves first:
//!
//! - [`grid`] and [`types`]: torus geometry, actions and state keys
//! - [`environment`], [`prey`] and [`reward`]: the simulation step
//! - [`q_table`] and [`agent`]: the learner
//! - [`episode`]: training and evaluation loops with seed replay
//! - [`arbitration`] and [`policy`]: multi-hunter decision making
//! - [`metrics`], [`export`] and `persistence`: reporting and storage

pub mod agent;
pub mod arbitration;
pub mod config;
pub mod environment;
pub mod episode;
pub mod error;
pub mod export;
pub mod grid;
pub mod metrics;
pub mod observation;
#[cfg(feature = "serde")]
pub mod persistence;
pub mod policy;
pub mod prey;
pub mod q_table;
pub mod reward;
pub mod types;

pub use agent::QLearningAgent;
pub use arbitration::{
    ArbiterConfig, MovementStrategy, OpponentModel, PolicyLevel, TargetArbiter, TargetDecision,
};
pub use config::{AgentConfig, HunterConfig, Placement};
pub use environment::{CaptureRule, HuntEnvironment, Snapshot, StepResult};
pub use episode::{EpisodeDriver, EpisodeRecord, EpisodeTrace, SeedSequence, StepLog};
pub use error::{HunterError, Result};
pub use grid::{euclidean_torus, manhattan_torus, torus_delta, wrap, Grid, Position};
pub use metrics::EvaluationMetrics;
pub use observation::{Decision, Observation};
pub use policy::HunterPolicy;
pub use prey::PreyMotion;
pub use q_table::{ActionValues, QTable};
pub use reward::{RewardComputer, RewardConfig, RewardPolicy, ShapingMetric};
pub use types::{Action, StateEncoding, StateKey};
