//! Best-arm search over next-tick vehicle controls.
//!
//! Each cycle a [`MonteCarloTreeEvaluator`] enumerates the controls reachable
//! from the vehicle's current control, samples every candidate with short
//! randomized rollouts of the simulation, and answers with the candidate the
//! configured [`PayoutPolicy`] ranks best.

pub mod agent;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod policy;
pub mod worker;

pub use agent::MonteCarloVehicleAi;
pub use config::{PolicyKind, SearchConfig};
pub use error::{SearchError, WorkerError};
pub use evaluator::{MonteCarloTreeEvaluator, Phase};
pub use policy::{Payout, PayoutPolicy, Rank, RolloutOutcome};
pub use worker::AgentWorker;
