//! Discounted evaluation of a fixed policy on a finite Markov decision
//! process, and the levelized cost of water built on top of it.
//!
//! All tensors are indexed `[action, next_state, state]`.

pub mod config;
pub mod defs;
pub mod envs;
pub mod error;
pub mod levelized;
pub mod math;
pub mod mdps;

pub use config::{EvaluationConfig, Settings, SweepMode};
pub use defs::*;
pub use error::{EvaluationError, Result};
pub use mdps::mdp::{Mdp, TensorMdp, Transition, Transitions};
pub use mdps::solvers::policy_evaluation::{evaluate, Evaluation};
