use crate::defs::{Continuous, Discrete};
use thiserror::Error;

/// Errors raised while building an MDP or evaluating a policy on it.
#[derive(Debug, Error, PartialEq)]
pub enum EvaluationError {
    #[error("probability tensor shape {probabilities:?} differs from cost tensor shape {costs:?}")]
    ShapeMismatch {
        probabilities: [usize; 3],
        costs: [usize; 3],
    },
    #[error("tensor shape {shape:?} is not [actions, n_s, n_s]")]
    NotSquare { shape: [usize; 3] },
    #[error("expected {expected} states but {what} has {found}")]
    StateCount {
        expected: usize,
        found: usize,
        what: &'static str,
    },
    #[error("state space is empty")]
    EmptyStateSpace,
    #[error("action space is empty")]
    EmptyActionSpace,
    #[error("policy picks action {action} at state {state} but only {n_a} actions exist")]
    InvalidAction {
        state: Discrete,
        action: Discrete,
        n_a: usize,
    },
    #[error("transition ({state}, {action}) -> {next_state} is out of range")]
    InvalidTransition {
        state: Discrete,
        action: Discrete,
        next_state: Discrete,
    },
    #[error("invalid {name}: {value}")]
    InvalidParameter {
        name: &'static str,
        value: Continuous,
    },
    #[error("did not converge after {iterations} sweeps (change {error}%)")]
    NotConverged {
        iterations: usize,
        error: Continuous,
        values: Vec<Continuous>,
    },
    #[error("config: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, EvaluationError>;
