use crate::config::{EvaluationConfig, SweepMode};
use crate::defs::*;
use crate::error::{EvaluationError, Result};
use crate::math::{discount_factor, relative_rms_change};
use crate::mdps::mdp::{check_shapes, Mdp};
use itertools::izip;
use ndarray::Array2;
use rayon::prelude::*;
use tracing::{debug, trace, warn};

/// Converged value function of a fixed policy.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub values: Vec<Continuous>,
    /// Number of sweeps performed.
    pub iterations: usize,
    /// Relative RMS change of the last sweep, in percent.
    pub error: Continuous,
    pub gamma: Continuous,
}

/// Iterative policy evaluation under continuous discounting.
///
/// The tensors of `mdp` are indexed `[action, next_state, state]`. Each sweep
/// computes `V'[s] = Σ_i γ·P[i, s]·(V[i] + K[i, s])` for every state from the
/// previous iterate only, where `P` and `K` are the tensors with the action
/// fixed by `policy[s]`. Iteration stops once
/// `100·‖V' − V‖₂ / ‖V‖₂ <= config.tolerance`, or fails with
/// [`EvaluationError::NotConverged`] after `config.max_iterations` sweeps.
/// A sweep out of an all-zero iterate into a nonzero one never stops the
/// iteration; if no sweep could be measured the reported error is infinite.
pub fn evaluate<M: Mdp + ?Sized>(
    mdp: &M,
    n_s: usize,
    policy: &[Discrete],
    config: &EvaluationConfig,
    v0: &[Continuous],
) -> Result<Evaluation> {
    config.validate()?;
    validate_inputs(mdp, n_s, policy, v0)?;

    let gamma = discount_factor(config.interest_rate, config.time_step);
    let (p, k) = collapse(mdp, policy);

    let mut v = v0.to_vec();
    let mut error = Continuous::INFINITY;
    for iteration in 1..=config.max_iterations {
        let v_new = sweep(&p, &k, &v, gamma, config.sweep);
        let change = relative_rms_change(&v, &v_new);
        v = v_new;
        let Some(change) = change else {
            // Moving away from an all-zero iterate: not a converged sweep.
            trace!(iteration, "sweep from zero");
            continue;
        };
        error = change;
        trace!(iteration, error, "sweep");

        if !error.is_finite() {
            warn!(iteration, "value iteration diverged");
            return Err(EvaluationError::NotConverged {
                iterations: iteration,
                error,
                values: v,
            });
        }

        if error <= config.tolerance {
            debug!(iteration, error, gamma, "policy evaluation converged");
            return Ok(Evaluation {
                values: v,
                iterations: iteration,
                error,
                gamma,
            });
        }
    }

    warn!(
        max_iterations = config.max_iterations,
        error, "policy evaluation did not converge"
    );
    Err(EvaluationError::NotConverged {
        iterations: config.max_iterations,
        error,
        values: v,
    })
}

/// Fixes the action of every state: `P[s', s] = T[π[s], s', s]` and
/// `K[s', s] = C[π[s], s', s]`. The policy must already be in range.
pub fn collapse<M: Mdp + ?Sized>(
    mdp: &M,
    policy: &[Discrete],
) -> (Array2<Continuous>, Array2<Continuous>) {
    let t = mdp.probabilities();
    let c = mdp.costs();
    let n_s = policy.len();

    let p = Array2::from_shape_fn((n_s, n_s), |(next, s)| t[[policy[s], next, s]]);
    let k = Array2::from_shape_fn((n_s, n_s), |(next, s)| c[[policy[s], next, s]]);

    (p, k)
}

fn sweep(
    p: &Array2<Continuous>,
    k: &Array2<Continuous>,
    v: &[Continuous],
    gamma: Continuous,
    mode: SweepMode,
) -> Vec<Continuous> {
    let update = |s: Discrete| -> Continuous {
        izip!(p.column(s), k.column(s), v)
            .map(|(pi, ki, vi)| gamma * pi * (vi + ki))
            .sum()
    };

    match mode {
        SweepMode::Sequential => (0..v.len()).map(update).collect(),
        SweepMode::Parallel => (0..v.len()).into_par_iter().map(update).collect(),
    }
}

fn validate_inputs<M: Mdp + ?Sized>(
    mdp: &M,
    n_s: usize,
    policy: &[Discrete],
    v0: &[Continuous],
) -> Result<()> {
    validate_policy(mdp, n_s, policy)?;

    if v0.len() != n_s {
        return Err(EvaluationError::StateCount {
            expected: n_s,
            found: v0.len(),
            what: "the initial estimate",
        });
    }

    Ok(())
}

/// Checks the tensors and `policy` against `n_s` states. Counts come from
/// the tensor shapes, the axes [`collapse`] indexes, not from
/// [`Mdp::n_s`] and [`Mdp::n_a`].
pub(crate) fn validate_policy<M: Mdp + ?Sized>(
    mdp: &M,
    n_s: usize,
    policy: &[Discrete],
) -> Result<()> {
    let probabilities = mdp.probabilities();
    check_shapes(probabilities.view(), mdp.costs())?;
    let shape = probabilities.shape();

    let counts = [
        (shape[2], "the transition tensor"),
        (policy.len(), "the policy"),
    ];
    for (found, what) in counts {
        if found != n_s {
            return Err(EvaluationError::StateCount {
                expected: n_s,
                found,
                what,
            });
        }
    }

    let n_a = shape[0];
    if let Some((state, &action)) = policy.iter().enumerate().find(|&(_, &a)| a >= n_a) {
        return Err(EvaluationError::InvalidAction { state, action, n_a });
    }

    Ok(())
}
