use crate::defs::*;
use crate::error::{EvaluationError, Result};
use ndarray::{Array3, ArrayView3};
use std::collections::HashMap;

/// Markov Decision Process - Sutton & Barto 2018.
///
/// Both tensors are indexed `[action, next_state, state]`: entry
/// `[a, s', s]` describes the move from `s` to `s'` under action `a`.
pub trait Mdp {
    fn n_s(&self) -> usize;

    fn n_a(&self) -> usize;

    fn probabilities(&self) -> ArrayView3<'_, Continuous>;

    /// Cost, or reward, charged on each transition. The sign is the caller's.
    fn costs(&self) -> ArrayView3<'_, Continuous>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub next_state: Discrete,
    pub probability: Continuous,
    pub cost: Continuous,
}

/// Sparse transition table keyed by `(state, action)`.
pub type Transitions = HashMap<(Discrete, Discrete), Vec<Transition>>;

/// Dense MDP with tensors laid out `[action, next_state, state]`.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorMdp {
    probabilities: Array3<Continuous>,
    costs: Array3<Continuous>,
}

impl TensorMdp {
    /// Columns of `probabilities` are not checked to sum to one.
    pub fn new(probabilities: Array3<Continuous>, costs: Array3<Continuous>) -> Result<Self> {
        check_shapes(probabilities.view(), costs.view())?;

        Ok(Self {
            probabilities,
            costs,
        })
    }

    /// Densifies a sparse table. `(state, action)` pairs absent from the
    /// table keep all-zero columns. Repeated next states add up their
    /// probability and carry the probability weighted mean of their costs.
    pub fn from_transitions(n_s: usize, n_a: usize, transitions: &Transitions) -> Result<Self> {
        if n_s == 0 {
            return Err(EvaluationError::EmptyStateSpace);
        }
        if n_a == 0 {
            return Err(EvaluationError::EmptyActionSpace);
        }

        let mut probabilities = Array3::<Continuous>::zeros((n_a, n_s, n_s));
        let mut weighted = Array3::<Continuous>::zeros((n_a, n_s, n_s));
        for (&(s, a), ts) in transitions {
            for t in ts {
                if s >= n_s || a >= n_a || t.next_state >= n_s {
                    return Err(EvaluationError::InvalidTransition {
                        state: s,
                        action: a,
                        next_state: t.next_state,
                    });
                }
                probabilities[[a, t.next_state, s]] += t.probability;
                weighted[[a, t.next_state, s]] += t.probability * t.cost;
            }
        }

        let mut costs = weighted;
        ndarray::Zip::from(&mut costs)
            .and(&probabilities)
            .for_each(|c, &p| *c = if p == 0. { 0. } else { *c / p });

        Self::new(probabilities, costs)
    }

    /// Same dynamics with every cost multiplied by `c`.
    pub fn scaled(&self, c: Continuous) -> Self {
        Self {
            probabilities: self.probabilities.clone(),
            costs: &self.costs * c,
        }
    }
}

impl Mdp for TensorMdp {
    fn n_s(&self) -> usize {
        self.probabilities.shape()[2]
    }

    fn n_a(&self) -> usize {
        self.probabilities.shape()[0]
    }

    fn probabilities(&self) -> ArrayView3<'_, Continuous> {
        self.probabilities.view()
    }

    fn costs(&self) -> ArrayView3<'_, Continuous> {
        self.costs.view()
    }
}

/// Equal shapes, square state axes, at least one state and one action.
pub fn check_shapes(
    probabilities: ArrayView3<'_, Continuous>,
    costs: ArrayView3<'_, Continuous>,
) -> Result<()> {
    let p = shape3(probabilities.shape());
    let c = shape3(costs.shape());
    if p != c {
        return Err(EvaluationError::ShapeMismatch {
            probabilities: p,
            costs: c,
        });
    }
    if p[1] != p[2] {
        return Err(EvaluationError::NotSquare { shape: p });
    }
    if p[2] == 0 {
        return Err(EvaluationError::EmptyStateSpace);
    }
    if p[0] == 0 {
        return Err(EvaluationError::EmptyActionSpace);
    }

    Ok(())
}

fn shape3(shape: &[usize]) -> [usize; 3] {
    [shape[0], shape[1], shape[2]]
}
