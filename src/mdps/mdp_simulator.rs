use crate::defs::*;
use crate::error::{EvaluationError, Result};
use crate::mdps::mdp::Mdp;
use crate::mdps::solvers::policy_evaluation::{collapse, validate_policy};
use ndarray::Array2;
use rand::distributions::WeightedIndex;
use rand::prelude::*;

/// One step of an episode: the state entered and the cost paid to enter it.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeEvent {
    pub s: Discrete,
    pub r: Continuous,
}

pub trait EpisodeGenerator {
    fn generate(&self, n: usize, seed: Option<u64>) -> Vec<Vec<EpisodeEvent>>;
}

pub trait Weighted<S> {
    fn s(&self) -> S;

    fn p(&self) -> Continuous;
}

/// Samples one item in proportion to its weight. `None` when no item has
/// positive weight.
pub fn pick_next<T, S>(rng: &mut StdRng, ts: &[T]) -> Option<S>
where
    T: Weighted<S>,
{
    let dist = WeightedIndex::new(ts.iter().map(|item| item.p())).ok()?;
    Some(ts[dist.sample(rng)].s())
}

#[derive(Debug, Clone, Copy)]
struct Successor {
    s: Discrete,
    p: Continuous,
}

impl Weighted<Discrete> for Successor {
    fn s(&self) -> Discrete {
        self.s
    }

    fn p(&self) -> Continuous {
        self.p
    }
}

/// Rolls out the Markov chain a fixed policy induces on an MDP.
///
/// An episode ends on entering a zero-cost absorbing state, on reaching a
/// state with no outgoing probability, or after `horizon` steps.
pub struct PolicyEpisodes {
    successors: Vec<Vec<Successor>>,
    k: Array2<Continuous>,
    start: Discrete,
    horizon: usize,
    seed: u64,
}

impl PolicyEpisodes {
    /// `policy` holds one action per state of `mdp`, and `start` is one of
    /// those states.
    pub fn new<M: Mdp + ?Sized>(
        mdp: &M,
        policy: &[Discrete],
        start: Discrete,
        horizon: usize,
        seed: u64,
    ) -> Result<Self> {
        validate_policy(mdp, policy.len(), policy)?;
        if start >= policy.len() {
            return Err(EvaluationError::InvalidParameter {
                name: "start",
                value: start as Continuous,
            });
        }

        let (p, k) = collapse(mdp, policy);
        let successors = (0..policy.len())
            .map(|s| {
                p.column(s)
                    .iter()
                    .enumerate()
                    .filter(|&(_, &p)| p > 0.)
                    .map(|(next, &p)| Successor { s: next, p })
                    .collect()
            })
            .collect();

        Ok(Self {
            successors,
            k,
            start,
            horizon,
            seed,
        })
    }

    fn is_sink(&self, s: Discrete) -> bool {
        matches!(self.successors[s].as_slice(), [only] if only.s == s && only.p == 1.)
            && self.k[[s, s]] == 0.
    }
}

impl EpisodeGenerator for PolicyEpisodes {
    fn generate(&self, n: usize, seed: Option<u64>) -> Vec<Vec<EpisodeEvent>> {
        let rng = &mut StdRng::seed_from_u64(seed.unwrap_or(self.seed));

        (0..n)
            .map(|_| {
                let mut s = self.start;
                let mut ep = vec![EpisodeEvent { s, r: 0. }];
                for _ in 0..self.horizon {
                    if self.is_sink(s) {
                        break;
                    }
                    let Some(next) = pick_next(rng, &self.successors[s]) else {
                        break;
                    };
                    ep.push(EpisodeEvent {
                        s: next,
                        r: self.k[[next, s]],
                    });
                    s = next;
                }
                ep
            })
            .collect()
    }
}
