use crate::defs::*;
use crate::mdps::mdp_simulator::{EpisodeEvent, EpisodeGenerator};
use std::iter::zip;

/// Monte Carlo estimate of the discounted value of every visited state.
///
/// Costs follow the evaluator's convention: the cost of the move into
/// `ep[t + 1]` is discounted by one step from `ep[t]`, so
/// `G_t = γ·(r_{t+1} + G_{t+1})`. States never visited get `0`.
/// Ref: https://youtu.be/P0ZvxeQqv0A?si=RLKdOUTNEfKXE63C
pub fn mc_first_visit(
    ep_gen: &dyn EpisodeGenerator,
    gamma: Continuous,
    n_s: usize,
    n_ep: usize,
) -> Vec<Continuous> {
    mc_core(ep_gen, gamma, n_s, n_ep, is_first_visit)
}

pub fn mc_every_visit(
    ep_gen: &dyn EpisodeGenerator,
    gamma: Continuous,
    n_s: usize,
    n_ep: usize,
) -> Vec<Continuous> {
    mc_core(ep_gen, gamma, n_s, n_ep, |_, _, _| true)
}

fn mc_core(
    ep_gen: &dyn EpisodeGenerator,
    gamma: Continuous,
    n_s: usize,
    n_ep: usize,
    counts: fn(&[EpisodeEvent], usize, Discrete) -> bool,
) -> Vec<Continuous> {
    let returns = &mut vec![0 as Continuous; n_s];
    let visits = &mut vec![0usize; n_s];

    let eps = ep_gen.generate(n_ep, None);
    for ep in eps.iter().take(n_ep) {
        let mut g = 0.;
        for t in (0..ep.len().saturating_sub(1)).rev() {
            g = gamma * (g + ep[t + 1].r);
            if counts(ep, t, ep[t].s) {
                returns[ep[t].s] += g;
                visits[ep[t].s] += 1;
            }
        }
    }

    zip(returns, visits)
        .map(|(&mut r, &mut v)| if v == 0 { 0. } else { r / (v as Continuous) })
        .collect()
}

fn is_first_visit(ep: &[EpisodeEvent], t: usize, s: Discrete) -> bool {
    !ep.iter().take(t).any(|x| x.s == s)
}
