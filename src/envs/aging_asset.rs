use crate::defs::*;
use crate::error::{EvaluationError, Result};
use crate::mdps::mdp::{TensorMdp, Transition, Transitions};
use serde::{Deserialize, Serialize};
use std::cmp::min;

/// The only control of the aging asset.
pub const OPERATE: Discrete = 0;

/// Economics of a degrading water producing asset, per unit time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgingEconomics {
    pub capex: Continuous,
    pub opex: Continuous,
    pub water_production_rate: Continuous,
    /// Number of transitions that incur operating cost and produce water.
    pub service_years: usize,
    /// Including the absorbing end-of-life state.
    pub n_states: usize,
}

impl Default for AgingEconomics {
    fn default() -> Self {
        Self {
            capex: 10.,
            opex: 0.3,
            water_production_rate: 1.,
            service_years: 29,
            n_states: 32,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aging {
    /// One state per time step.
    Deterministic,
    /// One or two states per time step with equal odds, at twice the
    /// deterministic cost and production rates.
    Stochastic,
}

impl Aging {
    fn steps(&self) -> &'static [(usize, Continuous)] {
        match self {
            Aging::Deterministic => &[(1, 1.)],
            Aging::Stochastic => &[(1, 0.5), (2, 0.5)],
        }
    }

    fn rate_multiplier(&self) -> Continuous {
        match self {
            Aging::Deterministic => 1.,
            Aging::Stochastic => 2.,
        }
    }
}

/// Cost and water models sharing one set of aging dynamics.
///
/// State `0` is commissioning. Its outgoing moves carry `capex / γ` on top
/// of the operating cost, which the evaluator discounts back to `capex` at
/// time zero. The last state is absorbing with zero cost.
#[derive(Clone, Debug, PartialEq)]
pub struct AgingScenario {
    pub cost: TensorMdp,
    pub water: TensorMdp,
    pub policy: Vec<Discrete>,
}

impl AgingScenario {
    pub fn new(aging: Aging, economics: &AgingEconomics, gamma: Continuous) -> Result<Self> {
        let n_s = economics.n_states;
        if n_s < 2 {
            return Err(EvaluationError::InvalidParameter {
                name: "n_states",
                value: n_s as Continuous,
            });
        }
        if economics.service_years > n_s - 1 {
            return Err(EvaluationError::InvalidParameter {
                name: "service_years",
                value: economics.service_years as Continuous,
            });
        }

        let terminal = n_s - 1;
        let m = aging.rate_multiplier();
        let mut cost = Transitions::new();
        let mut water = Transitions::new();
        for s in 0..terminal {
            let in_service = s < economics.service_years;
            let capital = if s == 0 { economics.capex / gamma } else { 0. };
            let opex = if in_service { m * economics.opex } else { 0. };
            let produced = if in_service {
                m * economics.water_production_rate
            } else {
                0.
            };

            for &(step, probability) in aging.steps() {
                let next_state = min(s + step, terminal);
                cost.entry((s, OPERATE)).or_default().push(Transition {
                    next_state,
                    probability,
                    cost: capital + opex,
                });
                water.entry((s, OPERATE)).or_default().push(Transition {
                    next_state,
                    probability,
                    cost: produced,
                });
            }
        }
        let end_of_life = vec![Transition {
            next_state: terminal,
            probability: 1.,
            cost: 0.,
        }];
        cost.insert((terminal, OPERATE), end_of_life.clone());
        water.insert((terminal, OPERATE), end_of_life);

        Ok(Self {
            cost: TensorMdp::from_transitions(n_s, 1, &cost)?,
            water: TensorMdp::from_transitions(n_s, 1, &water)?,
            policy: vec![OPERATE; n_s],
        })
    }

    pub fn n_s(&self) -> usize {
        self.policy.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mdps::mdp::Mdp;
    use float_eq::*;

    #[test]
    fn deterministic_chain_advances_one_state() {
        let e = AgingEconomics::default();
        let gamma = 0.9;

        let sc = AgingScenario::new(Aging::Deterministic, &e, gamma).unwrap();
        let p = sc.cost.probabilities();
        let c = sc.cost.costs();
        let w = sc.water.costs();

        assert_eq!(sc.n_s(), 32);
        assert_eq!(p[[OPERATE, 1, 0]], 1.);
        assert_eq!(p[[OPERATE, 31, 30]], 1.);
        assert_eq!(p[[OPERATE, 31, 31]], 1.);
        assert_float_eq!(c[[OPERATE, 1, 0]], 10. / 0.9 + 0.3, rmax <= 1e-15);
        assert_eq!(c[[OPERATE, 29, 28]], 0.3);
        assert_eq!(c[[OPERATE, 30, 29]], 0.);
        assert_eq!(c[[OPERATE, 31, 31]], 0.);
        assert_eq!(w[[OPERATE, 29, 28]], 1.);
        assert_eq!(w[[OPERATE, 30, 29]], 0.);
    }

    #[test]
    fn stochastic_chain_splits_and_clamps() {
        let e = AgingEconomics::default();

        let sc = AgingScenario::new(Aging::Stochastic, &e, 0.9).unwrap();
        let p = sc.cost.probabilities();

        assert_eq!(p[[OPERATE, 5, 4]], 0.5);
        assert_eq!(p[[OPERATE, 6, 4]], 0.5);
        assert_eq!(p[[OPERATE, 31, 30]], 1.);
        assert_eq!(sc.cost.costs()[[OPERATE, 6, 4]], 0.6);
        assert_eq!(sc.water.costs()[[OPERATE, 5, 4]], 2.);
        for s in 0..sc.n_s() {
            let column: Continuous = (0..sc.n_s()).map(|n| p[[OPERATE, n, s]]).sum();
            assert_float_eq!(column, 1., abs <= 1e-15);
        }
    }

    #[test]
    fn economics_are_checked() {
        let too_long = AgingEconomics {
            service_years: 32,
            ..Default::default()
        };
        let too_small = AgingEconomics {
            n_states: 1,
            service_years: 0,
            ..Default::default()
        };

        assert!(matches!(
            AgingScenario::new(Aging::Deterministic, &too_long, 0.9),
            Err(EvaluationError::InvalidParameter {
                name: "service_years",
                ..
            })
        ));
        assert!(matches!(
            AgingScenario::new(Aging::Stochastic, &too_small, 0.9),
            Err(EvaluationError::InvalidParameter { name: "n_states", .. })
        ));
    }
}
