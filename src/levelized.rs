use crate::config::EvaluationConfig;
use crate::defs::*;
use crate::envs::aging_asset::{Aging, AgingEconomics, AgingScenario};
use crate::error::{EvaluationError, Result};
use crate::math::discount_factor;
use crate::mdps::solvers::policy_evaluation::evaluate;
use serde::Serialize;
use tracing::info;

/// The commissioning state every scenario starts from.
pub const START: Discrete = 0;

/// Longest interest-rate grid [`interest_rates`] builds.
pub const MAX_RATES: usize = 10_000;

/// Relative slack on the grid's last step; `(end - start) / step` picks up
/// rounding error for decimal steps such as `0.1`.
const GRID_SLACK: Continuous = 1e-9;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LevelizedCost {
    pub aging: Aging,
    pub interest_rate: Continuous,
    pub gamma: Continuous,
    pub discounted_cost: Continuous,
    pub discounted_water: Continuous,
    /// `discounted_cost / discounted_water`; infinite or NaN when no water
    /// is produced.
    pub lcow: Continuous,
    /// Sweeps used by the cost and the water evaluation.
    pub iterations: (usize, usize),
}

/// Evaluates the cost and the water model of `scenario` from zero and forms
/// their ratio at [`START`].
pub fn levelized_cost(
    aging: Aging,
    scenario: &AgingScenario,
    config: &EvaluationConfig,
) -> Result<LevelizedCost> {
    let n_s = scenario.n_s();
    let v0 = vec![0.; n_s];

    let cost = evaluate(&scenario.cost, n_s, &scenario.policy, config, &v0)?;
    let water = evaluate(&scenario.water, n_s, &scenario.policy, config, &v0)?;

    let discounted_cost = cost.values[START];
    let discounted_water = water.values[START];

    Ok(LevelizedCost {
        aging,
        interest_rate: config.interest_rate,
        gamma: cost.gamma,
        discounted_cost,
        discounted_water,
        lcow: discounted_cost / discounted_water,
        iterations: (cost.iterations, water.iterations),
    })
}

/// `start, start + step, ...` up to and including `end`, at most
/// [`MAX_RATES`] rates.
pub fn interest_rates(
    start: Continuous,
    end: Continuous,
    step: Continuous,
) -> Result<Vec<Continuous>> {
    if !step.is_finite() || step <= 0. {
        return Err(EvaluationError::InvalidParameter {
            name: "rate_step",
            value: step,
        });
    }
    if !start.is_finite() || !end.is_finite() || end < start {
        return Err(EvaluationError::InvalidParameter {
            name: "rate_end",
            value: end,
        });
    }

    let span = (end - start) / step;
    let mut n = span.round();
    if n > span * (1. + GRID_SLACK) {
        n -= 1.;
    }
    if n >= MAX_RATES as Continuous {
        return Err(EvaluationError::InvalidParameter {
            name: "rate_step",
            value: step,
        });
    }

    let n = n as usize;
    Ok((0..=n).map(|i| start + i as Continuous * step).collect())
}

/// Rebuilds the scenario for every rate and evaluates its levelized cost.
pub fn sweep_interest_rates(
    aging: Aging,
    economics: &AgingEconomics,
    config: &EvaluationConfig,
    rates: &[Continuous],
) -> Result<Vec<LevelizedCost>> {
    rates
        .iter()
        .map(|&rate| {
            let config = config.with_interest_rate(rate);
            let gamma = discount_factor(rate, config.time_step);
            let scenario = AgingScenario::new(aging, economics, gamma)?;
            let lc = levelized_cost(aging, &scenario, &config)?;
            info!(
                ?aging,
                rate,
                lcow = lc.lcow,
                "levelized cost evaluated"
            );
            Ok(lc)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assertor::*;
    use float_eq::*;

    #[test]
    fn rates_include_both_ends() {
        let rates = interest_rates(4., 12., 1.).unwrap();

        assert_that!(rates).has_length(9);
        assert_eq!(rates[0], 4.);
        assert_eq!(rates[8], 12.);
        assert_eq!(interest_rates(0.1, 0.3, 0.1).unwrap().len(), 3);
    }

    #[test]
    fn bad_rate_grid_is_rejected() {
        assert!(interest_rates(4., 12., 0.).is_err());
        assert!(interest_rates(12., 4., 1.).is_err());
    }

    #[test]
    fn rate_grid_stops_at_the_last_whole_step() {
        assert_eq!(interest_rates(4., 12., 3.).unwrap(), vec![4., 7., 10.]);
        assert_eq!(interest_rates(5., 5., 1.).unwrap(), vec![5.]);

        let rates = interest_rates(0.1, 0.7, 0.1).unwrap();
        assert_that!(rates).has_length(7);
        assert_float_eq!(rates[6], 0.7, abs <= 1e-12);
    }

    #[test]
    fn rate_grid_length_is_capped() {
        let last = (MAX_RATES - 1) as Continuous;

        assert_that!(interest_rates(0., last, 1.).unwrap()).has_length(MAX_RATES);
        assert!(interest_rates(0., last + 1., 1.).is_err());
        assert_eq!(
            interest_rates(0., 12., 1e-12),
            Err(EvaluationError::InvalidParameter {
                name: "rate_step",
                value: 1e-12
            })
        );
    }

    #[test]
    fn levelized_cost_is_ratio_at_start() {
        let e = AgingEconomics::default();
        let config = EvaluationConfig::default();
        let gamma = discount_factor(config.interest_rate, config.time_step);
        let sc = AgingScenario::new(Aging::Deterministic, &e, gamma).unwrap();

        let lc = levelized_cost(Aging::Deterministic, &sc, &config).unwrap();

        assert_eq!(lc.gamma, gamma);
        assert_float_eq!(
            lc.lcow,
            lc.discounted_cost / lc.discounted_water,
            ulps <= 0
        );
        assert!(lc.lcow > e.opex / e.water_production_rate);
    }

    #[test]
    fn levelized_cost_does_not_depend_on_units() {
        let e = AgingEconomics::default();
        let small = AgingEconomics {
            capex: e.capex * 1e-6,
            opex: e.opex * 1e-6,
            water_production_rate: e.water_production_rate * 1e-6,
            ..e.clone()
        };
        let config = EvaluationConfig::default();
        let gamma = discount_factor(config.interest_rate, config.time_step);

        let base = AgingScenario::new(Aging::Deterministic, &e, gamma).unwrap();
        let scaled = AgingScenario::new(Aging::Deterministic, &small, gamma).unwrap();
        let base = levelized_cost(Aging::Deterministic, &base, &config).unwrap();
        let scaled = levelized_cost(Aging::Deterministic, &scaled, &config).unwrap();

        assert_eq!(scaled.iterations, base.iterations);
        assert_float_eq!(scaled.lcow, base.lcow, rmax <= 1e-9);
    }

    #[test]
    fn sweep_reports_each_rate() {
        let e = AgingEconomics::default();
        let rates = [4., 8.];

        let lcs =
            sweep_interest_rates(Aging::Stochastic, &e, &EvaluationConfig::default(), &rates)
                .unwrap();

        assert_that!(lcs).has_length(2);
        assert_eq!(lcs[1].interest_rate, 8.);
        assert_eq!(lcs[0].aging, Aging::Stochastic);
    }
}
