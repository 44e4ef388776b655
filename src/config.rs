use crate::defs::Continuous;
use crate::envs::aging_asset::AgingEconomics;
use crate::error::{EvaluationError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How the states of one sweep are updated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepMode {
    #[default]
    Sequential,
    /// Per-state updates spread over the rayon pool.
    Parallel,
}

/// Scalar parameters of one policy evaluation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Continuously compounded rate, in percent per unit time.
    pub interest_rate: Continuous,
    pub time_step: Continuous,
    /// Relative RMS change, in percent, below which iteration stops.
    pub tolerance: Continuous,
    pub max_iterations: usize,
    pub sweep: SweepMode,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            interest_rate: 8.,
            time_step: 1.,
            tolerance: 1e-8,
            max_iterations: 100_000,
            sweep: SweepMode::Sequential,
        }
    }
}

impl EvaluationConfig {
    pub fn with_interest_rate(&self, interest_rate: Continuous) -> Self {
        Self {
            interest_rate,
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.interest_rate.is_finite() || self.interest_rate < 0. {
            return Err(EvaluationError::InvalidParameter {
                name: "interest_rate",
                value: self.interest_rate,
            });
        }
        if !self.time_step.is_finite() || self.time_step <= 0. {
            return Err(EvaluationError::InvalidParameter {
                name: "time_step",
                value: self.time_step,
            });
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0. {
            return Err(EvaluationError::InvalidParameter {
                name: "tolerance",
                value: self.tolerance,
            });
        }
        if self.max_iterations == 0 {
            return Err(EvaluationError::InvalidParameter {
                name: "max_iterations",
                value: 0.,
            });
        }

        Ok(())
    }
}

/// Contents of a JSON config file. Every section and field is optional.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub evaluation: EvaluationConfig,
    pub economics: AgingEconomics,
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| EvaluationError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .map_err(|e| EvaluationError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }
}
