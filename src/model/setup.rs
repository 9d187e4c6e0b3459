//! Simulation time-grid configuration.
//!
//! [`SimulationSetup`] fixes the evaluation grid of a run: start, end and the
//! number of reported timepoints. The integrator may take internal substeps,
//! but outputs are reported only on this grid. Error tolerances and internal
//! step ceilings live on the stepper passed to `Model::run_with`, which is
//! where peroxide configures them.

use derive_builder::Builder;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// The fixed evaluation grid for a model run.
///
/// # Examples
///
/// ```
/// use biocascade::model::setup::SimulationSetupBuilder;
///
/// let setup = SimulationSetupBuilder::default()
///     .t0(0.0)
///     .t1(240.0)
///     .steps(241usize)
///     .build()
///     .unwrap();
/// assert_eq!(setup.dt(), 1.0);
/// ```
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct SimulationSetup {
    /// Start time of the simulation.
    #[builder(default = "0.0")]
    pub t0: f64,
    /// End time of the simulation.
    #[builder(default = "100.0")]
    pub t1: f64,
    /// Number of reported timepoints, including both ends.
    #[builder(default = "100")]
    pub steps: usize,
}

impl SimulationSetupBuilder {
    fn validate(&self) -> Result<(), String> {
        let t0 = self.t0.unwrap_or(0.0);
        let t1 = self.t1.unwrap_or(100.0);
        let steps = self.steps.unwrap_or(100);
        if t1 <= t0 {
            return Err(format!("end time {t1} must be after start time {t0}"));
        }
        if steps < 2 {
            return Err(format!("grid needs at least 2 steps, got {steps}"));
        }
        Ok(())
    }
}

impl Default for SimulationSetup {
    fn default() -> Self {
        Self {
            t0: 0.0,
            t1: 100.0,
            steps: 100,
        }
    }
}

impl SimulationSetup {
    pub fn new(t0: f64, t1: f64, steps: usize) -> Self {
        Self { t0, t1, steps }
    }

    /// Output step size.
    pub fn dt(&self) -> f64 {
        (self.t1 - self.t0) / (self.steps as f64 - 1.0)
    }

    /// The evaluation grid as an evenly spaced array.
    pub fn grid(&self) -> Array1<f64> {
        Array1::linspace(self.t0, self.t1, self.steps)
    }
}
