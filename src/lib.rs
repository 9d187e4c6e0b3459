//! biocascade
//!
//! Kinetic modelling of multi-enzyme biocatalytic cascades, including:
//! - Composable rate laws for the common enzymatic mechanisms
//!   (Michaelis-Menten variants, ping-pong, ordered/random bi-substrate,
//!   ter-sequential, inhibition modifiers, mass-transfer terms)
//! - ODE integration of the assembled reaction network over a fixed time
//!   grid
//! - Monte-Carlo and Latin-hypercube uncertainty propagation from declared
//!   parameter/species distributions
//! - Variance-based (Sobol') global sensitivity analysis of process outputs
//! - Process metrics (E-factor, space-time yield) and tabular/JSON reports
//!
//! The typical lifecycle mirrors the lab workflow: describe each enzymatic
//! step as a [`Reaction`](crate::reaction::spec::Reaction), append the steps
//! to a [`Model`](crate::model::core::Model), declare starting concentrations
//! and kinetic constants (with their uncertainty), `setup()`, then `run()`
//! once — or hand the model to the uncertainty layer to run it over a
//! sampled ensemble.

#![warn(unused_imports)]

/// Commonly used types and functionality re-exported for convenience
pub mod prelude {
    pub use crate::io::*;
    pub use crate::metrics::*;

    pub use crate::reaction::law::{CustomRate, RateLaw};
    pub use crate::reaction::modifier::Modifier;
    pub use crate::reaction::spec::{Reaction, ReversibleBiBiParameters};

    pub use crate::model::core::Model;
    pub use crate::model::error::SimulationError;
    pub use crate::model::layout::ModelLayout;
    pub use crate::model::result::{TimeCourse, Trajectory};
    pub use crate::model::setup::{SimulationSetup, SimulationSetupBuilder};
    pub use crate::model::system::{CascadeSystem, StepperOutput};

    pub use crate::uncertainty::distribution::Distribution;
    pub use crate::uncertainty::ensemble::{run_ensemble, run_ensemble_parallel, Ensemble};
    pub use crate::uncertainty::error::UncertaintyError;
    pub use crate::uncertainty::outputs::{concentration_at, time_to_threshold, Direction};
    pub use crate::uncertainty::sampling::{
        latin_hypercube, saltelli, sample_distributions, Problem, Sample,
    };
    pub use crate::uncertainty::sensitivity::{sobol_indices, SobolIndices};
    pub use crate::uncertainty::summary::{quantile_bands, QuantileBand};

    pub use peroxide::fuga::{ImplicitSolver, BS23, DP45, GL4, RALS3, RALS4, RK4, RK5, RKF45, TSIT45};
}

/// Rate laws, modifiers and reaction configuration
pub mod reaction {
    /// Error types for reaction configuration and resolution
    pub mod error;
    /// Rate law mechanisms
    pub mod law;
    /// Inhibition/activation modifiers
    pub mod modifier;
    /// Per-run index resolution state
    pub mod resolved;
    /// Reaction configuration and constructors
    pub mod spec;
}

/// The cascade model and its ODE integration
pub mod model {
    pub use crate::model::core::Model;
    pub use peroxide::fuga::*;

    /// The model lifecycle
    pub mod core;
    /// Error types for simulation failures
    pub mod error;
    /// The frozen species/parameter layout
    pub mod layout;
    /// Simulation result data structures
    pub mod result;
    /// Time-grid configuration
    pub mod setup;
    /// The ODE system driven by the integrator
    pub mod system;
}

/// Uncertainty propagation and sensitivity analysis
pub mod uncertainty {
    /// Probability distributions for uncertain factors
    pub mod distribution;
    /// Ensemble execution over sampled overrides
    pub mod ensemble;
    /// Error types for sampling and aggregation
    pub mod error;
    /// Scalar output extraction
    pub mod outputs;
    /// Problem bounds and samplers
    pub mod sampling;
    /// Sobol' variance decomposition
    pub mod sensitivity;
    /// Sobol' low-discrepancy sequence
    pub mod sequence;
    /// Quantile-band summaries
    pub mod summary;
}

/// Process metrics (E-factor, catalyst loading, space-time yield)
pub mod metrics;

/// Persistence and report dumps
pub mod io;

/// Tabular projections of the report tables
#[cfg(feature = "tabular")]
pub mod tabular {
    /// DataFrame conversions
    pub mod dataframe;
}
