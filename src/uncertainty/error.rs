//! Error types for sampling and sensitivity analysis.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum UncertaintyError {
    /// A factor's sampling bounds collapsed or inverted.
    #[error("invalid bounds for '{name}': lower {lower} >= upper {upper}")]
    InvalidBounds {
        name: String,
        lower: f64,
        upper: f64,
    },

    /// A distribution kept yielding physically invalid samples past the
    /// retry budget. The sample is never clamped; clamping would bias the
    /// sampled distribution's shape.
    #[error(
        "distribution for '{name}' produced {attempts} invalid samples in a row; \
         adjust its bounds or allow negatives for this factor"
    )]
    RetryBudgetExhausted { name: String, attempts: usize },

    /// The Saltelli cross-sampler needs a Sobol sequence of dimension
    /// `2 * factors`, which exceeds the bundled direction-number table.
    #[error("{factors} factors need a {dimensions}-dimensional Sobol sequence; only {supported} dimensions are supported")]
    TooManyFactors {
        factors: usize,
        dimensions: usize,
        supported: usize,
    },

    /// A Sobol sequence of more dimensions than the bundled direction-number
    /// table supports was requested.
    #[error("Sobol sequence supports up to {supported} dimensions, requested {requested}")]
    UnsupportedDimension { requested: usize, supported: usize },

    /// A flat sample vector does not match the problem's factor count.
    #[error("sample of length {found} does not match problem with {expected} factors")]
    SampleLength { expected: usize, found: usize },

    /// The output vector handed to the Sobol analysis does not match the
    /// Saltelli sample layout.
    #[error(
        "output vector of length {found} does not match the Saltelli layout ({expected} rows per base sample for {factors} factors)"
    )]
    OutputLength {
        expected: usize,
        found: usize,
        factors: usize,
    },

    /// Every sample in the ensemble failed; there is nothing to aggregate.
    #[error("ensemble contains no successful runs")]
    EmptyEnsemble,

    /// A species name requested from an aggregation is not in the layout.
    #[error("unknown species '{0}' in ensemble aggregation")]
    UnknownSpecies(String),

    /// The model must be set up (layout frozen) before building a sampling
    /// problem or running an ensemble.
    #[error("model is not set up; call setup() before sampling")]
    ModelNotSetUp,
}
