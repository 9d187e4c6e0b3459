//! Error types for model configuration and simulation runs.

use thiserror::Error;

use crate::reaction::error::ReactionError;

#[derive(Error, Debug)]
pub enum SimulationError {
    /// A reaction or modifier referenced a name the model layout does not
    /// carry, or the positional contract with its rate law is broken.
    #[error(transparent)]
    Reaction(#[from] ReactionError),

    /// `run` was called before `setup` froze the model layout.
    #[error("model is not set up; call setup() before running")]
    NotSetUp,

    /// A species override named a species outside the frozen layout.
    #[error("unknown species '{0}' in overrides")]
    UnknownSpeciesOverride(String),

    /// A parameter override named a parameter outside the merged table.
    #[error("unknown parameter '{0}' in overrides")]
    UnknownParameterOverride(String),

    /// The ODE solver failed to converge within its internal step ceiling,
    /// or rejected the problem.
    #[error("integration failed: {0}")]
    Integration(String),

    /// The integrated trajectory contains a non-finite concentration.
    #[error("non-finite concentration for species '{species}' at t = {time}")]
    NonFinite { species: String, time: f64 },

    /// No trajectory is stored; `run` has not completed successfully.
    #[error("no results available; run the model first")]
    NoResults,
}
