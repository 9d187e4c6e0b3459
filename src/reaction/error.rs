//! Error types for reaction configuration and name resolution.
//!
//! Every variant names the offending entity so that a failure in a model with
//! dozens of attached reactions points straight at the reaction and the name
//! that could not be resolved.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReactionError {
    /// A substrate role or consumed/produced species is not present in the
    /// model's frozen species ordering.
    #[error("reaction '{reaction}': unknown species '{name}'")]
    UnknownSpecies { reaction: String, name: String },

    /// A kinetic constant is not present in the model's parameter table.
    #[error("reaction '{reaction}': unknown parameter '{name}'")]
    UnknownParameter { reaction: String, name: String },

    /// The number of substrate roles or parameters does not match what the
    /// attached rate law expects positionally.
    #[error(
        "reaction '{reaction}': rate law expects {expected} {what}, got {found}"
    )]
    ArityMismatch {
        reaction: String,
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// A flow reaction must pair every exchanged species with an input
    /// species.
    #[error(
        "reaction '{reaction}': {current} exchanged species paired with {input} input species"
    )]
    UnpairedFlow {
        reaction: String,
        current: usize,
        input: usize,
    },
}
