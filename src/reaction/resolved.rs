//! Per-run resolution state for a reaction.
//!
//! A [`ResolvedReaction`] is the working copy one run (or one ensemble
//! worker) derives from a shared, immutable [`Reaction`]: the cached indices
//! of its role names into the frozen species ordering, the gathered parameter
//! values, and the modifier bindings. Keeping this state outside the reaction
//! itself means nothing mutable is ever shared between workers, and a changed
//! layout simply produces a fresh resolution instead of stale indices.

use crate::model::layout::ModelLayout;

use super::error::ReactionError;
use super::law::RateLaw;
use super::modifier::ResolvedModifier;
use super::spec::Reaction;

/// A reaction bound to one model layout.
#[derive(Debug, Clone)]
pub struct ResolvedReaction<'a> {
    spec: &'a Reaction,
    substrate_indexes: Vec<usize>,
    consumed_indexes: Vec<usize>,
    produced_indexes: Vec<usize>,
    input_indexes: Vec<usize>,
    parameter_values: Vec<f64>,
    modifiers: Vec<ResolvedModifier>,
    resolved: bool,
}

impl<'a> ResolvedReaction<'a> {
    pub fn new(spec: &'a Reaction) -> Self {
        Self {
            spec,
            substrate_indexes: Vec::new(),
            consumed_indexes: Vec::new(),
            produced_indexes: Vec::new(),
            input_indexes: Vec::new(),
            parameter_values: Vec::new(),
            modifiers: Vec::new(),
            resolved: false,
        }
    }

    pub fn spec(&self) -> &Reaction {
        self.spec
    }

    /// Populate the index and parameter caches against `layout`.
    ///
    /// Idempotent while cached: a second call against any layout is a no-op
    /// until [`reset`](Self::reset) clears the caches. Unknown names fail
    /// here, before integration begins.
    pub fn resolve(&mut self, layout: &ModelLayout) -> Result<(), ReactionError> {
        if self.resolved {
            return Ok(());
        }

        self.spec.validate()?;

        let species_index = |name: &String| {
            layout
                .species_index(name)
                .ok_or_else(|| ReactionError::UnknownSpecies {
                    reaction: self.spec.name().to_string(),
                    name: name.clone(),
                })
        };

        self.substrate_indexes = self
            .spec
            .substrate_roles()
            .iter()
            .map(species_index)
            .collect::<Result<_, _>>()?;
        self.consumed_indexes = self
            .spec
            .consumed()
            .iter()
            .map(species_index)
            .collect::<Result<_, _>>()?;
        self.produced_indexes = self
            .spec
            .produced()
            .iter()
            .map(species_index)
            .collect::<Result<_, _>>()?;
        self.input_indexes = self
            .spec
            .input_roles()
            .iter()
            .map(species_index)
            .collect::<Result<_, _>>()?;

        self.parameter_values = self
            .spec
            .parameter_names()
            .iter()
            .map(|name| {
                layout
                    .parameter(name)
                    .ok_or_else(|| ReactionError::UnknownParameter {
                        reaction: self.spec.name().to_string(),
                        name: name.clone(),
                    })
            })
            .collect::<Result<_, _>>()?;

        self.modifiers = self
            .spec
            .modifiers()
            .iter()
            .map(|modifier| {
                modifier.resolve(
                    self.spec.name(),
                    self.spec.substrate_roles(),
                    self.spec.parameter_names(),
                )
            })
            .collect::<Result<_, _>>()?;

        self.resolved = true;
        Ok(())
    }

    /// Drop all cached indices and parameter values. The next
    /// [`resolve`](Self::resolve) re-reads whatever layout it is given.
    pub fn reset(&mut self) {
        self.substrate_indexes.clear();
        self.consumed_indexes.clear();
        self.produced_indexes.clear();
        self.input_indexes.clear();
        self.parameter_values.clear();
        self.modifiers.clear();
        self.resolved = false;
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    #[cfg(test)]
    pub(crate) fn substrate_indexes(&self) -> &[usize] {
        &self.substrate_indexes
    }

    /// Add this reaction's signed contribution to the state derivative.
    ///
    /// The hot path: gather substrate values, thread the local scratch copies
    /// through the modifier chain, evaluate the rate law, and scatter
    /// `-rate`/`+rate` at each consumed/produced index (repeats accumulate).
    /// Flow reactions bypass that accounting and write per-pair exchange
    /// terms at the current-species indices.
    ///
    /// Must only be called after [`resolve`](Self::resolve) succeeded.
    pub fn contribution(&self, y: &[f64], dy: &mut [f64]) {
        debug_assert!(self.resolved, "contribution before resolve");

        if matches!(self.spec.law(), RateLaw::Flow) {
            let fr_over_cv = self.parameter_values[0] / self.parameter_values[1];
            for (&current, &input) in self.substrate_indexes.iter().zip(&self.input_indexes) {
                dy[current] += fr_over_cv * (y[input] - y[current]);
            }
            return;
        }

        let mut substrates: Vec<f64> = self
            .substrate_indexes
            .iter()
            .map(|&index| y[index])
            .collect();
        let mut parameters = self.parameter_values.clone();

        for modifier in &self.modifiers {
            modifier.apply(&mut substrates, &mut parameters);
        }

        let rate = self.spec.law().velocity(&substrates, &parameters);

        if self.spec.clamps_negative() {
            let mut local = vec![0.0; y.len()];
            for &index in &self.consumed_indexes {
                local[index] -= rate;
            }
            for &index in &self.produced_indexes {
                local[index] += rate;
            }
            for (target, value) in dy.iter_mut().zip(local) {
                *target += value.max(0.0);
            }
        } else {
            for &index in &self.consumed_indexes {
                dy[index] -= rate;
            }
            for &index in &self.produced_indexes {
                dy[index] += rate;
            }
        }
    }
}
