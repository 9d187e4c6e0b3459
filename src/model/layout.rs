//! The frozen model layout.
//!
//! [`ModelLayout`] is the value object that fixes the positional contract for
//! one run: the insertion-ordered species names, the matching name-to-index
//! map, the starting concentration vector, and the run-time parameter table.
//! It is built once by `Model::setup` and passed by reference into the
//! integration loop — never recomputed mid-run. Every reaction attached to
//! the model resolves its names against the same layout, which is the central
//! invariant of the whole engine.
//!
//! Between uncertainty samples the layout's *values* change (overrides merged
//! onto a clean baseline); the *ordering* never does. Changing the set of
//! species requires a fresh `setup`, which produces a new layout and
//! invalidates every cached index.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::error::SimulationError;

/// Insertion-ordered species table used while the model is still being
/// configured. Order of first insertion is the order that becomes positional
/// once the layout freezes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct SpeciesTable {
    names: Vec<String>,
    values: HashMap<String, f64>,
}

impl SpeciesTable {
    /// Insert or overwrite a species value. First insertion fixes the
    /// position; later writes only change the value.
    pub(crate) fn set(&mut self, name: &str, value: f64) {
        if !self.values.contains_key(name) {
            self.names.push(name.to_string());
        }
        self.values.insert(name.to_string(), value);
    }

    /// Insert only if absent, preserving an explicit declaration.
    pub(crate) fn set_default(&mut self, name: &str, value: f64) -> bool {
        if self.values.contains_key(name) {
            return false;
        }
        self.set(name, value);
        true
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub(crate) fn names(&self) -> &[String] {
        &self.names
    }

    pub(crate) fn value(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Values in insertion order.
    pub(crate) fn ordered_values(&self) -> Vec<f64> {
        self.names.iter().map(|name| self.values[name]).collect()
    }
}

/// The frozen name/value parallel arrays one run integrates against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelLayout {
    species_names: Vec<String>,
    species_index: HashMap<String, usize>,
    y0: Vec<f64>,
    parameters: HashMap<String, f64>,
}

impl ModelLayout {
    pub(crate) fn new(
        species_names: Vec<String>,
        y0: Vec<f64>,
        parameters: HashMap<String, f64>,
    ) -> Self {
        let species_index = species_names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self {
            species_names,
            species_index,
            y0,
            parameters,
        }
    }

    /// Number of state variables.
    pub fn len(&self) -> usize {
        self.species_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species_names.is_empty()
    }

    /// Species names in positional order.
    pub fn species_names(&self) -> &[String] {
        &self.species_names
    }

    /// Position of a species in the state vector.
    pub fn species_index(&self, name: &str) -> Option<usize> {
        self.species_index.get(name).copied()
    }

    /// The starting concentration vector, in positional order.
    pub fn y0(&self) -> &[f64] {
        &self.y0
    }

    /// The run-time parameter table.
    pub fn parameters(&self) -> &HashMap<String, f64> {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<f64> {
        self.parameters.get(name).copied()
    }

    /// Override a starting concentration. The species must already exist in
    /// the frozen ordering; overrides never extend the layout.
    pub(crate) fn override_species(&mut self, name: &str, value: f64) -> Result<(), SimulationError> {
        let index = self
            .species_index(name)
            .ok_or_else(|| SimulationError::UnknownSpeciesOverride(name.to_string()))?;
        self.y0[index] = value;
        Ok(())
    }

    /// Override a run-time parameter value. The parameter must already exist
    /// in the merged table.
    pub(crate) fn override_parameter(
        &mut self,
        name: &str,
        value: f64,
    ) -> Result<(), SimulationError> {
        if !self.parameters.contains_key(name) {
            return Err(SimulationError::UnknownParameterOverride(name.to_string()));
        }
        self.parameters.insert(name.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn insertion_order_is_positional_order() {
        let mut table = SpeciesTable::default();
        table.set("Ester", 2800.0);
        table.set("Acid", 0.0);
        table.set("esterase", 10.0);
        // Re-declaring a species keeps its position.
        table.set("Ester", 1000.0);

        assert_eq!(table.names(), ["Ester", "Acid", "esterase"]);
        assert_eq!(table.ordered_values(), vec![1000.0, 0.0, 10.0]);
    }

    #[test]
    fn defaults_do_not_shadow_explicit_declarations() {
        let mut table = SpeciesTable::default();
        table.set("A", 5.0);
        assert!(!table.set_default("A", 0.0));
        assert!(table.set_default("B", 0.0));
        assert_eq!(table.value("A"), Some(5.0));
    }

    #[test]
    fn overrides_never_extend_the_layout() {
        let mut layout = ModelLayout::new(
            vec!["A".into(), "B".into()],
            vec![1.0, 2.0],
            HashMap::from([("k".to_string(), 3.0)]),
        );
        layout.override_species("B", 9.0).unwrap();
        layout.override_parameter("k", 4.0).unwrap();
        assert_eq!(layout.y0(), [1.0, 9.0]);
        assert_eq!(layout.parameter("k"), Some(4.0));

        assert!(layout.override_species("C", 1.0).is_err());
        assert!(layout.override_parameter("missing", 1.0).is_err());
    }
}
