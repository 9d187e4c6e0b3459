//! Simulation results.
//!
//! Two views of the same data: [`Trajectory`] is the raw positional matrix
//! the integrator produces (`[timepoint][species index]`, indices fixed by
//! the model layout), and [`TimeCourse`] is the labeled, time-indexed table
//! handed to aggregation, reporting and plotting collaborators.

use std::collections::HashMap;

use ndarray::{Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

/// Raw integrator output for one run.
#[derive(Debug, Clone)]
pub struct Trajectory {
    time: Vec<f64>,
    y: Array2<f64>,
}

impl Trajectory {
    pub fn new(time: Vec<f64>, y: Array2<f64>) -> Self {
        debug_assert_eq!(time.len(), y.nrows());
        Self { time, y }
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// The `[timepoint][species index]` concentration matrix.
    pub fn matrix(&self) -> &Array2<f64> {
        &self.y
    }

    pub fn steps(&self) -> usize {
        self.time.len()
    }

    /// One species' concentration series by positional index.
    pub fn series(&self, species_index: usize) -> ArrayView1<'_, f64> {
        self.y.index_axis(Axis(1), species_index)
    }

    /// Label the matrix with the layout's species names.
    pub fn to_time_course(&self, species_names: &[String]) -> TimeCourse {
        let species = species_names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), self.series(i).to_vec()))
            .collect();
        TimeCourse {
            time: self.time.clone(),
            names: species_names.to_vec(),
            species,
        }
    }
}

/// A labeled, time-indexed concentration table.
///
/// `names` preserves the model's positional ordering so that reports are
/// reproducible; `species` maps each name to its series over the grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeCourse {
    pub time: Vec<f64>,
    pub names: Vec<String>,
    pub species: HashMap<String, Vec<f64>>,
}

impl TimeCourse {
    /// The concentration series for one species.
    pub fn series(&self, species: &str) -> Option<&[f64]> {
        self.species.get(species).map(|v| v.as_slice())
    }

    /// The final concentration of one species.
    pub fn last(&self, species: &str) -> Option<f64> {
        self.series(species).and_then(|s| s.last().copied())
    }

    pub fn steps(&self) -> usize {
        self.time.len()
    }
}
