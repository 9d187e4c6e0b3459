//! Scalar output extraction from an ensemble.
//!
//! Sensitivity analysis reduces each sample's trajectory to one scalar.
//! Two reductions cover the usual process questions: the concentration of a
//! species at a fixed timepoint, and the time taken to cross a threshold
//! concentration. Both return one value per sample, aligned with the sample
//! matrix; failed samples yield `NaN` so alignment is never broken.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::ensemble::Ensemble;
use super::error::UncertaintyError;

/// Crossing direction for [`time_to_threshold`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// First time the species reaches at least the threshold.
    Above,
    /// First time the species falls to or below the threshold.
    Below,
}

/// Concentration of `species` at the grid point closest to `timepoint`, per
/// sample.
pub fn concentration_at(
    ensemble: &Ensemble,
    timepoint: f64,
    species: &str,
) -> Result<Array1<f64>, UncertaintyError> {
    let index = ensemble.species_index(species)?;
    let time = ensemble.time()?;
    let step = closest_step(time, timepoint);

    Ok(ensemble
        .runs()
        .iter()
        .map(|run| match run {
            Some(trajectory) => trajectory.series(index)[step],
            None => f64::NAN,
        })
        .collect())
}

/// Time for `species` to first cross `threshold`, per sample. A trajectory
/// that never crosses maps to the final simulated time rather than an error.
pub fn time_to_threshold(
    ensemble: &Ensemble,
    threshold: f64,
    species: &str,
    direction: Direction,
) -> Result<Array1<f64>, UncertaintyError> {
    let index = ensemble.species_index(species)?;
    // Probe the grid once so an empty ensemble is reported up front.
    let _ = ensemble.time()?;

    Ok(ensemble
        .runs()
        .iter()
        .map(|run| match run {
            Some(trajectory) => {
                let series = trajectory.series(index);
                let crossed = series.iter().position(|&value| match direction {
                    Direction::Above => value >= threshold,
                    Direction::Below => value <= threshold,
                });
                match crossed {
                    Some(step) => trajectory.time()[step],
                    None => *trajectory.time().last().expect("non-empty trajectory"),
                }
            }
            None => f64::NAN,
        })
        .collect())
}

fn closest_step(time: &[f64], timepoint: f64) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (step, t) in time.iter().enumerate() {
        let distance = (t - timepoint).abs();
        if distance < best_distance {
            best_distance = distance;
            best = step;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closest_step_snaps_to_the_grid() {
        let time = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(closest_step(&time, -5.0), 0);
        assert_eq!(closest_step(&time, 1.4), 1);
        assert_eq!(closest_step(&time, 1.6), 2);
        assert_eq!(closest_step(&time, 99.0), 3);
    }
}
