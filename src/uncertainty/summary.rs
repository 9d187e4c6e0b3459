//! Quantile-band reduction of an ensemble.

use itertools::izip;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use super::ensemble::Ensemble;
use super::error::UncertaintyError;

/// Per-timepoint percentile band and mean for one species across an
/// ensemble.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuantileBand {
    pub species: String,
    pub time: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub mean: Vec<f64>,
}

/// Reduce the ensemble to a `{time, high, low, mean}` band for `species`.
///
/// `q` is the upper percentile; the band spans the `q` and `100 - q`
/// percentiles (the default of 95 gives a 5th-95th band). Failed samples are
/// excluded; an ensemble with no surviving runs is an error.
pub fn quantile_bands(
    ensemble: &Ensemble,
    species: &str,
    q: f64,
) -> Result<QuantileBand, UncertaintyError> {
    let index = ensemble.species_index(species)?;
    let time = ensemble.time()?.to_vec();

    let mut high = Vec::with_capacity(time.len());
    let mut low = Vec::with_capacity(time.len());
    let mut mean = Vec::with_capacity(time.len());

    for step in 0..time.len() {
        let mut values: Vec<f64> = ensemble
            .successes()
            .map(|(_, trajectory)| trajectory.series(index)[step])
            .collect();
        if values.is_empty() {
            return Err(UncertaintyError::EmptyEnsemble);
        }
        values.sort_by_key(|v| OrderedFloat(*v));

        high.push(percentile_sorted(&values, q));
        low.push(percentile_sorted(&values, 100.0 - q));
        mean.push(values.iter().sum::<f64>() / values.len() as f64);
    }

    Ok(QuantileBand {
        species: species.to_string(),
        time,
        high,
        low,
        mean,
    })
}

/// Linear-interpolated percentile of an ascending-sorted slice.
fn percentile_sorted(sorted: &[f64], q: f64) -> f64 {
    let rank = (q / 100.0) * (sorted.len() as f64 - 1.0);
    let below = rank.floor() as usize;
    let above = rank.ceil() as usize;
    if below == above {
        return sorted[below];
    }
    let weight = rank - below as f64;
    sorted[below] * (1.0 - weight) + sorted[above] * weight
}

impl QuantileBand {
    /// Sanity property of any band: `low <= mean <= high` pointwise (up to
    /// floating error for strongly skewed ensembles).
    pub fn is_ordered(&self) -> bool {
        izip!(&self.low, &self.mean, &self.high).all(|(l, m, h)| l <= m && m <= h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn percentiles_interpolate_linearly() {
        let sorted = [0.0, 1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(percentile_sorted(&sorted, 0.0), 0.0);
        assert_relative_eq!(percentile_sorted(&sorted, 100.0), 4.0);
        assert_relative_eq!(percentile_sorted(&sorted, 50.0), 2.0);
        assert_relative_eq!(percentile_sorted(&sorted, 62.5), 2.5);
    }
}
