//! Process metrics over simulation results.
//!
//! Thin reductions used when comparing cascade designs: the E-factor (mass
//! of waste per mass of product at the end of the run), its ensemble
//! mean/spread, total catalyst loading and space-time yield. Concentrations
//! are µM-like per-volume units and masses gram-like; the formulas only
//! assume the units are consistent.

use std::collections::HashMap;

use thiserror::Error;

use crate::model::core::Model;
use crate::model::result::TimeCourse;
use crate::uncertainty::ensemble::Ensemble;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricsError {
    #[error("species '{0}' not present in the results")]
    UnknownSpecies(String),
    #[error("product '{0}' has zero final mass; E-factor is undefined")]
    NoProduct(String),
    #[error("no successful runs to aggregate")]
    EmptyEnsemble,
    #[error("time course has no elapsed time")]
    EmptyTimeCourse,
}

/// Gram mass of one species at a final concentration, given its molecular
/// weight (g/mol), a reactor volume in litres, and µM concentrations.
fn grams(concentration_um: f64, mw: f64, volume_l: f64) -> f64 {
    concentration_um * volume_l / 1e6 * mw
}

/// E-factor of a finished run: grams of waste per gram of product, counting
/// every species with a declared molecular weight.
pub fn e_factor(
    course: &TimeCourse,
    molecular_weights: &HashMap<String, f64>,
    volume_l: f64,
    product: &str,
) -> Result<f64, MetricsError> {
    if !molecular_weights.contains_key(product) {
        return Err(MetricsError::UnknownSpecies(product.to_string()));
    }

    let mut g_product = 0.0;
    let mut g_waste = 0.0;
    for (species, mw) in molecular_weights {
        let last = course
            .last(species)
            .ok_or_else(|| MetricsError::UnknownSpecies(species.clone()))?;
        let g = grams(last, *mw, volume_l);
        if species == product {
            g_product = g;
        } else {
            g_waste += g;
        }
    }

    if g_product <= 0.0 {
        return Err(MetricsError::NoProduct(product.to_string()));
    }
    Ok(g_waste / g_product)
}

/// Mean and standard deviation of the E-factor over the surviving runs of an
/// ensemble.
pub fn e_factor_ensemble(
    ensemble: &Ensemble,
    molecular_weights: &HashMap<String, f64>,
    volume_l: f64,
    product: &str,
) -> Result<(f64, f64), MetricsError> {
    let names = ensemble.species_names().to_vec();
    let mut values = Vec::new();
    for (_, trajectory) in ensemble.successes() {
        let course = trajectory.to_time_course(&names);
        values.push(e_factor(&course, molecular_weights, volume_l, product)?);
    }
    if values.is_empty() {
        return Err(MetricsError::EmptyEnsemble);
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Ok((mean, variance.sqrt()))
}

/// Total gram mass of the listed catalysts at their declared loadings.
pub fn total_enzyme_mass(
    model: &Model,
    molecular_weights: &HashMap<String, f64>,
    volume_l: f64,
    enzymes: &[&str],
) -> Result<f64, MetricsError> {
    let layout = model
        .layout()
        .ok_or_else(|| MetricsError::UnknownSpecies("model not set up".to_string()))?;

    let mut total = 0.0;
    for enzyme in enzymes {
        let index = layout
            .species_index(enzyme)
            .ok_or_else(|| MetricsError::UnknownSpecies(enzyme.to_string()))?;
        let mw = molecular_weights
            .get(*enzyme)
            .ok_or_else(|| MetricsError::UnknownSpecies(enzyme.to_string()))?;
        total += grams(layout.y0()[index], *mw, volume_l);
    }
    Ok(total)
}

/// Space-time yield of the product over the run: g/L of product per time
/// unit of the grid.
pub fn space_time_yield(
    course: &TimeCourse,
    molecular_weights: &HashMap<String, f64>,
    product: &str,
) -> Result<f64, MetricsError> {
    let mw = molecular_weights
        .get(product)
        .ok_or_else(|| MetricsError::UnknownSpecies(product.to_string()))?;
    let last = course
        .last(product)
        .ok_or_else(|| MetricsError::UnknownSpecies(product.to_string()))?;
    let elapsed = course.time.last().copied().unwrap_or(0.0)
        - course.time.first().copied().unwrap_or(0.0);
    if elapsed <= 0.0 {
        return Err(MetricsError::EmptyTimeCourse);
    }
    let g_per_l = last / 1e6 * mw;
    Ok(g_per_l / elapsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    use crate::model::result::Trajectory;

    fn finished_course() -> TimeCourse {
        // 1 L reactor, run ends with 100 µM product and 20 µM leftover
        // substrate.
        let trajectory = Trajectory::new(
            vec![0.0, 120.0],
            array![[120.0, 0.0], [20.0, 100.0]],
        );
        trajectory.to_time_course(&["S".to_string(), "P".to_string()])
    }

    #[test]
    fn e_factor_counts_only_weighted_species() {
        let course = finished_course();
        let mw = HashMap::from([("S".to_string(), 150.0), ("P".to_string(), 150.0)]);
        let e = e_factor(&course, &mw, 1.0, "P").unwrap();
        // waste = 20 µmol * 150, product = 100 µmol * 150
        assert_relative_eq!(e, 20.0 / 100.0, epsilon = 1e-12);
    }

    #[test]
    fn zero_product_is_an_error_not_a_division() {
        let course = finished_course();
        let mw = HashMap::from([("S".to_string(), 150.0), ("Missing".to_string(), 1.0)]);
        assert!(matches!(
            e_factor(&course, &mw, 1.0, "Missing"),
            Err(MetricsError::UnknownSpecies(_))
        ));
    }

    #[test]
    fn space_time_yield_is_per_time_unit() {
        let course = finished_course();
        let mw = HashMap::from([("P".to_string(), 200.0)]);
        let sty = space_time_yield(&course, &mw, "P").unwrap();
        // 100 µM * 200 g/mol = 0.02 g/L over 120 time units.
        assert_relative_eq!(sty, 0.02 / 120.0, epsilon = 1e-12);
    }
}
