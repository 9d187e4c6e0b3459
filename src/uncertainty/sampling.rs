//! Sample generation for uncertainty and sensitivity analysis.
//!
//! A [`Problem`] is the transient description of the varied factor space: an
//! ordered name list (parameters first, then species — both alphabetical for
//! reproducibility) with matching bounds derived from the model's declared
//! distributions. It is rebuilt fresh for every sampling run, never
//! persisted.
//!
//! Three samplers produce override sets from it:
//! - [`sample_distributions`] — plain Monte-Carlo draws from the declared
//!   distributions with rejection of physically invalid negatives;
//! - [`latin_hypercube`] — stratified coverage of the bound space;
//! - [`saltelli`] — Sobol-sequence cross-sampling sized for variance-based
//!   sensitivity analysis.
//!
//! Every sampler takes an explicit seed where randomness is involved, so a
//! fixed seed reproduces the ensemble bit for bit.

use std::collections::HashMap;

use itertools::Itertools;
use log::debug;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::model::core::Model;
use crate::uncertainty::distribution::Distribution;

use super::error::UncertaintyError;
use super::sequence;

/// Skipped prefix of the Sobol base sequence before Saltelli sampling;
/// dropping the earliest points improves the uniformity of the cross-sample
/// blocks.
pub const SALTELLI_SKIP: usize = 1000;

/// Attempts per factor before rejection sampling gives up.
const RETRY_BUDGET: usize = 10_000;

/// One set of run-time overrides: parameter values and starting species
/// values to merge onto the model's clean baseline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sample {
    pub parameters: HashMap<String, f64>,
    pub species: HashMap<String, f64>,
}

/// One varied factor with its sampling bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Factor {
    pub name: String,
    pub lower: f64,
    pub upper: f64,
}

/// Ordered factor list + bounds, parameters first, then species.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    factors: Vec<Factor>,
    n_parameters: usize,
}

impl Problem {
    /// Build the factor space from the model's declared distributions.
    ///
    /// Bounds are percent-point values of each distribution at `ppf = (low,
    /// high)`. Where the lower bound lands negative (or non-finite) for a
    /// factor not listed in `negative_allowed`, it is walked upwards in ppf
    /// steps of 0.01 until valid — keeping concentration-like factors
    /// non-negative without reshaping the upper tail.
    pub fn from_model(
        model: &Model,
        ppf: (f64, f64),
        negative_allowed: &[&str],
    ) -> Result<Self, UncertaintyError> {
        let mut factors = Vec::new();

        let parameters = sorted(model.parameter_distributions());
        let species = sorted(model.species_distributions());
        let n_parameters = parameters.len();
        for (name, distribution) in parameters.iter().chain(species.iter()) {
            factors.push(bounded_factor(name, distribution, ppf, negative_allowed)?);
        }

        Ok(Self {
            factors,
            n_parameters,
        })
    }

    pub fn factors(&self) -> &[Factor] {
        &self.factors
    }

    pub fn num_factors(&self) -> usize {
        self.factors.len()
    }

    /// Factor names in sampling order.
    pub fn names(&self) -> Vec<&str> {
        self.factors.iter().map(|f| f.name.as_str()).collect()
    }

    /// Scale a unit-cube matrix into the factor bounds.
    fn scale(&self, unit: &Array2<f64>) -> Array2<f64> {
        let mut scaled = unit.clone();
        for (j, factor) in self.factors.iter().enumerate() {
            for i in 0..scaled.nrows() {
                scaled[(i, j)] = factor.lower + unit[(i, j)] * (factor.upper - factor.lower);
            }
        }
        scaled
    }

    /// Reconstitute a flat sample matrix into per-run override sets, using
    /// the same name ordering the bounds were built with.
    pub fn parse_samples(&self, matrix: &Array2<f64>) -> Result<Vec<Sample>, UncertaintyError> {
        if matrix.ncols() != self.num_factors() {
            return Err(UncertaintyError::SampleLength {
                expected: self.num_factors(),
                found: matrix.ncols(),
            });
        }

        let samples = matrix
            .rows()
            .into_iter()
            .map(|row| {
                let mut sample = Sample::default();
                for (factor, value) in self.factors.iter().zip(row) {
                    if sample.parameters.len() < self.n_parameters {
                        sample.parameters.insert(factor.name.clone(), *value);
                    } else {
                        sample.species.insert(factor.name.clone(), *value);
                    }
                }
                sample
            })
            .collect();
        Ok(samples)
    }
}

fn sorted(distributions: &HashMap<String, Distribution>) -> Vec<(String, Distribution)> {
    distributions
        .iter()
        .map(|(name, distribution)| (name.clone(), distribution.clone()))
        .sorted_by(|a, b| a.0.cmp(&b.0))
        .collect()
}

fn bounded_factor(
    name: &str,
    distribution: &Distribution,
    ppf: (f64, f64),
    negative_allowed: &[&str],
) -> Result<Factor, UncertaintyError> {
    let allow_negative = negative_allowed.contains(&name);
    let upper = distribution.ppf(ppf.1);

    let mut lower_ppf = ppf.0;
    let mut lower = distribution.ppf(lower_ppf);
    while !(lower.is_finite() && (allow_negative || lower >= 0.0)) && lower_ppf < 1.0 {
        lower_ppf += 0.01;
        lower = distribution.ppf(lower_ppf);
    }

    if !lower.is_finite() || !upper.is_finite() || lower >= upper {
        return Err(UncertaintyError::InvalidBounds {
            name: name.to_string(),
            lower,
            upper,
        });
    }

    Ok(Factor {
        name: name.to_string(),
        lower,
        upper,
    })
}

/// Monte-Carlo samples drawn directly from the declared distributions.
///
/// A draw that lands negative for a factor not in `negative_allowed` is
/// rejected and redrawn — never clamped, which would bias the distribution's
/// shape. A factor that keeps failing past the retry budget is reported by
/// name.
pub fn sample_distributions(
    model: &Model,
    num_samples: usize,
    negative_allowed: &[&str],
    seed: u64,
) -> Result<Vec<Sample>, UncertaintyError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let parameters = sorted(model.parameter_distributions());
    let species = sorted(model.species_distributions());
    let mut samples = Vec::with_capacity(num_samples);

    for _ in 0..num_samples {
        let mut sample = Sample::default();
        for (name, distribution) in &parameters {
            sample
                .parameters
                .insert(name.clone(), draw(name, distribution, negative_allowed, &mut rng)?);
        }
        for (name, distribution) in &species {
            sample
                .species
                .insert(name.clone(), draw(name, distribution, negative_allowed, &mut rng)?);
        }
        samples.push(sample);
    }

    debug!("drew {} Monte-Carlo samples", samples.len());
    Ok(samples)
}

fn draw(
    name: &str,
    distribution: &Distribution,
    negative_allowed: &[&str],
    rng: &mut StdRng,
) -> Result<f64, UncertaintyError> {
    let allow_negative = negative_allowed.contains(&name);
    for _ in 0..RETRY_BUDGET {
        let value = distribution.sample(rng);
        if value.is_finite() && (allow_negative || value >= 0.0) {
            return Ok(value);
        }
    }
    Err(UncertaintyError::RetryBudgetExhausted {
        name: name.to_string(),
        attempts: RETRY_BUDGET,
    })
}

/// Latin-hypercube samples over the problem's bound space: each dimension is
/// split into `num_samples` strata and every stratum is hit exactly once.
pub fn latin_hypercube(problem: &Problem, num_samples: usize, seed: u64) -> Vec<Sample> {
    let mut rng = StdRng::seed_from_u64(seed);
    let d = problem.num_factors();
    let mut unit = Array2::zeros((num_samples, d));

    for j in 0..d {
        let mut strata: Vec<usize> = (0..num_samples).collect();
        strata.shuffle(&mut rng);
        for (i, stratum) in strata.iter().enumerate() {
            let offset: f64 = rng.gen();
            unit[(i, j)] = (*stratum as f64 + offset) / num_samples as f64;
        }
    }

    let scaled = problem.scale(&unit);
    problem
        .parse_samples(&scaled)
        .expect("matrix built from the problem's own factor count")
}

/// Saltelli cross-sampling over the Sobol sequence, sized for the
/// variance-based sensitivity estimators: `n * (d + 2)` runs, or
/// `n * (2d + 2)` when second-order interactions are requested.
pub fn saltelli(
    problem: &Problem,
    num_samples: usize,
    second_order: bool,
) -> Result<Vec<Sample>, UncertaintyError> {
    let d = problem.num_factors();
    let base = sequence::sample(SALTELLI_SKIP + num_samples, 2 * d).map_err(|e| match e {
        UncertaintyError::UnsupportedDimension {
            requested,
            supported,
        } => UncertaintyError::TooManyFactors {
            factors: d,
            dimensions: requested,
            supported,
        },
        other => other,
    })?;

    let rows_per_base = if second_order { 2 * d + 2 } else { d + 2 };
    let mut unit = Array2::zeros((num_samples * rows_per_base, d));
    let mut row = 0;

    for i in SALTELLI_SKIP..(SALTELLI_SKIP + num_samples) {
        let a = |j: usize| base[(i, j)];
        let b = |j: usize| base[(i, d + j)];

        for j in 0..d {
            unit[(row, j)] = a(j);
        }
        row += 1;

        // A with one column from B, per factor.
        for k in 0..d {
            for j in 0..d {
                unit[(row, j)] = if j == k { b(j) } else { a(j) };
            }
            row += 1;
        }

        // B with one column from A, per factor, only for second-order
        // estimation.
        if second_order {
            for k in 0..d {
                for j in 0..d {
                    unit[(row, j)] = if j == k { a(j) } else { b(j) };
                }
                row += 1;
            }
        }

        for j in 0..d {
            unit[(row, j)] = b(j);
        }
        row += 1;
    }

    let scaled = problem.scale(&unit);
    problem.parse_samples(&scaled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::core::Model;
    use crate::reaction::spec::Reaction;

    fn model_with_two_factors() -> Model {
        let mut model = Model::new();
        model.append(Reaction::first_order("decay", "k", "A", &["A"], &[]));
        model.set_parameter_distribution("k", Distribution::uniform(0.1, 0.2).unwrap());
        model.set_species("A", 100.0);
        model.set_species_distribution("A", Distribution::normal(100.0, 10.0).unwrap());
        model.setup().unwrap();
        model
    }

    #[test]
    fn problem_orders_parameters_before_species() {
        let model = model_with_two_factors();
        let problem = Problem::from_model(&model, (0.01, 0.99), &[]).unwrap();
        assert_eq!(problem.names(), ["k", "A"]);
        assert_eq!(problem.num_factors(), 2);

        let k = &problem.factors()[0];
        assert!(k.lower >= 0.1 && k.upper <= 0.2);
        let a = &problem.factors()[1];
        assert!(a.lower < 100.0 && a.upper > 100.0 && a.lower >= 0.0);
    }

    #[test]
    fn lower_bound_walks_up_to_zero_for_concentrations() {
        let mut model = model_with_two_factors();
        // A wide normal whose 1st percentile is negative.
        model.set_species_distribution("A", Distribution::normal(5.0, 10.0).unwrap());
        model.setup().unwrap();

        let problem = Problem::from_model(&model, (0.01, 0.99), &[]).unwrap();
        let a = &problem.factors()[1];
        assert!(a.lower >= 0.0);

        // Allowing negatives keeps the untruncated percentile.
        let problem = Problem::from_model(&model, (0.01, 0.99), &["A"]).unwrap();
        assert!(problem.factors()[1].lower < 0.0);
    }

    #[test]
    fn latin_hypercube_hits_every_stratum_once() {
        let model = model_with_two_factors();
        let problem = Problem::from_model(&model, (0.0, 1.0), &[]).unwrap();
        let n = 10;
        let samples = latin_hypercube(&problem, n, 42);
        assert_eq!(samples.len(), n);

        // Factor "k" is uniform on [0.1, 0.2]: each of the 10 strata of
        // width 0.01 must contain exactly one sample.
        let mut counts = [0usize; 10];
        for sample in &samples {
            let k = sample.parameters["k"];
            let stratum = (((k - 0.1) / 0.01).floor() as usize).min(9);
            counts[stratum] += 1;
        }
        assert!(counts.iter().all(|&c| c == 1));
    }

    #[test]
    fn latin_hypercube_is_seed_deterministic() {
        let model = model_with_two_factors();
        let problem = Problem::from_model(&model, (0.01, 0.99), &[]).unwrap();
        let a = latin_hypercube(&problem, 16, 7);
        let b = latin_hypercube(&problem, 16, 7);
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.parameters, y.parameters);
            assert_eq!(x.species, y.species);
        }
    }

    #[test]
    fn saltelli_layout_has_the_documented_row_count() {
        let model = model_with_two_factors();
        let problem = Problem::from_model(&model, (0.01, 0.99), &[]).unwrap();
        let d = problem.num_factors();

        let first_order = saltelli(&problem, 8, false).unwrap();
        assert_eq!(first_order.len(), 8 * (d + 2));

        let with_second = saltelli(&problem, 8, true).unwrap();
        assert_eq!(with_second.len(), 8 * (2 * d + 2));
    }

    #[test]
    fn rejection_sampling_never_returns_negatives() {
        let mut model = model_with_two_factors();
        model.set_species_distribution("A", Distribution::normal(2.0, 5.0).unwrap());
        model.setup().unwrap();

        let samples = sample_distributions(&model, 200, &[], 3).unwrap();
        assert!(samples.iter().all(|s| s.species["A"] >= 0.0));
    }

    #[test]
    fn monte_carlo_sampling_is_seed_deterministic() {
        let model = model_with_two_factors();
        let a = sample_distributions(&model, 32, &[], 11).unwrap();
        let b = sample_distributions(&model, 32, &[], 11).unwrap();
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.parameters, y.parameters);
            assert_eq!(x.species, y.species);
        }
    }
}
