//! Variance-based global sensitivity analysis.
//!
//! Sobol' first-order and total-order indices (plus second-order interaction
//! terms on request) of a scalar model output against the factors of a
//! Saltelli-sampled [`Problem`], with bootstrap confidence intervals. The
//! estimators are the standard Saltelli (2010) forms:
//!
//! - `S1_j = mean(B * (AB_j - A)) / Var(A ∪ B)`
//! - `ST_j = mean((A - AB_j)^2) / (2 * Var(A ∪ B))`
//! - `S2_jk = mean(BA_j * AB_k - A * B) / Var(A ∪ B) - S1_j - S1_k`
//!
//! where `A`/`B` are the outputs of the two base sample blocks and `AB_j`
//! (`BA_j`) the outputs of the cross blocks. Total-order indices are never
//! less than first-order ones up to estimator noise, which the accompanying
//! confidence intervals quantify.

use itertools::izip;
use log::warn;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use super::error::UncertaintyError;
use super::sampling::Problem;

/// First- and total-order indices for one factor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorSensitivity {
    pub name: String,
    pub s1: f64,
    pub s1_conf: f64,
    pub st: f64,
    pub st_conf: f64,
}

/// Second-order interaction index for a factor pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecondOrderIndex {
    pub pair: (String, String),
    pub s2: f64,
    pub s2_conf: f64,
}

/// The per-factor result table of one Sobol analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SobolIndices {
    pub factors: Vec<FactorSensitivity>,
    pub second_order: Option<Vec<SecondOrderIndex>>,
}

/// Decompose the variance of `outputs` over the problem's factors.
///
/// `outputs` must hold one scalar per Saltelli sample, in sample order
/// (`n * (d + 2)` values, or `n * (2d + 2)` when the samples were generated
/// with `second_order`). Non-finite outputs (failed ensemble members) are
/// replaced by the mean of the finite ones so the cross-sample layout stays
/// aligned. Confidence intervals are bootstrap estimates at `conf_level`
/// over `n_resamples` resamples of the base-sample axis.
pub fn sobol_indices(
    problem: &Problem,
    outputs: &[f64],
    second_order: bool,
    conf_level: f64,
    n_resamples: usize,
    seed: u64,
) -> Result<SobolIndices, UncertaintyError> {
    let d = problem.num_factors();
    let rows_per_base = if second_order { 2 * d + 2 } else { d + 2 };
    if outputs.is_empty() || outputs.len() % rows_per_base != 0 {
        return Err(UncertaintyError::OutputLength {
            expected: rows_per_base,
            found: outputs.len(),
            factors: d,
        });
    }
    let n = outputs.len() / rows_per_base;

    let y = standardise(outputs);

    // Split into the A / AB_j / (BA_j) / B blocks of the Saltelli layout.
    let mut a = vec![0.0; n];
    let mut b = vec![0.0; n];
    let mut ab = vec![vec![0.0; n]; d];
    let mut ba = vec![vec![0.0; n]; if second_order { d } else { 0 }];
    for i in 0..n {
        let row = i * rows_per_base;
        a[i] = y[row];
        for j in 0..d {
            ab[j][i] = y[row + 1 + j];
        }
        if second_order {
            for j in 0..d {
                ba[j][i] = y[row + 1 + d + j];
            }
        }
        b[i] = y[row + rows_per_base - 1];
    }

    let v = pooled_variance(&a, &b);
    let z = Normal::new(0.0, 1.0)
        .expect("unit normal is valid")
        .inverse_cdf(0.5 + conf_level / 2.0);
    let mut rng = StdRng::seed_from_u64(seed);

    let mut factors = Vec::with_capacity(d);
    for (j, name) in problem.names().iter().enumerate() {
        let s1 = first_order(&a, &ab[j], &b, v);
        let st = total_order(&a, &ab[j], v);

        let mut s1_estimates = Vec::with_capacity(n_resamples);
        let mut st_estimates = Vec::with_capacity(n_resamples);
        for _ in 0..n_resamples {
            let draw: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
            let (ra, rab, rb) = resample(&a, &ab[j], &b, &draw);
            let rv = pooled_variance(&ra, &rb);
            s1_estimates.push(first_order(&ra, &rab, &rb, rv));
            st_estimates.push(total_order(&ra, &rab, rv));
        }

        factors.push(FactorSensitivity {
            name: name.to_string(),
            s1,
            s1_conf: z * sample_std(&s1_estimates),
            st,
            st_conf: z * sample_std(&st_estimates),
        });
    }

    let second = if second_order {
        let names = problem.names();
        let mut indices = Vec::new();
        for j in 0..d {
            for k in (j + 1)..d {
                let s2 = second_order_index(
                    &a,
                    &b,
                    &ba[j],
                    &ab[k],
                    v,
                    factors[j].s1,
                    factors[k].s1,
                );
                let mut estimates = Vec::with_capacity(n_resamples);
                for _ in 0..n_resamples {
                    let draw: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                    let ra: Vec<f64> = draw.iter().map(|&i| a[i]).collect();
                    let rb: Vec<f64> = draw.iter().map(|&i| b[i]).collect();
                    let rba: Vec<f64> = draw.iter().map(|&i| ba[j][i]).collect();
                    let rabj: Vec<f64> = draw.iter().map(|&i| ab[j][i]).collect();
                    let rabk: Vec<f64> = draw.iter().map(|&i| ab[k][i]).collect();
                    let rv = pooled_variance(&ra, &rb);
                    let rs1j = first_order(&ra, &rabj, &rb, rv);
                    let rs1k = first_order(&ra, &rabk, &rb, rv);
                    estimates.push(second_order_index(&ra, &rb, &rba, &rabk, rv, rs1j, rs1k));
                }
                indices.push(SecondOrderIndex {
                    pair: (names[j].to_string(), names[k].to_string()),
                    s2,
                    s2_conf: z * sample_std(&estimates),
                });
            }
        }
        Some(indices)
    } else {
        None
    };

    Ok(SobolIndices {
        factors,
        second_order: second,
    })
}

/// Centre and scale the outputs; non-finite entries (failed samples) are
/// substituted with the finite mean to preserve the layout alignment.
fn standardise(outputs: &[f64]) -> Vec<f64> {
    let finite: Vec<f64> = outputs.iter().copied().filter(|v| v.is_finite()).collect();
    let substituted = outputs.len() - finite.len();
    if substituted > 0 {
        warn!("{substituted} non-finite outputs substituted with the ensemble mean");
    }
    let mean = finite.iter().sum::<f64>() / finite.len().max(1) as f64;

    let filled: Vec<f64> = outputs
        .iter()
        .map(|v| if v.is_finite() { *v } else { mean })
        .collect();
    let variance =
        filled.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / filled.len() as f64;
    let std = variance.sqrt();
    if std == 0.0 {
        return filled.iter().map(|v| v - mean).collect();
    }
    filled.iter().map(|v| (v - mean) / std).collect()
}

fn pooled_variance(a: &[f64], b: &[f64]) -> f64 {
    let n = (a.len() + b.len()) as f64;
    let mean = (a.iter().sum::<f64>() + b.iter().sum::<f64>()) / n;
    (a.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
        + b.iter().map(|v| (v - mean).powi(2)).sum::<f64>())
        / n
}

fn first_order(a: &[f64], ab: &[f64], b: &[f64], v: f64) -> f64 {
    let n = a.len() as f64;
    let estimate = izip!(a, ab, b).map(|(a, ab, b)| b * (ab - a)).sum::<f64>() / n;
    estimate / v
}

fn total_order(a: &[f64], ab: &[f64], v: f64) -> f64 {
    let n = a.len() as f64;
    let estimate = izip!(a, ab).map(|(a, ab)| (a - ab).powi(2)).sum::<f64>() / (2.0 * n);
    estimate / v
}

#[allow(clippy::too_many_arguments)]
fn second_order_index(
    a: &[f64],
    b: &[f64],
    ba_j: &[f64],
    ab_k: &[f64],
    v: f64,
    s1_j: f64,
    s1_k: f64,
) -> f64 {
    let n = a.len() as f64;
    let vjk = izip!(ba_j, ab_k, a, b)
        .map(|(ba, ab, a, b)| ba * ab - a * b)
        .sum::<f64>()
        / n;
    vjk / v - s1_j - s1_k
}

fn resample(a: &[f64], ab: &[f64], b: &[f64], draw: &[usize]) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    (
        draw.iter().map(|&i| a[i]).collect(),
        draw.iter().map(|&i| ab[i]).collect(),
        draw.iter().map(|&i| b[i]).collect(),
    )
}

fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
}

impl SobolIndices {
    /// `ST >= S1` holds for every factor up to estimator noise; `slack`
    /// absorbs that noise when asserting the property.
    pub fn totals_dominate_first_order(&self, slack: f64) -> bool {
        self.factors.iter().all(|f| f.st + slack >= f.s1)
    }
}
