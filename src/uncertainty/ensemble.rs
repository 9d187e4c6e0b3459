//! Ensemble execution.
//!
//! Drives the model once per sample, merging each sample's overrides onto a
//! clean copy of the frozen baseline layout, and collects the trajectories
//! ordered by sample index. A sample whose integration diverges is recorded
//! as failed and excluded from aggregation — it never aborts the ensemble.
//! Configuration errors (an override naming an unknown factor) do abort,
//! since they would fail every sample identically.
//!
//! The sequential runner is the reproducible reference path; the rayon
//! runner is the opt-in parallel one. Both yield identical, index-aligned
//! results: every worker derives its own resolved-reaction state, and
//! nothing mutable is shared.

use indicatif::ProgressBar;
use log::{info, warn};
use peroxide::fuga::ODEIntegrator;
use rayon::prelude::*;

use crate::model::core::Model;
use crate::model::error::SimulationError;
use crate::model::result::Trajectory;

use super::error::UncertaintyError;
use super::sampling::Sample;

/// The collected output of one ensemble run.
#[derive(Debug)]
pub struct Ensemble {
    species_names: Vec<String>,
    /// One slot per sample, in sample order; `None` marks a failed run.
    runs: Vec<Option<Trajectory>>,
    failures: Vec<(usize, String)>,
}

impl Ensemble {
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn species_names(&self) -> &[String] {
        &self.species_names
    }

    pub fn species_index(&self, name: &str) -> Result<usize, UncertaintyError> {
        self.species_names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| UncertaintyError::UnknownSpecies(name.to_string()))
    }

    /// Trajectories in sample order; failed slots are `None`.
    pub fn runs(&self) -> &[Option<Trajectory>] {
        &self.runs
    }

    /// Successful runs with their original sample indices.
    pub fn successes(&self) -> impl Iterator<Item = (usize, &Trajectory)> {
        self.runs
            .iter()
            .enumerate()
            .filter_map(|(i, run)| run.as_ref().map(|t| (i, t)))
    }

    /// Per-sample failure reports `(sample index, message)`.
    pub fn failures(&self) -> &[(usize, String)] {
        &self.failures
    }

    /// The shared evaluation grid, from the first successful run.
    pub fn time(&self) -> Result<&[f64], UncertaintyError> {
        self.successes()
            .next()
            .map(|(_, t)| t.time())
            .ok_or(UncertaintyError::EmptyEnsemble)
    }
}

fn collect(
    species_names: Vec<String>,
    results: Vec<Result<Trajectory, SimulationError>>,
) -> Ensemble {
    let mut runs = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(trajectory) => runs.push(Some(trajectory)),
            Err(error) => {
                warn!("sample {index} failed: {error}");
                failures.push((index, error.to_string()));
                runs.push(None);
            }
        }
    }
    if !failures.is_empty() {
        info!(
            "{} of {} samples failed and are excluded from aggregation",
            failures.len(),
            runs.len()
        );
    }
    Ensemble {
        species_names,
        runs,
        failures,
    }
}

fn classify(
    result: Result<Trajectory, SimulationError>,
) -> Result<Result<Trajectory, SimulationError>, SimulationError> {
    match result {
        // A misconfigured override fails every sample the same way; abort.
        Err(
            e @ (SimulationError::NotSetUp
            | SimulationError::UnknownSpeciesOverride(_)
            | SimulationError::UnknownParameterOverride(_)
            | SimulationError::Reaction(_)),
        ) => Err(e),
        other => Ok(other),
    }
}

/// Run the model once per sample, sequentially and in order, with a progress
/// bar. Deterministic: a fixed sample list yields bit-identical trajectories
/// across invocations.
pub fn run_ensemble<S>(
    model: &Model,
    samples: &[Sample],
    stepper: S,
) -> Result<Ensemble, SimulationError>
where
    S: ODEIntegrator + Copy + Send + Sync,
{
    let layout = model.layout().ok_or(SimulationError::NotSetUp)?;
    let species_names = layout.species_names().to_vec();

    let bar = ProgressBar::new(samples.len() as u64);
    let mut results = Vec::with_capacity(samples.len());
    for sample in samples {
        let result = model.run_sampled(&sample.parameters, &sample.species, stepper);
        results.push(classify(result)?);
        bar.inc(1);
    }
    bar.finish_and_clear();

    Ok(collect(species_names, results))
}

/// Run the ensemble across rayon workers. Each worker owns an independent
/// copy of the run-time arrays and resolved-reaction caches; results are
/// collected by sample index, not completion order, so aggregation stays
/// aligned with the sample matrix.
pub fn run_ensemble_parallel<S>(
    model: &Model,
    samples: &[Sample],
    stepper: S,
) -> Result<Ensemble, SimulationError>
where
    S: ODEIntegrator + Copy + Send + Sync,
{
    let layout = model.layout().ok_or(SimulationError::NotSetUp)?;
    let species_names = layout.species_names().to_vec();

    let results = samples
        .par_iter()
        .map(|sample| classify(model.run_sampled(&sample.parameters, &sample.species, stepper)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(collect(species_names, results))
}
