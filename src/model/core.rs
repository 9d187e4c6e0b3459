//! The cascade model.
//!
//! [`Model`] owns the ordered species table, the global parameter table, the
//! list of attached reactions and the time grid, and drives the integration
//! lifecycle:
//!
//! 1. configure — append reactions, declare species/parameters and their
//!    distributions, set the time grid;
//! 2. [`setup`](Model::setup) — fill gaps, merge reaction parameter defaults
//!    and freeze the [`ModelLayout`] (this fixes the positional contract all
//!    reactions resolve against);
//! 3. [`run`](Model::run) — integrate and collect the trajectory;
//! 4. between uncertainty samples, [`reset_to_defaults`](Model::reset_to_defaults)
//!    restores the run-time arrays from the declared defaults.
//!
//! Where a species or parameter is declared only through a distribution, its
//! point default is materialised as the distribution **mean**.

use std::collections::HashMap;

use log::{debug, info};
use peroxide::fuga::{ODEIntegrator, RK5};

use crate::reaction::spec::Reaction;
use crate::uncertainty::distribution::Distribution;

use super::error::SimulationError;
use super::layout::{ModelLayout, SpeciesTable};
use super::result::{TimeCourse, Trajectory};
use super::setup::SimulationSetup;
use super::system::CascadeSystem;

/// A multi-enzyme reaction network plus everything needed to simulate it.
#[derive(Debug, Clone, Default)]
pub struct Model {
    reactions: Vec<Reaction>,
    species: SpeciesTable,
    species_distributions: HashMap<String, Distribution>,
    parameters: HashMap<String, f64>,
    parameter_distributions: HashMap<String, Distribution>,
    setup: SimulationSetup,
    layout: Option<ModelLayout>,
    trajectory: Option<Trajectory>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a reaction. Order only matters for parameter-default merge
    /// precedence (first declaration of a name wins), never numerically.
    pub fn append(&mut self, reaction: Reaction) {
        self.reactions.push(reaction);
    }

    /// Define the fixed evaluation grid.
    pub fn set_time(&mut self, start: f64, end: f64, steps: usize) {
        self.setup = SimulationSetup::new(start, end, steps);
    }

    /// Declare a starting concentration. First declaration fixes the
    /// species' position in the state vector.
    pub fn set_species(&mut self, name: &str, value: f64) {
        self.species.set(name, value);
    }

    /// Attach an uncertainty distribution to a species. A species declared
    /// only this way gets the distribution mean as its point default at
    /// setup.
    pub fn set_species_distribution(&mut self, name: &str, distribution: Distribution) {
        self.species_distributions
            .insert(name.to_string(), distribution);
    }

    /// Declare a model-level parameter value. Model-level values always win
    /// over reaction defaults.
    pub fn set_parameter(&mut self, name: &str, value: f64) {
        self.parameters.insert(name.to_string(), value);
    }

    /// Attach an uncertainty distribution to a parameter at model level.
    pub fn set_parameter_distribution(&mut self, name: &str, distribution: Distribution) {
        self.parameter_distributions
            .insert(name.to_string(), distribution);
    }

    /// Prepare the model for running:
    ///
    /// 1. species declared only via a distribution get its mean as default;
    /// 2. species referenced by a reaction but never declared are registered
    ///    at 0;
    /// 3. reaction parameter defaults and distributions are merged into the
    ///    global tables — an already-set name is never overwritten, so the
    ///    first reaction to declare a shared parameter wins;
    /// 4. parameters still without a value take their distribution mean;
    /// 5. every reaction's positional contract is validated;
    /// 6. the species ordering and run-time tables are frozen into the
    ///    [`ModelLayout`].
    pub fn setup(&mut self) -> Result<(), SimulationError> {
        for (name, distribution) in &self.species_distributions {
            if self.species.set_default(name, distribution.mean()) {
                debug!("species '{name}' defaulted to distribution mean");
            }
        }

        for reaction in &self.reactions {
            for name in reaction.referenced_species() {
                if self.species.set_default(name, 0.0) {
                    debug!("species '{name}' not declared, defaulted to 0");
                }
            }
        }

        for reaction in &self.reactions {
            for (name, value) in reaction.parameters() {
                self.parameters.entry(name.clone()).or_insert(*value);
            }
            for (name, distribution) in reaction.parameter_distributions() {
                self.parameter_distributions
                    .entry(name.clone())
                    .or_insert_with(|| distribution.clone());
            }
        }
        for (name, distribution) in &self.parameter_distributions {
            self.parameters
                .entry(name.clone())
                .or_insert_with(|| distribution.mean());
        }

        for reaction in &self.reactions {
            reaction.validate()?;
        }

        let layout = ModelLayout::new(
            self.species.names().to_vec(),
            self.species.ordered_values(),
            self.parameters.clone(),
        );
        info!(
            "model set up: {} species, {} parameters, {} reactions",
            layout.len(),
            layout.parameters().len(),
            self.reactions.len()
        );
        self.layout = Some(layout);
        Ok(())
    }

    /// Integrate with the default fixed-step RK5 stepper.
    pub fn run(&mut self) -> Result<TimeCourse, SimulationError> {
        self.run_with(RK5::default())
    }

    /// Integrate with a caller-chosen peroxide stepper (pass an implicit one
    /// for stiff systems; tolerances and internal step ceilings are
    /// configured on the stepper itself).
    ///
    /// Reactions are resolved freshly against the frozen layout for this
    /// run, so a later layout change can never reuse stale indices.
    pub fn run_with<S>(&mut self, stepper: S) -> Result<TimeCourse, SimulationError>
    where
        S: ODEIntegrator + Copy + Send + Sync,
    {
        let layout = self.layout.as_ref().ok_or(SimulationError::NotSetUp)?;
        let system = CascadeSystem::new(layout, &self.reactions)?;
        let trajectory = system.integrate(&self.setup, stepper)?;
        let course = trajectory.to_time_course(layout.species_names());
        self.trajectory = Some(trajectory);
        Ok(course)
    }

    /// Run against a cloned layout with per-sample overrides, without
    /// touching the model's own run-time state. This is the ensemble path:
    /// it takes `&self`, so workers can share one model immutably.
    pub fn run_sampled<S>(
        &self,
        parameter_overrides: &HashMap<String, f64>,
        species_overrides: &HashMap<String, f64>,
        stepper: S,
    ) -> Result<Trajectory, SimulationError>
    where
        S: ODEIntegrator + Copy + Send + Sync,
    {
        let base = self.layout.as_ref().ok_or(SimulationError::NotSetUp)?;
        let mut layout = base.clone();
        for (name, value) in parameter_overrides {
            layout.override_parameter(name, *value)?;
        }
        for (name, value) in species_overrides {
            layout.override_species(name, *value)?;
        }
        let system = CascadeSystem::new(&layout, &self.reactions)?;
        system.integrate(&self.setup, stepper)
    }

    /// Restore the run-time species/parameter arrays from the declared
    /// defaults and drop any stored trajectory. Used between uncertainty
    /// samples, not between ordinary runs.
    pub fn reset_to_defaults(&mut self) {
        if self.layout.is_some() {
            self.layout = Some(ModelLayout::new(
                self.species.names().to_vec(),
                self.species.ordered_values(),
                self.parameters.clone(),
            ));
        }
        self.trajectory = None;
    }

    /// The labeled table of the last run.
    pub fn results_as_table(&self) -> Result<TimeCourse, SimulationError> {
        let layout = self.layout.as_ref().ok_or(SimulationError::NotSetUp)?;
        let trajectory = self.trajectory.as_ref().ok_or(SimulationError::NoResults)?;
        Ok(trajectory.to_time_course(layout.species_names()))
    }

    /// The raw trajectory of the last run.
    pub fn trajectory(&self) -> Option<&Trajectory> {
        self.trajectory.as_ref()
    }

    /// The frozen layout, if `setup` has been called.
    pub fn layout(&self) -> Option<&ModelLayout> {
        self.layout.as_ref()
    }

    pub fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }

    pub fn time_grid(&self) -> &SimulationSetup {
        &self.setup
    }

    pub fn species_distributions(&self) -> &HashMap<String, Distribution> {
        &self.species_distributions
    }

    pub fn parameter_distributions(&self) -> &HashMap<String, Distribution> {
        &self.parameter_distributions
    }

    /// The declared parameter defaults (after setup: the merged table).
    pub fn parameters(&self) -> &HashMap<String, f64> {
        &self.parameters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn esterase_model() -> Model {
        let mut model = Model::new();
        model.set_time(0.0, 240.0, 241);

        let esterase = Reaction::michaelis_menten(
            "esterase",
            "esterase_kcat",
            "esterase_km",
            "Ester",
            "esterase_enz",
            &["Ester"],
            &["Acid", "Methanol"],
        )
        .with_parameter("esterase_kcat", 6.0)
        .with_parameter("esterase_km", 1500.0);

        model.append(esterase);
        model.set_species("Ester", 2800.0);
        model.set_species("esterase_enz", 10.0);
        model
    }

    #[test]
    fn setup_registers_referenced_species_at_zero() {
        let mut model = esterase_model();
        model.setup().unwrap();

        let layout = model.layout().unwrap();
        // Declared species keep their insertion order; referenced-but-
        // undeclared products are appended at 0.
        assert_eq!(
            layout.species_names(),
            ["Ester", "esterase_enz", "Acid", "Methanol"]
        );
        assert_eq!(layout.y0(), [2800.0, 10.0, 0.0, 0.0]);
    }

    #[test]
    fn first_reaction_to_declare_a_parameter_wins() {
        let mut model = Model::new();
        model.append(
            Reaction::first_order("r1", "shared_k", "A", &["A"], &["B"])
                .with_parameter("shared_k", 1.0),
        );
        model.append(
            Reaction::first_order("r2", "shared_k", "B", &["B"], &["C"])
                .with_parameter("shared_k", 99.0),
        );
        model.setup().unwrap();
        assert_eq!(model.layout().unwrap().parameter("shared_k"), Some(1.0));
    }

    #[test]
    fn model_level_values_beat_reaction_defaults() {
        let mut model = Model::new();
        model.set_parameter("k", 5.0);
        model.append(Reaction::first_order("r1", "k", "A", &["A"], &["B"]).with_parameter("k", 1.0));
        model.setup().unwrap();
        assert_eq!(model.layout().unwrap().parameter("k"), Some(5.0));
    }

    #[test]
    fn distribution_only_declarations_materialise_as_the_mean() {
        let mut model = Model::new();
        model.append(Reaction::first_order("r1", "k", "A", &["A"], &["B"]));
        model.set_parameter_distribution("k", Distribution::uniform(0.5, 1.5).unwrap());
        model.set_species_distribution("A", Distribution::normal(100.0, 5.0).unwrap());
        model.setup().unwrap();

        let layout = model.layout().unwrap();
        assert_relative_eq!(layout.parameter("k").unwrap(), 1.0, epsilon = 1e-9);
        let a = layout.species_index("A").unwrap();
        assert_relative_eq!(layout.y0()[a], 100.0, epsilon = 1e-9);
    }

    #[test]
    fn run_before_setup_is_an_error() {
        let mut model = esterase_model();
        assert!(matches!(model.run(), Err(SimulationError::NotSetUp)));
    }

    #[test]
    fn sampled_run_leaves_the_model_untouched() {
        let mut model = esterase_model();
        model.setup().unwrap();

        let overrides = HashMap::from([("esterase_kcat".to_string(), 12.0)]);
        let sampled = model
            .run_sampled(&overrides, &HashMap::new(), RK5::default())
            .unwrap();
        assert!(sampled.steps() > 0);

        // The model's own layout still carries the declared default.
        assert_eq!(
            model.layout().unwrap().parameter("esterase_kcat"),
            Some(6.0)
        );
    }

    #[test]
    fn reset_restores_declared_defaults() {
        let mut model = esterase_model();
        model.setup().unwrap();
        model.run().unwrap();
        assert!(model.trajectory().is_some());

        model.reset_to_defaults();
        assert!(model.trajectory().is_none());
        assert_eq!(model.layout().unwrap().y0()[0], 2800.0);
    }
}
