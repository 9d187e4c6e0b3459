//! The ODE system driven by the integrator.
//!
//! [`CascadeSystem`] borrows a frozen [`ModelLayout`] and an arena of
//! reactions resolved against it, and implements peroxide's
//! [`ODEProblem`]: at every integrator step the state derivative is the sum
//! of each reaction's signed contribution vector. Resolution happens once,
//! eagerly, when the system is built — an unresolvable name fails here,
//! before integration begins.

use log::debug;
use peroxide::fuga::{BasicODESolver, ODEIntegrator, ODEProblem, ODESolver};

use crate::reaction::resolved::ResolvedReaction;
use crate::reaction::spec::Reaction;

use super::error::SimulationError;
use super::layout::ModelLayout;
use super::result::Trajectory;
use super::setup::SimulationSetup;

/// Raw stepper output rows, one state vector per reported timepoint.
pub type StepperOutput = Vec<Vec<f64>>;

/// One model run's derivative function: layout plus resolved reactions.
#[derive(Debug)]
pub struct CascadeSystem<'a> {
    layout: &'a ModelLayout,
    reactions: Vec<ResolvedReaction<'a>>,
}

impl<'a> CascadeSystem<'a> {
    /// Resolve every reaction against `layout` and assemble the derivative
    /// function. Fails fast on any unknown species/parameter name or broken
    /// positional contract.
    pub fn new(layout: &'a ModelLayout, reactions: &'a [Reaction]) -> Result<Self, SimulationError> {
        let mut resolved = Vec::with_capacity(reactions.len());
        for reaction in reactions {
            let mut r = ResolvedReaction::new(reaction);
            r.resolve(layout)?;
            resolved.push(r);
        }
        debug!(
            "resolved {} reactions against {} species",
            resolved.len(),
            layout.len()
        );
        Ok(Self {
            layout,
            reactions: resolved,
        })
    }

    /// Sum of all reaction contributions at state `y` — the model-wide
    /// derivative.
    pub fn deriv(&self, y: &[f64], dy: &mut [f64]) {
        for value in dy.iter_mut() {
            *value = 0.0;
        }
        for reaction in &self.reactions {
            reaction.contribution(y, dy);
        }
    }

    /// Integrate over the fixed grid and collect the trajectory.
    ///
    /// Solver failure (including the stepper's internal step ceiling) is
    /// surfaced as [`SimulationError::Integration`]; a non-finite state in
    /// the output is reported with the offending species and time rather
    /// than returned silently.
    pub fn integrate<S>(
        &self,
        setup: &SimulationSetup,
        stepper: S,
    ) -> Result<Trajectory, SimulationError>
    where
        S: ODEIntegrator + Copy + Send + Sync,
    {
        let solver = BasicODESolver::new(stepper);
        let (t_out, y_out) = solver
            .solve(self, (setup.t0, setup.t1), setup.dt(), self.layout.y0())
            .map_err(|e| SimulationError::Integration(e.to_string()))?;

        self.check_finite(&t_out, &y_out)?;

        let n_species = self.layout.len();
        let mut matrix = ndarray::Array2::zeros((y_out.len(), n_species));
        for (i, row) in y_out.iter().enumerate() {
            for j in 0..n_species {
                matrix[(i, j)] = row[j];
            }
        }

        Ok(Trajectory::new(t_out, matrix))
    }

    fn check_finite(&self, t_out: &[f64], y_out: &StepperOutput) -> Result<(), SimulationError> {
        for (t, row) in t_out.iter().zip(y_out) {
            for (j, value) in row.iter().enumerate() {
                if !value.is_finite() {
                    return Err(SimulationError::NonFinite {
                        species: self.layout.species_names()[j].clone(),
                        time: *t,
                    });
                }
            }
        }
        Ok(())
    }
}

impl ODEProblem for CascadeSystem<'_> {
    fn rhs(&self, _t: f64, y: &[f64], dy: &mut [f64]) -> Result<(), anyhow::Error> {
        self.deriv(y, dy);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use approx::assert_relative_eq;
    use peroxide::fuga::RK5;

    use super::*;
    use crate::reaction::spec::Reaction;

    fn two_step_layout() -> ModelLayout {
        ModelLayout::new(
            vec!["A".into(), "B".into(), "C".into()],
            vec![100.0, 0.0, 0.0],
            HashMap::from([("k1".to_string(), 0.2), ("k2".to_string(), 0.1)]),
        )
    }

    fn two_step_chain() -> Vec<Reaction> {
        vec![
            Reaction::first_order("step1", "k1", "A", &["A"], &["B"]),
            Reaction::first_order("step2", "k2", "B", &["B"], &["C"]),
        ]
    }

    #[test]
    fn deriv_equals_sum_of_reaction_contributions() {
        let layout = two_step_layout();
        let reactions = two_step_chain();
        let system = CascadeSystem::new(&layout, &reactions).unwrap();

        let y = [100.0, 50.0, 0.0];
        let mut dy = [0.0; 3];
        system.deriv(&y, &mut dy);

        assert_relative_eq!(dy[0], -0.2 * 100.0, epsilon = 1e-12);
        assert_relative_eq!(dy[1], 0.2 * 100.0 - 0.1 * 50.0, epsilon = 1e-12);
        assert_relative_eq!(dy[2], 0.1 * 50.0, epsilon = 1e-12);
        // A closed chain conserves total mass at the derivative level.
        assert_relative_eq!(dy.iter().sum::<f64>(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn integration_reports_on_the_fixed_grid() {
        let layout = two_step_layout();
        let reactions = two_step_chain();
        let system = CascadeSystem::new(&layout, &reactions).unwrap();

        // dt = 0.25 accumulates exactly in binary, so the reported grid is
        // exact.
        let setup = SimulationSetup::new(0.0, 10.0, 41);
        let trajectory = system.integrate(&setup, RK5::default()).unwrap();

        assert_eq!(trajectory.steps(), 41);
        assert_relative_eq!(trajectory.time()[0], 0.0, epsilon = 1e-9);
        assert_relative_eq!(trajectory.time()[40], 10.0, epsilon = 1e-9);
        // First-order decay of A has the analytic solution A0 * exp(-k1 t).
        let a_end = trajectory.series(0)[40];
        assert_relative_eq!(a_end, 100.0 * (-0.2f64 * 10.0).exp(), epsilon = 1e-3);
    }

    #[test]
    fn unknown_name_fails_before_integration() {
        let layout = two_step_layout();
        let reactions = vec![Reaction::first_order("bad", "k_missing", "A", &["A"], &["B"])];
        assert!(CascadeSystem::new(&layout, &reactions).is_err());
    }
}
