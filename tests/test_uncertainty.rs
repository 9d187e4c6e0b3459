#[cfg(test)]
mod test_uncertainty {
    use approx::assert_relative_eq;
    use biocascade::prelude::*;

    /// A first-order decay with uncertain rate constant and starting
    /// concentration — small enough to run hundreds of times, rich enough
    /// that both factors drive the output.
    fn uncertain_decay_model() -> Model {
        let mut model = Model::new();
        model.set_time(0.0, 10.0, 41);
        model.append(
            Reaction::first_order("decay", "k", "A", &["A"], &["B"]).with_parameter("k", 0.2),
        );
        model.set_species("A", 100.0);
        model.set_parameter_distribution("k", Distribution::uniform(0.1, 0.3).unwrap());
        model.set_species_distribution("A", Distribution::normal(100.0, 10.0).unwrap());
        model.setup().unwrap();
        model
    }

    /// Running the same seeded sample set twice yields bit-identical
    /// trajectories.
    #[test]
    fn seeded_ensemble_is_bit_reproducible() {
        let model = uncertain_decay_model();

        let samples_a = sample_distributions(&model, 24, &[], 42).unwrap();
        let samples_b = sample_distributions(&model, 24, &[], 42).unwrap();

        let ensemble_a = run_ensemble(&model, &samples_a, RK5::default()).unwrap();
        let ensemble_b = run_ensemble(&model, &samples_b, RK5::default()).unwrap();

        assert_eq!(ensemble_a.len(), ensemble_b.len());
        for (a, b) in ensemble_a.runs().iter().zip(ensemble_b.runs()) {
            let (a, b) = (a.as_ref().unwrap(), b.as_ref().unwrap());
            assert_eq!(a.matrix(), b.matrix());
        }
    }

    /// The parallel runner must agree with the sequential reference path
    /// sample for sample.
    #[test]
    fn parallel_ensemble_matches_sequential() {
        let model = uncertain_decay_model();
        let samples = sample_distributions(&model, 16, &[], 7).unwrap();

        let sequential = run_ensemble(&model, &samples, RK5::default()).unwrap();
        let parallel = run_ensemble_parallel(&model, &samples, RK5::default()).unwrap();

        for (a, b) in sequential.runs().iter().zip(parallel.runs()) {
            assert_eq!(a.as_ref().unwrap().matrix(), b.as_ref().unwrap().matrix());
        }
    }

    /// Quantile bands are ordered `low <= mean <= high` for every timepoint
    /// and species.
    #[test]
    fn quantile_bands_are_ordered() {
        let model = uncertain_decay_model();
        let samples = sample_distributions(&model, 200, &[], 3).unwrap();
        let ensemble = run_ensemble(&model, &samples, RK5::default()).unwrap();

        for species in ["A", "B"] {
            let band = quantile_bands(&ensemble, species, 95.0).unwrap();
            assert!(band.is_ordered(), "unordered band for {species}");
            assert_eq!(band.time.len(), 41);
        }

        // The band at t = 0 for A reflects the sampled starting spread.
        let band = quantile_bands(&ensemble, "A", 95.0).unwrap();
        assert!(band.high[0] > band.low[0]);
        assert!(band.high[0] < 150.0 && band.low[0] > 50.0);
    }

    /// Latin-hypercube overrides flow through the ensemble exactly like
    /// Monte-Carlo ones.
    #[test]
    fn latin_hypercube_ensemble_runs() {
        let model = uncertain_decay_model();
        let problem = Problem::from_model(&model, (0.01, 0.99), &[]).unwrap();
        let samples = latin_hypercube(&problem, 50, 11);
        let ensemble = run_ensemble(&model, &samples, RK5::default()).unwrap();

        assert_eq!(ensemble.len(), 50);
        assert!(ensemble.failures().is_empty());
    }

    /// Time-to-threshold maps a never-crossing trajectory to the final
    /// simulated time instead of failing.
    #[test]
    fn time_to_threshold_handles_both_cases() {
        let model = uncertain_decay_model();
        let samples = sample_distributions(&model, 32, &[], 9).unwrap();
        let ensemble = run_ensemble(&model, &samples, RK5::default()).unwrap();

        // Every decay run falls below half its starting value within 10
        // minutes at k >= 0.1 only if k*t > ln 2; at k = 0.1 it doesn't, so
        // times spread between crossings and the grid end.
        let times = time_to_threshold(&ensemble, 50.0, "A", Direction::Below).unwrap();
        for &t in times.iter() {
            assert!((0.0..=10.0).contains(&t));
        }

        // An unreachable threshold reports the final simulated time for
        // every sample.
        let never = time_to_threshold(&ensemble, -1.0, "A", Direction::Below).unwrap();
        for &t in never.iter() {
            assert_relative_eq!(t, 10.0, epsilon = 1e-9);
        }
    }

    /// Sobol analysis of the decay ensemble: the variance decomposition must
    /// satisfy `ST >= S1` for every factor, and both declared factors carry
    /// real sensitivity for the mid-run concentration.
    #[test]
    fn sobol_indices_on_the_model_ensemble() {
        let model = uncertain_decay_model();
        let problem = Problem::from_model(&model, (0.01, 0.99), &[]).unwrap();
        let samples = saltelli(&problem, 256, false).unwrap();
        let ensemble = run_ensemble(&model, &samples, RK5::default()).unwrap();
        assert!(ensemble.failures().is_empty());

        let outputs = concentration_at(&ensemble, 5.0, "A").unwrap();
        let analysis = sobol_indices(
            &problem,
            outputs.as_slice().unwrap(),
            false,
            0.95,
            100,
            13,
        )
        .unwrap();

        assert_eq!(analysis.factors.len(), 2);
        assert!(analysis.totals_dominate_first_order(0.05));
        for factor in &analysis.factors {
            assert!(
                factor.st > 0.02,
                "factor {} unexpectedly inert: ST = {}",
                factor.name,
                factor.st
            );
            assert!(factor.s1_conf >= 0.0 && factor.st_conf >= 0.0);
        }

        // The rate constant dominates the mid-run concentration: at t = 5
        // the spread from k (0.1..0.3) dwarfs the 10% spread in A0.
        let k = analysis.factors.iter().find(|f| f.name == "k").unwrap();
        let a0 = analysis.factors.iter().find(|f| f.name == "A").unwrap();
        assert!(k.st > a0.st);
    }
}
