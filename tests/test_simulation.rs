#[cfg(test)]
mod test_simulation {
    use approx::assert_relative_eq;
    use biocascade::prelude::*;

    /// Builds the reference esterase model: a single-substrate
    /// Michaelis-Menten hydrolysis of 2800 µM ester by 10 µM enzyme with
    /// kcat = 6 /min and Km = 1500 µM, producing acid and methanol.
    fn esterase_model() -> Model {
        let mut model = Model::new();
        model.set_time(0.0, 240.0, 241);

        model.append(
            Reaction::michaelis_menten(
                "esterase",
                "esterase_kcat",
                "esterase_km",
                "Ester",
                "esterase_enz",
                &["Ester"],
                &["Acid", "Methanol"],
            )
            .with_parameter("esterase_kcat", 6.0)
            .with_parameter("esterase_km", 1500.0),
        );

        model.set_species("Ester", 2800.0);
        model.set_species("esterase_enz", 10.0);
        model
    }

    /// The constructed esterase scenario: substrate monotonically falls,
    /// products monotonically rise, and ester + acid is conserved at the
    /// starting loading for every timepoint.
    #[test]
    fn esterase_hydrolysis_conserves_mass() {
        let mut model = esterase_model();
        model.setup().unwrap();
        let course = model.run().unwrap();

        assert_eq!(course.steps(), 241);

        let ester = course.series("Ester").unwrap();
        let acid = course.series("Acid").unwrap();
        let methanol = course.series("Methanol").unwrap();

        for step in 1..course.steps() {
            assert!(
                ester[step] <= ester[step - 1] + 1e-9,
                "ester increased at step {step}"
            );
            assert!(
                acid[step] >= acid[step - 1] - 1e-9,
                "acid decreased at step {step}"
            );
            assert!(
                methanol[step] >= methanol[step - 1] - 1e-9,
                "methanol decreased at step {step}"
            );
            assert_relative_eq!(ester[step] + acid[step], 2800.0, epsilon = 1e-6);
            assert_relative_eq!(acid[step], methanol[step], epsilon = 1e-9);
        }

        // A meaningful fraction of the ester is hydrolysed over 240 minutes
        // at Vmax = 60 µM/min.
        assert!(ester[240] < 300.0, "ester barely converted: {}", ester[240]);
        // The enzyme itself is not consumed.
        let enzyme = course.series("esterase_enz").unwrap();
        assert_relative_eq!(enzyme[240], 10.0, epsilon = 1e-9);
    }

    /// A reversible uni-uni step with kcatf == kcatr and Km_a == Km_p has
    /// Keq = 1: starting from pure substrate, the trajectory must asymptote
    /// to equal substrate and product concentrations.
    #[test]
    fn reversible_uni_uni_reaches_thermodynamic_equilibrium() {
        let mut model = Model::new();
        model.set_time(0.0, 400.0, 801);

        model.append(
            Reaction::reversible_uni_uni(
                "isomerase",
                "kcatf",
                "kcatr",
                "kma",
                "kmp",
                "A",
                "P",
                "isomerase_enz",
                &["A"],
                &["P"],
            )
            .with_parameter("kcatf", 0.1)
            .with_parameter("kcatr", 0.1)
            .with_parameter("kma", 50.0)
            .with_parameter("kmp", 50.0),
        );

        model.set_species("A", 100.0);
        model.set_species("isomerase_enz", 1.0);
        model.setup().unwrap();
        let course = model.run().unwrap();

        let a = course.last("A").unwrap();
        let p = course.last("P").unwrap();
        assert_relative_eq!(a, p, epsilon = 1e-3);
        assert_relative_eq!(a, 50.0, epsilon = 1e-2);
        assert_relative_eq!(a + p, 100.0, epsilon = 1e-6);
    }

    /// A closed two-step chain A -> B -> C conserves total molar mass at
    /// every timepoint.
    #[test]
    fn closed_chain_conserves_total_mass() {
        let mut model = Model::new();
        model.set_time(0.0, 20.0, 81);

        model.append(
            Reaction::first_order("step1", "k1", "A", &["A"], &["B"]).with_parameter("k1", 0.4),
        );
        model.append(
            Reaction::first_order("step2", "k2", "B", &["B"], &["C"]).with_parameter("k2", 0.15),
        );
        model.set_species("A", 250.0);
        model.setup().unwrap();
        let course = model.run().unwrap();

        let a = course.series("A").unwrap();
        let b = course.series("B").unwrap();
        let c = course.series("C").unwrap();
        for step in 0..course.steps() {
            assert_relative_eq!(a[step] + b[step] + c[step], 250.0, epsilon = 1e-6);
        }
        // The intermediate rises then falls; the end product only rises.
        assert!(c[80] > 150.0);
        assert!(b[80] < b[40]);
    }

    /// Competitive product inhibition rewrites the apparent Km upwards, so
    /// the inhibited run must lag the uninhibited one.
    #[test]
    fn competitive_inhibition_slows_conversion() {
        let mut uninhibited = esterase_model();
        uninhibited.setup().unwrap();
        let reference = uninhibited.run().unwrap();

        let mut inhibited = Model::new();
        inhibited.set_time(0.0, 240.0, 241);
        inhibited.append(
            Reaction::michaelis_menten(
                "esterase",
                "esterase_kcat",
                "esterase_km",
                "Ester",
                "esterase_enz",
                &["Ester"],
                &["Acid", "Methanol"],
            )
            .with_parameter("esterase_kcat", 6.0)
            .with_parameter("esterase_km", 1500.0)
            .with_modifier(Modifier::CompetitiveInhibition {
                i: "Acid".into(),
                km: "esterase_km".into(),
                ki: "esterase_ki".into(),
            })
            .with_parameter("esterase_ki", 200.0),
        );
        inhibited.set_species("Ester", 2800.0);
        inhibited.set_species("esterase_enz", 10.0);
        inhibited.setup().unwrap();
        let slowed = inhibited.run().unwrap();

        let reference_ester = reference.last("Ester").unwrap();
        let inhibited_ester = slowed.last("Ester").unwrap();
        assert!(
            inhibited_ester > reference_ester + 10.0,
            "inhibition had no effect: {inhibited_ester} vs {reference_ester}"
        );
        // Mass conservation still holds under the modifier chain.
        let ester = slowed.series("Ester").unwrap();
        let acid = slowed.series("Acid").unwrap();
        for step in 0..slowed.steps() {
            assert_relative_eq!(ester[step] + acid[step], 2800.0, epsilon = 1e-6);
        }
    }

    /// A user-registered rate callback with the declared positional contract
    /// reproduces the equivalent built-in mechanism exactly.
    #[test]
    fn custom_rate_matches_builtin_first_order() {
        let mut builtin = Model::new();
        builtin.set_time(0.0, 10.0, 41);
        builtin
            .append(Reaction::first_order("decay", "k", "A", &["A"], &["B"]).with_parameter("k", 0.3));
        builtin.set_species("A", 80.0);
        builtin.setup().unwrap();
        let expected = builtin.run().unwrap();

        let mut custom = Model::new();
        custom.set_time(0.0, 10.0, 41);
        custom.append(
            Reaction::custom(
                "decay",
                CustomRate::new(1, 1, |s, p| p[0] * s[0]),
                &["A"],
                &["k"],
                &["A"],
                &["B"],
            )
            .unwrap()
            .with_parameter("k", 0.3),
        );
        custom.set_species("A", 80.0);
        custom.setup().unwrap();
        let actual = custom.run().unwrap();

        for (expected, actual) in expected
            .series("A")
            .unwrap()
            .iter()
            .zip(actual.series("A").unwrap())
        {
            assert_relative_eq!(*expected, *actual, epsilon = 1e-12);
        }
    }

    /// Chemostat exchange drives reactor species towards the feed
    /// concentrations without touching the feed species.
    #[test]
    fn flow_exchange_approaches_feed_concentration() {
        let mut model = Model::new();
        model.set_time(0.0, 50.0, 201);
        model.append(Reaction::flow(
            "feed",
            "flow_rate",
            "column_volume",
            &["S"],
            &["S_in"],
        ));
        model.set_parameter("flow_rate", 0.5);
        model.set_parameter("column_volume", 2.0);
        model.set_species("S", 0.0);
        model.set_species("S_in", 400.0);
        model.setup().unwrap();
        let course = model.run().unwrap();

        // S relaxes towards the feed with time constant cv/fr = 4.
        let s_end = course.last("S").unwrap();
        assert_relative_eq!(s_end, 400.0, epsilon = 1e-2);
        // The feed itself is not integrated away.
        assert_relative_eq!(course.last("S_in").unwrap(), 400.0, epsilon = 1e-9);
    }

    /// The model can be re-run after a reset without retaining state from
    /// the previous run.
    #[test]
    fn rerun_after_reset_is_identical() {
        let mut model = esterase_model();
        model.setup().unwrap();
        let first = model.run().unwrap();

        model.reset_to_defaults();
        let second = model.run().unwrap();

        for (a, b) in first
            .series("Ester")
            .unwrap()
            .iter()
            .zip(second.series("Ester").unwrap())
        {
            assert_eq!(a, b);
        }
    }
}
