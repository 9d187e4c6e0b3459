//! Reaction configuration.
//!
//! A [`Reaction`] is the immutable description of one enzymatic or physical
//! step: which rate law it uses, which species fill the law's substrate roles
//! (in the law's positional order), which parameters feed the law (same), and
//! which species are consumed and produced when the scalar rate is scattered
//! into the state derivative. Per-mechanism constructors pin the positional
//! contract between a reaction and its rate law, which is otherwise not
//! enforced structurally.
//!
//! Reactions carry their own parameter defaults and optional parameter
//! distributions; the model merges these into its global table at setup,
//! first declaration wins.

use std::collections::HashMap;

use super::error::ReactionError;
use super::law::{CustomRate, RateLaw};
use super::modifier::Modifier;
use crate::uncertainty::distribution::Distribution;

/// One elementary or lumped step of a cascade.
#[derive(Debug, Clone)]
pub struct Reaction {
    name: String,
    law: RateLaw,
    /// Species roles read by the law, positional. Modifier registration may
    /// append extra roles past the law's arity; the law only reads its own
    /// prefix.
    substrate_roles: Vec<String>,
    /// Parameter names read by the law, positional, same convention.
    parameter_names: Vec<String>,
    consumed: Vec<String>,
    produced: Vec<String>,
    /// Flow only: input species paired index-by-index with
    /// `substrate_roles`.
    input_roles: Vec<String>,
    parameters: HashMap<String, f64>,
    parameter_distributions: HashMap<String, Distribution>,
    modifiers: Vec<Modifier>,
    clamp_negative: bool,
}

impl Reaction {
    fn build(
        name: &str,
        law: RateLaw,
        substrate_roles: &[&str],
        parameter_names: &[&str],
        consumed: &[&str],
        produced: &[&str],
    ) -> Self {
        Self {
            name: name.to_string(),
            law,
            substrate_roles: substrate_roles.iter().map(|s| s.to_string()).collect(),
            parameter_names: parameter_names.iter().map(|s| s.to_string()).collect(),
            consumed: consumed.iter().map(|s| s.to_string()).collect(),
            produced: produced.iter().map(|s| s.to_string()).collect(),
            input_roles: Vec::new(),
            parameters: HashMap::new(),
            parameter_distributions: HashMap::new(),
            modifiers: Vec::new(),
            clamp_negative: false,
        }
    }

    /// Irreversible single-substrate Michaelis-Menten.
    pub fn michaelis_menten(
        name: &str,
        kcat: &str,
        km: &str,
        a: &str,
        enz: &str,
        consumed: &[&str],
        produced: &[&str],
    ) -> Self {
        Self::build(
            name,
            RateLaw::MichaelisMenten,
            &[a, enz],
            &[kcat, km],
            consumed,
            produced,
        )
    }

    /// Irreversible bi-substrate Michaelis-Menten with independent binding
    /// sites.
    #[allow(clippy::too_many_arguments)]
    pub fn independent_bi(
        name: &str,
        kcat: &str,
        kma: &str,
        kmb: &str,
        a: &str,
        b: &str,
        enz: &str,
        consumed: &[&str],
        produced: &[&str],
    ) -> Self {
        Self::build(
            name,
            RateLaw::IndependentBi,
            &[a, b, enz],
            &[kcat, kma, kmb],
            consumed,
            produced,
        )
    }

    /// Ternary-complex ordered bi-substrate mechanism.
    #[allow(clippy::too_many_arguments)]
    pub fn ordered_bi(
        name: &str,
        kcat: &str,
        kma: &str,
        kmb: &str,
        kia: &str,
        a: &str,
        b: &str,
        enz: &str,
        consumed: &[&str],
        produced: &[&str],
    ) -> Self {
        Self::build(
            name,
            RateLaw::OrderedBi,
            &[a, b, enz],
            &[kcat, kma, kmb, kia],
            consumed,
            produced,
        )
    }

    /// Ping-pong bi-substrate mechanism.
    #[allow(clippy::too_many_arguments)]
    pub fn ping_pong(
        name: &str,
        kcat: &str,
        kma: &str,
        kmb: &str,
        a: &str,
        b: &str,
        enz: &str,
        consumed: &[&str],
        produced: &[&str],
    ) -> Self {
        Self::build(
            name,
            RateLaw::PingPongBi,
            &[a, b, enz],
            &[kcat, kma, kmb],
            consumed,
            produced,
        )
    }

    /// Ter-ordered sequential mechanism (CAR type).
    #[allow(clippy::too_many_arguments)]
    pub fn ter_ordered(
        name: &str,
        kcat: &str,
        kma: &str,
        kmb: &str,
        kmc: &str,
        kia: &str,
        a: &str,
        b: &str,
        c: &str,
        enz: &str,
        consumed: &[&str],
        produced: &[&str],
    ) -> Self {
        Self::build(
            name,
            RateLaw::TerOrdered,
            &[a, b, c, enz],
            &[kcat, kma, kmb, kmc, kia],
            consumed,
            produced,
        )
    }

    /// Ter-sequential mechanism with two inhibition constants (RedAm type).
    #[allow(clippy::too_many_arguments)]
    pub fn ter_sequential(
        name: &str,
        kcat: &str,
        kma: &str,
        kmb: &str,
        kmc: &str,
        kia: &str,
        kib: &str,
        a: &str,
        b: &str,
        c: &str,
        enz: &str,
        consumed: &[&str],
        produced: &[&str],
    ) -> Self {
        Self::build(
            name,
            RateLaw::TerSequential,
            &[a, b, c, enz],
            &[kcat, kma, kmb, kmc, kia, kib],
            consumed,
            produced,
        )
    }

    /// Reversible uni-uni mechanism.
    #[allow(clippy::too_many_arguments)]
    pub fn reversible_uni_uni(
        name: &str,
        kcatf: &str,
        kcatr: &str,
        kma: &str,
        kmp: &str,
        a: &str,
        p: &str,
        enz: &str,
        consumed: &[&str],
        produced: &[&str],
    ) -> Self {
        Self::build(
            name,
            RateLaw::ReversibleUniUni,
            &[a, p, enz],
            &[kcatf, kcatr, kma, kmp],
            consumed,
            produced,
        )
    }

    /// Reversible ordered bi-bi mechanism.
    #[allow(clippy::too_many_arguments)]
    pub fn reversible_ordered_bi_bi(
        name: &str,
        kinetics: ReversibleBiBiParameters<'_>,
        a: &str,
        b: &str,
        p: &str,
        q: &str,
        enz: &str,
        consumed: &[&str],
        produced: &[&str],
    ) -> Self {
        Self::build(
            name,
            RateLaw::ReversibleOrderedBiBi,
            &[a, b, p, q, enz],
            &kinetics.names(),
            consumed,
            produced,
        )
    }

    /// Reversible random-order bi-bi mechanism.
    #[allow(clippy::too_many_arguments)]
    pub fn reversible_random_bi_bi(
        name: &str,
        kinetics: ReversibleBiBiParameters<'_>,
        a: &str,
        b: &str,
        p: &str,
        q: &str,
        enz: &str,
        consumed: &[&str],
        produced: &[&str],
    ) -> Self {
        Self::build(
            name,
            RateLaw::ReversibleRandomBiBi,
            &[a, b, p, q, enz],
            &kinetics.names(),
            consumed,
            produced,
        )
    }

    /// Thermodynamic uni mass-action form driven towards Keq.
    pub fn equilibrium_uni(
        name: &str,
        keq: &str,
        kf: &str,
        a: &str,
        p: &str,
        consumed: &[&str],
        produced: &[&str],
    ) -> Self {
        Self::build(
            name,
            RateLaw::EquilibriumUniMassAction,
            &[a, p],
            &[keq, kf],
            consumed,
            produced,
        )
    }

    /// First-order decay.
    pub fn first_order(name: &str, k: &str, a: &str, consumed: &[&str], produced: &[&str]) -> Self {
        Self::build(name, RateLaw::FirstOrder, &[a], &[k], consumed, produced)
    }

    /// Second-order mass action.
    pub fn second_order(
        name: &str,
        k: &str,
        a: &str,
        b: &str,
        consumed: &[&str],
        produced: &[&str],
    ) -> Self {
        Self::build(name, RateLaw::SecondOrder, &[a, b], &[k], consumed, produced)
    }

    /// Reversible binding `a + b <-> c` with explicit forward and reverse
    /// constants.
    #[allow(clippy::too_many_arguments)]
    pub fn binding(
        name: &str,
        k1: &str,
        kminus1: &str,
        a: &str,
        b: &str,
        c: &str,
        consumed: &[&str],
        produced: &[&str],
    ) -> Self {
        Self::build(
            name,
            RateLaw::Binding,
            &[a, b, c],
            &[k1, kminus1],
            consumed,
            produced,
        )
    }

    /// Reversible binding parameterised by the dissociation constant.
    #[allow(clippy::too_many_arguments)]
    pub fn binding_kd(
        name: &str,
        kd: &str,
        k1: &str,
        a: &str,
        b: &str,
        c: &str,
        consumed: &[&str],
        produced: &[&str],
    ) -> Self {
        Self::build(
            name,
            RateLaw::BindingKd,
            &[a, b, c],
            &[kd, k1],
            consumed,
            produced,
        )
    }

    /// Two-compartment partition equilibrium between an organic and an
    /// aqueous species.
    pub fn diffusion_equilibrium(name: &str, kd: &str, k1: &str, org: &str, aq: &str) -> Self {
        Self::build(
            name,
            RateLaw::DiffusionEquilibrium,
            &[org, aq],
            &[kd, k1],
            &[org],
            &[aq],
        )
    }

    /// Gas-liquid oxygen transfer towards saturation.
    #[allow(clippy::too_many_arguments)]
    pub fn oxygen_diffusion(
        name: &str,
        kl: &str,
        area: &str,
        o2sat: &str,
        o2aq: &str,
        consumed: &[&str],
        produced: &[&str],
    ) -> Self {
        Self::build(
            name,
            RateLaw::OxygenDiffusion,
            &[o2aq],
            &[kl, area, o2sat],
            consumed,
            produced,
        )
    }

    /// Chemostat-style exchange. `exchanged` lists the species inside the
    /// reactor, `inputs` the matching feed species, paired index by index.
    pub fn flow(
        name: &str,
        flow_rate: &str,
        column_volume: &str,
        exchanged: &[&str],
        inputs: &[&str],
    ) -> Self {
        let mut reaction = Self::build(
            name,
            RateLaw::Flow,
            exchanged,
            &[flow_rate, column_volume],
            &[],
            &[],
        );
        reaction.input_roles = inputs.iter().map(|s| s.to_string()).collect();
        reaction
    }

    /// A user-registered pure rate callback with explicitly declared role and
    /// parameter lists. Fails if the declared lists do not match the
    /// callback's arities.
    pub fn custom(
        name: &str,
        rate: CustomRate,
        substrate_roles: &[&str],
        parameter_names: &[&str],
        consumed: &[&str],
        produced: &[&str],
    ) -> Result<Self, ReactionError> {
        let law = RateLaw::Custom(rate);
        if law.substrate_arity() != Some(substrate_roles.len()) {
            return Err(ReactionError::ArityMismatch {
                reaction: name.to_string(),
                what: "substrate roles",
                expected: law.substrate_arity().unwrap_or(0),
                found: substrate_roles.len(),
            });
        }
        if law.parameter_arity() != parameter_names.len() {
            return Err(ReactionError::ArityMismatch {
                reaction: name.to_string(),
                what: "parameters",
                expected: law.parameter_arity(),
                found: parameter_names.len(),
            });
        }
        Ok(Self::build(
            name,
            law,
            substrate_roles,
            parameter_names,
            consumed,
            produced,
        ))
    }

    /// Attach a modifier. The modifier's role and parameter names are
    /// appended to this reaction's lists when absent, so they resolve against
    /// the model like any other name. Chains apply in registration order.
    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        for name in modifier.substrate_names() {
            if !self.substrate_roles.iter().any(|n| n == name) {
                self.substrate_roles.push(name.to_string());
            }
        }
        for name in modifier.parameter_names() {
            if !self.parameter_names.iter().any(|n| n == name) {
                self.parameter_names.push(name.to_string());
            }
        }
        self.modifiers.push(modifier);
        self
    }

    /// Declare a default value for one of this reaction's parameters.
    pub fn with_parameter(mut self, name: &str, value: f64) -> Self {
        self.parameters.insert(name.to_string(), value);
        self
    }

    /// Declare an uncertainty distribution for one of this reaction's
    /// parameters.
    pub fn with_parameter_distribution(mut self, name: &str, distribution: Distribution) -> Self {
        self.parameter_distributions
            .insert(name.to_string(), distribution);
        self
    }

    /// Clamp this reaction's negative derivative contributions to zero.
    /// A guard against integrator overshoot near zero concentrations, not a
    /// modelling feature.
    pub fn with_clamp_negative(mut self) -> Self {
        self.clamp_negative = true;
        self
    }

    /// Check the positional contract between this reaction and its rate law.
    /// Modifier registration may legitimately extend the role/parameter
    /// lists past the law's arity, so the check is a lower bound.
    pub fn validate(&self) -> Result<(), ReactionError> {
        if let Some(expected) = self.law.substrate_arity() {
            if self.substrate_roles.len() < expected {
                return Err(ReactionError::ArityMismatch {
                    reaction: self.name.clone(),
                    what: "substrate roles",
                    expected,
                    found: self.substrate_roles.len(),
                });
            }
        }
        let expected = self.law.parameter_arity();
        if self.parameter_names.len() < expected {
            return Err(ReactionError::ArityMismatch {
                reaction: self.name.clone(),
                what: "parameters",
                expected,
                found: self.parameter_names.len(),
            });
        }
        if matches!(self.law, RateLaw::Flow) && self.substrate_roles.len() != self.input_roles.len()
        {
            return Err(ReactionError::UnpairedFlow {
                reaction: self.name.clone(),
                current: self.substrate_roles.len(),
                input: self.input_roles.len(),
            });
        }
        Ok(())
    }

    /// Every species name this reaction touches; used by the model to
    /// auto-register undeclared species at zero.
    pub fn referenced_species(&self) -> impl Iterator<Item = &str> {
        self.substrate_roles
            .iter()
            .chain(self.consumed.iter())
            .chain(self.produced.iter())
            .chain(self.input_roles.iter())
            .map(|s| s.as_str())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn law(&self) -> &RateLaw {
        &self.law
    }

    pub fn substrate_roles(&self) -> &[String] {
        &self.substrate_roles
    }

    pub fn parameter_names(&self) -> &[String] {
        &self.parameter_names
    }

    pub fn consumed(&self) -> &[String] {
        &self.consumed
    }

    pub fn produced(&self) -> &[String] {
        &self.produced
    }

    pub(crate) fn input_roles(&self) -> &[String] {
        &self.input_roles
    }

    pub fn parameters(&self) -> &HashMap<String, f64> {
        &self.parameters
    }

    pub fn parameter_distributions(&self) -> &HashMap<String, Distribution> {
        &self.parameter_distributions
    }

    pub(crate) fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    pub(crate) fn clamps_negative(&self) -> bool {
        self.clamp_negative
    }
}

/// The eight kinetic constants of the reversible bi-bi mechanisms, grouped to
/// keep the constructor signatures readable.
#[derive(Debug, Clone, Copy)]
pub struct ReversibleBiBiParameters<'a> {
    pub kcatf: &'a str,
    pub kcatr: &'a str,
    pub kmb: &'a str,
    pub kia: &'a str,
    pub kib: &'a str,
    pub kmp: &'a str,
    pub kip: &'a str,
    pub kiq: &'a str,
}

impl<'a> ReversibleBiBiParameters<'a> {
    fn names(&self) -> [&'a str; 8] {
        [
            self.kcatf, self.kcatr, self.kmb, self.kia, self.kib, self.kmp, self.kip, self.kiq,
        ]
    }
}
