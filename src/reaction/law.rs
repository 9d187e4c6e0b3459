//! Rate law mechanisms.
//!
//! Each variant of [`RateLaw`] computes a single scalar reaction velocity
//! from substrate concentrations and kinetic constants handed over as plain
//! slices in a fixed positional order. The positional contract (which role
//! sits at which index) is pinned by the [`Reaction`](crate::reaction::spec::Reaction)
//! constructors; [`RateLaw::substrate_arity`] and [`RateLaw::parameter_arity`]
//! let the configuration layer verify the contract before integration starts.
//!
//! All formulas are pure and allocation-free. Division by a zero Km/Ki is the
//! caller's responsibility to exclude via sampling bounds.

use std::fmt;
use std::sync::Arc;

/// A user-registered rate function: `(substrates, parameters) -> velocity`.
///
/// This is the closed escape hatch for mechanisms not covered by the built-in
/// variants. The function must be pure; it receives the substrate values and
/// parameter values in the positional order declared on the owning reaction.
#[derive(Clone)]
pub struct CustomRate {
    substrate_arity: usize,
    parameter_arity: usize,
    rate: Arc<dyn Fn(&[f64], &[f64]) -> f64 + Send + Sync>,
}

impl CustomRate {
    pub fn new<F>(substrate_arity: usize, parameter_arity: usize, rate: F) -> Self
    where
        F: Fn(&[f64], &[f64]) -> f64 + Send + Sync + 'static,
    {
        Self {
            substrate_arity,
            parameter_arity,
            rate: Arc::new(rate),
        }
    }
}

impl fmt::Debug for CustomRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomRate")
            .field("substrate_arity", &self.substrate_arity)
            .field("parameter_arity", &self.parameter_arity)
            .finish()
    }
}

/// The closed set of supported reaction mechanisms.
///
/// Role order and parameter order per variant are documented on the matching
/// [`Reaction`](crate::reaction::spec::Reaction) constructor.
#[derive(Debug, Clone)]
pub enum RateLaw {
    /// Irreversible single-substrate Michaelis-Menten.
    /// Roles `[a, enz]`, parameters `[kcat, km]`.
    MichaelisMenten,
    /// Irreversible bi-substrate Michaelis-Menten with independent sites.
    /// Roles `[a, b, enz]`, parameters `[kcat, kma, kmb]`.
    IndependentBi,
    /// Ternary-complex ordered bi-substrate mechanism.
    /// Roles `[a, b, enz]`, parameters `[kcat, kma, kmb, kia]`.
    OrderedBi,
    /// Ping-pong bi-substrate mechanism.
    /// Roles `[a, b, enz]`, parameters `[kcat, kma, kmb]`.
    PingPongBi,
    /// Ter-ordered sequential mechanism (carboxylic acid reductase type).
    /// Roles `[a, b, c, enz]`, parameters `[kcat, kma, kmb, kmc, kia]`.
    TerOrdered,
    /// Ter-sequential mechanism with two inhibition constants (reductive
    /// aminase type). Roles `[a, b, c, enz]`,
    /// parameters `[kcat, kma, kmb, kmc, kia, kib]`.
    TerSequential,
    /// Reversible uni-uni mechanism.
    /// Roles `[a, p, enz]`, parameters `[kcatf, kcatr, kma, kmp]`.
    ReversibleUniUni,
    /// Reversible ordered bi-bi mechanism.
    /// Roles `[a, b, p, q, enz]`,
    /// parameters `[kcatf, kcatr, kmb, kia, kib, kmp, kip, kiq]`.
    ReversibleOrderedBiBi,
    /// Reversible random-order bi-bi mechanism; same closed form as the
    /// ordered variant with the random-order denominator.
    /// Roles `[a, b, p, q, enz]`,
    /// parameters `[kcatf, kcatr, kmb, kia, kib, kmp, kip, kiq]`.
    ReversibleRandomBiBi,
    /// Thermodynamic uni mass-action form driven towards Keq.
    /// Roles `[a, p]`, parameters `[keq, kf]`.
    EquilibriumUniMassAction,
    /// First-order decay. Roles `[a]`, parameters `[k]`.
    FirstOrder,
    /// Second-order mass action. Roles `[a, b]`, parameters `[k]`.
    SecondOrder,
    /// Reversible binding `a + b <-> c`. Roles `[a, b, c]`,
    /// parameters `[k1, kminus1]`.
    Binding,
    /// Reversible binding parameterised by the dissociation constant,
    /// `kminus1 = kd * k1`. Roles `[a, b, c]`, parameters `[kd, k1]`.
    BindingKd,
    /// Two-compartment partition equilibrium, `kminus1 = kd * k1`.
    /// Roles `[org, aq]`, parameters `[kd, k1]`.
    DiffusionEquilibrium,
    /// Gas-liquid oxygen transfer towards saturation.
    /// Roles `[o2aq]`, parameters `[kl, area, o2sat]`.
    OxygenDiffusion,
    /// Chemostat-style exchange between paired current/input species.
    /// Parameters `[flow_rate, column_volume]`. This variant bypasses the
    /// consumed/produced accounting and writes `(flow_rate/column_volume) *
    /// (input - current)` directly at each current-species index.
    Flow,
    /// User-registered pure rate callback.
    Custom(CustomRate),
}

impl RateLaw {
    /// Number of substrate roles the law reads, in positional order.
    ///
    /// `Flow` is variable-arity (one role per exchanged species) and returns
    /// `None`; its pairing is validated separately.
    pub fn substrate_arity(&self) -> Option<usize> {
        match self {
            RateLaw::MichaelisMenten => Some(2),
            RateLaw::IndependentBi | RateLaw::OrderedBi | RateLaw::PingPongBi => Some(3),
            RateLaw::TerOrdered | RateLaw::TerSequential => Some(4),
            RateLaw::ReversibleUniUni => Some(3),
            RateLaw::ReversibleOrderedBiBi | RateLaw::ReversibleRandomBiBi => Some(5),
            RateLaw::EquilibriumUniMassAction => Some(2),
            RateLaw::FirstOrder => Some(1),
            RateLaw::SecondOrder => Some(2),
            RateLaw::Binding | RateLaw::BindingKd => Some(3),
            RateLaw::DiffusionEquilibrium => Some(2),
            RateLaw::OxygenDiffusion => Some(1),
            RateLaw::Flow => None,
            RateLaw::Custom(custom) => Some(custom.substrate_arity),
        }
    }

    /// Number of kinetic constants the law reads, in positional order.
    pub fn parameter_arity(&self) -> usize {
        match self {
            RateLaw::MichaelisMenten => 2,
            RateLaw::IndependentBi => 3,
            RateLaw::OrderedBi => 4,
            RateLaw::PingPongBi => 3,
            RateLaw::TerOrdered => 5,
            RateLaw::TerSequential => 6,
            RateLaw::ReversibleUniUni => 4,
            RateLaw::ReversibleOrderedBiBi | RateLaw::ReversibleRandomBiBi => 8,
            RateLaw::EquilibriumUniMassAction => 2,
            RateLaw::FirstOrder => 1,
            RateLaw::SecondOrder => 1,
            RateLaw::Binding | RateLaw::BindingKd => 2,
            RateLaw::DiffusionEquilibrium => 2,
            RateLaw::OxygenDiffusion => 3,
            RateLaw::Flow => 2,
            RateLaw::Custom(custom) => custom.parameter_arity,
        }
    }

    /// Evaluate the scalar reaction velocity.
    ///
    /// `s` and `p` must hold exactly the values declared by the owning
    /// reaction, in its positional order. `Flow` never reaches this method;
    /// its contribution is computed per species pair by the resolution layer.
    pub fn velocity(&self, s: &[f64], p: &[f64]) -> f64 {
        match self {
            RateLaw::MichaelisMenten => {
                let (a, enz) = (s[0], s[1]);
                let (kcat, km) = (p[0], p[1]);
                kcat * enz * (a / (km + a))
            }
            RateLaw::IndependentBi => {
                let (a, b, enz) = (s[0], s[1], s[2]);
                let (kcat, kma, kmb) = (p[0], p[1], p[2]);
                kcat * enz * (a / (kma + a)) * (b / (kmb + b))
            }
            RateLaw::OrderedBi => {
                let (a, b, enz) = (s[0], s[1], s[2]);
                let (kcat, kma, kmb, kia) = (p[0], p[1], p[2], p[3]);
                kcat * enz * a * b / (kia * kmb + kmb * a + kma * b + a * b)
            }
            RateLaw::PingPongBi => {
                let (a, b, enz) = (s[0], s[1], s[2]);
                // Guard the 0/0 at the origin rather than trusting the
                // closed form there.
                if a == 0.0 || b == 0.0 {
                    return 0.0;
                }
                let (kcat, kma, kmb) = (p[0], p[1], p[2]);
                kcat * enz * a * b / (kmb * a + kma * b + a * b)
            }
            RateLaw::TerOrdered => {
                let (a, b, c, enz) = (s[0], s[1], s[2], s[3]);
                let (kcat, kma, kmb, kmc, kia) = (p[0], p[1], p[2], p[3], p[4]);
                kcat * enz * a * b * c
                    / (kia * c + kmc * a * b + kmb * a * c + kma * b * c + a * b * c)
            }
            RateLaw::TerSequential => {
                let (a, b, c, enz) = (s[0], s[1], s[2], s[3]);
                let (kcat, kma, kmb, kmc, kia, kib) = (p[0], p[1], p[2], p[3], p[4], p[5]);
                kcat * enz * a * b * c
                    / (kia * kib * kmc
                        + kib * kmc * a
                        + kia * kmb * c
                        + kmc * a * b
                        + kmb * a * c
                        + kma * b * c
                        + a * b * c)
            }
            RateLaw::ReversibleUniUni => {
                let (a, pr, enz) = (s[0], s[1], s[2]);
                let (kcatf, kcatr, kma, kmp) = (p[0], p[1], p[2], p[3]);
                (kcatf * enz * a - kcatr * enz * pr) / (1.0 + a / kma + pr / kmp)
            }
            RateLaw::ReversibleOrderedBiBi | RateLaw::ReversibleRandomBiBi => {
                let (a, b, pr, q, enz) = (s[0], s[1], s[2], s[3], s[4]);
                let (kcatf, kcatr, kmb, kia, kib, kmp, kip, kiq) =
                    (p[0], p[1], p[2], p[3], p[4], p[5], p[6], p[7]);
                let num =
                    (enz * kcatf * a * b) / (kia * kmb) - (enz * kcatr * pr * q) / (kmp * kiq);
                let den = 1.0
                    + a / kia
                    + b / kib
                    + q / kiq
                    + pr / kip
                    + (a * b) / (kia * kmb)
                    + (pr * q) / (kmp * kiq);
                num / den
            }
            RateLaw::EquilibriumUniMassAction => {
                let (a, pr) = (s[0], s[1]);
                if a == 0.0 || pr == 0.0 {
                    return 0.0;
                }
                let (keq, kf) = (p[0], p[1]);
                kf * (1.0 - pr / a / keq)
            }
            RateLaw::FirstOrder => p[0] * s[0],
            RateLaw::SecondOrder => p[0] * s[0] * s[1],
            RateLaw::Binding => {
                let (a, b, c) = (s[0], s[1], s[2]);
                let (k1, kminus1) = (p[0], p[1]);
                k1 * a * b - kminus1 * c
            }
            RateLaw::BindingKd => {
                let (a, b, c) = (s[0], s[1], s[2]);
                let (kd, k1) = (p[0], p[1]);
                k1 * a * b - kd * k1 * c
            }
            RateLaw::DiffusionEquilibrium => {
                let (org, aq) = (s[0], s[1]);
                let (kd, k1) = (p[0], p[1]);
                k1 * org - kd * k1 * aq
            }
            RateLaw::OxygenDiffusion => {
                let o2aq = s[0];
                let (kl, area, o2sat) = (p[0], p[1], p[2]);
                -kl * area * (o2aq - o2sat)
            }
            RateLaw::Flow => 0.0,
            RateLaw::Custom(custom) => (custom.rate)(s, p),
        }
    }
}
