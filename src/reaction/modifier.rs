//! Inhibition and activation modifiers.
//!
//! A [`Modifier`] rewrites the substrate and parameter values handed to a
//! rate law, locally and for the current derivative evaluation only. It is
//! resolved against the *owning reaction's* role and parameter name lists,
//! never against the model: a modifier only ever sees what its reaction
//! exposes. Chains apply in registration order.

use serde::{Deserialize, Serialize};

use super::error::ReactionError;

/// A local rewrite of effective kinetic constants or substrate values,
/// applied before the rate law is evaluated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Modifier {
    /// Uncompetitive-style self inhibition: the acting substrate is rewritten
    /// to `a * (1 + a/ki)`.
    SubstrateInhibition { a: String, ki: String },

    /// Competitive inhibition: the target Km is rewritten to
    /// `km * (1 + i/ki)`.
    CompetitiveInhibition { i: String, km: String, ki: String },

    /// Mixed inhibition with an alpha factor:
    /// `kcat -> kcat / (1 + i/(alpha*ki))`,
    /// `km -> km * (1 + i/ki) / (1 + i/(alpha*ki))`.
    MixedInhibition {
        i: String,
        kcat: String,
        km: String,
        ki: String,
        alpha: String,
    },

    /// Mixed inhibition parameterised by separate competitive (`kic`) and
    /// uncompetitive (`kiu`) constants:
    /// `kcat -> kcat / (1 + i/kiu)`, `km -> km * (1 + i/kic) / (1 + i/kiu)`.
    UncompetitiveCompetitiveInhibition {
        i: String,
        kcat: String,
        km: String,
        kic: String,
        kiu: String,
    },
}

impl Modifier {
    /// Species role names the modifier reads, in resolution order.
    pub fn substrate_names(&self) -> Vec<&str> {
        match self {
            Modifier::SubstrateInhibition { a, .. } => vec![a],
            Modifier::CompetitiveInhibition { i, .. } => vec![i],
            Modifier::MixedInhibition { i, .. } => vec![i],
            Modifier::UncompetitiveCompetitiveInhibition { i, .. } => vec![i],
        }
    }

    /// Parameter names the modifier reads or rewrites, in resolution order.
    pub fn parameter_names(&self) -> Vec<&str> {
        match self {
            Modifier::SubstrateInhibition { ki, .. } => vec![ki],
            Modifier::CompetitiveInhibition { km, ki, .. } => vec![km, ki],
            Modifier::MixedInhibition {
                kcat, km, ki, alpha, ..
            } => vec![kcat, km, ki, alpha],
            Modifier::UncompetitiveCompetitiveInhibition {
                kcat, km, kic, kiu, ..
            } => vec![kcat, km, kic, kiu],
        }
    }

    /// Resolve role/parameter names into indices of the owning reaction's
    /// local substrate and parameter arrays.
    pub(crate) fn resolve(
        &self,
        reaction: &str,
        substrate_names: &[String],
        parameter_names: &[String],
    ) -> Result<ResolvedModifier, ReactionError> {
        let substrate_indexes = self
            .substrate_names()
            .into_iter()
            .map(|name| {
                substrate_names
                    .iter()
                    .position(|n| n == name)
                    .ok_or_else(|| ReactionError::UnknownSpecies {
                        reaction: reaction.to_string(),
                        name: name.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let parameter_indexes = self
            .parameter_names()
            .into_iter()
            .map(|name| {
                parameter_names
                    .iter()
                    .position(|n| n == name)
                    .ok_or_else(|| ReactionError::UnknownParameter {
                        reaction: reaction.to_string(),
                        name: name.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ResolvedModifier {
            modifier: self.clone(),
            substrate_indexes,
            parameter_indexes,
        })
    }
}

/// A modifier bound to positions in its reaction's local arrays.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedModifier {
    modifier: Modifier,
    substrate_indexes: Vec<usize>,
    parameter_indexes: Vec<usize>,
}

impl ResolvedModifier {
    /// Rewrite the local substrate/parameter scratch arrays in place.
    pub(crate) fn apply(&self, substrates: &mut [f64], parameters: &mut [f64]) {
        match &self.modifier {
            Modifier::SubstrateInhibition { .. } => {
                let ki = parameters[self.parameter_indexes[0]];
                let a = substrates[self.substrate_indexes[0]];
                substrates[self.substrate_indexes[0]] = a * (1.0 + a / ki);
            }
            Modifier::CompetitiveInhibition { .. } => {
                let km = parameters[self.parameter_indexes[0]];
                let ki = parameters[self.parameter_indexes[1]];
                let i = substrates[self.substrate_indexes[0]];
                parameters[self.parameter_indexes[0]] = km * (1.0 + i / ki);
            }
            Modifier::MixedInhibition { .. } => {
                let kcat = parameters[self.parameter_indexes[0]];
                let km = parameters[self.parameter_indexes[1]];
                let ki = parameters[self.parameter_indexes[2]];
                let alpha = parameters[self.parameter_indexes[3]];
                let i = substrates[self.substrate_indexes[0]];
                parameters[self.parameter_indexes[0]] = kcat / (1.0 + i / (alpha * ki));
                parameters[self.parameter_indexes[1]] =
                    km * (1.0 + i / ki) / (1.0 + i / (alpha * ki));
            }
            Modifier::UncompetitiveCompetitiveInhibition { .. } => {
                let kcat = parameters[self.parameter_indexes[0]];
                let km = parameters[self.parameter_indexes[1]];
                let kic = parameters[self.parameter_indexes[2]];
                let kiu = parameters[self.parameter_indexes[3]];
                let i = substrates[self.substrate_indexes[0]];
                parameters[self.parameter_indexes[0]] = kcat / (1.0 + i / kiu);
                parameters[self.parameter_indexes[1]] = km * (1.0 + i / kic) / (1.0 + i / kiu);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn substrate_inhibition_rewrites_acting_substrate() {
        let modifier = Modifier::SubstrateInhibition {
            a: "A".into(),
            ki: "ki".into(),
        };
        let resolved = modifier
            .resolve("r1", &names(&["A", "enz"]), &names(&["kcat", "km", "ki"]))
            .unwrap();

        let mut s = [200.0, 5.0];
        let mut p = [6.0, 100.0, 400.0];
        resolved.apply(&mut s, &mut p);

        assert_relative_eq!(s[0], 200.0 * (1.0 + 200.0 / 400.0), epsilon = 1e-12);
        assert_eq!(s[1], 5.0);
        assert_eq!(p, [6.0, 100.0, 400.0]);
    }

    #[test]
    fn competitive_inhibition_raises_apparent_km() {
        let modifier = Modifier::CompetitiveInhibition {
            i: "I".into(),
            km: "km".into(),
            ki: "ki".into(),
        };
        let resolved = modifier
            .resolve("r1", &names(&["A", "enz", "I"]), &names(&["kcat", "km", "ki"]))
            .unwrap();

        let mut s = [50.0, 2.0, 30.0];
        let mut p = [6.0, 100.0, 10.0];
        resolved.apply(&mut s, &mut p);

        assert_relative_eq!(p[1], 100.0 * (1.0 + 3.0), epsilon = 1e-12);
        assert_eq!(p[0], 6.0);
    }

    #[test]
    fn mixed_inhibition_rewrites_kcat_and_km() {
        let modifier = Modifier::MixedInhibition {
            i: "I".into(),
            kcat: "kcat".into(),
            km: "km".into(),
            ki: "ki".into(),
            alpha: "alpha".into(),
        };
        let resolved = modifier
            .resolve(
                "r1",
                &names(&["A", "enz", "I"]),
                &names(&["kcat", "km", "ki", "alpha"]),
            )
            .unwrap();

        let mut s = [50.0, 2.0, 20.0];
        let mut p = [6.0, 100.0, 10.0, 2.0];
        resolved.apply(&mut s, &mut p);

        let denom_u = 1.0 + 20.0 / (2.0 * 10.0);
        assert_relative_eq!(p[0], 6.0 / denom_u, epsilon = 1e-12);
        assert_relative_eq!(p[1], 100.0 * (1.0 + 2.0) / denom_u, epsilon = 1e-12);
    }

    #[test]
    fn unknown_names_fail_fast() {
        let modifier = Modifier::CompetitiveInhibition {
            i: "missing".into(),
            km: "km".into(),
            ki: "ki".into(),
        };
        let err = modifier
            .resolve("r1", &names(&["A"]), &names(&["km", "ki"]))
            .unwrap_err();
        assert_eq!(
            err,
            ReactionError::UnknownSpecies {
                reaction: "r1".into(),
                name: "missing".into()
            }
        );
    }
}
