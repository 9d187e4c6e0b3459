//! Probability distributions for uncertain parameters and species.
//!
//! [`Distribution`] is a closed enum over the `statrs` distributions used to
//! describe measurement uncertainty on kinetic constants and starting
//! concentrations. It is consumed only by the uncertainty layer — the
//! integration core never sees a distribution, only the point values
//! materialised from one.
//!
//! Distributions can be constructed programmatically or parsed from the
//! human-readable `Name(param1, param2, ...)` format:
//!
//! ```
//! use biocascade::uncertainty::distribution::Distribution;
//!
//! let kcat: Distribution = "Normal(6.0, 0.3)".parse().unwrap();
//! let km: Distribution = "U(1200, 1800)".parse().unwrap();
//! assert!((kcat.mean() - 6.0).abs() < 1e-12);
//! assert!((km.ppf(0.5) - 1500.0).abs() < 1e-9);
//! ```

use std::str::FromStr;

use rand::distributions::Distribution as RandDistribution;
use rand::Rng;
use regex::Regex;
use statrs::distribution::{ContinuousCDF, Exp, LogNormal, Normal, Uniform};
use statrs::statistics::Distribution as StatDistribution;
use thiserror::Error;

/// A validated probability distribution attached to a parameter or species.
#[derive(Debug, Clone, PartialEq)]
pub enum Distribution {
    /// Normal distribution with mean and standard deviation.
    Normal(Normal),
    /// Uniform distribution over `[min, max)`.
    Uniform(Uniform),
    /// Log-normal distribution; parameters are those of the underlying
    /// normal (location, scale).
    LogNormal(LogNormal),
    /// Exponential distribution with rate parameter.
    Exp(Exp),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DistributionError {
    /// The string does not match `Name(param1, param2, ...)`.
    #[error("invalid distribution format '{0}'; use 'Name(param1, param2, ...)'")]
    Format(String),
    /// The parameters violate the distribution's constraints.
    #[error("invalid distribution parameters: {0}")]
    Invalid(String),
}

impl Distribution {
    pub fn normal(mean: f64, std_dev: f64) -> Result<Self, DistributionError> {
        Normal::new(mean, std_dev)
            .map(Distribution::Normal)
            .map_err(|e| DistributionError::Invalid(e.to_string()))
    }

    pub fn uniform(min: f64, max: f64) -> Result<Self, DistributionError> {
        Uniform::new(min, max)
            .map(Distribution::Uniform)
            .map_err(|e| DistributionError::Invalid(e.to_string()))
    }

    pub fn log_normal(location: f64, scale: f64) -> Result<Self, DistributionError> {
        LogNormal::new(location, scale)
            .map(Distribution::LogNormal)
            .map_err(|e| DistributionError::Invalid(e.to_string()))
    }

    pub fn exponential(rate: f64) -> Result<Self, DistributionError> {
        Exp::new(rate)
            .map(Distribution::Exp)
            .map_err(|e| DistributionError::Invalid(e.to_string()))
    }

    /// The distribution mean. Used to materialise a point default for a
    /// factor declared only through its distribution.
    pub fn mean(&self) -> f64 {
        let mean = match self {
            Distribution::Normal(d) => d.mean(),
            Distribution::Uniform(d) => d.mean(),
            Distribution::LogNormal(d) => d.mean(),
            Distribution::Exp(d) => d.mean(),
        };
        // Every supported distribution has a finite mean.
        mean.unwrap_or(f64::NAN)
    }

    /// Percent-point function (inverse CDF).
    pub fn ppf(&self, p: f64) -> f64 {
        match self {
            Distribution::Normal(d) => d.inverse_cdf(p),
            Distribution::Uniform(d) => d.inverse_cdf(p),
            Distribution::LogNormal(d) => d.inverse_cdf(p),
            Distribution::Exp(d) => d.inverse_cdf(p),
        }
    }

    /// Draw one sample.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            Distribution::Normal(d) => d.sample(rng),
            Distribution::Uniform(d) => d.sample(rng),
            Distribution::LogNormal(d) => d.sample(rng),
            Distribution::Exp(d) => d.sample(rng),
        }
    }
}

/// Intermediate result of the string parser: lowercase distribution name plus
/// its numeric parameters in written order.
#[derive(Debug)]
struct DistSpec {
    name: String,
    params: Vec<f64>,
}

fn parse_spec(s: &str) -> Result<DistSpec, DistributionError> {
    let s = s.trim();
    let pattern = Regex::new(r"^([a-zA-Z]+)\s*\(\s*([^)]*)\s*\)$")
        .expect("distribution pattern is valid");

    let captures = pattern
        .captures(s)
        .ok_or_else(|| DistributionError::Format(s.to_string()))?;

    let name = captures[1].to_lowercase();
    let params_str = captures[2].trim();
    let params = if params_str.is_empty() {
        Vec::new()
    } else {
        params_str
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DistributionError::Invalid(format!("'{params_str}': {e}")))?
    };

    Ok(DistSpec { name, params })
}

fn expect_params(spec: &DistSpec, n: usize) -> Result<(), DistributionError> {
    if spec.params.len() != n {
        return Err(DistributionError::Invalid(format!(
            "'{}' takes {} parameter(s), got {}",
            spec.name,
            n,
            spec.params.len()
        )));
    }
    Ok(())
}

impl FromStr for Distribution {
    type Err = DistributionError;

    /// Parse `Normal(mean, std)` / `N(...)`, `Uniform(min, max)` / `U(...)`,
    /// `LogNormal(location, scale)` / `LN(...)`, `Exp(rate)` / `E(...)`.
    /// Names are case-insensitive; parameters accept scientific notation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let spec = parse_spec(s)?;
        match spec.name.as_str() {
            "normal" | "n" => {
                expect_params(&spec, 2)?;
                Distribution::normal(spec.params[0], spec.params[1])
            }
            "uniform" | "u" => {
                expect_params(&spec, 2)?;
                Distribution::uniform(spec.params[0], spec.params[1])
            }
            "lognormal" | "logn" | "ln" => {
                expect_params(&spec, 2)?;
                Distribution::log_normal(spec.params[0], spec.params[1])
            }
            "exponential" | "exp" | "e" => {
                expect_params(&spec, 1)?;
                Distribution::exponential(spec.params[0])
            }
            other => Err(DistributionError::Invalid(format!(
                "unknown distribution '{other}'"
            ))),
        }
    }
}
