//! Post-hoc correction of class-given-token probabilities.
//!
//! Tokens seen only a handful of times produce extreme probabilities. A
//! [`ProbabilityCorrection`] gets the chance to pull such values back towards
//! something more reasonable after Bayes' theorem has been applied.
//!
//! [`NoCorrection`] is the default. [`BetaCorrection`] shrinks towards the
//! class prior with a configurable strength.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::class::{Class, Token};
use crate::dataset::DataSetAccess;
use crate::error::{ClassifierError, ClassifierResult};

/// Default background information strength of [`BetaCorrection`].
pub const DEFAULT_BACKGROUND_INFORMATION_STRENGTH: f64 = 3.0;

/// Adjusts a computed `P(class | token)`.
pub trait ProbabilityCorrection<T: Token>: fmt::Debug + Send + Sync {
    /// Return the corrected probability for `class` given `token`.
    ///
    /// `data_set` holds the statistics of `class`; counts at or below
    /// `occurrence_threshold` are to be treated as unseen.
    fn correct_probability(
        &self,
        class: &Class,
        data_set: &dyn DataSetAccess<T>,
        token: &T,
        probability: f64,
        occurrence_threshold: u64,
    ) -> f64;
}

/// Identity correction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoCorrection;

impl<T: Token> ProbabilityCorrection<T> for NoCorrection {
    fn correct_probability(
        &self,
        _class: &Class,
        _data_set: &dyn DataSetAccess<T>,
        _token: &T,
        probability: f64,
        _occurrence_threshold: u64,
    ) -> f64 {
        probability
    }
}

/// Beta-prior shrinkage towards the class prior.
///
/// `corrected = (s · P(class) + n · p) / (s + n)` where `s` is the background
/// information strength and `n` the token's occurrence count in the class.
/// With few observations the result leans towards the prior; with many it
/// converges to `p`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BetaCorrection {
    strength: f64,
}

impl BetaCorrection {
    /// `strength` must be finite and strictly positive.
    pub fn new(background_information_strength: f64) -> ClassifierResult<Self> {
        let strength = background_information_strength;
        if !strength.is_finite() {
            return Err(ClassifierError::NotFinite {
                parameter: "background information strength",
                value: strength,
            });
        }
        if strength <= 0.0 {
            return Err(ClassifierError::OutOfRange {
                parameter: "background information strength",
                value: strength,
                expected: "> 0",
            });
        }
        Ok(Self { strength })
    }

    pub fn background_information_strength(&self) -> f64 {
        self.strength
    }
}

impl Default for BetaCorrection {
    fn default() -> Self {
        Self {
            strength: DEFAULT_BACKGROUND_INFORMATION_STRENGTH,
        }
    }
}

impl<T: Token> ProbabilityCorrection<T> for BetaCorrection {
    fn correct_probability(
        &self,
        class: &Class,
        data_set: &dyn DataSetAccess<T>,
        token: &T,
        probability: f64,
        occurrence_threshold: u64,
    ) -> f64 {
        let s = self.strength;
        let mut n = data_set.count(token);
        if n <= occurrence_threshold {
            n = 0;
        }
        let n = n as f64;
        (s * class.probability() + n * probability) / (s + n)
    }
}

/// Serializable selection of a correction strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CorrectionConfig {
    #[default]
    None,
    Beta {
        #[serde(default = "default_strength")]
        background_information_strength: f64,
    },
}

fn default_strength() -> f64 {
    DEFAULT_BACKGROUND_INFORMATION_STRENGTH
}

impl CorrectionConfig {
    /// Check the parameters without building anything.
    pub fn validate(&self) -> ClassifierResult<()> {
        match *self {
            Self::None => Ok(()),
            Self::Beta {
                background_information_strength,
            } => BetaCorrection::new(background_information_strength).map(|_| ()),
        }
    }

    /// Instantiate the configured strategy.
    pub fn build<T: Token>(&self) -> ClassifierResult<Arc<dyn ProbabilityCorrection<T>>> {
        let correction: Arc<dyn ProbabilityCorrection<T>> = match *self {
            Self::None => Arc::new(NoCorrection),
            Self::Beta {
                background_information_strength,
            } => Arc::new(BetaCorrection::new(background_information_strength)?),
        };
        Ok(correction)
    }
}
