//! Bayesian classifiers over a [`TrainingSet`](crate::training::TrainingSet).
//!
//! Both estimators share the same surface ([`Classifier`]) and configuration
//! ([`ClassifierSettings`]):
//!
//! - [`NaiveClassifier`] estimates `P(token | class)` from the class's own counts.
//! - [`ComplementNaiveClassifier`] estimates it from the counts of every other
//!   class, which helps when a class has little training data of its own.
//!
//! # Pipeline
//!
//! 1. Per class, compute `P(token | class) · P(class)` with Lidstone smoothing.
//! 2. Normalize across classes (Bayes' theorem) to get `P(class | token)`.
//! 3. Pass each value through the configured [`ProbabilityCorrection`].
//! 4. For documents, combine the per-token values of each class by log-odds
//!    summation and optionally apply document-length normalization.
//!
//! # Degenerate tokens
//!
//! When every class reports zero probability for a token (never seen anywhere
//! and `alpha = 0`) the posterior is undefined. `calculate_probability` then
//! returns NaN and `calculate_probabilities` reports 0 for every class. Use a
//! positive smoothing alpha to avoid this in production.

mod complement;
mod naive;

use std::sync::Arc;

pub use complement::ComplementNaiveClassifier;
pub use naive::NaiveClassifier;

use crate::class::{Class, Token};
use crate::correction::{NoCorrection, ProbabilityCorrection};
use crate::dataset::DataSetAccess;
use crate::error::{ClassifierResult, ensure_non_negative};
use crate::probability::{
    CombinedConditionalProbability, ConditionalProbability, combine_log_odds, normalize_length,
};

/// Default Lidstone smoothing parameter.
pub const DEFAULT_SMOOTHING_ALPHA: f64 = 0.01;

/// Default document-length normalization exponent numerator.
pub const DEFAULT_NORM_LENGTH: f64 = 1.0;

/// Common surface of the Bayesian estimators.
pub trait Classifier<T: Token> {
    /// `P(class | token)` for a single class.
    ///
    /// `alpha` overrides the configured smoothing parameter.
    fn calculate_probability(
        &self,
        class: &Class,
        token: &T,
        alpha: Option<f64>,
    ) -> ClassifierResult<f64>;

    /// `P(class | token)` for every registered class, ordered by class name.
    fn calculate_probabilities(
        &self,
        token: &T,
        alpha: Option<f64>,
    ) -> ClassifierResult<Vec<ConditionalProbability<T>>>;

    /// `P(class | document)` for every registered class.
    ///
    /// Returns an empty list for an empty document.
    fn calculate_document_probabilities(
        &self,
        tokens: &[T],
        alpha: Option<f64>,
    ) -> ClassifierResult<Vec<CombinedConditionalProbability<T>>>;

    /// The most probable class for `tokens`, or `None` for an empty document.
    fn classify(
        &self,
        tokens: &[T],
        alpha: Option<f64>,
    ) -> ClassifierResult<Option<CombinedConditionalProbability<T>>> {
        let probabilities = self.calculate_document_probabilities(tokens, alpha)?;
        Ok(probabilities
            .into_iter()
            .max_by(|a, b| a.probability().total_cmp(&b.probability())))
    }
}

/// Tunables shared by both classifiers.
#[derive(Debug, Clone)]
pub struct ClassifierSettings<T: Token> {
    smoothing_alpha: f64,
    norm_length: f64,
    correction: Arc<dyn ProbabilityCorrection<T>>,
}

impl<T: Token> Default for ClassifierSettings<T> {
    fn default() -> Self {
        Self {
            smoothing_alpha: DEFAULT_SMOOTHING_ALPHA,
            norm_length: DEFAULT_NORM_LENGTH,
            correction: Arc::new(NoCorrection),
        }
    }
}

impl<T: Token> ClassifierSettings<T> {
    pub fn smoothing_alpha(&self) -> f64 {
        self.smoothing_alpha
    }

    /// Must be finite and non-negative.
    pub fn set_smoothing_alpha(&mut self, alpha: f64) -> ClassifierResult<()> {
        self.smoothing_alpha = ensure_non_negative("smoothing alpha", alpha)?;
        Ok(())
    }

    pub fn norm_length(&self) -> f64 {
        self.norm_length
    }

    /// Must be finite and non-negative; 0 disables length normalization.
    pub fn set_norm_length(&mut self, norm_length: f64) -> ClassifierResult<()> {
        self.norm_length = ensure_non_negative("norm length", norm_length)?;
        Ok(())
    }

    pub fn correction(&self) -> &Arc<dyn ProbabilityCorrection<T>> {
        &self.correction
    }

    pub fn set_correction(&mut self, correction: Arc<dyn ProbabilityCorrection<T>>) {
        self.correction = correction;
    }

    /// The effective alpha for one call.
    pub(crate) fn resolve_alpha(&self, alpha: Option<f64>) -> ClassifierResult<f64> {
        match alpha {
            Some(alpha) => ensure_non_negative("smoothing alpha", alpha),
            None => Ok(self.smoothing_alpha),
        }
    }

    /// Turn raw `P(token | class) · P(class)` numerators into corrected posteriors.
    ///
    /// Each entry is the class's statistics, its numerator and the thresholded
    /// occurrence count to report.
    pub(crate) fn normalize<'a, I>(
        &self,
        token: &T,
        numerators: I,
        occurrence_threshold: u64,
    ) -> Vec<ConditionalProbability<T>>
    where
        I: IntoIterator<Item = (&'a dyn DataSetAccess<T>, f64, u64)>,
    {
        let numerators: Vec<_> = numerators.into_iter().collect();
        let total: f64 = numerators.iter().map(|(_, numerator, _)| numerator).sum();
        if total <= 0.0 {
            tracing::warn!(?token, "token carries no information in any class");
        }

        numerators
            .into_iter()
            .map(|(set, numerator, occurrence)| {
                let class = set.class();
                let probability = if total > 0.0 { numerator / total } else { 0.0 };
                let corrected = self.correction.correct_probability(
                    class,
                    set,
                    token,
                    probability,
                    occurrence_threshold,
                );
                tracing::trace!(class = %class, ?token, probability, corrected, "posterior");
                ConditionalProbability::new(class.clone(), token.clone(), corrected, occurrence)
            })
            .collect()
    }

    /// Group per-token posteriors by class and combine each group.
    pub(crate) fn combine_document(
        &self,
        per_token: Vec<Vec<ConditionalProbability<T>>>,
        document_length: usize,
    ) -> Vec<CombinedConditionalProbability<T>> {
        let mut groups: Vec<(Class, Vec<ConditionalProbability<T>>)> = Vec::new();
        for cp in per_token.into_iter().flatten() {
            match groups.iter_mut().find(|(class, _)| *class == *cp.class()) {
                Some((_, group)) => group.push(cp),
                None => groups.push((cp.class().clone(), vec![cp])),
            }
        }

        groups
            .into_iter()
            .map(|(class, group)| {
                let combined = combine_log_odds(group.iter().map(|cp| cp.probability()));
                let probability = normalize_length(combined, self.norm_length, document_length);
                tracing::debug!(class = %class, tokens = document_length, probability, "document posterior");
                CombinedConditionalProbability::new(class, probability, group)
            })
            .collect()
    }
}
