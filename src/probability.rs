//! Classification results and evidence combination.

use std::fmt;

use crate::class::{Class, Token};

/// `P(class | token)` after Bayes normalization and correction.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalProbability<T> {
    class: Class,
    token: T,
    probability: f64,
    occurrence: u64,
}

impl<T: Token> ConditionalProbability<T> {
    pub(crate) fn new(class: Class, token: T, probability: f64, occurrence: u64) -> Self {
        debug_assert!(
            !(probability < -1e-9 || probability > 1.0 + 1e-9),
            "probability {probability} outside [0, 1]"
        );
        Self {
            class,
            token,
            probability,
            occurrence,
        }
    }

    pub fn class(&self) -> &Class {
        &self.class
    }

    pub fn token(&self) -> &T {
        &self.token
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Thresholded occurrence count of the token in the class.
    pub fn occurrence(&self) -> u64 {
        self.occurrence
    }
}

impl<T: fmt::Debug> fmt::Display for ConditionalProbability<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "P({}|{:?})={:.2}%",
            self.class,
            self.token,
            self.probability * 100.0
        )
    }
}

/// Document-level `P(class | tokens)` with the per-token evidence it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedConditionalProbability<T> {
    class: Class,
    probability: f64,
    token_probabilities: Vec<ConditionalProbability<T>>,
}

impl<T: Token> CombinedConditionalProbability<T> {
    pub(crate) fn new(
        class: Class,
        probability: f64,
        token_probabilities: Vec<ConditionalProbability<T>>,
    ) -> Self {
        Self {
            class,
            probability,
            token_probabilities,
        }
    }

    pub fn class(&self) -> &Class {
        &self.class
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Per-token contributions, in document order.
    pub fn token_probabilities(&self) -> &[ConditionalProbability<T>] {
        &self.token_probabilities
    }
}

impl<T> fmt::Display for CombinedConditionalProbability<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "P({}|{} tokens)={:.2}%",
            self.class,
            self.token_probabilities.len(),
            self.probability * 100.0
        )
    }
}

/// Combine independent binary-evidence probabilities by log-odds summation.
///
/// `eta = Σ ln(1 - p) - ln(p)`, result `1 / (1 + e^eta)`. A single 0 or 1
/// dominates; a 0 together with a 1 yields NaN.
pub fn combine_log_odds<I>(probabilities: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let eta: f64 = probabilities
        .into_iter()
        .map(|p| (-p).ln_1p() - p.ln())
        .sum();
    1.0 / (1.0 + eta.exp())
}

/// Document-length normalization `p^(norm_length / document_length)`.
///
/// Disabled when `norm_length` is 0 or the document is empty.
pub fn normalize_length(probability: f64, norm_length: f64, document_length: usize) -> f64 {
    if norm_length > 0.0 && document_length > 0 {
        probability.powf(norm_length / document_length as f64)
    } else {
        probability
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_probability_is_unchanged() {
        for p in [0.1, 0.5, 0.73, 0.99] {
            assert!((combine_log_odds([p]) - p).abs() < 1e-12);
        }
    }

    #[test]
    fn agreeing_evidence_strengthens() {
        let combined = combine_log_odds([0.8, 0.8]);
        // odds 4 * 4 = 16
        assert!((combined - 16.0 / 17.0).abs() < 1e-12);
    }

    #[test]
    fn opposing_evidence_cancels() {
        assert!((combine_log_odds([0.8, 0.2]) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn certain_evidence_dominates() {
        assert_eq!(combine_log_odds([1.0, 0.3]), 1.0);
        assert_eq!(combine_log_odds([0.0, 0.7]), 0.0);
    }

    #[test]
    fn no_evidence_is_neutral() {
        assert_eq!(combine_log_odds(std::iter::empty()), 0.5);
    }

    #[test]
    fn length_normalization() {
        let p = 0.25;
        assert!((normalize_length(p, 1.0, 2) - 0.5).abs() < 1e-12);
        assert_eq!(normalize_length(p, 0.0, 2), p);
        assert_eq!(normalize_length(p, 1.0, 0), p);
        assert_eq!(normalize_length(p, 1.0, 1), p);
    }

    #[test]
    fn display_formats() {
        let class = Class::new("spam", 0.5).unwrap();
        let cp = ConditionalProbability::new(class.clone(), "rolex", 0.5, 1);
        assert_eq!(cp.to_string(), "P(spam|\"rolex\")=50.00%");

        let combined = CombinedConditionalProbability::new(class, 0.25, vec![cp]);
        assert_eq!(combined.to_string(), "P(spam|1 tokens)=25.00%");
    }
}
