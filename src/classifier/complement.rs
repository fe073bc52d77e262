//! Complement naive Bayes.
//!
//! Instead of asking how typical a token is for a class, ask how untypical it
//! is for everything else: `P(token | class) ≈ 1 - Π_{c ≠ class} P(token | c)`.
//! The product is accumulated in log space so many small per-class
//! probabilities do not underflow.

use crate::class::{Class, Token};
use crate::config::ClassifierConfig;
use crate::dataset::DataSetAccess;
use crate::error::{ClassifierError, ClassifierResult};
use crate::probability::{CombinedConditionalProbability, ConditionalProbability};
use crate::training::TrainingSet;

use super::{Classifier, ClassifierSettings};

/// Complement naive Bayes classifier.
#[derive(Debug, Clone)]
pub struct ComplementNaiveClassifier<T: Token> {
    training: TrainingSet<T>,
    settings: ClassifierSettings<T>,
}

impl<T: Token> ComplementNaiveClassifier<T> {
    pub fn new(training: TrainingSet<T>) -> Self {
        Self {
            training,
            settings: ClassifierSettings::default(),
        }
    }

    /// Create a classifier from a validated configuration, applying its
    /// thresholds to `training`.
    pub fn with_config(training: TrainingSet<T>, config: &ClassifierConfig) -> ClassifierResult<Self> {
        let settings = config.build_settings()?;
        config.apply_thresholds(&training)?;
        Ok(Self { training, settings })
    }

    pub fn training_set(&self) -> &TrainingSet<T> {
        &self.training
    }

    pub fn settings(&self) -> &ClassifierSettings<T> {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut ClassifierSettings<T> {
        &mut self.settings
    }

    pub fn occurrence_threshold(&self) -> u64 {
        self.training.occurrence_threshold()
    }

    pub fn set_occurrence_threshold(&self, threshold: u64) {
        self.training.set_occurrence_threshold(threshold);
    }

    pub fn percentage_threshold(&self) -> f64 {
        self.training.percentage_threshold()
    }

    pub fn set_percentage_threshold(&self, threshold: f64) -> ClassifierResult<()> {
        self.training.set_percentage_threshold(threshold)
    }
}

impl<T: Token> Classifier<T> for ComplementNaiveClassifier<T> {
    /// The entry for `class` from [`calculate_probabilities`](Classifier::calculate_probabilities).
    ///
    /// Unlike the naive estimator there is no placeholder for unregistered
    /// classes: the complement of a class that does not take part in the
    /// normalization is meaningless, so the lookup fails.
    fn calculate_probability(
        &self,
        class: &Class,
        token: &T,
        alpha: Option<f64>,
    ) -> ClassifierResult<f64> {
        self.calculate_probabilities(token, alpha)?
            .into_iter()
            .find(|cp| cp.class() == class)
            .map(|cp| cp.probability())
            .ok_or_else(|| ClassifierError::UnknownClass {
                class: class.name().to_string(),
            })
    }

    fn calculate_probabilities(
        &self,
        token: &T,
        alpha: Option<f64>,
    ) -> ClassifierResult<Vec<ConditionalProbability<T>>> {
        let alpha = self.settings.resolve_alpha(alpha)?;
        let occurrence_threshold = self.training.occurrence_threshold();
        let sets = self.training.data_sets();

        let mut percentages = Vec::with_capacity(sets.len());
        for set in &sets {
            percentages.push(set.stats(token, alpha)?.probability);
        }

        let numerators = sets.iter().enumerate().map(|(index, set)| {
            let log_probability: f64 = percentages
                .iter()
                .enumerate()
                .filter(|(other, _)| *other != index)
                .map(|(_, p)| p.ln())
                .sum();
            let class = set.class();
            let numerator = (1.0 - log_probability.exp()).max(0.0) * class.probability();
            tracing::trace!(class = %class, ?token, log_probability, numerator, "complement likelihood");
            (&**set as &dyn DataSetAccess<T>, numerator, set.count(token))
        });

        Ok(self
            .settings
            .normalize(token, numerators, occurrence_threshold))
    }

    fn calculate_document_probabilities(
        &self,
        tokens: &[T],
        alpha: Option<f64>,
    ) -> ClassifierResult<Vec<CombinedConditionalProbability<T>>> {
        let alpha = self.settings.resolve_alpha(alpha)?;
        let per_token = tokens
            .iter()
            .map(|token| self.calculate_probabilities(token, Some(alpha)))
            .collect::<ClassifierResult<Vec<_>>>()?;
        Ok(self.settings.combine_document(per_token, tokens.len()))
    }
}
