//! Multinomial naive Bayes.

use std::sync::Arc;

use crate::class::{Class, Token};
use crate::config::ClassifierConfig;
use crate::dataset::{DataSet, DataSetAccess, EmptyDataSet};
use crate::error::ClassifierResult;
use crate::probability::{CombinedConditionalProbability, ConditionalProbability};
use crate::training::TrainingSet;

use super::{Classifier, ClassifierSettings};

/// Naive Bayes classifier assuming conditional independence of tokens.
///
/// `P(class | token) = P(token | class) · P(class) / Σ_c P(token | c) · P(c)`
/// where `P(token | class)` is the smoothed percentage of the token in the
/// class's data set.
#[derive(Debug, Clone)]
pub struct NaiveClassifier<T: Token> {
    training: TrainingSet<T>,
    settings: ClassifierSettings<T>,
}

impl<T: Token> NaiveClassifier<T> {
    /// Create a classifier with default settings (alpha 0.01, norm length 1,
    /// no correction).
    pub fn new(training: TrainingSet<T>) -> Self {
        Self {
            training,
            settings: ClassifierSettings::default(),
        }
    }

    /// Create a classifier from a validated configuration.
    ///
    /// The thresholds in `config` are applied to `training`.
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

    /// Occurrence threshold of the underlying training set.
    pub fn occurrence_threshold(&self) -> u64 {
        self.training.occurrence_threshold()
    }

    pub fn set_occurrence_threshold(&self, threshold: u64) {
        self.training.set_occurrence_threshold(threshold);
    }

    /// Percentage threshold of the underlying training set.
    pub fn percentage_threshold(&self) -> f64 {
        self.training.percentage_threshold()
    }

    pub fn set_percentage_threshold(&self, threshold: f64) -> ClassifierResult<()> {
        self.training.set_percentage_threshold(threshold)
    }

    /// Split the registered sets into the one for `class` and all others.
    ///
    /// A class without a data set gets an [`EmptyDataSet`].
    fn split_data_sets(&self, class: &Class) -> (Arc<dyn DataSetAccess<T>>, Vec<Arc<DataSet<T>>>) {
        let mut own: Option<Arc<dyn DataSetAccess<T>>> = None;
        let mut remaining = Vec::new();
        for set in self.training.data_sets() {
            if set.class() == class {
                debug_assert!(own.is_none(), "class registered twice");
                own = Some(set as Arc<dyn DataSetAccess<T>>);
            } else {
                remaining.push(set);
            }
        }
        let own = own.unwrap_or_else(|| {
            Arc::new(EmptyDataSet::new(class.clone())) as Arc<dyn DataSetAccess<T>>
        });
        (own, remaining)
    }
}

impl<T: Token> Classifier<T> for NaiveClassifier<T> {
    fn calculate_probability(
        &self,
        class: &Class,
        token: &T,
        alpha: Option<f64>,
    ) -> ClassifierResult<f64> {
        let alpha = self.settings.resolve_alpha(alpha)?;
        let occurrence_threshold = self.training.occurrence_threshold();
        let (own, remaining) = self.split_data_sets(class);

        let own_probability = own.percentage(token, alpha)? * class.probability();
        let mut remaining_probability = 0.0;
        for set in &remaining {
            remaining_probability += set.stats(token, alpha)?.probability * set.class().probability();
        }

        let total = own_probability + remaining_probability;
        if total <= 0.0 {
            tracing::warn!(class = %class, ?token, "total probability is zero, posterior undefined");
        }
        let probability = own_probability / total;

        let corrected = self.settings.correction().correct_probability(
            class,
            &*own,
            token,
            probability,
            occurrence_threshold,
        );
        tracing::trace!(class = %class, ?token, probability, corrected, "naive posterior");
        Ok(corrected)
    }

    fn calculate_probabilities(
        &self,
        token: &T,
        alpha: Option<f64>,
    ) -> ClassifierResult<Vec<ConditionalProbability<T>>> {
        let alpha = self.settings.resolve_alpha(alpha)?;
        let occurrence_threshold = self.training.occurrence_threshold();
        let sets = self.training.data_sets();

        let mut numerators = Vec::with_capacity(sets.len());
        for set in &sets {
            let stats = set.stats(token, alpha)?;
            let numerator = stats.probability * set.class().probability();
            numerators.push((&**set as &dyn DataSetAccess<T>, numerator, stats.occurrence));
        }

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
