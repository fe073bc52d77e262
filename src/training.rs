//! Registry of per-class data sets.
//!
//! A [`TrainingSet`] maps every [`Class`] to exactly one [`DataSet`] and owns the
//! values all member sets share: the occurrence threshold, the percentage
//! threshold and the vocabulary size used as the smoothing denominator.
//!
//! `TrainingSet` is a cheap handle; clones refer to the same registry, so a
//! classifier can hold one while training code keeps another.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::class::{Class, Token, validate_prior};
use crate::dataset::DataSet;
use crate::error::{ClassifierError, ClassifierResult, ensure_non_negative};

/// Policy for deriving class priors after training.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassProbabilities {
    /// Prior proportional to the class's share of distinct tokens.
    Automatic,
    /// The same prior for every class.
    EqualDistributed,
}

impl std::fmt::Display for ClassProbabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Automatic => write!(f, "automatic"),
            Self::EqualDistributed => write!(f, "equal-distributed"),
        }
    }
}

/// Shared state behind a [`TrainingSet`] handle.
///
/// Member data sets keep a weak reference to it for thresholds and vocabulary.
#[derive(Debug)]
pub(crate) struct Registry<T: Token> {
    sets: DashMap<Class, Arc<DataSet<T>>>,
    occurrence_threshold: AtomicU64,
    /// `f64` bit pattern.
    percentage_threshold: AtomicU64,
}

impl<T: Token> Registry<T> {
    fn new() -> Self {
        Self {
            sets: DashMap::new(),
            occurrence_threshold: AtomicU64::new(0),
            percentage_threshold: AtomicU64::new(0f64.to_bits()),
        }
    }

    pub(crate) fn occurrence_threshold(&self) -> u64 {
        self.occurrence_threshold.load(Ordering::Acquire)
    }

    pub(crate) fn percentage_threshold(&self) -> f64 {
        f64::from_bits(self.percentage_threshold.load(Ordering::Acquire))
    }

    /// Sum of distinct-token counts over all member sets, recomputed per call.
    pub(crate) fn vocabulary_size(&self) -> u64 {
        self.sets
            .iter()
            .map(|entry| entry.value().token_count())
            .sum()
    }
}

/// Class → data set registry with shared thresholds.
#[derive(Debug)]
pub struct TrainingSet<T: Token> {
    inner: Arc<Registry<T>>,
}

impl<T: Token> Clone for TrainingSet<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Token> Default for TrainingSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Token> TrainingSet<T> {
    /// Create an empty training set with zero thresholds.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Registry::new()),
        }
    }

    /// Create a fresh data set for `class` and register it.
    pub fn create_data_set(&self, class: Class) -> ClassifierResult<Arc<DataSet<T>>> {
        let data_set = Arc::new(DataSet::new(class));
        self.add(Arc::clone(&data_set))?;
        Ok(data_set)
    }

    /// Register `data_set` under its class.
    ///
    /// Fails if the class already has a data set here, or if the data set
    /// already belongs to a training set.
    pub fn add(&self, data_set: Arc<DataSet<T>>) -> ClassifierResult<()> {
        let class = data_set.class().clone();
        if data_set.is_attached() {
            return Err(ClassifierError::AlreadyAttached {
                class: class.name().to_string(),
            });
        }

        match self.inner.sets.entry(class.clone()) {
            Entry::Occupied(_) => Err(ClassifierError::DuplicateClass {
                class: class.name().to_string(),
            }),
            Entry::Vacant(slot) => {
                data_set.attach(Arc::downgrade(&self.inner))?;
                slot.insert(data_set);
                tracing::debug!(class = %class, "registered data set");
                Ok(())
            }
        }
    }

    /// Register several data sets in order.
    ///
    /// Stops at the first failure; data sets registered before it stay
    /// registered.
    pub fn add_all<I>(&self, data_sets: I) -> ClassifierResult<()>
    where
        I: IntoIterator<Item = Arc<DataSet<T>>>,
    {
        for data_set in data_sets {
            self.add(data_set)?;
        }
        Ok(())
    }

    /// The data set registered for `class`.
    pub fn get_set_for_class(&self, class: &Class) -> ClassifierResult<Arc<DataSet<T>>> {
        self.inner
            .sets
            .get(class)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| ClassifierError::UnknownClass {
                class: class.name().to_string(),
            })
    }

    /// Whether a data set is registered for `class`.
    pub fn contains_class(&self, class: &Class) -> bool {
        self.inner.sets.contains_key(class)
    }

    /// Snapshot of all registered data sets, ordered by class name.
    pub fn data_sets(&self) -> Vec<Arc<DataSet<T>>> {
        let mut sets: Vec<_> = self
            .inner
            .sets
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        sets.sort_by(|a, b| a.class().name().cmp(b.class().name()));
        sets
    }

    /// Snapshot of all registered classes, ordered by name.
    pub fn classes(&self) -> Vec<Class> {
        self.data_sets()
            .into_iter()
            .map(|set| set.class().clone())
            .collect()
    }

    /// Number of registered classes.
    pub fn len(&self) -> usize {
        self.inner.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.sets.is_empty()
    }

    /// Sum of distinct-token counts over all data sets.
    ///
    /// A token seen in two classes contributes twice. Recomputed on every call.
    pub fn vocabulary_size(&self) -> u64 {
        self.inner.vocabulary_size()
    }

    /// Drop the tokens of every data set, keeping the registrations.
    pub fn clear_tokens(&self) {
        for set in self.data_sets() {
            set.clear();
        }
        tracing::debug!(classes = self.len(), "cleared all tokens");
    }

    pub fn occurrence_threshold(&self) -> u64 {
        self.inner.occurrence_threshold()
    }

    /// Counts at or below this threshold are treated as unseen.
    pub fn set_occurrence_threshold(&self, threshold: u64) {
        self.inner
            .occurrence_threshold
            .store(threshold, Ordering::Release);
        tracing::debug!(threshold, "occurrence threshold changed");
    }

    pub fn percentage_threshold(&self) -> f64 {
        self.inner.percentage_threshold()
    }

    /// Unsmoothed percentages at or below this threshold are treated as unseen.
    ///
    /// Must be finite and non-negative.
    pub fn set_percentage_threshold(&self, threshold: f64) -> ClassifierResult<()> {
        let threshold = ensure_non_negative("percentage threshold", threshold)?;
        self.inner
            .percentage_threshold
            .store(threshold.to_bits(), Ordering::Release);
        tracing::debug!(threshold, "percentage threshold changed");
        Ok(())
    }

    /// Assign the prior of every registered class.
    ///
    /// - [`ClassProbabilities::Automatic`]: `token_count / Σ token_count · factor`
    /// - [`ClassProbabilities::EqualDistributed`]: `factor / number_of_classes`
    ///
    /// `factor` must be finite and non-negative. All priors are computed
    /// before any is written; if one would leave `[0, 1]` nothing changes.
    /// In practice `EqualDistributed` with `factor > number_of_classes` and
    /// `Automatic` with `factor > 1` are rejected with
    /// [`ClassifierError::OutOfRange`], which keeps every prior a probability.
    pub fn set_class_probabilities(
        &self,
        mode: ClassProbabilities,
        factor: f64,
    ) -> ClassifierResult<()> {
        let factor = ensure_non_negative("factor", factor)?;
        let sets = self.data_sets();
        if sets.is_empty() {
            return Ok(());
        }

        let priors: Vec<(Class, f64)> = match mode {
            ClassProbabilities::Automatic => {
                let counts: Vec<u64> = sets.iter().map(|set| set.token_count()).collect();
                let total: u64 = counts.iter().sum();
                if total == 0 {
                    return Err(ClassifierError::EmptyVocabulary);
                }
                sets.iter()
                    .zip(counts)
                    .map(|(set, count)| {
                        (set.class().clone(), count as f64 / total as f64 * factor)
                    })
                    .collect()
            }
            ClassProbabilities::EqualDistributed => {
                let prior = 1.0 / sets.len() as f64 * factor;
                sets.iter()
                    .map(|set| (set.class().clone(), prior))
                    .collect()
            }
        };

        for (_, prior) in &priors {
            validate_prior(*prior)?;
        }
        for (class, prior) in priors {
            class.store_probability(prior);
            tracing::debug!(class = %class, prior, %mode, "class probability assigned");
        }
        Ok(())
    }
}
