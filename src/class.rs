//! Class and token value types.
//!
//! A [`Class`] is one of the mutually exclusive categories being predicted. Its
//! identity is its name; the prior probability travels with it and may be
//! reassigned at any time (for example by
//! [`TrainingSet::set_class_probabilities`](crate::training::TrainingSet::set_class_probabilities)).
//! Clones share the same prior, so a class handed to a data set and the copy
//! kept by the caller always agree.
//!
//! Tokens are opaque: anything with value equality and a hash qualifies.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{ClassifierError, ClassifierResult};

/// An atomic unit of vocabulary.
///
/// Blanket-implemented for every `Eq + Hash + Clone` type that can be shared
/// across training threads, so `String`, `&'static str` or a custom newtype all
/// work without ceremony.
pub trait Token: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static {}

impl<T> Token for T where T: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static {}

#[derive(Debug)]
struct ClassInner {
    name: Box<str>,
    /// `f64` bit pattern of the prior.
    probability: AtomicU64,
}

/// A named class with a shared, mutable prior probability.
#[derive(Clone)]
pub struct Class {
    inner: Arc<ClassInner>,
}

impl Class {
    /// Create a class with the given prior.
    ///
    /// The prior must be finite and within `[0, 1]`.
    pub fn new(name: impl Into<String>, probability: f64) -> ClassifierResult<Self> {
        validate_prior(probability)?;
        Ok(Self {
            inner: Arc::new(ClassInner {
                name: name.into().into_boxed_str(),
                probability: AtomicU64::new(probability.to_bits()),
            }),
        })
    }

    /// The class name. Two classes are equal iff their names are equal.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Current prior probability.
    pub fn probability(&self) -> f64 {
        f64::from_bits(self.inner.probability.load(Ordering::Acquire))
    }

    /// Replace the prior probability. Visible through every clone.
    pub fn set_probability(&self, probability: f64) -> ClassifierResult<()> {
        validate_prior(probability)?;
        self.store_probability(probability);
        Ok(())
    }

    pub(crate) fn store_probability(&self, probability: f64) {
        self.inner
            .probability
            .store(probability.to_bits(), Ordering::Release);
    }
}

pub(crate) fn validate_prior(probability: f64) -> ClassifierResult<()> {
    if !probability.is_finite() {
        return Err(ClassifierError::NotFinite {
            parameter: "class probability",
            value: probability,
        });
    }
    if !(0.0..=1.0).contains(&probability) {
        return Err(ClassifierError::OutOfRange {
            parameter: "class probability",
            value: probability,
            expected: "within [0, 1]",
        });
    }
    Ok(())
}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        self.inner.name == other.inner.name
    }
}

impl Eq for Class {}

impl Hash for Class {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.name.hash(state);
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name())
            .field("probability", &self.probability())
            .finish()
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
