// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # bayes-filter
//!
//! Naive Bayes and complement naive Bayes text classification over
//! concurrently updatable token statistics.
//!
//! ## Architecture
//!
//! - **Classes** (`class`): named categories with a shared, mutable prior
//! - **Data sets** (`dataset`): per-class token occurrence counters
//! - **Training sets** (`training`): the class → data set registry, thresholds and priors
//! - **Classifiers** (`classifier`): naive and complement estimators, document combination
//! - **Correction** (`correction`): optional beta-prior correction of posteriors
//! - **Configuration** (`config`): TOML-backed classifier settings
//! - **SMS harness** (`sms`): spam-filter evaluation on the UCI SMS Spam Collection
//!
//! ## Library usage
//!
//! ```
//! use bayes_filter::class::Class;
//! use bayes_filter::classifier::{Classifier, NaiveClassifier};
//! use bayes_filter::training::TrainingSet;
//!
//! let training = TrainingSet::new();
//! let spam = Class::new("spam", 0.5).unwrap();
//! let ham = Class::new("ham", 0.5).unwrap();
//! training
//!     .create_data_set(spam.clone())
//!     .unwrap()
//!     .add_tokens(["rolex", "viagra", "money"]);
//! training
//!     .create_data_set(ham)
//!     .unwrap()
//!     .add_tokens(["love", "unicorn", "money"]);
//!
//! let classifier = NaiveClassifier::new(training);
//! let best = classifier
//!     .classify(&["rolex", "money"], None)
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(best.class(), &spam);
//! ```

pub mod class;
pub mod classifier;
pub mod config;
pub mod correction;
pub mod dataset;
pub mod error;
pub mod probability;
pub mod sms;
pub mod training;

pub use class::{Class, Token};
pub use classifier::{Classifier, ClassifierSettings, ComplementNaiveClassifier, NaiveClassifier};
pub use config::ClassifierConfig;
pub use correction::{BetaCorrection, CorrectionConfig, NoCorrection, ProbabilityCorrection};
pub use dataset::{DataSet, DataSetAccess, EmptyDataSet, TokenRegistration};
pub use error::{ClassifierError, ClassifierResult};
pub use probability::{CombinedConditionalProbability, ConditionalProbability};
pub use training::{ClassProbabilities, TrainingSet};
