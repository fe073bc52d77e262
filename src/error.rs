//! Rich diagnostic error types for the classifier.
//!
//! Every fallible operation in the crate returns [`ClassifierError`]. Variants
//! carry miette diagnostic codes and help text so misconfigurations are easy to
//! track down from the binary as well as from library callers.

use miette::Diagnostic;
use thiserror::Error;

/// Errors raised by data sets, training sets, classifiers and configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ClassifierError {
    #[error("{parameter} is out of range: got {value}, expected {expected}")]
    #[diagnostic(
        code(bayes::config::out_of_range),
        help(
            "Smoothing alpha, thresholds, norm length and scaling factors must be \
             greater than or equal to zero. Class priors must lie within [0, 1] and \
             the beta correction strength must be strictly positive."
        )
    )]
    OutOfRange {
        parameter: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("{parameter} must be a finite number, got {value}")]
    #[diagnostic(
        code(bayes::config::not_finite),
        help("NaN and infinite values are rejected. Supply a finite number instead.")
    )]
    NotFinite { parameter: &'static str, value: f64 },

    #[error("a data set for class '{class}' is already registered")]
    #[diagnostic(
        code(bayes::training::duplicate_class),
        help(
            "Each class owns exactly one data set within a training set. \
             Look up the existing set with `get_set_for_class()` instead of \
             registering a second one."
        )
    )]
    DuplicateClass { class: String },

    #[error("the data set for class '{class}' already belongs to a training set")]
    #[diagnostic(
        code(bayes::training::already_attached),
        help(
            "A data set derives its vocabulary size and thresholds from exactly one \
             training set. Create a fresh data set for the second training set."
        )
    )]
    AlreadyAttached { class: String },

    #[error("no data set is registered for class '{class}'")]
    #[diagnostic(
        code(bayes::training::unknown_class),
        help("Register a data set for the class with `create_data_set()` or `add()` first.")
    )]
    UnknownClass { class: String },

    #[error("{operation} is not supported on the empty data set of class '{class}'")]
    #[diagnostic(
        code(bayes::dataset::unsupported),
        help(
            "The empty data set is a read-only placeholder for classes without \
             training data. Register a real data set to record tokens."
        )
    )]
    UnsupportedOperation {
        operation: &'static str,
        class: String,
    },

    #[error("cannot derive class probabilities from an empty vocabulary")]
    #[diagnostic(
        code(bayes::training::empty_vocabulary),
        help(
            "Automatic class probabilities are proportional to each class's distinct \
             token count. Train at least one token, or use equal distribution."
        )
    )]
    EmptyVocabulary,

    #[error("failed to read configuration from {path}: {source}")]
    #[diagnostic(
        code(bayes::config::read),
        help("Check that the configuration file exists and is readable.")
    )]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration {path}: {message}")]
    #[diagnostic(
        code(bayes::config::parse),
        help(
            "The configuration must be TOML with the keys occurrence_threshold, \
             percentage_threshold, smoothing_alpha, norm_length and an optional \
             [correction] table."
        )
    )]
    ConfigParse { path: String, message: String },

    #[error("malformed training data at line {line}: {message}")]
    #[diagnostic(
        code(bayes::data::malformed),
        help(
            "Each line must hold a label (`ham` or `spam`) and the message text, \
             separated by a single tab."
        )
    )]
    Dataset { line: usize, message: String },
}

/// Convenience alias for classifier operations.
pub type ClassifierResult<T> = std::result::Result<T, ClassifierError>;

/// Rejects negative and non-finite values.
pub(crate) fn ensure_non_negative(parameter: &'static str, value: f64) -> ClassifierResult<f64> {
    if !value.is_finite() {
        return Err(ClassifierError::NotFinite { parameter, value });
    }
    if value < 0.0 {
        return Err(ClassifierError::OutOfRange {
            parameter,
            value,
            expected: ">= 0",
        });
    }
    Ok(value)
}
