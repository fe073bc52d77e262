//! Classifier configuration.
//!
//! Loaded from TOML, e.g.:
//!
//! ```toml
//! occurrence_threshold = 1
//! percentage_threshold = 0.0
//! smoothing_alpha = 0.00001
//! norm_length = 1.0
//!
//! [correction]
//! kind = "beta"
//! background_information_strength = 3.0
//! ```
//!
//! Every key is optional; missing keys take the defaults below.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::class::Token;
use crate::classifier::{ClassifierSettings, DEFAULT_NORM_LENGTH, DEFAULT_SMOOTHING_ALPHA};
use crate::correction::CorrectionConfig;
use crate::error::{ClassifierError, ClassifierResult, ensure_non_negative};
use crate::training::TrainingSet;

/// Thresholds, smoothing and correction for a classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Token counts at or below this value are treated as unseen.
    pub occurrence_threshold: u64,
    /// Unsmoothed percentages at or below this value are treated as unseen.
    pub percentage_threshold: f64,
    /// Lidstone smoothing parameter.
    pub smoothing_alpha: f64,
    /// Document-length normalization; 0 disables it.
    pub norm_length: f64,
    pub correction: CorrectionConfig,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            occurrence_threshold: 0,
            percentage_threshold: 0.0,
            smoothing_alpha: DEFAULT_SMOOTHING_ALPHA,
            norm_length: DEFAULT_NORM_LENGTH,
            correction: CorrectionConfig::default(),
        }
    }
}

impl ClassifierConfig {
    /// Reject negative or non-finite values.
    pub fn validate(&self) -> ClassifierResult<()> {
        ensure_non_negative("percentage threshold", self.percentage_threshold)?;
        ensure_non_negative("smoothing alpha", self.smoothing_alpha)?;
        ensure_non_negative("norm length", self.norm_length)?;
        self.correction.validate()
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> ClassifierResult<Self> {
        Self::parse(content, "<inline>")
    }

    /// Load and validate a TOML file.
    pub fn load(path: &Path) -> ClassifierResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ClassifierError::ConfigRead {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> ClassifierResult<String> {
        toml::to_string_pretty(self).map_err(|e| ClassifierError::ConfigParse {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })
    }

    fn parse(content: &str, path: &str) -> ClassifierResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ClassifierError::ConfigParse {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        tracing::debug!(path, ?config, "classifier configuration loaded");
        Ok(config)
    }

    /// Push the thresholds into `training`.
    pub fn apply_thresholds<T: Token>(&self, training: &TrainingSet<T>) -> ClassifierResult<()> {
        training.set_percentage_threshold(self.percentage_threshold)?;
        training.set_occurrence_threshold(self.occurrence_threshold);
        Ok(())
    }

    /// Classifier settings for this configuration.
    pub fn build_settings<T: Token>(&self) -> ClassifierResult<ClassifierSettings<T>> {
        let mut settings = ClassifierSettings::default();
        settings.set_smoothing_alpha(self.smoothing_alpha)?;
        settings.set_norm_length(self.norm_length)?;
        settings.set_correction(self.correction.build()?);
        Ok(settings)
    }
}
