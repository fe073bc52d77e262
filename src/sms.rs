//! SMS spam filtering on top of the generic classifiers.
//!
//! Reads the tab-separated `label<TAB>text` format of the UCI SMS Spam
//! Collection, trains a ham and a spam data set and measures how well a
//! classifier separates the two.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use rayon::prelude::*;

use crate::class::Class;
use crate::classifier::Classifier;
use crate::dataset::{DataSet, TokenCount};
use crate::error::{ClassifierError, ClassifierResult};
use crate::training::TrainingSet;

/// Characters replaced by a space before splitting.
const PUNCTUATION: &[char] = &[
    '.', ',', '!', '?', ':', ';', '&', '\'', '"', '`', '´', '-', '+',
];

/// Characters words are split on.
const SEPARATORS: &[char] = &['(', ')'];

/// Label of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    Ham,
    Spam,
}

impl MessageType {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageType::Ham => "ham",
            MessageType::Spam => "spam",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ham" => Ok(MessageType::Ham),
            "spam" => Ok(MessageType::Spam),
            other => Err(format!(
                "expected message type \"ham\" or \"spam\", found \"{other}\""
            )),
        }
    }
}

/// A labelled message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sms {
    pub kind: MessageType,
    pub content: String,
}

impl Sms {
    pub fn new(kind: MessageType, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }

    pub fn tokens(&self) -> Vec<String> {
        tokenize(&self.content)
    }
}

/// Parse a collection, one `label<TAB>text` message per line.
///
/// Blank lines are skipped. Line numbers in errors are 1-based.
pub fn parse_collection(input: &str) -> ClassifierResult<Vec<Sms>> {
    let mut messages = Vec::new();
    for (index, line) in input.lines().enumerate() {
        let line_no = index + 1;
        if line.trim().is_empty() {
            continue;
        }
        let (label, content) = line.split_once('\t').ok_or_else(|| ClassifierError::Dataset {
            line: line_no,
            message: "expected a label and a message separated by a tab".to_string(),
        })?;
        let kind = label
            .trim()
            .parse::<MessageType>()
            .map_err(|message| ClassifierError::Dataset {
                line: line_no,
                message,
            })?;
        messages.push(Sms::new(kind, content));
    }
    tracing::debug!(messages = messages.len(), "parsed message collection");
    Ok(messages)
}

/// Drop repeated messages, keeping the first occurrence.
///
/// Two messages are the same when their labels match and their contents are
/// equal ignoring case.
pub fn deduplicate(messages: Vec<Sms>) -> Vec<Sms> {
    let mut seen = HashSet::new();
    let before = messages.len();
    let unique: Vec<Sms> = messages
        .into_iter()
        .filter(|sms| seen.insert((sms.kind, sms.content.to_lowercase())))
        .collect();
    tracing::debug!(before, after = unique.len(), "removed duplicate messages");
    unique
}

/// Lowercase, blank out punctuation and digits, then split on whitespace and
/// parentheses.
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if PUNCTUATION.contains(&c) || c.is_ascii_digit() {
                ' '
            } else {
                c
            }
        })
        .collect();
    cleaned
        .split(|c: char| c.is_whitespace() || SEPARATORS.contains(&c))
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}

/// Outcome of one classified message.
#[derive(Debug, Clone)]
pub struct Prediction {
    pub message: Sms,
    pub estimated: MessageType,
    pub probability: f64,
}

impl Prediction {
    pub fn is_correct(&self) -> bool {
        self.message.kind == self.estimated
    }
}

/// Evaluation summary.
#[derive(Debug, Clone, Default)]
pub struct EvaluationReport {
    pub correct: usize,
    /// Messages with no tokens left after stop-word removal.
    pub skipped: usize,
    pub mispredictions: Vec<Prediction>,
}

impl EvaluationReport {
    pub fn wrong(&self) -> usize {
        self.mispredictions.len()
    }

    pub fn total(&self) -> usize {
        self.correct + self.wrong()
    }

    /// Fraction of correct predictions, 0 when nothing was classified.
    pub fn accuracy(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.correct as f64 / total as f64,
        }
    }

    /// Ham messages classified as spam.
    pub fn false_positives(&self) -> impl Iterator<Item = &Prediction> {
        self.mispredictions
            .iter()
            .filter(|p| p.message.kind == MessageType::Ham)
    }

    /// Spam messages classified as ham.
    pub fn false_negatives(&self) -> impl Iterator<Item = &Prediction> {
        self.mispredictions
            .iter()
            .filter(|p| p.message.kind == MessageType::Spam)
    }
}

/// A two-class ham/spam training set with stop-word bookkeeping.
#[derive(Debug)]
pub struct SpamFilter {
    training: TrainingSet<String>,
    ham: Arc<DataSet<String>>,
    spam: Arc<DataSet<String>>,
    stop_words: HashSet<String>,
    ham_messages: usize,
    spam_messages: usize,
}

impl SpamFilter {
    /// Empty filter with equal priors.
    pub fn new() -> ClassifierResult<Self> {
        let training = TrainingSet::new();
        let ham = training.create_data_set(Class::new(MessageType::Ham.as_str(), 0.5)?)?;
        let spam = training.create_data_set(Class::new(MessageType::Spam.as_str(), 0.5)?)?;
        Ok(Self {
            training,
            ham,
            spam,
            stop_words: HashSet::new(),
            ham_messages: 0,
            spam_messages: 0,
        })
    }

    pub fn training_set(&self) -> &TrainingSet<String> {
        &self.training
    }

    pub fn data_set(&self, kind: MessageType) -> &Arc<DataSet<String>> {
        match kind {
            MessageType::Ham => &self.ham,
            MessageType::Spam => &self.spam,
        }
    }

    pub fn message_count(&self, kind: MessageType) -> usize {
        match kind {
            MessageType::Ham => self.ham_messages,
            MessageType::Spam => self.spam_messages,
        }
    }

    pub fn stop_words(&self) -> &HashSet<String> {
        &self.stop_words
    }

    /// Tokenize and register every message in parallel.
    pub fn train(&mut self, messages: &[Sms]) {
        for sms in messages {
            match sms.kind {
                MessageType::Ham => self.ham_messages += 1,
                MessageType::Spam => self.spam_messages += 1,
            }
        }
        let this = &*self;
        messages
            .par_iter()
            .for_each(|sms| this.data_set(sms.kind).add_tokens(sms.tokens()));
        tracing::info!(
            ham = self.ham_messages,
            spam = self.spam_messages,
            vocabulary = self.training.vocabulary_size(),
            "training complete"
        );
    }

    /// Purge the `count` most frequent tokens (summed over both classes) and
    /// remember them as stop words. Ties are broken alphabetically.
    pub fn remove_stop_words(&mut self, count: usize) -> Vec<TokenCount<String>> {
        let mut totals: HashMap<String, u64> = HashMap::new();
        for set in [&self.ham, &self.spam] {
            for tc in set.token_counts() {
                *totals.entry(tc.token).or_insert(0) += tc.count;
            }
        }
        let mut ranked: Vec<TokenCount<String>> = totals
            .into_iter()
            .map(|(token, count)| TokenCount { token, count })
            .collect();
        ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.token.cmp(&b.token)));
        ranked.truncate(count);

        for tc in &ranked {
            self.ham.purge_token(&tc.token);
            self.spam.purge_token(&tc.token);
            self.stop_words.insert(tc.token.clone());
            tracing::debug!(token = %tc.token, count = tc.count, "stop word removed");
        }
        ranked
    }

    /// Set the class priors to the share of training messages in each class.
    pub fn adjust_priors(&self) -> ClassifierResult<()> {
        let total = self.ham_messages + self.spam_messages;
        if total == 0 {
            return Ok(());
        }
        let ham = self.ham_messages as f64 / total as f64;
        self.ham.class().set_probability(ham)?;
        self.spam.class().set_probability(1.0 - ham)?;
        tracing::info!(ham, spam = 1.0 - ham, "class priors adjusted");
        Ok(())
    }

    /// Message tokens with stop words removed.
    pub fn filtered_tokens(&self, sms: &Sms) -> Vec<String> {
        sms.tokens()
            .into_iter()
            .filter(|token| !self.stop_words.contains(token))
            .collect()
    }

    /// Classify every message in parallel and compare with its label.
    pub fn evaluate<C>(
        &self,
        classifier: &C,
        messages: &[Sms],
        alpha: Option<f64>,
    ) -> ClassifierResult<EvaluationReport>
    where
        C: Classifier<String> + Sync,
    {
        let outcomes = messages
            .par_iter()
            .map(|sms| self.predict(classifier, sms, alpha))
            .collect::<ClassifierResult<Vec<_>>>()?;

        let mut report = EvaluationReport::default();
        for outcome in outcomes {
            match outcome {
                None => report.skipped += 1,
                Some(prediction) if prediction.is_correct() => report.correct += 1,
                Some(prediction) => report.mispredictions.push(prediction),
            }
        }
        tracing::info!(
            correct = report.correct,
            wrong = report.wrong(),
            skipped = report.skipped,
            "evaluation complete"
        );
        Ok(report)
    }

    /// Best class for one message, `None` when no tokens remain.
    pub fn predict<C>(
        &self,
        classifier: &C,
        sms: &Sms,
        alpha: Option<f64>,
    ) -> ClassifierResult<Option<Prediction>>
    where
        C: Classifier<String>,
    {
        let tokens = self.filtered_tokens(sms);
        let Some(best) = classifier.classify(&tokens, alpha)? else {
            return Ok(None);
        };
        let estimated = if *best.class() == *self.spam.class() {
            MessageType::Spam
        } else {
            MessageType::Ham
        };
        tracing::trace!(
            actual = %sms.kind,
            %estimated,
            probability = best.probability(),
            "message classified"
        );
        Ok(Some(Prediction {
            message: sms.clone(),
            estimated,
            probability: best.probability(),
        }))
    }
}
