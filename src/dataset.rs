//! Per-class token occurrence store.
//!
//! A [`DataSet`] counts how often each token was seen in training documents of
//! one class and derives smoothed percentages from those counts. Counts live in
//! a sharded [`DashMap`], so several training threads may add, remove and purge
//! tokens on the same set without lost updates.
//!
//! # Consistency
//!
//! The aggregate `set_size` is a separate atomic counter updated right after
//! the map mutation it accounts for. A reader can therefore observe the map and
//! the counter at slightly different instants and see a transient mismatch
//! (e.g. a token already counted while `set_size` still lags by one). Such
//! windows close as soon as the in-flight mutation finishes; statistics read
//! during concurrent training are point-in-time approximations.
//!
//! # Thresholds and vocabulary
//!
//! Once registered with a [`TrainingSet`](crate::training::TrainingSet), the
//! occurrence threshold, percentage threshold and vocabulary size are taken
//! from it. A standalone set uses zero thresholds and its own distinct-token
//! count as vocabulary.

use std::borrow::Borrow;
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use dashmap::DashMap;

use crate::class::{Class, Token};
use crate::error::{ClassifierError, ClassifierResult, ensure_non_negative};
use crate::training::Registry;

// ── Value types ────────────────────────────────────────────────────────────

/// Smoothed percentage and thresholded occurrence of a token in one class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenStats {
    pub probability: f64,
    pub occurrence: u64,
}

/// A token together with its occurrence count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenCount<T> {
    pub token: T,
    pub count: u64,
}

/// Raw count and smoothed percentage of a token, without thresholds applied.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenInformation<T> {
    pub token: T,
    pub count: u64,
    pub percentage: f64,
}

// ── Capabilities ───────────────────────────────────────────────────────────

/// Read access to the statistics of one class.
///
/// Implemented by [`DataSet`] and by the [`EmptyDataSet`] placeholder used for
/// classes without training data.
pub trait DataSetAccess<T: Token>: Send + Sync {
    /// The class these statistics belong to.
    fn class(&self) -> &Class;

    /// Number of distinct tokens.
    fn token_count(&self) -> u64;

    /// Total number of token occurrences.
    fn set_size(&self) -> u64;

    /// Occurrences of `token`, or 0 if it is unseen or at or below the
    /// occurrence threshold.
    fn count(&self, token: &T) -> u64;

    /// Lidstone-smoothed percentage `(count + alpha) / (set_size + alpha * vocabulary)`.
    fn percentage(&self, token: &T, alpha: f64) -> ClassifierResult<f64>;

    /// Like [`percentage`](Self::percentage), bundled with the thresholded count.
    fn stats(&self, token: &T, alpha: f64) -> ClassifierResult<TokenStats>;
}

/// Mutation of token counts during training.
pub trait TokenRegistration<T: Token> {
    /// Record one occurrence of each token.
    fn register<I>(&self, tokens: I) -> ClassifierResult<()>
    where
        I: IntoIterator<Item = T>;

    /// Forget one occurrence of each token that is present.
    fn unregister_once<I>(&self, tokens: I) -> ClassifierResult<()>
    where
        I: IntoIterator,
        I::Item: Borrow<T>;

    /// Forget every occurrence of each token.
    fn purge<I>(&self, tokens: I) -> ClassifierResult<()>
    where
        I: IntoIterator,
        I::Item: Borrow<T>;
}

// ── DataSet ────────────────────────────────────────────────────────────────

/// Concurrent token counter for one class.
pub struct DataSet<T: Token> {
    class: Class,
    counts: DashMap<T, u64>,
    /// Signed so a reader racing a purge never sees a wrapped value.
    set_size: AtomicI64,
    owner: OnceLock<Weak<Registry<T>>>,
}

impl<T: Token> DataSet<T> {
    /// Create an empty, standalone data set for `class`.
    pub fn new(class: Class) -> Self {
        Self {
            class,
            counts: DashMap::new(),
            set_size: AtomicI64::new(0),
            owner: OnceLock::new(),
        }
    }

    pub fn class(&self) -> &Class {
        &self.class
    }

    /// Number of distinct tokens with a non-zero count.
    pub fn token_count(&self) -> u64 {
        self.counts.len() as u64
    }

    /// Sum of all token counts, including multiplicities.
    pub fn set_size(&self) -> u64 {
        self.set_size.load(Ordering::Acquire).max(0) as u64
    }

    /// Whether no token has been recorded.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    // ── Mutation ───────────────────────────────────────────────────────────

    /// Record one occurrence of `token`.
    pub fn add_token(&self, token: T) {
        // Size first, so a reader never sees a count ahead of the size.
        self.set_size.fetch_add(1, Ordering::AcqRel);
        *self.counts.entry(token).or_insert(0) += 1;
    }

    /// Record one occurrence of each token in order.
    ///
    /// Each token lands individually; concurrent readers may observe a prefix.
    pub fn add_tokens<I>(&self, tokens: I)
    where
        I: IntoIterator<Item = T>,
    {
        for token in tokens {
            self.add_token(token);
        }
    }

    /// Forget one occurrence of `token`.
    ///
    /// The entry is removed when its count reaches zero. Returns `false` if
    /// the token was not present.
    pub fn remove_token_once(&self, token: &T) -> bool {
        let mut decremented = false;
        self.counts.remove_if_mut(token, |_, count| {
            *count -= 1;
            decremented = true;
            *count == 0
        });
        if decremented {
            self.set_size.fetch_sub(1, Ordering::AcqRel);
        }
        decremented
    }

    /// Forget one occurrence of each token.
    pub fn remove_tokens_once<I>(&self, tokens: I)
    where
        I: IntoIterator,
        I::Item: Borrow<T>,
    {
        for token in tokens {
            self.remove_token_once(token.borrow());
        }
    }

    /// Remove `token` entirely. Returns the number of occurrences dropped.
    pub fn purge_token(&self, token: &T) -> u64 {
        match self.counts.remove(token) {
            Some((_, count)) => {
                self.set_size.fetch_sub(count as i64, Ordering::AcqRel);
                count
            }
            None => 0,
        }
    }

    /// Remove each token entirely.
    pub fn purge_tokens<I>(&self, tokens: I)
    where
        I: IntoIterator,
        I::Item: Borrow<T>,
    {
        for token in tokens {
            self.purge_token(token.borrow());
        }
    }

    /// Purge every token whose raw `(token, count)` snapshot matches `predicate`.
    ///
    /// Typical use is stop-word elimination or dropping tokens at or below a
    /// frequency cutoff. Returns the number of distinct tokens purged.
    pub fn purge_where<F>(&self, predicate: F) -> usize
    where
        F: Fn(&TokenCount<T>) -> bool,
    {
        let candidates: Vec<T> = self
            .counts
            .iter()
            .map(|entry| TokenCount {
                token: entry.key().clone(),
                count: *entry.value(),
            })
            .filter(|tc| predicate(tc))
            .map(|tc| tc.token)
            .collect();

        let purged = candidates.len();
        self.purge_tokens(candidates);
        tracing::debug!(class = %self.class, purged, "purged tokens by predicate");
        purged
    }

    /// Drop all tokens and reset the set size.
    pub fn clear(&self) {
        self.counts.clear();
        self.set_size.store(0, Ordering::Release);
    }

    // ── Statistics ─────────────────────────────────────────────────────────

    /// Occurrences of `token`, treating counts at or below the occurrence
    /// threshold as unseen.
    pub fn count(&self, token: &T) -> u64 {
        let count = self.raw_count(token);
        if count <= self.occurrence_threshold() {
            0
        } else {
            count
        }
    }

    /// Smoothed percentage of `token` in this class.
    ///
    /// Tokens whose unsmoothed percentage is at or below the percentage
    /// threshold are treated as unseen before smoothing. `alpha = 0` yields
    /// the maximum-likelihood estimate.
    pub fn percentage(&self, token: &T, alpha: f64) -> ClassifierResult<f64> {
        Ok(self.stats(token, alpha)?.probability)
    }

    /// Smoothed percentage together with the thresholded occurrence count.
    pub fn stats(&self, token: &T, alpha: f64) -> ClassifierResult<TokenStats> {
        let alpha = ensure_non_negative("smoothing alpha", alpha)?;
        let context = self.context();

        let mut count = self.raw_count(token);
        if count <= context.occurrence_threshold {
            count = 0;
        }

        let set_size = self.set_size();
        if count > 0
            && smoothed_percentage(count, 0.0, set_size, context.vocabulary_size)
                <= context.percentage_threshold
        {
            count = 0;
        }

        Ok(TokenStats {
            probability: smoothed_percentage(count, alpha, set_size, context.vocabulary_size),
            occurrence: count,
        })
    }

    /// Raw count and smoothed percentage of `token`, ignoring both thresholds.
    ///
    /// Unseen tokens report a percentage of 0 regardless of `alpha`.
    pub fn token_info(&self, token: &T, alpha: f64) -> ClassifierResult<TokenInformation<T>> {
        let alpha = ensure_non_negative("smoothing alpha", alpha)?;
        let count = self.raw_count(token);
        let percentage = if count == 0 {
            0.0
        } else {
            smoothed_percentage(count, alpha, self.set_size(), self.vocabulary_size())
        };
        Ok(TokenInformation {
            token: token.clone(),
            count,
            percentage,
        })
    }

    /// Snapshot of all tokens and their counts.
    ///
    /// Counts at or below the occurrence threshold are reported as 0. Not a
    /// consistent view under concurrent writes.
    pub fn token_counts(&self) -> Vec<TokenCount<T>> {
        let threshold = self.occurrence_threshold();
        self.counts
            .iter()
            .map(|entry| {
                let count = *entry.value();
                TokenCount {
                    token: entry.key().clone(),
                    count: if count <= threshold { 0 } else { count },
                }
            })
            .collect()
    }

    /// Occurrence threshold of the owning training set, or 0 when standalone.
    pub fn occurrence_threshold(&self) -> u64 {
        self.registry().map_or(0, |r| r.occurrence_threshold())
    }

    /// Percentage threshold of the owning training set, or 0 when standalone.
    pub fn percentage_threshold(&self) -> f64 {
        self.registry().map_or(0.0, |r| r.percentage_threshold())
    }

    /// Vocabulary size used as the smoothing denominator.
    pub fn vocabulary_size(&self) -> u64 {
        match self.registry() {
            Some(registry) => registry.vocabulary_size(),
            None => self.token_count(),
        }
    }

    // ── Internals ──────────────────────────────────────────────────────────

    fn raw_count(&self, token: &T) -> u64 {
        // Copy out so no shard guard is held while the registry is consulted.
        self.counts.get(token).map_or(0, |entry| *entry.value())
    }

    fn registry(&self) -> Option<Arc<Registry<T>>> {
        self.owner.get().and_then(Weak::upgrade)
    }

    fn context(&self) -> SetContext {
        match self.registry() {
            Some(registry) => SetContext {
                occurrence_threshold: registry.occurrence_threshold(),
                percentage_threshold: registry.percentage_threshold(),
                vocabulary_size: registry.vocabulary_size(),
            },
            None => SetContext {
                occurrence_threshold: 0,
                percentage_threshold: 0.0,
                vocabulary_size: self.token_count(),
            },
        }
    }

    /// Raise the count of `token` without touching the set size, leaving the
    /// set as a reader would see it halfway through a mutation.
    #[cfg(test)]
    pub(crate) fn bump_count_only(&self, token: T) {
        *self.counts.entry(token).or_insert(0) += 1;
    }

    pub(crate) fn is_attached(&self) -> bool {
        self.owner.get().is_some()
    }

    /// Link this set to its training set. Fails if it already has an owner.
    pub(crate) fn attach(&self, registry: Weak<Registry<T>>) -> ClassifierResult<()> {
        self.owner
            .set(registry)
            .map_err(|_| ClassifierError::AlreadyAttached {
                class: self.class.name().to_string(),
            })
    }
}

struct SetContext {
    occurrence_threshold: u64,
    percentage_threshold: f64,
    vocabulary_size: u64,
}

/// `(count + alpha) / (set_size + alpha * vocabulary_size)`, or 0 when the
/// denominator vanishes (empty set without smoothing).
///
/// Capped at 1: a count read during a concurrent purge can briefly exceed the
/// set size it is divided by.
pub(crate) fn smoothed_percentage(
    count: u64,
    alpha: f64,
    set_size: u64,
    vocabulary_size: u64,
) -> f64 {
    let denominator = set_size as f64 + alpha * vocabulary_size as f64;
    if denominator <= 0.0 {
        return 0.0;
    }
    ((count as f64 + alpha) / denominator).min(1.0)
}

impl<T: Token> fmt::Debug for DataSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataSet")
            .field("class", &self.class)
            .field("token_count", &self.token_count())
            .field("set_size", &self.set_size())
            .field("attached", &self.is_attached())
            .finish()
    }
}

impl<T: Token> DataSetAccess<T> for DataSet<T> {
    fn class(&self) -> &Class {
        &self.class
    }

    fn token_count(&self) -> u64 {
        DataSet::token_count(self)
    }

    fn set_size(&self) -> u64 {
        DataSet::set_size(self)
    }

    fn count(&self, token: &T) -> u64 {
        DataSet::count(self, token)
    }

    fn percentage(&self, token: &T, alpha: f64) -> ClassifierResult<f64> {
        DataSet::percentage(self, token, alpha)
    }

    fn stats(&self, token: &T, alpha: f64) -> ClassifierResult<TokenStats> {
        DataSet::stats(self, token, alpha)
    }
}

impl<T: Token> TokenRegistration<T> for DataSet<T> {
    fn register<I>(&self, tokens: I) -> ClassifierResult<()>
    where
        I: IntoIterator<Item = T>,
    {
        self.add_tokens(tokens);
        Ok(())
    }

    fn unregister_once<I>(&self, tokens: I) -> ClassifierResult<()>
    where
        I: IntoIterator,
        I::Item: Borrow<T>,
    {
        self.remove_tokens_once(tokens);
        Ok(())
    }

    fn purge<I>(&self, tokens: I) -> ClassifierResult<()>
    where
        I: IntoIterator,
        I::Item: Borrow<T>,
    {
        self.purge_tokens(tokens);
        Ok(())
    }
}

// ── EmptyDataSet ───────────────────────────────────────────────────────────

/// Read-only placeholder for a class without a registered data set.
///
/// Every statistic is zero and every mutation is rejected.
pub struct EmptyDataSet<T> {
    class: Class,
    _token: PhantomData<fn() -> T>,
}

impl<T> EmptyDataSet<T> {
    pub fn new(class: Class) -> Self {
        Self {
            class,
            _token: PhantomData,
        }
    }

    fn unsupported(&self, operation: &'static str) -> ClassifierError {
        ClassifierError::UnsupportedOperation {
            operation,
            class: self.class.name().to_string(),
        }
    }
}

impl<T> fmt::Debug for EmptyDataSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmptyDataSet")
            .field("class", &self.class)
            .finish()
    }
}

impl<T: Token> DataSetAccess<T> for EmptyDataSet<T> {
    fn class(&self) -> &Class {
        &self.class
    }

    fn token_count(&self) -> u64 {
        0
    }

    fn set_size(&self) -> u64 {
        0
    }

    fn count(&self, _token: &T) -> u64 {
        0
    }

    fn percentage(&self, _token: &T, alpha: f64) -> ClassifierResult<f64> {
        ensure_non_negative("smoothing alpha", alpha)?;
        Ok(0.0)
    }

    fn stats(&self, _token: &T, alpha: f64) -> ClassifierResult<TokenStats> {
        ensure_non_negative("smoothing alpha", alpha)?;
        Ok(TokenStats {
            probability: 0.0,
            occurrence: 0,
        })
    }
}

impl<T: Token> TokenRegistration<T> for EmptyDataSet<T> {
    fn register<I>(&self, _tokens: I) -> ClassifierResult<()>
    where
        I: IntoIterator<Item = T>,
    {
        Err(self.unsupported("register"))
    }

    fn unregister_once<I>(&self, _tokens: I) -> ClassifierResult<()>
    where
        I: IntoIterator,
        I::Item: Borrow<T>,
    {
        Err(self.unsupported("unregister_once"))
    }

    fn purge<I>(&self, _tokens: I) -> ClassifierResult<()>
    where
        I: IntoIterator,
        I::Item: Borrow<T>,
    {
        Err(self.unsupported("purge"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_set() -> DataSet<&'static str> {
        DataSet::new(Class::new("test", 1.0).unwrap())
    }

    #[test]
    fn new_set_is_empty() {
        let set = data_set();
        assert_eq!(set.class().name(), "test");
        assert_eq!(set.token_count(), 0);
        assert_eq!(set.set_size(), 0);
        assert!(set.is_empty());
    }

    #[test]
    fn adding_a_token_once() {
        let set = data_set();
        set.add_token("foo");
        assert_eq!(set.token_count(), 1);
        assert_eq!(set.set_size(), 1);
    }

    #[test]
    fn adding_the_same_token_twice() {
        let set = data_set();
        set.add_token("foo");
        set.add_token("foo");
        assert_eq!(set.token_count(), 1);
        assert_eq!(set.set_size(), 2);
        assert_eq!(set.count(&"foo"), 2);
    }

    #[test]
    fn adding_multiple_tokens_at_once() {
        let set = data_set();
        set.add_tokens(["foo", "foo", "bar"]);
        assert_eq!(set.token_count(), 2);
        assert_eq!(set.set_size(), 3);
    }

    #[test]
    fn removing_a_token_decrements() {
        let set = data_set();
        set.add_tokens(["foo", "bar"]);
        assert!(set.remove_token_once(&"foo"));
        assert_eq!(set.token_count(), 1);
        assert_eq!(set.set_size(), 1);

        assert!(set.remove_token_once(&"bar"));
        assert_eq!(set.token_count(), 0);
        assert_eq!(set.set_size(), 0);
    }

    #[test]
    fn removing_one_of_multiple_occurrences_keeps_the_entry() {
        let set = data_set();
        set.add_tokens(["foo", "foo"]);
        set.remove_token_once(&"foo");
        assert_eq!(set.token_count(), 1);
        assert_eq!(set.set_size(), 1);
        assert_eq!(set.count(&"foo"), 1);
    }

    #[test]
    fn removing_an_absent_token_is_a_no_op() {
        let set = data_set();
        set.add_token("foo");
        assert!(!set.remove_token_once(&"bar"));
        assert_eq!(set.set_size(), 1);
        assert_eq!(set.token_count(), 1);
    }

    #[test]
    fn add_then_remove_restores_previous_state() {
        let set = data_set();
        set.add_tokens(["a", "b", "b"]);
        let (size, distinct, count_b) = (set.set_size(), set.token_count(), set.count(&"b"));

        set.add_token("b");
        set.remove_token_once(&"b");
        assert_eq!(set.set_size(), size);
        assert_eq!(set.token_count(), distinct);
        assert_eq!(set.count(&"b"), count_b);

        set.add_token("c");
        set.remove_token_once(&"c");
        assert_eq!(set.set_size(), size);
        assert_eq!(set.token_count(), distinct);
    }

    #[test]
    fn purging_removes_all_occurrences() {
        let set = data_set();
        set.add_tokens(["foo", "foo", "bar"]);
        assert_eq!(set.purge_token(&"foo"), 2);
        assert_eq!(set.token_count(), 1);
        assert_eq!(set.set_size(), 1);
        assert_eq!(set.count(&"foo"), 0);
        assert_eq!(set.purge_token(&"foo"), 0);
    }

    #[test]
    fn purge_where_drops_rare_tokens() {
        let set = data_set();
        set.add_tokens(["common", "common", "common", "rare", "odd"]);
        let purged = set.purge_where(|tc| tc.count <= 1);
        assert_eq!(purged, 2);
        assert_eq!(set.token_count(), 1);
        assert_eq!(set.set_size(), 3);
        assert_eq!(set.count(&"rare"), 0);
    }

    #[test]
    fn clear_resets_everything() {
        let set = data_set();
        set.add_tokens(["a", "b", "b"]);
        set.clear();
        assert_eq!(set.token_count(), 0);
        assert_eq!(set.set_size(), 0);
    }

    #[test]
    fn token_counts_enumerates_each_distinct_token() {
        let set = data_set();
        set.add_tokens(["foo", "foo", "bar"]);
        let mut counts = set.token_counts();
        counts.sort_by_key(|tc| tc.token);
        assert_eq!(
            counts,
            vec![
                TokenCount { token: "bar", count: 1 },
                TokenCount { token: "foo", count: 2 },
            ]
        );
        assert_eq!(counts.iter().map(|tc| tc.count).sum::<u64>(), 3);
    }

    #[test]
    fn standalone_percentage_uses_own_vocabulary() {
        let set = data_set();
        set.add_tokens(["a", "a", "b", "c"]);
        // raw: 2 / 4
        assert!((set.percentage(&"a", 0.0).unwrap() - 0.5).abs() < 1e-12);
        // smoothed: (2 + 1) / (4 + 1 * 3)
        assert!((set.percentage(&"a", 1.0).unwrap() - 3.0 / 7.0).abs() < 1e-12);
        // unseen: (0 + 1) / 7
        assert!((set.percentage(&"z", 1.0).unwrap() - 1.0 / 7.0).abs() < 1e-12);
        assert_eq!(set.percentage(&"z", 0.0).unwrap(), 0.0);
    }

    #[test]
    fn empty_set_percentage_is_zero_without_smoothing() {
        let set = data_set();
        assert_eq!(set.percentage(&"a", 0.0).unwrap(), 0.0);
    }

    #[test]
    fn negative_alpha_is_rejected() {
        let set = data_set();
        set.add_token("a");
        assert!(matches!(
            set.percentage(&"a", -0.1),
            Err(ClassifierError::OutOfRange { .. })
        ));
        assert!(set.stats(&"a", f64::NAN).is_err());
        assert!(set.token_info(&"a", -1.0).is_err());
    }

    #[test]
    fn stats_bundle_percentage_and_occurrence() {
        let set = data_set();
        set.add_tokens(["a", "a", "b"]);
        let stats = set.stats(&"a", 0.0).unwrap();
        assert_eq!(stats.occurrence, 2);
        assert!((stats.probability - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn token_info_reports_raw_values() {
        let set = data_set();
        set.add_tokens(["a", "a", "b"]);
        let info = set.token_info(&"a", 0.0).unwrap();
        assert_eq!(info.count, 2);
        assert!((info.percentage - 2.0 / 3.0).abs() < 1e-12);

        let unseen = set.token_info(&"z", 1.0).unwrap();
        assert_eq!(unseen.count, 0);
        assert_eq!(unseen.percentage, 0.0);
    }

    #[test]
    fn smoothing_is_monotonic_for_unseen_tokens() {
        let set = data_set();
        set.add_tokens(["a", "b", "b", "c"]);
        let mut previous = 0.0;
        for alpha in [0.0, 0.01, 0.1, 0.5, 1.0, 2.0, 10.0] {
            let p = set.percentage(&"unseen", alpha).unwrap();
            assert!(p >= previous, "alpha={alpha}: {p} < {previous}");
            previous = p;
        }
    }

    #[test]
    fn smoothing_converges_to_raw_percentage() {
        let set = data_set();
        set.add_tokens(["a", "b", "b", "c"]);
        let raw = set.percentage(&"b", 0.0).unwrap();
        let tiny = set.percentage(&"b", 1e-9).unwrap();
        assert!((raw - tiny).abs() < 1e-6);
    }

    #[test]
    fn lagging_set_size_keeps_percentage_bounded() {
        let set = data_set();
        set.add_token("x");
        set.bump_count_only("x");
        assert_eq!(set.set_size(), 1);
        for alpha in [0.0, 0.01, 1.0] {
            let p = set.percentage(&"x", alpha).unwrap();
            assert!((0.0..=1.0).contains(&p), "alpha={alpha}: {p}");
        }
        assert_eq!(smoothed_percentage(5, 0.0, 2, 1), 1.0);
    }

    #[test]
    fn empty_data_set_reads_zero_and_rejects_mutation() {
        let empty: EmptyDataSet<&str> = EmptyDataSet::new(Class::new("none", 0.5).unwrap());
        assert_eq!(empty.token_count(), 0);
        assert_eq!(empty.set_size(), 0);
        assert_eq!(empty.count(&"a"), 0);
        assert_eq!(empty.percentage(&"a", 1.0).unwrap(), 0.0);
        assert_eq!(empty.stats(&"a", 1.0).unwrap().occurrence, 0);

        assert!(matches!(
            empty.register(["a"]),
            Err(ClassifierError::UnsupportedOperation { operation: "register", .. })
        ));
        assert!(empty.unregister_once(["a"]).is_err());
        assert!(empty.purge(["a"]).is_err());
    }

    #[test]
    fn registration_trait_delegates_to_the_set() {
        let set = data_set();
        set.register(["x", "y", "x"]).unwrap();
        set.unregister_once(["x"]).unwrap();
        assert_eq!(set.count(&"x"), 1);
        set.purge(["y"]).unwrap();
        assert_eq!(set.token_count(), 1);
        assert_eq!(set.set_size(), 1);
    }

    #[test]
    fn concurrent_adds_are_not_lost() {
        let set = Arc::new(DataSet::<String>::new(Class::new("c", 1.0).unwrap()));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let set = Arc::clone(&set);
                std::thread::spawn(move || {
                    for i in 0..500 {
                        set.add_token(format!("shared-{}", i % 10));
                        set.add_token(format!("own-{t}"));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(set.set_size(), 8 * 1000);
        assert_eq!(set.token_count(), 10 + 8);
        assert_eq!(set.count(&"shared-0".to_string()), 8 * 50);
        assert_eq!(set.count(&"own-3".to_string()), 500);
    }

    #[test]
    fn concurrent_add_and_remove_balance_out() {
        let set = Arc::new(DataSet::<u32>::new(Class::new("c", 1.0).unwrap()));
        set.add_tokens((0..100).flat_map(|t| std::iter::repeat_n(t, 8)));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let set = Arc::clone(&set);
                std::thread::spawn(move || {
                    for round in 0..200 {
                        let token = round % 100;
                        set.remove_token_once(&token);
                        set.add_token(token);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(set.set_size(), 800);
        assert_eq!(set.token_count(), 100);
        for token in 0..100 {
            assert_eq!(set.count(&token), 8);
        }
    }
}
