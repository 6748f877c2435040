//! Insertion-ordered accumulation maps and stable descending ranking.
//!
//! Rankings over usage breakdowns break ties by the order in which keys were
//! first seen, never alphabetically.

use std::cmp::Ordering;

use indexmap::IndexMap;
use serde::Serialize;

// ── Tally ─────────────────────────────────────────────────────────────────────

/// A name → value accumulator that iterates in first-insertion order.
///
/// Equality compares contents only: two tallies holding the same keys and
/// values are equal whatever order the keys were first seen in.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Tally<V> {
    entries: IndexMap<String, V>,
}

impl<V> Default for Tally<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Tally<V> {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Entries in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries sorted by `metric` descending. The sort is stable, so entries
    /// with equal metrics keep their insertion order.
    pub fn rank_by<M, F>(&self, metric: F) -> Vec<(&str, &V)>
    where
        M: PartialOrd,
        F: Fn(&V) -> M,
    {
        let mut ranked: Vec<(&str, &V)> = self.iter().collect();
        ranked.sort_by(|a, b| {
            metric(b.1)
                .partial_cmp(&metric(a.1))
                .unwrap_or(Ordering::Equal)
        });
        ranked
    }
}

impl<V: Default> Tally<V> {
    /// Mutable access to the value for `key`, inserting `V::default()` at the
    /// end of the order when the key is new.
    pub fn entry(&mut self, key: &str) -> &mut V {
        match self.entries.get_index_of(key) {
            Some(i) => &mut self.entries[i],
            None => self.entries.entry(key.to_string()).or_default(),
        }
    }
}

impl Tally<u64> {
    /// Add `amount` to the count for `key`.
    pub fn add(&mut self, key: &str, amount: u64) {
        let slot = self.entry(key);
        *slot = slot.saturating_add(amount);
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.entries
            .values()
            .fold(0u64, |acc, v| acc.saturating_add(*v))
    }

    /// Entries by count, highest first, ties in insertion order.
    pub fn ranked(&self) -> Vec<(&str, u64)> {
        self.rank_by(|v| *v)
            .into_iter()
            .map(|(k, v)| (k, *v))
            .collect()
    }
}

impl Tally<f64> {
    /// Add `amount` to the value for `key`.
    pub fn add(&mut self, key: &str, amount: f64) {
        *self.entry(key) += amount;
    }

    /// Entries by value, highest first, ties in insertion order.
    pub fn ranked(&self) -> Vec<(&str, f64)> {
        self.rank_by(|v| *v)
            .into_iter()
            .map(|(k, v)| (k, *v))
            .collect()
    }
}

impl<V> FromIterator<(String, V)> for Tally<V> {
    /// Later duplicates overwrite the value but keep the first position.
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
