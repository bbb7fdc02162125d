//! Deduplication of session rows
//!
//! The same session can appear in several export files, or once as running
//! and again after it was stopped. We keep the completed row when there is
//! one, and the row with the latest end otherwise.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::core::types::Session;

/// Trait for rows that can be deduplicated
pub(crate) trait Deduplicatable {
    fn dedup_id(&self) -> &str;
    fn is_completed(&self) -> bool;
    /// Ordering key among candidates of the same kind; later wins
    fn recency(&self) -> Option<DateTime<Utc>>;
}

impl Deduplicatable for Session {
    fn dedup_id(&self) -> &str {
        &self.id
    }

    fn is_completed(&self) -> bool {
        !self.is_running && self.end_time.is_some()
    }

    fn recency(&self) -> Option<DateTime<Utc>> {
        self.end_time.or(self.created_at).or(Some(self.start_time))
    }
}

/// Best candidate seen so far for one id
#[derive(Debug, Clone)]
struct CandidateState<T> {
    completed: Option<T>,
    latest: T,
}

impl<T: Deduplicatable + Clone> CandidateState<T> {
    fn new(entry: T) -> Self {
        let completed = entry.is_completed().then(|| entry.clone());
        Self {
            completed,
            latest: entry,
        }
    }

    fn update(&mut self, entry: T) {
        if entry.is_completed() {
            match &self.completed {
                Some(existing) if entry.recency() <= existing.recency() => {}
                _ => self.completed = Some(entry.clone()),
            }
        }

        if entry.recency() > self.latest.recency() {
            self.latest = entry;
        }
    }

    fn merge(&mut self, other: CandidateState<T>) {
        let CandidateState { completed, latest } = other;
        if let Some(entry) = completed {
            self.update(entry);
        }
        self.update(latest);
    }

    fn finalize(self) -> T {
        self.completed.unwrap_or(self.latest)
    }
}

/// Incremental dedup accumulator for parallel loading.
#[derive(Debug, Clone)]
pub(crate) struct DedupAccumulator<T> {
    by_id: HashMap<String, CandidateState<T>>,
    total: i64,
}

impl<T> Default for DedupAccumulator<T> {
    fn default() -> Self {
        Self {
            by_id: HashMap::new(),
            total: 0,
        }
    }
}

impl<T: Deduplicatable + Clone> DedupAccumulator<T> {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, entry: T) {
        self.total += 1;
        match self.by_id.get_mut(entry.dedup_id()) {
            Some(state) => state.update(entry),
            None => {
                self.by_id
                    .insert(entry.dedup_id().to_string(), CandidateState::new(entry));
            }
        }
    }

    pub(crate) fn extend<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = T>,
    {
        for entry in entries {
            self.push(entry);
        }
    }

    pub(crate) fn merge(&mut self, other: DedupAccumulator<T>) {
        self.total += other.total;
        for (id, state) in other.by_id {
            match self.by_id.get_mut(&id) {
                Some(existing) => existing.merge(state),
                None => {
                    self.by_id.insert(id, state);
                }
            }
        }
    }

    /// Returns (unique entries, duplicates dropped)
    pub(crate) fn finalize(self) -> (Vec<T>, i64) {
        let unique = self.by_id.len() as i64;
        let skipped = (self.total - unique).max(0);
        let result = self.by_id.into_values().map(|s| s.finalize()).collect();
        (result, skipped)
    }
}

#[cfg(test)]
pub(crate) fn deduplicate<T, I>(entries: I) -> (Vec<T>, i64)
where
    T: Deduplicatable + Clone,
    I: IntoIterator<Item = T>,
{
    let mut accumulator = DedupAccumulator::new();
    accumulator.extend(entries);
    accumulator.finalize()
}
