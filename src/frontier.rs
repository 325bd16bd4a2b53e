//! Crawl state: the frontier of pending words plus the words already classified.

use std::collections::{HashSet, VecDeque};

/// Where a known word currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordStatus {
    /// Discovered, not fetched yet.
    Pending,
    /// Fetched and extracted.
    Completed,
    /// Fetched, the source has no entry for it.
    Unresolved,
}

/// Counts produced when a fetched document's words are merged into the frontier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Candidate words extracted from the document.
    pub discovered: usize,
    /// Candidates that were new and joined the frontier.
    pub enqueued: usize,
}

impl MergeStats {
    /// Candidates skipped because they were already known.
    pub fn duplicates(&self) -> usize {
        self.discovered - self.enqueued
    }
}

/// The three disjoint word sets of a crawl.
///
/// Pending words are handed out in FIFO order, which makes the traversal
/// breadth-first and reproducible: newly discovered words join the back, a
/// word returned after an interrupted fetch goes to the front. The in-flight
/// word between [`FrontierState::next_pending`] and its classification is in
/// none of the sets.
#[derive(Debug, Clone, Default)]
pub struct FrontierState {
    queue: VecDeque<String>,
    pending: HashSet<String>,
    completed: HashSet<String>,
    unresolved: HashSet<String>,
}

impl FrontierState {
    /// Creates an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a state from persisted sets.
    ///
    /// Overlaps are resolved towards the more final classification: a
    /// completed word wins over an unresolved one, and classified words are
    /// dropped from the frontier. Pending order follows the iterator.
    pub fn from_parts<P, C, U>(pending: P, completed: C, unresolved: U) -> Self
    where
        P: IntoIterator<Item = String>,
        C: IntoIterator<Item = String>,
        U: IntoIterator<Item = String>,
    {
        let completed: HashSet<String> = completed.into_iter().collect();
        let unresolved: HashSet<String> = unresolved
            .into_iter()
            .filter(|word| !completed.contains(word))
            .collect();
        let mut state = Self {
            completed,
            unresolved,
            ..Self::default()
        };
        for word in pending {
            state.enqueue(word);
        }
        state
    }

    /// True when no word has been discovered at all.
    pub fn is_fresh(&self) -> bool {
        self.pending.is_empty() && self.completed.is_empty() && self.unresolved.is_empty()
    }

    /// Adds the seed word, but only to a fresh state. Returns whether it was added.
    pub fn seed_if_fresh(&mut self, seed: &str) -> bool {
        if !self.is_fresh() || seed.is_empty() {
            return false;
        }
        self.enqueue(seed.to_string())
    }

    /// Number of words waiting to be fetched.
    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }

    /// Number of fetched words with an entry.
    pub fn completed_len(&self) -> usize {
        self.completed.len()
    }

    /// Number of fetched words without an entry.
    pub fn unresolved_len(&self) -> usize {
        self.unresolved.len()
    }

    /// Number of words ever discovered (the union of the three sets).
    pub fn known_len(&self) -> usize {
        self.pending_len() + self.completed_len() + self.unresolved_len()
    }

    /// Pending words in the order they will be fetched.
    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.queue.iter().map(String::as_str)
    }

    /// Completed words.
    pub fn completed(&self) -> &HashSet<String> {
        &self.completed
    }

    /// Unresolved words.
    pub fn unresolved(&self) -> &HashSet<String> {
        &self.unresolved
    }

    /// Reports which set holds `word`, if any.
    pub fn status(&self, word: &str) -> Option<WordStatus> {
        if self.pending.contains(word) {
            Some(WordStatus::Pending)
        } else if self.completed.contains(word) {
            Some(WordStatus::Completed)
        } else if self.unresolved.contains(word) {
            Some(WordStatus::Unresolved)
        } else {
            None
        }
    }

    /// Takes the next word off the frontier.
    pub fn next_pending(&mut self) -> Option<String> {
        let word = self.queue.pop_front()?;
        self.pending.remove(&word);
        Some(word)
    }

    /// Puts an in-flight word back at the front of the frontier.
    ///
    /// A word that is already known anywhere is left alone, so a restore can
    /// never duplicate or reclassify a word.
    pub fn restore(&mut self, word: String) -> bool {
        if self.status(&word).is_some() {
            return false;
        }
        self.pending.insert(word.clone());
        self.queue.push_front(word);
        true
    }

    /// Classifies `word` as completed and queues every discovered word that
    /// is not known yet.
    pub fn mark_completed<I>(&mut self, word: String, discovered: I) -> MergeStats
    where
        I: IntoIterator<Item = String>,
    {
        self.remove_pending(&word);
        self.unresolved.remove(&word);
        self.completed.insert(word);

        let mut stats = MergeStats::default();
        for candidate in discovered {
            stats.discovered += 1;
            if self.enqueue(candidate) {
                stats.enqueued += 1;
            }
        }
        stats
    }

    /// Classifies `word` as having no entry.
    pub fn mark_unresolved(&mut self, word: String) {
        self.remove_pending(&word);
        if !self.completed.contains(&word) {
            self.unresolved.insert(word);
        }
    }

    /// Checks that the three sets are pairwise disjoint and the queue mirrors
    /// the pending set.
    pub fn is_consistent(&self) -> bool {
        self.queue.len() == self.pending.len()
            && self.queue.iter().all(|word| self.pending.contains(word))
            && self.pending.is_disjoint(&self.completed)
            && self.pending.is_disjoint(&self.unresolved)
            && self.completed.is_disjoint(&self.unresolved)
    }

    fn enqueue(&mut self, word: String) -> bool {
        if word.is_empty() || self.status(&word).is_some() {
            return false;
        }
        self.pending.insert(word.clone());
        self.queue.push_back(word);
        true
    }

    fn remove_pending(&mut self, word: &str) {
        if self.pending.remove(word) {
            self.queue.retain(|queued| queued != word);
        }
    }
}
