//! In-memory set of known job URLs
//!
//! The set is seeded from the store once per crawl and only ever grows. It is
//! shared between page tasks in concurrent mode, so every operation goes
//! through a single mutex and the check-then-add step is one critical section.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

/// Concurrency-safe set of job URLs
#[derive(Debug, Default)]
pub struct DedupSet {
    urls: Mutex<HashSet<String>>,
}

impl DedupSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds every URL from `urls`, typically the store's existing rows
    pub fn seed<I, S>(&self, urls: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = self.lock();
        set.extend(urls.into_iter().map(Into::into));
    }

    /// Returns true if `url` is already known
    pub fn contains(&self, url: &str) -> bool {
        self.lock().contains(url)
    }

    /// Records `url` as known
    pub fn add(&self, url: &str) {
        self.lock().insert(url.to_string());
    }

    /// Atomically adds `url` if absent
    ///
    /// Returns true when the caller is the first to see this URL and owns
    /// its insertion; false when another page already claimed it.
    pub fn insert_if_absent(&self, url: &str) -> bool {
        let mut set = self.lock();
        if set.contains(url) {
            false
        } else {
            set.insert(url.to_string())
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic while holding the lock cannot leave the set half-updated:
    // every mutation is a single HashSet call.
    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.urls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_seed_and_contains() {
        let set = DedupSet::new();
        set.seed(vec!["https://jobs.ge/en/?view=jobs&id=1", "https://jobs.ge/en/?view=jobs&id=2"]);

        assert_eq!(set.len(), 2);
        assert!(set.contains("https://jobs.ge/en/?view=jobs&id=1"));
        assert!(!set.contains("https://jobs.ge/en/?view=jobs&id=3"));
    }

    #[test]
    fn test_seed_collapses_duplicates() {
        let set = DedupSet::new();
        set.seed(vec!["a".to_string(), "a".to_string(), "b".to_string()]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_add_is_idempotent() {
        let set = DedupSet::new();
        set.add("a");
        set.add("a");
        assert_eq!(set.len(), 1);
        assert!(!set.is_empty());
    }

    #[test]
    fn test_insert_if_absent() {
        let set = DedupSet::new();
        assert!(set.insert_if_absent("a"));
        assert!(!set.insert_if_absent("a"));
        assert!(set.contains("a"));
    }

    #[test]
    fn test_concurrent_claims_have_one_winner() {
        let set = Arc::new(DedupSet::new());
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let set = Arc::clone(&set);
                thread::spawn(move || set.insert_if_absent("https://jobs.ge/shared"))
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();

        assert_eq!(winners, 1);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_never_shrinks() {
        let set = DedupSet::new();
        set.seed(vec!["a"]);
        set.add("b");
        set.seed(Vec::<String>::new());
        assert_eq!(set.len(), 2);
    }
}
