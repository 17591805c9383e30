//! Entity id assignment.

use crate::error::Result;
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of unique entity ids.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> Result<u64>;
}

/// Monotonic in-process sequence starting at 1.
#[derive(Debug)]
pub struct SequenceIdGenerator {
    next: AtomicU64,
}

impl SequenceIdGenerator {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }
}

impl Default for SequenceIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequenceIdGenerator {
    fn next_id(&self) -> Result<u64> {
        Ok(self.next.fetch_add(1, Ordering::SeqCst))
    }
}

/// Ids persisted by sled; unique across restarts of the same database.
impl IdGenerator for sled::Db {
    fn next_id(&self) -> Result<u64> {
        // sled ids start at 0; keep 0 free so it never names a real entity.
        Ok(self.generate_id()? + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_sequence() {
        let ids = SequenceIdGenerator::new();
        assert_eq!(ids.next_id().unwrap(), 1);
        assert_eq!(ids.next_id().unwrap(), 2);
    }

    #[test]
    fn test_concurrent_ids_unique() {
        let ids = Arc::new(SequenceIdGenerator::starting_at(100));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ids = Arc::clone(&ids);
                thread::spawn(move || {
                    (0..250)
                        .map(|_| ids.next_id().unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id));
            }
        }
        assert_eq!(seen.len(), 1000);
    }

    #[test]
    fn test_sled_ids_nonzero() {
        let db = sled::Config::new().temporary(true).open().unwrap();
        let first = db.next_id().unwrap();
        assert!(first > 0);
        assert!(db.next_id().unwrap() > first);
    }
}
