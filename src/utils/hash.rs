// src/utils/hash.rs
//! Content hashing for snapshot change detection
//!
//! A cheap equality proxy, not a content comparison: two snapshots with the
//! same digest are treated as unchanged. Collision odds at 64 bits are
//! negligible for this workload, and a collision merely suppresses one diff.

use std::hash::Hasher;
use twox_hash::XxHash64;

/// Fixed seed so digests are stable within a process run
const HASH_SEED: u64 = 0x70_61_67_65;

/// Compute the content digest of a snapshot text
pub fn content_hash(text: &str) -> u64 {
    let mut hasher = XxHash64::with_seed(HASH_SEED);
    hasher.write(text.as_bytes());
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_text_same_hash() {
        assert_eq!(content_hash("hello"), content_hash("hello"));
        assert_eq!(content_hash(""), content_hash(""));
    }

    #[test]
    fn test_different_text_different_hash() {
        assert_ne!(content_hash("page A"), content_hash("page B"));
        assert_ne!(content_hash("a"), content_hash("a "));
    }

    #[test]
    fn test_stable_within_run() {
        let text = "line 1\nline 2\nline 3";
        let first = content_hash(text);
        for _ in 0..10 {
            assert_eq!(content_hash(text), first);
        }
    }
}
