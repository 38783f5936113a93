//! Result cache keyed by a quantized frame signature.

use std::collections::{HashMap, VecDeque};

use oxboard_gesture_model::{GestureResult, HandResult, ScreenSize, TimestampMs};

/// Quantized signature of the usable hands and screen size of a frame, plus
/// the confidence threshold the results were gated at.
///
/// Coordinates are rounded to thousandths, confidences and the threshold to
/// hundredths, so frames that differ only by sub-pixel noise share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(Vec<i64>);

impl CacheKey {
    pub fn for_frame(hands: &[HandResult], screen: &ScreenSize, threshold: f64) -> Self {
        let mut parts = Vec::with_capacity(3 + hands.len() * 45);
        parts.push((threshold * 100.0).round() as i64);
        parts.push(screen.width.round() as i64);
        parts.push(screen.height.round() as i64);
        for hand in hands.iter().filter(|h| h.is_usable()) {
            parts.push(hand.handedness.index() as i64);
            parts.push((hand.confidence * 100.0).round() as i64);
            for p in &hand.landmarks {
                parts.push((p.x * 1000.0).round() as i64);
                parts.push((p.y * 1000.0).round() as i64);
            }
        }
        Self(parts)
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    results: Vec<GestureResult>,
}

/// Bounded cache of emitted gestures. The oldest entry is evicted first.
#[derive(Debug, Clone)]
pub struct ResultCache {
    capacity: usize,
    entries: HashMap<CacheKey, CacheEntry>,
    order: VecDeque<CacheKey>,
    hits: u64,
    misses: u64,
}

impl ResultCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Look up a frame. Hits are re-stamped with `timestamp_ms`.
    pub fn get(&mut self, key: &CacheKey, timestamp_ms: TimestampMs) -> Option<Vec<GestureResult>> {
        match self.entries.get(key) {
            Some(entry) => {
                self.hits += 1;
                Some(
                    entry
                        .results
                        .iter()
                        .cloned()
                        .map(|mut r| {
                            r.timestamp_ms = timestamp_ms;
                            r
                        })
                        .collect(),
                )
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, key: CacheKey, results: Vec<GestureResult>) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.contains_key(&key) {
            self.order.retain(|k| k != &key);
        }
        while self.entries.len() >= self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
        }
        self.order.push_back(key.clone());
        self.entries.insert(key, CacheEntry { results });
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Hits over lookups, 0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop all entries and counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.hits = 0;
        self.misses = 0;
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(64)
    }
}
