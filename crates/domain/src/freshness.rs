//! Time-boxed cache bookkeeping
//!
//! Each fetchable payload has a cache key; the tracker records the wall-clock
//! time of the last successful fetch per key. A key is fresh while that stamp
//! is younger than the staleness window. Stamps are only written on success
//! and are never explicitly destroyed (process-lifetime state).

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use time::OffsetDateTime;

/// Default staleness window: 5 minutes.
pub const DEFAULT_STALENESS_WINDOW: Duration = Duration::from_secs(5 * 60);

/// Cache key for a fetchable payload
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// The cross-category article list
    All,
    /// A single category's article list
    Category(String),
    /// One article's detail record
    Detail { category: String, id: String },
}

impl CacheKey {
    pub fn category(name: impl Into<String>) -> Self {
        Self::Category(name.into())
    }

    pub fn detail(category: impl Into<String>, id: impl Into<String>) -> Self {
        Self::Detail {
            category: category.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Category(name) => write!(f, "{}", name),
            Self::Detail { category, id } => write!(f, "{}-{}", category, id),
        }
    }
}

/// Per-key last-fetch timestamps with a fixed staleness window
#[derive(Debug)]
pub struct FreshnessTracker {
    window: Duration,
    stamps: HashMap<CacheKey, OffsetDateTime>,
}

impl FreshnessTracker {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            stamps: HashMap::new(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Whether a successful fetch was ever recorded for `key`
    pub fn has_stamp(&self, key: &CacheKey) -> bool {
        self.stamps.contains_key(key)
    }

    /// Timestamp of the last successful fetch for `key`, if any
    pub fn last_fetch(&self, key: &CacheKey) -> Option<OffsetDateTime> {
        self.stamps.get(key).copied()
    }

    /// Whether `key` was fetched within the staleness window of `now`
    pub fn is_fresh(&self, key: &CacheKey, now: OffsetDateTime) -> bool {
        self.stamps
            .get(key)
            .is_some_and(|stamp| now - *stamp < self.window)
    }

    /// Record a successful fetch at `now`, overwriting any prior stamp
    pub fn mark(&mut self, key: CacheKey, now: OffsetDateTime) {
        self.stamps.insert(key, now);
    }
}

impl Default for FreshnessTracker {
    fn default() -> Self {
        Self::new(DEFAULT_STALENESS_WINDOW)
    }
}
