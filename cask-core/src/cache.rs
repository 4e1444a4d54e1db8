use crate::{ArgumentError, Fingerprint, Result};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::{
    fmt::{self, Display},
    str::FromStr,
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};
use tokio::time::Instant;

/// Expiry policy of cached results.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheMode {
    /// Caching disabled.
    #[default]
    None,
    /// Entries never expire.
    Permanent,
    /// Entries expire `interval` seconds after they were written.
    TimeSpan,
    /// Entries expire after being read `interval` times.
    RepeatedRequestLimit,
}

impl Display for CacheMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CacheMode::None => "none",
            CacheMode::Permanent => "permanent",
            CacheMode::TimeSpan => "timespan",
            CacheMode::RepeatedRequestLimit => "repeated",
        })
    }
}

impl FromStr for CacheMode {
    type Err = ArgumentError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(CacheMode::None),
            "permanent" => Ok(CacheMode::Permanent),
            "timespan" | "time_span" => Ok(CacheMode::TimeSpan),
            "repeated" | "repeated_request_limit" => Ok(CacheMode::RepeatedRequestLimit),
            _ => Err(ArgumentError::new(
                "mode",
                format!("unknown cache mode `{}`", s),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CachePolicy {
    mode: CacheMode,
    interval: u64,
}

/// One cached result with the policy it was written under.
pub struct CacheEntry<V> {
    value: V,
    mode: CacheMode,
    interval: u64,
    written: Instant,
    accesses: AtomicU64,
}

impl<V> CacheEntry<V> {
    fn new(value: V, policy: CachePolicy) -> Self {
        Self {
            value,
            mode: policy.mode,
            interval: policy.interval,
            written: Instant::now(),
            accesses: AtomicU64::new(0),
        }
    }

    pub fn value(&self) -> &V {
        &self.value
    }
    pub fn mode(&self) -> CacheMode {
        self.mode
    }
    pub fn interval(&self) -> u64 {
        self.interval
    }
    pub fn written(&self) -> Instant {
        self.written
    }
    pub fn access_count(&self) -> u64 {
        self.accesses.load(Ordering::Acquire)
    }

    /// Whether the entry is still valid at `now`, without counting an access.
    pub fn is_valid(&self, now: Instant) -> bool {
        match self.mode {
            CacheMode::None => false,
            CacheMode::Permanent => true,
            // An expiry past the clock's range never comes
            CacheMode::TimeSpan => self
                .written
                .checked_add(Duration::from_secs(self.interval))
                .is_none_or(|expiry| now <= expiry),
            CacheMode::RepeatedRequestLimit => self.access_count() < self.interval,
        }
    }

    /// Count a read, returns false (and counts nothing) when the entry has expired.
    fn hit(&self, now: Instant) -> bool {
        match self.mode {
            CacheMode::RepeatedRequestLimit => self
                .accesses
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                    (count < self.interval).then_some(count + 1)
                })
                .is_ok(),
            _ => {
                let valid = self.is_valid(now);
                if valid {
                    self.accesses.fetch_add(1, Ordering::AcqRel);
                }
                valid
            }
        }
    }
}

/// Fingerprint to result map with lazy expiry.
///
/// Expired entries are removed by the lookup that finds them, there is no
/// background sweeping. Reads count as accesses, which is what makes
/// [`CacheMode::RepeatedRequestLimit`] entries expire.
pub struct ResultCache<V> {
    policy: RwLock<CachePolicy>,
    entries: DashMap<Fingerprint, CacheEntry<V>>,
}

impl<V: Clone> ResultCache<V> {
    pub fn new() -> Self {
        Self {
            policy: RwLock::new(CachePolicy {
                mode: CacheMode::None,
                interval: 0,
            }),
            entries: DashMap::new(),
        }
    }

    /// Enable caching with `mode`.
    ///
    /// `interval` is a number of seconds for [`CacheMode::TimeSpan`] and a
    /// number of reads for [`CacheMode::RepeatedRequestLimit`], it is ignored
    /// by [`CacheMode::Permanent`]. Entries already cached keep the policy
    /// they were written with.
    pub fn activate(&self, mode: CacheMode, interval: Option<u64>) -> Result<()> {
        let interval = match (mode, interval) {
            (CacheMode::None, _) => {
                return Err(ArgumentError::new(
                    "mode",
                    "caching cannot be enabled with CacheMode::None",
                )
                .into());
            }
            (CacheMode::Permanent, _) => 0,
            (_, Some(interval)) if interval > 0 => interval,
            (mode, _) => {
                return Err(ArgumentError::new(
                    "interval",
                    format!("cache mode {} requires a positive interval", mode),
                )
                .into());
            }
        };
        *self.policy.write() = CachePolicy { mode, interval };
        log::debug!("Result caching enabled: {} (interval {})", mode, interval);
        Ok(())
    }

    /// Stop caching new results and drop the cached ones.
    pub fn deactivate(&self) {
        *self.policy.write() = CachePolicy {
            mode: CacheMode::None,
            interval: 0,
        };
        self.flush();
    }

    pub fn is_enabled(&self) -> bool {
        self.policy.read().mode != CacheMode::None
    }

    pub fn mode(&self) -> CacheMode {
        self.policy.read().mode
    }

    pub fn interval(&self) -> u64 {
        self.policy.read().interval
    }

    /// Cached value for `fingerprint`, if present and still valid.
    pub fn try_get(&self, fingerprint: &Fingerprint) -> Option<V> {
        let now = Instant::now();
        let hit = {
            let entry = self.entries.get(fingerprint)?;
            entry.hit(now).then(|| entry.value.clone())
        };
        if hit.is_none()
            && self
                .entries
                .remove_if(fingerprint, |_, entry| !entry.is_valid(now))
                .is_some()
        {
            log::debug!("Evicted expired cache entry {}", fingerprint);
        }
        hit
    }

    /// Store `value` under the current policy. Ignored while caching is disabled.
    pub fn put(&self, fingerprint: Fingerprint, value: V) {
        let policy = *self.policy.read();
        if policy.mode == CacheMode::None {
            return;
        }
        self.entries
            .insert(fingerprint, CacheEntry::new(value, policy));
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.entries.contains_key(fingerprint)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every cached entry, the policy is unchanged.
    pub fn flush(&self) {
        self.entries.clear();
    }
}

impl<V: Clone> Default for ResultCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for ResultCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultCache")
            .field("policy", &*self.policy.read())
            .field("entries", &self.entries.len())
            .finish()
    }
}
