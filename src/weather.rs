//! Pluggable environment data with an explicit-TTL cache.
//!
//! The solver never fetches weather itself. Callers implement
//! [`EnvironmentSource`] over whatever provider they use and wrap it in
//! [`CachedEnvironmentSource`] to avoid refetching for nearby positions.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use log::{debug, trace};

use crate::atmosphere::Environment;
use crate::error::BallisticsError;

/// Anything that can produce an atmospheric snapshot for a position.
pub trait EnvironmentSource {
    fn environment_at(&self, latitude_deg: f64, longitude_deg: f64) -> Result<Environment, BallisticsError>;
}

/// Time source for cache expiry
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Fixed snapshot, e.g. manually entered conditions.
impl EnvironmentSource for Environment {
    fn environment_at(&self, _latitude_deg: f64, _longitude_deg: f64) -> Result<Environment, BallisticsError> {
        Ok(*self)
    }
}

/// Lat/lon rounded to two decimals (~1 km)
type CacheKey = (i64, i64);

fn cache_key(latitude_deg: f64, longitude_deg: f64) -> CacheKey {
    (
        (latitude_deg * 100.0).round() as i64,
        (longitude_deg * 100.0).round() as i64,
    )
}

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    environment: Environment,
    fetched_at: Instant,
}

/// Caches another source's snapshots until `ttl` elapses.
pub struct CachedEnvironmentSource<S, C = SystemClock> {
    inner: S,
    clock: C,
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl<S: EnvironmentSource> CachedEnvironmentSource<S, SystemClock> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self::with_clock(inner, ttl, SystemClock)
    }
}

impl<S: EnvironmentSource, C: Clock> CachedEnvironmentSource<S, C> {
    pub fn with_clock(inner: S, ttl: Duration, clock: C) -> Self {
        Self {
            inner,
            clock,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Drop every cached snapshot.
    pub fn clear(&self) {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S: EnvironmentSource, C: Clock> EnvironmentSource for CachedEnvironmentSource<S, C> {
    fn environment_at(&self, latitude_deg: f64, longitude_deg: f64) -> Result<Environment, BallisticsError> {
        if !latitude_deg.is_finite() || !longitude_deg.is_finite() {
            return Err(BallisticsError::EnvironmentSource(format!(
                "non-finite position ({latitude_deg}, {longitude_deg})"
            )));
        }

        let key = cache_key(latitude_deg, longitude_deg);
        let now = self.clock.now();

        if let Some(entry) = self.entries.lock().unwrap_or_else(PoisonError::into_inner).get(&key) {
            if now.saturating_duration_since(entry.fetched_at) < self.ttl {
                trace!("environment cache hit for {key:?}");
                return Ok(entry.environment);
            }
        }

        // Not held across the fetch; concurrent misses may both fetch
        let environment = self.inner.environment_at(latitude_deg, longitude_deg)?;
        debug!("environment cache refreshed for {key:?}");
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.retain(|_, entry| now.saturating_duration_since(entry.fetched_at) < self.ttl);
        entries.insert(key, CacheEntry { environment, fetched_at: now });
        Ok(environment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ManualClock {
        now: Mutex<Instant>,
    }

    impl ManualClock {
        fn new() -> Self {
            Self { now: Mutex::new(Instant::now()) }
        }

        fn advance(&self, by: Duration) {
            *self.now.lock().unwrap() += by;
        }
    }

    impl Clock for &ManualClock {
        fn now(&self) -> Instant {
            *self.now.lock().unwrap()
        }
    }

    #[derive(Default)]
    struct CountingSource {
        calls: AtomicUsize,
    }

    impl EnvironmentSource for &CountingSource {
        fn environment_at(&self, latitude_deg: f64, _longitude_deg: f64) -> Result<Environment, BallisticsError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if latitude_deg > 89.0 {
                return Err(BallisticsError::EnvironmentSource("provider unavailable".into()));
            }
            Ok(Environment::new(10.0 + n as f64, 1000.0, 50.0))
        }
    }

    #[test]
    fn test_serves_cached_until_ttl() {
        let clock = ManualClock::new();
        let source = CountingSource::default();
        let cache = CachedEnvironmentSource::with_clock(&source, Duration::from_secs(600), &clock);

        let first = cache.environment_at(47.61, -122.33).unwrap();
        clock.advance(Duration::from_secs(599));
        let second = cache.environment_at(47.61, -122.33).unwrap();
        assert_eq!(first, second);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        clock.advance(Duration::from_secs(1));
        let third = cache.environment_at(47.61, -122.33).unwrap();
        assert_ne!(first, third);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_nearby_positions_share_entry() {
        let clock = ManualClock::new();
        let source = CountingSource::default();
        let cache = CachedEnvironmentSource::with_clock(&source, Duration::from_secs(60), &clock);

        cache.environment_at(47.6101, -122.3299).unwrap();
        cache.environment_at(47.6149, -122.3251).unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        cache.environment_at(47.70, -122.33).unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_expired_entries_are_evicted_on_insert() {
        let clock = ManualClock::new();
        let source = CountingSource::default();
        let cache = CachedEnvironmentSource::with_clock(&source, Duration::from_secs(60), &clock);

        cache.environment_at(47.61, -122.33).unwrap();
        cache.environment_at(40.71, -74.01).unwrap();
        assert_eq!(cache.len(), 2);

        clock.advance(Duration::from_secs(30));
        cache.environment_at(51.51, -0.13).unwrap();
        assert_eq!(cache.len(), 3);

        // The first two are now stale; the third is still fresh
        clock.advance(Duration::from_secs(45));
        cache.environment_at(35.68, 139.69).unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let clock = ManualClock::new();
        let source = CountingSource::default();
        let cache = CachedEnvironmentSource::with_clock(&source, Duration::from_secs(60), &clock);

        assert!(cache.environment_at(89.5, 0.0).is_err());
        assert!(cache.environment_at(89.5, 0.0).is_err());
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_rejects_non_finite_position() {
        let source = CountingSource::default();
        let cache = CachedEnvironmentSource::new(&source, Duration::from_secs(60));
        let err = cache.environment_at(f64::NAN, 0.0).unwrap_err();
        assert!(matches!(err, BallisticsError::EnvironmentSource(_)));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_clear() {
        let source = CountingSource::default();
        let cache = CachedEnvironmentSource::new(&source, Duration::from_secs(60));
        cache.environment_at(1.0, 2.0).unwrap();
        cache.clear();
        cache.environment_at(1.0, 2.0).unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_fixed_environment_source() {
        let env = Environment::icao_at_altitude(1200.0, 40.0);
        assert_eq!(env.environment_at(10.0, 20.0).unwrap(), env);
    }
}
