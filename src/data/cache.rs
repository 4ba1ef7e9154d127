//! Single-slot time-to-live cache.
//!
//! Each data source fetch takes no arguments, so a cache is one value plus
//! the instant it was fetched. The owner decides when to call
//! [`TtlCache::get_or_refresh`]; nothing here is global.

use std::time::{Duration, Instant};

use crate::error::AppError;

#[derive(Debug)]
struct Entry<T> {
    value: T,
    fetched_at: Instant,
}

#[derive(Debug)]
pub struct TtlCache<T> {
    entry: Option<Entry<T>>,
    ttl: Duration,
}

impl<T> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self { entry: None, ttl }
    }

    /// Return the cached value, refreshing it first if missing or expired.
    pub fn get_or_refresh<F>(&mut self, fetch: F) -> Result<&T, AppError>
    where
        F: FnOnce() -> Result<T, AppError>,
    {
        self.get_or_refresh_at(Instant::now(), fetch)
    }

    /// Like [`get_or_refresh`](Self::get_or_refresh) with an explicit clock.
    ///
    /// A failed fetch keeps whatever was cached before, stale or not.
    pub fn get_or_refresh_at<F>(&mut self, now: Instant, fetch: F) -> Result<&T, AppError>
    where
        F: FnOnce() -> Result<T, AppError>,
    {
        let ttl = self.ttl;
        let entry = match self.entry.take() {
            Some(e) if now.saturating_duration_since(e.fetched_at) < ttl => e,
            previous => match fetch() {
                Ok(value) => {
                    tracing::debug!(ttl_secs = ttl.as_secs(), "cache refreshed");
                    Entry {
                        value,
                        fetched_at: now,
                    }
                }
                Err(err) => {
                    self.entry = previous;
                    return Err(err);
                }
            },
        };
        Ok(&self.entry.insert(entry).value)
    }

    /// Cached value regardless of age.
    pub fn peek(&self) -> Option<&T> {
        self.entry.as_ref().map(|e| &e.value)
    }

    pub fn fetched_at(&self) -> Option<Instant> {
        self.entry.as_ref().map(|e| e.fetched_at)
    }

    /// Drop the cached value so the next access refetches.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn fetches_once_within_ttl() {
        let calls = Cell::new(0);
        let mut cache = TtlCache::new(Duration::from_secs(900));
        let t0 = Instant::now();

        for offset in [0, 10, 899] {
            let v = cache
                .get_or_refresh_at(t0 + Duration::from_secs(offset), || {
                    calls.set(calls.get() + 1);
                    Ok(calls.get())
                })
                .unwrap();
            assert_eq!(*v, 1);
        }
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn refetches_after_expiry() {
        let mut cache = TtlCache::new(Duration::from_secs(60));
        let t0 = Instant::now();
        cache.get_or_refresh_at(t0, || Ok("old")).unwrap();
        let v = cache
            .get_or_refresh_at(t0 + Duration::from_secs(60), || Ok("new"))
            .unwrap();
        assert_eq!(*v, "new");
        assert_eq!(cache.fetched_at(), Some(t0 + Duration::from_secs(60)));
    }

    #[test]
    fn failed_refresh_keeps_previous_value() {
        let mut cache = TtlCache::new(Duration::from_secs(60));
        let t0 = Instant::now();
        cache.get_or_refresh_at(t0, || Ok(7)).unwrap();

        let err = cache
            .get_or_refresh_at(t0 + Duration::from_secs(120), || {
                Err(AppError::Fetch("offline".to_string()))
            })
            .unwrap_err();
        assert!(matches!(err, AppError::Fetch(_)));
        assert_eq!(cache.peek(), Some(&7));
        assert_eq!(cache.fetched_at(), Some(t0));
    }

    #[test]
    fn invalidate_forces_refetch() {
        let mut cache = TtlCache::new(Duration::from_secs(3600));
        cache.get_or_refresh(|| Ok(1)).unwrap();
        cache.invalidate();
        assert!(cache.peek().is_none());
        assert_eq!(*cache.get_or_refresh(|| Ok(2)).unwrap(), 2);
    }
}
