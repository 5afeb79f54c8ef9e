use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use tracing::debug;

use crate::models::Breed;
use crate::utils::format_age;

use super::PrefsStore;

/// Preferences namespace holding the breed cache
const NAMESPACE: &str = "dog_breeds_cache";

const KEY_BREEDS: &str = "breeds";
const KEY_CACHE_TIME: &str = "cache_time";

/// Cached breed lists expire after 24 hours.
pub const CACHE_EXPIRATION_MS: i64 = 24 * 60 * 60 * 1000;

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Persisted copy of the most recently fetched breed list.
///
/// Reads never fail: expired or unreadable entries are cleared and reported
/// as a miss.
pub struct BreedCache {
    store: PrefsStore,
}

impl BreedCache {
    pub fn new(cache_dir: &Path) -> Result<Self> {
        Ok(Self {
            store: PrefsStore::open(cache_dir, NAMESPACE)?,
        })
    }

    /// The cached breeds, if present and written within the last 24 hours
    pub fn get(&self) -> Option<Vec<Breed>> {
        self.get_at(now_millis())
    }

    fn get_at(&self, now_ms: i64) -> Option<Vec<Breed>> {
        let json = self.store.get_string(KEY_BREEDS)?;
        let cache_time = self.store.get_i64(KEY_CACHE_TIME).unwrap_or(0);

        if now_ms - cache_time > CACHE_EXPIRATION_MS {
            debug!(cache_time, "Breed cache expired");
            self.clear_quietly();
            return None;
        }

        match serde_json::from_str::<Vec<Breed>>(&json) {
            Ok(breeds) => {
                debug!(count = breeds.len(), "Breed cache hit");
                Some(breeds)
            }
            Err(e) => {
                debug!(error = %e, "Failed to parse cached breeds");
                self.clear_quietly();
                None
            }
        }
    }

    /// Overwrite the cached list and stamp it with the current time
    pub fn put(&self, breeds: &[Breed]) -> Result<()> {
        self.put_at(breeds, now_millis())
    }

    fn put_at(&self, breeds: &[Breed], now_ms: i64) -> Result<()> {
        let json = serde_json::to_string(breeds)?;
        self.store
            .edit()
            .put_string(KEY_BREEDS, json)
            .put_i64(KEY_CACHE_TIME, now_ms)
            .apply()
    }

    pub fn clear(&self) -> Result<()> {
        self.store
            .edit()
            .remove(KEY_BREEDS)
            .remove(KEY_CACHE_TIME)
            .apply()
    }

    fn clear_quietly(&self) {
        if let Err(e) = self.clear() {
            debug!(error = %e, "Failed to clear breed cache");
        }
    }

    /// When the cached list was written, if there is one
    pub fn cached_at(&self) -> Option<DateTime<Utc>> {
        if !self.store.contains(KEY_BREEDS) {
            return None;
        }
        let millis = self.store.get_i64(KEY_CACHE_TIME)?;
        Utc.timestamp_millis_opt(millis).single()
    }

    /// Human-readable cache age for the status bar
    pub fn age_display(&self) -> Option<String> {
        self.cached_at()
            .map(|at| format_age((Utc::now() - at).num_minutes()))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_breeds() -> Vec<Breed> {
        vec![
            Breed::new("whippet"),
            Breed::with_sub_breeds("bulldog", vec!["english".to_string(), "french".to_string()]),
            Breed::new("akita"),
        ]
    }

    #[test]
    fn test_put_then_get_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let cache = BreedCache::new(dir.path()).unwrap();
        cache.put(&sample_breeds()).unwrap();

        assert_eq!(cache.get(), Some(sample_breeds()));
    }

    #[test]
    fn test_empty_cache_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = BreedCache::new(dir.path()).unwrap();
        assert_eq!(cache.get(), None);
        assert!(cache.cached_at().is_none());
        assert!(cache.age_display().is_none());
    }

    #[test]
    fn test_entry_at_exactly_24_hours_is_valid() {
        let dir = tempfile::tempdir().unwrap();
        let cache = BreedCache::new(dir.path()).unwrap();
        cache.put_at(&sample_breeds(), 1_000).unwrap();

        assert!(cache.get_at(1_000 + CACHE_EXPIRATION_MS).is_some());
    }

    #[test]
    fn test_expired_entry_is_cleared() {
        let dir = tempfile::tempdir().unwrap();
        let cache = BreedCache::new(dir.path()).unwrap();
        cache.put_at(&sample_breeds(), 1_000).unwrap();

        assert_eq!(cache.get_at(1_000 + CACHE_EXPIRATION_MS + 1), None);
        assert!(!cache.store.contains(KEY_BREEDS));
        assert!(!cache.store.contains(KEY_CACHE_TIME));
    }

    #[test]
    fn test_entry_older_than_a_day_is_never_returned() {
        let dir = tempfile::tempdir().unwrap();
        let cache = BreedCache::new(dir.path()).unwrap();
        let two_days_ago = now_millis() - 2 * CACHE_EXPIRATION_MS;
        cache.put_at(&sample_breeds(), two_days_ago).unwrap();

        assert_eq!(cache.get(), None);
        // Cleared as a side effect, so a later read is also a miss
        assert!(cache.cached_at().is_none());
    }

    #[test]
    fn test_corrupt_entry_is_cleared() {
        let dir = tempfile::tempdir().unwrap();
        let cache = BreedCache::new(dir.path()).unwrap();
        cache
            .store
            .edit()
            .put_string(KEY_BREEDS, r#"[{"name":"pug"}]"#)
            .put_i64(KEY_CACHE_TIME, now_millis())
            .apply()
            .unwrap();

        assert_eq!(cache.get(), None);
        assert!(!cache.store.contains(KEY_BREEDS));
    }

    #[test]
    fn test_missing_timestamp_counts_as_expired() {
        let dir = tempfile::tempdir().unwrap();
        let cache = BreedCache::new(dir.path()).unwrap();
        cache
            .store
            .edit()
            .put_string(KEY_BREEDS, "[]")
            .apply()
            .unwrap();

        assert_eq!(cache.get(), None);
    }

    #[test]
    fn test_clear_and_persistence() {
        let dir = tempfile::tempdir().unwrap();
        {
            let cache = BreedCache::new(dir.path()).unwrap();
            cache.put(&sample_breeds()).unwrap();
        }

        let cache = BreedCache::new(dir.path()).unwrap();
        assert_eq!(cache.get().map(|b| b.len()), Some(3));
        assert_eq!(cache.age_display().as_deref(), Some("just now"));

        cache.clear().unwrap();
        assert_eq!(cache.get(), None);
    }

    #[test]
    fn test_serialized_format() {
        let dir = tempfile::tempdir().unwrap();
        let cache = BreedCache::new(dir.path()).unwrap();
        cache.put(&sample_breeds()[..2]).unwrap();

        assert_eq!(
            cache.store.get_string(KEY_BREEDS).unwrap(),
            r#"[{"name":"whippet","subBreeds":[]},{"name":"bulldog","subBreeds":["english","french"]}]"#
        );
    }
}
