//! Cached read access to site settings.
//!
//! Settings change rarely and are read on every page render, so the full
//! list is cached for 60 seconds. A stale read after an admin edit is
//! acceptable; a store read per request is not.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use nonna_rues_core::Setting;
use nonna_rues_db::SettingsRepository;

/// How long a cached settings read stays fresh.
const SETTINGS_TTL: Duration = Duration::from_secs(60);

/// Single cache entry key: the whole settings list is one value.
const CACHE_KEY: &str = "settings";

/// Site-wide presentation fields rendered on every page.
#[derive(Debug, Clone)]
pub struct SiteChrome {
    pub site_title: String,
    pub site_description: String,
    pub footer_text: String,
    pub primary_color: String,
    pub secondary_color: String,
}

/// Settings reader with a short-lived cache in front of the store.
#[derive(Clone)]
pub struct SettingsService {
    repo: SettingsRepository,
    cache: Cache<&'static str, Arc<Vec<Setting>>>,
}

impl SettingsService {
    #[must_use]
    pub fn new(repo: SettingsRepository) -> Self {
        let cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(SETTINGS_TTL)
            .build();
        Self { repo, cache }
    }

    /// All settings, served from cache when fresh.
    pub async fn all(&self) -> Arc<Vec<Setting>> {
        let repo = self.repo.clone();
        self.cache
            .get_with(CACHE_KEY, async move { Arc::new(repo.all().await) })
            .await
    }

    /// One setting's text value, or the fallback when absent or non-text.
    pub async fn text(&self, key: &str, fallback: &str) -> String {
        self.all()
            .await
            .iter()
            .find(|s| s.key == key)
            .and_then(|s| s.value.as_text())
            .map_or_else(|| fallback.to_owned(), ToOwned::to_owned)
    }

    /// The fields every page's header and footer need.
    pub async fn chrome(&self) -> SiteChrome {
        let settings = self.all().await;
        let text = |key: &str, fallback: &str| {
            settings
                .iter()
                .find(|s| s.key == key)
                .and_then(|s| s.value.as_text())
                .map_or_else(|| fallback.to_owned(), ToOwned::to_owned)
        };

        SiteChrome {
            site_title: text("site_title", "Nonna & Rue's"),
            site_description: text("site_description", ""),
            footer_text: text("footer_text", ""),
            primary_color: text("primary_color", "#8B9D83"),
            secondary_color: text("secondary_color", "#4A3D3D"),
        }
    }

    /// Drop the cached list so the next read hits the store.
    pub fn invalidate(&self) {
        self.cache.invalidate_all();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use nonna_rues_core::SettingValue;
    use nonna_rues_db::{Database, test_support::temp_data_dir};

    use super::*;

    #[tokio::test]
    async fn chrome_reads_seeded_defaults() {
        let db = Database::open(&temp_data_dir()).await.unwrap();
        db.settings.init_defaults().await.unwrap();

        let service = SettingsService::new(db.settings.clone());
        let chrome = service.chrome().await;
        assert_eq!(chrome.site_title, "Nonna & Rue's");
        assert_eq!(chrome.primary_color, "#8B9D83");
    }

    #[tokio::test]
    async fn cached_reads_survive_until_invalidated() {
        let db = Database::open(&temp_data_dir()).await.unwrap();
        db.settings.init_defaults().await.unwrap();
        let service = SettingsService::new(db.settings.clone());

        // Warm the cache, then edit behind its back.
        assert_eq!(service.text("site_title", "?").await, "Nonna & Rue's");
        db.settings
            .update_value("site_title", SettingValue::Text("Rue's Annex".into()))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(service.text("site_title", "?").await, "Nonna & Rue's");
        service.invalidate();
        assert_eq!(service.text("site_title", "?").await, "Rue's Annex");
    }

    #[tokio::test]
    async fn missing_key_falls_back() {
        let db = Database::open(&temp_data_dir()).await.unwrap();
        let service = SettingsService::new(db.settings.clone());
        assert_eq!(service.text("no_such_key", "fallback").await, "fallback");
    }
}
