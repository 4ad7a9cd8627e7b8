//! Site settings repository.

use std::sync::Arc;

use nonna_rues_core::{Setting, SettingValue, default_settings};

use crate::{DbError, JsonCollection};

/// Key/value site settings with typed values.
#[derive(Clone, Debug)]
pub struct SettingsRepository {
    collection: Arc<JsonCollection<Setting>>,
}

impl SettingsRepository {
    pub(crate) fn new(collection: Arc<JsonCollection<Setting>>) -> Self {
        Self { collection }
    }

    /// Every setting, sorted by group then label (the admin form order).
    pub async fn all(&self) -> Vec<Setting> {
        self.collection
            .read(|docs| {
                let mut settings = docs.to_vec();
                settings.sort_by(|a, b| {
                    a.group.cmp(&b.group).then_with(|| a.label.cmp(&b.label))
                });
                settings
            })
            .await
    }

    /// Look up one setting by key.
    pub async fn get(&self, key: &str) -> Option<Setting> {
        self.collection
            .read(|docs| docs.iter().find(|s| s.key == key).cloned())
            .await
    }

    /// Number of stored settings.
    pub async fn count(&self) -> usize {
        self.collection.read(<[Setting]>::len).await
    }

    /// Replace a setting's value. Returns `None` when the key is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] when the collection cannot be persisted.
    pub async fn update_value(
        &self,
        key: &str,
        value: SettingValue,
    ) -> Result<Option<Setting>, DbError> {
        self.collection
            .mutate(|docs| {
                let setting = docs.iter_mut().find(|s| s.key == key)?;
                setting.value = value;
                setting.updated_at = Some(chrono::Utc::now());
                Some(setting.clone())
            })
            .await
    }

    /// Seed any default settings that are not yet present.
    ///
    /// Existing values are never overwritten; returns how many defaults
    /// were inserted.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] when the collection cannot be persisted.
    pub async fn init_defaults(&self) -> Result<usize, DbError> {
        self.collection
            .mutate(|docs| {
                let mut inserted = 0;
                for default in default_settings() {
                    if !docs.iter().any(|s| s.key == default.key) {
                        docs.push(default);
                        inserted += 1;
                    }
                }
                inserted
            })
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::Database;
    use crate::test_support::temp_data_dir;

    use super::*;

    #[tokio::test]
    async fn init_defaults_is_idempotent_and_preserves_edits() {
        let db = Database::open(&temp_data_dir()).await.unwrap();

        let inserted = db.settings.init_defaults().await.unwrap();
        assert!(inserted > 0);
        assert_eq!(db.settings.count().await, inserted);

        // Edit one value, then re-init: nothing new, edit intact.
        db.settings
            .update_value("site_title", SettingValue::Text("Rue's Annex".into()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(db.settings.init_defaults().await.unwrap(), 0);

        let title = db.settings.get("site_title").await.unwrap();
        assert_eq!(title.value.as_text(), Some("Rue's Annex"));
    }

    #[tokio::test]
    async fn all_sorts_by_group_then_label() {
        let db = Database::open(&temp_data_dir()).await.unwrap();
        db.settings.init_defaults().await.unwrap();

        let settings = db.settings.all().await;
        let pairs: Vec<(&str, &str)> = settings
            .iter()
            .map(|s| (s.group.as_str(), s.label.as_str()))
            .collect();
        let mut sorted = pairs.clone();
        sorted.sort_unstable();
        assert_eq!(pairs, sorted);
    }

    #[tokio::test]
    async fn update_value_on_unknown_key_is_none() {
        let db = Database::open(&temp_data_dir()).await.unwrap();
        let result = db
            .settings
            .update_value("nope", SettingValue::Boolean(true))
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
