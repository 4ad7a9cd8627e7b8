//! Application state shared across handlers.

use std::sync::Arc;

use nonna_rues_db::Database;

use crate::config::StorefrontConfig;
use crate::services::payment::SimulatedGateway;
use crate::services::settings::SettingsService;
use crate::services::submission::SubmissionLocks;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the document store and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    db: Database,
    settings: SettingsService,
    gateway: SimulatedGateway,
    submissions: SubmissionLocks,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig, db: Database) -> Self {
        let settings = SettingsService::new(db.settings.clone());
        let gateway = SimulatedGateway::new(config.gateway_delay);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                db,
                settings,
                gateway,
                submissions: SubmissionLocks::new(),
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the document store.
    #[must_use]
    pub fn db(&self) -> &Database {
        &self.inner.db
    }

    /// Get a reference to the cached settings service.
    #[must_use]
    pub fn settings(&self) -> &SettingsService {
        &self.inner.settings
    }

    /// Get a reference to the simulated payment gateway.
    #[must_use]
    pub fn gateway(&self) -> &SimulatedGateway {
        &self.inner.gateway
    }

    /// Get a reference to the in-flight submission registry.
    #[must_use]
    pub fn submissions(&self) -> &SubmissionLocks {
        &self.inner.submissions
    }
}
