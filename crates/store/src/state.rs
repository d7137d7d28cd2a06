//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use clementine_policy::PolicyEngine;

use crate::config::StoreConfig;
use crate::db::PgRoleSource;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections, configuration, and the
/// policy engine.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StoreConfig,
    pool: PgPool,
    policy: PolicyEngine<PgRoleSource>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The policy engine gets its own handle on the pool so role lookups
    /// run with service credentials, independent of any caller.
    #[must_use]
    pub fn new(config: StoreConfig, pool: PgPool) -> Self {
        let policy = PolicyEngine::new(
            PgRoleSource::new(pool.clone()),
            config.image_bucket.clone(),
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                policy,
            }),
        }
    }

    /// Get a reference to the store configuration.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the policy engine.
    #[must_use]
    pub fn policy(&self) -> &PolicyEngine<PgRoleSource> {
        &self.inner.policy
    }
}
