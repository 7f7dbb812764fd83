//! Migration session - the two endpoints plus the services that act on them.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use crate::catalog::CatalogService;
use crate::clock::{Delay, TokioDelay};
use crate::config::Config;
use crate::connection;
use crate::endpoint::{DataSource, Endpoint};
use crate::error::Result;
use crate::migration::{MigrationEngine, MigrationPhase, MigrationResult};
use crate::record::Record;
use crate::rows::RowService;

/// Owns one `source` and one `target` data source for the lifetime of a
/// session, and routes the catalog, row and migration operations to them.
///
/// Each session builds fresh data sources from its [`Config`], so two
/// sessions never observe each other's writes.
pub struct MigrationSession {
    source: Arc<DataSource>,
    target: Arc<DataSource>,
    catalog: CatalogService,
    rows: RowService,
    engine: MigrationEngine,
}

impl MigrationSession {
    /// Create a session that waits out the configured latencies for real.
    pub fn new(config: &Config) -> Self {
        Self::with_delay(config, Arc::new(TokioDelay))
    }

    /// Create a session with an explicit delay implementation.
    pub fn with_delay(config: &Config, delay: Arc<dyn Delay>) -> Self {
        let source = Arc::new(DataSource::from_config(Endpoint::Source, &config.source));
        let target = Arc::new(DataSource::from_config(Endpoint::Target, &config.target));
        let latency = config.latency;

        Self {
            catalog: CatalogService::new(delay.clone(), latency.connect()),
            rows: RowService::new(delay.clone(), latency.fetch()),
            engine: MigrationEngine::new(source.clone(), target.clone(), delay, latency.record()),
            source,
            target,
        }
    }

    /// The data source behind an endpoint.
    pub fn data_source(&self, endpoint: Endpoint) -> &Arc<DataSource> {
        match endpoint {
            Endpoint::Source => &self.source,
            Endpoint::Target => &self.target,
        }
    }

    pub async fn is_connected(&self, endpoint: Endpoint) -> bool {
        self.data_source(endpoint).is_connected().await
    }

    /// Validate `descriptor`, connect `endpoint` with it and return the
    /// endpoint's tables.
    ///
    /// Validation failures surface as [`EmptyConnection`] or
    /// [`UnsupportedScheme`] and leave the endpoint unconnected.
    ///
    /// [`EmptyConnection`]: crate::MigrateError::EmptyConnection
    /// [`UnsupportedScheme`]: crate::MigrateError::UnsupportedScheme
    pub async fn connect(&self, endpoint: Endpoint, descriptor: &str) -> Result<Vec<String>> {
        let validated = connection::validate(descriptor)?;
        info!("Connecting {} ({})", endpoint, validated);
        self.catalog
            .list_tables(self.data_source(endpoint), validated.as_str())
            .await
    }

    /// Rows of `table` on `endpoint`; empty for tables the endpoint lacks.
    pub async fn preview(&self, endpoint: Endpoint, table: &str) -> Result<Vec<Record>> {
        self.rows.fetch_rows(self.data_source(endpoint), table).await
    }

    /// Copy `source_table` over `target_table`. See [`MigrationEngine::migrate`].
    pub async fn migrate<F>(
        &self,
        source_table: &str,
        target_table: &str,
        on_progress: F,
    ) -> Result<MigrationResult>
    where
        F: FnMut(u8) + Send,
    {
        self.engine
            .migrate(source_table, target_table, on_progress)
            .await
    }

    /// Watch the migration engine's phase.
    pub fn subscribe_phase(&self) -> watch::Receiver<MigrationPhase> {
        self.engine.subscribe()
    }
}
