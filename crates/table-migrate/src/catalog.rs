//! Table catalog retrieval.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::clock::Delay;
use crate::connection;
use crate::endpoint::DataSource;
use crate::error::{MigrateError, Result};

/// Connects a data source and reports the tables it exposes.
///
/// The returned table set is whatever the data source was built with; it
/// is stable across calls and is not refreshed.
#[derive(Clone)]
pub struct CatalogService {
    delay: Arc<dyn Delay>,
    latency: Duration,
}

impl CatalogService {
    pub fn new(delay: Arc<dyn Delay>, latency: Duration) -> Self {
        Self { delay, latency }
    }

    /// Connect `data_source` with `descriptor` and list its tables.
    ///
    /// The descriptor is expected to have passed [`connection::validate`]
    /// already; an invalid one is still caught here and reported as
    /// [`MigrateError::ConnectionRejected`], leaving the data source
    /// unconnected.
    pub async fn list_tables(&self, data_source: &DataSource, descriptor: &str) -> Result<Vec<String>> {
        let endpoint = data_source.endpoint();
        let descriptor = connection::validate(descriptor).map_err(|e| {
            warn!("Rejected {} connection: {}", endpoint, e);
            MigrateError::rejected(endpoint, e.to_string())
        })?;

        self.delay.sleep(self.latency).await?;

        info!("Connected {} to {}", endpoint, descriptor);
        data_source.mark_connected(descriptor).await;

        let tables = data_source.catalog().to_vec();
        info!("{}: {} tables available", endpoint, tables.len());
        Ok(tables)
    }
}
