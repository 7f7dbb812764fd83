//! Row retrieval for table previews.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::clock::Delay;
use crate::endpoint::DataSource;
use crate::error::{MigrateError, Result};
use crate::record::Record;

/// Reads a table's current rows from a connected data source.
#[derive(Clone)]
pub struct RowService {
    delay: Arc<dyn Delay>,
    latency: Duration,
}

impl RowService {
    pub fn new(delay: Arc<dyn Delay>, latency: Duration) -> Self {
        Self { delay, latency }
    }

    /// Fetch all rows of `table`, in stored order.
    ///
    /// A table the data source does not hold yields an empty vector, so
    /// callers can preview speculatively. Fetching from a data source
    /// that was never connected fails with
    /// [`MigrateError::ConnectionRejected`].
    pub async fn fetch_rows(&self, data_source: &DataSource, table: &str) -> Result<Vec<Record>> {
        if !data_source.is_connected().await {
            return Err(MigrateError::rejected(
                data_source.endpoint(),
                "not connected; connect before requesting rows",
            ));
        }

        self.delay.sleep(self.latency).await?;

        let rows = data_source.snapshot(table).await;
        debug!("{}.{}: fetched {} rows", data_source.endpoint(), table, rows.len());
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogService;
    use crate::clock::NoDelay;
    use crate::endpoint::Endpoint;

    fn source() -> DataSource {
        DataSource::new(
            Endpoint::Source,
            vec![(
                "users".to_string(),
                vec![
                    Record::new().with("id", 1).with("username", "admin"),
                    Record::new().with("id", 2).with("username", "user1"),
                ],
            )],
        )
    }

    async fn connected(ds: DataSource) -> DataSource {
        CatalogService::new(Arc::new(NoDelay), Duration::ZERO)
            .list_tables(&ds, "postgres://h/db")
            .await
            .unwrap();
        ds
    }

    fn service() -> RowService {
        RowService::new(Arc::new(NoDelay), Duration::ZERO)
    }

    #[tokio::test]
    async fn test_fetch_rows_in_order() {
        let ds = connected(source()).await;
        let rows = service().fetch_rows(&ds, "users").await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("username"), Some(&serde_json::Value::from("admin")));
        assert_eq!(rows[1].get("username"), Some(&serde_json::Value::from("user1")));
    }

    #[tokio::test]
    async fn test_unknown_table_yields_empty() {
        let ds = connected(source()).await;
        let rows = service().fetch_rows(&ds, "no_such_table").await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_unconnected_source_is_rejected() {
        let ds = source();
        let err = service().fetch_rows(&ds, "users").await.unwrap_err();
        assert!(matches!(
            err,
            MigrateError::ConnectionRejected {
                endpoint: Endpoint::Source,
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_waits_for_latency() {
        let ds = connected(source()).await;
        let svc = RowService::new(Arc::new(crate::clock::TokioDelay), Duration::from_millis(1000));
        let start = tokio::time::Instant::now();
        svc.fetch_rows(&ds, "users").await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(1000));
    }
}
