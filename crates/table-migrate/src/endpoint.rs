//! The two logical endpoints and the per-endpoint data they own.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::config::EndpointConfig;
use crate::connection::ConnectionDescriptor;
use crate::record::Record;

/// Which side of a migration a data source sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Source,
    Target,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Source => "source",
            Endpoint::Target => "target",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection currently held by a data source.
#[derive(Debug, Clone)]
pub struct ActiveConnection {
    /// The validated connection string.
    pub descriptor: ConnectionDescriptor,

    /// When the connection was established.
    pub connected_at: DateTime<Utc>,
}

/// One endpoint's catalog, row store and connection state.
///
/// Each instance owns its storage; nothing is shared between sessions.
/// The catalog is fixed at construction. Row contents change only through
/// the migration engine's commit step.
#[derive(Debug)]
pub struct DataSource {
    endpoint: Endpoint,
    catalog: Vec<String>,
    rows: RwLock<HashMap<String, Vec<Record>>>,
    connection: RwLock<Option<ActiveConnection>>,
}

impl DataSource {
    /// Create a data source from `(table, rows)` pairs. Iteration order
    /// becomes catalog display order.
    pub fn new<I>(endpoint: Endpoint, tables: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<Record>)>,
    {
        let mut catalog = Vec::new();
        let mut rows = HashMap::new();
        for (name, table_rows) in tables {
            catalog.push(name.clone());
            rows.insert(name, table_rows);
        }
        Self {
            endpoint,
            catalog,
            rows: RwLock::new(rows),
            connection: RwLock::new(None),
        }
    }

    /// Create a data source from its configuration section.
    pub fn from_config(endpoint: Endpoint, config: &EndpointConfig) -> Self {
        Self::new(
            endpoint,
            config
                .tables
                .iter()
                .map(|t| (t.name.clone(), t.rows.clone())),
        )
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    /// Table names in display order.
    pub fn catalog(&self) -> &[String] {
        &self.catalog
    }

    /// Current connection, if any.
    pub async fn connection(&self) -> Option<ActiveConnection> {
        self.connection.read().await.clone()
    }

    pub async fn is_connected(&self) -> bool {
        self.connection.read().await.is_some()
    }

    /// Record an established connection, replacing any previous one.
    pub(crate) async fn mark_connected(&self, descriptor: ConnectionDescriptor) {
        *self.connection.write().await = Some(ActiveConnection {
            descriptor,
            connected_at: Utc::now(),
        });
    }

    /// Copy of a table's rows; empty when the table is not in the row store.
    pub(crate) async fn snapshot(&self, table: &str) -> Vec<Record> {
        self.rows
            .read()
            .await
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Replace a table's entire row set.
    pub(crate) async fn replace_rows(&self, table: &str, rows: Vec<Record>) {
        self.rows.write().await.insert(table.to_string(), rows);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection;

    fn sample() -> DataSource {
        DataSource::new(
            Endpoint::Source,
            vec![
                ("users".to_string(), vec![Record::new().with("id", 1)]),
                ("orders".to_string(), Vec::new()),
            ],
        )
    }

    #[test]
    fn test_catalog_keeps_insertion_order() {
        assert_eq!(sample().catalog(), ["users", "orders"]);
    }

    #[test]
    fn test_endpoint_display() {
        assert_eq!(Endpoint::Source.to_string(), "source");
        assert_eq!(Endpoint::Target.to_string(), "target");
    }

    #[tokio::test]
    async fn test_starts_unconnected() {
        let ds = sample();
        assert!(!ds.is_connected().await);
        assert!(ds.connection().await.is_none());
    }

    #[tokio::test]
    async fn test_mark_connected_replaces_previous() {
        let ds = sample();
        ds.mark_connected(connection::validate("postgres://a@h/one").unwrap())
            .await;
        ds.mark_connected(connection::validate("postgres://b@h/two").unwrap())
            .await;
        let active = ds.connection().await.unwrap();
        assert_eq!(active.descriptor.as_str(), "postgres://b@h/two");
    }

    #[tokio::test]
    async fn test_snapshot_of_unknown_table_is_empty() {
        let ds = sample();
        assert!(ds.snapshot("missing").await.is_empty());
        assert_eq!(ds.snapshot("users").await.len(), 1);
    }

    #[tokio::test]
    async fn test_replace_rows_overwrites() {
        let ds = sample();
        ds.replace_rows("users", vec![Record::new().with("id", 7), Record::new().with("id", 8)])
            .await;
        let rows = ds.snapshot("users").await;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("id"), Some(&serde_json::Value::from(7)));
    }
}
