//! Configuration type definitions and the built-in demo environment.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::clock::Latency;
use crate::record::Record;

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Simulated latency per operation kind.
    #[serde(default)]
    pub latency: Latency,

    /// Source endpoint catalog and rows.
    pub source: EndpointConfig,

    /// Target endpoint catalog and rows.
    pub target: EndpointConfig,
}

impl Default for Config {
    /// The demo environment: a populated source and an empty target.
    fn default() -> Self {
        Self {
            latency: Latency::default(),
            source: EndpointConfig {
                tables: vec![
                    TableConfig::with_rows("dummy_table", dummy_rows()),
                    TableConfig::with_rows("users", user_rows()),
                    TableConfig::with_rows("products", product_rows()),
                    TableConfig::empty("orders"),
                    TableConfig::empty("customers"),
                    TableConfig::empty("transactions"),
                ],
            },
            target: EndpointConfig {
                tables: vec![
                    TableConfig::empty("dummy_table"),
                    TableConfig::empty("profiles"),
                    TableConfig::empty("auth"),
                    TableConfig::empty("settings"),
                ],
            },
        }
    }
}

/// Tables exposed by one endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Tables in catalog display order.
    #[serde(default)]
    pub tables: Vec<TableConfig>,
}

/// A single table and its initial rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Table name, unique within the endpoint.
    pub name: String,

    /// Initial rows (default: none).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<Record>,
}

impl TableConfig {
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    pub fn with_rows(name: impl Into<String>, rows: Vec<Record>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}

fn records(values: Vec<serde_json::Value>) -> Vec<Record> {
    values
        .into_iter()
        .filter_map(|v| match v {
            serde_json::Value::Object(map) => Some(Record::from(map)),
            _ => None,
        })
        .collect()
}

fn dummy_rows() -> Vec<Record> {
    records(vec![
        json!({ "id": 1, "name": "John Doe", "email": "john@example.com" }),
        json!({ "id": 2, "name": "Jane Smith", "email": "jane@example.com" }),
        json!({ "id": 3, "name": "Alex Johnson", "email": "alex@example.com" }),
        json!({ "id": 4, "name": "Sarah Williams", "email": "sarah@example.com" }),
        json!({ "id": 5, "name": "Michael Brown", "email": "michael@example.com" }),
    ])
}

fn user_rows() -> Vec<Record> {
    records(vec![
        json!({ "id": 1, "username": "admin", "role": "administrator", "created_at": "2023-01-15" }),
        json!({ "id": 2, "username": "user1", "role": "editor", "created_at": "2023-02-20" }),
        json!({ "id": 3, "username": "user2", "role": "viewer", "created_at": "2023-03-05" }),
    ])
}

fn product_rows() -> Vec<Record> {
    records(vec![
        json!({ "id": 101, "name": "Laptop", "price": 999, "category": "Electronics" }),
        json!({ "id": 102, "name": "Desk Chair", "price": 199, "category": "Furniture" }),
        json!({ "id": 103, "name": "Coffee Mug", "price": 15, "category": "Kitchen" }),
    ])
}
