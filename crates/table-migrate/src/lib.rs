//! # table-migrate
//!
//! Core of a two-endpoint table migration tool. A session holds a `source`
//! and a `target` data source and provides:
//!
//! - **Connection validation** for postgres-family connection strings
//! - **Catalog listing** of each endpoint's tables
//! - **Row previews** of any table
//! - **Whole-table migration** from a source table to a target table with
//!   per-record progress reporting
//!
//! Latency of the simulated backend is injected through [`Delay`], so tests
//! run instantly while interactive use keeps realistic timing.
//!
//! ## Example
//!
//! ```rust,no_run
//! use table_migrate::{Config, Endpoint, MigrationSession};
//!
//! #[tokio::main]
//! async fn main() -> table_migrate::Result<()> {
//!     let session = MigrationSession::new(&Config::default());
//!     session.connect(Endpoint::Source, "postgres://u:p@source/db").await?;
//!     session.connect(Endpoint::Target, "postgres://u:p@target/db").await?;
//!     let result = session
//!         .migrate("dummy_table", "dummy_table", |p| println!("{}%", p))
//!         .await?;
//!     println!("Migrated {} records", result.records_count);
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod clock;
pub mod config;
pub mod connection;
pub mod endpoint;
pub mod error;
pub mod migration;
pub mod record;
pub mod rows;
pub mod session;

// Re-exports for convenient access
pub use catalog::CatalogService;
pub use clock::{Delay, Latency, NoDelay, TokioDelay};
pub use config::{Config, EndpointConfig, TableConfig};
pub use connection::{validate as validate_connection, ConnectionDescriptor};
pub use endpoint::{ActiveConnection, DataSource, Endpoint};
pub use error::{MigrateError, Result};
pub use migration::{progress_percent, MigrationEngine, MigrationPhase, MigrationResult};
pub use record::Record;
pub use rows::RowService;
pub use session::MigrationSession;
