//! Whole-table migration with per-record progress.
//!
//! One call walks `Idle -> Validating -> Copying(i/total) -> Committing -> Done`,
//! or ends in `Failed`. The target table is written once, in the commit
//! step, so a call that fails part-way leaves the target untouched.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::clock::Delay;
use crate::endpoint::DataSource;
use crate::error::{MigrateError, Result};

/// Outcome of a completed migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationResult {
    /// Always true for a returned result; failures are errors.
    pub success: bool,

    /// Records copied into the target table.
    pub records_count: usize,
}

impl MigrationResult {
    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Where the engine is within a migration call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum MigrationPhase {
    #[default]
    Idle,
    Validating,
    Copying { done: usize, total: usize },
    Committing,
    Done,
    Failed,
}

/// Percentage of `total` reached after `done` records, rounded half up.
///
/// Reaches exactly 100 when `done == total`. `total` must be non-zero.
pub fn progress_percent(done: usize, total: usize) -> u8 {
    debug_assert!(total > 0 && done <= total);
    ((200 * done + total) / (2 * total)) as u8
}

/// Copies every row of a source table over a target table.
///
/// The engine reads the source data source and writes only the target
/// one. Overlapping calls against the same target table are not
/// serialized; callers must not issue them.
pub struct MigrationEngine {
    source: Arc<DataSource>,
    target: Arc<DataSource>,
    delay: Arc<dyn Delay>,
    record_latency: Duration,
    phase: watch::Sender<MigrationPhase>,
}

impl MigrationEngine {
    pub fn new(
        source: Arc<DataSource>,
        target: Arc<DataSource>,
        delay: Arc<dyn Delay>,
        record_latency: Duration,
    ) -> Self {
        let (phase, _) = watch::channel(MigrationPhase::Idle);
        Self {
            source,
            target,
            delay,
            record_latency,
            phase,
        }
    }

    /// Watch the engine's phase.
    pub fn subscribe(&self) -> watch::Receiver<MigrationPhase> {
        self.phase.subscribe()
    }

    /// Current phase.
    pub fn phase(&self) -> MigrationPhase {
        *self.phase.borrow()
    }

    /// Copy all rows of `source_table` into `target_table`, replacing its
    /// contents.
    ///
    /// `on_progress` is called once per record, in source order, with the
    /// rounded completion percentage; the last call is always 100.
    ///
    /// # Errors
    ///
    /// - [`MigrateError::ConnectionRejected`] if either side is not connected.
    /// - [`MigrateError::EmptySource`] if the source table has no rows.
    /// - Any error raised by the delay layer while copying.
    pub async fn migrate<F>(
        &self,
        source_table: &str,
        target_table: &str,
        mut on_progress: F,
    ) -> Result<MigrationResult>
    where
        F: FnMut(u8) + Send,
    {
        let run_id = Uuid::new_v4();
        let span = info_span!("migration", %run_id, source_table, target_table);

        let result = self
            .run(source_table, target_table, &mut on_progress)
            .instrument(span)
            .await;

        if let Err(ref e) = result {
            warn!("Migration {} -> {} failed: {}", source_table, target_table, e);
            self.phase.send_replace(MigrationPhase::Failed);
        }
        result
    }

    async fn run<F>(
        &self,
        source_table: &str,
        target_table: &str,
        on_progress: &mut F,
    ) -> Result<MigrationResult>
    where
        F: FnMut(u8) + Send,
    {
        self.phase.send_replace(MigrationPhase::Validating);

        for ds in [&self.source, &self.target] {
            if !ds.is_connected().await {
                return Err(MigrateError::rejected(
                    ds.endpoint(),
                    "not connected; connect before migrating",
                ));
            }
        }

        let rows = self.source.snapshot(source_table).await;
        let total = rows.len();
        if total == 0 {
            return Err(MigrateError::EmptySource {
                table: source_table.to_string(),
            });
        }

        info!("Copying {} records from {}", total, source_table);
        self.phase
            .send_replace(MigrationPhase::Copying { done: 0, total });

        for done in 1..=total {
            self.delay.sleep(self.record_latency).await?;

            let percent = progress_percent(done, total);
            debug!("record {}/{} ({}%)", done, total, percent);
            self.phase
                .send_replace(MigrationPhase::Copying { done, total });
            on_progress(percent);
        }

        self.phase.send_replace(MigrationPhase::Committing);
        self.target.replace_rows(target_table, rows).await;

        self.phase.send_replace(MigrationPhase::Done);
        info!("Migrated {} records into {}", total, target_table);

        Ok(MigrationResult {
            success: true,
            records_count: total,
        })
    }
}
