//! Cron run log entity - One audit row per scheduled job execution.
//!
//! A row is inserted when a run starts with `completed_at` unset and updated
//! exactly once when the run finishes. Rows are never deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Cron run log database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cron_run_logs")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Correlation id shared with the log stream
    pub request_id: String,
    /// Job category (see `CronJobType`)
    pub type_id: i32,
    /// JSON snapshot of the job parameters
    pub payload_snapshot: String,
    /// Who or what triggered the run
    pub created_by: String,
    /// When the row was created
    pub created_on: DateTime,
    /// When the run started
    pub started_at: DateTimeUtc,
    /// When the run finished, unset while running
    pub completed_at: Option<DateTimeUtc>,
    /// Balance rows credited by the run
    pub rows_affected: Option<i64>,
    /// Summary of failures, unset on a clean run
    pub error_message: Option<String>,
}

/// `CronRunLog` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
