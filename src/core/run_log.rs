//! Cron run log - audit rows for scheduled job executions.
//!
//! A row is inserted before any work happens and updated once when the job
//! finishes. The log is for troubleshooting and idempotency inspection; the
//! accrual guard does not read it.

use crate::{
    entities::{CronRunLog, cron_run_log},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};
use serde::Serialize;
use tracing::debug;

/// Job categories recorded in `cron_run_logs.type_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum CronJobType {
    /// Monthly leave accrual and carry-over
    LeaveAccrual = 1,
}

impl CronJobType {
    /// Value stored in the `type_id` column.
    #[must_use]
    pub const fn type_id(self) -> i32 {
        self as i32
    }
}

/// Inserts the run log row for a job that is about to start.
///
/// `payload` is serialized to JSON and kept as the parameter snapshot.
pub async fn start_run<C, P>(
    db: &C,
    request_id: &str,
    job_type: CronJobType,
    payload: &P,
    created_by: &str,
) -> Result<cron_run_log::Model>
where
    C: ConnectionTrait,
    P: Serialize + ?Sized,
{
    let now = Utc::now();
    let row = cron_run_log::ActiveModel {
        request_id: Set(request_id.to_string()),
        type_id: Set(job_type.type_id()),
        payload_snapshot: Set(serde_json::to_string(payload)?),
        created_by: Set(created_by.to_string()),
        created_on: Set(now.naive_utc()),
        started_at: Set(now),
        completed_at: Set(None),
        rows_affected: Set(None),
        error_message: Set(None),
        ..Default::default()
    };
    let inserted = row.insert(db).await?;
    debug!(run_log_id = inserted.id, request_id, "Cron run log created");
    Ok(inserted)
}

/// Marks a run as finished.
pub async fn complete_run<C>(
    db: &C,
    id: i64,
    rows_affected: i64,
    error_message: Option<String>,
) -> Result<cron_run_log::Model>
where
    C: ConnectionTrait,
{
    let row = CronRunLog::find_by_id(id)
        .one(db)
        .await?
        .ok_or(Error::RunLogNotFound { id })?;

    let mut active_model: cron_run_log::ActiveModel = row.into();
    active_model.completed_at = Set(Some(Utc::now()));
    active_model.rows_affected = Set(Some(rows_affected));
    active_model.error_message = Set(error_message);
    Ok(active_model.update(db).await?)
}

/// Most recent runs, newest first.
pub async fn recent_runs<C>(db: &C, limit: u64) -> Result<Vec<cron_run_log::Model>>
where
    C: ConnectionTrait,
{
    CronRunLog::find()
        .order_by_desc(cron_run_log::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_start_run_leaves_completion_unset() -> Result<()> {
        let db = setup_test_db().await?;

        let row = start_run(
            &db,
            "req-1",
            CronJobType::LeaveAccrual,
            &json!({ "month": 3 }),
            "tester",
        )
        .await?;

        assert_eq!(row.request_id, "req-1");
        assert_eq!(row.type_id, 1);
        assert_eq!(row.payload_snapshot, r#"{"month":3}"#);
        assert_eq!(row.created_by, "tester");
        assert!(row.completed_at.is_none());
        assert!(row.rows_affected.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_complete_run_updates_same_row() -> Result<()> {
        let db = setup_test_db().await?;
        let started = start_run(&db, "req-2", CronJobType::LeaveAccrual, &(), "tester").await?;

        let completed = complete_run(&db, started.id, 7, Some("1 failed".to_string())).await?;
        assert_eq!(completed.id, started.id);
        assert_eq!(completed.rows_affected, Some(7));
        assert_eq!(completed.error_message.as_deref(), Some("1 failed"));
        let finished = completed.completed_at.unwrap();
        assert!(finished >= completed.started_at);

        assert_eq!(CronRunLog::find().count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_complete_missing_run() -> Result<()> {
        let db = setup_test_db().await?;
        let err = complete_run(&db, 42, 0, None).await.unwrap_err();
        assert!(matches!(err, Error::RunLogNotFound { id: 42 }));
        Ok(())
    }

    #[tokio::test]
    async fn test_recent_runs_newest_first() -> Result<()> {
        let db = setup_test_db().await?;
        for i in 0..3 {
            start_run(&db, &format!("req-{i}"), CronJobType::LeaveAccrual, &i, "tester").await?;
        }

        let runs = recent_runs(&db, 2).await?;
        let ids: Vec<&str> = runs.iter().map(|r| r.request_id.as_str()).collect();
        assert_eq!(ids, vec!["req-2", "req-1"]);
        Ok(())
    }
}
