//! Cron trigger for the monthly accrual job.
//!
//! [`run_monthly_accrual`] wraps one firing: it opens a run log row, accrues
//! each requested leave type in turn (Casual before Earned), and closes the row
//! with the number of balances credited. [`fire_scheduled_run`] is the
//! scheduler boundary and only logs failures.

use crate::{
    config::accrual::AccrualSettings,
    core::{
        accrual::{RunSummary, accrue_leave_type},
        leave_type::LeaveType,
        period::AccrualPeriod,
        run_log::{self, CronJobType},
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::fmt::Write;
use tracing::{Span, error, info, instrument};
use uuid::Uuid;

/// Parameters of one accrual run, also stored as the run log payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccrualRequest {
    /// Leave types to accrue, in order
    pub leave_types: Vec<LeaveType>,
    /// Target month
    pub period: AccrualPeriod,
    /// Bypass the already-accrued guard
    pub testing_mode: bool,
}

impl AccrualRequest {
    /// Request for every configured leave type, using the settings' testing mode.
    #[must_use]
    pub fn for_all_leave_types(settings: &AccrualSettings, period: AccrualPeriod) -> Self {
        Self {
            leave_types: settings.configured_leave_types(),
            period,
            testing_mode: settings.testing_mode,
        }
    }

    /// Request for a manually triggered run.
    ///
    /// `leave_type` narrows the run to one leave type code. The `testing_mode`
    /// flag can only turn testing mode on; it never overrides a configured `true`.
    pub fn for_manual_run(
        settings: &AccrualSettings,
        year: i32,
        month: u32,
        leave_type: Option<&str>,
        testing_mode: bool,
    ) -> Result<Self> {
        let period = AccrualPeriod::new(year, month)?;
        let mut request = Self::for_all_leave_types(settings, period);
        if let Some(code) = leave_type {
            request.leave_types = vec![code.parse::<LeaveType>()?];
        }
        request.testing_mode |= testing_mode;
        Ok(request)
    }
}

/// A leave type whose batch could not run at all.
#[derive(Debug)]
pub struct BatchFailure {
    /// Leave type that failed
    pub leave_type: LeaveType,
    /// Why it failed
    pub error: Error,
}

/// Outcome of one trigger firing.
#[derive(Debug)]
pub struct RunReport {
    /// Correlation id, also in the run log and log spans
    pub request_id: Uuid,
    /// Primary key of the run log row
    pub run_log_id: i64,
    /// Target month
    pub period: AccrualPeriod,
    /// One summary per leave type that ran
    pub summaries: Vec<RunSummary>,
    /// Leave types that could not run
    pub batch_failures: Vec<BatchFailure>,
}

impl RunReport {
    /// Balance rows credited across all leave types.
    #[must_use]
    pub fn rows_affected(&self) -> usize {
        self.summaries.iter().map(RunSummary::rows_updated).sum()
    }

    /// Employees whose update failed across all leave types.
    #[must_use]
    pub fn employee_failures(&self) -> usize {
        self.summaries.iter().map(RunSummary::failed_count).sum()
    }

    /// True when nothing failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.batch_failures.is_empty() && self.employee_failures() == 0
    }

    fn error_message(&self) -> Option<String> {
        if self.is_clean() {
            return None;
        }
        let mut parts: Vec<String> = self
            .batch_failures
            .iter()
            .map(|f| format!("{}: {}", f.leave_type, f.error))
            .collect();
        for summary in &self.summaries {
            let failed = summary.failed_count();
            if failed > 0 {
                parts.push(format!("{}: {failed} employee(s) failed", summary.leave_type));
            }
        }
        Some(parts.join("; "))
    }
}

/// Runs the accrual job once and records it in the run log.
///
/// The run log row is written before any balance is touched; if that insert
/// fails the run is aborted. Once the row exists it is always completed, also
/// when some leave types or employees failed.
#[instrument(
    skip_all,
    fields(period = %request.period, request_id = tracing::field::Empty)
)]
pub async fn run_monthly_accrual(
    db: &DatabaseConnection,
    settings: &AccrualSettings,
    request: &AccrualRequest,
) -> Result<RunReport> {
    let request_id = Uuid::new_v4();
    Span::current().record("request_id", tracing::field::display(request_id));

    let log_row = run_log::start_run(
        db,
        &request_id.to_string(),
        CronJobType::LeaveAccrual,
        request,
        &settings.created_by,
    )
    .await?;
    info!(run_log_id = log_row.id, "Monthly accrual run started");

    let mut report = RunReport {
        request_id,
        run_log_id: log_row.id,
        period: request.period,
        summaries: Vec::new(),
        batch_failures: Vec::new(),
    };

    for &leave_type in &request.leave_types {
        let outcome = match settings.leave_type(leave_type) {
            Ok(rule) => accrue_leave_type(db, rule, request.period, request.testing_mode).await,
            Err(e) => Err(e),
        };
        match outcome {
            Ok(summary) => report.summaries.push(summary),
            Err(error) => {
                error!(%leave_type, %error, "Leave accrual batch failed");
                report.batch_failures.push(BatchFailure { leave_type, error });
            }
        }
    }

    let rows_affected = i64::try_from(report.rows_affected()).unwrap_or(i64::MAX);
    run_log::complete_run(db, log_row.id, rows_affected, report.error_message()).await?;
    info!(
        rows_affected,
        clean = report.is_clean(),
        "Monthly accrual run completed"
    );

    Ok(report)
}

/// Scheduler entry point: accrues the month containing `now` for every configured leave type.
///
/// Errors are logged and swallowed so the scheduler keeps running.
pub async fn fire_scheduled_run(
    db: &DatabaseConnection,
    settings: &AccrualSettings,
    now: DateTime<Utc>,
) -> Option<RunReport> {
    let request = AccrualRequest::for_all_leave_types(settings, AccrualPeriod::containing(now.date_naive()));
    match run_monthly_accrual(db, settings, &request).await {
        Ok(report) => {
            if !report.is_clean() {
                error!(
                    request_id = %report.request_id,
                    "Scheduled accrual finished with failures: {}",
                    report.error_message().unwrap_or_default()
                );
            }
            Some(report)
        }
        Err(e) => {
            error!(period = %request.period, error = %e, "Scheduled accrual run failed");
            None
        }
    }
}

/// Formats a run report into a human-readable summary string.
#[must_use]
pub fn format_run_report(report: &RunReport) -> String {
    let mut summary = format!(
        "Leave Accrual - {} - request {}\n",
        report.period.first_day().format("%B %Y"),
        report.request_id
    );

    // write! is infallible when writing to String
    for run in &report.summaries {
        let _ = writeln!(
            summary,
            "  {}: credited {} | skipped {} | failed {}",
            run.leave_type,
            run.rows_updated(),
            run.skipped_count(),
            run.failed_count()
        );
        for outcome in &run.outcomes {
            let _ = match &outcome.result {
                Ok(change) if change.forfeited.is_zero() => writeln!(
                    summary,
                    "    {} - {} → {}",
                    outcome.employee_name, change.old_balance, change.new_balance
                ),
                Ok(change) => writeln!(
                    summary,
                    "    {} - {} → {} (forfeited {})",
                    outcome.employee_name,
                    change.old_balance,
                    change.new_balance,
                    change.forfeited
                ),
                Err(e) => writeln!(summary, "    {} - FAILED: {e}", outcome.employee_name),
            };
        }
    }

    for failure in &report.batch_failures {
        let _ = writeln!(summary, "  {}: not run ({})", failure.leave_type, failure.error);
    }

    summary
}
