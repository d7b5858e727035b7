//! Monthly leave accrual business logic
//!
//! Credits each eligible employee with the configured monthly amount for one
//! leave type, and caps the balance at the yearly carry-over limit when the
//! target month is the leave type's carry-over month. The excess is forfeited
//! into `expired_this_period`.
//!
//! Every employee is written in its own database transaction. A failure for one
//! employee is recorded in the [`RunSummary`] and the run moves on; earlier
//! updates in the same run are kept.
//!
//! A row whose effective period is already at or after the target month is
//! skipped, so the same month is not credited twice. `testing_mode` lifts that
//! guard so QA can replay a month, which credits it again.

use crate::{
    config::accrual::LeaveTypeConfig,
    core::{
        balance::{self, BalanceState},
        employee::get_eligible_employees,
        leave_type::LeaveType,
        period::AccrualPeriod,
    },
    entities::employee,
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::{debug, info, instrument, warn};

/// Result of applying one month of accrual to a balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccrualComputation {
    /// Balance columns after the credit (and cap, in the carry-over month)
    pub state: BalanceState,
    /// Balance before the credit
    pub old_balance: Decimal,
    /// Balance after the credit and cap
    pub new_balance: Decimal,
    /// Amount forfeited by the carry-over cap
    pub forfeited: Decimal,
}

/// Applies one monthly credit to `current` under `rule`.
///
/// Outside the carry-over month the result is `balance + credit`. In the
/// carry-over month it is `min(balance + credit, limit)`; a total already below
/// the limit (including a negative one) is carried over unchanged.
#[must_use]
pub fn compute_accrual(
    current: &BalanceState,
    rule: &LeaveTypeConfig,
    period: AccrualPeriod,
) -> AccrualComputation {
    let old_balance = current.current();
    let total = old_balance + rule.monthly_credit;

    let mut state = BalanceState {
        accrued_this_period: current.accrued_this_period + rule.monthly_credit,
        ..*current
    };

    let forfeited = if period.month() == rule.carry_over_month {
        let excess = (total - rule.yearly_carry_over_limit).max(Decimal::ZERO);
        state.expired_this_period += excess;
        state.carried_over_from_prior_year = total - excess;
        excess
    } else {
        Decimal::ZERO
    };

    AccrualComputation {
        state,
        old_balance,
        new_balance: total - forfeited,
        forfeited,
    }
}

/// What happened to one employee's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccrualStatus {
    /// Monthly credit was applied
    Credited,
    /// Balance already covers the target month
    AlreadyAccrued,
}

/// Balance change for one employee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccrualChange {
    /// Whether the credit was applied
    pub status: AccrualStatus,
    /// Balance before the run
    pub old_balance: Decimal,
    /// Balance after the run
    pub new_balance: Decimal,
    /// Amount forfeited by the carry-over cap
    pub forfeited: Decimal,
}

/// Per-employee outcome within a run.
#[derive(Debug)]
pub struct EmployeeOutcome {
    /// Employee id
    pub employee_id: i64,
    /// Employee display name
    pub employee_name: String,
    /// The change, or the error that stopped this employee
    pub result: Result<AccrualChange>,
}

/// Results of accruing one leave type for one month.
#[derive(Debug)]
pub struct RunSummary {
    /// Leave type processed
    pub leave_type: LeaveType,
    /// Target month
    pub period: AccrualPeriod,
    /// One entry per eligible employee, in processing order
    pub outcomes: Vec<EmployeeOutcome>,
}

impl RunSummary {
    fn count_status(&self, status: AccrualStatus) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(&o.result, Ok(change) if change.status == status))
            .count()
    }

    /// Number of balance rows written.
    #[must_use]
    pub fn rows_updated(&self) -> usize {
        self.count_status(AccrualStatus::Credited)
    }

    /// Number of employees skipped because the month was already credited.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.count_status(AccrualStatus::AlreadyAccrued)
    }

    /// Employees whose update failed.
    pub fn failures(&self) -> impl Iterator<Item = (&EmployeeOutcome, &Error)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o, e)))
    }

    /// Number of employees whose update failed.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.failures().count()
    }
}

/// Credits one employee inside its own transaction.
async fn accrue_employee(
    db: &DatabaseConnection,
    employee: &employee::Model,
    rule: &LeaveTypeConfig,
    period: AccrualPeriod,
    testing_mode: bool,
) -> Result<AccrualChange> {
    let txn = db.begin().await?;

    let existing = balance::find_balance(&txn, employee.id, rule.leave_type).await?;
    let current = existing.as_ref().map(BalanceState::from).unwrap_or_default();

    if let Some(row) = &existing {
        let last = AccrualPeriod::from_stored(row.effective_year, row.effective_month)?;
        if last >= period && !testing_mode {
            txn.rollback().await?;
            debug!(
                employee_id = employee.id,
                last = %last,
                "Balance already accrued for this month, skipping"
            );
            let balance = current.current();
            return Ok(AccrualChange {
                status: AccrualStatus::AlreadyAccrued,
                old_balance: balance,
                new_balance: balance,
                forfeited: Decimal::ZERO,
            });
        }
    }

    let computation = compute_accrual(&current, rule, period);
    balance::save_accrual(
        &txn,
        existing,
        employee.id,
        rule.leave_type,
        &computation.state,
        period,
    )
    .await?;
    txn.commit().await?;

    Ok(AccrualChange {
        status: AccrualStatus::Credited,
        old_balance: computation.old_balance,
        new_balance: computation.new_balance,
        forfeited: computation.forfeited,
    })
}

/// Accrues one leave type for every eligible employee.
///
/// 1. Validates the rule
/// 2. Loads employees that are active and joined by the end of `period`
/// 3. For each one, applies [`compute_accrual`] and saves the row, or skips it
///    if the month was already credited and `testing_mode` is off
///
/// # Returns
/// * `Ok(summary)` - The batch ran; individual failures are inside `summary`
/// * `Err(error)` - The batch could not start (invalid rule, employee query failed)
#[instrument(skip_all, fields(leave_type = %rule.leave_type, period = %period))]
pub async fn accrue_leave_type(
    db: &DatabaseConnection,
    rule: &LeaveTypeConfig,
    period: AccrualPeriod,
    testing_mode: bool,
) -> Result<RunSummary> {
    rule.validate()?;

    let employees = get_eligible_employees(db, period.last_day()).await?;
    info!(
        eligible = employees.len(),
        testing_mode, "Starting leave accrual"
    );

    let mut outcomes = Vec::with_capacity(employees.len());
    for employee in employees {
        let result = accrue_employee(db, &employee, rule, period, testing_mode).await;
        if let Err(e) = &result {
            warn!(employee_id = employee.id, error = %e, "Leave accrual failed for employee");
        }
        outcomes.push(EmployeeOutcome {
            employee_id: employee.id,
            employee_name: employee.full_name,
            result,
        });
    }

    let summary = RunSummary {
        leave_type: rule.leave_type,
        period,
        outcomes,
    };
    info!(
        credited = summary.rows_updated(),
        skipped = summary.skipped_count(),
        failed = summary.failed_count(),
        "Finished leave accrual"
    );
    Ok(summary)
}
