//! Leave balance store - reads and in-place writes of `leave_balances` rows.
//!
//! One row exists per employee and leave type. The accrual job rewrites the
//! accrued, expired and carried-over columns plus the effective period; the used
//! column is owned by the leave approval workflow and is never written here.

use crate::{
    core::{leave_type::LeaveType, period::AccrualPeriod},
    entities::{LeaveBalance, LeaveDays, leave_balance},
    errors::Result,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{Set, prelude::*};

/// The amount columns of a balance row.
///
/// A missing row behaves like [`BalanceState::default`], which is all zeros.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BalanceState {
    /// Balance at the start of the cycle
    pub opening_balance: Decimal,
    /// Credits accrued so far
    pub accrued_this_period: Decimal,
    /// Days consumed by approved leave
    pub used_this_period: Decimal,
    /// Amount carried in at the last carry-over month
    pub carried_over_from_prior_year: Decimal,
    /// Amount forfeited by carry-over caps
    pub expired_this_period: Decimal,
}

impl BalanceState {
    /// Balance available to the employee.
    #[must_use]
    pub fn current(&self) -> Decimal {
        self.opening_balance + self.accrued_this_period
            - self.used_this_period
            - self.expired_this_period
    }
}

impl From<&leave_balance::Model> for BalanceState {
    fn from(row: &leave_balance::Model) -> Self {
        Self {
            opening_balance: row.opening_balance.value(),
            accrued_this_period: row.accrued_this_period.value(),
            used_this_period: row.used_this_period.value(),
            carried_over_from_prior_year: row.carried_over_from_prior_year.value(),
            expired_this_period: row.expired_this_period.value(),
        }
    }
}

/// Finds the balance row for an employee and leave type.
pub async fn find_balance<C>(
    db: &C,
    employee_id: i64,
    leave_type: LeaveType,
) -> Result<Option<leave_balance::Model>>
where
    C: ConnectionTrait,
{
    LeaveBalance::find()
        .filter(leave_balance::Column::EmployeeId.eq(employee_id))
        .filter(leave_balance::Column::LeaveType.eq(leave_type.code()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Writes the accrual-owned columns of a balance row, inserting it if absent.
///
/// `existing` must be the row previously read for the same employee and leave
/// type. The used column keeps whatever value the row already has.
pub async fn save_accrual<C>(
    db: &C,
    existing: Option<leave_balance::Model>,
    employee_id: i64,
    leave_type: LeaveType,
    state: &BalanceState,
    period: AccrualPeriod,
) -> Result<leave_balance::Model>
where
    C: ConnectionTrait,
{
    let now = Utc::now().naive_utc();

    let saved = if let Some(row) = existing {
        let mut active_model: leave_balance::ActiveModel = row.into();
        active_model.accrued_this_period = Set(state.accrued_this_period.into());
        active_model.carried_over_from_prior_year =
            Set(state.carried_over_from_prior_year.into());
        active_model.expired_this_period = Set(state.expired_this_period.into());
        active_model.effective_month = Set(period.stored_month());
        active_model.effective_year = Set(period.year());
        active_model.updated_at = Set(now);
        active_model.update(db).await?
    } else {
        let new_row = leave_balance::ActiveModel {
            employee_id: Set(employee_id),
            leave_type: Set(leave_type.code().to_string()),
            opening_balance: Set(state.opening_balance.into()),
            accrued_this_period: Set(state.accrued_this_period.into()),
            used_this_period: Set(state.used_this_period.into()),
            carried_over_from_prior_year: Set(state.carried_over_from_prior_year.into()),
            expired_this_period: Set(state.expired_this_period.into()),
            effective_month: Set(period.stored_month()),
            effective_year: Set(period.year()),
            updated_at: Set(now),
            ..Default::default()
        };
        new_row.insert(db).await?
    };

    Ok(saved)
}

/// Records an opening balance, e.g. when migrating balances from another system.
///
/// `as_of` is the last period already reflected in the amount, so the next
/// accrual run targets the month after it. Any existing row for the employee and
/// leave type is reset to the opening amount.
pub async fn set_opening_balance<C>(
    db: &C,
    employee_id: i64,
    leave_type: LeaveType,
    opening_balance: Decimal,
    as_of: AccrualPeriod,
) -> Result<leave_balance::Model>
where
    C: ConnectionTrait,
{
    let now = Utc::now().naive_utc();
    let existing = find_balance(db, employee_id, leave_type).await?;
    let is_new = existing.is_none();
    let mut row = existing.map_or_else(
        || leave_balance::ActiveModel {
            employee_id: Set(employee_id),
            leave_type: Set(leave_type.code().to_string()),
            ..Default::default()
        },
        Into::into,
    );

    row.opening_balance = Set(opening_balance.into());
    row.accrued_this_period = Set(LeaveDays::default());
    row.used_this_period = Set(LeaveDays::default());
    row.carried_over_from_prior_year = Set(LeaveDays::default());
    row.expired_this_period = Set(LeaveDays::default());
    row.effective_month = Set(as_of.stored_month());
    row.effective_year = Set(as_of.year());
    row.updated_at = Set(now);

    let saved = if is_new {
        row.insert(db).await?
    } else {
        row.update(db).await?
    };
    Ok(saved)
}

/// Lists every balance row for an employee.
pub async fn get_employee_balances<C>(
    db: &C,
    employee_id: i64,
) -> Result<Vec<leave_balance::Model>>
where
    C: ConnectionTrait,
{
    LeaveBalance::find()
        .filter(leave_balance::Column::EmployeeId.eq(employee_id))
        .all(db)
        .await
        .map_err(Into::into)
}
