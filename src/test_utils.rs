//! Shared test utilities.
//!
//! Helpers for setting up an in-memory database and creating employees,
//! balances, and accrual settings with sensible defaults.

use crate::{
    config::accrual::{AccrualSettings, LeaveTypeConfig, ScheduleConfig},
    core::{employee, leave_type::LeaveType, period::AccrualPeriod},
    entities::{self, leave_balance},
    errors::Result,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use tracing_subscriber::EnvFilter;

/// Routes tracing output through the test harness.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    init_test_tracing();
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Shorthand for a calendar date.
#[allow(clippy::unwrap_used)]
pub fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Shorthand for an accrual period.
#[allow(clippy::unwrap_used)]
pub fn period(year: i32, month: u32) -> AccrualPeriod {
    AccrualPeriod::new(year, month).unwrap()
}

/// Creates an active employee who joined on 2020-01-01.
pub async fn create_test_employee(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::employee::Model> {
    employee::create_employee(db, name, true, ymd(2020, 1, 1)).await
}

/// Creates an employee with custom status and joining date.
pub async fn create_custom_employee(
    db: &DatabaseConnection,
    name: &str,
    is_active: bool,
    date_of_joining: NaiveDate,
) -> Result<entities::employee::Model> {
    employee::create_employee(db, name, is_active, date_of_joining).await
}

/// Casual leave rule.
pub fn casual_rule(credit: Decimal, limit: Decimal, carry_over_month: u32) -> LeaveTypeConfig {
    LeaveTypeConfig {
        leave_type: LeaveType::Casual,
        monthly_credit: credit,
        yearly_carry_over_limit: limit,
        carry_over_month,
    }
}

/// Earned leave rule.
pub fn earned_rule(credit: Decimal, limit: Decimal, carry_over_month: u32) -> LeaveTypeConfig {
    LeaveTypeConfig {
        leave_type: LeaveType::Earned,
        ..casual_rule(credit, limit, carry_over_month)
    }
}

/// Settings with CL 1.5/month capped at 5 in December and EL 1.25/month capped at 30 in March.
pub fn test_settings() -> AccrualSettings {
    AccrualSettings {
        created_by: "test".to_string(),
        testing_mode: false,
        schedule: ScheduleConfig::default(),
        leave_types: vec![
            casual_rule(Decimal::new(15, 1), Decimal::new(5, 0), 12),
            earned_rule(Decimal::new(125, 2), Decimal::new(30, 0), 3),
        ],
    }
}

/// Inserts a balance row with days already used, effective December 2024.
pub async fn seed_balance_with_used(
    db: &DatabaseConnection,
    employee_id: i64,
    leave_type: LeaveType,
    opening_balance: Decimal,
    used: Decimal,
) -> Result<leave_balance::Model> {
    insert_balance_row(db, employee_id, leave_type, opening_balance, used, 2024, 12).await
}

/// Inserts a balance row whose effective month is out of range.
pub async fn insert_corrupt_balance(
    db: &DatabaseConnection,
    employee_id: i64,
    leave_type: LeaveType,
) -> Result<leave_balance::Model> {
    insert_balance_row(db, employee_id, leave_type, Decimal::ONE, Decimal::ZERO, 2024, 13).await
}

async fn insert_balance_row(
    db: &DatabaseConnection,
    employee_id: i64,
    leave_type: LeaveType,
    opening_balance: Decimal,
    used: Decimal,
    effective_year: i32,
    effective_month: i32,
) -> Result<leave_balance::Model> {
    let row = leave_balance::ActiveModel {
        employee_id: Set(employee_id),
        leave_type: Set(leave_type.code().to_string()),
        opening_balance: Set(opening_balance.into()),
        accrued_this_period: Set(Decimal::ZERO.into()),
        used_this_period: Set(used.into()),
        carried_over_from_prior_year: Set(Decimal::ZERO.into()),
        expired_this_period: Set(Decimal::ZERO.into()),
        effective_month: Set(effective_month),
        effective_year: Set(effective_year),
        updated_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    };
    Ok(row.insert(db).await?)
}
