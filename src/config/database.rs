//! Database configuration module.
//!
//! Handles the `SQLite` connection and table creation using `SeaORM`. Tables are
//! generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs. The employees table is owned
//! by the wider HR system; it is created here only when missing so the
//! eligibility query has something to read in standalone deployments.

use crate::entities::{CronRunLog, Employee, LeaveBalance, LeaveBalanceColumn};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema, sea_query::Index};
use tracing::{debug, info};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/leave_accrual.sqlite?mode=rwc";

/// Gets the database URL from `DATABASE_URL` or returns the default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!("Connecting to database: {}", database_url);
    let db = Database::connect(&database_url).await?;
    info!("Database connection established");
    Ok(db)
}

/// Creates the employees, leave balance, and cron run log tables if they do not exist.
///
/// Also adds a unique index so each employee has at most one balance row per
/// leave type.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut employee_table = schema.create_table_from_entity(Employee);
    let mut balance_table = schema.create_table_from_entity(LeaveBalance);
    let mut run_log_table = schema.create_table_from_entity(CronRunLog);

    employee_table.if_not_exists();
    balance_table.if_not_exists();
    run_log_table.if_not_exists();

    db.execute(builder.build(&employee_table)).await?;
    db.execute(builder.build(&balance_table)).await?;
    db.execute(builder.build(&run_log_table)).await?;

    let balance_key = Index::create()
        .name("idx_leave_balances_employee_leave_type")
        .table(LeaveBalance)
        .col(LeaveBalanceColumn::EmployeeId)
        .col(LeaveBalanceColumn::LeaveType)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&balance_key)).await?;

    Ok(())
}
