//! Entity module - Contains all SeaORM entity definitions for the database.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod cron_run_log;
pub mod employee;
pub mod leave_balance;
pub mod leave_days;

// Re-export specific types to avoid conflicts
pub use cron_run_log::{
    Column as CronRunLogColumn, Entity as CronRunLog, Model as CronRunLogModel,
};
pub use employee::{Column as EmployeeColumn, Entity as Employee, Model as EmployeeModel};
pub use leave_balance::{
    Column as LeaveBalanceColumn, Entity as LeaveBalance, Model as LeaveBalanceModel,
};
pub use leave_days::LeaveDays;
