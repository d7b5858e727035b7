//! Core business logic - framework-agnostic accrual, balance, and run log operations.

/// Monthly credit and carry-over computation
pub mod accrual;
/// Leave balance store
pub mod balance;
/// Employee eligibility lookups
pub mod employee;
/// Leave type codes
pub mod leave_type;
/// Calendar month targeted by a run
pub mod period;
/// Cron run audit log
pub mod run_log;
/// Monthly scheduler loop
pub mod schedule;
/// Run orchestration and reporting
pub mod trigger;
