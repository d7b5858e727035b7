//! Unified error types and result handling.

use thiserror::Error;

/// Errors produced by the leave accrual engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the failure
        message: String,
    },

    /// Configuration was parsed but contains values the accrual rules cannot use
    #[error("Invalid accrual configuration: {message}")]
    InvalidConfig {
        /// Description of the offending value
        message: String,
    },

    /// Month/year pair does not name a calendar month
    #[error("Invalid accrual period {year}-{month:02}")]
    InvalidPeriod {
        /// Year of the period
        year: i32,
        /// Month of the period (expected 1-12)
        month: i32,
    },

    /// Leave type code not recognised
    #[error("Unknown leave type: {code}")]
    UnknownLeaveType {
        /// The code that failed to parse
        code: String,
    },

    /// A run requested a leave type that has no accrual configuration
    #[error("No accrual configuration for leave type {code}")]
    LeaveTypeNotConfigured {
        /// Code of the leave type
        code: String,
    },

    /// Run log row disappeared between start and completion
    #[error("Cron run log not found: {id}")]
    RunLogNotFound {
        /// Primary key of the missing row
        id: i64,
    },

    /// Payload snapshot could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Database error from `SeaORM`
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_period_display_pads_month() {
        let error = Error::InvalidPeriod {
            year: 2025,
            month: 3,
        };
        assert_eq!(error.to_string(), "Invalid accrual period 2025-03");
    }

    #[test]
    fn test_leave_type_not_configured_display() {
        let error = Error::LeaveTypeNotConfigured {
            code: "EL".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "No accrual configuration for leave type EL"
        );
    }

    #[test]
    fn test_database_error_converts_with_question_mark() {
        fn fails() -> Result<()> {
            Err(sea_orm::DbErr::Custom("boom".to_string()))?;
            Ok(())
        }

        assert!(matches!(fails(), Err(Error::Database(_))));
    }
}
