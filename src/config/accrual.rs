//! Accrual configuration loading from accrual.toml
//!
//! Leave-type rules, the scheduler slot, and the testing-mode switch are read
//! once at startup into an [`AccrualSettings`] value. Callers pass that value
//! explicitly into the calculator and trigger; nothing reads it from global state.

use crate::{
    core::leave_type::LeaveType,
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, path::Path};

/// Default location of the accrual configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "accrual.toml";

/// Configuration structure representing the entire accrual.toml file
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccrualSettings {
    /// Recorded as `created_by` on every run log row
    #[serde(default = "default_created_by")]
    pub created_by: String,
    /// Bypasses the already-accrued guard so a month can be replayed during QA
    #[serde(default)]
    pub testing_mode: bool,
    /// When the scheduler fires each month
    #[serde(default)]
    pub schedule: ScheduleConfig,
    /// Accrual rules per leave type
    pub leave_types: Vec<LeaveTypeConfig>,
}

/// Accrual rules for one leave type
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct LeaveTypeConfig {
    /// Leave type these rules apply to
    pub leave_type: LeaveType,
    /// Days credited every month
    pub monthly_credit: Decimal,
    /// Maximum balance kept when the carry-over month is processed
    pub yearly_carry_over_limit: Decimal,
    /// Month (1-12) in which the balance above the limit is forfeited
    pub carry_over_month: u32,
}

/// Monthly scheduler slot
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub struct ScheduleConfig {
    /// Day of month to fire on (1-28 so every month has it)
    pub day_of_month: u32,
    /// Hour of day (UTC) to fire at
    pub hour: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            day_of_month: 1,
            hour: 0,
        }
    }
}

fn default_created_by() -> String {
    "leave-accrual-cron".to_string()
}

impl LeaveTypeConfig {
    /// Checks the rule values the calculator relies on.
    pub fn validate(&self) -> Result<()> {
        if self.monthly_credit <= Decimal::ZERO {
            return Err(Error::InvalidConfig {
                message: format!(
                    "{}: monthly_credit must be greater than zero, got {}",
                    self.leave_type, self.monthly_credit
                ),
            });
        }
        if self.yearly_carry_over_limit < Decimal::ZERO {
            return Err(Error::InvalidConfig {
                message: format!(
                    "{}: yearly_carry_over_limit must not be negative, got {}",
                    self.leave_type, self.yearly_carry_over_limit
                ),
            });
        }
        if !(1..=12).contains(&self.carry_over_month) {
            return Err(Error::InvalidConfig {
                message: format!(
                    "{}: carry_over_month must be 1-12, got {}",
                    self.leave_type, self.carry_over_month
                ),
            });
        }
        Ok(())
    }
}

impl AccrualSettings {
    /// Validates every leave type, the schedule, and rejects duplicate leave types.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for leave_type in &self.leave_types {
            leave_type.validate()?;
            if !seen.insert(leave_type.leave_type) {
                return Err(Error::InvalidConfig {
                    message: format!("{} is configured more than once", leave_type.leave_type),
                });
            }
        }
        if !(1..=28).contains(&self.schedule.day_of_month) || self.schedule.hour > 23 {
            return Err(Error::InvalidConfig {
                message: format!(
                    "schedule must use day_of_month 1-28 and hour 0-23, got day {} hour {}",
                    self.schedule.day_of_month, self.schedule.hour
                ),
            });
        }
        Ok(())
    }

    /// Looks up the rules for a leave type.
    pub fn leave_type(&self, leave_type: LeaveType) -> Result<&LeaveTypeConfig> {
        self.leave_types
            .iter()
            .find(|c| c.leave_type == leave_type)
            .ok_or_else(|| Error::LeaveTypeNotConfigured {
                code: leave_type.code().to_string(),
            })
    }

    /// Configured leave types in accrual order (Casual before Earned).
    #[must_use]
    pub fn configured_leave_types(&self) -> Vec<LeaveType> {
        LeaveType::ACCRUAL_ORDER
            .into_iter()
            .filter(|lt| self.leave_types.iter().any(|c| c.leave_type == *lt))
            .collect()
    }
}

/// Parses and validates accrual settings from TOML text.
pub fn parse_settings(contents: &str) -> Result<AccrualSettings> {
    let settings: AccrualSettings = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse accrual config: {e}"),
    })?;
    settings.validate()?;
    Ok(settings)
}

/// Loads accrual settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid or required fields are missing
/// - A rule value is out of range
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<AccrualSettings> {
    let path_ref = path.as_ref();
    tracing::debug!("Loading accrual configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;
    parse_settings(&contents)
}

/// Loads accrual settings from `ACCRUAL_CONFIG`, falling back to ./accrual.toml
pub fn load_default_settings() -> Result<AccrualSettings> {
    let path =
        std::env::var("ACCRUAL_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    load_settings(path)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use rust_decimal_macros::dec;

    const SAMPLE: &str = r#"
        created_by = "hr-ops"

        [schedule]
        day_of_month = 1
        hour = 2

        [[leave_types]]
        leave_type = "CL"
        monthly_credit = "1.5"
        yearly_carry_over_limit = "5"
        carry_over_month = 12

        [[leave_types]]
        leave_type = "EL"
        monthly_credit = "1.25"
        yearly_carry_over_limit = "30"
        carry_over_month = 3
    "#;

    #[test]
    fn test_parse_accrual_settings() {
        let settings = parse_settings(SAMPLE).unwrap();
        assert_eq!(settings.created_by, "hr-ops");
        assert!(!settings.testing_mode);
        assert_eq!(settings.schedule.hour, 2);
        assert_eq!(settings.leave_types.len(), 2);

        let casual = settings.leave_type(LeaveType::Casual).unwrap();
        assert_eq!(casual.monthly_credit, dec!(1.5));
        assert_eq!(casual.yearly_carry_over_limit, dec!(5));
        assert_eq!(casual.carry_over_month, 12);

        let earned = settings.leave_type(LeaveType::Earned).unwrap();
        assert_eq!(earned.carry_over_month, 3);
    }

    #[test]
    fn test_defaults_when_optional_fields_missing() {
        let settings = parse_settings(
            r#"
            [[leave_types]]
            leave_type = "EL"
            monthly_credit = "1"
            yearly_carry_over_limit = "0"
            carry_over_month = 1
            "#,
        )
        .unwrap();
        assert_eq!(settings.created_by, "leave-accrual-cron");
        assert_eq!(settings.schedule, ScheduleConfig::default());
        assert_eq!(settings.configured_leave_types(), vec![LeaveType::Earned]);
    }

    #[test]
    fn test_missing_leave_type_is_typed_error() {
        let settings = parse_settings(
            r#"
            [[leave_types]]
            leave_type = "CL"
            monthly_credit = "1"
            yearly_carry_over_limit = "5"
            carry_over_month = 12
            "#,
        )
        .unwrap();
        let err = settings.leave_type(LeaveType::Earned).unwrap_err();
        assert!(matches!(err, Error::LeaveTypeNotConfigured { code } if code == "EL"));
    }

    #[test]
    fn test_rejects_non_positive_credit() {
        let err = parse_settings(
            r#"
            [[leave_types]]
            leave_type = "CL"
            monthly_credit = "0"
            yearly_carry_over_limit = "5"
            carry_over_month = 12
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn test_rejects_carry_over_month_out_of_range() {
        let err = parse_settings(
            r#"
            [[leave_types]]
            leave_type = "CL"
            monthly_credit = "1"
            yearly_carry_over_limit = "5"
            carry_over_month = 13
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn test_rejects_duplicate_leave_type() {
        let err = parse_settings(
            r#"
            [[leave_types]]
            leave_type = "CL"
            monthly_credit = "1"
            yearly_carry_over_limit = "5"
            carry_over_month = 12

            [[leave_types]]
            leave_type = "CL"
            monthly_credit = "2"
            yearly_carry_over_limit = "5"
            carry_over_month = 12
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { message } if message.contains("more than once")));
    }

    #[test]
    fn test_unknown_leave_type_code_fails_to_parse() {
        let err = parse_settings(
            r#"
            [[leave_types]]
            leave_type = "SL"
            monthly_credit = "1"
            yearly_carry_over_limit = "5"
            carry_over_month = 12
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_load_settings_missing_file() {
        let err = load_settings("/nonexistent/accrual.toml").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}
