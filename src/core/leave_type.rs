//! Leave types that accrue monthly.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// A category of paid leave with its own accrual rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeaveType {
    /// Casual leave
    #[serde(rename = "CL")]
    Casual,
    /// Earned leave
    #[serde(rename = "EL")]
    Earned,
}

impl LeaveType {
    /// Order in which a monthly run processes leave types.
    pub const ACCRUAL_ORDER: [Self; 2] = [Self::Casual, Self::Earned];

    /// Short code stored in the `leave_balances.leave_type` column.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Casual => "CL",
            Self::Earned => "EL",
        }
    }
}

impl fmt::Display for LeaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for LeaveType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CL" | "CASUAL" => Ok(Self::Casual),
            "EL" | "EARNED" => Ok(Self::Earned),
            _ => Err(Error::UnknownLeaveType {
                code: s.to_string(),
            }),
        }
    }
}
