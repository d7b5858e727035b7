//! Leave day amounts as stored in the database.
//!
//! SQLite has no exact decimal column, and SeaORM maps `Decimal` onto a REAL
//! there. Amounts are therefore written as their decimal text so a value read
//! back is exactly the value written.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveValue, ColIdx, DbErr, IntoActiveValue, QueryResult, TryGetError, TryGetable,
    sea_query::{ArrayType, ColumnType, Value, ValueType, ValueTypeErr},
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// A number of leave days, stored as TEXT.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LeaveDays(pub Decimal);

impl LeaveDays {
    /// The amount as a plain decimal.
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }
}

impl From<Decimal> for LeaveDays {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<LeaveDays> for Decimal {
    fn from(days: LeaveDays) -> Self {
        days.0
    }
}

impl PartialEq<Decimal> for LeaveDays {
    fn eq(&self, other: &Decimal) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for LeaveDays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<LeaveDays> for Value {
    fn from(days: LeaveDays) -> Self {
        days.0.to_string().into()
    }
}

impl TryGetable for LeaveDays {
    fn try_get_by<I: ColIdx>(res: &QueryResult, index: I) -> Result<Self, TryGetError> {
        let text = String::try_get_by(res, index)?;
        Decimal::from_str(&text).map(Self).map_err(|e| {
            TryGetError::DbErr(DbErr::Type(format!("invalid leave amount '{text}': {e}")))
        })
    }
}

impl ValueType for LeaveDays {
    fn try_from(v: Value) -> Result<Self, ValueTypeErr> {
        match v {
            Value::String(Some(text)) => {
                Decimal::from_str(&text).map(Self).map_err(|_| ValueTypeErr)
            }
            _ => Err(ValueTypeErr),
        }
    }

    fn type_name() -> String {
        "LeaveDays".to_owned()
    }

    fn array_type() -> ArrayType {
        ArrayType::String
    }

    fn column_type() -> ColumnType {
        ColumnType::Text
    }
}

impl IntoActiveValue<LeaveDays> for LeaveDays {
    fn into_active_value(self) -> ActiveValue<LeaveDays> {
        ActiveValue::Set(self)
    }
}
