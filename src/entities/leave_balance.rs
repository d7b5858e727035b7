//! Leave balance entity - Running balance per employee and leave type.
//!
//! Rows are updated in place by the monthly accrual job rather than appended.
//! `used_this_period` belongs to the leave approval workflow and is never
//! written by accrual. Amounts are [`LeaveDays`] so they survive storage exactly.

use super::leave_days::LeaveDays;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Leave balance database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "leave_balances")]
pub struct Model {
    /// Unique identifier for the balance row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Employee this balance belongs to
    pub employee_id: i64,
    /// Leave type code (`"CL"` or `"EL"`)
    pub leave_type: String,
    /// Balance at the start of the accounting cycle
    #[sea_orm(column_type = "Text")]
    pub opening_balance: LeaveDays,
    /// Credits accrued so far
    #[sea_orm(column_type = "Text")]
    pub accrued_this_period: LeaveDays,
    /// Days consumed by approved leave applications
    #[sea_orm(column_type = "Text")]
    pub used_this_period: LeaveDays,
    /// Amount carried into the current cycle at the last carry-over month
    #[sea_orm(column_type = "Text")]
    pub carried_over_from_prior_year: LeaveDays,
    /// Amount forfeited by carry-over caps
    #[sea_orm(column_type = "Text")]
    pub expired_this_period: LeaveDays,
    /// Month of the last credited period
    pub effective_month: i32,
    /// Year of the last credited period
    pub effective_year: i32,
    /// When the row was last written
    pub updated_at: DateTime,
}

impl Model {
    /// Balance available to the employee right now.
    #[must_use]
    pub fn current_balance(&self) -> Decimal {
        self.opening_balance.value() + self.accrued_this_period.value()
            - self.used_this_period.value()
            - self.expired_this_period.value()
    }
}

/// Defines relationships between `LeaveBalance` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each balance belongs to one employee
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::EmployeeId",
        to = "super::employee::Column::Id"
    )]
    Employee,
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
