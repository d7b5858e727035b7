//! Employee entity - Read-only view of the HR employee master.
//!
//! Employee lifecycle is owned by the wider HR system. The accrual job only
//! reads active status and joining date to decide eligibility.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Employee database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    /// Unique identifier for the employee
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name
    pub full_name: String,
    /// Whether the employee is currently employed
    pub is_active: bool,
    /// First working day
    pub date_of_joining: Date,
}

/// Defines relationships between Employee and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One employee has one balance row per leave type
    #[sea_orm(has_many = "super::leave_balance::Entity")]
    LeaveBalances,
}

impl Related<super::leave_balance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LeaveBalances.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
