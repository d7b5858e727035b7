//! Employee lookups used by the accrual job.
//!
//! The employee master belongs to the wider HR system; these functions only read
//! it, except for [`create_employee`] which seeds standalone databases.

use crate::{
    entities::{Employee, employee},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, prelude::*};

/// Retrieves employees eligible for accrual in the month ending on `last_day`.
///
/// An employee is eligible when active and joined on or before the last day of
/// the target month. Ordered by id so runs process employees deterministically.
pub async fn get_eligible_employees<C>(db: &C, last_day: NaiveDate) -> Result<Vec<employee::Model>>
where
    C: ConnectionTrait,
{
    Employee::find()
        .filter(employee::Column::IsActive.eq(true))
        .filter(employee::Column::DateOfJoining.lte(last_day))
        .order_by_asc(employee::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Inserts an employee record.
pub async fn create_employee<C>(
    db: &C,
    full_name: &str,
    is_active: bool,
    date_of_joining: NaiveDate,
) -> Result<employee::Model>
where
    C: ConnectionTrait,
{
    let employee = employee::ActiveModel {
        full_name: Set(full_name.trim().to_string()),
        is_active: Set(is_active),
        date_of_joining: Set(date_of_joining),
        ..Default::default()
    };
    Ok(employee.insert(db).await?)
}
