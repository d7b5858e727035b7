//! Monthly scheduler for the accrual job.
//!
//! Fires once a month at a fixed day and hour (UTC). Firings run one after the
//! other on the same task, so two runs of the job never overlap.

use crate::{
    config::accrual::{AccrualSettings, ScheduleConfig},
    core::trigger::fire_scheduled_run,
    errors::{Error, Result},
};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use sea_orm::DatabaseConnection;
use tracing::{info, instrument};

/// A monthly firing slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlySchedule {
    day_of_month: u32,
    hour: u32,
}

impl MonthlySchedule {
    /// Creates a schedule; the day must exist in every month (1-28).
    pub fn new(day_of_month: u32, hour: u32) -> Result<Self> {
        if !(1..=28).contains(&day_of_month) || hour > 23 {
            return Err(Error::InvalidConfig {
                message: format!("invalid schedule slot: day {day_of_month} hour {hour}"),
            });
        }
        Ok(Self { day_of_month, hour })
    }

    fn slot_in(&self, year: i32, month: u32) -> Result<DateTime<Utc>> {
        NaiveDate::from_ymd_opt(year, month, self.day_of_month)
            .and_then(|d| d.and_hms_opt(self.hour, 0, 0))
            .map(|dt| dt.and_utc())
            .ok_or(Error::InvalidPeriod {
                year,
                month: i32::try_from(month).unwrap_or(i32::MAX),
            })
    }

    /// First firing strictly after `after`.
    pub fn next_firing(&self, after: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let this_month = self.slot_in(after.year(), after.month())?;
        if this_month > after {
            return Ok(this_month);
        }
        let (year, month) = if after.month() == 12 {
            (after.year() + 1, 1)
        } else {
            (after.year(), after.month() + 1)
        };
        self.slot_in(year, month)
    }
}

impl TryFrom<ScheduleConfig> for MonthlySchedule {
    type Error = Error;

    fn try_from(config: ScheduleConfig) -> Result<Self> {
        Self::new(config.day_of_month, config.hour)
    }
}

/// Runs the monthly accrual job forever.
///
/// Sleeps until the next slot, fires, and repeats. A failed firing is logged by
/// [`fire_scheduled_run`] and does not stop the loop.
#[instrument(skip_all)]
pub async fn run_scheduler(db: &DatabaseConnection, settings: &AccrualSettings) -> Result<()> {
    let schedule = MonthlySchedule::try_from(settings.schedule)?;

    loop {
        let now = Utc::now();
        let next = schedule.next_firing(now)?;
        info!(next_firing = %next, "Waiting for next monthly accrual");

        let wait = (next - now).to_std().unwrap_or_default();
        tokio::time::sleep(wait).await;

        fire_scheduled_run(db, settings, Utc::now()).await;
    }
}
