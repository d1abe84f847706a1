//! Working day counting.
//!
//! The calendar is weekday-only: Monday to Friday count, Saturday and
//! Sunday do not. There is no holiday awareness and no half days.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::AuditStep;

/// The result of counting the working days in a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingDaysResult {
    /// Number of weekdays between start and end, both inclusive.
    pub working_days: u32,
    /// Number of calendar days scanned.
    pub calendar_days: u32,
    /// The audit step recording this count.
    pub audit_step: AuditStep,
}

/// Returns true for Monday through Friday.
pub fn is_working_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Counts the weekdays from `start` to `end`, both inclusive.
///
/// Returns 0 when `end` precedes `start`.
///
/// # Examples
///
/// ```
/// use payslip_engine::calculation::count_working_days;
/// use chrono::NaiveDate;
///
/// // January 2025 has 23 weekdays.
/// let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
/// assert_eq!(count_working_days(start, end), 23);
/// ```
pub fn count_working_days(start: NaiveDate, end: NaiveDate) -> u32 {
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .filter(|day| is_working_day(*day))
        .count() as u32
}

/// Counts the working days in a period and rejects a period with none.
///
/// # Errors
///
/// Returns [`EngineError::InvalidPeriod`] when the count is zero (a
/// weekend-only range, or `end` before `start`). A zero count would make
/// the daily rate undefined, so it is never silently treated as zero.
pub fn calculate_working_days(
    start: NaiveDate,
    end: NaiveDate,
    step_number: u32,
) -> EngineResult<WorkingDaysResult> {
    let working_days = count_working_days(start, end);
    if working_days == 0 {
        return Err(EngineError::InvalidPeriod { start, end });
    }

    let calendar_days = ((end - start).num_days() + 1) as u32;

    let audit_step = AuditStep {
        step_number,
        rule_id: "working_days".to_string(),
        rule_name: "Working Day Count".to_string(),
        input: serde_json::json!({
            "start_date": start.to_string(),
            "end_date": end.to_string()
        }),
        output: serde_json::json!({
            "working_days": working_days,
            "calendar_days": calendar_days
        }),
        reasoning: format!(
            "{} weekdays in {} calendar days from {} to {}",
            working_days, calendar_days, start, end
        ),
    };

    Ok(WorkingDaysResult {
        working_days,
        calendar_days,
        audit_step,
    })
}
