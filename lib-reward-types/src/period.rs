//! Reward periods and calendar boundary resolution.
//!
//! A period is identified by `(period_type, start_seconds)`. Boundary
//! resolution is deterministic: the same anchor date and time zone
//! always produce the same `[start, end)` instants. Boundaries fall on
//! local midnight in the configured zone, never server-local time.

use chrono::{Datelike, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::EpochSeconds;

/// Recurrence of the reward cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardPeriodType {
    /// Monday through Sunday
    Week,
    /// Calendar month
    Month,
    /// Calendar quarter (Jan/Apr/Jul/Oct)
    Quarter,
}

impl RewardPeriodType {
    pub const DEFAULT: RewardPeriodType = RewardPeriodType::Week;

    /// Resolve the period containing `date`, with boundaries at local
    /// midnight in `zone`. End is exclusive (first midnight of the
    /// next period).
    pub fn period_of(&self, date: NaiveDate, zone: Tz) -> RewardPeriod {
        let start_day = match self {
            RewardPeriodType::Week => {
                date - Duration::days(date.weekday().num_days_from_monday() as i64)
            }
            RewardPeriodType::Month => first_of_month(date.year(), date.month()),
            RewardPeriodType::Quarter => {
                let quarter_month = ((date.month() - 1) / 3) * 3 + 1;
                first_of_month(date.year(), quarter_month)
            }
        };
        let end_day = match self {
            RewardPeriodType::Week => start_day + Duration::days(7),
            RewardPeriodType::Month => next_month(start_day.year(), start_day.month()),
            RewardPeriodType::Quarter => {
                let (mut year, mut month) = (start_day.year(), start_day.month() + 3);
                if month > 12 {
                    month -= 12;
                    year += 1;
                }
                first_of_month(year, month)
            }
        };
        RewardPeriod {
            id: None,
            period_type: *self,
            start_seconds: day_start_seconds(start_day, zone),
            end_seconds: day_start_seconds(end_day, zone),
            time_zone: zone,
            status: RewardPeriodStatus::Estimation,
        }
    }
}

impl std::fmt::Display for RewardPeriodType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RewardPeriodType::Week => write!(f, "week"),
            RewardPeriodType::Month => write!(f, "month"),
            RewardPeriodType::Quarter => write!(f, "quarter"),
        }
    }
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    // month is always 1..=12 here
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

fn next_month(year: i32, month: u32) -> NaiveDate {
    if month == 12 {
        first_of_month(year + 1, 1)
    } else {
        first_of_month(year, month + 1)
    }
}

/// Epoch seconds of local midnight on `date` in `zone`.
///
/// When a DST transition removes midnight, the first valid local
/// instant of that day is used instead.
fn day_start_seconds(date: NaiveDate, zone: Tz) -> EpochSeconds {
    let midnight = date.and_time(NaiveTime::MIN);
    match zone.from_local_datetime(&midnight) {
        LocalResult::Single(dt) => dt.timestamp(),
        LocalResult::Ambiguous(earliest, _) => earliest.timestamp(),
        LocalResult::None => zone
            .from_local_datetime(&(midnight + Duration::hours(1)))
            .earliest()
            .map(|dt| dt.timestamp())
            .unwrap_or_else(|| Utc.from_utc_datetime(&midnight).timestamp()),
    }
}

/// Lifecycle of a period's disbursement.
///
/// Progresses `Estimation -> Pending -> {Success, Error}` as
/// transactions are submitted and confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RewardPeriodStatus {
    /// Computed, nothing sent yet
    #[default]
    Estimation,
    /// At least one transaction submitted, not all confirmed
    Pending,
    /// Every valid reward has a succeeded transaction
    Success,
    /// Disbursement finished with at least one failed transaction
    Error,
}

/// One bounded reward window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardPeriod {
    /// Assigned on first persistence, `None` for unsaved periods
    pub id: Option<u64>,
    pub period_type: RewardPeriodType,
    /// Inclusive start, epoch seconds
    pub start_seconds: EpochSeconds,
    /// Exclusive end, epoch seconds
    pub end_seconds: EpochSeconds,
    pub time_zone: Tz,
    pub status: RewardPeriodStatus,
}

impl RewardPeriod {
    /// Stable identity of this period, independent of persistence.
    pub fn key(&self) -> (RewardPeriodType, EpochSeconds) {
        (self.period_type, self.start_seconds)
    }

    pub fn contains(&self, seconds: EpochSeconds) -> bool {
        seconds >= self.start_seconds && seconds < self.end_seconds
    }

    /// Instant halfway through the period, always strictly inside it.
    pub fn median_seconds(&self) -> EpochSeconds {
        self.start_seconds + (self.end_seconds - self.start_seconds) / 2
    }

    /// A period is sendable only once its end has passed.
    pub fn is_closed(&self, now_seconds: EpochSeconds) -> bool {
        self.end_seconds <= now_seconds
    }
}
