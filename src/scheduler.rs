//! SM-2-derived review scheduling.
//!
//! A rating maps onto the classic SM-2 0-5 grade scale, then the schedule is
//! advanced: failed recalls reset the repetition streak and come back within
//! minutes or a day, successful recalls grow the interval by a fixed ladder
//! and then multiplicatively. Day-granular reviews come due at local midnight
//! of their target day.

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The ease factor never drops below this, no matter how many lapses.
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Ease factor assigned to a freshly added card.
pub const INITIAL_EASE_FACTOR: f64 = 2.5;

/// An interval of 0 days means "retry within the same sitting", this long
/// from the rating.
const RETRY_DELAY_MINUTES: i64 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("quality rating {0} is out of range (expected 0-4)")]
    InvalidQuality(u8),
}

/// How well the answer was recalled, from a total blackout to an instant hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quality {
    Again = 0,
    Hard = 1,
    Hesitant = 2,
    Good = 3,
    Easy = 4,
}

impl Quality {
    pub fn from_value(value: u8) -> Result<Self, ScheduleError> {
        match value {
            0 => Ok(Self::Again),
            1 => Ok(Self::Hard),
            2 => Ok(Self::Hesitant),
            3 => Ok(Self::Good),
            4 => Ok(Self::Easy),
            _ => Err(ScheduleError::InvalidQuality(value)),
        }
    }

    /// Position on the SM-2 0-5 grade scale. Grade 2 has no counterpart in
    /// this rating set, so recalled answers shift up by one and land at 3-5.
    fn sm2_grade(self) -> u8 {
        let q = self as u8;
        if q <= 1 {
            q
        } else {
            q + 1
        }
    }

    /// Whether the answer counts as recalled (`Hesitant` and up).
    pub fn is_recalled(self) -> bool {
        self.sm2_grade() >= 3
    }
}

/// Per-card scheduling state, persisted between reviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSchedule {
    pub ease_factor: f64,
    pub interval_days: u32,
    pub repetitions: u32,
    pub next_review: DateTime<Utc>,
}

impl CardSchedule {
    /// Schedule for a card that has never been reviewed: due immediately.
    pub fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            ease_factor: INITIAL_EASE_FACTOR,
            interval_days: 0,
            repetitions: 0,
            next_review: now,
        }
    }

    /// Compute the schedule after rating this card with `quality` at `now`.
    ///
    /// Pure: the same inputs always produce the same output. `now` is taken
    /// in the reviewer's time zone so that day-granular due dates can be
    /// pinned to local midnight.
    pub fn review<Tz: TimeZone>(&self, quality: Quality, now: DateTime<Tz>) -> CardSchedule {
        let (interval_days, repetitions, ease_factor) = if quality.is_recalled() {
            let repetitions = self.repetitions + 1;
            let interval_days = match repetitions {
                1 => 1,
                2 => match quality {
                    Quality::Hesitant => 3,
                    Quality::Good => 6,
                    // Again and Hard take the failure branch below
                    _ => 7,
                },
                _ => {
                    let multiplier = match quality {
                        Quality::Hesitant => 1.5,
                        Quality::Good => self.ease_factor,
                        _ => self.ease_factor * 1.2,
                    };
                    (f64::from(self.interval_days) * multiplier).round() as u32
                }
            };
            (
                interval_days,
                repetitions,
                next_ease_factor(self.ease_factor, quality),
            )
        } else {
            // A blackout comes back this sitting; a hard failure waits a day.
            let interval_days = match quality {
                Quality::Again => 0,
                _ => 1,
            };
            let ease_factor = (self.ease_factor - 0.2).max(MIN_EASE_FACTOR);
            (interval_days, 0, ease_factor)
        };

        CardSchedule {
            ease_factor: round_ease(ease_factor),
            interval_days,
            repetitions,
            next_review: next_review_at(now, interval_days),
        }
    }
}

/// SM-2 ease adjustment: `EF' = EF + (0.1 - (5 - g)(0.08 + (5 - g) * 0.02))`,
/// floored at [`MIN_EASE_FACTOR`].
fn next_ease_factor(current: f64, quality: Quality) -> f64 {
    let g = f64::from(quality.sm2_grade());
    let adjusted = current + (0.1 - (5.0 - g) * (0.08 + (5.0 - g) * 0.02));
    adjusted.max(MIN_EASE_FACTOR)
}

/// Two decimal places, the precision the store keeps.
fn round_ease(ease_factor: f64) -> f64 {
    (ease_factor * 100.0).round() / 100.0
}

/// Interval 0 retries [`RETRY_DELAY_MINUTES`] from now; anything longer is
/// due at local midnight of the target day, whatever the time of rating.
fn next_review_at<Tz: TimeZone>(now: DateTime<Tz>, interval_days: u32) -> DateTime<Utc> {
    if interval_days == 0 {
        return now.with_timezone(&Utc) + Duration::minutes(RETRY_DELAY_MINUTES);
    }
    let target = now + Duration::days(i64::from(interval_days));
    let midnight = target.date_naive().and_time(NaiveTime::MIN);
    match target.timezone().from_local_datetime(&midnight).earliest() {
        Some(start_of_day) => start_of_day.with_timezone(&Utc),
        // midnight skipped by a DST transition
        None => target.with_timezone(&Utc),
    }
}
