//! Data periods and modified Julian day helpers.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Unix time of the MJD epoch, 1858-11-17T00:00:00Z.
const MJD_EPOCH_UNIX_SECONDS: i64 = -3_506_716_800;

/// Modified Julian day of a UTC timestamp.
pub fn mjd_from_datetime(time: DateTime<Utc>) -> f64 {
    let seconds = (time.timestamp() - MJD_EPOCH_UNIX_SECONDS) as f64
        + time.timestamp_subsec_nanos() as f64 * 1e-9;
    seconds / SECONDS_PER_DAY
}

/// UTC timestamp of a modified Julian day, to the millisecond. `None` when
/// the day is not finite or outside chrono's range.
pub fn datetime_from_mjd(mjd: f64) -> Option<DateTime<Utc>> {
    let millis = ((mjd * SECONDS_PER_DAY + MJD_EPOCH_UNIX_SECONDS as f64) * 1000.0).round();
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return None;
    }
    Utc.timestamp_millis_opt(millis as i64).single()
}

/// Modified Julian day of midnight UTC on `date`.
pub fn mjd_from_date(date: NaiveDate) -> f64 {
    let midnight = date.and_hms_opt(0, 0, 0).map(|t| t.and_utc());
    midnight.map(mjd_from_datetime).unwrap_or(f64::NAN)
}

/// Where an observation lies relative to a data period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Previous,
    Current,
    Subsequent,
}

/// The time window whose observations take part in a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DataPeriod {
    /// Plain UTC window `[start, start + duration)`.
    Temporal { start_mjd: f64, duration_days: f64 },

    /// Sensor data-day: the window starts at `min_data_hour` (UTC hour at the
    /// date line with the fewest observations) and observation times are
    /// shifted by their local solar offset, so one orbit's swath is not split
    /// across two periods at the date line.
    Spatial {
        start_mjd: f64,
        duration_days: f64,
        min_data_hour: f64,
    },
}

impl DataPeriod {
    pub fn start_mjd(&self) -> f64 {
        match *self {
            Self::Temporal { start_mjd, .. } => start_mjd,
            Self::Spatial {
                start_mjd,
                min_data_hour,
                ..
            } => start_mjd + min_data_hour / 24.0,
        }
    }

    pub fn end_mjd(&self) -> f64 {
        match *self {
            Self::Temporal { duration_days, .. } | Self::Spatial { duration_days, .. } => {
                self.start_mjd() + duration_days
            }
        }
    }

    /// Membership of an observation at longitude `lon` taken at `mjd`.
    pub fn membership(&self, lon: f64, mjd: f64) -> Membership {
        let t = match self {
            Self::Temporal { .. } => mjd,
            // Local solar time.
            Self::Spatial { .. } => mjd + lon / 360.0,
        };
        if t < self.start_mjd() {
            Membership::Previous
        } else if t >= self.end_mjd() {
            Membership::Subsequent
        } else {
            Membership::Current
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let (start, duration) = match *self {
            Self::Temporal {
                start_mjd,
                duration_days,
            } => (start_mjd, duration_days),
            Self::Spatial {
                start_mjd,
                duration_days,
                min_data_hour,
            } => {
                if !(0.0..=24.0).contains(&min_data_hour) {
                    return Err(format!("min_data_hour must be in [0, 24], got {min_data_hour}"));
                }
                (start_mjd, duration_days)
            }
        };
        if !start.is_finite() {
            return Err("data period start must be finite".to_string());
        }
        if duration.is_nan() || duration <= 0.0 {
            return Err(format!("data period duration must be > 0, got {duration}"));
        }
        Ok(())
    }
}
