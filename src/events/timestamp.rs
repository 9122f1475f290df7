use crate::tables::TimeRow;
use chrono::{DateTime, Datelike, Local, NaiveDateTime, Timelike};
use clap::ValueEnum;

/// Zone used to turn epoch timestamps into calendar time.
///
/// The derived timestamps carry no zone themselves. `Local` uses the zone of
/// the machine running the job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum TimeZoneMode {
    #[default]
    Local,
    Utc,
}

impl TimeZoneMode {
    /// Converts epoch milliseconds to a second-granularity naive timestamp.
    ///
    /// Sub-second precision is dropped toward the past, so `-1` ms lands on
    /// the last second before the epoch.
    pub fn start_time(self, ts_millis: i64) -> Option<NaiveDateTime> {
        let utc = DateTime::from_timestamp(ts_millis.div_euclid(1000), 0)?;
        Some(match self {
            TimeZoneMode::Utc => utc.naive_utc(),
            TimeZoneMode::Local => utc.with_timezone(&Local).naive_local(),
        })
    }
}

/// Calendar breakdown of a start time for the `time` table.
pub fn time_row(start_time: NaiveDateTime) -> TimeRow {
    TimeRow {
        start_time,
        hour: start_time.hour() as i32,
        day: start_time.day() as i32,
        week: start_time.iso_week().week() as i32,
        month: start_time.month() as i32,
        year: start_time.year(),
        weekday: start_time.weekday().number_from_sunday() as i32,
    }
}
