//! MS-DOS packed date/time decoding.
//!
//! Local headers store the modification time as two 16-bit words:
//!
//! ```text
//! date: yyyyyyym mmmddddd   (year - 1980, month 1-12, day 1-31)
//! time: hhhhhmmm mmmsssss   (hour, minute, second / 2)
//! ```

use time::{Date, Duration, Month, OffsetDateTime};

use super::config::ScanConfig;
use super::error::{Result, ZipError};

const DOS_EPOCH_YEAR: u16 = 1980;

/// The unpacked components of a DOS timestamp, before any validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DosDateTime {
    pub year: u16,
    pub month: u16,
    pub day: u16,
    pub hour: u16,
    pub minute: u16,
    pub second: u16,
}

impl DosDateTime {
    pub fn unpack(date: u16, time: u16) -> Self {
        Self {
            year: ((date >> 9) & 0x7F) + DOS_EPOCH_YEAR,
            month: (date >> 5) & 0x0F,
            day: date & 0x1F,
            hour: (time >> 11) & 0x1F,
            minute: (time >> 5) & 0x3F,
            second: (time & 0x1F) * 2,
        }
    }

    /// First component outside its calendar range, if any. Days are not
    /// checked against the length of the month.
    fn out_of_range(&self) -> Option<(&'static str, u16)> {
        if !(1..=12).contains(&self.month) {
            Some(("month", self.month))
        } else if !(1..=31).contains(&self.day) {
            Some(("day", self.day))
        } else if self.hour > 23 {
            Some(("hour", self.hour))
        } else if self.minute > 59 {
            Some(("minute", self.minute))
        } else if self.second > 59 {
            Some(("second", self.second))
        } else {
            None
        }
    }

    /// Builds a UTC timestamp, carrying overflowing components into the next
    /// larger unit (month 13 is January of the following year, day 0 is the
    /// last day of the previous month).
    fn to_utc(self) -> Result<OffsetDateTime> {
        let months = i32::from(self.year) * 12 + i32::from(self.month) - 1;
        let month = Month::try_from((months.rem_euclid(12) + 1) as u8).map_err(|_| {
            ZipError::InvalidDateRange {
                field: "month",
                value: self.month,
            }
        })?;
        let first = Date::from_calendar_date(months.div_euclid(12), month, 1).map_err(|_| {
            ZipError::InvalidDateRange {
                field: "year",
                value: self.year,
            }
        })?;

        Ok(first.midnight().assume_utc()
            + Duration::days(i64::from(self.day) - 1)
            + Duration::hours(i64::from(self.hour))
            + Duration::minutes(i64::from(self.minute))
            + Duration::seconds(i64::from(self.second)))
    }
}

/// Decode a packed DOS date/time pair into a UTC timestamp.
///
/// In strict mode an out-of-range component fails with
/// [`ZipError::InvalidDateRange`] and a timestamp after the current clock
/// with [`ZipError::FutureTimestamp`]. Otherwise both are logged and the
/// decoded value is returned as is.
pub fn decode_dos_datetime(date: u16, time: u16, config: &ScanConfig) -> Result<OffsetDateTime> {
    let parts = DosDateTime::unpack(date, time);

    if let Some((field, value)) = parts.out_of_range() {
        if config.strict {
            return Err(ZipError::InvalidDateRange { field, value });
        }
        log::warn!("MS-DOS timestamp has {field} {value} out of range (date={date:#06x}, time={time:#06x})");
    }

    let timestamp = parts.to_utc()?;
    if timestamp > OffsetDateTime::now_utc() {
        if config.strict {
            return Err(ZipError::FutureTimestamp(timestamp));
        }
        log::warn!("Modification time {timestamp} lies in the future");
    }

    Ok(timestamp)
}
