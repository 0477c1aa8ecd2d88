//! Calendar time and the raw time-register block of the DS3231.
//!
//! The DS3231 stores date and time in 7 consecutive BCD registers:
//! seconds, minutes, hours, day-of-week, date, month, year.
//! [`RawTimeBlock`] is that byte image and [`CalendarTime`] the decoded
//! value an application works with.
//!
//! # Clamping
//!
//! Encoding never fails. Fields above what the chip can hold are saturated
//! (second 59, minute 59, hour 23, day 31, month 12, year 2099) and years
//! before 2000 are raised to 2000. This keeps compatibility with existing
//! firmware that relies on it, at the cost of hiding caller bugs; a
//! validating mode would reject these values instead.
//!
//! # Day of week
//!
//! The day-of-week byte is computed from the date when encoding and passed
//! through untouched when decoding. A decoded `day_of_week` is whatever the
//! chip currently holds and may disagree with the date if something else
//! wrote the registers.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::codec::{bcd_to_decimal, day_of_week, decimal_to_bcd};
use crate::registers::{HOURS_MASK, MONTH_MASK, TIME_BLOCK_LEN};

/// First year the time block can represent.
pub const YEAR_MIN: u16 = 2000;
/// Last year the time block can represent.
pub const YEAR_MAX: u16 = 2099;

/// A calendar date and time as stored by the DS3231.
///
/// Hours are always 24-hour. `day_of_week` follows the chip convention
/// 1 = Monday through 7 = Sunday; it is ignored when writing and recomputed
/// from the date.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalendarTime {
    /// Year, 2000-2099
    pub year: u16,
    /// Month, 1-12
    pub month: u8,
    /// Day of month, 1-31
    pub day: u8,
    /// Hour, 0-23
    pub hour: u8,
    /// Minute, 0-59
    pub minute: u8,
    /// Second, 0-59
    pub second: u8,
    /// Day of week as held by the chip, 1-7 with 1 = Monday
    pub day_of_week: u8,
}

impl CalendarTime {
    /// Returns a copy with every field saturated to the chip range.
    #[must_use]
    pub fn clamped(&self) -> Self {
        Self {
            year: self.year.clamp(YEAR_MIN, YEAR_MAX),
            month: self.month.min(12),
            day: self.day.min(31),
            hour: self.hour.min(23),
            minute: self.minute.min(59),
            second: self.second.min(59),
            day_of_week: self.day_of_week,
        }
    }
}

/// The 7-byte time-register image, seconds first.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct RawTimeBlock(pub [u8; TIME_BLOCK_LEN]);

impl RawTimeBlock {
    /// Packs a calendar time, clamping fields and computing the day of week.
    #[must_use]
    pub fn encode(time: &CalendarTime) -> Self {
        Self::pack(&time.clamped())
    }

    /// Packs a calendar time whose fields are already in range.
    pub(crate) fn pack(time: &CalendarTime) -> Self {
        let year_offset = time.year.saturating_sub(YEAR_MIN) as u8;
        RawTimeBlock([
            decimal_to_bcd(time.second),
            decimal_to_bcd(time.minute),
            decimal_to_bcd(time.hour),
            day_of_week(time.day, time.month, time.year) + 1,
            decimal_to_bcd(time.day),
            decimal_to_bcd(time.month),
            decimal_to_bcd(year_offset),
        ])
    }

    /// Unpacks the registers. The 12/24-hour flag and the century flag are
    /// masked off and the day-of-week byte is returned as stored.
    #[must_use]
    pub fn decode(&self) -> CalendarTime {
        let data = &self.0;
        CalendarTime {
            second: bcd_to_decimal(data[0]),
            minute: bcd_to_decimal(data[1]),
            hour: bcd_to_decimal(data[2] & HOURS_MASK),
            day_of_week: data[3],
            day: bcd_to_decimal(data[4]),
            month: bcd_to_decimal(data[5] & MONTH_MASK),
            year: YEAR_MIN + u16::from(bcd_to_decimal(data[6])),
        }
    }

    /// Raw register bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; TIME_BLOCK_LEN] {
        &self.0
    }
}

impl From<[u8; TIME_BLOCK_LEN]> for RawTimeBlock {
    fn from(data: [u8; TIME_BLOCK_LEN]) -> Self {
        RawTimeBlock(data)
    }
}

impl From<RawTimeBlock> for [u8; TIME_BLOCK_LEN] {
    fn from(raw: RawTimeBlock) -> Self {
        raw.0
    }
}

impl From<&CalendarTime> for RawTimeBlock {
    fn from(time: &CalendarTime) -> Self {
        RawTimeBlock::encode(time)
    }
}

impl From<&RawTimeBlock> for CalendarTime {
    fn from(raw: &RawTimeBlock) -> Self {
        raw.decode()
    }
}

impl From<&NaiveDateTime> for CalendarTime {
    /// Years outside 2000-2099 are saturated into range.
    fn from(datetime: &NaiveDateTime) -> Self {
        let year = datetime
            .year()
            .clamp(i32::from(YEAR_MIN), i32::from(YEAR_MAX)) as u16;
        CalendarTime {
            year,
            month: datetime.month() as u8,
            day: datetime.day() as u8,
            hour: datetime.hour() as u8,
            minute: datetime.minute() as u8,
            second: datetime.second() as u8,
            day_of_week: datetime.weekday().number_from_monday() as u8,
        }
    }
}

impl TryFrom<&CalendarTime> for NaiveDateTime {
    type Error = DS3231DateTimeError;

    fn try_from(time: &CalendarTime) -> Result<Self, Self::Error> {
        NaiveDate::from_ymd_opt(i32::from(time.year), u32::from(time.month), u32::from(time.day))
            .and_then(|d| {
                d.and_hms_opt(
                    u32::from(time.hour),
                    u32::from(time.minute),
                    u32::from(time.second),
                )
            })
            .ok_or(DS3231DateTimeError::InvalidDateTime)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Errors converting between chip time and chrono types.
pub enum DS3231DateTimeError {
    /// The decoded fields do not form a real date/time (e.g. month 0 or February 30)
    InvalidDateTime,
}
