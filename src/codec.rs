//! Packed-decimal (BCD) conversion and day-of-week computation.
//!
//! The DS3231 keeps every time and alarm field as two BCD digits. These
//! helpers are the only place nibble arithmetic happens; everything above
//! them works with plain decimal values.

/// Converts a BCD register byte to its decimal value.
///
/// The high nibble is the tens digit and the low nibble the ones digit.
/// Nibbles above 9 are not rejected: the result is whatever the arithmetic
/// gives, mirroring what the chip reports.
#[must_use]
pub const fn bcd_to_decimal(bcd: u8) -> u8 {
    ((bcd & 0xF0) >> 4) * 10 + (bcd & 0x0F)
}

/// Converts a decimal value in `0..=99` to a BCD byte.
///
/// Callers clamp first; values above 99 produce an unspecified byte but
/// never panic.
#[must_use]
pub const fn decimal_to_bcd(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}

/// Computes the day of week for a calendar date.
///
/// Returns `0..=6` with 0 = Monday and 6 = Sunday. The time block stores
/// this value plus one, so the chip sees 1 = Monday through 7 = Sunday.
#[must_use]
pub fn day_of_week(day: u8, month: u8, year: u16) -> u8 {
    let day = i32::from(day);
    let m = 1 + (9 + i32::from(month)) % 12;
    let y = i32::from(year) - i32::from(m > 10);
    let c = y.div_euclid(100);
    let d = y.rem_euclid(100);
    let n = (13 * m - 1) / 5 + d + d / 4 + 6 * c + day + 5;
    // rem_euclid keeps the result in 0..7 even for pathological inputs
    n.rem_euclid(7) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate};

    #[test]
    fn test_bcd_to_decimal() {
        assert_eq!(bcd_to_decimal(0x00), 0);
        assert_eq!(bcd_to_decimal(0x09), 9);
        assert_eq!(bcd_to_decimal(0x10), 10);
        assert_eq!(bcd_to_decimal(0x59), 59);
        assert_eq!(bcd_to_decimal(0x99), 99);
    }

    #[test]
    fn test_decimal_to_bcd() {
        assert_eq!(decimal_to_bcd(0), 0x00);
        assert_eq!(decimal_to_bcd(7), 0x07);
        assert_eq!(decimal_to_bcd(23), 0x23);
        assert_eq!(decimal_to_bcd(59), 0x59);
        assert_eq!(decimal_to_bcd(99), 0x99);
    }

    #[test]
    fn test_bcd_inverse_over_register_range() {
        for value in 0..=99u8 {
            assert_eq!(bcd_to_decimal(decimal_to_bcd(value)), value);
        }
    }

    #[test]
    fn test_malformed_nibbles_are_not_validated() {
        // 0x1A is not valid BCD, the arithmetic result is passed through
        assert_eq!(bcd_to_decimal(0x1A), 20);
        assert_eq!(bcd_to_decimal(0xFF), 165);
    }

    #[test]
    fn test_decimal_to_bcd_does_not_panic_above_range() {
        for value in 100..=255u8 {
            let _ = decimal_to_bcd(value);
        }
    }

    #[test]
    fn test_day_of_week_known_dates() {
        // 2000-01-01 was a Saturday
        assert_eq!(day_of_week(1, 1, 2000), 5);
        // 2024-03-10 was a Sunday
        assert_eq!(day_of_week(10, 3, 2024), 6);
        // 2024-03-14 was a Thursday
        assert_eq!(day_of_week(14, 3, 2024), 3);
        // 2023-02-28 was a Tuesday
        assert_eq!(day_of_week(28, 2, 2023), 1);
        // 2099-12-31 is a Thursday
        assert_eq!(day_of_week(31, 12, 2099), 3);
    }

    #[test]
    fn test_day_of_week_matches_chrono() {
        let mut date = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2001, 3, 1).unwrap();
        while date < end {
            let expected = date.weekday().num_days_from_monday() as u8;
            assert_eq!(
                day_of_week(date.day() as u8, date.month() as u8, date.year() as u16),
                expected,
                "mismatch for {:?}",
                date
            );
            date = date.succ_opt().unwrap();
        }
    }
}
