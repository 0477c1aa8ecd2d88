//! Alarm register layout for the DS3231 RTC.
//!
//! Alarm 1 occupies 0x07-0x0A (seconds, minutes, hours, day/date) and
//! alarm 2 occupies 0x0B-0x0D (minutes, hours, day/date). Only the time
//! values are handled here. The match-mode mask bits (bit 7 of each
//! register) and the DY/DT select bit are written as zero and stripped on
//! read.

use embedded_hal::i2c::I2c;

use crate::codec::{bcd_to_decimal, decimal_to_bcd};
use crate::registers::{
    ALARM1_BLOCK_LEN, ALARM2_BLOCK_LEN, ALARM_DAY_DATE_MASK, ALARM_MINSEC_MASK, HOURS_MASK,
};
use crate::{DS3231Error, RegAddr, DS3231};

/// Alarm time values, 24-hour.
///
/// Encoding clamps each field like the time block does: day to 31, hour to
/// 23, minute and second to 59.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmTime {
    /// Day of month, 1-31
    pub day: u8,
    /// Hour, 0-23
    pub hour: u8,
    /// Minute, 0-59
    pub minute: u8,
    /// Second, 0-59 (alarm 2 has no seconds register)
    pub second: u8,
}

impl AlarmTime {
    /// Packs the alarm 1 block: seconds, minutes, hours, day/date.
    #[must_use]
    pub fn to_alarm1_block(&self) -> [u8; ALARM1_BLOCK_LEN] {
        [
            decimal_to_bcd(self.second.min(59)),
            decimal_to_bcd(self.minute.min(59)),
            decimal_to_bcd(self.hour.min(23)),
            decimal_to_bcd(self.day.min(31)),
        ]
    }

    /// Packs the alarm 2 block: minutes, hours, day/date.
    #[must_use]
    pub fn to_alarm2_block(&self) -> [u8; ALARM2_BLOCK_LEN] {
        [
            decimal_to_bcd(self.minute.min(59)),
            decimal_to_bcd(self.hour.min(23)),
            decimal_to_bcd(self.day.min(31)),
        ]
    }

    /// Unpacks an alarm 1 block, ignoring mask and DY/DT bits.
    #[must_use]
    pub fn from_alarm1_block(data: &[u8; ALARM1_BLOCK_LEN]) -> Self {
        AlarmTime {
            second: bcd_to_decimal(data[0] & ALARM_MINSEC_MASK),
            minute: bcd_to_decimal(data[1] & ALARM_MINSEC_MASK),
            hour: bcd_to_decimal(data[2] & HOURS_MASK),
            day: bcd_to_decimal(data[3] & ALARM_DAY_DATE_MASK),
        }
    }

    /// Unpacks an alarm 2 block. `second` is always 0.
    #[must_use]
    pub fn from_alarm2_block(data: &[u8; ALARM2_BLOCK_LEN]) -> Self {
        AlarmTime {
            second: 0,
            minute: bcd_to_decimal(data[0] & ALARM_MINSEC_MASK),
            hour: bcd_to_decimal(data[1] & HOURS_MASK),
            day: bcd_to_decimal(data[2] & ALARM_DAY_DATE_MASK),
        }
    }
}

impl<I2C: I2c> DS3231<I2C> {
    /// Writes the alarm 1 time registers.
    ///
    /// # Errors
    /// Returns `DS3231Error::I2c` on bus failure or
    /// `DS3231Error::TransferPending` while a deferred time read is running.
    pub fn set_alarm1(&mut self, alarm: &AlarmTime) -> Result<(), DS3231Error<I2C::Error>> {
        self.ensure_idle()?;
        let data = alarm.to_alarm1_block();
        debug!("DS3231: alarm1 <- {:?}", data);
        self.i2c.write(
            self.address,
            &[RegAddr::Alarm1Seconds as u8, data[0], data[1], data[2], data[3]],
        )?;
        Ok(())
    }

    /// Reads the alarm 1 time registers.
    ///
    /// # Errors
    /// Same as [`DS3231::set_alarm1`].
    pub fn alarm1(&mut self) -> Result<AlarmTime, DS3231Error<I2C::Error>> {
        self.ensure_idle()?;
        let mut data = [0; ALARM1_BLOCK_LEN];
        self.i2c
            .write_read(self.address, &[RegAddr::Alarm1Seconds as u8], &mut data)?;
        Ok(AlarmTime::from_alarm1_block(&data))
    }

    /// Writes the alarm 2 time registers. `alarm.second` is ignored.
    ///
    /// # Errors
    /// Same as [`DS3231::set_alarm1`].
    pub fn set_alarm2(&mut self, alarm: &AlarmTime) -> Result<(), DS3231Error<I2C::Error>> {
        self.ensure_idle()?;
        let data = alarm.to_alarm2_block();
        debug!("DS3231: alarm2 <- {:?}", data);
        self.i2c.write(
            self.address,
            &[RegAddr::Alarm2Minutes as u8, data[0], data[1], data[2]],
        )?;
        Ok(())
    }

    /// Reads the alarm 2 time registers.
    ///
    /// # Errors
    /// Same as [`DS3231::set_alarm1`].
    pub fn alarm2(&mut self) -> Result<AlarmTime, DS3231Error<I2C::Error>> {
        self.ensure_idle()?;
        let mut data = [0; ALARM2_BLOCK_LEN];
        self.i2c
            .write_read(self.address, &[RegAddr::Alarm2Minutes as u8], &mut data)?;
        Ok(AlarmTime::from_alarm2_block(&data))
    }
}
