//! # DS3231 Real-Time Clock Driver
//!
//! A platform-agnostic `no_std` driver for the DS3231 battery-backed
//! real-time clock, built on the `embedded-hal` 1.0 I2C traits.
//!
//! ## Features
//!
//! - Packed-decimal conversion between the time registers and [`CalendarTime`]
//! - Blocking time reads and writes
//! - Deferred time reads: start the transfer now, decode it from the
//!   transport's completion signal later (see [`transfer`])
//! - Bit-safe read-modify-write of the control and status registers
//! - One call per oscillator, square-wave and interrupt setting
//! - Alarm 1 / alarm 2 time registers
//! - Optional async driver over `embedded-hal-async` (`async` feature)
//! - Optional logging through `log` or `defmt`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ds3231_rtc::{CalendarTime, Config, DS3231, DEFAULT_ADDRESS};
//!
//! let mut rtc = DS3231::new(i2c, DEFAULT_ADDRESS);
//! rtc.configure(&Config::default())?;
//!
//! rtc.set_time(&CalendarTime {
//!     year: 2024,
//!     month: 3,
//!     day: 14,
//!     hour: 15,
//!     minute: 30,
//!     second: 0,
//!     day_of_week: 0, // recomputed from the date
//! })?;
//!
//! let now = rtc.read_time()?;
//! ```
//!
//! With a transport implementing [`DeferredRead`]:
//!
//! ```rust,ignore
//! // on the 1 Hz square-wave edge
//! rtc.start_read()?;
//!
//! // from the transfer-complete interrupt
//! let now = rtc.decode_completed()?;
//! ```
//!
//! ## Cargo features
//!
//! - `async`: adds [`asynch::DS3231`] for `embedded-hal-async` buses
//! - `log`: log register traffic through the `log` crate
//! - `defmt`: log register traffic through `defmt`
#![no_std]

#[macro_use]
mod fmt;

pub mod alarm;
#[cfg(feature = "async")]
pub mod asynch;
pub mod codec;
pub mod control;
pub mod datetime;
pub mod registers;
pub mod transfer;

use embedded_hal::i2c::I2c;
use paste::paste;

pub use crate::alarm::AlarmTime;
pub use crate::control::{with_bit, with_field2, ControlRegister};
pub use crate::datetime::{CalendarTime, DS3231DateTimeError, RawTimeBlock};
pub use crate::registers::{
    Control, InterruptControl, Oscillator, RegAddr, SquareWaveFrequency, Status,
};
pub use crate::transfer::{DeferredRead, TransferState};

/// Fixed I2C address of the DS3231.
pub const DEFAULT_ADDRESS: u8 = 0x68;

/// Startup configuration for the DS3231.
///
/// The default keeps the oscillator running, drives a battery-backed 1 Hz
/// square wave on INT/SQW (usable as a once-per-second interrupt) and turns
/// the 32 kHz output off.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Keep the oscillator running on battery power
    pub oscillator_running: bool,
    /// Keep the square wave running on battery power
    pub battery_backed_square_wave: bool,
    /// Square wave output frequency
    pub square_wave_frequency: SquareWaveFrequency,
    /// Drive the 32 kHz output pin
    pub enable_32khz_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            oscillator_running: true,
            battery_backed_square_wave: true,
            square_wave_frequency: SquareWaveFrequency::Hz1,
            enable_32khz_output: false,
        }
    }
}

/// Errors returned by the driver.
#[derive(Debug)]
pub enum DS3231Error<I2CE> {
    /// The bus transfer failed. Never retried by the driver.
    I2c(I2CE),
    /// A deferred time read is outstanding; decode it before issuing
    /// anything else.
    TransferPending,
    /// `decode_completed` was called without a started deferred read.
    NoTransferPending,
    /// The chip holds a time that is not a valid calendar date.
    DateTime(DS3231DateTimeError),
}

impl<I2CE> From<I2CE> for DS3231Error<I2CE> {
    fn from(e: I2CE) -> Self {
        DS3231Error::I2c(e)
    }
}

/// DS3231 Real-Time Clock driver.
///
/// Owns the bus handle and device address, so several clocks on different
/// buses can coexist, and holds the buffer used by deferred time reads.
pub struct DS3231<I2C: I2c> {
    i2c: I2C,
    address: u8,
    transfer: TransferState,
    buffer: RawTimeBlock,
}

impl<I2C: I2c> DS3231<I2C> {
    /// Creates a new driver instance.
    ///
    /// # Arguments
    /// * `i2c` - The I2C bus implementation
    /// * `address` - The I2C address of the device (normally [`DEFAULT_ADDRESS`])
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            transfer: TransferState::Idle,
            buffer: RawTimeBlock::default(),
        }
    }

    /// Releases the bus. A pending deferred read is abandoned with it.
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Applies a startup configuration.
    ///
    /// Runs [`DS3231::initialize_oscillator`] and then sets the 32 kHz output.
    ///
    /// # Errors
    /// Returns `DS3231Error::I2c` on bus failure or
    /// `DS3231Error::TransferPending` while a deferred read is outstanding.
    pub fn configure(&mut self, config: &Config) -> Result<(), DS3231Error<I2C::Error>> {
        debug!("DS3231: configure {:?}", config);
        self.initialize_oscillator(
            config.oscillator_running,
            config.battery_backed_square_wave,
            config.square_wave_frequency,
        )?;
        self.enable_32khz_output(config.enable_32khz_output)
    }

    /// Brings the oscillator and square-wave output to a known state.
    ///
    /// Sets BBSQW from `battery_backed`. When `running`, clears EOSC and
    /// INTCN so the square wave, not the alarm interrupt, drives INT/SQW;
    /// otherwise sets EOSC and leaves INTCN alone. The rate is applied last
    /// in both cases.
    ///
    /// # Errors
    /// Stops at the first failing register edit and returns its error.
    pub fn initialize_oscillator(
        &mut self,
        running: bool,
        battery_backed: bool,
        rate: SquareWaveFrequency,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.enable_battery_backed_square_wave(battery_backed)?;
        if running {
            self.enable_oscillator(true)?;
            self.enable_interrupt(false)?;
        } else {
            self.enable_oscillator(false)?;
        }
        self.set_square_wave_frequency(rate)
    }

    /// Starts or stops the oscillator. Enabling clears the EOSC bit.
    pub fn enable_oscillator(&mut self, enable: bool) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_register_bit(
            ControlRegister::Control,
            Control::OSCILLATOR_DISABLE_BIT,
            !enable,
        )
    }

    /// Keeps the square wave running on battery power (BBSQW).
    pub fn enable_battery_backed_square_wave(
        &mut self,
        enable: bool,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_register_bit(
            ControlRegister::Control,
            Control::BATTERY_BACKED_SQUARE_WAVE_BIT,
            enable,
        )
    }

    /// Sets or clears the temperature-conversion trigger (CONV).
    ///
    /// The chip clears the bit itself once the conversion finishes.
    pub fn enable_convert_temperature(
        &mut self,
        enable: bool,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_register_bit(
            ControlRegister::Control,
            Control::CONVERT_TEMPERATURE_BIT,
            enable,
        )
    }

    /// Selects the square-wave output frequency (RS2:RS1).
    ///
    /// Raw rates converted with `SquareWaveFrequency::from` saturate to
    /// 8.192 kHz.
    pub fn set_square_wave_frequency(
        &mut self,
        frequency: SquareWaveFrequency,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_register_field(
            ControlRegister::Control,
            Control::RATE_SELECT_SHIFT,
            frequency.into(),
        )
    }

    /// Routes alarms to INT/SQW instead of the square wave (INTCN).
    pub fn enable_interrupt(&mut self, enable: bool) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_register_bit(
            ControlRegister::Control,
            Control::INTERRUPT_CONTROL_BIT,
            enable,
        )
    }

    /// Enables the alarm 1 interrupt (A1IE).
    pub fn enable_alarm1_interrupt(&mut self, enable: bool) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_register_bit(
            ControlRegister::Control,
            Control::ALARM1_INTERRUPT_ENABLE_BIT,
            enable,
        )
    }

    /// Enables the alarm 2 interrupt (A2IE).
    pub fn enable_alarm2_interrupt(&mut self, enable: bool) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_register_bit(
            ControlRegister::Control,
            Control::ALARM2_INTERRUPT_ENABLE_BIT,
            enable,
        )
    }

    /// Enables the 32 kHz output (EN32kHz in the status register).
    pub fn enable_32khz_output(&mut self, enable: bool) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_register_bit(ControlRegister::Status, Status::ENABLE_32KHZ_BIT, enable)
    }

    /// Clears the alarm 1 triggered flag (A1F).
    pub fn clear_alarm1_flag(&mut self) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_register_bit(ControlRegister::Status, Status::ALARM1_FLAG_BIT, false)
    }

    /// Clears the alarm 2 triggered flag (A2F).
    pub fn clear_alarm2_flag(&mut self) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_register_bit(ControlRegister::Status, Status::ALARM2_FLAG_BIT, false)
    }

    pub(crate) fn read_register(&mut self, reg: RegAddr) -> Result<u8, DS3231Error<I2C::Error>> {
        let mut data = [0];
        self.i2c.write_read(self.address, &[reg as u8], &mut data)?;
        Ok(data[0])
    }

    pub(crate) fn write_register(
        &mut self,
        reg: RegAddr,
        value: u8,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.i2c.write(self.address, &[reg as u8, value])?;
        Ok(())
    }
}

// Register access implementations
macro_rules! impl_register_access {
    ($(($name:ident, $regaddr:expr, $typ:ty)),+) => {
        impl<I2C: I2c> DS3231<I2C> {
            $(
                paste! {
                    #[doc = concat!("Reads the ", stringify!($name), " register.")]
                    pub fn $name(&mut self) -> Result<$typ, DS3231Error<I2C::Error>> {
                        self.ensure_idle()?;
                        Ok(<$typ>::from(self.read_register($regaddr)?))
                    }

                    #[doc = concat!("Overwrites the whole ", stringify!($name), " register.")]
                    pub fn [<set_ $name>](&mut self, value: $typ) -> Result<(), DS3231Error<I2C::Error>> {
                        self.ensure_idle()?;
                        self.write_register($regaddr, value.into())
                    }
                }
            )+
        }
    }
}

impl_register_access!(
    (control, RegAddr::Control, Control),
    (status, RegAddr::ControlStatus, Status)
);

#[cfg(test)]
mod tests {
    extern crate alloc;
    use super::*;
    use alloc::vec;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTrans};

    const DEVICE_ADDRESS: u8 = 0x68;

    fn rmw(reg: RegAddr, before: u8, after: u8) -> [I2cTrans; 2] {
        [
            I2cTrans::write_read(DEVICE_ADDRESS, vec![reg as u8], vec![before]),
            I2cTrans::write(DEVICE_ADDRESS, vec![reg as u8, after]),
        ]
    }

    fn expectations<const N: usize>(steps: [[I2cTrans; 2]; N]) -> alloc::vec::Vec<I2cTrans> {
        steps.into_iter().flatten().collect()
    }

    #[test]
    fn test_initialize_oscillator_running() {
        // power-on control image: RS=11, INTCN=1
        let mut expected = expectations([
            rmw(RegAddr::Control, 0x1C, 0x5C), // BBSQW on
            rmw(RegAddr::Control, 0x5C, 0x5C), // EOSC already clear
            rmw(RegAddr::Control, 0x5C, 0x58), // INTCN off
            rmw(RegAddr::Control, 0x58, 0x40), // RS=00
        ]);
        expected.push(I2cTrans::write_read(
            DEVICE_ADDRESS,
            vec![RegAddr::Control as u8],
            vec![0x40],
        ));
        let mut dev = DS3231::new(I2cMock::new(&expected), DEVICE_ADDRESS);

        dev.initialize_oscillator(true, true, SquareWaveFrequency::Hz1)
            .unwrap();
        let control = dev.control().unwrap();
        assert_eq!(control.oscillator_enable(), Oscillator::Enabled);
        assert!(control.battery_backed_square_wave());
        assert_eq!(control.interrupt_control(), InterruptControl::SquareWave);
        assert_eq!(control.square_wave_frequency(), SquareWaveFrequency::Hz1);
        dev.i2c.done();
    }

    #[test]
    fn test_initialize_oscillator_stopped_leaves_intcn() {
        let expected = expectations([
            rmw(RegAddr::Control, 0x1C, 0x1C), // BBSQW already off
            rmw(RegAddr::Control, 0x1C, 0x9C), // EOSC set
            rmw(RegAddr::Control, 0x9C, 0x8C), // RS=01
        ]);
        let mut dev = DS3231::new(I2cMock::new(&expected), DEVICE_ADDRESS);

        dev.initialize_oscillator(false, false, SquareWaveFrequency::Hz1024)
            .unwrap();
        dev.i2c.done();
    }

    #[test]
    fn test_configure_default() {
        let expected = expectations([
            rmw(RegAddr::Control, 0x9C, 0xDC),
            rmw(RegAddr::Control, 0xDC, 0x5C),
            rmw(RegAddr::Control, 0x5C, 0x58),
            rmw(RegAddr::Control, 0x58, 0x40),
            rmw(RegAddr::ControlStatus, 0x98, 0x88), // EN32kHz off, OSF kept
        ]);
        let mut dev = DS3231::new(I2cMock::new(&expected), DEVICE_ADDRESS);

        dev.configure(&Config::default()).unwrap();
        dev.i2c.done();
    }

    #[test]
    fn test_configure_stops_at_first_error() {
        let expected = [I2cTrans::write_read(
            DEVICE_ADDRESS,
            vec![RegAddr::Control as u8],
            vec![0x00],
        )
        .with_error(ErrorKind::NoAcknowledge(
            embedded_hal::i2c::NoAcknowledgeSource::Address,
        ))];
        let mut dev = DS3231::new(I2cMock::new(&expected), DEVICE_ADDRESS);

        let err = dev.configure(&Config::default()).unwrap_err();
        assert!(matches!(err, DS3231Error::I2c(ErrorKind::NoAcknowledge(_))));
        dev.i2c.done();
    }

    #[test]
    fn test_single_flag_toggles() {
        let expected = expectations([
            rmw(RegAddr::Control, 0x80, 0x00), // enable_oscillator(true)
            rmw(RegAddr::Control, 0x00, 0x80), // enable_oscillator(false)
            rmw(RegAddr::Control, 0x00, 0x20), // enable_convert_temperature(true)
            rmw(RegAddr::Control, 0x00, 0x04), // enable_interrupt(true)
            rmw(RegAddr::Control, 0x04, 0x05), // enable_alarm1_interrupt(true)
            rmw(RegAddr::Control, 0x05, 0x07), // enable_alarm2_interrupt(true)
            rmw(RegAddr::Control, 0x07, 0x05), // enable_alarm2_interrupt(false)
            rmw(RegAddr::Control, 0x40, 0x00), // enable_battery_backed_square_wave(false)
        ]);
        let mut dev = DS3231::new(I2cMock::new(&expected), DEVICE_ADDRESS);

        dev.enable_oscillator(true).unwrap();
        dev.enable_oscillator(false).unwrap();
        dev.enable_convert_temperature(true).unwrap();
        dev.enable_interrupt(true).unwrap();
        dev.enable_alarm1_interrupt(true).unwrap();
        dev.enable_alarm2_interrupt(true).unwrap();
        dev.enable_alarm2_interrupt(false).unwrap();
        dev.enable_battery_backed_square_wave(false).unwrap();
        dev.i2c.done();
    }

    #[test]
    fn test_square_wave_frequency_selection() {
        let expected = expectations([
            rmw(RegAddr::Control, 0xE7, 0xEF), // Hz1024
            rmw(RegAddr::Control, 0xEF, 0xF7), // Hz4096
            rmw(RegAddr::Control, 0xF7, 0xFF), // raw 7 saturates to Hz8192
        ]);
        let mut dev = DS3231::new(I2cMock::new(&expected), DEVICE_ADDRESS);

        dev.set_square_wave_frequency(SquareWaveFrequency::Hz1024)
            .unwrap();
        dev.set_square_wave_frequency(SquareWaveFrequency::Hz4096)
            .unwrap();
        dev.set_square_wave_frequency(SquareWaveFrequency::from(7))
            .unwrap();
        dev.i2c.done();
    }

    #[test]
    fn test_status_register_flags() {
        let expected = expectations([
            rmw(RegAddr::ControlStatus, 0x08, 0x18), // enable_32khz_output(true)
            rmw(RegAddr::ControlStatus, 0x83, 0x82), // clear_alarm1_flag
            rmw(RegAddr::ControlStatus, 0x82, 0x80), // clear_alarm2_flag
        ]);
        let mut dev = DS3231::new(I2cMock::new(&expected), DEVICE_ADDRESS);

        dev.enable_32khz_output(true).unwrap();
        dev.clear_alarm1_flag().unwrap();
        dev.clear_alarm2_flag().unwrap();
        dev.i2c.done();
    }

    #[test]
    fn test_register_access() {
        let expected = [
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Control as u8], vec![0x1C]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::Control as u8, 0x40]),
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::ControlStatus as u8],
                vec![0x80],
            ),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::ControlStatus as u8, 0x00]),
        ];
        let mut dev = DS3231::new(I2cMock::new(&expected), DEVICE_ADDRESS);

        let control = dev.control().unwrap();
        assert_eq!(control.square_wave_frequency(), SquareWaveFrequency::Hz8192);
        dev.set_control(Control::from(0x40)).unwrap();

        let status = dev.status().unwrap();
        assert!(status.oscillator_stop_flag());
        dev.set_status(Status::from(0x00)).unwrap();

        let mut i2c = dev.release();
        i2c.done();
    }
}
