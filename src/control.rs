//! Read-modify-write editing of the control and status registers.
//!
//! Both registers pack independent flags into one byte, and the chip can
//! change some of them on its own (CONV self-clears, the alarm flags set
//! themselves). Every edit therefore reads the register fresh, changes only
//! the target bits and writes the whole byte back. Nothing is cached.
//!
//! The read and the write are two separate bus transactions. With a single
//! bus master that is fine; callers sharing the driver across execution
//! contexts must serialize edits themselves.

use embedded_hal::i2c::I2c;

use crate::{DS3231Error, RegAddr, DS3231};

/// Selects which flag register an edit targets.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlRegister {
    /// Control register (0x0E)
    Control,
    /// Control/Status register (0x0F)
    Status,
}

impl ControlRegister {
    /// Register address on the bus.
    #[must_use]
    pub const fn addr(self) -> RegAddr {
        match self {
            ControlRegister::Control => RegAddr::Control,
            ControlRegister::Status => RegAddr::ControlStatus,
        }
    }
}

/// Returns `image` with bit `bit` set to `value`. All other bits are kept.
///
/// `bit` is taken modulo 8.
#[must_use]
pub const fn with_bit(image: u8, bit: u8, value: bool) -> u8 {
    let bit = bit & 0x07;
    (image & !(1 << bit)) | ((value as u8) << bit)
}

/// Returns `image` with the 2-bit field at `shift` set to `value`.
///
/// Values above 3 saturate to 3. `shift` must leave room for both bits
/// (at most 6); larger shifts are clamped to 6.
#[must_use]
pub const fn with_field2(image: u8, shift: u8, value: u8) -> u8 {
    let shift = if shift > 6 { 6 } else { shift };
    let value = if value > 3 { 3 } else { value };
    (image & !(0b11 << shift)) | (value << shift)
}

impl<I2C: I2c> DS3231<I2C> {
    /// Sets or clears a single bit of a flag register.
    ///
    /// Reads the register, changes only `bit` and writes the full byte back.
    ///
    /// # Errors
    /// Returns `DS3231Error::I2c` if either bus transaction fails (the
    /// write is skipped when the read fails), or
    /// `DS3231Error::TransferPending` while a deferred time read is running.
    pub fn set_register_bit(
        &mut self,
        register: ControlRegister,
        bit: u8,
        value: bool,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.ensure_idle()?;
        let image = self.read_register(register.addr())?;
        let updated = with_bit(image, bit, value);
        trace!("DS3231: {:?} bit {} -> {}", register, bit, value);
        debug!("DS3231: {:?} {} -> {}", register, image, updated);
        self.write_register(register.addr(), updated)
    }

    /// Writes a 2-bit field of a flag register, saturating `value` to 3.
    ///
    /// # Errors
    /// Same as [`DS3231::set_register_bit`].
    pub fn set_register_field(
        &mut self,
        register: ControlRegister,
        shift: u8,
        value: u8,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.ensure_idle()?;
        let image = self.read_register(register.addr())?;
        let updated = with_field2(image, shift, value);
        debug!("DS3231: {:?} {} -> {}", register, image, updated);
        self.write_register(register.addr(), updated)
    }
}
