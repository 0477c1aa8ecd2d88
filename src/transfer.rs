//! Time-block transfers.
//!
//! Two ways to read the clock:
//!
//! - **Blocking**: [`DS3231::read_time`] issues one 7-byte `write_read` and
//!   decodes the result before returning.
//! - **Deferred**: [`DS3231::start_read`] asks a [`DeferredRead`] transport to
//!   begin the read and returns at once. The transport moves the bytes into
//!   its own storage (typically a DMA buffer). When it signals completion
//!   the caller invokes [`DS3231::decode_completed`], which has the transport
//!   hand the bytes over into the driver's time buffer and decodes them.
//!
//! At most one deferred read may be outstanding. While it is, the driver
//! refuses every other bus operation with [`DS3231Error::TransferPending`]:
//! a second start is never queued, and the buffer is never touched before
//! the completion signal. There is no cancellation.
//!
//! Writing the time is always blocking.

use chrono::NaiveDateTime;
use embedded_hal::i2c::{ErrorType, I2c};

use crate::datetime::{CalendarTime, RawTimeBlock};
use crate::registers::TIME_BLOCK_LEN;
use crate::{DS3231Error, RegAddr, DS3231};

/// Progress of the deferred read protocol.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferState {
    /// No deferred read outstanding; any operation may be issued.
    #[default]
    Idle,
    /// A deferred read was started and its completion has not been decoded.
    Pending,
}

/// A transport able to run a register read in two halves.
///
/// `start_read` queues a read of `len` bytes from `register` on the device
/// at `address` and returns as soon as the request is accepted. The
/// transport then delivers exactly one out-of-band completion signal. After
/// it, `finish_read` copies the received bytes into `buffer` and releases
/// whatever the transport held for the transfer.
///
/// The driver never lends its buffer across the two calls, so the transport
/// owns the memory the hardware writes into for the whole transfer.
pub trait DeferredRead: ErrorType {
    /// Starts reading `len` bytes beginning at `register`.
    ///
    /// # Errors
    /// Returns the transport error if the request could not be started. No
    /// completion is signalled in that case.
    fn start_read(&mut self, address: u8, register: u8, len: usize) -> Result<(), Self::Error>;

    /// Hands over the bytes of the completed read. `buffer.len()` equals the
    /// `len` given to the matching `start_read`.
    ///
    /// # Errors
    /// Returns the transport error if the transfer failed on the bus.
    fn finish_read(&mut self, buffer: &mut [u8]) -> Result<(), Self::Error>;
}

impl<I2C: I2c> DS3231<I2C> {
    /// State of the deferred read protocol.
    pub fn transfer_state(&self) -> TransferState {
        self.transfer
    }

    pub(crate) fn ensure_idle(&self) -> Result<(), DS3231Error<I2C::Error>> {
        match self.transfer {
            TransferState::Idle => Ok(()),
            TransferState::Pending => {
                error!("DS3231: bus operation while a deferred read is pending");
                Err(DS3231Error::TransferPending)
            }
        }
    }

    fn read_raw_time(&mut self) -> Result<RawTimeBlock, DS3231Error<I2C::Error>> {
        let mut data = [0; TIME_BLOCK_LEN];
        self.i2c
            .write_read(self.address, &[RegAddr::Seconds as u8], &mut data)?;
        trace!("DS3231: time block -> {:?}", data);
        Ok(data.into())
    }

    fn write_raw_time(&mut self, raw: &RawTimeBlock) -> Result<(), DS3231Error<I2C::Error>> {
        let data = raw.as_bytes();
        trace!("DS3231: time block <- {:?}", data);
        self.i2c.write(
            self.address,
            &[
                RegAddr::Seconds as u8,
                data[0],
                data[1],
                data[2],
                data[3],
                data[4],
                data[5],
                data[6],
            ],
        )?;
        Ok(())
    }

    /// Reads and decodes the time block, blocking until the transfer is done.
    ///
    /// `day_of_week` is returned exactly as the chip holds it.
    ///
    /// # Errors
    /// Returns `DS3231Error::I2c` if the bus read fails (no partial time is
    /// returned), or `DS3231Error::TransferPending` while a deferred read is
    /// outstanding.
    pub fn read_time(&mut self) -> Result<CalendarTime, DS3231Error<I2C::Error>> {
        self.ensure_idle()?;
        let raw = self.read_raw_time()?;
        Ok(raw.decode())
    }

    /// Writes the time block in one blocking transfer.
    ///
    /// Out-of-range fields are clamped, not rejected, and the day of week is
    /// computed from the date; `time.day_of_week` is ignored.
    ///
    /// # Errors
    /// Returns `DS3231Error::I2c` on bus failure or
    /// `DS3231Error::TransferPending` while a deferred read is outstanding.
    pub fn set_time(&mut self, time: &CalendarTime) -> Result<(), DS3231Error<I2C::Error>> {
        self.ensure_idle()?;
        let clamped = time.clamped();
        if clamped != *time {
            debug!("DS3231: clamping out-of-range time fields");
        }
        let raw = RawTimeBlock::pack(&clamped);
        self.write_raw_time(&raw)
    }

    /// Reads the clock as a chrono `NaiveDateTime`.
    ///
    /// # Errors
    /// As [`DS3231::read_time`], plus `DS3231Error::DateTime` when the chip
    /// holds fields that do not form a real date.
    pub fn datetime(&mut self) -> Result<NaiveDateTime, DS3231Error<I2C::Error>> {
        let time = self.read_time()?;
        NaiveDateTime::try_from(&time).map_err(DS3231Error::DateTime)
    }

    /// Sets the clock from a chrono `NaiveDateTime`.
    ///
    /// Years outside 2000-2099 are saturated into range.
    ///
    /// # Errors
    /// As [`DS3231::set_time`].
    pub fn set_datetime(&mut self, datetime: &NaiveDateTime) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_time(&CalendarTime::from(datetime))
    }
}

impl<I2C: I2c + DeferredRead> DS3231<I2C> {
    /// Starts a deferred read of the time block and returns immediately.
    ///
    /// Call [`DS3231::decode_completed`] once the transport signals
    /// completion. Starting a second read before that is a protocol error.
    ///
    /// # Errors
    /// Returns `DS3231Error::TransferPending` if a deferred read is already
    /// outstanding, or `DS3231Error::I2c` if the transport refuses the
    /// request (the state stays `Idle`).
    pub fn start_read(&mut self) -> Result<(), DS3231Error<I2C::Error>> {
        self.ensure_idle()?;
        DeferredRead::start_read(
            &mut self.i2c,
            self.address,
            RegAddr::Seconds as u8,
            TIME_BLOCK_LEN,
        )?;
        self.transfer = TransferState::Pending;
        debug!("DS3231: deferred time read started");
        Ok(())
    }

    /// Collects the bytes of the pending deferred read into the driver's
    /// buffer, decodes them and returns to `Idle`.
    ///
    /// Must only be called after the transport's completion signal for the
    /// matching [`DS3231::start_read`].
    ///
    /// # Errors
    /// Returns `DS3231Error::NoTransferPending` if no deferred read was
    /// started, or `DS3231Error::I2c` if the transport reports the transfer
    /// failed. The driver is `Idle` afterwards in both cases.
    pub fn decode_completed(&mut self) -> Result<CalendarTime, DS3231Error<I2C::Error>> {
        if self.transfer != TransferState::Pending {
            error!("DS3231: decode requested without a pending read");
            return Err(DS3231Error::NoTransferPending);
        }
        self.transfer = TransferState::Idle;
        DeferredRead::finish_read(&mut self.i2c, &mut self.buffer.0)?;
        trace!("DS3231: time block -> {:?}", self.buffer.0);
        Ok(self.buffer.decode())
    }
}
