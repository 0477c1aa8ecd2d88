//! Driver for `embedded-hal-async` buses (`async` feature).
//!
//! Same register editing, facade and time transfer as the blocking
//! [`crate::DS3231`]. Awaiting a read already lets the executor run other
//! work while the bytes arrive, so there is no `start_read` /
//! `decode_completed` pair and no transfer state here.
//!
//! ```rust,ignore
//! use ds3231_rtc::{asynch::DS3231, Config, DEFAULT_ADDRESS};
//!
//! let mut rtc = DS3231::new(i2c, DEFAULT_ADDRESS);
//! rtc.configure(&Config::default()).await?;
//! let now = rtc.read_time().await?;
//! ```

use chrono::NaiveDateTime;
use embedded_hal_async::i2c::I2c;
use paste::paste;

use crate::alarm::AlarmTime;
use crate::control::{with_bit, with_field2, ControlRegister};
use crate::datetime::{CalendarTime, RawTimeBlock};
use crate::registers::{ALARM1_BLOCK_LEN, ALARM2_BLOCK_LEN, TIME_BLOCK_LEN};
use crate::{Config, Control, DS3231Error, RegAddr, SquareWaveFrequency, Status};

/// Async DS3231 driver.
pub struct DS3231<I2C: I2c> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> DS3231<I2C> {
    /// Wraps an async bus. `address` is normally [`crate::DEFAULT_ADDRESS`].
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Releases the bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    async fn read_register(&mut self, reg: RegAddr) -> Result<u8, DS3231Error<I2C::Error>> {
        let mut data = [0];
        self.i2c
            .write_read(self.address, &[reg as u8], &mut data)
            .await?;
        Ok(data[0])
    }

    async fn write_register(
        &mut self,
        reg: RegAddr,
        value: u8,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.i2c.write(self.address, &[reg as u8, value]).await?;
        Ok(())
    }

    /// Sets or clears a single bit of a flag register, preserving the others.
    pub async fn set_register_bit(
        &mut self,
        register: ControlRegister,
        bit: u8,
        value: bool,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        let image = self.read_register(register.addr()).await?;
        let updated = with_bit(image, bit, value);
        debug!("DS3231: {:?} {} -> {}", register, image, updated);
        self.write_register(register.addr(), updated).await
    }

    /// Writes a 2-bit field of a flag register, saturating `value` to 3.
    pub async fn set_register_field(
        &mut self,
        register: ControlRegister,
        shift: u8,
        value: u8,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        let image = self.read_register(register.addr()).await?;
        let updated = with_field2(image, shift, value);
        debug!("DS3231: {:?} {} -> {}", register, image, updated);
        self.write_register(register.addr(), updated).await
    }

    /// Applies a startup configuration. See [`crate::DS3231::configure`].
    pub async fn configure(&mut self, config: &Config) -> Result<(), DS3231Error<I2C::Error>> {
        debug!("DS3231: configure {:?}", config);
        self.initialize_oscillator(
            config.oscillator_running,
            config.battery_backed_square_wave,
            config.square_wave_frequency,
        )
        .await?;
        self.enable_32khz_output(config.enable_32khz_output).await
    }

    /// See [`crate::DS3231::initialize_oscillator`].
    pub async fn initialize_oscillator(
        &mut self,
        running: bool,
        battery_backed: bool,
        rate: SquareWaveFrequency,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.enable_battery_backed_square_wave(battery_backed)
            .await?;
        if running {
            self.enable_oscillator(true).await?;
            self.enable_interrupt(false).await?;
        } else {
            self.enable_oscillator(false).await?;
        }
        self.set_square_wave_frequency(rate).await
    }

    /// Starts or stops the oscillator. Enabling clears the EOSC bit.
    pub async fn enable_oscillator(&mut self, enable: bool) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_register_bit(
            ControlRegister::Control,
            Control::OSCILLATOR_DISABLE_BIT,
            !enable,
        )
        .await
    }

    /// Keeps the square wave running on battery power (BBSQW).
    pub async fn enable_battery_backed_square_wave(
        &mut self,
        enable: bool,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_register_bit(
            ControlRegister::Control,
            Control::BATTERY_BACKED_SQUARE_WAVE_BIT,
            enable,
        )
        .await
    }

    /// Sets or clears the temperature-conversion trigger (CONV).
    pub async fn enable_convert_temperature(
        &mut self,
        enable: bool,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_register_bit(
            ControlRegister::Control,
            Control::CONVERT_TEMPERATURE_BIT,
            enable,
        )
        .await
    }

    /// Selects the square-wave output frequency.
    pub async fn set_square_wave_frequency(
        &mut self,
        frequency: SquareWaveFrequency,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_register_field(
            ControlRegister::Control,
            Control::RATE_SELECT_SHIFT,
            frequency.into(),
        )
        .await
    }

    /// Routes alarms to INT/SQW instead of the square wave (INTCN).
    pub async fn enable_interrupt(&mut self, enable: bool) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_register_bit(
            ControlRegister::Control,
            Control::INTERRUPT_CONTROL_BIT,
            enable,
        )
        .await
    }

    /// Enables the alarm 1 interrupt (A1IE).
    pub async fn enable_alarm1_interrupt(
        &mut self,
        enable: bool,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_register_bit(
            ControlRegister::Control,
            Control::ALARM1_INTERRUPT_ENABLE_BIT,
            enable,
        )
        .await
    }

    /// Enables the alarm 2 interrupt (A2IE).
    pub async fn enable_alarm2_interrupt(
        &mut self,
        enable: bool,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_register_bit(
            ControlRegister::Control,
            Control::ALARM2_INTERRUPT_ENABLE_BIT,
            enable,
        )
        .await
    }

    /// Enables the 32 kHz output (EN32kHz).
    pub async fn enable_32khz_output(
        &mut self,
        enable: bool,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_register_bit(ControlRegister::Status, Status::ENABLE_32KHZ_BIT, enable)
            .await
    }

    /// Clears the alarm 1 triggered flag (A1F).
    pub async fn clear_alarm1_flag(&mut self) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_register_bit(ControlRegister::Status, Status::ALARM1_FLAG_BIT, false)
            .await
    }

    /// Clears the alarm 2 triggered flag (A2F).
    pub async fn clear_alarm2_flag(&mut self) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_register_bit(ControlRegister::Status, Status::ALARM2_FLAG_BIT, false)
            .await
    }

    /// Writes the alarm 1 time registers.
    pub async fn set_alarm1(&mut self, alarm: &AlarmTime) -> Result<(), DS3231Error<I2C::Error>> {
        let data = alarm.to_alarm1_block();
        debug!("DS3231: alarm1 <- {:?}", data);
        self.i2c
            .write(
                self.address,
                &[RegAddr::Alarm1Seconds as u8, data[0], data[1], data[2], data[3]],
            )
            .await?;
        Ok(())
    }

    /// Reads the alarm 1 time registers.
    pub async fn alarm1(&mut self) -> Result<AlarmTime, DS3231Error<I2C::Error>> {
        let mut data = [0; ALARM1_BLOCK_LEN];
        self.i2c
            .write_read(self.address, &[RegAddr::Alarm1Seconds as u8], &mut data)
            .await?;
        Ok(AlarmTime::from_alarm1_block(&data))
    }

    /// Writes the alarm 2 time registers. `alarm.second` is ignored.
    pub async fn set_alarm2(&mut self, alarm: &AlarmTime) -> Result<(), DS3231Error<I2C::Error>> {
        let data = alarm.to_alarm2_block();
        debug!("DS3231: alarm2 <- {:?}", data);
        self.i2c
            .write(
                self.address,
                &[RegAddr::Alarm2Minutes as u8, data[0], data[1], data[2]],
            )
            .await?;
        Ok(())
    }

    /// Reads the alarm 2 time registers.
    pub async fn alarm2(&mut self) -> Result<AlarmTime, DS3231Error<I2C::Error>> {
        let mut data = [0; ALARM2_BLOCK_LEN];
        self.i2c
            .write_read(self.address, &[RegAddr::Alarm2Minutes as u8], &mut data)
            .await?;
        Ok(AlarmTime::from_alarm2_block(&data))
    }

    /// Reads and decodes the time block. `day_of_week` is returned as stored.
    pub async fn read_time(&mut self) -> Result<CalendarTime, DS3231Error<I2C::Error>> {
        let mut data = [0; TIME_BLOCK_LEN];
        self.i2c
            .write_read(self.address, &[RegAddr::Seconds as u8], &mut data)
            .await?;
        trace!("DS3231: time block -> {:?}", data);
        Ok(RawTimeBlock::from(data).decode())
    }

    /// Writes the time block, clamping fields and computing the day of week.
    pub async fn set_time(&mut self, time: &CalendarTime) -> Result<(), DS3231Error<I2C::Error>> {
        let data: [u8; TIME_BLOCK_LEN] = RawTimeBlock::encode(time).into();
        trace!("DS3231: time block <- {:?}", data);
        self.i2c
            .write(
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
            )
            .await?;
        Ok(())
    }

    /// Reads the clock as a chrono `NaiveDateTime`.
    pub async fn datetime(&mut self) -> Result<NaiveDateTime, DS3231Error<I2C::Error>> {
        let time = self.read_time().await?;
        NaiveDateTime::try_from(&time).map_err(DS3231Error::DateTime)
    }

    /// Sets the clock from a chrono `NaiveDateTime`.
    pub async fn set_datetime(
        &mut self,
        datetime: &NaiveDateTime,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_time(&CalendarTime::from(datetime)).await
    }
}

macro_rules! impl_register_access {
    ($(($name:ident, $regaddr:expr, $typ:ty)),+) => {
        impl<I2C: I2c> DS3231<I2C> {
            $(
                paste! {
                    #[doc = concat!("Reads the ", stringify!($name), " register.")]
                    pub async fn $name(&mut self) -> Result<$typ, DS3231Error<I2C::Error>> {
                        Ok(<$typ>::from(self.read_register($regaddr).await?))
                    }

                    #[doc = concat!("Overwrites the whole ", stringify!($name), " register.")]
                    pub async fn [<set_ $name>](&mut self, value: $typ) -> Result<(), DS3231Error<I2C::Error>> {
                        self.write_register($regaddr, value.into()).await
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
