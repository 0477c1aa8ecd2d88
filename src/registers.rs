//! Register map for the DS3231 RTC.
//!
//! Register addresses, bit positions and masks, plus `bitfield` views of the
//! control and status registers. Every bit layout here is chip-defined.

use bitfield::bitfield;

/// Register addresses for the DS3231 RTC.
#[allow(unused)]
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegAddr {
    /// Seconds register, first byte of the time block
    Seconds = 0x00,
    /// Minutes register
    Minutes = 0x01,
    /// Hours register (bit 6 selects 12/24 hour mode)
    Hours = 0x02,
    /// Day-of-week register (1-7)
    Day = 0x03,
    /// Date register (1-31)
    Date = 0x04,
    /// Month register (bit 7 is the century flag)
    Month = 0x05,
    /// Year register (0-99)
    Year = 0x06,
    /// Alarm 1 seconds register, first byte of the alarm 1 block
    Alarm1Seconds = 0x07,
    /// Alarm 1 minutes register
    Alarm1Minutes = 0x08,
    /// Alarm 1 hours register
    Alarm1Hours = 0x09,
    /// Alarm 1 day/date register
    Alarm1DayDate = 0x0A,
    /// Alarm 2 minutes register, first byte of the alarm 2 block
    Alarm2Minutes = 0x0B,
    /// Alarm 2 hours register
    Alarm2Hours = 0x0C,
    /// Alarm 2 day/date register
    Alarm2DayDate = 0x0D,
    /// Control register
    Control = 0x0E,
    /// Control/Status register
    ControlStatus = 0x0F,
    /// Aging offset register
    AgingOffset = 0x10,
    /// Temperature MSB register
    MSBTemp = 0x11,
    /// Temperature LSB register
    LSBTemp = 0x12,
}

/// Number of bytes in the time block (seconds through year).
pub const TIME_BLOCK_LEN: usize = 7;
/// Number of bytes in the alarm 1 block (seconds through day/date).
pub const ALARM1_BLOCK_LEN: usize = 4;
/// Number of bytes in the alarm 2 block (minutes through day/date).
pub const ALARM2_BLOCK_LEN: usize = 3;

/// Hours register bits holding the 24-hour BCD value. The 12/24 flag is
/// masked off and the value is always treated as 24-hour.
pub const HOURS_MASK: u8 = 0x3F;
/// Month register bits holding the BCD month. Strips the century flag.
pub const MONTH_MASK: u8 = 0x1F;
/// Alarm seconds/minutes bits, strips the alarm mask bit.
pub const ALARM_MINSEC_MASK: u8 = 0x7F;
/// Alarm day/date bits, strips the mask and DY/DT bits.
pub const ALARM_DAY_DATE_MASK: u8 = 0x3F;

/// Oscillator state as encoded by the EOSC bit.
///
/// EOSC is a disable bit: writing 1 stops the oscillator on battery power.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Oscillator {
    /// Oscillator is running
    Enabled = 0,
    /// Oscillator is stopped when on battery power
    Disabled = 1,
}
impl From<u8> for Oscillator {
    /// Creates an `Oscillator` from the EOSC bit. Any non-zero value means disabled.
    fn from(v: u8) -> Self {
        if v == 0 {
            Oscillator::Enabled
        } else {
            Oscillator::Disabled
        }
    }
}
impl From<Oscillator> for u8 {
    fn from(v: Oscillator) -> Self {
        v as u8
    }
}

/// Function of the INT/SQW pin (INTCN bit).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterruptControl {
    /// Output square wave on INT/SQW pin
    SquareWave = 0,
    /// Output alarm interrupt signal on INT/SQW pin
    Interrupt = 1,
}
impl From<u8> for InterruptControl {
    /// Creates an `InterruptControl` from the INTCN bit. Any non-zero value means interrupt.
    fn from(v: u8) -> Self {
        if v == 0 {
            InterruptControl::SquareWave
        } else {
            InterruptControl::Interrupt
        }
    }
}
impl From<InterruptControl> for u8 {
    fn from(v: InterruptControl) -> Self {
        v as u8
    }
}

/// Square wave output frequency (RS2:RS1 field).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SquareWaveFrequency {
    /// 1 Hz square wave output
    Hz1 = 0b00,
    /// 1.024 kHz square wave output
    Hz1024 = 0b01,
    /// 4.096 kHz square wave output
    Hz4096 = 0b10,
    /// 8.192 kHz square wave output
    Hz8192 = 0b11,
}
impl From<u8> for SquareWaveFrequency {
    /// Creates a `SquareWaveFrequency` from a raw rate value.
    ///
    /// Values above 3 saturate to [`SquareWaveFrequency::Hz8192`].
    fn from(v: u8) -> Self {
        match v {
            0b00 => SquareWaveFrequency::Hz1,
            0b01 => SquareWaveFrequency::Hz1024,
            0b10 => SquareWaveFrequency::Hz4096,
            _ => SquareWaveFrequency::Hz8192,
        }
    }
}
impl From<SquareWaveFrequency> for u8 {
    fn from(v: SquareWaveFrequency) -> Self {
        v as u8
    }
}

// This macro generates the From<u8> and Into<u8> implementations for the
// register type
macro_rules! from_register_u8 {
    ($typ:ty) => {
        impl From<u8> for $typ {
            fn from(v: u8) -> Self {
                paste::paste!([< $typ >](v))
            }
        }
        impl From<$typ> for u8 {
            fn from(v: $typ) -> Self {
                v.0
            }
        }
    };
}

bitfield! {
    /// Control register (0x0E).
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Control(u8);
    impl Debug;
    /// Oscillator enable/disable control (EOSC, 1 = stopped on battery)
    pub from into Oscillator, oscillator_enable, set_oscillator_enable: 7, 7;
    /// Enable square wave output on battery power (BBSQW)
    pub battery_backed_square_wave, set_battery_backed_square_wave: 6;
    /// Force temperature conversion (CONV, self-clearing)
    pub convert_temperature, set_convert_temperature: 5;
    /// Square wave output frequency selection (RS2:RS1)
    pub from into SquareWaveFrequency, square_wave_frequency, set_square_wave_frequency: 4, 3;
    /// INT/SQW pin function control (INTCN)
    pub from into InterruptControl, interrupt_control, set_interrupt_control: 2, 2;
    /// Enable alarm 2 interrupt (A2IE)
    pub alarm2_interrupt_enable, set_alarm2_interrupt_enable: 1;
    /// Enable alarm 1 interrupt (A1IE)
    pub alarm1_interrupt_enable, set_alarm1_interrupt_enable: 0;
}
from_register_u8!(Control);

impl Control {
    /// EOSC: 1 stops the oscillator.
    pub const OSCILLATOR_DISABLE_BIT: u8 = 7;
    /// BBSQW: square wave keeps running on battery power.
    pub const BATTERY_BACKED_SQUARE_WAVE_BIT: u8 = 6;
    /// CONV: starts a temperature conversion.
    pub const CONVERT_TEMPERATURE_BIT: u8 = 5;
    /// Shift of the 2-bit RS2:RS1 rate field.
    pub const RATE_SELECT_SHIFT: u8 = 3;
    /// INTCN: alarm interrupt instead of square wave on INT/SQW.
    pub const INTERRUPT_CONTROL_BIT: u8 = 2;
    /// A2IE
    pub const ALARM2_INTERRUPT_ENABLE_BIT: u8 = 1;
    /// A1IE
    pub const ALARM1_INTERRUPT_ENABLE_BIT: u8 = 0;
}

#[cfg(feature = "defmt")]
impl defmt::Format for Control {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Control({=u8:#x} EOSC={=bool} BBSQW={=bool} CONV={=bool} RS={} INTCN={=bool} A2IE={=bool} A1IE={=bool})",
            self.0,
            self.oscillator_enable() == Oscillator::Disabled,
            self.battery_backed_square_wave(),
            self.convert_temperature(),
            self.square_wave_frequency(),
            self.interrupt_control() == InterruptControl::Interrupt,
            self.alarm2_interrupt_enable(),
            self.alarm1_interrupt_enable()
        );
    }
}

bitfield! {
    /// Control/Status register (0x0F).
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Status(u8);
    impl Debug;
    /// Oscillator stop flag
    pub oscillator_stop_flag, set_oscillator_stop_flag: 7;
    /// Enable 32kHz output
    pub enable_32khz_output, set_enable_32khz_output: 4;
    /// Alarm 2 triggered flag
    pub alarm2_flag, set_alarm2_flag: 1;
    /// Alarm 1 triggered flag
    pub alarm1_flag, set_alarm1_flag: 0;
}
from_register_u8!(Status);

impl Status {
    /// OSF
    pub const OSCILLATOR_STOP_FLAG_BIT: u8 = 7;
    /// EN32kHz
    pub const ENABLE_32KHZ_BIT: u8 = 4;
    /// A2F
    pub const ALARM2_FLAG_BIT: u8 = 1;
    /// A1F
    pub const ALARM1_FLAG_BIT: u8 = 0;
}

#[cfg(feature = "defmt")]
impl defmt::Format for Status {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Status({=u8:#x} OSF={=bool} EN32kHz={=bool} A2F={=bool} A1F={=bool})",
            self.0,
            self.oscillator_stop_flag(),
            self.enable_32khz_output(),
            self.alarm2_flag(),
            self.alarm1_flag()
        );
    }
}
