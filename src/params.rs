//! Strongly typed measurement selections for the EE89x driver.
//!
//! Each [`Quantity`] knows the low/high command pair that reads it, how to
//! scale the raw 16-bit register value into a physical unit, and which sentinel
//! the accessor returns when the sensor flags the reading as stale.
//!
//! # Examples
//!
//! ```rust
//! use ee89x::params::Quantity;
//!
//! let raw = 0x012C;
//! assert_eq!(Quantity::Humidity.convert(raw), 3.0);
//! assert_eq!(Quantity::Temperature.invalid_value(), -300.0);
//! ```

use crate::commands::Command;

/// Offset between the Kelvin scale reported by the sensor and degrees Celsius.
pub const KELVIN_OFFSET: f32 = 273.15;

/// Sentinel returned for a stale CO2, humidity or pressure reading.
pub const INVALID_READING: f32 = -1.0;

/// Sentinel returned for a stale temperature reading.
pub const INVALID_TEMPERATURE: f32 = -300.0;

/// Physical quantities exposed as a low/high byte register pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Quantity {
    /// CO2 concentration averaged over at least 11 measurements, in ppm.
    Co2Average,
    /// Relative humidity in percent (EE894 only).
    Humidity,
    /// Temperature in degrees Celsius (EE894 only).
    Temperature,
    /// Ambient pressure in hPa (EE894 only).
    Pressure,
}

impl Quantity {
    /// Command reading the low byte.
    pub const fn low_command(self) -> Command {
        match self {
            Self::Co2Average => Command::Co2AverageLow,
            Self::Humidity => Command::HumidityLow,
            Self::Temperature => Command::TemperatureLow,
            Self::Pressure => Command::PressureLow,
        }
    }

    /// Command reading the high byte.
    pub const fn high_command(self) -> Command {
        match self {
            Self::Co2Average => Command::Co2AverageHigh,
            Self::Humidity => Command::HumidityHigh,
            Self::Temperature => Command::TemperatureHigh,
            Self::Pressure => Command::PressureHigh,
        }
    }

    /// Raw counts per unit.
    pub const fn divisor(self) -> f32 {
        match self {
            Self::Co2Average => 1.0,
            Self::Humidity | Self::Temperature => 100.0,
            Self::Pressure => 10.0,
        }
    }

    /// Converts a raw register value into the physical unit.
    pub fn convert(self, raw: u16) -> f32 {
        let scaled = f32::from(raw) / self.divisor();
        match self {
            Self::Temperature => scaled - KELVIN_OFFSET,
            _ => scaled,
        }
    }

    /// Sentinel returned by the accessor when the reading is rejected.
    pub const fn invalid_value(self) -> f32 {
        match self {
            Self::Temperature => INVALID_TEMPERATURE,
            _ => INVALID_READING,
        }
    }
}
