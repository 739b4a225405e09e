//! Command map of the EE893/EE894 E2 interface.
#![allow(unused_parens)]

use modular_bitfield::prelude::*;

/// Value byte reported by the transfer engine when every attempt failed.
pub const INVALID_BYTE: u8 = 0xFF;

/// Status byte value signalling a valid previous measurement.
pub const STATUS_OK: u8 = 0x00;

/// Read commands understood by the sensor.
///
/// The low nibble `0x1` selects a read from the slave; the high nibble
/// selects the register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Command {
    /// Sensor group identifier, low byte.
    SensorTypeLow = 0x11,
    /// Supported physical measurements bitmask.
    SensorParameters = 0x31,
    /// Sensor group identifier, high byte.
    SensorTypeHigh = 0x41,
    /// Measurement status. Reading it starts a new measurement.
    Status = 0x71,
    /// Relative humidity, low byte.
    HumidityLow = 0x81,
    /// Relative humidity, high byte.
    HumidityHigh = 0x91,
    /// Temperature, low byte.
    TemperatureLow = 0xA1,
    /// Temperature, high byte.
    TemperatureHigh = 0xB1,
    /// Ambient pressure, low byte.
    PressureLow = 0xC1,
    /// Ambient pressure, high byte.
    PressureHigh = 0xD1,
    /// Averaged CO2 concentration, low byte.
    Co2AverageLow = 0xE1,
    /// Averaged CO2 concentration, high byte.
    Co2AverageHigh = 0xF1,
}

impl Command {
    /// Every command, in ascending opcode order.
    pub const ALL: [Command; 12] = [
        Command::SensorTypeLow,
        Command::SensorParameters,
        Command::SensorTypeHigh,
        Command::Status,
        Command::HumidityLow,
        Command::HumidityHigh,
        Command::TemperatureLow,
        Command::TemperatureHigh,
        Command::PressureLow,
        Command::PressureHigh,
        Command::Co2AverageLow,
        Command::Co2AverageHigh,
    ];

    /// Raw opcode clocked onto the bus.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Looks up the command for a raw opcode.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|command| command.code() == code)
    }
}

impl From<Command> for u8 {
    fn from(value: Command) -> Self {
        value.code()
    }
}

/// Checksum the sensor appends to a value byte: `(value + command) mod 256`.
pub const fn checksum(value: u8, command: u8) -> u8 {
    value.wrapping_add(command)
}

/// Bitfield representation of the sensor parameters byte (command `0x31`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorParameters {
    // Relative humidity supported (bit 0).
    pub humidity: bool,
    // Temperature supported (bit 1).
    pub temperature: bool,
    // Air velocity supported (bit 2).
    pub air_velocity: bool,
    // CO2 supported (bit 3).
    pub co2: bool,
    #[skip]
    __: B4,
}

impl SensorParameters {
    /// Decodes the raw register byte.
    ///
    /// An all-ones byte is what a failed transfer leaves behind, so it maps to
    /// "nothing supported". Reserved bits are dropped.
    pub fn from_raw(raw: u8) -> Self {
        if raw == INVALID_BYTE {
            Self::new()
        } else {
            Self::from_bytes([raw & 0x0F])
        }
    }

    /// Returns `true` when no measurement is flagged as supported.
    pub fn is_empty(self) -> bool {
        u8::from(self) == 0
    }
}

impl From<SensorParameters> for u8 {
    fn from(value: SensorParameters) -> Self {
        value.into_bytes()[0]
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for SensorParameters {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "SensorParameters {{ humidity: {}, temperature: {}, air_velocity: {}, co2: {} }}",
            self.humidity(),
            self.temperature(),
            self.air_velocity(),
            self.co2()
        );
    }
}
