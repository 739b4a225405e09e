//! Pin access abstraction for the EE89x driver.

pub mod gpio;

pub use embedded_hal::digital::PinState;

/// The two signal lines of the E2 bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Line {
    /// Bidirectional data line.
    Data,
    /// Clock line, always driven by the master.
    Clock,
}

/// Direction a line is configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// The master samples the line; the slave may drive it.
    Input,
    /// The master drives the line.
    Output,
}

/// Abstraction over the low-level pin access required by the driver.
pub trait E2Interface {
    /// Error type produced by the concrete pin implementation.
    type Error;

    /// Configures a line as input or output.
    fn set_direction(&mut self, line: Line, direction: Direction) -> core::result::Result<(), Self::Error>;

    /// Drives a line to the given level.
    fn write_line(&mut self, line: Line, level: PinState) -> core::result::Result<(), Self::Error>;

    /// Samples the current level of the data line.
    fn read_data(&mut self) -> core::result::Result<PinState, Self::Error>;
}
