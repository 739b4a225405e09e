//! High-level EE893/EE894 device driver implementation.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::bus::E2Bus;
use crate::commands::{checksum, Command, SensorParameters, INVALID_BYTE, STATUS_OK};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::interface::gpio::GpioInterface;
use crate::interface::E2Interface;
use crate::log::{debug, trace, warn};
use crate::params::Quantity;

/// Transaction attempts per command before giving up.
pub const MAX_ATTEMPTS: u8 = 3;

/// High-level synchronous driver for the EE893/EE894 CO2 sensor modules.
pub struct Ee89x<IFACE, DELAY> {
    bus: E2Bus<IFACE, DELAY>,
}

// Result of one start..stop exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    Accepted(u8),
    NotAcknowledged,
    BadChecksum { expected: u8, received: u8 },
}

impl<IFACE, DELAY> Ee89x<IFACE, DELAY> {
    // ==================================================================
    // == Driver Construction & Ownership ===============================
    // ==================================================================
    /// Creates a new driver instance from the provided pin interface.
    pub fn new(interface: IFACE, delay: DELAY, config: Config) -> Self {
        Self {
            bus: E2Bus::new(interface, delay, config),
        }
    }

    /// Consumes the driver and returns the owned interface, delay and configuration.
    pub fn release(self) -> (IFACE, DELAY, Config) {
        self.bus.release()
    }

    /// Provides mutable access to the underlying interface.
    pub fn interface_mut(&mut self) -> &mut IFACE {
        self.bus.interface_mut()
    }

    /// Returns a shared reference to the active configuration.
    pub fn config(&self) -> &Config {
        self.bus.config()
    }
}

impl<DATA, CLOCK, DELAY, E> Ee89x<GpioInterface<DATA, CLOCK>, DELAY>
where
    DATA: InputPin<Error = E> + OutputPin<Error = E>,
    CLOCK: OutputPin<Error = E>,
    DELAY: DelayNs,
{
    // ==================================================================
    // == GPIO Convenience Constructors =================================
    // ==================================================================
    /// Convenience constructor for a data/clock pin pair.
    pub fn new_gpio(data: DATA, clock: CLOCK, delay: DELAY, config: Config) -> Self {
        Self::new(GpioInterface::new(data, clock), delay, config)
    }

    /// Releases the driver, returning `(data, clock, delay, config)`.
    pub fn release_gpio(self) -> (DATA, CLOCK, DELAY, Config) {
        let (iface, delay, config) = self.release();
        let (data, clock) = iface.release();
        (data, clock, delay, config)
    }
}

impl<IFACE, DELAY, CommE> Ee89x<IFACE, DELAY>
where
    IFACE: E2Interface<Error = CommE>,
    DELAY: DelayNs,
{
    // ==================================================================
    // == Initialization & Configuration ================================
    // ==================================================================
    /// Validates the configuration and parks the bus in its idle state.
    pub fn init(&mut self) -> Result<(), CommE> {
        self.bus.config().validate().map_err(|_| Error::InvalidConfig)?;
        self.bus.idle()?;
        Ok(())
    }

    /// Applies a new timing configuration.
    pub fn configure(&mut self, config: Config) -> Result<(), CommE> {
        config.validate().map_err(|_| Error::InvalidConfig)?;
        self.bus.set_config(config);
        Ok(())
    }

    // ==================================================================
    // == Identification & Status =======================================
    // ==================================================================
    /// Reads the 16-bit sensor group identifier.
    pub fn read_sensor_type(&mut self) -> Result<u16, CommE> {
        let low = self.read_a_byte(Command::SensorTypeLow)?;
        let high = self.read_a_byte(Command::SensorTypeHigh)?;
        Ok(u16::from_le_bytes([low, high]))
    }

    /// Reads which physical measurements the sensor supports.
    ///
    /// A failed transfer reports no supported measurements; use
    /// [`transfer`](Self::transfer) with [`Command::SensorParameters`] to tell
    /// the two apart.
    pub fn read_sensor_parameters(&mut self) -> Result<SensorParameters, CommE> {
        let raw = self.read_a_byte(Command::SensorParameters)?;
        Ok(SensorParameters::from_raw(raw))
    }

    /// Reads the measurement status byte. Zero means the last measurement is valid.
    ///
    /// Reading the status byte makes the sensor start a new measurement, so two
    /// back-to-back reads do not describe the same measurement.
    pub fn read_status_byte(&mut self) -> Result<u8, CommE> {
        self.read_a_byte(Command::Status)
    }

    // ==================================================================
    // == Measurements ==================================================
    // ==================================================================
    /// Reads the CO2 concentration averaged over at least 11 measurements, in ppm.
    ///
    /// Returns `-1.0` when the sensor rejects the reading.
    pub fn read_co2_average(&mut self) -> Result<f32, CommE> {
        self.read_quantity(Quantity::Co2Average)
    }

    /// Reads relative humidity in percent. Returns `-1.0` for a rejected reading.
    pub fn read_humidity(&mut self) -> Result<f32, CommE> {
        self.read_quantity(Quantity::Humidity)
    }

    /// Reads temperature in degrees Celsius. Returns `-300.0` for a rejected reading.
    pub fn read_temperature(&mut self) -> Result<f32, CommE> {
        self.read_quantity(Quantity::Temperature)
    }

    /// Reads ambient pressure in hPa. Returns `-1.0` for a rejected reading.
    pub fn read_pressure(&mut self) -> Result<f32, CommE> {
        self.read_quantity(Quantity::Pressure)
    }

    /// Reads the raw 16-bit value of a quantity.
    ///
    /// The status byte is checked after each half. A nonzero status stops the
    /// sequence with [`Error::InvalidMeasurement`]; no further command is sent.
    pub fn measure(&mut self, quantity: Quantity) -> Result<u16, CommE> {
        let low = self.transfer(quantity.low_command())?;
        self.expect_valid_status()?;
        let high = self.transfer(quantity.high_command())?;
        self.expect_valid_status()?;
        Ok(u16::from_le_bytes([low, high]))
    }

    fn read_quantity(&mut self, quantity: Quantity) -> Result<f32, CommE> {
        match self.measure(quantity) {
            Ok(raw) => Ok(quantity.convert(raw)),
            Err(Error::Interface(err)) => Err(Error::Interface(err)),
            Err(_) => Ok(quantity.invalid_value()),
        }
    }

    fn expect_valid_status(&mut self) -> Result<(), CommE> {
        let status = self.transfer(Command::Status)?;
        if status != STATUS_OK {
            debug!("ee89x: stale measurement, status {=u8:#x}", status);
            return Err(Error::InvalidMeasurement { status });
        }
        Ok(())
    }

    // ==================================================================
    // == Command Engine ================================================
    // ==================================================================
    /// Reads one register byte, folding protocol failures into `0xFF`.
    ///
    /// Only GPIO errors are reported; a command that fails all
    /// [`MAX_ATTEMPTS`] attempts yields [`INVALID_BYTE`].
    pub fn read_a_byte(&mut self, command: Command) -> Result<u8, CommE> {
        match self.transfer(command) {
            Err(err) if err.is_protocol() => Ok(INVALID_BYTE),
            other => other,
        }
    }

    /// Reads one register byte with explicit validity.
    ///
    /// Runs up to [`MAX_ATTEMPTS`] full start/command/ack/value/checksum/stop
    /// exchanges and returns the first value whose checksum matches. When all
    /// attempts fail, the error describes the last one.
    pub fn transfer(&mut self, command: Command) -> Result<u8, CommE> {
        let mut last = Attempt::NotAcknowledged;
        for attempt in 1..=MAX_ATTEMPTS {
            last = self.attempt(command.code())?;
            match last {
                Attempt::Accepted(value) => return Ok(value),
                Attempt::NotAcknowledged => {
                    debug!("ee89x: {=u8:#x} not acknowledged (attempt {=u8})", command.code(), attempt);
                }
                Attempt::BadChecksum { expected, received } => {
                    debug!(
                        "ee89x: {=u8:#x} checksum {=u8:#x} != {=u8:#x} (attempt {=u8})",
                        command.code(),
                        received,
                        expected,
                        attempt
                    );
                }
            }
        }

        warn!("ee89x: {=u8:#x} failed after {=u8} attempts", command.code(), MAX_ATTEMPTS);
        match last {
            Attempt::BadChecksum { expected, received } => {
                Err(Error::ChecksumMismatch { expected, received })
            }
            _ => Err(Error::NoAcknowledge),
        }
    }

    fn attempt(&mut self, command: u8) -> Result<Attempt, CommE> {
        self.bus.start()?;
        self.bus.send_byte(command)?;
        if !self.bus.check_ack()? {
            self.bus.stop()?;
            return Ok(Attempt::NotAcknowledged);
        }

        let value = self.bus.read_byte()?;
        self.bus.send_ack()?;
        let received = self.bus.read_byte()?;
        self.bus.send_nak()?;
        self.bus.stop()?;

        let expected = checksum(value, command);
        if received != expected {
            return Ok(Attempt::BadChecksum { expected, received });
        }

        trace!("ee89x: {=u8:#x} -> {=u8:#x}", command, value);
        Ok(Attempt::Accepted(value))
    }
}
