//! Bit-level E2 bus primitives: framing, byte transfer and handshakes.
//!
//! Every primitive leaves the clock line in a defined state and waits a fixed
//! number of protocol delay units between edges. The unit length comes from
//! [`Config::unit_ns`], so slower or faster hosts only change the delay factor.

use embedded_hal::delay::DelayNs;

use crate::config::Config;
use crate::interface::{Direction, E2Interface, Line, PinState};

// Start condition: setup with both lines high, hold after data falls.
const START_SETUP: u32 = 30;
const START_HOLD: u32 = 30;
// Stop condition: spacing between each of the four edges.
const STOP_STEP: u32 = 20;
// Master-to-slave bit: clock low, data setup, clock high.
const SEND_CLOCK_LOW: u32 = 10;
const SEND_DATA_SETUP: u32 = 20;
const SEND_CLOCK_HIGH: u32 = 30;
// Slave-to-master bit: clock low, then sample in the middle of clock high.
const READ_CLOCK_LOW: u32 = 30;
const READ_SAMPLE_DELAY: u32 = 15;
const READ_SAMPLE_HOLD: u32 = 15;
// ACK/NAK from the master.
const HANDSHAKE_CLOCK_LOW: u32 = 15;
const HANDSHAKE_DATA_SETUP: u32 = 15;
const ACK_CLOCK_HIGH: u32 = 28;
const ACK_RELEASE: u32 = 2;
const NAK_CLOCK_HIGH: u32 = 30;

/// Bit-banged E2 bus master over an [`E2Interface`].
pub struct E2Bus<IFACE, DELAY> {
    interface: IFACE,
    delay: DELAY,
    config: Config,
}

impl<IFACE, DELAY> E2Bus<IFACE, DELAY> {
    /// Creates a bus master from the pin interface and delay provider.
    pub fn new(interface: IFACE, delay: DELAY, config: Config) -> Self {
        Self {
            interface,
            delay,
            config,
        }
    }

    /// Consumes the bus and returns its parts.
    pub fn release(self) -> (IFACE, DELAY, Config) {
        (self.interface, self.delay, self.config)
    }

    /// Provides mutable access to the underlying interface.
    pub fn interface_mut(&mut self) -> &mut IFACE {
        &mut self.interface
    }

    /// Returns the active timing configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn set_config(&mut self, config: Config) {
        self.config = config;
    }
}

impl<IFACE, DELAY, CommE> E2Bus<IFACE, DELAY>
where
    IFACE: E2Interface<Error = CommE>,
    DELAY: DelayNs,
{
    /// Busy-waits for `units` protocol delay units.
    pub fn bus_delay(&mut self, units: u32) {
        self.delay.delay_ns(units.saturating_mul(self.config.unit_ns()));
    }

    /// Drives both lines high: the bus idle state.
    pub fn idle(&mut self) -> Result<(), CommE> {
        self.outputs()?;
        self.data(PinState::High)?;
        self.clock(PinState::High)
    }

    /// Issues a start condition: data falls while the clock is high.
    pub fn start(&mut self) -> Result<(), CommE> {
        self.outputs()?;
        self.data(PinState::High)?;
        self.clock(PinState::High)?;
        self.bus_delay(START_SETUP);
        self.data(PinState::Low)?;
        self.bus_delay(START_HOLD);
        Ok(())
    }

    /// Issues a stop condition and leaves the bus idle.
    pub fn stop(&mut self) -> Result<(), CommE> {
        self.outputs()?;
        self.clock(PinState::Low)?;
        self.bus_delay(STOP_STEP);
        self.data(PinState::Low)?;
        self.bus_delay(STOP_STEP);
        self.clock(PinState::High)?;
        self.bus_delay(STOP_STEP);
        self.data(PinState::High)
    }

    /// Clocks out one byte, most significant bit first.
    pub fn send_byte(&mut self, value: u8) -> Result<(), CommE> {
        for bit in (0..8).rev() {
            self.outputs()?;
            self.clock(PinState::Low)?;
            self.bus_delay(SEND_CLOCK_LOW);
            self.data(PinState::from(value & (1 << bit) != 0))?;
            self.bus_delay(SEND_DATA_SETUP);
            self.clock(PinState::High)?;
            self.bus_delay(SEND_CLOCK_HIGH);
            self.clock(PinState::Low)?;
        }
        self.data(PinState::High)
    }

    /// Clocks in one byte, most significant bit first.
    pub fn read_byte(&mut self) -> Result<u8, CommE> {
        let mut value = 0u8;
        for bit in (0..8).rev() {
            if self.sample()? == PinState::High {
                value |= 1 << bit;
            }
            self.clock(PinState::Low)?;
        }
        Ok(value)
    }

    /// Clocks in the slave's handshake bit. Returns `true` when the slave
    /// pulled the data line low.
    ///
    /// The clock is left high; the next primitive drives it low first.
    pub fn check_ack(&mut self) -> Result<bool, CommE> {
        Ok(self.sample()? == PinState::Low)
    }

    /// Acknowledges a received byte, asking the slave for the next one.
    pub fn send_ack(&mut self) -> Result<(), CommE> {
        self.handshake(PinState::Low)?;
        self.bus_delay(ACK_CLOCK_HIGH);
        self.clock(PinState::Low)?;
        self.bus_delay(ACK_RELEASE);
        self.data(PinState::High)
    }

    /// Rejects further bytes; the transaction ends after this bit.
    ///
    /// The clock stays high afterwards, the stop condition pulls it low.
    pub fn send_nak(&mut self) -> Result<(), CommE> {
        self.handshake(PinState::High)?;
        self.bus_delay(NAK_CLOCK_HIGH);
        self.clock(PinState::High)
    }

    // One slave-driven bit: low clock phase, sample mid high phase.
    fn sample(&mut self) -> Result<PinState, CommE> {
        self.interface.set_direction(Line::Clock, Direction::Output)?;
        self.clock(PinState::Low)?;
        self.bus_delay(READ_CLOCK_LOW);
        self.clock(PinState::High)?;
        self.bus_delay(READ_SAMPLE_DELAY);
        self.interface.set_direction(Line::Data, Direction::Input)?;
        let level = self.interface.read_data()?;
        self.bus_delay(READ_SAMPLE_HOLD);
        Ok(level)
    }

    // Master-driven handshake bit, up to the rising clock edge.
    fn handshake(&mut self, level: PinState) -> Result<(), CommE> {
        self.outputs()?;
        self.clock(PinState::Low)?;
        self.bus_delay(HANDSHAKE_CLOCK_LOW);
        self.data(level)?;
        self.bus_delay(HANDSHAKE_DATA_SETUP);
        self.clock(PinState::High)
    }

    fn outputs(&mut self) -> Result<(), CommE> {
        self.interface.set_direction(Line::Data, Direction::Output)?;
        self.interface.set_direction(Line::Clock, Direction::Output)
    }

    #[inline]
    fn data(&mut self, level: PinState) -> Result<(), CommE> {
        self.interface.write_line(Line::Data, level)
    }

    #[inline]
    fn clock(&mut self, level: PinState) -> Result<(), CommE> {
        self.interface.write_line(Line::Clock, level)
    }
}
