//! Simulated E2 peers shared by the unit tests.

extern crate std;

use core::convert::Infallible;
use std::collections::VecDeque;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;

use crate::commands::{checksum, Command, STATUS_OK};
use crate::interface::{Direction, E2Interface, Line, PinState};
use crate::params::Quantity;

/// Line write observed by a simulated peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Data(PinState),
    Clock(PinState),
}

/// Delay provider recording every requested wait.
#[derive(Debug, Default)]
pub struct RecordingDelay {
    calls: Vec<u32>,
}

impl RecordingDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[u32] {
        &self.calls
    }

    pub fn total_ns(&self) -> u64 {
        self.calls.iter().map(|&ns| u64::from(ns)).sum()
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.calls.push(ns);
    }
}

/// Bus that latches every bit the master clocks out and plays it back on reads.
pub struct LoopbackBus {
    data_direction: Direction,
    data: PinState,
    clock: PinState,
    sent: Vec<bool>,
    cursor: usize,
    events: Vec<Event>,
}

impl LoopbackBus {
    pub fn new() -> Self {
        Self {
            data_direction: Direction::Output,
            data: PinState::High,
            clock: PinState::High,
            sent: Vec::new(),
            cursor: 0,
            events: Vec::new(),
        }
    }

    pub fn sent_bits(&self) -> &[bool] {
        &self.sent
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clock_level(&self) -> PinState {
        self.clock
    }
}

impl E2Interface for LoopbackBus {
    type Error = Infallible;

    fn set_direction(&mut self, line: Line, direction: Direction) -> Result<(), Self::Error> {
        if line == Line::Data {
            self.data_direction = direction;
        }
        Ok(())
    }

    fn write_line(&mut self, line: Line, level: PinState) -> Result<(), Self::Error> {
        match line {
            Line::Data => {
                self.data = level;
                self.events.push(Event::Data(level));
            }
            Line::Clock => {
                let rising = self.clock == PinState::Low && level == PinState::High;
                if rising && self.data_direction == Direction::Output {
                    self.sent.push(self.data == PinState::High);
                }
                self.clock = level;
                self.events.push(Event::Clock(level));
            }
        }
        Ok(())
    }

    fn read_data(&mut self) -> Result<PinState, Self::Error> {
        if self.data_direction == Direction::Output {
            return Ok(self.data);
        }
        let bit = self.sent.get(self.cursor).copied().unwrap_or(true);
        self.cursor += 1;
        Ok(PinState::from(bit))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlaveState {
    Idle,
    Command { value: u8, bits: u8 },
    Acknowledge { command: u8 },
    Value { byte: u8, checksum: u8, bit: u8 },
    MasterAck { checksum: u8 },
    Checksum { byte: u8, bit: u8 },
    MasterNak,
    Done,
}

/// Cycle-level model of an EE894 answering on the E2 bus.
///
/// The model decodes start/stop conditions and clocked bits from the line
/// writes, answers known commands with value + checksum, and keeps counters
/// the tests assert on.
pub struct SimulatedSensor {
    values: [Option<u8>; 256],
    status: VecDeque<u8>,
    nack_next: usize,
    corrupt_next: usize,
    data_direction: Direction,
    data: PinState,
    clock: PinState,
    slave_out: Option<PinState>,
    state: SlaveState,
    starts: usize,
    stops: usize,
    naks: usize,
    measurements_started: usize,
    commands: Vec<u8>,
}

impl SimulatedSensor {
    pub fn new() -> Self {
        let mut values = [None; 256];
        values[usize::from(Command::Status.code())] = Some(STATUS_OK);
        Self {
            values,
            status: VecDeque::new(),
            nack_next: 0,
            corrupt_next: 0,
            data_direction: Direction::Output,
            data: PinState::High,
            clock: PinState::High,
            slave_out: None,
            state: SlaveState::Idle,
            starts: 0,
            stops: 0,
            naks: 0,
            measurements_started: 0,
            commands: Vec::new(),
        }
    }

    /// Answers `command` with `value` from now on.
    pub fn with_value(mut self, command: Command, value: u8) -> Self {
        self.values[usize::from(command.code())] = Some(value);
        self
    }

    /// Loads a raw 16-bit reading into the quantity's low/high registers.
    pub fn with_reading(self, quantity: Quantity, raw: u16) -> Self {
        let [low, high] = raw.to_le_bytes();
        self.with_value(quantity.low_command(), low)
            .with_value(quantity.high_command(), high)
    }

    /// Status bytes returned by the next status reads, in order. Once drained
    /// the status reads as valid.
    pub fn with_status(mut self, sequence: &[u8]) -> Self {
        self.status.extend(sequence.iter().copied());
        self
    }

    /// Leaves the next `count` command bytes unacknowledged.
    pub fn nack_next(mut self, count: usize) -> Self {
        self.nack_next = count;
        self
    }

    /// Sends a wrong checksum for the next `count` answered commands.
    pub fn corrupt_next(mut self, count: usize) -> Self {
        self.corrupt_next = count;
        self
    }

    pub fn starts(&self) -> usize {
        self.starts
    }

    pub fn stops(&self) -> usize {
        self.stops
    }

    pub fn naks(&self) -> usize {
        self.naks
    }

    pub fn measurements_started(&self) -> usize {
        self.measurements_started
    }

    /// Command bytes received, one entry per attempt.
    pub fn commands(&self) -> &[u8] {
        &self.commands
    }

    /// Both lines high with the master driving data.
    pub fn is_idle(&self) -> bool {
        self.data_direction == Direction::Output
            && self.data == PinState::High
            && self.clock == PinState::High
    }

    fn master_bit(&self) -> bool {
        self.data_direction == Direction::Input || self.data == PinState::High
    }

    fn answer(&mut self, command: u8) -> Option<u8> {
        let value = self.values[usize::from(command)]?;
        if command == Command::Status.code() {
            self.measurements_started += 1;
            return Some(self.status.pop_front().unwrap_or(value));
        }
        Some(value)
    }

    fn on_rising_edge(&mut self) {
        self.state = match self.state {
            SlaveState::Command { value, bits } => {
                let value = (value << 1) | u8::from(self.master_bit());
                if bits + 1 == 8 {
                    self.commands.push(value);
                    SlaveState::Acknowledge { command: value }
                } else {
                    SlaveState::Command {
                        value,
                        bits: bits + 1,
                    }
                }
            }
            SlaveState::Acknowledge { command } => {
                let answer = if self.nack_next > 0 {
                    self.nack_next -= 1;
                    None
                } else {
                    self.answer(command)
                };
                match answer {
                    Some(byte) => {
                        let mut sum = checksum(byte, command);
                        if self.corrupt_next > 0 {
                            self.corrupt_next -= 1;
                            sum = sum.wrapping_add(1);
                        }
                        self.slave_out = Some(PinState::Low);
                        SlaveState::Value {
                            byte,
                            checksum: sum,
                            bit: 0,
                        }
                    }
                    None => {
                        self.slave_out = Some(PinState::High);
                        SlaveState::Done
                    }
                }
            }
            SlaveState::Value { byte, checksum, bit } => {
                self.slave_out = Some(PinState::from(byte & (0x80 >> bit) != 0));
                if bit + 1 == 8 {
                    SlaveState::MasterAck { checksum }
                } else {
                    SlaveState::Value {
                        byte,
                        checksum,
                        bit: bit + 1,
                    }
                }
            }
            SlaveState::MasterAck { checksum } => {
                self.slave_out = None;
                if self.master_bit() {
                    SlaveState::Done
                } else {
                    SlaveState::Checksum {
                        byte: checksum,
                        bit: 0,
                    }
                }
            }
            SlaveState::Checksum { byte, bit } => {
                self.slave_out = Some(PinState::from(byte & (0x80 >> bit) != 0));
                if bit + 1 == 8 {
                    SlaveState::MasterNak
                } else {
                    SlaveState::Checksum { byte, bit: bit + 1 }
                }
            }
            SlaveState::MasterNak => {
                self.slave_out = None;
                if self.master_bit() {
                    self.naks += 1;
                }
                SlaveState::Done
            }
            state @ (SlaveState::Idle | SlaveState::Done) => state,
        };
    }
}

impl E2Interface for SimulatedSensor {
    type Error = Infallible;

    fn set_direction(&mut self, line: Line, direction: Direction) -> Result<(), Self::Error> {
        if line == Line::Data {
            self.data_direction = direction;
        }
        Ok(())
    }

    fn write_line(&mut self, line: Line, level: PinState) -> Result<(), Self::Error> {
        match line {
            Line::Data => {
                let previous = self.data;
                self.data = level;
                if self.data_direction == Direction::Output && self.clock == PinState::High {
                    if previous == PinState::High && level == PinState::Low {
                        self.starts += 1;
                        self.slave_out = None;
                        self.state = SlaveState::Command { value: 0, bits: 0 };
                    } else if previous == PinState::Low && level == PinState::High {
                        self.stops += 1;
                        self.slave_out = None;
                        self.state = SlaveState::Idle;
                    }
                }
            }
            Line::Clock => {
                let rising = self.clock == PinState::Low && level == PinState::High;
                self.clock = level;
                if rising {
                    self.on_rising_edge();
                }
            }
        }
        Ok(())
    }

    fn read_data(&mut self) -> Result<PinState, Self::Error> {
        if self.data_direction == Direction::Output {
            return Ok(self.data);
        }
        Ok(self.slave_out.unwrap_or(PinState::High))
    }
}
