//! GPIO interface implementation built on top of `embedded-hal` digital pins.

use embedded_hal::digital::{InputPin, OutputPin, PinState};

use super::{Direction, E2Interface, Line};

/// Pin-based interface implementation for the EE89x driver.
///
/// The data pin must be configured as open-drain (with a pull-up) so that the
/// sensor can pull it low while the master releases it. Switching the data
/// line to [`Direction::Input`] releases it by writing a high level. The clock
/// line is push-pull or open-drain; it is never read back.
pub struct GpioInterface<DATA, CLOCK> {
    data: DATA,
    clock: CLOCK,
}

impl<DATA, CLOCK> GpioInterface<DATA, CLOCK> {
    /// Creates a new interface from the data and clock pins.
    pub const fn new(data: DATA, clock: CLOCK) -> Self {
        Self { data, clock }
    }

    /// Provides mutable access to the wrapped data pin.
    pub fn data_mut(&mut self) -> &mut DATA {
        &mut self.data
    }

    /// Provides mutable access to the wrapped clock pin.
    pub fn clock_mut(&mut self) -> &mut CLOCK {
        &mut self.clock
    }

    /// Consumes the interface and returns the owned pins as `(data, clock)`.
    pub fn release(self) -> (DATA, CLOCK) {
        (self.data, self.clock)
    }
}

impl<DATA, CLOCK, E> E2Interface for GpioInterface<DATA, CLOCK>
where
    DATA: InputPin<Error = E> + OutputPin<Error = E>,
    CLOCK: OutputPin<Error = E>,
{
    type Error = E;

    fn set_direction(&mut self, line: Line, direction: Direction) -> core::result::Result<(), Self::Error> {
        match (line, direction) {
            (Line::Data, Direction::Input) => self.data.set_high(),
            _ => Ok(()),
        }
    }

    fn write_line(&mut self, line: Line, level: PinState) -> core::result::Result<(), Self::Error> {
        match line {
            Line::Data => self.data.set_state(level),
            Line::Clock => self.clock.set_state(level),
        }
    }

    fn read_data(&mut self) -> core::result::Result<PinState, Self::Error> {
        self.data.is_high().map(PinState::from)
    }
}
