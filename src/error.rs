//! Error handling primitives for the EE89x driver.

/// Crate-wide result type alias.
pub type Result<T, E> = core::result::Result<T, Error<E>>;

/// Error variants produced by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Any error reported by the underlying GPIO interface.
    Interface(E),
    /// The sensor did not acknowledge the command byte on the last attempt.
    NoAcknowledge,
    /// The checksum byte of the last attempt did not match the value byte.
    ChecksumMismatch {
        /// Checksum computed from the value and command bytes.
        expected: u8,
        /// Checksum byte clocked in from the sensor.
        received: u8,
    },
    /// The sensor flagged the measurement as stale through a nonzero status byte.
    InvalidMeasurement {
        /// Raw status byte returned by the sensor.
        status: u8,
    },
    /// The provided configuration parameters are invalid.
    InvalidConfig,
}

impl<E> Error<E> {
    /// Returns `true` for failures of the E2 handshake itself (no ACK, bad checksum).
    pub const fn is_protocol(&self) -> bool {
        matches!(self, Self::NoAcknowledge | Self::ChecksumMismatch { .. })
    }
}

impl<E> From<E> for Error<E> {
    fn from(err: E) -> Self {
        Self::Interface(err)
    }
}
