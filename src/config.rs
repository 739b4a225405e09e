//! Configuration primitives for the EE89x driver.

/// Duration of one delay-factor step in nanoseconds.
pub const DELAY_STEP_NS: u32 = 500;

/// Delay factor found applicable for a 16 MHz host driving the sensor over short wires.
pub const DEFAULT_DELAY_FACTOR: u32 = 20;

/// User-facing configuration for the E2 bus timing.
///
/// Every bus phase is expressed in protocol delay units; one unit lasts
/// `delay_factor * DELAY_STEP_NS` nanoseconds. Raise the factor to slow the
/// bus down for long cables or slow sensor firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Multiplier applied to [`DELAY_STEP_NS`] for every delay unit.
    pub delay_factor: u32,
}

impl Config {
    /// Begins building a [`Config`] using the builder pattern.
    pub fn new() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Length of a single protocol delay unit in nanoseconds.
    pub const fn unit_ns(&self) -> u32 {
        self.delay_factor.saturating_mul(DELAY_STEP_NS)
    }

    /// Checks whether this configuration can drive the bus.
    pub fn validate(&self) -> core::result::Result<(), ConfigError> {
        if self.delay_factor == 0 {
            return Err(ConfigError::ZeroDelayFactor);
        }

        Ok(())
    }
}

/// Builder for [`Config`] allowing piecemeal construction.
#[derive(Debug, Clone, Copy)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Creates a new builder seeded with [`Config::default()`].
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Overrides the delay factor.
    pub fn delay_factor(mut self, delay_factor: u32) -> Self {
        self.config.delay_factor = delay_factor;
        self
    }

    /// Finalizes the builder and returns the [`Config`].
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            delay_factor: DEFAULT_DELAY_FACTOR,
        }
    }
}

/// Validation errors generated while verifying a [`Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A zero delay factor collapses every bus phase to nothing.
    ZeroDelayFactor,
}
