//! Static configuration of both nodes.
//!
//! Defaults reproduce the reference boards: 32.768 kHz while asleep, 4 MHz
//! while active, a 1200 baud console and a converter window of 1000..3000.

use crate::hal::LinkError;
use crate::types::{
    AdcReference, AdcResolution, HighSpeedFrequency, NegativeInput, Parity, SAMPLE_MAX, SleepMode,
    StopBits, WindowMode,
};

/// How long a busy-wait may poll its hardware condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitPolicy {
    /// Poll until the condition holds, forever if it never does.
    #[default]
    Unbounded,
    /// Give up with `LinkError::WaitTimeout` after `max_polls` failed polls.
    Bounded { max_polls: u32 },
}

/// Converter setup applied once in the sampler's Init state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdcConfig {
    pub reference: AdcReference,
    pub resolution: AdcResolution,
    /// Positive input channel (AINx).
    pub positive_channel: u8,
    pub negative_input: NegativeInput,
    pub window_mode: WindowMode,
    pub window_low: u16,
    pub window_high: u16,
    /// Converter clock prescaler divider.
    pub prescaler_div: u16,
    /// Sampling length in converter clocks.
    pub sample_length: u8,
    /// Start-up delay in converter clocks.
    pub init_delay: u8,
}

impl Default for AdcConfig {
    fn default() -> Self {
        Self {
            reference: AdcReference::Vdd,
            resolution: AdcResolution::Bits12,
            positive_channel: 0x08,
            negative_input: NegativeInput::Ground,
            window_mode: WindowMode::Inside,
            window_low: 1000,
            window_high: 3000,
            prescaler_div: 2,
            sample_length: 2,
            init_delay: 16,
        }
    }
}

impl AdcConfig {
    pub fn validate(&self) -> Result<(), LinkError> {
        if self.window_low > SAMPLE_MAX || self.window_high > SAMPLE_MAX {
            return Err(LinkError::InvalidConfig("window threshold exceeds 12-bit range"));
        }
        if self.window_low > self.window_high {
            return Err(LinkError::InvalidConfig("window low threshold above high threshold"));
        }
        if self.prescaler_div == 0 {
            return Err(LinkError::InvalidConfig("converter prescaler divider is zero"));
        }
        Ok(())
    }

    /// Evaluates the configured comparator against `sample`.
    pub fn window_satisfied(&self, sample: u16) -> bool {
        self.window_mode
            .evaluate(sample, self.window_low, self.window_high)
    }
}

/// Character-output stream framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub synchronous: bool,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub data_bits: u8,
    pub baud_rate: u32,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            synchronous: false,
            parity: Parity::None,
            stop_bits: StopBits::One,
            data_bits: 8,
            baud_rate: 1200,
        }
    }
}

impl ConsoleConfig {
    pub fn validate(&self) -> Result<(), LinkError> {
        if self.baud_rate == 0 {
            return Err(LinkError::InvalidConfig("console baud rate is zero"));
        }
        if !(5..=9).contains(&self.data_bits) {
            return Err(LinkError::InvalidConfig("console data bits outside 5..=9"));
        }
        Ok(())
    }
}

/// Configuration of the sampling (initiator) node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerConfig {
    pub adc: AdcConfig,
    pub console: ConsoleConfig,
    pub sleep_mode: SleepMode,
    pub high_speed: HighSpeedFrequency,
    /// Reference settle time after enabling the converter.
    pub adc_settle_us: u32,
    /// Time between asserting select and the first byte, giving the
    /// responder room to wake and raise its clock.
    pub select_settle_us: u32,
    pub wait_policy: WaitPolicy,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            adc: AdcConfig::default(),
            console: ConsoleConfig::default(),
            sleep_mode: SleepMode::PowerDown,
            high_speed: HighSpeedFrequency::Mhz4,
            adc_settle_us: 1_000,
            select_settle_us: 4_000,
            wait_policy: WaitPolicy::Unbounded,
        }
    }
}

impl SamplerConfig {
    pub fn validate(&self) -> Result<(), LinkError> {
        self.adc.validate()?;
        self.console.validate()
    }
}

/// Configuration of the reporting (responder) node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponderConfig {
    pub console: ConsoleConfig,
    pub sleep_mode: SleepMode,
    pub high_speed: HighSpeedFrequency,
    /// Delay after the report so the console drains before sleeping.
    pub report_flush_us: u32,
    pub wait_policy: WaitPolicy,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            console: ConsoleConfig::default(),
            sleep_mode: SleepMode::PowerDown,
            high_speed: HighSpeedFrequency::Mhz4,
            report_flush_us: 100_000,
            wait_policy: WaitPolicy::Unbounded,
        }
    }
}

impl ResponderConfig {
    pub fn validate(&self) -> Result<(), LinkError> {
        self.console.validate()
    }
}
