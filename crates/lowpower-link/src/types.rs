use crate::hal::LinkError;
use core::convert::TryFrom;
use core::fmt;

// --- Link Constants ---

/// Size of the measurement packet exchanged once per wake cycle (2 Byte)
pub const PACKET_LEN: usize = 2;

/// Largest value the 12-bit converter can produce (0x0FFF)
pub const SAMPLE_MAX: u16 = 0x0FFF;

/// Bit of packet byte 1 carrying the window comparison result
pub const WINDOW_FLAG_BIT: u8 = 1 << 7;

/// Mask of packet byte 1 carrying sample bits 8..=11
pub const SAMPLE_HIGH_NIBBLE_MASK: u8 = 0x0F;

/// Frequency of the internal low-power oscillator (32.768 kHz)
pub const LOW_POWER_CLOCK_HZ: u32 = 32_768;

/// A 12-bit converter result, wrapping a `u16` so that out-of-range
/// values cannot reach the packet encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Sample12(u16);

impl Sample12 {
    /// Builds a sample by discarding everything above bit 11.
    pub const fn from_masked(raw: u16) -> Self {
        Self(raw & SAMPLE_MAX)
    }

    pub const fn value(self) -> u16 {
        self.0
    }
}

impl TryFrom<u16> for Sample12 {
    type Error = LinkError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        if value > SAMPLE_MAX {
            Err(LinkError::SampleOutOfRange(value))
        } else {
            Ok(Self(value))
        }
    }
}

impl From<Sample12> for u16 {
    fn from(sample: Sample12) -> Self {
        sample.0
    }
}

impl fmt::Display for Sample12 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Frequencies selectable on the internal high-speed oscillator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HighSpeedFrequency {
    Mhz1,
    Mhz2,
    #[default]
    Mhz4,
    Mhz8,
    Mhz12,
    Mhz16,
    Mhz20,
    Mhz24,
}

impl HighSpeedFrequency {
    pub const fn hz(self) -> u32 {
        match self {
            Self::Mhz1 => 1_000_000,
            Self::Mhz2 => 2_000_000,
            Self::Mhz4 => 4_000_000,
            Self::Mhz8 => 8_000_000,
            Self::Mhz12 => 12_000_000,
            Self::Mhz16 => 16_000_000,
            Self::Mhz20 => 20_000_000,
            Self::Mhz24 => 24_000_000,
        }
    }
}

/// Sleep depth entered by the halt instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SleepMode {
    Idle,
    Standby,
    #[default]
    PowerDown,
}

/// Voltage reference used by the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdcReference {
    #[default]
    Vdd,
    Internal1V024,
    Internal2V048,
    Internal4V096,
    Internal2V500,
    External,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdcResolution {
    #[default]
    Bits12,
    Bits10,
}

/// Negative input of the converter. Single-ended conversions use `Ground`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NegativeInput {
    #[default]
    Ground,
    Channel(u8),
}

/// Window comparator mode evaluated during each conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowMode {
    Disabled,
    Below,
    Above,
    #[default]
    Inside,
    Outside,
}

impl WindowMode {
    /// Returns whether `sample` satisfies the comparator for the given
    /// thresholds, using the converter's strict comparisons.
    pub fn evaluate(self, sample: u16, low: u16, high: u16) -> bool {
        match self {
            Self::Disabled => false,
            Self::Below => sample < low,
            Self::Above => sample > high,
            Self::Inside => sample > low && sample < high,
            Self::Outside => sample < low || sample > high,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Parity {
    #[default]
    None,
    Even,
    Odd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopBits {
    #[default]
    One,
    Two,
}
