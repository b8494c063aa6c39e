use crate::config::{AdcConfig, ConsoleConfig};
use crate::node::WaitPoint;
use crate::types::{HighSpeedFrequency, SleepMode};
use core::fmt;
use embedded_hal::delay::DelayNs;

/// Defines a portable, descriptive Error type for the node state machines.
///
/// On target hardware none of these surface at runtime: waits are unbounded
/// and configuration is fixed at build time. They exist for bounded waits on
/// hosted platforms and for rejecting malformed configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// A bounded busy-wait ran out of polls before its condition held.
    WaitTimeout(WaitPoint),
    /// A value does not fit in the 12-bit converter range.
    SampleOutOfRange(u16),
    /// A node configuration failed validation.
    InvalidConfig(&'static str),
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WaitTimeout(point) => write!(f, "Poll budget exhausted while waiting for {point}"),
            Self::SampleOutOfRange(v) => write!(f, "Sample value {v:#06x} exceeds the 12-bit range"),
            Self::InvalidConfig(s) => write!(f, "Invalid configuration: {s}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LinkError {}

/// Switches the processor clock source between the low-power and the
/// high-speed internal oscillators.
pub trait ClockSelector {
    /// Requests the high-speed oscillator as main clock.
    fn select_high_speed(&mut self, frequency: HighSpeedFrequency);

    /// Requests the 32.768 kHz oscillator as main clock.
    fn select_low_power(&mut self);

    /// Hardware status bit: the high-speed oscillator is running and stable.
    fn is_high_speed_stable(&mut self) -> bool;

    /// Hardware status bit: the low-power oscillator is running and stable.
    fn is_low_power_stable(&mut self) -> bool;
}

/// Sleep controller and the halt primitive.
pub trait SleepController {
    fn configure_sleep(&mut self, mode: SleepMode);

    /// Suspends execution until any enabled interrupt fires.
    /// Returning says nothing about which interrupt it was.
    fn halt(&mut self);
}

/// Global interrupt enable.
pub trait InterruptControl {
    fn enable_interrupts(&mut self);
}

/// Digital I/O setup and leakage control.
pub trait PinControl {
    /// Configures directions, pull-ups and the wake-edge interrupt.
    fn configure_pins(&mut self);

    /// Parks every pin that is not needed while asleep.
    fn disable_unused_pins(&mut self);
}

/// Single-shot analog sampler with a hardware window comparator.
pub trait AnalogSampler {
    fn configure_adc(&mut self, config: &AdcConfig);

    /// Powers the supply rail(s) of the analog front-end.
    fn power_up_front_end(&mut self);
    fn power_down_front_end(&mut self);

    fn enable_adc(&mut self);
    fn disable_adc(&mut self);

    fn start_conversion(&mut self);
    fn is_conversion_done(&mut self) -> bool;

    /// Window comparator result of the last conversion.
    /// Must be read before `read_result`.
    fn is_window_satisfied(&mut self) -> bool;

    /// Reads the numeric result register. Clears the window flag.
    fn read_result(&mut self) -> u16;
}

/// Serial-transfer engine in initiator role.
pub trait SerialInitiator {
    fn enable_initiator(&mut self);
    /// Asserts the responder-select line.
    fn select_peer(&mut self);
    /// De-asserts the responder-select line.
    fn deselect_peer(&mut self);
    /// Shifts out every byte, blocking until the last one has left.
    fn write(&mut self, bytes: &[u8]);
    fn disable_initiator(&mut self);
    /// Returns the engine's pins to their lowest-leakage configuration.
    fn release_pins(&mut self);
}

/// Serial-transfer engine in responder role.
///
/// Received bytes are delivered by the engine's interrupt handler through a
/// [`ResponderIrq`](crate::mailbox::ResponderIrq), not through this trait.
pub trait SerialResponder {
    fn configure_responder(&mut self);
}

/// Line-oriented character output stream.
pub trait CharacterOutput {
    fn configure_console(&mut self, config: &ConsoleConfig);
    fn write_line(&mut self, line: fmt::Arguments<'_>);
}

/// Everything a sampler board must provide.
pub trait SamplerHal:
    ClockSelector
    + SleepController
    + InterruptControl
    + PinControl
    + AnalogSampler
    + SerialInitiator
    + CharacterOutput
    + DelayNs
{
}

impl<T> SamplerHal for T where
    T: ClockSelector
        + SleepController
        + InterruptControl
        + PinControl
        + AnalogSampler
        + SerialInitiator
        + CharacterOutput
        + DelayNs
{
}

/// Everything a responder board must provide.
pub trait ResponderHal:
    ClockSelector
    + SleepController
    + InterruptControl
    + PinControl
    + SerialResponder
    + CharacterOutput
    + DelayNs
{
}

impl<T> ResponderHal for T where
    T: ClockSelector
        + SleepController
        + InterruptControl
        + PinControl
        + SerialResponder
        + CharacterOutput
        + DelayNs
{
}
