//! Recording board used by the unit tests of both nodes.

use crate::config::{AdcConfig, ConsoleConfig};
use crate::hal::{
    AnalogSampler, CharacterOutput, ClockSelector, InterruptControl, PinControl, SerialInitiator,
    SerialResponder, SleepController,
};
use crate::types::{HighSpeedFrequency, SleepMode};
use core::fmt;
use embedded_hal::delay::DelayNs;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    SelectHighSpeed(HighSpeedFrequency),
    SelectLowPower,
    ConfigureSleep,
    Halt,
    EnableInterrupts,
    ConfigurePins,
    DisableUnusedPins,
    ConfigureAdc,
    PowerUpFrontEnd,
    PowerDownFrontEnd,
    EnableAdc,
    DisableAdc,
    StartConversion,
    IsWindowSatisfied,
    ReadResult,
    EnableInitiator,
    SelectPeer,
    DeselectPeer,
    Write(usize),
    DisableInitiator,
    ReleasePins,
    ConfigureResponder,
    ConfigureConsole,
    WriteLine,
    Delay(u32),
}

#[derive(Default)]
pub struct MockBoard {
    pub calls: Vec<Call>,
    pub frames: Vec<Vec<u8>>,
    pub lines: Vec<String>,
    pub samples: VecDeque<u16>,
    pub high_speed_polls_to_stable: u32,
    /// Failed `is_conversion_done` polls before each conversion completes.
    pub conversion_polls: u32,
    pub sleep_mode: Option<SleepMode>,
    adc: AdcConfig,
    clock_polls: u32,
    window_flag: bool,
    result: u16,
    conversion_done: bool,
    conversion_polls_left: u32,
}

impl MockBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_samples(samples: &[u16]) -> Self {
        Self {
            samples: samples.iter().copied().collect(),
            ..Self::default()
        }
    }
}

impl ClockSelector for MockBoard {
    fn select_high_speed(&mut self, frequency: HighSpeedFrequency) {
        self.clock_polls = 0;
        self.calls.push(Call::SelectHighSpeed(frequency));
    }

    fn select_low_power(&mut self) {
        self.calls.push(Call::SelectLowPower);
    }

    fn is_high_speed_stable(&mut self) -> bool {
        self.clock_polls += 1;
        self.clock_polls > self.high_speed_polls_to_stable
    }

    fn is_low_power_stable(&mut self) -> bool {
        true
    }
}

impl SleepController for MockBoard {
    fn configure_sleep(&mut self, mode: SleepMode) {
        self.sleep_mode = Some(mode);
        self.calls.push(Call::ConfigureSleep);
    }

    fn halt(&mut self) {
        self.calls.push(Call::Halt);
    }
}

impl InterruptControl for MockBoard {
    fn enable_interrupts(&mut self) {
        self.calls.push(Call::EnableInterrupts);
    }
}

impl PinControl for MockBoard {
    fn configure_pins(&mut self) {
        self.calls.push(Call::ConfigurePins);
    }

    fn disable_unused_pins(&mut self) {
        self.calls.push(Call::DisableUnusedPins);
    }
}

impl AnalogSampler for MockBoard {
    fn configure_adc(&mut self, config: &AdcConfig) {
        self.adc = *config;
        self.calls.push(Call::ConfigureAdc);
    }

    fn power_up_front_end(&mut self) {
        self.calls.push(Call::PowerUpFrontEnd);
    }

    fn power_down_front_end(&mut self) {
        self.calls.push(Call::PowerDownFrontEnd);
    }

    fn enable_adc(&mut self) {
        self.calls.push(Call::EnableAdc);
    }

    fn disable_adc(&mut self) {
        self.calls.push(Call::DisableAdc);
    }

    fn start_conversion(&mut self) {
        let sample = self.samples.pop_front().unwrap_or(0);
        self.result = sample;
        self.window_flag = self.adc.window_satisfied(sample);
        self.conversion_done = true;
        self.conversion_polls_left = self.conversion_polls;
        self.calls.push(Call::StartConversion);
    }

    fn is_conversion_done(&mut self) -> bool {
        if self.conversion_polls_left > 0 {
            self.conversion_polls_left -= 1;
            return false;
        }
        self.conversion_done
    }

    fn is_window_satisfied(&mut self) -> bool {
        self.calls.push(Call::IsWindowSatisfied);
        self.window_flag
    }

    fn read_result(&mut self) -> u16 {
        self.calls.push(Call::ReadResult);
        self.window_flag = false;
        self.conversion_done = false;
        self.result
    }
}

impl SerialInitiator for MockBoard {
    fn enable_initiator(&mut self) {
        self.calls.push(Call::EnableInitiator);
    }

    fn select_peer(&mut self) {
        self.calls.push(Call::SelectPeer);
    }

    fn deselect_peer(&mut self) {
        self.calls.push(Call::DeselectPeer);
    }

    fn write(&mut self, bytes: &[u8]) {
        self.frames.push(bytes.to_vec());
        self.calls.push(Call::Write(bytes.len()));
    }

    fn disable_initiator(&mut self) {
        self.calls.push(Call::DisableInitiator);
    }

    fn release_pins(&mut self) {
        self.calls.push(Call::ReleasePins);
    }
}

impl SerialResponder for MockBoard {
    fn configure_responder(&mut self) {
        self.calls.push(Call::ConfigureResponder);
    }
}

impl CharacterOutput for MockBoard {
    fn configure_console(&mut self, _config: &ConsoleConfig) {
        self.calls.push(Call::ConfigureConsole);
    }

    fn write_line(&mut self, line: fmt::Arguments<'_>) {
        self.lines.push(line.to_string());
        self.calls.push(Call::WriteLine);
    }
}

impl DelayNs for MockBoard {
    fn delay_ns(&mut self, ns: u32) {
        self.calls.push(Call::Delay(ns));
    }
}
