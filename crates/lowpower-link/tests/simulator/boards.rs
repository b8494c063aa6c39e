// crates/lowpower-link/tests/simulator/boards.rs
use embedded_hal::delay::DelayNs;
use lowpower_link::config::{AdcConfig, ConsoleConfig};
use lowpower_link::hal::{
    AnalogSampler, CharacterOutput, ClockSelector, InterruptControl, PinControl, SerialInitiator,
    SerialResponder, SleepController,
};
use lowpower_link::types::{HighSpeedFrequency, SleepMode};
use lowpower_link::ResponderIrq;
use std::collections::VecDeque;
use std::fmt;

/// Oscillator that needs a few status polls after every switch.
#[derive(Default)]
pub struct VirtualClock {
    polls_left: u32,
    pub high_speed: bool,
}

impl VirtualClock {
    const SETTLE_POLLS: u32 = 3;

    fn switch(&mut self, high_speed: bool) {
        self.high_speed = high_speed;
        self.polls_left = Self::SETTLE_POLLS;
    }

    fn poll(&mut self, want_high_speed: bool) -> bool {
        if self.high_speed != want_high_speed {
            return false;
        }
        if self.polls_left == 0 {
            true
        } else {
            self.polls_left -= 1;
            false
        }
    }
}

/// Sampler board whose serial engine is wired straight into the responder's
/// interrupt handlers.
pub struct VirtualSamplerBoard<'a> {
    peer: ResponderIrq<'a>,
    pub samples: VecDeque<u16>,
    pub frames: Vec<Vec<u8>>,
    pub elapsed_ns: u64,
    pub front_end_powered: bool,
    pub initiator_enabled: bool,
    pub clock: VirtualClock,
    adc: AdcConfig,
    result: u16,
    window: bool,
    done: bool,
}

impl<'a> VirtualSamplerBoard<'a> {
    pub fn new(peer: ResponderIrq<'a>, samples: &[u16]) -> Self {
        Self {
            peer,
            samples: samples.iter().copied().collect(),
            frames: Vec::new(),
            elapsed_ns: 0,
            front_end_powered: false,
            initiator_enabled: false,
            clock: VirtualClock::default(),
            adc: AdcConfig::default(),
            result: 0,
            window: false,
            done: false,
        }
    }
}

impl ClockSelector for VirtualSamplerBoard<'_> {
    fn select_high_speed(&mut self, _frequency: HighSpeedFrequency) {
        self.clock.switch(true);
    }
    fn select_low_power(&mut self) {
        self.clock.switch(false);
    }
    fn is_high_speed_stable(&mut self) -> bool {
        self.clock.poll(true)
    }
    fn is_low_power_stable(&mut self) -> bool {
        self.clock.poll(false)
    }
}

impl SleepController for VirtualSamplerBoard<'_> {
    fn configure_sleep(&mut self, _mode: SleepMode) {}
    fn halt(&mut self) {}
}

impl InterruptControl for VirtualSamplerBoard<'_> {
    fn enable_interrupts(&mut self) {}
}

impl PinControl for VirtualSamplerBoard<'_> {
    fn configure_pins(&mut self) {}
    fn disable_unused_pins(&mut self) {}
}

impl AnalogSampler for VirtualSamplerBoard<'_> {
    fn configure_adc(&mut self, config: &AdcConfig) {
        self.adc = *config;
    }
    fn power_up_front_end(&mut self) {
        self.front_end_powered = true;
    }
    fn power_down_front_end(&mut self) {
        self.front_end_powered = false;
    }
    fn enable_adc(&mut self) {}
    fn disable_adc(&mut self) {}
    fn start_conversion(&mut self) {
        assert!(self.front_end_powered, "conversion started without front-end power");
        let sample = self.samples.pop_front().unwrap_or(0);
        self.result = sample;
        self.window = self.adc.window_satisfied(sample);
        self.done = true;
    }
    fn is_conversion_done(&mut self) -> bool {
        self.done
    }
    fn is_window_satisfied(&mut self) -> bool {
        self.window
    }
    fn read_result(&mut self) -> u16 {
        self.window = false;
        self.done = false;
        self.result
    }
}

impl SerialInitiator for VirtualSamplerBoard<'_> {
    fn enable_initiator(&mut self) {
        self.initiator_enabled = true;
    }
    fn select_peer(&mut self) {
        self.peer.on_select_edge();
    }
    fn deselect_peer(&mut self) {}
    fn write(&mut self, bytes: &[u8]) {
        assert!(self.initiator_enabled, "write on a disabled serial engine");
        for byte in bytes {
            self.peer.on_byte_received(*byte);
        }
        self.frames.push(bytes.to_vec());
    }
    fn disable_initiator(&mut self) {
        self.initiator_enabled = false;
    }
    fn release_pins(&mut self) {}
}

impl CharacterOutput for VirtualSamplerBoard<'_> {
    fn configure_console(&mut self, _config: &ConsoleConfig) {}
    fn write_line(&mut self, _line: fmt::Arguments<'_>) {}
}

impl DelayNs for VirtualSamplerBoard<'_> {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns += u64::from(ns);
    }
}

/// Responder board collecting its console output.
#[derive(Default)]
pub struct VirtualResponderBoard {
    pub lines: Vec<String>,
    pub elapsed_ns: u64,
    pub halts: u32,
    pub clock: VirtualClock,
}

impl ClockSelector for VirtualResponderBoard {
    fn select_high_speed(&mut self, _frequency: HighSpeedFrequency) {
        self.clock.switch(true);
    }
    fn select_low_power(&mut self) {
        self.clock.switch(false);
    }
    fn is_high_speed_stable(&mut self) -> bool {
        self.clock.poll(true)
    }
    fn is_low_power_stable(&mut self) -> bool {
        self.clock.poll(false)
    }
}

impl SleepController for VirtualResponderBoard {
    fn configure_sleep(&mut self, _mode: SleepMode) {}
    fn halt(&mut self) {
        self.halts += 1;
    }
}

impl InterruptControl for VirtualResponderBoard {
    fn enable_interrupts(&mut self) {}
}

impl PinControl for VirtualResponderBoard {
    fn configure_pins(&mut self) {}
    fn disable_unused_pins(&mut self) {}
}

impl SerialResponder for VirtualResponderBoard {
    fn configure_responder(&mut self) {}
}

impl CharacterOutput for VirtualResponderBoard {
    fn configure_console(&mut self, _config: &ConsoleConfig) {}
    fn write_line(&mut self, line: fmt::Arguments<'_>) {
        self.lines.push(line.to_string());
    }
}

impl DelayNs for VirtualResponderBoard {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns += u64::from(ns);
    }
}
