//! Sampler and responder boards assembled from the simulated peripherals.

use crate::adc::SimAdc;
use crate::clock::{ClockSource, SimClock};
use crate::console::SimConsole;
use crate::link::{Irq, SimInitiator, SimSleep};
use crossbeam_channel::{Receiver, Sender};
use embedded_hal::delay::DelayNs;
use log::trace;
use lowpower_link::config::{AdcConfig, ConsoleConfig};
use lowpower_link::hal::{
    AnalogSampler, CharacterOutput, ClockSelector, InterruptControl, PinControl, SerialInitiator,
    SerialResponder, SleepController,
};
use lowpower_link::types::{HighSpeedFrequency, SleepMode};
use lowpower_link::ResponderIrq;
use std::fmt;
use std::thread;
use std::time::Duration;

/// Settle delays: counted in virtual time, optionally slept for real.
#[derive(Debug, Default)]
pub struct SimDelay {
    realtime: bool,
    elapsed_ns: u64,
}

impl SimDelay {
    pub fn new(realtime: bool) -> Self {
        Self {
            realtime,
            elapsed_ns: 0,
        }
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.elapsed_ns)
    }
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns += u64::from(ns);
        if self.realtime {
            thread::sleep(Duration::from_nanos(u64::from(ns)));
        }
    }
}

/// Port configuration, tracked only as far as the tests need.
#[derive(Debug, Default)]
pub struct SimPins {
    configured: bool,
    parked: u32,
}

impl SimPins {
    pub fn configured(&self) -> bool {
        self.configured
    }

    /// How many times unused pins were parked before sleep.
    pub fn parked(&self) -> u32 {
        self.parked
    }
}

impl PinControl for SimPins {
    fn configure_pins(&mut self) {
        self.configured = true;
    }

    fn disable_unused_pins(&mut self) {
        trace!("Parking unused pins");
        self.parked += 1;
    }
}

/// Timing knobs shared by both boards.
#[derive(Debug, Clone, Copy)]
pub struct BoardTiming {
    pub clock_settle_polls: u32,
    pub conversion_polls: u32,
    pub halt_idle: Duration,
    pub realtime: bool,
}

impl Default for BoardTiming {
    fn default() -> Self {
        Self {
            clock_settle_polls: 8,
            conversion_polls: 4,
            halt_idle: Duration::from_millis(5),
            realtime: false,
        }
    }
}

/// Power-relevant state of the sampler board, read after a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerBoardState {
    pub clock: ClockSource,
    pub sleep_mode: Option<SleepMode>,
    pub interrupts_enabled: bool,
    pub pins_configured: bool,
    pub pins_parked: u32,
    pub front_end_powered: bool,
    pub adc_enabled: bool,
    pub initiator_enabled: bool,
    pub initiator_pins_released: bool,
    pub settle_time: Duration,
}

/// Power-relevant state of the responder board, read after a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponderBoardState {
    pub clock: ClockSource,
    pub sleep_mode: Option<SleepMode>,
    pub interrupts_enabled: bool,
    pub pins_configured: bool,
    pub responder_configured: bool,
    pub console: Option<ConsoleConfig>,
    pub settle_time: Duration,
}

/// The sampling board: button, converter and the initiator side of the link.
pub struct SimSamplerBoard<'a> {
    pub clock: SimClock,
    pub sleep: SimSleep,
    pub pins: SimPins,
    pub adc: SimAdc,
    pub spi: SimInitiator<'a>,
    pub console: SimConsole,
    pub delay: SimDelay,
}

impl<'a> SimSamplerBoard<'a> {
    pub fn new(
        timing: BoardTiming,
        inputs: &[u16],
        own_line: Receiver<Irq>,
        peer: ResponderIrq<'a>,
        peer_line: Sender<Irq>,
    ) -> Self {
        Self {
            clock: SimClock::new(timing.clock_settle_polls),
            sleep: SimSleep::new(own_line, timing.halt_idle),
            pins: SimPins::default(),
            adc: SimAdc::new(inputs, timing.conversion_polls),
            spi: SimInitiator::new(peer, peer_line),
            console: SimConsole::new("sampler"),
            delay: SimDelay::new(timing.realtime),
        }
    }

    pub fn state(&self) -> SamplerBoardState {
        SamplerBoardState {
            clock: self.clock.source(),
            sleep_mode: self.sleep.mode(),
            interrupts_enabled: self.sleep.interrupts_enabled(),
            pins_configured: self.pins.configured(),
            pins_parked: self.pins.parked(),
            front_end_powered: self.adc.is_powered(),
            adc_enabled: self.adc.is_enabled(),
            initiator_enabled: self.spi.is_enabled(),
            initiator_pins_released: self.spi.pins_released(),
            settle_time: self.delay.elapsed(),
        }
    }
}

/// The reporting board: responder side of the link and the console.
pub struct SimResponderBoard {
    pub clock: SimClock,
    pub sleep: SimSleep,
    pub pins: SimPins,
    pub console: SimConsole,
    pub delay: SimDelay,
    responder_configured: bool,
}

impl SimResponderBoard {
    pub fn new(timing: BoardTiming, own_line: Receiver<Irq>) -> Self {
        Self {
            clock: SimClock::new(timing.clock_settle_polls),
            sleep: SimSleep::new(own_line, timing.halt_idle),
            pins: SimPins::default(),
            console: SimConsole::new("responder"),
            delay: SimDelay::new(timing.realtime),
            responder_configured: false,
        }
    }

    pub fn state(&self) -> ResponderBoardState {
        ResponderBoardState {
            clock: self.clock.source(),
            sleep_mode: self.sleep.mode(),
            interrupts_enabled: self.sleep.interrupts_enabled(),
            pins_configured: self.pins.configured(),
            responder_configured: self.responder_configured,
            console: self.console.config(),
            settle_time: self.delay.elapsed(),
        }
    }
}

impl SerialResponder for SimResponderBoard {
    fn configure_responder(&mut self) {
        self.responder_configured = true;
    }
}

impl AnalogSampler for SimSamplerBoard<'_> {
    fn configure_adc(&mut self, config: &AdcConfig) {
        self.adc.configure_adc(config);
    }
    fn power_up_front_end(&mut self) {
        self.adc.power_up_front_end();
    }
    fn power_down_front_end(&mut self) {
        self.adc.power_down_front_end();
    }
    fn enable_adc(&mut self) {
        self.adc.enable_adc();
    }
    fn disable_adc(&mut self) {
        self.adc.disable_adc();
    }
    fn start_conversion(&mut self) {
        self.adc.start_conversion();
    }
    fn is_conversion_done(&mut self) -> bool {
        self.adc.is_conversion_done()
    }
    fn is_window_satisfied(&mut self) -> bool {
        self.adc.is_window_satisfied()
    }
    fn read_result(&mut self) -> u16 {
        self.adc.read_result()
    }
}

impl SerialInitiator for SimSamplerBoard<'_> {
    fn enable_initiator(&mut self) {
        self.spi.enable_initiator();
    }
    fn select_peer(&mut self) {
        self.spi.select_peer();
    }
    fn deselect_peer(&mut self) {
        self.spi.deselect_peer();
    }
    fn write(&mut self, bytes: &[u8]) {
        self.spi.write(bytes);
    }
    fn disable_initiator(&mut self) {
        self.spi.disable_initiator();
    }
    fn release_pins(&mut self) {
        self.spi.release_pins();
    }
}

/// Delegates the peripherals both boards share to their fields.
macro_rules! impl_common_peripherals {
    ($board:ty) => {
        impl ClockSelector for $board {
            fn select_high_speed(&mut self, frequency: HighSpeedFrequency) {
                self.clock.select_high_speed(frequency);
            }
            fn select_low_power(&mut self) {
                self.clock.select_low_power();
            }
            fn is_high_speed_stable(&mut self) -> bool {
                self.clock.is_high_speed_stable()
            }
            fn is_low_power_stable(&mut self) -> bool {
                self.clock.is_low_power_stable()
            }
        }

        impl SleepController for $board {
            fn configure_sleep(&mut self, mode: SleepMode) {
                self.sleep.configure_sleep(mode);
            }
            fn halt(&mut self) {
                self.sleep.halt();
            }
        }

        impl InterruptControl for $board {
            fn enable_interrupts(&mut self) {
                self.sleep.enable_interrupts();
            }
        }

        impl PinControl for $board {
            fn configure_pins(&mut self) {
                self.pins.configure_pins();
            }
            fn disable_unused_pins(&mut self) {
                self.pins.disable_unused_pins();
            }
        }

        impl CharacterOutput for $board {
            fn configure_console(&mut self, config: &ConsoleConfig) {
                self.console.configure_console(config);
            }
            fn write_line(&mut self, line: fmt::Arguments<'_>) {
                self.console.write_line(line);
            }
        }

        impl DelayNs for $board {
            fn delay_ns(&mut self, ns: u32) {
                self.delay.delay_ns(ns);
            }
        }
    };
}

impl_common_peripherals!(SimSamplerBoard<'_>);
impl_common_peripherals!(SimResponderBoard);
