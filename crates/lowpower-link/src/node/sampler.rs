//! The sampling node: the link's initiator (the "host" board).
//!
//! One wake cycle is `Sleeping -> RaisingClock -> ReadingSample ->
//! SendingPacket -> LoweringClock -> Sleeping`, triggered by a wake edge.

use super::wait::{WaitPoint, busy_wait};
use super::Node;
use crate::config::SamplerConfig;
use crate::hal::{LinkError, SamplerHal};
use crate::mailbox::WakeFlag;
use crate::packet::MeasurementPacket;
use crate::types::Sample12;
use log::{debug, info, trace};

/// States of the sampling node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SamplerState {
    /// One-time peripheral setup.
    #[default]
    Init,
    /// Halted until an interrupt; leaves only on a wake edge.
    Sleeping,
    RaisingClock,
    /// Powers the analog front-end and converts one sample.
    ReadingSample,
    /// Transfers the packet produced by `ReadingSample`.
    SendingPacket(MeasurementPacket),
    LoweringClock,
}

/// Represents a complete sampling node.
/// This struct owns the board and sequences it through the wake cycle.
pub struct SamplerNode<'a, H: SamplerHal> {
    hal: H,
    config: SamplerConfig,
    wake: &'a WakeFlag,
    state: SamplerState,
    /// Wait left unfinished by a bounded timeout; its setup is not repeated.
    pending_wait: Option<WaitPoint>,
    cycles_completed: u32,
}

impl<'a, H: SamplerHal> SamplerNode<'a, H> {
    /// Creates a sampler in the `Init` state.
    ///
    /// `wake` is the flag raised by the wake-edge interrupt handler.
    pub fn new(hal: H, config: SamplerConfig, wake: &'a WakeFlag) -> Result<Self, LinkError> {
        config.validate()?;
        info!("Creating new sampler node.");
        Ok(Self {
            hal,
            config,
            wake,
            state: SamplerState::Init,
            pending_wait: None,
            cycles_completed: 0,
        })
    }

    pub fn hal(&self) -> &H {
        &self.hal
    }

    pub fn hal_mut(&mut self) -> &mut H {
        &mut self.hal
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Consumes the node and returns the board.
    pub fn release(self) -> H {
        self.hal
    }

    fn init(&mut self) -> SamplerState {
        self.hal.select_low_power();
        self.hal.configure_pins();
        self.hal.configure_adc(&self.config.adc);
        self.hal.configure_console(&self.config.console);
        self.hal.configure_sleep(self.config.sleep_mode);
        self.hal.enable_interrupts();
        info!("Sampler initialised, entering sleep.");
        SamplerState::Sleeping
    }

    fn sleep(&mut self) -> SamplerState {
        self.hal.halt();
        if self.wake.take() {
            debug!("Wake edge received.");
            SamplerState::RaisingClock
        } else {
            trace!("Spurious wake, back to sleep.");
            SamplerState::Sleeping
        }
    }

    fn raise_clock(&mut self) -> Result<SamplerState, LinkError> {
        if self.pending_wait.replace(WaitPoint::HighSpeedClock).is_none() {
            self.hal.select_high_speed(self.config.high_speed);
        }
        let policy = self.config.wait_policy;
        busy_wait(policy, WaitPoint::HighSpeedClock, || {
            self.hal.is_high_speed_stable()
        })?;
        self.pending_wait = None;
        Ok(SamplerState::ReadingSample)
    }

    fn read_sample(&mut self) -> Result<SamplerState, LinkError> {
        let policy = self.config.wait_policy;
        // A retried step keeps polling the conversion already running.
        if self.pending_wait.replace(WaitPoint::Conversion).is_none() {
            self.hal.power_up_front_end();
            self.hal.enable_adc();
            self.hal.delay_us(self.config.adc_settle_us);
            self.hal.start_conversion();
        }
        busy_wait(policy, WaitPoint::Conversion, || self.hal.is_conversion_done())?;
        self.pending_wait = None;

        // The comparator flag is cleared by reading the result register.
        let window_satisfied = self.hal.is_window_satisfied();
        let sample = Sample12::from_masked(self.hal.read_result());

        let packet = MeasurementPacket::pack(sample, window_satisfied);

        self.hal.disable_adc();
        self.hal.power_down_front_end();

        debug!(
            "Sampled {} (window {}), packet {:02X?}",
            sample,
            window_satisfied,
            packet.as_bytes()
        );
        Ok(SamplerState::SendingPacket(packet))
    }

    fn send_packet(&mut self, packet: MeasurementPacket) -> SamplerState {
        self.hal.enable_initiator();
        self.hal.select_peer();
        self.hal.delay_us(self.config.select_settle_us);
        self.hal.write(packet.as_bytes());
        self.hal.deselect_peer();
        self.hal.disable_initiator();
        self.hal.release_pins();
        debug!("Packet {:02X?} sent.", packet.as_bytes());
        SamplerState::LoweringClock
    }

    fn lower_clock(&mut self) -> Result<SamplerState, LinkError> {
        if self.pending_wait.replace(WaitPoint::LowPowerClock).is_none() {
            self.hal.select_low_power();
        }
        let policy = self.config.wait_policy;
        busy_wait(policy, WaitPoint::LowPowerClock, || {
            self.hal.is_low_power_stable()
        })?;
        self.pending_wait = None;
        self.hal.disable_unused_pins();
        self.cycles_completed = self.cycles_completed.wrapping_add(1);
        info!("Sampler cycle {} complete.", self.cycles_completed);
        Ok(SamplerState::Sleeping)
    }
}

impl<H: SamplerHal> Node for SamplerNode<'_, H> {
    type State = SamplerState;

    fn state(&self) -> SamplerState {
        self.state
    }

    fn step(&mut self) -> Result<SamplerState, LinkError> {
        let next = match self.state {
            SamplerState::Init => self.init(),
            SamplerState::Sleeping => self.sleep(),
            SamplerState::RaisingClock => self.raise_clock()?,
            SamplerState::ReadingSample => self.read_sample()?,
            SamplerState::SendingPacket(packet) => self.send_packet(packet),
            SamplerState::LoweringClock => self.lower_clock()?,
        };
        if next != self.state {
            trace!("Sampler {:?} -> {:?}", self.state, next);
        }
        self.state = next;
        Ok(next)
    }

    fn cycles_completed(&self) -> u32 {
        self.cycles_completed
    }
}
