//! The reporting node: the link's responder (the "client" board).
//!
//! One wake cycle is `Sleeping -> RaisingClock -> AwaitingTransfer ->
//! LoweringClock -> Reporting -> Sleeping`, triggered by the initiator
//! asserting the select line.

use super::wait::{WaitPoint, busy_wait};
use super::Node;
use crate::config::ResponderConfig;
use crate::hal::{LinkError, ResponderHal};
use crate::mailbox::TransferMailbox;
use crate::packet::MeasurementPacket;
use log::{debug, info, trace};

/// States of the reporting node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponderState {
    #[default]
    Init,
    Sleeping,
    RaisingClock,
    /// Busy-waits until the receive interrupt has filled the buffer.
    AwaitingTransfer,
    LoweringClock(MeasurementPacket),
    Reporting(MeasurementPacket),
}

/// Represents a complete reporting node.
pub struct ResponderNode<'a, H: ResponderHal> {
    hal: H,
    config: ResponderConfig,
    mailbox: &'a TransferMailbox,
    state: ResponderState,
    /// Clock wait left unfinished by a bounded timeout.
    pending_wait: Option<WaitPoint>,
    cycles_completed: u32,
}

impl<'a, H: ResponderHal> ResponderNode<'a, H> {
    /// Creates a responder in the `Init` state.
    ///
    /// The interrupt handlers must be given `mailbox.irq()`.
    pub fn new(
        hal: H,
        config: ResponderConfig,
        mailbox: &'a TransferMailbox,
    ) -> Result<Self, LinkError> {
        config.validate()?;
        info!("Creating new responder node.");
        Ok(Self {
            hal,
            config,
            mailbox,
            state: ResponderState::Init,
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

    pub fn config(&self) -> &ResponderConfig {
        &self.config
    }

    pub fn release(self) -> H {
        self.hal
    }

    fn init(&mut self) -> ResponderState {
        self.hal.configure_pins();
        self.hal.select_low_power();
        self.hal.configure_console(&self.config.console);
        self.hal.configure_responder();
        self.hal.configure_sleep(self.config.sleep_mode);
        self.hal.enable_interrupts();
        info!("Responder initialised, entering sleep.");
        ResponderState::Sleeping
    }

    fn sleep(&mut self) -> ResponderState {
        self.hal.halt();
        if self.mailbox.take_select() {
            debug!("Selected by initiator.");
            ResponderState::RaisingClock
        } else {
            trace!("Spurious wake, back to sleep.");
            ResponderState::Sleeping
        }
    }

    fn raise_clock(&mut self) -> Result<ResponderState, LinkError> {
        if self.pending_wait.replace(WaitPoint::HighSpeedClock).is_none() {
            self.hal.select_high_speed(self.config.high_speed);
        }
        let policy = self.config.wait_policy;
        busy_wait(policy, WaitPoint::HighSpeedClock, || {
            self.hal.is_high_speed_stable()
        })?;
        self.pending_wait = None;
        Ok(ResponderState::AwaitingTransfer)
    }

    fn await_transfer(&mut self) -> Result<ResponderState, LinkError> {
        let mailbox = self.mailbox;
        busy_wait(self.config.wait_policy, WaitPoint::TransferComplete, || {
            mailbox.is_transfer_complete()
        })?;
        match mailbox.take_transfer() {
            Some(packet) => {
                debug!("Received packet {:02X?}", packet.as_bytes());
                Ok(ResponderState::LoweringClock(packet))
            }
            // Completion was cleared behind our back; keep waiting.
            None => Ok(ResponderState::AwaitingTransfer),
        }
    }

    fn lower_clock(&mut self, packet: MeasurementPacket) -> Result<ResponderState, LinkError> {
        if self.pending_wait.replace(WaitPoint::LowPowerClock).is_none() {
            self.hal.select_low_power();
        }
        let policy = self.config.wait_policy;
        busy_wait(policy, WaitPoint::LowPowerClock, || {
            self.hal.is_low_power_stable()
        })?;
        self.pending_wait = None;
        Ok(ResponderState::Reporting(packet))
    }

    fn report(&mut self, packet: MeasurementPacket) -> ResponderState {
        let report = packet.report();
        report.write_to(&mut self.hal);
        self.hal.delay_us(self.config.report_flush_us);
        self.cycles_completed = self.cycles_completed.wrapping_add(1);
        info!(
            "Responder cycle {} reported sample {} (window {}).",
            self.cycles_completed,
            report.sample,
            u8::from(report.window_satisfied)
        );
        ResponderState::Sleeping
    }
}

impl<H: ResponderHal> Node for ResponderNode<'_, H> {
    type State = ResponderState;

    fn state(&self) -> ResponderState {
        self.state
    }

    fn step(&mut self) -> Result<ResponderState, LinkError> {
        let next = match self.state {
            ResponderState::Init => self.init(),
            ResponderState::Sleeping => self.sleep(),
            ResponderState::RaisingClock => self.raise_clock()?,
            ResponderState::AwaitingTransfer => self.await_transfer()?,
            ResponderState::LoweringClock(packet) => self.lower_clock(packet)?,
            ResponderState::Reporting(packet) => self.report(packet),
        };
        if next != self.state {
            trace!("Responder {:?} -> {:?}", self.state, next);
        }
        self.state = next;
        Ok(next)
    }

    fn cycles_completed(&self) -> u32 {
        self.cycles_completed
    }
}
