//! Interrupt lines and the simulated serial link between the two boards.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use log::{trace, warn};
use lowpower_link::hal::{InterruptControl, SerialInitiator, SleepController};
use lowpower_link::types::SleepMode;
use lowpower_link::{ResponderIrq, WakeFlag};
use std::thread;
use std::time::Duration;

/// Interrupt sources that can end a halt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Irq {
    WakeEdge,
    PeerSelect,
    ByteReceived,
}

/// The wire between interrupt sources and one board's sleep controller.
pub struct InterruptLine {
    tx: Sender<Irq>,
    rx: Receiver<Irq>,
}

impl Default for InterruptLine {
    fn default() -> Self {
        Self::new()
    }
}

impl InterruptLine {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> Sender<Irq> {
        self.tx.clone()
    }

    pub fn receiver(&self) -> Receiver<Irq> {
        self.rx.clone()
    }
}

/// Sleep controller whose halt blocks on the board's interrupt line.
///
/// An idle timeout ends the halt as a spurious wake so the driving thread
/// can observe shutdown requests.
pub struct SimSleep {
    line: Receiver<Irq>,
    idle_timeout: Duration,
    mode: Option<SleepMode>,
    interrupts_enabled: bool,
    halts: u32,
}

impl SimSleep {
    pub fn new(line: Receiver<Irq>, idle_timeout: Duration) -> Self {
        Self {
            line,
            idle_timeout,
            mode: None,
            interrupts_enabled: false,
            halts: 0,
        }
    }

    pub fn mode(&self) -> Option<SleepMode> {
        self.mode
    }

    pub fn interrupts_enabled(&self) -> bool {
        self.interrupts_enabled
    }

    pub fn halts(&self) -> u32 {
        self.halts
    }
}

impl SleepController for SimSleep {
    fn configure_sleep(&mut self, mode: SleepMode) {
        self.mode = Some(mode);
    }

    fn halt(&mut self) {
        self.halts += 1;
        if !self.interrupts_enabled {
            warn!("Halt with interrupts disabled; nothing can wake this board.");
        }
        match self.line.recv_timeout(self.idle_timeout) {
            Ok(irq) => trace!("Woken by {:?}", irq),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => thread::sleep(self.idle_timeout),
        }
    }
}

impl InterruptControl for SimSleep {
    fn enable_interrupts(&mut self) {
        self.interrupts_enabled = true;
    }
}

/// Initiator-side serial engine wired to the responder's interrupt handlers.
pub struct SimInitiator<'a> {
    peer: ResponderIrq<'a>,
    peer_line: Sender<Irq>,
    enabled: bool,
    selected: bool,
    pins_released: bool,
    frames: Vec<Vec<u8>>,
}

impl<'a> SimInitiator<'a> {
    pub fn new(peer: ResponderIrq<'a>, peer_line: Sender<Irq>) -> Self {
        Self {
            peer,
            peer_line,
            enabled: false,
            selected: false,
            pins_released: true,
            frames: Vec::new(),
        }
    }

    /// Every block written while the peer was selected.
    pub fn frames(&self) -> &[Vec<u8>] {
        &self.frames
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn pins_released(&self) -> bool {
        self.pins_released
    }

    fn interrupt_peer(&self, irq: Irq) {
        // The responder thread may already be gone during shutdown.
        let _ = self.peer_line.send(irq);
    }
}

impl SerialInitiator for SimInitiator<'_> {
    fn enable_initiator(&mut self) {
        self.enabled = true;
        self.pins_released = false;
    }

    fn select_peer(&mut self) {
        if !self.enabled {
            warn!("Select asserted with the serial engine disabled.");
        }
        self.selected = true;
        self.peer.on_select_edge();
        self.interrupt_peer(Irq::PeerSelect);
    }

    fn deselect_peer(&mut self) {
        self.selected = false;
    }

    fn write(&mut self, bytes: &[u8]) {
        if !self.enabled || !self.selected {
            warn!(
                "Dropping {} byte(s): engine enabled={} peer selected={}",
                bytes.len(),
                self.enabled,
                self.selected
            );
            return;
        }
        for byte in bytes {
            self.peer.on_byte_received(*byte);
            self.interrupt_peer(Irq::ByteReceived);
        }
        self.frames.push(bytes.to_vec());
    }

    fn disable_initiator(&mut self) {
        self.enabled = false;
    }

    fn release_pins(&mut self) {
        self.pins_released = true;
    }
}

/// The user button on the sampler board.
pub struct SimButton<'a> {
    wake: &'a WakeFlag,
    line: Sender<Irq>,
}

impl<'a> SimButton<'a> {
    pub fn new(wake: &'a WakeFlag, line: Sender<Irq>) -> Self {
        Self { wake, line }
    }

    /// Falling edge: the pin-change handler raises the wake flag.
    pub fn press(&self) {
        self.wake.raise();
        // The sampler thread may already be gone during shutdown.
        let _ = self.line.send(Irq::WakeEdge);
    }
}
