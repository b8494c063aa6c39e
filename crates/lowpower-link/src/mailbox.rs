//! Single-slot mailboxes between interrupt handlers and the node loops.
//!
//! Each flag has exactly one writer (an interrupt handler) and one consumer
//! (the owning state machine). Only atomic loads and stores are used, so
//! targets without compare-and-swap are supported.

use crate::packet::MeasurementPacket;
use crate::types::PACKET_LEN;
use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// A one-bit event raised by an interrupt handler and consumed by a node.
///
/// A second raise before consumption is coalesced into the first.
#[derive(Debug, Default)]
pub struct WakeFlag(AtomicBool);

impl WakeFlag {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Interrupt side: records the event.
    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Consumes the event, returning whether one was pending.
    ///
    /// A raise landing between the load and the store is merged into the
    /// event being consumed.
    pub fn take(&self) -> bool {
        if self.0.load(Ordering::Acquire) {
            self.0.store(false, Ordering::Release);
            true
        } else {
            false
        }
    }

    /// Clears the flag. Clearing an already-clear flag is a no-op.
    pub fn clear(&self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Receive-side state of the responder: the select event, the completion
/// event and the fixed-size receive buffer they guard.
///
/// The responder node borrows the mailbox for consumption; interrupt
/// handlers get the producer half through [`TransferMailbox::irq`].
#[derive(Debug)]
pub struct TransferMailbox {
    select: WakeFlag,
    complete: WakeFlag,
    buffer: [AtomicU8; PACKET_LEN],
    write_index: AtomicU8,
}

impl Default for TransferMailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl TransferMailbox {
    pub const fn new() -> Self {
        Self {
            select: WakeFlag::new(),
            complete: WakeFlag::new(),
            buffer: [const { AtomicU8::new(0) }; PACKET_LEN],
            write_index: AtomicU8::new(0),
        }
    }

    /// Capability handed to the select-edge and receive interrupt handlers.
    pub fn irq(&self) -> ResponderIrq<'_> {
        ResponderIrq { mailbox: self }
    }

    pub fn take_select(&self) -> bool {
        self.select.take()
    }

    pub fn clear_select(&self) {
        self.select.clear();
    }

    pub fn is_transfer_complete(&self) -> bool {
        self.complete.is_raised()
    }

    /// Consumes the completion event and snapshots the receive buffer.
    pub fn take_transfer(&self) -> Option<MeasurementPacket> {
        if !self.complete.take() {
            return None;
        }
        let mut bytes = [0u8; PACKET_LEN];
        for (dst, src) in bytes.iter_mut().zip(self.buffer.iter()) {
            *dst = src.load(Ordering::Acquire);
        }
        Some(MeasurementPacket::from_bytes(bytes))
    }

    pub fn clear_transfer(&self) {
        self.complete.clear();
    }
}

/// Producer half of a [`TransferMailbox`], used from interrupt context.
#[derive(Debug, Clone, Copy)]
pub struct ResponderIrq<'a> {
    mailbox: &'a TransferMailbox,
}

impl ResponderIrq<'_> {
    /// Select line asserted by the initiator: rewind the buffer and wake
    /// the node.
    pub fn on_select_edge(&self) {
        self.mailbox.write_index.store(0, Ordering::Release);
        self.mailbox.select.raise();
    }

    /// One byte shifted in. Raises completion once the buffer is full;
    /// anything past the packet size is dropped until the next selection.
    pub fn on_byte_received(&self, byte: u8) {
        let index = self.mailbox.write_index.load(Ordering::Acquire) as usize;
        if index >= PACKET_LEN {
            return;
        }
        self.mailbox.buffer[index].store(byte, Ordering::Release);
        let next = index + 1;
        self.mailbox.write_index.store(next as u8, Ordering::Release);
        if next == PACKET_LEN {
            self.mailbox.complete.raise();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wake_flag_coalesces() {
        let flag = WakeFlag::new();
        flag.raise();
        flag.raise();
        assert!(flag.take());
        assert!(!flag.take());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let flag = WakeFlag::new();
        flag.clear();
        assert!(!flag.is_raised());
        flag.raise();
        flag.clear();
        flag.clear();
        assert!(!flag.is_raised());

        let mailbox = TransferMailbox::new();
        mailbox.clear_transfer();
        mailbox.clear_select();
        assert_eq!(mailbox.take_transfer(), None);
        assert!(!mailbox.take_select());
    }

    #[test]
    fn test_full_transfer_raises_completion() {
        let mailbox = TransferMailbox::new();
        let irq = mailbox.irq();

        irq.on_select_edge();
        assert!(mailbox.take_select());

        irq.on_byte_received(0xBC);
        assert!(!mailbox.is_transfer_complete());
        irq.on_byte_received(0x8A);
        assert!(mailbox.is_transfer_complete());

        let packet = mailbox.take_transfer().unwrap();
        assert_eq!(packet.to_bytes(), [0xBC, 0x8A]);
        assert_eq!(mailbox.take_transfer(), None);
    }

    #[test]
    fn test_excess_bytes_are_dropped() {
        let mailbox = TransferMailbox::new();
        let irq = mailbox.irq();
        irq.on_select_edge();
        for byte in [0x01, 0x02, 0x03, 0x04] {
            irq.on_byte_received(byte);
        }
        assert_eq!(mailbox.take_transfer().unwrap().to_bytes(), [0x01, 0x02]);
    }

    #[test]
    fn test_select_rewinds_partial_transfer() {
        let mailbox = TransferMailbox::new();
        let irq = mailbox.irq();
        irq.on_select_edge();
        irq.on_byte_received(0xFF);

        irq.on_select_edge();
        irq.on_byte_received(0x23);
        irq.on_byte_received(0x01);
        assert_eq!(mailbox.take_transfer().unwrap().to_bytes(), [0x23, 0x01]);
    }
}
