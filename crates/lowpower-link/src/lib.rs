#![cfg_attr(not(any(test, feature = "std")), no_std)]

// --- Foundation Modules ---
pub mod types;
pub mod hal;
pub mod config;

// --- Data Exchange ---
pub mod packet;
pub mod mailbox;

// --- Node Abstraction ---
pub mod node;

// --- Top-level Exports ---
pub use types::{Sample12, PACKET_LEN};
pub use hal::{LinkError, ResponderHal, SamplerHal};
pub use config::{ResponderConfig, SamplerConfig, WaitPolicy};
pub use packet::{MeasurementPacket, Report};
pub use mailbox::{ResponderIrq, TransferMailbox, WakeFlag};
pub use node::{Node, WaitPoint};
pub use node::responder::{ResponderNode, ResponderState};
pub use node::sampler::{SamplerNode, SamplerState};
