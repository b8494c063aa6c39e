// crates/lowpower-link-sim/src/lib.rs
//! Hosted simulation of the sampler and responder boards.
//!
//! Every peripheral is modelled just far enough to exercise the node state
//! machines: oscillators that need polling before they report stable, a
//! converter with a clear-on-read window flag, and a serial link whose
//! transfers run the responder's interrupt handlers on the initiator's
//! thread, the way a real peripheral interrupts asynchronously.

pub mod adc;
pub mod board;
pub mod clock;
pub mod console;
pub mod link;
pub mod runner;

pub use board::{ResponderBoardState, SamplerBoardState, SimResponderBoard, SimSamplerBoard};
pub use runner::{SimError, SimOutcome, SimSettings, run};
