pub mod responder;
pub mod sampler;
pub mod wait;

#[cfg(test)]
pub(crate) mod mock;

pub use wait::WaitPoint;

use crate::hal::LinkError;
use core::convert::Infallible;
use core::fmt::Debug;

/// A trait that defines the common interface for both nodes (sampler and responder).
///
/// Each call to `step` runs exactly one state's transition function. Interrupt
/// handlers never change the state; they only raise flags the next `step` reads.
pub trait Node {
    type State: Copy + Debug + PartialEq;

    /// Returns the state the next `step` will execute.
    fn state(&self) -> Self::State;

    /// Executes the current state and returns the state entered.
    ///
    /// On error the node stays in the state that failed, so a later call
    /// resumes the same wait.
    fn step(&mut self) -> Result<Self::State, LinkError>;

    /// Number of active cycles that ended back in the sleeping state.
    fn cycles_completed(&self) -> u32;

    /// Runs the main loop. Only returns if a bounded wait gives up.
    fn run(&mut self) -> Result<Infallible, LinkError> {
        loop {
            self.step()?;
        }
    }
}
