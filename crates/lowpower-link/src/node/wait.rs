use crate::config::WaitPolicy;
use crate::hal::LinkError;
use core::fmt;
use log::trace;

/// The hardware conditions a node busy-waits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitPoint {
    HighSpeedClock,
    LowPowerClock,
    Conversion,
    TransferComplete,
}

impl fmt::Display for WaitPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HighSpeedClock => write!(f, "high-speed oscillator stable"),
            Self::LowPowerClock => write!(f, "low-power oscillator stable"),
            Self::Conversion => write!(f, "conversion complete"),
            Self::TransferComplete => write!(f, "transfer complete"),
        }
    }
}

/// Polls `ready` until it returns true.
///
/// Returns the number of failed polls. With `WaitPolicy::Unbounded` a
/// condition that never holds hangs the caller; `Bounded` gives up with
/// `LinkError::WaitTimeout`.
pub fn busy_wait(
    policy: WaitPolicy,
    point: WaitPoint,
    mut ready: impl FnMut() -> bool,
) -> Result<u32, LinkError> {
    let mut polls: u32 = 0;
    while !ready() {
        polls = polls.saturating_add(1);
        if let WaitPolicy::Bounded { max_polls } = policy
            && polls >= max_polls
        {
            return Err(LinkError::WaitTimeout(point));
        }
        core::hint::spin_loop();
    }
    trace!("Wait for {} satisfied after {} polls", point, polls);
    Ok(polls)
}
