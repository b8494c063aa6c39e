use lowpower_link::hal::ClockSelector;
use lowpower_link::types::{HighSpeedFrequency, LOW_POWER_CLOCK_HZ};
use log::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSource {
    LowPower,
    HighSpeed(HighSpeedFrequency),
}

/// Oscillator pair that reports stable a fixed number of status polls
/// after each switch.
#[derive(Debug)]
pub struct SimClock {
    source: ClockSource,
    settle_polls: u32,
    polls_since_switch: u32,
    switches: u32,
}

impl SimClock {
    pub fn new(settle_polls: u32) -> Self {
        Self {
            source: ClockSource::LowPower,
            settle_polls,
            polls_since_switch: settle_polls,
            switches: 0,
        }
    }

    pub fn source(&self) -> ClockSource {
        self.source
    }

    pub fn frequency_hz(&self) -> u32 {
        match self.source {
            ClockSource::LowPower => LOW_POWER_CLOCK_HZ,
            ClockSource::HighSpeed(freq) => freq.hz(),
        }
    }

    /// Number of source changes since reset.
    pub fn switches(&self) -> u32 {
        self.switches
    }

    fn switch(&mut self, source: ClockSource) {
        // Re-selecting the running source does not restart it.
        if self.source == source {
            return;
        }
        trace!("Clock switch {:?} -> {:?}", self.source, source);
        self.source = source;
        self.polls_since_switch = 0;
        self.switches += 1;
    }

    fn poll(&mut self, high_speed: bool) -> bool {
        let selected = matches!(self.source, ClockSource::HighSpeed(_)) == high_speed;
        if !selected {
            return false;
        }
        if self.polls_since_switch >= self.settle_polls {
            true
        } else {
            self.polls_since_switch += 1;
            false
        }
    }
}

impl ClockSelector for SimClock {
    fn select_high_speed(&mut self, frequency: HighSpeedFrequency) {
        self.switch(ClockSource::HighSpeed(frequency));
    }

    fn select_low_power(&mut self) {
        self.switch(ClockSource::LowPower);
    }

    fn is_high_speed_stable(&mut self) -> bool {
        self.poll(true)
    }

    fn is_low_power_stable(&mut self) -> bool {
        self.poll(false)
    }
}
