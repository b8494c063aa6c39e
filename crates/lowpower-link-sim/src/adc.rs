use log::{debug, warn};
use lowpower_link::config::AdcConfig;
use lowpower_link::hal::AnalogSampler;
use lowpower_link::types::SAMPLE_MAX;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conversion {
    Idle,
    Running { polls_left: u32 },
    Done,
    /// Started without power or enable; never completes.
    Stalled,
}

/// Single-shot converter fed from a queue of programmed input values.
///
/// The window flag is evaluated when a conversion starts and cleared when
/// the result register is read, like the hardware it stands in for.
#[derive(Debug)]
pub struct SimAdc {
    config: AdcConfig,
    inputs: VecDeque<u16>,
    last_input: u16,
    conversion_polls: u32,
    conversion: Conversion,
    result: u16,
    window_flag: bool,
    powered: bool,
    enabled: bool,
    conversions: u32,
}

impl SimAdc {
    pub fn new(inputs: &[u16], conversion_polls: u32) -> Self {
        Self {
            config: AdcConfig::default(),
            inputs: inputs.iter().map(|v| v & SAMPLE_MAX).collect(),
            last_input: 0,
            conversion_polls,
            conversion: Conversion::Idle,
            result: 0,
            window_flag: false,
            powered: false,
            enabled: false,
            conversions: 0,
        }
    }

    pub fn conversions(&self) -> u32 {
        self.conversions
    }

    pub fn is_powered(&self) -> bool {
        self.powered
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl AnalogSampler for SimAdc {
    fn configure_adc(&mut self, config: &AdcConfig) {
        debug!(
            "ADC configured: channel AIN{}, window {:?} {}..{}",
            config.positive_channel, config.window_mode, config.window_low, config.window_high
        );
        self.config = *config;
    }

    fn power_up_front_end(&mut self) {
        self.powered = true;
    }

    fn power_down_front_end(&mut self) {
        self.powered = false;
    }

    fn enable_adc(&mut self) {
        self.enabled = true;
    }

    fn disable_adc(&mut self) {
        self.enabled = false;
        if !matches!(self.conversion, Conversion::Done) {
            self.conversion = Conversion::Idle;
        }
    }

    fn start_conversion(&mut self) {
        if !self.powered || !self.enabled {
            warn!(
                "Conversion started with front-end powered={} enabled={}",
                self.powered, self.enabled
            );
            self.conversion = Conversion::Stalled;
            return;
        }
        let input = self.inputs.pop_front().unwrap_or(self.last_input);
        self.last_input = input;
        self.result = input;
        self.window_flag = self.config.window_satisfied(input);
        self.conversion = Conversion::Running {
            polls_left: self.conversion_polls,
        };
        self.conversions += 1;
    }

    fn is_conversion_done(&mut self) -> bool {
        match self.conversion {
            Conversion::Running { polls_left: 0 } | Conversion::Done => {
                self.conversion = Conversion::Done;
                true
            }
            Conversion::Running { polls_left } => {
                self.conversion = Conversion::Running {
                    polls_left: polls_left - 1,
                };
                false
            }
            Conversion::Idle | Conversion::Stalled => false,
        }
    }

    fn is_window_satisfied(&mut self) -> bool {
        self.window_flag
    }

    fn read_result(&mut self) -> u16 {
        self.window_flag = false;
        self.conversion = Conversion::Idle;
        self.result
    }
}
