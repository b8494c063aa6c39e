//! Runs both nodes on their own threads against the simulated boards.

use crate::board::{
    BoardTiming, ResponderBoardState, SamplerBoardState, SimResponderBoard, SimSamplerBoard,
};
use crate::link::{InterruptLine, SimButton};
use log::{debug, error, info};
use lowpower_link::{
    LinkError, Node, ResponderConfig, ResponderNode, SamplerConfig, SamplerNode, TransferMailbox,
    WaitPolicy, WakeFlag,
};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Every report ends with this line, so counting it counts reports.
const REPORT_SAMPLE_PREFIX: &str = "ADC:";

/// Poll budget used for every busy-wait of a hosted run.
pub const DEFAULT_POLL_BUDGET: u32 = 100_000;

#[derive(Debug, Clone)]
pub struct SimSettings {
    /// Analog input seen by each button press, in order.
    pub samples: Vec<u16>,
    pub sampler: SamplerConfig,
    pub responder: ResponderConfig,
    pub timing: BoardTiming,
    /// How long one press may take to show up as a report.
    pub report_timeout: Duration,
}

impl Default for SimSettings {
    fn default() -> Self {
        let policy = WaitPolicy::Bounded {
            max_polls: DEFAULT_POLL_BUDGET,
        };
        Self {
            samples: vec![500, 1500, 2500, 3500],
            sampler: SamplerConfig {
                wait_policy: policy,
                ..SamplerConfig::default()
            },
            responder: ResponderConfig {
                wait_policy: policy,
                ..ResponderConfig::default()
            },
            timing: BoardTiming::default(),
            report_timeout: Duration::from_secs(5),
        }
    }
}

/// What a finished run observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimOutcome {
    /// Everything the responder printed.
    pub console: Vec<String>,
    /// Blocks the sampler wrote while the responder was selected.
    pub frames: Vec<Vec<u8>>,
    pub sampler_cycles: u32,
    pub responder_cycles: u32,
    pub conversions: u32,
    /// Board state once both nodes were stopped.
    pub sampler_board: SamplerBoardState,
    pub responder_board: ResponderBoardState,
}

#[derive(Debug)]
pub enum SimError {
    Link(LinkError),
    /// The report for press `cycle` (zero based) never appeared.
    ReportTimeout { cycle: usize },
    /// A node did not get back to sleep after the last report.
    SettleTimeout { node: &'static str },
    NodeThreadPanicked(&'static str),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Link(e) => write!(f, "node failed: {}", e),
            Self::ReportTimeout { cycle } => write!(f, "no report for press {}", cycle),
            Self::SettleTimeout { node } => write!(f, "{} did not finish its cycle", node),
            Self::NodeThreadPanicked(node) => write!(f, "{} thread panicked", node),
        }
    }
}

impl std::error::Error for SimError {}

impl From<LinkError> for SimError {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

/// Steps `node` until `stop` is raised, publishing its cycle count.
///
/// A bounded wait that gives up is logged and retried from the same state.
fn drive<N: Node>(
    node: &mut N,
    name: &'static str,
    stop: &AtomicBool,
    cycles: &AtomicU32,
) -> Result<(), LinkError> {
    while !stop.load(Ordering::Acquire) {
        match node.step() {
            Ok(_) => {}
            Err(LinkError::WaitTimeout(point)) => {
                debug!("[{}] {} wait gave up in {:?}, retrying", name, point, node.state());
            }
            Err(e) => {
                error!("[{}] {}", name, e);
                return Err(e);
            }
        }
        cycles.store(node.cycles_completed(), Ordering::Release);
    }
    Ok(())
}

fn wait_until(timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if done() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_micros(200));
    }
}

/// Presses the sampler's button once per sample and collects what the
/// responder reports.
///
/// Each press waits for the previous report, so reports never interleave.
pub fn run(settings: &SimSettings) -> Result<SimOutcome, SimError> {
    let wake = WakeFlag::new();
    let mailbox = TransferMailbox::new();
    let sampler_line = InterruptLine::new();
    let responder_line = InterruptLine::new();

    let sampler_board = SimSamplerBoard::new(
        settings.timing,
        &settings.samples,
        sampler_line.receiver(),
        mailbox.irq(),
        responder_line.sender(),
    );
    let responder_board = SimResponderBoard::new(settings.timing, responder_line.receiver());
    let console = responder_board.console.clone();

    let mut sampler = SamplerNode::new(sampler_board, settings.sampler, &wake)?;
    let mut responder = ResponderNode::new(responder_board, settings.responder, &mailbox)?;
    let button = SimButton::new(&wake, sampler_line.sender());

    let stop = AtomicBool::new(false);
    let sampler_cycles = AtomicU32::new(0);
    let responder_cycles = AtomicU32::new(0);
    let presses = settings.samples.len();
    info!("Running {} press(es).", presses);

    thread::scope(|s| -> Result<(), SimError> {
        let responder_thread =
            s.spawn(|| drive(&mut responder, "responder", &stop, &responder_cycles));
        let sampler_thread = s.spawn(|| drive(&mut sampler, "sampler", &stop, &sampler_cycles));
        let node_exited = || responder_thread.is_finished() || sampler_thread.is_finished();

        let mut waited = Ok(());
        for cycle in 0..presses {
            button.press();
            let reported = wait_until(settings.report_timeout, || {
                console.count_prefixed(REPORT_SAMPLE_PREFIX) > cycle || node_exited()
            });
            if !reported {
                waited = Err(SimError::ReportTimeout { cycle });
                break;
            }
        }
        if waited.is_ok() {
            let target = presses as u32;
            for (node, cycles) in [("sampler", &sampler_cycles), ("responder", &responder_cycles)] {
                let settled = wait_until(settings.report_timeout, || {
                    cycles.load(Ordering::Acquire) >= target || node_exited()
                });
                if !settled {
                    waited = Err(SimError::SettleTimeout { node });
                    break;
                }
            }
        }

        stop.store(true, Ordering::Release);
        let responder_result = responder_thread
            .join()
            .map_err(|_| SimError::NodeThreadPanicked("responder"))?;
        let sampler_result = sampler_thread
            .join()
            .map_err(|_| SimError::NodeThreadPanicked("sampler"))?;
        responder_result?;
        sampler_result?;
        waited
    })?;

    let board = sampler.hal();
    Ok(SimOutcome {
        console: console.lines(),
        frames: board.spi.frames().to_vec(),
        sampler_cycles: sampler.cycles_completed(),
        responder_cycles: responder.cycles_completed(),
        conversions: board.adc.conversions(),
        sampler_board: board.state(),
        responder_board: responder.hal().state(),
    })
}
