//! Runs the sampler and responder against each other and prints the
//! responder's console.
//!
//! ```text
//! RUST_LOG=debug twin-node --samples 500,1500,3500 --window-low 1000 --window-high 3000
//! ```

use clap::Parser;
use lowpower_link::WaitPolicy;
use lowpower_link_sim::{SimSettings, run};
use std::error::Error;

#[derive(Parser, Debug)]
#[command(about = "Simulate a sampler and a responder exchanging measurements")]
struct Args {
    /// Analog inputs, one per button press.
    #[arg(long, value_delimiter = ',', default_value = "500,1500,2500,3500")]
    samples: Vec<u16>,

    #[arg(long, default_value_t = 1000)]
    window_low: u16,

    #[arg(long, default_value_t = 3000)]
    window_high: u16,

    /// Polls allowed per busy-wait; 0 waits forever.
    #[arg(long, default_value_t = 100_000)]
    poll_budget: u32,

    /// Sleep for the settle delays instead of only counting them.
    #[arg(long)]
    realtime: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let policy = match args.poll_budget {
        0 => WaitPolicy::Unbounded,
        max_polls => WaitPolicy::Bounded { max_polls },
    };
    let mut settings = SimSettings {
        samples: args.samples,
        ..SimSettings::default()
    };
    settings.sampler.adc.window_low = args.window_low;
    settings.sampler.adc.window_high = args.window_high;
    settings.sampler.wait_policy = policy;
    settings.responder.wait_policy = policy;
    settings.timing.realtime = args.realtime;

    let outcome = run(&settings)?;
    for line in &outcome.console {
        println!("{line}");
    }
    eprintln!(
        "{} conversion(s), {} frame(s), cycles: sampler {} responder {}",
        outcome.conversions,
        outcome.frames.len(),
        outcome.sampler_cycles,
        outcome.responder_cycles
    );
    Ok(())
}
