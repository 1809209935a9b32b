//! Command-line front end: reads a problem document and prints the best
//! fleet size, capacity and routes.

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::{arg, Command};
use tracing::warn;
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};
use u_fleet::search::{ProblemConfig, StopFlag};

fn cli() -> Command {
    Command::new("fleet-search")
        .about("Searches fleet size and vehicle capacity minimizing total route distance")
        .arg(arg!(<PROBLEM> "Path to a JSON problem document").value_parser(clap::value_parser!(PathBuf)))
        .arg(arg!(--trials <N> "Overrides the trial count").value_parser(clap::value_parser!(usize)))
        .arg(arg!(--seed <S> "Overrides the sampler seed").value_parser(clap::value_parser!(u64)))
        .arg(arg!(--json "Prints the full report as JSON"))
}

fn enable_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let matches = cli().get_matches();
    enable_tracing();

    let path = matches
        .get_one::<PathBuf>("PROBLEM")
        .ok_or("missing problem path")?;
    let mut problem = ProblemConfig::from_json(&fs::read_to_string(path)?)?;
    if let Some(&trials) = matches.get_one::<usize>("trials") {
        problem.search.n_trials = trials;
    }
    if let Some(&seed) = matches.get_one::<u64>("seed") {
        problem.search.seed = seed;
    }

    let stop = StopFlag::new();
    let handler_flag = stop.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_flag.cancel()) {
        warn!(error = %e, "cannot install interruption handler");
    }

    let report = problem.run(stop)?;
    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}
