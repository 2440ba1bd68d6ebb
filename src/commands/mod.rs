// Command handlers module
pub mod config;
pub mod dump;
pub mod run;

use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, Command};

use crate::core::sensor_monitor::SensorProvider;
use crate::platform::{FixtureProvider, SysinfoProvider};

// Re-exports for cleaner imports
pub use config::execute as config;
pub use dump::execute as dump;
pub use run::execute as run;

fn fixture_arg() -> Arg {
    Arg::new("fixture")
        .long("fixture")
        .value_name("PATH")
        .help("Replay a JSON sensor tree instead of reading hardware")
        .value_parser(value_parser!(PathBuf))
}

fn run_args() -> Vec<Arg> {
    vec![
        Arg::new("ticks")
            .long("ticks")
            .value_name("N")
            .help("Stop after N ticks (default: run until Ctrl+C)")
            .value_parser(value_parser!(u64).range(1..)),
        Arg::new("interval-ms")
            .long("interval-ms")
            .value_name("MS")
            .help("Delay between ticks in milliseconds (100-60000)")
            .value_parser(value_parser!(u64)),
        fixture_arg(),
        Arg::new("log-file")
            .long("log-file")
            .value_name("PATH")
            .help("Mirror log lines into a file (platform default when PATH is omitted)")
            .num_args(0..=1)
            .default_missing_value(""),
    ]
}

/// Command-line definition shared by the binary and its tests.
pub fn cli() -> Command {
    Command::new("sensor-bridge")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Samples hardware sensors and writes one JSON snapshot per tick")
        .args_conflicts_with_subcommands(true)
        .args(run_args())
        .subcommand(
            Command::new("run")
                .about("Run the sampling loop (default)")
                .args(run_args()),
        )
        .subcommand(
            Command::new("dump")
                .about("Refresh the sensors once and print the tree")
                .arg(fixture_arg())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print the tree as JSON (usable as a --fixture file)")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("config").about("Print the effective configuration as JSON"))
}

/// Fixture replay when a path is given, live hardware otherwise.
pub fn provider_for(fixture: Option<&PathBuf>) -> Box<dyn SensorProvider> {
    match fixture {
        Some(path) => Box::new(FixtureProvider::new(path.clone())),
        None => Box::new(SysinfoProvider::new()),
    }
}
