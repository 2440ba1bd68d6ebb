//! One-shot sensor tree dump.

use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;
use std::path::PathBuf;

use super::provider_for;
use crate::core::sensor_monitor::{dump_sensor_tree, HardwareSession};

/// Execute the dump command
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let fixture = matches.get_one::<PathBuf>("fixture");
    let as_json = matches.get_flag("json");

    let mut session = HardwareSession::new(provider_for(fixture));
    session.open().context("Failed to open sensor provider")?;

    // CPU usage needs two samples some time apart.
    if fixture.is_none() {
        session.refresh().context("Failed to refresh sensors")?;
        std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
    }
    let roots = session.refresh().context("Failed to refresh sensors")?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(roots)?);
    } else {
        eprintln!(
            "{}",
            format!("{} hardware node(s) from '{}'", roots.len(), session_name(fixture)).cyan()
        );
        print!("{}", dump_sensor_tree(roots));
    }
    Ok(())
}

fn session_name(fixture: Option<&PathBuf>) -> String {
    match fixture {
        Some(path) => path.display().to_string(),
        None => "sysinfo".to_string(),
    }
}
