use anyhow::Result;

use sensor_bridge::commands;

fn main() -> Result<()> {
    let matches = commands::cli().get_matches();

    match matches.subcommand() {
        Some(("run", sub_matches)) => commands::run(sub_matches),
        Some(("dump", sub_matches)) => commands::dump(sub_matches),
        Some(("config", sub_matches)) => commands::config(sub_matches),
        _ => commands::run(&matches),
    }
}
