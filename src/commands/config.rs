use anyhow::Result;

use crate::core::BridgeConfig;

/// Print the configuration the bridge would run with.
pub fn execute(_matches: &clap::ArgMatches) -> Result<()> {
    let config = BridgeConfig::from_env();
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
