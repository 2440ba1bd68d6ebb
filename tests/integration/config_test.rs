use sensor_bridge::commands::{self, run::apply_overrides};
use sensor_bridge::core::config::{ENV_EXC_MAX, ENV_IDLE_SEC, ENV_LOG_FILE, ENV_TICKS, ENV_TICK_MS};
use sensor_bridge::{BridgeConfig, BridgeError};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

fn from_vars(vars: &[(&str, &str)]) -> BridgeConfig {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    BridgeConfig::from_lookup(|name| map.get(name).cloned())
}

#[test]
fn test_config_default() {
    let config = from_vars(&[]);
    assert_eq!(config, BridgeConfig::default());
    assert_eq!(config.tick_interval(), Duration::from_secs(1));
    assert_eq!(config.supervisor_policy().periodic_interval, None);
}

#[test]
fn test_config_variables_are_clamped() {
    let config = from_vars(&[
        (ENV_IDLE_SEC, "5"),
        (ENV_EXC_MAX, "1000"),
        (ENV_TICK_MS, "oops"),
        (ENV_TICKS, "0"),
    ]);
    assert_eq!(config.idle_threshold_sec, 30);
    assert_eq!(config.exc_threshold, 100);
    assert_eq!(config.tick_ms, 1000);
    assert_eq!(config.max_ticks, None);
}

#[test]
fn test_cli_overrides_environment() {
    let mut config = from_vars(&[(ENV_TICKS, "50"), (ENV_TICK_MS, "2000")]);
    let matches = commands::cli()
        .try_get_matches_from(["sensor-bridge", "--ticks", "3", "--interval-ms", "50"])
        .unwrap();

    apply_overrides(&mut config, &matches).unwrap();

    assert_eq!(config.max_ticks, Some(3));
    assert_eq!(config.tick_ms, 100);
}

#[test]
fn test_run_subcommand_accepts_log_file() {
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("bridge.log");
    let matches = commands::cli()
        .try_get_matches_from([
            "sensor-bridge",
            "run",
            "--log-file",
            log_path.to_str().unwrap(),
        ])
        .unwrap();
    let (name, sub) = matches.subcommand().unwrap();
    assert_eq!(name, "run");

    let mut config = from_vars(&[(ENV_LOG_FILE, "/ignored.log")]);
    apply_overrides(&mut config, sub).unwrap();
    assert_eq!(config.log_file, Some(log_path));
}

#[test]
fn test_bare_log_file_flag_uses_platform_default() {
    let matches = commands::cli()
        .try_get_matches_from(["sensor-bridge", "--log-file"])
        .unwrap();
    let mut config = BridgeConfig::default();
    match BridgeConfig::default_log_path() {
        Some(default) => {
            apply_overrides(&mut config, &matches).unwrap();
            assert_eq!(config.log_file, Some(default));
        }
        None => {
            let err = apply_overrides(&mut config, &matches).unwrap_err();
            assert!(matches!(err, BridgeError::Config(_)));
            assert_eq!(config.log_file, None);
        }
    }
}

#[test]
fn test_cli_rejects_zero_ticks() {
    assert!(commands::cli()
        .try_get_matches_from(["sensor-bridge", "--ticks", "0"])
        .is_err());
}

#[test]
fn test_dump_subcommand_parses_fixture() {
    let matches = commands::cli()
        .try_get_matches_from(["sensor-bridge", "dump", "--fixture", "tree.json", "--json"])
        .unwrap();
    let (name, sub) = matches.subcommand().unwrap();
    assert_eq!(name, "dump");
    assert_eq!(
        sub.get_one::<PathBuf>("fixture"),
        Some(&PathBuf::from("tree.json"))
    );
    assert!(sub.get_flag("json"));
}

#[test]
fn test_config_serializes_camel_case() {
    let json = serde_json::to_value(BridgeConfig::default()).unwrap();
    assert_eq!(json["idleThresholdSec"], 300);
    assert_eq!(json["excThreshold"], 5);
    assert!(json["maxTicks"].is_null());
}
