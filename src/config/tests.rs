use super::{MIN_ID_BYTES, load_config};
use super::settings::{BrokerSettings, Settings};
use serial_test::serial;
use std::env;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.broker.channel_capacity, 1);
    assert_eq!(settings.broker.id_bytes, MIN_ID_BYTES);
    assert_eq!(settings.broker.max_in_flight, 0);
    assert_eq!(settings.log.level, "info");
}

#[test]
fn test_normalized_clamps_to_minimums() {
    let settings = BrokerSettings {
        channel_capacity: 0,
        id_bytes: 8,
        max_in_flight: 3,
    }
    .normalized();
    assert_eq!(settings.channel_capacity, 1);
    assert_eq!(settings.id_bytes, MIN_ID_BYTES);
    assert_eq!(settings.max_in_flight, 3);
}

#[test]
#[serial]
fn test_load_config_from_env_overrides_defaults() {
    temp_env::with_vars(
        [
            ("FANOUT_BROKER__CHANNEL_CAPACITY", Some("8")),
            ("FANOUT_BROKER__MAX_IN_FLIGHT", Some("16")),
            ("FANOUT_LOG__LEVEL", Some("debug")),
        ],
        || {
            let cfg = load_config().expect("load_config failed");
            assert_eq!(cfg.broker.channel_capacity, 8);
            assert_eq!(cfg.broker.max_in_flight, 16);
            assert_eq!(cfg.broker.id_bytes, MIN_ID_BYTES);
            assert_eq!(cfg.log.level, "debug");
        },
    );
}

#[test]
#[serial]
fn test_load_config_from_file_overrides_defaults() {
    // load_config looks for config/default.* relative to the working directory
    let tmp = TempDir::new().expect("create tempdir");
    let orig = env::current_dir().expect("current_dir");
    env::set_current_dir(tmp.path()).expect("set current dir");

    fs::create_dir_all("config").expect("create config dir");
    let toml = r#"
        [broker]
        channel_capacity = 32
        id_bytes = 64

        [log]
        level = "warn"
    "#;
    fs::write("config/default.toml", toml).expect("write config file");

    let cfg = load_config();

    env::set_current_dir(orig).expect("restore cwd");

    let cfg = cfg.expect("load_config failed");
    assert_eq!(cfg.broker.channel_capacity, 32);
    assert_eq!(cfg.broker.id_bytes, 64);
    assert_eq!(cfg.broker.max_in_flight, 0);
    assert_eq!(cfg.log.level, "warn");
}

#[test]
#[serial]
fn test_load_config_clamps_small_values() {
    temp_env::with_vars(
        [
            ("FANOUT_BROKER__CHANNEL_CAPACITY", Some("0")),
            ("FANOUT_BROKER__ID_BYTES", Some("4")),
        ],
        || {
            let cfg = load_config().expect("load_config failed");
            assert_eq!(cfg.broker.channel_capacity, 1);
            assert_eq!(cfg.broker.id_bytes, MIN_ID_BYTES);
        },
    );
}
