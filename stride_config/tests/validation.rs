use std::io::Write;

use rstest::rstest;
use stride_config::{Config, RunMode, SensorKind, load_config};

#[test]
fn empty_file_is_a_valid_config() {
    let cfg: Config = toml::from_str("").unwrap();
    cfg.validate().unwrap();
    assert_eq!(cfg.sensor.kind, SensorKind::Counter);
    assert_eq!(cfg.sampling.rate_hz, 5);
    assert_eq!(cfg.timeouts.sample_ms, 1_000);
    assert_eq!(cfg.runner.mode, RunMode::Sampler);
}

#[test]
fn full_config_parses() {
    let cfg: Config = toml::from_str(
        r#"
        [sensor]
        kind = "detector"

        [sampling]
        rate_hz = 10

        [timeouts]
        sample_ms = 500

        [store]
        path = "/var/lib/stride/state.toml"

        [notification]
        title = "Steps"
        text = "{steps} so far"

        [logging]
        level = "debug"
        rotation = "daily"

        [runner]
        mode = "direct"
        "#,
    )
    .unwrap();
    cfg.validate().unwrap();
    assert_eq!(cfg.sensor.kind, SensorKind::Detector);
    assert_eq!(cfg.sampling.rate_hz, 10);
    assert_eq!(cfg.runner.mode, RunMode::Direct);
}

#[test]
fn sensor_ms_alias_is_accepted() {
    let cfg: Config = toml::from_str("[timeouts]\nsensor_ms = 250\n").unwrap();
    assert_eq!(cfg.timeouts.sample_ms, 250);
}

#[rstest]
#[case("[sampling]\nrate_hz = 0\n")]
#[case("[sampling]\nrate_hz = 5000\n")]
#[case("[timeouts]\nsample_ms = 0\n")]
#[case("[store]\npath = \"\"\n")]
#[case("[logging]\nrotation = \"weekly\"\n")]
#[case("[logging]\nlevel = \"loud\"\n")]
fn out_of_range_values_are_rejected(#[case] text: &str) {
    let cfg: Config = toml::from_str(text).unwrap();
    assert!(cfg.validate().is_err(), "expected rejection for {text:?}");
}

#[test]
fn load_config_reports_missing_file() {
    let err = load_config(std::path::Path::new("/nonexistent/stride.toml")).unwrap_err();
    assert!(format!("{err:#}").contains("reading config"));
}

#[test]
fn load_config_round_trip_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[sampling]\nrate_hz = 2").unwrap();
    let cfg = load_config(file.path()).unwrap();
    assert_eq!(cfg.sampling.rate_hz, 2);
}

#[test]
fn invalid_toml_is_a_parse_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "sampling = ").unwrap();
    let err = load_config(file.path()).unwrap_err();
    assert!(format!("{err:#}").contains("parsing config"));
}
