//! ---
//! fsim_section: "01-core-functionality"
//! fsim_subsection: "integration-tests"
//! fsim_type: "source"
//! fsim_scope: "code"
//! fsim_description: "Configuration loading and tracing bootstrap tests."
//! fsim_version: "v0.1.0"
//! fsim_owner: "tbd"
//! ---
use std::io::Write;

use r_fsim_common::config::AppConfig;
use r_fsim_common::logging::{init_tracing, LogFormat};
use r_fsim_common::LoggingConfig;
use tempfile::{tempdir, NamedTempFile};

#[test]
fn first_existing_candidate_is_loaded() {
    let mut file = NamedTempFile::new().expect("temp file");
    writeln!(
        file,
        "[simulation]\nlaunch_rod_length_m = 2.0\ndefault_plugins = [\"apogee.alert\"]"
    )
    .expect("write config");
    let missing = std::path::PathBuf::from("does/not/exist.toml");

    let loaded = AppConfig::load_with_source(&[missing, file.path().to_path_buf()])
        .expect("config loads");
    assert_eq!(loaded.source, file.path());
    assert_eq!(loaded.config.simulation.launch_rod_length_m, 2.0);
    assert_eq!(loaded.config.simulation.default_plugins, vec!["apogee.alert"]);
}

#[test]
fn missing_candidates_report_inspected_paths() {
    let err = AppConfig::load(&["nowhere/a.toml", "nowhere/b.toml"]).expect_err("no config");
    let message = err.to_string();
    assert!(message.contains("nowhere/a.toml"));
    assert!(message.contains("nowhere/b.toml"));
}

#[test]
fn invalid_file_mentions_path() {
    let mut file = NamedTempFile::new().expect("temp file");
    writeln!(file, "[simulation]\nlaunch_latitude_deg = 120.0").expect("write config");
    let err = AppConfig::from_path(file.path()).expect_err("latitude out of range");
    assert!(format!("{err:#}").contains("launch_latitude_deg"));
}

#[test]
fn tracing_installs_once_per_process() {
    let dir = tempdir().expect("tempdir");
    let config = LoggingConfig {
        directory: dir.path().join("logs"),
        format: LogFormat::Pretty,
        file_prefix: Some("fsim-test".into()),
    };
    init_tracing("config-tests", &config).expect("tracing init");
    assert!(config.directory.is_dir());

    let err = init_tracing("config-tests", &config).expect_err("second install");
    assert!(err.to_string().contains("already installed"), "{err:#}");
}
