//! Loading thresholds from TOML files.

use std::fs;

use rstest::rstest;
use voxsim::{ConfigError, SimConfig};

#[rstest]
fn loads_overrides_from_a_file() {
    let path = std::env::temp_dir().join(format!("voxsim-config-{}.toml", std::process::id()));
    fs::write(
        &path,
        "[void]\nboundary = -64.0\nticks_per_damage = 10\n\n[replication]\nteleport_interval = 200\n",
    )
    .expect("write config");

    let loaded = SimConfig::load(&path);
    fs::remove_file(&path).expect("clean up");

    let config = loaded.expect("valid config");
    approx::assert_relative_eq!(config.void.boundary, -64.0);
    assert_eq!(config.void.ticks_per_damage, 10);
    assert_eq!(config.replication.teleport_interval, 200);
    assert_eq!(config.burning, SimConfig::default().burning);
}

#[rstest]
fn malformed_documents_are_parse_errors() {
    assert!(matches!(
        SimConfig::from_toml_str("[void\nboundary = 1"),
        Err(ConfigError::Parse(_))
    ));
}

#[rstest]
#[case("[air]\ndrowning_ticks = 0\n", "air.drowning_ticks")]
#[case("[burning]\nticks_per_lava_damage = 0\n", "burning.ticks_per_lava_damage")]
fn zero_cadences_are_invalid(#[case] source: &str, #[case] field: &str) {
    let err = SimConfig::from_toml_str(source).expect_err("invalid config");
    assert!(err.to_string().contains(field), "{err}");
}
