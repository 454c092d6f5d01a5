use std::fs;
use std::path::PathBuf;

use recbridge::config::{Config, OutputFormat};
use recbridge::test_utils::{TestCase, run_table_tests};

fn fixture_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(relative)
}

fn load_fixture(relative: &str) -> Config {
    let content = fs::read_to_string(fixture_path(relative)).expect("read fixture");
    Config::from_toml(&content).expect("parse config")
}

#[test]
fn config_remote_section_from_fixture() -> Result<(), String> {
    let cases = vec![
        TestCase {
            name: "default",
            input: "tests/fixtures/configs/default.toml",
            expected: (
                None,
                1521u16,
                "ORCL".to_string(),
                None,
                "LDCLJ_TIAOMA".to_string(),
            ),
            should_panic: false,
        },
        TestCase {
            name: "custom",
            input: "tests/fixtures/configs/custom.toml",
            expected: (
                Some("db.internal".to_string()),
                1522u16,
                "PRODPDB".to_string(),
                Some("loader".to_string()),
                "STAGING.LDCLJ_TIAOMA".to_string(),
            ),
            should_panic: false,
        },
        TestCase {
            name: "partial",
            input: "tests/fixtures/configs/partial.toml",
            expected: (
                Some("db.internal".to_string()),
                1521u16,
                "ORCL".to_string(),
                None,
                "LDCLJ_TIAOMA".to_string(),
            ),
            should_panic: false,
        },
    ];

    run_table_tests(cases, |relative_path| {
        let remote = load_fixture(relative_path).remote;
        (
            remote.host,
            remote.port,
            remote.service,
            remote.user,
            remote.table,
        )
    })
}

#[test]
fn config_local_and_output_from_fixture() -> Result<(), String> {
    let cases = vec![
        TestCase {
            name: "default",
            input: "tests/fixtures/configs/default.toml",
            expected: (None, OutputFormat::Table),
            should_panic: false,
        },
        TestCase {
            name: "custom",
            input: "tests/fixtures/configs/custom.toml",
            expected: (
                Some(PathBuf::from("/var/lib/recbridge/record.db")),
                OutputFormat::Json,
            ),
            should_panic: false,
        },
    ];

    run_table_tests(cases, |relative_path| {
        let config = load_fixture(relative_path);
        (config.local.path, config.output.format)
    })
}

#[test]
fn config_endpoint_validation() -> Result<(), String> {
    let cases = vec![
        TestCase {
            name: "complete",
            input: "tests/fixtures/configs/custom.toml",
            expected: true,
            should_panic: false,
        },
        TestCase {
            name: "no credentials",
            input: "tests/fixtures/configs/partial.toml",
            expected: false,
            should_panic: false,
        },
    ];

    run_table_tests(cases, |relative_path| {
        load_fixture(relative_path).remote.endpoint().is_ok()
    })
}

#[test]
fn config_password_never_leaks() {
    let config = load_fixture("tests/fixtures/configs/custom.toml");
    let debug = format!("{:?}", config.remote);
    assert!(!debug.contains("hunter2"));
    let serialized = toml::to_string(&config).unwrap();
    assert!(!serialized.contains("hunter2"));
    assert!(serialized.contains("db.internal"));
}

#[test]
fn config_env_overrides_layer_on_file() {
    let mut config = load_fixture("tests/fixtures/configs/partial.toml");
    config
        .apply_env_overrides(|key| match key {
            "RECBRIDGE_REMOTE_USER" => Some("ops".to_string()),
            "RECBRIDGE_REMOTE_PASSWORD" => Some("pw".to_string()),
            "RECBRIDGE_REMOTE_PORT" => Some("1600".to_string()),
            _ => None,
        })
        .unwrap();
    let endpoint = config.remote.endpoint().unwrap();
    assert_eq!(endpoint.host, "db.internal");
    assert_eq!(endpoint.user, "ops");
    assert_eq!(endpoint.port, 1600);
}

#[test]
fn config_rejects_unknown_output_format() {
    let err = Config::from_toml("[output]\nformat = \"yaml\"\n").unwrap_err();
    assert_eq!(err.code(), "config_error");
}
