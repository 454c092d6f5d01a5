//! Helpers shared by the binary-level test suites.

use std::path::Path;

use assert_cmd::Command;

const OVERRIDES: [&str; 8] = [
    "RECBRIDGE_LOCAL_PATH",
    "RECBRIDGE_REMOTE_HOST",
    "RECBRIDGE_REMOTE_PORT",
    "RECBRIDGE_REMOTE_SERVICE",
    "RECBRIDGE_REMOTE_USER",
    "RECBRIDGE_REMOTE_PASSWORD",
    "RECBRIDGE_REMOTE_TABLE",
    "RECBRIDGE_OUTPUT_FORMAT",
];

/// `recbridge` rooted at `root`, isolated from the caller's config and
/// environment overrides.
pub fn recbridge(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("recbridge").unwrap();
    cmd.env("RECBRIDGE_ROOT", root)
        .env("RECBRIDGE_CONFIG", root.join("config.toml"))
        .env("RUST_LOG", "off");
    for key in OVERRIDES {
        cmd.env_remove(key);
    }
    cmd
}
