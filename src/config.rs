use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub local: LocalConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    pub fn load(explicit_path: Option<&Path>, root: &Path) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("RECBRIDGE_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = explicit {
            if let Some(patch) = Self::load_patch(&path)? {
                config.merge_patch(patch);
            }
        } else {
            if let Some(global) = Self::load_global()? {
                config.merge_patch(global);
            }
            if let Some(project) = Self::load_project(root)? {
                config.merge_patch(project);
            }
        }

        config.apply_env_overrides(|key| std::env::var(key).ok())?;

        Ok(config)
    }

    /// Parse a config file body. Missing sections and keys keep their defaults.
    pub fn from_toml(raw: &str) -> Result<Self> {
        let patch: ConfigPatch =
            toml::from_str(raw).map_err(|err| Error::Config(format!("parse config: {err}")))?;
        let mut config = Self::default();
        config.merge_patch(patch);
        Ok(config)
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        let Some(dir) = dirs::config_dir() else {
            return Ok(None);
        };
        Self::load_patch(&dir.join("recbridge/config.toml"))
    }

    fn load_project(root: &Path) -> Result<Option<ConfigPatch>> {
        Self::load_patch(&root.join("config.toml"))
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| Error::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| Error::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.local {
            self.local.merge(patch);
        }
        if let Some(patch) = patch.remote {
            self.remote.merge(patch);
        }
        if let Some(patch) = patch.output {
            self.output.merge(patch);
        }
    }

    /// Apply `RECBRIDGE_*` overrides read through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("RECBRIDGE_LOCAL_PATH") {
            self.local.path = Some(PathBuf::from(value));
        }

        if let Some(value) = lookup("RECBRIDGE_REMOTE_HOST") {
            self.remote.host = Some(value);
        }
        if let Some(value) = lookup("RECBRIDGE_REMOTE_PORT") {
            self.remote.port = value.parse::<u16>().map_err(|err| {
                Error::Config(format!("invalid RECBRIDGE_REMOTE_PORT value {value}: {err}"))
            })?;
        }
        if let Some(value) = lookup("RECBRIDGE_REMOTE_SERVICE") {
            self.remote.service = value;
        }
        if let Some(value) = lookup("RECBRIDGE_REMOTE_USER") {
            self.remote.user = Some(value);
        }
        if let Some(value) = lookup("RECBRIDGE_REMOTE_PASSWORD") {
            self.remote.password = Some(value);
        }
        if let Some(value) = lookup("RECBRIDGE_REMOTE_TABLE") {
            self.remote.table = value;
        }

        if let Some(value) = lookup("RECBRIDGE_OUTPUT_FORMAT") {
            self.output.format = parse_output_format(&value)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalConfig {
    /// Store file; `<root>/record.db` when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl LocalConfig {
    fn merge(&mut self, patch: LocalPatch) {
        if let Some(value) = patch.path {
            self.path = Some(value);
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub host: Option<String>,
    pub port: u16,
    pub service: String,
    pub user: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub table: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: 1521,
            service: "ORCL".to_string(),
            user: None,
            password: None,
            table: "LDCLJ_TIAOMA".to_string(),
        }
    }
}

impl fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("service", &self.service)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("table", &self.table)
            .finish()
    }
}

/// Borrowed, validated view of [`RemoteConfig`] used to connect.
#[derive(Clone, Copy)]
pub struct RemoteEndpoint<'a> {
    pub host: &'a str,
    pub port: u16,
    pub service: &'a str,
    pub user: &'a str,
    pub password: &'a str,
}

impl RemoteConfig {
    /// Validate and borrow the connection parameters.
    pub fn endpoint(&self) -> Result<RemoteEndpoint<'_>> {
        let host = required(self.host.as_deref(), "remote.host")?;
        let user = required(self.user.as_deref(), "remote.user")?;
        let password = required(self.password.as_deref(), "remote.password")?;
        let service = required(Some(self.service.as_str()), "remote.service")?;
        if !is_table_name(&self.table) {
            return Err(Error::Config(format!(
                "remote.table {:?} is not a valid table name",
                self.table
            )));
        }
        Ok(RemoteEndpoint {
            host,
            port: self.port,
            service,
            user,
            password,
        })
    }

    fn merge(&mut self, patch: RemotePatch) {
        if let Some(value) = patch.host {
            self.host = Some(value);
        }
        if let Some(value) = patch.port {
            self.port = value;
        }
        if let Some(value) = patch.service {
            self.service = value;
        }
        if let Some(value) = patch.user {
            self.user = Some(value);
        }
        if let Some(value) = patch.password {
            self.password = Some(value);
        }
        if let Some(value) = patch.table {
            self.table = value;
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

impl OutputConfig {
    fn merge(&mut self, patch: OutputPatch) {
        if let Some(value) = patch.format {
            self.format = value;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigPatch {
    pub local: Option<LocalPatch>,
    pub remote: Option<RemotePatch>,
    pub output: Option<OutputPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct LocalPatch {
    pub path: Option<PathBuf>,
}

#[derive(Clone, Default, Deserialize)]
struct RemotePatch {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub service: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub table: Option<String>,
}

impl fmt::Debug for RemotePatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemotePatch")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("service", &self.service)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("table", &self.table)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct OutputPatch {
    pub format: Option<OutputFormat>,
}

fn required<'a>(value: Option<&'a str>, key: &str) -> Result<&'a str> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| Error::Config(format!("{key} is not set")))
}

/// Plain or schema-qualified Oracle identifier. The table name is spliced
/// into SQL text, so nothing else is accepted.
fn is_table_name(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|part| {
            let mut chars = part.chars();
            chars.next().is_some_and(|c| c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '#'))
        })
}

fn parse_output_format(value: &str) -> Result<OutputFormat> {
    match value.to_lowercase().as_str() {
        "table" => Ok(OutputFormat::Table),
        "json" => Ok(OutputFormat::Json),
        _ => Err(Error::Config(format!(
            "invalid output format {value} (expected table|json)"
        ))),
    }
}
