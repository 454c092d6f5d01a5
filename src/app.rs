use std::path::{Path, PathBuf};

use crate::config::{Config, OutputFormat};
use crate::error::{Error, Result};
use crate::remote::RemoteStore;
use crate::storage::local::DEFAULT_DB_NAME;

#[cfg(feature = "oracle")]
pub type RemoteBackend = crate::remote::oracle::OracleDriver;
#[cfg(not(feature = "oracle"))]
pub type RemoteBackend = crate::remote::driver::Unavailable;

pub struct AppContext {
    pub root: PathBuf,
    pub config: Config,
    pub output_format: OutputFormat,
}

impl AppContext {
    pub fn from_cli(cli: &crate::cli::Cli) -> Result<Self> {
        let root = Self::find_root()?;
        let config = Config::load(cli.config.as_deref(), &root)?;
        let output_format = if cli.robot {
            OutputFormat::Json
        } else {
            config.output.format
        };

        Ok(Self {
            root,
            config,
            output_format,
        })
    }

    /// Local store file: configured path, else `<root>/record.db`.
    #[must_use]
    pub fn local_path(&self) -> PathBuf {
        self.config
            .local
            .path
            .clone()
            .unwrap_or_else(|| self.root.join(DEFAULT_DB_NAME))
    }

    #[must_use]
    pub const fn robot(&self) -> bool {
        matches!(self.output_format, OutputFormat::Json)
    }

    /// Remote store bound to the configured endpoint.
    #[cfg(feature = "oracle")]
    pub fn remote_store(&self) -> Result<RemoteStore<RemoteBackend>> {
        Ok(RemoteStore::new(
            crate::remote::oracle::OracleDriver,
            self.config.remote.clone(),
        ))
    }

    #[cfg(not(feature = "oracle"))]
    pub fn remote_store(&self) -> Result<RemoteStore<RemoteBackend>> {
        Err(Error::Unsupported(
            "remote store access requires a build with the `oracle` feature".to_string(),
        ))
    }

    fn find_root() -> Result<PathBuf> {
        if let Ok(root) = std::env::var("RECBRIDGE_ROOT") {
            return Ok(PathBuf::from(root));
        }
        let cwd = std::env::current_dir()?;
        if let Some(found) = find_upwards(&cwd, ".recbridge") {
            return Ok(found);
        }

        let data_dir = dirs::data_dir()
            .ok_or_else(|| Error::Config("data directory not found".to_string()))?;
        Ok(data_dir.join("recbridge"))
    }
}

fn find_upwards(start: &Path, name: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_dir())
}
