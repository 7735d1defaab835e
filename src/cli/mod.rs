//! CLI commands
//!
//! Command implementations for the `git-staging` binary.

mod auth;
mod group;
mod progress;
pub mod style;

pub use auth::{run_auth_setup, run_auth_test};
pub use group::run_group;

use git_staging::config::Config;
use git_staging::error::Result;
use git_staging::types::{Platform, PlatformConfig};
use std::path::PathBuf;

/// Options shared by every subcommand
pub struct GlobalOptions {
    /// `--platform`
    pub platform: Option<Platform>,
    /// `--host`
    pub host: Option<String>,
    /// `--config`
    pub config: Option<PathBuf>,
}

impl GlobalOptions {
    /// Load the configuration file and decide which forge to use
    pub fn resolve(&self) -> Result<(Config, PlatformConfig)> {
        let config = Config::load(self.config.as_deref())?;
        let platform = config.resolve_platform(self.platform, self.host.as_deref())?;
        Ok((config, platform))
    }
}
