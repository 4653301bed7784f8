//! User configuration and its resolution into deployable mappings.
//!
//! - [`toml_loader`] reads and deserializes the TOML file
//! - [`dotfiles`] holds the `[dotfiles]` section and its merge rules
//! - [`environment`] resolves home and repository paths into engine mappings
pub mod dotfiles;
pub mod environment;
pub mod toml_loader;

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub use dotfiles::{DirectoryMap, DotfilesConfig};
pub use environment::Environment;

/// File name of the user configuration inside the home directory.
pub const CONFIG_FILE_NAME: &str = ".dotdeploy.toml";

/// Root of the TOML file. Unknown sections are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    dotfiles: dotfiles::DotfilesSection,
}

/// All loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Config {
    /// Effective `[dotfiles]` settings.
    pub dotfiles: DotfilesConfig,
}

impl Config {
    /// Load the configuration at `path`, merged over the defaults.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml_loader::load_config(path)?;
        Ok(Self {
            dotfiles: DotfilesConfig::merged(file.dotfiles),
        })
    }

    /// Default location of the configuration file for `home`.
    #[must_use]
    pub fn default_path(home: &Path) -> PathBuf {
        home.join(CONFIG_FILE_NAME)
    }
}
