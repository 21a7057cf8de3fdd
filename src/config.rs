//! Run configuration.
//!
//! Every option has a built-in default, can be set in an optional TOML file
//! passed with `--config`, and can be overridden on the command line:
//!
//! ```text
//! command-line flag  >  config file  >  built-in default
//! ```
//!
//! ## Config file
//!
//! ```toml
//! # All keys are optional - defaults shown below
//!
//! dest_dir = "~/Dropbox/five-star-pics"                 # export root
//! catalog = "~/.local/share/shotwell/data/photo.db"    # Shotwell database
//! max_pix_count = 1900000                              # pixel budget per image
//! pics_per_subdir = 1024                               # photos per subdirNN/
//! jpeg_quality = 90                                    # re-encode quality (1-100)
//! ```
//!
//! A leading `~/` in a path is expanded to the home directory. Unknown keys
//! are rejected to catch typos early. `--clear-all` and `--resize-skip` are
//! per-run decisions and only exist as flags.
//!
//! The resolved values are frozen into a [`RunConfig`] once at startup and
//! passed explicitly to everything that needs them.

use crate::imaging::Quality;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default pixel budget: roughly a 1700x1100 image.
pub const DEFAULT_MAX_PIXELS: u64 = 1_900_000;

/// Default number of photos per `subdirNN` bucket.
pub const DEFAULT_PICS_PER_SUBDIR: usize = 1024;

const DEST_DIR_UNDER_HOME: &str = "Dropbox/five-star-pics";
const CATALOG_UNDER_HOME: &str = ".local/share/shotwell/data/photo.db";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("cannot determine home directory; pass --{0} explicitly")]
    NoHomeDir(&'static str),
}

/// Contents of an optional `--config` TOML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub dest_dir: Option<PathBuf>,
    pub catalog: Option<PathBuf>,
    pub max_pix_count: Option<u64>,
    pub pics_per_subdir: Option<usize>,
    pub jpeg_quality: Option<Quality>,
}

impl FileConfig {
    /// Parse a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }
}

/// Values given on the command line. `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct CliOptions {
    pub clear_all: bool,
    pub resize_skip: bool,
    pub dest_dir: Option<PathBuf>,
    pub catalog: Option<PathBuf>,
    pub max_pix_count: Option<u64>,
    pub pics_per_subdir: Option<usize>,
    pub jpeg_quality: Option<u8>,
}

/// Immutable, fully resolved options for one export run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Wipe the destination root before exporting.
    pub clear_all: bool,
    /// Never decode or resize; copies only.
    pub resize_skip: bool,
    /// Images with more pixels than this are downscaled in place.
    pub max_pixels: u64,
    /// Photos per `subdirNN` directory.
    pub pics_per_subdir: usize,
    pub dest_root: PathBuf,
    pub catalog_path: PathBuf,
    pub jpeg_quality: Quality,
}

impl RunConfig {
    /// Layer CLI options over the config file over built-in defaults.
    ///
    /// `home` supplies the defaults for the destination root and catalog
    /// path and expands `~/` in configured paths.
    pub fn resolve(
        cli: CliOptions,
        file: FileConfig,
        home: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let dest_root = match cli.dest_dir.or(file.dest_dir) {
            Some(p) => expand_home(p, home),
            None => default_dest_root(home.ok_or(ConfigError::NoHomeDir("dest-dir"))?),
        };
        let catalog_path = match cli.catalog.or(file.catalog) {
            Some(p) => expand_home(p, home),
            None => default_catalog_path(home.ok_or(ConfigError::NoHomeDir("catalog"))?),
        };

        let config = Self {
            clear_all: cli.clear_all,
            resize_skip: cli.resize_skip,
            max_pixels: cli
                .max_pix_count
                .or(file.max_pix_count)
                .unwrap_or(DEFAULT_MAX_PIXELS),
            pics_per_subdir: cli
                .pics_per_subdir
                .or(file.pics_per_subdir)
                .unwrap_or(DEFAULT_PICS_PER_SUBDIR),
            dest_root,
            catalog_path,
            jpeg_quality: cli
                .jpeg_quality
                .map(Quality::new)
                .or(file.jpeg_quality)
                .unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pics_per_subdir == 0 {
            return Err(ConfigError::Validation(
                "pics_per_subdir must be at least 1".into(),
            ));
        }
        if self.max_pixels == 0 {
            return Err(ConfigError::Validation(
                "max_pix_count must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// `$HOME/Dropbox/five-star-pics`.
pub fn default_dest_root(home: &Path) -> PathBuf {
    home.join(DEST_DIR_UNDER_HOME)
}

/// `$HOME/.local/share/shotwell/data/photo.db`.
pub fn default_catalog_path(home: &Path) -> PathBuf {
    home.join(CATALOG_UNDER_HOME)
}

fn expand_home(path: PathBuf, home: Option<&Path>) -> PathBuf {
    match (path.strip_prefix("~"), home) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path,
    }
}
