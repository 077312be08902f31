//! Well-known filesystem locations.
//!
//! ```text
//! ~/.config/biography/
//! └── config.toml
//! ```

use biography_core::{BiographyError, Result};
use std::path::PathBuf;

pub struct BiographyPaths;

impl BiographyPaths {
    const APP_DIR: &'static str = "biography";

    /// Platform config directory for the service (XDG on Linux).
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(Self::APP_DIR))
            .ok_or_else(|| BiographyError::config("Cannot determine config directory"))
    }

    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }
}
