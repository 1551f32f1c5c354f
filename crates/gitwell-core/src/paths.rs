//! Standard paths used by GitWell

use std::path::PathBuf;

/// Standard GitWell paths
pub struct Paths {
    /// Data directory (~/.local/share/gitwell), where exported snapshots live
    pub data: PathBuf,
    /// Config directory (~/.config/gitwell)
    pub config: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    pub fn new() -> Self {
        let data = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("gitwell");

        let config = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("gitwell");

        Self { data, config }
    }

    /// Main configuration file
    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.json")
    }

    /// Root directory for snapshots exported by platform fetchers
    pub fn snapshots(&self) -> PathBuf {
        self.data.join("snapshots")
    }
}
