pub mod config;

pub use config::ConfigStorage;

use std::path::PathBuf;

pub fn get_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("rpcprobe"))
}
