//! Configuration management.

mod settings;
mod xdg;

pub use settings::{Settings, SettingsError, DEFAULT_ENDPOINT, DEFAULT_PROTOCOL};
pub use xdg::XdgDirs;
