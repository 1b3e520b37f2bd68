//! XDG Base Directory support.

use std::path::{Path, PathBuf};

const APP_DIR: &str = "querywiz";
const SETTINGS_FILE: &str = "settings.json";
const HISTORY_FILE: &str = "history.txt";

/// XDG directory paths for querywiz.
#[derive(Debug, Clone)]
pub struct XdgDirs {
    /// Config directory (~/.config/querywiz or XDG_CONFIG_HOME/querywiz)
    pub config: PathBuf,
    /// State directory (~/.local/state/querywiz or XDG_STATE_HOME/querywiz)
    pub state: PathBuf,
}

impl XdgDirs {
    /// Get XDG directories, respecting environment variables.
    pub fn new() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::resolve(&home, |key| std::env::var(key).ok())
    }

    /// Resolve against `home` with `lookup` standing in for the environment.
    pub fn resolve(home: &Path, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base = |var: &str, fallback: &str| {
            lookup(var)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| home.join(fallback))
                .join(APP_DIR)
        };

        Self {
            config: base("XDG_CONFIG_HOME", ".config"),
            state: base("XDG_STATE_HOME", ".local/state"),
        }
    }

    /// Ensure all directories exist.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        for dir in [&self.config, &self.state] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Path of `settings.json`.
    pub fn settings_path(&self) -> PathBuf {
        self.config.join(SETTINGS_FILE)
    }

    /// Path of the prompt history file.
    pub fn history_path(&self) -> PathBuf {
        self.state.join(HISTORY_FILE)
    }
}

impl Default for XdgDirs {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for XDG directory support.
    //!
    //! Coverage:
    //! - Default directory paths
    //! - Environment variable overrides
    //! - Directory creation

    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    // =========================================================================
    // Test Helpers
    // =========================================================================

    fn resolve_with(home: &str, vars: &[(&str, &str)]) -> XdgDirs {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        XdgDirs::resolve(Path::new(home), |key| vars.get(key).cloned())
    }

    // =========================================================================
    // Default Path Tests
    // =========================================================================

    #[test]
    fn test_xdg_dirs_ends_with_querywiz() {
        let dirs = XdgDirs::new();
        assert!(dirs.config.ends_with("querywiz"), "{:?}", dirs.config);
        assert!(dirs.state.ends_with("querywiz"), "{:?}", dirs.state);
    }

    #[test]
    fn test_default_paths_under_home() {
        let dirs = resolve_with("/home/ada", &[]);
        assert_eq!(dirs.config, PathBuf::from("/home/ada/.config/querywiz"));
        assert_eq!(dirs.state, PathBuf::from("/home/ada/.local/state/querywiz"));
    }

    #[test]
    fn test_file_paths() {
        let dirs = resolve_with("/home/ada", &[]);
        assert_eq!(
            dirs.settings_path(),
            PathBuf::from("/home/ada/.config/querywiz/settings.json")
        );
        assert_eq!(
            dirs.history_path(),
            PathBuf::from("/home/ada/.local/state/querywiz/history.txt")
        );
    }

    // =========================================================================
    // Override Tests
    // =========================================================================

    #[test]
    fn test_xdg_config_home_override() {
        let dirs = resolve_with("/home/ada", &[("XDG_CONFIG_HOME", "/custom/config")]);
        assert_eq!(dirs.config, PathBuf::from("/custom/config/querywiz"));
        assert_eq!(dirs.state, PathBuf::from("/home/ada/.local/state/querywiz"));
    }

    #[test]
    fn test_xdg_state_home_override() {
        let dirs = resolve_with("/home/ada", &[("XDG_STATE_HOME", "/custom/state")]);
        assert_eq!(dirs.state, PathBuf::from("/custom/state/querywiz"));
    }

    #[test]
    fn test_empty_override_is_ignored() {
        let dirs = resolve_with("/home/ada", &[("XDG_CONFIG_HOME", "")]);
        assert_eq!(dirs.config, PathBuf::from("/home/ada/.config/querywiz"));
    }

    #[test]
    fn test_xdg_vars_with_spaces_in_path() {
        let dirs = resolve_with("/home/ada", &[("XDG_CONFIG_HOME", "/path with spaces")]);
        assert_eq!(dirs.config, PathBuf::from("/path with spaces/querywiz"));
    }

    // =========================================================================
    // Directory Creation Tests
    // =========================================================================

    #[test]
    fn test_ensure_dirs_creates_all_directories() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().to_str().unwrap().to_string();
        let dirs = resolve_with(
            &root,
            &[
                ("XDG_CONFIG_HOME", &format!("{}/deep/config", root)),
                ("XDG_STATE_HOME", &format!("{}/deep/state", root)),
            ],
        );

        dirs.ensure_dirs().unwrap();
        assert!(dirs.config.is_dir());
        assert!(dirs.state.is_dir());

        // Idempotent.
        dirs.ensure_dirs().unwrap();
    }

    #[test]
    fn test_ensure_dirs_fails_when_path_is_file() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("not_a_dir");
        std::fs::write(&file_path, "x").unwrap();

        let dirs = resolve_with(
            temp.path().to_str().unwrap(),
            &[("XDG_CONFIG_HOME", file_path.to_str().unwrap())],
        );
        assert!(dirs.ensure_dirs().is_err());
    }
}
