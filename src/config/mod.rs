//! Process-level configuration.
//!
//! [`Config`] is built once in `main` from the environment, the optional
//! settings file and the global flags, then passed to every command.  Nothing
//! below this layer reads environment variables.
pub mod toml_loader;

use anyhow::{Context as _, Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::paths::HomeDir;
use crate::store::collection::StoreCollection;

/// Application directory name under the XDG base directories.
pub const APP_DIR: &str = "sto";

/// File in the state directory holding the active root.
pub const CURRENT_PROFILE_FILE: &str = "current-profile";

/// File in the state directory holding the profile registry.
pub const REGISTRY_FILE: &str = "profiles.json";

/// Keys accepted in `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Root used when no profile is active.
    pub root: Option<PathBuf>,
    /// Override for the state directory.
    pub state_dir: Option<PathBuf>,
}

/// Environment values that feed [`Config`].
#[derive(Debug, Clone, Default)]
pub struct Env {
    /// `HOME`.
    pub home: Option<PathBuf>,
    /// `XDG_CONFIG_HOME`.
    pub config_home: Option<PathBuf>,
    /// `XDG_DATA_HOME`.
    pub data_home: Option<PathBuf>,
    /// `XDG_CACHE_HOME`.
    pub cache_home: Option<PathBuf>,
}

impl Env {
    /// Snapshot the relevant variables of the current process.
    #[must_use]
    pub fn from_process() -> Self {
        let var = |key: &str| {
            std::env::var_os(key)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        };
        Self {
            home: var("HOME"),
            config_home: var("XDG_CONFIG_HOME"),
            data_home: var("XDG_DATA_HOME"),
            cache_home: var("XDG_CACHE_HOME"),
        }
    }
}

/// Resolved configuration for one invocation.
#[derive(Debug, Clone)]
pub struct Config {
    /// The user's home directory.
    pub home: HomeDir,
    /// Settings file that was consulted (it may not exist).
    pub settings_path: PathBuf,
    /// Directory holding the current-profile pointer and the registry.
    pub state_dir: PathBuf,
    /// `root` from the settings file.
    pub default_root: Option<PathBuf>,
    /// `--root` from the command line.
    pub root_override: Option<PathBuf>,
}

impl Config {
    /// Build the configuration from `env`, an optional `--config` path and an
    /// optional `--root` override.
    ///
    /// # Errors
    ///
    /// Returns an error if `HOME` is unset or the settings file is invalid.
    pub fn load(env: &Env, config: Option<&Path>, root: Option<&Path>) -> Result<Self> {
        let home = env
            .home
            .clone()
            .map(HomeDir::new)
            .ok_or(crate::error::StoreError::HomeDirUnavailable)?;

        let settings_path = config.map_or_else(
            || {
                env.config_home
                    .clone()
                    .unwrap_or_else(|| home.path().join(".config"))
                    .join(APP_DIR)
                    .join("config.toml")
            },
            |p| home.expand(p),
        );
        let settings: Settings = toml_loader::load_config(&settings_path)?;

        let state_dir = settings.state_dir.map_or_else(
            || {
                env.data_home
                    .clone()
                    .unwrap_or_else(|| home.path().join(".local").join("share"))
                    .join(APP_DIR)
            },
            |dir| home.expand(&dir),
        );

        let default_root = settings.root.map(|r| home.expand(&r));
        let root_override = root.map(|r| home.expand(r));

        tracing::debug!(
            "settings {}, state dir {}",
            settings_path.display(),
            state_dir.display()
        );
        Ok(Self {
            home,
            settings_path,
            state_dir,
            default_root,
            root_override,
        })
    }

    /// Path of the current-profile pointer.
    #[must_use]
    pub fn current_profile_path(&self) -> PathBuf {
        self.state_dir.join(CURRENT_PROFILE_FILE)
    }

    /// Path of the profile registry.
    #[must_use]
    pub fn registry_path(&self) -> PathBuf {
        self.state_dir.join(REGISTRY_FILE)
    }

    /// The root to operate on: `--root`, then the current profile, then the
    /// settings file.
    ///
    /// # Errors
    ///
    /// Returns an error if none is set or the pointer file cannot be read.
    pub fn resolve_root(&self) -> Result<PathBuf> {
        if let Some(root) = &self.root_override {
            return absolutize(root);
        }

        let pointer = self.current_profile_path();
        match std::fs::read_to_string(&pointer) {
            Ok(content) if !content.trim().is_empty() => {
                return Ok(PathBuf::from(content.trim_end_matches(['\n', '\r'])));
            }
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", pointer.display()));
            }
        }

        if let Some(root) = &self.default_root {
            return absolutize(root);
        }
        bail!("No active profile set, use 'sto init' or 'sto switch <profile>'")
    }

    /// Make `root` the active root.
    ///
    /// # Errors
    ///
    /// Returns an error if the state directory or pointer cannot be written.
    pub fn set_current_root(&self, root: &Path) -> Result<()> {
        std::fs::create_dir_all(&self.state_dir)
            .with_context(|| format!("creating {}", self.state_dir.display()))?;
        let pointer = self.current_profile_path();
        std::fs::write(&pointer, root.as_os_str().as_encoded_bytes())
            .with_context(|| format!("writing {}", pointer.display()))
    }

    /// Load the profile registry.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry cannot be created or decoded.
    pub fn registry(&self) -> Result<StoreCollection> {
        let path = self.registry_path();
        StoreCollection::load(&path).with_context(|| format!("loading {}", path.display()))
    }
}

/// Turn a user-supplied path into an absolute one, resolving symlinks when
/// the path exists.
///
/// # Errors
///
/// Returns an error if the current directory cannot be determined.
pub fn absolutize(path: &Path) -> Result<PathBuf> {
    if let Ok(canonical) = dunce::canonicalize(path) {
        return Ok(canonical);
    }
    std::path::absolute(path).with_context(|| format!("resolving {}", path.display()))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn env(home: &Path) -> Env {
        Env {
            home: Some(home.to_path_buf()),
            ..Env::default()
        }
    }

    #[test]
    fn defaults_follow_home() {
        let home = tempfile::tempdir().unwrap();
        let config = Config::load(&env(home.path()), None, None).unwrap();
        assert_eq!(
            config.settings_path,
            home.path().join(".config/sto/config.toml")
        );
        assert_eq!(config.state_dir, home.path().join(".local/share/sto"));
        assert!(config.default_root.is_none());
    }

    #[test]
    fn xdg_directories_take_precedence() {
        let home = tempfile::tempdir().unwrap();
        let env = Env {
            config_home: Some(home.path().join("cfg")),
            data_home: Some(home.path().join("data")),
            ..env(home.path())
        };
        let config = Config::load(&env, None, None).unwrap();
        assert_eq!(config.settings_path, home.path().join("cfg/sto/config.toml"));
        assert_eq!(config.state_dir, home.path().join("data/sto"));
    }

    #[test]
    fn settings_file_supplies_root_and_state_dir() {
        let home = tempfile::tempdir().unwrap();
        let settings = home.path().join("sto.toml");
        std::fs::write(&settings, "root = \"~/dotfiles\"\nstate_dir = \"~/state\"\n").unwrap();

        let config = Config::load(&env(home.path()), Some(&settings), None).unwrap();

        assert_eq!(config.default_root, Some(home.path().join("dotfiles")));
        assert_eq!(config.state_dir, home.path().join("state"));
    }

    #[test]
    fn unknown_settings_key_is_rejected() {
        let home = tempfile::tempdir().unwrap();
        let settings = home.path().join("sto.toml");
        std::fs::write(&settings, "rooot = \"/x\"\n").unwrap();
        assert!(Config::load(&env(home.path()), Some(&settings), None).is_err());
    }

    #[test]
    fn missing_home_is_an_error() {
        let err = Config::load(&Env::default(), None, None).unwrap_err();
        assert!(err.to_string().contains("HOME"));
    }

    #[test]
    fn resolve_root_prefers_override_then_pointer_then_settings() {
        let home = tempfile::tempdir().unwrap();
        let settings = home.path().join("sto.toml");
        let from_settings = home.path().join("settings-root");
        std::fs::write(
            &settings,
            format!("root = \"{}\"\n", from_settings.display()),
        )
        .unwrap();

        let config = Config::load(&env(home.path()), Some(&settings), None).unwrap();
        assert_eq!(config.resolve_root().unwrap(), from_settings);

        let from_pointer = home.path().join("pointer-root");
        config.set_current_root(&from_pointer).unwrap();
        assert_eq!(config.resolve_root().unwrap(), from_pointer);

        let explicit = home.path().to_path_buf();
        let config = Config::load(&env(home.path()), Some(&settings), Some(&explicit)).unwrap();
        assert_eq!(
            config.resolve_root().unwrap(),
            dunce::canonicalize(&explicit).unwrap()
        );
    }

    #[test]
    fn resolve_root_without_any_source_fails() {
        let home = tempfile::tempdir().unwrap();
        let config = Config::load(&env(home.path()), None, None).unwrap();
        let err = config.resolve_root().unwrap_err();
        assert!(err.to_string().contains("No active profile"));
    }
}
