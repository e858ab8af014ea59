//! Configuration loading and root folder resolution
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. `DREAM_ROOT_FOLDER` environment variable
//! 3. `DREAM_ROOT` environment variable
//! 4. TOML config file (`root_folder`)
//! 5. OS-dependent compiled default (fallback)
//!
//! A missing TOML file is never fatal: a warning is logged and compiled
//! defaults are used. A TOML file that exists but cannot be parsed is an error.

use crate::Result;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Application directory name under the platform config/data folders
pub const APP_DIR: &str = "dreamlens";

/// Primary root folder override
pub const ENV_ROOT_FOLDER: &str = "DREAM_ROOT_FOLDER";

/// Secondary root folder override (lower priority than `DREAM_ROOT_FOLDER`)
pub const ENV_ROOT: &str = "DREAM_ROOT";

/// Folder under the root holding model artifacts
pub const ARTIFACTS_SUBDIR: &str = "ml_artifacts";

/// `[logging]` section of the TOML file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// tracing filter directive ("info", "debug", "dream_analysis=trace", ...)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: CompiledDefaults::for_current_platform().log_level,
        }
    }
}

/// Top-level keys shared by every binary's TOML file
///
/// Binaries that need extra sections deserialize their own struct from the
/// same file; unknown keys are ignored here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Root folder override
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// Model artifacts folder override
    #[serde(default)]
    pub artifacts_dir: Option<PathBuf>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Compiled-in defaults used when nothing else is configured
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub log_level: String,
}

impl CompiledDefaults {
    /// Defaults for the platform this binary was built for
    pub fn for_current_platform() -> Self {
        Self {
            root_folder: default_root_folder(),
            log_level: "info".to_string(),
        }
    }
}

/// OS-dependent default root folder
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/dreamlens (or /var/lib/dreamlens without a home)
        dirs::data_local_dir()
            .map(|d| d.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from("/var/lib").join(APP_DIR))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/dreamlens
        dirs::data_dir()
            .map(|d| d.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support").join(APP_DIR))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\dreamlens
        dirs::data_local_dir()
            .map(|d| d.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData").join(APP_DIR))
    } else {
        PathBuf::from("./dreamlens_data")
    }
}

/// Default TOML path for a module: `<config_dir>/dreamlens/<module>.toml`
pub fn default_config_path(module_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join(format!("{}.toml", module_name)))
}

/// Load a TOML file into `T`, falling back to `T::default()` if the file is absent
///
/// # Errors
/// Returns `Error::Io` if the file exists but cannot be read, and
/// `Error::Toml` if its contents do not parse into `T`.
pub fn load_toml_or_default<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        warn!(
            "Config file not found at {}, using compiled defaults",
            path.display()
        );
        return Ok(T::default());
    }

    let content = std::fs::read_to_string(path)?;
    let parsed = toml::from_str(&content)?;
    debug!("Loaded config from {}", path.display());
    Ok(parsed)
}

/// Resolves the root folder following the documented priority order
#[derive(Debug, Clone)]
pub struct RootFolderResolver {
    module_name: String,
    cli_arg: Option<PathBuf>,
    toml_root: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            cli_arg: None,
            toml_root: None,
        }
    }

    /// Command-line override (priority 1)
    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    /// TOML-provided root folder (priority 4)
    pub fn with_toml(mut self, config: &TomlConfig) -> Self {
        self.toml_root = config.root_folder.clone();
        self
    }

    /// Resolve the root folder; never fails, the compiled default is the last resort
    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            debug!("[{}] root folder from command line", self.module_name);
            return path.clone();
        }

        for var in [ENV_ROOT_FOLDER, ENV_ROOT] {
            if let Some(path) = std::env::var_os(var).filter(|v| !v.is_empty()) {
                debug!("[{}] root folder from {}", self.module_name, var);
                return PathBuf::from(path);
            }
        }

        if let Some(path) = &self.toml_root {
            debug!("[{}] root folder from TOML config", self.module_name);
            return path.clone();
        }

        CompiledDefaults::for_current_platform().root_folder
    }
}

/// Default artifacts location: `<root>/ml_artifacts`
pub fn default_artifacts_dir(root: &Path) -> PathBuf {
    root.join(ARTIFACTS_SUBDIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_path_uses_module_name() {
        if let Some(path) = default_config_path("dream-analysis") {
            assert!(path.ends_with("dreamlens/dream-analysis.toml"));
        }
    }

    #[test]
    fn test_logging_default_is_info() {
        assert_eq!(LoggingConfig::default().level, "info");
    }

    #[test]
    fn test_artifacts_path_is_under_root() {
        assert_eq!(
            default_artifacts_dir(Path::new("/tmp/dream-root")),
            PathBuf::from("/tmp/dream-root/ml_artifacts")
        );
    }
}
