//! Configuration resolution for dream-analysis
//!
//! One TOML file (`~/.config/dreamlens/dream-analysis.toml` unless `--config`
//! is given) carries the shared keys plus the policy sections:
//!
//! ```toml
//! root_folder = "/srv/dreamlens"
//! artifacts_dir = "/srv/dreamlens/models"
//!
//! [logging]
//! level = "info"
//!
//! [correction]
//! threat_weight = 0.85
//!
//! [evidence]
//! threshold = 0.3
//!
//! [notes]
//! facet_high = 0.6
//!
//! [calendar]
//! mixed_margin = 0.15
//! ```
//!
//! **Artifacts directory priority:** CLI → `DREAM_ARTIFACTS_DIR` → TOML → `<root>/ml_artifacts`

use crate::analyzer::AnalysisPolicy;
use crate::calendar::LabelThresholds;
use crate::correction::CorrectionPolicy;
use crate::error::AnalysisResult;
use crate::evidence::EvidencePolicy;
use crate::notes::NotesPolicy;
use dream_common::config::{
    default_artifacts_dir, default_config_path, load_toml_or_default, RootFolderResolver,
    TomlConfig,
};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Name used for the config file and log context
pub const MODULE_NAME: &str = "dream-analysis";

/// Artifacts folder override
pub const ENV_ARTIFACTS_DIR: &str = "DREAM_ARTIFACTS_DIR";

/// Full contents of `dream-analysis.toml`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnalysisToml {
    #[serde(flatten)]
    pub common: TomlConfig,
    pub correction: CorrectionPolicy,
    pub evidence: EvidencePolicy,
    pub notes: NotesPolicy,
    pub calendar: LabelThresholds,
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub root_folder: Option<PathBuf>,
    pub artifacts_dir: Option<PathBuf>,
}

/// Fully resolved runtime configuration
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub root_folder: PathBuf,
    pub artifacts_dir: PathBuf,
    pub log_level: String,
    pub policy: AnalysisPolicy,
    pub calendar: LabelThresholds,
}

impl AnalyzerConfig {
    /// Read the TOML file (if any) and apply CLI and environment overrides
    ///
    /// # Errors
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn resolve(overrides: &ConfigOverrides) -> AnalysisResult<Self> {
        let toml: AnalysisToml = match overrides
            .config_file
            .clone()
            .or_else(|| default_config_path(MODULE_NAME))
        {
            Some(path) => load_toml_or_default(&path)?,
            None => {
                warn!("No config directory on this platform, using compiled defaults");
                AnalysisToml::default()
            }
        };
        Ok(Self::from_toml(toml, overrides))
    }

    /// Apply overrides to an already parsed TOML document
    pub fn from_toml(toml: AnalysisToml, overrides: &ConfigOverrides) -> Self {
        let root_folder = RootFolderResolver::new(MODULE_NAME)
            .with_cli_arg(overrides.root_folder.clone())
            .with_toml(&toml.common)
            .resolve();

        let artifacts_dir = resolve_artifacts_dir(
            overrides.artifacts_dir.clone(),
            toml.common.artifacts_dir.clone(),
            &root_folder,
        );

        Self {
            root_folder,
            artifacts_dir,
            log_level: toml.common.logging.level,
            policy: AnalysisPolicy {
                correction: toml.correction,
                evidence: toml.evidence,
                notes: toml.notes,
            },
            calendar: toml.calendar,
        }
    }
}

fn resolve_artifacts_dir(
    cli: Option<PathBuf>,
    toml: Option<PathBuf>,
    root_folder: &std::path::Path,
) -> PathBuf {
    if let Some(path) = cli {
        debug!("Artifacts directory from command line");
        return path;
    }
    if let Some(path) = std::env::var_os(ENV_ARTIFACTS_DIR).filter(|v| !v.is_empty()) {
        debug!("Artifacts directory from {}", ENV_ARTIFACTS_DIR);
        return PathBuf::from(path);
    }
    if let Some(path) = toml {
        debug!("Artifacts directory from TOML config");
        return path;
    }
    default_artifacts_dir(root_folder)
}
