//! Harness configuration file (`isobench.toml`, or any `.json` file).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "isobench.toml";
pub const DEFAULT_OUTPUT_LIMIT_BYTES: usize = 1_000_000;

/// Harness configuration.
///
/// Relative paths (`bootstrap`, `template`, `script_dir`) are resolved against
/// the directory containing the config file. Missing fields take defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HarnessConfig {
    /// File the generated script includes before loading the unit.
    pub bootstrap: Option<String>,

    /// Executable that runs generated scripts.
    pub runtime: String,

    /// Custom script template. The builtin template is used when unset.
    pub template: Option<String>,

    /// Directory for temporary scripts. The OS temp directory when unset.
    pub script_dir: Option<String>,

    /// Suffix given to temporary script files.
    pub script_suffix: String,

    /// Kill the subject process after this many seconds. Unbounded when unset.
    pub timeout_secs: Option<u64>,

    /// Keep at most this many bytes of each of stdout and stderr.
    pub output_limit_bytes: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            bootstrap: None,
            runtime: "php".to_string(),
            template: None,
            script_dir: None,
            script_suffix: ".php".to_string(),
            timeout_secs: None,
            output_limit_bytes: DEFAULT_OUTPUT_LIMIT_BYTES,
        }
    }
}

impl HarnessConfig {
    pub fn validate(&self) -> Result<()> {
        if self.runtime.trim().is_empty() {
            return Err(anyhow!("runtime must be a non-empty executable name"));
        }
        if self.timeout_secs == Some(0) {
            return Err(anyhow!("timeout_secs must be > 0 when set"));
        }
        if self.output_limit_bytes == 0 {
            return Err(anyhow!("output_limit_bytes must be > 0"));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Load config from a TOML or JSON file, chosen by extension.
///
/// If the file is missing, returns `HarnessConfig::default()`.
pub fn load_config(path: &Path) -> Result<HarnessConfig> {
    if !path.exists() {
        let cfg = HarnessConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: HarnessConfig = if is_json(path) {
        serde_json::from_str(&contents).with_context(|| format!("parse {}", path.display()))?
    } else {
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?
    };
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

/// Make a config path absolute so relative settings resolve the same way
/// regardless of later working-directory changes.
pub fn absolute_config_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("read current directory")?;
    Ok(cwd.join(path))
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
