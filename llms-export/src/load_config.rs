//! `load_config` module: loads the YAML site configuration used by the CLI and server.
//!
//! # Responsibilities
//! - Parse the user-supplied YAML file into [`CliConfig`]
//! - Resolve relative paths (content directory, OpenAPI documents) against
//!   the directory containing the config file
//! - Apply environment overrides (`LLMS_EXPORT_BIND`, `LLMS_EXPORT_BRANCH`)
//!
//! # Errors
//! All errors use `anyhow::Error` and are surfaced at the CLI boundary.

use anyhow::{Context, Result};
use llms_export_core::config::SiteConfig;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

pub const BIND_ENV: &str = "LLMS_EXPORT_BIND";
pub const BRANCH_ENV: &str = "LLMS_EXPORT_BRANCH";

#[derive(Debug, Deserialize)]
pub struct CliConfig {
    #[serde(flatten)]
    pub site: SiteConfig,
    #[serde(default)]
    pub server: ServerSection,
}

#[derive(Debug, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

/// Loads a YAML config file and applies environment overrides.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = fs::read_to_string(path_ref)
        .inspect_err(|e| error!(error = ?e, config_path = ?path_ref, "Failed to read config file"))
        .with_context(|| format!("Failed to read config file {}", path_ref.display()))?;

    let mut config: CliConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    let base = path_ref.parent().unwrap_or(Path::new("."));
    config.site.content_dir = resolve(base, &config.site.content_dir);
    for document in &mut config.site.openapi {
        document.path = resolve(base, &document.path);
    }

    if let Ok(bind) = std::env::var(BIND_ENV) {
        info!(bind = %bind, "Server address overridden from environment");
        config.server.bind = bind;
    }
    if let Ok(branch) = std::env::var(BRANCH_ENV) {
        info!(branch = %branch, "Source branch overridden from environment");
        config.site.git.branch = branch;
    }

    config.site.trace_loaded();
    Ok(config)
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
