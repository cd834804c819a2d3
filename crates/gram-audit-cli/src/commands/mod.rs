//! Command implementations

mod check;
mod stubs;

pub use check::{CheckOptions, run_check};
pub use stubs::run_stubs;

use std::path::Path;

use gram_audit_core::AuditConfig;

use crate::cli::InputArgs;
use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "audit.toml";

/// Resolve the effective configuration for a command
///
/// An explicitly passed config file must exist; the default `audit.toml`
/// is only loaded when present. Path flags override the config afterwards.
pub(crate) fn resolve_config(inputs: &InputArgs) -> Result<AuditConfig> {
    let mut config = match &inputs.config {
        Some(path) => AuditConfig::load(path)?,
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_PATH);
            if default_path.is_file() {
                AuditConfig::load(default_path)?
            } else {
                AuditConfig::default()
            }
        }
    };

    if let Some(dir) = &inputs.grammar_dir {
        config.grammar_dir = dir.clone();
    }
    if let Some(file) = &inputs.registry {
        config.registry_file = file.clone();
    }
    if let Some(dir) = &inputs.impl_dir {
        config.impl_dir = dir.clone();
    }

    Ok(config)
}
