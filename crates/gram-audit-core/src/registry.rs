//! Binding extraction from registry and implementation sources
//!
//! The registry binds grammar rules to handling strategies through four
//! textual idioms:
//!
//! ```text
//! REGISTER_TRANSFORM(TransformCopyStatement);              // macro registration
//! Register("CopyTable", &TransformQualifiedName);          // direct registration
//! RegisterEnum<OnConflictAction>("OnConflictAction", ...); // enum registration
//! PEGTransformerFactory::TransformCopyStatement(...)       // implementation
//! ```
//!
//! Each idiom is matched independently; a rule name may appear in several
//! sets at once, and the reconciler is exactly the component that inspects
//! such overlaps.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Matches `REGISTER_TRANSFORM(TransformRuleName)`
static MACRO_REGISTER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"REGISTER_TRANSFORM\s*\(\s*Transform(\w+)\s*\)")
        .expect("Invalid macro registration regex")
});

/// Matches `Register("RuleName", &TransformFuncName)`, where the function
/// name may differ from the rule name
static DIRECT_REGISTER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"Register\s*\(\s*"(\w+)"\s*,\s*&Transform(\w+)\s*\)"#)
        .expect("Invalid direct registration regex")
});

/// Matches `RegisterEnum<Type>("RuleName", ...)`
static ENUM_REGISTER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"RegisterEnum<[^>]+>\s*\(\s*"(\w+)"\s*,"#)
        .expect("Invalid enum registration regex")
});

/// Matches `PEGTransformerFactory::TransformRuleName(` in implementation
/// files (the concrete function bodies, not the registration calls)
static IMPL_DEF_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"PEGTransformerFactory::Transform(\w+)\s*\(")
        .expect("Invalid implementation definition regex")
});

/// Name sets extracted from the registry source
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryBindings {
    /// Rule names bound via `RegisterEnum`
    pub enum_rules: BTreeSet<String>,
    /// Rule names registered via macro or direct registration
    pub registered_rules: BTreeSet<String>,
    /// Subset of `registered_rules` bound via direct `Register(...)` calls
    pub direct_registered_rules: BTreeSet<String>,
    /// Function names used as direct registration targets; one function may
    /// serve many rule names, so these are exempt from orphan detection
    pub direct_registered_functions: BTreeSet<String>,
}

impl RegistryBindings {
    /// Whether no idiom matched at all
    pub fn is_empty(&self) -> bool {
        self.enum_rules.is_empty() && self.registered_rules.is_empty()
    }
}

/// Implementation functions found in the transformer sources
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Implementations {
    /// Rule-shaped names with a `Transform<Name>` function body
    pub names: BTreeSet<String>,
    /// File that defines each function, for orphan diagnostics
    pub files: BTreeMap<String, String>,
    /// Non-fatal problems encountered while scanning
    pub warnings: Vec<String>,
}

/// Extract the four binding sets from registry source text
pub fn extract_bindings(content: &str) -> RegistryBindings {
    let mut bindings = RegistryBindings::default();

    for caps in MACRO_REGISTER_REGEX.captures_iter(content) {
        bindings.registered_rules.insert(caps[1].to_string());
    }

    for caps in DIRECT_REGISTER_REGEX.captures_iter(content) {
        let rule_name = caps[1].to_string();
        let func_name = caps[2].to_string();
        bindings.registered_rules.insert(rule_name.clone());
        bindings.direct_registered_rules.insert(rule_name);
        bindings.direct_registered_functions.insert(func_name);
    }

    for caps in ENUM_REGISTER_REGEX.captures_iter(content) {
        bindings.enum_rules.insert(caps[1].to_string());
    }

    bindings
}

/// Read and extract bindings from the registry file
///
/// A missing registry file is fatal; a registry that matches no idiom is
/// only a report warning, handled by the caller via
/// [`RegistryBindings::is_empty`].
pub fn scan_registry(path: &Path) -> Result<RegistryBindings> {
    if !path.is_file() {
        return Err(Error::RegistryNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    Ok(extract_bindings(&content))
}

/// Scan the implementation directory for transformer function definitions
///
/// Only files with the configured extension are scanned, in lexicographic
/// order. Unreadable files are logged and skipped.
pub fn scan_implementations(dir: &Path, ext: &str) -> Result<Implementations> {
    if !dir.is_dir() {
        return Err(Error::ImplDirNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|e| e == ext))
        .collect();
    paths.sort();

    if paths.is_empty() {
        return Err(Error::NoImplFiles {
            path: dir.to_path_buf(),
            ext: ext.to_string(),
        });
    }

    let mut impls = Implementations::default();
    for path in paths {
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!("Skipping unreadable source file {}: {}", path.display(), e);
                impls
                    .warnings
                    .push(format!("Skipped unreadable file {}: {}", file_name, e));
                continue;
            }
        };
        for caps in IMPL_DEF_REGEX.captures_iter(&content) {
            let name = caps[1].to_string();
            impls.files.insert(name.clone(), file_name.clone());
            impls.names.insert(name);
        }
    }

    Ok(impls)
}
