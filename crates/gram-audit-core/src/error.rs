//! Error types for gram-audit-core

use std::path::PathBuf;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while auditing rule coverage
///
/// Configuration problems (missing or empty inputs) are fatal and abort the
/// run. Per-file read failures are not represented here: those are logged,
/// annotated in the report, and the run continues without that file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Grammar directory does not exist
    #[error("Grammar directory not found: {path}")]
    GrammarDirNotFound { path: PathBuf },

    /// Grammar directory exists but contains no grammar files
    #[error("No .gram files found in {path}")]
    NoGrammarFiles { path: PathBuf },

    /// Registry source file does not exist
    #[error("Registry file not found: {path}")]
    RegistryNotFound { path: PathBuf },

    /// Implementation directory does not exist
    #[error("Implementation directory not found: {path}")]
    ImplDirNotFound { path: PathBuf },

    /// Implementation directory exists but contains no source files
    #[error("No .{ext} files found in {path}")]
    NoImplFiles { path: PathBuf, ext: String },

    /// Config file was requested explicitly but does not exist
    #[error("Config file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    /// JSON serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
