//! Audit configuration and the exclusion list
//!
//! `AuditConfig` is parsed from an optional `audit.toml` file; every field
//! has a serde default so a missing or partial file still yields a usable
//! configuration. CLI flags override the resolved paths afterwards.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

fn default_grammar_dir() -> PathBuf {
    PathBuf::from("grammar/statements")
}

fn default_registry_file() -> PathBuf {
    PathBuf::from("transformer/peg_transformer_factory.cpp")
}

fn default_impl_dir() -> PathBuf {
    PathBuf::from("transformer")
}

fn default_impl_ext() -> String {
    "cpp".to_string()
}

/// Configuration for an audit run, parsed from `audit.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Directory containing `*.gram` grammar files
    #[serde(default = "default_grammar_dir")]
    pub grammar_dir: PathBuf,

    /// Registry source file containing the registration calls
    #[serde(default = "default_registry_file")]
    pub registry_file: PathBuf,

    /// Directory containing the transformer implementation files
    #[serde(default = "default_impl_dir")]
    pub impl_dir: PathBuf,

    /// File extension of implementation files (also used when deriving
    /// stub target file names as `transform_<stem>.<impl_ext>`)
    #[serde(default = "default_impl_ext")]
    pub impl_ext: String,

    /// Replace the built-in exclusion list with these names
    #[serde(default)]
    pub exclusions: Option<Vec<String>>,

    /// Add these names on top of the exclusion list
    #[serde(default)]
    pub extra_exclusions: Vec<String>,

    /// When set, strict mode also fails the run on duplicate rule
    /// definitions across grammar files
    #[serde(default)]
    pub fail_on_duplicates: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            grammar_dir: default_grammar_dir(),
            registry_file: default_registry_file(),
            impl_dir: default_impl_dir(),
            impl_ext: default_impl_ext(),
            exclusions: None,
            extra_exclusions: Vec::new(),
            fail_on_duplicates: false,
        }
    }
}

impl AuditConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Resolve the effective exclusion set for this configuration
    pub fn exclusion_set(&self) -> Exclusions {
        let mut set = match &self.exclusions {
            Some(names) => Exclusions::from_names(names.iter().map(String::as_str)),
            None => Exclusions::builtin(),
        };
        for name in &self.extra_exclusions {
            set.insert(name);
        }
        set
    }
}

/// Rule names that are intentionally unhandled by the registry
///
/// These are typically lexical fragments or keyword alternations that are
/// folded into a parent rule's transform. The set is always passed into the
/// reconciler explicitly; there is no hidden global state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exclusions(BTreeSet<String>);

/// Rule names excluded by default, mirroring the registry's conventions
const BUILTIN_EXCLUSIONS: &[&str] = &[
    "AbortOrRollback",
    "AlwaysOrByDefault",
    "AtTimeZoneOperator",
    "ByName",
    "CatalogName",
    "ColLabel",
    "CollateOperator",
    "ColumnConstraint",
    "ColumnName",
    "CommitOrEnd",
    "ConstraintNameClause",
    "CopyOptionName",
    "CreateTableColumnElement",
    "Database",
    "DefArg",
    "DefaultValues",
    "ExportClause",
    "FunctionName",
    "FunctionType",
    "Generated",
    "GroupingOrGroupingId",
    "IfExists",
    "IfNotExists",
    "Lateral",
    "MacroOrFunction",
    "NamedParameterAssignment",
    "NoneLiteral",
    "OrReplace",
    "PivotKeyword",
    "PlainIdentifier",
    "PragmaName",
    "QuotedIdentifier",
    "Recursive",
    "ReservedColumnName",
    "ReservedFunctionName",
    "ReservedIdentifier",
    "ReservedSchemaName",
    "ReservedSchemaQualification",
    "ReservedTableName",
    "RowOrRows",
    "RowOrStruct",
    "SchemaName",
    "SettingName",
    "SettingScope",
    "StarSymbol",
    "StartOrBegin",
    "TableFunctionName",
    "TableName",
    "TableSample",
    "Transaction",
    "TypeList",
    "TypeName",
    "Unique",
    "UnpivotKeyword",
    "UsingSample",
    "ValueOrValues",
    "VariableAssign",
    "WithOrdinality",
];

impl Exclusions {
    /// The built-in exclusion list
    pub fn builtin() -> Self {
        Self::from_names(BUILTIN_EXCLUSIONS.iter().copied())
    }

    /// An empty exclusion set
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build an exclusion set from rule names
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self(names.into_iter().map(str::to_string).collect())
    }

    /// Add a rule name to the set
    pub fn insert(&mut self, name: &str) {
        self.0.insert(name.to_string());
    }

    /// Whether a rule name is excluded
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    /// Number of excluded names
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate the excluded names in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}
