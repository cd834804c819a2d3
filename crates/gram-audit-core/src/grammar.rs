//! Grammar rule extraction
//!
//! Scans a directory of `*.gram` files and recovers every production rule
//! as a (name, source file, body) triple. Rules are line-oriented:
//!
//! ```text
//! SelectStatement <- 'SELECT' TargetList
//!     FromClause?
//!
//! TargetList <- Expression (',' Expression)*
//! ```
//!
//! A rule header is an identifier followed by `<-` at the start of a line.
//! The body may continue over following non-blank lines; a blank line or
//! end of file closes the rule. `#` comment lines are ignored.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Matches a rule header: `RuleName <-` at line start
static RULE_HEADER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9_]+)\s*<-").expect("Invalid rule header regex"));

/// A single production rule parsed from a grammar file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarRule {
    /// Rule name, unique across all grammar files
    pub name: String,
    /// File the rule was defined in (file name, not full path)
    pub source_file: String,
    /// Whitespace-joined single-line rule text, for human-facing output only
    pub body: String,
}

/// All rules parsed from one grammar file, in definition order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrammarFile {
    /// File name, e.g. `copy.gram`
    pub file_name: String,
    /// File stem, e.g. `copy`; used to derive the implementation file name
    pub stem: String,
    /// Rules in definition order
    pub rules: Vec<GrammarRule>,
}

/// A rule name defined more than once across the grammar
///
/// Classification uses the later definition (last write wins); the
/// duplicate itself is surfaced in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateRule {
    pub name: String,
    /// File holding the shadowed, earlier definition
    pub first_file: String,
    /// File holding the definition that wins
    pub second_file: String,
}

/// Result of scanning a grammar directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrammarScan {
    /// Scanned files in lexicographic order
    pub files: Vec<GrammarFile>,
    /// Duplicate definitions found across files
    pub duplicates: Vec<DuplicateRule>,
    /// Non-fatal problems encountered, e.g. unreadable files that were
    /// skipped
    pub warnings: Vec<String>,
}

impl GrammarScan {
    /// The set of all rule names across every file
    pub fn rule_names(&self) -> BTreeSet<String> {
        self.files
            .iter()
            .flat_map(|f| f.rules.iter())
            .map(|r| r.name.clone())
            .collect()
    }

    /// Map of rule name to body text; later definitions shadow earlier ones
    pub fn rule_bodies(&self) -> BTreeMap<String, String> {
        self.files
            .iter()
            .flat_map(|f| f.rules.iter())
            .map(|r| (r.name.clone(), r.body.clone()))
            .collect()
    }

    /// Map of rule name to the stem of its defining grammar file; later
    /// definitions shadow earlier ones
    pub fn rule_stems(&self) -> BTreeMap<String, String> {
        self.files
            .iter()
            .flat_map(|f| f.rules.iter().map(|r| (r.name.clone(), f.stem.clone())))
            .collect()
    }

    /// Total number of rule definitions scanned (duplicates counted twice)
    pub fn rule_count(&self) -> usize {
        self.files.iter().map(|f| f.rules.len()).sum()
    }
}

/// Scan a directory for `*.gram` files and extract every rule
///
/// Files are processed in lexicographic order so repeated runs produce
/// identical output. A missing directory or a directory with no grammar
/// files is fatal; a single unreadable file is logged and skipped.
pub fn scan_grammar_dir(dir: &Path) -> Result<GrammarScan> {
    if !dir.is_dir() {
        return Err(Error::GrammarDirNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "gram"))
        .collect();
    paths.sort();

    if paths.is_empty() {
        return Err(Error::NoGrammarFiles {
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    let mut warnings = Vec::new();
    let mut seen: BTreeMap<String, String> = BTreeMap::new();
    let mut duplicates = Vec::new();

    for path in paths {
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!("Skipping unreadable grammar file {}: {}", path.display(), e);
                warnings.push(format!("Skipped unreadable file {}: {}", file_name, e));
                continue;
            }
        };

        let rules = extract_rules(&content, &file_name);
        for rule in &rules {
            match seen.get(&rule.name) {
                Some(first_file) => duplicates.push(DuplicateRule {
                    name: rule.name.clone(),
                    first_file: first_file.clone(),
                    second_file: file_name.clone(),
                }),
                None => {
                    seen.insert(rule.name.clone(), file_name.clone());
                }
            }
        }

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();
        files.push(GrammarFile {
            file_name,
            stem,
            rules,
        });
    }

    Ok(GrammarScan {
        files,
        duplicates,
        warnings,
    })
}

/// Extract rules from grammar text
///
/// Two-state line scanner: outside a rule, only a header line opens one;
/// inside a rule, non-blank non-comment lines extend the body and a blank
/// line closes it. An open rule at end of input is force-closed.
pub fn extract_rules(content: &str, source_file: &str) -> Vec<GrammarRule> {
    let mut rules = Vec::new();
    let mut current_name: Option<String> = None;
    let mut current_lines: Vec<String> = Vec::new();

    let close = |name: &mut Option<String>, lines: &mut Vec<String>, out: &mut Vec<GrammarRule>| {
        if let Some(name) = name.take() {
            out.push(GrammarRule {
                name,
                source_file: source_file.to_string(),
                body: lines.join(" ").trim().to_string(),
            });
            lines.clear();
        }
    };

    for line in content.lines() {
        if let Some(caps) = RULE_HEADER_REGEX.captures(line) {
            // A new header closes any open rule first
            close(&mut current_name, &mut current_lines, &mut rules);
            current_name = Some(caps[1].to_string());
            current_lines.push(line.trim().to_string());
        } else if current_name.is_some() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                close(&mut current_name, &mut current_lines, &mut rules);
            } else if !trimmed.starts_with('#') {
                current_lines.push(trimmed.to_string());
            }
        }
    }
    close(&mut current_name, &mut current_lines, &mut rules);

    rules
}
