//! Rule reconciliation
//!
//! Pure set algebra over the extracted rule names and binding sets. Every
//! grammar rule is classified into exactly one [`CoverageState`], and four
//! orphan sets plus one ambiguity set are derived from the differences.
//! The reconciler never touches the filesystem and cannot fail given
//! well-formed inputs.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::Exclusions;
use crate::grammar::{DuplicateRule, GrammarScan};
use crate::registry::{Implementations, RegistryBindings};

/// Coverage state of a single grammar rule
///
/// Classification precedence is fixed: exclusion short-circuits everything,
/// then enum binding, then direct registration (satisfied by any named
/// target), then implementation presence, then stale macro registration,
/// and finally nothing at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageState {
    /// Intentionally unhandled; listed in the exclusion set
    Excluded,
    /// Bound to a literal enum value
    Enum,
    /// Registered with a matching implementation (or directly registered to
    /// an explicitly named target function)
    RegisteredImplemented,
    /// An implementation exists but no registration refers to it, so the
    /// rule is unreachable at runtime
    UnregisteredImplementation,
    /// A macro registration exists but its implementation is gone
    RegisteredUnimplemented,
    /// No binding of any kind
    Missing,
}

impl CoverageState {
    /// Whether this state is a coverage problem
    pub fn is_issue(self) -> bool {
        matches!(
            self,
            Self::UnregisteredImplementation | Self::RegisteredUnimplemented | Self::Missing
        )
    }

    /// Status tag used in the textual report
    pub fn tag(self) -> &'static str {
        match self {
            Self::Excluded => "[ EXCLUDED ]",
            Self::Enum => "[ ENUM ]",
            Self::RegisteredImplemented => "[ FOUND ]",
            Self::UnregisteredImplementation => "[ NOT REG'D ]",
            Self::RegisteredUnimplemented => "[ NO IMPL ]",
            Self::Missing => "[ MISSING ]",
        }
    }
}

/// A classified grammar rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedRule {
    pub name: String,
    pub state: CoverageState,
}

/// Classification results for one grammar file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    /// Grammar file name, e.g. `copy.gram`
    pub file_name: String,
    /// File stem, used to derive the stub target file
    pub stem: String,
    /// Rules sorted by name
    pub rules: Vec<ClassifiedRule>,
    /// Number of rules in an issue state
    pub issues: usize,
}

/// An implementation function with no matching grammar rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrphanImplementation {
    /// Rule-shaped name, i.e. the function name without the prefix
    pub name: String,
    /// File defining the function, when known
    pub file: Option<String>,
}

/// Aggregate counters for a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    /// Every rule definition seen, excluded ones included
    pub scanned: usize,
    /// Rules short-circuited by the exclusion set
    pub excluded: usize,
    /// Rules that need a binding (scanned minus excluded)
    pub actionable: usize,
    pub enum_bound: usize,
    pub registered_implemented: usize,
    pub unregistered_implementation: usize,
    pub registered_unimplemented: usize,
    pub missing: usize,
    /// enum_bound + registered_implemented
    pub covered: usize,
    /// Covered share of actionable rules, 0..=100
    pub coverage_percent: f64,
}

/// Full reconciliation report for one run
///
/// Recomputed from scratch on every run; all lists are sorted by name so
/// repeated runs over unchanged inputs are byte-identical.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub files: Vec<FileReport>,
    pub totals: Totals,
    /// Transformer functions with no grammar rule
    pub orphan_implementations: Vec<OrphanImplementation>,
    /// Enum bindings with no grammar rule
    pub orphan_enum_bindings: Vec<String>,
    /// Macro registrations with no grammar rule
    pub orphan_registrations: Vec<String>,
    /// Macro registrations whose implementation is missing
    pub registered_without_implementation: Vec<String>,
    /// Rules bound as both enum and registered transform
    pub ambiguous: Vec<String>,
    /// Duplicate rule definitions across grammar files
    pub duplicates: Vec<DuplicateRule>,
    /// Non-fatal diagnostics gathered during extraction
    pub messages: Vec<String>,
}

impl Report {
    /// Whether any rule is in the `Missing` state
    pub fn has_missing(&self) -> bool {
        self.totals.missing > 0
    }

    /// Rules in a given state, across all files, sorted by name
    pub fn rules_in_state(&self, state: CoverageState) -> Vec<&ClassifiedRule> {
        let mut rules: Vec<_> = self
            .files
            .iter()
            .flat_map(|f| f.rules.iter())
            .filter(|r| r.state == state)
            .collect();
        rules.sort_by(|a, b| a.name.cmp(&b.name));
        rules
    }
}

/// Classify a single rule name against the binding sets
fn classify(
    name: &str,
    exclusions: &Exclusions,
    bindings: &RegistryBindings,
    implemented: &BTreeSet<String>,
) -> CoverageState {
    if exclusions.contains(name) {
        return CoverageState::Excluded;
    }
    if bindings.enum_rules.contains(name) {
        return CoverageState::Enum;
    }
    // A direct registration names its target function explicitly, so it is
    // satisfied even when no same-named implementation exists
    if bindings.direct_registered_rules.contains(name) {
        return CoverageState::RegisteredImplemented;
    }
    if implemented.contains(name) {
        if bindings.registered_rules.contains(name) {
            CoverageState::RegisteredImplemented
        } else {
            CoverageState::UnregisteredImplementation
        }
    } else if bindings.registered_rules.contains(name) {
        CoverageState::RegisteredUnimplemented
    } else {
        CoverageState::Missing
    }
}

/// Reconcile grammar rules against the extracted bindings
///
/// Pure function of its inputs: classifies every rule, derives the orphan
/// and ambiguity sets, and fills in the aggregate totals.
pub fn reconcile(
    scan: &GrammarScan,
    exclusions: &Exclusions,
    bindings: &RegistryBindings,
    impls: &Implementations,
) -> Report {
    let grammar_names = scan.rule_names();
    let mut totals = Totals::default();
    let mut files = Vec::new();

    for file in &scan.files {
        let mut rules: Vec<ClassifiedRule> = file
            .rules
            .iter()
            .map(|rule| ClassifiedRule {
                name: rule.name.clone(),
                state: classify(&rule.name, exclusions, bindings, &impls.names),
            })
            .collect();
        rules.sort_by(|a, b| a.name.cmp(&b.name));

        let mut issues = 0;
        for rule in &rules {
            totals.scanned += 1;
            match rule.state {
                CoverageState::Excluded => totals.excluded += 1,
                CoverageState::Enum => totals.enum_bound += 1,
                CoverageState::RegisteredImplemented => totals.registered_implemented += 1,
                CoverageState::UnregisteredImplementation => {
                    totals.unregistered_implementation += 1
                }
                CoverageState::RegisteredUnimplemented => totals.registered_unimplemented += 1,
                CoverageState::Missing => totals.missing += 1,
            }
            if rule.state.is_issue() {
                issues += 1;
            }
        }

        files.push(FileReport {
            file_name: file.file_name.clone(),
            stem: file.stem.clone(),
            rules,
            issues,
        });
    }

    totals.actionable = totals.scanned - totals.excluded;
    totals.covered = totals.enum_bound + totals.registered_implemented;
    totals.coverage_percent = if totals.actionable > 0 {
        (totals.covered as f64 / totals.actionable as f64) * 100.0
    } else {
        0.0
    };

    let not_excluded = |name: &&String| !exclusions.contains(name);

    // Shared direct-registration targets are exempt: one function may
    // legitimately serve many rule names
    let orphan_implementations: Vec<OrphanImplementation> = impls
        .names
        .difference(&grammar_names)
        .filter(not_excluded)
        .filter(|name| !bindings.direct_registered_functions.contains(*name))
        .map(|name| OrphanImplementation {
            name: name.clone(),
            file: impls.files.get(name).cloned(),
        })
        .collect();

    let orphan_enum_bindings: Vec<String> = bindings
        .enum_rules
        .difference(&grammar_names)
        .filter(not_excluded)
        .cloned()
        .collect();

    let orphan_registrations: Vec<String> = bindings
        .registered_rules
        .difference(&grammar_names)
        .filter(not_excluded)
        .filter(|name| !bindings.direct_registered_rules.contains(*name))
        .cloned()
        .collect();

    // Direct registrations name their target explicitly; only macro
    // registrations imply a same-named implementation
    let registered_without_implementation: Vec<String> = bindings
        .registered_rules
        .difference(&impls.names)
        .filter(|name| !bindings.direct_registered_rules.contains(*name))
        .cloned()
        .collect();

    let ambiguous: Vec<String> = bindings
        .registered_rules
        .intersection(&bindings.enum_rules)
        .cloned()
        .collect();

    let mut messages: Vec<String> = Vec::new();
    messages.extend(scan.warnings.iter().cloned());
    messages.extend(impls.warnings.iter().cloned());
    if bindings.is_empty() {
        messages.push("Registry file matched no registration idiom.".to_string());
    }

    Report {
        files,
        totals,
        orphan_implementations,
        orphan_enum_bindings,
        orphan_registrations,
        registered_without_implementation,
        ambiguous,
        duplicates: scan.duplicates.clone(),
        messages,
    }
}
