//! Rule reconciliation engine for grammar/transformer coverage auditing
//!
//! Audits consistency between a declarative PEG-style grammar (named
//! production rules in `*.gram` files) and an imperative transformer
//! registry that must supply exactly one handling strategy per rule: an
//! enum binding, a registered conversion function, or an explicit
//! exclusion.
//!
//! # Pipeline
//!
//! ```text
//! grammar files   registry file   implementation files
//!       |               |                  |
//!  Rule Extractor  Binding Extractor  Impl Extractor
//!       \               |                  /
//!        +------- Reconciler (pure) ------+
//!                 |               |
//!             Report        Stub Synthesizer
//! ```
//!
//! Data flows one way; every stage is synchronous and deterministic, so a
//! run over unchanged inputs produces a byte-identical report.
//!
//! # Example
//!
//! ```no_run
//! use gram_audit_core::{AuditConfig, run_audit};
//!
//! fn main() -> gram_audit_core::Result<()> {
//!     let config = AuditConfig::default();
//!     let outcome = run_audit(&config)?;
//!     for file in &outcome.report.files {
//!         println!("{}: {} issues", file.file_name, file.issues);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! The distinction between macro and direct registration matters: a macro
//! registration implies a same-named `Transform<Rule>` implementation,
//! while a direct registration names its target function explicitly and
//! may alias one function to many rules.

pub mod config;
pub mod error;
pub mod grammar;
pub mod reconcile;
pub mod registry;
pub mod stubs;

pub use config::{AuditConfig, Exclusions};
pub use error::{Error, Result};
pub use grammar::{DuplicateRule, GrammarFile, GrammarRule, GrammarScan, scan_grammar_dir};
pub use reconcile::{
    ClassifiedRule, CoverageState, FileReport, OrphanImplementation, Report, Totals, reconcile,
};
pub use registry::{Implementations, RegistryBindings, scan_implementations, scan_registry};
pub use stubs::{RuleStub, SkippedStub, StubBatch, synthesize};

/// Everything a single audit run produces
#[derive(Debug, Clone)]
pub struct AuditOutcome {
    /// Parsed grammar, kept for stub synthesis and rendering
    pub scan: GrammarScan,
    /// The reconciliation report
    pub report: Report,
}

/// Run the full extraction and reconciliation pipeline
///
/// Fails fast on configuration problems (missing directories, empty
/// inputs); per-file read failures surface as report messages instead.
pub fn run_audit(config: &AuditConfig) -> Result<AuditOutcome> {
    let scan = scan_grammar_dir(&config.grammar_dir)?;
    tracing::debug!(
        files = scan.files.len(),
        rules = scan.rule_count(),
        "Scanned grammar directory"
    );

    let bindings = scan_registry(&config.registry_file)?;
    let impls = scan_implementations(&config.impl_dir, &config.impl_ext)?;
    tracing::debug!(
        registered = bindings.registered_rules.len(),
        enums = bindings.enum_rules.len(),
        implemented = impls.names.len(),
        "Extracted registry bindings"
    );

    let report = reconcile(&scan, &config.exclusion_set(), &bindings, &impls);
    Ok(AuditOutcome { scan, report })
}

/// Synthesize stubs for the uncovered rules of an audit outcome
pub fn synthesize_stubs(config: &AuditConfig, outcome: &AuditOutcome) -> StubBatch {
    synthesize(
        &outcome.report,
        &outcome.scan,
        &config.impl_dir,
        &config.impl_ext,
    )
}
