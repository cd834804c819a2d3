//! Stub synthesis for uncovered rules
//!
//! For every rule the reconciler left in `Missing`, emits the three source
//! fragments needed to close the gap: a declaration for the factory header,
//! a registration line for the registry file, and an implementation
//! skeleton for the `transform_<stem>.<ext>` file derived from the rule's
//! grammar file. Rules in `UnregisteredImplementation` already have a body
//! and only get the registration line.
//!
//! Output is advisory text for a human to paste; nothing is ever written
//! into the scanned sources. When the derived target file does not exist,
//! synthesis for that rule is skipped and recorded instead of producing
//! fragments that point nowhere.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::grammar::GrammarScan;
use crate::reconcile::{CoverageState, Report};

/// Generated fragments for one rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleStub {
    /// Rule the fragments belong to
    pub rule: String,
    /// Derived implementation file name, e.g. `transform_copy.cpp`
    pub target_file: String,
    /// Declaration for the factory header; absent for registration-only
    /// stubs
    pub declaration: Option<String>,
    /// Registration line for the registry file
    pub registration: String,
    /// Implementation skeleton; absent for registration-only stubs
    pub implementation: Option<String>,
}

/// A rule whose stub was not generated because its target file is missing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedStub {
    pub rule: String,
    /// The nonexistent file synthesis would have targeted
    pub target_file: String,
}

/// Synthesis output: generated stubs plus skipped rules
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StubBatch {
    /// Stubs sorted by rule name
    pub stubs: Vec<RuleStub>,
    /// Rules skipped because their target file does not exist
    pub skipped: Vec<SkippedStub>,
}

impl StubBatch {
    /// Whether synthesis produced nothing at all
    pub fn is_empty(&self) -> bool {
        self.stubs.is_empty() && self.skipped.is_empty()
    }
}

fn declaration_stub(rule: &str, body: &str) -> String {
    let mut out = String::new();
    if !body.is_empty() {
        out.push_str(&format!("// {}\n", body));
    }
    out.push_str("// TODO: Verify this return type is correct\n");
    out.push_str(&format!(
        "static unique_ptr<SQLStatement> Transform{}(PEGTransformer &transformer, optional_ptr<ParseResult> parse_result);\n",
        rule
    ));
    out
}

fn registration_stub(rule: &str) -> String {
    format!("REGISTER_TRANSFORM(Transform{});\n", rule)
}

fn implementation_stub(rule: &str, body: &str) -> String {
    let mut out = String::new();
    if !body.is_empty() {
        out.push_str(&format!("// {}\n", body));
    }
    out.push_str("// TODO: Verify this return type is correct\n");
    out.push_str(&format!(
        "unique_ptr<SQLStatement> PEGTransformerFactory::Transform{}(PEGTransformer &transformer,\n",
        rule
    ));
    out.push_str(
        "                                                                   optional_ptr<ParseResult> parse_result) {\n",
    );
    out.push_str(&format!(
        "\tthrow NotImplementedException(\"Transform{} has not yet been implemented\");\n",
        rule
    ));
    out.push_str("}\n");
    out
}

/// Synthesize stubs for every uncovered rule in the report
///
/// `impl_dir` is the directory holding the transformer sources; the target
/// file for a rule is `transform_<stem>.<ext>` where `<stem>` comes from
/// the rule's defining grammar file.
pub fn synthesize(
    report: &Report,
    scan: &GrammarScan,
    impl_dir: &Path,
    ext: &str,
) -> StubBatch {
    let bodies = scan.rule_bodies();
    let stems = scan.rule_stems();
    let mut batch = StubBatch::default();

    let mut targets: Vec<(&str, CoverageState)> = report
        .files
        .iter()
        .flat_map(|f| f.rules.iter())
        .filter(|r| {
            matches!(
                r.state,
                CoverageState::Missing | CoverageState::UnregisteredImplementation
            )
        })
        .map(|r| (r.name.as_str(), r.state))
        .collect();
    // Duplicate definitions classify identically; one stub per name
    targets.sort_by(|a, b| a.0.cmp(b.0));
    targets.dedup_by(|a, b| a.0 == b.0);

    for (rule, state) in targets {
        let stem = stems.get(rule).map(String::as_str).unwrap_or("unknown");
        let target_file = format!("transform_{}.{}", stem, ext);

        if !impl_dir.join(&target_file).is_file() {
            batch.skipped.push(SkippedStub {
                rule: rule.to_string(),
                target_file,
            });
            continue;
        }

        let body = bodies.get(rule).map(String::as_str).unwrap_or("");
        let full = state == CoverageState::Missing;
        batch.stubs.push(RuleStub {
            rule: rule.to_string(),
            target_file,
            declaration: full.then(|| declaration_stub(rule, body)),
            registration: registration_stub(rule),
            implementation: full.then(|| implementation_stub(rule, body)),
        });
    }

    batch
}
