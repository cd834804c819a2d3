//! Check command: render the reconciliation report

use colored::{ColoredString, Colorize};
use gram_audit_core::{CoverageState, Report, run_audit};

use crate::cli::InputArgs;
use crate::error::{CliError, Result};

/// Options controlling report rendering
pub struct CheckOptions {
    pub skip_found: bool,
    pub quiet: bool,
    pub file: Option<String>,
    pub strict: bool,
    pub json: bool,
}

/// Run the check command
pub fn run_check(inputs: &InputArgs, options: &CheckOptions) -> Result<()> {
    let config = super::resolve_config(inputs)?;
    let outcome = run_audit(&config)?;
    let report = &outcome.report;

    if let Some(stem) = &options.file {
        if !report.files.iter().any(|f| &f.stem == stem) {
            return Err(CliError::user(format!(
                "No grammar file with stem '{}' was found",
                stem
            )));
        }
    }

    if options.json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        render_report(report, options);
    }

    if options.strict {
        check_strict_gate(report, config.fail_on_duplicates)?;
    }

    Ok(())
}

/// Fail the run when strict mode finds gating problems
fn check_strict_gate(report: &Report, fail_on_duplicates: bool) -> Result<()> {
    if report.has_missing() {
        return Err(CliError::strict(format!(
            "{} rule(s) have no binding of any kind",
            report.totals.missing
        )));
    }
    if fail_on_duplicates && !report.duplicates.is_empty() {
        return Err(CliError::strict(format!(
            "{} duplicate rule definition(s) across grammar files",
            report.duplicates.len()
        )));
    }
    Ok(())
}

fn colored_tag(state: CoverageState) -> ColoredString {
    let tag = state.tag();
    match state {
        CoverageState::Excluded => tag.dimmed(),
        CoverageState::Enum => tag.cyan(),
        CoverageState::RegisteredImplemented => tag.green(),
        CoverageState::UnregisteredImplementation | CoverageState::RegisteredUnimplemented => {
            tag.yellow()
        }
        CoverageState::Missing => tag.red(),
    }
}

fn render_report(report: &Report, options: &CheckOptions) {
    println!("{}", "--- Rule Coverage Check ---".bold());

    for message in &report.messages {
        println!("{} {}", "[!]".yellow(), message);
    }

    for file in &report.files {
        if let Some(stem) = &options.file {
            if &file.stem != stem {
                continue;
            }
        }

        if !options.quiet {
            println!();
            println!("--- File: {} ---", file.file_name.bold());
            if file.rules.is_empty() {
                println!("{}", "(No grammar rules found in this file)".dimmed());
                continue;
            }
        }

        for rule in &file.rules {
            if options.quiet {
                if rule.state.is_issue() {
                    println!("{:<14} {}", colored_tag(rule.state), rule.name);
                }
                continue;
            }
            if options.skip_found
                && matches!(
                    rule.state,
                    CoverageState::RegisteredImplemented | CoverageState::Enum
                )
            {
                continue;
            }
            println!("{:<14} {}", colored_tag(rule.state), rule.name);
        }
    }

    render_summary(report);
    render_orphans(report);
}

fn render_summary(report: &Report) {
    let totals = &report.totals;
    let issues =
        totals.missing + totals.registered_unimplemented + totals.unregistered_implementation;

    println!();
    println!("{}", "--- Summary: Rule Coverage ---".bold());
    println!("{:<25} : {}", "TOTAL RULES SCANNED", totals.scanned);
    println!("  {:<23} : {}", "- Excluded", totals.excluded);
    println!("---------------------------------------");
    println!("{:<25} : {}", "TOTAL ACTIONABLE RULES", totals.actionable);
    println!(
        "{:<25} : {} ({:.2}%)",
        "TOTAL COVERED", totals.covered, totals.coverage_percent
    );
    println!("  {:<23} : {}", "- Enum", totals.enum_bound);
    println!("  {:<23} : {}", "- Registered", totals.registered_implemented);
    println!("{:<25} : {}", "TOTAL ISSUES", issues);

    let files_with_issues: Vec<_> = report.files.iter().filter(|f| f.issues > 0).collect();
    if !files_with_issues.is_empty() {
        println!();
        println!("{}", "--- Summary: Issues Per File ---".bold());
        for file in files_with_issues {
            println!("{:<25} : {} issues", file.file_name, file.issues);
        }
    }
}

fn render_orphans(report: &Report) {
    println!();
    println!("{}", "--- Orphan / Mismatch Check ---".bold());

    if !report.orphan_implementations.is_empty() {
        println!();
        println!(
            "{} Orphan Transformer Functions (No matching grammar rule):",
            "[!]".yellow()
        );
        for orphan in &report.orphan_implementations {
            let file = orphan.file.as_deref().unwrap_or("unknown");
            println!("  - Transform{}  ({})", orphan.name, file);
        }
    }

    if !report.orphan_enum_bindings.is_empty() {
        println!();
        println!(
            "{} Orphan Enum Rules (No matching grammar rule):",
            "[!]".yellow()
        );
        for rule in &report.orphan_enum_bindings {
            println!("  - RegisterEnum(\"{}\")", rule);
        }
    }

    if !report.orphan_registrations.is_empty() {
        println!();
        println!(
            "{} Orphan Registrations (No matching grammar rule):",
            "[!]".yellow()
        );
        for rule in &report.orphan_registrations {
            println!("  - REGISTER_TRANSFORM(Transform{})", rule);
        }
    }

    if !report.registered_without_implementation.is_empty() {
        println!();
        println!(
            "{} Registered but NOT Implemented (Will not link):",
            "[!]".red()
        );
        for rule in &report.registered_without_implementation {
            println!("  - REGISTER_TRANSFORM(Transform{})", rule);
        }
    }

    if !report.ambiguous.is_empty() {
        println!();
        println!(
            "{} Rule registered as BOTH Enum and Transformer (Ambiguous):",
            "[!]".red()
        );
        for rule in &report.ambiguous {
            println!("  - {}", rule);
        }
    }

    if !report.duplicates.is_empty() {
        println!();
        println!(
            "{} Duplicate Rule Definitions (later shadows earlier):",
            "[!]".yellow()
        );
        for dup in &report.duplicates {
            println!(
                "  - {}  ({} shadowed by {})",
                dup.name, dup.first_file, dup.second_file
            );
        }
    }
}
