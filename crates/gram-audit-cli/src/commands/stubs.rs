//! Stubs command: emit generated source fragments

use std::fmt::Write as _;
use std::path::Path;

use colored::Colorize;
use gram_audit_core::{StubBatch, run_audit, synthesize_stubs};

use crate::cli::InputArgs;
use crate::error::Result;

/// Run the stubs command
pub fn run_stubs(inputs: &InputArgs, file: Option<&str>, output: Option<&Path>) -> Result<()> {
    let config = super::resolve_config(inputs)?;
    let outcome = run_audit(&config)?;
    let mut batch = synthesize_stubs(&config, &outcome);

    if let Some(stem) = file {
        let prefix = format!("transform_{}.", stem);
        batch.stubs.retain(|s| s.target_file.starts_with(&prefix));
        batch.skipped.retain(|s| s.target_file.starts_with(&prefix));
    }

    let registry_file = config.registry_file.display().to_string();
    match output {
        Some(path) => {
            std::fs::write(path, render_stubs(&registry_file, &batch))?;
            println!(
                "Wrote stubs for {} rule(s) to {}",
                batch.stubs.len(),
                path.display()
            );
        }
        None => {
            if batch.is_empty() {
                println!("No missing rules to generate.");
                return Ok(());
            }
            println!("{}", "--- Code Generation: Missing Stubs ---".bold());
            print!("{}", render_stubs(&registry_file, &batch));
        }
    }
    Ok(())
}

/// Render the batch as paste-ready text, grouped and labeled per rule
fn render_stubs(registry_file: &str, batch: &StubBatch) -> String {
    let mut out = String::new();
    if batch.is_empty() {
        out.push_str("No missing rules to generate.\n");
        return out;
    }

    out.push_str("Copy and paste the code below into the correct files.\n");

    for skipped in &batch.skipped {
        let _ = writeln!(
            out,
            "\n// --- SKIPPING: {} (File not found: {}) ---",
            skipped.rule, skipped.target_file
        );
    }

    for stub in &batch.stubs {
        let _ = writeln!(out, "\n--- Generation for rule: {} ---", stub.rule);

        let mut step = 1;
        if let Some(declaration) = &stub.declaration {
            let _ = writeln!(out, "{}. Add DECLARATION to the factory header:", step);
            let _ = writeln!(out, "{}", declaration);
            step += 1;
        }

        let _ = writeln!(out, "{}. Add REGISTRATION to: {}", step, registry_file);
        let _ = writeln!(out, "{}", stub.registration);
        step += 1;

        if let Some(implementation) = &stub.implementation {
            let _ = writeln!(out, "{}. Add IMPLEMENTATION to: {}", step, stub.target_file);
            let _ = writeln!(out, "{}", implementation);
        }

        let _ = writeln!(out, "--- End of {} ---", stub.rule);
    }

    out
}
