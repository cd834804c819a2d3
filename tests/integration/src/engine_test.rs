//! End-to-end engine tests over on-disk fixture trees
//!
//! These exercise the complete flow: grammar scan -> binding extraction ->
//! reconciliation -> stub synthesis, against small fixture projects built
//! in temp directories.

use std::fs;

use gram_audit_core::{
    AuditConfig, AuditOutcome, CoverageState, Exclusions, run_audit, synthesize_stubs,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

/// Build the worked example fixture: copy.gram with a macro-registered
/// statement and a direct-registered alias to a shared transform
fn setup_copy_fixture() -> (TempDir, AuditConfig) {
    let temp = TempDir::new().unwrap();
    let grammar_dir = temp.path().join("grammar/statements");
    fs::create_dir_all(&grammar_dir).unwrap();

    fs::write(
        grammar_dir.join("copy.gram"),
        "CopyStatement <- 'COPY' CopyTable CopyOptions? /\n    'COPY' CopyTable\n\nCopyTable <- QualifiedName\n",
    )
    .unwrap();

    let impl_dir = temp.path().join("transformer");
    fs::create_dir_all(&impl_dir).unwrap();
    fs::write(
        impl_dir.join("transform_copy.cpp"),
        r#"
unique_ptr<SQLStatement> PEGTransformerFactory::TransformCopyStatement(PEGTransformer &transformer,
                                                                   optional_ptr<ParseResult> parse_result) {
    return make_uniq<CopyStatement>();
}

unique_ptr<SQLStatement> PEGTransformerFactory::TransformQualifiedName(PEGTransformer &transformer,
                                                                   optional_ptr<ParseResult> parse_result) {
    return make_uniq<QualifiedName>();
}
"#,
    )
    .unwrap();

    let registry = impl_dir.join("peg_transformer_factory.cpp");
    fs::write(
        &registry,
        r#"
PEGTransformerFactory::PEGTransformerFactory() {
    REGISTER_TRANSFORM(TransformCopyStatement);
    Register("CopyTable", &TransformQualifiedName);
}
"#,
    )
    .unwrap();

    let config = AuditConfig {
        grammar_dir,
        registry_file: registry,
        impl_dir,
        exclusions: Some(Vec::new()),
        ..AuditConfig::default()
    };
    (temp, config)
}

fn state_of(outcome: &AuditOutcome, name: &str) -> CoverageState {
    outcome
        .report
        .files
        .iter()
        .flat_map(|f| f.rules.iter())
        .find(|r| r.name == name)
        .unwrap_or_else(|| panic!("rule {} not classified", name))
        .state
}

#[test]
fn test_copy_fixture_is_fully_covered() {
    let (_temp, config) = setup_copy_fixture();
    let outcome = run_audit(&config).unwrap();

    assert_eq!(
        state_of(&outcome, "CopyStatement"),
        CoverageState::RegisteredImplemented
    );
    // Direct registration satisfies CopyTable via the aliased target
    assert_eq!(
        state_of(&outcome, "CopyTable"),
        CoverageState::RegisteredImplemented
    );
    // The shared TransformQualifiedName is not an orphan despite matching
    // no grammar rule name
    assert!(outcome.report.orphan_implementations.is_empty());
    assert!(!outcome.report.has_missing());
    assert_eq!(outcome.report.totals.coverage_percent, 100.0);
}

#[test]
fn test_reports_are_byte_identical_across_runs() {
    let (_temp, config) = setup_copy_fixture();
    let first = serde_json::to_string(&run_audit(&config).unwrap().report).unwrap();
    let second = serde_json::to_string(&run_audit(&config).unwrap().report).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_adding_binding_moves_rule_to_covered() {
    let (temp, config) = setup_copy_fixture();

    // A new grammar file with an uncovered rule
    fs::write(
        config.grammar_dir.join("vacuum.gram"),
        "VacuumStatement <- 'VACUUM'\n",
    )
    .unwrap();

    let before = run_audit(&config).unwrap();
    assert_eq!(state_of(&before, "VacuumStatement"), CoverageState::Missing);
    assert_eq!(before.report.totals.missing, 1);

    // Add a macro registration plus matching implementation
    let registry_path = &config.registry_file;
    let mut registry = fs::read_to_string(registry_path).unwrap();
    registry = registry.replace(
        "REGISTER_TRANSFORM(TransformCopyStatement);",
        "REGISTER_TRANSFORM(TransformCopyStatement);\n    REGISTER_TRANSFORM(TransformVacuumStatement);",
    );
    fs::write(registry_path, registry).unwrap();
    fs::write(
        temp.path().join("transformer/transform_vacuum.cpp"),
        "unique_ptr<SQLStatement> PEGTransformerFactory::TransformVacuumStatement(PEGTransformer &t) {}\n",
    )
    .unwrap();

    let after = run_audit(&config).unwrap();
    assert_eq!(
        state_of(&after, "VacuumStatement"),
        CoverageState::RegisteredImplemented
    );
    assert_eq!(after.report.totals.missing, 0);
    // No other rule changed state
    assert_eq!(
        state_of(&after, "CopyStatement"),
        state_of(&before, "CopyStatement")
    );
    assert_eq!(
        state_of(&after, "CopyTable"),
        state_of(&before, "CopyTable")
    );
}

#[test]
fn test_orphan_registration_appears_only_in_orphan_section() {
    let (_temp, config) = setup_copy_fixture();
    let mut registry = fs::read_to_string(&config.registry_file).unwrap();
    registry.push_str("REGISTER_TRANSFORM(TransformDroppedStatement);\n");
    fs::write(&config.registry_file, registry).unwrap();

    let outcome = run_audit(&config).unwrap();
    assert_eq!(
        outcome.report.orphan_registrations,
        vec!["DroppedStatement"]
    );
    assert!(
        outcome
            .report
            .files
            .iter()
            .flat_map(|f| f.rules.iter())
            .all(|r| r.name != "DroppedStatement")
    );
    // The stale macro registration also lacks an implementation
    assert_eq!(
        outcome.report.registered_without_implementation,
        vec!["DroppedStatement"]
    );
}

#[test]
fn test_excluded_rule_wins_over_enum_binding() {
    let (_temp, mut config) = setup_copy_fixture();
    fs::write(
        config.grammar_dir.join("fragments.gram"),
        "RowOrRows <- 'ROW' / 'ROWS'\n",
    )
    .unwrap();
    let mut registry = fs::read_to_string(&config.registry_file).unwrap();
    registry.push_str("RegisterEnum<RowOrRows>(\"RowOrRows\", values);\n");
    fs::write(&config.registry_file, registry).unwrap();

    config.exclusions = Some(vec!["RowOrRows".to_string()]);
    let outcome = run_audit(&config).unwrap();
    assert_eq!(state_of(&outcome, "RowOrRows"), CoverageState::Excluded);
    assert_eq!(outcome.report.totals.enum_bound, 0);
}

#[test]
fn test_builtin_exclusions_apply_by_default() {
    let (_temp, mut config) = setup_copy_fixture();
    fs::write(
        config.grammar_dir.join("fragments.gram"),
        "IfNotExists <- 'IF' 'NOT' 'EXISTS'\n",
    )
    .unwrap();

    config.exclusions = None;
    assert!(Exclusions::builtin().contains("IfNotExists"));
    let outcome = run_audit(&config).unwrap();
    assert_eq!(state_of(&outcome, "IfNotExists"), CoverageState::Excluded);
}

#[test]
fn test_stub_synthesis_end_to_end() {
    let (_temp, config) = setup_copy_fixture();
    fs::write(
        config.grammar_dir.join("vacuum.gram"),
        "VacuumStatement <- 'VACUUM' TableName?\n",
    )
    .unwrap();
    // Target exists for vacuum, so a full stub is generated
    fs::write(config.impl_dir.join("transform_vacuum.cpp"), "// empty\n").unwrap();
    // A second missing rule whose target file does not exist
    fs::write(
        config.grammar_dir.join("attach.gram"),
        "AttachStatement <- 'ATTACH'\n",
    )
    .unwrap();

    let outcome = run_audit(&config).unwrap();
    let batch = synthesize_stubs(&config, &outcome);

    assert_eq!(batch.stubs.len(), 1);
    assert_eq!(batch.stubs[0].rule, "VacuumStatement");
    assert_eq!(batch.stubs[0].target_file, "transform_vacuum.cpp");
    assert!(
        batch.stubs[0]
            .implementation
            .as_ref()
            .unwrap()
            .contains("TransformVacuumStatement has not yet been implemented")
    );

    assert_eq!(batch.skipped.len(), 1);
    assert_eq!(batch.skipped[0].rule, "AttachStatement");
    assert_eq!(batch.skipped[0].target_file, "transform_attach.cpp");
}

#[test]
fn test_unreadable_grammar_file_is_skipped_not_fatal() {
    let (_temp, config) = setup_copy_fixture();
    // A directory with a .gram extension cannot be read as a file
    fs::create_dir(config.grammar_dir.join("broken.gram")).unwrap();

    let outcome = run_audit(&config).unwrap();
    assert!(
        outcome
            .report
            .messages
            .iter()
            .any(|m| m.contains("broken.gram"))
    );
    // The healthy file still contributes its rules
    assert_eq!(outcome.report.totals.scanned, 2);
}

#[test]
fn test_duplicate_definitions_are_reported() {
    let (_temp, config) = setup_copy_fixture();
    fs::write(
        config.grammar_dir.join("zz_copy_again.gram"),
        "CopyTable <- SomethingElse\n",
    )
    .unwrap();

    let outcome = run_audit(&config).unwrap();
    assert_eq!(outcome.report.duplicates.len(), 1);
    assert_eq!(outcome.report.duplicates[0].name, "CopyTable");
    assert_eq!(outcome.report.duplicates[0].first_file, "copy.gram");
    assert_eq!(
        outcome.report.duplicates[0].second_file,
        "zz_copy_again.gram"
    );
}

#[test]
fn test_config_file_round_trip() {
    let (temp, _config) = setup_copy_fixture();
    let config_path = temp.path().join("audit.toml");
    fs::write(
        &config_path,
        format!(
            "grammar_dir = {:?}\nregistry_file = {:?}\nimpl_dir = {:?}\nexclusions = []\n",
            temp.path().join("grammar/statements"),
            temp.path().join("transformer/peg_transformer_factory.cpp"),
            temp.path().join("transformer"),
        ),
    )
    .unwrap();

    let loaded = AuditConfig::load(&config_path).unwrap();
    let outcome = run_audit(&loaded).unwrap();
    assert!(!outcome.report.has_missing());
}
