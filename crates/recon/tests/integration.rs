use std::path::PathBuf;

use tally_recon::config::ReconConfig;
use tally_recon::loader::{load_csv, load_csv_file, LoadOptions};
use tally_recon::model::{DiscrepancyEntry, EntryKind, ReconReport, Side, Value};
use tally_recon::{config, run, ComparisonSpec, ReconError, Threshold};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_and_run(config_name: &str) -> ReconReport {
    let dir = fixtures_dir();
    let toml = std::fs::read_to_string(dir.join(config_name)).unwrap();
    let config = ReconConfig::from_toml(&toml).unwrap();

    let load = |ds: &config::DatasetConfig| {
        let options = LoadOptions {
            delimiter: config::delimiter_byte(ds.delimiter).unwrap(),
        };
        load_csv_file(&dir.join(&ds.file), &options)
            .unwrap_or_else(|e| panic!("cannot load {}: {e}", ds.file))
    };
    let source = load(&config.source);
    let target = load(&config.target);

    run(&config.comparison_spec().unwrap(), &source, &target).unwrap()
}

fn mismatch_fields(report: &ReconReport) -> Vec<(String, String)> {
    report
        .entries
        .iter()
        .filter_map(|e| match e {
            DiscrepancyEntry::FieldMismatch { record_id, field, .. } => {
                Some((record_id.to_string(), field.clone()))
            }
            _ => None,
        })
        .collect()
}

// -------------------------------------------------------------------------
// Fixture runs
// -------------------------------------------------------------------------

#[test]
fn customers_fuzzy_run() {
    let report = load_and_run("customers.recon.toml");

    assert_eq!(report.summary.missing_in_target, 1);
    assert_eq!(report.summary.missing_in_source, 1);
    assert_eq!(report.summary.field_mismatches, 2);
    assert_eq!(report.summary.records_with_mismatches, 2);
    assert!(report.duplicate_keys.is_empty());

    assert_eq!(report.entries[0].kind(), EntryKind::MissingInTarget);
    assert_eq!(report.entries[0].record_id().to_string(), "1");
    assert_eq!(report.entries[1].kind(), EntryKind::MissingInSource);
    assert_eq!(report.entries[1].record_id().to_string(), "6");

    // "bob " vs "Bob" normalizes equal; one typo in a 16-char email is within 0.9
    assert_eq!(
        mismatch_fields(&report),
        vec![("3".to_string(), "Name".to_string()), ("4".to_string(), "City".to_string())]
    );
}

#[test]
fn customers_raw_values_survive() {
    let report = load_and_run("customers.recon.toml");
    let carol = report
        .entries
        .iter()
        .find(|e| e.kind() == EntryKind::FieldMismatch && e.record_id().to_string() == "3")
        .unwrap();
    match carol {
        DiscrepancyEntry::FieldMismatch { source_value, target_value, .. } => {
            assert_eq!(source_value, &Value::from("Carol"));
            assert_eq!(target_value, &Value::from("Caroline"));
        }
        _ => unreachable!(),
    }
}

#[test]
fn composite_key_tsv_run() {
    let report = load_and_run("orders.recon.toml");

    let missing: Vec<(EntryKind, String)> = report
        .entries
        .iter()
        .filter(|e| e.kind() != EntryKind::FieldMismatch)
        .map(|e| (e.kind(), e.record_id().to_string()))
        .collect();
    assert_eq!(
        missing,
        vec![
            (EntryKind::MissingInTarget, "1003|1".to_string()),
            (EntryKind::MissingInSource, "1004|1".to_string()),
        ]
    );
    assert_eq!(
        mismatch_fields(&report),
        vec![("1001|2".to_string(), "sku".to_string()), ("1002|1".to_string(), "qty".to_string())]
    );
}

// -------------------------------------------------------------------------
// Threshold behaviour on real data
// -------------------------------------------------------------------------

fn customers() -> (tally_recon::Dataset, tally_recon::Dataset) {
    let dir = fixtures_dir();
    let opts = LoadOptions::default();
    (
        load_csv_file(&dir.join("customers-source.csv"), &opts).unwrap(),
        load_csv_file(&dir.join("customers-target.csv"), &opts).unwrap(),
    )
}

fn spec_at(threshold: f64) -> ComparisonSpec {
    ComparisonSpec::new(vec!["ID".into()], None, Threshold::new(threshold).unwrap()).unwrap()
}

#[test]
fn stricter_threshold_reports_more() {
    let (source, target) = customers();
    let exact = run(&spec_at(1.0), &source, &target).unwrap();
    let default = run(&spec_at(0.9), &source, &target).unwrap();
    let loose = run(&spec_at(0.7), &source, &target).unwrap();

    assert_eq!(exact.summary.field_mismatches, 3);
    assert_eq!(default.summary.field_mismatches, 2);
    assert_eq!(loose.summary.field_mismatches, 1);

    // missing records do not depend on the threshold
    for r in [&exact, &default, &loose] {
        assert_eq!(r.summary.missing_in_target, 1);
        assert_eq!(r.summary.missing_in_source, 1);
    }
}

#[test]
fn repeated_runs_serialize_identically() {
    let (source, target) = customers();
    let spec = spec_at(0.9);
    let a = serde_json::to_string(&run(&spec, &source, &target).unwrap()).unwrap();
    let b = serde_json::to_string(&run(&spec, &source, &target).unwrap()).unwrap();
    assert_eq!(a, b);
}

// -------------------------------------------------------------------------
// Adversarial inputs
// -------------------------------------------------------------------------

#[test]
fn adversarial_column_only_in_source() {
    let source = load_csv("ID,Name,Legacy\n1,a,x\n", &LoadOptions::default()).unwrap();
    let target = load_csv("ID,Name\n1,a\n", &LoadOptions::default()).unwrap();

    let spec = ComparisonSpec::new(
        vec!["ID".into()],
        Some(vec!["Legacy".into()]),
        Threshold::EXACT,
    )
    .unwrap();
    let err = run(&spec, &source, &target).unwrap_err();
    assert!(err.is_config_error());
    assert!(matches!(err, ReconError::MissingColumn { side: Side::Target, .. }));
}

#[test]
fn adversarial_duplicate_keys_in_file() {
    let source = load_csv("ID,Name\n1,first\n1,second\n2,b\n", &LoadOptions::default()).unwrap();
    let target = load_csv("ID,Name\n1,first\n2,b\n", &LoadOptions::default()).unwrap();

    let report = run(&spec_at(1.0), &source, &target).unwrap();
    assert_eq!(report.duplicate_keys.len(), 1);
    assert_eq!(report.duplicate_keys[0].count, 2);
    assert_eq!(report.duplicate_keys[0].key.to_string(), "1");
    assert!(report.summary.is_clean());
}

#[test]
fn adversarial_missing_key_column() {
    let source = load_csv("ID,Name\n1,a\n", &LoadOptions::default()).unwrap();
    let target = load_csv("id,Name\n1,a\n", &LoadOptions::default()).unwrap();
    let err = run(&ComparisonSpec::default(), &source, &target).unwrap_err();
    assert!(matches!(err, ReconError::MissingKeyColumn { side: Side::Target, .. }));
}

#[test]
fn adversarial_empty_files() {
    let source = load_csv("ID,Name\n", &LoadOptions::default()).unwrap();
    let target = load_csv("ID,Name\n", &LoadOptions::default()).unwrap();
    let report = run(&ComparisonSpec::default(), &source, &target).unwrap();
    assert!(report.entries.is_empty());
    assert_eq!(report.summary.total(), 0);
}

#[test]
fn adversarial_numeric_formatting_differences() {
    // 7 and 7.0 load as Int and Float but both print as "7"
    let source = load_csv("ID,Amount\n1,7\n", &LoadOptions::default()).unwrap();
    let target = load_csv("ID,Amount\n1,7.0\n", &LoadOptions::default()).unwrap();
    let report = run(&spec_at(1.0), &source, &target).unwrap();
    assert!(report.summary.is_clean());
}

#[test]
fn adversarial_wide_account_numbers() {
    let source = load_csv(
        "ID,Acct\n12345678901234567890,12345678901234567890123\n12345678901234567891,555\n",
        &LoadOptions::default(),
    )
    .unwrap();
    let target = load_csv(
        "ID,Acct\n12345678901234567890,12345678901234567890124\n12345678901234567891,555\n",
        &LoadOptions::default(),
    )
    .unwrap();

    let report = run(&spec_at(1.0), &source, &target).unwrap();

    // distinct 20-digit IDs stay distinct keys
    assert!(report.duplicate_keys.is_empty());
    assert_eq!(report.summary.missing_in_target, 0);
    assert_eq!(report.summary.missing_in_source, 0);

    assert_eq!(report.summary.field_mismatches, 1);
    match &report.entries[0] {
        DiscrepancyEntry::FieldMismatch { record_id, field, source_value, target_value } => {
            assert_eq!(record_id.to_string(), "12345678901234567890");
            assert_eq!(field, "Acct");
            assert_eq!(source_value.to_string(), "12345678901234567890123");
            assert_eq!(target_value.to_string(), "12345678901234567890124");
        }
        other => panic!("unexpected entry: {other:?}"),
    }
}

#[test]
fn adversarial_integer_and_decimal_ids_join() {
    let source = load_csv("ID,Name\n1,Ann\n2,Ben\n", &LoadOptions::default()).unwrap();
    let target = load_csv("ID,Name\n1.0,Ann\n2.0,Bob\n", &LoadOptions::default()).unwrap();

    let report = run(&spec_at(1.0), &source, &target).unwrap();
    assert_eq!(report.summary.missing_in_target, 0);
    assert_eq!(report.summary.missing_in_source, 0);
    assert_eq!(mismatch_fields(&report), vec![("2".to_string(), "Name".to_string())]);
}
