mod common;

use std::fs;
use std::path::Path;

use common::{config, date, temp_path};
use focusgen_pipeline::validate::EXPECTED_COLUMNS;
use focusgen_pipeline::{
    Pipeline, PipelineError, ReduceOptions, ValidateOptions, reduce_csv, validate_output,
};

fn write_template(path: &Path, rows: usize) {
    let mut writer = csv::Writer::from_path(path).expect("create template");
    writer.write_record(EXPECTED_COLUMNS).expect("header");
    for row in 0..rows {
        let record: Vec<String> = EXPECTED_COLUMNS
            .iter()
            .map(|column| format!("{column}-{row}"))
            .collect();
        writer.write_record(&record).expect("row");
    }
    writer.flush().expect("flush template");
}

fn window_options() -> ValidateOptions {
    ValidateOptions {
        window: Some((date(2024, 7, 1), date(2024, 12, 31))),
        ..ValidateOptions::default()
    }
}

#[test]
fn csv_run_writes_header_and_enriched_rows() {
    let dir = temp_path("csv_run");
    let input = dir.join("focus.csv");
    let output = dir.join("mock.csv");
    write_template(&input, 200);

    // 6 months x 4 providers x (4 / 2 = 2 rows) x 2 workers
    let mut config = config(4, 2, 25);
    config.input = input.clone();
    config.output = output.clone();
    let report = Pipeline::new(config).expect("pipeline").run_csv().expect("run");

    assert_eq!(report.rows_written, 96);
    assert_eq!(report.batches, 4);

    let mut reader = csv::Reader::from_path(&output).expect("open output");
    let header: Vec<String> = reader
        .headers()
        .expect("header")
        .iter()
        .map(str::to_string)
        .collect();
    assert_eq!(header, EXPECTED_COLUMNS);

    let rows: Vec<csv::StringRecord> = reader
        .records()
        .collect::<Result<_, _>>()
        .expect("rows");
    assert_eq!(rows.len(), 96);

    let provider_idx = header.iter().position(|c| c == "ProviderName").expect("column");
    let publisher_idx = header.iter().position(|c| c == "PublisherName").expect("column");
    let zone_idx = header.iter().position(|c| c == "AvailabilityZone").expect("column");
    for row in &rows {
        assert_eq!(row.get(provider_idx), row.get(publisher_idx));
        assert!(row.get(zone_idx).is_some_and(|zone| zone.starts_with("AvailabilityZone-")));
    }

    let bytes = fs::metadata(&output).expect("metadata").len();
    assert_eq!(report.bytes_written, Some(bytes));
}

#[test]
fn generated_file_passes_validation() {
    let dir = temp_path("validate_ok");
    let input = dir.join("focus.csv");
    let output = dir.join("mock.csv");
    write_template(&input, 100);

    let mut config = config(8, 4, 10);
    config.input = input;
    config.output = output.clone();
    Pipeline::new(config).expect("pipeline").run_csv().expect("run");

    let report = validate_output(&output, &window_options()).expect("validate");
    assert!(report.is_valid(), "{:?}", report.failures().collect::<Vec<_>>());
    assert_eq!(report.rows_sampled, 100);
}

#[test]
fn validation_samples_rows_from_every_schedule_slot() {
    let dir = temp_path("validate_spread");
    let input = dir.join("focus.csv");
    let output = dir.join("mock.csv");
    write_template(&input, 12_000);

    // 1_200 rows per worker per slot: the first 1_200 rows are all AWS.
    let mut config = config(2_400, 2, 500);
    config.input = input;
    config.output = output.clone();
    let run = Pipeline::new(config).expect("pipeline").run_csv().expect("run");
    assert_eq!(run.rows_written, 12_000);

    let options = ValidateOptions {
        sample_size: 500,
        seed: Some(11),
        ..window_options()
    };
    let report = validate_output(&output, &options).expect("validate");
    assert!(report.is_valid(), "{:?}", report.failures().collect::<Vec<_>>());
    assert_eq!(report.rows_scanned, 12_000);
    assert_eq!(report.rows_sampled, 500);
}

#[test]
fn reduced_file_stays_valid_and_near_target() {
    let dir = temp_path("reduce");
    let input = dir.join("focus.csv");
    let output = dir.join("mock.csv");
    let reduced = dir.join("mock-reduced.csv");
    write_template(&input, 4_000);

    let mut config = config(1_000, 2, 500);
    config.input = input;
    config.output = output.clone();
    Pipeline::new(config).expect("pipeline").run_csv().expect("run");

    let full = fs::metadata(&output).expect("metadata").len();
    let options = ReduceOptions {
        target_bytes: full / 3,
        seed: Some(21),
    };
    let report = reduce_csv(&output, &reduced, &options).expect("reduce");

    assert_eq!(report.rows_read, 4_000);
    assert!(report.rows_kept > 1_000 && report.rows_kept < 1_700, "{}", report.rows_kept);
    let size = fs::metadata(&reduced).expect("metadata").len();
    assert_eq!(report.bytes_written, Some(size));
    assert!(size > full / 4 && size < full / 2);

    let validation = validate_output(&reduced, &window_options()).expect("validate");
    assert!(validation.is_valid(), "{:?}", validation.failures().collect::<Vec<_>>());
    assert_eq!(validation.rows_scanned, report.rows_kept);
}

#[test]
fn raw_template_fails_validation() {
    let dir = temp_path("validate_bad");
    let input = dir.join("focus.csv");
    write_template(&input, 10);

    let report = validate_output(&input, &window_options()).expect("validate");
    let failed: Vec<&str> = report.failures().map(|check| check.name.as_str()).collect();
    assert_eq!(failed, vec!["billing_period_format", "providers"]);
}

#[test]
fn header_only_file_is_reported_empty() {
    let dir = temp_path("validate_empty");
    let input = dir.join("focus.csv");
    write_template(&input, 0);

    let report = validate_output(&input, &ValidateOptions::default()).expect("validate");
    let failed: Vec<&str> = report.failures().map(|check| check.name.as_str()).collect();
    assert_eq!(failed, vec!["providers", "non_empty"]);
}

#[test]
fn missing_input_fails_with_source_open() {
    let dir = temp_path("missing_input");
    let mut config = config(8, 4, 10);
    config.input = dir.join("absent.csv");
    config.output = dir.join("mock.csv");

    let err = Pipeline::new(config).expect("pipeline").run_csv().expect_err("missing input");
    assert!(matches!(err, PipelineError::SourceOpen { .. }));
}

#[test]
fn short_template_is_rejected_before_writing() {
    let dir = temp_path("short_template");
    let input = dir.join("narrow.csv");
    fs::write(&input, "a,b,c\n1,2,3\n").expect("write input");
    let mut config = config(8, 4, 10);
    config.input = input;
    config.output = dir.join("mock.csv");

    let err = Pipeline::new(config).expect("pipeline").run_csv().expect_err("narrow template");
    assert!(matches!(err, PipelineError::Layout(_)));
    assert!(!dir.join("mock.csv").exists());
}
