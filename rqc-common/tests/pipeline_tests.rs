//! Upload → extract → classify pipeline tests against the shipped model
//!
//! Covers:
//! - N data rows produce N results in row order
//! - Empty spreadsheets produce no results
//! - Missing requirement column is a parse error
//! - Identical input yields identical output

use rqc_common::model::{classify_rows, load_model};
use rqc_common::sheet::RowExtractor;
use rqc_common::{Classifier, Error, Label};
use std::path::Path;

const SHIPPED_MODEL: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../models/model.json");

const SAMPLE_CSV: &[u8] = b"id,requirement,priority
1,The system shall allow users to create new accounts,high
2,All stored passwords must be encrypted,high
3,Users must be able to export reports to PDF,low
4,The application should be available 99.9% of the time,medium
";

#[test]
fn test_shipped_model_loads() {
    let model = load_model(Path::new(SHIPPED_MODEL)).unwrap();
    let info = model.info();
    assert_eq!(info.labels, vec![Label::Functional, Label::NonFunctional]);
    assert_eq!(info.ngram_range, (1, 2));
    assert!(info.vocabulary_size > 100);
}

#[test]
fn test_csv_rows_classified_in_order() {
    let model = load_model(Path::new(SHIPPED_MODEL)).unwrap();
    let rows = RowExtractor::default().extract("reqs.csv", SAMPLE_CSV).unwrap();
    assert_eq!(rows.len(), 4);

    let results = classify_rows(&model, rows).unwrap();

    assert_eq!(results.len(), 4);
    let labels: Vec<Label> = results.iter().map(|r| r.label).collect();
    assert_eq!(
        labels,
        vec![
            Label::Functional,
            Label::NonFunctional,
            Label::Functional,
            Label::NonFunctional
        ]
    );
    let source_rows: Vec<usize> = results.iter().map(|r| r.row.source_row).collect();
    assert_eq!(source_rows, vec![2, 3, 4, 5]);
}

#[test]
fn test_same_file_twice_is_identical() {
    let model = load_model(Path::new(SHIPPED_MODEL)).unwrap();
    let extractor = RowExtractor::default();

    let first = classify_rows(&model, extractor.extract("a.csv", SAMPLE_CSV).unwrap()).unwrap();
    let second = classify_rows(&model, extractor.extract("a.csv", SAMPLE_CSV).unwrap()).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_blank_rows_skipped_but_blank_requirement_kept() {
    let csv = b"requirement,owner\nLogin page,ann\n,\n,bob\nExport data,cy\n";
    let rows = RowExtractor::default().extract("reqs.csv", csv).unwrap();

    let texts: Vec<&str> = rows.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, vec!["Login page", "", "Export data"]);
    let indexes: Vec<usize> = rows.iter().map(|r| r.index).collect();
    assert_eq!(indexes, vec![0, 1, 2]);
    assert_eq!(rows[1].source_row, 4);
}

#[test]
fn test_empty_spreadsheets_yield_no_results() {
    let model = load_model(Path::new(SHIPPED_MODEL)).unwrap();
    let extractor = RowExtractor::default();

    for (name, bytes) in [
        ("empty.csv", &b""[..]),
        ("header_only.csv", &b"requirement\n"[..]),
    ] {
        let rows = extractor.extract(name, bytes).unwrap();
        let results = classify_rows(&model, rows).unwrap();
        assert!(results.is_empty(), "{} produced results", name);
    }
}

#[test]
fn test_missing_column_is_parse_error() {
    let err = RowExtractor::default()
        .extract("reqs.csv", b"id,text\n1,Login\n")
        .unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
    assert!(err.to_string().contains("Column 'requirement' not found"));
}

#[test]
fn test_xlsx_upload_classified() {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "Requirement").unwrap();
    sheet
        .write_string(1, 0, "The system shall support 1000 concurrent users")
        .unwrap();
    sheet
        .write_string(2, 0, "The system shall display the order history")
        .unwrap();
    let bytes = workbook.save_to_buffer().unwrap();

    let model = load_model(Path::new(SHIPPED_MODEL)).unwrap();
    let rows = RowExtractor::default().extract("reqs.xlsx", &bytes).unwrap();
    let results = classify_rows(&model, rows).unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].label, Label::NonFunctional);
    assert_eq!(results[1].label, Label::Functional);
}

#[test]
fn test_non_spreadsheet_rejected() {
    let extractor = RowExtractor::default();

    let err = extractor.extract("photo.jpg", &[0xFF, 0xD8, 0xFF, 0xE0]).unwrap_err();
    assert!(matches!(err, Error::UnsupportedFile(_)));

    let err = extractor
        .extract("renamed.xlsx", b"requirement\nLogin\n")
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedFile(_)));
}
