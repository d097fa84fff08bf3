use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use newsroom_core::loader::{load_dataset, LoadError};
use newsroom_core::{schema, LoaderConfig};

fn fixture(path: &str) -> String {
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let full_path = base.join("tests/data").join(path);
    fs::read_to_string(&full_path)
        .unwrap_or_else(|err| panic!("failed to read fixture {}: {}", full_path.display(), err))
}

#[test]
fn loads_fixture_with_prefixed_headers() {
    let dataset = load_dataset(&fixture("videos.csv"), &LoaderConfig::default())
        .expect("fixture load failed");

    assert_eq!(dataset.row_count(), 6);
    assert!(dataset.has_format_column());
    assert_eq!(
        dataset.df().get_column_names(),
        [
            schema::DATE,
            schema::TITLE,
            schema::THEME,
            schema::ATTRIBUTION,
            schema::FORMAT
        ]
    );
    assert_eq!(dataset.min_date(), NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
    assert_eq!(dataset.max_date(), NaiveDate::from_ymd_opt(2024, 1, 22).unwrap());
}

#[test]
fn normalizes_lowercase_format_header() {
    let csv = "TANGGAL,JUDUL,TEMA,ATRIBUSI,format\n\
               05-Jan-2024,Judul satu,Tema satu,none,Berita\n";
    let dataset = load_dataset(csv, &LoaderConfig::default()).expect("load failed");

    assert!(dataset.has_format_column());
    let formats = dataset
        .df()
        .column(schema::FORMAT)
        .expect("FORMAT column missing")
        .str()
        .expect("FORMAT not a string column");
    assert_eq!(formats.get(0), Some("Berita"));
}

#[test]
fn format_column_is_optional() {
    let csv = "TANGGAL,JUDUL,TEMA,ATRIBUSI\n\
               05-Jan-2024,Judul satu,Tema satu,none\n";
    let dataset = load_dataset(csv, &LoaderConfig::default()).expect("load failed");
    assert!(!dataset.has_format_column());
}

#[test]
fn malformed_date_aborts_load_with_row_number() {
    let csv = "TANGGAL,JUDUL,TEMA,ATRIBUSI\n\
               05-Jan-2024,Judul satu,Tema satu,none\n\
               2024-01-06,Judul dua,Tema dua,none\n";
    let err = load_dataset(csv, &LoaderConfig::default()).expect_err("load should fail");

    match err {
        LoadError::InvalidDate { row, value } => {
            assert_eq!(row, 3);
            assert_eq!(value, "2024-01-06");
        }
        other => panic!("expected InvalidDate, got {other:?}"),
    }
}

#[test]
fn missing_required_column_is_fatal() {
    let csv = "TANGGAL,JUDUL,TEMA\n05-Jan-2024,Judul,Tema\n";
    let err = load_dataset(csv, &LoaderConfig::default()).expect_err("load should fail");

    match err {
        LoadError::MissingColumn { column } => assert_eq!(column, schema::ATTRIBUTION),
        other => panic!("expected MissingColumn, got {other:?}"),
    }
}

#[test]
fn header_only_input_is_empty() {
    let csv = "TANGGAL,JUDUL,TEMA,ATRIBUSI\n";
    let err = load_dataset(csv, &LoaderConfig::default()).expect_err("load should fail");
    assert!(matches!(err, LoadError::Empty));
}

#[test]
fn custom_prefix_is_stripped() {
    let csv = "sheet_TANGGAL,sheet_JUDUL,sheet_TEMA,sheet_ATRIBUSI\n\
               05-Jan-2024,Judul satu,Tema satu,none\n";
    let config = LoaderConfig {
        column_prefix: "sheet_".to_string(),
    };
    let dataset = load_dataset(csv, &config).expect("load failed");
    assert_eq!(dataset.row_count(), 1);
}
