use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use newsroom_core::loader::{load_dataset, Dataset};
use newsroom_core::{
    build_report, schema, ChartOutcome, FilterParams, LoaderConfig, SentimentAnalyzer,
};

fn fixture(path: &str) -> String {
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let full_path = base.join("tests/data").join(path);
    fs::read_to_string(&full_path)
        .unwrap_or_else(|err| panic!("failed to read fixture {}: {}", full_path.display(), err))
}

fn fixture_dataset() -> Dataset {
    load_dataset(&fixture("videos.csv"), &LoaderConfig::default()).expect("fixture load failed")
}

#[test]
fn full_report_over_the_fixture() {
    let dataset = fixture_dataset();
    let analyzer = SentimentAnalyzer::with_builtin_lexicon();

    let report =
        build_report(&dataset, &FilterParams::default(), &analyzer).expect("report failed");

    assert!(report.summary.is_default);
    assert_eq!(report.summary.row_count, 6);
    let body = report.body.expect("report should have a body");

    // Display table: formatted dates, sentiment column, date-descending.
    assert_eq!(
        body.table.get_column_names(),
        [
            schema::DISPLAY_DATE,
            schema::TITLE,
            schema::THEME,
            schema::ATTRIBUTION,
            schema::SENTIMENT
        ]
    );
    let display_dates = body
        .table
        .column(schema::DISPLAY_DATE)
        .expect("display date column missing")
        .str()
        .expect("not a string column");
    assert_eq!(display_dates.get(0), Some("22 Jan 2024"));
    assert_eq!(display_dates.get(5), Some("05 Jan 2024"));

    // Every chart has data; the fixture carries a FORMAT column.
    for outcome in [
        &body.topic_trend,
        &body.source_mentions,
        &body.format_distribution,
        &body.daily_format,
        &body.source_theme,
    ] {
        let df = outcome.table().expect("chart should have a table");
        assert!(df.height() > 0);
    }

    // Sentiment labels cover every record.
    let labeled: u32 = body
        .sentiment_distribution
        .column(schema::COUNT)
        .expect("count column missing")
        .u32()
        .expect("count column not u32")
        .into_no_null_iter()
        .sum();
    assert_eq!(labeled as usize, report.summary.row_count);
}

#[test]
fn empty_view_short_circuits_every_pipeline() {
    let dataset = fixture_dataset();
    let analyzer = SentimentAnalyzer::with_builtin_lexicon();
    let params = FilterParams {
        keyword: Some("kata yang tidak pernah muncul".to_string()),
        ..FilterParams::default()
    };

    let report = build_report(&dataset, &params, &analyzer).expect("report failed");
    assert_eq!(report.summary.row_count, 0);
    assert!(!report.summary.is_default);
    assert!(report.body.is_none());
}

#[test]
fn missing_format_column_becomes_a_chart_notice() {
    let csv = "TANGGAL,JUDUL,TEMA,ATRIBUSI\n\
               05-Jan-2024,Menteri resmikan proyek,Infrastruktur,Menteri A\n\
               10-Jan-2024,\"Buruk, proyek gagal\",Infrastruktur,none\n";
    let dataset = load_dataset(csv, &LoaderConfig::default()).expect("load failed");
    let analyzer = SentimentAnalyzer::with_builtin_lexicon();

    let report =
        build_report(&dataset, &FilterParams::default(), &analyzer).expect("report failed");
    let body = report.body.expect("report should have a body");

    match &body.format_distribution {
        ChartOutcome::ColumnMissing(column) => assert_eq!(column, schema::FORMAT),
        ChartOutcome::Table(_) => panic!("format distribution should be missing"),
    }
    assert!(matches!(&body.daily_format, ChartOutcome::ColumnMissing(_)));

    // The other charts are unaffected.
    assert!(body.topic_trend.table().is_some());
    assert!(body.source_mentions.table().is_some());
}

#[test]
fn keyword_report_carries_the_resolved_summary() {
    let dataset = fixture_dataset();
    let analyzer = SentimentAnalyzer::with_builtin_lexicon();
    let params = FilterParams {
        start: Some(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()),
        end: Some(NaiveDate::from_ymd_opt(2024, 1, 12).unwrap()),
        keyword: Some("proyek".to_string()),
    };

    let report = build_report(&dataset, &params, &analyzer).expect("report failed");
    assert_eq!(report.summary.keyword.as_deref(), Some("proyek"));
    assert_eq!(report.summary.row_count, 2);
    assert!(!report.summary.is_default);
}
