//! Integration tests for the CSV table loader.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use tempfile::TempDir;

use common::TestResult;
use tickframe::{load_csv_table, load_file, EncodingTag, ErrorKind, LoadOptions, Pattern};

const TRADES: &str = "\
ts,trade_date,symbol,price,size
2017-03-15 09:30:00.25,2017-03-15,AAPL,139.9,100
2017-03-15 09:30:01,2017-03-15,MSFT,,200
,2017-03-16,AAPL,140.05,300
";

#[test]
fn timestamp_columns_chosen_by_prefix() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("trades.csv");
    std::fs::write(&path, TRADES)?;

    let table = load_csv_table(&path, &Pattern::new("ts|trade_")?)?;
    assert_eq!(table.row_count(), 3);

    let ts = table.column("ts").unwrap().as_timestamp().unwrap();
    assert_eq!(
        ts.value(0).unwrap().to_string(),
        "2017-03-15 09:30:00.250 UTC"
    );
    assert_eq!(ts.value(2), None);

    let dates = table.column("trade_date").unwrap().as_timestamp().unwrap();
    assert_eq!(dates.value(2).unwrap().to_rfc3339(), "2017-03-16T00:00:00+00:00");

    let symbol = table.column("symbol").unwrap().as_category().unwrap();
    assert_eq!(symbol.labels(), &["AAPL".to_string(), "MSFT".to_string()]);
    assert_eq!(symbol.codes(), &[0, 1, 0]);

    let price = table.column("price").unwrap().as_float64().unwrap();
    assert_eq!(price[0], 139.9);
    assert!(price[1].is_nan());

    assert_eq!(table.column("size").unwrap().as_int64().unwrap(), &[100, 200, 300]);
    Ok(())
}

#[test]
fn no_timestamp_pattern_leaves_text() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("trades.csv");
    std::fs::write(&path, TRADES)?;

    let table = load_csv_table(&path, &Pattern::Never)?;
    assert_eq!(table.column("ts").unwrap().tag(), EncodingTag::Category);
    Ok(())
}

#[test]
fn unparseable_timestamp_is_format_error() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("bad.csv");
    std::fs::write(&path, "ts,v\nnoon,1\n")?;

    let err = load_csv_table(&path, &Pattern::Always).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    Ok(())
}

#[test]
fn load_file_applies_index_to_csv() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("trades.csv");
    std::fs::write(&path, TRADES)?;

    let options = LoadOptions::new()
        .timestamps(Pattern::new("ts")?)
        .index("ts");
    let table = load_file(&path, &options)?;
    assert_eq!(table.index_name(), Some("ts"));
    assert_eq!(
        table.column_names().collect::<Vec<_>>(),
        vec!["trade_date", "symbol", "price", "size"]
    );
    Ok(())
}

#[test]
fn missing_csv_is_io_error() {
    let err = load_csv_table(
        std::path::Path::new("/nonexistent/trades.csv"),
        &Pattern::Never,
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}
