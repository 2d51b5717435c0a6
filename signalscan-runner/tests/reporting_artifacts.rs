use signalscan_core::data::SyntheticProvider;
use signalscan_runner::{
    export_frame_csv, export_report_json, import_report_json, load_report, save_report, ScanConfig,
    Scanner, SourceKind,
};
use std::sync::Arc;

fn synthetic_report(symbols: &[&str]) -> signalscan_runner::ScanReport {
    let mut config = ScanConfig::default();
    config.fetch.source = SourceKind::Synthetic;
    let symbols: Vec<String> = symbols.iter().map(|s| s.to_string()).collect();
    Scanner::new(Arc::new(SyntheticProvider::new()), config)
        .unwrap()
        .scan(&symbols)
}

#[test]
fn test_save_report_bundle() {
    let temp_dir = tempfile::tempdir().unwrap();
    let report = synthetic_report(&["BTC-USD", "^GSPC"]);

    save_report(&report, temp_dir.path()).unwrap();
    assert!(temp_dir.path().join("report.json").exists());
    assert!(temp_dir.path().join("summary.txt").exists());
    assert!(temp_dir.path().join("BTC-USD.csv").exists());
    assert!(temp_dir.path().join("_GSPC.csv").exists());

    let summary = std::fs::read_to_string(temp_dir.path().join("summary.txt")).unwrap();
    assert!(summary.starts_with("ASSET"));
    assert!(summary.contains("BTC-USD"));

    let loaded = load_report(temp_dir.path()).unwrap();
    assert_eq!(loaded, report);
}

#[test]
fn test_json_roundtrip_keeps_undefined_values() {
    let report = synthetic_report(&["ETH-USD"]);
    let json = export_report_json(&report).unwrap();
    assert!(json.contains("\"schema_version\": 1"));
    // Warm-up rows carry nulls, not zeros.
    assert!(json.contains("\"sma_slow\": null"));
    assert_eq!(import_report_json(&json).unwrap(), report);
}

#[test]
fn test_frame_csv_shape() {
    let report = synthetic_report(&["AAPL"]);
    let frame = report.frame("AAPL").unwrap();
    let csv = export_frame_csv(frame).unwrap();
    let mut lines = csv.lines();

    let header = lines.next().unwrap();
    assert!(header.starts_with("timestamp,open,high,low,close,volume,sma_fast,sma_slow"));
    assert!(header.ends_with("score,signal,buy_event"));
    assert_eq!(csv.lines().count(), frame.rows.len() + 1);

    // First row: every indicator cell is empty.
    let first: Vec<&str> = lines.next().unwrap().split(',').collect();
    assert_eq!(first.len(), 17);
    assert!(first[6..14].iter().all(|c| c.is_empty()));
    assert_eq!(first[15], "HOLD");
    assert_eq!(first[16], "false");
}
