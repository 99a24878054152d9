#![cfg(feature = "diagnostics")]

use anyhow::Result;
use monofold::diagnostics::{Diagnostic, DiagnosticReport};
use monofold::{
    Count, Covariance, Ema, Histogram, KbnSum, MinMax, P2Quantile, Product, Reducer,
    ReservoirQuantile, Sum, Welford, fold,
};
use serde_json::{Value, json};
use tempfile::TempDir;

fn sample_report() -> Result<DiagnosticReport> {
    let data = [1.0, 2.0, 3.0, 4.0, 5.0];
    let mut report = DiagnosticReport::new();
    report
        .add("sum", &fold(&KbnSum::new(), data))?
        .add("moments", &fold(&Welford::new(), data))?
        .add_with_description("buckets", &fold(&Histogram::new(0.0, 10.0, 2)?, data), "two halves")?
        .add("count", &fold(&Count::<f64>::new(), data))?;
    Ok(report)
}

/* ===== Report contents ===== */

#[test]
fn report_preserves_insertion_order_and_kinds() -> Result<()> {
    let report = sample_report()?;
    assert_eq!(report.len(), 4);
    let kinds: Vec<_> = report.entries().iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec!["KbnSum", "Welford", "Histogram", "Count"]);
    assert_eq!(report.get("moments", "variance"), Some(&json!(2.0)));
    assert_eq!(report.get("buckets", "bins"), Some(&json!([4, 1])));
    assert_eq!(report.get("nope", "mean"), None);
    Ok(())
}

#[test]
fn report_json_layout() -> Result<()> {
    let json = sample_report()?.to_json();
    assert_eq!(json["sum"]["kind"], "KbnSum");
    assert_eq!(json["sum"]["statistics"]["sum"], 15.0);
    assert_eq!(json["buckets"]["description"], "two halves");
    assert!(json["moments"].get("description").is_none());
    assert_eq!(json["count"]["statistics"]["count"], 5);
    Ok(())
}

#[test]
fn duplicate_labels_are_rejected() -> Result<()> {
    let mut report = DiagnosticReport::new();
    report.add("x", &fold(&KbnSum::new(), [1.0]))?;
    let err = report.add("x", &fold(&KbnSum::new(), [2.0])).unwrap_err();
    assert!(err.to_string().contains("duplicate diagnostic label: x"));
    assert!(report.add_with_description("x", &Welford::new(), "again").is_err());

    assert_eq!(report.len(), 1);
    assert_eq!(report.get("x", "sum"), Some(&json!(1.0)));
    assert_eq!(report.to_json()["x"]["statistics"]["sum"], 1.0);
    Ok(())
}

#[test]
fn json_keeps_statistic_and_label_order() -> Result<()> {
    let report = sample_report()?;
    let json = report.to_json();
    let labels: Vec<&str> = json
        .as_object()
        .map(|o| o.keys().map(String::as_str).collect())
        .unwrap_or_default();
    assert_eq!(labels, vec!["sum", "moments", "buckets", "count"]);

    let stats: Vec<&str> = json["moments"]["statistics"]
        .as_object()
        .map(|o| o.keys().map(String::as_str).collect())
        .unwrap_or_default();
    let expected: Vec<&str> = report.entries()[1].statistics.iter().map(|(n, _)| *n).collect();
    assert_eq!(stats, expected);
    assert_eq!(stats.first(), Some(&"count"));
    Ok(())
}

#[test]
fn non_finite_values_export_as_null() -> Result<()> {
    let mut report = DiagnosticReport::new();
    report.add("empty_quantile", &P2Quantile::median())?;
    assert_eq!(report.to_json()["empty_quantile"]["statistics"]["estimate"], Value::Null);
    Ok(())
}

#[test]
fn text_rendering_has_banner_and_stats() -> Result<()> {
    let text = sample_report()?.to_string();
    assert!(text.starts_with("========== Reducer Diagnostics =========="));
    assert!(text.contains("buckets [Histogram] (two halves)"));
    assert!(text.contains("  sum: 15.0"));
    assert!(text.trim_end().ends_with("========================================="));
    Ok(())
}

#[test]
fn every_builtin_reducer_describes_itself() -> Result<()> {
    let pts = [(1.0, 2.0), (2.0, 4.0), (3.0, 6.5)];
    let reducers: Vec<Box<dyn Diagnostic>> = vec![
        Box::new(fold(&KbnSum::new(), [1.0])),
        Box::new(fold(&Welford::new(), [1.0])),
        Box::new(fold(&Ema::new(0.5)?, [1.0, 3.0])),
        Box::new(fold(&Covariance::new(), pts)),
        Box::new(fold(&Histogram::new(0.0, 1.0, 4)?, [0.1])),
        Box::new(fold(&P2Quantile::new(0.9)?, [1.0, 2.0])),
        Box::new(fold(&ReservoirQuantile::new(10, 1)?, [1.0, 2.0])),
        Box::new(fold(&Product::new(), [2.0, 3.0])),
        Box::new(fold(&Count::<f64>::new(), [1.0])),
        Box::new(fold(&Sum::<i32>::new(), [1, 2])),
        Box::new(fold(&MinMax::<i32>::new(), [1, 2])),
    ];
    let mut report = DiagnosticReport::new();
    for (i, r) in reducers.iter().enumerate() {
        assert!(!r.statistics().is_empty(), "{} has no statistics", r.kind());
        report.add(format!("r{i}"), r.as_ref())?;
    }
    assert_eq!(report.len(), reducers.len());
    let product = report.get("r7", "product").and_then(Value::as_f64);
    assert!(product.is_some_and(|p| (p - 6.0).abs() < 1e-12));
    Ok(())
}

/* ===== Export ===== */

#[test]
fn save_to_file_writes_pretty_json() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("report.json");
    let report = sample_report()?;
    report.save_to_file(&path)?;

    let text = std::fs::read_to_string(&path)?;
    assert!(text.contains('\n'), "pretty-printed output spans lines");
    let parsed: Value = serde_json::from_str(&text)?;
    assert_eq!(parsed, report.to_json());
    Ok(())
}

#[test]
fn save_to_missing_directory_fails() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("missing").join("report.json");
    assert!(sample_report()?.save_to_file(path).is_err());
    Ok(())
}

#[test]
fn empty_report() {
    let report = DiagnosticReport::new();
    assert!(report.is_empty());
    assert_eq!(report.to_json(), json!({}));
    report.print();
}

#[test]
fn minmax_statistics_are_optional() -> Result<()> {
    let mut report = DiagnosticReport::new();
    report.add("empty", &MinMax::<f64>::new())?;
    assert_eq!(report.get("empty", "min"), Some(&Value::Null));
    let r = fold(&MinMax::<f64>::new(), [2.0]);
    report.add("one", &r)?;
    assert_eq!(report.get("one", "max"), Some(&json!(2.0)));
    assert_eq!(r.result(), Some((2.0, 2.0)));
    Ok(())
}
