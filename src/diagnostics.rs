//! Human-readable and JSON reports over reducer results.
//!
//! The exporter only reads the public query surface: each reducer that
//! implements [`Diagnostic`] names its kind and lists its statistics as
//! `(name, value)` pairs, and a [`DiagnosticReport`] collects labelled
//! snapshots of them for printing or saving.
//!
//! # Example
//!
//! ```no_run
//! use monofold::diagnostics::DiagnosticReport;
//! use monofold::{Reducer, Welford, Histogram};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut latency = Welford::new();
//! latency.update_all([12.0, 15.0, 11.0, 40.0]);
//! let mut buckets = Histogram::new(0.0, 50.0, 5)?;
//! buckets.update_all([12.0, 15.0, 11.0, 40.0]);
//!
//! let mut report = DiagnosticReport::new();
//! report
//!     .add("latency_ms", &latency)?
//!     .add_with_description("latency_buckets", &buckets, "10 ms buckets")?;
//!
//! report.print();
//! report.save_to_file("report.json")?;
//! # Ok(())
//! # }
//! ```

use crate::reducers::{
    Count, Covariance, Ema, Histogram, KbnSum, Max, Min, MinMax, P2Quantile, Product,
    ReservoirQuantile, Sum, Welford,
};
use anyhow::{Result, bail};
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// A reducer that can describe itself.
pub trait Diagnostic {
    /// Short type name shown in reports.
    fn kind(&self) -> &'static str;

    /// Named statistics in display order. The JSON export keeps this order.
    fn statistics(&self) -> Vec<(&'static str, Value)>;
}

/// One labelled reducer snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct DiagnosticEntry {
    pub label: String,
    pub kind: &'static str,
    pub description: Option<String>,
    pub statistics: Vec<(&'static str, Value)>,
}

/// An ordered collection of reducer snapshots.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DiagnosticReport {
    entries: Vec<DiagnosticEntry>,
}

impl DiagnosticReport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot `reducer`'s statistics under `label`.
    ///
    /// # Errors
    ///
    /// Returns an error if `label` is already in the report.
    pub fn add(&mut self, label: impl Into<String>, reducer: &dyn Diagnostic) -> Result<&mut Self> {
        self.push(label.into(), reducer, None)
    }

    /// Like [`add`](Self::add), with a free-text description.
    ///
    /// # Errors
    ///
    /// Returns an error if `label` is already in the report.
    pub fn add_with_description(
        &mut self,
        label: impl Into<String>,
        reducer: &dyn Diagnostic,
        description: impl Into<String>,
    ) -> Result<&mut Self> {
        self.push(label.into(), reducer, Some(description.into()))
    }

    fn push(
        &mut self,
        label: String,
        reducer: &dyn Diagnostic,
        description: Option<String>,
    ) -> Result<&mut Self> {
        if self.entries.iter().any(|e| e.label == label) {
            bail!("duplicate diagnostic label: {label}");
        }
        self.entries.push(DiagnosticEntry {
            label,
            kind: reducer.kind(),
            description,
            statistics: reducer.statistics(),
        });
        Ok(self)
    }

    pub fn entries(&self) -> &[DiagnosticEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up one statistic by entry label and statistic name.
    pub fn get(&self, label: &str, statistic: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|e| e.label == label)?
            .statistics
            .iter()
            .find(|(name, _)| *name == statistic)
            .map(|(_, v)| v)
    }

    /// `{ label: { "kind": ..., "description": ..., "statistics": { name: value } } }`.
    ///
    /// Labels and statistics keep insertion order. Non-finite floats become
    /// `null`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut report = Map::new();
        for entry in &self.entries {
            let mut obj = Map::new();
            obj.insert("kind".to_string(), json!(entry.kind));
            if let Some(desc) = &entry.description {
                obj.insert("description".to_string(), json!(desc));
            }
            let stats: Map<String, Value> = entry
                .statistics
                .iter()
                .map(|(name, v)| ((*name).to_string(), v.clone()))
                .collect();
            obj.insert("statistics".to_string(), Value::Object(stats));
            report.insert(entry.label.clone(), Value::Object(obj));
        }
        Value::Object(report)
    }

    /// Print the text rendering to stdout.
    pub fn print(&self) {
        println!("{self}");
    }

    /// Write the JSON rendering, pretty-printed, to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written to.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let formatted = serde_json::to_string_pretty(&self.to_json())?;
        let mut file = File::create(path)?;
        file.write_all(formatted.as_bytes())?;
        debug!(path = %path.display(), entries = self.entries.len(), "saved diagnostic report");
        Ok(())
    }
}

impl fmt::Display for DiagnosticReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "========== Reducer Diagnostics ==========")?;
        for entry in &self.entries {
            match &entry.description {
                Some(desc) => writeln!(f, "{} [{}] ({desc})", entry.label, entry.kind)?,
                None => writeln!(f, "{} [{}]", entry.label, entry.kind)?,
            }
            for (name, value) in &entry.statistics {
                writeln!(f, "  {name}: {value}")?;
            }
        }
        write!(f, "=========================================")
    }
}

/* ---------- built-in reducers ---------- */

impl Diagnostic for KbnSum {
    fn kind(&self) -> &'static str {
        "KbnSum"
    }

    fn statistics(&self) -> Vec<(&'static str, Value)> {
        use crate::Reducer;
        vec![
            ("sum", json!(self.result())),
            ("correction", json!(self.correction_component())),
        ]
    }
}

impl Diagnostic for Welford {
    fn kind(&self) -> &'static str {
        "Welford"
    }

    fn statistics(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("count", json!(self.count())),
            ("mean", json!(self.mean())),
            ("variance", json!(self.variance())),
            ("sample_variance", json!(self.sample_variance())),
            ("std_dev", json!(self.std_dev())),
            ("sum", json!(self.sum())),
        ]
    }
}

impl Diagnostic for Ema {
    fn kind(&self) -> &'static str {
        "Ema"
    }

    fn statistics(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("alpha", json!(self.alpha())),
            ("count", json!(self.count())),
            ("mean", json!(self.mean())),
            ("variance", json!(self.variance())),
            ("std_dev", json!(self.std_dev())),
        ]
    }
}

impl Diagnostic for Covariance {
    fn kind(&self) -> &'static str {
        "Covariance"
    }

    fn statistics(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("count", json!(self.count())),
            ("mean_x", json!(self.mean_x())),
            ("mean_y", json!(self.mean_y())),
            ("covariance", json!(self.covariance())),
            ("correlation", json!(self.correlation())),
            ("slope", json!(self.slope())),
            ("intercept", json!(self.intercept())),
            ("r_squared", json!(self.r_squared())),
        ]
    }
}

impl Diagnostic for Histogram {
    fn kind(&self) -> &'static str {
        "Histogram"
    }

    fn statistics(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("range", json!([self.min(), self.max()])),
            ("bins", json!(self.counts())),
            ("underflow", json!(self.underflow())),
            ("overflow", json!(self.overflow())),
            ("nan", json!(self.nan_count())),
            ("total", json!(self.total())),
            ("mean", json!(self.mean())),
            ("median", json!(self.median())),
        ]
    }
}

impl Diagnostic for P2Quantile {
    fn kind(&self) -> &'static str {
        "P2Quantile"
    }

    fn statistics(&self) -> Vec<(&'static str, Value)> {
        use crate::Reducer;
        vec![
            ("p", json!(self.target_quantile())),
            ("count", json!(self.count())),
            ("estimate", json!(self.result())),
        ]
    }
}

impl Diagnostic for ReservoirQuantile {
    fn kind(&self) -> &'static str {
        "ReservoirQuantile"
    }

    fn statistics(&self) -> Vec<(&'static str, Value)> {
        let qs = self.quantiles(&[0.25, 0.5, 0.75]);
        vec![
            ("count", json!(self.count())),
            ("sample_size", json!(self.sample().len())),
            ("q1", json!(qs[0])),
            ("median", json!(qs[1])),
            ("q3", json!(qs[2])),
            ("mean", json!(self.mean())),
        ]
    }
}

impl Diagnostic for Product {
    fn kind(&self) -> &'static str {
        "Product"
    }

    fn statistics(&self) -> Vec<(&'static str, Value)> {
        use crate::Reducer;
        vec![
            ("product", json!(self.result())),
            ("log_magnitude", json!(self.log_magnitude())),
        ]
    }
}

impl<T> Diagnostic for Count<T> {
    fn kind(&self) -> &'static str {
        "Count"
    }

    fn statistics(&self) -> Vec<(&'static str, Value)> {
        use crate::Reducer;
        vec![("count", json!(self.result()))]
    }
}

impl<T> Diagnostic for Sum<T>
where
    T: Clone + Default + std::ops::Add<Output = T> + Serialize,
{
    fn kind(&self) -> &'static str {
        "Sum"
    }

    fn statistics(&self) -> Vec<(&'static str, Value)> {
        use crate::Reducer;
        vec![("sum", json!(self.result()))]
    }
}

impl<T: Clone + PartialOrd + Serialize> Diagnostic for Min<T> {
    fn kind(&self) -> &'static str {
        "Min"
    }

    fn statistics(&self) -> Vec<(&'static str, Value)> {
        use crate::Reducer;
        vec![("min", json!(self.result()))]
    }
}

impl<T: Clone + PartialOrd + Serialize> Diagnostic for Max<T> {
    fn kind(&self) -> &'static str {
        "Max"
    }

    fn statistics(&self) -> Vec<(&'static str, Value)> {
        use crate::Reducer;
        vec![("max", json!(self.result()))]
    }
}

impl<T: Clone + PartialOrd + Serialize> Diagnostic for MinMax<T> {
    fn kind(&self) -> &'static str {
        "MinMax"
    }

    fn statistics(&self) -> Vec<(&'static str, Value)> {
        vec![("min", json!(self.min())), ("max", json!(self.max()))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Reducer;

    #[test]
    fn text_lists_every_statistic() -> Result<()> {
        let mut w = Welford::new();
        w.update_all([1.0, 2.0, 3.0]);
        let mut report = DiagnosticReport::new();
        report.add("w", &w)?;
        let text = report.to_string();
        assert!(text.contains("w [Welford]"));
        assert!(text.contains("  mean: 2.0"));
        assert!(text.contains("  count: 3"));
        Ok(())
    }
}
