//! Tabular report output — column/row model with CSV and JSON export,
//! and a catalog that keeps generated reports addressable by name.

use std::collections::HashMap;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportTable {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl ReportTable {
    pub fn new(title: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            title: title.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<serde_json::Value>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    pub fn to_csv(&self) -> String {
        let mut csv = self.columns.join(",");
        csv.push('\n');
        for row in &self.rows {
            let cells: Vec<String> = row
                .iter()
                .map(|v| match v {
                    serde_json::Value::String(s) => format!("\"{}\"", s.replace('"', "\"\"")),
                    serde_json::Value::Null => String::new(),
                    other => other.to_string(),
                })
                .collect();
            csv.push_str(&cells.join(","));
            csv.push('\n');
        }
        csv
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut records: Vec<HashMap<String, serde_json::Value>> = Vec::new();
        for row in &self.rows {
            let mut record = HashMap::new();
            for (i, col) in self.columns.iter().enumerate() {
                if let Some(value) = row.get(i) {
                    record.insert(col.clone(), value.clone());
                }
            }
            records.push(record);
        }
        serde_json::to_string_pretty(&records)
    }

    /// Plain-text rendering with columns padded to their widest cell.
    /// Null cells render empty, matching the null-not-error policy for
    /// undefined rates.
    pub fn to_text(&self) -> String {
        let cell_text = |v: &serde_json::Value| match v {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        };

        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.len()).collect();
        let rendered: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect();
        for row in &rendered {
            for (i, cell) in row.iter().enumerate() {
                if cell.len() > widths[i] {
                    widths[i] = cell.len();
                }
            }
        }

        let mut out = format!("{}\n", self.title);
        let header: Vec<String> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{:<width$}", c, width = widths[i]))
            .collect();
        out.push_str(&header.join("  "));
        out.push('\n');
        out.push_str(&"-".repeat(widths.iter().sum::<usize>() + 2 * (widths.len().saturating_sub(1))));
        out.push('\n');
        for row in &rendered {
            let line: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
                .collect();
            out.push_str(line.join("  ").trim_end());
            out.push('\n');
        }
        out
    }
}

/// Generated reports, keyed by report name.
#[derive(Default)]
pub struct ReportCatalog {
    tables: DashMap<String, ReportTable>,
}

impl ReportCatalog {
    pub fn new() -> Self {
        Self {
            tables: DashMap::new(),
        }
    }

    pub fn insert(&self, name: &str, table: ReportTable) {
        self.tables.insert(name.to_string(), table);
    }

    pub fn get(&self, name: &str) -> Option<ReportTable> {
        self.tables.get(name).map(|t| t.clone())
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn export_csv(&self, name: &str) -> Option<String> {
        self.tables.get(name).map(|t| t.to_csv())
    }

    pub fn export_json(&self, name: &str) -> Option<String> {
        self.tables.get(name).and_then(|t| t.to_json().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> ReportTable {
        let mut table = ReportTable::new("Revenue by year", &["year", "revenue", "rate"]);
        table.push_row(vec![json!("2024"), json!(1234.5), json!(0.25)]);
        table.push_row(vec![json!("2025"), json!(10.0), serde_json::Value::Null]);
        table
    }

    #[test]
    fn test_csv_escapes_and_nulls() {
        let mut table = ReportTable::new("t", &["name", "n"]);
        table.push_row(vec![json!("say \"hi\""), serde_json::Value::Null]);
        let csv = table.to_csv();
        assert!(csv.contains("\"say \"\"hi\"\"\","));
        assert!(csv.ends_with(",\n"));
    }

    #[test]
    fn test_json_round_trips_columns() {
        let json = sample().to_json().unwrap();
        let parsed: Vec<std::collections::HashMap<String, serde_json::Value>> =
            serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0]["year"], json!("2024"));
        assert_eq!(parsed[1]["rate"], serde_json::Value::Null);
    }

    #[test]
    fn test_catalog_stores_and_exports() {
        let catalog = ReportCatalog::new();
        catalog.insert("revenue_by_year", sample());
        assert_eq!(catalog.names(), vec!["revenue_by_year".to_string()]);
        assert!(catalog.export_csv("revenue_by_year").unwrap().starts_with("year,revenue,rate"));
        assert!(catalog.export_csv("missing").is_none());
    }

    #[test]
    fn test_text_render_pads_columns() {
        let text = sample().to_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Revenue by year");
        assert!(lines[1].starts_with("year"));
        assert!(lines[3].starts_with("2024"));
    }
}
