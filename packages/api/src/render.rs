//! Report rendering
//!
//! Every result type renders either as pretty JSON (its serde form) or as
//! human-readable text: aligned tables, key/value summaries and the
//! YAML-like schema outline.

use std::fmt::Write as _;

use clap::ValueEnum;
use entscan_engine::join::JoinResult;
use entscan_engine::lookup::LookupOutcome;
use entscan_engine::query::{
    AggregateFunction, AggregateResult, CountResult, DistributionResult, GroupByResult, QueryResult,
    StatsResult,
};
use entscan_engine::relationships::{IdFieldSummary, RelationshipReport};
use entscan_engine::sample::SampleResult;
use entscan_engine::schema::SchemaNode;
use serde::{Serialize, Serializer};

const IGNORED_FILTER_NOTE: &str = "note: filter ignored (no comparison operator recognized)";
const BAR_WIDTH: usize = 30;

/// Output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Tables and summaries for terminals
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

/// A result that can be printed as text or JSON
pub trait Render: Serialize {
    fn render_text(&self) -> String;
}

/// Render `value` in `format`. Text output always ends with a newline.
///
/// # Errors
///
/// Returns a serialization error if the value cannot be encoded as JSON.
pub fn render<T: Render>(value: &T, format: Format) -> serde_json::Result<String> {
    match format {
        Format::Text => Ok(value.render_text()),
        Format::Json => {
            let mut out = serde_json::to_string_pretty(value)?;
            out.push('\n');
            Ok(out)
        }
    }
}

/// Compact display of a floating point result
fn number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

fn percent(part: u64, whole: u64) -> String {
    if whole == 0 {
        return "0.0%".to_string();
    }
    format!("{:.1}%", part as f64 / whole as f64 * 100.0)
}

fn footer(out: &mut String, filter_ignored: bool) {
    if filter_ignored {
        out.push_str(IGNORED_FILTER_NOTE);
        out.push('\n');
    }
}

/// Column-aligned text table
#[derive(Debug, Default)]
struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    /// Columns right-aligned (numbers)
    numeric: Vec<bool>,
}

impl Table {
    fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = (S, bool)>,
        S: Into<String>,
    {
        let (headers, numeric) = headers.into_iter().map(|(h, n)| (h.into(), n)).unzip();
        Self {
            headers,
            rows: Vec::new(),
            numeric,
        }
    }

    fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        self.line(&mut out, &self.headers, &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        self.line(&mut out, &rule, &widths);
        for row in &self.rows {
            self.line(&mut out, row, &widths);
        }
        out
    }

    fn line(&self, out: &mut String, cells: &[String], widths: &[usize]) {
        let mut text = String::new();
        for (column, (cell, width)) in cells.iter().zip(widths).enumerate() {
            if column > 0 {
                text.push_str("  ");
            }
            let pad = width.saturating_sub(cell.chars().count());
            if self.numeric.get(column).copied().unwrap_or(false) {
                text.push_str(&" ".repeat(pad));
                text.push_str(cell);
            } else {
                text.push_str(cell);
                text.push_str(&" ".repeat(pad));
            }
        }
        out.push_str(text.trim_end());
        out.push('\n');
    }
}

impl Render for CountResult {
    fn render_text(&self) -> String {
        let mut out = format!("count: {}\nscanned: {}\n", self.total, self.scanned);
        footer(&mut out, self.filter_ignored);
        out
    }
}

impl Render for GroupByResult {
    fn render_text(&self) -> String {
        let mut table = Table::new([("value", false), ("count", true), ("share", true)]);
        for (key, count) in &self.groups {
            table.row(vec![key.clone(), count.to_string(), percent(*count, self.total)]);
        }
        let mut out = table.render();
        let _ = writeln!(
            out,
            "\n{} distinct values over {} elements (scanned {})",
            self.unique_values, self.total, self.scanned
        );
        footer(&mut out, self.filter_ignored);
        out
    }
}

impl Render for StatsResult {
    fn render_text(&self) -> String {
        let mut out = String::new();
        for (label, value) in [
            ("count", self.count.to_string()),
            ("sum", number(self.sum)),
            ("avg", number(self.avg)),
            ("min", number(self.min)),
            ("max", number(self.max)),
            ("scanned", self.scanned.to_string()),
        ] {
            let _ = writeln!(out, "{label:<8}{value}");
        }
        footer(&mut out, self.filter_ignored);
        out
    }
}

impl Render for DistributionResult {
    fn render_text(&self) -> String {
        let peak = self.buckets.iter().map(|b| b.count).max().unwrap_or(0);
        let mut table = Table::new([("range", false), ("count", true), ("share", true), ("", false)]);
        for bucket in &self.buckets {
            let bar = if peak == 0 {
                0
            } else {
                (bucket.count as f64 / peak as f64 * BAR_WIDTH as f64).round() as usize
            };
            table.row(vec![
                format!("[{}, {})", number(bucket.start), number(bucket.end)),
                bucket.count.to_string(),
                format!("{:.1}%", bucket.percentage),
                "#".repeat(bar),
            ]);
        }
        let mut out = if self.buckets.is_empty() {
            "no numeric values\n".to_string()
        } else {
            table.render()
        };
        let _ = writeln!(
            out,
            "\n{} values, min {}, max {} (scanned {})",
            self.total,
            number(self.min),
            number(self.max),
            self.scanned
        );
        footer(&mut out, self.filter_ignored);
        out
    }
}

impl Render for QueryResult {
    fn render_text(&self) -> String {
        let mut out = String::new();
        for item in &self.items {
            let _ = writeln!(out, "{item}");
        }
        let _ = writeln!(
            out,
            "\n{} shown, {} matched, {} scanned",
            self.items.len(),
            self.total_matched,
            self.total_scanned
        );
        footer(&mut out, self.filter_ignored);
        out
    }
}

/// An [`AggregateResult`] with the columns to show as text
#[derive(Debug, Clone)]
pub struct AggregateReport<'a> {
    pub result: &'a AggregateResult,
    pub functions: Vec<AggregateFunction>,
}

impl<'a> AggregateReport<'a> {
    /// Show `functions`, or every function when empty
    #[must_use]
    pub fn new(result: &'a AggregateResult, functions: Vec<AggregateFunction>) -> Self {
        let functions = if functions.is_empty() {
            AggregateFunction::ALL.to_vec()
        } else {
            functions
        };
        Self { result, functions }
    }
}

impl Serialize for AggregateReport<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.result.serialize(serializer)
    }
}

impl Render for AggregateReport<'_> {
    fn render_text(&self) -> String {
        let columns = std::iter::once(("group", false))
            .chain(std::iter::once(("elements", true)))
            .chain(self.functions.iter().map(|f| (f.as_str(), true)));
        let mut table = Table::new(columns);
        for group in &self.result.groups {
            let mut cells = vec![group.key.clone(), group.elements.to_string()];
            cells.extend(self.functions.iter().map(|f| number(group.value(*f))));
            table.row(cells);
        }
        let mut out = table.render();
        let _ = writeln!(
            out,
            "\n{} groups over {} elements (scanned {})",
            self.result.groups.len(),
            self.result.total,
            self.result.scanned
        );
        footer(&mut out, self.result.filter_ignored);
        out
    }
}

impl Render for AggregateResult {
    fn render_text(&self) -> String {
        AggregateReport::new(self, Vec::new()).render_text()
    }
}

impl Render for SampleResult {
    fn render_text(&self) -> String {
        let mut out = String::new();
        for item in &self.items {
            let value = serde_json::to_string_pretty(&item.value).unwrap_or_else(|_| item.value.to_string());
            let _ = writeln!(out, "#{}\n{value}\n", item.index);
        }
        let _ = writeln!(
            out,
            "{} sampled from {} matching ({} scanned)",
            self.items.len(),
            self.matched_count,
            self.total_scanned
        );
        footer(&mut out, self.filter_ignored);
        out
    }
}

impl Render for SchemaNode {
    fn render_text(&self) -> String {
        self.to_yaml_text()
    }
}

fn id_field_table(title: &str, fields: &[IdFieldSummary]) -> String {
    let mut table = Table::new([
        ("path", false),
        ("distinct", true),
        ("seen", true),
        ("pattern", false),
        ("examples", false),
    ]);
    for field in fields {
        table.row(vec![
            field.path.clone(),
            field.distinct_values.to_string(),
            field.occurrences.to_string(),
            field.pattern.map(|p| p.to_string()).unwrap_or_default(),
            field.examples.join(", "),
        ]);
    }
    format!("\n{title}\n{}", table.render())
}

impl Render for RelationshipReport {
    fn render_text(&self) -> String {
        let mut out = format!(
            "{} -> {} (min coverage {}%)\n\n",
            self.left.display(),
            self.right.display(),
            number(self.min_coverage)
        );
        if self.relationships.is_empty() {
            out.push_str("no relationships found\n");
        } else {
            let mut table = Table::new([
                ("left", false),
                ("right", false),
                ("type", false),
                ("matched", true),
                ("coverage", true),
            ]);
            for relationship in &self.relationships {
                table.row(vec![
                    relationship.left_path.clone(),
                    relationship.right_path.clone(),
                    relationship.relationship_type.to_string(),
                    format!("{}/{}", relationship.matched_count, relationship.total_count),
                    format!("{:.1}%", relationship.coverage),
                ]);
            }
            out.push_str(&table.render());
        }
        if let Some(fields) = &self.left_fields {
            out.push_str(&id_field_table(&format!("id fields in {}", self.left.display()), fields));
        }
        if let Some(fields) = &self.right_fields {
            out.push_str(&id_field_table(&format!("id fields in {}", self.right.display()), fields));
        }
        let _ = writeln!(
            out,
            "\nscanned {} left and {} right elements",
            self.left_scanned, self.right_scanned
        );
        out
    }
}

impl Render for JoinResult {
    fn render_text(&self) -> String {
        let mut out = format!("joined on a.{} = b.{}", self.left_key, self.right_key);
        if self.auto_detected {
            match self.coverage {
                Some(coverage) => {
                    let _ = write!(out, " (auto-detected, {coverage:.1}% coverage)");
                }
                None => out.push_str(" (auto-detected)"),
            }
        }
        out.push_str("\n\n");
        for item in &self.items {
            let _ = writeln!(out, "{item}");
        }
        let _ = writeln!(
            out,
            "\n{} shown, {} matched; scanned {} left, {} right ({} distinct keys)",
            self.items.len(),
            self.total_matched,
            self.left_scanned,
            self.right_scanned,
            self.index_keys
        );
        footer(&mut out, self.filter_ignored);
        out
    }
}

impl Render for Vec<LookupOutcome> {
    fn render_text(&self) -> String {
        let mut out = String::new();
        for outcome in self {
            let Some(symbol) = outcome.symbol.as_ref().filter(|_| outcome.found) else {
                let _ = writeln!(out, "{}: not found", outcome.type_name);
                continue;
            };
            let _ = write!(out, "{}: {}", outcome.type_name, symbol.kind.as_deref().unwrap_or("type"));
            if let Some(namespace) = &symbol.namespace {
                let _ = write!(out, " in {namespace}");
            }
            if let Some(base) = &symbol.base_type {
                let _ = write!(out, " : {base}");
            }
            out.push('\n');
            for member in &symbol.members {
                let _ = writeln!(
                    out,
                    "  {} {}",
                    member.name,
                    member.type_name.as_deref().unwrap_or("?")
                );
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use entscan_engine::query::AggregateGroup;
    use indexmap::IndexMap;
    use serde_json::json;

    use super::*;

    #[test]
    fn numbers_drop_needless_decimals() {
        assert_eq!(number(15.0), "15");
        assert_eq!(number(-3.0), "-3");
        assert_eq!(number(2.5), "2.50");
    }

    #[test]
    fn tables_align_columns() {
        let mut table = Table::new([("value", false), ("count", true)]);
        table.row(vec!["Player:1".into(), "1".into()]);
        table.row(vec!["Guild:12".into(), "140".into()]);
        assert_eq!(
            table.render(),
            "value     count\n--------  -----\nPlayer:1      1\nGuild:12    140\n"
        );
    }

    #[test]
    fn stats_text_lists_each_measure() {
        let stats = StatsResult {
            count: 2,
            sum: 30.0,
            avg: 15.0,
            min: 10.0,
            max: 20.0,
            scanned: 2,
            filter_ignored: true,
        };
        let text = stats.render_text();
        assert!(text.starts_with("count   2\nsum     30\navg     15\n"), "{text}");
        assert!(text.ends_with(&format!("{IGNORED_FILTER_NOTE}\n")));
    }

    #[test]
    fn group_text_shows_shares() {
        let result = GroupByResult {
            groups: IndexMap::from([("Knight".to_string(), 3), ("Mage".to_string(), 1)]),
            total: 4,
            unique_values: 2,
            scanned: 4,
            filter_ignored: false,
        };
        let text = result.render_text();
        assert!(text.contains("Knight      3  75.0%"), "{text}");
        assert!(text.contains("2 distinct values over 4 elements"));
    }

    #[test]
    fn aggregate_report_selects_columns() {
        let result = AggregateResult {
            groups: vec![AggregateGroup {
                key: "Knight".into(),
                elements: 2,
                count: 2,
                sum: 30.0,
                avg: 15.0,
                min: 10.0,
                max: 20.0,
                condition_count: 1,
            }],
            total: 2,
            scanned: 3,
            filter_ignored: false,
        };
        let report = AggregateReport::new(&result, vec![AggregateFunction::Avg, AggregateFunction::CountIf]);
        let text = report.render_text();
        let header = text.lines().next().unwrap_or_default();
        assert_eq!(header, "group   elements  avg  countIf");
        assert!(text.contains("Knight         2   15        1"), "{text}");

        let json = render(&report, Format::Json).expect("json");
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&json).expect("valid json")["groups"][0]["conditionCount"],
            json!(1)
        );
    }

    #[test]
    fn json_output_uses_camel_case() {
        let count = CountResult {
            total: 1,
            scanned: 2,
            filter_ignored: false,
        };
        let json = render(&count, Format::Json).expect("json");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value, json!({"total": 1, "scanned": 2, "filterIgnored": false}));
    }

    #[test]
    fn lookup_text_reports_missing_types() {
        let outcomes = vec![LookupOutcome {
            type_name: "Game.Missing".into(),
            found: false,
            symbol: None,
        }];
        assert_eq!(outcomes.render_text(), "Game.Missing: not found\n");
    }
}
