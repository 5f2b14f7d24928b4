//! Output formatting for CLI commands.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cli::args::{OutputFormat, SolriumArgs};
use crate::error::Result;

/// Human-readable rendering of a command result.
pub trait HumanOutput {
    fn render_human(&self, out: &mut String);
}

/// Result structure for ping.
#[derive(Debug, Serialize, Deserialize)]
pub struct PingOutput {
    pub endpoint: String,
    pub status: String,
    pub q_time: i64,
}

/// Result structure for search operations.
#[derive(Debug, Serialize, Deserialize)]
pub struct SelectOutput {
    pub num_found: u64,
    pub start: u64,
    pub max_score: Option<f64>,
    pub documents: Vec<Value>,
    pub facets: Vec<FacetOutput>,
    pub duration_ms: u64,
}

/// Counts of one facet field.
#[derive(Debug, Serialize, Deserialize)]
pub struct FacetOutput {
    pub field: String,
    pub values: Vec<(String, u64)>,
}

/// Result structure for document addition.
#[derive(Debug, Serialize, Deserialize)]
pub struct AddOutput {
    pub documents_added: usize,
    pub requests: usize,
    pub committed: bool,
    pub duration_ms: u64,
    pub docs_per_second: f64,
}

/// Result structure for deletes.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteOutput {
    pub ids: usize,
    pub queries: usize,
    pub committed: bool,
    pub q_time: i64,
}

/// Result structure for commits.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommitOutput {
    pub soft: bool,
    pub q_time: i64,
}

/// Index statistics.
#[derive(Debug, Serialize, Deserialize)]
pub struct LukeOutput {
    pub num_docs: Option<u64>,
    pub max_doc: Option<u64>,
    pub deleted_docs: Option<u64>,
    pub segment_count: Option<u64>,
    pub fields: Vec<FieldOutput>,
}

/// Field-specific statistics.
#[derive(Debug, Serialize, Deserialize)]
pub struct FieldOutput {
    pub name: String,
    pub field_type: Option<String>,
    pub docs: Option<u64>,
    pub distinct: Option<u64>,
    pub top_terms: Vec<(String, u64)>,
}

/// Core status.
#[derive(Debug, Serialize, Deserialize)]
pub struct CoresOutput {
    pub cores: Vec<CoreOutput>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CoreOutput {
    pub name: String,
    pub instance_dir: Option<String>,
    pub num_docs: Option<u64>,
    pub max_doc: Option<u64>,
    pub size_in_bytes: Option<u64>,
    pub uptime_ms: Option<u64>,
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize + HumanOutput>(message: &str, result: &T, args: &SolriumArgs) -> Result<()> {
    let text = format_result(message, result, args)?;
    print!("{text}");
    Ok(())
}

/// Format a result the way [`output_result`] prints it.
pub fn format_result<T: Serialize + HumanOutput>(message: &str, result: &T, args: &SolriumArgs) -> Result<String> {
    match args.output_format {
        OutputFormat::Human => {
            let mut out = String::new();
            if args.verbosity() > 1 {
                let _ = writeln!(out, "{message}");
                out.push('\n');
            }
            result.render_human(&mut out);
            Ok(out)
        }
        OutputFormat::Json => {
            let mut json = if args.pretty {
                serde_json::to_string_pretty(result)?
            } else {
                serde_json::to_string(result)?
            };
            json.push('\n');
            Ok(json)
        }
    }
}

impl HumanOutput for PingOutput {
    fn render_human(&self, out: &mut String) {
        let _ = writeln!(out, "{}: {} ({} ms)", self.endpoint, self.status, self.q_time);
    }
}

impl HumanOutput for SelectOutput {
    fn render_human(&self, out: &mut String) {
        let _ = writeln!(
            out,
            "Found {} documents, showing {} from {} ({} ms)",
            self.num_found,
            self.documents.len(),
            self.start,
            self.duration_ms
        );
        if let Some(max_score) = self.max_score {
            let _ = writeln!(out, "Max score: {max_score:.3}");
        }

        for (i, doc) in self.documents.iter().enumerate() {
            out.push('\n');
            let _ = writeln!(out, "Result {}:", self.start as usize + i + 1);
            if let Some(fields) = doc.as_object() {
                for (name, value) in fields {
                    let _ = writeln!(out, "  {name}: {}", format_value(value));
                }
            }
        }

        for facet in &self.facets {
            out.push('\n');
            let _ = writeln!(out, "Facet {}:", facet.field);
            for (value, count) in &facet.values {
                let _ = writeln!(out, "  {value}: {count}");
            }
        }
    }
}

impl HumanOutput for AddOutput {
    fn render_human(&self, out: &mut String) {
        let _ = writeln!(
            out,
            "Added {} documents in {} requests ({} ms, {:.1} docs/s)",
            self.documents_added, self.requests, self.duration_ms, self.docs_per_second
        );
        if self.committed {
            let _ = writeln!(out, "Committed");
        }
    }
}

impl HumanOutput for DeleteOutput {
    fn render_human(&self, out: &mut String) {
        let _ = writeln!(
            out,
            "Deleted {} ids and {} queries ({} ms)",
            self.ids, self.queries, self.q_time
        );
        if self.committed {
            let _ = writeln!(out, "Committed");
        }
    }
}

impl HumanOutput for CommitOutput {
    fn render_human(&self, out: &mut String) {
        let kind = if self.soft { "Soft commit" } else { "Commit" };
        let _ = writeln!(out, "{kind} done ({} ms)", self.q_time);
    }
}

impl HumanOutput for LukeOutput {
    fn render_human(&self, out: &mut String) {
        let _ = writeln!(out, "Index Statistics:");
        let _ = writeln!(out, "  Documents: {}", format_option(self.num_docs));
        let _ = writeln!(out, "  Max doc: {}", format_option(self.max_doc));
        let _ = writeln!(out, "  Deleted: {}", format_option(self.deleted_docs));
        let _ = writeln!(out, "  Segments: {}", format_option(self.segment_count));

        if !self.fields.is_empty() {
            out.push('\n');
            let _ = writeln!(out, "Fields:");
            for field in &self.fields {
                let _ = writeln!(
                    out,
                    "  {} ({}): docs={} distinct={}",
                    field.name,
                    field.field_type.as_deref().unwrap_or("-"),
                    format_option(field.docs),
                    format_option(field.distinct)
                );
                for (term, count) in &field.top_terms {
                    let _ = writeln!(out, "    {term}: {count}");
                }
            }
        }
    }
}

impl HumanOutput for CoresOutput {
    fn render_human(&self, out: &mut String) {
        if self.cores.is_empty() {
            let _ = writeln!(out, "No cores");
            return;
        }
        for core in &self.cores {
            let _ = writeln!(out, "{}:", core.name);
            if let Some(dir) = &core.instance_dir {
                let _ = writeln!(out, "  Instance dir: {dir}");
            }
            let _ = writeln!(out, "  Documents: {}", format_option(core.num_docs));
            let _ = writeln!(out, "  Max doc: {}", format_option(core.max_doc));
            if let Some(size) = core.size_in_bytes {
                let _ = writeln!(out, "  Size: {}", format_bytes(size));
            }
            if let Some(uptime) = core.uptime_ms {
                let _ = writeln!(out, "  Uptime: {:.1}s", uptime as f64 / 1000.0);
            }
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(format_value).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(_) => value.to_string(),
    }
}

fn format_option(value: Option<u64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use serde_json::json;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1048576), "1.0 MB");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&json!("book")), "book");
        assert_eq!(format_value(&json!(42)), "42");
        assert_eq!(format_value(&json!(["a", 1])), "[a, 1]");
        assert_eq!(format_value(&Value::Null), "null");
    }

    #[test]
    fn test_human_select_output() {
        let args = SolriumArgs::try_parse_from(["solrium", "ping"]).unwrap();
        let output = SelectOutput {
            num_found: 12,
            start: 0,
            max_score: Some(1.5),
            documents: vec![json!({"id": "1", "title": "Rust"})],
            facets: vec![FacetOutput {
                field: "cat".to_string(),
                values: vec![("book".to_string(), 7)],
            }],
            duration_ms: 3,
        };
        let text = format_result("Search results", &output, &args).unwrap();
        assert!(text.starts_with("Found 12 documents, showing 1 from 0"));
        assert!(text.contains("  title: Rust\n"));
        assert!(text.contains("Facet cat:\n  book: 7\n"));
        assert!(!text.contains("Search results"));
    }

    #[test]
    fn test_json_output() {
        let args = SolriumArgs::try_parse_from(["solrium", "--format", "json", "ping"]).unwrap();
        let output = CommitOutput { soft: true, q_time: 4 };
        let text = format_result("Commit", &output, &args).unwrap();
        assert_eq!(text, "{\"soft\":true,\"q_time\":4}\n");
    }
}
