//! Command line argument parsing for the solrium CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::query::luke::LukeShow;
use crate::query::select::SortOrder;
use crate::query::update::RequestFormat;

/// solrium - a command line client for Apache Solr
#[derive(Parser, Debug, Clone)]
#[command(name = "solrium")]
#[command(about = "A command line client for Apache Solr")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct SolriumArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Client configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE", env = "SOLRIUM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Solr core or collection URL, e.g. http://localhost:8983/solr/techproducts
    #[arg(short, long, env = "SOLR_URL")]
    pub url: Option<String>,

    /// Endpoint key to use instead of the configured default
    #[arg(short, long)]
    pub endpoint: Option<String>,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl SolriumArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Check that the core answers
    Ping,

    /// Search documents
    Select(SelectArgs),

    /// Index documents from a JSON or JSON Lines file
    Add(AddArgs),

    /// Delete documents by id or by query
    Delete(DeleteArgs),

    /// Commit pending changes
    Commit(CommitArgs),

    /// Show index and field information
    Luke(LukeArgs),

    /// Show the status of the cores of the server
    Cores(CoresArgs),
}

/// Arguments for searching
#[derive(Parser, Debug, Clone)]
pub struct SelectArgs {
    /// Query string
    #[arg(value_name = "QUERY", default_value = "*:*")]
    pub query: String,

    /// Filter queries, may be repeated
    #[arg(long = "fq", value_name = "FILTER_QUERY")]
    pub filter_queries: Vec<String>,

    /// Fields to return (comma-separated)
    #[arg(long = "fl", value_delimiter = ',')]
    pub fields: Vec<String>,

    /// Sort clauses such as "price desc", may be repeated
    #[arg(long, value_parser = parse_sort)]
    pub sort: Vec<(String, SortOrder)>,

    /// Maximum number of results to return
    #[arg(short, long, default_value = "10")]
    pub rows: u64,

    /// Offset for pagination
    #[arg(short, long, default_value = "0")]
    pub start: u64,

    /// Fields to facet on (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub facet_field: Vec<String>,

    /// Fetch every matching document page by page
    #[arg(long)]
    pub all: bool,
}

/// Arguments for adding documents
#[derive(Parser, Debug, Clone)]
pub struct AddArgs {
    /// Document file path (JSON or JSONL)
    #[arg(value_name = "DOCUMENT_FILE")]
    pub document_file: PathBuf,

    /// Documents per update request
    #[arg(short, long, default_value = "100")]
    pub batch_size: usize,

    /// Don't commit after adding documents
    #[arg(long)]
    pub no_commit: bool,

    /// Ask Solr to commit within this many milliseconds
    #[arg(long)]
    pub commit_within: Option<u32>,

    /// Body format of the update requests
    #[arg(long, default_value = "xml")]
    pub request_format: UpdateFormat,
}

impl AddArgs {
    pub fn should_commit(&self) -> bool {
        !self.no_commit
    }
}

/// Arguments for deleting documents
#[derive(Parser, Debug, Clone)]
pub struct DeleteArgs {
    /// Ids to delete (comma-separated)
    #[arg(long = "id", value_delimiter = ',', required_unless_present = "queries")]
    pub ids: Vec<String>,

    /// Delete-by-query, may be repeated
    #[arg(long = "query")]
    pub queries: Vec<String>,

    /// Don't commit after deleting
    #[arg(long)]
    pub no_commit: bool,
}

impl DeleteArgs {
    pub fn should_commit(&self) -> bool {
        !self.no_commit
    }
}

/// Arguments for committing
#[derive(Parser, Debug, Clone)]
pub struct CommitArgs {
    /// Soft commit
    #[arg(long)]
    pub soft: bool,

    /// Merge away deleted documents
    #[arg(long)]
    pub expunge_deletes: bool,

    /// Return before a new searcher is opened
    #[arg(long)]
    pub no_wait_searcher: bool,
}

/// Arguments for index inspection
#[derive(Parser, Debug, Clone)]
pub struct LukeArgs {
    /// What to show
    #[arg(long, default_value = "index")]
    pub show: LukeView,

    /// Only these fields (comma-separated)
    #[arg(long = "fl", value_delimiter = ',')]
    pub fields: Vec<String>,

    /// Number of top terms per field
    #[arg(long)]
    pub num_terms: Option<u32>,
}

/// Arguments for core status
#[derive(Parser, Debug, Clone)]
pub struct CoresArgs {
    /// Only this core
    #[arg(value_name = "CORE")]
    pub core: Option<String>,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable format
    Human,
    /// JSON format
    Json,
}

/// Update request body formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateFormat {
    Xml,
    Json,
    Cbor,
}

impl From<UpdateFormat> for RequestFormat {
    fn from(format: UpdateFormat) -> Self {
        match format {
            UpdateFormat::Xml => RequestFormat::Xml,
            UpdateFormat::Json => RequestFormat::Json,
            UpdateFormat::Cbor => RequestFormat::Cbor,
        }
    }
}

/// Luke views
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LukeView {
    Index,
    Schema,
    All,
}

impl From<LukeView> for LukeShow {
    fn from(view: LukeView) -> Self {
        match view {
            LukeView::Index => LukeShow::Index,
            LukeView::Schema => LukeShow::Schema,
            LukeView::All => LukeShow::All,
        }
    }
}

/// Parse `field [asc|desc]`; the order defaults to ascending.
fn parse_sort(value: &str) -> Result<(String, SortOrder), String> {
    let mut parts = value.split_whitespace();
    let field = parts
        .next()
        .ok_or_else(|| "sort clause is empty".to_string())?
        .to_string();
    let order = match parts.next().map(str::to_ascii_lowercase).as_deref() {
        None | Some("asc") => SortOrder::Asc,
        Some("desc") => SortOrder::Desc,
        Some(other) => return Err(format!("invalid sort order '{other}'")),
    };
    if parts.next().is_some() {
        return Err(format!("invalid sort clause '{value}'"));
    }
    Ok((field, order))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_command() {
        let args = SolriumArgs::try_parse_from([
            "solrium",
            "--url",
            "http://localhost:8983/solr/books",
            "select",
            "title:rust",
            "--fq",
            "inStock:true",
            "--fq",
            "cat:book",
            "--fl",
            "id,title",
            "--sort",
            "price desc",
            "--rows",
            "20",
            "--facet-field",
            "cat,author",
        ])
        .unwrap();

        assert_eq!(args.url.as_deref(), Some("http://localhost:8983/solr/books"));
        if let Command::Select(select) = args.command {
            assert_eq!(select.query, "title:rust");
            assert_eq!(select.filter_queries, vec!["inStock:true", "cat:book"]);
            assert_eq!(select.fields, vec!["id", "title"]);
            assert_eq!(select.sort, vec![("price".to_string(), SortOrder::Desc)]);
            assert_eq!(select.rows, 20);
            assert_eq!(select.start, 0);
            assert_eq!(select.facet_field, vec!["cat", "author"]);
        } else {
            panic!("Expected Select command");
        }
    }

    #[test]
    fn test_add_command() {
        let args = SolriumArgs::try_parse_from([
            "solrium",
            "add",
            "books.jsonl",
            "--batch-size",
            "500",
            "--request-format",
            "json",
        ])
        .unwrap();

        if let Command::Add(add) = args.command {
            assert_eq!(add.document_file, PathBuf::from("books.jsonl"));
            assert_eq!(add.batch_size, 500);
            assert!(add.should_commit());
            assert_eq!(RequestFormat::from(add.request_format), RequestFormat::Json);
        } else {
            panic!("Expected Add command");
        }
    }

    #[test]
    fn test_delete_needs_ids_or_query() {
        assert!(SolriumArgs::try_parse_from(["solrium", "delete"]).is_err());

        let args = SolriumArgs::try_parse_from(["solrium", "delete", "--query", "cat:old", "--no-commit"]).unwrap();
        if let Command::Delete(delete) = args.command {
            assert!(delete.ids.is_empty());
            assert_eq!(delete.queries, vec!["cat:old"]);
            assert!(!delete.should_commit());
        } else {
            panic!("Expected Delete command");
        }
    }

    #[test]
    fn test_verbosity_levels() {
        let args = SolriumArgs::try_parse_from(["solrium", "ping"]).unwrap();
        assert_eq!(args.verbosity(), 1);

        let args = SolriumArgs::try_parse_from(["solrium", "-vv", "ping"]).unwrap();
        assert_eq!(args.verbosity(), 2);

        let args = SolriumArgs::try_parse_from(["solrium", "-vvv", "--quiet", "ping"]).unwrap();
        assert_eq!(args.verbosity(), 0);
    }

    #[test]
    fn test_output_format() {
        let args = SolriumArgs::try_parse_from(["solrium", "--format", "json", "--pretty", "cores"]).unwrap();
        assert_eq!(args.output_format, OutputFormat::Json);
        assert!(args.pretty);
    }

    #[test]
    fn test_parse_sort() {
        assert_eq!(parse_sort("id").unwrap(), ("id".to_string(), SortOrder::Asc));
        assert_eq!(parse_sort("score DESC").unwrap(), ("score".to_string(), SortOrder::Desc));
        assert!(parse_sort("score sideways").is_err());
        assert!(parse_sort("").is_err());
    }
}
