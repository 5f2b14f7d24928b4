//! Extract query: index rich documents (PDF, Word, HTML, ...) through
//! Solr Cell (`update/extract`).
//!
//! The file is uploaded as `multipart/form-data`. Fields of an optional
//! document are sent as `literal.*` params and end up in the indexed
//! document next to the extracted content.
//!
//! ```no_run
//! use solrium::document::Document;
//! use solrium::query::ExtractQuery;
//!
//! let mut doc = Document::new();
//! doc.set_field("id", "manual-1");
//!
//! let mut query = ExtractQuery::new();
//! query
//!     .set_file("manual.pdf")
//!     .set_document(doc)
//!     .add_field_mapping("content", "text")
//!     .set_commit(true);
//! ```

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tracing::trace;

use crate::document::{Document, FieldValue};
use crate::error::{Result, SolriumError};
use crate::query::{
    Query, QueryOptions, QueryType, ResponseHeader, create_request, downcast_query, impl_query,
    impl_query_result,
};
use crate::registry::{RequestBuilder, ResponseParser, SolrResult};
use crate::request::{FileUpload, Method, Request};
use crate::response::Response;
use crate::util::named_list;

/// Output format of extract-only requests (`extractFormat`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractFormat {
    Xml,
    Text,
}

impl ExtractFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractFormat::Xml => "xml",
            ExtractFormat::Text => "text",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExtractQuery {
    options: QueryOptions,
    file: Option<FileUpload>,
    document: Option<Document>,
    resource_name: Option<String>,
    field_mappings: Vec<(String, String)>,
    uprefix: Option<String>,
    default_field: Option<String>,
    lowernames: Option<bool>,
    capture_attributes: Option<bool>,
    capture: Option<String>,
    xpath: Option<String>,
    extract_only: Option<bool>,
    extract_format: Option<ExtractFormat>,
    commit: Option<bool>,
    commit_within: Option<u32>,
}

impl_query!(ExtractQuery, QueryType::Extract);

impl Default for ExtractQuery {
    fn default() -> Self {
        ExtractQuery {
            options: QueryOptions::new("update/extract").with_omit_header(true),
            file: None,
            document: None,
            resource_name: None,
            field_mappings: Vec::new(),
            uprefix: None,
            default_field: None,
            lowernames: None,
            capture_attributes: None,
            capture: None,
            xpath: None,
            extract_only: None,
            extract_format: None,
            commit: None,
            commit_within: None,
        }
    }
}

impl ExtractQuery {
    pub fn new() -> Self {
        ExtractQuery::default()
    }

    pub fn file(&self) -> Option<&FileUpload> {
        self.file.as_ref()
    }

    /// Upload a file by path; it is opened when the request is sent.
    pub fn set_file<P: AsRef<Path>>(&mut self, path: P) -> &mut Self {
        self.file = Some(FileUpload::Path(PathBuf::from(path.as_ref())));
        self
    }

    /// Upload from a caller-owned handle, which stays open.
    pub fn set_file_handle<S: Into<String>>(&mut self, file: Arc<File>, name: S) -> &mut Self {
        self.file = Some(FileUpload::Handle {
            file,
            name: name.into(),
        });
        self
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    /// Literal field values added to the indexed document.
    pub fn set_document(&mut self, document: Document) -> &mut Self {
        self.document = Some(document);
        self
    }

    /// Name used for content type detection; defaults to the file name.
    pub fn set_resource_name<S: Into<String>>(&mut self, name: S) -> &mut Self {
        self.resource_name = Some(name.into());
        self
    }

    /// Rename an extracted field (`fmap.<from>=<to>`).
    pub fn add_field_mapping<F: Into<String>, T: Into<String>>(&mut self, from: F, to: T) -> &mut Self {
        let from = from.into();
        self.field_mappings.retain(|(f, _)| *f != from);
        self.field_mappings.push((from, to.into()));
        self
    }

    pub fn field_mappings(&self) -> &[(String, String)] {
        &self.field_mappings
    }

    pub fn remove_field_mapping(&mut self, from: &str) -> &mut Self {
        self.field_mappings.retain(|(f, _)| f != from);
        self
    }

    /// Prefix for fields not in the schema.
    pub fn set_uprefix<S: Into<String>>(&mut self, prefix: S) -> &mut Self {
        self.uprefix = Some(prefix.into());
        self
    }

    pub fn set_default_field<S: Into<String>>(&mut self, field: S) -> &mut Self {
        self.default_field = Some(field.into());
        self
    }

    pub fn set_lowernames(&mut self, lowernames: bool) -> &mut Self {
        self.lowernames = Some(lowernames);
        self
    }

    pub fn set_capture_attributes(&mut self, capture: bool) -> &mut Self {
        self.capture_attributes = Some(capture);
        self
    }

    /// Capture an XHTML element into its own field.
    pub fn set_capture<S: Into<String>>(&mut self, element: S) -> &mut Self {
        self.capture = Some(element.into());
        self
    }

    pub fn set_xpath<S: Into<String>>(&mut self, xpath: S) -> &mut Self {
        self.xpath = Some(xpath.into());
        self
    }

    /// Return the extracted content instead of indexing it.
    pub fn set_extract_only(&mut self, extract_only: bool) -> &mut Self {
        self.extract_only = Some(extract_only);
        self
    }

    pub fn set_extract_format(&mut self, format: ExtractFormat) -> &mut Self {
        self.extract_format = Some(format);
        self
    }

    pub fn set_commit(&mut self, commit: bool) -> &mut Self {
        self.commit = Some(commit);
        self
    }

    pub fn set_commit_within(&mut self, millis: u32) -> &mut Self {
        self.commit_within = Some(millis);
        self
    }

    /// The resource name sent to Solr: explicit name or file name.
    pub fn effective_resource_name(&self) -> Option<String> {
        self.resource_name
            .clone()
            .or_else(|| self.file.as_ref().map(|f| f.file_name()))
            .filter(|n| !n.is_empty())
    }
}

/// Result of an extract query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractResult {
    pub header: ResponseHeader,
    pub data: Value,
    /// Extracted content, for extract-only requests.
    pub content: Option<String>,
    /// Extracted metadata, for extract-only requests.
    pub metadata: Vec<(String, Vec<String>)>,
}

impl_query_result!(ExtractResult);

impl ExtractResult {
    pub fn metadata_value(&self, name: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, values)| values.first())
            .map(|v| v.as_str())
    }
}

/// Builds multipart `POST update/extract` requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractRequestBuilder;

impl RequestBuilder for ExtractRequestBuilder {
    fn build(&self, query: &dyn Query) -> Result<Request> {
        let query = downcast_query::<ExtractQuery>(query, QueryType::Extract)?;
        let upload = query
            .file
            .clone()
            .ok_or_else(|| SolriumError::invalid_argument("An extract query needs a file to upload"))?;
        check_readable(&upload)?;

        let mut request = create_request(query, Method::Post);
        request.add_param("resource.name", query.effective_resource_name());
        if let Some(document) = &query.document {
            add_literals(&mut request, document)?;
        }
        for (from, to) in &query.field_mappings {
            request.add_param(format!("fmap.{from}"), to);
        }
        request.add_param("uprefix", query.uprefix.as_deref());
        request.add_param("defaultField", query.default_field.as_deref());
        request.add_param("lowernames", query.lowernames);
        request.add_param("captureAttr", query.capture_attributes);
        request.add_param("capture", query.capture.as_deref());
        request.add_param("xpath", query.xpath.as_deref());
        request.add_param("extractOnly", query.extract_only);
        request.add_param("extractFormat", query.extract_format.map(|f| f.as_str()));
        request.add_param("commit", query.commit);
        request.add_param("commitWithin", query.commit_within);
        request.set_file_upload(upload);
        trace!(resource = ?query.effective_resource_name(), "built extract request");
        Ok(request)
    }
}

/// Fail before any network call when the upload cannot be read.
fn check_readable(upload: &FileUpload) -> Result<()> {
    match upload {
        FileUpload::Path(path) => File::open(path).map(|_| ()).map_err(|e| {
            SolriumError::file_access(format!("Extract file '{}' is not readable: {e}", path.display()))
        }),
        FileUpload::Handle { file, name } => file.metadata().map(|_| ()).map_err(|e| {
            SolriumError::file_access(format!("Extract handle '{name}' is not readable: {e}"))
        }),
    }
}

fn add_literals(request: &mut Request, document: &Document) -> Result<()> {
    if document.has_modifiers() {
        return Err(SolriumError::invalid_argument(
            "Atomic updates are not supported by extract queries",
        ));
    }
    for (name, value) in document.fields() {
        let key = format!("literal.{name}");
        match value {
            FieldValue::Multi(values) => {
                for value in values {
                    request.add_param(key.clone(), value.to_solr_string());
                }
            }
            FieldValue::Null => {}
            value => request.add_param(key, value.to_solr_string()),
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractResponseParser;

impl ResponseParser for ExtractResponseParser {
    fn parse(&self, query: &dyn Query, _response: &Response, data: Value) -> Result<SolrResult> {
        let query = downcast_query::<ExtractQuery>(query, QueryType::Extract)?;
        // extract-only responses key the content by resource name and the
        // metadata by "<name>_metadata"
        let content_key = query.effective_resource_name().or_else(|| {
            named_list::entries(&data)
                .into_iter()
                .find(|(k, v)| k != "responseHeader" && v.is_string())
                .map(|(k, _)| k)
        });
        let (content, metadata) = match content_key {
            Some(key) => {
                let content = named_list::get_string(&data, &key);
                let metadata = named_list::get(&data, &format!("{key}_metadata"))
                    .map(|m| {
                        named_list::entries(m)
                            .into_iter()
                            .map(|(name, values)| (name, named_list::as_string_list(values)))
                            .collect()
                    })
                    .unwrap_or_default();
                (content, metadata)
            }
            None => (None, Vec::new()),
        };
        Ok(SolrResult::Extract(ExtractResult {
            header: ResponseHeader::from_data(&data),
            content,
            metadata,
            data,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_with_literals() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manual.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();

        let document = Document::builder()
            .field("id", "m1")
            .add("cat", "docs")
            .add("cat", "pdf")
            .build();
        let mut query = ExtractQuery::new();
        query
            .set_file(&path)
            .set_document(document)
            .add_field_mapping("content", "text")
            .set_uprefix("attr_")
            .set_commit_within(1000);
        let request = ExtractRequestBuilder.build(&query).unwrap();

        assert_eq!(request.method(), Method::Post);
        assert_eq!(request.handler(), "update/extract");
        assert_eq!(request.param("resource.name"), Some("manual.pdf"));
        assert_eq!(request.param("literal.id"), Some("m1"));
        assert_eq!(
            request.params().get("literal.cat").unwrap(),
            &["docs".to_string(), "pdf".to_string()]
        );
        assert_eq!(request.param("fmap.content"), Some("text"));
        assert_eq!(request.param("uprefix"), Some("attr_"));
        assert_eq!(request.param("commitWithin"), Some("1000"));
        assert!(request.content_type().unwrap().starts_with("multipart/form-data; boundary="));
        assert!(request.file_upload().is_some());
    }

    #[test]
    fn test_missing_file_is_file_access_error() {
        let mut query = ExtractQuery::new();
        query.set_file("/definitely/not/here.pdf");
        assert!(matches!(
            ExtractRequestBuilder.build(&query),
            Err(SolriumError::FileAccess(_))
        ));
        assert!(matches!(
            ExtractRequestBuilder.build(&ExtractQuery::new()),
            Err(SolriumError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_parse_extract_only() {
        let mut query = ExtractQuery::new();
        query.set_resource_name("notes.txt").set_extract_only(true);
        let data = json!({
            "responseHeader": {"status": 0, "QTime": 12},
            "notes.txt": "<html>hello</html>",
            "notes.txt_metadata": ["Content-Type", ["text/plain"], "stream_size", ["5"]]
        });
        let result = ExtractResponseParser.parse(&query, &Response::ok(""), data).unwrap();
        let result = ExtractResult::try_from(result).unwrap();
        assert_eq!(result.content.as_deref(), Some("<html>hello</html>"));
        assert_eq!(result.metadata_value("Content-Type"), Some("text/plain"));
    }
}
