//! Transport-agnostic description of an HTTP call to Solr.
//!
//! A [`Request`] is built fresh from a query by its request builder and is
//! handed to an [`crate::adapter::Adapter`] for sending. It never holds
//! network state, so the same request can be sent to several endpoints
//! (load-balancer failover, parallel execution).

pub mod multipart;

use std::fmt;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::endpoint::{Credentials, Endpoint};
use crate::error::Result;
use crate::util::encoding;

pub use multipart::MultipartBody;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    Get,
    Post,
    Head,
    Delete,
    Put,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Head => "HEAD",
            Method::Delete => "DELETE",
            Method::Put => "PUT",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Solr API generation a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ApiVersion {
    /// Classic `/solr/...` API.
    #[default]
    V1,
    /// `/api/...` API.
    V2,
}

/// Conversion of typed values into request parameter strings.
///
/// Returning `None` means "do not add this parameter"; that is how unset
/// options and empty strings are skipped.
pub trait ParamValue {
    fn to_param(&self) -> Option<String>;
}

impl ParamValue for str {
    fn to_param(&self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self.to_string())
        }
    }
}

impl ParamValue for String {
    fn to_param(&self) -> Option<String> {
        self.as_str().to_param()
    }
}

impl ParamValue for bool {
    fn to_param(&self) -> Option<String> {
        Some(if *self { "true" } else { "false" }.to_string())
    }
}

macro_rules! impl_param_value_display {
    ($($t:ty),*) => {
        $(impl ParamValue for $t {
            fn to_param(&self) -> Option<String> {
                Some(self.to_string())
            }
        })*
    };
}

impl_param_value_display!(i32, i64, u16, u32, u64, usize, f32, f64);

impl<T: ParamValue + ?Sized> ParamValue for &T {
    fn to_param(&self) -> Option<String> {
        (**self).to_param()
    }
}

impl<T: ParamValue> ParamValue for Option<T> {
    fn to_param(&self) -> Option<String> {
        self.as_ref().and_then(|v| v.to_param())
    }
}

/// Ordered, multi-valued request parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, Vec<String>)>,
}

impl Params {
    pub fn new() -> Self {
        Params::default()
    }

    /// Append a value; skipped when the value converts to `None`.
    pub fn add<K: Into<String>, V: ParamValue>(&mut self, key: K, value: V) {
        let Some(value) = value.to_param() else {
            return;
        };
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((key, vec![value])),
        }
    }

    /// Replace all values of a key; removes the key when the value is `None`.
    pub fn set<K: Into<String>, V: ParamValue>(&mut self, key: K, value: V) {
        let key = key.into();
        match value.to_param() {
            Some(value) => match self.entries.iter_mut().find(|(k, _)| *k == key) {
                Some((_, values)) => *values = vec![value],
                None => self.entries.push((key, vec![value])),
            },
            None => self.remove(&key),
        }
    }

    /// Append every value of an iterator.
    pub fn add_all<K, I, V>(&mut self, key: K, values: I)
    where
        K: Into<String>,
        I: IntoIterator<Item = V>,
        V: ParamValue,
    {
        let key = key.into();
        for value in values {
            self.add(key.clone(), value);
        }
    }

    /// All values of a key.
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_slice())
    }

    /// First value of a key.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|v| v.first()).map(|s| s.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn remove(&mut self, key: &str) {
        self.entries.retain(|(k, _)| k != key);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Flattened `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .flat_map(|(k, values)| values.iter().map(move |v| (k.as_str(), v.as_str())))
    }

    /// RFC 3986 encoded query string, multi values repeated (`fq=a&fq=b`).
    pub fn to_query_string(&self) -> String {
        encoding::encode_pairs(self.iter())
    }
}

/// File content to upload as `multipart/form-data`.
#[derive(Debug, Clone)]
pub enum FileUpload {
    /// A file the library opens (and closes) itself at send time.
    Path(PathBuf),
    /// A caller-owned handle. The library reads through a cloned handle
    /// and never closes the caller's.
    Handle {
        file: Arc<File>,
        name: String,
    },
}

impl FileUpload {
    /// Name sent as the multipart `filename`.
    pub fn file_name(&self) -> String {
        match self {
            FileUpload::Path(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            FileUpload::Handle { name, .. } => name.clone(),
        }
    }
}

/// A transport-agnostic HTTP request.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    handler: String,
    params: Params,
    headers: Vec<(String, String)>,
    raw_data: Option<Vec<u8>>,
    file_upload: Option<FileUpload>,
    content_type: Option<String>,
    api: ApiVersion,
    is_server_request: bool,
    credentials: Option<Credentials>,
    boundary: String,
}

impl Default for Request {
    fn default() -> Self {
        Request::new(Method::Get, "")
    }
}

impl Request {
    /// Create a request for a handler such as `select` or `admin/cores`.
    pub fn new<S: Into<String>>(method: Method, handler: S) -> Self {
        Request {
            method,
            handler: handler.into(),
            params: Params::new(),
            headers: Vec::new(),
            raw_data: None,
            file_upload: None,
            content_type: None,
            api: ApiVersion::V1,
            is_server_request: false,
            credentials: None,
            boundary: uuid::Uuid::new_v4().simple().to_string(),
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn set_method(&mut self, method: Method) {
        self.method = method;
    }

    pub fn handler(&self) -> &str {
        &self.handler
    }

    pub fn set_handler<S: Into<String>>(&mut self, handler: S) {
        self.handler = handler.into();
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut Params {
        &mut self.params
    }

    /// Shorthand for `params_mut().add(..)`.
    pub fn add_param<K: Into<String>, V: ParamValue>(&mut self, key: K, value: V) {
        self.params.add(key, value);
    }

    /// Shorthand for `params_mut().set(..)`.
    pub fn set_param<K: Into<String>, V: ParamValue>(&mut self, key: K, value: V) {
        self.params.set(key, value);
    }

    /// First value of a parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.first(key)
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Add a header, replacing any previous header of the same name.
    pub fn set_header<K: Into<String>, V: Into<String>>(&mut self, name: K, value: V) {
        let name = name.into();
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
    }

    /// Add a header, keeping earlier headers of the same name.
    pub fn add_header<K: Into<String>, V: Into<String>>(&mut self, name: K, value: V) {
        self.headers.push((name.into(), value.into()));
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn raw_data(&self) -> Option<&[u8]> {
        self.raw_data.as_deref()
    }

    pub fn set_raw_data<B: Into<Vec<u8>>>(&mut self, data: B) {
        self.raw_data = Some(data.into());
    }

    pub fn clear_raw_data(&mut self) {
        self.raw_data = None;
    }

    pub fn file_upload(&self) -> Option<&FileUpload> {
        self.file_upload.as_ref()
    }

    /// Attach a file upload; the content type becomes multipart.
    pub fn set_file_upload(&mut self, upload: FileUpload) {
        self.content_type = Some(format!("multipart/form-data; boundary={}", self.boundary));
        self.file_upload = Some(upload);
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn set_content_type<S: Into<String>>(&mut self, content_type: S) {
        self.content_type = Some(content_type.into());
    }

    pub fn api(&self) -> ApiVersion {
        self.api
    }

    pub fn set_api(&mut self, api: ApiVersion) {
        self.api = api;
    }

    /// Whether the handler is relative to the server rather than a core.
    pub fn is_server_request(&self) -> bool {
        self.is_server_request
    }

    pub fn set_is_server_request(&mut self, is_server_request: bool) {
        self.is_server_request = is_server_request;
    }

    /// Per-request credentials, taking precedence over the endpoint's.
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn set_credentials<U: Into<String>, P: Into<String>>(&mut self, username: U, password: P) {
        self.credentials = Some(Credentials {
            username: username.into(),
            password: password.into(),
        });
    }

    /// Multipart boundary used for file uploads.
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Encoded query string of the parameters.
    pub fn query_string(&self) -> String {
        self.params.to_query_string()
    }

    /// Full URI of this request against an endpoint.
    pub fn uri(&self, endpoint: &Endpoint) -> Result<String> {
        let base = match (self.is_server_request, self.api) {
            (true, ApiVersion::V1) => endpoint.server_uri(),
            (true, ApiVersion::V2) => endpoint.v2_server_uri(),
            (false, ApiVersion::V1) => endpoint.base_uri()?,
            (false, ApiVersion::V2) => endpoint.v2_base_uri()?,
        };
        let mut uri = format!("{base}{}", self.handler.trim_start_matches('/'));
        if !self.params.is_empty() {
            uri.push('?');
            uri.push_str(&self.query_string());
        }
        Ok(uri)
    }

    /// Open the streaming multipart body for a file upload, if any.
    pub fn multipart_body(&self) -> Result<Option<MultipartBody>> {
        match &self.file_upload {
            Some(upload) => MultipartBody::open(upload, &self.boundary).map(Some),
            None => Ok(None),
        }
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.handler)?;
        if !self.params.is_empty() {
            write!(f, "?{}", self.query_string())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_skip_empty_values() {
        let mut params = Params::new();
        params.add("q", "");
        params.add("rows", None::<u32>);
        params.add("start", Some(10u32));
        params.add("omitHeader", true);
        assert_eq!(params.len(), 2);
        assert_eq!(params.first("start"), Some("10"));
        assert_eq!(params.first("omitHeader"), Some("true"));
    }

    #[test]
    fn test_params_multi_values_and_set() {
        let mut params = Params::new();
        params.add("fq", "a");
        params.add("fq", "b");
        assert_eq!(params.to_query_string(), "fq=a&fq=b");

        params.set("fq", "c");
        assert_eq!(params.get("fq").unwrap(), &["c".to_string()]);

        params.set("fq", None::<String>);
        assert!(params.is_empty());
    }

    #[test]
    fn test_uri_core_and_server() {
        let endpoint = Endpoint::builder("local").core("books").build();

        let mut request = Request::new(Method::Get, "select");
        request.add_param("q", "title:rust");
        request.add_param("wt", "json");
        assert_eq!(
            request.uri(&endpoint).unwrap(),
            "http://127.0.0.1:8983/solr/books/select?q=title%3Arust&wt=json"
        );

        let mut request = Request::new(Method::Get, "admin/cores");
        request.set_is_server_request(true);
        request.add_param("action", "STATUS");
        assert_eq!(
            request.uri(&endpoint).unwrap(),
            "http://127.0.0.1:8983/solr/admin/cores?action=STATUS"
        );

        let mut request = Request::new(Method::Get, "schema");
        request.set_api(ApiVersion::V2);
        assert_eq!(
            request.uri(&endpoint).unwrap(),
            "http://127.0.0.1:8983/api/cores/books/schema"
        );
    }

    #[test]
    fn test_headers_replace_case_insensitive() {
        let mut request = Request::new(Method::Post, "update");
        request.set_header("Content-Type", "text/xml");
        request.set_header("content-type", "application/json");
        assert_eq!(request.headers().len(), 1);
        assert_eq!(request.header("CONTENT-TYPE"), Some("application/json"));
    }

    #[test]
    fn test_display() {
        let mut request = Request::new(Method::Get, "select");
        request.add_param("q", "*:*");
        assert_eq!(request.to_string(), "GET select?q=%2A%3A%2A");
    }
}
