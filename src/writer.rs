//! Response writer formats and body decoding.
//!
//! Solr can serialize responses in several formats (the `wt` parameter).
//! Whatever the format, the body is decoded into one `serde_json::Value`
//! tree so response parsers only deal with a single representation.

pub mod json;
pub mod phps;
pub mod xml;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::request::Request;

/// Response serialization formats understood by the parsers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseWriter {
    /// `wt=json` with flat named lists.
    #[default]
    Json,
    /// `wt=xml`.
    Xml,
    /// `wt=phps`, PHP `serialize()` output.
    Phps,
}

impl ResponseWriter {
    /// Value of the `wt` parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseWriter::Json => "json",
            ResponseWriter::Xml => "xml",
            ResponseWriter::Phps => "phps",
        }
    }

    /// Add the writer parameters to a request.
    pub fn apply(&self, request: &mut Request) {
        request.set_param("wt", self.as_str());
        if *self == ResponseWriter::Json {
            request.set_param("json.nl", "flat");
        }
    }

    /// Decode a response body written in this format.
    pub fn decode(&self, body: &[u8]) -> Result<Value> {
        match self {
            ResponseWriter::Json => json::decode(body),
            ResponseWriter::Xml => xml::decode(body),
            ResponseWriter::Phps => phps::decode(body),
        }
    }
}

impl fmt::Display for ResponseWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decode a body in the given format.
pub fn decode(writer: ResponseWriter, body: &[u8]) -> Result<Value> {
    writer.decode(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Method;

    #[test]
    fn test_apply_json_sets_flat_named_lists() {
        let mut request = Request::new(Method::Get, "select");
        ResponseWriter::Json.apply(&mut request);
        assert_eq!(request.param("wt"), Some("json"));
        assert_eq!(request.param("json.nl"), Some("flat"));

        let mut request = Request::new(Method::Get, "select");
        ResponseWriter::Phps.apply(&mut request);
        assert_eq!(request.param("wt"), Some("phps"));
        assert_eq!(request.param("json.nl"), None);
    }

    #[test]
    fn test_same_tree_from_every_format() {
        let json = br#"{"responseHeader":{"status":0,"QTime":3},"status":"OK"}"#;
        let xml = br#"<?xml version="1.0"?><response><lst name="responseHeader"><int name="status">0</int><int name="QTime">3</int></lst><str name="status">OK</str></response>"#;
        let phps = br#"a:2:{s:14:"responseHeader";a:2:{s:6:"status";i:0;s:5:"QTime";i:3;}s:6:"status";s:2:"OK";}"#;

        let from_json = decode(ResponseWriter::Json, json).unwrap();
        assert_eq!(decode(ResponseWriter::Xml, xml).unwrap(), from_json);
        assert_eq!(decode(ResponseWriter::Phps, phps).unwrap(), from_json);
    }
}
