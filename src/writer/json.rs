//! JSON response decoding.

use serde_json::Value;

use crate::error::{Result, SolriumError};

/// Decode a `wt=json` body.
pub fn decode(body: &[u8]) -> Result<Value> {
    serde_json::from_slice(body)
        .map_err(|e| SolriumError::parse(format!("Invalid JSON response body: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_valid() {
        let value = decode(br#"{"response":{"numFound":0,"docs":[]}}"#).unwrap();
        assert_eq!(value["response"]["numFound"], 0);
    }

    #[test]
    fn test_decode_malformed_is_parse_error() {
        assert!(matches!(
            decode(b"<html>502 Bad Gateway</html>"),
            Err(SolriumError::Parse(_))
        ));
    }
}
