//! Percent-encoding used for query strings and REST path segments.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters left untouched by RFC 3986 encoding (`A-Za-z0-9-._~`).
pub const RFC3986: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode a string per RFC 3986.
pub fn encode(input: &str) -> String {
    utf8_percent_encode(input, RFC3986).to_string()
}

/// Percent-encode a string twice.
///
/// Solr's managed REST API decodes path segments one time too many
/// (SOLR-6853), so names and terms containing reserved characters must be
/// encoded twice to arrive intact.
pub fn double_encode(input: &str) -> String {
    encode(&encode(input))
}

/// Build an `application/x-www-form-urlencoded` style pair list.
pub fn encode_pairs<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_keeps_unreserved() {
        assert_eq!(encode("abc-XYZ_0.9~"), "abc-XYZ_0.9~");
    }

    #[test]
    fn test_encode_reserved() {
        assert_eq!(encode("cat:a b"), "cat%3Aa%20b");
        assert_eq!(encode("{!tag=x}"), "%7B%21tag%3Dx%7D");
        assert_eq!(encode("é"), "%C3%A9");
    }

    #[test]
    fn test_double_encode() {
        assert_eq!(double_encode("a/b"), "a%252Fb");
        assert_eq!(double_encode("plain"), "plain");
    }

    #[test]
    fn test_encode_pairs() {
        let out = encode_pairs([("q", "*:*"), ("fq", "a b")]);
        assert_eq!(out, "q=%2A%3A%2A&fq=a%20b");
    }
}
