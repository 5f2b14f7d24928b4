//! Raw transport results.

use std::borrow::Cow;

/// The raw result of sending a [`crate::request::Request`]: status line,
/// headers and body. Immutable once received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status_code: u16,
    status_message: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Response {
    /// Create a new response.
    pub fn new<S: Into<String>, B: Into<Vec<u8>>>(
        status_code: u16,
        status_message: S,
        headers: Vec<(String, String)>,
        body: B,
    ) -> Self {
        Response {
            status_code,
            status_message: status_message.into(),
            headers,
            body: body.into(),
        }
    }

    /// A `200 OK` response with the given body, mostly useful for tests and
    /// short-circuiting plugins.
    pub fn ok<B: Into<Vec<u8>>>(body: B) -> Self {
        Response::new(200, "OK", Vec::new(), body)
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First header with the given name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body decoded as UTF-8, lossily.
    pub fn body_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_accessors() {
        let response = Response::new(
            503,
            "Service Unavailable",
            vec![("Content-Type".to_string(), "text/plain".to_string())],
            "down",
        );
        assert!(!response.is_success());
        assert_eq!(response.header("content-type"), Some("text/plain"));
        assert_eq!(response.body_str(), "down");
        assert!(Response::ok("{}").is_success());
    }
}
