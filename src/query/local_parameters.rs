//! Local parameters: the `{!type key=... tag=... ex=...}` prefix that Solr
//! accepts in front of queries, filter queries, facets and stats fields.

use crate::query::helper::{escape_local_param_value, join_local_param_values};

/// Ordered set of local parameters.
///
/// ```
/// use solrium::query::local_parameters::LocalParameters;
///
/// let mut params = LocalParameters::new();
/// params.set_key("brand");
/// params.add_exclude("top");
/// params.add_exclude("price");
/// assert_eq!(params.render(), "{!key=brand ex=top,price}");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalParameters {
    parser_type: Option<String>,
    entries: Vec<(String, Vec<String>)>,
}

impl LocalParameters {
    pub fn new() -> Self {
        LocalParameters::default()
    }

    /// Query parser type rendered first, e.g. `{!edismax ...}`.
    pub fn set_type<S: Into<String>>(&mut self, parser_type: S) {
        self.parser_type = Some(parser_type.into());
    }

    pub fn parser_type(&self) -> Option<&str> {
        self.parser_type.as_deref()
    }

    /// Set a single-valued parameter, replacing any previous value.
    pub fn set<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => *values = vec![value],
            None => self.entries.push((key, vec![value])),
        }
    }

    /// Append a value to a list parameter (rendered comma separated).
    pub fn add<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => {
                if !values.contains(&value) {
                    values.push(value);
                }
            }
            None => self.entries.push((key, vec![value])),
        }
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_slice())
    }

    pub fn remove(&mut self, key: &str) {
        self.entries.retain(|(k, _)| k != key);
    }

    pub fn clear(&mut self) {
        self.parser_type = None;
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.parser_type.is_none() && self.entries.is_empty()
    }

    /// Output key (`key=`), used to rename facets and stats.
    pub fn set_key<S: Into<String>>(&mut self, key: S) {
        self.set("key", key);
    }

    pub fn key(&self) -> Option<&str> {
        self.get("key").and_then(|v| v.first()).map(|s| s.as_str())
    }

    /// Tag (`tag=`), referenced by excludes.
    pub fn add_tag<S: Into<String>>(&mut self, tag: S) {
        self.add("tag", tag);
    }

    pub fn tags(&self) -> &[String] {
        self.get("tag").unwrap_or(&[])
    }

    /// Exclude filters by tag (`ex=`).
    pub fn add_exclude<S: Into<String>>(&mut self, tag: S) {
        self.add("ex", tag);
    }

    pub fn excludes(&self) -> &[String] {
        self.get("ex").unwrap_or(&[])
    }

    /// Query value passed through `v=`.
    pub fn set_local_value<S: Into<String>>(&mut self, value: S) {
        self.set("v", value);
    }

    /// Default field (`df=`).
    pub fn set_default_field<S: Into<String>>(&mut self, field: S) {
        self.set("df", field);
    }

    /// Render the prefix, or an empty string when nothing is set.
    pub fn render(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        let mut parts = Vec::with_capacity(self.entries.len() + 1);
        if let Some(parser_type) = &self.parser_type {
            parts.push(parser_type.clone());
        }
        for (key, values) in &self.entries {
            let value = if values.len() == 1 {
                escape_local_param_value(&values[0], None)
            } else {
                join_local_param_values(values, ",")
            };
            parts.push(format!("{key}={value}"));
        }
        format!("{{!{}}}", parts.join(" "))
    }

    /// Render the prefix followed by a value.
    pub fn apply(&self, value: &str) -> String {
        format!("{}{value}", self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_renders_nothing() {
        let params = LocalParameters::new();
        assert_eq!(params.render(), "");
        assert_eq!(params.apply("cat"), "cat");
    }

    #[test]
    fn test_type_and_escaping() {
        let mut params = LocalParameters::new();
        params.set_type("terms");
        params.set("f", "cat");
        params.add_tag("a b");
        params.add_tag("c");
        params.set_key("my key");
        assert_eq!(params.render(), "{!terms f=cat tag='a b,c' key='my key'}");
    }

    #[test]
    fn test_duplicate_list_values_ignored() {
        let mut params = LocalParameters::new();
        params.add_exclude("x");
        params.add_exclude("x");
        assert_eq!(params.excludes(), &["x".to_string()]);
    }
}
