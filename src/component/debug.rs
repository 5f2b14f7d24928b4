//! Query debugging component (`debugQuery=true`).

use serde_json::Value;

use crate::component::{Component, ComponentType};
use crate::error::Result;
use crate::request::Request;
use crate::util::named_list;

/// Debug component.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDebug {
    pub explain_other: Option<String>,
    /// Request the explain output as a structure instead of text.
    pub structured: bool,
}

impl Default for QueryDebug {
    fn default() -> Self {
        QueryDebug {
            explain_other: None,
            structured: true,
        }
    }
}

impl QueryDebug {
    pub fn new() -> Self {
        QueryDebug::default()
    }

    pub fn set_explain_other<S: Into<String>>(&mut self, query: S) -> &mut Self {
        self.explain_other = Some(query.into());
        self
    }

    pub fn set_structured(&mut self, structured: bool) -> &mut Self {
        self.structured = structured;
        self
    }
}

impl Component for QueryDebug {
    fn component_type(&self) -> ComponentType {
        ComponentType::Debug
    }

    fn build(&self, request: &mut Request) -> Result<()> {
        request.set_param("debugQuery", true);
        if self.structured {
            request.set_param("debug.explain.structured", true);
        }
        request.set_param("explainOther", self.explain_other.as_deref());
        Ok(())
    }
}

/// One node of a structured explanation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Explanation {
    pub is_match: bool,
    pub value: f64,
    pub description: String,
    pub details: Vec<Explanation>,
}

impl Explanation {
    fn parse(value: &Value) -> Explanation {
        match value {
            // Unstructured explain output is a plain string.
            Value::String(text) => Explanation {
                is_match: true,
                value: 0.0,
                description: text.clone(),
                details: Vec::new(),
            },
            _ => Explanation {
                is_match: named_list::get_bool(value, "match").unwrap_or(false),
                value: named_list::get_f64(value, "value").unwrap_or(0.0),
                description: named_list::get_string(value, "description").unwrap_or_default(),
                details: named_list::get(value, "details")
                    .map(|d| named_list::items(d).into_iter().map(Explanation::parse).collect())
                    .unwrap_or_default(),
            },
        }
    }
}

/// Time spent in one search component, in milliseconds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimingPhase {
    pub name: String,
    pub time: f64,
    pub components: Vec<(String, f64)>,
}

impl TimingPhase {
    fn parse(name: String, value: &Value) -> TimingPhase {
        TimingPhase {
            name,
            time: named_list::get_f64(value, "time").unwrap_or(0.0),
            components: named_list::entries(value)
                .into_iter()
                .filter(|(k, _)| k != "time")
                .map(|(k, v)| (k, named_list::get_f64(v, "time").unwrap_or(0.0)))
                .collect(),
        }
    }
}

/// Timing breakdown of a request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timing {
    pub time: f64,
    pub phases: Vec<TimingPhase>,
}

impl Timing {
    pub fn phase(&self, name: &str) -> Option<&TimingPhase> {
        self.phases.iter().find(|p| p.name == name)
    }
}

/// Parsed `debug` section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DebugResult {
    pub query_string: Option<String>,
    pub parsed_query: Option<String>,
    pub query_parser: Option<String>,
    pub other_query: Option<String>,
    /// Document key → explanation.
    pub explain: Vec<(String, Explanation)>,
    pub explain_other: Vec<(String, Explanation)>,
    pub timing: Option<Timing>,
}

impl DebugResult {
    pub fn parse(data: &Value) -> DebugResult {
        let Some(debug) = named_list::get(data, "debug") else {
            return DebugResult::default();
        };
        let explanations = |key: &str| {
            named_list::get(debug, key)
                .map(|e| {
                    named_list::entries(e)
                        .into_iter()
                        .map(|(k, v)| (k, Explanation::parse(v)))
                        .collect()
                })
                .unwrap_or_default()
        };
        DebugResult {
            query_string: named_list::get_string(debug, "querystring"),
            parsed_query: named_list::get_string(debug, "parsedquery"),
            query_parser: named_list::get_string(debug, "QParser"),
            other_query: named_list::get_string(debug, "otherQuery"),
            explain: explanations("explain"),
            explain_other: explanations("explainOther"),
            timing: named_list::get(debug, "timing").map(|timing| Timing {
                time: named_list::get_f64(timing, "time").unwrap_or(0.0),
                phases: named_list::entries(timing)
                    .into_iter()
                    .filter(|(k, _)| k != "time")
                    .map(|(k, v)| TimingPhase::parse(k, v))
                    .collect(),
            }),
        }
    }

    pub fn explanation(&self, key: &str) -> Option<&Explanation> {
        self.explain.iter().find(|(k, _)| k == key).map(|(_, e)| e)
    }

    pub fn is_empty(&self) -> bool {
        self.query_string.is_none() && self.explain.is_empty() && self.timing.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Method;
    use serde_json::json;

    #[test]
    fn test_build() {
        let mut debug = QueryDebug::new();
        debug.set_explain_other("id:MA*");
        let mut request = Request::new(Method::Get, "select");
        debug.build(&mut request).unwrap();
        assert_eq!(request.param("debugQuery"), Some("true"));
        assert_eq!(request.param("debug.explain.structured"), Some("true"));
        assert_eq!(request.param("explainOther"), Some("id:MA*"));
    }

    #[test]
    fn test_parse_structured_explain_and_timing() {
        let data = json!({"debug": {
            "querystring": "ipod",
            "parsedquery": "text:ipod",
            "QParser": "LuceneQParser",
            "explain": {"IW-02": {"match": true, "value": 0.5, "description": "weight(text:ipod)",
                "details": [{"match": true, "value": 0.25, "description": "tf"}]}},
            "timing": {"time": 2.0,
                "prepare": {"time": 1.0, "query": {"time": 1.0}},
                "process": {"time": 1.0, "query": {"time": 0.5}, "facet": {"time": 0.5}}}
        }});
        let result = DebugResult::parse(&data);
        assert_eq!(result.query_parser.as_deref(), Some("LuceneQParser"));
        let explain = result.explanation("IW-02").unwrap();
        assert!(explain.is_match);
        assert_eq!(explain.details[0].description, "tf");
        let timing = result.timing.unwrap();
        assert_eq!(timing.phases.len(), 2);
        assert_eq!(timing.phase("process").unwrap().components.len(), 2);
    }

    #[test]
    fn test_plain_text_explain() {
        let data = json!({"debug": {"explain": ["doc1", "0.5 = weight(text:a)"]}});
        let result = DebugResult::parse(&data);
        assert_eq!(result.explain[0].1.description, "0.5 = weight(text:a)");
    }
}
