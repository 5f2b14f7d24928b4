//! Spellcheck component (`spellcheck=true`).

use serde_json::Value;

use crate::component::{Component, ComponentType};
use crate::error::Result;
use crate::request::Request;
use crate::util::named_list;

/// Spellcheck component.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Spellcheck {
    pub query: Option<String>,
    pub build: Option<bool>,
    pub reload: Option<bool>,
    pub dictionaries: Vec<String>,
    pub count: Option<u32>,
    pub only_more_popular: Option<bool>,
    pub alternative_term_count: Option<u32>,
    pub extended_results: Option<bool>,
    pub collate: Option<bool>,
    pub max_collations: Option<u32>,
    pub max_collation_tries: Option<u32>,
    pub max_collation_evaluations: Option<u32>,
    pub collate_extended_results: Option<bool>,
    pub accuracy: Option<f64>,
    collate_params: Vec<(String, String)>,
}

impl Spellcheck {
    pub fn new() -> Self {
        Spellcheck::default()
    }

    /// Check this text instead of `q` (`spellcheck.q`).
    pub fn set_query<S: Into<String>>(&mut self, query: S) -> &mut Self {
        self.query = Some(query.into());
        self
    }

    pub fn set_build(&mut self, build: bool) -> &mut Self {
        self.build = Some(build);
        self
    }

    pub fn set_reload(&mut self, reload: bool) -> &mut Self {
        self.reload = Some(reload);
        self
    }

    pub fn add_dictionary<S: Into<String>>(&mut self, dictionary: S) -> &mut Self {
        self.dictionaries.push(dictionary.into());
        self
    }

    pub fn set_count(&mut self, count: u32) -> &mut Self {
        self.count = Some(count);
        self
    }

    pub fn set_only_more_popular(&mut self, only: bool) -> &mut Self {
        self.only_more_popular = Some(only);
        self
    }

    pub fn set_extended_results(&mut self, extended: bool) -> &mut Self {
        self.extended_results = Some(extended);
        self
    }

    pub fn set_collate(&mut self, collate: bool) -> &mut Self {
        self.collate = Some(collate);
        self
    }

    pub fn set_max_collations(&mut self, max: u32) -> &mut Self {
        self.max_collations = Some(max);
        self
    }

    pub fn set_max_collation_tries(&mut self, max: u32) -> &mut Self {
        self.max_collation_tries = Some(max);
        self
    }

    pub fn set_collate_extended_results(&mut self, extended: bool) -> &mut Self {
        self.collate_extended_results = Some(extended);
        self
    }

    pub fn set_accuracy(&mut self, accuracy: f64) -> &mut Self {
        self.accuracy = Some(accuracy);
        self
    }

    /// Override a query parameter while testing collations
    /// (`spellcheck.collateParam.<name>`).
    pub fn set_collate_param<K: Into<String>, V: Into<String>>(&mut self, name: K, value: V) -> &mut Self {
        let name = name.into();
        let value = value.into();
        match self.collate_params.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.collate_params.push((name, value)),
        }
        self
    }

    pub fn collate_params(&self) -> &[(String, String)] {
        &self.collate_params
    }
}

impl Component for Spellcheck {
    fn component_type(&self) -> ComponentType {
        ComponentType::Spellcheck
    }

    fn build(&self, request: &mut Request) -> Result<()> {
        request.set_param("spellcheck", true);
        request.set_param("spellcheck.q", self.query.as_deref());
        request.set_param("spellcheck.build", self.build);
        request.set_param("spellcheck.reload", self.reload);
        request.params_mut().add_all("spellcheck.dictionary", &self.dictionaries);
        request.set_param("spellcheck.count", self.count);
        request.set_param("spellcheck.onlyMorePopular", self.only_more_popular);
        request.set_param("spellcheck.alternativeTermCount", self.alternative_term_count);
        request.set_param("spellcheck.extendedResults", self.extended_results);
        request.set_param("spellcheck.collate", self.collate);
        request.set_param("spellcheck.maxCollations", self.max_collations);
        request.set_param("spellcheck.maxCollationTries", self.max_collation_tries);
        request.set_param("spellcheck.maxCollationEvaluations", self.max_collation_evaluations);
        request.set_param("spellcheck.collateExtendedResults", self.collate_extended_results);
        request.set_param("spellcheck.accuracy", self.accuracy);
        for (name, value) in &self.collate_params {
            request.set_param(format!("spellcheck.collateParam.{name}"), value.as_str());
        }
        Ok(())
    }
}

/// A suggested replacement word.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuggestedWord {
    pub word: String,
    /// Only present with extended results.
    pub frequency: Option<u64>,
}

/// Suggestions for one misspelled term.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Suggestion {
    pub original_term: String,
    pub num_found: u64,
    pub start_offset: u64,
    pub end_offset: u64,
    pub original_frequency: Option<u64>,
    pub words: Vec<SuggestedWord>,
}

impl Suggestion {
    fn parse(original_term: String, value: &Value) -> Suggestion {
        let words = named_list::get(value, "suggestion")
            .map(|s| {
                named_list::items(s)
                    .into_iter()
                    .map(|word| match word {
                        Value::String(word) => SuggestedWord {
                            word: word.clone(),
                            frequency: None,
                        },
                        other => SuggestedWord {
                            word: named_list::get_string(other, "word").unwrap_or_default(),
                            frequency: named_list::get_u64(other, "freq"),
                        },
                    })
                    .collect()
            })
            .unwrap_or_default();
        Suggestion {
            original_term,
            num_found: named_list::get_u64(value, "numFound").unwrap_or(0),
            start_offset: named_list::get_u64(value, "startOffset").unwrap_or(0),
            end_offset: named_list::get_u64(value, "endOffset").unwrap_or(0),
            original_frequency: named_list::get_u64(value, "origFreq"),
            words,
        }
    }

    /// The first suggested word.
    pub fn word(&self) -> Option<&str> {
        self.words.first().map(|w| w.word.as_str())
    }
}

/// A rewritten query that returns results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collation {
    pub query: String,
    pub hits: Option<u64>,
    /// `(original, correction)` pairs.
    pub corrections: Vec<(String, String)>,
}

impl Collation {
    fn parse(value: &Value) -> Collation {
        match value {
            Value::String(query) => Collation {
                query: query.clone(),
                ..Default::default()
            },
            other => Collation {
                query: named_list::get_string(other, "collationQuery").unwrap_or_default(),
                hits: named_list::get_u64(other, "hits"),
                corrections: named_list::get(other, "misspellingsAndCorrections")
                    .map(|c| {
                        named_list::entries(c)
                            .into_iter()
                            .map(|(k, v)| (k, named_list::value_to_string(v)))
                            .collect()
                    })
                    .unwrap_or_default(),
            },
        }
    }
}

/// Parsed `spellcheck` section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpellcheckResult {
    pub suggestions: Vec<Suggestion>,
    pub correctly_spelled: Option<bool>,
    pub collations: Vec<Collation>,
}

impl SpellcheckResult {
    pub fn parse(data: &Value) -> SpellcheckResult {
        let Some(section) = named_list::get(data, "spellcheck") else {
            return SpellcheckResult::default();
        };
        let mut result = SpellcheckResult {
            correctly_spelled: named_list::get_bool(section, "correctlySpelled"),
            ..Default::default()
        };
        if let Some(suggestions) = named_list::get(section, "suggestions") {
            for (key, value) in named_list::entries(suggestions) {
                // Older Solr versions report these inside the suggestion list.
                match key.as_str() {
                    "correctlySpelled" => result.correctly_spelled = named_list::as_bool(value),
                    "collation" => result.collations.push(Collation::parse(value)),
                    _ => result.suggestions.push(Suggestion::parse(key, value)),
                }
            }
        }
        if let Some(collations) = named_list::get(section, "collations") {
            result.collations.extend(
                named_list::entries(collations)
                    .into_iter()
                    .filter(|(k, _)| k == "collation")
                    .map(|(_, v)| Collation::parse(v)),
            );
        }
        result
    }

    pub fn suggestion(&self, term: &str) -> Option<&Suggestion> {
        self.suggestions.iter().find(|s| s.original_term == term)
    }

    /// The first collation, if any.
    pub fn collation(&self) -> Option<&Collation> {
        self.collations.first()
    }

    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty() && self.collations.is_empty() && self.correctly_spelled.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Method;
    use serde_json::json;

    #[test]
    fn test_build() {
        let mut spellcheck = Spellcheck::new();
        spellcheck
            .set_query("delll ultrashar")
            .add_dictionary("default")
            .add_dictionary("wordbreak")
            .set_collate(true)
            .set_collate_param("mm", "100%");

        let mut request = Request::new(Method::Get, "select");
        spellcheck.build(&mut request).unwrap();
        assert_eq!(request.param("spellcheck"), Some("true"));
        assert_eq!(request.param("spellcheck.q"), Some("delll ultrashar"));
        assert_eq!(request.params().get("spellcheck.dictionary").unwrap().len(), 2);
        assert_eq!(request.param("spellcheck.collateParam.mm"), Some("100%"));
    }

    #[test]
    fn test_parse_extended() {
        let data = json!({"spellcheck": {
            "suggestions": ["delll", {"numFound": 1, "startOffset": 0, "endOffset": 5, "origFreq": 0,
                                      "suggestion": [{"word": "dell", "freq": 2}]}],
            "correctlySpelled": false,
            "collations": ["collation", {"collationQuery": "dell", "hits": 2,
                                         "misspellingsAndCorrections": ["delll", "dell"]}]
        }});
        let result = SpellcheckResult::parse(&data);
        let suggestion = result.suggestion("delll").unwrap();
        assert_eq!(suggestion.end_offset, 5);
        assert_eq!(suggestion.words[0].frequency, Some(2));
        assert_eq!(result.correctly_spelled, Some(false));
        let collation = result.collation().unwrap();
        assert_eq!(collation.hits, Some(2));
        assert_eq!(collation.corrections, vec![("delll".to_string(), "dell".to_string())]);
    }

    #[test]
    fn test_parse_simple_with_inline_collation() {
        let data = json!({"spellcheck": {"suggestions": [
            "hell", {"numFound": 1, "startOffset": 0, "endOffset": 4, "suggestion": ["dell"]},
            "correctlySpelled", false,
            "collation", "dell"
        ]}});
        let result = SpellcheckResult::parse(&data);
        assert_eq!(result.suggestion("hell").and_then(|s| s.word()), Some("dell"));
        assert_eq!(result.correctly_spelled, Some(false));
        assert_eq!(result.collation().map(|c| c.query.as_str()), Some("dell"));
    }
}
