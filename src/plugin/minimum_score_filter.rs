//! Drops select results scoring far below the best match.
//!
//! `score` is added to the field list of every select request. Once the
//! result is parsed, documents whose score is below `ratio × max_score`
//! are removed from the document list. `numFound` is left as reported by
//! Solr.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SolriumError};
use crate::plugin::Plugin;
use crate::query::{Query, QueryType};
use crate::registry::SolrResult;
use crate::request::Request;
use crate::response::Response;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinimumScoreFilterConfig {
    /// Fraction of the maximum score a document needs, in `0.0..=1.0`.
    pub ratio: f64,
}

impl Default for MinimumScoreFilterConfig {
    fn default() -> Self {
        MinimumScoreFilterConfig { ratio: 0.5 }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MinimumScoreFilter {
    config: MinimumScoreFilterConfig,
}

impl MinimumScoreFilter {
    pub fn new(ratio: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(SolriumError::invalid_argument(format!(
                "Minimum score ratio must be within 0 and 1, got {ratio}"
            )));
        }
        Ok(MinimumScoreFilter {
            config: MinimumScoreFilterConfig { ratio },
        })
    }

    pub fn from_config(config: MinimumScoreFilterConfig) -> Self {
        MinimumScoreFilter {
            config: MinimumScoreFilterConfig {
                ratio: config.ratio.clamp(0.0, 1.0),
            },
        }
    }

    pub fn ratio(&self) -> f64 {
        self.config.ratio
    }
}

impl Plugin for MinimumScoreFilter {
    fn post_create_request(&self, query: &dyn Query, request: &mut Request) -> Result<()> {
        if query.query_type() != QueryType::Select {
            return Ok(());
        }
        let fields = match request.param("fl") {
            None => "*,score".to_string(),
            Some(fl) if fl.split([',', ' ']).any(|f| f.trim() == "score") => return Ok(()),
            Some(fl) => format!("{fl},score"),
        };
        request.set_param("fl", fields);
        Ok(())
    }

    fn post_create_result(
        &self,
        _query: &dyn Query,
        _response: &Response,
        result: &mut SolrResult,
    ) -> Result<()> {
        let SolrResult::Select(select) = result else {
            return Ok(());
        };
        let max_score = select.max_score().or_else(|| {
            select
                .iter()
                .filter_map(|d| d.get_f64("score"))
                .reduce(f64::max)
        });
        let Some(max_score) = max_score else {
            return Ok(());
        };

        let threshold = self.config.ratio * max_score;
        let documents = select.documents_mut();
        let before = documents.len();
        documents.retain(|d| d.get_f64("score").is_none_or(|score| score >= threshold));
        debug!(threshold, removed = before - documents.len(), "Filtered low scoring documents");
        Ok(())
    }
}
