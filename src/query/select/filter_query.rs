//! Filter queries (`fq`).

use crate::query::local_parameters::LocalParameters;

/// A uniquely keyed filter query.
///
/// ```
/// use solrium::query::select::FilterQuery;
///
/// let mut fq = FilterQuery::new("stock", "inStock:true");
/// fq.add_tag("stock").set_cache(false).set_cost(100);
/// assert_eq!(fq.render(), "{!tag=stock cache=false cost=100}inStock:true");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FilterQuery {
    key: String,
    query: String,
    pub local_parameters: LocalParameters,
    cache: Option<bool>,
    cost: Option<u32>,
}

impl FilterQuery {
    pub fn new<K: Into<String>, Q: Into<String>>(key: K, query: Q) -> Self {
        FilterQuery {
            key: key.into(),
            query: query.into(),
            local_parameters: LocalParameters::new(),
            cache: None,
            cost: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query<S: Into<String>>(&mut self, query: S) -> &mut Self {
        self.query = query.into();
        self
    }

    /// Tag the filter so facets can exclude it.
    pub fn add_tag<S: Into<String>>(&mut self, tag: S) -> &mut Self {
        self.local_parameters.add_tag(tag);
        self
    }

    pub fn tags(&self) -> &[String] {
        self.local_parameters.tags()
    }

    /// `cache=false` keeps the filter out of the filter cache.
    pub fn set_cache(&mut self, cache: bool) -> &mut Self {
        self.cache = Some(cache);
        self
    }

    pub fn cache(&self) -> Option<bool> {
        self.cache
    }

    /// Evaluation order of non-cached filters.
    pub fn set_cost(&mut self, cost: u32) -> &mut Self {
        self.cost = Some(cost);
        self
    }

    pub fn cost(&self) -> Option<u32> {
        self.cost
    }

    /// The `fq` value with its local parameters.
    pub fn render(&self) -> String {
        let mut params = self.local_parameters.clone();
        if let Some(cache) = self.cache {
            params.set("cache", cache.to_string());
        }
        if let Some(cost) = self.cost {
            params.set("cost", cost.to_string());
        }
        params.apply(&self.query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_filter() {
        let fq = FilterQuery::new("price", "price:[1 TO 300]");
        assert_eq!(fq.render(), "price:[1 TO 300]");
    }

    #[test]
    fn test_tags_are_joined() {
        let mut fq = FilterQuery::new("cat", "cat:electronics");
        fq.add_tag("a").add_tag("b");
        assert_eq!(fq.render(), "{!tag=a,b}cat:electronics");
    }
}
