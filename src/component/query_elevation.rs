//! Query elevation component.

use crate::component::{Component, ComponentType};
use crate::error::Result;
use crate::request::Request;

const ELEVATED_TRANSFORMER: &str = "[elevated]";
const EXCLUDED_TRANSFORMER: &str = "[excluded]";

/// Query elevation component.
///
/// Adds the `[elevated]` document transformer to `fl`, and `[excluded]`
/// when excluded documents are marked instead of removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryElevation {
    pub enable_elevation: Option<bool>,
    pub force_elevation: Option<bool>,
    pub exclusive: Option<bool>,
    pub mark_excludes: Option<bool>,
    elevate_ids: Vec<String>,
    exclude_ids: Vec<String>,
}

impl QueryElevation {
    pub fn new() -> Self {
        QueryElevation::default()
    }

    pub fn set_enable_elevation(&mut self, enable: bool) -> &mut Self {
        self.enable_elevation = Some(enable);
        self
    }

    pub fn set_force_elevation(&mut self, force: bool) -> &mut Self {
        self.force_elevation = Some(force);
        self
    }

    pub fn set_exclusive(&mut self, exclusive: bool) -> &mut Self {
        self.exclusive = Some(exclusive);
        self
    }

    pub fn set_mark_excludes(&mut self, mark: bool) -> &mut Self {
        self.mark_excludes = Some(mark);
        self
    }

    pub fn set_elevate_ids<I, S>(&mut self, ids: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.elevate_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn set_exclude_ids<I, S>(&mut self, ids: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn elevate_ids(&self) -> &[String] {
        &self.elevate_ids
    }

    pub fn exclude_ids(&self) -> &[String] {
        &self.exclude_ids
    }
}

fn add_transformer(request: &mut Request, transformer: &str) {
    let fl = request.param("fl").unwrap_or_default().to_string();
    if fl.split(',').any(|f| f.trim() == transformer) {
        return;
    }
    let fl = if fl.is_empty() {
        transformer.to_string()
    } else {
        format!("{fl},{transformer}")
    };
    request.set_param("fl", fl);
}

impl Component for QueryElevation {
    fn component_type(&self) -> ComponentType {
        ComponentType::QueryElevation
    }

    fn build(&self, request: &mut Request) -> Result<()> {
        add_transformer(request, ELEVATED_TRANSFORMER);
        if self.mark_excludes == Some(true) {
            add_transformer(request, EXCLUDED_TRANSFORMER);
        }
        request.set_param("enableElevation", self.enable_elevation);
        request.set_param("forceElevation", self.force_elevation);
        request.set_param("exclusive", self.exclusive);
        request.set_param("markExcludes", self.mark_excludes);
        request.set_param("elevateIds", self.elevate_ids.join(","));
        request.set_param("excludeIds", self.exclude_ids.join(","));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Method;

    #[test]
    fn test_build_adds_transformers() {
        let mut elevation = QueryElevation::new();
        elevation
            .set_force_elevation(true)
            .set_mark_excludes(true)
            .set_elevate_ids(["doc1", "doc2"])
            .set_exclude_ids(["doc3"]);

        let mut request = Request::new(Method::Get, "select");
        request.set_param("fl", "*,score");
        elevation.build(&mut request).unwrap();
        assert_eq!(request.param("fl"), Some("*,score,[elevated],[excluded]"));
        assert_eq!(request.param("elevateIds"), Some("doc1,doc2"));
        assert_eq!(request.param("excludeIds"), Some("doc3"));
        assert_eq!(request.param("forceElevation"), Some("true"));

        elevation.build(&mut request).unwrap();
        assert_eq!(request.param("fl"), Some("*,score,[elevated],[excluded]"));
    }
}
