//! Spatial search parameters (`sfield`, `pt`, `d`).
//!
//! Use with `{!geofilt}`/`{!bbox}` filter queries or `geodist()` sorting;
//! see [`crate::query::helper::geofilt`] for the self-contained form.

use crate::component::{Component, ComponentType};
use crate::error::Result;
use crate::request::Request;

#[derive(Debug, Clone, PartialEq)]
pub struct Spatial {
    pub field: String,
    /// `"lat,lon"`.
    pub point: String,
    pub distance: f64,
}

impl Spatial {
    pub fn new<F: Into<String>, P: Into<String>>(field: F, point: P, distance: f64) -> Self {
        Spatial {
            field: field.into(),
            point: point.into(),
            distance,
        }
    }
}

impl Component for Spatial {
    fn component_type(&self) -> ComponentType {
        ComponentType::Spatial
    }

    fn build(&self, request: &mut Request) -> Result<()> {
        request.set_param("sfield", self.field.as_str());
        request.set_param("pt", self.point.as_str());
        request.set_param("d", self.distance);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Method;

    #[test]
    fn test_build() {
        let spatial = Spatial::new("store", "45.15,-93.85", 5.0);
        let mut request = Request::new(Method::Get, "select");
        spatial.build(&mut request).unwrap();
        assert_eq!(request.param("sfield"), Some("store"));
        assert_eq!(request.param("pt"), Some("45.15,-93.85"));
        assert_eq!(request.param("d"), Some("5"));
    }
}
