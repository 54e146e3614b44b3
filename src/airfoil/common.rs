use crate::airfoil::bezier_match::BezierFitParams;
use crate::airfoil::decompose::DecomposeParams;
use crate::airfoil::normalize::NormalizeParams;
use crate::errors::{GeometryError, Result};
use crate::geometry::spline2::LeSearchParams;
use crate::optimize::SimplexParams;
use serde::{Deserialize, Serialize};

/// Tolerances, iteration caps and weights of every geometry operation. Missing fields of a JSON
/// document fall back to their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryParams {
    pub le_search: LeSearchParams,
    pub normalize: NormalizeParams,
    pub decompose: DecomposeParams,
    pub simplex: SimplexParams,
    pub bezier_fit: BezierFitParams,
}

impl GeometryParams {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| GeometryError::Parse {
            line: e.line(),
            reason: e.to_string(),
        })
    }

    pub fn to_json(&self) -> String {
        // Plain data with string keys always serializes
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
