//! The named atomic operations an editing session applies to a design.

use crate::airfoil::bezier_match::match_bezier;
use crate::airfoil::common::GeometryParams;
use crate::airfoil::decompose::DistributionKind;
use crate::airfoil::edit::{set_high_point, set_le_radius, set_max_camber, set_max_thickness, set_te_gap};
use crate::airfoil::normalize::normalize;
use crate::airfoil::panel::{repanel, PanelParams};
use crate::airfoil::Airfoil;
use crate::errors::{Outcome, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op")]
pub enum Operation {
    Normalize,
    SetMaxThickness { value: f64 },
    SetMaxCamber { value: f64 },
    SetHighPoint { kind: DistributionKind, x: f64 },
    SetTeGap { gap: f64, blend: f64 },
    SetLeRadius { factor: f64, blend: f64 },
    Repanel(PanelParams),

    /// Replaces the design by Bezier curves, `control_points` per side or the configured count
    MatchBezier { control_points: Option<usize> },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Normalize => "normalize",
            Operation::SetMaxThickness { .. } => "set max thickness",
            Operation::SetMaxCamber { .. } => "set max camber",
            Operation::SetHighPoint { kind: DistributionKind::Thickness, .. } => "set max thickness x",
            Operation::SetHighPoint { kind: DistributionKind::Camber, .. } => "set max camber x",
            Operation::SetTeGap { .. } => "set te gap",
            Operation::SetLeRadius { .. } => "set le radius",
            Operation::Repanel(_) => "repanel",
            Operation::MatchBezier { .. } => "match bezier",
        }
    }
}

/// Applies one operation and returns the new design. The input is never modified.
pub fn apply(airfoil: &Airfoil, operation: &Operation, params: &GeometryParams) -> Result<Outcome<Airfoil>> {
    debug!(operation = operation.name(), airfoil = airfoil.name(), "apply");
    match operation {
        Operation::Normalize => normalize(airfoil, params),
        Operation::SetMaxThickness { value } => set_max_thickness(airfoil, *value, params),
        Operation::SetMaxCamber { value } => set_max_camber(airfoil, *value, params),
        Operation::SetHighPoint { kind, x } => set_high_point(airfoil, *kind, *x, params),
        Operation::SetTeGap { gap, blend } => set_te_gap(airfoil, *gap, *blend, params),
        Operation::SetLeRadius { factor, blend } => set_le_radius(airfoil, *factor, *blend, params),
        Operation::Repanel(panel) => repanel(airfoil, panel, params),
        Operation::MatchBezier { control_points } => match control_points {
            Some(n) => {
                let mut p = params.clone();
                p.bezier_fit.control_points = *n;
                match_bezier(airfoil, &p)
            }
            None => match_bezier(airfoil, params),
        },
    }
}
