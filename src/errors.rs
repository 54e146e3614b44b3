use serde::Serialize;
use thiserror::Error;

/// Errors raised by the geometry core. None of these leave a partial result behind: the caller
/// keeps whatever airfoil it passed in.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("not enough points: {needed} required, {found} given")]
    NotEnoughPoints { needed: usize, found: usize },

    #[error("coordinate {index} is not a finite number")]
    InvalidCoordinate { index: usize },

    #[error("points {index} and {} coincide", .index + 1)]
    DegeneratePoints { index: usize },

    #[error("knot values are not strictly increasing at index {index}")]
    NotStrictlyIncreasing { index: usize },

    #[error("the spline equations are singular")]
    SingularSystem,

    #[error("length mismatch: {0} x-values but {1} y-values")]
    LengthMismatch(usize, usize),

    #[error("invalid parameter '{name}': {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("thickness becomes negative at x = {x:.5}")]
    NegativeThickness { x: f64 },

    #[error("high point position {0} is outside of (0, 1)")]
    HighPointOutOfRange(f64),

    #[error("the high point remap from {from} to {to} is not monotonic")]
    NonMonotonicMap { from: f64, to: f64 },

    #[error("thickness and camber are not defined on the same stations")]
    StationMismatch,

    #[error("could not parse line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

pub type Result<T> = std::result::Result<T, GeometryError>;

/// Non fatal conditions. The operation that raised one still produced its best result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Warning {
    /// The normalization loop hit its iteration cap. Carries the remaining distance between
    /// the spline leading edge and the leading edge vertex.
    NormalizeNotConverged { iterations: usize, deviation: f64 },

    /// The spline leading edge could not be bracketed, the vertex with minimum x was used.
    LeadingEdgeNotFound,

    /// The simplex search ran out of evaluations before the objective settled.
    SimplexNotConverged { evaluations: usize, objective: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Status {
    Success,
    Warning(Warning),
}

impl Status {
    pub fn is_success(&self) -> bool {
        matches!(self, Status::Success)
    }

    /// Keeps the first warning of two statuses.
    pub fn and(self, other: Status) -> Status {
        match self {
            Status::Success => other,
            w => w,
        }
    }
}

/// A result value together with the status of the computation that produced it
#[derive(Debug, Clone)]
pub struct Outcome<T> {
    pub value: T,
    pub status: Status,
}

impl<T> Outcome<T> {
    pub fn success(value: T) -> Self {
        Outcome {
            value,
            status: Status::Success,
        }
    }

    pub fn warning(value: T, warning: Warning) -> Self {
        Outcome {
            value,
            status: Status::Warning(warning),
        }
    }

    pub fn with_status(value: T, status: Status) -> Self {
        Outcome { value, status }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            value: f(self.value),
            status: self.status,
        }
    }
}
