//! Geometry core for editing 2D airfoils: spline fitting, normalization, thickness and camber
//! decomposition, targeted edits, and Bezier matching.

pub mod airfoil;
pub mod algorithms;
pub mod errors;
pub mod geometry;
pub mod io;
pub mod ops;
pub mod optimize;
pub mod serialize;
pub mod session;

pub use airfoil::common::GeometryParams;
pub use airfoil::{Airfoil, Properties, Side, SurfaceOrder};
pub use errors::{GeometryError, Outcome, Result, Status, Warning};
