pub mod bezier;
pub mod curve2;
pub mod distances2;
pub mod spline1;
pub mod spline2;
