//! Periodic box geometry and the minimum-image primitives the energy kernel relies on.

pub mod periodic_box;

pub use periodic_box::{BoxError, BoxType, PeriodicBox, angle_in_degrees, torsion_in_degrees};
