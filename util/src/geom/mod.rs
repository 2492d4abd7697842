//! # 2D rigid body geometry
//!
//! Poses, transforms and twists on the XY plane, used by path planning to
//! describe where the robot is and how it moves between poses.
//!
//! Headings are held as unit complex numbers, and are measured
//! anticlockwise from the +ve X axis.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod pose;
mod transform;
mod twist;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use pose::*;
pub use transform::*;
pub use twist::*;

/// Re-export the nalgebra types used in the public interface of this module.
pub use nalgebra::{UnitComplex, Vector2};
