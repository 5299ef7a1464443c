//! Body landmarks supplied by the external pose estimator and the joint-angle
//! math applied to them.

mod angle;
mod landmark;

pub use angle::{
    BilateralAngles, MIN_VISIBILITY, SENTINEL_ANGLE, Side, TrackedAngle, angle, bilateral_angles,
};
pub use landmark::{Landmark, LandmarkIndex, PoseFrame};

#[cfg(test)]
pub(crate) mod fixtures;
