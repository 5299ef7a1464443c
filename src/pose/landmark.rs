use serde::{Deserialize, Serialize};

/// Indices into the 33-point body topology emitted by the pose estimator.
///
/// Only the joints used by the supported exercises are named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum LandmarkIndex {
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftIndex = 19,
    RightIndex = 20,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
}

impl LandmarkIndex {
    /// Number of landmarks in a full frame.
    pub const COUNT: usize = 33;

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// A single detected joint in normalized image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    /// Detection confidence in `[0, 1]`; fully visible when omitted.
    #[serde(default = "fully_visible")]
    pub visibility: f32,
}

fn fully_visible() -> f32 {
    1.0
}

impl Landmark {
    pub const fn new(x: f32, y: f32, visibility: f32) -> Self {
        Self { x, y, visibility }
    }
}

/// Estimator output for one captured frame.
///
/// `landmarks` is `None` when no body was detected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseFrame {
    #[serde(default)]
    pub landmarks: Option<Vec<Landmark>>,
}

impl PoseFrame {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self {
            landmarks: Some(landmarks),
        }
    }

    /// A frame in which the estimator found no body.
    pub fn no_pose() -> Self {
        Self { landmarks: None }
    }

    pub fn get(&self, index: LandmarkIndex) -> Option<&Landmark> {
        self.landmarks.as_ref()?.get(index.index())
    }

    pub fn has_pose(&self) -> bool {
        self.landmarks.as_ref().is_some_and(|points| !points.is_empty())
    }
}
