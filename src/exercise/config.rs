use crate::pose::LandmarkIndex::{self, *};

use super::Exercise;

/// Which way the tracked joint moves when leaving the rest posture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// The joint closes: smaller angles are more active.
    Flexion,
    /// The limb lifts away from the body: larger angles are more active.
    Abduction,
}

/// How the rest posture is confirmed on a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestCheck {
    /// Both limbs must be past the rest angle.
    BothSides,
    /// Only the tracked limb is compared.
    Tracked,
}

/// Landmark triples `(proximal, vertex, distal)` for each limb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JointTriples {
    pub left: [LandmarkIndex; 3],
    pub right: [LandmarkIndex; 3],
}

/// Immutable thresholds and labels for one exercise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExerciseConfig {
    pub exercise: Exercise,
    pub direction: Direction,
    /// Angle past which the limb counts as resting.
    pub rest_angle: f32,
    /// Angle the limb must reach for the rep to count as correct.
    pub active_threshold: f32,
    /// Far bound on correct form, past which the motion overshoots.
    pub correct_limit: Option<f32>,
    /// Stricter angle for perfect form.
    pub perfect_threshold: f32,
    pub active_phase: &'static str,
    pub rest_phase: &'static str,
    pub rest_check: RestCheck,
    pub joints: JointTriples,
}

static TABLE: [ExerciseConfig; 5] = [
    ExerciseConfig {
        exercise: Exercise::Squat,
        direction: Direction::Flexion,
        rest_angle: 160.0,
        active_threshold: 110.0,
        correct_limit: None,
        perfect_threshold: 90.0,
        active_phase: "down",
        rest_phase: "up",
        rest_check: RestCheck::BothSides,
        joints: JointTriples {
            left: [LeftHip, LeftKnee, LeftAnkle],
            right: [RightHip, RightKnee, RightAnkle],
        },
    },
    ExerciseConfig {
        exercise: Exercise::Abduction,
        direction: Direction::Abduction,
        rest_angle: 30.0,
        active_threshold: 90.0,
        correct_limit: Some(170.0),
        perfect_threshold: 150.0,
        active_phase: "up",
        rest_phase: "down",
        rest_check: RestCheck::Tracked,
        joints: JointTriples {
            left: [LeftHip, LeftShoulder, LeftElbow],
            right: [RightHip, RightShoulder, RightElbow],
        },
    },
    ExerciseConfig {
        exercise: Exercise::Elbow,
        direction: Direction::Flexion,
        rest_angle: 160.0,
        active_threshold: 70.0,
        correct_limit: None,
        perfect_threshold: 40.0,
        active_phase: "bent",
        rest_phase: "straight",
        rest_check: RestCheck::Tracked,
        joints: JointTriples {
            left: [LeftShoulder, LeftElbow, LeftWrist],
            right: [RightShoulder, RightElbow, RightWrist],
        },
    },
    ExerciseConfig {
        exercise: Exercise::HipFlex,
        direction: Direction::Flexion,
        rest_angle: 165.0,
        active_threshold: 120.0,
        correct_limit: None,
        perfect_threshold: 100.0,
        active_phase: "flexed",
        rest_phase: "straight",
        rest_check: RestCheck::BothSides,
        joints: JointTriples {
            left: [LeftShoulder, LeftHip, LeftKnee],
            right: [RightShoulder, RightHip, RightKnee],
        },
    },
    ExerciseConfig {
        exercise: Exercise::WristExt,
        direction: Direction::Flexion,
        rest_angle: 165.0,
        active_threshold: 135.0,
        correct_limit: None,
        perfect_threshold: 120.0,
        active_phase: "up",
        rest_phase: "down",
        rest_check: RestCheck::Tracked,
        joints: JointTriples {
            left: [LeftElbow, LeftWrist, LeftIndex],
            right: [RightElbow, RightWrist, RightIndex],
        },
    },
];

pub(super) fn lookup(exercise: Exercise) -> &'static ExerciseConfig {
    match exercise {
        Exercise::Squat => &TABLE[0],
        Exercise::Abduction => &TABLE[1],
        Exercise::Elbow => &TABLE[2],
        Exercise::HipFlex => &TABLE[3],
        Exercise::WristExt => &TABLE[4],
    }
}

impl ExerciseConfig {
    /// Best-angle value meaning "no attempt recorded yet".
    pub fn default_best_angle(&self) -> f32 {
        match self.direction {
            Direction::Flexion => 180.0,
            Direction::Abduction => 0.0,
        }
    }

    pub fn is_correct(&self, angle: f32) -> bool {
        match self.direction {
            Direction::Flexion => angle <= self.active_threshold,
            Direction::Abduction => {
                angle >= self.active_threshold
                    && self.correct_limit.is_none_or(|limit| angle <= limit)
            }
        }
    }

    pub fn is_perfect(&self, angle: f32) -> bool {
        match self.direction {
            Direction::Flexion => angle <= self.perfect_threshold,
            Direction::Abduction => angle >= self.perfect_threshold,
        }
    }

    /// Strict crossing of the active threshold that moves the phase to active.
    pub fn enters_active(&self, angle: f32) -> bool {
        match self.direction {
            Direction::Flexion => angle < self.active_threshold,
            Direction::Abduction => angle > self.active_threshold,
        }
    }

    pub fn past_rest(&self, angle: f32) -> bool {
        match self.direction {
            Direction::Flexion => angle > self.rest_angle,
            Direction::Abduction => angle < self.rest_angle,
        }
    }

    /// Starting posture: both limbs past the rest angle.
    pub fn in_start_position(&self, left: f32, right: f32) -> bool {
        self.past_rest(left) && self.past_rest(right)
    }

    pub fn in_rest(&self, left: f32, right: f32, tracked: f32) -> bool {
        match self.rest_check {
            RestCheck::BothSides => self.past_rest(left) && self.past_rest(right),
            RestCheck::Tracked => self.past_rest(tracked),
        }
    }

    /// Keep whichever angle came closest to the active posture.
    pub fn closer_to_active(&self, best: f32, angle: f32) -> f32 {
        match self.direction {
            Direction::Flexion => best.min(angle),
            Direction::Abduction => best.max(angle),
        }
    }

    /// How far the best angle stayed short of the active threshold.
    ///
    /// Negative when the threshold was cleared.
    pub fn shortfall(&self, best: f32) -> f32 {
        match self.direction {
            Direction::Flexion => best - self.active_threshold,
            Direction::Abduction => self.active_threshold - best,
        }
    }
}
