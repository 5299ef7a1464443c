use serde::{Deserialize, Serialize};

use crate::exercise::{Direction, Exercise};

use super::landmark::{Landmark, LandmarkIndex};

/// Angle reported when the joint cannot be measured.
pub const SENTINEL_ANGLE: f32 = 180.0;
/// Landmarks below this confidence are treated as absent.
pub const MIN_VISIBILITY: f32 = 0.5;

/// Limb selector shared by angle tracking and haptic targeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Left,
    Right,
    Both,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "LEFT",
            Side::Right => "RIGHT",
            Side::Both => "BOTH",
        }
    }
}

/// Angle at vertex `b` between the rays `b -> a` and `b -> c`, in degrees.
///
/// Never fails: a missing or low-confidence point, or a zero-length ray,
/// yields [`SENTINEL_ANGLE`].
pub fn angle(a: Option<&Landmark>, b: Option<&Landmark>, c: Option<&Landmark>) -> f32 {
    let (Some(a), Some(b), Some(c)) = (a, b, c) else {
        return SENTINEL_ANGLE;
    };
    if [a, b, c].iter().any(|point| !(point.visibility >= MIN_VISIBILITY)) {
        return SENTINEL_ANGLE;
    }

    let (bax, bay) = (a.x - b.x, a.y - b.y);
    let (bcx, bcy) = (c.x - b.x, c.y - b.y);
    let norm_ba = bax.hypot(bay);
    let norm_bc = bcx.hypot(bcy);
    if norm_ba == 0.0 || norm_bc == 0.0 {
        return SENTINEL_ANGLE;
    }

    let cosine = ((bax * bcx + bay * bcy) / (norm_ba * norm_bc)).clamp(-1.0, 1.0);
    cosine.acos().to_degrees()
}

/// Left and right joint angles for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BilateralAngles {
    pub left: f32,
    pub right: f32,
}

/// The angle driving evaluation and the limb it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedAngle {
    pub angle: f32,
    pub side: Side,
}

impl BilateralAngles {
    pub const fn new(left: f32, right: f32) -> Self {
        Self { left, right }
    }

    /// Pick the limb closest to the active posture. Exact ties go to the right limb.
    pub fn tracked(self, direction: Direction) -> TrackedAngle {
        let left_wins = match direction {
            Direction::Flexion => self.left < self.right,
            Direction::Abduction => self.left > self.right,
        };
        if left_wins {
            TrackedAngle {
                angle: self.left,
                side: Side::Left,
            }
        } else {
            TrackedAngle {
                angle: self.right,
                side: Side::Right,
            }
        }
    }
}

/// Measure both limbs using the exercise's joint triples.
pub fn bilateral_angles(landmarks: &[Landmark], exercise: Exercise) -> BilateralAngles {
    let joints = exercise.config().joints;
    let measure = |triple: [LandmarkIndex; 3]| {
        let [a, b, c] = triple.map(|index| landmarks.get(index.index()));
        angle(a, b, c)
    };
    BilateralAngles {
        left: measure(joints.left),
        right: measure(joints.right),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visible(x: f32, y: f32) -> Landmark {
        Landmark::new(x, y, 0.9)
    }

    #[test]
    fn right_angle_is_ninety_degrees() {
        let value = angle(
            Some(&visible(0.0, 1.0)),
            Some(&visible(0.0, 0.0)),
            Some(&visible(1.0, 0.0)),
        );
        assert!((value - 90.0).abs() < 1e-3);
    }

    #[test]
    fn collinear_opposite_points_are_straight() {
        let value = angle(
            Some(&visible(-1.0, 0.0)),
            Some(&visible(0.0, 0.0)),
            Some(&visible(2.0, 0.0)),
        );
        assert!((value - 180.0).abs() < 1e-3);
    }

    #[test]
    fn folded_points_are_zero_degrees() {
        let value = angle(
            Some(&visible(1.0, 0.0)),
            Some(&visible(0.0, 0.0)),
            Some(&visible(3.0, 0.0)),
        );
        assert!(value.abs() < 1e-2);
    }

    #[test]
    fn missing_or_hidden_points_yield_sentinel() {
        let a = visible(0.0, 1.0);
        let b = visible(0.0, 0.0);
        let hidden = Landmark::new(1.0, 0.0, 0.49);
        assert_eq!(angle(None, Some(&b), Some(&a)), SENTINEL_ANGLE);
        assert_eq!(angle(Some(&a), Some(&b), Some(&hidden)), SENTINEL_ANGLE);
        let nan_confidence = Landmark::new(1.0, 0.0, f32::NAN);
        assert_eq!(angle(Some(&a), Some(&b), Some(&nan_confidence)), SENTINEL_ANGLE);
    }

    #[test]
    fn degenerate_vector_yields_sentinel() {
        let b = visible(0.3, 0.3);
        assert_eq!(angle(Some(&b), Some(&b), Some(&visible(0.5, 0.1))), SENTINEL_ANGLE);
    }

    #[test]
    fn angles_stay_within_half_turn() {
        let vertex = visible(0.5, 0.5);
        for step in 0..72 {
            let theta = (step as f32 * 5.0).to_radians();
            let a = visible(0.5 + theta.cos() * 0.2, 0.5 + theta.sin() * 0.2);
            let c = visible(0.7, 0.5);
            let value = angle(Some(&a), Some(&vertex), Some(&c));
            assert!((0.0..=180.0).contains(&value), "angle {value} out of range");
        }
    }

    #[test]
    fn flexion_tracks_smaller_angle_and_ties_go_right() {
        let tracked = BilateralAngles::new(80.0, 170.0).tracked(Direction::Flexion);
        assert_eq!(tracked, TrackedAngle { angle: 80.0, side: Side::Left });
        let tie = BilateralAngles::new(120.0, 120.0).tracked(Direction::Flexion);
        assert_eq!(tie.side, Side::Right);
    }

    #[test]
    fn abduction_tracks_larger_angle_and_ties_go_right() {
        let tracked = BilateralAngles::new(100.0, 20.0).tracked(Direction::Abduction);
        assert_eq!(tracked, TrackedAngle { angle: 100.0, side: Side::Left });
        let tie = BilateralAngles::new(45.0, 45.0).tracked(Direction::Abduction);
        assert_eq!(tie.side, Side::Right);
    }

    #[test]
    fn short_landmark_list_measures_as_sentinel() {
        let angles = bilateral_angles(&[visible(0.1, 0.1); 5], Exercise::Squat);
        assert_eq!(angles, BilateralAngles::new(SENTINEL_ANGLE, SENTINEL_ANGLE));
    }
}
