use crate::exercise::Exercise;

use super::landmark::{Landmark, LandmarkIndex};

/// A full landmark set whose left and right joints for `exercise` bend to
/// the requested angles. Unused points sit at visible, distinct positions.
pub(crate) fn pose_with_angles(exercise: Exercise, left: f32, right: f32) -> Vec<Landmark> {
    let mut points: Vec<Landmark> = (0..LandmarkIndex::COUNT)
        .map(|idx| Landmark::new(0.01 * idx as f32, 0.9, 1.0))
        .collect();
    let joints = exercise.config().joints;
    place_joint(&mut points, joints.left, 0.3, left);
    place_joint(&mut points, joints.right, 0.7, right);
    points
}

fn place_joint(points: &mut [Landmark], triple: [LandmarkIndex; 3], x: f32, degrees: f32) {
    let [proximal, vertex, distal] = triple;
    let theta = degrees.to_radians();
    points[vertex.index()] = Landmark::new(x, 0.5, 1.0);
    points[proximal.index()] = Landmark::new(x, 0.3, 1.0);
    points[distal.index()] = Landmark::new(x + 0.2 * theta.sin(), 0.5 - 0.2 * theta.cos(), 1.0);
}
