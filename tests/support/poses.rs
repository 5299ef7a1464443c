use physio_coach::exercise::Exercise;
use physio_coach::pose::{Landmark, LandmarkIndex};

/// Landmarks with the exercise's left and right joints bent to the given angles.
pub fn pose(exercise: Exercise, left: f32, right: f32) -> Vec<Landmark> {
    let mut points = vec![Landmark::new(0.5, 0.9, 1.0); LandmarkIndex::COUNT];
    let joints = exercise.config().joints;
    bend(&mut points, joints.left, 0.3, left);
    bend(&mut points, joints.right, 0.7, right);
    points
}

fn bend(points: &mut [Landmark], [proximal, vertex, distal]: [LandmarkIndex; 3], x: f32, degrees: f32) {
    let theta = degrees.to_radians();
    points[proximal.index()] = Landmark::new(x, 0.3, 1.0);
    points[vertex.index()] = Landmark::new(x, 0.5, 1.0);
    points[distal.index()] = Landmark::new(x + 0.2 * theta.sin(), 0.5 - 0.2 * theta.cos(), 1.0);
}

/// One JSON-lines frame record at `t` seconds.
pub fn frame_line(exercise: Exercise, t: f64, left: f32, right: f32) -> String {
    let landmarks = pose(exercise, left, right)
        .iter()
        .map(|point| {
            format!(
                "{{\"x\":{},\"y\":{},\"visibility\":{}}}",
                point.x, point.y, point.visibility
            )
        })
        .collect::<Vec<_>>()
        .join(",");
    format!("{{\"t\":{t},\"landmarks\":[{landmarks}]}}")
}
