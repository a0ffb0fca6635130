use bevy::prelude::*;

/// Collapse a raw cell-by-cell path into fewer, longer segments using the
/// external line-of-sight predicate.
///
/// Greedy: from the current anchor, keep extending a straight segment to
/// ever-further waypoints; the last waypoint still visible before a blocked
/// one becomes the next anchor. The final waypoint is always kept so the
/// destination is never lost. Accuracy is bounded by the predicate, which
/// only tests static obstacles.
pub fn smooth_path(waypoints: &[Vec3], has_line_of_sight: impl Fn(Vec3, Vec3) -> bool) -> Vec<Vec3> {
    if waypoints.len() <= 2 {
        return waypoints.to_vec();
    }

    let mut smoothed = Vec::new();
    smoothed.push(waypoints[0]);

    let mut anchor = 0;
    let mut candidate = 1;

    while candidate + 1 < waypoints.len() {
        if !has_line_of_sight(waypoints[anchor], waypoints[candidate + 1]) {
            smoothed.push(waypoints[candidate]);
            anchor = candidate;
        }
        candidate += 1;
    }

    smoothed.push(waypoints[waypoints.len() - 1]);
    smoothed
}
