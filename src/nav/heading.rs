//! Drag-to-heading math for oriented goals.
//!
//! Both functions use `atan2(dx, dy)`, x before y. The preview works in
//! degrees and the goal in radians, each with its own branch thresholds.

use std::f64::consts::PI;

use crate::msg::geometry_msgs::Quaternion;
use crate::state::MapPoint;

/// Screen rotation, in degrees, of the preview arrow while dragging from
/// `anchor` to `current`.
pub fn preview_rotation(anchor: MapPoint, current: MapPoint) -> f64 {
    let d = current - anchor;
    let degrees = d.x.atan2(d.y).to_degrees();
    if (0.0..=180.0).contains(&degrees) {
        degrees + 270.0
    } else {
        degrees - 90.0
    }
}

/// Normalized goal angle, in radians, for a drag from `anchor` to `release`.
pub fn goal_angle(anchor: MapPoint, release: MapPoint) -> f64 {
    let d = release - anchor;
    let theta = d.x.atan2(d.y);
    if (0.0..=PI).contains(&theta) {
        theta + 3.0 * PI / 2.0
    } else {
        theta - PI / 2.0
    }
}

/// Planar goal orientation for a drag, `qz = sin(-θ/2)`, `qw = cos(-θ/2)`.
pub fn goal_orientation(anchor: MapPoint, release: MapPoint) -> Quaternion {
    let theta = goal_angle(anchor, release);
    Quaternion::from_planar((-theta / 2.0).sin(), (-theta / 2.0).cos())
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_4;

    use super::*;
    use crate::state::quaternion_to_screen_angle;

    const ORIGIN: MapPoint = MapPoint::new(0.0, 0.0);

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn north_east_drag_adds_270() {
        assert!(close(preview_rotation(ORIGIN, MapPoint::new(1.0, 1.0)), 315.0));
    }

    #[test]
    fn negative_raw_heading_subtracts_90_without_wrapping() {
        assert!(close(preview_rotation(ORIGIN, MapPoint::new(-1.0, 1.0)), -135.0));
    }

    #[test]
    fn branch_boundaries() {
        // straight "up" in map y: atan2(0, 1) = 0, inside [0, 180]
        assert!(close(preview_rotation(ORIGIN, MapPoint::new(0.0, 1.0)), 270.0));
        // atan2(0, -1) = 180, still inside
        assert!(close(preview_rotation(ORIGIN, MapPoint::new(0.0, -1.0)), 450.0));
        // atan2(-1, 0) = -90, outside
        assert!(close(preview_rotation(ORIGIN, MapPoint::new(-1.0, 0.0)), -180.0));

        assert!(close(goal_angle(ORIGIN, MapPoint::new(0.0, 1.0)), 3.0 * PI / 2.0));
        assert!(close(goal_angle(ORIGIN, MapPoint::new(-1.0, 0.0)), -PI));
    }

    #[test]
    fn goal_orientation_points_along_drag() {
        let q = goal_orientation(ORIGIN, MapPoint::new(1.0, 1.0));
        assert!(close(q.x, 0.0) && close(q.y, 0.0));
        assert!(close(q.z * q.z + q.w * q.w, 1.0));
        // a north-east drag yields a 45 degree yaw
        assert!(close(q.yaw(), FRAC_PI_4));

        let west = goal_orientation(ORIGIN, MapPoint::new(-2.0, 0.0));
        assert!(close(west.yaw().abs(), PI));
    }

    #[test]
    fn preview_and_goal_agree_on_screen_direction() {
        for end in [
            MapPoint::new(1.0, 1.0),
            MapPoint::new(-1.0, 1.0),
            MapPoint::new(0.3, -2.0),
        ] {
            let preview = preview_rotation(ORIGIN, end).rem_euclid(360.0);
            let goal = quaternion_to_screen_angle(&goal_orientation(ORIGIN, end)).rem_euclid(360.0);
            assert!(close(preview, goal) || close((preview - goal).abs(), 360.0));
        }
    }
}
