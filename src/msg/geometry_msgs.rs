//! Definitions for the ROS `geometry_msgs` package.
//!
//! Based on <https://github.com/ros/common_msgs/tree/noetic-devel/geometry_msgs>

use serde::{Deserialize, Serialize};

use super::RosMessage;
use super::std_msgs::Header;

/// Position in free space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

/// Single precision point, used by `sensor_msgs/PointCloud`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point32 {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

/// Orientation in free space in quaternion form.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    #[serde(default = "one")]
    pub w: f64,
}

fn one() -> f64 {
    1.0
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quaternion {
    pub const IDENTITY: Quaternion = Quaternion {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    /// Rotation about the z axis only.
    pub fn from_planar(z: f64, w: f64) -> Self {
        Self { x: 0.0, y: 0.0, z, w }
    }

    /// Rotation about z by `yaw` radians.
    pub fn from_yaw(yaw: f64) -> Self {
        Self::from_planar((yaw / 2.0).sin(), (yaw / 2.0).cos())
    }

    /// Heading about the z axis in radians.
    pub fn yaw(&self) -> f64 {
        (2.0 * (self.w * self.z + self.x * self.y))
            .atan2(1.0 - 2.0 * (self.y * self.y + self.z * self.z))
    }
}

/// Position and orientation in free space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    #[serde(default)]
    pub position: Point,
    #[serde(default)]
    pub orientation: Quaternion,
}

impl RosMessage for Pose {
    const TYPE: &'static str = "geometry_msgs/Pose";
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseStamped {
    #[serde(default)]
    pub header: Header,
    #[serde(default)]
    pub pose: Pose,
}

impl RosMessage for PoseStamped {
    const TYPE: &'static str = "geometry_msgs/PoseStamped";
}

/// Velocity in free space broken into linear and angular parts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Twist {
    pub linear: Vector3,
    pub angular: Vector3,
}

impl Twist {
    /// Planar drive command: forward speed and yaw rate.
    pub fn planar(linear_x: f64, angular_z: f64) -> Self {
        Self {
            linear: Vector3 {
                x: linear_x,
                ..Default::default()
            },
            angular: Vector3 {
                z: angular_z,
                ..Default::default()
            },
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

impl RosMessage for Twist {
    const TYPE: &'static str = "geometry_msgs/Twist";
}

/// Transform between two coordinate frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    #[serde(default)]
    pub translation: Vector3,
    #[serde(default)]
    pub rotation: Quaternion,
}

/// Transform from `header.frame_id` (parent) to `child_frame_id`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformStamped {
    #[serde(default)]
    pub header: Header,
    pub child_frame_id: String,
    #[serde(default)]
    pub transform: Transform,
}
