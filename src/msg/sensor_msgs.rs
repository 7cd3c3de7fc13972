//! Definitions for the ROS `sensor_msgs` package.

use serde::{Deserialize, Serialize};

use super::RosMessage;
use super::geometry_msgs::Point32;
use super::std_msgs::Header;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelFloat32 {
    pub name: String,
    #[serde(default)]
    pub values: Vec<f32>,
}

/// Collection of 3d points, all in the frame of `header.frame_id`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PointCloud {
    #[serde(default)]
    pub header: Header,
    #[serde(default)]
    pub points: Vec<Point32>,
    #[serde(default)]
    pub channels: Vec<ChannelFloat32>,
}

impl RosMessage for PointCloud {
    const TYPE: &'static str = "sensor_msgs/PointCloud";
}

/// Single scan from a planar laser range-finder.
///
/// rosbridge encodes NaN and infinite ranges as JSON `null`, hence the
/// optional entries.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LaserScan {
    #[serde(default)]
    pub header: Header,
    pub angle_min: f32,
    pub angle_max: f32,
    pub angle_increment: f32,
    #[serde(default)]
    pub time_increment: f32,
    #[serde(default)]
    pub scan_time: f32,
    pub range_min: f32,
    pub range_max: f32,
    #[serde(default)]
    pub ranges: Vec<Option<f32>>,
    #[serde(default)]
    pub intensities: Vec<Option<f32>>,
}

impl RosMessage for LaserScan {
    const TYPE: &'static str = "sensor_msgs/LaserScan";
}
