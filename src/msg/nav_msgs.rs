//! Definitions for the ROS `nav_msgs` package.

use serde::{Deserialize, Serialize};

use super::RosMessage;
use super::geometry_msgs::{Pose, PoseStamped};
use super::std_msgs::{Header, Time};

/// Metadata about the map.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MapMetaData {
    #[serde(default)]
    pub map_load_time: Time,

    /// The map resolution (meters/cell).
    pub resolution: f32,

    /// Map width (cells).
    pub width: u32,

    /// Map height (cells).
    pub height: u32,

    /// The real-world pose of cell (0,0).
    #[serde(default)]
    pub origin: Pose,
}

/// A 2D grid map in which each cell holds an occupancy probability.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OccupancyGrid {
    #[serde(default)]
    pub header: Header,

    pub info: MapMetaData,

    /// Row-major, starting with (0,0). Values in [0,100], unknown is -1.
    pub data: Vec<i8>,
}

impl RosMessage for OccupancyGrid {
    const TYPE: &'static str = "nav_msgs/OccupancyGrid";
}

/// An array of poses that represents a path for a robot to follow.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Path {
    #[serde(default)]
    pub header: Header,
    #[serde(default)]
    pub poses: Vec<PoseStamped>,
}

impl RosMessage for Path {
    const TYPE: &'static str = "nav_msgs/Path";
}
