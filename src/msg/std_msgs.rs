//! Definitions for the ROS `std_msgs` package.

use serde::{Deserialize, Serialize};

/// ROS 1 time stamp.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Time {
    #[serde(default)]
    pub secs: u32,
    #[serde(default)]
    pub nsecs: u32,
}

/// Standard metadata for higher-level stamped data types.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Header {
    #[serde(default)]
    pub seq: u32,
    #[serde(default)]
    pub stamp: Time,
    #[serde(default)]
    pub frame_id: String,
}

impl Header {
    pub fn in_frame(frame_id: impl Into<String>) -> Self {
        Self {
            frame_id: frame_id.into(),
            ..Default::default()
        }
    }
}
