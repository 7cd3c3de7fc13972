//! ROS message definitions as they travel through rosbridge.
//!
//! Field names and nesting follow the ROS 1 message definitions so that the
//! JSON produced by rosbridge deserializes without any remapping.

pub mod actionlib_msgs;
pub mod geometry_msgs;
pub mod move_base_msgs;
pub mod nav_msgs;
pub mod sensor_msgs;
pub mod std_msgs;
pub mod tf2_msgs;

/// A message with a fixed ROS type name, e.g. `geometry_msgs/Twist`.
pub trait RosMessage {
    const TYPE: &'static str;
}
