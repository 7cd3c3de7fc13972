use serde::{Deserialize, Serialize};

use super::RosMessage;
use super::geometry_msgs::TransformStamped;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TFMessage {
    #[serde(default)]
    pub transforms: Vec<TransformStamped>,
}

impl RosMessage for TFMessage {
    const TYPE: &'static str = "tf2_msgs/TFMessage";
}
