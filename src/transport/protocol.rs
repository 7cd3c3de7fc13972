//! rosbridge v2 operations.
//!
//! Only the operations this console needs are modelled. Unknown incoming
//! operations decode to [`Incoming::Unsupported`] and are ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;

fn is_zero(v: &u32) -> bool {
    *v == 0
}

/// Frames sent to the bridge.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Outgoing {
    Advertise {
        id: String,
        topic: String,
        #[serde(rename = "type")]
        msg_type: String,
    },
    Publish {
        topic: String,
        msg: Value,
    },
    Subscribe {
        id: String,
        topic: String,
        #[serde(rename = "type")]
        msg_type: String,
        /// Minimum interval between delivered messages, in milliseconds.
        #[serde(skip_serializing_if = "is_zero")]
        throttle_rate: u32,
        queue_length: u32,
    },
}

/// Frames received from the bridge.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Incoming {
    Publish {
        topic: String,
        msg: Value,
    },
    Status {
        #[serde(default)]
        level: String,
        #[serde(default)]
        msg: String,
        #[serde(default)]
        id: Option<String>,
    },
    #[serde(other)]
    Unsupported,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn subscribe_omits_zero_throttle() {
        let op = Outgoing::Subscribe {
            id: "subscribe:/map:1".into(),
            topic: "/map".into(),
            msg_type: "nav_msgs/OccupancyGrid".into(),
            throttle_rate: 0,
            queue_length: 1,
        };
        let v = serde_json::to_value(&op).unwrap();
        assert_eq!(v["op"], "subscribe");
        assert_eq!(v["type"], "nav_msgs/OccupancyGrid");
        assert!(v.get("throttle_rate").is_none());

        let throttled = Outgoing::Subscribe {
            id: "subscribe:/robot_pose:2".into(),
            topic: "/robot_pose".into(),
            msg_type: "geometry_msgs/Pose".into(),
            throttle_rate: 100,
            queue_length: 1,
        };
        assert_eq!(serde_json::to_value(&throttled).unwrap()["throttle_rate"], 100);
    }

    #[test]
    fn incoming_frames_decode_by_op() {
        let frame: Incoming =
            serde_json::from_value(json!({"op": "publish", "topic": "/tf", "msg": {"transforms": []}}))
                .unwrap();
        assert_eq!(
            frame,
            Incoming::Publish {
                topic: "/tf".into(),
                msg: json!({"transforms": []})
            }
        );

        let status: Incoming =
            serde_json::from_value(json!({"op": "status", "level": "error", "msg": "no such topic"}))
                .unwrap();
        assert!(matches!(status, Incoming::Status { ref level, .. } if level == "error"));

        let other: Incoming =
            serde_json::from_value(json!({"op": "service_response", "values": {}})).unwrap();
        assert_eq!(other, Incoming::Unsupported);
    }
}
