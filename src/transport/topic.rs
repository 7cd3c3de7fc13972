use std::marker::PhantomData;
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::ros::Ros;
use crate::error::{Error, Result};
use crate::msg::RosMessage;

/// A named topic carrying messages of type `T`.
pub struct Topic<T> {
    ros: Rc<Ros>,
    name: String,
    msg_type: String,
    throttle_rate: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Topic<T> {
    fn clone(&self) -> Self {
        Self {
            ros: self.ros.clone(),
            name: self.name.clone(),
            msg_type: self.msg_type.clone(),
            throttle_rate: self.throttle_rate,
            _marker: PhantomData,
        }
    }
}

impl<T: RosMessage> Topic<T> {
    pub fn new(ros: &Rc<Ros>, name: impl Into<String>) -> Self {
        Self::with_type(ros, name, T::TYPE)
    }
}

impl<T> Topic<T> {
    /// Topic whose ROS type name is only known at runtime (action envelopes).
    pub fn with_type(ros: &Rc<Ros>, name: impl Into<String>, msg_type: impl Into<String>) -> Self {
        Self {
            ros: ros.clone(),
            name: name.into(),
            msg_type: msg_type.into(),
            throttle_rate: 0,
            _marker: PhantomData,
        }
    }

    /// Ask the bridge to deliver at most one message per `ms` milliseconds.
    pub fn throttled(mut self, ms: u32) -> Self {
        self.throttle_rate = ms;
        self
    }
}

impl<T: DeserializeOwned + 'static> Topic<T> {
    /// Call `f` with every message that decodes as `T`; others are logged and dropped.
    pub fn subscribe(&self, f: impl Fn(T) + 'static) {
        let topic = self.name.clone();
        self.ros
            .subscribe(&self.name, &self.msg_type, self.throttle_rate, move |value| {
                match T::deserialize(value) {
                    Ok(msg) => f(msg),
                    Err(source) => {
                        let err = Error::Decode {
                            topic: topic.clone(),
                            source,
                        };
                        tracing::warn!("{}", err);
                    }
                }
            });
    }
}

impl<T: Serialize> Topic<T> {
    pub fn publish(&self, msg: &T) -> Result<()> {
        let value = serde_json::to_value(msg).map_err(|source| Error::Encode {
            topic: self.name.clone(),
            source,
        })?;
        self.ros.publish(&self.name, &self.msg_type, value)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use serde_json::json;

    use super::*;
    use crate::msg::geometry_msgs::{Pose, Twist};
    use crate::transport::testing::{connected_ros, deliver};

    #[test]
    fn typed_subscription_skips_undecodable_messages() {
        let (ros, link) = connected_ros();
        let topic = Topic::<Pose>::new(&ros, "/robot_pose").throttled(100);
        let got = Rc::new(RefCell::new(Vec::new()));
        {
            let got = got.clone();
            topic.subscribe(move |pose| got.borrow_mut().push(pose.position.x));
        }
        assert_eq!(link.sent("subscribe", "/robot_pose")[0]["throttle_rate"], 100);

        deliver(&ros, "/robot_pose", json!({"position": {"x": 1.5, "y": 0.0, "z": 0.0}}));
        deliver(&ros, "/robot_pose", json!({"position": "nowhere"}));
        deliver(&ros, "/robot_pose", json!({"position": {"x": -2.0}}));

        assert_eq!(*got.borrow(), vec![1.5, -2.0]);
    }

    #[test]
    fn publish_serializes_ros_layout() {
        let (ros, link) = connected_ros();
        let topic = Topic::<Twist>::new(&ros, "/cmd_vel");
        topic.publish(&Twist::planar(0.2, -0.5)).unwrap();

        let adv = link.sent("advertise", "/cmd_vel");
        assert_eq!(adv[0]["type"], "geometry_msgs/Twist");
        let sent = link.sent("publish", "/cmd_vel");
        assert_eq!(sent[0]["msg"]["linear"]["x"], 0.2);
        assert_eq!(sent[0]["msg"]["angular"]["z"], -0.5);
    }
}
