//! Transform-tree client fed from `/tf` and `/tf_static`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use nalgebra::{Isometry3, Quaternion as NaQuaternion, Translation3, UnitQuaternion};

use super::ros::Ros;
use super::topic::Topic;
use crate::msg::geometry_msgs::{Quaternion, Transform, TransformStamped, Vector3};
use crate::msg::tf2_msgs::TFMessage;

/// Longest parent chain walked before a lookup gives up.
const MAX_DEPTH: usize = 64;

fn frame_key(frame: &str) -> &str {
    frame.trim_start_matches('/')
}

fn to_isometry(t: &Transform) -> Isometry3<f64> {
    let r = &t.rotation;
    Isometry3::from_parts(
        Translation3::new(t.translation.x, t.translation.y, t.translation.z),
        UnitQuaternion::from_quaternion(NaQuaternion::new(r.w, r.x, r.y, r.z)),
    )
}

fn from_isometry(iso: &Isometry3<f64>) -> Transform {
    let v = &iso.translation.vector;
    // nalgebra stores quaternion coordinates as (i, j, k, w)
    let q = &iso.rotation.quaternion().coords;
    Transform {
        translation: Vector3 {
            x: v.x,
            y: v.y,
            z: v.z,
        },
        rotation: Quaternion {
            x: q[0],
            y: q[1],
            z: q[2],
            w: q[3],
        },
    }
}

/// Parent links keyed by child frame.
#[derive(Default)]
pub struct FrameTree {
    links: HashMap<String, (String, Isometry3<f64>)>,
}

impl FrameTree {
    pub fn insert(&mut self, t: &TransformStamped) {
        let child = frame_key(&t.child_frame_id).to_string();
        let parent = frame_key(&t.header.frame_id).to_string();
        if child.is_empty() || parent.is_empty() || child == parent {
            return;
        }
        self.links.insert(child, (parent, to_isometry(&t.transform)));
    }

    /// Pose of `target` expressed in `fixed`, if `fixed` is an ancestor.
    pub fn lookup(&self, fixed: &str, target: &str) -> Option<Transform> {
        let fixed = frame_key(fixed);
        let mut frame = frame_key(target);
        let mut acc = Isometry3::identity();
        for _ in 0..MAX_DEPTH {
            if frame == fixed {
                return Some(from_isometry(&acc));
            }
            let (parent, link) = self.links.get(frame)?;
            acc = link * acc;
            frame = parent.as_str();
        }
        None
    }
}

type Watcher = (String, Rc<dyn Fn(&Transform)>);

/// Answers "where is frame F in the fixed frame" every time the tree changes.
pub struct TfClient {
    fixed_frame: String,
    tree: RefCell<FrameTree>,
    watchers: RefCell<Vec<Watcher>>,
}

impl TfClient {
    pub fn new(ros: &Rc<Ros>, fixed_frame: &str, throttle_rate: u32) -> Rc<Self> {
        let client = Rc::new(Self {
            fixed_frame: fixed_frame.to_string(),
            tree: RefCell::new(FrameTree::default()),
            watchers: RefCell::new(Vec::new()),
        });
        // static transforms are latched and sent once, so never throttle them
        for (topic, throttle) in [("/tf", throttle_rate), ("/tf_static", 0)] {
            let weak = Rc::downgrade(&client);
            Topic::<TFMessage>::new(ros, topic)
                .throttled(throttle)
                .subscribe(move |msg| {
                    if let Some(client) = weak.upgrade() {
                        client.apply(&msg);
                    }
                });
        }
        client
    }

    /// Call `f` with the pose of `frame` in the fixed frame whenever it resolves.
    pub fn subscribe(&self, frame: &str, f: impl Fn(&Transform) + 'static) {
        self.watchers
            .borrow_mut()
            .push((frame.to_string(), Rc::new(f)));
    }

    pub fn lookup(&self, frame: &str) -> Option<Transform> {
        self.tree.borrow().lookup(&self.fixed_frame, frame)
    }

    pub(crate) fn apply(&self, msg: &TFMessage) {
        {
            let mut tree = self.tree.borrow_mut();
            for t in &msg.transforms {
                tree.insert(t);
            }
        }
        let watchers = self.watchers.borrow().clone();
        for (frame, f) in watchers {
            if let Some(t) = self.lookup(&frame) {
                f(&t);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use super::*;
    use crate::msg::std_msgs::Header;
    use crate::transport::testing::{connected_ros, deliver};

    fn link(parent: &str, child: &str, x: f64, y: f64, yaw: f64) -> TransformStamped {
        TransformStamped {
            header: Header::in_frame(parent),
            child_frame_id: child.to_string(),
            transform: Transform {
                translation: Vector3 { x, y, z: 0.0 },
                rotation: Quaternion::from_yaw(yaw),
            },
        }
    }

    #[test]
    fn composes_chain_to_fixed_frame() {
        let mut tree = FrameTree::default();
        tree.insert(&link("map", "odom", 1.0, 0.0, FRAC_PI_2));
        tree.insert(&link("/odom", "/base_link", 2.0, 0.0, 0.0));

        let t = tree.lookup("map", "base_link").unwrap();
        assert!((t.translation.x - 1.0).abs() < 1e-9);
        assert!((t.translation.y - 2.0).abs() < 1e-9);
        assert!((t.rotation.yaw() - FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn unrelated_or_cyclic_frames_do_not_resolve() {
        let mut tree = FrameTree::default();
        tree.insert(&link("a", "b", 0.0, 0.0, 0.0));
        tree.insert(&link("b", "a", 0.0, 0.0, 0.0));
        assert!(tree.lookup("map", "a").is_none());
        assert!(tree.lookup("map", "laser").is_none());
        assert!(tree.lookup("map", "map").is_some());
    }

    #[test]
    fn watchers_fire_when_frame_resolves() {
        let (ros, link_out) = connected_ros();
        let tf = TfClient::new(&ros, "map", 100);
        assert_eq!(link_out.sent("subscribe", "/tf").len(), 1);
        assert_eq!(link_out.sent("subscribe", "/tf_static").len(), 1);

        let seen = Rc::new(RefCell::new(Vec::new()));
        {
            let seen = seen.clone();
            tf.subscribe("base_link", move |t| seen.borrow_mut().push(t.translation.x));
        }
        deliver(
            &ros,
            "/tf",
            serde_json::to_value(TFMessage {
                transforms: vec![link("odom", "base_link", 3.0, 0.0, 0.0)],
            })
            .unwrap(),
        );
        assert!(seen.borrow().is_empty());

        deliver(
            &ros,
            "/tf_static",
            serde_json::to_value(TFMessage {
                transforms: vec![link("map", "odom", 0.5, 0.0, 0.0)],
            })
            .unwrap(),
        );
        assert_eq!(*seen.borrow(), vec![3.5]);
    }
}
