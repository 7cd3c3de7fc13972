//! Obstacle points drawn over the map.
//!
//! Either a `PointCloud` already expressed in the map frame, or a
//! `LaserScan` placed on the map with the most recent robot pose. The scan
//! frame is assumed to coincide with the robot pose.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::config::CloudMode;
use crate::context::AppContext;
use crate::msg::geometry_msgs::Pose;
use crate::msg::sensor_msgs::{LaserScan, PointCloud};
use crate::scene::Scene;
use crate::state::MapPoint;
use crate::transport::Topic;

/// Robot position and heading used to project scans.
#[derive(Clone, Copy, Debug, PartialEq)]
struct ScanOrigin {
    at: MapPoint,
    yaw: f64,
}

pub struct CloudRenderer {
    scene: Rc<RefCell<Scene>>,
    origin: Cell<Option<ScanOrigin>>,
}

impl CloudRenderer {
    pub fn new(ctx: &AppContext) -> Rc<Self> {
        let config = &ctx.config.cloud;
        let renderer = Rc::new(Self {
            scene: ctx.scene.clone(),
            origin: Cell::new(None),
        });
        let weak = Rc::downgrade(&renderer);
        match config.mode {
            CloudMode::Points => {
                Topic::<PointCloud>::new(&ctx.ros, config.cloud_topic.as_str())
                    .throttled(config.throttle_rate)
                    .subscribe(move |cloud| {
                        if let Some(r) = weak.upgrade() {
                            r.show(cloud_to_points(&cloud));
                        }
                    });
            }
            CloudMode::Scan => {
                {
                    let weak = weak.clone();
                    Topic::<Pose>::new(&ctx.ros, config.robot_pose.as_str())
                        .throttled(config.throttle_rate)
                        .subscribe(move |pose| {
                            if let Some(r) = weak.upgrade() {
                                r.origin.set(Some(ScanOrigin {
                                    at: MapPoint::new(pose.position.x, pose.position.y),
                                    yaw: pose.orientation.yaw(),
                                }));
                            }
                        });
                }
                Topic::<LaserScan>::new(&ctx.ros, config.scan_topic.as_str())
                    .throttled(config.throttle_rate)
                    .subscribe(move |scan| {
                        let Some(r) = weak.upgrade() else {
                            return;
                        };
                        match r.origin.get() {
                            Some(o) => r.show(scan_to_points(&scan, o.at, o.yaw)),
                            None => tracing::trace!("scan before first pose, skipped"),
                        }
                    });
            }
        }
        renderer
    }

    fn show(&self, points: Vec<MapPoint>) {
        self.scene.borrow_mut().cloud.replace(points);
    }
}

pub fn cloud_to_points(cloud: &PointCloud) -> Vec<MapPoint> {
    cloud
        .points
        .iter()
        .map(|p| MapPoint::new(p.x as f64, p.y as f64))
        .collect()
}

/// Project the valid ranges of `scan` from a sensor at `at` facing `yaw`.
pub fn scan_to_points(scan: &LaserScan, at: MapPoint, yaw: f64) -> Vec<MapPoint> {
    let (min, max) = (scan.range_min as f64, scan.range_max as f64);
    scan.ranges
        .iter()
        .enumerate()
        .filter_map(|(i, r)| {
            let r = (*r)? as f64;
            if !r.is_finite() || r < min || r > max {
                return None;
            }
            let angle = yaw + scan.angle_min as f64 + i as f64 * scan.angle_increment as f64;
            Some(MapPoint::new(at.x + r * angle.cos(), at.y + r * angle.sin()))
        })
        .collect()
}
