//! Runtime configuration, taken from defaults and URL query parameters.

use std::str::FromStr;

use crate::util::parse_query_param;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloudMode {
    /// `sensor_msgs/PointCloud` already in the map frame.
    Points,
    /// `sensor_msgs/LaserScan` projected through the robot pose.
    Scan,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NavigatorConfig {
    /// Click-and-drag to set a heading instead of double-click goals.
    pub with_orientation: bool,
    pub server_name: String,
    pub action_name: String,
    /// Pose topic, or the robot frame when `use_tf` is set.
    pub robot_pose: String,
    pub use_tf: bool,
    pub plan_topic: String,
    pub throttle_rate: u32,
    /// Bitmap drawn for the robot, goal and heading markers instead of arrows.
    pub image: Option<String>,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            with_orientation: true,
            server_name: "/move_base".into(),
            action_name: "move_base_msgs/MoveBaseAction".into(),
            robot_pose: "/robot_pose".into(),
            use_tf: false,
            plan_topic: "/move_base/DWAPlannerROS/global_plan".into(),
            throttle_rate: 100,
            image: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CloudConfig {
    pub mode: CloudMode,
    pub cloud_topic: String,
    pub scan_topic: String,
    /// Pose used to place scan points on the map.
    pub robot_pose: String,
    pub throttle_rate: u32,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            mode: CloudMode::Points,
            cloud_topic: "/move_base/global_costmap/lidar_layer/clearing_endpoints".into(),
            scan_topic: "/scan_web".into(),
            robot_pose: "/robot_pose".into(),
            throttle_rate: 100,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TeleopConfig {
    pub topic: String,
    pub rate_hz: u32,
}

impl Default for TeleopConfig {
    fn default() -> Self {
        Self {
            topic: "/cmd_vel".into(),
            rate_hz: 10,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    /// rosbridge WebSocket endpoint.
    pub url: String,
    pub fixed_frame: String,
    pub map_topic: String,
    pub navigator: NavigatorConfig,
    pub cloud: CloudConfig,
    pub teleop: TeleopConfig,
    pub log_level: tracing::Level,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            url: "ws://localhost:9090".into(),
            fixed_frame: "map".into(),
            map_topic: "/map".into(),
            navigator: NavigatorConfig::default(),
            cloud: CloudConfig::default(),
            teleop: TeleopConfig::default(),
            log_level: tracing::Level::INFO,
        }
    }
}

fn flag(value: &str) -> Option<bool> {
    match value {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl AppConfig {
    /// Defaults for the page's host, overridden by the query string.
    pub fn from_browser() -> Self {
        let mut config = Self::default();
        let Some(location) = web_sys::window().map(|w| w.location()) else {
            return config;
        };
        if let Ok(host) = location.hostname() {
            if !host.is_empty() {
                config.url = format!("ws://{}:9090", host);
            }
        }
        if let Ok(search) = location.search() {
            config.apply_query(&search);
        }
        config
    }

    /// Apply `?url=…&orientation=0&tf=1&cloud=scan…` overrides.
    pub fn apply_query(&mut self, search: &str) {
        let get = |key: &str| parse_query_param(search, key);
        if let Some(url) = get("url") {
            self.url = url;
        }
        if let Some(frame) = get("frame") {
            self.fixed_frame = frame;
        }
        if let Some(topic) = get("map") {
            self.map_topic = topic;
        }
        if let Some(v) = get("orientation").as_deref().and_then(flag) {
            self.navigator.with_orientation = v;
        }
        if let Some(v) = get("tf").as_deref().and_then(flag) {
            self.navigator.use_tf = v;
        }
        if let Some(server) = get("server") {
            self.navigator.server_name = server;
        }
        if let Some(pose) = get("pose") {
            self.navigator.robot_pose = pose.clone();
            self.cloud.robot_pose = pose;
        }
        if let Some(plan) = get("plan") {
            self.navigator.plan_topic = plan;
        }
        if let Some(image) = get("image").filter(|i| !i.is_empty()) {
            self.navigator.image = Some(image);
        }
        match get("cloud").as_deref() {
            Some("scan") => self.cloud.mode = CloudMode::Scan,
            Some("points") => self.cloud.mode = CloudMode::Points,
            Some(other) => tracing::warn!("unknown cloud mode {:?}", other),
            None => {}
        }
        if let Some(topic) = get("cloud_topic") {
            self.cloud.cloud_topic = topic;
        }
        if let Some(topic) = get("scan") {
            self.cloud.scan_topic = topic;
        }
        if let Some(topic) = get("cmd_vel") {
            self.teleop.topic = topic;
        }
        if let Some(level) = get("log").and_then(|l| tracing::Level::from_str(&l).ok()) {
            self.log_level = level;
        }
    }
}
