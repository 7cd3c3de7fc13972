//! Handles shared by every component, built once per page.

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::AppConfig;
use crate::nav::{Navigator, VelocityController};
use crate::scene::Scene;
use crate::transport::Ros;
use crate::viz::{CloudRenderer, GridClient};

/// Connection, scene and configuration handed to each component's
/// constructor.
#[derive(Clone)]
pub struct AppContext {
    pub config: Rc<AppConfig>,
    pub ros: Rc<Ros>,
    pub scene: Rc<RefCell<Scene>>,
}

impl AppContext {
    pub fn new(config: AppConfig, ros: Rc<Ros>) -> Self {
        let scene = Scene {
            marker_image: config.navigator.image.clone(),
            ..Scene::default()
        };
        Self {
            config: Rc::new(config),
            ros,
            scene: Rc::new(RefCell::new(scene)),
        }
    }
}

/// The running console: context plus every component built from it.
#[derive(Clone)]
pub struct Console {
    pub ctx: AppContext,
    pub navigator: Rc<RefCell<Navigator>>,
    pub grid: Rc<GridClient>,
    pub cloud: Rc<CloudRenderer>,
    pub controller: Rc<RefCell<VelocityController>>,
}

impl PartialEq for Console {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.ctx.ros, &other.ctx.ros)
    }
}

impl Console {
    /// Open the bridge connection and build the components on top of it.
    ///
    /// A URL the browser refuses still yields a console, stuck in the error
    /// state, so the page can say so.
    pub fn connect(config: AppConfig) -> Self {
        let ros = match Ros::connect(config.url.clone()) {
            Ok(ros) => ros,
            Err(e) => {
                let ros = Ros::new(config.url.clone());
                ros.fail(&e.to_string());
                ros
            }
        };
        Self::build(AppContext::new(config, ros))
    }

    pub fn build(ctx: AppContext) -> Self {
        let navigator = Navigator::new(&ctx);
        let grid = GridClient::new(&ctx);
        let cloud = CloudRenderer::new(&ctx);
        let controller = Rc::new(RefCell::new(VelocityController::new(&ctx)));
        Self {
            ctx,
            navigator,
            grid,
            cloud,
            controller,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msg::geometry_msgs::Quaternion;
    use crate::state::MapPoint;
    use crate::transport::ConnectionState;
    use crate::transport::testing::{RecordingLink, connected_ros};

    #[test]
    fn build_subscribes_every_component() {
        let (ros, link) = connected_ros();
        let console = Console::build(AppContext::new(AppConfig::default(), ros));

        for topic in [
            "/map",
            "/robot_pose",
            "/move_base/DWAPlannerROS/global_plan",
            "/move_base/result",
            "/move_base/global_costmap/lidar_layer/clearing_endpoints",
        ] {
            assert!(!link.sent("subscribe", topic).is_empty(), "{topic}");
        }
        assert!(console == console.clone());
    }

    #[test]
    fn configured_marker_image_reaches_the_scene() {
        let (ros, _link) = connected_ros();
        let mut config = AppConfig::default();
        config.navigator.image = Some("robot.png".into());
        let ctx = AppContext::new(config, ros.clone());
        assert_eq!(ctx.scene.borrow().marker_image.as_deref(), Some("robot.png"));

        let plain = AppContext::new(AppConfig::default(), ros);
        assert!(plain.scene.borrow().marker_image.is_none());
    }

    #[test]
    fn refused_connection_sends_nothing_and_queues_nothing() {
        let ros = Ros::new("ws://robot:9090");
        let link = RecordingLink::default();
        ros.attach_link(Box::new(link.clone()));
        ros.fail("refused");
        let console = Console::build(AppContext::new(AppConfig::default(), ros.clone()));

        let goal = console
            .navigator
            .borrow_mut()
            .send_goal(MapPoint::new(1.0, 2.0), Quaternion::default());
        assert!(goal.is_some());
        {
            let mut controller = console.controller.borrow_mut();
            controller.key_down("w");
            for _ in 0..50 {
                controller.tick();
            }
        }
        console.navigator.borrow().cancel_goal();

        assert_eq!(ros.state(), ConnectionState::Error);
        assert!(link.frames.borrow().is_empty());
        assert_eq!(ros.pending_len(), 0);
    }
}
