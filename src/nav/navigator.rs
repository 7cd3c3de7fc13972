//! Goal placement on the map and navigation feedback.
//!
//! The navigator owns the `move_base` action client, keeps the robot marker
//! in sync with the pose source, draws the planner's path, and turns pointer
//! gestures into goals.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::heading::{goal_orientation, preview_rotation};
use crate::context::AppContext;
use crate::msg::actionlib_msgs::GoalState;
use crate::msg::geometry_msgs::{Point, Pose, PoseStamped, Quaternion};
use crate::msg::move_base_msgs::MoveBaseGoal;
use crate::msg::nav_msgs::Path;
use crate::msg::std_msgs::Header;
use crate::scene::{Marker, MarkerKind, Scene};
use crate::state::{Gesture, MapPoint, PointerEvent, ScreenPoint, quaternion_to_screen_angle};
use crate::transport::{ActionClient, GoalHandle, TfClient, Topic};

/// Plans shorter than this are treated as noise and not drawn.
pub const MIN_PLAN_POSES: usize = 6;

/// What the page shows about the current goal.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum GoalView {
    #[default]
    None,
    /// Sent and not finished; the server may not have reported yet.
    Outstanding {
        id: String,
        state: Option<GoalState>,
    },
    Finished {
        id: String,
        state: GoalState,
    },
}

type GoalListener = Rc<dyn Fn(&GoalView)>;

pub struct Navigator {
    me: Weak<RefCell<Navigator>>,
    scene: Rc<RefCell<Scene>>,
    action: Rc<ActionClient>,
    fixed_frame: String,
    with_orientation: bool,
    gesture: Gesture,
    current_goal: Option<GoalHandle>,
    view: GoalView,
    listeners: Vec<GoalListener>,
    _tf: Option<Rc<TfClient>>,
}

impl Navigator {
    pub fn new(ctx: &AppContext) -> Rc<RefCell<Self>> {
        let config = &ctx.config.navigator;
        let action = ActionClient::new(&ctx.ros, &config.server_name, &config.action_name);

        let tf = config
            .use_tf
            .then(|| TfClient::new(&ctx.ros, &ctx.config.fixed_frame, config.throttle_rate));

        let nav = Rc::new_cyclic(|me| {
            RefCell::new(Self {
                me: me.clone(),
                scene: ctx.scene.clone(),
                action,
                fixed_frame: ctx.config.fixed_frame.clone(),
                with_orientation: config.with_orientation,
                gesture: Gesture::Idle,
                current_goal: None,
                view: GoalView::None,
                listeners: Vec::new(),
                _tf: tf.clone(),
            })
        });

        let scene = Rc::downgrade(&ctx.scene);
        match &tf {
            Some(tf) => {
                let scene = scene.clone();
                tf.subscribe(&config.robot_pose, move |t| {
                    if let Some(scene) = scene.upgrade() {
                        let at = MapPoint::new(t.translation.x, t.translation.y);
                        place_robot(&mut scene.borrow_mut(), at, &t.rotation);
                    }
                });
            }
            None => {
                let scene = scene.clone();
                Topic::<Pose>::new(&ctx.ros, config.robot_pose.as_str())
                    .throttled(config.throttle_rate)
                    .subscribe(move |pose| {
                        if let Some(scene) = scene.upgrade() {
                            let at = MapPoint::new(pose.position.x, pose.position.y);
                            place_robot(&mut scene.borrow_mut(), at, &pose.orientation);
                        }
                    });
            }
        }

        Topic::<Path>::new(&ctx.ros, config.plan_topic.as_str())
            .throttled(config.throttle_rate)
            .subscribe(move |path| {
                if let Some(scene) = scene.upgrade() {
                    show_plan(&mut scene.borrow_mut(), &path);
                }
            });

        tracing::info!(
            "navigator on {} ({})",
            config.server_name,
            if config.with_orientation {
                "drag to orient"
            } else {
                "double-click"
            }
        );
        nav
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn current_goal(&self) -> Option<&GoalHandle> {
        self.current_goal.as_ref()
    }

    pub fn goal_view(&self) -> &GoalView {
        &self.view
    }

    /// Called with the new [`GoalView`] every time it changes.
    pub fn on_goal_change(&mut self, f: impl Fn(&GoalView) + 'static) {
        self.listeners.push(Rc::new(f));
    }

    /// Feed one pointer event through the goal gesture.
    pub fn dispatch(&mut self, event: PointerEvent) {
        if self.with_orientation {
            self.dispatch_oriented(event);
        } else {
            self.dispatch_simple(event);
        }
    }

    fn to_map(&self, p: ScreenPoint) -> MapPoint {
        self.scene.borrow().camera.screen_to_map(p)
    }

    fn dispatch_simple(&mut self, event: PointerEvent) {
        let PointerEvent::DoubleClick(p) = event else {
            return;
        };
        let at = self.to_map(p);
        self.scene.borrow_mut().path.detach();
        self.send_goal(at, Quaternion::IDENTITY);
    }

    fn dispatch_oriented(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down(p) => {
                let anchor = self.to_map(p);
                self.gesture = Gesture::Pressed { anchor };
            }
            PointerEvent::Move(p) => {
                let current = self.to_map(p);
                let mut scene = self.scene.borrow_mut();
                scene.preview.remove();
                if let Some(anchor) = self.gesture.anchor() {
                    let rotation = preview_rotation(anchor, current);
                    scene.preview.upsert(
                        || Marker::new(MarkerKind::Orientation),
                        |m| m.place(anchor, rotation),
                    );
                    self.gesture = Gesture::Dragging { anchor };
                }
            }
            PointerEvent::Up(p) => {
                let gesture = std::mem::take(&mut self.gesture);
                self.scene.borrow_mut().preview.remove();
                if let Gesture::Dragging { anchor } = gesture {
                    let release = self.to_map(p);
                    if release != anchor {
                        self.send_goal(anchor, goal_orientation(anchor, release));
                    }
                }
            }
            PointerEvent::DoubleClick(_) => {}
        }
    }

    /// Send a goal in the fixed frame and mark it on the map.
    pub fn send_goal(&mut self, at: MapPoint, orientation: Quaternion) -> Option<GoalHandle> {
        let goal = MoveBaseGoal {
            target_pose: PoseStamped {
                header: Header::in_frame(&self.fixed_frame),
                pose: Pose {
                    position: Point {
                        x: at.x,
                        y: at.y,
                        z: 0.0,
                    },
                    orientation,
                },
            },
        };
        let handle = match self.action.send_goal(goal) {
            Ok(handle) => handle,
            Err(e) => {
                tracing::error!("failed to send goal: {}", e);
                return None;
            }
        };

        let rotation = quaternion_to_screen_angle(&orientation);
        self.scene
            .borrow_mut()
            .goal
            .upsert(|| Marker::new(MarkerKind::Goal), |m| m.place(at, rotation));

        let id = handle.id().to_string();
        {
            let me = self.me.clone();
            let id = id.clone();
            handle.on_status(move |state| {
                if let Some(nav) = me.upgrade() {
                    nav.borrow_mut().goal_state_changed(&id, state);
                }
            });
        }
        {
            let me = self.me.clone();
            let scene = Rc::downgrade(&self.scene);
            let id = id.clone();
            handle.on_result(move |status| {
                if let Some(scene) = scene.upgrade() {
                    scene.borrow_mut().path.detach();
                }
                if let Some(nav) = me.upgrade() {
                    nav.borrow_mut().goal_finished(&id, status.status);
                }
            });
        }

        self.current_goal = Some(handle.clone());
        self.set_view(GoalView::Outstanding { id, state: None });
        Some(handle)
    }

    /// Cancel the outstanding goal. Returns false when there is none.
    pub fn cancel_goal(&self) -> bool {
        let Some(goal) = &self.current_goal else {
            tracing::debug!("no goal to cancel");
            return false;
        };
        if let Err(e) = goal.cancel() {
            tracing::warn!("cancel of {} failed: {}", goal.id(), e);
        }
        true
    }

    fn is_current(&self, id: &str) -> bool {
        self.current_goal.as_ref().is_some_and(|g| g.id() == id)
    }

    fn goal_state_changed(&mut self, id: &str, state: GoalState) {
        if self.is_current(id) {
            self.set_view(GoalView::Outstanding {
                id: id.to_string(),
                state: Some(state),
            });
        }
    }

    fn goal_finished(&mut self, id: &str, state: GoalState) {
        if !self.is_current(id) {
            return;
        }
        self.current_goal = None;
        self.set_view(GoalView::Finished {
            id: id.to_string(),
            state,
        });
    }

    fn set_view(&mut self, view: GoalView) {
        if self.view == view {
            return;
        }
        self.view = view;
        for listener in &self.listeners {
            listener(&self.view);
        }
    }
}

fn place_robot(scene: &mut Scene, at: MapPoint, orientation: &Quaternion) {
    let rotation = quaternion_to_screen_angle(orientation);
    scene
        .robot
        .upsert(|| Marker::new(MarkerKind::Robot), |m| m.place(at, rotation));
}

fn show_plan(scene: &mut Scene, path: &Path) {
    if path.poses.len() < MIN_PLAN_POSES {
        return;
    }
    let points = path
        .poses
        .iter()
        .map(|p| MapPoint::new(p.pose.position.x, p.pose.position.y))
        .collect();
    scene.path.replace(points);
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use serde_json::{Value, json};

    use super::*;
    use crate::config::AppConfig;
    use crate::transport::testing::{RecordingLink, connected_ros, deliver};

    const PLAN: &str = "/move_base/DWAPlannerROS/global_plan";

    fn setup(with_orientation: bool) -> (AppContext, Rc<RefCell<Navigator>>, RecordingLink) {
        let (ros, link) = connected_ros();
        let mut config = AppConfig::default();
        config.navigator.with_orientation = with_orientation;
        let ctx = AppContext::new(config, ros);
        // one metre per pixel, y up from the canvas origin
        {
            let mut scene = ctx.scene.borrow_mut();
            scene.camera.zoom = 1.0;
            scene.camera.offset_x = 0.0;
            scene.camera.offset_y = 0.0;
        }
        let nav = Navigator::new(&ctx);
        (ctx, nav, link)
    }

    fn goals(link: &RecordingLink) -> Vec<Value> {
        link.sent("publish", "/move_base/goal")
    }

    fn plan(n: usize) -> Value {
        let poses: Vec<Value> = (0..n)
            .map(|i| json!({"pose": {"position": {"x": i as f64, "y": 0.0, "z": 0.0}}}))
            .collect();
        json!({ "poses": poses })
    }

    fn finish(ctx: &AppContext, id: &str, status: u8) {
        deliver(
            &ctx.ros,
            "/move_base/result",
            json!({"status": {"goal_id": {"id": id}, "status": status}}),
        );
    }

    fn at(x: f64, y: f64) -> ScreenPoint {
        ScreenPoint::new(x, y)
    }

    #[test]
    fn click_without_drag_sends_nothing() {
        let (_ctx, nav, link) = setup(true);
        nav.borrow_mut().dispatch(PointerEvent::Down(at(5.0, -5.0)));
        nav.borrow_mut().dispatch(PointerEvent::Up(at(5.0, -5.0)));
        assert!(goals(&link).is_empty());
        assert_eq!(nav.borrow().gesture(), Gesture::Idle);
    }

    #[test]
    fn drag_back_to_anchor_sends_nothing() {
        let (ctx, nav, link) = setup(true);
        let mut n = nav.borrow_mut();
        n.dispatch(PointerEvent::Down(at(1.0, -1.0)));
        n.dispatch(PointerEvent::Move(at(4.0, -1.0)));
        assert!(ctx.scene.borrow().preview.is_attached());
        n.dispatch(PointerEvent::Up(at(1.0, -1.0)));
        assert!(goals(&link).is_empty());
        assert!(!ctx.scene.borrow().preview.exists());
    }

    #[test]
    fn drag_sends_goal_at_anchor_with_heading() {
        let (ctx, nav, link) = setup(true);
        {
            let mut n = nav.borrow_mut();
            n.dispatch(PointerEvent::Down(at(2.0, -3.0)));
            n.dispatch(PointerEvent::Move(at(2.5, -3.5)));
            assert_eq!(
                n.gesture(),
                Gesture::Dragging {
                    anchor: MapPoint::new(2.0, 3.0)
                }
            );
            let preview = *ctx.scene.borrow().preview.visible().unwrap();
            assert_eq!(preview.position, MapPoint::new(2.0, 3.0));
            assert!((preview.rotation - 315.0).abs() < 1e-9);
            n.dispatch(PointerEvent::Up(at(3.0, -4.0)));
        }

        let sent = goals(&link);
        assert_eq!(sent.len(), 1);
        let pose = &sent[0]["msg"]["goal"]["target_pose"];
        assert_eq!(pose["header"]["frame_id"], "map");
        assert_eq!(pose["pose"]["position"]["x"], 2.0);
        assert_eq!(pose["pose"]["position"]["y"], 3.0);
        let q: Quaternion = serde_json::from_value(pose["pose"]["orientation"].clone()).unwrap();
        assert!((q.yaw() - std::f64::consts::FRAC_PI_4).abs() < 1e-9);

        let scene = ctx.scene.borrow();
        assert!(!scene.preview.exists());
        let goal = scene.goal.visible().unwrap();
        assert_eq!(goal.position, MapPoint::new(2.0, 3.0));
        assert!((goal.rotation + 45.0).abs() < 1e-9);
        assert_eq!(nav.borrow().gesture(), Gesture::Idle);
    }

    #[test]
    fn hover_without_press_leaves_no_preview() {
        let (ctx, nav, _link) = setup(true);
        nav.borrow_mut().dispatch(PointerEvent::Move(at(3.0, -3.0)));
        assert!(!ctx.scene.borrow().preview.exists());
        assert_eq!(nav.borrow().gesture(), Gesture::Idle);
    }

    #[test]
    fn double_click_goal_uses_identity_and_clears_path() {
        let (ctx, nav, link) = setup(false);
        deliver(&ctx.ros, PLAN, plan(8));
        assert!(ctx.scene.borrow().path.is_attached());

        nav.borrow_mut().dispatch(PointerEvent::Down(at(1.0, -1.0)));
        nav.borrow_mut().dispatch(PointerEvent::Up(at(1.0, -1.0)));
        assert!(goals(&link).is_empty());

        nav.borrow_mut().dispatch(PointerEvent::DoubleClick(at(4.0, -2.0)));
        assert!(!ctx.scene.borrow().path.is_attached());
        let sent = goals(&link);
        assert_eq!(sent.len(), 1);
        let pose = &sent[0]["msg"]["goal"]["target_pose"]["pose"];
        assert_eq!(pose["position"]["x"], 4.0);
        assert_eq!(pose["position"]["y"], 2.0);
        assert_eq!(pose["orientation"]["w"], 1.0);
        assert_eq!(pose["orientation"]["z"], 0.0);
    }

    #[test]
    fn short_plans_are_ignored() {
        let (ctx, _nav, _link) = setup(true);
        deliver(&ctx.ros, PLAN, plan(MIN_PLAN_POSES - 1));
        assert!(!ctx.scene.borrow().path.exists());

        deliver(&ctx.ros, PLAN, plan(MIN_PLAN_POSES));
        assert_eq!(
            ctx.scene.borrow().path.visible().map(Vec::len),
            Some(MIN_PLAN_POSES)
        );

        deliver(&ctx.ros, PLAN, plan(2));
        assert_eq!(
            ctx.scene.borrow().path.visible().map(Vec::len),
            Some(MIN_PLAN_POSES)
        );
    }

    #[test]
    fn robot_marker_follows_pose_topic() {
        let (ctx, _nav, link) = setup(true);
        assert_eq!(link.sent("subscribe", "/robot_pose")[0]["throttle_rate"], 100);
        assert!(ctx.scene.borrow().robot.visible().is_none());
        for x in [1.0, 2.0] {
            deliver(
                &ctx.ros,
                "/robot_pose",
                json!({"position": {"x": x, "y": -1.0, "z": 0.0},
                       "orientation": {"x": 0.0, "y": 0.0, "z": 0.0, "w": 1.0}}),
            );
        }
        let robot = *ctx.scene.borrow().robot.visible().unwrap();
        assert_eq!(robot.position, MapPoint::new(2.0, -1.0));
        assert_eq!(robot.rotation, 0.0);
    }

    #[test]
    fn tf_mode_places_robot_from_transform_tree() {
        let (ros, link) = connected_ros();
        let mut config = AppConfig::default();
        config.navigator.use_tf = true;
        config.navigator.robot_pose = "base_link".into();
        let ctx = AppContext::new(config, ros);
        let _nav = Navigator::new(&ctx);
        assert!(link.sent("subscribe", "/robot_pose").is_empty());
        assert!(ctx.scene.borrow().robot.visible().is_none());

        let link_frame = |parent: &str, child: &str, x: f64| {
            json!({"transforms": [{
                "header": {"frame_id": parent},
                "child_frame_id": child,
                "transform": {"translation": {"x": x, "y": 4.0, "z": 0.0},
                              "rotation": {"x": 0.0, "y": 0.0, "z": 0.0, "w": 1.0}}
            }]})
        };
        deliver(&ctx.ros, "/tf", link_frame("odom", "base_link", 1.0));
        assert!(ctx.scene.borrow().robot.visible().is_none());

        deliver(&ctx.ros, "/tf", link_frame("map", "odom", 2.0));
        let robot = *ctx.scene.borrow().robot.visible().unwrap();
        assert_eq!(robot.position, MapPoint::new(3.0, 8.0));
    }

    #[test]
    fn cancel_without_goal_is_a_no_op() {
        let (_ctx, nav, link) = setup(true);
        assert!(!nav.borrow().cancel_goal());
        assert!(link.sent("publish", "/move_base/cancel").is_empty());
        assert!(link.sent("advertise", "/move_base/cancel").is_empty());
    }

    #[test]
    fn result_removes_path_keeps_goal_marker_and_retires_goal() {
        let (ctx, nav, link) = setup(false);
        let changes = Rc::new(Cell::new(0));
        {
            let changes = changes.clone();
            nav.borrow_mut().on_goal_change(move |_| changes.set(changes.get() + 1));
        }
        nav.borrow_mut().dispatch(PointerEvent::DoubleClick(at(1.0, -1.0)));
        deliver(&ctx.ros, PLAN, plan(6));
        assert!(ctx.scene.borrow().path.is_attached());

        let id = nav.borrow().current_goal().unwrap().id().to_string();
        assert!(nav.borrow().cancel_goal());
        assert_eq!(link.sent("publish", "/move_base/cancel")[0]["msg"]["id"], id);

        finish(&ctx, &id, 2);
        assert!(!ctx.scene.borrow().path.is_attached());
        assert!(ctx.scene.borrow().goal.is_attached());
        assert!(nav.borrow().current_goal().is_none());
        assert_eq!(
            *nav.borrow().goal_view(),
            GoalView::Finished {
                id,
                state: GoalState::Preempted
            }
        );
        assert_eq!(changes.get(), 3);

        link.clear();
        assert!(!nav.borrow().cancel_goal());
        assert!(link.ops().is_empty());
    }

    #[test]
    fn new_goal_replaces_outstanding_one() {
        let (ctx, nav, _link) = setup(false);
        nav.borrow_mut().dispatch(PointerEvent::DoubleClick(at(1.0, -1.0)));
        let first = nav.borrow().current_goal().unwrap().id().to_string();
        nav.borrow_mut().dispatch(PointerEvent::DoubleClick(at(5.0, -5.0)));
        let second = nav.borrow().current_goal().unwrap().id().to_string();
        assert_ne!(first, second);

        finish(&ctx, &first, 2);
        assert_eq!(
            nav.borrow().current_goal().map(|g| g.id().to_string()),
            Some(second)
        );
        let goal = *ctx.scene.borrow().goal.visible().unwrap();
        assert_eq!(goal.position, MapPoint::new(5.0, 5.0));
    }
}
