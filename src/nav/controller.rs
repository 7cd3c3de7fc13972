use crate::context::AppContext;
use crate::msg::geometry_msgs::Twist;
use crate::state::{KeyAction, TeleopState};
use crate::transport::Topic;

/// Keyboard teleoperation publishing `geometry_msgs/Twist`.
///
/// Keys only change the held set; commands go out on [`tick`](Self::tick),
/// which the view calls at the configured rate.
pub struct VelocityController {
    topic: Topic<Twist>,
    state: TeleopState,
}

impl VelocityController {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            topic: Topic::new(&ctx.ros, ctx.config.teleop.topic.as_str()),
            state: TeleopState::default(),
        }
    }

    pub fn state(&self) -> &TeleopState {
        &self.state
    }

    /// Returns true if `key` is a teleop key and was consumed.
    pub fn key_down(&mut self, key: &str) -> bool {
        match KeyAction::from_key(key) {
            Some(KeyAction::Drive(k)) => {
                self.state.press(k);
                true
            }
            Some(KeyAction::SpeedUp) => {
                self.state.speed_up();
                tracing::debug!("speed level {}", self.state.speed_level);
                true
            }
            Some(KeyAction::SpeedDown) => {
                self.state.speed_down();
                tracing::debug!("speed level {}", self.state.speed_level);
                true
            }
            None => false,
        }
    }

    pub fn key_up(&mut self, key: &str) -> bool {
        match KeyAction::from_key(key) {
            Some(KeyAction::Drive(k)) => {
                self.state.release(k);
                true
            }
            Some(_) => true,
            None => false,
        }
    }

    pub fn release_all(&mut self) {
        self.state.release_all();
    }

    /// Publish the command for this period, if any, and return it.
    pub fn tick(&mut self) -> Option<Twist> {
        let twist = if self.state.is_driving() {
            let (linear, angular) = self.state.velocity();
            Twist::planar(linear, angular)
        } else if self.state.stop_pending {
            Twist::default()
        } else {
            return None;
        };
        match self.topic.publish(&twist) {
            Ok(()) => {
                if !self.state.is_driving() {
                    self.state.stop_pending = false;
                }
                Some(twist)
            }
            Err(e) => {
                tracing::warn!("velocity command dropped: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::state::DriveKey;
    use crate::state::teleop::SPEED_LEVELS;
    use crate::transport::testing::connected_ros;

    fn controller() -> (VelocityController, crate::transport::testing::RecordingLink) {
        let (ros, link) = connected_ros();
        let ctx = AppContext::new(AppConfig::default(), ros);
        (VelocityController::new(&ctx), link)
    }

    #[test]
    fn idle_ticks_publish_nothing() {
        let (mut c, link) = controller();
        assert!(c.tick().is_none());
        assert!(c.tick().is_none());
        assert!(link.ops().is_empty());
    }

    #[test]
    fn held_keys_drive_until_released_then_stop_once() {
        let (mut c, link) = controller();
        let (v, w) = SPEED_LEVELS[1];
        assert!(c.key_down("w"));
        assert!(c.key_down("a"));
        assert_eq!(c.tick(), Some(Twist::planar(v, w)));
        assert!(c.key_down("w"));
        assert_eq!(c.tick(), Some(Twist::planar(v, w)));

        c.key_up("a");
        assert_eq!(c.tick(), Some(Twist::planar(v, 0.0)));
        c.key_up("W");
        let stop = c.tick().unwrap();
        assert!(stop.is_zero());
        assert!(c.tick().is_none());

        assert_eq!(link.sent("advertise", "/cmd_vel").len(), 1);
        assert_eq!(link.sent("publish", "/cmd_vel").len(), 4);
    }

    #[test]
    fn opposite_keys_cancel_out() {
        let (mut c, _link) = controller();
        c.key_down("ArrowUp");
        c.key_down("ArrowDown");
        c.key_down("ArrowRight");
        let twist = c.tick().unwrap();
        assert_eq!(twist.linear.x, 0.0);
        assert_eq!(twist.angular.z, -SPEED_LEVELS[1].1);
    }

    #[test]
    fn speed_level_is_clamped() {
        let (mut c, link) = controller();
        for _ in 0..5 {
            c.key_down("r");
        }
        assert_eq!(c.state().speed_level, SPEED_LEVELS.len() - 1);
        for _ in 0..5 {
            c.key_down("F");
        }
        assert_eq!(c.state().speed_level, 0);
        assert!(c.tick().is_none());
        assert!(link.ops().is_empty());
    }

    #[test]
    fn unrelated_keys_are_not_consumed() {
        let (mut c, _link) = controller();
        assert!(!c.key_down("q"));
        assert!(!c.key_up("Enter"));
        assert!(!c.state().is_driving());
    }

    #[test]
    fn losing_focus_stops_the_robot() {
        let (mut c, _link) = controller();
        c.key_down("d");
        c.tick();
        c.release_all();
        assert!(c.tick().unwrap().is_zero());
        assert!(!c.state().held.contains(&DriveKey::Right));
    }
}
