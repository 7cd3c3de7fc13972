//! actionlib client over rosbridge.
//!
//! A goal is published on `<server>/goal`, cancelled on `<server>/cancel`, and
//! tracked through `<server>/status`, `<server>/feedback` and
//! `<server>/result`. Goals are keyed by their generated `goal_<uuid>` id.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use uuid::Uuid;

use super::ros::Ros;
use super::topic::Topic;
use crate::error::Result;
use crate::msg::actionlib_msgs::{GoalID, GoalState, GoalStatus, GoalStatusArray};
use crate::msg::move_base_msgs::{ActionStatusEnvelope, MoveBaseActionGoal, MoveBaseGoal};
use crate::msg::std_msgs::Header;

type ResultListener = Rc<dyn Fn(&GoalStatus)>;
type StatusListener = Rc<dyn Fn(GoalState)>;

#[derive(Default)]
struct GoalEntry {
    state: Option<GoalState>,
    on_result: Vec<ResultListener>,
    on_status: Vec<StatusListener>,
}

pub struct ActionClient {
    server_name: String,
    goal_topic: Topic<MoveBaseActionGoal>,
    cancel_topic: Topic<GoalID>,
    goals: RefCell<HashMap<String, GoalEntry>>,
}

impl ActionClient {
    /// `server_name` like `/move_base`, `action_name` like
    /// `move_base_msgs/MoveBaseAction`.
    pub fn new(ros: &Rc<Ros>, server_name: &str, action_name: &str) -> Rc<Self> {
        let server = server_name.trim_end_matches('/').to_string();
        let client = Rc::new(Self {
            goal_topic: Topic::with_type(ros, format!("{server}/goal"), format!("{action_name}Goal")),
            cancel_topic: Topic::new(ros, format!("{server}/cancel")),
            server_name: server.clone(),
            goals: RefCell::new(HashMap::new()),
        });

        let weak = Rc::downgrade(&client);
        Topic::<GoalStatusArray>::new(ros, format!("{server}/status")).subscribe({
            let weak = weak.clone();
            move |msg| {
                if let Some(client) = weak.upgrade() {
                    for status in &msg.status_list {
                        client.update_state(&status.goal_id.id, status.status);
                    }
                }
            }
        });
        Topic::<ActionStatusEnvelope>::with_type(
            ros,
            format!("{server}/feedback"),
            format!("{action_name}Feedback"),
        )
        .subscribe({
            let weak = weak.clone();
            move |msg| {
                if let Some(client) = weak.upgrade() {
                    client.update_state(&msg.status.goal_id.id, msg.status.status);
                }
            }
        });
        Topic::<ActionStatusEnvelope>::with_type(
            ros,
            format!("{server}/result"),
            format!("{action_name}Result"),
        )
        .subscribe(move |msg| {
            if let Some(client) = weak.upgrade() {
                client.finish(&msg.status);
            }
        });
        client
    }

    /// Publish a new goal and start tracking it.
    pub fn send_goal(self: &Rc<Self>, goal: MoveBaseGoal) -> Result<GoalHandle> {
        let id = format!("goal_{}", Uuid::new_v4().simple());
        self.goals.borrow_mut().insert(id.clone(), GoalEntry::default());
        let envelope = MoveBaseActionGoal {
            header: Header::default(),
            goal_id: GoalID {
                id: id.clone(),
                ..Default::default()
            },
            goal,
        };
        if let Err(e) = self.goal_topic.publish(&envelope) {
            self.goals.borrow_mut().remove(&id);
            return Err(e);
        }
        tracing::info!("sent goal {} to {}", id, self.server_name);
        Ok(GoalHandle {
            id,
            client: Rc::downgrade(self),
        })
    }

    fn cancel(&self, id: &str) -> Result<()> {
        tracing::info!("cancelling goal {}", id);
        self.cancel_topic.publish(&GoalID {
            id: id.to_string(),
            ..Default::default()
        })
    }

    fn update_state(&self, id: &str, state: GoalState) {
        let listeners = {
            let mut goals = self.goals.borrow_mut();
            let Some(entry) = goals.get_mut(id) else {
                return;
            };
            if entry.state == Some(state) {
                return;
            }
            entry.state = Some(state);
            entry.on_status.clone()
        };
        for listener in listeners {
            listener(state);
        }
    }

    fn finish(&self, status: &GoalStatus) {
        let Some(entry) = self.goals.borrow_mut().remove(&status.goal_id.id) else {
            return;
        };
        tracing::info!(
            "goal {} finished: {}",
            status.goal_id.id,
            status.status.label()
        );
        for listener in &entry.on_status {
            listener(status.status);
        }
        for listener in &entry.on_result {
            listener(status);
        }
    }

    #[cfg(test)]
    fn is_tracking(&self, id: &str) -> bool {
        self.goals.borrow().contains_key(id)
    }
}

/// A goal sent through an [`ActionClient`].
#[derive(Clone)]
pub struct GoalHandle {
    id: String,
    client: Weak<ActionClient>,
}

impl std::fmt::Debug for GoalHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoalHandle").field("id", &self.id).finish()
    }
}

impl GoalHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn cancel(&self) -> Result<()> {
        match self.client.upgrade() {
            Some(client) => client.cancel(&self.id),
            None => Ok(()),
        }
    }

    pub fn on_result(&self, f: impl Fn(&GoalStatus) + 'static) {
        if let Some(client) = self.client.upgrade() {
            if let Some(entry) = client.goals.borrow_mut().get_mut(&self.id) {
                entry.on_result.push(Rc::new(f));
            }
        }
    }

    pub fn on_status(&self, f: impl Fn(GoalState) + 'static) {
        if let Some(client) = self.client.upgrade() {
            if let Some(entry) = client.goals.borrow_mut().get_mut(&self.id) {
                entry.on_status.push(Rc::new(f));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use serde_json::json;

    use super::*;
    use crate::transport::testing::{connected_ros, deliver};

    fn result_frame(id: &str, status: u8) -> serde_json::Value {
        json!({
            "header": {"seq": 1, "stamp": {"secs": 0, "nsecs": 0}, "frame_id": ""},
            "status": {"goal_id": {"stamp": {"secs": 0, "nsecs": 0}, "id": id}, "status": status, "text": ""},
            "result": {}
        })
    }

    #[test]
    fn goal_envelope_uses_action_type_names() {
        let (ros, link) = connected_ros();
        let client = ActionClient::new(&ros, "/move_base", "move_base_msgs/MoveBaseAction");

        assert_eq!(
            link.sent("subscribe", "/move_base/result")[0]["type"],
            "move_base_msgs/MoveBaseActionResult"
        );
        assert_eq!(
            link.sent("subscribe", "/move_base/status")[0]["type"],
            "actionlib_msgs/GoalStatusArray"
        );

        let goal = client.send_goal(MoveBaseGoal::default()).unwrap();
        assert!(goal.id().starts_with("goal_"));
        assert_eq!(
            link.sent("advertise", "/move_base/goal")[0]["type"],
            "move_base_msgs/MoveBaseActionGoal"
        );
        let sent = link.sent("publish", "/move_base/goal");
        assert_eq!(sent[0]["msg"]["goal_id"]["id"], goal.id());
    }

    #[test]
    fn result_retires_goal_and_fires_listeners() {
        let (ros, _link) = connected_ros();
        let client = ActionClient::new(&ros, "/move_base", "move_base_msgs/MoveBaseAction");
        let goal = client.send_goal(MoveBaseGoal::default()).unwrap();
        let fired = Rc::new(Cell::new(0));
        {
            let fired = fired.clone();
            goal.on_result(move |status| {
                assert_eq!(status.status, GoalState::Succeeded);
                fired.set(fired.get() + 1);
            });
        }
        assert!(client.is_tracking(goal.id()));

        deliver(&ros, "/move_base/result", result_frame("goal_someone_else", 3));
        assert_eq!(fired.get(), 0);

        deliver(&ros, "/move_base/result", result_frame(goal.id(), 3));
        deliver(&ros, "/move_base/result", result_frame(goal.id(), 3));
        assert_eq!(fired.get(), 1);
        assert!(!client.is_tracking(goal.id()));
    }

    #[test]
    fn status_updates_are_deduplicated() {
        let (ros, _link) = connected_ros();
        let client = ActionClient::new(&ros, "/move_base", "move_base_msgs/MoveBaseAction");
        let goal = client.send_goal(MoveBaseGoal::default()).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        {
            let seen = seen.clone();
            goal.on_status(move |s| seen.borrow_mut().push(s));
        }
        let status = json!({"status_list": [{"goal_id": {"id": goal.id()}, "status": 1}]});
        deliver(&ros, "/move_base/status", status.clone());
        deliver(&ros, "/move_base/status", status);

        assert_eq!(*seen.borrow(), vec![GoalState::Active]);
        assert!(client.is_tracking(goal.id()));
    }

    #[test]
    fn cancel_publishes_goal_id() {
        let (ros, link) = connected_ros();
        let client = ActionClient::new(&ros, "/move_base/", "move_base_msgs/MoveBaseAction");
        let goal = client.send_goal(MoveBaseGoal::default()).unwrap();
        goal.cancel().unwrap();

        let sent = link.sent("publish", "/move_base/cancel");
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["msg"]["id"], goal.id());
    }
}
