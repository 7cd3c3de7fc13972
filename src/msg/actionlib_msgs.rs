//! Definitions for the ROS `actionlib_msgs` package.

use serde::{Deserialize, Serialize};

use super::RosMessage;
use super::std_msgs::{Header, Time};

/// Identifies a goal across the goal/cancel/status/result topics.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalID {
    #[serde(default)]
    pub stamp: Time,
    #[serde(default)]
    pub id: String,
}

impl RosMessage for GoalID {
    const TYPE: &'static str = "actionlib_msgs/GoalID";
}

/// Goal state as reported by an action server.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum GoalState {
    Pending,
    Active,
    Preempted,
    Succeeded,
    Aborted,
    Rejected,
    Preempting,
    Recalling,
    Recalled,
    Lost,
    Unknown(u8),
}

impl From<u8> for GoalState {
    fn from(code: u8) -> Self {
        match code {
            0 => GoalState::Pending,
            1 => GoalState::Active,
            2 => GoalState::Preempted,
            3 => GoalState::Succeeded,
            4 => GoalState::Aborted,
            5 => GoalState::Rejected,
            6 => GoalState::Preempting,
            7 => GoalState::Recalling,
            8 => GoalState::Recalled,
            9 => GoalState::Lost,
            other => GoalState::Unknown(other),
        }
    }
}

impl From<GoalState> for u8 {
    fn from(state: GoalState) -> Self {
        match state {
            GoalState::Pending => 0,
            GoalState::Active => 1,
            GoalState::Preempted => 2,
            GoalState::Succeeded => 3,
            GoalState::Aborted => 4,
            GoalState::Rejected => 5,
            GoalState::Preempting => 6,
            GoalState::Recalling => 7,
            GoalState::Recalled => 8,
            GoalState::Lost => 9,
            GoalState::Unknown(code) => code,
        }
    }
}

impl GoalState {
    pub fn label(&self) -> &'static str {
        match self {
            GoalState::Pending => "pending",
            GoalState::Active => "active",
            GoalState::Preempted => "preempted",
            GoalState::Succeeded => "succeeded",
            GoalState::Aborted => "aborted",
            GoalState::Rejected => "rejected",
            GoalState::Preempting => "preempting",
            GoalState::Recalling => "recalling",
            GoalState::Recalled => "recalled",
            GoalState::Lost => "lost",
            GoalState::Unknown(_) => "unknown",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GoalStatus {
    pub goal_id: GoalID,
    pub status: GoalState,
    #[serde(default)]
    pub text: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalStatusArray {
    #[serde(default)]
    pub header: Header,
    #[serde(default)]
    pub status_list: Vec<GoalStatus>,
}

impl RosMessage for GoalStatusArray {
    const TYPE: &'static str = "actionlib_msgs/GoalStatusArray";
}
