//! `move_base_msgs/MoveBaseAction` wire types.
//!
//! Results and feedback are only inspected for their status, so their
//! payloads stay untyped.

use serde::{Deserialize, Serialize};

use super::actionlib_msgs::{GoalID, GoalStatus};
use super::geometry_msgs::PoseStamped;
use super::std_msgs::Header;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MoveBaseGoal {
    pub target_pose: PoseStamped,
}

/// Envelope published on `<server>/goal`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MoveBaseActionGoal {
    #[serde(default)]
    pub header: Header,
    pub goal_id: GoalID,
    pub goal: MoveBaseGoal,
}

/// Envelope received on `<server>/result` and `<server>/feedback`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionStatusEnvelope {
    #[serde(default)]
    pub header: Header,
    pub status: GoalStatus,
}
