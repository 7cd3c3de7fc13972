//! rosbridge v2 client: connection handle, typed topics, actionlib goals and
//! a `/tf` transform-tree client.

pub mod action;
mod link;
pub mod protocol;
pub mod ros;
pub mod tf_client;
pub mod topic;

pub use action::{ActionClient, GoalHandle};
pub use link::{Link, WebSocketLink};
pub use ros::{ConnectionState, Ros};
pub use tf_client::TfClient;
pub use topic::Topic;
