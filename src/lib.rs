//! Browser console for a ROS navigation stack: occupancy map, robot pose,
//! planned path and obstacle points on a canvas, goals set by clicking or
//! dragging on the map, and WASD driving. Talks to the robot through a
//! rosbridge WebSocket.

pub mod components;
pub mod config;
pub mod context;
pub mod error;
pub mod msg;
pub mod nav;
pub mod scene;
pub mod state;
pub mod transport;
pub mod util;
pub mod viz;

pub use error::{Error, Result};
