//! Map-frame visualizations fed from the bridge.

mod cloud;
mod grid;

pub use cloud::{CloudRenderer, cloud_to_points, scan_to_points};
pub use grid::GridClient;
