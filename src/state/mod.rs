pub mod camera;
pub mod gesture;
pub mod teleop;

pub use camera::{Camera, MapPoint, ScreenPoint, quaternion_to_screen_angle};
pub use gesture::{Gesture, PointerEvent};
pub use teleop::{DriveKey, KeyAction, TeleopState};
