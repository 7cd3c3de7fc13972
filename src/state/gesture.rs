// Pointer gesture state for goal placement
use super::camera::{MapPoint, ScreenPoint};

/// Raw pointer input, in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Down(ScreenPoint),
    Move(ScreenPoint),
    Up(ScreenPoint),
    DoubleClick(ScreenPoint),
}

/// idle -> pressed -> dragging -> (release) idle
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Gesture {
    #[default]
    Idle,
    Pressed {
        anchor: MapPoint,
    },
    Dragging {
        anchor: MapPoint,
    },
}

impl Gesture {
    pub fn anchor(&self) -> Option<MapPoint> {
        match *self {
            Gesture::Idle => None,
            Gesture::Pressed { anchor } | Gesture::Dragging { anchor } => Some(anchor),
        }
    }
}
