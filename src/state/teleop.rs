// Held-key state for keyboard driving
use std::collections::BTreeSet;

/// Forward speed (m/s) and turn rate (rad/s) per speed level.
pub const SPEED_LEVELS: [(f64, f64); 3] = [(0.1, 0.3), (0.25, 0.6), (0.5, 1.0)];

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DriveKey {
    Forward,
    Backward,
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    Drive(DriveKey),
    SpeedUp,
    SpeedDown,
}

impl KeyAction {
    /// Map a `KeyboardEvent.key` value.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "w" | "W" | "ArrowUp" => Some(KeyAction::Drive(DriveKey::Forward)),
            "s" | "S" | "ArrowDown" => Some(KeyAction::Drive(DriveKey::Backward)),
            "a" | "A" | "ArrowLeft" => Some(KeyAction::Drive(DriveKey::Left)),
            "d" | "D" | "ArrowRight" => Some(KeyAction::Drive(DriveKey::Right)),
            "r" | "R" => Some(KeyAction::SpeedUp),
            "f" | "F" => Some(KeyAction::SpeedDown),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeleopState {
    pub held: BTreeSet<DriveKey>,
    pub speed_level: usize,
    /// A zero command still has to go out after the last key was released.
    pub stop_pending: bool,
}

impl Default for TeleopState {
    fn default() -> Self {
        Self {
            held: BTreeSet::new(),
            speed_level: 1,
            stop_pending: false,
        }
    }
}

impl TeleopState {
    /// Returns true if the held set changed (key repeat does not).
    pub fn press(&mut self, key: DriveKey) -> bool {
        self.held.insert(key)
    }

    pub fn release(&mut self, key: DriveKey) -> bool {
        let changed = self.held.remove(&key);
        if changed && self.held.is_empty() {
            self.stop_pending = true;
        }
        changed
    }

    /// Drop every held key, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        if !self.held.is_empty() {
            self.held.clear();
            self.stop_pending = true;
        }
    }

    pub fn speed_up(&mut self) {
        self.speed_level = (self.speed_level + 1).min(SPEED_LEVELS.len() - 1);
    }

    pub fn speed_down(&mut self) {
        self.speed_level = self.speed_level.saturating_sub(1);
    }

    pub fn is_driving(&self) -> bool {
        !self.held.is_empty()
    }

    /// `(linear.x, angular.z)` for the held keys at the current speed level.
    pub fn velocity(&self) -> (f64, f64) {
        let (v, w) = SPEED_LEVELS[self.speed_level];
        let axis = |pos: DriveKey, neg: DriveKey| {
            (self.held.contains(&pos) as i8 - self.held.contains(&neg) as i8) as f64
        };
        (
            v * axis(DriveKey::Forward, DriveKey::Backward),
            w * axis(DriveKey::Left, DriveKey::Right),
        )
    }
}
