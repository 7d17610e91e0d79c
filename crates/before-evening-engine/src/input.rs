//! Control input: key codes, the four driving flags, and discrete actions
//!
//! Keyboards and the training adapter both end up as key-down/key-up
//! transitions on `InputKeys`.

use serde::{Deserialize, Serialize};

/// Keys the game reacts to, with their DOM key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Up,
    Right,
    Down,
    A,
    D,
    S,
    W,
}

impl Key {
    pub fn code(&self) -> u32 {
        match self {
            Key::Left => 37,
            Key::Up => 38,
            Key::Right => 39,
            Key::Down => 40,
            Key::A => 65,
            Key::D => 68,
            Key::S => 83,
            Key::W => 87,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            37 => Key::Left,
            38 => Key::Up,
            39 => Key::Right,
            40 => Key::Down,
            65 => Key::A,
            68 => Key::D,
            83 => Key::S,
            87 => Key::W,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMode {
    Down,
    Up,
}

/// The four driving flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputKeys {
    pub left: bool,
    pub right: bool,
    pub faster: bool,
    pub slower: bool,
}

impl InputKeys {
    /// Apply one key transition. Arrows and WASD are interchangeable.
    pub fn apply(&mut self, key: Key, mode: KeyMode) {
        let down = mode == KeyMode::Down;
        match key {
            Key::Left | Key::A => self.left = down,
            Key::Right | Key::D => self.right = down,
            Key::Up | Key::W => self.faster = down,
            Key::Down | Key::S => self.slower = down,
        }
    }

    /// Flags for a set of simultaneously held keys
    pub fn from_keys(keys: &[Key]) -> Self {
        let mut flags = Self::default();
        for &key in keys {
            flags.apply(key, KeyMode::Down);
        }
        flags
    }

    /// -1 steering left, 1 steering right, 0 otherwise. Left wins when both are held.
    pub fn steer_direction(&self) -> f64 {
        if self.left {
            -1.0
        } else if self.right {
            1.0
        } else {
            0.0
        }
    }
}

/// Discrete control actions used by the training harness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    Left,
    Up,
    Right,
    Down,
    LeftUp,
    RightUp,
    RightDown,
    LeftDown,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::Left,
        Action::Up,
        Action::Right,
        Action::Down,
        Action::LeftUp,
        Action::RightUp,
        Action::RightDown,
        Action::LeftDown,
    ];

    /// Action ids run from -1 (left) to 6 (left-down)
    pub fn from_id(id: i32) -> Option<Self> {
        Some(match id {
            -1 => Action::Left,
            0 => Action::Up,
            1 => Action::Right,
            2 => Action::Down,
            3 => Action::LeftUp,
            4 => Action::RightUp,
            5 => Action::RightDown,
            6 => Action::LeftDown,
            _ => return None,
        })
    }

    pub fn id(&self) -> i32 {
        match self {
            Action::Left => -1,
            Action::Up => 0,
            Action::Right => 1,
            Action::Down => 2,
            Action::LeftUp => 3,
            Action::RightUp => 4,
            Action::RightDown => 5,
            Action::LeftDown => 6,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::Left => "left",
            Action::Up => "up",
            Action::Right => "right",
            Action::Down => "down",
            Action::LeftUp => "left-up",
            Action::RightUp => "right-up",
            Action::RightDown => "right-down",
            Action::LeftDown => "left-down",
        }
    }

    pub fn keys(&self) -> &'static [Key] {
        match self {
            Action::Left => &[Key::Left],
            Action::Up => &[Key::Up],
            Action::Right => &[Key::Right],
            Action::Down => &[Key::Down],
            Action::LeftUp => &[Key::Left, Key::Up],
            Action::RightUp => &[Key::Right, Key::Up],
            Action::RightDown => &[Key::Right, Key::Down],
            Action::LeftDown => &[Key::Left, Key::Down],
        }
    }
}

/// Turns a stream of actions into key transitions: the previous action's
/// keys go up before the next action's keys go down.
#[derive(Debug, Clone, Default)]
pub struct ActionDispatcher {
    previous: Vec<Key>,
}

impl ActionDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&mut self, action: Action, keys: &mut InputKeys) {
        for &key in &self.previous {
            keys.apply(key, KeyMode::Up);
        }
        for &key in action.keys() {
            keys.apply(key, KeyMode::Down);
        }
        self.previous = action.keys().to_vec();
        tracing::trace!(action = action.name(), "Dispatched action");
    }

    /// Forget held keys, e.g. after the game reset cleared the flags
    pub fn clear(&mut self) {
        self.previous.clear();
    }
}
