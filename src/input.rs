use std::collections::HashSet;

use glam::Vec2;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

#[cfg(target_arch = "wasm32")]
pub mod wasm;

/// Keyboard key that can steer the player. Letters are stored upper-case so
/// lookups ignore case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyCode(char);

impl KeyCode {
    /// Maps a DOM key name to a key code; only single letters are tracked.
    pub fn from_name(name: &str) -> Option<Self> {
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) if ch.is_ascii_alphabetic() => Some(Self(ch.to_ascii_uppercase())),
            _ => None,
        }
    }
}

/// Keys that drive the player: `W`/`A`/`S`/`D`.
pub const FORWARD_KEY: KeyCode = KeyCode('W');
pub const LEFT_KEY: KeyCode = KeyCode('A');
pub const BACKWARD_KEY: KeyCode = KeyCode('S');
pub const RIGHT_KEY: KeyCode = KeyCode('D');

/// Plain copy of the directional input for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InputSnapshot {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl InputSnapshot {
    pub fn any(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }

    /// Builds a snapshot from a string of held keys such as `"wa"`.
    pub fn from_keys(keys: &str) -> Self {
        let mut snapshot = Self::default();
        for ch in keys.chars() {
            match ch.to_ascii_lowercase() {
                'w' => snapshot.forward = true,
                's' => snapshot.backward = true,
                'a' => snapshot.left = true,
                'd' => snapshot.right = true,
                _ => {}
            }
        }
        snapshot
    }
}

/// Input shared between event handlers and the frame loop.
#[derive(Debug, Default)]
pub struct InputState {
    keys: RwLock<HashSet<KeyCode>>,
    clicks: RwLock<Vec<Vec2>>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_key_down(&self, key: KeyCode) {
        self.keys.write().insert(key);
    }

    pub fn set_key_up(&self, key: KeyCode) {
        self.keys.write().remove(&key);
    }

    /// Drops every held key, e.g. when the window loses focus.
    pub fn release_all(&self) {
        self.keys.write().clear();
    }

    /// Queues a click at the given canvas pixel.
    pub fn push_click(&self, position: Vec2) {
        self.clicks.write().push(position);
    }

    pub fn drain_clicks(&self) -> Vec<Vec2> {
        std::mem::take(&mut *self.clicks.write())
    }

    pub fn snapshot(&self) -> InputSnapshot {
        let keys = self.keys.read();
        InputSnapshot {
            forward: keys.contains(&FORWARD_KEY),
            backward: keys.contains(&BACKWARD_KEY),
            left: keys.contains(&LEFT_KEY),
            right: keys.contains(&RIGHT_KEY),
        }
    }
}
