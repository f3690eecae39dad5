// ==============================================================================
// input.rs - KEY STATE COLLECTION + PER-TICK INPUT SNAPSHOT
// ------------------------------------------------------------------------------
// InputCollector is the single writer (key down / key up events).
// InputState is the immutable, Copy snapshot the controller reads once per
// tick. Keys index a fixed array, so there is no map and no string lookup on
// the tick path.
// ==============================================================================

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Key {
    Forward,
    Back,
    Left,
    Right,
    Flip,
    Reset,
}

impl Key {
    pub const COUNT: usize = 6;
    pub const ALL: [Key; Key::COUNT] = [Key::Forward, Key::Back, Key::Left, Key::Right, Key::Flip, Key::Reset];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Default bindings: w s a d f r (any case).
    pub fn from_char(c: char) -> Option<Key> {
        match c.to_ascii_lowercase() {
            'w' => Some(Key::Forward),
            's' => Some(Key::Back),
            'a' => Some(Key::Left),
            'd' => Some(Key::Right),
            'f' => Some(Key::Flip),
            'r' => Some(Key::Reset),
            _ => None,
        }
    }

    /// DOM-style key names, e.g. "ArrowUp" or "w".
    pub fn from_name(name: &str) -> Option<Key> {
        match name {
            "ArrowUp" => Some(Key::Forward),
            "ArrowDown" => Some(Key::Back),
            "ArrowLeft" => Some(Key::Left),
            "ArrowRight" => Some(Key::Right),
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::from_char(c),
                    _ => None,
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    keys: [bool; Key::COUNT],
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder used by scripted drivers and tests.
    pub fn with(mut self, key: Key) -> Self {
        self.keys[key.index()] = true;
        self
    }

    #[inline]
    pub fn pressed(&self, key: Key) -> bool {
        self.keys[key.index()]
    }

    /// +1 left, -1 right, 0 for neither or both.
    pub fn steer_axis(&self) -> f32 {
        axis(self.pressed(Key::Left), self.pressed(Key::Right))
    }

    /// +1 forward, -1 back, 0 for neither or both.
    pub fn throttle_axis(&self) -> f32 {
        axis(self.pressed(Key::Forward), self.pressed(Key::Back))
    }
}

#[inline]
fn axis(pos: bool, neg: bool) -> f32 {
    (pos as i8 - neg as i8) as f32
}

/// Mutable key map, owned by whoever receives key events.
#[derive(Debug, Default)]
pub struct InputCollector {
    current: InputState,
}

impl InputCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: Key) {
        self.current.keys[key.index()] = true;
    }

    pub fn key_up(&mut self, key: Key) {
        self.current.keys[key.index()] = false;
    }

    /// Returns false for unbound keys.
    pub fn key_event(&mut self, name: &str, down: bool) -> bool {
        match Key::from_name(name) {
            Some(k) if down => self.key_down(k),
            Some(k) => self.key_up(k),
            None => return false,
        }
        true
    }

    pub fn release_all(&mut self) {
        self.current = InputState::default();
    }

    pub fn snapshot(&self) -> InputState {
        self.current
    }
}
