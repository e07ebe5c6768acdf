use std::collections::HashSet;

use super::types::Key;

/// Per-frame key transitions. Cleared by the runtime after each frame.
#[derive(Debug, Default)]
pub struct InputFrame {
    pub keys_pressed: HashSet<Key>,
    pub keys_released: HashSet<Key>,

    /// Auto-repeat presses, counted per key.
    pub keys_repeated: Vec<Key>,
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.keys_repeated.clear();
    }

    pub fn pressed(&self, key: Key) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Initial press plus auto-repeats this frame.
    pub fn press_count(&self, key: Key) -> usize {
        usize::from(self.pressed(key)) + self.keys_repeated.iter().filter(|&&k| k == key).count()
    }
}
