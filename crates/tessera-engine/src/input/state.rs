use std::collections::HashSet;

use super::frame::InputFrame;
use super::types::{InputEvent, Key, KeyState};

/// Current keyboard state for the window.
///
/// Transitions are recorded into an `InputFrame`.
#[derive(Debug, Default)]
pub struct InputState {
    pub focused: bool,
    pub keys_down: HashSet<Key>,
}

impl InputState {
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match ev {
            InputEvent::Focused(f) => {
                self.focused = f;
                // on focus loss, drop held keys so nothing stays stuck
                if !f {
                    self.keys_down.clear();
                }
            }

            InputEvent::Key { key, state: KeyState::Pressed, repeat } => {
                if self.keys_down.insert(key) {
                    frame.keys_pressed.insert(key);
                } else if repeat {
                    frame.keys_repeated.push(key);
                }
            }

            InputEvent::Key { key, state: KeyState::Released, .. } => {
                if self.keys_down.remove(&key) {
                    frame.keys_released.insert(key);
                }
            }
        }
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(key: Key, state: KeyState, repeat: bool) -> InputEvent {
        InputEvent::Key { key, state, repeat }
    }

    #[test]
    fn press_and_repeat_are_counted() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        state.apply_event(&mut frame, key(Key::ArrowUp, KeyState::Pressed, false));
        state.apply_event(&mut frame, key(Key::ArrowUp, KeyState::Pressed, true));
        state.apply_event(&mut frame, key(Key::ArrowUp, KeyState::Pressed, true));

        assert!(state.key_down(Key::ArrowUp));
        assert_eq!(frame.press_count(Key::ArrowUp), 3);
        assert_eq!(frame.press_count(Key::ArrowDown), 0);

        frame.clear();
        state.apply_event(&mut frame, key(Key::ArrowUp, KeyState::Released, false));
        assert!(frame.keys_released.contains(&Key::ArrowUp));
        assert!(!frame.pressed(Key::ArrowUp));
    }

    #[test]
    fn focus_loss_releases_held_keys() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(&mut frame, key(Key::W, KeyState::Pressed, false));
        state.apply_event(&mut frame, InputEvent::Focused(false));
        assert!(!state.key_down(Key::W));

        // pressing again after refocus is a fresh press
        frame.clear();
        state.apply_event(&mut frame, key(Key::W, KeyState::Pressed, false));
        assert!(frame.pressed(Key::W));
    }
}
