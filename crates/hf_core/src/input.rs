//! Input state tracking with both edge-triggered and level-triggered queries.
//!
//! - **Level-triggered (held):** `is_held(key)` returns true every frame the key
//!   is physically down. Used for movement, running and automatic fire.
//!
//! - **Edge-triggered (just_pressed / just_released):** true only during the frame
//!   the transition happened. Cleared by `end_frame()`, which the main loop calls
//!   only after at least one fixed simulation step has consumed them.
//!
//! - **Mouse look:** raw pointer motion is accumulated into a delta that the first
//!   fixed step of a frame takes with `take_mouse_delta()`.

use std::collections::HashSet;

use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Escape,
    Space,
    Shift,
    Enter,
    F3,
    W,
    A,
    S,
    D,
    M,
    N,
    P,
    R,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseBtn {
    Left,
    Right,
    Middle,
}

pub struct InputState {
    held: HashSet<Key>,
    just_pressed: HashSet<Key>,
    just_released: HashSet<Key>,

    mouse_held: HashSet<MouseBtn>,
    mouse_just_pressed: HashSet<MouseBtn>,
    mouse_just_released: HashSet<MouseBtn>,

    pub mouse_position: (f64, f64),
    mouse_delta: Vec2,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            held: HashSet::new(),
            just_pressed: HashSet::new(),
            just_released: HashSet::new(),
            mouse_held: HashSet::new(),
            mouse_just_pressed: HashSet::new(),
            mouse_just_released: HashSet::new(),
            mouse_position: (0.0, 0.0),
            mouse_delta: Vec2::ZERO,
        }
    }

    pub fn key_down(&mut self, key: Key) {
        if self.held.insert(key) {
            self.just_pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        if self.held.remove(&key) {
            self.just_released.insert(key);
        }
    }

    pub fn mouse_down(&mut self, btn: MouseBtn) {
        if self.mouse_held.insert(btn) {
            self.mouse_just_pressed.insert(btn);
        }
    }

    pub fn mouse_up(&mut self, btn: MouseBtn) {
        if self.mouse_held.remove(&btn) {
            self.mouse_just_released.insert(btn);
        }
    }

    pub fn add_mouse_motion(&mut self, dx: f64, dy: f64) {
        self.mouse_delta += Vec2::new(dx as f32, dy as f32);
    }

    /// Returns the motion accumulated since the last call and zeroes it.
    pub fn take_mouse_delta(&mut self) -> Vec2 {
        std::mem::take(&mut self.mouse_delta)
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    pub fn is_just_released(&self, key: Key) -> bool {
        self.just_released.contains(&key)
    }

    pub fn is_mouse_held(&self, btn: MouseBtn) -> bool {
        self.mouse_held.contains(&btn)
    }

    pub fn is_mouse_just_pressed(&self, btn: MouseBtn) -> bool {
        self.mouse_just_pressed.contains(&btn)
    }

    pub fn is_mouse_just_released(&self, btn: MouseBtn) -> bool {
        self.mouse_just_released.contains(&btn)
    }

    /// Forget everything held. Used when the window loses focus so keys
    /// released elsewhere don't stay stuck down.
    pub fn release_all(&mut self) {
        for key in self.held.drain() {
            self.just_released.insert(key);
        }
        for btn in self.mouse_held.drain() {
            self.mouse_just_released.insert(btn);
        }
        self.mouse_delta = Vec2::ZERO;
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
        self.mouse_just_pressed.clear();
        self.mouse_just_released.clear();
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_down_sets_held_and_just_pressed() {
        let mut input = InputState::new();
        input.key_down(Key::W);
        assert!(input.is_held(Key::W));
        assert!(input.is_just_pressed(Key::W));
    }

    #[test]
    fn test_key_up_clears_held_sets_just_released() {
        let mut input = InputState::new();
        input.key_down(Key::Shift);
        input.key_up(Key::Shift);
        assert!(!input.is_held(Key::Shift));
        assert!(input.is_just_released(Key::Shift));
    }

    #[test]
    fn test_key_repeat_keeps_single_press() {
        let mut input = InputState::new();
        input.key_down(Key::Space);
        input.end_frame();
        // OS key repeat delivers another press while held.
        input.key_down(Key::Space);
        assert!(input.is_held(Key::Space));
        assert!(!input.is_just_pressed(Key::Space));
    }

    #[test]
    fn test_key_up_without_down_is_no_op() {
        let mut input = InputState::new();
        input.key_up(Key::A);
        assert!(!input.is_just_released(Key::A));
        assert!(!input.is_held(Key::A));
    }

    #[test]
    fn test_end_frame_clears_transient_state() {
        let mut input = InputState::new();
        input.key_down(Key::W);
        input.key_down(Key::Space);
        input.end_frame();
        assert!(!input.is_just_pressed(Key::W));
        assert!(!input.is_just_pressed(Key::Space));
        assert!(input.is_held(Key::W));
        assert!(input.is_held(Key::Space));
    }

    #[test]
    fn test_mouse_down_and_up() {
        let mut input = InputState::new();
        input.mouse_down(MouseBtn::Left);
        assert!(input.is_mouse_held(MouseBtn::Left));
        assert!(input.is_mouse_just_pressed(MouseBtn::Left));
        input.end_frame();
        input.mouse_up(MouseBtn::Left);
        assert!(!input.is_mouse_held(MouseBtn::Left));
        assert!(input.is_mouse_just_released(MouseBtn::Left));
    }

    #[test]
    fn test_mouse_delta_accumulates_and_is_taken_once() {
        let mut input = InputState::new();
        input.add_mouse_motion(3.0, -1.0);
        input.add_mouse_motion(2.0, 4.0);
        let delta = input.take_mouse_delta();
        assert!((delta.x - 5.0).abs() < f32::EPSILON);
        assert!((delta.y - 3.0).abs() < f32::EPSILON);
        assert_eq!(input.take_mouse_delta(), Vec2::ZERO);
    }

    #[test]
    fn test_release_all_clears_held_keys() {
        let mut input = InputState::new();
        input.key_down(Key::W);
        input.mouse_down(MouseBtn::Left);
        input.add_mouse_motion(10.0, 0.0);
        input.release_all();
        assert!(!input.is_held(Key::W));
        assert!(input.is_just_released(Key::W));
        assert!(!input.is_mouse_held(MouseBtn::Left));
        assert_eq!(input.take_mouse_delta(), Vec2::ZERO);
    }

    #[test]
    fn test_default_state_is_empty() {
        let input = InputState::new();
        assert!(!input.is_held(Key::W));
        assert!(!input.is_just_pressed(Key::W));
        assert!(!input.is_mouse_held(MouseBtn::Left));
        assert!((input.mouse_position.0 - 0.0).abs() < f64::EPSILON);
    }
}
