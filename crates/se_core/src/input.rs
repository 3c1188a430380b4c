//! Input state tracking with both edge-triggered and level-triggered queries.
//!
//! Keys are edge-triggered for the client's commands (TAB toggles the view,
//! P spins the large globe). Mouse buttons are also tracked level-triggered so
//! the host can tell whether a cursor move belongs to a drag gesture.
//!
//! `end_frame()` clears the edge state. The host dispatches fresh presses
//! once per frame and calls it right after, so each press acts exactly once
//! however many fixed steps that frame runs.

use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Tab,
    P,
    Escape,
    F3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseBtn {
    Left,
    Right,
    Middle,
}

#[derive(Debug, Default)]
pub struct InputState {
    held: HashSet<Key>,
    just_pressed: HashSet<Key>,
    just_released: HashSet<Key>,

    mouse_held: HashSet<MouseBtn>,
    mouse_just_pressed: HashSet<MouseBtn>,

    cursor: (f64, f64),
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true only on the transition from up to down; OS key repeat is ignored.
    pub fn key_down(&mut self, key: Key) -> bool {
        let fresh = self.held.insert(key);
        if fresh {
            self.just_pressed.insert(key);
        }
        fresh
    }

    pub fn key_up(&mut self, key: Key) {
        if self.held.remove(&key) {
            self.just_released.insert(key);
        }
    }

    pub fn mouse_down(&mut self, btn: MouseBtn) -> bool {
        let fresh = self.mouse_held.insert(btn);
        if fresh {
            self.mouse_just_pressed.insert(btn);
        }
        fresh
    }

    pub fn mouse_up(&mut self, btn: MouseBtn) {
        self.mouse_held.remove(&btn);
    }

    pub fn set_cursor(&mut self, x: f64, y: f64) {
        self.cursor = (x, y);
    }

    pub fn cursor(&self) -> (f64, f64) {
        self.cursor
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

    /// A drag is any cursor motion while the left button is down.
    pub fn is_dragging(&self) -> bool {
        self.is_mouse_held(MouseBtn::Left)
    }

    /// Keys pressed since the last `end_frame`, in no particular order.
    pub fn pressed_keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.just_pressed.iter().copied()
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
        self.mouse_just_pressed.clear();
    }
}
