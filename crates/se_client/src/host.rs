//! Window-level input routing for the view host.
//!
//! Winit events are mapped onto engine input types here. Key presses are
//! dispatched at frame boundaries: TAB belongs to the host and toggles the
//! earth view. Escape and F3 are host controls too. Every other key goes to
//! the globe view, which decides whether the large globe cares.
//!
//! Pointer input is picked against the large globe: a left press only
//! starts a drag when it lands on the sphere, and the wheel only zooms while
//! the cursor is over it. A drag that started on the globe keeps going when
//! the cursor leaves it, until the button is released.

use se_core::input::{Key, MouseBtn};
use se_render::PerspectiveCamera;
use winit::event::{MouseButton, MouseScrollDelta};
use winit::keyboard::KeyCode;

use crate::layout::CustomLayout;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The view was toggled.
    SwitchedView,
    ToggleOverlay,
    Exit,
    /// Passed to the globe view; `true` when it acted on the key.
    Forwarded(bool),
}

pub fn on_key_press(layout: &mut CustomLayout, key: Key) -> KeyOutcome {
    match key {
        Key::Tab => {
            layout.switch_earth_view();
            KeyOutcome::SwitchedView
        }
        Key::Escape => KeyOutcome::Exit,
        Key::F3 => KeyOutcome::ToggleOverlay,
        other => KeyOutcome::Forwarded(layout.globe_view_mut().on_key(other)),
    }
}

/// Whether the logical cursor position is over the large globe.
pub fn cursor_over_large(
    layout: &CustomLayout,
    camera: &PerspectiveCamera,
    cursor: (f64, f64),
) -> bool {
    let (origin, dir) = camera.cursor_ray(cursor.0 as f32, cursor.1 as f32);
    layout.globe_view().large_under_ray(origin, dir)
}

/// Owns the drag grab on the large globe for one left-button gesture.
#[derive(Debug, Default)]
pub struct PointerRouter {
    grabbed: bool,
}

impl PointerRouter {
    pub fn is_grabbed(&self) -> bool {
        self.grabbed
    }

    /// Left press at `cursor`. Returns true when it grabbed the globe.
    pub fn press(
        &mut self,
        layout: &mut CustomLayout,
        camera: &PerspectiveCamera,
        cursor: (f64, f64),
    ) -> bool {
        self.grabbed = cursor_over_large(layout, camera, cursor);
        if self.grabbed {
            layout.globe_view_mut().on_drag_start(cursor.0, cursor.1);
        }
        self.grabbed
    }

    pub fn release(&mut self) {
        self.grabbed = false;
    }

    /// Cursor motion. Only a grabbed gesture rotates the globe.
    pub fn moved(&mut self, layout: &mut CustomLayout, cursor: (f64, f64)) -> bool {
        self.grabbed && layout.globe_view_mut().on_drag(cursor.0, cursor.1)
    }

    /// Wheel notch at `cursor`. Returns true when the zoom offset moved.
    pub fn wheel(
        &self,
        layout: &mut CustomLayout,
        camera: &PerspectiveCamera,
        cursor: (f64, f64),
        delta_y: f64,
    ) -> bool {
        delta_y != 0.0
            && cursor_over_large(layout, camera, cursor)
            && layout.globe_view_mut().on_scroll(delta_y)
    }
}

pub fn map_key(key_code: KeyCode) -> Option<Key> {
    match key_code {
        KeyCode::Tab => Some(Key::Tab),
        KeyCode::KeyP => Some(Key::P),
        KeyCode::Escape => Some(Key::Escape),
        KeyCode::F3 => Some(Key::F3),
        _ => None,
    }
}

pub fn map_button(button: MouseButton) -> Option<MouseBtn> {
    match button {
        MouseButton::Left => Some(MouseBtn::Left),
        MouseButton::Right => Some(MouseBtn::Right),
        MouseButton::Middle => Some(MouseBtn::Middle),
        _ => None,
    }
}

/// Vertical wheel motion, positive when scrolled away from the user.
/// Only the sign matters to the zoom handler.
pub fn scroll_delta(delta: MouseScrollDelta) -> f64 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y as f64,
        MouseScrollDelta::PixelDelta(pos) => pos.y,
    }
}
