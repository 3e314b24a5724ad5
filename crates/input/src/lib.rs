//! Pointer and keyboard state for the map viewer.
//!
//! Tracks held keys, the cursor, drag distance and scroll steps,
//! and tells clicks apart from orbit drags.

use glam::Vec2;
use std::collections::HashSet;

/// Cursor travel, in pixels, after which a press becomes a drag instead of a click.
pub const CLICK_SLOP: f32 = 4.0;

/// A press that is still being held.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Press {
    origin: Vec2,
    travelled: f32,
}

/// Manages input state for the current frame.
#[derive(Debug, Default)]
pub struct InputState {
    /// Keys currently held down.
    keys_held: HashSet<KeyCode>,
    /// Keys pressed this frame.
    keys_pressed: HashSet<KeyCode>,

    /// Left button press in progress.
    primary_press: Option<Press>,
    /// Release of a press that never turned into a drag, in window pixels.
    pending_click: Option<Vec2>,

    /// Mouse position in window coordinates.
    mouse_position: Vec2,
    /// Cursor movement while the left button is held, accumulated until taken.
    drag_delta: Vec2,
    /// Scroll steps this frame, positive away from the user.
    scroll: f32,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear per-frame state. Call once per frame after the frame has used it.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.scroll = 0.0;
    }

    /// Process a keyboard event.
    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.keys_held.contains(&key) {
                    self.keys_pressed.insert(key);
                }
                self.keys_held.insert(key);
            }
            ElementState::Released => {
                self.keys_held.remove(&key);
            }
        }
    }

    /// Process a mouse button event.
    pub fn process_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if button == MouseButton::Left {
                    self.primary_press = Some(Press {
                        origin: self.mouse_position,
                        travelled: 0.0,
                    });
                }
            }
            ElementState::Released => {
                if button == MouseButton::Left {
                    if let Some(press) = self.primary_press.take() {
                        if press.travelled <= CLICK_SLOP {
                            self.pending_click = Some(press.origin);
                            self.drag_delta = Vec2::ZERO;
                        }
                    }
                }
            }
        }
    }

    /// Process cursor position update.
    pub fn process_cursor_position(&mut self, position: (f64, f64)) {
        let next = Vec2::new(position.0 as f32, position.1 as f32);
        let delta = next - self.mouse_position;
        self.mouse_position = next;
        if let Some(press) = self.primary_press.as_mut() {
            press.travelled += delta.length();
            self.drag_delta += delta;
        }
    }

    /// Process a wheel event in lines (pixel deltas are converted by the caller).
    pub fn process_scroll(&mut self, lines: f32) {
        self.scroll += lines;
    }

    /// Check if a key was pressed this frame.
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Whether the current left press has moved far enough to orbit.
    pub fn is_dragging(&self) -> bool {
        self.primary_press.is_some_and(|p| p.travelled > CLICK_SLOP)
    }

    /// Drag movement since the last call. Zero until the press becomes a drag.
    pub fn take_drag_delta(&mut self) -> Vec2 {
        if !self.is_dragging() && self.primary_press.is_some() {
            return Vec2::ZERO;
        }
        std::mem::take(&mut self.drag_delta)
    }

    /// Position of the latest completed click, once.
    pub fn take_click(&mut self) -> Option<Vec2> {
        self.pending_click.take()
    }

    /// Scroll steps this frame.
    pub fn scroll(&self) -> f32 {
        self.scroll
    }
}

// Re-export for convenience
pub use winit::event::{ElementState, MouseButton};
pub use winit::keyboard::KeyCode;
