//! Input state consumed by the paint tool
//!
//! The tool only needs the pointer position and press edges of mouse buttons.
//! [`PaintInput`] is the boundary the core reads from; [`InputState`] is a
//! small tracker that window event handlers can feed.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button
    Middle,
}

/// Read-only view of this frame's input
pub trait PaintInput {
    /// Pointer position in screen pixels, origin top-left
    fn pointer_position(&self) -> (f32, f32);

    /// True only on the frame the button went down
    fn is_button_just_pressed(&self, button: MouseButton) -> bool;
}

/// Pointer and button tracker
///
/// Call [`InputState::begin_frame`] once per frame before feeding that frame's
/// events, so press edges last exactly one frame.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pointer: (f32, f32),
    held: HashSet<MouseButton>,
    just_pressed: HashSet<MouseButton>,
}

impl InputState {
    /// Create an input state with the pointer at the origin
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget last frame's press edges
    pub fn begin_frame(&mut self) {
        self.just_pressed.clear();
    }

    /// Handle mouse movement
    pub fn handle_mouse_move(&mut self, x: f32, y: f32) {
        self.pointer = (x, y);
    }

    /// Handle a mouse button transition
    pub fn handle_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if pressed {
            // Key repeat or duplicate events must not produce a second edge
            if self.held.insert(button) {
                self.just_pressed.insert(button);
            }
        } else {
            self.held.remove(&button);
        }
    }

    /// True while the button is held
    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.held.contains(&button)
    }
}

impl PaintInput for InputState {
    fn pointer_position(&self) -> (f32, f32) {
        self.pointer
    }

    fn is_button_just_pressed(&self, button: MouseButton) -> bool {
        self.just_pressed.contains(&button)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_edge_lasts_one_frame() {
        let mut input = InputState::new();
        input.handle_mouse_button(MouseButton::Left, true);
        assert!(input.is_button_just_pressed(MouseButton::Left));

        input.begin_frame();
        assert!(!input.is_button_just_pressed(MouseButton::Left));
        assert!(input.is_button_down(MouseButton::Left));
    }

    #[test]
    fn test_repeated_press_without_release_is_not_an_edge() {
        let mut input = InputState::new();
        input.handle_mouse_button(MouseButton::Left, true);
        input.begin_frame();
        input.handle_mouse_button(MouseButton::Left, true);
        assert!(!input.is_button_just_pressed(MouseButton::Left));

        input.handle_mouse_button(MouseButton::Left, false);
        input.begin_frame();
        input.handle_mouse_button(MouseButton::Left, true);
        assert!(input.is_button_just_pressed(MouseButton::Left));
    }

    #[test]
    fn test_pointer_position() {
        let mut input = InputState::new();
        input.handle_mouse_move(12.0, 34.0);
        assert_eq!(input.pointer_position(), (12.0, 34.0));
    }
}
