//! Per-frame input snapshot.
//!
//! [`Input`] accumulates winit window events into a keyboard/mouse snapshot
//! the state tick reads. "Down" is level state; "pressed"/"released" are
//! edges that last for exactly one frame — [`Input::end_frame`] rolls them
//! over after the tick has run.

use std::collections::HashSet;

use glam::Vec2;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Keyboard and mouse state for the current frame.
#[derive(Default)]
pub struct Input {
    keys_down: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    keys_released: HashSet<KeyCode>,
    buttons_down: HashSet<MouseButton>,
    buttons_pressed: HashSet<MouseButton>,
    cursor: Vec2,
    cursor_delta: Vec2,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one window event into the snapshot.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => {
                            if self.keys_down.insert(key) {
                                self.keys_pressed.insert(key);
                            }
                        }
                        ElementState::Released => {
                            self.keys_down.remove(&key);
                            self.keys_released.insert(key);
                        }
                    }
                }
            }
            WindowEvent::MouseInput { state, button, .. } => match state {
                ElementState::Pressed => {
                    if self.buttons_down.insert(*button) {
                        self.buttons_pressed.insert(*button);
                    }
                }
                ElementState::Released => {
                    self.buttons_down.remove(button);
                }
            },
            WindowEvent::CursorMoved { position, .. } => {
                let position = Vec2::new(position.x as f32, position.y as f32);
                self.cursor_delta += position - self.cursor;
                self.cursor = position;
            }
            _ => {}
        }
    }

    /// Clears the one-frame edge state; call after the frame's tick.
    pub fn end_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.buttons_pressed.clear();
        self.cursor_delta = Vec2::ZERO;
    }

    /// True while the key is held.
    pub fn key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// True only on the frame the key went down.
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// True only on the frame the key went up.
    pub fn key_released(&self, key: KeyCode) -> bool {
        self.keys_released.contains(&key)
    }

    /// -1/0/+1 from a pair of keys; handy for movement axes.
    pub fn axis(&self, negative: KeyCode, positive: KeyCode) -> f32 {
        (self.key_down(positive) as i32 - self.key_down(negative) as i32) as f32
    }

    pub fn button_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }

    pub fn button_pressed(&self, button: MouseButton) -> bool {
        self.buttons_pressed.contains(&button)
    }

    /// Cursor position in window pixels.
    pub fn cursor(&self) -> Vec2 {
        self.cursor
    }

    /// Cursor movement accumulated this frame.
    pub fn cursor_delta(&self) -> Vec2 {
        self.cursor_delta
    }
}
