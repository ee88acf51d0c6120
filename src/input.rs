use std::collections::HashSet;

use glam::Vec2;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Pointer and keyboard state needed to drive the curtain.
#[derive(Default)]
pub struct Input {
    keys_pressed: HashSet<KeyCode>,
    mouse_buttons_down: HashSet<MouseButton>,
    mouse_position: Vec2,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call after each handled event batch to reset per-frame state.
    pub fn end_frame(&mut self) {
        self.keys_pressed.clear();
    }

    /// Process a window event and update input state.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let (PhysicalKey::Code(key), ElementState::Pressed) =
                    (event.physical_key, event.state)
                {
                    self.keys_pressed.insert(key);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => match state {
                ElementState::Pressed => {
                    self.mouse_buttons_down.insert(*button);
                }
                ElementState::Released => {
                    self.mouse_buttons_down.remove(button);
                }
            },
            WindowEvent::CursorMoved { position, .. } => {
                self.mouse_position = Vec2::new(position.x as f32, position.y as f32);
            }
            WindowEvent::CursorLeft { .. } => {
                self.mouse_buttons_down.clear();
            }
            _ => {}
        }
    }

    /// Returns true if the key was pressed since the last [`end_frame`](Self::end_frame).
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Returns true if the mouse button is currently held down.
    pub fn mouse_down(&self, button: MouseButton) -> bool {
        self.mouse_buttons_down.contains(&button)
    }

    /// Current mouse position in window coordinates.
    pub fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }

    /// Curtain position under the cursor while the left button is held.
    pub fn dragged_curtain(&self, window_width: u32) -> Option<f32> {
        self.mouse_down(MouseButton::Left)
            .then(|| curtain_at(self.mouse_position.x, window_width))
    }
}

/// Map a horizontal window coordinate to a curtain position in `[0, 1]`.
pub fn curtain_at(x: f32, window_width: u32) -> f32 {
    if window_width == 0 {
        return 1.0;
    }
    (x / window_width as f32).clamp(0.0, 1.0)
}
