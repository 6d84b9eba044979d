//! Input handling for keyboard and mouse, and the per-tick player intent.

use glam::Vec2;
use std::collections::HashSet;

/// Manages raw input state for the current frame.
#[derive(Debug, Default)]
pub struct InputState {
    /// Keys currently held down.
    keys_held: HashSet<KeyCode>,
    /// Keys pressed this frame.
    keys_pressed: HashSet<KeyCode>,

    /// Mouse buttons currently held.
    mouse_held: HashSet<MouseButton>,

    /// Mouse movement accumulated since `begin_frame`.
    mouse_delta: Vec2,

    /// Whether the cursor is captured/locked.
    cursor_locked: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear per-frame state. Call at the start of each frame.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.mouse_delta = Vec2::ZERO;
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
                self.mouse_held.insert(button);
            }
            ElementState::Released => {
                self.mouse_held.remove(&button);
            }
        }
    }

    /// Process mouse movement.
    pub fn process_mouse_motion(&mut self, delta: (f64, f64)) {
        self.mouse_delta.x += delta.0 as f32;
        self.mouse_delta.y += delta.1 as f32;
    }

    /// Check if a key is currently held.
    pub fn is_key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    /// Check if a key was pressed this frame.
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Check if a mouse button is held.
    pub fn is_mouse_held(&self, button: MouseButton) -> bool {
        self.mouse_held.contains(&button)
    }

    /// Mouse movement delta for this frame, in pixels.
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    /// Check if the cursor is locked.
    pub fn is_cursor_locked(&self) -> bool {
        self.cursor_locked
    }

    /// Set cursor lock state.
    pub fn set_cursor_locked(&mut self, locked: bool) {
        self.cursor_locked = locked;
    }

    /// Get movement input as a normalized vector (WASD). `y` is forward.
    pub fn get_movement_input(&self) -> Vec2 {
        let mut movement = Vec2::ZERO;

        if self.is_key_held(KeyCode::KeyW) {
            movement.y += 1.0;
        }
        if self.is_key_held(KeyCode::KeyS) {
            movement.y -= 1.0;
        }
        if self.is_key_held(KeyCode::KeyA) {
            movement.x -= 1.0;
        }
        if self.is_key_held(KeyCode::KeyD) {
            movement.x += 1.0;
        }

        movement.normalize_or_zero()
    }

    /// Check if sprint is held (Shift).
    pub fn is_sprinting(&self) -> bool {
        self.is_key_held(KeyCode::ShiftLeft) || self.is_key_held(KeyCode::ShiftRight)
    }

    /// Check if jump was pressed (Space).
    pub fn is_jump_pressed(&self) -> bool {
        self.is_key_pressed(KeyCode::Space)
    }

    /// Check if roll was pressed (C or Left Ctrl).
    pub fn is_roll_pressed(&self) -> bool {
        self.is_key_pressed(KeyCode::KeyC) || self.is_key_pressed(KeyCode::ControlLeft)
    }

    /// Check if fire is held (Left mouse button).
    pub fn is_fire_held(&self) -> bool {
        self.is_mouse_held(MouseButton::Left)
    }

    /// Check if aim is held (Right mouse button).
    pub fn is_aim_held(&self) -> bool {
        self.is_mouse_held(MouseButton::Right)
    }

    /// Check if reload was pressed (R).
    pub fn is_reload_pressed(&self) -> bool {
        self.is_key_pressed(KeyCode::KeyR)
    }
}

/// What the player wants to do this tick.
///
/// Held controls mirror the current frame. One-shot requests (jump, roll,
/// reload) latch until the controller consumes them, so a press between two
/// fixed ticks is never lost.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    /// Planar move intent, `x` right and `y` forward, length ≤ 1.
    pub move_input: Vec2,
    /// Look delta (yaw, pitch) in degrees for this tick.
    pub look: Vec2,
    pub sprint: bool,
    pub aim: bool,
    pub fire: bool,
    pub jump: bool,
    pub roll: bool,
    pub reload: bool,
    /// Scale speed by `move_input` length (gamepad) instead of treating it as full.
    pub analog_movement: bool,
}

impl PlayerInput {
    /// Mouse degrees per pixel of motion.
    pub const LOOK_SENSITIVITY: f32 = 0.12;

    /// Fold this frame's raw input into the intent.
    pub fn capture(&mut self, input: &InputState) {
        self.move_input = input.get_movement_input();
        self.look = if input.is_cursor_locked() {
            input.mouse_delta() * Self::LOOK_SENSITIVITY
        } else {
            Vec2::ZERO
        };
        self.sprint = input.is_sprinting();
        self.aim = input.is_aim_held();
        self.fire = input.is_fire_held();
        self.jump |= input.is_jump_pressed();
        self.roll |= input.is_roll_pressed();
        self.reload |= input.is_reload_pressed();
    }

    /// Take a latched request, clearing it.
    pub fn consume(flag: &mut bool) -> bool {
        std::mem::take(flag)
    }
}

// Re-export for convenience
pub use winit::event::{ElementState, MouseButton};
pub use winit::keyboard::KeyCode;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagonal_movement_is_normalized() {
        let mut state = InputState::new();
        state.process_keyboard(KeyCode::KeyW, ElementState::Pressed);
        state.process_keyboard(KeyCode::KeyD, ElementState::Pressed);
        let m = state.get_movement_input();
        assert!((m.length() - 1.0).abs() < 1e-5);
        assert!(m.x > 0.0 && m.y > 0.0);
    }

    #[test]
    fn one_shot_requests_latch_across_frames() {
        let mut state = InputState::new();
        let mut intent = PlayerInput::default();

        state.process_keyboard(KeyCode::Space, ElementState::Pressed);
        intent.capture(&state);
        state.begin_frame();
        intent.capture(&state);
        assert!(intent.jump, "press survives a frame without a tick");

        assert!(PlayerInput::consume(&mut intent.jump));
        assert!(!intent.jump);
    }

    #[test]
    fn held_controls_follow_state() {
        let mut state = InputState::new();
        let mut intent = PlayerInput::default();
        state.process_mouse_button(MouseButton::Right, ElementState::Pressed);
        state.process_keyboard(KeyCode::ShiftLeft, ElementState::Pressed);
        intent.capture(&state);
        assert!(intent.aim && intent.sprint);

        state.process_mouse_button(MouseButton::Right, ElementState::Released);
        intent.capture(&state);
        assert!(!intent.aim);
    }

    #[test]
    fn look_ignored_without_cursor_lock() {
        let mut state = InputState::new();
        state.process_mouse_motion((10.0, 0.0));
        let mut intent = PlayerInput::default();
        intent.capture(&state);
        assert_eq!(intent.look, Vec2::ZERO);

        state.set_cursor_locked(true);
        intent.capture(&state);
        assert!((intent.look.x - 10.0 * PlayerInput::LOOK_SENSITIVITY).abs() < 1e-5);

        state.begin_frame();
        intent.capture(&state);
        assert_eq!(intent.look, Vec2::ZERO);
    }
}
