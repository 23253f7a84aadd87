use std::collections::VecDeque;

use crate::keys::KeyCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    MouseMove { x: i32, y: i32 },
    ButtonDown { button: MouseButton, x: i32, y: i32 },
    ButtonUp { button: MouseButton, x: i32, y: i32 },
    KeyDown { key: KeyCode },
    KeyUp { key: KeyCode },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// Frame-oriented input pump. The host pushes events; `poll` folds them into
/// one-frame click flags and the per-key down table once per frame.
#[derive(Debug)]
pub struct Input {
    queue: VecDeque<InputEvent>,
    mouse_pos: Point,
    left_click: bool,
    left_release: bool,
    right_click: bool,
    right_release: bool,
    key_down: [bool; KeyCode::COUNT],
}

impl Default for Input {
    fn default() -> Self {
        Input::new()
    }
}

impl Input {
    pub fn new() -> Self {
        Input {
            queue: VecDeque::new(),
            mouse_pos: Point::default(),
            left_click: false,
            left_release: false,
            right_click: false,
            right_release: false,
            key_down: [false; KeyCode::COUNT],
        }
    }

    pub fn push_event(&mut self, event: InputEvent) {
        self.queue.push_back(event);
    }

    /// Drains pending events for this frame. A button or key transition ends
    /// the drain so one state change registers per frame; mouse motion only
    /// tracks the pointer and keeps going.
    pub fn poll(&mut self) {
        self.left_click = false;
        self.left_release = false;
        self.right_click = false;
        self.right_release = false;

        while let Some(event) = self.queue.pop_front() {
            match event {
                InputEvent::MouseMove { x, y } => {
                    self.mouse_pos = Point { x, y };
                }
                InputEvent::ButtonDown { button, x, y } => {
                    self.mouse_pos = Point { x, y };
                    match button {
                        MouseButton::Left => self.left_click = true,
                        MouseButton::Right => self.right_click = true,
                    }
                    return;
                }
                InputEvent::ButtonUp { button, x, y } => {
                    self.mouse_pos = Point { x, y };
                    match button {
                        MouseButton::Left => self.left_release = true,
                        MouseButton::Right => self.right_release = true,
                    }
                    return;
                }
                InputEvent::KeyDown { key } => {
                    self.key_down[key as usize] = true;
                    return;
                }
                InputEvent::KeyUp { key } => {
                    self.key_down[key as usize] = false;
                    return;
                }
            }
        }
    }

    /// Reports whether a key went down and clears it, so one press registers
    /// in exactly one frame.
    pub fn async_key_state(&mut self, key: KeyCode) -> bool {
        let down = self.key_down[key as usize];
        self.key_down[key as usize] = false;
        down
    }

    pub fn mouse_pos(&self) -> Point {
        self.mouse_pos
    }

    pub fn mouse_left_clicked(&self) -> bool {
        self.left_click
    }

    pub fn mouse_right_clicked(&self) -> bool {
        self.right_click
    }

    pub fn mouse_left_released(&self) -> bool {
        self.left_release
    }

    pub fn mouse_right_released(&self) -> bool {
        self.right_release
    }
}
