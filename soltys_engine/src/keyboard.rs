use crate::keys::KeyCode;

pub const VKEY_COUNT: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub alt: bool,
    pub control: bool,
}

/// Keyboard state mirrored for the scripting layer: per-virtual-key down
/// flags plus a snapshot of the most recent key event.
#[derive(Debug)]
pub struct KeyboardState {
    key_states: [bool; VKEY_COUNT],
    current_printable: bool,
    current_char_code: u32,
    current_key_data: u32,
    current_shift: bool,
    current_alt: bool,
    current_control: bool,
}

impl Default for KeyboardState {
    fn default() -> Self {
        KeyboardState::new()
    }
}

impl KeyboardState {
    pub fn new() -> Self {
        KeyboardState {
            key_states: [false; VKEY_COUNT],
            current_printable: false,
            current_char_code: 0,
            current_key_data: 0,
            current_shift: false,
            current_alt: false,
            current_control: false,
        }
    }

    pub fn handle_key_press(&mut self, key: KeyCode, mods: Modifiers) {
        let vkey = key.virtual_key();
        if let Some(state) = self.key_states.get_mut(vkey as usize) {
            *state = true;
        }

        let printable = key.printable().map(|ch| {
            if mods.shift {
                ch.to_ascii_uppercase()
            } else {
                ch
            }
        });
        self.current_printable = printable.is_some();
        self.current_char_code = printable.map(|ch| ch as u32).unwrap_or(vkey);
        self.current_key_data = vkey;
        self.current_shift = mods.shift;
        self.current_alt = mods.alt;
        self.current_control = mods.control;
    }

    pub fn handle_key_release(&mut self, key: KeyCode) {
        let vkey = key.virtual_key();
        if let Some(state) = self.key_states.get_mut(vkey as usize) {
            *state = false;
        }
    }

    pub fn is_key_down(&self, vkey: u32) -> bool {
        self.key_states
            .get(vkey as usize)
            .copied()
            .unwrap_or(false)
    }

    pub fn is_char_down(&self, ch: char) -> bool {
        KeyCode::from_char(ch)
            .map(|key| self.is_key_down(key.virtual_key()))
            .unwrap_or(false)
    }

    pub fn is_shift_down(&self) -> bool {
        self.current_shift
    }

    pub fn is_alt_down(&self) -> bool {
        self.current_alt
    }

    pub fn is_control_down(&self) -> bool {
        self.current_control
    }

    /// The character of the last key press, when it had one.
    pub fn current_key(&self) -> Option<char> {
        if self.current_printable {
            char::from_u32(self.current_char_code)
        } else {
            None
        }
    }

    pub fn printable(&self) -> bool {
        self.current_printable
    }

    pub fn char_code(&self) -> u32 {
        self.current_char_code
    }

    pub fn key_data(&self) -> u32 {
        self.current_key_data
    }
}
