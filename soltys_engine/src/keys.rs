/// Engine key codes, plus the legacy virtual-key numbering the scripting
/// layer exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum KeyCode {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    Digit0,
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    Digit5,
    Digit6,
    Digit7,
    Digit8,
    Digit9,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    Up,
    Down,
    Left,
    Right,
    Space,
    Return,
    Escape,
    Tab,
    Backspace,
    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    Shift,
    Control,
    Alt,
}

const LETTERS: [KeyCode; 26] = [
    KeyCode::A,
    KeyCode::B,
    KeyCode::C,
    KeyCode::D,
    KeyCode::E,
    KeyCode::F,
    KeyCode::G,
    KeyCode::H,
    KeyCode::I,
    KeyCode::J,
    KeyCode::K,
    KeyCode::L,
    KeyCode::M,
    KeyCode::N,
    KeyCode::O,
    KeyCode::P,
    KeyCode::Q,
    KeyCode::R,
    KeyCode::S,
    KeyCode::T,
    KeyCode::U,
    KeyCode::V,
    KeyCode::W,
    KeyCode::X,
    KeyCode::Y,
    KeyCode::Z,
];

const DIGITS: [KeyCode; 10] = [
    KeyCode::Digit0,
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
    KeyCode::Digit9,
];

const FUNCTION_KEYS: [KeyCode; 12] = [
    KeyCode::F1,
    KeyCode::F2,
    KeyCode::F3,
    KeyCode::F4,
    KeyCode::F5,
    KeyCode::F6,
    KeyCode::F7,
    KeyCode::F8,
    KeyCode::F9,
    KeyCode::F10,
    KeyCode::F11,
    KeyCode::F12,
];

impl KeyCode {
    pub const COUNT: usize = KeyCode::Alt as usize + 1;

    /// Legacy virtual-key number of this key.
    pub fn virtual_key(self) -> u32 {
        use KeyCode::*;
        match self {
            Backspace => 8,
            Tab => 9,
            Return => 13,
            Shift => 16,
            Control => 17,
            Alt => 18,
            Escape => 27,
            Space => 32,
            PageUp => 33,
            PageDown => 34,
            End => 35,
            Home => 36,
            Left => 37,
            Up => 38,
            Right => 39,
            Down => 40,
            Insert => 45,
            Delete => 46,
            Digit0 | Digit1 | Digit2 | Digit3 | Digit4 | Digit5 | Digit6 | Digit7 | Digit8
            | Digit9 => 48 + (self as u32 - Digit0 as u32),
            A | B | C | D | E | F | G | H | I | J | K | L | M | N | O | P | Q | R | S | T | U
            | V | W | X | Y | Z => 65 + (self as u32 - A as u32),
            F1 | F2 | F3 | F4 | F5 | F6 | F7 | F8 | F9 | F10 | F11 | F12 => {
                112 + (self as u32 - F1 as u32)
            }
        }
    }

    pub fn from_virtual_key(vkey: u32) -> Option<KeyCode> {
        use KeyCode::*;
        Some(match vkey {
            8 => Backspace,
            9 => Tab,
            13 => Return,
            16 => Shift,
            17 => Control,
            18 => Alt,
            27 => Escape,
            32 => Space,
            33 => PageUp,
            34 => PageDown,
            35 => End,
            36 => Home,
            37 => Left,
            38 => Up,
            39 => Right,
            40 => Down,
            45 => Insert,
            46 => Delete,
            48..=57 => DIGITS[(vkey - 48) as usize],
            65..=90 => LETTERS[(vkey - 65) as usize],
            112..=123 => FUNCTION_KEYS[(vkey - 112) as usize],
            _ => return None,
        })
    }

    pub fn from_char(ch: char) -> Option<KeyCode> {
        let upper = ch.to_ascii_uppercase();
        match upper {
            'A'..='Z' => Some(LETTERS[(upper as u8 - b'A') as usize]),
            '0'..='9' => Some(DIGITS[(upper as u8 - b'0') as usize]),
            ' ' => Some(KeyCode::Space),
            _ => None,
        }
    }

    /// The character this key produces when it is printable at all; letters
    /// come back lowercase.
    pub fn printable(self) -> Option<char> {
        match self.virtual_key() {
            32 => Some(' '),
            vkey @ 48..=57 => Some(vkey as u8 as char),
            vkey @ 65..=90 => Some((vkey as u8 as char).to_ascii_lowercase()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn virtual_keys_round_trip() {
        for key in [
            KeyCode::A,
            KeyCode::Z,
            KeyCode::Digit0,
            KeyCode::Digit9,
            KeyCode::F1,
            KeyCode::F12,
            KeyCode::Return,
            KeyCode::Escape,
            KeyCode::Space,
            KeyCode::Left,
            KeyCode::Shift,
        ] {
            assert_eq!(KeyCode::from_virtual_key(key.virtual_key()), Some(key));
        }
    }

    #[test]
    fn known_virtual_key_numbers() {
        assert_eq!(KeyCode::Return.virtual_key(), 13);
        assert_eq!(KeyCode::Escape.virtual_key(), 27);
        assert_eq!(KeyCode::Space.virtual_key(), 32);
        assert_eq!(KeyCode::A.virtual_key(), 65);
        assert_eq!(KeyCode::F12.virtual_key(), 123);
    }

    #[test]
    fn chars_map_to_keys() {
        assert_eq!(KeyCode::from_char('a'), Some(KeyCode::A));
        assert_eq!(KeyCode::from_char('Z'), Some(KeyCode::Z));
        assert_eq!(KeyCode::from_char('7'), Some(KeyCode::Digit7));
        assert_eq!(KeyCode::from_char(' '), Some(KeyCode::Space));
        assert_eq!(KeyCode::from_char('!'), None);
    }

    #[test]
    fn printable_characters() {
        assert_eq!(KeyCode::A.printable(), Some('a'));
        assert_eq!(KeyCode::Digit3.printable(), Some('3'));
        assert_eq!(KeyCode::Space.printable(), Some(' '));
        assert_eq!(KeyCode::F5.printable(), None);
        assert_eq!(KeyCode::Shift.printable(), None);
    }
}
