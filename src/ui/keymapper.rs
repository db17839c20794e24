//! Key mapping for terminal input
//!
//! Converts crossterm key events into the backend-independent
//! `RawInputEvent` the line editor consumes: a key code, the VT byte
//! sequence the key would produce on the wire, and modifier flags.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::core::input::{Key, Modifiers, RawInputEvent};

fn map_modifiers(mods: KeyModifiers) -> Modifiers {
    let mut result = Modifiers::empty();
    if mods.contains(KeyModifiers::SHIFT) {
        result |= Modifiers::SHIFT;
    }
    if mods.contains(KeyModifiers::CONTROL) {
        result |= Modifiers::CTRL;
    }
    if mods.contains(KeyModifiers::ALT) {
        result |= Modifiers::ALT;
    }
    result
}

/// Key mapper for converting crossterm events to raw input events
pub struct KeyMapper;

impl KeyMapper {
    /// Map a crossterm KeyEvent to a raw input event.
    ///
    /// Returns `None` for keys with no byte representation (function keys,
    /// media keys); the editor has no contract for those anyway.
    pub fn raw_event(event: &KeyEvent) -> Option<RawInputEvent> {
        let mods = map_modifiers(event.modifiers);

        let key = match event.code {
            KeyCode::Char(ch) => Key::Char(ch),
            KeyCode::Enter => Key::Enter,
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Tab => Key::Tab,
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Home => Key::Home,
            KeyCode::End => Key::End,
            KeyCode::Esc => Key::Esc,
            KeyCode::Delete | KeyCode::PageUp | KeyCode::PageDown => Key::Other,
            _ => return None,
        };

        let bytes = Self::encode(event.code, mods);
        Some(RawInputEvent::new(key, bytes, mods))
    }

    /// VT byte sequence for a key press
    fn encode(code: KeyCode, mods: Modifiers) -> Vec<u8> {
        match code {
            KeyCode::Char(ch) => Self::encode_char(ch, mods),
            KeyCode::Enter => vec![0x0D],
            KeyCode::Backspace => {
                if mods.contains(Modifiers::ALT) {
                    vec![0x1B, 0x7F]
                } else {
                    vec![0x7F]
                }
            }
            KeyCode::Tab => {
                if mods.contains(Modifiers::SHIFT) {
                    b"\x1b[Z".to_vec()
                } else {
                    vec![0x09]
                }
            }
            KeyCode::Esc => vec![0x1B],
            KeyCode::Up => Self::arrow_key(b'A', mods),
            KeyCode::Down => Self::arrow_key(b'B', mods),
            KeyCode::Right => Self::arrow_key(b'C', mods),
            KeyCode::Left => Self::arrow_key(b'D', mods),
            KeyCode::Home => Self::special_key(b'H', mods),
            KeyCode::End => Self::special_key(b'F', mods),
            KeyCode::PageUp => Self::tilde_key(5, mods),
            KeyCode::PageDown => Self::tilde_key(6, mods),
            KeyCode::Delete => Self::tilde_key(3, mods),
            _ => Vec::new(),
        }
    }

    /// Map a character with modifiers
    fn encode_char(ch: char, mods: Modifiers) -> Vec<u8> {
        // Ctrl + letter = control character
        if mods.contains(Modifiers::CTRL) && !mods.contains(Modifiers::ALT) {
            if ch.is_ascii_lowercase() {
                return vec![(ch as u8) - b'a' + 1];
            } else if ch.is_ascii_uppercase() {
                return vec![(ch as u8) - b'A' + 1];
            }
            match ch {
                '@' | '`' | ' ' => return vec![0x00],
                '[' => return vec![0x1B],
                '\\' => return vec![0x1C],
                ']' => return vec![0x1D],
                '^' | '~' => return vec![0x1E],
                '_' | '?' => return vec![0x1F],
                _ => {}
            }
        }

        // Alt + key = ESC + key
        if mods.contains(Modifiers::ALT) && !mods.contains(Modifiers::CTRL) {
            let mut bytes = vec![0x1B];
            bytes.extend(ch.to_string().as_bytes());
            return bytes;
        }

        // Normal character
        ch.to_string().into_bytes()
    }

    /// Arrow key sequence
    fn arrow_key(key: u8, mods: Modifiers) -> Vec<u8> {
        if mods.is_empty() {
            vec![0x1B, b'[', key]
        } else {
            let mod_code = Self::modifier_code(mods);
            format!("\x1b[1;{}{}", mod_code, key as char).into_bytes()
        }
    }

    /// Special key (Home, End) sequence
    fn special_key(key: u8, mods: Modifiers) -> Vec<u8> {
        if mods.is_empty() {
            vec![0x1B, b'[', key]
        } else {
            let mod_code = Self::modifier_code(mods);
            format!("\x1b[1;{}{}", mod_code, key as char).into_bytes()
        }
    }

    /// Tilde key sequence (PageUp, PageDown, Delete)
    fn tilde_key(code: u8, mods: Modifiers) -> Vec<u8> {
        if mods.is_empty() {
            format!("\x1b[{}~", code).into_bytes()
        } else {
            let mod_code = Self::modifier_code(mods);
            format!("\x1b[{};{}~", code, mod_code).into_bytes()
        }
    }

    /// Calculate xterm modifier code
    fn modifier_code(mods: Modifiers) -> u8 {
        1 + if mods.contains(Modifiers::SHIFT) { 1 } else { 0 }
            + if mods.contains(Modifiers::ALT) { 2 } else { 0 }
            + if mods.contains(Modifiers::CTRL) { 4 } else { 0 }
    }
}
