//! Raw input events
//!
//! Defines the input interface the line editor consumes: a key code, the
//! raw byte sequence the key produced, and modifier flags. Keeping this
//! independent of any concrete terminal library means the editor can be
//! driven (and tested) without a real display; the ui layer provides a
//! thin adapter per input backend.

use bitflags::bitflags;

use super::editor::EditorEvent;

bitflags! {
    /// Modifier keys
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CTRL  = 0b0010;
        const ALT   = 0b0100;
    }
}

/// Backend-independent key code
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Backspace,
    Tab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    Esc,
    /// A key this layer does not name; decoding falls back to the raw bytes
    Other,
}

/// One raw input event from the display adapter
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawInputEvent {
    /// Decoded key code
    pub key: Key,
    /// Raw byte sequence the key produced (VT encoding)
    pub bytes: Vec<u8>,
    /// Modifier flags
    pub modifiers: Modifiers,
}

impl RawInputEvent {
    pub fn new(key: Key, bytes: Vec<u8>, modifiers: Modifiers) -> Self {
        Self {
            key,
            bytes,
            modifiers,
        }
    }
}

/// Translate a raw input event into a line-editor event.
///
/// Returns `None` for keys the editor has no contract for (function keys,
/// unbound control combinations). The key code is authoritative; when it is
/// `Key::Other` the raw byte sequence is inspected so escape-encoded input
/// still decodes.
pub fn decode(raw: &RawInputEvent) -> Option<EditorEvent> {
    if raw.modifiers.contains(Modifiers::CTRL) {
        return match raw.key {
            Key::Char('c') | Key::Char('C') => Some(EditorEvent::Interrupt),
            Key::Char('l') | Key::Char('L') => Some(EditorEvent::ClearScreen),
            Key::Char('w') | Key::Char('W') => Some(EditorEvent::DeleteWord),
            Key::Char('k') | Key::Char('K') => Some(EditorEvent::KillLine),
            _ => None,
        };
    }

    // Alt chords are not part of the editing contract
    if raw.modifiers.contains(Modifiers::ALT) {
        return None;
    }

    match raw.key {
        Key::Char(ch) => Some(EditorEvent::Insert(ch)),
        Key::Enter => Some(EditorEvent::Submit),
        Key::Backspace => Some(EditorEvent::Backspace),
        Key::Tab => Some(EditorEvent::Complete),
        Key::Up => Some(EditorEvent::HistoryUp),
        Key::Down => Some(EditorEvent::HistoryDown),
        Key::Left => Some(EditorEvent::CursorLeft),
        Key::Right => Some(EditorEvent::CursorRight),
        Key::Home => Some(EditorEvent::CursorHome),
        Key::End => Some(EditorEvent::CursorEnd),
        Key::Esc => None,
        Key::Other => decode_bytes(&raw.bytes),
    }
}

/// Decode a raw byte sequence without a named key code
fn decode_bytes(bytes: &[u8]) -> Option<EditorEvent> {
    match bytes {
        [0x03] => Some(EditorEvent::Interrupt),
        [0x0C] => Some(EditorEvent::ClearScreen),
        [0x17] => Some(EditorEvent::DeleteWord),
        [0x0B] => Some(EditorEvent::KillLine),
        [0x0D] | [0x0D, 0x0A] => Some(EditorEvent::Submit),
        [0x7F] | [0x08] => Some(EditorEvent::Backspace),
        [0x09] => Some(EditorEvent::Complete),
        [0x1B, b'[', b'A'] => Some(EditorEvent::HistoryUp),
        [0x1B, b'[', b'B'] => Some(EditorEvent::HistoryDown),
        [0x1B, b'[', b'C'] => Some(EditorEvent::CursorRight),
        [0x1B, b'[', b'D'] => Some(EditorEvent::CursorLeft),
        [0x1B, b'[', b'H'] => Some(EditorEvent::CursorHome),
        [0x1B, b'[', b'F'] => Some(EditorEvent::CursorEnd),
        _ => {
            // A single printable UTF-8 scalar inserts itself
            let text = std::str::from_utf8(bytes).ok()?;
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) if !ch.is_control() => Some(EditorEvent::Insert(ch)),
                _ => None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(key: Key) -> RawInputEvent {
        RawInputEvent::new(key, Vec::new(), Modifiers::empty())
    }

    fn ctrl(ch: char) -> RawInputEvent {
        RawInputEvent::new(Key::Char(ch), Vec::new(), Modifiers::CTRL)
    }

    #[test]
    fn test_printable_decodes_to_insert() {
        assert_eq!(decode(&key(Key::Char('a'))), Some(EditorEvent::Insert('a')));
    }

    #[test]
    fn test_control_chords() {
        assert_eq!(decode(&ctrl('c')), Some(EditorEvent::Interrupt));
        assert_eq!(decode(&ctrl('l')), Some(EditorEvent::ClearScreen));
        assert_eq!(decode(&ctrl('w')), Some(EditorEvent::DeleteWord));
        assert_eq!(decode(&ctrl('k')), Some(EditorEvent::KillLine));
        assert_eq!(decode(&ctrl('z')), None);
    }

    #[test]
    fn test_navigation_keys() {
        assert_eq!(decode(&key(Key::Up)), Some(EditorEvent::HistoryUp));
        assert_eq!(decode(&key(Key::Down)), Some(EditorEvent::HistoryDown));
        assert_eq!(decode(&key(Key::Tab)), Some(EditorEvent::Complete));
        assert_eq!(decode(&key(Key::Enter)), Some(EditorEvent::Submit));
    }

    #[test]
    fn test_escape_sequence_fallback() {
        let raw = RawInputEvent::new(Key::Other, vec![0x1B, b'[', b'A'], Modifiers::empty());
        assert_eq!(decode(&raw), Some(EditorEvent::HistoryUp));

        let raw = RawInputEvent::new(Key::Other, vec![0x03], Modifiers::empty());
        assert_eq!(decode(&raw), Some(EditorEvent::Interrupt));
    }

    #[test]
    fn test_raw_printable_byte_fallback() {
        let raw = RawInputEvent::new(Key::Other, b"x".to_vec(), Modifiers::empty());
        assert_eq!(decode(&raw), Some(EditorEvent::Insert('x')));
    }

    #[test]
    fn test_alt_chords_ignored() {
        let raw = RawInputEvent::new(Key::Char('x'), Vec::new(), Modifiers::ALT);
        assert_eq!(decode(&raw), None);
    }
}
