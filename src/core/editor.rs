//! Line editor
//!
//! A per-session state machine that turns decoded input events into edits
//! on the command buffer. The transition function is pure with respect to
//! the display: it mutates editor state and returns the effects the driver
//! must perform (redraw, clear, dispatch, ...), so the whole editing
//! contract is unit-testable without a terminal.
//!
//! # State machine
//!
//! ```text
//! Ready ⇄ Editing          on any non-Enter key
//! Editing --Enter (non-empty)--> Dispatching --result--> Ready
//! Editing --Enter (empty)-----> Ready
//! Editing --Ctrl+C------------> Ready        (aborts without dispatch)
//! ```

use super::completion::CompletionEngine;
use super::history::HistoryStore;

/// Input events the editor has a contract for
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditorEvent {
    /// Printable character
    Insert(char),
    /// Pasted text (inserted character by character)
    Paste(String),
    Backspace,
    /// Ctrl+C
    Interrupt,
    /// Ctrl+L
    ClearScreen,
    /// Ctrl+W
    DeleteWord,
    /// Ctrl+K
    KillLine,
    HistoryUp,
    HistoryDown,
    /// Tab
    Complete,
    /// Enter
    Submit,
    CursorLeft,
    CursorRight,
    CursorHome,
    CursorEnd,
}

/// Effects the driver must perform after a transition
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// The prompt line changed and needs repainting
    Redraw,
    /// Ctrl+C: echo the aborted line with a trailing ^C and re-show the prompt
    Interrupted { aborted: String },
    /// Clear the display; `banner` reprints the fixed banner (Ctrl+L)
    ClearDisplay { banner: bool },
    /// Ambiguous completion: print the candidates, one per line
    ListCandidates(Vec<String>),
    /// Empty submission: just re-show the prompt
    EchoPrompt,
    /// Hand the trimmed command to the dispatcher
    Dispatch(String),
}

/// Editor phase within the session state machine
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Ready,
    Editing,
    Dispatching,
}

/// Per-session editing state
#[derive(Debug, Default)]
pub struct EditorState {
    /// In-progress command text
    buffer: String,
    /// Cursor offset in characters, `0 <= cursor <= buffer chars`
    cursor: usize,
    /// History navigation cursor; `None` means not browsing
    history_cursor: Option<usize>,
    /// Current phase
    phase: Phase,
}

impl EditorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[allow(dead_code)]
    pub fn history_cursor(&self) -> Option<usize> {
        self.history_cursor
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Called by the driver when a dispatched command finishes
    pub fn finish_dispatch(&mut self) {
        if self.phase == Phase::Dispatching {
            self.phase = Phase::Ready;
        }
    }

    /// Apply one input event, returning the effects to perform.
    ///
    /// Boundary no-ops (history navigation past either end, backspace at
    /// offset 0) return no effects and leave the buffer untouched.
    pub fn apply(
        &mut self,
        event: EditorEvent,
        history: &mut HistoryStore,
        completion: &CompletionEngine,
    ) -> Vec<Effect> {
        let effects = match event {
            EditorEvent::Insert(ch) => self.insert_char(ch),
            EditorEvent::Paste(text) => self.paste(&text),
            EditorEvent::Backspace => self.backspace(),
            EditorEvent::Interrupt => self.interrupt(),
            EditorEvent::ClearScreen => {
                self.phase = Phase::Editing;
                vec![Effect::ClearDisplay { banner: true }, Effect::Redraw]
            }
            EditorEvent::DeleteWord => self.delete_word(),
            EditorEvent::KillLine => self.kill_line(),
            EditorEvent::HistoryUp => self.history_up(history),
            EditorEvent::HistoryDown => self.history_down(history),
            EditorEvent::Complete => self.complete(completion),
            EditorEvent::Submit => self.submit(history),
            EditorEvent::CursorLeft => self.move_cursor(-1),
            EditorEvent::CursorRight => self.move_cursor(1),
            EditorEvent::CursorHome => self.set_cursor(0),
            EditorEvent::CursorEnd => self.set_cursor(self.char_len()),
        };
        debug_assert!(self.cursor <= self.char_len());
        effects
    }

    fn insert_char(&mut self, ch: char) -> Vec<Effect> {
        if ch.is_control() {
            return Vec::new();
        }
        let at = self.byte_index(self.cursor);
        self.buffer.insert(at, ch);
        self.cursor += 1;
        self.phase = Phase::Editing;
        vec![Effect::Redraw]
    }

    fn paste(&mut self, text: &str) -> Vec<Effect> {
        let mut inserted = false;
        for ch in text.chars().filter(|ch| !ch.is_control()) {
            let at = self.byte_index(self.cursor);
            self.buffer.insert(at, ch);
            self.cursor += 1;
            inserted = true;
        }
        if inserted {
            self.phase = Phase::Editing;
            vec![Effect::Redraw]
        } else {
            Vec::new()
        }
    }

    fn backspace(&mut self) -> Vec<Effect> {
        if self.cursor == 0 {
            return Vec::new();
        }
        let at = self.byte_index(self.cursor - 1);
        self.buffer.remove(at);
        self.cursor -= 1;
        self.phase = Phase::Editing;
        vec![Effect::Redraw]
    }

    fn interrupt(&mut self) -> Vec<Effect> {
        let aborted = std::mem::take(&mut self.buffer);
        self.cursor = 0;
        self.history_cursor = None;
        self.phase = Phase::Ready;
        vec![Effect::Interrupted { aborted }, Effect::Redraw]
    }

    /// Delete back to just after the last whitespace strictly before the
    /// cursor; with no whitespace there, clear everything up to the cursor.
    fn delete_word(&mut self) -> Vec<Effect> {
        if self.cursor == 0 {
            return Vec::new();
        }
        let head: Vec<char> = self.buffer.chars().take(self.cursor).collect();
        let cut_from = match head.iter().rposition(|ch| ch.is_whitespace()) {
            Some(space) => space + 1,
            None => 0,
        };
        if cut_from == self.cursor {
            return Vec::new();
        }
        let start = self.byte_index(cut_from);
        let end = self.byte_index(self.cursor);
        self.buffer.replace_range(start..end, "");
        self.cursor = cut_from;
        self.phase = Phase::Editing;
        vec![Effect::Redraw]
    }

    /// Clears the whole buffer regardless of cursor position (a documented
    /// simplification of kill-to-end-of-line).
    fn kill_line(&mut self) -> Vec<Effect> {
        if self.buffer.is_empty() {
            return Vec::new();
        }
        self.buffer.clear();
        self.cursor = 0;
        self.phase = Phase::Editing;
        vec![Effect::Redraw]
    }

    fn history_up(&mut self, history: &HistoryStore) -> Vec<Effect> {
        let next = match self.history_cursor {
            None => 0,
            Some(index) => index + 1,
        };
        match history.at(next) {
            Some(entry) => {
                self.buffer = entry.to_string();
                self.cursor = self.char_len();
                self.history_cursor = Some(next);
                self.phase = Phase::Editing;
                vec![Effect::Redraw]
            }
            // Already at the oldest entry
            None => Vec::new(),
        }
    }

    fn history_down(&mut self, history: &HistoryStore) -> Vec<Effect> {
        match self.history_cursor {
            Some(index) if index > 0 => {
                let next = index - 1;
                if let Some(entry) = history.at(next) {
                    self.buffer = entry.to_string();
                    self.cursor = self.char_len();
                    self.history_cursor = Some(next);
                    self.phase = Phase::Editing;
                    return vec![Effect::Redraw];
                }
                Vec::new()
            }
            Some(0) => {
                self.buffer.clear();
                self.cursor = 0;
                self.history_cursor = None;
                self.phase = Phase::Editing;
                vec![Effect::Redraw]
            }
            _ => Vec::new(),
        }
    }

    /// Three-way completion: 0 candidates insert a literal fallback (two
    /// spaces), exactly 1 autofills, more than 1 enumerate without touching
    /// the buffer.
    fn complete(&mut self, completion: &CompletionEngine) -> Vec<Effect> {
        self.phase = Phase::Editing;
        let candidates = completion.candidates(&self.buffer);
        match candidates.len() {
            0 => {
                let at = self.byte_index(self.cursor);
                self.buffer.insert_str(at, "  ");
                self.cursor += 2;
                vec![Effect::Redraw]
            }
            1 => {
                self.buffer = candidates[0].to_string();
                self.cursor = self.char_len();
                vec![Effect::Redraw]
            }
            _ => {
                let listing = candidates.iter().map(|c| c.to_string()).collect();
                vec![Effect::ListCandidates(listing), Effect::Redraw]
            }
        }
    }

    /// Buffer, cursor, and history cursor reset on every submission,
    /// whether or not anything is dispatched.
    fn submit(&mut self, history: &mut HistoryStore) -> Vec<Effect> {
        let command = self.buffer.trim().to_string();
        self.buffer.clear();
        self.cursor = 0;
        self.history_cursor = None;

        if command.is_empty() {
            self.phase = Phase::Ready;
            vec![Effect::EchoPrompt, Effect::Redraw]
        } else {
            history.push(&command);
            self.phase = Phase::Dispatching;
            vec![Effect::Dispatch(command), Effect::Redraw]
        }
    }

    fn move_cursor(&mut self, delta: isize) -> Vec<Effect> {
        let target = self.cursor as isize + delta;
        if target < 0 || target > self.char_len() as isize {
            return Vec::new();
        }
        self.set_cursor(target as usize)
    }

    fn set_cursor(&mut self, position: usize) -> Vec<Effect> {
        self.phase = Phase::Editing;
        if position == self.cursor {
            return Vec::new();
        }
        self.cursor = position;
        vec![Effect::Redraw]
    }

    fn char_len(&self) -> usize {
        self.buffer.chars().count()
    }

    /// Byte offset of character index `at`
    fn byte_index(&self, at: usize) -> usize {
        self.buffer
            .char_indices()
            .nth(at)
            .map(|(index, _)| index)
            .unwrap_or(self.buffer.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        state: EditorState,
        history: HistoryStore,
        completion: CompletionEngine,
    }

    impl Fixture {
        fn new() -> Self {
            Self::with_vocabulary(["git", "grep", "grep -r", "npm install"])
        }

        fn with_vocabulary<const N: usize>(vocabulary: [&str; N]) -> Self {
            Self {
                state: EditorState::new(),
                history: HistoryStore::new(),
                completion: CompletionEngine::new(vocabulary),
            }
        }

        fn apply(&mut self, event: EditorEvent) -> Vec<Effect> {
            self.state.apply(event, &mut self.history, &self.completion)
        }

        fn type_str(&mut self, text: &str) {
            for ch in text.chars() {
                self.apply(EditorEvent::Insert(ch));
            }
        }
    }

    #[test]
    fn test_typed_characters_concatenate() {
        let mut fx = Fixture::new();
        fx.type_str("npm install");
        assert_eq!(fx.state.buffer(), "npm install");
        assert_eq!(fx.state.cursor(), 11);
    }

    #[test]
    fn test_typed_then_submitted_dispatches_exact_text() {
        let mut fx = Fixture::new();
        fx.type_str("cargo build");
        assert_eq!(fx.state.cursor(), fx.state.buffer().chars().count());

        let effects = fx.apply(EditorEvent::Submit);
        assert!(effects.contains(&Effect::Dispatch("cargo build".to_string())));
        assert_eq!(fx.state.buffer(), "");
        assert_eq!(fx.state.cursor(), 0);
        assert_eq!(fx.state.history_cursor(), None);
        assert_eq!(fx.state.phase(), Phase::Dispatching);
    }

    #[test]
    fn test_submit_trims_whitespace() {
        let mut fx = Fixture::new();
        fx.type_str("  ls -la  ");
        let effects = fx.apply(EditorEvent::Submit);
        assert!(effects.contains(&Effect::Dispatch("ls -la".to_string())));
        assert_eq!(fx.history.at(0), Some("ls -la"));
    }

    #[test]
    fn test_empty_submit_only_reshows_prompt() {
        let mut fx = Fixture::new();
        fx.type_str("   ");
        let effects = fx.apply(EditorEvent::Submit);
        assert!(effects.contains(&Effect::EchoPrompt));
        assert!(!effects.iter().any(|e| matches!(e, Effect::Dispatch(_))));
        assert_eq!(fx.history.len(), 0);
        assert_eq!(fx.state.phase(), Phase::Ready);
    }

    #[test]
    fn test_insert_mid_buffer() {
        let mut fx = Fixture::new();
        fx.type_str("gt");
        fx.apply(EditorEvent::CursorLeft);
        fx.apply(EditorEvent::Insert('i'));
        assert_eq!(fx.state.buffer(), "git");
        assert_eq!(fx.state.cursor(), 2);
    }

    #[test]
    fn test_backspace() {
        let mut fx = Fixture::new();
        fx.type_str("ab");
        fx.apply(EditorEvent::Backspace);
        assert_eq!(fx.state.buffer(), "a");
        assert_eq!(fx.state.cursor(), 1);

        fx.apply(EditorEvent::Backspace);
        let effects = fx.apply(EditorEvent::Backspace);
        assert!(effects.is_empty());
        assert_eq!(fx.state.buffer(), "");
    }

    #[test]
    fn test_interrupt_clears_without_history_entry() {
        let mut fx = Fixture::new();
        fx.type_str("half typed");
        let effects = fx.apply(EditorEvent::Interrupt);
        assert!(effects.contains(&Effect::Interrupted {
            aborted: "half typed".to_string()
        }));
        assert_eq!(fx.state.buffer(), "");
        assert_eq!(fx.state.cursor(), 0);
        assert_eq!(fx.state.history_cursor(), None);
        assert_eq!(fx.state.phase(), Phase::Ready);
        assert_eq!(fx.history.len(), 0);
    }

    #[test]
    fn test_clear_screen_leaves_buffer() {
        let mut fx = Fixture::new();
        fx.type_str("keep me");
        let effects = fx.apply(EditorEvent::ClearScreen);
        assert!(effects.contains(&Effect::ClearDisplay { banner: true }));
        assert_eq!(fx.state.buffer(), "keep me");
    }

    #[test]
    fn test_delete_word_at_end() {
        let mut fx = Fixture::new();
        fx.type_str("npm install pkg");
        fx.apply(EditorEvent::DeleteWord);
        assert_eq!(fx.state.buffer(), "npm install ");
        assert_eq!(fx.state.cursor(), 12);
    }

    #[test]
    fn test_delete_word_without_whitespace_clears_to_start() {
        let mut fx = Fixture::new();
        fx.type_str("install");
        fx.apply(EditorEvent::DeleteWord);
        assert_eq!(fx.state.buffer(), "");
        assert_eq!(fx.state.cursor(), 0);
    }

    #[test]
    fn test_delete_word_mid_buffer() {
        let mut fx = Fixture::new();
        fx.type_str("git commit now");
        // Cursor after "commit"
        for _ in 0..4 {
            fx.apply(EditorEvent::CursorLeft);
        }
        fx.apply(EditorEvent::DeleteWord);
        assert_eq!(fx.state.buffer(), "git  now");
        assert_eq!(fx.state.cursor(), 4);
    }

    #[test]
    fn test_kill_line_clears_whole_buffer() {
        let mut fx = Fixture::new();
        fx.type_str("npm install pkg");
        fx.apply(EditorEvent::CursorHome);
        fx.apply(EditorEvent::KillLine);
        assert_eq!(fx.state.buffer(), "");
        assert_eq!(fx.state.cursor(), 0);
    }

    #[test]
    fn test_history_navigation() {
        let mut fx = Fixture::new();
        for cmd in ["first", "second", "third"] {
            fx.type_str(cmd);
            fx.apply(EditorEvent::Submit);
        }

        fx.apply(EditorEvent::HistoryUp);
        assert_eq!(fx.state.buffer(), "third");
        assert_eq!(fx.state.cursor(), 5);

        fx.apply(EditorEvent::HistoryUp);
        assert_eq!(fx.state.buffer(), "second");

        fx.apply(EditorEvent::HistoryDown);
        assert_eq!(fx.state.buffer(), "third");

        fx.apply(EditorEvent::HistoryDown);
        assert_eq!(fx.state.buffer(), "");
        assert_eq!(fx.state.history_cursor(), None);

        // Below the sentinel: no-op
        let effects = fx.apply(EditorEvent::HistoryDown);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_history_up_stops_at_oldest() {
        let mut fx = Fixture::new();
        fx.type_str("only");
        fx.apply(EditorEvent::Submit);

        fx.apply(EditorEvent::HistoryUp);
        assert_eq!(fx.state.buffer(), "only");
        let effects = fx.apply(EditorEvent::HistoryUp);
        assert!(effects.is_empty());
        assert_eq!(fx.state.buffer(), "only");
        assert_eq!(fx.state.history_cursor(), Some(0));
    }

    #[test]
    fn test_complete_single_candidate_autofills() {
        let mut fx = Fixture::new();
        fx.type_str("gi");
        fx.apply(EditorEvent::Complete);
        assert_eq!(fx.state.buffer(), "git");
        assert_eq!(fx.state.cursor(), 3);
    }

    #[test]
    fn test_complete_ambiguous_lists_in_vocabulary_order() {
        let mut fx = Fixture::new();
        fx.type_str("gr");
        let effects = fx.apply(EditorEvent::Complete);
        assert_eq!(fx.state.buffer(), "gr");
        assert!(effects.contains(&Effect::ListCandidates(vec![
            "grep".to_string(),
            "grep -r".to_string()
        ])));
    }

    #[test]
    fn test_complete_no_candidates_inserts_fallback() {
        let mut fx = Fixture::new();
        fx.type_str("zz");
        fx.apply(EditorEvent::Complete);
        assert_eq!(fx.state.buffer(), "zz  ");
        assert_eq!(fx.state.cursor(), 4);
    }

    #[test]
    fn test_paste_inserts_at_cursor() {
        let mut fx = Fixture::new();
        fx.type_str("git ");
        fx.apply(EditorEvent::Paste("status\n".to_string()));
        assert_eq!(fx.state.buffer(), "git status");
        assert_eq!(fx.state.cursor(), 10);
    }

    #[test]
    fn test_unicode_buffer_edits() {
        let mut fx = Fixture::new();
        fx.type_str("écho ünï");
        assert_eq!(fx.state.cursor(), 8);
        fx.apply(EditorEvent::Backspace);
        assert_eq!(fx.state.buffer(), "écho ün");
        fx.apply(EditorEvent::DeleteWord);
        assert_eq!(fx.state.buffer(), "écho ");
    }

    #[test]
    fn test_phase_transitions() {
        let mut fx = Fixture::new();
        assert_eq!(fx.state.phase(), Phase::Ready);
        fx.apply(EditorEvent::Insert('l'));
        assert_eq!(fx.state.phase(), Phase::Editing);
        fx.apply(EditorEvent::Submit);
        assert_eq!(fx.state.phase(), Phase::Dispatching);
        fx.state.finish_dispatch();
        assert_eq!(fx.state.phase(), Phase::Ready);
    }
}
