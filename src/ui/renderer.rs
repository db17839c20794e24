//! Terminal renderer using crossterm
//!
//! Paints the tab bar, the active session's scrollback and prompt line,
//! and the status bar. The renderer is a full-frame painter: the event
//! loop calls `render` whenever state changed.

use std::collections::HashMap;
use std::io::{self, Write};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute, queue,
    style::{Color as TermColor, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::config::ColorScheme;
use crate::core::output::OutputKind;
use crate::core::session::{Lifecycle, Session, SessionId, SessionManager};

use super::screen::{LineKind, Screen};

/// Transient UI state drawn on top of the session content
#[derive(Default)]
pub struct UiOverlay {
    /// Prefix key armed; shown as a status bar badge
    pub prefix_mode: bool,
    /// In-progress rename text, when renaming the active session
    pub rename: Option<String>,
}

/// Full-frame terminal renderer
pub struct Renderer {
    scheme: ColorScheme,
    initialized: bool,
}

impl Renderer {
    pub fn with_color_scheme(scheme: ColorScheme) -> Self {
        Self {
            scheme,
            initialized: false,
        }
    }

    /// Current terminal size
    pub fn size() -> io::Result<(u16, u16)> {
        terminal::size()
    }

    /// Initialize the terminal for rendering
    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableBracketedPaste, Hide)?;
        self.initialized = true;
        Ok(())
    }

    /// Restore the terminal
    pub fn cleanup(&mut self) -> io::Result<()> {
        if !self.initialized {
            return Ok(());
        }
        self.initialized = false;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            DisableBracketedPaste,
            LeaveAlternateScreen,
            Show,
            ResetColor
        )?;
        terminal::disable_raw_mode()
    }

    /// Paint a full frame
    pub fn render(
        &mut self,
        manager: &SessionManager,
        screens: &HashMap<SessionId, Screen>,
        overlay: &UiOverlay,
    ) -> io::Result<()> {
        let (cols, rows) = terminal::size()?;
        if rows < 3 {
            return Ok(());
        }
        let mut stdout = io::stdout();
        queue!(stdout, Hide)?;

        self.draw_tab_bar(&mut stdout, manager, cols)?;

        let content_height = rows - 2;
        let active = manager.active();
        let screen = active.and_then(|session| screens.get(&session.id));

        match (active, screen) {
            (Some(session), Some(screen)) => {
                self.draw_content(&mut stdout, session, screen, cols, content_height)?;
                self.draw_status_bar(&mut stdout, manager, Some((session, screen)), overlay, cols, rows)?;
                self.place_cursor(&mut stdout, session, screen, cols, content_height)?;
            }
            _ => {
                self.draw_empty_content(&mut stdout, cols, content_height)?;
                self.draw_status_bar(&mut stdout, manager, None, overlay, cols, rows)?;
            }
        }

        stdout.flush()
    }

    fn draw_tab_bar(
        &self,
        stdout: &mut io::Stdout,
        manager: &SessionManager,
        cols: u16,
    ) -> io::Result<()> {
        queue!(
            stdout,
            MoveTo(0, 0),
            SetBackgroundColor(self.scheme.tab_bar_bg.to_crossterm()),
            SetForegroundColor(self.scheme.tab_bar_fg.to_crossterm()),
            Clear(ClearType::CurrentLine)
        )?;

        let active_id = manager.active_id();
        let mut used: u16 = 0;
        for session in manager.iter() {
            let label = match session.lifecycle() {
                Lifecycle::Closing => format!(" {} (closing) ", session.title),
                _ => format!(" {} ", session.title),
            };
            let width = label.width() as u16;
            if used + width > cols {
                break;
            }

            if Some(session.id) == active_id {
                queue!(
                    stdout,
                    SetBackgroundColor(self.scheme.tab_active_bg.to_crossterm()),
                    SetForegroundColor(self.scheme.tab_active_fg.to_crossterm()),
                    Print(&label),
                    SetBackgroundColor(self.scheme.tab_bar_bg.to_crossterm()),
                    SetForegroundColor(self.scheme.tab_bar_fg.to_crossterm()),
                )?;
            } else if session.lifecycle() == Lifecycle::Closing {
                queue!(
                    stdout,
                    SetForegroundColor(self.scheme.tab_closing_fg.to_crossterm()),
                    Print(&label),
                    SetForegroundColor(self.scheme.tab_bar_fg.to_crossterm()),
                )?;
            } else {
                queue!(stdout, Print(&label))?;
            }
            used += width;
        }
        queue!(stdout, ResetColor)?;
        Ok(())
    }

    fn draw_content(
        &self,
        stdout: &mut io::Stdout,
        session: &Session,
        screen: &Screen,
        cols: u16,
        content_height: u16,
    ) -> io::Result<()> {
        // Last content row is the prompt; scrollback fills the rows above
        let scrollback_height = content_height.saturating_sub(1) as usize;
        let visible = screen.visible(scrollback_height);
        let blank_rows = scrollback_height - visible.len();

        for row in 0..scrollback_height {
            queue!(
                stdout,
                MoveTo(0, 1 + row as u16),
                Clear(ClearType::CurrentLine)
            )?;
            if row >= blank_rows {
                let line = visible[row - blank_rows];
                queue!(
                    stdout,
                    SetForegroundColor(self.line_color(line.kind)),
                    Print(fit_width(&line.text, cols as usize)),
                    ResetColor
                )?;
            }
        }

        // Prompt line
        let prompt_row = content_height;
        queue!(
            stdout,
            MoveTo(0, prompt_row),
            Clear(ClearType::CurrentLine),
            SetForegroundColor(self.scheme.output_plain.to_crossterm()),
            Print(fit_width(
                &format!("{}{}", prompt(session), session.editor.buffer()),
                cols as usize
            )),
            ResetColor
        )?;
        Ok(())
    }

    fn draw_empty_content(
        &self,
        stdout: &mut io::Stdout,
        cols: u16,
        content_height: u16,
    ) -> io::Result<()> {
        for row in 0..content_height {
            queue!(stdout, MoveTo(0, 1 + row), Clear(ClearType::CurrentLine))?;
        }
        let hint = "no sessions - press Ctrl+B then c to create one";
        let col = (cols as usize).saturating_sub(hint.width()) as u16 / 2;
        queue!(
            stdout,
            MoveTo(col, content_height / 2),
            SetForegroundColor(self.scheme.echo_fg.to_crossterm()),
            Print(hint),
            ResetColor
        )?;
        Ok(())
    }

    fn draw_status_bar(
        &self,
        stdout: &mut io::Stdout,
        manager: &SessionManager,
        active: Option<(&Session, &Screen)>,
        overlay: &UiOverlay,
        cols: u16,
        rows: u16,
    ) -> io::Result<()> {
        queue!(
            stdout,
            MoveTo(0, rows - 1),
            SetBackgroundColor(self.scheme.status_bar_bg.to_crossterm()),
            SetForegroundColor(self.scheme.status_bar_fg.to_crossterm()),
            Clear(ClearType::CurrentLine)
        )?;

        let left = match (&overlay.rename, active) {
            (Some(rename), _) => format!(" rename: {}_", rename),
            (None, Some((session, screen))) => {
                let scroll = if screen.is_scrolled() { " [SCROLL]" } else { "" };
                format!(
                    " [{}] {}{}",
                    manager.iter().filter(|s| s.is_open()).count(),
                    session.working_dir,
                    scroll
                )
            }
            (None, None) => " [0]".to_string(),
        };
        queue!(stdout, Print(fit_width(&left, cols as usize)))?;

        if overlay.prefix_mode {
            let badge = " PREFIX ";
            let col = (cols as usize).saturating_sub(badge.width()) as u16;
            queue!(
                stdout,
                MoveTo(col, rows - 1),
                SetBackgroundColor(self.scheme.status_prefix_bg.to_crossterm()),
                SetForegroundColor(self.scheme.status_prefix_fg.to_crossterm()),
                Print(badge)
            )?;
        }
        queue!(stdout, ResetColor)?;
        Ok(())
    }

    fn place_cursor(
        &self,
        stdout: &mut io::Stdout,
        session: &Session,
        screen: &Screen,
        cols: u16,
        content_height: u16,
    ) -> io::Result<()> {
        // Hide the cursor while browsing scrollback
        if screen.is_scrolled() {
            return Ok(());
        }
        let before_cursor: String = session
            .editor
            .buffer()
            .chars()
            .take(session.editor.cursor())
            .collect();
        let col = (prompt(session).width() + before_cursor.width())
            .min((cols as usize).saturating_sub(1));
        queue!(stdout, MoveTo(col as u16, content_height), Show)?;
        Ok(())
    }

    fn line_color(&self, kind: LineKind) -> TermColor {
        match kind {
            LineKind::Output(OutputKind::Error) => self.scheme.output_error.to_crossterm(),
            LineKind::Output(OutputKind::Warning) => self.scheme.output_warning.to_crossterm(),
            LineKind::Output(OutputKind::Success) => self.scheme.output_success.to_crossterm(),
            LineKind::Output(OutputKind::Pointer) => self.scheme.output_pointer.to_crossterm(),
            LineKind::Output(OutputKind::Plain) => self.scheme.output_plain.to_crossterm(),
            LineKind::Echo => self.scheme.echo_fg.to_crossterm(),
            LineKind::Notice => self.scheme.notice_fg.to_crossterm(),
        }
    }
}

/// Prompt text for a session
pub fn prompt(session: &Session) -> String {
    format!("{} $ ", session.working_dir)
}

/// Truncate a line to the given display width
fn fit_width(text: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_width_truncates_by_display_width() {
        assert_eq!(fit_width("hello", 10), "hello");
        assert_eq!(fit_width("hello", 3), "hel");
        // Wide characters count double
        assert_eq!(fit_width("日本語", 4), "日本");
    }
}
