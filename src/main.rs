//! remux - a terminal session multiplexer with remote command dispatch
//!
//! remux runs multiple independent shell sessions as tabs. Each session has
//! its own line editor, command history, and working directory; non-builtin
//! commands are forwarded to a pluggable executor and the output streams
//! back classified and colored.
//!
//! # Features
//!
//! - **Multiple Sessions**: Independent tabs with tmux-style keybindings
//! - **Line Editing**: Ctrl+C/L/W/K shortcuts, history walking, tab completion
//! - **Builtins**: `help`, `clear`, `history`, `cd` handled locally
//! - **Remote Dispatch**: everything else runs through the executor without
//!   blocking input
//! - **Classified Output**: errors, warnings, successes, and pointers colored
//!
//! # Quick Start
//!
//! ```text
//! remux                  # Start with the default shell executor
//! remux -s /bin/bash     # Executor runs commands through bash
//! ```
//!
//! # Keybindings (Ctrl+B prefix)
//!
//! | Key | Action |
//! |-----|--------|
//! | c | New session |
//! | x | Close session |
//! | n/p | Next/Previous session |
//! | 0-9 | Select session by number |
//! | , | Rename session |
//! | ] | Paste from clipboard |
//! | y | Copy line to clipboard |
//! | d | Close all and quit |

mod config;
mod core;
mod ui;

use std::collections::HashMap;
use std::env;
use std::io::Write as _;
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::config::{Config as RemuxConfig, PrefixKey, BANNER};
use crate::core::completion::CompletionEngine;
use crate::core::dispatch::{Classified, CommandDispatcher};
use crate::core::editor::{EditorEvent, Effect};
use crate::core::executor::{DispatchOutcome, Executor, ProcessExecutor};
use crate::core::input::decode;
use crate::core::output::{Console, OutputKind};
use crate::core::session::{SessionId, SessionManager};
use crate::core::timers::{Scheduler, TimerAction};
use crate::ui::{prompt, KeyMapper, Renderer, Screen, UiOverlay};

/// Command line options
struct CliArgs {
    /// Shell for the local process executor
    shell: Option<String>,
    /// Working directory label for the first session
    workdir: Option<String>,
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            shell: None,
            workdir: None,
        }
    }
}

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_version() {
    eprintln!("remux {}", VERSION);
}

fn print_help() {
    eprintln!("remux {} - a terminal session multiplexer with remote command dispatch", VERSION);
    eprintln!();
    eprintln!("Usage: remux [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -s, --shell <CMD>     Shell used to execute remote commands");
    eprintln!("  -C, --workdir <DIR>   Working directory label for the first session");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Session keybindings (Ctrl+B prefix):");
    eprintln!("  Ctrl+B, c             New session");
    eprintln!("  Ctrl+B, x             Close session");
    eprintln!("  Ctrl+B, n             Next session");
    eprintln!("  Ctrl+B, p             Previous session");
    eprintln!("  Ctrl+B, 0-9           Select session by number");
    eprintln!("  Ctrl+B, ,             Rename session");
    eprintln!("  Ctrl+B, ]             Paste from clipboard");
    eprintln!("  Ctrl+B, y             Copy current line to clipboard");
    eprintln!("  Ctrl+B, d             Close all sessions and quit");
    eprintln!();
    eprintln!("Line editing:");
    eprintln!("  Ctrl+C                Discard the current line");
    eprintln!("  Ctrl+L                Clear screen, reprint banner");
    eprintln!("  Ctrl+W                Delete word before cursor");
    eprintln!("  Ctrl+K                Clear the line");
    eprintln!("  Up/Down               Walk command history");
    eprintln!("  Tab                   Complete against known commands");
    eprintln!("  Shift+PageUp/Down     Scroll the session output");
    eprintln!();
    eprintln!("Builtins: help, clear, history, cd <path>");
    eprintln!();
    eprintln!("Configuration: ~/.remux/config.toml");
    eprintln!(
        "Color schemes: {}",
        crate::config::ColorScheme::list().join(", ")
    );
}

fn parse_args() -> Result<CliArgs, String> {
    let args: Vec<String> = env::args().collect();
    let mut cli = CliArgs::default();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            "-s" | "--shell" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing shell argument".to_string());
                }
                cli.shell = Some(args[i].clone());
            }
            "-C" | "--workdir" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing workdir argument".to_string());
                }
                cli.workdir = Some(args[i].clone());
            }
            arg => {
                return Err(format!("Unknown argument: {}. Use -h for help.", arg));
            }
        }
        i += 1;
    }

    Ok(cli)
}

/// The event loop driver: owns every session, its screen, the dispatcher,
/// and the timer queue.
struct App {
    manager: SessionManager,
    screens: HashMap<SessionId, Screen>,
    completion: CompletionEngine,
    dispatcher: CommandDispatcher,
    outcomes: Receiver<DispatchOutcome>,
    scheduler: Scheduler,
    overlay: UiOverlay,
    disposal_grace: Duration,
    resize_debounce: Duration,
    scrollback_limit: usize,
    prefix_key: PrefixKey,
    dirty: bool,
    quit: bool,
}

impl App {
    fn new(config: &RemuxConfig, executor: Arc<dyn Executor>, workdir: Option<String>) -> Self {
        let (dispatcher, outcomes) = CommandDispatcher::new(executor, config.dispatch_config());
        let prefix_key = PrefixKey::parse(&config.prefix_key).unwrap_or(PrefixKey { char: 'b' });

        let mut app = Self {
            manager: SessionManager::new(),
            screens: HashMap::new(),
            completion: CompletionEngine::new(config.vocabulary()),
            dispatcher,
            outcomes,
            scheduler: Scheduler::new(),
            overlay: UiOverlay::default(),
            disposal_grace: config.disposal_grace(),
            resize_debounce: config.resize_debounce(),
            scrollback_limit: config.session.scrollback_limit,
            prefix_key,
            dirty: true,
            quit: false,
        };

        let first = app.create_session();
        if let (Some(dir), Some(session)) = (workdir, app.manager.get_mut(first)) {
            session.working_dir = dir;
        }
        app
    }

    /// Create a session with its screen and make it active
    fn create_session(&mut self) -> SessionId {
        let id = self.manager.create_session();
        let mut screen = Screen::new(self.scrollback_limit);
        for line in BANNER {
            screen.push_notice(*line);
        }
        self.screens.insert(id, screen);
        self.manager.set_active(id);
        self.dirty = true;
        id
    }

    /// Close the active session and schedule its disposal
    fn close_active(&mut self) {
        let Some(id) = self.manager.active_id() else {
            return;
        };
        self.close_session(id);
    }

    fn close_session(&mut self, id: SessionId) {
        if self.manager.close_session(id) {
            if let Some(screen) = self.screens.get_mut(&id) {
                screen.push_notice("Session closed.");
            }
            self.scheduler.schedule(
                Instant::now(),
                self.disposal_grace,
                TimerAction::DisposeSession(id),
            );
            self.dirty = true;
        }
    }

    /// Close every session; the loop exits once the disposals have fired
    fn close_all(&mut self) {
        for id in self.manager.close_all() {
            if let Some(screen) = self.screens.get_mut(&id) {
                screen.push_notice("Session closed.");
            }
            self.scheduler.schedule(
                Instant::now(),
                self.disposal_grace,
                TimerAction::DisposeSession(id),
            );
        }
        self.dirty = true;
    }

    /// Drain completed remote dispatches from the worker channel
    fn drain_outcomes(&mut self) {
        loop {
            match self.outcomes.try_recv() {
                Ok(outcome) => self.finish_outcome(outcome),
                Err(_) => break,
            }
        }
    }

    fn finish_outcome(&mut self, outcome: DispatchOutcome) {
        let id = outcome.session;
        if let Some(session) = self.manager.get_mut(id) {
            session.editor.finish_dispatch();
        }
        match self.screens.get_mut(&id) {
            Some(screen) => {
                self.dispatcher
                    .finish(outcome, screen, &mut self.scheduler, Instant::now());
            }
            // Session disposed while the command was in flight
            None => debug!("dropping dispatch result for session {}", id),
        }
        self.dirty = true;
    }

    /// Fire due timers
    fn drain_timers(&mut self) {
        for action in self.scheduler.take_due(Instant::now()) {
            self.run_timer(action);
        }
    }

    fn run_timer(&mut self, action: TimerAction) {
        match action {
            TimerAction::DisposeSession(id) => {
                if self.manager.dispose(id) {
                    if let Some(mut screen) = self.screens.remove(&id) {
                        screen.release();
                    }
                }
                if self.manager.is_empty() {
                    self.quit = true;
                }
            }
            TimerAction::ApplyResize { cols, rows } => {
                info!("resize applied: {}x{}", cols, rows);
            }
            TimerAction::EmitLine {
                session,
                text,
                kind,
            } => {
                if let Some(screen) = self.screens.get_mut(&session) {
                    screen.write_line(&text, kind);
                }
            }
        }
        self.dirty = true;
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        // Rename mode captures all keys
        if self.overlay.rename.is_some() {
            self.handle_rename_key(key);
            return;
        }

        // Prefix mode: one session command, then disarm
        if self.overlay.prefix_mode {
            self.handle_prefix_key(key);
            return;
        }

        // Arm the prefix
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && key.code == KeyCode::Char(self.prefix_key.char)
        {
            self.overlay.prefix_mode = true;
            self.dirty = true;
            return;
        }

        // Scrollback keys
        if key.modifiers.contains(KeyModifiers::SHIFT) {
            match key.code {
                KeyCode::PageUp => {
                    self.scroll_active(10, true);
                    return;
                }
                KeyCode::PageDown => {
                    self.scroll_active(10, false);
                    return;
                }
                _ => {}
            }
        }

        // Everything else feeds the line editor
        let Some(raw) = KeyMapper::raw_event(&key) else {
            return;
        };
        let Some(event) = decode(&raw) else {
            return;
        };
        self.apply_editor(event);
    }

    fn handle_rename_key(&mut self, key: KeyEvent) {
        let Some(rename) = self.overlay.rename.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => {
                self.overlay.rename = None;
            }
            KeyCode::Enter => {
                let title = rename.clone();
                if let Some(id) = self.manager.active_id() {
                    if !title.is_empty() {
                        self.manager.rename(id, title);
                    }
                }
                self.overlay.rename = None;
            }
            KeyCode::Backspace => {
                rename.pop();
            }
            KeyCode::Char(ch) => {
                if rename.len() < 30 {
                    rename.push(ch);
                }
            }
            _ => {}
        }
        self.dirty = true;
    }

    fn handle_prefix_key(&mut self, key: KeyEvent) {
        self.overlay.prefix_mode = false;
        self.dirty = true;
        match key.code {
            KeyCode::Esc => {}
            // New session
            KeyCode::Char('c') => {
                self.create_session();
            }
            // Close session
            KeyCode::Char('x') => {
                self.close_active();
            }
            // Next / previous session
            KeyCode::Char('n') => {
                self.manager.activate_next();
            }
            KeyCode::Char('p') => {
                self.manager.activate_prev();
            }
            // Select session by number
            KeyCode::Char(ch) if ch.is_ascii_digit() => {
                let index = ch.to_digit(10).unwrap_or(0) as usize;
                self.manager.activate_index(index);
            }
            // Rename session
            KeyCode::Char(',') => {
                if let Some(session) = self.manager.active() {
                    self.overlay.rename = Some(session.title.clone());
                }
            }
            // Paste from clipboard
            KeyCode::Char(']') => {
                self.paste_from_clipboard();
            }
            // Copy current line to clipboard
            KeyCode::Char('y') => {
                self.copy_line_to_clipboard();
            }
            // Close all and quit
            KeyCode::Char('d') => {
                self.close_all();
                self.quit = true;
            }
            _ => {}
        }
    }

    fn scroll_active(&mut self, amount: usize, up: bool) {
        let Some(id) = self.manager.active_id() else {
            return;
        };
        if let Some(screen) = self.screens.get_mut(&id) {
            if up {
                screen.scroll_up(amount);
            } else {
                screen.scroll_down(amount);
            }
            self.dirty = true;
        }
    }

    /// Feed one editor event to the active session and perform the effects
    fn apply_editor(&mut self, event: EditorEvent) {
        let Some(id) = self.manager.active_id() else {
            return;
        };
        // Any edit key snaps back to the live view
        if let Some(screen) = self.screens.get_mut(&id) {
            screen.scroll_to_bottom();
        }
        let effects = {
            let Some(session) = self.manager.get_mut(id) else {
                return;
            };
            session.apply(event, &self.completion)
        };
        self.handle_effects(id, effects);
    }

    fn handle_effects(&mut self, id: SessionId, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Redraw => {
                    self.dirty = true;
                }
                Effect::EchoPrompt => {
                    let text = self.prompt_text(id);
                    if let Some(screen) = self.screens.get_mut(&id) {
                        screen.push_echo(text);
                    }
                    self.dirty = true;
                }
                Effect::Interrupted { aborted } => {
                    let text = format!("{}{}^C", self.prompt_text(id), aborted);
                    if let Some(screen) = self.screens.get_mut(&id) {
                        screen.push_echo(text);
                    }
                    self.dirty = true;
                }
                Effect::ClearDisplay { banner } => {
                    if let Some(screen) = self.screens.get_mut(&id) {
                        screen.clear();
                        if banner {
                            for line in BANNER {
                                screen.push_notice(*line);
                            }
                        }
                    }
                    self.dirty = true;
                }
                Effect::ListCandidates(candidates) => {
                    let echo = format!(
                        "{}{}",
                        self.prompt_text(id),
                        self.manager
                            .get(id)
                            .map(|session| session.editor.buffer().to_string())
                            .unwrap_or_default()
                    );
                    if let Some(screen) = self.screens.get_mut(&id) {
                        screen.push_echo(echo);
                        for candidate in &candidates {
                            screen.write_line(candidate, OutputKind::Plain);
                        }
                    }
                    self.dirty = true;
                }
                Effect::Dispatch(command) => {
                    self.dispatch(id, command);
                    self.dirty = true;
                }
            }
        }
    }

    /// Route a submitted command to a builtin or the executor
    fn dispatch(&mut self, id: SessionId, command: String) {
        let echo = format!("{}{}", self.prompt_text(id), command);
        if let Some(screen) = self.screens.get_mut(&id) {
            screen.push_echo(echo);
        }

        match CommandDispatcher::classify(&command) {
            Classified::Builtin(builtin) => {
                let Some(session) = self.manager.get_mut(id) else {
                    return;
                };
                let Some(screen) = self.screens.get_mut(&id) else {
                    return;
                };
                self.dispatcher.run_builtin(builtin, session, screen);
                session.editor.finish_dispatch();
            }
            Classified::Remote => {
                let Some(session) = self.manager.get(id) else {
                    return;
                };
                self.dispatcher.submit(session.target(), command);
            }
        }
    }

    fn prompt_text(&self, id: SessionId) -> String {
        self.manager.get(id).map(prompt).unwrap_or_default()
    }

    fn paste_from_clipboard(&mut self) {
        if let Ok(mut clipboard) = arboard::Clipboard::new() {
            if let Ok(text) = clipboard.get_text() {
                self.apply_editor(EditorEvent::Paste(text));
            }
        }
    }

    fn copy_line_to_clipboard(&self) {
        if let Some(session) = self.manager.active() {
            if let Ok(mut clipboard) = arboard::Clipboard::new() {
                let _ = clipboard.set_text(session.editor.buffer().to_string());
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = match parse_args() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    // Initialize logging to file
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(std::path::PathBuf::from);

    let log_path = home
        .map(|h| h.join(".remux").join("remux.log"))
        .unwrap_or_else(|| std::path::PathBuf::from("remux.log"));

    // Create log directory if needed
    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    // Open log file (append mode)
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .ok();

    if let Some(file) = log_file {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::INFO)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    info!("remux {} starting...", VERSION);

    run_terminal(cli)
}

/// Run the multiplexer
fn run_terminal(cli: CliArgs) -> anyhow::Result<()> {
    use crossterm::terminal;

    // Load config file; command line overrides it
    let remux_config = RemuxConfig::load();
    let shell = cli.shell.clone().or_else(|| remux_config.shell.clone());

    let executor: Arc<dyn Executor> = match shell {
        Some(shell) => {
            info!("executor shell: {}", shell);
            Arc::new(ProcessExecutor::new(shell))
        }
        None => Arc::new(ProcessExecutor::default()),
    };

    let mut app = App::new(&remux_config, executor, cli.workdir);
    let mut renderer = Renderer::with_color_scheme(remux_config.get_color_scheme());
    renderer.init()?;

    let (cols, rows) = Renderer::size()?;
    info!("terminal size: {}x{}", cols, rows);

    // Run main loop with guaranteed cleanup
    let result = run_main_loop(&mut app, &mut renderer);

    let _ = renderer.cleanup();
    let _ = terminal::disable_raw_mode();

    // Reset console using escape sequences directly
    print!("\x1b[?1049l"); // Leave alternate screen
    print!("\x1b[?25h"); // Show cursor
    print!("\x1b[0m"); // Reset attributes
    let _ = std::io::stdout().flush();

    result
}

/// Main event loop
fn run_main_loop(app: &mut App, renderer: &mut Renderer) -> anyhow::Result<()> {
    let poll_timeout = Duration::from_millis(10);

    loop {
        // Completed remote dispatches
        app.drain_outcomes();

        // Due timers (disposal, debounced resize, paced output)
        app.drain_timers();

        if app.quit {
            info!("all sessions ended");
            break;
        }

        if app.dirty {
            renderer.render(&app.manager, &app.screens, &app.overlay)?;
            app.dirty = false;
        }

        // Poll for events
        if event::poll(poll_timeout)? {
            match event::read()? {
                Event::Key(key) => app.handle_key(key),
                Event::Resize(cols, rows) => {
                    app.scheduler.schedule_resize(
                        Instant::now(),
                        app.resize_debounce,
                        cols,
                        rows,
                    );
                }
                Event::Paste(text) => app.apply_editor(EditorEvent::Paste(text)),
                _ => {}
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HELP_TEXT;
    use crate::core::executor::testing::CannedExecutor;
    use crate::core::session::DEFAULT_WORKING_DIR;
    use crate::ui::screen::LineKind;

    fn app_with(executor: Arc<dyn Executor>) -> App {
        App::new(&RemuxConfig::default(), executor, None)
    }

    fn type_line(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.apply_editor(EditorEvent::Insert(ch));
        }
        app.apply_editor(EditorEvent::Submit);
    }

    fn active_screen(app: &App) -> &Screen {
        let id = app.manager.active_id().unwrap();
        app.screens.get(&id).unwrap()
    }

    fn screen_texts(app: &App) -> Vec<String> {
        active_screen(app)
            .visible(1000)
            .iter()
            .map(|line| line.text.clone())
            .collect()
    }

    #[test]
    fn test_help_end_to_end() {
        let mut app = app_with(Arc::new(CannedExecutor::default()));
        type_line(&mut app, "help");

        let texts = screen_texts(&app);
        assert!(texts.iter().any(|line| line == HELP_TEXT[0]));

        let session = app.manager.active().unwrap();
        assert_eq!(session.editor.buffer(), "");
        assert_eq!(session.working_dir, DEFAULT_WORKING_DIR);
        // No remote dispatch was made
        assert!(app.outcomes.try_recv().is_err());
    }

    #[test]
    fn test_cd_end_to_end() {
        let mut app = app_with(Arc::new(CannedExecutor::default()));
        type_line(&mut app, "cd /tmp");

        assert_eq!(app.manager.active().unwrap().working_dir, "/tmp");
        assert!(app.outcomes.try_recv().is_err());

        // Subsequent prompts show the new directory
        let id = app.manager.active_id().unwrap();
        assert_eq!(app.prompt_text(id), "/tmp $ ");
    }

    #[test]
    fn test_remote_failure_end_to_end() {
        let executor = CannedExecutor::default();
        executor.fail("deploy", "VM is not running");
        let mut app = app_with(Arc::new(executor));

        type_line(&mut app, "deploy");
        let outcome = app
            .outcomes
            .recv_timeout(Duration::from_secs(5))
            .expect("dispatch result");
        app.finish_outcome(outcome);

        let screen = active_screen(&app);
        let red: Vec<_> = screen
            .visible(1000)
            .into_iter()
            .filter(|line| line.kind == LineKind::Output(OutputKind::Error))
            .map(|line| line.text.clone())
            .collect();
        assert_eq!(red, vec!["Error: VM is not running".to_string()]);

        // Session stays open and accepts further input
        let session = app.manager.active().unwrap();
        assert!(session.is_open());
        app.apply_editor(EditorEvent::Insert('l'));
        assert_eq!(app.manager.active().unwrap().editor.buffer(), "l");
    }

    #[test]
    fn test_remote_success_end_to_end() {
        let executor = CannedExecutor::responding("ls", "README.md\nBuild failed");
        let mut app = app_with(Arc::new(executor));

        type_line(&mut app, "ls");
        let outcome = app
            .outcomes
            .recv_timeout(Duration::from_secs(5))
            .expect("dispatch result");
        app.finish_outcome(outcome);

        let texts = screen_texts(&app);
        assert!(texts.iter().any(|line| line == "README.md"));
        let screen = active_screen(&app);
        assert!(screen
            .visible(1000)
            .iter()
            .any(|line| line.text == "Build failed"
                && line.kind == LineKind::Output(OutputKind::Error)));
    }

    #[test]
    fn test_close_and_dispose_releases_screen_once() {
        let mut app = app_with(Arc::new(CannedExecutor::default()));
        let first = app.manager.active_id().unwrap();
        let second = app.create_session();

        app.manager.set_active(first);
        app.close_active();
        // Close again before the grace delay elapsed: no second timer
        app.close_session(first);

        // Fire the disposal
        for action in app.scheduler.take_due(Instant::now() + Duration::from_secs(2)) {
            app.run_timer(action);
        }
        assert!(app.manager.get(first).is_none());
        assert!(!app.screens.contains_key(&first));
        assert!(!app.quit);
        // Focus moved to the most recently created remaining session
        assert_eq!(app.manager.active_id(), Some(second));
    }

    #[test]
    fn test_closing_last_session_quits_after_disposal() {
        let mut app = app_with(Arc::new(CannedExecutor::default()));
        app.close_active();
        for action in app.scheduler.take_due(Instant::now() + Duration::from_secs(2)) {
            app.run_timer(action);
        }
        assert!(app.quit);
    }

    #[test]
    fn test_paced_output_arrives_through_timers() {
        let executor = CannedExecutor::responding("npm install", "added 1 package\ndone");
        let mut app = app_with(Arc::new(executor));

        type_line(&mut app, "npm install");
        let outcome = app
            .outcomes
            .recv_timeout(Duration::from_secs(5))
            .expect("dispatch result");
        app.finish_outcome(outcome);

        // Lines are queued, not yet written
        let before = screen_texts(&app);
        assert!(!before.iter().any(|line| line == "added 1 package"));

        for action in app.scheduler.take_due(Instant::now() + Duration::from_secs(1)) {
            app.run_timer(action);
        }
        let after = screen_texts(&app);
        assert!(after.iter().any(|line| line == "added 1 package"));
        assert!(after.iter().any(|line| line == "done"));
    }

    #[test]
    fn test_interrupt_echoes_and_keeps_session() {
        let mut app = app_with(Arc::new(CannedExecutor::default()));
        for ch in "half".chars() {
            app.apply_editor(EditorEvent::Insert(ch));
        }
        app.apply_editor(EditorEvent::Interrupt);

        let texts = screen_texts(&app);
        assert!(texts
            .iter()
            .any(|line| line == &format!("{} $ half^C", DEFAULT_WORKING_DIR)));
        assert_eq!(app.manager.active().unwrap().editor.buffer(), "");
    }
}
