//! Command dispatch
//!
//! On line submission the dispatcher decides between local builtins and
//! the remote executor, runs builtins synchronously, and hands remote
//! commands to a worker thread. Results come back to the event loop over
//! a channel as [`DispatchOutcome`]s; the dispatcher then classifies the
//! output lines and either writes them immediately or schedules them for
//! paced streaming.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::config::HELP_TEXT;

use super::executor::{DispatchOutcome, ExecTarget, Executor};
use super::output::{classify, Console, OutputKind};
use super::session::{Session, DEFAULT_WORKING_DIR};
use super::timers::{Scheduler, TimerAction};

/// How a submitted command is handled
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Classified {
    Builtin(Builtin),
    Remote,
}

/// Commands handled locally, never forwarded to the executor
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Builtin {
    Help,
    Clear,
    History,
    Cd(Option<String>),
}

/// Dispatch tuning knobs (all overridable through the config file)
#[derive(Clone, Debug)]
pub struct DispatchConfig {
    /// Successful dispatches slower than this get a timing trailer
    pub slow_success: Duration,
    /// Failed dispatches slower than this get a timing trailer
    pub slow_failure: Duration,
    /// Inter-line delay for streamed output
    pub stream_delay: Duration,
    /// Command families whose output streams line by line
    pub paced_families: Vec<String>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            slow_success: Duration::from_millis(1000),
            slow_failure: Duration::from_millis(500),
            stream_delay: Duration::from_millis(10),
            paced_families: vec!["npm".to_string(), "git".to_string(), "yarn".to_string()],
        }
    }
}

/// Classifies and routes submitted commands
pub struct CommandDispatcher {
    executor: Arc<dyn Executor>,
    tx: Sender<DispatchOutcome>,
    config: DispatchConfig,
}

impl CommandDispatcher {
    /// Create a dispatcher; the returned receiver delivers completed
    /// remote dispatches to the event loop.
    pub fn new(
        executor: Arc<dyn Executor>,
        config: DispatchConfig,
    ) -> (Self, Receiver<DispatchOutcome>) {
        let (tx, rx) = mpsc::channel();
        (
            Self {
                executor,
                tx,
                config,
            },
            rx,
        )
    }

    /// Decide whether a trimmed command is a builtin or goes remote
    pub fn classify(command: &str) -> Classified {
        let mut parts = command.splitn(2, char::is_whitespace);
        let head = parts.next().unwrap_or("");
        let rest = parts.next().map(str::trim).filter(|rest| !rest.is_empty());

        match head {
            "help" => Classified::Builtin(Builtin::Help),
            "clear" => Classified::Builtin(Builtin::Clear),
            "history" => Classified::Builtin(Builtin::History),
            "cd" => Classified::Builtin(Builtin::Cd(rest.map(str::to_string))),
            _ => Classified::Remote,
        }
    }

    /// Execute a builtin against the owning session
    pub fn run_builtin(&self, builtin: Builtin, session: &mut Session, console: &mut dyn Console) {
        match builtin {
            Builtin::Help => {
                for line in HELP_TEXT {
                    console.write_line(line, OutputKind::Plain);
                }
            }
            Builtin::Clear => {
                // Prompt only afterwards; the banner belongs to Ctrl+L
                console.clear();
            }
            Builtin::History => {
                for (index, entry) in session.history.iter().enumerate() {
                    console.write_line(&format!("{:3}  {}", index + 1, entry), OutputKind::Plain);
                }
            }
            Builtin::Cd(path) => {
                // No existence check: the working directory is a label the
                // executor interprets, not a local filesystem path.
                session.working_dir = match path {
                    Some(path) if !path.trim().is_empty() => path.trim().to_string(),
                    _ => DEFAULT_WORKING_DIR.to_string(),
                };
                debug!(
                    "session {} working dir -> {}",
                    session.id, session.working_dir
                );
            }
        }
    }

    /// Forward a command to the executor on a worker thread. Editing and
    /// other sessions continue while the call is in flight; there is no
    /// cancellation path once submitted.
    pub fn submit(&self, target: ExecTarget, command: String) {
        let executor = Arc::clone(&self.executor);
        let tx = self.tx.clone();
        debug!("session {} dispatching: {}", target.session, command);

        thread::spawn(move || {
            let started = Instant::now();
            let result = executor.execute(&target, &command);
            let outcome = DispatchOutcome {
                session: target.session,
                command,
                result,
                elapsed: started.elapsed(),
            };
            // The event loop may have shut down already; nothing to do then
            if tx.send(outcome).is_err() {
                warn!("dispatch result dropped: event loop gone");
            }
        });
    }

    /// Handle a completed dispatch: classify and write (or schedule) the
    /// output lines, append the timing trailer for slow commands, and turn
    /// failures into exactly one red line. The session always survives.
    pub fn finish(
        &self,
        outcome: DispatchOutcome,
        console: &mut dyn Console,
        scheduler: &mut Scheduler,
        now: Instant,
    ) {
        let millis = outcome.elapsed.as_millis();
        match outcome.result {
            Ok(output) => {
                let lines: Vec<&str> = output.lines().map(|line| line.trim_end_matches('\r')).collect();
                let trailer = (outcome.elapsed > self.config.slow_success)
                    .then(|| format!("[Execution time: {}ms]", millis));

                if self.is_paced(&outcome.command) && !lines.is_empty() {
                    let delay = self.config.stream_delay;
                    for (index, line) in lines.iter().enumerate() {
                        scheduler.schedule(
                            now,
                            delay * (index as u32 + 1),
                            TimerAction::EmitLine {
                                session: outcome.session,
                                text: line.to_string(),
                                kind: classify(line),
                            },
                        );
                    }
                    if let Some(trailer) = trailer {
                        scheduler.schedule(
                            now,
                            delay * (lines.len() as u32 + 1),
                            TimerAction::EmitLine {
                                session: outcome.session,
                                text: trailer,
                                kind: OutputKind::Plain,
                            },
                        );
                    }
                } else {
                    for line in &lines {
                        console.write_line(line, classify(line));
                    }
                    if let Some(trailer) = trailer {
                        console.write_line(&trailer, OutputKind::Plain);
                    }
                }
            }
            Err(error) => {
                console.write_line(&format!("Error: {}", error), OutputKind::Error);
                if outcome.elapsed > self.config.slow_failure {
                    console.write_line(&format!("[Execution time: {}ms]", millis), OutputKind::Plain);
                }
            }
        }
    }

    /// Streaming applies when the command text contains one of the paced
    /// family names as a substring.
    fn is_paced(&self, command: &str) -> bool {
        self.config
            .paced_families
            .iter()
            .any(|family| command.contains(family.as_str()))
    }
}
