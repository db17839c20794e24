//! Core multiplexer components.
//!
//! This module contains the display-agnostic session logic:
//!
//! - **session**: `Session` state and the `SessionManager` registry
//! - **editor**: line-editing state machine (`apply(state, event) -> effects`)
//! - **input**: raw input events and decoding into editor events
//! - **history**: bounded per-session command history
//! - **completion**: prefix completion against the static vocabulary
//! - **dispatch**: builtin handling and remote command routing
//! - **output**: output line classification
//! - **executor**: the remote execution boundary
//! - **timers**: explicit scheduler for all delayed effects
//!
//! # Architecture
//!
//! ```text
//! SessionManager
//! └── Session (per tab)
//!     ├── EditorState (buffer + cursor + history cursor)
//!     └── HistoryStore
//! CommandDispatcher ── Executor (worker thread + channel)
//! Scheduler (disposal grace, resize debounce, output pacing)
//! ```

pub mod completion;
pub mod dispatch;
pub mod editor;
pub mod executor;
pub mod history;
pub mod input;
pub mod output;
pub mod session;
pub mod timers;
