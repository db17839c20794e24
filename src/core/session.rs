//! Session management
//!
//! A session is one independent terminal tab: its own line buffer, history,
//! and working directory. The [`SessionManager`] owns the registry of
//! sessions and their lifecycle; it is plain owned state handed to the
//! event loop, never a module-global.

use std::collections::HashMap;
use std::time::Instant;

use tracing::info;

use super::completion::CompletionEngine;
use super::editor::{EditorEvent, EditorState, Effect};
use super::executor::ExecTarget;
use super::history::HistoryStore;

/// Session identifier
pub type SessionId = u64;

/// Working directory every session starts in
pub const DEFAULT_WORKING_DIR: &str = "/workspace";

/// Session lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Open,
    /// Close requested; disposal is scheduled but has not fired yet
    Closing,
    Disposed,
}

/// One terminal session
pub struct Session {
    pub id: SessionId,
    pub title: String,
    pub working_dir: String,
    pub editor: EditorState,
    pub history: HistoryStore,
    lifecycle: Lifecycle,
    created: Instant,
}

impl Session {
    fn new(id: SessionId, title: String) -> Self {
        Self {
            id,
            title,
            working_dir: DEFAULT_WORKING_DIR.to_string(),
            editor: EditorState::new(),
            history: HistoryStore::new(),
            lifecycle: Lifecycle::Open,
            created: Instant::now(),
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_open(&self) -> bool {
        self.lifecycle == Lifecycle::Open
    }

    #[allow(dead_code)]
    pub fn created(&self) -> Instant {
        self.created
    }

    /// Execution target for remote dispatches from this session
    pub fn target(&self) -> ExecTarget {
        ExecTarget {
            session: self.id,
            working_dir: self.working_dir.clone(),
        }
    }

    /// Feed one input event to this session's line editor
    pub fn apply(&mut self, event: EditorEvent, completion: &CompletionEngine) -> Vec<Effect> {
        self.editor.apply(event, &mut self.history, completion)
    }
}

/// Owns every session and routes operations to the right one.
///
/// At most one session is active at a time; none when the registry is
/// empty. Closed sessions linger in `Closing` state until the scheduled
/// disposal fires, then leave the registry for good.
pub struct SessionManager {
    sessions: HashMap<SessionId, Session>,
    /// Creation order, for the tab bar and "most recently created" rules
    order: Vec<SessionId>,
    active: Option<SessionId>,
    next_id: SessionId,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionManager {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
            order: Vec::new(),
            active: None,
            next_id: 1,
        }
    }

    /// Create a session; it becomes active if none was.
    pub fn create_session(&mut self) -> SessionId {
        let id = self.next_id;
        self.next_id += 1;

        let title = if self.sessions.is_empty() {
            format!("{}:main", id)
        } else {
            format!("{}:shell", id)
        };
        self.sessions.insert(id, Session::new(id, title));
        self.order.push(id);

        if self.active.is_none() {
            self.active = Some(id);
        }
        info!("session {} created", id);
        id
    }

    /// Request close. Marks the session `Closing` and removes it from the
    /// selectable set; returns `true` when disposal still needs to be
    /// scheduled. Closing an already-closing or unknown session is a no-op.
    pub fn close_session(&mut self, id: SessionId) -> bool {
        let Some(session) = self.sessions.get_mut(&id) else {
            return false;
        };
        if session.lifecycle != Lifecycle::Open {
            return false;
        }
        session.lifecycle = Lifecycle::Closing;
        info!("session {} closing", id);

        if self.active == Some(id) {
            // Most recently created remaining session takes over
            self.active = self
                .sessions
                .values()
                .filter(|s| s.lifecycle == Lifecycle::Open)
                .map(|s| s.id)
                .max();
        }
        true
    }

    /// Close every open session; returns the ids whose disposal must be
    /// scheduled.
    pub fn close_all(&mut self) -> Vec<SessionId> {
        let ids: Vec<SessionId> = self.order.clone();
        ids.into_iter()
            .filter(|&id| self.close_session(id))
            .collect()
    }

    /// Final teardown after the grace delay. Idempotent: disposing a
    /// session that is already gone is a no-op. Returns `true` when the
    /// session was removed by this call, so display resources are released
    /// exactly once.
    pub fn dispose(&mut self, id: SessionId) -> bool {
        match self.sessions.get_mut(&id) {
            Some(session) => session.lifecycle = Lifecycle::Disposed,
            None => return false,
        }
        self.sessions.remove(&id);
        self.order.retain(|&other| other != id);
        if self.active == Some(id) {
            self.active = None;
        }
        info!("session {} disposed", id);
        true
    }

    /// Activate a session. Only open sessions can become active.
    pub fn set_active(&mut self, id: SessionId) -> bool {
        match self.sessions.get(&id) {
            Some(session) if session.is_open() => {
                self.active = Some(id);
                true
            }
            _ => false,
        }
    }

    /// Pure bookkeeping; no effect on buffer or history.
    pub fn rename(&mut self, id: SessionId, title: impl Into<String>) {
        if let Some(session) = self.sessions.get_mut(&id) {
            session.title = title.into();
        }
    }

    pub fn active_id(&self) -> Option<SessionId> {
        self.active
    }

    pub fn active(&self) -> Option<&Session> {
        self.active.and_then(|id| self.sessions.get(&id))
    }

    pub fn active_mut(&mut self) -> Option<&mut Session> {
        match self.active {
            Some(id) => self.sessions.get_mut(&id),
            None => None,
        }
    }

    pub fn get(&self, id: SessionId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut Session> {
        self.sessions.get_mut(&id)
    }

    /// Sessions in creation order (open and closing)
    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.order.iter().filter_map(|id| self.sessions.get(id))
    }

    /// Switch to the next open session after the active one
    pub fn activate_next(&mut self) {
        self.activate_neighbor(1);
    }

    /// Switch to the previous open session before the active one
    pub fn activate_prev(&mut self) {
        self.activate_neighbor(-1);
    }

    fn activate_neighbor(&mut self, step: isize) {
        let open: Vec<SessionId> = self
            .order
            .iter()
            .copied()
            .filter(|id| self.sessions.get(id).is_some_and(Session::is_open))
            .collect();
        if open.is_empty() {
            return;
        }
        let position = self
            .active
            .and_then(|id| open.iter().position(|&other| other == id))
            .unwrap_or(0);
        let len = open.len() as isize;
        let next = (position as isize + step).rem_euclid(len) as usize;
        self.active = Some(open[next]);
    }

    /// Activate the open session at a 1-based tab position
    pub fn activate_index(&mut self, index: usize) -> bool {
        let target = self
            .order
            .iter()
            .copied()
            .filter(|id| self.sessions.get(id).is_some_and(Session::is_open))
            .nth(index.wrapping_sub(1));
        match target {
            Some(id) => self.set_active(id),
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_session_becomes_active() {
        let mut manager = SessionManager::new();
        assert_eq!(manager.active_id(), None);
        let id = manager.create_session();
        assert_eq!(manager.active_id(), Some(id));
        assert_eq!(manager.get(id).unwrap().working_dir, DEFAULT_WORKING_DIR);
    }

    #[test]
    fn test_second_session_does_not_steal_focus() {
        let mut manager = SessionManager::new();
        let first = manager.create_session();
        let second = manager.create_session();
        assert_eq!(manager.active_id(), Some(first));
        assert!(manager.set_active(second));
        assert_eq!(manager.active_id(), Some(second));
    }

    #[test]
    fn test_close_reassigns_to_most_recently_created() {
        let mut manager = SessionManager::new();
        let a = manager.create_session();
        let b = manager.create_session();
        let c = manager.create_session();
        manager.set_active(a);

        assert!(manager.close_session(a));
        // b and c remain; c is the most recently created
        assert_eq!(manager.active_id(), Some(c));
        assert_eq!(manager.get(a).unwrap().lifecycle(), Lifecycle::Closing);
        assert!(manager.get(b).unwrap().is_open());
    }

    #[test]
    fn test_close_last_session_leaves_no_active() {
        let mut manager = SessionManager::new();
        let id = manager.create_session();
        assert!(manager.close_session(id));
        assert_eq!(manager.active_id(), None);
    }

    #[test]
    fn test_double_close_is_noop() {
        let mut manager = SessionManager::new();
        let id = manager.create_session();
        assert!(manager.close_session(id));
        assert!(!manager.close_session(id));
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let mut manager = SessionManager::new();
        let id = manager.create_session();
        manager.close_session(id);
        assert!(manager.dispose(id));
        assert!(!manager.dispose(id));
        assert!(manager.is_empty());
    }

    #[test]
    fn test_disposed_session_cannot_be_activated() {
        let mut manager = SessionManager::new();
        let id = manager.create_session();
        manager.create_session();
        manager.close_session(id);
        manager.dispose(id);
        assert!(!manager.set_active(id));
    }

    #[test]
    fn test_closing_session_cannot_be_activated() {
        let mut manager = SessionManager::new();
        let a = manager.create_session();
        manager.create_session();
        manager.close_session(a);
        assert!(!manager.set_active(a));
    }

    #[test]
    fn test_close_all() {
        let mut manager = SessionManager::new();
        let a = manager.create_session();
        let b = manager.create_session();
        let closed = manager.close_all();
        assert_eq!(closed, vec![a, b]);
        assert_eq!(manager.active_id(), None);
        // All still registered until disposal fires
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn test_rename_is_pure_bookkeeping() {
        let mut manager = SessionManager::new();
        let id = manager.create_session();
        manager.get_mut(id).unwrap().history.push("ls");
        manager.rename(id, "build");
        let session = manager.get(id).unwrap();
        assert_eq!(session.title, "build");
        assert_eq!(session.history.len(), 1);
        assert_eq!(session.editor.buffer(), "");
    }

    #[test]
    fn test_next_prev_skip_closing_sessions() {
        let mut manager = SessionManager::new();
        let a = manager.create_session();
        let b = manager.create_session();
        let c = manager.create_session();
        manager.set_active(a);
        manager.close_session(b);

        manager.activate_next();
        assert_eq!(manager.active_id(), Some(c));
        manager.activate_next();
        assert_eq!(manager.active_id(), Some(a));
        manager.activate_prev();
        assert_eq!(manager.active_id(), Some(c));
    }

    #[test]
    fn test_activate_index_is_one_based() {
        let mut manager = SessionManager::new();
        let a = manager.create_session();
        let b = manager.create_session();
        assert!(manager.activate_index(2));
        assert_eq!(manager.active_id(), Some(b));
        assert!(manager.activate_index(1));
        assert_eq!(manager.active_id(), Some(a));
        assert!(!manager.activate_index(3));
        assert!(!manager.activate_index(0));
    }
}
