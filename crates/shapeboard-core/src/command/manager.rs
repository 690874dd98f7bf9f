//! Bounded linear undo/redo history.

use super::Command;
use crate::registry::Snapshot;
use std::fmt;

/// Default number of commands kept for undo.
pub const MAXIMUM_HISTORY_SIZE: usize = 100;

/// Handle returned by [`CommandManager::subscribe`].
pub type SubscriptionId = u64;

/// What a history listener is told after every change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryStatus {
    pub can_undo: bool,
    pub can_redo: bool,
    pub len: usize,
    /// Index of the command that produced the current state, if any.
    pub current_index: Option<usize>,
}

type Listener = Box<dyn FnMut(HistoryStatus)>;

/// Executed commands plus a cursor.
///
/// `history[..applied]` are in effect; anything after is redoable until the
/// next `execute` discards it.
pub struct CommandManager {
    history: Vec<Box<dyn Command>>,
    applied: usize,
    max_size: usize,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: SubscriptionId,
}

impl CommandManager {
    pub fn new() -> Self {
        Self::with_max_size(MAXIMUM_HISTORY_SIZE)
    }

    /// Create with a custom history bound (at least 1).
    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            history: Vec::new(),
            applied: 0,
            max_size: max_size.max(1),
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Run a command and record it. Returns the new state.
    pub fn execute(&mut self, mut command: Box<dyn Command>, state: &Snapshot) -> Snapshot {
        self.history.truncate(self.applied);
        let next = command.execute(state);
        log::debug!("Execute: {}", command.name());
        self.history.push(command);
        self.applied += 1;

        if self.history.len() > self.max_size {
            let evicted = self.history.remove(0);
            self.applied -= 1;
            log::debug!("History full, dropped: {}", evicted.name());
        }

        self.notify();
        next
    }

    /// Undo the current command. `None` at the start of history.
    pub fn undo(&mut self, state: &Snapshot) -> Option<Snapshot> {
        if !self.can_undo() {
            return None;
        }
        self.applied -= 1;
        let command = &mut self.history[self.applied];
        let previous = command.undo(state);
        log::debug!("Undo: {}", command.name());
        self.notify();
        Some(previous)
    }

    /// Redo the next command. `None` at the end of history.
    pub fn redo(&mut self, state: &Snapshot) -> Option<Snapshot> {
        if !self.can_redo() {
            return None;
        }
        let command = &mut self.history[self.applied];
        let next = command.execute(state);
        log::debug!("Redo: {}", command.name());
        self.applied += 1;
        self.notify();
        Some(next)
    }

    /// Forget all history.
    pub fn clear(&mut self) {
        self.history.clear();
        self.applied = 0;
        self.notify();
    }

    pub fn can_undo(&self) -> bool {
        self.applied > 0
    }

    pub fn can_redo(&self) -> bool {
        self.applied < self.history.len()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn current_index(&self) -> Option<usize> {
        self.applied.checked_sub(1)
    }

    /// Name of the command `undo` would revert.
    pub fn undo_name(&self) -> Option<&str> {
        self.current_index().map(|i| self.history[i].name())
    }

    /// Name of the command `redo` would replay.
    pub fn redo_name(&self) -> Option<&str> {
        self.history.get(self.applied).map(|c| c.name())
    }

    pub fn status(&self) -> HistoryStatus {
        HistoryStatus {
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            len: self.len(),
            current_index: self.current_index(),
        }
    }

    /// Call `listener` synchronously after every execute, undo, redo and
    /// clear.
    pub fn subscribe(&mut self, listener: impl FnMut(HistoryStatus) + 'static) -> SubscriptionId {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `false` if the subscription was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    fn notify(&mut self) {
        let status = self.status();
        for (_, listener) in &mut self.listeners {
            listener(status);
        }
    }
}

impl Default for CommandManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CommandManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandManager")
            .field("len", &self.history.len())
            .field("current_index", &self.current_index())
            .field("max_size", &self.max_size)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
