//! Undoable edits.
//!
//! A command owns everything it needs to redo or undo itself. It never touches
//! storage: `execute` and `undo` take the current state and return the next
//! one, and the caller applies it.

mod canvas;
mod manager;
mod shape;

pub use canvas::UpdateCanvasOptionCommand;
pub use manager::{CommandManager, HistoryStatus, MAXIMUM_HISTORY_SIZE, SubscriptionId};
pub use shape::{
    AddShapeCommand, CreateShapeCommand, Placement, RemoveShapeCommand, ReorderShapeCommand,
    UpdateShapeCommand,
};

use crate::registry::Snapshot;

/// An invertible, replayable edit.
pub trait Command: std::fmt::Debug {
    /// Apply the forward effect. Must give the same result when replayed
    /// after an undo.
    fn execute(&mut self, state: &Snapshot) -> Snapshot;

    /// Revert the forward effect.
    fn undo(&mut self, state: &Snapshot) -> Snapshot;

    /// Display name for menus and logs.
    fn name(&self) -> &str;
}

/// Several commands undone and redone as one step.
#[derive(Debug, Default)]
pub struct CombineCommand {
    commands: Vec<Box<dyn Command>>,
}

impl CombineCommand {
    pub fn new(commands: Vec<Box<dyn Command>>) -> Self {
        Self { commands }
    }

    pub fn push(&mut self, command: Box<dyn Command>) {
        self.commands.push(command);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Command for CombineCommand {
    fn execute(&mut self, state: &Snapshot) -> Snapshot {
        self.commands
            .iter_mut()
            .fold(state.clone(), |state, command| command.execute(&state))
    }

    /// Sub-commands are undone last-to-first, since later ones may depend on
    /// what earlier ones did.
    fn undo(&mut self, state: &Snapshot) -> Snapshot {
        self.commands
            .iter_mut()
            .rev()
            .fold(state.clone(), |state, command| command.undo(&state))
    }

    fn name(&self) -> &str {
        "Combined edit"
    }
}
