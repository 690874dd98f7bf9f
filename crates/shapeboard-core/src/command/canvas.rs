//! Canvas option edits.

use super::Command;
use crate::registry::{CanvasOption, Snapshot};

/// Change canvas size or background.
#[derive(Debug)]
pub struct UpdateCanvasOptionCommand {
    before: CanvasOption,
    after: CanvasOption,
}

impl UpdateCanvasOptionCommand {
    pub fn new(before: CanvasOption, after: CanvasOption) -> Self {
        Self { before, after }
    }
}

impl Command for UpdateCanvasOptionCommand {
    fn execute(&mut self, state: &Snapshot) -> Snapshot {
        state.with_canvas_option(self.after.clone())
    }

    fn undo(&mut self, state: &Snapshot) -> Snapshot {
        state.with_canvas_option(self.before.clone())
    }

    fn name(&self) -> &str {
        "Canvas settings"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Size;

    #[test]
    fn test_canvas_option_round_trip() {
        let start = Snapshot::default();
        let after_option = CanvasOption {
            canvas_size: Size::new(1024.0, 768.0),
            bg_color: "#000000".into(),
        };
        let mut command = UpdateCanvasOptionCommand::new(start.canvas_option.clone(), after_option.clone());
        let after = command.execute(&start);
        assert_eq!(after.canvas_option, after_option);
        assert_eq!(after.shapes, start.shapes);
        assert_eq!(command.undo(&after), start);
    }
}
