use serde::{Deserialize, Serialize};

use crate::canvas::buffer::PixelBuffer;
use crate::canvas::transform::{self, RotateDirection};
use crate::utils::color::ColorComponents;
use crate::utils::vector::PixelPoint;

/// One pixel and the color it should be given back.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PixelRecord {
    pub point: PixelPoint,
    pub color: ColorComponents,
}

/// A reversible edit, stored as plain data.
///
/// [`UndoAction::swap`] applies the action and leaves its inverse in place, so the same
/// record moves between the undo and redo stacks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum UndoAction {
    /// Repaint each point with the recorded color.
    Repaint { pixels: Vec<PixelRecord> },
    /// Toroidal shift by `delta`.
    Move { delta: PixelPoint },
    Flip { vertical: bool },
    Rotate { direction: RotateDirection },
    /// Swap in a whole buffer, possibly of different dimensions.
    Replace { buffer: PixelBuffer },
    /// Several actions undone and redone as one step.
    Group(Vec<UndoAction>),
}

impl UndoAction {
    /// Apply this action to `buffer` and turn `self` into the action that reverts it.
    pub fn swap(&mut self, buffer: &mut PixelBuffer) {
        match self {
            UndoAction::Repaint { pixels } => {
                for record in pixels.iter_mut() {
                    let current = buffer.get(record.point);
                    buffer.set(record.point, record.color);
                    record.color = current;
                }
            }
            UndoAction::Move { delta } => {
                let shift = transform::wrap_delta(*delta, buffer.width(), buffer.height());
                let snapshot = buffer.clone();
                transform::shift_wrapped(&snapshot, buffer, shift);
                *delta = -shift;
            }
            UndoAction::Flip { vertical } => transform::flip(buffer, *vertical),
            UndoAction::Rotate { direction } => {
                let rotated = transform::rotate(buffer, *direction);
                buffer.replace(rotated);
                *direction = direction.opposite();
            }
            UndoAction::Replace { buffer: stored } => std::mem::swap(buffer, stored),
            UndoAction::Group(actions) => {
                for action in actions.iter_mut().rev() {
                    action.swap(buffer);
                }
                actions.reverse();
            }
        }
    }

    /// Short label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            UndoAction::Repaint { .. } => "repaint",
            UndoAction::Move { .. } => "move",
            UndoAction::Flip { .. } => "flip",
            UndoAction::Rotate { .. } => "rotate",
            UndoAction::Replace { .. } => "replace",
            UndoAction::Group(_) => "group",
        }
    }
}

/// Stack-based undo/redo manager that swaps recorded actions in place.
#[derive(Debug, Default)]
pub struct History {
    undo_stack: Vec<UndoAction>,
    redo_stack: Vec<UndoAction>,
    open_groups: Vec<Vec<UndoAction>>,
}

impl History {
    /// Create an empty history with no recorded actions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the inverse of an edit that has already been applied. Clears redo.
    ///
    /// While a group is open the action joins that group instead.
    pub fn push_action(&mut self, action: UndoAction) {
        if let Some(group) = self.open_groups.last_mut() {
            group.push(action);
            return;
        }
        log::debug!("recorded {} undo step", action.kind());
        self.undo_stack.push(action);
        self.redo_stack.clear();
    }

    /// Start collecting actions into one step. Groups nest.
    pub fn begin_group(&mut self) {
        self.open_groups.push(Vec::new());
    }

    /// Close the innermost group. Returns whether anything was recorded.
    pub fn end_group(&mut self) -> bool {
        let Some(mut actions) = self.open_groups.pop() else {
            log::warn!("end_group called without an open group");
            return false;
        };
        match actions.len() {
            0 => false,
            1 => {
                self.push_action(actions.remove(0));
                true
            }
            _ => {
                self.push_action(UndoAction::Group(actions));
                true
            }
        }
    }

    pub fn grouping_level(&self) -> usize {
        self.open_groups.len()
    }

    fn close_all_groups(&mut self) {
        while !self.open_groups.is_empty() {
            self.end_group();
        }
    }

    /// Undo the latest step. Open groups are closed first. Returns false on an empty stack.
    pub fn undo(&mut self, buffer: &mut PixelBuffer) -> bool {
        self.close_all_groups();
        if let Some(mut action) = self.undo_stack.pop() {
            action.swap(buffer);
            self.redo_stack.push(action);
            true
        } else {
            log::trace!("nothing to undo");
            false
        }
    }

    /// Redo the previously undone step. Returns false on an empty stack.
    pub fn redo(&mut self, buffer: &mut PixelBuffer) -> bool {
        self.close_all_groups();
        if let Some(mut action) = self.redo_stack.pop() {
            action.swap(buffer);
            self.undo_stack.push(action);
            true
        } else {
            log::trace!("nothing to redo");
            false
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Recorded undo steps, oldest first.
    pub fn undo_entries(&self) -> &[UndoAction] {
        &self.undo_stack
    }

    pub fn redo_entries(&self) -> &[UndoAction] {
        &self.redo_stack
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.open_groups.clear();
    }
}
