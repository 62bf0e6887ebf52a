//! Bounded undo/redo history shared by both views.
//!
//! Steps are grouped: consecutive coalescible steps (e.g. typing single characters) join the
//! open group and are undone together. Programmatic replaces never enter the history; instead
//! they call [`UndoHistory::reset`], which starts a new generation so the user cannot undo
//! across a replace they did not make.

#[derive(Debug, Clone)]
struct UndoStep<E> {
    group_id: usize,
    edit: E,
}

/// Linear undo/redo history of edits of type `E`.
#[derive(Debug)]
pub struct UndoHistory<E> {
    undo_stack: Vec<UndoStep<E>>,
    redo_stack: Vec<UndoStep<E>>,
    max_undo: usize,
    next_group_id: usize,
    open_group_id: Option<usize>,
    generation: u64,
}

impl<E: Clone> UndoHistory<E> {
    /// Create an empty history keeping at most `max_undo` steps.
    pub fn new(max_undo: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_undo: max_undo.max(1),
            next_group_id: 0,
            open_group_id: None,
            generation: 0,
        }
    }

    /// Whether there is anything to undo.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Whether there is anything to redo.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of recorded undo steps.
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of recorded redo steps.
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Incremented on every [`UndoHistory::reset`].
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Close the open group so the next step starts a new one.
    pub fn end_group(&mut self) {
        self.open_group_id = None;
    }

    /// Record a step. Returns its group id.
    pub fn push(&mut self, edit: E, coalescible: bool) -> usize {
        self.redo_stack.clear();

        if self.undo_stack.len() >= self.max_undo {
            self.undo_stack.remove(0);
        }

        let group_id = match self.open_group_id {
            Some(open) if coalescible => open,
            _ => {
                let id = self.next_group_id;
                self.next_group_id = self.next_group_id.wrapping_add(1);
                id
            }
        };
        self.open_group_id = coalescible.then_some(group_id);

        self.undo_stack.push(UndoStep { group_id, edit });
        group_id
    }

    /// Pop the latest group for undoing. Edits are returned latest first.
    pub fn undo(&mut self) -> Option<Vec<E>> {
        self.open_group_id = None;
        let steps = pop_group(&mut self.undo_stack)?;
        let edits = steps.iter().map(|step| step.edit.clone()).collect();
        // Latest pushed first, so the earliest edit ends up on top of the redo stack.
        self.redo_stack.extend(steps);
        Some(edits)
    }

    /// Pop the latest undone group for redoing. Edits are returned in original order.
    pub fn redo(&mut self) -> Option<Vec<E>> {
        self.open_group_id = None;
        let steps = pop_group(&mut self.redo_stack)?;
        let edits = steps.iter().map(|step| step.edit.clone()).collect();
        self.undo_stack.extend(steps);
        Some(edits)
    }

    /// Drop all steps and start a new generation.
    pub fn reset(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.open_group_id = None;
        self.generation = self.generation.wrapping_add(1);
    }
}

fn pop_group<E>(stack: &mut Vec<UndoStep<E>>) -> Option<Vec<UndoStep<E>>> {
    let group_id = stack.last()?.group_id;
    let mut steps = Vec::new();
    while let Some(step) = stack.pop_if(|step| step.group_id == group_id) {
        steps.push(step);
    }
    Some(steps)
}
