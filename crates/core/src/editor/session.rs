//! Editor session: one mutable document plus selection, marks, history and change
//! notification.
//!
//! The session has two modes, [`SessionMode::Editable`] and [`SessionMode::ReadOnly`], and the
//! host switches between them; the session never changes mode by itself. In read-only mode
//! every mutation is a no-op returning [`EditOutcome::Unchanged`].
//!
//! After each local mutation the registered change listener is called synchronously with the
//! full tree. Loading content through [`EditorSession::replace_document`] or
//! [`EditorSession::set_document`] resets the session and does not notify.

use crate::config::CoreConfig;
use crate::constants::DEFAULT_HISTORY_CAPACITY;
use crate::document::{codec, BlockKind, Document, DocumentNode, Mark, Marks};
use crate::editor::history::{History, Snapshot};
use crate::editor::ops;
use crate::editor::selection::{Point, Selection};
use serde_json::Value;

/// Whether the session accepts edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Editable,
    ReadOnly,
}

/// Result of an editing operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The session state changed and listeners were notified
    Changed,
    /// Nothing happened (read-only session, empty input, nothing to delete, ...)
    Unchanged,
}

/// Callback invoked with the full tree after every local mutation.
pub type ChangeListener = Box<dyn FnMut(&Document)>;

pub struct EditorSession {
    document: Document,
    selection: Selection,
    pending_marks: Option<Marks>,
    mode: SessionMode,
    history: History,
    on_change: Option<ChangeListener>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("document", &self.document)
            .field("selection", &self.selection)
            .field("pending_marks", &self.pending_marks)
            .field("mode", &self.mode)
            .field("undo_depth", &self.history.undo_depth())
            .field("redo_depth", &self.history.redo_depth())
            .finish()
    }
}

impl EditorSession {
    /// Creates an editable session holding the canonical empty document.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    /// Creates a session keeping at most `capacity` undo steps.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            document: Document::empty(),
            selection: Selection::default(),
            pending_marks: None,
            mode: SessionMode::Editable,
            history: History::new(capacity),
            on_change: None,
        }
    }

    /// Creates a session using the configured history capacity.
    pub fn from_config(cfg: &CoreConfig) -> Self {
        Self::with_capacity(cfg.history_capacity())
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn is_read_only(&self) -> bool {
        self.mode == SessionMode::ReadOnly
    }

    pub fn undo_depth(&self) -> usize {
        self.history.undo_depth()
    }

    pub fn redo_depth(&self) -> usize {
        self.history.redo_depth()
    }

    /// Switches between editable and read-only.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.mode = if read_only {
            SessionMode::ReadOnly
        } else {
            SessionMode::Editable
        };
    }

    /// Registers the change listener, replacing any previous one.
    pub fn set_on_change(&mut self, listener: impl FnMut(&Document) + 'static) {
        self.on_change = Some(Box::new(listener));
    }

    pub fn clear_on_change(&mut self) {
        self.on_change = None;
    }

    /// Moves the selection, clamped into the document. Clears pending marks.
    pub fn select(&mut self, selection: Selection) {
        self.selection = selection.clamp(&self.document);
        self.pending_marks = None;
    }

    /// Places a caret at `point`.
    pub fn set_caret(&mut self, point: Point) {
        self.select(Selection::caret(point));
    }

    /// Selects the whole document.
    pub fn select_all(&mut self) {
        let last = self.document.block_count() - 1;
        let end = Point::new(last, self.document.blocks()[last].text_len());
        self.select(Selection::new(Point::default(), end));
    }

    /// Marks that the next inserted text will carry.
    pub fn marks_at_caret(&self) -> Marks {
        if let Some(marks) = self.pending_marks {
            return marks;
        }
        let start = self.selection.start();
        ops::marks_before(self.document.blocks()[start.block].children(), start.offset)
    }

    /// Whether `mark` is active for the current selection.
    ///
    /// For a caret this is the pending/inherited marks. For an expanded selection the mark is
    /// active only when every non-empty run inside the selection carries it.
    pub fn is_mark_active(&self, mark: Mark) -> bool {
        if !self.selection_has_text() {
            return self.marks_at_caret().has(mark);
        }
        self.selected_ranges().into_iter().all(|(block, from, to)| {
            ops::runs_in_range(self.document.blocks()[block].children(), from, to)
                .into_iter()
                .all(|run| run.has(mark))
        })
    }

    /// Toggles `mark` on the selection.
    ///
    /// An expanded selection is normalized to a single state: if the mark is active (see
    /// [`is_mark_active`](Self::is_mark_active)) it is cleared from the whole selection,
    /// otherwise it is set on the whole selection. For a caret the pending marks are flipped
    /// and apply to the next inserted text.
    pub fn toggle_mark(&mut self, mark: Mark) -> EditOutcome {
        if self.is_read_only() {
            tracing::trace!("ignoring mark toggle in read-only session");
            return EditOutcome::Unchanged;
        }

        if !self.selection_has_text() {
            let current = self.marks_at_caret();
            self.pending_marks = Some(current.with(mark, !current.has(mark)));
            self.notify();
            return EditOutcome::Changed;
        }

        let on = !self.is_mark_active(mark);
        self.edit(|session| {
            for (block, from, to) in session.selected_ranges() {
                let children = session.document.blocks_mut()[block].children_mut();
                ops::apply_mark(children, from, to, mark, on);
            }
            true
        })
    }

    /// Inserts text at the caret, replacing an expanded selection first.
    ///
    /// Each `\n` splits the current block. Inserted text carries the pending marks if a caret
    /// toggle set them, otherwise the marks of the character before the caret.
    pub fn insert_text(&mut self, text: &str) -> EditOutcome {
        if text.is_empty() {
            return EditOutcome::Unchanged;
        }
        self.edit(|session| {
            session.delete_selection();
            let marks = session.marks_at_caret();
            for (index, segment) in text.split('\n').enumerate() {
                if index > 0 {
                    session.split_at_caret();
                }
                let segment = segment.strip_suffix('\r').unwrap_or(segment);
                if segment.is_empty() {
                    continue;
                }
                let caret = session.selection.focus;
                let children = session.document.blocks_mut()[caret.block].children_mut();
                ops::insert(children, caret.offset, segment, marks);
                session.selection = Selection::caret(Point::new(
                    caret.block,
                    caret.offset + segment.chars().count(),
                ));
            }
            true
        })
    }

    /// Deletes the selection, the character before the caret, or joins the caret's block
    /// with the previous one when the caret is at its start.
    pub fn delete_backward(&mut self) -> EditOutcome {
        self.edit(|session| {
            if !session.selection.is_collapsed() {
                return session.delete_selection();
            }
            let caret = session.selection.focus;
            if caret.offset > 0 {
                let from = Point::new(caret.block, caret.offset - 1);
                session.delete_range(from, caret);
                session.selection = Selection::caret(from);
                true
            } else if caret.block > 0 {
                let previous = caret.block - 1;
                let join = Point::new(previous, session.document.blocks()[previous].text_len());
                session.delete_range(join, caret);
                session.selection = Selection::caret(join);
                true
            } else {
                false
            }
        })
    }

    /// Splits the caret's block in two, replacing an expanded selection first.
    pub fn split_block(&mut self) -> EditOutcome {
        self.edit(|session| {
            session.delete_selection();
            session.split_at_caret();
            true
        })
    }

    /// Changes the kind of every block touched by the selection.
    pub fn set_block_kind(&mut self, kind: BlockKind) -> EditOutcome {
        self.edit(|session| {
            let (start, end) = (session.selection.start(), session.selection.end());
            let mut changed = false;
            for block in &mut session.document.blocks_mut()[start.block..=end.block] {
                if block.kind() != kind {
                    block.set_kind(kind);
                    changed = true;
                }
            }
            changed
        })
    }

    pub fn undo(&mut self) -> EditOutcome {
        if self.is_read_only() {
            return EditOutcome::Unchanged;
        }
        let current = self.snapshot();
        match self.history.undo(current) {
            Some(previous) => {
                self.restore(previous);
                self.notify();
                EditOutcome::Changed
            }
            None => EditOutcome::Unchanged,
        }
    }

    pub fn redo(&mut self) -> EditOutcome {
        if self.is_read_only() {
            return EditOutcome::Unchanged;
        }
        let current = self.snapshot();
        match self.history.redo(current) {
            Some(next) => {
                self.restore(next);
                self.notify();
                EditOutcome::Changed
            }
            None => EditOutcome::Unchanged,
        }
    }

    /// Resets the session to an externally supplied tree.
    ///
    /// Anything that is not a well-formed, non-empty block sequence is replaced by the
    /// canonical empty document so the editor always has something to render. Returns whether
    /// `value` was accepted as given.
    pub fn replace_document(&mut self, value: Value) -> bool {
        match codec::decode_value(value) {
            Ok(document) => {
                self.set_document(document);
                true
            }
            Err(err) => {
                tracing::warn!("replacing editor content with an empty document: {}", err);
                self.set_document(Document::empty());
                false
            }
        }
    }

    /// Resets the session to `document`: caret at the start, no pending marks, no history.
    pub fn set_document(&mut self, document: Document) {
        self.document = document;
        self.selection = Selection::default();
        self.pending_marks = None;
        self.history.clear();
    }

    fn edit(&mut self, action: impl FnOnce(&mut Self) -> bool) -> EditOutcome {
        if self.is_read_only() {
            tracing::trace!("ignoring edit in read-only session");
            return EditOutcome::Unchanged;
        }
        let before = self.snapshot();
        if !action(self) {
            return EditOutcome::Unchanged;
        }
        self.pending_marks = None;
        self.history.record(before);
        self.notify();
        EditOutcome::Changed
    }

    fn notify(&mut self) {
        if let Some(listener) = self.on_change.as_mut() {
            listener(&self.document);
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            document: self.document.clone(),
            selection: self.selection,
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.document = snapshot.document;
        self.selection = snapshot.selection.clamp(&self.document);
        self.pending_marks = None;
    }

    fn selection_has_text(&self) -> bool {
        !self.selection.is_collapsed()
            && self
                .selected_ranges()
                .into_iter()
                .any(|(block, from, to)| {
                    !ops::runs_in_range(self.document.blocks()[block].children(), from, to)
                        .is_empty()
                })
    }

    /// `(block, from, to)` character ranges covered by the selection.
    fn selected_ranges(&self) -> Vec<(usize, usize, usize)> {
        let (start, end) = (self.selection.start(), self.selection.end());
        (start.block..=end.block)
            .map(|block| {
                let from = if block == start.block { start.offset } else { 0 };
                let to = if block == end.block {
                    end.offset
                } else {
                    self.document.blocks()[block].text_len()
                };
                (block, from, to)
            })
            .collect()
    }

    fn delete_selection(&mut self) -> bool {
        if self.selection.is_collapsed() {
            return false;
        }
        let (start, end) = (self.selection.start(), self.selection.end());
        self.delete_range(start, end);
        self.selection = Selection::caret(start);
        true
    }

    /// Removes `[start, end)`, joining the end block's remainder onto the start block.
    fn delete_range(&mut self, start: Point, end: Point) {
        let blocks = self.document.blocks_mut();
        if start.block == end.block {
            let children = blocks[start.block].children_mut();
            ops::cut(children, start.offset, end.offset);
            ops::normalize(children);
            return;
        }

        let end_len = blocks[end.block].text_len();
        let remainder = ops::cut(blocks[end.block].children_mut(), end.offset, end_len);
        let start_len = blocks[start.block].text_len();
        let children = blocks[start.block].children_mut();
        ops::cut(children, start.offset, start_len);
        children.extend(remainder);
        ops::normalize(children);
        blocks.drain(start.block + 1..=end.block);
    }

    fn split_at_caret(&mut self) {
        let caret = self.selection.focus;
        let blocks = self.document.blocks_mut();
        let (kind, tail) = {
            let block = &mut blocks[caret.block];
            let len = block.text_len();
            let mut tail = ops::cut(block.children_mut(), caret.offset, len);
            ops::normalize(block.children_mut());
            ops::normalize(&mut tail);
            (block.kind(), tail)
        };
        blocks.insert(caret.block + 1, DocumentNode::new(kind, tail));
        self.selection = Selection::caret(Point::new(caret.block + 1, 0));
    }
}
