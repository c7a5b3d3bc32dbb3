//! Positions and selections inside a document.

use crate::document::Document;

/// A position in a document: block index plus character offset into that block's text.
///
/// Offsets count characters across all runs of the block, so a point does not change when
/// runs are split or merged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point {
    pub block: usize,
    pub offset: usize,
}

impl Point {
    pub fn new(block: usize, offset: usize) -> Self {
        Self { block, offset }
    }

    /// Moves the point to the nearest valid position in `document`.
    pub fn clamp(self, document: &Document) -> Self {
        let last = document.block_count().saturating_sub(1);
        let block = self.block.min(last);
        let len = document
            .blocks()
            .get(block)
            .map(|b| b.text_len())
            .unwrap_or(0);
        Self {
            block,
            offset: self.offset.min(len),
        }
    }
}

/// Anchor/focus selection. Collapsed when both points are equal (a caret).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Selection {
    pub anchor: Point,
    pub focus: Point,
}

impl Selection {
    pub fn new(anchor: Point, focus: Point) -> Self {
        Self { anchor, focus }
    }

    pub fn caret(point: Point) -> Self {
        Self::new(point, point)
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// The earlier of anchor and focus.
    pub fn start(&self) -> Point {
        self.anchor.min(self.focus)
    }

    /// The later of anchor and focus.
    pub fn end(&self) -> Point {
        self.anchor.max(self.focus)
    }

    pub fn clamp(self, document: &Document) -> Self {
        Self::new(self.anchor.clamp(document), self.focus.clamp(document))
    }
}
