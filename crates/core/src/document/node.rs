//! Document node model.
//!
//! A clinical note is an ordered, non-empty sequence of block nodes. Each block holds an
//! ordered, non-empty sequence of inline runs, and each run carries literal text plus four
//! independent formatting marks.
//!
//! The JSON shape matches what the note editor has always stored:
//!
//! ```json
//! [{ "type": "paragraph", "children": [{ "text": "Hello", "bold": true }] }]
//! ```
//!
//! Absent mark flags read as `false` and `false` flags are omitted on write, so partial trees
//! supplied by other producers are accepted as-is.

use crate::error::{NoteError, NoteResult};
use serde::{Deserialize, Serialize};

fn is_false(value: &bool) -> bool {
    !*value
}

/// Formatting attribute applicable to an inline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    Bold,
    Italic,
    Underline,
    Code,
}

impl Mark {
    pub const ALL: [Mark; 4] = [Mark::Bold, Mark::Italic, Mark::Underline, Mark::Code];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mark::Bold => "bold",
            Mark::Italic => "italic",
            Mark::Underline => "underline",
            Mark::Code => "code",
        }
    }
}

impl std::str::FromStr for Mark {
    type Err = NoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mark::ALL
            .into_iter()
            .find(|mark| mark.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| NoteError::InvalidInput(format!("unknown mark: {s}")))
    }
}

/// The set of marks active on a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Marks {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub code: bool,
}

impl Marks {
    pub fn has(&self, mark: Mark) -> bool {
        match mark {
            Mark::Bold => self.bold,
            Mark::Italic => self.italic,
            Mark::Underline => self.underline,
            Mark::Code => self.code,
        }
    }

    pub fn set(&mut self, mark: Mark, on: bool) {
        match mark {
            Mark::Bold => self.bold = on,
            Mark::Italic => self.italic = on,
            Mark::Underline => self.underline = on,
            Mark::Code => self.code = on,
        }
    }

    pub fn with(mut self, mark: Mark, on: bool) -> Self {
        self.set(mark, on);
        self
    }
}

/// A contiguous span of text sharing one set of marks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineRun {
    pub text: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub code: bool,
}

impl InlineRun {
    /// Creates an unmarked run.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Creates a run carrying `marks`.
    pub fn marked(text: impl Into<String>, marks: Marks) -> Self {
        let mut run = Self::plain(text);
        run.set_marks(marks);
        run
    }

    pub fn marks(&self) -> Marks {
        Marks {
            bold: self.bold,
            italic: self.italic,
            underline: self.underline,
            code: self.code,
        }
    }

    pub fn set_marks(&mut self, marks: Marks) {
        self.bold = marks.bold;
        self.italic = marks.italic;
        self.underline = marks.underline;
        self.code = marks.code;
    }

    pub fn has(&self, mark: Mark) -> bool {
        self.marks().has(mark)
    }

    /// Length in characters, the unit used by editor offsets.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Structural kind of a block node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Paragraph,
    Heading,
    CodeBlock,
}

impl BlockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Paragraph => "paragraph",
            BlockKind::Heading => "heading",
            BlockKind::CodeBlock => "code",
        }
    }
}

/// Top-level structural unit of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DocumentNode {
    Paragraph {
        children: Vec<InlineRun>,
    },
    Heading {
        children: Vec<InlineRun>,
    },
    #[serde(rename = "code")]
    CodeBlock {
        children: Vec<InlineRun>,
    },
}

impl DocumentNode {
    pub fn new(kind: BlockKind, children: Vec<InlineRun>) -> Self {
        match kind {
            BlockKind::Paragraph => DocumentNode::Paragraph { children },
            BlockKind::Heading => DocumentNode::Heading { children },
            BlockKind::CodeBlock => DocumentNode::CodeBlock { children },
        }
    }

    /// Shorthand for a block holding one unmarked run.
    pub fn with_text(kind: BlockKind, text: impl Into<String>) -> Self {
        Self::new(kind, vec![InlineRun::plain(text)])
    }

    /// The minimal valid block: a paragraph with one empty run.
    pub fn empty_paragraph() -> Self {
        Self::with_text(BlockKind::Paragraph, "")
    }

    pub fn kind(&self) -> BlockKind {
        match self {
            DocumentNode::Paragraph { .. } => BlockKind::Paragraph,
            DocumentNode::Heading { .. } => BlockKind::Heading,
            DocumentNode::CodeBlock { .. } => BlockKind::CodeBlock,
        }
    }

    pub fn children(&self) -> &[InlineRun] {
        match self {
            DocumentNode::Paragraph { children }
            | DocumentNode::Heading { children }
            | DocumentNode::CodeBlock { children } => children,
        }
    }

    pub fn children_mut(&mut self) -> &mut Vec<InlineRun> {
        match self {
            DocumentNode::Paragraph { children }
            | DocumentNode::Heading { children }
            | DocumentNode::CodeBlock { children } => children,
        }
    }

    /// Changes the block kind, keeping its runs.
    pub fn set_kind(&mut self, kind: BlockKind) {
        if self.kind() == kind {
            return;
        }
        let children = std::mem::take(self.children_mut());
        *self = DocumentNode::new(kind, children);
    }

    /// Concatenated run text with marks discarded.
    pub fn text(&self) -> String {
        self.children().iter().map(|run| run.text.as_str()).collect()
    }

    pub fn text_len(&self) -> usize {
        self.children().iter().map(InlineRun::char_len).sum()
    }
}

/// A well-formed document tree.
///
/// Holds at least one block and every block holds at least one run. The only ways to obtain a
/// `Document` are [`Document::empty`], [`Document::new`] and deserialization, all of which
/// enforce those invariants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Document(Vec<DocumentNode>);

impl Document {
    /// The canonical empty document: `[Paragraph{children:[{text:""}]}]`.
    pub fn empty() -> Self {
        Self(vec![DocumentNode::empty_paragraph()])
    }

    /// Builds a document from externally assembled blocks.
    ///
    /// # Errors
    ///
    /// Returns [`NoteError::MalformedNode`] if `blocks` is empty or any block has no runs.
    pub fn new(blocks: Vec<DocumentNode>) -> NoteResult<Self> {
        validate_blocks(&blocks)?;
        Ok(Self(blocks))
    }

    pub fn blocks(&self) -> &[DocumentNode] {
        &self.0
    }

    pub fn block_count(&self) -> usize {
        self.0.len()
    }

    /// True for the canonical empty document and anything equivalent to it.
    pub fn is_blank(&self) -> bool {
        self.0.len() == 1 && self.0[0].text_len() == 0
    }

    pub(crate) fn blocks_mut(&mut self) -> &mut Vec<DocumentNode> {
        &mut self.0
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let blocks = Vec::<DocumentNode>::deserialize(deserializer)?;
        Document::new(blocks).map_err(serde::de::Error::custom)
    }
}

pub(crate) fn validate_blocks(blocks: &[DocumentNode]) -> NoteResult<()> {
    if blocks.is_empty() {
        return Err(NoteError::malformed("[]", "document has no blocks"));
    }
    for (index, block) in blocks.iter().enumerate() {
        if block.children().is_empty() {
            return Err(NoteError::malformed(
                format!("[{index}].children"),
                "block has no inline runs",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_single_blank_paragraph() {
        let doc = Document::empty();
        assert_eq!(doc.blocks(), &[DocumentNode::empty_paragraph()]);
        assert!(doc.is_blank());
    }

    #[test]
    fn new_rejects_empty_sequences() {
        assert!(matches!(
            Document::new(Vec::new()),
            Err(NoteError::MalformedNode { .. })
        ));
        let err = Document::new(vec![
            DocumentNode::empty_paragraph(),
            DocumentNode::new(BlockKind::Heading, Vec::new()),
        ])
        .unwrap_err();
        match err {
            NoteError::MalformedNode { path, .. } => assert_eq!(path, "[1].children"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn set_kind_keeps_runs() {
        let mut block = DocumentNode::new(
            BlockKind::Paragraph,
            vec![InlineRun::plain("a"), InlineRun::marked("b", Marks::default().with(Mark::Bold, true))],
        );
        block.set_kind(BlockKind::CodeBlock);
        assert_eq!(block.kind(), BlockKind::CodeBlock);
        assert_eq!(block.text(), "ab");
        assert!(block.children()[1].bold);
    }

    #[test]
    fn partial_runs_deserialize_without_marks() {
        let block: DocumentNode =
            serde_json::from_str(r#"{"type":"heading","children":[{"text":"Plan"}]}"#).unwrap();
        assert_eq!(block, DocumentNode::with_text(BlockKind::Heading, "Plan"));
    }

    #[test]
    fn false_marks_are_omitted_on_write() {
        let run = InlineRun::marked("x", Marks::default().with(Mark::Italic, true));
        let json = serde_json::to_string(&run).unwrap();
        assert_eq!(json, r#"{"text":"x","italic":true}"#);
    }

    #[test]
    fn code_block_uses_code_tag() {
        let json = serde_json::to_string(&DocumentNode::with_text(BlockKind::CodeBlock, "x")).unwrap();
        assert_eq!(json, r#"{"type":"code","children":[{"text":"x"}]}"#);
    }

    #[test]
    fn mark_parses_case_insensitively() {
        assert_eq!("Bold".parse::<Mark>().unwrap(), Mark::Bold);
        assert!("strike".parse::<Mark>().is_err());
    }

    #[test]
    fn char_len_counts_characters_not_bytes() {
        assert_eq!(InlineRun::plain("são").char_len(), 3);
    }
}
