//! Plain-text projection of a document tree.
//!
//! The projection is what gets stored next to the structured note for search and plain
//! display: run text concatenated per block, marks discarded, blocks joined with a single
//! newline. It is lossy by construction and never parsed back.

use crate::constants::BLOCK_SEPARATOR;
use crate::document::node::{Document, DocumentNode};
use crate::error::{NoteError, NoteResult};
use serde_json::Value;

/// Projects a block sequence to plain text.
///
/// # Errors
///
/// Returns [`NoteError::MalformedNode`] if a block has no inline runs. An empty block sequence
/// projects to the empty string.
pub fn project(tree: &[DocumentNode]) -> NoteResult<String> {
    let mut out = String::new();
    for (index, block) in tree.iter().enumerate() {
        if block.children().is_empty() {
            return Err(NoteError::malformed(
                format!("[{index}].children"),
                "block has no inline runs",
            ));
        }
        if index > 0 {
            out.push_str(BLOCK_SEPARATOR);
        }
        for run in block.children() {
            out.push_str(&run.text);
        }
    }
    Ok(out)
}

impl Document {
    /// Plain-text projection of a well-formed document.
    pub fn plain_text(&self) -> String {
        self.blocks()
            .iter()
            .map(DocumentNode::text)
            .collect::<Vec<_>>()
            .join(BLOCK_SEPARATOR)
    }
}

/// Projects an untyped tree, as decoded from storage or received from another producer.
///
/// Elements are objects with a `children` array; leaves are objects with a `text` string.
/// Elements nested inside a block are flattened into that block's line.
///
/// # Errors
///
/// Returns [`NoteError::MalformedNode`] when the root is not an array, when a block has no
/// inline runs, when a node is neither an element nor a leaf, or when a field has the wrong
/// type. Missing fields are never
/// coerced to empty text.
pub fn project_value(value: &Value) -> NoteResult<String> {
    let blocks = value
        .as_array()
        .ok_or_else(|| NoteError::malformed("<root>", "expected an array of blocks"))?;

    let mut lines = Vec::with_capacity(blocks.len());
    for (index, block) in blocks.iter().enumerate() {
        let path = format!("[{index}]");
        let children = element_children(block, &path)?;
        if children.is_empty() {
            return Err(NoteError::malformed(
                format!("{path}.children"),
                "block has no inline runs",
            ));
        }
        let mut line = String::new();
        append_children(children, &path, &mut line)?;
        lines.push(line);
    }
    Ok(lines.join(BLOCK_SEPARATOR))
}

fn element_children<'a>(node: &'a Value, path: &str) -> NoteResult<&'a [Value]> {
    let object = node
        .as_object()
        .ok_or_else(|| NoteError::malformed(path, "expected an object"))?;
    match object.get("children") {
        Some(Value::Array(children)) => Ok(children.as_slice()),
        Some(_) => Err(NoteError::malformed(
            format!("{path}.children"),
            "expected an array",
        )),
        None => Err(NoteError::malformed(path, "element is missing `children`")),
    }
}

fn append_children(children: &[Value], parent: &str, out: &mut String) -> NoteResult<()> {
    for (index, child) in children.iter().enumerate() {
        let path = format!("{parent}.children[{index}]");
        let object = child
            .as_object()
            .ok_or_else(|| NoteError::malformed(&path, "expected an object"))?;

        match (object.get("text"), object.get("children")) {
            (Some(Value::String(text)), _) => out.push_str(text),
            (Some(_), _) => {
                return Err(NoteError::malformed(
                    format!("{path}.text"),
                    "expected a string",
                ))
            }
            (None, Some(_)) => {
                let nested = element_children(child, &path)?;
                append_children(nested, &path, out)?;
            }
            (None, None) => {
                return Err(NoteError::malformed(
                    path,
                    "node has neither `text` nor `children`",
                ))
            }
        }
    }
    Ok(())
}
