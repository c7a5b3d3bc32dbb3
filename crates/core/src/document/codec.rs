//! Structural encoding of documents.
//!
//! Documents are stored as a JSON array of block nodes in a single string field. Decoding runs
//! through `serde_path_to_error` so a failure names the offending block (e.g. `[2]`) rather
//! than only a line/column.

use crate::document::node::{Document, DocumentNode};
use crate::error::{NoteError, NoteResult};
use serde_json::Value;

/// Encodes a document as a compact JSON array.
///
/// # Errors
///
/// Returns [`NoteError::Encode`] if serialization fails.
pub fn encode(document: &Document) -> NoteResult<String> {
    serde_json::to_string(document).map_err(NoteError::Encode)
}

/// Decodes a stored string into a well-formed document.
///
/// # Errors
///
/// Returns [`NoteError::Decode`] if the input is not JSON or does not match the node schema
/// (including a root that is not an array), and [`NoteError::MalformedNode`] if it decodes to
/// an empty block sequence or a block without runs.
pub fn decode(input: &str) -> NoteResult<Document> {
    let mut deserializer = serde_json::Deserializer::from_str(input);
    let blocks: Vec<DocumentNode> =
        serde_path_to_error::deserialize(&mut deserializer).map_err(decode_error)?;
    deserializer.end().map_err(|source| NoteError::Decode {
        path: "<trailing>".into(),
        source,
    })?;
    Document::new(blocks)
}

/// Decodes an already parsed JSON value into a well-formed document.
///
/// # Errors
///
/// Same as [`decode`].
pub fn decode_value(value: Value) -> NoteResult<Document> {
    let blocks: Vec<DocumentNode> = serde_path_to_error::deserialize(value).map_err(decode_error)?;
    Document::new(blocks)
}

fn decode_error(err: serde_path_to_error::Error<serde_json::Error>) -> NoteError {
    let path = err.path().to_string();
    let path = if path.is_empty() || path == "." {
        "<root>".to_string()
    } else {
        path
    };
    NoteError::Decode {
        path,
        source: err.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::node::{BlockKind, InlineRun, Mark, Marks};

    fn sample() -> Document {
        let bold = Marks::default().with(Mark::Bold, true);
        let code = Marks::default().with(Mark::Code, true).with(Mark::Italic, true);
        Document::new(vec![
            DocumentNode::with_text(BlockKind::Heading, "Assessment"),
            DocumentNode::new(
                BlockKind::Paragraph,
                vec![
                    InlineRun::plain("Dose: "),
                    InlineRun::marked("5 mg", bold),
                    InlineRun::marked(" od", code),
                ],
            ),
            DocumentNode::with_text(BlockKind::CodeBlock, "ICD-10 J45.9"),
        ])
        .unwrap()
    }

    #[test]
    fn round_trips_documents() {
        let doc = sample();
        let encoded = encode(&doc).unwrap();
        assert_eq!(decode(&encoded).unwrap(), doc);
        assert_eq!(decode(&encode(&Document::empty()).unwrap()).unwrap(), Document::empty());
    }

    #[test]
    fn encodes_canonical_empty_document() {
        assert_eq!(
            encode(&Document::empty()).unwrap(),
            r#"[{"type":"paragraph","children":[{"text":""}]}]"#
        );
    }

    #[test]
    fn decodes_stored_editor_output() {
        let stored = r#"[{"type":"paragraph","children":[{"text":"abc"},{"text":"def","bold":true}]}]"#;
        let doc = decode(stored).unwrap();
        assert_eq!(doc.blocks()[0].children().len(), 2);
        assert!(doc.blocks()[0].children()[1].bold);
    }

    #[test]
    fn rejects_non_array_root() {
        let err = decode(r#"{"type":"paragraph","children":[]}"#).unwrap_err();
        assert!(matches!(err, NoteError::Decode { .. }));
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(matches!(decode("not json"), Err(NoteError::Decode { .. })));
        assert!(matches!(decode("[] trailing"), Err(NoteError::Decode { .. })));
    }

    #[test]
    fn reports_path_of_bad_field() {
        let err = decode(r#"[{"type":"paragraph","children":[{"text":1}]}]"#).unwrap_err();
        match err {
            NoteError::Decode { path, .. } => assert!(path.starts_with("[0]"), "path: {path}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_block_type() {
        let err = decode(r#"[{"type":"table","children":[{"text":""}]}]"#).unwrap_err();
        assert!(matches!(err, NoteError::Decode { .. }));
    }

    #[test]
    fn empty_array_is_malformed() {
        assert!(matches!(decode("[]"), Err(NoteError::MalformedNode { .. })));
    }

    #[test]
    fn decode_value_accepts_parsed_json() {
        let value = serde_json::json!([{ "type": "heading", "children": [{ "text": "Plan" }] }]);
        let doc = decode_value(value).unwrap();
        assert_eq!(doc.plain_text(), "Plan");
    }
}
