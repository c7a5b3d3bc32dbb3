//! HTML rendering of documents for read-only display and export.
//!
//! Every active mark on a run is applied, nested in a fixed order so the same run always
//! renders the same way: `<strong>` innermost, then `<em>`, `<u>` and `<code>`.

use crate::document::node::{BlockKind, Document, DocumentNode, InlineRun};

/// Renders a document to an HTML fragment, one element per block.
pub fn render_html(document: &Document) -> String {
    document
        .blocks()
        .iter()
        .map(render_block)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_block(block: &DocumentNode) -> String {
    let inner: String = block.children().iter().map(render_run).collect();
    match block.kind() {
        BlockKind::Paragraph => format!("<p>{inner}</p>"),
        BlockKind::Heading => format!("<h1>{inner}</h1>"),
        BlockKind::CodeBlock => format!("<pre><code>{inner}</code></pre>"),
    }
}

fn render_run(run: &InlineRun) -> String {
    if run.text.is_empty() {
        return String::new();
    }
    let mut out = escape_html(&run.text);
    if run.bold {
        out = format!("<strong>{out}</strong>");
    }
    if run.italic {
        out = format!("<em>{out}</em>");
    }
    if run.underline {
        out = format!("<u>{out}</u>");
    }
    if run.code {
        out = format!("<code>{out}</code>");
    }
    out
}

/// Escapes the five HTML-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::node::{Mark, Marks};

    #[test]
    fn renders_block_kinds() {
        let doc = Document::new(vec![
            DocumentNode::with_text(BlockKind::Heading, "History"),
            DocumentNode::with_text(BlockKind::Paragraph, "Cough"),
            DocumentNode::with_text(BlockKind::CodeBlock, "x = 1"),
        ])
        .unwrap();
        assert_eq!(
            render_html(&doc),
            "<h1>History</h1>\n<p>Cough</p>\n<pre><code>x = 1</code></pre>"
        );
    }

    #[test]
    fn applies_all_active_marks() {
        let marks = Mark::ALL
            .into_iter()
            .fold(Marks::default(), |acc, mark| acc.with(mark, true));
        let doc = Document::new(vec![DocumentNode::new(
            BlockKind::Paragraph,
            vec![InlineRun::marked("x", marks)],
        )])
        .unwrap();
        assert_eq!(
            render_html(&doc),
            "<p><code><u><em><strong>x</strong></em></u></code></p>"
        );
    }

    #[test]
    fn escapes_text() {
        assert_eq!(escape_html("a<b & \"c\"'"), "a&lt;b &amp; &quot;c&quot;&#39;");
    }

    #[test]
    fn empty_document_renders_empty_paragraph() {
        assert_eq!(render_html(&Document::empty()), "<p></p>");
    }
}
