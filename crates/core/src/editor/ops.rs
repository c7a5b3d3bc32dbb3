//! Run-level tree operations used by the editor session.
//!
//! All offsets are character offsets into the concatenated text of one block.

use crate::document::{InlineRun, Mark, Marks};

fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(index, _)| index)
        .unwrap_or(text.len())
}

/// Ensures a run boundary at `offset` and returns the index of the first run starting there.
pub(crate) fn split_at(children: &mut Vec<InlineRun>, offset: usize) -> usize {
    let mut pos = 0;
    for index in 0..children.len() {
        if offset == pos {
            return index;
        }
        let len = children[index].char_len();
        if offset < pos + len {
            let byte = byte_offset(&children[index].text, offset - pos);
            let tail = children[index].text.split_off(byte);
            let right = InlineRun::marked(tail, children[index].marks());
            children.insert(index + 1, right);
            return index + 1;
        }
        pos += len;
    }
    children.len()
}

/// Removes and returns the runs covering `[from, to)`.
pub(crate) fn cut(children: &mut Vec<InlineRun>, from: usize, to: usize) -> Vec<InlineRun> {
    let start = split_at(children, from);
    let end = split_at(children, to);
    children.drain(start..end).collect()
}

/// Inserts `text` carrying `marks` at `offset`.
pub(crate) fn insert(children: &mut Vec<InlineRun>, offset: usize, text: &str, marks: Marks) {
    if text.is_empty() {
        return;
    }
    let index = split_at(children, offset);
    children.insert(index, InlineRun::marked(text, marks));
    normalize(children);
}

/// Sets or clears `mark` on every run inside `[from, to)`.
pub(crate) fn apply_mark(
    children: &mut Vec<InlineRun>,
    from: usize,
    to: usize,
    mark: Mark,
    on: bool,
) {
    if from >= to {
        return;
    }
    let start = split_at(children, from);
    let end = split_at(children, to);
    for run in &mut children[start..end] {
        let marks = run.marks().with(mark, on);
        run.set_marks(marks);
    }
    normalize(children);
}

/// Non-empty runs overlapping `[from, to)`.
pub(crate) fn runs_in_range(children: &[InlineRun], from: usize, to: usize) -> Vec<&InlineRun> {
    let mut pos = 0;
    let mut out = Vec::new();
    for run in children {
        let len = run.char_len();
        if len > 0 && pos < to && pos + len > from {
            out.push(run);
        }
        pos += len;
    }
    out
}

/// Marks of the character before `offset`, or of the first run at offset 0.
pub(crate) fn marks_before(children: &[InlineRun], offset: usize) -> Marks {
    if offset == 0 {
        return children.first().map(InlineRun::marks).unwrap_or_default();
    }
    let mut pos = 0;
    for run in children {
        let len = run.char_len();
        if offset - 1 < pos + len {
            return run.marks();
        }
        pos += len;
    }
    children.last().map(InlineRun::marks).unwrap_or_default()
}

/// Merges adjacent runs with identical marks and drops empty runs.
///
/// A block whose runs are all empty keeps a single unmarked empty run.
pub(crate) fn normalize(children: &mut Vec<InlineRun>) {
    let mut merged: Vec<InlineRun> = Vec::with_capacity(children.len());
    for run in children.drain(..) {
        if run.text.is_empty() {
            continue;
        }
        match merged.last_mut() {
            Some(last) if last.marks() == run.marks() => last.text.push_str(&run.text),
            _ => merged.push(run),
        }
    }
    if merged.is_empty() {
        merged.push(InlineRun::plain(""));
    }
    *children = merged;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bold() -> Marks {
        Marks::default().with(Mark::Bold, true)
    }

    #[test]
    fn split_at_inside_run_creates_boundary() {
        let mut runs = vec![InlineRun::marked("abcd", bold())];
        assert_eq!(split_at(&mut runs, 2), 1);
        assert_eq!(
            runs,
            vec![InlineRun::marked("ab", bold()), InlineRun::marked("cd", bold())]
        );
    }

    #[test]
    fn split_at_existing_boundary_is_noop() {
        let mut runs = vec![InlineRun::plain("ab"), InlineRun::marked("cd", bold())];
        assert_eq!(split_at(&mut runs, 2), 1);
        assert_eq!(split_at(&mut runs, 0), 0);
        assert_eq!(split_at(&mut runs, 4), 2);
        assert_eq!(runs.len(), 2);
    }

    #[test]
    fn split_at_respects_multibyte_characters() {
        let mut runs = vec![InlineRun::plain("ação")];
        split_at(&mut runs, 2);
        assert_eq!(runs[0].text, "aç");
        assert_eq!(runs[1].text, "ão");
    }

    #[test]
    fn cut_returns_removed_runs() {
        let mut runs = vec![InlineRun::plain("abc"), InlineRun::marked("def", bold())];
        let removed = cut(&mut runs, 2, 4);
        assert_eq!(
            removed,
            vec![InlineRun::plain("c"), InlineRun::marked("d", bold())]
        );
        normalize(&mut runs);
        assert_eq!(
            runs,
            vec![InlineRun::plain("ab"), InlineRun::marked("ef", bold())]
        );
    }

    #[test]
    fn normalize_merges_and_keeps_one_run() {
        let mut runs = vec![
            InlineRun::plain("a"),
            InlineRun::plain(""),
            InlineRun::plain("b"),
            InlineRun::marked("c", bold()),
        ];
        normalize(&mut runs);
        assert_eq!(
            runs,
            vec![InlineRun::plain("ab"), InlineRun::marked("c", bold())]
        );

        let mut empty = vec![InlineRun::marked("", bold())];
        normalize(&mut empty);
        assert_eq!(empty, vec![InlineRun::plain("")]);
    }

    #[test]
    fn marks_before_uses_preceding_character() {
        let runs = vec![InlineRun::plain("ab"), InlineRun::marked("cd", bold())];
        assert_eq!(marks_before(&runs, 0), Marks::default());
        assert_eq!(marks_before(&runs, 2), Marks::default());
        assert_eq!(marks_before(&runs, 3), bold());
        assert_eq!(marks_before(&runs, 4), bold());
    }

    #[test]
    fn runs_in_range_skips_empty_and_outside_runs() {
        let runs = vec![
            InlineRun::plain("ab"),
            InlineRun::plain(""),
            InlineRun::marked("cd", bold()),
        ];
        assert_eq!(runs_in_range(&runs, 0, 2).len(), 1);
        assert_eq!(runs_in_range(&runs, 1, 3).len(), 2);
        assert!(runs_in_range(&runs, 2, 2).is_empty());
    }
}
