//! Markdown structure that decides where directives are rewritten.
//!
//! Directives are only expanded in prose. Lines are classified one at a time
//! so the rewriter can gather paragraphs, and inline code spans are masked
//! within a paragraph.

use std::ops::Range;

/// Role of a single markdown line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineKind {
    /// Fence marker or fenced content.
    Code,
    /// Empty or whitespace only; ends a paragraph.
    Blank,
    /// ATX heading, a block on its own.
    Heading,
    /// Paragraph text, continued by the next prose line.
    Prose,
}

/// An open code fence.
#[derive(Debug, Clone, Copy)]
struct Fence {
    marker: u8,
    len: usize,
}

/// Classifies lines in document order, remembering open code fences.
#[derive(Debug, Default)]
pub(crate) struct LineClassifier {
    fence: Option<Fence>,
}

impl LineClassifier {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn classify(&mut self, line: &str) -> LineKind {
        if let Some(fence) = self.fence {
            if closes_fence(line, fence) {
                self.fence = None;
            }
            return LineKind::Code;
        }

        if let Some(fence) = opening_fence(line) {
            self.fence = Some(fence);
            LineKind::Code
        } else if line.trim().is_empty() {
            LineKind::Blank
        } else if is_atx_heading(line) {
            LineKind::Heading
        } else {
            LineKind::Prose
        }
    }
}

/// Strip up to three leading spaces; more makes an indented code line.
fn block_start(line: &str) -> Option<&str> {
    let indent = line.bytes().take_while(|&b| b == b' ').count();
    (indent <= 3).then(|| &line[indent..])
}

fn marker_run(text: &str) -> Option<(u8, usize)> {
    let marker = *text.as_bytes().first()?;
    let len = text.bytes().take_while(|&b| b == marker).count();
    Some((marker, len))
}

fn opening_fence(line: &str) -> Option<Fence> {
    let text = block_start(line)?;
    let (marker, len) = marker_run(text)?;
    if !matches!(marker, b'`' | b'~') || len < 3 {
        return None;
    }
    // A backtick info string can't contain backticks (```a`b``` is inline code).
    if marker == b'`' && text[len..].contains('`') {
        return None;
    }
    Some(Fence { marker, len })
}

fn closes_fence(line: &str, fence: Fence) -> bool {
    let Some(text) = block_start(line) else {
        return false;
    };
    marker_run(text).is_some_and(|(marker, len)| {
        marker == fence.marker && len >= fence.len && text[len..].trim().is_empty()
    })
}

fn is_atx_heading(line: &str) -> bool {
    let Some(text) = block_start(line) else {
        return false;
    };
    let hashes = text.bytes().take_while(|&b| b == b'#').count();
    (1..=6).contains(&hashes)
        && text[hashes..]
            .chars()
            .next()
            .is_none_or(|c| c == ' ' || c == '\t')
}

/// Byte ranges of inline code spans in a block, backticks included.
///
/// A span opens with a run of N backticks and closes at the next run of
/// exactly N backticks. An opening run with no match is literal text.
pub(crate) fn code_spans(text: &str) -> Vec<Range<usize>> {
    let runs = backtick_runs(text);
    let mut spans = Vec::new();
    let mut idx = 0;

    while idx < runs.len() {
        let open = &runs[idx];
        let open_len = open.len();
        let close = runs[idx + 1..]
            .iter()
            .position(|run| run.len() == open_len)
            .map(|offset| idx + 1 + offset);

        match close {
            Some(close_idx) => {
                spans.push(open.start..runs[close_idx].end);
                idx = close_idx + 1;
            }
            None => idx += 1,
        }
    }

    spans
}

fn backtick_runs(line: &str) -> Vec<Range<usize>> {
    let bytes = line.as_bytes();
    let mut runs = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos] == b'`' {
            let start = pos;
            while pos < bytes.len() && bytes[pos] == b'`' {
                pos += 1;
            }
            runs.push(start..pos);
        } else {
            pos += 1;
        }
    }

    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(lines: &[&str]) -> Vec<LineKind> {
        let mut classifier = LineClassifier::new();
        lines.iter().map(|line| classifier.classify(line)).collect()
    }

    #[test]
    fn test_backtick_fence() {
        assert_eq!(
            kinds(&["```java", "{@inject: rest:a:b}", "```", "text"]),
            vec![LineKind::Code, LineKind::Code, LineKind::Code, LineKind::Prose]
        );
    }

    #[test]
    fn test_tilde_fence_not_closed_by_backticks() {
        assert_eq!(
            kinds(&["~~~", "```", "~~~~", "text"]),
            vec![LineKind::Code, LineKind::Code, LineKind::Code, LineKind::Prose]
        );
    }

    #[test]
    fn test_shorter_or_annotated_fence_does_not_close() {
        assert_eq!(
            kinds(&["````", "```", "```shell", "  ````  ", "text"]),
            vec![
                LineKind::Code,
                LineKind::Code,
                LineKind::Code,
                LineKind::Code,
                LineKind::Prose,
            ]
        );
    }

    #[test]
    fn test_inline_backticks_are_not_fences() {
        assert_eq!(
            kinds(&["``inline code``", "```a`b``` text", "after"]),
            vec![LineKind::Prose, LineKind::Prose, LineKind::Prose]
        );
    }

    #[test]
    fn test_deeply_indented_backticks_are_not_fences() {
        assert_eq!(
            kinds(&["    ```", "text"]),
            vec![LineKind::Prose, LineKind::Prose]
        );
    }

    #[test]
    fn test_blank_and_heading_lines() {
        assert_eq!(
            kinds(&["# Title", "", "   ", "###### Six", "####### Seven", "#hashtag", "##"]),
            vec![
                LineKind::Heading,
                LineKind::Blank,
                LineKind::Blank,
                LineKind::Heading,
                LineKind::Prose,
                LineKind::Prose,
                LineKind::Heading,
            ]
        );
    }

    #[test]
    fn test_code_spans() {
        let line = "a `b` c ``d ` e`` f";
        let spans = code_spans(line);

        assert_eq!(spans.len(), 2);
        assert_eq!(&line[spans[0].clone()], "`b`");
        assert_eq!(&line[spans[1].clone()], "``d ` e``");
    }

    #[test]
    fn test_code_span_across_lines() {
        let text = "a `b\nc` d";
        assert_eq!(code_spans(text), vec![2..7]);
    }

    #[test]
    fn test_unmatched_backtick_is_literal() {
        assert!(code_spans("it`s fine").is_empty());
        assert_eq!(code_spans("`` `x` ").len(), 1);
    }
}
