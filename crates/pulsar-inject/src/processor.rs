//! Markdown preprocessing that replaces directives with links.

use std::iter::Sum;
use std::ops::{AddAssign, Range};

use crate::code::{LineClassifier, LineKind, code_spans};
use crate::resolve::{EndpointRef, Prefix};
use crate::scan::{Directive, directives};
use crate::LinkBases;

/// Counters collected while rewriting a document.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InjectStats {
    /// General (`prefix:name:path`) directives rewritten.
    pub general: usize,
    /// Endpoint directives rewritten.
    pub endpoint: usize,
    /// General directives whose prefix was unknown, linked to their literal path.
    pub literal_fallbacks: usize,
}

impl InjectStats {
    /// Total number of directives rewritten.
    #[must_use]
    pub fn total(&self) -> usize {
        self.general + self.endpoint
    }
}

impl AddAssign for InjectStats {
    fn add_assign(&mut self, rhs: Self) {
        self.general += rhs.general;
        self.endpoint += rhs.endpoint;
        self.literal_fallbacks += rhs.literal_fallbacks;
    }
}

impl Sum for InjectStats {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |mut acc, stats| {
            acc += stats;
            acc
        })
    }
}

/// Rewrites `{@inject: ...}` directives in markdown into inline links.
///
/// Directives are matched per paragraph, so one may wrap across a soft line
/// break. Fenced code blocks and inline code spans are copied unchanged. Line
/// endings (including `\r\n`) are preserved.
///
/// One processor handles one document; create a new one per file when
/// rewriting in parallel.
///
/// # Example
///
/// ```
/// use pulsar_inject::{InjectProcessor, LinkBases};
///
/// let bases = LinkBases::default();
/// let mut processor = InjectProcessor::new(&bases);
///
/// let output = processor.process("Use {@inject: github:the CLI:bin/pulsar}.\n");
/// assert_eq!(
///     output,
///     "Use [the CLI](https://github.com/apache/pulsar/tree/master/bin/pulsar).\n"
/// );
/// assert_eq!(processor.stats().general, 1);
/// ```
pub struct InjectProcessor<'b> {
    bases: &'b LinkBases,
    lines: LineClassifier,
    stats: InjectStats,
}

/// Paragraph gathered from consecutive prose lines.
struct PendingBlock {
    range: Range<usize>,
    first_line: usize,
}

impl<'b> InjectProcessor<'b> {
    /// Create a processor resolving against `bases`.
    #[must_use]
    pub fn new(bases: &'b LinkBases) -> Self {
        Self {
            bases,
            lines: LineClassifier::new(),
            stats: InjectStats::default(),
        }
    }

    /// Rewrite every directive in `input`.
    #[must_use]
    pub fn process(&mut self, input: &str) -> String {
        let mut output = String::with_capacity(input.len());
        let mut pending: Option<PendingBlock> = None;
        let mut offset = 0;

        for (idx, chunk) in input.split_inclusive('\n').enumerate() {
            let (line, _) = split_line_ending(chunk);
            let range = offset..offset + chunk.len();
            offset = range.end;

            match self.lines.classify(line) {
                LineKind::Prose => match &mut pending {
                    Some(block) => block.range.end = range.end,
                    None => {
                        pending = Some(PendingBlock {
                            range,
                            first_line: idx + 1,
                        });
                    }
                },
                LineKind::Heading => {
                    self.flush(input, pending.take(), &mut output);
                    self.rewrite_block(&input[range], idx + 1, &mut output);
                }
                LineKind::Code | LineKind::Blank => {
                    self.flush(input, pending.take(), &mut output);
                    output.push_str(chunk);
                }
            }
        }
        self.flush(input, pending, &mut output);

        output
    }

    /// Counters accumulated over every [`process`](Self::process) call.
    #[must_use]
    pub fn stats(&self) -> InjectStats {
        self.stats
    }

    fn flush(&mut self, input: &str, block: Option<PendingBlock>, output: &mut String) {
        if let Some(block) = block {
            self.rewrite_block(&input[block.range], block.first_line, output);
        }
    }

    fn rewrite_block(&mut self, block: &str, first_line: usize, output: &mut String) {
        if !block.contains("{@inject:") {
            output.push_str(block);
            return;
        }

        let mut cursor = 0;
        let mut line_num = first_line;
        for span in code_spans(block) {
            let prose = &block[cursor..span.start];
            self.rewrite_prose(prose, line_num, output);
            output.push_str(&block[span.clone()]);
            line_num += block[cursor..span.end].matches('\n').count();
            cursor = span.end;
        }
        self.rewrite_prose(&block[cursor..], line_num, output);
    }

    fn rewrite_prose(&mut self, text: &str, first_line: usize, output: &mut String) {
        let mut cursor = 0;

        for found in directives(text) {
            output.push_str(&text[cursor..found.range.start]);
            let line_num = first_line + text[..found.range.start].matches('\n').count();
            self.record(&found.directive, line_num);
            output.push_str(&found.directive.resolve(self.bases).to_markdown());
            cursor = found.range.end;
        }

        output.push_str(&text[cursor..]);
    }

    fn record(&mut self, directive: &Directive<'_>, line_num: usize) {
        match *directive {
            Directive::General { prefix, .. } => {
                self.stats.general += 1;
                if !Prefix::parse(prefix).is_known() {
                    self.stats.literal_fallbacks += 1;
                    tracing::debug!(
                        line = line_num,
                        prefix,
                        "Unknown inject prefix, linking to path as-is"
                    );
                }
            }
            Directive::Endpoint { info } => {
                self.stats.endpoint += 1;
                if EndpointRef::parse(info).path.is_none() {
                    tracing::debug!(line = line_num, info, "Endpoint directive has no path");
                }
            }
        }
    }
}

/// Split a chunk from `split_inclusive('\n')` into content and line ending.
fn split_line_ending(chunk: &str) -> (&str, &str) {
    let content_len = chunk
        .strip_suffix("\r\n")
        .or_else(|| chunk.strip_suffix('\n'))
        .map_or(chunk.len(), str::len);
    chunk.split_at(content_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rewrite(input: &str) -> (String, InjectStats) {
        let bases = LinkBases::default();
        let mut processor = InjectProcessor::new(&bases);
        let output = processor.process(input);
        (output, processor.stats())
    }

    #[test]
    fn test_rewrite_general() {
        let (output, stats) = rewrite("See {@inject: rest:Clusters:operation/getClusters}.");
        assert_eq!(
            output,
            "See [Clusters](https://pulsar.apache.org/admin-rest-api#operation/getClusters)."
        );
        assert_eq!(
            stats,
            InjectStats {
                general: 1,
                endpoint: 0,
                literal_fallbacks: 0,
            }
        );
    }

    #[test]
    fn test_rewrite_endpoint() {
        let (output, stats) =
            rewrite("Call {@inject: endpoint|PUT|/admin/v2/tenants/:tenant|createTenant}.");
        assert_eq!(
            output,
            "Call [PUT /admin/v2/tenants/:tenant](https://pulsar.apache.org/admin-rest-api?version=master&apiversion=v2#createTenant)."
        );
        assert_eq!(stats.endpoint, 1);
    }

    #[test]
    fn test_rewrite_unknown_prefix_counts_fallback() {
        let (output, stats) = rewrite("{@inject: docs:Guide:/docs/guide}");
        assert_eq!(output, "[Guide](/docs/guide)");
        assert_eq!(stats.literal_fallbacks, 1);
        assert_eq!(stats.total(), 1);
    }

    #[test]
    fn test_multiple_directives_on_one_line() {
        let (output, stats) = rewrite("{@inject: sink:A:a} and {@inject: source:B:b}");
        assert_eq!(
            output,
            "[A](https://pulsar.apache.org/sink-rest-api#a) and [B](https://pulsar.apache.org/source-rest-api#b)"
        );
        assert_eq!(stats.general, 2);
    }

    #[test]
    fn test_fenced_code_untouched() {
        let input = "```\n{@inject: rest:A:a}\n```\n{@inject: rest:B:b}\n";
        let (output, stats) = rewrite(input);
        assert_eq!(
            output,
            "```\n{@inject: rest:A:a}\n```\n[B](https://pulsar.apache.org/admin-rest-api#b)\n"
        );
        assert_eq!(stats.general, 1);
    }

    #[test]
    fn test_inline_code_untouched() {
        let (output, _) = rewrite("Write `{@inject: rest:A:a}` to get {@inject: rest:A:a}");
        assert_eq!(
            output,
            "Write `{@inject: rest:A:a}` to get [A](https://pulsar.apache.org/admin-rest-api#a)"
        );
    }

    #[test]
    fn test_line_endings_preserved() {
        let (output, _) = rewrite("a\r\n{@inject: rest:A:a}\r\n\nb");
        assert_eq!(
            output,
            "a\r\n[A](https://pulsar.apache.org/admin-rest-api#a)\r\n\nb"
        );
    }

    #[test]
    fn test_directive_across_soft_break() {
        let (output, stats) =
            rewrite("See {@inject: rest:List\nclusters:operation/getClusters} now.\n");
        assert_eq!(
            output,
            "See [List\nclusters](https://pulsar.apache.org/admin-rest-api#operation/getClusters) now.\n"
        );
        assert_eq!(stats.general, 1);
    }

    #[test]
    fn test_directive_not_joined_across_paragraphs() {
        let input = "{@inject: rest:A\n\nb:c}\n";
        let (output, stats) = rewrite(input);
        assert_eq!(output, input);
        assert_eq!(stats.total(), 0);
    }

    #[test]
    fn test_heading_is_its_own_block() {
        let input = "# {@inject: rest:A\nb:c}\n";
        let (output, stats) = rewrite(input);
        assert_eq!(output, input);
        assert_eq!(stats.total(), 0);

        let (output, _) = rewrite("## {@inject: rest:A:a}\nnext\n");
        assert_eq!(
            output,
            "## [A](https://pulsar.apache.org/admin-rest-api#a)\nnext\n"
        );
    }

    #[test]
    fn test_fence_ends_paragraph() {
        let input = "{@inject: rest:A\n```\nb:c}\n```\n";
        let (output, stats) = rewrite(input);
        assert_eq!(output, input);
        assert_eq!(stats.total(), 0);
    }

    #[test]
    fn test_general_nested_in_endpoint_candidate() {
        let (output, stats) = rewrite("{@inject: endpoint|GET|/x {@inject: rest:b:c}");
        assert_eq!(
            output,
            "{@inject: endpoint|GET|/x [b](https://pulsar.apache.org/admin-rest-api#c)"
        );
        assert_eq!(
            stats,
            InjectStats {
                general: 1,
                endpoint: 0,
                literal_fallbacks: 0,
            }
        );
    }

    #[test]
    fn test_no_directives_unchanged() {
        let input = "# Title\n\nPlain {text} with braces.\n";
        let (output, stats) = rewrite(input);
        assert_eq!(output, input);
        assert_eq!(stats, InjectStats::default());
    }

    #[test]
    fn test_invalid_directive_left_in_place() {
        let input = "{@inject: nothing-here}";
        let (output, stats) = rewrite(input);
        assert_eq!(output, input);
        assert_eq!(stats.total(), 0);
    }

    #[test]
    fn test_stats_sum() {
        let parts = [
            InjectStats {
                general: 1,
                endpoint: 2,
                literal_fallbacks: 0,
            },
            InjectStats {
                general: 3,
                endpoint: 0,
                literal_fallbacks: 1,
            },
        ];
        let total: InjectStats = parts.into_iter().sum();
        assert_eq!(
            total,
            InjectStats {
                general: 4,
                endpoint: 2,
                literal_fallbacks: 1,
            }
        );
    }

    #[test]
    fn test_split_line_ending() {
        assert_eq!(split_line_ending("abc\r\n"), ("abc", "\r\n"));
        assert_eq!(split_line_ending("abc\n"), ("abc", "\n"));
        assert_eq!(split_line_ending("abc"), ("abc", ""));
    }
}
