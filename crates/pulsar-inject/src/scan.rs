//! Locating `{@inject: ...}` directives in text.
//!
//! Two forms are recognized:
//!
//! - General: `{@inject: <prefix>:<name>:<path>}`
//! - Endpoint: `{@inject: endpoint|<method>|<path>[|<suffix>]}`
//!
//! No part of a directive may contain `}`. One optional whitespace character
//! may follow `{@inject:`. A general directive splits its body greedily: the
//! prefix is the longest run that still leaves `:<name>:<path>`, then the name
//! is the longest run that still leaves a non-empty path. The prefix never
//! covers a position where `endpoint` starts.
//!
//! General directives are found first over the whole text. Endpoint
//! directives are then looked for only in the text between them, so a general
//! directive nested in a broken endpoint one still resolves.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::resolve::{EndpointRef, resolve_general};
use crate::{LinkBases, ResolvedLink};

/// Candidate directive: everything from `{@inject:` to the first `}`.
static CANDIDATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{@inject:([^}]*)\}").unwrap());

const ENDPOINT_KEYWORD: &str = "endpoint";

/// A parsed inject directive, borrowing from the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive<'a> {
    /// `{@inject: <prefix>:<name>:<path>}`
    General {
        prefix: &'a str,
        name: &'a str,
        path: &'a str,
    },
    /// `{@inject: endpoint|<info>}`
    Endpoint { info: &'a str },
}

impl<'a> Directive<'a> {
    /// Parse a complete directive such as `{@inject: github:README:README.md}`.
    ///
    /// Surrounding whitespace is ignored. Returns `None` unless the whole
    /// string is exactly one directive.
    ///
    /// # Example
    ///
    /// ```
    /// use pulsar_inject::Directive;
    ///
    /// let directive = Directive::parse("{@inject: endpoint|GET|/admin/v2/clusters}");
    /// assert_eq!(directive, Some(Directive::Endpoint { info: "GET|/admin/v2/clusters" }));
    /// ```
    #[must_use]
    pub fn parse(raw: &'a str) -> Option<Self> {
        let body = raw
            .trim()
            .strip_prefix("{@inject:")?
            .strip_suffix('}')?;
        if body.contains('}') {
            return None;
        }
        Self::parse_body(body)
    }

    /// Parse the text between `{@inject:` and the closing `}`.
    #[must_use]
    pub fn parse_body(body: &'a str) -> Option<Self> {
        Self::parse_general(body).or_else(|| Self::parse_endpoint(body))
    }

    fn parse_general(body: &'a str) -> Option<Self> {
        let (prefix, name, path) = body_variants(body).find_map(split_general)?;
        Some(Self::General { prefix, name, path })
    }

    fn parse_endpoint(body: &'a str) -> Option<Self> {
        body_variants(body)
            .find_map(|variant| {
                variant
                    .strip_prefix(ENDPOINT_KEYWORD)?
                    .strip_prefix('|')
                    .filter(|info| !info.is_empty())
            })
            .map(|info| Self::Endpoint { info })
    }

    /// Resolve the directive into a link.
    #[must_use]
    pub fn resolve(&self, bases: &LinkBases) -> ResolvedLink {
        match *self {
            Self::General { prefix, name, path } => resolve_general(bases, prefix, name, path),
            Self::Endpoint { info } => EndpointRef::parse(info).resolve(bases),
        }
    }
}

/// Body with its optional leading whitespace character consumed, then as-is.
fn body_variants(body: &str) -> impl Iterator<Item = &str> {
    let trimmed = body
        .chars()
        .next()
        .filter(|c| c.is_whitespace())
        .map(|c| &body[c.len_utf8()..]);
    trimmed.into_iter().chain(std::iter::once(body))
}

/// Split `<prefix>:<name>:<path>`, all parts non-empty.
fn split_general(body: &str) -> Option<(&str, &str, &str)> {
    let prefix_limit = body.find(ENDPOINT_KEYWORD).unwrap_or(body.len());

    body.match_indices(':')
        .rev()
        .map(|(i, _)| i)
        .filter(|&i| i > 0 && i <= prefix_limit)
        .find_map(|i| {
            let rest = &body[i + 1..];
            let j = rest
                .match_indices(':')
                .rev()
                .map(|(j, _)| j)
                .find(|&j| j > 0 && j + 1 < rest.len())?;
            Some((&body[..i], &rest[..j], &rest[j + 1..]))
        })
}

/// A directive found in text, with its byte range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveMatch<'t> {
    /// Byte range of the whole directive, braces included.
    pub range: Range<usize>,
    /// The parsed directive.
    pub directive: Directive<'t>,
}

/// Iterator over the directives in a string, in text order.
///
/// Created by [`directives`].
#[derive(Debug, Clone)]
pub struct Directives<'t> {
    found: std::vec::IntoIter<DirectiveMatch<'t>>,
}

impl<'t> Iterator for Directives<'t> {
    type Item = DirectiveMatch<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        self.found.next()
    }
}

/// Leftmost matches of one directive form within `text[range]`.
struct FormMatches<'t> {
    text: &'t str,
    pos: usize,
    end: usize,
    parse: fn(&'t str) -> Option<Directive<'t>>,
}

impl<'t> FormMatches<'t> {
    fn new(
        text: &'t str,
        range: Range<usize>,
        parse: fn(&'t str) -> Option<Directive<'t>>,
    ) -> Self {
        Self {
            text,
            pos: range.start,
            end: range.end,
            parse,
        }
    }
}

impl<'t> Iterator for FormMatches<'t> {
    type Item = DirectiveMatch<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        // Matches must not reach past the segment, so search the slice only.
        let text: &'t str = self.text;
        let segment = &text[..self.end];

        while self.pos < segment.len() {
            let candidate = CANDIDATE_RE.captures_at(segment, self.pos)?;
            let whole = candidate.get(0)?;
            let body = candidate.get(1).map_or("", |m| m.as_str());

            if let Some(directive) = (self.parse)(body) {
                self.pos = whole.end();
                return Some(DirectiveMatch {
                    range: whole.range(),
                    directive,
                });
            }

            // `{` is a single byte, so the next byte is a char boundary.
            self.pos = whole.start() + 1;
        }
        None
    }
}

/// Find every directive in `text`.
///
/// General directives are matched over the whole text, then endpoint
/// directives in the gaps between them. A `{@inject:` that matches neither
/// form is skipped, and scanning resumes right after its opening brace.
///
/// # Example
///
/// ```
/// use pulsar_inject::{Directive, directives};
///
/// let text = "See {@inject: javadoc:Reader:/client/Reader.html} for details.";
/// let found: Vec<_> = directives(text).collect();
/// assert_eq!(found.len(), 1);
/// assert_eq!(found[0].range, 4..49);
/// assert!(matches!(found[0].directive, Directive::General { prefix: "javadoc", .. }));
/// ```
#[must_use]
pub fn directives(text: &str) -> Directives<'_> {
    let mut found = Vec::new();
    let mut cursor = 0;

    for general in FormMatches::new(text, 0..text.len(), Directive::parse_general) {
        found.extend(FormMatches::new(
            text,
            cursor..general.range.start,
            Directive::parse_endpoint,
        ));
        cursor = general.range.end;
        found.push(general);
    }
    found.extend(FormMatches::new(
        text,
        cursor..text.len(),
        Directive::parse_endpoint,
    ));

    Directives {
        found: found.into_iter(),
    }
}
