//! Resolution of parsed directives into links.
//!
//! Both resolvers are total: any input, however malformed, yields a
//! [`ResolvedLink`]. A typo in a directive must never break a docs build.

use std::fmt;

use crate::LinkBases;

/// API version used when an endpoint directive doesn't pin one.
pub const SENTINEL_VERSION: &str = "master";

/// Marker separating the fragment from an explicit version in endpoint suffixes.
const VERSION_MARKER: &str = "?version=";

/// A resolved hyperlink, ready to be emitted in place of a directive.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ResolvedLink {
    /// Link target (absolute URL or a literal path).
    pub link: String,
    /// Display label.
    pub text: String,
}

impl ResolvedLink {
    /// Render as an inline markdown link.
    ///
    /// Brackets in the label are escaped. Line breaks in the destination are
    /// percent-encoded, and destinations that CommonMark would not accept bare
    /// (empty, whitespace, parentheses) are wrapped in `<...>`.
    ///
    /// # Example
    ///
    /// ```
    /// use pulsar_inject::ResolvedLink;
    ///
    /// let link = ResolvedLink { link: "/docs".to_owned(), text: "Docs".to_owned() };
    /// assert_eq!(link.to_markdown(), "[Docs](/docs)");
    /// ```
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let text = self.text.replace('[', "\\[").replace(']', "\\]");
        let link = self.link.replace('\r', "%0D").replace('\n', "%0A");
        let needs_angle = link.is_empty()
            || link
                .chars()
                .any(|c| c.is_whitespace() || c == '(' || c == ')');

        if needs_angle {
            let link = link.replace('<', "%3C").replace('>', "%3E");
            format!("[{text}](<{link}>)")
        } else {
            format!("[{text}]({link})")
        }
    }
}

impl fmt::Display for ResolvedLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_markdown())
    }
}

/// Documentation domain selected by a general directive's prefix.
///
/// Matching is case-sensitive; anything unrecognized is kept in [`Other`](Self::Other).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prefix<'a> {
    Javadoc,
    Github,
    Rest,
    Functions,
    Source,
    Sink,
    Packages,
    Other(&'a str),
}

impl<'a> Prefix<'a> {
    /// Classify a raw prefix string.
    #[must_use]
    pub fn parse(raw: &'a str) -> Self {
        match raw {
            "javadoc" => Self::Javadoc,
            "github" => Self::Github,
            "rest" => Self::Rest,
            "functions" => Self::Functions,
            "source" => Self::Source,
            "sink" => Self::Sink,
            "packages" => Self::Packages,
            other => Self::Other(other),
        }
    }

    /// Whether the prefix is one of the known documentation domains.
    #[must_use]
    pub fn is_known(self) -> bool {
        !matches!(self, Self::Other(_))
    }

    fn rule<'b>(self, bases: &'b LinkBases) -> LinkRule<'b> {
        match self {
            Self::Javadoc => LinkRule::Concat(&bases.javadoc),
            Self::Github => LinkRule::Tree(&bases.github),
            Self::Rest => LinkRule::Anchor(&bases.rest),
            Self::Functions => LinkRule::Anchor(&bases.functions),
            Self::Source => LinkRule::Anchor(&bases.source),
            Self::Sink => LinkRule::Anchor(&bases.sink),
            Self::Packages => LinkRule::Anchor(&bases.packages),
            Self::Other(_) => LinkRule::Literal,
        }
    }
}

/// How a general directive's path is combined with its base URL.
enum LinkRule<'b> {
    /// `{base}{path}`
    Concat(&'b str),
    /// `{base}/tree/master/{path}`
    Tree(&'b str),
    /// `{base}#{path}`
    Anchor(&'b str),
    /// `{path}`
    Literal,
}

impl LinkRule<'_> {
    fn compose(&self, path: &str) -> String {
        match self {
            Self::Concat(base) => format!("{base}{path}"),
            Self::Tree(base) => format!("{base}/tree/master/{path}"),
            Self::Anchor(base) => format!("{base}#{path}"),
            Self::Literal => path.to_owned(),
        }
    }
}

/// Resolve a general directive: `{@inject: <prefix>:<name>:<path>}`.
///
/// # Example
///
/// ```
/// use pulsar_inject::{LinkBases, resolve_general};
///
/// let bases = LinkBases::default();
/// let link = resolve_general(&bases, "rest", "Topics", "operation/getList");
/// assert_eq!(link.link, "https://pulsar.apache.org/admin-rest-api#operation/getList");
/// assert_eq!(link.text, "Topics");
/// ```
#[must_use]
pub fn resolve_general(bases: &LinkBases, prefix: &str, name: &str, path: &str) -> ResolvedLink {
    ResolvedLink {
        link: Prefix::parse(prefix).rule(bases).compose(path),
        text: name.to_owned(),
    }
}

/// REST API family selected by the fourth path segment of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiCategory {
    /// Anything not listed below: the admin REST API.
    Admin,
    Functions,
    Source,
    Sink,
    Packages,
    Transactions,
    Lookup,
}

impl ApiCategory {
    /// Classify a path segment. Unknown or missing segments map to [`Admin`](Self::Admin).
    #[must_use]
    pub fn parse(segment: Option<&str>) -> Self {
        match segment {
            Some("functions") => Self::Functions,
            Some("source") => Self::Source,
            Some("sink") => Self::Sink,
            Some("packages") => Self::Packages,
            Some("transactions") => Self::Transactions,
            Some("lookup") => Self::Lookup,
            _ => Self::Admin,
        }
    }

    /// Base URL of this API's reference docs.
    #[must_use]
    pub fn base(self, bases: &LinkBases) -> &str {
        match self {
            Self::Admin => &bases.rest,
            Self::Functions => &bases.functions,
            Self::Source => &bases.source,
            Self::Sink => &bases.sink,
            Self::Packages => &bases.packages,
            Self::Transactions => &bases.transactions,
            Self::Lookup => &bases.lookup,
        }
    }
}

/// Parsed body of an endpoint directive: `<method>|<path>[|<suffix>]`.
///
/// Missing segments stay `None` so callers can tell them apart from empty ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointRef<'a> {
    /// HTTP method, always present (possibly empty).
    pub method: &'a str,
    /// REST path, e.g. `/admin/v2/persistent/{tenant}`.
    pub path: Option<&'a str>,
    /// Display suffix, possibly carrying `?version=<v>`.
    pub suffix: Option<&'a str>,
}

impl<'a> EndpointRef<'a> {
    /// Split an endpoint body on `|`. Segments past the third are ignored.
    #[must_use]
    pub fn parse(info: &'a str) -> Self {
        let mut parts = info.split('|');
        Self {
            method: parts.next().unwrap_or_default(),
            path: parts.next(),
            suffix: parts.next(),
        }
    }

    /// Path segment naming the API version (`v2` in `/admin/v2/...`).
    #[must_use]
    pub fn api_version(&self) -> Option<&'a str> {
        self.path?.split('/').nth(2)
    }

    /// API family selected by the path.
    #[must_use]
    pub fn category(&self) -> ApiCategory {
        ApiCategory::parse(self.path.and_then(|p| p.split('/').nth(3)))
    }

    /// Suffix used for the fragment. An empty or missing suffix falls back to the path.
    #[must_use]
    pub fn effective_suffix(&self) -> Option<&'a str> {
        self.suffix.filter(|s| !s.is_empty()).or(self.path)
    }

    /// Split the effective suffix into `(fragment, explicit version)`.
    #[must_use]
    pub fn fragment_and_version(&self) -> (&'a str, Option<&'a str>) {
        let suffix = self.effective_suffix().unwrap_or_default();
        match suffix.split_once(VERSION_MARKER) {
            Some((fragment, rest)) => {
                let version = rest.split(VERSION_MARKER).next().unwrap_or_default();
                (fragment, Some(version))
            }
            None => (suffix, None),
        }
    }

    /// Build the link for this endpoint.
    #[must_use]
    pub fn resolve(&self, bases: &LinkBases) -> ResolvedLink {
        let base = self.category().base(bases);
        let api_version = self.api_version().unwrap_or_default();
        let (fragment, version) = self.fragment_and_version();
        let version = version.unwrap_or(SENTINEL_VERSION);
        let path = self.path.unwrap_or_default();

        ResolvedLink {
            link: format!("{base}?version={version}&apiversion={api_version}#{fragment}"),
            text: format!("{} {path}", self.method),
        }
    }
}

/// Resolve an endpoint directive body: `<method>|<path>[|<suffix>]`.
///
/// # Example
///
/// ```
/// use pulsar_inject::{LinkBases, resolve_endpoint};
///
/// let bases = LinkBases::default();
/// let link = resolve_endpoint(&bases, "GET|/admin/v2/persistent/tenant|listTopics");
/// assert_eq!(link.text, "GET /admin/v2/persistent/tenant");
/// assert_eq!(
///     link.link,
///     "https://pulsar.apache.org/admin-rest-api?version=master&apiversion=v2#listTopics"
/// );
/// ```
#[must_use]
pub fn resolve_endpoint(bases: &LinkBases, info: &str) -> ResolvedLink {
    EndpointRef::parse(info).resolve(bases)
}
