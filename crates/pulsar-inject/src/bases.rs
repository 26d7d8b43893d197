//! Base URLs that inject directives resolve against.

/// Default public site URL.
pub const DEFAULT_SITE_URL: &str = "https://pulsar.apache.org";

/// Default source repository URL.
pub const DEFAULT_GITHUB_URL: &str = "https://github.com/apache/pulsar";

/// Base URLs for every documentation domain a directive can point at.
///
/// Built once at start-up and shared read-only by every resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkBases {
    /// Javadoc root. Paths are appended without a separator.
    pub javadoc: String,
    /// Source repository root (`/tree/master/` is inserted before paths).
    pub github: String,
    /// Admin REST API reference.
    pub rest: String,
    /// Functions REST API reference.
    pub functions: String,
    /// Source connectors REST API reference.
    pub source: String,
    /// Sink connectors REST API reference.
    pub sink: String,
    /// Packages REST API reference.
    pub packages: String,
    /// Transactions REST API reference.
    pub transactions: String,
    /// Topic lookup REST API reference.
    pub lookup: String,
}

impl Default for LinkBases {
    fn default() -> Self {
        Self::from_site_url(DEFAULT_SITE_URL, DEFAULT_GITHUB_URL)
    }
}

impl LinkBases {
    /// Derive every API base from the public site URL.
    ///
    /// A trailing slash on `site_url` is ignored.
    ///
    /// # Example
    ///
    /// ```
    /// use pulsar_inject::LinkBases;
    ///
    /// let bases = LinkBases::from_site_url("https://example.org/", "https://github.com/o/r");
    /// assert_eq!(bases.javadoc, "https://example.org/api");
    /// assert_eq!(bases.lookup, "https://example.org/lookup-rest-api");
    /// ```
    #[must_use]
    pub fn from_site_url(site_url: &str, github_url: &str) -> Self {
        let site = site_url.trim_end_matches('/');
        let under = |suffix: &str| format!("{site}{suffix}");

        Self {
            javadoc: under("/api"),
            github: github_url.to_owned(),
            rest: under("/admin-rest-api"),
            functions: under("/functions-rest-api"),
            source: under("/source-rest-api"),
            sink: under("/sink-rest-api"),
            packages: under("/packages-rest-api"),
            transactions: under("/transactions-rest-api"),
            lookup: under("/lookup-rest-api"),
        }
    }
}
