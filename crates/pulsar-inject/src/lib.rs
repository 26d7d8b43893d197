//! Link injection for Pulsar documentation.
//!
//! Markdown sources reference API docs through inline directives:
//!
//! - `{@inject: <prefix>:<name>:<path>}` links into Javadoc, the source tree,
//!   or one of the REST API references, selected by `prefix`.
//! - `{@inject: endpoint|<method>|<path>[|<suffix>]}` links a REST endpoint
//!   into the versioned reference for its API family.
//!
//! # Architecture
//!
//! - [`scan`]: finds directives in text ([`directives`], [`Directive`]).
//! - [`resolve`]: turns directives into [`ResolvedLink`]s against a
//!   [`LinkBases`] configuration.
//! - [`InjectProcessor`]: rewrites a markdown document, leaving code alone.
//!
//! Resolution never fails. Unknown prefixes link to their path verbatim and
//! missing endpoint segments compose as empty strings.
//!
//! # Example
//!
//! ```
//! use pulsar_inject::{LinkBases, resolve_endpoint};
//!
//! let bases = LinkBases::default();
//! let link = resolve_endpoint(&bases, "POST|/admin/v3/functions/tenant/ns/fn");
//! assert_eq!(link.text, "POST /admin/v3/functions/tenant/ns/fn");
//! assert!(link.link.starts_with("https://pulsar.apache.org/functions-rest-api?version=master"));
//! ```

mod bases;
mod code;
mod processor;
pub mod resolve;
pub mod scan;

pub use bases::{DEFAULT_GITHUB_URL, DEFAULT_SITE_URL, LinkBases};
pub use processor::{InjectProcessor, InjectStats};
pub use resolve::{
    ApiCategory, EndpointRef, Prefix, ResolvedLink, SENTINEL_VERSION, resolve_endpoint,
    resolve_general,
};
pub use scan::{Directive, DirectiveMatch, Directives, directives};

/// Rewrite every directive in a markdown document.
///
/// Shorthand for a one-off [`InjectProcessor`].
#[must_use]
pub fn rewrite_markdown(input: &str, bases: &LinkBases) -> String {
    InjectProcessor::new(bases).process(input)
}
