//! CLI command implementations.

mod resolve;
mod rewrite;
mod versions;

pub(crate) use resolve::ResolveArgs;
pub(crate) use rewrite::RewriteArgs;
pub(crate) use versions::VersionsArgs;
