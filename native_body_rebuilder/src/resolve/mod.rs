//! Cross-language call resolution: which native-library export does each
//! host call site target.

mod aliases;
mod callsites;

pub use aliases::{AliasTables, NamedAlias};
pub use callsites::{resolve_call_sites, InvokeKind, ResolvedCallSite, ResolvedCallSites};
