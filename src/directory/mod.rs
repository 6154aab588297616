//! Directory resolution: (hostname, target name) to broker identifiers.
//!
//! [`DirectoryResolver`] walks target → host source → host in the order the
//! broker lists them and returns the first host whose name matches. Point
//! lookups are memoized for the lifetime of the resolver; hosts, host sets and
//! targets are treated as immutable for one invocation.
//!
//! Every request carries the resolver's current credential. A 401 or 403 is
//! answered with exactly one re-authenticate-and-retry through
//! [`CredentialManager`](crate::auth::CredentialManager); a second rejection is
//! an error.

mod error;
mod memo;
mod resolver;

pub use error::ResolutionError;
pub use memo::Memo;
pub use resolver::{DirectoryResolver, Resolution};
