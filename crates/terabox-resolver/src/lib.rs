//! TeraBox share-link resolution
//!
//! Turns a public share link into a direct, time-limited download URL plus
//! file metadata, by scraping ephemeral tokens from the share page and
//! calling the origin's listing API.

pub mod error;
pub mod extract;
pub mod resolver;
pub mod types;

pub use error::{ResolveError, Result};
pub use extract::find_between;
pub use resolver::ShareResolver;
pub use types::{human_size, ResolvedFile};
