//! Resource Linker — text-level reference patching for serialized game data.
//!
//! Wires authored resource documents (affixes, skill trees, enemy templates)
//! to the dice resources they grant, by editing the documents' text directly:
//! a new external-reference declaration, a new field assignment, and a header
//! counter kept in step. Documents never pass through the host runtime's
//! loader, and a second run over the same files changes nothing.

pub mod core;
pub mod schema;

pub use crate::core::cache::TargetCache;
pub use crate::core::config::LinkerConfig;
pub use crate::core::linker::{LinkError, Linker};
pub use crate::schema::{DocumentReport, LinkSummary};
