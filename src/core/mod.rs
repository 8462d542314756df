//! The patching engine: cache, resolver, document model, scanner, injector,
//! header fixup, and the linker that drives them.

pub mod cache;
pub mod config;
pub mod document;
pub mod header;
pub mod inject;
pub mod linker;
pub mod resolve;
pub mod scanner;
