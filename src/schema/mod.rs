//! Data types shared by the scanner, injector and linker.

pub mod block;
pub mod declaration;
pub mod reference;
pub mod report;

pub use block::{Block, BlockKind};
pub use declaration::ExtResource;
pub use reference::{ReferenceExpr, ReferenceKind};
pub use report::{AnchorOutcome, DocumentReport, LinkSummary};
