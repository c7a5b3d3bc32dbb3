//! Clinical note document model.
//!
//! - [`node`]: the block/run tree and its invariants
//! - [`projection`]: plain-text projection stored alongside the structured note
//! - [`codec`]: JSON encoding of the tree as a single string field
//! - [`render`]: HTML rendering for read-only display

pub mod codec;
pub mod node;
pub mod projection;
pub mod render;

pub use codec::{decode, decode_value, encode};
pub use node::{BlockKind, Document, DocumentNode, InlineRun, Mark, Marks};
pub use projection::{project, project_value};
pub use render::render_html;
