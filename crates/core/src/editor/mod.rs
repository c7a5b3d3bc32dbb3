//! Editing session over a clinical note document.

mod history;
mod ops;
pub mod selection;
pub mod session;

pub use selection::{Point, Selection};
pub use session::{ChangeListener, EditOutcome, EditorSession, SessionMode};
