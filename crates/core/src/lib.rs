//! # Clinic Core
//!
//! Core logic for clinical encounter notes.
//!
//! This crate contains pure data operations and file storage:
//! - The rich-text note tree, its plain-text projection, JSON encoding and HTML rendering
//! - An editing session with marks, block kinds, bounded undo/redo and change notification
//! - The encounter form flow that keeps `contentHtml`/`contentText` in step with the editor
//! - File-backed encounter storage under the configured data directory
//!
//! **No host concerns**: environment variables, logging setup and command-line handling belong
//! in `clinic-cli`. Configuration is resolved there and passed in as [`CoreConfig`].

pub mod config;
pub mod constants;
pub mod document;
pub mod editor;
pub mod encounter;
pub mod error;
pub mod validation;

pub use config::{CoreConfig, DecodePolicy};
pub use document::{BlockKind, Document, DocumentNode, InlineRun, Mark, Marks};
pub use editor::{EditOutcome, EditorSession, Point, Selection, SessionMode};
pub use encounter::form::{load_document, EncounterForm, LoadedDocument};
pub use encounter::store::{EncounterStore, FileEncounterStore};
pub use encounter::{ClinicalEncounter, EncounterStatus, PaidStatus};
pub use error::{NoteError, NoteResult};
