//! Constants used throughout the clinic core crate.
//!
//! Path names, filenames and tunables live here so storage layout and editor
//! defaults stay consistent across the codebase.

/// Default directory for encounter data when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = "clinic_data";

/// Directory name for encounter records storage.
pub const ENCOUNTERS_DIR_NAME: &str = "encounters";

/// File extension for stored encounter records.
pub const ENCOUNTER_FILE_EXTENSION: &str = "json";

/// Default number of undo steps kept by an editor session.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Upper bound accepted for a configured history capacity.
pub const MAX_HISTORY_CAPACITY: usize = 10_000;

/// Separator placed between blocks in the plain-text projection.
pub const BLOCK_SEPARATOR: &str = "\n";
