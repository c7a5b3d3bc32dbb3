//! Encounter persistence.
//!
//! [`EncounterStore`] is the boundary the form flow saves through. [`FileEncounterStore`] keeps
//! one pretty-printed JSON file per encounter:
//!
//! ```text
//! <data_dir>/encounters/
//!     1.json
//!     2.json
//! ```
//!
//! Each save bumps the record's `revision`. An update carrying an older revision than the one
//! on disk is rejected, so a slow save can never overwrite a newer one.

use crate::config::CoreConfig;
use crate::constants::ENCOUNTER_FILE_EXTENSION;
use crate::encounter::{ClinicalEncounter, EncounterStatus};
use crate::error::{NoteError, NoteResult};
use crate::validation::validate_encounter;
use chrono::Utc;
use clinic_types::RecordId;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

/// Persistence operations on encounter records.
pub trait EncounterStore {
    /// Stores a new encounter and returns it with its id, timestamps and first revision.
    fn create(&self, encounter: ClinicalEncounter) -> NoteResult<ClinicalEncounter>;

    fn open(&self, id: RecordId) -> NoteResult<ClinicalEncounter>;

    /// Replaces a stored encounter. `encounter.revision` must match the stored revision.
    fn update(&self, encounter: ClinicalEncounter) -> NoteResult<ClinicalEncounter>;

    /// Moves a scheduled encounter to [`EncounterStatus::Started`].
    fn start(&self, id: RecordId) -> NoteResult<ClinicalEncounter>;

    fn delete(&self, id: RecordId) -> NoteResult<()>;

    /// Encounters whose note text contains `text` (case-insensitive), optionally restricted to
    /// one patient, ordered by id.
    fn search(
        &self,
        text: &str,
        patient_id: Option<RecordId>,
    ) -> NoteResult<Vec<ClinicalEncounter>>;
}

/// File-backed [`EncounterStore`].
#[derive(Clone, Debug)]
pub struct FileEncounterStore {
    cfg: Arc<CoreConfig>,
}

impl FileEncounterStore {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self { cfg }
    }

    fn encounters_dir(&self) -> PathBuf {
        self.cfg.encounters_dir()
    }

    fn encounter_path(&self, id: RecordId) -> PathBuf {
        self.encounters_dir()
            .join(format!("{id}.{ENCOUNTER_FILE_EXTENSION}"))
    }

    /// Ids of every stored encounter file, unordered.
    fn stored_ids(&self) -> NoteResult<Vec<RecordId>> {
        let entries = match fs::read_dir(self.encounters_dir()) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(NoteError::FileRead(e)),
        };

        let mut ids = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(ENCOUNTER_FILE_EXTENSION) {
                continue;
            }
            let Some(id) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| stem.parse::<RecordId>().ok())
            else {
                continue;
            };
            ids.push(id);
        }
        Ok(ids)
    }

    fn next_id(&self) -> NoteResult<RecordId> {
        match self.stored_ids()?.into_iter().max() {
            None => Ok(RecordId::FIRST),
            Some(last) => last.next().ok_or_else(|| {
                NoteError::InvalidInput(format!("no encounter id is available after {last}"))
            }),
        }
    }

    /// Writes `encounter` through a temporary file so a failed write never truncates the
    /// stored record.
    fn write(&self, id: RecordId, encounter: &ClinicalEncounter) -> NoteResult<()> {
        let dir = self.encounters_dir();
        fs::create_dir_all(&dir).map_err(NoteError::StorageDirCreation)?;

        let json = serde_json::to_string_pretty(encounter).map_err(NoteError::Serialization)?;
        let path = self.encounter_path(id);
        let tmp = dir.join(format!(".{id}.{ENCOUNTER_FILE_EXTENSION}.tmp"));
        fs::write(&tmp, json).map_err(NoteError::FileWrite)?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(NoteError::FileWrite(e));
        }

        tracing::debug!(
            "wrote encounter {} revision {} to {}",
            id,
            encounter.revision,
            path.display()
        );
        Ok(())
    }
}

impl EncounterStore for FileEncounterStore {
    fn create(&self, mut encounter: ClinicalEncounter) -> NoteResult<ClinicalEncounter> {
        validate_encounter(&encounter)?;

        let id = self.next_id()?;
        let now = Utc::now();
        encounter.id = Some(id);
        encounter.created_at = Some(now);
        encounter.updated_at = Some(now);
        encounter.revision = 1;
        self.write(id, &encounter)?;

        tracing::info!(
            "created encounter {} for patient {}",
            id,
            encounter.patient_id
        );
        Ok(encounter)
    }

    fn open(&self, id: RecordId) -> NoteResult<ClinicalEncounter> {
        let json = match fs::read_to_string(self.encounter_path(id)) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(NoteError::NotFound(id)),
            Err(e) => return Err(NoteError::FileRead(e)),
        };
        let mut encounter: ClinicalEncounter =
            serde_json::from_str(&json).map_err(NoteError::Deserialization)?;
        encounter.id = Some(id);
        Ok(encounter)
    }

    fn update(&self, mut encounter: ClinicalEncounter) -> NoteResult<ClinicalEncounter> {
        let id = encounter
            .id
            .ok_or_else(|| NoteError::InvalidInput("cannot update an encounter without an id".into()))?;
        validate_encounter(&encounter)?;

        let current = self.open(id)?;
        if encounter.revision != current.revision {
            return Err(NoteError::StaleRevision {
                id,
                expected: encounter.revision,
                current: current.revision,
            });
        }

        encounter.created_at = current.created_at;
        encounter.updated_at = Some(Utc::now());
        encounter.revision = current.revision + 1;
        self.write(id, &encounter)?;

        tracing::info!("updated encounter {} to revision {}", id, encounter.revision);
        Ok(encounter)
    }

    fn start(&self, id: RecordId) -> NoteResult<ClinicalEncounter> {
        let mut encounter = self.open(id)?;
        match encounter.status {
            EncounterStatus::Started => return Ok(encounter),
            EncounterStatus::Scheduled => {}
            other => {
                return Err(NoteError::InvalidInput(format!(
                    "encounter {id} is {} and cannot be started",
                    other.label()
                )))
            }
        }

        encounter.status = EncounterStatus::Started;
        encounter.updated_at = Some(Utc::now());
        encounter.revision += 1;
        self.write(id, &encounter)?;

        tracing::info!("started encounter {}", id);
        Ok(encounter)
    }

    fn delete(&self, id: RecordId) -> NoteResult<()> {
        match fs::remove_file(self.encounter_path(id)) {
            Ok(()) => {
                tracing::info!("deleted encounter {}", id);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(NoteError::NotFound(id)),
            Err(e) => Err(NoteError::FileDelete(e)),
        }
    }

    fn search(
        &self,
        text: &str,
        patient_id: Option<RecordId>,
    ) -> NoteResult<Vec<ClinicalEncounter>> {
        let query = text.trim().to_lowercase();
        let mut ids = self.stored_ids()?;
        ids.sort();

        let mut found = Vec::new();
        for id in ids {
            let encounter = match self.open(id) {
                Ok(encounter) => encounter,
                Err(e) => {
                    tracing::warn!("skipping unreadable encounter {}: {}", id, e);
                    continue;
                }
            };
            if patient_id.is_some_and(|p| p.get() != encounter.patient_id) {
                continue;
            }
            if !query.is_empty() && !encounter.content_text.to_lowercase().contains(&query) {
                continue;
            }
            found.push(encounter);
        }
        Ok(found)
    }
}
