//! Encounter form flow.
//!
//! The form holds the pending submission of one encounter. The editor session reports every
//! change through its listener; [`EncounterForm::bind`] installs a listener that re-encodes the
//! tree into `content_html` and re-projects it into `content_text`.
//!
//! Opening an existing encounter goes the other way: [`load_document`] decodes the stored
//! `content_html` back into a tree, recovering from unreadable content according to the
//! configured [`DecodePolicy`].

use crate::config::DecodePolicy;
use crate::document::{codec, Document};
use crate::editor::EditorSession;
use crate::encounter::{ClinicalEncounter, EncounterStatus, PaidStatus};
use crate::error::{NoteError, NoteResult};
use crate::validation::validate_encounter;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Result of decoding stored note content.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDocument {
    pub document: Document,
    /// Why the stored content was replaced by the empty document, if it was
    pub recovered: Option<String>,
}

impl LoadedDocument {
    pub fn was_recovered(&self) -> bool {
        self.recovered.is_some()
    }
}

/// Decodes stored `content_html` into a document.
///
/// An empty (or whitespace-only) string is a note that was never written and loads as the
/// canonical empty document. Anything else that fails to decode is handled per `policy`.
///
/// # Errors
///
/// Under [`DecodePolicy::Reject`], returns the decode or validation error. Never fails under
/// [`DecodePolicy::Recover`].
pub fn load_document(content_html: &str, policy: DecodePolicy) -> NoteResult<LoadedDocument> {
    if content_html.trim().is_empty() {
        return Ok(LoadedDocument {
            document: Document::empty(),
            recovered: None,
        });
    }

    match codec::decode(content_html) {
        Ok(document) => Ok(LoadedDocument {
            document,
            recovered: None,
        }),
        Err(err) => match policy {
            DecodePolicy::Reject => Err(err),
            DecodePolicy::Recover => {
                tracing::warn!("stored note content could not be decoded, starting empty: {err}");
                Ok(LoadedDocument {
                    document: Document::empty(),
                    recovered: Some(err.to_string()),
                })
            }
        },
    }
}

/// Pending submission state for one encounter.
#[derive(Debug)]
pub struct EncounterForm {
    pending: ClinicalEncounter,
    /// Set by a bound listener that could not reach the form; cleared by `apply_document`.
    missed_change: Rc<Cell<bool>>,
}

impl Clone for EncounterForm {
    fn clone(&self) -> Self {
        Self {
            pending: self.pending.clone(),
            missed_change: Rc::new(Cell::new(self.missed_change.get())),
        }
    }
}

impl EncounterForm {
    /// Starts a form for `encounter` without touching its stored content.
    pub fn new(encounter: ClinicalEncounter) -> Self {
        Self {
            pending: encounter,
            missed_change: Rc::new(Cell::new(false)),
        }
    }

    /// Opens a stored encounter and decodes its note.
    ///
    /// When the note is recovered, the pending `content_html` keeps the stored string until the
    /// first edit, so saving an untouched form never discards it.
    ///
    /// # Errors
    ///
    /// See [`load_document`].
    pub fn open(
        encounter: ClinicalEncounter,
        policy: DecodePolicy,
    ) -> NoteResult<(Self, LoadedDocument)> {
        let loaded = load_document(&encounter.content_html, policy)?;
        Ok((Self::new(encounter), loaded))
    }

    pub fn pending(&self) -> &ClinicalEncounter {
        &self.pending
    }

    pub fn set_encounter_date(&mut self, date: impl Into<String>) {
        self.pending.encounter_date = date.into();
    }

    pub fn set_status(&mut self, status: EncounterStatus) {
        self.pending.status = status;
    }

    pub fn set_paid(&mut self, paid: PaidStatus) {
        self.pending.paid = paid;
    }

    pub fn set_gpt_response(&mut self, response: impl Into<String>) {
        self.pending.gpt_response = response.into();
    }

    /// Stores the encoding and projection of `document` in the pending record.
    ///
    /// Both values are computed before either field is assigned.
    ///
    /// # Errors
    ///
    /// Returns `NoteError::Encode` if the tree cannot be serialized; the pending record is then
    /// left untouched.
    pub fn apply_document(&mut self, document: &Document) -> NoteResult<()> {
        let content_html = codec::encode(document)?;
        let content_text = document.plain_text();
        self.pending.content_html = content_html;
        self.pending.content_text = content_text;
        self.missed_change.set(false);
        Ok(())
    }

    /// Routes every change of `session` into `form`.
    ///
    /// Replaces any listener previously registered on the session. A change that arrives while
    /// `form` is borrowed, or that fails to encode, cannot be stored; the form then refuses to
    /// [`submit`](Self::submit) until [`apply_document`](Self::apply_document) is called with
    /// the session's current document.
    ///
    /// # Panics
    ///
    /// Panics if `form` is mutably borrowed while binding.
    pub fn bind(form: &Rc<RefCell<Self>>, session: &mut EditorSession) {
        let missed_change = Rc::clone(&form.borrow().missed_change);
        let form = Rc::clone(form);
        session.set_on_change(move |document| {
            let Ok(mut form) = form.try_borrow_mut() else {
                tracing::error!("encounter form is borrowed elsewhere, dropping editor change");
                missed_change.set(true);
                return;
            };
            if let Err(err) = form.apply_document(document) {
                tracing::error!("failed to store editor change in encounter form: {err}");
                missed_change.set(true);
            }
        });
    }

    /// Whether a bound editor change could not be stored in the form.
    pub fn is_out_of_sync(&self) -> bool {
        self.missed_change.get()
    }

    /// Validates the pending record and returns it for storage.
    ///
    /// # Errors
    ///
    /// Returns `NoteError::InvalidInput` if an id is below 1, the date is unusable, or an
    /// editor change was dropped since the note was last applied.
    pub fn submit(&self) -> NoteResult<ClinicalEncounter> {
        if self.is_out_of_sync() {
            return Err(NoteError::InvalidInput(
                "note content is out of date with the editor; apply the current document first"
                    .into(),
            ));
        }
        validate_encounter(&self.pending)?;
        Ok(self.pending.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{BlockKind, DocumentNode, Mark};
    use clinic_types::RecordId;

    fn encounter() -> ClinicalEncounter {
        let id = RecordId::new(1).unwrap();
        ClinicalEncounter::new(id, id, id, "2024-03-01")
    }

    #[test]
    fn load_empty_string_is_a_new_note() {
        let loaded = load_document("  ", DecodePolicy::Reject).unwrap();
        assert_eq!(loaded.document, Document::empty());
        assert!(!loaded.was_recovered());
    }

    #[test]
    fn load_decodes_stored_tree() {
        let loaded = load_document(
            r#"[{"type":"heading","children":[{"text":"Plan"}]}]"#,
            DecodePolicy::Recover,
        )
        .unwrap();
        assert_eq!(loaded.document.blocks()[0].kind(), BlockKind::Heading);
        assert_eq!(loaded.recovered, None);
    }

    #[test]
    fn load_recovers_from_garbage_and_non_arrays() {
        for stored in ["<p>legacy html</p>", r#"{"type":"paragraph"}"#, "[]"] {
            let loaded = load_document(stored, DecodePolicy::Recover).unwrap();
            assert_eq!(loaded.document, Document::empty(), "input: {stored}");
            assert!(loaded.was_recovered(), "input: {stored}");
        }
    }

    #[test]
    fn load_rejects_under_reject_policy() {
        let err = load_document("not json", DecodePolicy::Reject).unwrap_err();
        assert!(matches!(err, NoteError::Decode { .. }));
    }

    #[test]
    fn open_keeps_stored_content_when_recovered() {
        let mut stored = encounter();
        stored.content_html = "garbage".into();
        let (form, loaded) = EncounterForm::open(stored, DecodePolicy::Recover).unwrap();
        assert!(loaded.was_recovered());
        assert_eq!(form.pending().content_html, "garbage");
    }

    #[test]
    fn apply_document_sets_both_fields() {
        let mut form = EncounterForm::new(encounter());
        let document = Document::new(vec![
            DocumentNode::with_text(BlockKind::Paragraph, "Hello"),
            DocumentNode::with_text(BlockKind::Paragraph, "World"),
        ])
        .unwrap();
        form.apply_document(&document).unwrap();
        assert_eq!(form.pending().content_text, "Hello\nWorld");
        assert_eq!(codec::decode(&form.pending().content_html).unwrap(), document);
    }

    #[test]
    fn bound_session_keeps_fields_in_sync() {
        let form = Rc::new(RefCell::new(EncounterForm::new(encounter())));
        let mut session = EditorSession::new();
        EncounterForm::bind(&form, &mut session);

        session.insert_text("abc");
        session.toggle_mark(Mark::Bold);
        session.insert_text("def");

        let pending = form.borrow().pending().clone();
        assert_eq!(pending.content_text, "abcdef");
        let stored = codec::decode(&pending.content_html).unwrap();
        assert_eq!(&stored, session.document());
        let runs = stored.blocks()[0].children();
        assert_eq!(runs.len(), 2);
        assert!(!runs[0].bold);
        assert!(runs[1].bold);
    }

    #[test]
    fn read_only_session_leaves_form_untouched() {
        let form = Rc::new(RefCell::new(EncounterForm::new(encounter())));
        let mut session = EditorSession::new();
        EncounterForm::bind(&form, &mut session);
        session.set_read_only(true);
        session.insert_text("ignored");
        assert_eq!(form.borrow().pending().content_html, "");
    }

    #[test]
    fn submit_validates_pending_record() {
        let mut form = EncounterForm::new(encounter());
        form.set_status(EncounterStatus::Completed);
        form.set_gpt_response("Summary: stable");
        let submitted = form.submit().unwrap();
        assert_eq!(submitted.status, EncounterStatus::Completed);
        assert_eq!(submitted.gpt_response, "Summary: stable");

        form.set_encounter_date("");
        assert!(matches!(form.submit(), Err(NoteError::InvalidInput(_))));
    }

    #[test]
    fn change_dropped_while_form_is_borrowed_blocks_submit() {
        let form = Rc::new(RefCell::new(EncounterForm::new(encounter())));
        let mut session = EditorSession::new();
        EncounterForm::bind(&form, &mut session);

        {
            let _held = form.borrow();
            session.insert_text("lost");
        }
        assert!(form.borrow().is_out_of_sync());
        assert_eq!(form.borrow().pending().content_text, "");
        assert!(matches!(
            form.borrow().submit(),
            Err(NoteError::InvalidInput(_))
        ));

        form.borrow_mut()
            .apply_document(session.document())
            .unwrap();
        let submitted = form.borrow().submit().unwrap();
        assert_eq!(submitted.content_text, "lost");
    }
}
