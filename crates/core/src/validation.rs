//! Input validation utilities.
//!
//! Checks applied to a pending encounter before it is handed to storage.

use crate::encounter::ClinicalEncounter;
use crate::{NoteError, NoteResult};
use chrono::{DateTime, NaiveDate};
use clinic_types::RecordId;

/// Validates that `value` is a usable record id (at least 1).
///
/// # Errors
///
/// Returns `NoteError::InvalidInput` naming `field` if the id is zero.
pub fn validate_record_id(field: &str, value: u64) -> NoteResult<RecordId> {
    RecordId::new(value).map_err(|e| NoteError::InvalidInput(format!("{field}: {e}")))
}

/// Validates an encounter date.
///
/// Accepts a calendar date (`YYYY-MM-DD`) or a full RFC 3339 timestamp. Surrounding whitespace
/// is ignored.
///
/// # Errors
///
/// Returns `NoteError::InvalidInput` if the date is empty or in neither format.
pub fn validate_encounter_date(value: &str) -> NoteResult<()> {
    let value = value.trim();
    if value.is_empty() {
        return Err(NoteError::InvalidInput(
            "encounterDate cannot be empty".into(),
        ));
    }

    if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
        || DateTime::parse_from_rfc3339(value).is_ok()
    {
        return Ok(());
    }

    Err(NoteError::InvalidInput(format!(
        "encounterDate is not a date (expected YYYY-MM-DD or RFC 3339): {value}"
    )))
}

/// Validates every submitted field of `encounter`.
///
/// # Errors
///
/// Returns the first `NoteError::InvalidInput` found.
pub fn validate_encounter(encounter: &ClinicalEncounter) -> NoteResult<()> {
    validate_record_id("tenantId", encounter.tenant_id)?;
    validate_record_id("userId", encounter.user_id)?;
    validate_record_id("patientId", encounter.patient_id)?;
    validate_encounter_date(&encounter.encounter_date)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_calendar_dates_and_timestamps() {
        validate_encounter_date("2024-02-29").unwrap();
        validate_encounter_date(" 2024-05-02T09:30:00Z ").unwrap();
        validate_encounter_date("2024-05-02T09:30:00+01:00").unwrap();
    }

    #[test]
    fn rejects_blank_and_malformed_dates() {
        assert!(validate_encounter_date("").is_err());
        assert!(validate_encounter_date("   ").is_err());
        assert!(validate_encounter_date("2023-02-29").is_err());
        assert!(validate_encounter_date("02/05/2024").is_err());
    }

    #[test]
    fn record_id_must_be_positive() {
        assert_eq!(validate_record_id("userId", 7).unwrap().get(), 7);
        let err = validate_record_id("userId", 0).unwrap_err();
        assert!(err.to_string().contains("userId"));
    }

    #[test]
    fn validates_all_encounter_fields() {
        let id = RecordId::new(1).unwrap();
        let mut encounter = ClinicalEncounter::new(id, id, id, "2024-01-01");
        validate_encounter(&encounter).unwrap();

        encounter.patient_id = 0;
        let err = validate_encounter(&encounter).unwrap_err();
        assert!(err.to_string().contains("patientId"));
    }
}
