//! Clinical encounter records.
//!
//! An encounter is one scheduled or completed consultation. Besides identifiers and status it
//! carries the clinical note twice: `content_html` holds the encoded document tree and
//! `content_text` its plain-text projection. Both are written together by
//! [`form::EncounterForm`].
//!
//! Wire field names are camelCase, matching the records the backend has always exchanged.

pub mod form;
pub mod store;

use chrono::{DateTime, Utc};
use clinic_types::RecordId;
use serde::{Deserialize, Deserializer, Serialize};

/// Lifecycle state of an encounter. Stored as its numeric code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum EncounterStatus {
    #[default]
    Scheduled,
    Started,
    Completed,
    Cancelled,
    NoShow,
}

impl EncounterStatus {
    pub fn code(self) -> i64 {
        match self {
            EncounterStatus::Scheduled => 0,
            EncounterStatus::Started => 1,
            EncounterStatus::Completed => 2,
            EncounterStatus::Cancelled => 3,
            EncounterStatus::NoShow => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EncounterStatus::Scheduled => "Scheduled",
            EncounterStatus::Started => "Started",
            EncounterStatus::Completed => "Completed",
            EncounterStatus::Cancelled => "Cancelled",
            EncounterStatus::NoShow => "No-show",
        }
    }
}

/// Unknown codes read as [`EncounterStatus::Scheduled`].
impl From<i64> for EncounterStatus {
    fn from(code: i64) -> Self {
        match code {
            1 => EncounterStatus::Started,
            2 => EncounterStatus::Completed,
            3 => EncounterStatus::Cancelled,
            4 => EncounterStatus::NoShow,
            _ => EncounterStatus::Scheduled,
        }
    }
}

impl From<EncounterStatus> for i64 {
    fn from(status: EncounterStatus) -> Self {
        status.code()
    }
}

/// Payment state of an encounter.
///
/// Written as `0`/`1`. Read from either a number or a boolean, since both shapes exist in
/// stored records; unknown numbers read as [`PaidStatus::Unpaid`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(into = "i64")]
pub enum PaidStatus {
    #[default]
    Unpaid,
    Paid,
}

impl PaidStatus {
    pub fn label(self) -> &'static str {
        match self {
            PaidStatus::Unpaid => "Unpaid",
            PaidStatus::Paid => "Paid",
        }
    }
}

impl From<PaidStatus> for i64 {
    fn from(paid: PaidStatus) -> Self {
        match paid {
            PaidStatus::Unpaid => 0,
            PaidStatus::Paid => 1,
        }
    }
}

impl<'de> Deserialize<'de> for PaidStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum PaidWire {
            Flag(bool),
            Code(i64),
        }

        Ok(match PaidWire::deserialize(deserializer)? {
            PaidWire::Flag(true) | PaidWire::Code(1) => PaidStatus::Paid,
            _ => PaidStatus::Unpaid,
        })
    }
}

/// Reads the AI report field, which is stored either as one string or as a list of lines.
fn gpt_response<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum GptResponseWire {
        Text(String),
        Lines(Vec<String>),
    }

    Ok(match Option::<GptResponseWire>::deserialize(deserializer)? {
        Some(GptResponseWire::Text(text)) => text,
        Some(GptResponseWire::Lines(lines)) => lines.join("\n"),
        None => String::new(),
    })
}

/// An encounter record as exchanged with storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicalEncounter {
    /// Assigned by the store on creation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub tenant_id: u64,
    pub user_id: u64,
    pub patient_id: u64,
    /// `YYYY-MM-DD` or RFC 3339
    pub encounter_date: String,
    #[serde(default)]
    pub status: EncounterStatus,
    #[serde(default)]
    pub paid: PaidStatus,
    /// Encoded document tree
    #[serde(default)]
    pub content_html: String,
    /// Plain-text projection of `content_html`
    #[serde(default)]
    pub content_text: String,
    #[serde(default, deserialize_with = "gpt_response")]
    pub gpt_response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Save counter; an update must carry the revision it was read at.
    #[serde(default)]
    pub revision: u64,
}

impl ClinicalEncounter {
    /// A new, unsaved encounter with an empty note.
    pub fn new(
        tenant_id: RecordId,
        user_id: RecordId,
        patient_id: RecordId,
        encounter_date: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            tenant_id: tenant_id.get(),
            user_id: user_id.get(),
            patient_id: patient_id.get(),
            encounter_date: encounter_date.into(),
            status: EncounterStatus::Scheduled,
            paid: PaidStatus::Unpaid,
            content_html: String::new(),
            content_text: String::new(),
            gpt_response: String::new(),
            created_at: None,
            updated_at: None,
            revision: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(value: u64) -> RecordId {
        RecordId::new(value).unwrap()
    }

    #[test]
    fn status_maps_codes_and_labels() {
        assert_eq!(EncounterStatus::from(2), EncounterStatus::Completed);
        assert_eq!(EncounterStatus::from(99), EncounterStatus::Scheduled);
        assert_eq!(EncounterStatus::NoShow.code(), 4);
        assert_eq!(EncounterStatus::Started.label(), "Started");
    }

    #[test]
    fn paid_reads_bool_or_number() {
        let paid: PaidStatus = serde_json::from_str("true").unwrap();
        assert_eq!(paid, PaidStatus::Paid);
        let paid: PaidStatus = serde_json::from_str("1").unwrap();
        assert_eq!(paid, PaidStatus::Paid);
        let paid: PaidStatus = serde_json::from_str("7").unwrap();
        assert_eq!(paid, PaidStatus::Unpaid);
        assert_eq!(serde_json::to_string(&PaidStatus::Paid).unwrap(), "1");
    }

    #[test]
    fn reads_backend_record_shape() {
        let json = r#"{
            "id": 12,
            "tenantId": 1,
            "userId": 3,
            "patientId": 40,
            "encounterDate": "2024-05-02",
            "status": 1,
            "paid": false,
            "contentHtml": "",
            "contentText": "",
            "gptResponse": ["Summary", "Plan"]
        }"#;
        let record: ClinicalEncounter = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, Some(id(12)));
        assert_eq!(record.status, EncounterStatus::Started);
        assert_eq!(record.paid, PaidStatus::Unpaid);
        assert_eq!(record.gpt_response, "Summary\nPlan");
        assert_eq!(record.revision, 0);
    }

    #[test]
    fn gpt_response_accepts_string_and_null() {
        let base = r#""tenantId":1,"userId":1,"patientId":1,"encounterDate":"2024-01-01""#;
        let record: ClinicalEncounter =
            serde_json::from_str(&format!(r#"{{{base},"gptResponse":"ok"}}"#)).unwrap();
        assert_eq!(record.gpt_response, "ok");
        let record: ClinicalEncounter =
            serde_json::from_str(&format!(r#"{{{base},"gptResponse":null}}"#)).unwrap();
        assert_eq!(record.gpt_response, "");
    }

    #[test]
    fn writes_camel_case_fields() {
        let record = ClinicalEncounter::new(id(1), id(2), id(3), "2024-01-01");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["tenantId"], 1);
        assert_eq!(value["encounterDate"], "2024-01-01");
        assert_eq!(value["status"], 0);
        assert!(value.get("id").is_none());
    }
}
