use clinic_types::RecordId;

#[derive(Debug, thiserror::Error)]
pub enum NoteError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("malformed document node at {path}: {reason}")]
    MalformedNode { path: String, reason: String },
    #[error("failed to decode document at {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode document: {0}")]
    Encode(serde_json::Error),

    #[error("encounter {0} not found")]
    NotFound(RecordId),
    #[error("encounter {id} was saved at revision {current}, update was based on {expected}")]
    StaleRevision {
        id: RecordId,
        expected: u64,
        current: u64,
    },
    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to write encounter file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read encounter file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to delete encounter file: {0}")]
    FileDelete(std::io::Error),
    #[error("failed to serialize encounter: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize encounter: {0}")]
    Deserialization(serde_json::Error),
}

pub type NoteResult<T> = std::result::Result<T, NoteError>;

impl NoteError {
    pub(crate) fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedNode {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
