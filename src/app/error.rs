use crate::app::models::TaskId;

pub type StoreResult<T> = Result<T, StoreError>;

// Why a task document could not be turned into tasks.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read task document `{path}`: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("task document is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("task {id} has an unreadable createdAt `{value}`")]
    Timestamp { id: TaskId, value: String },

    #[error("task id {0} appears more than once in the document")]
    DuplicateId(TaskId),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    // The external document could not be fetched or parsed during load.
    #[error("task source unavailable: {0}")]
    SourceUnavailable(#[from] SourceError),

    #[error("task {0} not found")]
    NotFound(TaskId),

    #[error("no task id left above the largest one in use")]
    IdsExhausted,

    #[error("in-memory task table failed: {0}")]
    Database(#[from] rusqlite::Error),
}
