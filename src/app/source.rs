// Where the initial task document comes from.
// The store only ever asks a source once per session (see TaskStore::load).
use async_trait::async_trait;
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;

use crate::app::error::SourceError;
use crate::app::models::{Priority, Task, TaskId};

#[async_trait]
pub trait TaskSource {
    // Fetch and parse the whole document.
    async fn fetch(&self) -> Result<Vec<Task>, SourceError>;

    // Human readable location, used in logs.
    fn describe(&self) -> String;
}

// One element of the JSON array, before `createdAt` becomes a real date.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskRecord {
    id: TaskId,
    title: String,
    category: String,
    priority: Priority,
    #[serde(default)]
    due_time: String,
    #[serde(default)]
    completed: bool,
    created_at: String,
}

impl TaskRecord {
    fn into_task(self) -> Result<Task, SourceError> {
        let created_at =
            parse_timestamp(&self.created_at).ok_or_else(|| SourceError::Timestamp {
                id: self.id,
                value: self.created_at.clone(),
            })?;
        Ok(Task {
            id: self.id,
            title: self.title,
            category: self.category,
            priority: self.priority,
            due_time: self.due_time,
            completed: self.completed,
            created_at,
        })
    }
}

// Parse a task document: a JSON array of task records.
pub fn parse_document(bytes: &[u8]) -> Result<Vec<Task>, SourceError> {
    let records: Vec<TaskRecord> = serde_json::from_slice(bytes)?;
    let mut seen = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .map(|record| {
            if !seen.insert(record.id) {
                return Err(SourceError::DuplicateId(record.id));
            }
            record.into_task()
        })
        .collect()
}

// Accepts RFC 3339, offset-less date-times (read in the local zone) and bare dates.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(resolve_local(naive, |naive| {
                Local
                    .from_local_datetime(naive)
                    .earliest()
                    .map(|local| local.with_timezone(&Utc))
            }));
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

// A wall-clock time skipped by a DST jump is moved past the gap, the way a
// browser does; if even that does not resolve it is read as UTC.
fn resolve_local(
    naive: NaiveDateTime,
    to_utc: impl Fn(&NaiveDateTime) -> Option<DateTime<Utc>>,
) -> DateTime<Utc> {
    to_utc(&naive)
        .or_else(|| to_utc(&(naive + Duration::hours(1))))
        .unwrap_or_else(|| naive.and_utc())
}

// Reads the document from a file on disk.
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileSource { path: path.into() }
    }
}

#[async_trait]
impl TaskSource for JsonFileSource {
    async fn fetch(&self) -> Result<Vec<Task>, SourceError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| SourceError::Read {
                path: self.path.display().to_string(),
                source,
            })?;
        parse_document(&bytes)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

// A document held in memory; handy for tests and demos.
pub struct StaticSource {
    document: String,
}

impl StaticSource {
    pub fn new(document: impl Into<String>) -> Self {
        StaticSource {
            document: document.into(),
        }
    }
}

#[async_trait]
impl TaskSource for StaticSource {
    async fn fetch(&self) -> Result<Vec<Task>, SourceError> {
        parse_document(self.document.as_bytes())
    }

    fn describe(&self) -> String {
        "<static document>".to_string()
    }
}
