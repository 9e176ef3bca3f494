// Sole owner of the task collection.
// Tasks live in a private in-memory SQLite table: nothing is written to disk
// and nothing outlives the session. Every read goes back to the table, so
// snapshots and statistics always reflect the latest committed mutation.
use chrono::Utc;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::app::error::{StoreError, StoreResult};
use crate::app::models::{NewTask, Priority, Task, TaskId, TaskPatch, TaskStats};
use crate::app::source::TaskSource;

// `seq` carries insertion order, `id` is the public identity.
const SCHEMA: &str = "CREATE TABLE task_item (
    Seq INTEGER PRIMARY KEY AUTOINCREMENT,
    Id INTEGER NOT NULL UNIQUE,
    Title TEXT NOT NULL,
    Category TEXT NOT NULL,
    Priority TEXT NOT NULL,
    DueTime TEXT NOT NULL,
    Completed TINYINT NOT NULL,
    CreatedAt DATETIME NOT NULL
);";

const SELECT_COLUMNS: &str =
    "SELECT Id, Title, Category, Priority, DueTime, Completed, CreatedAt FROM task_item";

impl ToSql for Priority {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Priority {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|err| FromSqlError::Other(Box::new(err)))
    }
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        category: row.get(2)?,
        priority: row.get(3)?,
        due_time: row.get(4)?,
        completed: row.get(5)?,
        created_at: row.get(6)?,
    })
}

pub struct TaskStore<S: TaskSource> {
    db_con: Connection,
    source: S,
    // Set by the first successful load or add; once set, load never fetches again.
    populated: bool,
}

impl<S: TaskSource> TaskStore<S> {
    pub fn new(source: S) -> StoreResult<Self> {
        let db_con = Connection::open_in_memory()?;
        db_con.execute_batch(SCHEMA)?;
        Ok(TaskStore {
            db_con,
            source,
            populated: false,
        })
    }

    // Fills the collection from the source, once.
    //
    // Returns the number of tasks loaded; `0` when the fetch was skipped because
    // the collection has already been populated. Emptying the list through
    // deletions does not make it fetch again.
    pub async fn load(&mut self) -> StoreResult<usize> {
        if self.populated || !self.is_empty()? {
            tracing::debug!("task collection already populated, skipping fetch");
            return Ok(0);
        }

        let location = self.source.describe();
        let tasks = self.source.fetch().await.map_err(|err| {
            tracing::warn!(source = %location, error = %err, "task document unavailable");
            StoreError::from(err)
        })?;

        let tx = self.db_con.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO task_item (Id, Title, Category, Priority, DueTime, Completed, CreatedAt)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            )?;
            for task in &tasks {
                stmt.execute(params![
                    task.id,
                    task.title,
                    task.category,
                    task.priority,
                    task.due_time,
                    task.completed,
                    task.created_at,
                ])?;
            }
        }
        tx.commit()?;

        self.populated = true;
        tracing::info!(source = %location, count = tasks.len(), "loaded task document");
        Ok(tasks.len())
    }

    // READ
    // Snapshot of every task in insertion order.
    pub fn list(&self) -> StoreResult<Vec<Task>> {
        let mut stmt = self
            .db_con
            .prepare(&format!("{SELECT_COLUMNS} ORDER BY Seq"))?;
        let tasks = stmt
            .query_map([], task_from_row)?
            .collect::<rusqlite::Result<Vec<Task>>>()?;
        Ok(tasks)
    }

    pub fn get(&self, id: TaskId) -> StoreResult<Task> {
        self.db_con
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE Id = ?1"),
                [id],
                task_from_row,
            )
            .optional()?
            .ok_or(StoreError::NotFound(id))
    }

    pub fn len(&self) -> StoreResult<usize> {
        let count: i64 = self
            .db_con
            .query_row("SELECT COUNT(*) FROM task_item", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    // UPDATE
    // Merges the named fields into the task and returns its new snapshot.
    pub fn update(&mut self, id: TaskId, patch: TaskPatch) -> StoreResult<Task> {
        let mut task = self.get(id)?;
        patch.apply_to(&mut task);
        self.db_con.execute(
            "UPDATE task_item SET Title = ?1, Category = ?2, Priority = ?3, DueTime = ?4, Completed = ?5
             WHERE Id = ?6;",
            params![
                task.title,
                task.category,
                task.priority,
                task.due_time,
                task.completed,
                task.id,
            ],
        )?;
        tracing::debug!(id, completed = task.completed, "updated task");
        self.get(id)
    }

    // CREATE
    // Appends a task with a fresh timestamp-derived id; it always starts pending.
    pub fn add(&mut self, new_task: NewTask) -> StoreResult<Task> {
        let now = Utc::now();
        let max_id: Option<TaskId> =
            self.db_con
                .query_row("SELECT MAX(Id) FROM task_item", [], |row| row.get(0))?;
        let id = match max_id {
            Some(max_id) => max_id
                .checked_add(1)
                .ok_or(StoreError::IdsExhausted)?
                .max(now.timestamp_millis()),
            None => now.timestamp_millis(),
        };

        self.db_con.execute(
            "INSERT INTO task_item (Id, Title, Category, Priority, DueTime, Completed, CreatedAt)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                id,
                new_task.title,
                new_task.category,
                new_task.priority,
                new_task.due_time,
                false,
                now,
            ],
        )?;
        self.populated = true;
        tracing::debug!(id, "added task");
        self.get(id)
    }

    // DELETE
    // Removes the task if present. An unknown id is not an error; the return
    // value only says whether a row was actually removed.
    pub fn remove(&mut self, id: TaskId) -> StoreResult<bool> {
        let removed = self
            .db_con
            .execute("DELETE FROM task_item WHERE Id = ?1;", [id])?;
        tracing::debug!(id, removed, "removed task");
        Ok(removed > 0)
    }

    pub fn stats(&self) -> StoreResult<TaskStats> {
        let (total, completed): (i64, i64) = self.db_con.query_row(
            "SELECT COUNT(*), COALESCE(SUM(Completed), 0) FROM task_item",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(TaskStats::new(
            usize::try_from(total).unwrap_or(0),
            usize::try_from(completed).unwrap_or(0),
        ))
    }
}
