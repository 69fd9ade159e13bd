//! Decoding of nested board records written by earlier clients.
//!
//! Older clients persisted boards as one nested JSON document: a board with
//! its `columns`, each column with its `tasks`, each task with embedded
//! `tags` and an `assignees` list. Field names are either `snake_case` or
//! `camelCase`, most fields are optional, and tasks carry no position. This
//! module reads every such shape into the canonical [`BoardSnapshot`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::board::domain::{
    Board, BoardDomainError, BoardId, BoardSnapshot, Column, ColumnId, OrderingError,
    PersistedBoardData, PersistedColumnData, PersistedTaskData, SnapshotParts, SortOrder, Task,
    TaskId,
};
use crate::identity::domain::UserId;
use crate::project::domain::{ProjectDomainError, ProjectId, Tag, TagColor, TagId};

/// Errors returned while decoding legacy board records.
#[derive(Debug, Error)]
pub enum RecordError {
    /// The document is not valid JSON or does not match any known shape.
    #[error("malformed board record: {0}")]
    Json(#[from] serde_json::Error),

    /// An identifier field is not a UUID.
    #[error("field '{field}' holds non-UUID identifier '{value}'")]
    InvalidIdentifier {
        /// Name of the offending field.
        field: &'static str,
        /// Raw field value.
        value: String,
    },

    /// A tag carries an unusable color.
    #[error(transparent)]
    Tag(#[from] ProjectDomainError),

    /// An order value is unusable.
    #[error(transparent)]
    Ordering(#[from] OrderingError),

    /// The decoded rows do not form a consistent board.
    #[error(transparent)]
    Board(#[from] BoardDomainError),
}

#[derive(Debug, Deserialize)]
struct BoardRecord {
    id: String,
    #[serde(alias = "projectId")]
    project_id: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(alias = "createdAt")]
    created_at: DateTime<Utc>,
    #[serde(alias = "updatedAt")]
    updated_at: DateTime<Utc>,
    #[serde(default)]
    columns: Vec<ColumnRecord>,
}

#[derive(Debug, Deserialize)]
struct ColumnRecord {
    id: String,
    title: String,
    #[serde(default)]
    order: Option<f64>,
    #[serde(alias = "createdAt")]
    created_at: DateTime<Utc>,
    #[serde(alias = "updatedAt")]
    updated_at: DateTime<Utc>,
    #[serde(default)]
    tasks: Vec<TaskRecord>,
}

#[derive(Debug, Deserialize)]
struct TaskRecord {
    id: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, alias = "coverImage")]
    cover_image: Option<String>,
    #[serde(default, alias = "dueDate", deserialize_with = "lenient_instant")]
    due_date: Option<DateTime<Utc>>,
    #[serde(alias = "createdAt")]
    created_at: DateTime<Utc>,
    #[serde(alias = "updatedAt")]
    updated_at: DateTime<Utc>,
    #[serde(default)]
    tags: Vec<TagRecord>,
    #[serde(default)]
    assignees: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TagRecord {
    id: String,
    name: String,
    color: String,
    #[serde(default, alias = "projectId")]
    project_id: Option<String>,
    #[serde(default, alias = "createdAt")]
    created_at: Option<DateTime<Utc>>,
}

/// Accepts RFC 3339 instants or bare `YYYY-MM-DD` dates (read as midnight
/// UTC).
fn lenient_instant<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(Some(instant.with_timezone(&Utc)));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Some(naive.and_utc()))
        .ok_or_else(|| serde::de::Error::custom(format!("unrecognised date '{raw}'")))
}

fn parse_id<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T, RecordError> {
    value.parse().map_err(|_| RecordError::InvalidIdentifier {
        field,
        value: value.to_owned(),
    })
}

/// Decodes a nested legacy board document into a snapshot.
///
/// Columns without an `order` take their array index; tasks take their
/// array index as position. Tags embedded in tasks become the snapshot's
/// project tags, deduplicated by identifier.
///
/// # Errors
///
/// Returns [`RecordError`] when the JSON is malformed, an identifier is not a
/// UUID, a tag color is invalid, or an order value is not finite.
pub fn decode_board(json: &str) -> Result<BoardSnapshot, RecordError> {
    let record: BoardRecord = serde_json::from_str(json)?;
    let board_id: BoardId = parse_id("board.id", &record.id)?;
    let project_id: ProjectId = parse_id("board.project_id", &record.project_id)?;
    let board = Board::from_persisted(PersistedBoardData {
        id: board_id,
        project_id,
        title: record.title,
        description: record.description,
        created_at: record.created_at,
        updated_at: record.updated_at,
    });

    let mut parts = SnapshotParts::default();
    for (column_index, column_record) in (0_u32..).zip(record.columns) {
        let column_id: ColumnId = parse_id("column.id", &column_record.id)?;
        let order = match column_record.order {
            Some(value) => SortOrder::new(value)?,
            None => SortOrder::from_index(column_index),
        };
        parts.columns.push(Column::from_persisted(PersistedColumnData {
            id: column_id,
            board_id,
            title: column_record.title,
            order,
            created_at: column_record.created_at,
            updated_at: column_record.updated_at,
        }));

        for (task_index, task_record) in (0_u32..).zip(column_record.tasks) {
            decode_task(&mut parts, project_id, column_id, task_index, task_record)?;
        }
    }

    Ok(BoardSnapshot::assemble(board, parts)?)
}

fn decode_task(
    parts: &mut SnapshotParts,
    project_id: ProjectId,
    column_id: ColumnId,
    index: u32,
    record: TaskRecord,
) -> Result<(), RecordError> {
    let task_id: TaskId = parse_id("task.id", &record.id)?;
    for tag_record in record.tags {
        let tag_id: TagId = parse_id("tag.id", &tag_record.id)?;
        parts.tag_links.push((task_id, tag_id));
        if parts.tags.iter().any(|known| known.id == tag_id) {
            continue;
        }
        let tag_project = match tag_record.project_id.as_deref() {
            Some(raw) => parse_id("tag.project_id", raw)?,
            None => project_id,
        };
        parts.tags.push(Tag {
            id: tag_id,
            project_id: tag_project,
            name: tag_record.name,
            color: TagColor::new(tag_record.color)?,
            created_at: tag_record.created_at.unwrap_or(record.created_at),
        });
    }
    for assignee in &record.assignees {
        let user_id: UserId = parse_id("task.assignees", assignee)?;
        parts.assignee_links.push((task_id, user_id));
    }
    parts.tasks.push(Task::from_persisted(PersistedTaskData {
        id: task_id,
        column_id,
        title: record.title,
        description: record.description,
        cover_image: record.cover_image,
        due_date: record.due_date,
        position: SortOrder::from_index(index),
        created_at: record.created_at,
        updated_at: record.updated_at,
    }));
    Ok(())
}
