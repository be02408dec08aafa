//! JSON snapshot boundary: export any board, import with structural
//! validation before the typed decode.

pub mod boards;
pub mod rules;

use crate::domain::backlog::BacklogBoard;
use crate::domain::kanban::KanbanBoard;
use crate::domain::story_map::StoryMapBoard;
use crate::services::{backlog_board, kanban_board, story_map_board};
use rules::Shape;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid snapshot: {}", errors.join("; "))]
    Invalid { errors: Vec<String> },
}

pub type ImportResult<T> = Result<T, ImportError>;

pub fn export_json<T: Serialize>(board: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(board)
}

fn import<T: DeserializeOwned>(
    input: &str,
    kind: &str,
    shape: &Shape,
    unique_collections: &[&str],
    extra_checks: fn(&Value) -> Vec<String>,
) -> ImportResult<T> {
    let value: Value = serde_json::from_str(input)?;

    let mut errors = Vec::new();
    rules::check(&value, shape, "", &mut errors);
    for collection in unique_collections {
        let mut seen = HashSet::new();
        rules::unique_ids(value.get(*collection), collection, &mut seen, &mut errors);
    }
    errors.extend(extra_checks(&value));
    if let Some(first) = errors.first() {
        warn!(kind, count = errors.len(), first = %first, "snapshot rejected");
        return Err(ImportError::Invalid { errors });
    }

    Ok(serde_json::from_value(value)?)
}

fn no_extra_checks(_: &Value) -> Vec<String> {
    Vec::new()
}

/// Card ids are unique across the whole board, not only per column.
fn duplicate_card_ids(value: &Value) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut errors = Vec::new();
    let columns = value.get("columns").and_then(Value::as_array);
    for (index, column) in columns.into_iter().flatten().enumerate() {
        rules::unique_ids(
            column.get("cards"),
            &format!("columns[{index}].cards"),
            &mut seen,
            &mut errors,
        );
    }
    errors
}

pub fn import_kanban(input: &str) -> ImportResult<KanbanBoard> {
    let mut board: KanbanBoard = import(
        input,
        "kanban",
        &boards::KANBAN_BOARD,
        &["columns", "categories"],
        duplicate_card_ids,
    )?;
    kanban_board::normalize(&mut board);
    Ok(board)
}

pub fn import_backlog(input: &str) -> ImportResult<BacklogBoard> {
    let mut board: BacklogBoard = import(
        input,
        "backlog",
        &boards::BACKLOG_BOARD,
        &["epics", "userStories", "releases", "sprints"],
        no_extra_checks,
    )?;
    backlog_board::normalize(&mut board);
    Ok(board)
}

pub fn import_story_map(input: &str) -> ImportResult<StoryMapBoard> {
    let mut board: StoryMapBoard = import(
        input,
        "story-map",
        &boards::STORY_MAP_BOARD,
        &["personas", "activities", "tasks", "userStories", "releases"],
        no_extra_checks,
    )?;
    story_map_board::normalize(&mut board);
    Ok(board)
}
