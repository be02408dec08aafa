use anyhow::{Context, Result};
use boardkit::config::BoardConfig;
use boardkit::schema::{self, ImportError};
use boardkit::services::{BacklogBoardModel, KanbanBoardModel, StoryMapBoardModel};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Validate a board snapshot and print a summary of its contents.
#[derive(Parser, Debug)]
#[command(name = "boardkit")]
#[command(version)]
struct Cli {
    /// Which board the snapshot holds
    #[arg(value_enum)]
    kind: BoardKind,

    /// Path to the JSON snapshot
    snapshot: PathBuf,

    /// Board config to apply (defaults to the per-user boards.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BoardKind {
    Kanban,
    Backlog,
    StoryMap,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => BoardConfig::load_from(path)?,
        None => BoardConfig::load()?,
    };
    let input = std::fs::read_to_string(&cli.snapshot)
        .with_context(|| format!("failed to read snapshot {}", cli.snapshot.display()))?;

    let summary = match cli.kind {
        BoardKind::Kanban => schema::import_kanban(&input).map(|board| {
            let mut props = config.kanban_props();
            props.board = Some(board);
            summarize_kanban(&KanbanBoardModel::new(props))
        }),
        BoardKind::Backlog => schema::import_backlog(&input).map(|board| {
            let mut props = config.backlog_props();
            props.board = Some(board);
            summarize_backlog(&BacklogBoardModel::new(props))
        }),
        BoardKind::StoryMap => schema::import_story_map(&input).map(|board| {
            let mut props = config.story_map_props();
            props.board = Some(board);
            summarize_story_map(&StoryMapBoardModel::new(props))
        }),
    };

    match summary {
        Ok(lines) => {
            info!(snapshot = %cli.snapshot.display(), "snapshot valid");
            for line in lines {
                println!("{line}");
            }
            Ok(())
        }
        Err(ImportError::Invalid { errors }) => {
            for error in &errors {
                eprintln!("  {error}");
            }
            anyhow::bail!(
                "{} failed validation with {} error(s)",
                cli.snapshot.display(),
                errors.len()
            )
        }
        Err(err) => Err(err).with_context(|| format!("failed to load {}", cli.snapshot.display())),
    }
}

fn summarize_kanban(model: &KanbanBoardModel) -> Vec<String> {
    let Some(board) = model.board() else {
        return Vec::new();
    };
    let mut lines = vec![format!(
        "{} ({} columns, {} cards)",
        board.title,
        board.columns.len(),
        model.card_count()
    )];
    for column in model.columns() {
        let limit = column
            .max_cards
            .map(|max| format!(" / {max}"))
            .unwrap_or_default();
        lines.push(format!("  {}: {}{limit}", column.title, column.cards.len()));
    }
    lines
}

fn summarize_backlog(model: &BacklogBoardModel) -> Vec<String> {
    let Some(board) = model.board() else {
        return Vec::new();
    };
    let mut lines = vec![format!(
        "{} ({} epics, {} stories, {} releases, {} sprints)",
        board.title,
        board.epics.len(),
        board.user_stories.len(),
        board.releases.len(),
        board.sprints.len()
    )];
    for release in model.releases() {
        lines.push(format!(
            "  {}: {} stories, {} points",
            release.name,
            model.stories_for_release(&release.id).len(),
            model.release_story_points(&release.id)
        ));
    }
    lines.push(format!("  Unscheduled: {} stories", model.unscheduled_stories().len()));
    lines
}

fn summarize_story_map(model: &StoryMapBoardModel) -> Vec<String> {
    let Some(board) = model.board() else {
        return Vec::new();
    };
    let mut lines = vec![format!(
        "{} ({} personas, {} activities, {} tasks, {} stories)",
        board.title,
        board.personas.len(),
        board.activities.len(),
        board.tasks.len(),
        board.user_stories.len()
    )];
    for persona in model.personas() {
        lines.push(format!(
            "  {}: {} activities",
            persona.name,
            model.activities_for_persona(&persona.id).len()
        ));
    }
    for release in model.releases() {
        lines.push(format!(
            "  Release {}: {} stories, {} points",
            release.name,
            model.stories_for_release(&release.id).len(),
            model.release_story_points(&release.id)
        ));
    }
    lines
}
