use crate::services::backlog_board::BacklogProps;
use crate::services::kanban_board::KanbanProps;
use crate::services::props::{
    BacklogPermissions, KanbanPermissions, StoryMapPermissions, Theme, DEFAULT_LOCALE,
    DEFAULT_MAX_COLUMNS,
};
use crate::services::story_map_board::StoryMapProps;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Host-level defaults for every board, stored as TOML.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BoardConfig {
    /// Upper bound on kanban columns
    pub max_columns: usize,

    pub theme: Theme,

    pub locale: String,

    pub kanban: KanbanPermissions,

    pub backlog: BacklogPermissions,

    pub story_map: StoryMapPermissions,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            max_columns: DEFAULT_MAX_COLUMNS,
            theme: Theme::default(),
            locale: DEFAULT_LOCALE.to_string(),
            kanban: KanbanPermissions::default(),
            backlog: BacklogPermissions::default(),
            story_map: StoryMapPermissions::default(),
        }
    }
}

impl BoardConfig {
    /// Load from the default location, falling back to defaults when the
    /// file does not exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read board config {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("invalid board config {}", path.display()))?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("failed to encode board config")?;
        std::fs::write(path, content)
            .with_context(|| format!("failed to write board config {}", path.display()))?;

        info!(path = %path.display(), "board config saved");
        Ok(())
    }

    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("boardkit").join("boards.toml"))
    }

    pub fn kanban_props(&self) -> KanbanProps {
        KanbanProps {
            max_columns: self.max_columns,
            permissions: self.kanban.clone(),
            theme: self.theme,
            locale: self.locale.clone(),
            ..KanbanProps::default()
        }
    }

    pub fn backlog_props(&self) -> BacklogProps {
        BacklogProps {
            permissions: self.backlog.clone(),
            theme: self.theme,
            locale: self.locale.clone(),
            ..BacklogProps::default()
        }
    }

    pub fn story_map_props(&self) -> StoryMapProps {
        StoryMapProps {
            permissions: self.story_map.clone(),
            theme: self.theme,
            locale: self.locale.clone(),
            ..StoryMapProps::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_file_takes_defaults() {
        let config: BoardConfig = toml::from_str(
            r#"
            theme = "dark"

            [kanban]
            allow_drag_column = true
            "#,
        )
        .unwrap();
        assert_eq!(config.theme, Theme::Dark);
        assert_eq!(config.max_columns, DEFAULT_MAX_COLUMNS);
        assert!(config.kanban.allow_drag_column);
        assert!(config.kanban.allow_add_card);
        assert!(!config.backlog.show_sprints);
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("boards.toml");

        let config = BoardConfig {
            max_columns: 4,
            ..BoardConfig::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(BoardConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = BoardConfig::load_from(&temp_dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read board config"));
    }

    #[test]
    fn test_props_carry_config() {
        let config = BoardConfig {
            max_columns: 3,
            locale: "de".to_string(),
            ..BoardConfig::default()
        };
        let props = config.kanban_props();
        assert_eq!(props.max_columns, 3);
        assert_eq!(props.locale, "de");
        assert!(props.board.is_none());
        assert_eq!(config.story_map_props().locale, "de");
    }
}
