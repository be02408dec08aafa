//! Inbound settings shared by the board models: permission flags and the
//! presentation selectors the host passes through.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

pub const DEFAULT_LOCALE: &str = "en";
pub const DEFAULT_MAX_COLUMNS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct KanbanPermissions {
    pub allow_add_column: bool,
    pub allow_remove_column: bool,
    pub allow_add_card: bool,
    pub allow_remove_card: bool,
    pub allow_edit_card: bool,
    pub allow_drag_card: bool,
    pub allow_drag_column: bool,
    pub show_card_count: bool,
    pub show_column_actions: bool,
}

impl Default for KanbanPermissions {
    fn default() -> Self {
        Self {
            allow_add_column: true,
            allow_remove_column: true,
            allow_add_card: true,
            allow_remove_card: true,
            allow_edit_card: true,
            allow_drag_card: true,
            allow_drag_column: false,
            show_card_count: true,
            show_column_actions: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BacklogPermissions {
    pub allow_add_epic: bool,
    pub allow_remove_epic: bool,
    pub allow_add_story: bool,
    pub allow_remove_story: bool,
    pub allow_add_release: bool,
    pub allow_remove_release: bool,
    pub allow_add_sprint: bool,
    pub allow_remove_sprint: bool,
    pub allow_drag_drop: bool,
    pub show_story_points: bool,
    pub show_unscheduled: bool,
    pub show_sprints: bool,
}

impl Default for BacklogPermissions {
    fn default() -> Self {
        Self {
            allow_add_epic: true,
            allow_remove_epic: true,
            allow_add_story: true,
            allow_remove_story: true,
            allow_add_release: true,
            allow_remove_release: true,
            allow_add_sprint: true,
            allow_remove_sprint: true,
            allow_drag_drop: true,
            show_story_points: true,
            show_unscheduled: true,
            show_sprints: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StoryMapPermissions {
    pub allow_add_persona: bool,
    pub allow_remove_persona: bool,
    pub allow_add_activity: bool,
    pub allow_remove_activity: bool,
    pub allow_add_task: bool,
    pub allow_remove_task: bool,
    pub allow_add_story: bool,
    pub allow_remove_story: bool,
    pub allow_add_release: bool,
    pub allow_remove_release: bool,
    pub allow_drag_drop: bool,
    pub show_story_points: bool,
    pub show_releases: bool,
}

impl Default for StoryMapPermissions {
    fn default() -> Self {
        Self {
            allow_add_persona: true,
            allow_remove_persona: true,
            allow_add_activity: true,
            allow_remove_activity: true,
            allow_add_task: true,
            allow_remove_task: true,
            allow_add_story: true,
            allow_remove_story: true,
            allow_add_release: true,
            allow_remove_release: true,
            allow_drag_drop: true,
            show_story_points: true,
            show_releases: true,
        }
    }
}
