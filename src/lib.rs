pub mod config;
pub mod domain;
pub mod schema;
pub mod services;

pub use config::BoardConfig;
pub use domain::{ContainerKind, DragEvent, DragPosition, EntityId, ItemKind};
pub use schema::{export_json, import_backlog, import_kanban, import_story_map, ImportError};
pub use services::{
    BacklogBoardModel, BacklogChange, BacklogProps, KanbanBoardModel, KanbanChange, KanbanProps,
    StoryMapBoardModel, StoryMapChange, StoryMapProps,
};
