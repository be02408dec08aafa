pub mod backlog;
pub mod common;
pub mod drag;
pub mod forms;
pub mod kanban;
pub mod story_map;

pub use common::{generate_id, EntityId, Identified, Ordered, Timestamped};
pub use drag::{ContainerKind, DragEvent, DragPosition, ItemKind};
