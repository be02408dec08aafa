pub mod backlog_board;
pub mod drag;
pub mod events;
pub mod kanban_board;
pub mod ordering;
pub mod props;
pub mod relations;
pub mod story_map_board;

pub use backlog_board::{BacklogBoardModel, BacklogChange, BacklogProps, ViewMode};
pub use drag::{DragError, DragMachine, DragState, DragSurface, MoveRejection};
pub use events::{ListenerId, Listeners};
pub use kanban_board::{KanbanBoardModel, KanbanChange, KanbanProps};
pub use props::{BacklogPermissions, KanbanPermissions, StoryMapPermissions, Theme};
pub use story_map_board::{StoryMapBoardModel, StoryMapChange, StoryMapProps};
