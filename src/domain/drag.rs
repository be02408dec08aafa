use super::common::EntityId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of lane a drop slot belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ContainerKind {
    Column,
    Board,
    Epic,
    Release,
    Sprint,
    Unscheduled,
    Persona,
    Activity,
    Task,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ItemKind {
    Card,
    Column,
    Epic,
    Story,
    Release,
    Sprint,
    Activity,
    Task,
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContainerKind::Column => "column",
            ContainerKind::Board => "board",
            ContainerKind::Epic => "epic",
            ContainerKind::Release => "release",
            ContainerKind::Sprint => "sprint",
            ContainerKind::Unscheduled => "unscheduled",
            ContainerKind::Persona => "persona",
            ContainerKind::Activity => "activity",
            ContainerKind::Task => "task",
        };
        f.write_str(name)
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ItemKind::Card => "card",
            ItemKind::Column => "column",
            ItemKind::Epic => "epic",
            ItemKind::Story => "story",
            ItemKind::Release => "release",
            ItemKind::Sprint => "sprint",
            ItemKind::Activity => "activity",
            ItemKind::Task => "task",
        };
        f.write_str(name)
    }
}

/// A slot locator: one index inside one lane. Identifies a position, not an entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DragPosition {
    pub container_id: EntityId,
    pub item_index: usize,
    pub container_kind: ContainerKind,
}

impl DragPosition {
    pub fn new(container_id: impl Into<EntityId>, item_index: usize, kind: ContainerKind) -> Self {
        Self {
            container_id: container_id.into(),
            item_index,
            container_kind: kind,
        }
    }

    pub fn same_container(&self, other: &DragPosition) -> bool {
        self.container_kind == other.container_kind && self.container_id == other.container_id
    }
}

/// One completed gesture. Also the payload handed to move listeners.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DragEvent {
    pub item_id: EntityId,
    pub item_kind: ItemKind,
    pub source_position: DragPosition,
    pub target_position: DragPosition,
}

impl DragEvent {
    pub fn is_cross_container(&self) -> bool {
        !self.source_position.same_container(&self.target_position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_container_compares_kind_and_id() {
        let a = DragPosition::new("c1", 0, ContainerKind::Column);
        let b = DragPosition::new("c1", 3, ContainerKind::Column);
        let c = DragPosition::new("c1", 0, ContainerKind::Release);
        assert!(a.same_container(&b));
        assert!(!a.same_container(&c));
    }

    #[test]
    fn test_drag_event_json_shape() {
        let event = DragEvent {
            item_id: "card-1".to_string(),
            item_kind: ItemKind::Card,
            source_position: DragPosition::new("todo", 0, ContainerKind::Column),
            target_position: DragPosition::new("doing", 1, ContainerKind::Column),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["itemId"], "card-1");
        assert_eq!(json["itemKind"], "card");
        assert_eq!(json["sourcePosition"]["containerId"], "todo");
        assert_eq!(json["targetPosition"]["itemIndex"], 1);
        assert!(event.is_cross_container());
    }
}
