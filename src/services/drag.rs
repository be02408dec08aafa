//! Drag gesture tracking and move validation.
//!
//! The machine only records where a gesture started and where it is
//! hovering. Whether the resulting move is legal is decided by
//! [`validate_move`] against a [`DragSurface`], which each board implements.

use crate::domain::common::EntityId;
use crate::domain::drag::{ContainerKind, DragEvent, DragPosition, ItemKind};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DragError {
    #[error("a drag of {item_id} is already in progress")]
    AlreadyDragging { item_id: EntityId },

    #[error("no drag in progress")]
    NotDragging,

    #[error("{kind} {item_id} not found")]
    UnknownItem { kind: ItemKind, item_id: EntityId },

    #[error("dragging {kind} is disabled")]
    Disabled { kind: ItemKind },
}

/// Why a proposed move was refused. Collections are never touched when one
/// of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveRejection {
    #[error("unknown {kind} container {container_id}")]
    UnknownContainer {
        kind: ContainerKind,
        container_id: EntityId,
    },

    #[error("source index {index} out of bounds for lane of {len}")]
    SourceIndexOutOfBounds { index: usize, len: usize },

    #[error("expected {expected} at source index, found {found}")]
    ItemMismatch { expected: EntityId, found: EntityId },

    #[error("target index {index} out of bounds for lane of {len}")]
    TargetIndexOutOfBounds { index: usize, len: usize },

    #[error("{container_id} is at capacity ({limit})")]
    CapacityExceeded { container_id: EntityId, limit: usize },

    #[error("cannot drop a {item} into a {container}")]
    UnsupportedKind {
        item: ItemKind,
        container: ContainerKind,
    },

    #[error("drag ended without a drop target")]
    NoTarget,

    #[error("drag is disabled")]
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    pub item_id: EntityId,
    pub item_kind: ItemKind,
    pub source: DragPosition,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
    Hovering {
        session: DragSession,
        target: DragPosition,
    },
}

#[derive(Debug, Clone, Default)]
pub struct DragMachine {
    state: DragState,
}

impl DragMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, DragState::Idle)
    }

    pub fn session(&self) -> Option<&DragSession> {
        match &self.state {
            DragState::Idle => None,
            DragState::Dragging(session) | DragState::Hovering { session, .. } => Some(session),
        }
    }

    pub fn target(&self) -> Option<&DragPosition> {
        match &self.state {
            DragState::Hovering { target, .. } => Some(target),
            _ => None,
        }
    }

    pub fn start(
        &mut self,
        item_id: impl Into<EntityId>,
        item_kind: ItemKind,
        source: DragPosition,
    ) -> Result<(), DragError> {
        if let Some(active) = self.session() {
            return Err(DragError::AlreadyDragging {
                item_id: active.item_id.clone(),
            });
        }
        let item_id = item_id.into();
        debug!(item_id = %item_id, kind = %item_kind, container_id = %source.container_id, "drag started");
        self.state = DragState::Dragging(DragSession {
            item_id,
            item_kind,
            source,
        });
        Ok(())
    }

    /// Record the slot under the pointer, replacing any earlier candidate.
    pub fn hover(&mut self, target: DragPosition) -> Result<(), DragError> {
        let session = self.session().cloned().ok_or(DragError::NotDragging)?;
        self.state = DragState::Hovering { session, target };
        Ok(())
    }

    /// The pointer left every drop zone.
    pub fn leave(&mut self) -> Result<(), DragError> {
        let session = self.session().cloned().ok_or(DragError::NotDragging)?;
        self.state = DragState::Dragging(session);
        Ok(())
    }

    /// End the gesture. Always returns to idle; yields an event only when a
    /// target was recorded.
    pub fn finish(&mut self) -> Option<DragEvent> {
        match std::mem::take(&mut self.state) {
            DragState::Hovering { session, target } => Some(DragEvent {
                item_id: session.item_id,
                item_kind: session.item_kind,
                source_position: session.source,
                target_position: target,
            }),
            DragState::Dragging(session) => {
                debug!(item_id = %session.item_id, "drag ended outside any drop zone");
                None
            }
            DragState::Idle => None,
        }
    }

    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }
}

/// A board as seen by move validation.
pub trait DragSurface {
    /// Ids of the lane at `container_id`, in `order`, or `None` when there is
    /// no such container of `kind` holding items of `item`.
    fn lane_ids(&self, position: &DragPosition, item: ItemKind) -> Option<Vec<EntityId>>;

    /// Maximum number of items the lane accepts.
    fn lane_capacity(&self, _position: &DragPosition) -> Option<usize> {
        None
    }
}

/// Check a completed gesture against the current board.
pub fn validate_move<S: DragSurface + ?Sized>(
    surface: &S,
    event: &DragEvent,
) -> Result<(), MoveRejection> {
    let source = &event.source_position;
    let target = &event.target_position;

    let unknown = |position: &DragPosition| MoveRejection::UnknownContainer {
        kind: position.container_kind,
        container_id: position.container_id.clone(),
    };
    let source_lane = surface
        .lane_ids(source, event.item_kind)
        .ok_or_else(|| unknown(source))?;
    let target_lane = surface
        .lane_ids(target, event.item_kind)
        .ok_or_else(|| unknown(target))?;

    let found = source_lane
        .get(source.item_index)
        .ok_or(MoveRejection::SourceIndexOutOfBounds {
            index: source.item_index,
            len: source_lane.len(),
        })?;
    if *found != event.item_id {
        return Err(MoveRejection::ItemMismatch {
            expected: event.item_id.clone(),
            found: found.clone(),
        });
    }

    if target.item_index > target_lane.len() {
        return Err(MoveRejection::TargetIndexOutOfBounds {
            index: target.item_index,
            len: target_lane.len(),
        });
    }

    if event.is_cross_container() {
        if let Some(limit) = surface.lane_capacity(target) {
            if target_lane.len() >= limit {
                return Err(MoveRejection::CapacityExceeded {
                    container_id: target.container_id.clone(),
                    limit,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Lanes {
        lanes: HashMap<String, Vec<String>>,
        capacity: HashMap<String, usize>,
    }

    impl Lanes {
        fn new(lanes: Vec<(&str, Vec<&str>)>) -> Self {
            Self {
                lanes: lanes
                    .into_iter()
                    .map(|(id, items)| {
                        (id.to_string(), items.iter().map(|s| s.to_string()).collect())
                    })
                    .collect(),
                capacity: HashMap::new(),
            }
        }
    }

    impl DragSurface for Lanes {
        fn lane_ids(&self, position: &DragPosition, _item: ItemKind) -> Option<Vec<EntityId>> {
            self.lanes.get(&position.container_id).cloned()
        }

        fn lane_capacity(&self, position: &DragPosition) -> Option<usize> {
            self.capacity.get(&position.container_id).copied()
        }
    }

    fn event(item: &str, from: (&str, usize), to: (&str, usize)) -> DragEvent {
        DragEvent {
            item_id: item.to_string(),
            item_kind: ItemKind::Card,
            source_position: DragPosition::new(from.0, from.1, ContainerKind::Column),
            target_position: DragPosition::new(to.0, to.1, ContainerKind::Column),
        }
    }

    #[test]
    fn test_machine_happy_path() {
        let mut machine = DragMachine::new();
        machine
            .start("a", ItemKind::Card, DragPosition::new("todo", 0, ContainerKind::Column))
            .unwrap();
        machine
            .hover(DragPosition::new("done", 2, ContainerKind::Column))
            .unwrap();
        machine
            .hover(DragPosition::new("doing", 0, ContainerKind::Column))
            .unwrap();
        assert_eq!(machine.target().map(|t| t.container_id.as_str()), Some("doing"));

        let event = machine.finish().unwrap();
        assert_eq!(event.item_id, "a");
        assert_eq!(event.target_position.container_id, "doing");
        assert!(machine.is_idle());
    }

    #[test]
    fn test_reentrant_start_rejected() {
        let mut machine = DragMachine::new();
        let source = DragPosition::new("todo", 0, ContainerKind::Column);
        machine.start("a", ItemKind::Card, source.clone()).unwrap();
        let err = machine.start("b", ItemKind::Card, source).unwrap_err();
        assert_eq!(
            err,
            DragError::AlreadyDragging {
                item_id: "a".to_string()
            }
        );
        assert_eq!(machine.session().map(|s| s.item_id.as_str()), Some("a"));
    }

    #[test]
    fn test_hover_requires_drag() {
        let mut machine = DragMachine::new();
        let target = DragPosition::new("todo", 0, ContainerKind::Column);
        assert_eq!(machine.hover(target), Err(DragError::NotDragging));
        assert_eq!(machine.leave(), Err(DragError::NotDragging));
    }

    #[test]
    fn test_finish_without_target_yields_nothing() {
        let mut machine = DragMachine::new();
        machine
            .start("a", ItemKind::Card, DragPosition::new("todo", 0, ContainerKind::Column))
            .unwrap();
        machine
            .hover(DragPosition::new("doing", 0, ContainerKind::Column))
            .unwrap();
        machine.leave().unwrap();
        assert!(machine.finish().is_none());
        assert!(machine.is_idle());
        assert!(machine.finish().is_none());
    }

    #[test]
    fn test_cancel_returns_to_idle() {
        let mut machine = DragMachine::new();
        machine
            .start("a", ItemKind::Card, DragPosition::new("todo", 0, ContainerKind::Column))
            .unwrap();
        machine.cancel();
        assert_eq!(machine.state(), &DragState::Idle);
    }

    #[test]
    fn test_validate_target_index_past_end() {
        let lanes = Lanes::new(vec![("todo", vec!["a", "b"]), ("doing", vec!["c", "d"])]);
        let result = validate_move(&lanes, &event("a", ("todo", 0), ("doing", 5)));
        assert_eq!(
            result,
            Err(MoveRejection::TargetIndexOutOfBounds { index: 5, len: 2 })
        );
        assert!(validate_move(&lanes, &event("a", ("todo", 0), ("doing", 2))).is_ok());
    }

    #[test]
    fn test_validate_source_checks() {
        let lanes = Lanes::new(vec![("todo", vec!["a", "b"])]);
        assert!(matches!(
            validate_move(&lanes, &event("a", ("nowhere", 0), ("todo", 0))),
            Err(MoveRejection::UnknownContainer { .. })
        ));
        assert!(matches!(
            validate_move(&lanes, &event("a", ("todo", 2), ("todo", 0))),
            Err(MoveRejection::SourceIndexOutOfBounds { index: 2, len: 2 })
        ));
        assert!(matches!(
            validate_move(&lanes, &event("a", ("todo", 1), ("todo", 0))),
            Err(MoveRejection::ItemMismatch { .. })
        ));
    }

    #[test]
    fn test_capacity_only_applies_across_containers() {
        let mut lanes = Lanes::new(vec![("todo", vec!["a", "b"]), ("doing", vec!["c"])]);
        lanes.capacity.insert("doing".to_string(), 1);
        lanes.capacity.insert("todo".to_string(), 2);

        assert!(matches!(
            validate_move(&lanes, &event("a", ("todo", 0), ("doing", 0))),
            Err(MoveRejection::CapacityExceeded { limit: 1, .. })
        ));
        assert!(validate_move(&lanes, &event("a", ("todo", 0), ("todo", 1))).is_ok());
    }
}
