//! Stateful backlog view-model: epics, stories, releases and sprints.

use crate::domain::backlog::{
    BacklogBoard, BacklogBoardPatch, Epic, EpicPatch, Release, ReleasePatch, Sprint, SprintPatch,
    StoryLane, UserStory, UserStoryPatch,
};
use crate::domain::common::{EntityId, Identified, Timestamped};
use crate::domain::drag::{ContainerKind, DragEvent, DragPosition, ItemKind};
use crate::services::drag::{
    validate_move, DragError, DragMachine, DragState, DragSurface, MoveRejection,
};
use crate::services::events::{ListenerId, Listeners};
use crate::services::ordering::{self, Direction};
use crate::services::props::{BacklogPermissions, Theme, DEFAULT_LOCALE};
use crate::services::relations;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Container id used for the Unscheduled lane in drag positions.
pub const UNSCHEDULED_LANE: &str = "unscheduled";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ViewMode {
    #[default]
    StoryMap,
    Backlog,
    Sprint,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacklogProps {
    pub board: Option<BacklogBoard>,
    pub epics: Vec<Epic>,
    pub user_stories: Vec<UserStory>,
    pub releases: Vec<Release>,
    pub sprints: Vec<Sprint>,
    pub permissions: BacklogPermissions,
    pub view_mode: ViewMode,
    pub theme: Theme,
    pub locale: String,
}

impl Default for BacklogProps {
    fn default() -> Self {
        Self {
            board: None,
            epics: Vec::new(),
            user_stories: Vec::new(),
            releases: Vec::new(),
            sprints: Vec::new(),
            permissions: BacklogPermissions::default(),
            view_mode: ViewMode::default(),
            theme: Theme::default(),
            locale: DEFAULT_LOCALE.to_string(),
        }
    }
}

impl BacklogProps {
    pub fn with_board(board: BacklogBoard) -> Self {
        Self {
            board: Some(board),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BacklogChange {
    EpicAdded(Epic),
    EpicUpdated { epic_id: EntityId, updates: EpicPatch },
    EpicRemoved { epic_id: EntityId },
    StoryAdded { epic_id: Option<EntityId>, story: UserStory },
    StoryUpdated { story_id: EntityId, updates: UserStoryPatch },
    StoryRemoved { story_id: EntityId },
    ReleaseAdded(Release),
    ReleaseUpdated { release_id: EntityId, updates: ReleasePatch },
    ReleaseRemoved { release_id: EntityId },
    SprintAdded { release_id: Option<EntityId>, sprint: Sprint },
    SprintUpdated { sprint_id: EntityId, updates: SprintPatch },
    SprintRemoved { sprint_id: EntityId },
    ItemMoved(DragEvent),
    ViewModeChanged(ViewMode),
    BoardUpdated(BacklogBoard),
}

/// Which add form is open, and for which container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BacklogForm {
    Epic,
    Story {
        epic_id: Option<EntityId>,
        release_id: Option<EntityId>,
    },
    Release,
    Sprint {
        release_id: Option<EntityId>,
    },
}

fn lane_position(release_id: Option<&str>, index: usize) -> DragPosition {
    match release_id {
        Some(id) => DragPosition::new(id, index, ContainerKind::Release),
        None => DragPosition::new(UNSCHEDULED_LANE, index, ContainerKind::Unscheduled),
    }
}

/// The release a lane position points at: `Some(None)` for the Unscheduled
/// lane, `None` for anything that is not a release lane.
fn release_of(position: &DragPosition) -> Option<Option<EntityId>> {
    match position.container_kind {
        ContainerKind::Release => Some(Some(position.container_id.clone())),
        ContainerKind::Unscheduled if position.container_id == UNSCHEDULED_LANE => Some(None),
        _ => None,
    }
}

impl DragSurface for BacklogBoard {
    fn lane_ids(&self, position: &DragPosition, item: ItemKind) -> Option<Vec<EntityId>> {
        match item {
            ItemKind::Epic | ItemKind::Release => {
                if position.container_kind != ContainerKind::Board || position.container_id != self.id
                {
                    return None;
                }
                let ids: Vec<EntityId> = if item == ItemKind::Epic {
                    ordering::sorted_lane(&self.epics, |_| true).into_iter().map(|e| e.id).collect()
                } else {
                    ordering::sorted_lane(&self.releases, |_| true).into_iter().map(|r| r.id).collect()
                };
                Some(ids)
            }
            ItemKind::Story if position.container_kind == ContainerKind::Epic => {
                let epic_id = &self.epic(&position.container_id)?.id;
                let ids = ordering::sorted_lane(&self.user_stories, |s| {
                    s.epic_id.as_ref() == Some(epic_id)
                });
                Some(ids.into_iter().map(|s| s.id).collect())
            }
            ItemKind::Story if position.container_kind == ContainerKind::Sprint => {
                let sprint_id = &self.sprint(&position.container_id)?.id;
                let ids = ordering::sorted_lane(&self.user_stories, |s| {
                    s.sprint_id.as_ref() == Some(sprint_id)
                });
                Some(ids.into_iter().map(|s| s.id).collect())
            }
            ItemKind::Story | ItemKind::Sprint => {
                let release = release_of(position)?;
                if let Some(release_id) = &release {
                    self.release(release_id)?;
                }
                let ids: Vec<EntityId> = if item == ItemKind::Story {
                    let lane = lane_key(&release);
                    ordering::sorted_lane(&self.user_stories, |s| s.lane() == lane)
                        .into_iter()
                        .map(|s| s.id)
                        .collect()
                } else {
                    ordering::sorted_lane(&self.sprints, |s| s.release_id == release)
                        .into_iter()
                        .map(|s| s.id)
                        .collect()
                };
                Some(ids)
            }
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct BacklogBoardModel {
    props: BacklogProps,
    board: Option<BacklogBoard>,
    view_mode: ViewMode,
    drag: DragMachine,
    editing: Option<(ItemKind, EntityId)>,
    add_form: Option<BacklogForm>,
    listeners: Listeners<BacklogChange>,
}

impl BacklogBoardModel {
    pub fn new(props: BacklogProps) -> Self {
        let mut model = Self {
            props: BacklogProps::default(),
            board: None,
            view_mode: ViewMode::default(),
            drag: DragMachine::new(),
            editing: None,
            add_form: None,
            listeners: Listeners::new(),
        };
        model.update_props(props);
        model
    }

    /// Full reset from `props`; drags and edits in progress are dropped.
    pub fn update_props(&mut self, props: BacklogProps) {
        self.drag.cancel();
        self.editing = None;
        self.add_form = None;

        let mut board = match props.board.clone() {
            Some(board) => board,
            None => BacklogBoard::create(BacklogBoardPatch {
                description: Some("Agile product backlog and story mapping".to_string()),
                epics: Some(props.epics.clone()),
                user_stories: Some(props.user_stories.clone()),
                releases: Some(props.releases.clone()),
                sprints: Some(props.sprints.clone()),
                ..BacklogBoardPatch::default()
            }),
        };
        normalize(&mut board);

        debug!(board_id = %board.id, stories = board.user_stories.len(), "backlog board initialised");
        self.board = Some(board);
        self.view_mode = props.view_mode;
        self.props = props;
    }

    pub fn destroy(&mut self) {
        self.board = None;
        self.view_mode = ViewMode::default();
        self.drag.cancel();
        self.editing = None;
        self.add_form = None;
        self.listeners.clear();
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&BacklogChange) + 'static) -> ListenerId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    // Queries

    pub fn props(&self) -> &BacklogProps {
        &self.props
    }

    pub fn board(&self) -> Option<&BacklogBoard> {
        self.board.as_ref()
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn epics(&self) -> Vec<Epic> {
        self.board
            .as_ref()
            .map(|b| ordering::sorted_lane(&b.epics, |_| true))
            .unwrap_or_default()
    }

    pub fn releases(&self) -> Vec<Release> {
        self.board
            .as_ref()
            .map(|b| ordering::sorted_lane(&b.releases, |_| true))
            .unwrap_or_default()
    }

    fn stories_where(&self, keep: impl Fn(&UserStory) -> bool) -> Vec<UserStory> {
        self.board
            .as_ref()
            .map(|b| ordering::sorted_lane(&b.user_stories, keep))
            .unwrap_or_default()
    }

    pub fn stories_for_epic(&self, epic_id: &str) -> Vec<UserStory> {
        self.stories_where(|s| s.epic_id.as_deref() == Some(epic_id))
    }

    pub fn stories_for_release(&self, release_id: &str) -> Vec<UserStory> {
        self.stories_where(|s| s.release_id.as_deref() == Some(release_id))
    }

    pub fn stories_for_sprint(&self, sprint_id: &str) -> Vec<UserStory> {
        self.stories_where(|s| s.sprint_id.as_deref() == Some(sprint_id))
    }

    pub fn unscheduled_stories(&self) -> Vec<UserStory> {
        self.stories_where(|s| s.release_id.is_none())
    }

    /// Sprints of one release, or the sprints without a release for `None`.
    pub fn sprints_for_release(&self, release_id: Option<&str>) -> Vec<Sprint> {
        self.board
            .as_ref()
            .map(|b| ordering::sorted_lane(&b.sprints, |s| s.release_id.as_deref() == release_id))
            .unwrap_or_default()
    }

    pub fn release_story_points(&self, release_id: &str) -> f64 {
        self.stories_for_release(release_id).iter().map(UserStory::points).sum()
    }

    pub fn sprint_story_points(&self, sprint_id: &str) -> f64 {
        self.stories_for_sprint(sprint_id).iter().map(UserStory::points).sum()
    }

    pub fn drag_state(&self) -> &DragState {
        self.drag.state()
    }

    pub fn editing(&self) -> Option<&(ItemKind, EntityId)> {
        self.editing.as_ref()
    }

    pub fn add_form(&self) -> Option<&BacklogForm> {
        self.add_form.as_ref()
    }

    // View mode

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
        self.listeners.emit(&BacklogChange::ViewModeChanged(mode));
    }

    // Epics

    pub fn add_epic(&mut self, patch: EpicPatch) -> Option<Epic> {
        if !self.props.permissions.allow_add_epic {
            debug!("add epic ignored: not allowed");
            return None;
        }
        let board = self.board.as_mut()?;
        let epic = Epic::create(EpicPatch {
            order: Some(board.epics.len()),
            ..patch
        });
        board.epics.push(epic.clone());
        board.epics = ordering::reindex(&board.epics);

        info!(board_id = %board.id, epic_id = %epic.id, "epic added");
        self.listeners.emit(&BacklogChange::EpicAdded(epic.clone()));
        self.add_form = None;
        self.commit();
        Some(epic)
    }

    pub fn update_epic(&mut self, epic_id: &str, updates: EpicPatch) -> Option<Epic> {
        let board = self.board.as_mut()?;
        let Some(index) = board.epics.iter().position(|e| e.id == epic_id) else {
            debug!(epic_id, "update epic ignored: unknown epic");
            return None;
        };
        let updated = board.epics[index].update(&updates);
        let updated_id = updated.id.clone();
        board.epics[index] = updated;
        board.epics = ordering::reindex(&board.epics);
        let epic = board.epic(&updated_id).cloned();
        info!(board_id = %board.id, epic_id = %updated_id, "epic updated");

        self.listeners.emit(&BacklogChange::EpicUpdated {
            epic_id: epic_id.to_string(),
            updates,
        });
        self.clear_editing(epic_id);
        self.commit();
        epic
    }

    /// Stories of the epic stay on the board with `epic_id` cleared.
    pub fn remove_epic(&mut self, epic_id: &str) -> bool {
        if !self.props.permissions.allow_remove_epic {
            debug!(epic_id, "remove epic ignored: not allowed");
            return false;
        }
        let Some(board) = self.board.as_mut() else {
            return false;
        };
        let Some(next) = relations::remove_epic(board, epic_id) else {
            debug!(epic_id, "remove epic ignored: unknown epic");
            return false;
        };
        *board = next;

        info!(board_id = %board.id, epic_id, "epic removed");
        self.listeners.emit(&BacklogChange::EpicRemoved {
            epic_id: epic_id.to_string(),
        });
        self.clear_editing(epic_id);
        self.commit();
        true
    }

    pub fn move_epic(&mut self, epic_id: &str, direction: Direction) -> bool {
        let Some(board) = self.board.as_ref() else {
            return false;
        };
        let board_id = board.id.clone();
        let lane = ordering::sorted_lane(&board.epics, |_| true);
        self.step_move(epic_id, ItemKind::Epic, &lane, direction, |from, to| {
            (
                DragPosition::new(board_id.clone(), from, ContainerKind::Board),
                DragPosition::new(board_id.clone(), to, ContainerKind::Board),
            )
        })
    }

    // Stories

    /// Add a story to the end of its lane. The explicit epic and release win
    /// over the same fields in `patch`.
    pub fn add_story(
        &mut self,
        epic_id: Option<&str>,
        release_id: Option<&str>,
        patch: UserStoryPatch,
    ) -> Option<UserStory> {
        if !self.props.permissions.allow_add_story {
            debug!("add story ignored: not allowed");
            return None;
        }
        let board = self.board.as_mut()?;
        let lane = match release_id {
            Some(id) => StoryLane::Release(id.to_string()),
            None => StoryLane::Unscheduled,
        };
        let order = board.user_stories.iter().filter(|s| s.lane() == lane).count();
        let story = UserStory::create(UserStoryPatch {
            epic_id: Some(epic_id.map(str::to_string)),
            release_id: Some(release_id.map(str::to_string)),
            order: Some(order),
            ..patch
        });
        board.user_stories.push(story.clone());
        ordering::reindex_lanes(&mut board.user_stories, UserStory::lane);
        let story = board.story(&story.id).cloned().unwrap_or(story);

        info!(board_id = %board.id, story_id = %story.id, "story added");
        self.listeners.emit(&BacklogChange::StoryAdded {
            epic_id: epic_id.map(str::to_string),
            story: story.clone(),
        });
        self.add_form = None;
        self.commit();
        Some(story)
    }

    /// A story whose release changes joins the end of its new lane unless the
    /// update also sets `order`.
    pub fn update_story(&mut self, story_id: &str, updates: UserStoryPatch) -> Option<UserStory> {
        let board = self.board.as_mut()?;
        let Some(index) = board.user_stories.iter().position(|s| s.id == story_id) else {
            debug!(story_id, "update story ignored: unknown story");
            return None;
        };
        let previous_lane = board.user_stories[index].lane();
        let mut updated = board.user_stories[index].update(&updates);
        if updated.lane() != previous_lane && updates.order.is_none() {
            updated.order = usize::MAX;
        }
        let updated_id = updated.id.clone();
        board.user_stories[index] = updated;
        ordering::reindex_lanes(&mut board.user_stories, UserStory::lane);
        let story = board.story(&updated_id).cloned();
        info!(board_id = %board.id, story_id = %updated_id, "story updated");

        self.listeners.emit(&BacklogChange::StoryUpdated {
            story_id: story_id.to_string(),
            updates,
        });
        self.clear_editing(story_id);
        self.commit();
        story
    }

    pub fn remove_story(&mut self, story_id: &str) -> bool {
        if !self.props.permissions.allow_remove_story {
            debug!(story_id, "remove story ignored: not allowed");
            return false;
        }
        let Some(board) = self.board.as_mut() else {
            return false;
        };
        let Some(next) = relations::remove_story(board, story_id) else {
            debug!(story_id, "remove story ignored: unknown story");
            return false;
        };
        *board = next;

        info!(board_id = %board.id, story_id, "story removed");
        self.listeners.emit(&BacklogChange::StoryRemoved {
            story_id: story_id.to_string(),
        });
        self.clear_editing(story_id);
        self.commit();
        true
    }

    // Releases

    pub fn add_release(&mut self, patch: ReleasePatch) -> Option<Release> {
        if !self.props.permissions.allow_add_release {
            debug!("add release ignored: not allowed");
            return None;
        }
        let board = self.board.as_mut()?;
        let release = Release::create(ReleasePatch {
            order: Some(board.releases.len()),
            ..patch
        });
        board.releases.push(release.clone());
        board.releases = ordering::reindex(&board.releases);

        info!(board_id = %board.id, release_id = %release.id, "release added");
        self.listeners.emit(&BacklogChange::ReleaseAdded(release.clone()));
        self.add_form = None;
        self.commit();
        Some(release)
    }

    pub fn update_release(&mut self, release_id: &str, updates: ReleasePatch) -> Option<Release> {
        let board = self.board.as_mut()?;
        let Some(index) = board.releases.iter().position(|r| r.id == release_id) else {
            debug!(release_id, "update release ignored: unknown release");
            return None;
        };
        let updated = board.releases[index].update(&updates);
        let updated_id = updated.id.clone();
        board.releases[index] = updated;
        board.releases = ordering::reindex(&board.releases);
        let release = board.release(&updated_id).cloned();
        info!(board_id = %board.id, release_id = %updated_id, "release updated");

        self.listeners.emit(&BacklogChange::ReleaseUpdated {
            release_id: release_id.to_string(),
            updates,
        });
        self.clear_editing(release_id);
        self.commit();
        release
    }

    /// Stories and sprints of the release become unscheduled.
    pub fn remove_release(&mut self, release_id: &str) -> bool {
        if !self.props.permissions.allow_remove_release {
            debug!(release_id, "remove release ignored: not allowed");
            return false;
        }
        let Some(board) = self.board.as_mut() else {
            return false;
        };
        let Some(next) = relations::remove_release(board, release_id) else {
            debug!(release_id, "remove release ignored: unknown release");
            return false;
        };
        *board = next;

        info!(board_id = %board.id, release_id, "release removed");
        self.listeners.emit(&BacklogChange::ReleaseRemoved {
            release_id: release_id.to_string(),
        });
        self.clear_editing(release_id);
        self.commit();
        true
    }

    pub fn move_release(&mut self, release_id: &str, direction: Direction) -> bool {
        let Some(board) = self.board.as_ref() else {
            return false;
        };
        let board_id = board.id.clone();
        let lane = ordering::sorted_lane(&board.releases, |_| true);
        self.step_move(release_id, ItemKind::Release, &lane, direction, |from, to| {
            (
                DragPosition::new(board_id.clone(), from, ContainerKind::Board),
                DragPosition::new(board_id.clone(), to, ContainerKind::Board),
            )
        })
    }

    // Sprints

    pub fn add_sprint(&mut self, release_id: Option<&str>, patch: SprintPatch) -> Option<Sprint> {
        if !self.props.permissions.allow_add_sprint {
            debug!("add sprint ignored: not allowed");
            return None;
        }
        let board = self.board.as_mut()?;
        let order = board
            .sprints
            .iter()
            .filter(|s| s.release_id.as_deref() == release_id)
            .count();
        let sprint = Sprint::create(SprintPatch {
            release_id: Some(release_id.map(str::to_string)),
            order: Some(order),
            ..patch
        });
        board.sprints.push(sprint.clone());
        ordering::reindex_lanes(&mut board.sprints, |s| s.release_id.clone());

        info!(board_id = %board.id, sprint_id = %sprint.id, "sprint added");
        self.listeners.emit(&BacklogChange::SprintAdded {
            release_id: release_id.map(str::to_string),
            sprint: sprint.clone(),
        });
        self.add_form = None;
        self.commit();
        Some(sprint)
    }

    pub fn update_sprint(&mut self, sprint_id: &str, updates: SprintPatch) -> Option<Sprint> {
        let board = self.board.as_mut()?;
        let Some(index) = board.sprints.iter().position(|s| s.id == sprint_id) else {
            debug!(sprint_id, "update sprint ignored: unknown sprint");
            return None;
        };
        let previous_release = board.sprints[index].release_id.clone();
        let mut updated = board.sprints[index].update(&updates);
        if updated.release_id != previous_release && updates.order.is_none() {
            updated.order = usize::MAX;
        }
        let updated_id = updated.id.clone();
        board.sprints[index] = updated;
        ordering::reindex_lanes(&mut board.sprints, |s| s.release_id.clone());
        let sprint = board.sprint(&updated_id).cloned();
        info!(board_id = %board.id, sprint_id = %updated_id, "sprint updated");

        self.listeners.emit(&BacklogChange::SprintUpdated {
            sprint_id: sprint_id.to_string(),
            updates,
        });
        self.clear_editing(sprint_id);
        self.commit();
        sprint
    }

    /// Stories of the sprint keep their place with `sprint_id` cleared.
    pub fn remove_sprint(&mut self, sprint_id: &str) -> bool {
        if !self.props.permissions.allow_remove_sprint {
            debug!(sprint_id, "remove sprint ignored: not allowed");
            return false;
        }
        let Some(board) = self.board.as_mut() else {
            return false;
        };
        let Some(next) = relations::remove_sprint(board, sprint_id) else {
            debug!(sprint_id, "remove sprint ignored: unknown sprint");
            return false;
        };
        *board = next;

        info!(board_id = %board.id, sprint_id, "sprint removed");
        self.listeners.emit(&BacklogChange::SprintRemoved {
            sprint_id: sprint_id.to_string(),
        });
        self.clear_editing(sprint_id);
        self.commit();
        true
    }

    // Drag and drop

    /// Begin dragging an epic, story, release or sprint from its current slot.
    pub fn start_drag(&mut self, kind: ItemKind, item_id: &str) -> Result<(), DragError> {
        if !self.props.permissions.allow_drag_drop {
            return Err(DragError::Disabled { kind });
        }
        let source = self
            .board
            .as_ref()
            .and_then(|board| source_position(board, kind, item_id))
            .ok_or_else(|| DragError::UnknownItem {
                kind,
                item_id: item_id.to_string(),
            })?;
        self.drag.start(item_id, kind, source)
    }

    pub fn hover(&mut self, target: DragPosition) -> Result<(), DragError> {
        self.drag.hover(target)
    }

    pub fn leave(&mut self) -> Result<(), DragError> {
        self.drag.leave()
    }

    pub fn cancel_drag(&mut self) {
        self.drag.cancel();
    }

    pub fn end_drag(&mut self) -> Result<DragEvent, MoveRejection> {
        let event = self.drag.finish().ok_or(MoveRejection::NoTarget)?;
        self.apply_move(event)
    }

    pub fn apply_move(&mut self, event: DragEvent) -> Result<DragEvent, MoveRejection> {
        if !self.props.permissions.allow_drag_drop {
            debug!(item_id = %event.item_id, "move ignored: drag disabled");
            return Err(MoveRejection::Disabled);
        }
        let Some(board) = self.board.as_mut() else {
            return Err(MoveRejection::UnknownContainer {
                kind: event.source_position.container_kind,
                container_id: event.source_position.container_id.clone(),
            });
        };
        if let Err(rejection) = validate_move(&*board, &event) {
            debug!(item_id = %event.item_id, %rejection, "move rejected");
            return Err(rejection);
        }
        apply_backlog_move(board, &event)?;

        info!(
            board_id = %board.id,
            item_id = %event.item_id,
            kind = %event.item_kind,
            from = %event.source_position.container_id,
            to = %event.target_position.container_id,
            "item moved"
        );
        self.listeners.emit(&BacklogChange::ItemMoved(event.clone()));
        self.commit();
        Ok(event)
    }

    // UI flags

    pub fn toggle_edit(&mut self, kind: ItemKind, item_id: &str) {
        let target = (kind, item_id.to_string());
        if self.editing.as_ref() == Some(&target) {
            self.editing = None;
        } else {
            self.editing = Some(target);
        }
    }

    pub fn toggle_add_form(&mut self, form: BacklogForm) {
        if self.add_form.as_ref() == Some(&form) {
            self.add_form = None;
        } else {
            self.add_form = Some(form);
        }
    }

    fn clear_editing(&mut self, item_id: &str) {
        if self.editing.as_ref().is_some_and(|(_, id)| id == item_id) {
            self.editing = None;
        }
    }

    fn step_move(
        &mut self,
        item_id: &str,
        kind: ItemKind,
        lane: &[impl Identified],
        direction: Direction,
        positions: impl Fn(usize, usize) -> (DragPosition, DragPosition),
    ) -> bool {
        let Some(from) = lane.iter().position(|item| item.id() == item_id) else {
            debug!(item_id, %kind, "move ignored: unknown item");
            return false;
        };
        let Some(to) = ordering::step_target(lane.len(), from, direction) else {
            debug!(item_id, ?direction, "move ignored: already at the edge");
            return false;
        };
        let (source_position, target_position) = positions(from, to);
        self.apply_move(DragEvent {
            item_id: item_id.to_string(),
            item_kind: kind,
            source_position,
            target_position,
        })
        .is_ok()
    }

    fn commit(&mut self) {
        if let Some(board) = self.board.as_mut() {
            board.touch();
            let snapshot = board.clone();
            self.listeners.emit(&BacklogChange::BoardUpdated(snapshot));
        }
    }
}

/// Renumber every lane of a freshly loaded board.
pub fn normalize(board: &mut BacklogBoard) {
    board.epics = ordering::reindex(&board.epics);
    board.releases = ordering::reindex(&board.releases);
    ordering::reindex_lanes(&mut board.user_stories, UserStory::lane);
    ordering::reindex_lanes(&mut board.sprints, |s| s.release_id.clone());
}

fn source_position(board: &BacklogBoard, kind: ItemKind, item_id: &str) -> Option<DragPosition> {
    let index_in = |ids: Vec<EntityId>| ids.iter().position(|id| id == item_id);
    match kind {
        ItemKind::Epic | ItemKind::Release => {
            let position = DragPosition::new(board.id.clone(), 0, ContainerKind::Board);
            let index = index_in(board.lane_ids(&position, kind)?)?;
            Some(DragPosition { item_index: index, ..position })
        }
        ItemKind::Story => {
            let story = board.story(item_id)?;
            let position = lane_position(story.release_id.as_deref(), 0);
            let index = index_in(board.lane_ids(&position, kind)?)?;
            Some(DragPosition { item_index: index, ..position })
        }
        ItemKind::Sprint => {
            let sprint = board.sprint(item_id)?;
            let position = lane_position(sprint.release_id.as_deref(), 0);
            let index = index_in(board.lane_ids(&position, kind)?)?;
            Some(DragPosition { item_index: index, ..position })
        }
        _ => None,
    }
}

/// Commit a validated move onto the board.
pub fn apply_backlog_move(board: &mut BacklogBoard, event: &DragEvent) -> Result<(), MoveRejection> {
    let unsupported = || MoveRejection::UnsupportedKind {
        item: event.item_kind,
        container: event.target_position.container_kind,
    };
    let from = event.source_position.item_index;
    let to = event.target_position.item_index;
    match event.item_kind {
        ItemKind::Epic => {
            board.epics = ordering::reorder_touching(&board.epics, from, to);
        }
        ItemKind::Release => {
            board.releases = ordering::reorder_touching(&board.releases, from, to);
        }
        ItemKind::Story => {
            let source_lane = board
                .story(&event.item_id)
                .map(UserStory::lane)
                .ok_or_else(unsupported)?;
            match event.target_position.container_kind {
                ContainerKind::Epic => {
                    let epic_id = event.target_position.container_id.clone();
                    if let Some(story) = story_mut(board, &event.item_id) {
                        story.epic_id = Some(epic_id);
                        story.touch();
                    }
                }
                ContainerKind::Sprint => {
                    let sprint = board
                        .sprint(&event.target_position.container_id)
                        .ok_or_else(unsupported)?;
                    let sprint_id = sprint.id.clone();
                    let release = sprint.release_id.clone();
                    let target_lane = lane_key(&release);
                    let relink = |story: &mut UserStory| {
                        story.sprint_id = Some(sprint_id);
                        story.release_id = release;
                        story.touch();
                    };
                    if target_lane == source_lane {
                        if let Some(story) = story_mut(board, &event.item_id) {
                            relink(story);
                        }
                    } else {
                        // Another release: the story joins the end of its lane.
                        ordering::move_across_lanes(
                            &mut board.user_stories,
                            &event.item_id,
                            |s| s.lane() == source_lane,
                            |s| s.lane() == target_lane,
                            usize::MAX,
                            relink,
                        );
                    }
                }
                _ => {
                    let target = release_of(&event.target_position).ok_or_else(unsupported)?;
                    let target_lane = lane_key(&target);
                    ordering::move_across_lanes(
                        &mut board.user_stories,
                        &event.item_id,
                        |s| s.lane() == source_lane,
                        |s| s.lane() == target_lane,
                        to,
                        |story| {
                            story.release_id = target;
                            story.touch();
                        },
                    );
                }
            }
        }
        ItemKind::Sprint => {
            let source = release_of(&event.source_position).ok_or_else(unsupported)?;
            let target = release_of(&event.target_position).ok_or_else(unsupported)?;
            ordering::move_across_lanes(
                &mut board.sprints,
                &event.item_id,
                |s| s.release_id == source,
                |s| s.release_id == target,
                to,
                |sprint| {
                    sprint.release_id = target.clone();
                    sprint.touch();
                },
            );
        }
        _ => return Err(unsupported()),
    }
    Ok(())
}

fn story_mut<'a>(board: &'a mut BacklogBoard, story_id: &str) -> Option<&'a mut UserStory> {
    board.user_stories.iter_mut().find(|s| s.id == story_id)
}

fn lane_key(release: &Option<EntityId>) -> StoryLane {
    match release {
        Some(id) => StoryLane::Release(id.clone()),
        None => StoryLane::Unscheduled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn model() -> BacklogBoardModel {
        BacklogBoardModel::new(BacklogProps::default())
    }

    fn titles(stories: &[UserStory]) -> Vec<&str> {
        stories.iter().map(|s| s.title.as_str()).collect()
    }

    #[test]
    fn test_new_board_defaults() {
        let model = model();
        let board = model.board().unwrap();
        assert_eq!(board.title, "Product Backlog");
        assert_eq!(model.view_mode(), ViewMode::StoryMap);
    }

    #[test]
    fn test_add_story_orders_within_lane() {
        let mut model = model();
        let release = model.add_release(ReleasePatch::named("v1")).unwrap();
        let a = model.add_story(None, Some(&release.id), UserStoryPatch::titled("A")).unwrap();
        let b = model.add_story(None, Some(&release.id), UserStoryPatch::titled("B")).unwrap();
        let u = model.add_story(None, None, UserStoryPatch::titled("U")).unwrap();
        assert_eq!((a.order, b.order, u.order), (0, 1, 0));
        assert_eq!(titles(&model.stories_for_release(&release.id)), vec!["A", "B"]);
        assert_eq!(titles(&model.unscheduled_stories()), vec!["U"]);
    }

    #[test]
    fn test_remove_epic_keeps_stories() {
        let mut model = model();
        let epic = model.add_epic(EpicPatch::titled("E")).unwrap();
        let story = model.add_story(Some(&epic.id), None, UserStoryPatch::titled("S")).unwrap();
        assert_eq!(model.stories_for_epic(&epic.id).len(), 1);

        assert!(model.remove_epic(&epic.id));
        assert!(model.epics().is_empty());
        let board = model.board().unwrap();
        assert_eq!(board.story(&story.id).unwrap().epic_id, None);
    }

    #[test]
    fn test_update_story_release_joins_end_of_lane() {
        let mut model = model();
        let release = model.add_release(ReleasePatch::named("v1")).unwrap();
        model.add_story(None, Some(&release.id), UserStoryPatch::titled("A")).unwrap();
        let u1 = model.add_story(None, None, UserStoryPatch::titled("U1")).unwrap();
        model.add_story(None, None, UserStoryPatch::titled("U2")).unwrap();

        model.update_story(
            &u1.id,
            UserStoryPatch {
                release_id: Some(Some(release.id.clone())),
                ..UserStoryPatch::default()
            },
        );
        let lane = model.stories_for_release(&release.id);
        assert_eq!(titles(&lane), vec!["A", "U1"]);
        assert_eq!(lane[1].order, 1);
        let unscheduled = model.unscheduled_stories();
        assert_eq!(titles(&unscheduled), vec!["U2"]);
        assert_eq!(unscheduled[0].order, 0);
    }

    #[test]
    fn test_story_points_totals() {
        let mut model = model();
        let release = model.add_release(ReleasePatch::named("v1")).unwrap();
        let sprint = model.add_sprint(Some(&release.id), SprintPatch::named("S1")).unwrap();
        for points in [3.0, 5.0] {
            model.add_story(
                None,
                Some(&release.id),
                UserStoryPatch {
                    story_points: Some(Some(points)),
                    sprint_id: Some(Some(sprint.id.clone())),
                    ..UserStoryPatch::default()
                },
            );
        }
        model.add_story(None, Some(&release.id), UserStoryPatch::default());
        assert_eq!(model.release_story_points(&release.id), 8.0);
        assert_eq!(model.sprint_story_points(&sprint.id), 8.0);
        assert_eq!(model.sprints_for_release(Some(&release.id)).len(), 1);
    }

    #[test]
    fn test_drag_story_to_release() {
        let mut model = model();
        let release = model.add_release(ReleasePatch::named("v1")).unwrap();
        let story = model.add_story(None, None, UserStoryPatch::titled("S")).unwrap();

        model.start_drag(ItemKind::Story, &story.id).unwrap();
        model
            .hover(DragPosition::new(release.id.clone(), 0, ContainerKind::Release))
            .unwrap();
        let event = model.end_drag().unwrap();
        assert_eq!(event.source_position.container_kind, ContainerKind::Unscheduled);

        let moved = model.stories_for_release(&release.id);
        assert_eq!(moved.len(), 1);
        assert_eq!(moved[0].release_id.as_deref(), Some(release.id.as_str()));
        assert!(model.unscheduled_stories().is_empty());
    }

    #[test]
    fn test_drag_story_onto_epic_links_it() {
        let mut model = model();
        let epic = model.add_epic(EpicPatch::titled("E")).unwrap();
        model.add_story(None, None, UserStoryPatch::titled("First")).unwrap();
        let story = model.add_story(None, None, UserStoryPatch::titled("S")).unwrap();

        model.start_drag(ItemKind::Story, &story.id).unwrap();
        model
            .hover(DragPosition::new(epic.id.clone(), 0, ContainerKind::Epic))
            .unwrap();
        model.end_drag().unwrap();

        assert_eq!(titles(&model.stories_for_epic(&epic.id)), vec!["S"]);
        let unscheduled = model.unscheduled_stories();
        assert_eq!(titles(&unscheduled), vec!["First", "S"]);
        assert_eq!(unscheduled[1].order, 1);
    }

    #[test]
    fn test_drag_story_onto_sprint_schedules_it() {
        let mut model = model();
        let release = model.add_release(ReleasePatch::named("v1")).unwrap();
        let sprint = model.add_sprint(Some(&release.id), SprintPatch::named("S1")).unwrap();
        model.add_story(None, Some(&release.id), UserStoryPatch::titled("Planned")).unwrap();
        let story = model.add_story(None, None, UserStoryPatch::titled("S")).unwrap();

        model
            .apply_move(DragEvent {
                item_id: story.id.clone(),
                item_kind: ItemKind::Story,
                source_position: lane_position(None, 0),
                target_position: DragPosition::new(sprint.id.clone(), 0, ContainerKind::Sprint),
            })
            .unwrap();

        assert_eq!(titles(&model.stories_for_sprint(&sprint.id)), vec!["S"]);
        let lane = model.stories_for_release(&release.id);
        assert_eq!(titles(&lane), vec!["Planned", "S"]);
        assert_eq!((lane[0].order, lane[1].order), (0, 1));
        assert!(model.unscheduled_stories().is_empty());
    }

    #[test]
    fn test_drag_story_onto_unknown_sprint_rejected() {
        let mut model = model();
        let story = model.add_story(None, None, UserStoryPatch::titled("S")).unwrap();
        let before = model.board().cloned();
        let result = model.apply_move(DragEvent {
            item_id: story.id.clone(),
            item_kind: ItemKind::Story,
            source_position: lane_position(None, 0),
            target_position: DragPosition::new("ghost", 0, ContainerKind::Sprint),
        });
        assert_eq!(
            result,
            Err(MoveRejection::UnknownContainer {
                kind: ContainerKind::Sprint,
                container_id: "ghost".to_string(),
            })
        );
        assert_eq!(model.board().cloned(), before);
    }

    #[test]
    fn test_drag_to_unknown_release_rejected() {
        let mut model = model();
        let story = model.add_story(None, None, UserStoryPatch::titled("S")).unwrap();
        model.start_drag(ItemKind::Story, &story.id).unwrap();
        model
            .hover(DragPosition::new("ghost", 0, ContainerKind::Release))
            .unwrap();
        assert!(matches!(
            model.end_drag(),
            Err(MoveRejection::UnknownContainer { .. })
        ));
        assert_eq!(model.unscheduled_stories().len(), 1);
    }

    #[test]
    fn test_move_epic_directional() {
        let mut model = model();
        let a = model.add_epic(EpicPatch::titled("A")).unwrap();
        model.add_epic(EpicPatch::titled("B")).unwrap();
        assert!(!model.move_epic(&a.id, Direction::Up));
        assert!(model.move_epic(&a.id, Direction::Down));
        let order: Vec<String> = model.epics().into_iter().map(|e| e.title).collect();
        assert_eq!(order, vec!["B", "A"]);
    }

    #[test]
    fn test_view_mode_change_notifies() {
        let mut model = model();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        model.subscribe(move |change| sink.borrow_mut().push(change.clone()));
        model.set_view_mode(ViewMode::Sprint);
        assert_eq!(model.view_mode(), ViewMode::Sprint);
        assert_eq!(
            *seen.borrow(),
            vec![BacklogChange::ViewModeChanged(ViewMode::Sprint)]
        );
    }

    #[test]
    fn test_remove_sprint_and_release() {
        let mut model = model();
        let release = model.add_release(ReleasePatch::named("v1")).unwrap();
        let sprint = model.add_sprint(Some(&release.id), SprintPatch::named("S1")).unwrap();
        let story = model
            .add_story(
                None,
                Some(&release.id),
                UserStoryPatch {
                    sprint_id: Some(Some(sprint.id.clone())),
                    ..UserStoryPatch::default()
                },
            )
            .unwrap();

        assert!(model.remove_sprint(&sprint.id));
        assert!(model.stories_for_sprint(&sprint.id).is_empty());
        assert!(model.remove_release(&release.id));
        let unscheduled = model.unscheduled_stories();
        assert_eq!(unscheduled.len(), 1);
        assert_eq!(unscheduled[0].id, story.id);
        assert!(!model.remove_release(&release.id));
    }

    #[test]
    fn test_destroy() {
        let mut model = model();
        model.add_epic(EpicPatch::default());
        model.toggle_add_form(BacklogForm::Epic);
        model.destroy();
        assert!(model.board().is_none());
        assert!(model.epics().is_empty());
        assert!(model.add_form().is_none());
        assert!(model.add_epic(EpicPatch::default()).is_none());
    }
}
