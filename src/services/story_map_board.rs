//! Stateful user-story-map view-model.
//!
//! The map is a four-level hierarchy (persona → activity → task → story)
//! stored as flat collections with parent references. Releases sit beside
//! it and pick stories by id.

use crate::domain::common::{EntityId, Timestamped};
use crate::domain::drag::{ContainerKind, DragEvent, DragPosition, ItemKind};
use crate::domain::story_map::{
    Activity, ActivityPatch, MapRelease, MapReleasePatch, MapStory, MapStoryPatch, MapTask,
    MapTaskPatch, Persona, PersonaPatch, StoryMapBoard, StoryMapBoardPatch,
};
use crate::services::drag::{
    validate_move, DragError, DragMachine, DragState, DragSurface, MoveRejection,
};
use crate::services::events::{ListenerId, Listeners};
use crate::services::ordering;
use crate::services::props::{StoryMapPermissions, Theme, DEFAULT_LOCALE};
use crate::services::relations;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct StoryMapProps {
    pub board: Option<StoryMapBoard>,
    pub personas: Vec<Persona>,
    pub activities: Vec<Activity>,
    pub tasks: Vec<MapTask>,
    pub user_stories: Vec<MapStory>,
    pub releases: Vec<MapRelease>,
    pub permissions: StoryMapPermissions,
    pub theme: Theme,
    pub locale: String,
}

impl Default for StoryMapProps {
    fn default() -> Self {
        Self {
            board: None,
            personas: Vec::new(),
            activities: Vec::new(),
            tasks: Vec::new(),
            user_stories: Vec::new(),
            releases: Vec::new(),
            permissions: StoryMapPermissions::default(),
            theme: Theme::default(),
            locale: DEFAULT_LOCALE.to_string(),
        }
    }
}

impl StoryMapProps {
    pub fn with_board(board: StoryMapBoard) -> Self {
        Self {
            board: Some(board),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoryMapChange {
    PersonaAdded(Persona),
    PersonaUpdated { persona_id: EntityId, updates: PersonaPatch },
    PersonaRemoved { persona_id: EntityId },
    ActivityAdded { persona_id: EntityId, activity: Activity },
    ActivityUpdated { activity_id: EntityId, updates: ActivityPatch },
    ActivityRemoved { activity_id: EntityId },
    TaskAdded { activity_id: EntityId, task: MapTask },
    TaskUpdated { task_id: EntityId, updates: MapTaskPatch },
    TaskRemoved { task_id: EntityId },
    StoryAdded { task_id: EntityId, story: MapStory },
    StoryUpdated { story_id: EntityId, updates: MapStoryPatch },
    StoryRemoved { story_id: EntityId },
    ReleaseAdded(MapRelease),
    ReleaseUpdated { release_id: EntityId, updates: MapReleasePatch },
    ReleaseRemoved { release_id: EntityId },
    StoryAssigned { release_id: EntityId, story_id: EntityId },
    StoryUnassigned { release_id: EntityId, story_id: EntityId },
    ItemMoved(DragEvent),
    BoardUpdated(StoryMapBoard),
}

/// The entity whose inline editor is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapEditing {
    Persona(EntityId),
    Activity {
        persona_id: EntityId,
        activity_id: EntityId,
    },
    Task(EntityId),
    Story(EntityId),
    Release(EntityId),
}

impl MapEditing {
    fn targets(&self, id: &str) -> bool {
        match self {
            MapEditing::Persona(own)
            | MapEditing::Task(own)
            | MapEditing::Story(own)
            | MapEditing::Release(own) => own == id,
            MapEditing::Activity { activity_id, .. } => activity_id == id,
        }
    }
}

/// Which add form is open, keyed by the parent it adds into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapForm {
    Persona,
    Activity { persona_id: EntityId },
    Task { activity_id: EntityId },
    Story { task_id: EntityId },
    Release,
}

impl DragSurface for StoryMapBoard {
    fn lane_ids(&self, position: &DragPosition, item: ItemKind) -> Option<Vec<EntityId>> {
        let parent = position.container_id.as_str();
        let ids: Vec<EntityId> = match (item, position.container_kind) {
            (ItemKind::Activity, ContainerKind::Persona) => {
                self.persona(parent)?;
                ordering::sorted_lane(&self.activities, |a| a.persona_id == parent)
                    .into_iter()
                    .map(|a| a.id)
                    .collect()
            }
            (ItemKind::Task, ContainerKind::Activity) => {
                self.activity(parent)?;
                ordering::sorted_lane(&self.tasks, |t| t.activity_id == parent)
                    .into_iter()
                    .map(|t| t.id)
                    .collect()
            }
            (ItemKind::Story, ContainerKind::Task) => {
                self.task(parent)?;
                ordering::sorted_lane(&self.user_stories, |s| s.task_id == parent)
                    .into_iter()
                    .map(|s| s.id)
                    .collect()
            }
            (ItemKind::Release, ContainerKind::Board) if parent == self.id => {
                ordering::sorted_lane(&self.releases, |_| true)
                    .into_iter()
                    .map(|r| r.id)
                    .collect()
            }
            _ => return None,
        };
        Some(ids)
    }
}

#[derive(Debug)]
pub struct StoryMapBoardModel {
    props: StoryMapProps,
    board: Option<StoryMapBoard>,
    drag: DragMachine,
    editing: Option<MapEditing>,
    add_form: Option<MapForm>,
    listeners: Listeners<StoryMapChange>,
}

impl StoryMapBoardModel {
    pub fn new(props: StoryMapProps) -> Self {
        let mut model = Self {
            props: StoryMapProps::default(),
            board: None,
            drag: DragMachine::new(),
            editing: None,
            add_form: None,
            listeners: Listeners::new(),
        };
        model.update_props(props);
        model
    }

    pub fn update_props(&mut self, props: StoryMapProps) {
        self.drag.cancel();
        self.editing = None;
        self.add_form = None;

        let mut board = match props.board.clone() {
            Some(board) => board,
            None => StoryMapBoard::create(StoryMapBoardPatch {
                description: Some(
                    "A collaborative tool for mapping user journeys and stories".to_string(),
                ),
                personas: Some(props.personas.clone()),
                activities: Some(props.activities.clone()),
                tasks: Some(props.tasks.clone()),
                user_stories: Some(props.user_stories.clone()),
                releases: Some(props.releases.clone()),
                ..StoryMapBoardPatch::default()
            }),
        };
        normalize(&mut board);

        debug!(board_id = %board.id, personas = board.personas.len(), "story map initialised");
        self.board = Some(board);
        self.props = props;
    }

    pub fn destroy(&mut self) {
        self.board = None;
        self.drag.cancel();
        self.editing = None;
        self.add_form = None;
        self.listeners.clear();
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&StoryMapChange) + 'static) -> ListenerId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    // Queries

    pub fn props(&self) -> &StoryMapProps {
        &self.props
    }

    pub fn board(&self) -> Option<&StoryMapBoard> {
        self.board.as_ref()
    }

    pub fn personas(&self) -> &[Persona] {
        self.board.as_ref().map(|b| b.personas.as_slice()).unwrap_or_default()
    }

    pub fn activities_for_persona(&self, persona_id: &str) -> Vec<Activity> {
        self.board
            .as_ref()
            .map(|b| ordering::sorted_lane(&b.activities, |a| a.persona_id == persona_id))
            .unwrap_or_default()
    }

    pub fn tasks_for_activity(&self, activity_id: &str) -> Vec<MapTask> {
        self.board
            .as_ref()
            .map(|b| ordering::sorted_lane(&b.tasks, |t| t.activity_id == activity_id))
            .unwrap_or_default()
    }

    pub fn stories_for_task(&self, task_id: &str) -> Vec<MapStory> {
        self.board
            .as_ref()
            .map(|b| ordering::sorted_lane(&b.user_stories, |s| s.task_id == task_id))
            .unwrap_or_default()
    }

    pub fn releases(&self) -> Vec<MapRelease> {
        self.board
            .as_ref()
            .map(|b| ordering::sorted_lane(&b.releases, |_| true))
            .unwrap_or_default()
    }

    /// Stories picked by the release, in board order. Ids that no longer
    /// resolve are skipped.
    pub fn stories_for_release(&self, release_id: &str) -> Vec<MapStory> {
        let Some(board) = self.board.as_ref() else {
            return Vec::new();
        };
        let Some(release) = board.release(release_id) else {
            return Vec::new();
        };
        board
            .user_stories
            .iter()
            .filter(|s| release.includes(&s.id))
            .cloned()
            .collect()
    }

    pub fn release_story_points(&self, release_id: &str) -> f64 {
        self.stories_for_release(release_id).iter().map(MapStory::points).sum()
    }

    pub fn drag_state(&self) -> &DragState {
        self.drag.state()
    }

    pub fn editing(&self) -> Option<&MapEditing> {
        self.editing.as_ref()
    }

    pub fn add_form(&self) -> Option<&MapForm> {
        self.add_form.as_ref()
    }

    // Personas

    pub fn add_persona(&mut self, patch: PersonaPatch) -> Option<Persona> {
        if !self.props.permissions.allow_add_persona {
            debug!("add persona ignored: not allowed");
            return None;
        }
        let board = self.board.as_mut()?;
        let persona = Persona::create(patch);
        board.personas.push(persona.clone());

        info!(board_id = %board.id, persona_id = %persona.id, "persona added");
        self.listeners.emit(&StoryMapChange::PersonaAdded(persona.clone()));
        self.add_form = None;
        self.commit();
        Some(persona)
    }

    pub fn update_persona(&mut self, persona_id: &str, updates: PersonaPatch) -> Option<Persona> {
        let board = self.board.as_mut()?;
        let Some(persona) = board.personas.iter_mut().find(|p| p.id == persona_id) else {
            debug!(persona_id, "update persona ignored: unknown persona");
            return None;
        };
        *persona = persona.update(&updates);
        let persona = persona.clone();
        info!(board_id = %board.id, persona_id = %persona.id, "persona updated");

        self.listeners.emit(&StoryMapChange::PersonaUpdated {
            persona_id: persona_id.to_string(),
            updates,
        });
        self.clear_editing(persona_id);
        self.commit();
        Some(persona)
    }

    /// Removes the persona with its activities, their tasks and the tasks'
    /// stories.
    pub fn remove_persona(&mut self, persona_id: &str) -> bool {
        if !self.props.permissions.allow_remove_persona {
            debug!(persona_id, "remove persona ignored: not allowed");
            return false;
        }
        let Some(board) = self.board.as_mut() else {
            return false;
        };
        let Some(next) = relations::remove_persona(board, persona_id) else {
            debug!(persona_id, "remove persona ignored: unknown persona");
            return false;
        };
        *board = next;

        info!(board_id = %board.id, persona_id, "persona removed");
        self.listeners.emit(&StoryMapChange::PersonaRemoved {
            persona_id: persona_id.to_string(),
        });
        self.clear_editing(persona_id);
        self.commit();
        true
    }

    // Activities

    pub fn add_activity(&mut self, persona_id: &str, patch: ActivityPatch) -> Option<Activity> {
        if !self.props.permissions.allow_add_activity {
            debug!("add activity ignored: not allowed");
            return None;
        }
        let board = self.board.as_mut()?;
        if board.persona(persona_id).is_none() {
            debug!(persona_id, "add activity ignored: unknown persona");
            return None;
        }
        let order = board.activities.iter().filter(|a| a.persona_id == persona_id).count();
        let activity = Activity::create(
            persona_id,
            ActivityPatch {
                order: Some(order),
                persona_id: Some(persona_id.to_string()),
                ..patch
            },
        );
        board.activities.push(activity.clone());
        ordering::reindex_lanes(&mut board.activities, |a| a.persona_id.clone());
        let activity = board.activity(&activity.id).cloned().unwrap_or(activity);

        info!(board_id = %board.id, persona_id, activity_id = %activity.id, "activity added");
        self.listeners.emit(&StoryMapChange::ActivityAdded {
            persona_id: persona_id.to_string(),
            activity: activity.clone(),
        });
        self.add_form = None;
        self.commit();
        Some(activity)
    }

    /// Moving an activity to another persona appends it to that persona's lane.
    pub fn update_activity(&mut self, activity_id: &str, updates: ActivityPatch) -> Option<Activity> {
        let board = self.board.as_mut()?;
        let Some(index) = board.activities.iter().position(|a| a.id == activity_id) else {
            debug!(activity_id, "update activity ignored: unknown activity");
            return None;
        };
        let previous = board.activities[index].persona_id.clone();
        let mut updated = board.activities[index].update(&updates);
        if updated.persona_id != previous && updates.order.is_none() {
            updated.order = usize::MAX;
        }
        let updated_id = updated.id.clone();
        board.activities[index] = updated;
        ordering::reindex_lanes(&mut board.activities, |a| a.persona_id.clone());
        let activity = board.activity(&updated_id).cloned();
        info!(board_id = %board.id, activity_id = %updated_id, "activity updated");

        self.listeners.emit(&StoryMapChange::ActivityUpdated {
            activity_id: activity_id.to_string(),
            updates,
        });
        self.clear_editing(activity_id);
        self.commit();
        activity
    }

    pub fn remove_activity(&mut self, activity_id: &str) -> bool {
        if !self.props.permissions.allow_remove_activity {
            debug!(activity_id, "remove activity ignored: not allowed");
            return false;
        }
        let Some(board) = self.board.as_mut() else {
            return false;
        };
        let Some(next) = relations::remove_activity(board, activity_id) else {
            debug!(activity_id, "remove activity ignored: unknown activity");
            return false;
        };
        *board = next;

        info!(board_id = %board.id, activity_id, "activity removed");
        self.listeners.emit(&StoryMapChange::ActivityRemoved {
            activity_id: activity_id.to_string(),
        });
        self.clear_editing(activity_id);
        self.commit();
        true
    }

    // Tasks

    pub fn add_task(&mut self, activity_id: &str, patch: MapTaskPatch) -> Option<MapTask> {
        if !self.props.permissions.allow_add_task {
            debug!("add task ignored: not allowed");
            return None;
        }
        let board = self.board.as_mut()?;
        if board.activity(activity_id).is_none() {
            debug!(activity_id, "add task ignored: unknown activity");
            return None;
        }
        let order = board.tasks.iter().filter(|t| t.activity_id == activity_id).count();
        let task = MapTask::create(
            activity_id,
            MapTaskPatch {
                order: Some(order),
                activity_id: Some(activity_id.to_string()),
                ..patch
            },
        );
        board.tasks.push(task.clone());
        ordering::reindex_lanes(&mut board.tasks, |t| t.activity_id.clone());
        let task = board.task(&task.id).cloned().unwrap_or(task);

        info!(board_id = %board.id, activity_id, task_id = %task.id, "task added");
        self.listeners.emit(&StoryMapChange::TaskAdded {
            activity_id: activity_id.to_string(),
            task: task.clone(),
        });
        self.add_form = None;
        self.commit();
        Some(task)
    }

    pub fn update_task(&mut self, task_id: &str, updates: MapTaskPatch) -> Option<MapTask> {
        let board = self.board.as_mut()?;
        let Some(index) = board.tasks.iter().position(|t| t.id == task_id) else {
            debug!(task_id, "update task ignored: unknown task");
            return None;
        };
        let previous = board.tasks[index].activity_id.clone();
        let mut updated = board.tasks[index].update(&updates);
        if updated.activity_id != previous && updates.order.is_none() {
            updated.order = usize::MAX;
        }
        let updated_id = updated.id.clone();
        board.tasks[index] = updated;
        ordering::reindex_lanes(&mut board.tasks, |t| t.activity_id.clone());
        let task = board.task(&updated_id).cloned();
        info!(board_id = %board.id, task_id = %updated_id, "task updated");

        self.listeners.emit(&StoryMapChange::TaskUpdated {
            task_id: task_id.to_string(),
            updates,
        });
        self.clear_editing(task_id);
        self.commit();
        task
    }

    pub fn remove_task(&mut self, task_id: &str) -> bool {
        if !self.props.permissions.allow_remove_task {
            debug!(task_id, "remove task ignored: not allowed");
            return false;
        }
        let Some(board) = self.board.as_mut() else {
            return false;
        };
        let Some(next) = relations::remove_task(board, task_id) else {
            debug!(task_id, "remove task ignored: unknown task");
            return false;
        };
        *board = next;

        info!(board_id = %board.id, task_id, "task removed");
        self.listeners.emit(&StoryMapChange::TaskRemoved {
            task_id: task_id.to_string(),
        });
        self.clear_editing(task_id);
        self.commit();
        true
    }

    // Stories

    pub fn add_story(&mut self, task_id: &str, patch: MapStoryPatch) -> Option<MapStory> {
        if !self.props.permissions.allow_add_story {
            debug!("add story ignored: not allowed");
            return None;
        }
        let board = self.board.as_mut()?;
        if board.task(task_id).is_none() {
            debug!(task_id, "add story ignored: unknown task");
            return None;
        }
        let order = board.user_stories.iter().filter(|s| s.task_id == task_id).count();
        let story = MapStory::create(
            task_id,
            MapStoryPatch {
                order: Some(order),
                task_id: Some(task_id.to_string()),
                ..patch
            },
        );
        board.user_stories.push(story.clone());
        ordering::reindex_lanes(&mut board.user_stories, |s| s.task_id.clone());
        let story = board.story(&story.id).cloned().unwrap_or(story);

        info!(board_id = %board.id, task_id, story_id = %story.id, "story added");
        self.listeners.emit(&StoryMapChange::StoryAdded {
            task_id: task_id.to_string(),
            story: story.clone(),
        });
        self.add_form = None;
        self.commit();
        Some(story)
    }

    pub fn update_story(&mut self, story_id: &str, updates: MapStoryPatch) -> Option<MapStory> {
        let board = self.board.as_mut()?;
        let Some(index) = board.user_stories.iter().position(|s| s.id == story_id) else {
            debug!(story_id, "update story ignored: unknown story");
            return None;
        };
        let previous = board.user_stories[index].task_id.clone();
        let mut updated = board.user_stories[index].update(&updates);
        if updated.task_id != previous && updates.order.is_none() {
            updated.order = usize::MAX;
        }
        let updated_id = updated.id.clone();
        board.user_stories[index] = updated;
        ordering::reindex_lanes(&mut board.user_stories, |s| s.task_id.clone());
        let story = board.story(&updated_id).cloned();
        info!(board_id = %board.id, story_id = %updated_id, "story updated");

        self.listeners.emit(&StoryMapChange::StoryUpdated {
            story_id: story_id.to_string(),
            updates,
        });
        self.clear_editing(story_id);
        self.commit();
        story
    }

    /// Also drops the story from every release that picked it.
    pub fn remove_story(&mut self, story_id: &str) -> bool {
        if !self.props.permissions.allow_remove_story {
            debug!(story_id, "remove story ignored: not allowed");
            return false;
        }
        let Some(board) = self.board.as_mut() else {
            return false;
        };
        let Some(next) = relations::remove_map_story(board, story_id) else {
            debug!(story_id, "remove story ignored: unknown story");
            return false;
        };
        *board = next;

        info!(board_id = %board.id, story_id, "story removed");
        self.listeners.emit(&StoryMapChange::StoryRemoved {
            story_id: story_id.to_string(),
        });
        self.clear_editing(story_id);
        self.commit();
        true
    }

    // Releases

    pub fn add_release(&mut self, patch: MapReleasePatch) -> Option<MapRelease> {
        if !self.props.permissions.allow_add_release {
            debug!("add release ignored: not allowed");
            return None;
        }
        let board = self.board.as_mut()?;
        let release = MapRelease::create(MapReleasePatch {
            order: Some(board.releases.len()),
            ..patch
        });
        board.releases.push(release.clone());
        board.releases = ordering::reindex(&board.releases);

        info!(board_id = %board.id, release_id = %release.id, "release added");
        self.listeners.emit(&StoryMapChange::ReleaseAdded(release.clone()));
        self.add_form = None;
        self.commit();
        Some(release)
    }

    pub fn update_release(
        &mut self,
        release_id: &str,
        updates: MapReleasePatch,
    ) -> Option<MapRelease> {
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

        self.listeners.emit(&StoryMapChange::ReleaseUpdated {
            release_id: release_id.to_string(),
            updates,
        });
        self.clear_editing(release_id);
        self.commit();
        release
    }

    /// Stories stay on the map; only the release's picks go with it.
    pub fn remove_release(&mut self, release_id: &str) -> bool {
        if !self.props.permissions.allow_remove_release {
            debug!(release_id, "remove release ignored: not allowed");
            return false;
        }
        let Some(board) = self.board.as_mut() else {
            return false;
        };
        let Some(next) = relations::remove_map_release(board, release_id) else {
            debug!(release_id, "remove release ignored: unknown release");
            return false;
        };
        *board = next;

        info!(board_id = %board.id, release_id, "release removed");
        self.listeners.emit(&StoryMapChange::ReleaseRemoved {
            release_id: release_id.to_string(),
        });
        self.clear_editing(release_id);
        self.commit();
        true
    }

    /// Pick a story for a release. Returns `false` when either is unknown or
    /// the story is already picked.
    pub fn assign_story_to_release(&mut self, story_id: &str, release_id: &str) -> bool {
        let Some(board) = self.board.as_mut() else {
            return false;
        };
        if board.story(story_id).is_none() {
            debug!(story_id, "assign ignored: unknown story");
            return false;
        }
        let Some(release) = board.releases.iter_mut().find(|r| r.id == release_id) else {
            debug!(release_id, "assign ignored: unknown release");
            return false;
        };
        if release.includes(story_id) {
            debug!(story_id, release_id, "assign ignored: already in release");
            return false;
        }
        release.user_story_ids.push(story_id.to_string());
        release.touch();

        info!(board_id = %board.id, story_id, release_id, "story assigned to release");
        self.listeners.emit(&StoryMapChange::StoryAssigned {
            release_id: release_id.to_string(),
            story_id: story_id.to_string(),
        });
        self.commit();
        true
    }

    pub fn unassign_story_from_release(&mut self, story_id: &str, release_id: &str) -> bool {
        let Some(board) = self.board.as_mut() else {
            return false;
        };
        let Some(release) = board
            .releases
            .iter_mut()
            .find(|r| r.id == release_id && r.includes(story_id))
        else {
            debug!(story_id, release_id, "unassign ignored: story not in release");
            return false;
        };
        release.user_story_ids.retain(|id| id != story_id);
        release.touch();

        info!(board_id = %board.id, story_id, release_id, "story unassigned from release");
        self.listeners.emit(&StoryMapChange::StoryUnassigned {
            release_id: release_id.to_string(),
            story_id: story_id.to_string(),
        });
        self.commit();
        true
    }

    // Drag and drop

    /// Begin dragging an activity, task, story or release.
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
        apply_story_map_move(board, &event)?;

        info!(
            board_id = %board.id,
            item_id = %event.item_id,
            kind = %event.item_kind,
            from = %event.source_position.container_id,
            to = %event.target_position.container_id,
            "item moved"
        );
        self.listeners.emit(&StoryMapChange::ItemMoved(event.clone()));
        self.commit();
        Ok(event)
    }

    // UI flags

    pub fn toggle_edit(&mut self, target: MapEditing) {
        if self.editing.as_ref() == Some(&target) {
            self.editing = None;
        } else {
            self.editing = Some(target);
        }
    }

    pub fn toggle_add_form(&mut self, form: MapForm) {
        if self.add_form.as_ref() == Some(&form) {
            self.add_form = None;
        } else {
            self.add_form = Some(form);
        }
    }

    fn clear_editing(&mut self, id: &str) {
        if self.editing.as_ref().is_some_and(|editing| editing.targets(id)) {
            self.editing = None;
        }
    }

    fn commit(&mut self) {
        if let Some(board) = self.board.as_mut() {
            board.touch();
            let snapshot = board.clone();
            self.listeners.emit(&StoryMapChange::BoardUpdated(snapshot));
        }
    }
}

/// Renumber every lane of a freshly loaded map.
pub fn normalize(board: &mut StoryMapBoard) {
    ordering::reindex_lanes(&mut board.activities, |a| a.persona_id.clone());
    ordering::reindex_lanes(&mut board.tasks, |t| t.activity_id.clone());
    ordering::reindex_lanes(&mut board.user_stories, |s| s.task_id.clone());
    board.releases = ordering::reindex(&board.releases);
}

fn source_position(board: &StoryMapBoard, kind: ItemKind, item_id: &str) -> Option<DragPosition> {
    let position = match kind {
        ItemKind::Activity => {
            DragPosition::new(board.activity(item_id)?.persona_id.clone(), 0, ContainerKind::Persona)
        }
        ItemKind::Task => {
            DragPosition::new(board.task(item_id)?.activity_id.clone(), 0, ContainerKind::Activity)
        }
        ItemKind::Story => {
            DragPosition::new(board.story(item_id)?.task_id.clone(), 0, ContainerKind::Task)
        }
        ItemKind::Release => DragPosition::new(board.id.clone(), 0, ContainerKind::Board),
        _ => return None,
    };
    let index = board
        .lane_ids(&position, kind)?
        .iter()
        .position(|id| id == item_id)?;
    Some(DragPosition {
        item_index: index,
        ..position
    })
}

/// Commit a validated move onto the map.
pub fn apply_story_map_move(
    board: &mut StoryMapBoard,
    event: &DragEvent,
) -> Result<(), MoveRejection> {
    let source = event.source_position.container_id.clone();
    let target = event.target_position.container_id.clone();
    let to = event.target_position.item_index;
    match event.item_kind {
        ItemKind::Activity => {
            ordering::move_across_lanes(
                &mut board.activities,
                &event.item_id,
                |a| a.persona_id == source,
                |a| a.persona_id == target,
                to,
                |activity| {
                    activity.persona_id = target.clone();
                    activity.touch();
                },
            );
        }
        ItemKind::Task => {
            ordering::move_across_lanes(
                &mut board.tasks,
                &event.item_id,
                |t| t.activity_id == source,
                |t| t.activity_id == target,
                to,
                |task| {
                    task.activity_id = target.clone();
                    task.touch();
                },
            );
        }
        ItemKind::Story => {
            ordering::move_across_lanes(
                &mut board.user_stories,
                &event.item_id,
                |s| s.task_id == source,
                |s| s.task_id == target,
                to,
                |story| {
                    story.task_id = target.clone();
                    story.touch();
                },
            );
        }
        ItemKind::Release => {
            board.releases = ordering::reorder_touching(
                &board.releases,
                event.source_position.item_index,
                to,
            );
        }
        _ => {
            return Err(MoveRejection::UnsupportedKind {
                item: event.item_kind,
                container: event.target_position.container_kind,
            })
        }
    }
    Ok(())
}
