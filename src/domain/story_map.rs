use super::common::{
    creation_stamp, generate_id, impl_entity, impl_ordered, overlay, random_color, EntityId, Timestamped,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MapPriority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    #[default]
    Draft,
    Active,
    Completed,
    Archived,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Backlog,
    Ready,
    InProgress,
    Done,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum StoryStatus {
    #[default]
    Draft,
    Ready,
    InProgress,
    Testing,
    Done,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MapReleaseStatus {
    #[default]
    Planning,
    Development,
    Testing,
    Released,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub pain_points: Vec<String>,
    #[serde(default)]
    pub color: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonaPatch {
    pub id: Option<EntityId>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub avatar: Option<Option<String>>,
    pub role: Option<String>,
    pub goals: Option<Vec<String>>,
    pub pain_points: Option<Vec<String>>,
    pub color: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    /// Honoured by `create` only; updates always refresh the timestamp.
    pub updated_at: Option<DateTime<Utc>>,
}

impl PersonaPatch {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

impl Persona {
    pub fn create(patch: PersonaPatch) -> Self {
        let now = Utc::now();
        let mut persona = Self {
            id: generate_id(),
            name: "New Persona".to_string(),
            description: String::new(),
            avatar: None,
            role: String::new(),
            goals: Vec::new(),
            pain_points: Vec::new(),
            color: random_color(),
            created_at: now,
            updated_at: now,
        };
        persona.merge(&patch);
        persona.updated_at = creation_stamp(persona.created_at, now, patch.updated_at);
        persona
    }

    pub fn update(&self, patch: &PersonaPatch) -> Self {
        let mut persona = self.clone();
        persona.merge(patch);
        persona.touch();
        persona
    }

    fn merge(&mut self, patch: &PersonaPatch) {
        overlay!(self, patch;
            id, name, description, avatar, role, goals, pain_points, color, created_at,
        );
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub persona_id: EntityId,
    pub order: usize,
    #[serde(default)]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<String>,
    #[serde(default)]
    pub priority: MapPriority,
    #[serde(default)]
    pub status: ActivityStatus,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityPatch {
    pub id: Option<EntityId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub persona_id: Option<EntityId>,
    pub order: Option<usize>,
    pub color: Option<String>,
    pub estimated_duration: Option<Option<String>>,
    pub priority: Option<MapPriority>,
    pub status: Option<ActivityStatus>,
    pub created_at: Option<DateTime<Utc>>,
    /// Honoured by `create` only; updates always refresh the timestamp.
    pub updated_at: Option<DateTime<Utc>>,
}

impl ActivityPatch {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}

impl Activity {
    pub fn create(persona_id: &str, patch: ActivityPatch) -> Self {
        let now = Utc::now();
        let mut activity = Self {
            id: generate_id(),
            title: "New Activity".to_string(),
            description: String::new(),
            persona_id: persona_id.to_string(),
            order: 0,
            color: random_color(),
            estimated_duration: None,
            priority: MapPriority::Medium,
            status: ActivityStatus::Draft,
            created_at: now,
            updated_at: now,
        };
        activity.merge(&patch);
        activity.updated_at = creation_stamp(activity.created_at, now, patch.updated_at);
        activity
    }

    pub fn update(&self, patch: &ActivityPatch) -> Self {
        let mut activity = self.clone();
        activity.merge(patch);
        activity.touch();
        activity
    }

    fn merge(&mut self, patch: &ActivityPatch) {
        overlay!(self, patch;
            id, title, description, persona_id, order, color, estimated_duration, priority,
            status, created_at,
        );
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MapTask {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub activity_id: EntityId,
    pub order: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_effort: Option<String>,
    #[serde(default)]
    pub acceptance_criteria: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<EntityId>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub priority: MapPriority,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapTaskPatch {
    pub id: Option<EntityId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub activity_id: Option<EntityId>,
    pub order: Option<usize>,
    pub estimated_effort: Option<Option<String>>,
    pub acceptance_criteria: Option<Vec<String>>,
    pub dependencies: Option<Vec<EntityId>>,
    pub tags: Option<Vec<String>>,
    pub priority: Option<MapPriority>,
    pub status: Option<TaskStatus>,
    pub created_at: Option<DateTime<Utc>>,
    /// Honoured by `create` only; updates always refresh the timestamp.
    pub updated_at: Option<DateTime<Utc>>,
}

impl MapTaskPatch {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}

impl MapTask {
    pub fn create(activity_id: &str, patch: MapTaskPatch) -> Self {
        let now = Utc::now();
        let mut task = Self {
            id: generate_id(),
            title: "New Task".to_string(),
            description: String::new(),
            activity_id: activity_id.to_string(),
            order: 0,
            estimated_effort: None,
            acceptance_criteria: Vec::new(),
            dependencies: Vec::new(),
            tags: Vec::new(),
            priority: MapPriority::Medium,
            status: TaskStatus::Backlog,
            created_at: now,
            updated_at: now,
        };
        task.merge(&patch);
        task.updated_at = creation_stamp(task.created_at, now, patch.updated_at);
        task
    }

    pub fn update(&self, patch: &MapTaskPatch) -> Self {
        let mut task = self.clone();
        task.merge(patch);
        task.touch();
        task
    }

    fn merge(&mut self, patch: &MapTaskPatch) {
        overlay!(self, patch;
            id, title, description, activity_id, order, estimated_effort, acceptance_criteria,
            dependencies, tags, priority, status, created_at,
        );
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MapStory {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub as_a: String,
    pub i_want: String,
    pub so_that: String,
    pub task_id: EntityId,
    pub order: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_points: Option<f64>,
    #[serde(default)]
    pub acceptance_criteria: Vec<String>,
    #[serde(default)]
    pub test_cases: Vec<String>,
    #[serde(default)]
    pub priority: MapPriority,
    #[serde(default)]
    pub status: StoryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapStoryPatch {
    pub id: Option<EntityId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub as_a: Option<String>,
    pub i_want: Option<String>,
    pub so_that: Option<String>,
    pub task_id: Option<EntityId>,
    pub order: Option<usize>,
    pub story_points: Option<Option<f64>>,
    pub acceptance_criteria: Option<Vec<String>>,
    pub test_cases: Option<Vec<String>>,
    pub priority: Option<MapPriority>,
    pub status: Option<StoryStatus>,
    pub assignee: Option<Option<String>>,
    pub labels: Option<Vec<String>>,
    pub created_at: Option<DateTime<Utc>>,
    /// Honoured by `create` only; updates always refresh the timestamp.
    pub updated_at: Option<DateTime<Utc>>,
}

impl MapStoryPatch {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}

impl MapStory {
    pub fn create(task_id: &str, patch: MapStoryPatch) -> Self {
        let now = Utc::now();
        let mut story = Self {
            id: generate_id(),
            title: "New User Story".to_string(),
            description: String::new(),
            as_a: "user".to_string(),
            i_want: "functionality".to_string(),
            so_that: "benefit".to_string(),
            task_id: task_id.to_string(),
            order: 0,
            story_points: None,
            acceptance_criteria: Vec::new(),
            test_cases: Vec::new(),
            priority: MapPriority::Medium,
            status: StoryStatus::Draft,
            assignee: None,
            labels: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        story.merge(&patch);
        story.updated_at = creation_stamp(story.created_at, now, patch.updated_at);
        story
    }

    pub fn update(&self, patch: &MapStoryPatch) -> Self {
        let mut story = self.clone();
        story.merge(patch);
        story.touch();
        story
    }

    fn merge(&mut self, patch: &MapStoryPatch) {
        overlay!(self, patch;
            id, title, description, as_a, i_want, so_that, task_id, order, story_points,
            acceptance_criteria, test_cases, priority, status, assignee, labels, created_at,
        );
    }

    pub fn points(&self) -> f64 {
        self.story_points.unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MapRelease {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: MapReleaseStatus,
    #[serde(default)]
    pub user_story_ids: Vec<EntityId>,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub order: usize,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapReleasePatch {
    pub id: Option<EntityId>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub version: Option<Option<String>>,
    pub target_date: Option<Option<DateTime<Utc>>>,
    pub status: Option<MapReleaseStatus>,
    pub user_story_ids: Option<Vec<EntityId>>,
    pub goals: Option<Vec<String>>,
    pub features: Option<Vec<String>>,
    pub color: Option<String>,
    pub order: Option<usize>,
    pub created_at: Option<DateTime<Utc>>,
    /// Honoured by `create` only; updates always refresh the timestamp.
    pub updated_at: Option<DateTime<Utc>>,
}

impl MapReleasePatch {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

impl MapRelease {
    pub fn create(patch: MapReleasePatch) -> Self {
        let now = Utc::now();
        let mut release = Self {
            id: generate_id(),
            name: "New Release".to_string(),
            description: String::new(),
            version: None,
            target_date: None,
            status: MapReleaseStatus::Planning,
            user_story_ids: Vec::new(),
            goals: Vec::new(),
            features: Vec::new(),
            color: random_color(),
            order: 0,
            created_at: now,
            updated_at: now,
        };
        release.merge(&patch);
        release.updated_at = creation_stamp(release.created_at, now, patch.updated_at);
        release
    }

    pub fn update(&self, patch: &MapReleasePatch) -> Self {
        let mut release = self.clone();
        release.merge(patch);
        release.touch();
        release
    }

    fn merge(&mut self, patch: &MapReleasePatch) {
        overlay!(self, patch;
            id, name, description, version, target_date, status, user_story_ids, goals,
            features, color, order, created_at,
        );
    }

    pub fn includes(&self, story_id: &str) -> bool {
        self.user_story_ids.iter().any(|id| id == story_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoryMapBoard {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub personas: Vec<Persona>,
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub tasks: Vec<MapTask>,
    #[serde(default)]
    pub user_stories: Vec<MapStory>,
    #[serde(default)]
    pub releases: Vec<MapRelease>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoryMapBoardPatch {
    pub id: Option<EntityId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub personas: Option<Vec<Persona>>,
    pub activities: Option<Vec<Activity>>,
    pub tasks: Option<Vec<MapTask>>,
    pub user_stories: Option<Vec<MapStory>>,
    pub releases: Option<Vec<MapRelease>>,
    pub created_at: Option<DateTime<Utc>>,
    /// Honoured by `create` only; updates always refresh the timestamp.
    pub updated_at: Option<DateTime<Utc>>,
}

impl StoryMapBoard {
    pub fn create(patch: StoryMapBoardPatch) -> Self {
        let now = Utc::now();
        let mut board = Self {
            id: generate_id(),
            title: "User Story Map".to_string(),
            description: String::new(),
            personas: Vec::new(),
            activities: Vec::new(),
            tasks: Vec::new(),
            user_stories: Vec::new(),
            releases: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        overlay!(board, patch;
            id, title, description, personas, activities, tasks, user_stories, releases,
            created_at,
        );
        board.updated_at = creation_stamp(board.created_at, now, patch.updated_at);
        board
    }

    pub fn persona(&self, persona_id: &str) -> Option<&Persona> {
        self.personas.iter().find(|p| p.id == persona_id)
    }

    pub fn activity(&self, activity_id: &str) -> Option<&Activity> {
        self.activities.iter().find(|a| a.id == activity_id)
    }

    pub fn task(&self, task_id: &str) -> Option<&MapTask> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn story(&self, story_id: &str) -> Option<&MapStory> {
        self.user_stories.iter().find(|s| s.id == story_id)
    }

    pub fn release(&self, release_id: &str) -> Option<&MapRelease> {
        self.releases.iter().find(|r| r.id == release_id)
    }
}

impl_entity!(Persona, Activity, MapTask, MapStory, MapRelease, StoryMapBoard);
impl_ordered!(Activity, MapTask, MapStory, MapRelease);
