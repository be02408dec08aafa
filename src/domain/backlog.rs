use super::common::{
    creation_stamp, generate_id, impl_entity, impl_ordered, overlay, random_color, EntityId, Timestamped,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    #[default]
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    Backlog,
    Ready,
    InProgress,
    Testing,
    Done,
    Blocked,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum WorkItemType {
    Epic,
    Feature,
    #[default]
    Story,
    Task,
    Bug,
    Spike,
}

impl WorkItemType {
    pub fn color(self) -> &'static str {
        match self {
            WorkItemType::Epic => "#FF9500",
            WorkItemType::Feature => "#007AFF",
            WorkItemType::Story => "#34C759",
            WorkItemType::Task => "#FFCC02",
            WorkItemType::Bug => "#FF3B30",
            WorkItemType::Spike => "#AF52DE",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseStatus {
    #[default]
    Planning,
    Development,
    Testing,
    Released,
    Cancelled,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SprintStatus {
    #[default]
    Planning,
    Active,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Epic {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: Status,
    pub order: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_effort: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_value: Option<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EpicPatch {
    pub id: Option<EntityId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    pub order: Option<usize>,
    pub estimated_effort: Option<Option<String>>,
    pub business_value: Option<Option<f64>>,
    pub tags: Option<Vec<String>>,
    pub assignee: Option<Option<String>>,
    pub created_at: Option<DateTime<Utc>>,
    /// Honoured by `create` only; updates always refresh the timestamp.
    pub updated_at: Option<DateTime<Utc>>,
}

impl EpicPatch {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    fn apply_to(&self, epic: &mut Epic) {
        overlay!(epic, self;
            id, title, description, color, priority, status, order, estimated_effort,
            business_value, tags, assignee, created_at,
        );
    }
}

impl Epic {
    pub fn create(patch: EpicPatch) -> Self {
        let now = Utc::now();
        let mut epic = Self {
            id: generate_id(),
            title: "New Epic".to_string(),
            description: String::new(),
            color: random_color(),
            priority: Priority::Medium,
            status: Status::Backlog,
            order: 0,
            estimated_effort: None,
            business_value: None,
            tags: Vec::new(),
            assignee: None,
            created_at: now,
            updated_at: now,
        };
        patch.apply_to(&mut epic);
        epic.updated_at = creation_stamp(epic.created_at, now, patch.updated_at);
        epic
    }

    pub fn update(&self, patch: &EpicPatch) -> Self {
        let mut epic = self.clone();
        patch.apply_to(&mut epic);
        epic.touch();
        epic
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserStory {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_a: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub i_want: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub so_that: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epic_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprint_id: Option<EntityId>,
    pub order: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_points: Option<f64>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: Status,
    #[serde(default, rename = "type")]
    pub item_type: WorkItemType,
    #[serde(default)]
    pub acceptance_criteria: Vec<String>,
    #[serde(default)]
    pub test_cases: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<EntityId>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub color: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserStoryPatch {
    pub id: Option<EntityId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub as_a: Option<Option<String>>,
    pub i_want: Option<Option<String>>,
    pub so_that: Option<Option<String>>,
    pub epic_id: Option<Option<EntityId>>,
    pub release_id: Option<Option<EntityId>>,
    pub sprint_id: Option<Option<EntityId>>,
    pub order: Option<usize>,
    pub story_points: Option<Option<f64>>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    pub item_type: Option<WorkItemType>,
    pub acceptance_criteria: Option<Vec<String>>,
    pub test_cases: Option<Vec<String>>,
    pub dependencies: Option<Vec<EntityId>>,
    pub tags: Option<Vec<String>>,
    pub assignee: Option<Option<String>>,
    pub labels: Option<Vec<String>>,
    pub color: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    /// Honoured by `create` only; updates always refresh the timestamp.
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserStoryPatch {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    fn apply_to(&self, story: &mut UserStory) {
        overlay!(story, self;
            id, title, description, as_a, i_want, so_that, epic_id, release_id, sprint_id,
            order, story_points, priority, status, item_type, acceptance_criteria, test_cases,
            dependencies, tags, assignee, labels, color, created_at,
        );
    }
}

impl UserStory {
    pub fn create(patch: UserStoryPatch) -> Self {
        let now = Utc::now();
        let item_type = patch.item_type.unwrap_or_default();
        let mut story = Self {
            id: generate_id(),
            title: "New User Story".to_string(),
            description: String::new(),
            as_a: None,
            i_want: None,
            so_that: None,
            epic_id: None,
            release_id: None,
            sprint_id: None,
            order: 0,
            story_points: None,
            priority: Priority::Medium,
            status: Status::Backlog,
            item_type,
            acceptance_criteria: Vec::new(),
            test_cases: Vec::new(),
            dependencies: Vec::new(),
            tags: Vec::new(),
            assignee: None,
            labels: Vec::new(),
            color: item_type.color().to_string(),
            created_at: now,
            updated_at: now,
        };
        patch.apply_to(&mut story);
        story.updated_at = creation_stamp(story.created_at, now, patch.updated_at);
        story
    }

    pub fn update(&self, patch: &UserStoryPatch) -> Self {
        let mut story = self.clone();
        patch.apply_to(&mut story);
        story.touch();
        story
    }

    pub fn points(&self) -> f64 {
        self.story_points.unwrap_or(0.0)
    }

    pub fn lane(&self) -> StoryLane {
        match &self.release_id {
            Some(release_id) => StoryLane::Release(release_id.clone()),
            None => StoryLane::Unscheduled,
        }
    }
}

/// The sibling set a backlog story is ranked in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StoryLane {
    Release(EntityId),
    Unscheduled,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: ReleaseStatus,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub color: String,
    pub order: usize,
    #[serde(default = "scheduled_by_default")]
    pub is_scheduled: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn scheduled_by_default() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReleasePatch {
    pub id: Option<EntityId>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub version: Option<Option<String>>,
    pub target_date: Option<Option<DateTime<Utc>>>,
    pub start_date: Option<Option<DateTime<Utc>>>,
    pub status: Option<ReleaseStatus>,
    pub goals: Option<Vec<String>>,
    pub features: Option<Vec<String>>,
    pub color: Option<String>,
    pub order: Option<usize>,
    pub is_scheduled: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    /// Honoured by `create` only; updates always refresh the timestamp.
    pub updated_at: Option<DateTime<Utc>>,
}

impl ReleasePatch {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    fn apply_to(&self, release: &mut Release) {
        overlay!(release, self;
            id, name, description, version, target_date, start_date, status, goals, features,
            color, order, is_scheduled, created_at,
        );
    }
}

impl Release {
    pub fn create(patch: ReleasePatch) -> Self {
        let now = Utc::now();
        let mut release = Self {
            id: generate_id(),
            name: "New Release".to_string(),
            description: String::new(),
            version: None,
            target_date: None,
            start_date: None,
            status: ReleaseStatus::Planning,
            goals: Vec::new(),
            features: Vec::new(),
            color: random_color(),
            order: 0,
            is_scheduled: true,
            created_at: now,
            updated_at: now,
        };
        patch.apply_to(&mut release);
        release.updated_at = creation_stamp(release.created_at, now, patch.updated_at);
        release
    }

    pub fn update(&self, patch: &ReleasePatch) -> Self {
        let mut release = self.clone();
        patch.apply_to(&mut release);
        release.touch();
        release
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Sprint {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<f64>,
    #[serde(default)]
    pub status: SprintStatus,
    #[serde(default)]
    pub goals: Vec<String>,
    pub order: usize,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SprintPatch {
    pub id: Option<EntityId>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub release_id: Option<Option<EntityId>>,
    pub start_date: Option<Option<DateTime<Utc>>>,
    pub end_date: Option<Option<DateTime<Utc>>>,
    pub capacity: Option<Option<f64>>,
    pub status: Option<SprintStatus>,
    pub goals: Option<Vec<String>>,
    pub order: Option<usize>,
    pub created_at: Option<DateTime<Utc>>,
    /// Honoured by `create` only; updates always refresh the timestamp.
    pub updated_at: Option<DateTime<Utc>>,
}

impl SprintPatch {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    fn apply_to(&self, sprint: &mut Sprint) {
        overlay!(sprint, self;
            id, name, description, release_id, start_date, end_date, capacity, status, goals,
            order, created_at,
        );
    }
}

impl Sprint {
    pub fn create(patch: SprintPatch) -> Self {
        let now = Utc::now();
        let mut sprint = Self {
            id: generate_id(),
            name: "New Sprint".to_string(),
            description: String::new(),
            release_id: None,
            start_date: None,
            end_date: None,
            capacity: None,
            status: SprintStatus::Planning,
            goals: Vec::new(),
            order: 0,
            created_at: now,
            updated_at: now,
        };
        patch.apply_to(&mut sprint);
        sprint.updated_at = creation_stamp(sprint.created_at, now, patch.updated_at);
        sprint
    }

    pub fn update(&self, patch: &SprintPatch) -> Self {
        let mut sprint = self.clone();
        patch.apply_to(&mut sprint);
        sprint.touch();
        sprint
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BacklogBoard {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub epics: Vec<Epic>,
    #[serde(default)]
    pub user_stories: Vec<UserStory>,
    #[serde(default)]
    pub releases: Vec<Release>,
    #[serde(default)]
    pub sprints: Vec<Sprint>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BacklogBoardPatch {
    pub id: Option<EntityId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub epics: Option<Vec<Epic>>,
    pub user_stories: Option<Vec<UserStory>>,
    pub releases: Option<Vec<Release>>,
    pub sprints: Option<Vec<Sprint>>,
    pub created_at: Option<DateTime<Utc>>,
    /// Honoured by `create` only; updates always refresh the timestamp.
    pub updated_at: Option<DateTime<Utc>>,
}

impl BacklogBoard {
    pub fn create(patch: BacklogBoardPatch) -> Self {
        let now = Utc::now();
        let mut board = Self {
            id: generate_id(),
            title: "Product Backlog".to_string(),
            description: String::new(),
            epics: Vec::new(),
            user_stories: Vec::new(),
            releases: Vec::new(),
            sprints: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        overlay!(board, patch;
            id, title, description, epics, user_stories, releases, sprints, created_at,
        );
        board.updated_at = creation_stamp(board.created_at, now, patch.updated_at);
        board
    }

    pub fn epic(&self, epic_id: &str) -> Option<&Epic> {
        self.epics.iter().find(|e| e.id == epic_id)
    }

    pub fn story(&self, story_id: &str) -> Option<&UserStory> {
        self.user_stories.iter().find(|s| s.id == story_id)
    }

    pub fn release(&self, release_id: &str) -> Option<&Release> {
        self.releases.iter().find(|r| r.id == release_id)
    }

    pub fn sprint(&self, sprint_id: &str) -> Option<&Sprint> {
        self.sprints.iter().find(|s| s.id == sprint_id)
    }
}

impl_entity!(Epic, UserStory, Release, Sprint, BacklogBoard);
impl_ordered!(Epic, UserStory, Release, Sprint);
