//! Snapshot shapes for the three boards. Field names follow the camelCase
//! JSON the boards serialize to.

use super::rules::{nullable, optional, required, Field, Shape};

const PRIORITY_LMH: &[&str] = &["low", "medium", "high"];

const CATEGORY_FIELDS: &[Field] = &[
    required("id", Shape::Str),
    required("label", Shape::Str),
    required("color", Shape::Str),
    required("bgColor", Shape::Str),
];
const CATEGORY: Shape = Shape::Object(CATEGORY_FIELDS);

const CARD_FIELDS: &[Field] = &[
    required("id", Shape::Str),
    required("title", Shape::Str),
    optional("description", Shape::Str),
    required("category", CATEGORY),
    nullable("date", Shape::Str),
    nullable("assignee", Shape::Str),
    nullable("priority", Shape::OneOf(PRIORITY_LMH)),
    optional("tags", Shape::List(&Shape::Str)),
    nullable("dueDate", Shape::Timestamp),
    optional("order", Shape::Count),
    optional("createdAt", Shape::Timestamp),
    optional("updatedAt", Shape::Timestamp),
];
const CARD: Shape = Shape::Object(CARD_FIELDS);

const COLUMN_FIELDS: &[Field] = &[
    required("id", Shape::Str),
    required("title", Shape::Str),
    optional("cards", Shape::List(&CARD)),
    nullable("maxCards", Shape::Count),
    nullable("color", Shape::Str),
    optional("collapsed", Shape::Bool),
    required("order", Shape::Count),
];
const COLUMN: Shape = Shape::Object(COLUMN_FIELDS);

const KANBAN_FIELDS: &[Field] = &[
    required("id", Shape::Str),
    required("title", Shape::Str),
    optional("description", Shape::Str),
    optional("columns", Shape::List(&COLUMN)),
    optional("categories", Shape::List(&CATEGORY)),
    optional("createdAt", Shape::Timestamp),
    optional("updatedAt", Shape::Timestamp),
];
pub const KANBAN_BOARD: Shape = Shape::Object(KANBAN_FIELDS);

const BACKLOG_PRIORITY: &[&str] = &["critical", "high", "medium", "low"];
const BACKLOG_STATUS: &[&str] = &["backlog", "ready", "in-progress", "testing", "done", "blocked"];

const EPIC_FIELDS: &[Field] = &[
    required("id", Shape::Str),
    required("title", Shape::Str),
    optional("description", Shape::Str),
    optional("color", Shape::Str),
    optional("priority", Shape::OneOf(BACKLOG_PRIORITY)),
    optional("status", Shape::OneOf(BACKLOG_STATUS)),
    required("order", Shape::Count),
    nullable("estimatedEffort", Shape::Str),
    nullable("businessValue", Shape::Number),
    optional("tags", Shape::List(&Shape::Str)),
    nullable("assignee", Shape::Str),
    optional("createdAt", Shape::Timestamp),
    optional("updatedAt", Shape::Timestamp),
];
const EPIC: Shape = Shape::Object(EPIC_FIELDS);

const USER_STORY_FIELDS: &[Field] = &[
    required("id", Shape::Str),
    required("title", Shape::Str),
    optional("description", Shape::Str),
    nullable("asA", Shape::Str),
    nullable("iWant", Shape::Str),
    nullable("soThat", Shape::Str),
    nullable("epicId", Shape::Str),
    nullable("releaseId", Shape::Str),
    nullable("sprintId", Shape::Str),
    required("order", Shape::Count),
    nullable("storyPoints", Shape::Number),
    optional("priority", Shape::OneOf(BACKLOG_PRIORITY)),
    optional("status", Shape::OneOf(BACKLOG_STATUS)),
    optional(
        "type",
        Shape::OneOf(&["epic", "feature", "story", "task", "bug", "spike"]),
    ),
    optional("acceptanceCriteria", Shape::List(&Shape::Str)),
    optional("testCases", Shape::List(&Shape::Str)),
    optional("dependencies", Shape::List(&Shape::Str)),
    optional("tags", Shape::List(&Shape::Str)),
    nullable("assignee", Shape::Str),
    optional("labels", Shape::List(&Shape::Str)),
    optional("color", Shape::Str),
    optional("createdAt", Shape::Timestamp),
    optional("updatedAt", Shape::Timestamp),
];
const USER_STORY: Shape = Shape::Object(USER_STORY_FIELDS);

const RELEASE_FIELDS: &[Field] = &[
    required("id", Shape::Str),
    required("name", Shape::Str),
    optional("description", Shape::Str),
    nullable("version", Shape::Str),
    nullable("targetDate", Shape::Timestamp),
    nullable("startDate", Shape::Timestamp),
    optional(
        "status",
        Shape::OneOf(&["planning", "development", "testing", "released", "cancelled"]),
    ),
    optional("goals", Shape::List(&Shape::Str)),
    optional("features", Shape::List(&Shape::Str)),
    optional("color", Shape::Str),
    required("order", Shape::Count),
    optional("isScheduled", Shape::Bool),
    optional("createdAt", Shape::Timestamp),
    optional("updatedAt", Shape::Timestamp),
];
const RELEASE: Shape = Shape::Object(RELEASE_FIELDS);

const SPRINT_FIELDS: &[Field] = &[
    required("id", Shape::Str),
    required("name", Shape::Str),
    optional("description", Shape::Str),
    nullable("releaseId", Shape::Str),
    nullable("startDate", Shape::Timestamp),
    nullable("endDate", Shape::Timestamp),
    nullable("capacity", Shape::Number),
    optional(
        "status",
        Shape::OneOf(&["planning", "active", "completed", "cancelled"]),
    ),
    optional("goals", Shape::List(&Shape::Str)),
    required("order", Shape::Count),
    optional("createdAt", Shape::Timestamp),
    optional("updatedAt", Shape::Timestamp),
];
const SPRINT: Shape = Shape::Object(SPRINT_FIELDS);

const BACKLOG_FIELDS: &[Field] = &[
    required("id", Shape::Str),
    required("title", Shape::Str),
    optional("description", Shape::Str),
    optional("epics", Shape::List(&EPIC)),
    optional("userStories", Shape::List(&USER_STORY)),
    optional("releases", Shape::List(&RELEASE)),
    optional("sprints", Shape::List(&SPRINT)),
    optional("createdAt", Shape::Timestamp),
    optional("updatedAt", Shape::Timestamp),
];
pub const BACKLOG_BOARD: Shape = Shape::Object(BACKLOG_FIELDS);

const PERSONA_FIELDS: &[Field] = &[
    required("id", Shape::Str),
    required("name", Shape::Str),
    optional("description", Shape::Str),
    nullable("avatar", Shape::Str),
    optional("role", Shape::Str),
    optional("goals", Shape::List(&Shape::Str)),
    optional("painPoints", Shape::List(&Shape::Str)),
    optional("color", Shape::Str),
    optional("createdAt", Shape::Timestamp),
    optional("updatedAt", Shape::Timestamp),
];
const PERSONA: Shape = Shape::Object(PERSONA_FIELDS);

const ACTIVITY_FIELDS: &[Field] = &[
    required("id", Shape::Str),
    required("title", Shape::Str),
    optional("description", Shape::Str),
    required("personaId", Shape::Str),
    required("order", Shape::Count),
    optional("color", Shape::Str),
    nullable("estimatedDuration", Shape::Str),
    optional("priority", Shape::OneOf(PRIORITY_LMH)),
    optional(
        "status",
        Shape::OneOf(&["draft", "active", "completed", "archived"]),
    ),
    optional("createdAt", Shape::Timestamp),
    optional("updatedAt", Shape::Timestamp),
];
const ACTIVITY: Shape = Shape::Object(ACTIVITY_FIELDS);

const TASK_FIELDS: &[Field] = &[
    required("id", Shape::Str),
    required("title", Shape::Str),
    optional("description", Shape::Str),
    required("activityId", Shape::Str),
    required("order", Shape::Count),
    nullable("estimatedEffort", Shape::Str),
    optional("acceptanceCriteria", Shape::List(&Shape::Str)),
    optional("dependencies", Shape::List(&Shape::Str)),
    optional("tags", Shape::List(&Shape::Str)),
    optional("priority", Shape::OneOf(PRIORITY_LMH)),
    optional(
        "status",
        Shape::OneOf(&["backlog", "ready", "in-progress", "done"]),
    ),
    optional("createdAt", Shape::Timestamp),
    optional("updatedAt", Shape::Timestamp),
];
const TASK: Shape = Shape::Object(TASK_FIELDS);

const MAP_STORY_FIELDS: &[Field] = &[
    required("id", Shape::Str),
    required("title", Shape::Str),
    optional("description", Shape::Str),
    required("asA", Shape::Str),
    required("iWant", Shape::Str),
    required("soThat", Shape::Str),
    required("taskId", Shape::Str),
    required("order", Shape::Count),
    nullable("storyPoints", Shape::Number),
    optional("acceptanceCriteria", Shape::List(&Shape::Str)),
    optional("testCases", Shape::List(&Shape::Str)),
    optional("priority", Shape::OneOf(PRIORITY_LMH)),
    optional(
        "status",
        Shape::OneOf(&["draft", "ready", "in-progress", "testing", "done"]),
    ),
    nullable("assignee", Shape::Str),
    optional("labels", Shape::List(&Shape::Str)),
    optional("createdAt", Shape::Timestamp),
    optional("updatedAt", Shape::Timestamp),
];
const MAP_STORY: Shape = Shape::Object(MAP_STORY_FIELDS);

const MAP_RELEASE_FIELDS: &[Field] = &[
    required("id", Shape::Str),
    required("name", Shape::Str),
    optional("description", Shape::Str),
    nullable("version", Shape::Str),
    nullable("targetDate", Shape::Timestamp),
    optional(
        "status",
        Shape::OneOf(&["planning", "development", "testing", "released"]),
    ),
    optional("userStoryIds", Shape::List(&Shape::Str)),
    optional("goals", Shape::List(&Shape::Str)),
    optional("features", Shape::List(&Shape::Str)),
    optional("color", Shape::Str),
    optional("order", Shape::Count),
    optional("createdAt", Shape::Timestamp),
    optional("updatedAt", Shape::Timestamp),
];
const MAP_RELEASE: Shape = Shape::Object(MAP_RELEASE_FIELDS);

const STORY_MAP_FIELDS: &[Field] = &[
    required("id", Shape::Str),
    required("title", Shape::Str),
    optional("description", Shape::Str),
    optional("personas", Shape::List(&PERSONA)),
    optional("activities", Shape::List(&ACTIVITY)),
    optional("tasks", Shape::List(&TASK)),
    optional("userStories", Shape::List(&MAP_STORY)),
    optional("releases", Shape::List(&MAP_RELEASE)),
    optional("createdAt", Shape::Timestamp),
    optional("updatedAt", Shape::Timestamp),
];
pub const STORY_MAP_BOARD: Shape = Shape::Object(STORY_MAP_FIELDS);
