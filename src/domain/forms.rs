//! Add/edit form data for every entity kind.
//!
//! A form is what a user typed into a dialog. `validate` reports every broken
//! rule at once; `into_patch` turns an accepted form into the patch the board
//! models consume.

use super::backlog::{EpicPatch, Priority, ReleasePatch, SprintPatch, UserStoryPatch, WorkItemType};
use super::common::EntityId;
use super::kanban::{CardPatch, CardPriority, Category, ColumnPatch};
use super::story_map::{
    ActivityPatch, MapPriority, MapReleasePatch, MapStoryPatch, MapTaskPatch, PersonaPatch,
};
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("{field} must be at least {min}, got {value}")]
    BelowMinimum {
        field: &'static str,
        min: f64,
        value: f64,
    },

    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error("{field} references unknown id '{id}'")]
    UnknownReference { field: &'static str, id: EntityId },

    #[error("{end} cannot be before {start}")]
    DateOrder {
        start: &'static str,
        end: &'static str,
    },
}

#[derive(Default)]
struct Checks {
    errors: Vec<FormError>,
}

impl Checks {
    fn required(&mut self, field: &'static str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.errors.push(FormError::Required { field });
        }
        self
    }

    fn at_least(&mut self, field: &'static str, value: Option<f64>, min: f64) -> &mut Self {
        if let Some(value) = value {
            if !value.is_finite() {
                self.errors.push(FormError::NotFinite { field });
            } else if value < min {
                self.errors.push(FormError::BelowMinimum { field, min, value });
            }
        }
        self
    }

    fn date_order(
        &mut self,
        start: (&'static str, Option<DateTime<Utc>>),
        end: (&'static str, Option<DateTime<Utc>>),
    ) -> &mut Self {
        if let (Some(from), Some(to)) = (start.1, end.1) {
            if to < from {
                self.errors.push(FormError::DateOrder {
                    start: start.0,
                    end: end.0,
                });
            }
        }
        self
    }

    fn finish(&mut self) -> Result<(), Vec<FormError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(std::mem::take(&mut self.errors))
        }
    }
}

fn non_empty(value: Option<String>) -> Option<Option<String>> {
    Some(value.filter(|v| !v.trim().is_empty()))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardForm {
    pub title: String,
    pub description: String,
    pub category_id: EntityId,
    pub assignee: Option<String>,
    pub priority: Option<CardPriority>,
    pub tags: Vec<String>,
    pub due_date: Option<DateTime<Utc>>,
}

impl CardForm {
    /// `categories` are the board's; the chosen category must be one of them.
    pub fn validate(&self, categories: &[Category]) -> Result<(), Vec<FormError>> {
        let mut checks = Checks::default();
        checks.required("title", &self.title);
        if !categories.iter().any(|c| c.id == self.category_id) {
            checks.errors.push(FormError::UnknownReference {
                field: "categoryId",
                id: self.category_id.clone(),
            });
        }
        checks.finish()
    }

    pub fn into_patch(self, categories: &[Category]) -> CardPatch {
        CardPatch {
            title: Some(self.title.trim().to_string()),
            description: Some(self.description),
            category: categories.iter().find(|c| c.id == self.category_id).cloned(),
            assignee: non_empty(self.assignee),
            priority: Some(self.priority),
            tags: Some(self.tags),
            due_date: Some(self.due_date),
            ..CardPatch::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnForm {
    pub title: String,
    pub color: Option<String>,
    pub max_cards: Option<usize>,
}

impl ColumnForm {
    pub fn validate(&self) -> Result<(), Vec<FormError>> {
        Checks::default()
            .required("title", &self.title)
            .at_least("maxCards", self.max_cards.map(|m| m as f64), 1.0)
            .finish()
    }

    pub fn into_patch(self) -> ColumnPatch {
        ColumnPatch {
            title: Some(self.title.trim().to_string()),
            color: non_empty(self.color),
            max_cards: Some(self.max_cards),
            ..ColumnPatch::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EpicForm {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub estimated_effort: Option<String>,
    pub business_value: Option<f64>,
    pub tags: Vec<String>,
}

impl EpicForm {
    pub fn validate(&self) -> Result<(), Vec<FormError>> {
        Checks::default()
            .required("title", &self.title)
            .at_least("businessValue", self.business_value, 0.0)
            .finish()
    }

    pub fn into_patch(self) -> EpicPatch {
        EpicPatch {
            title: Some(self.title.trim().to_string()),
            description: Some(self.description),
            priority: Some(self.priority),
            estimated_effort: non_empty(self.estimated_effort),
            business_value: Some(self.business_value),
            tags: Some(self.tags),
            ..EpicPatch::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoryForm {
    pub title: String,
    pub description: String,
    pub as_a: Option<String>,
    pub i_want: Option<String>,
    pub so_that: Option<String>,
    pub story_points: Option<f64>,
    pub priority: Priority,
    pub item_type: WorkItemType,
    pub acceptance_criteria: Vec<String>,
    pub tags: Vec<String>,
    pub labels: Vec<String>,
}

impl StoryForm {
    pub fn validate(&self) -> Result<(), Vec<FormError>> {
        Checks::default()
            .required("title", &self.title)
            .at_least("storyPoints", self.story_points, 0.0)
            .finish()
    }

    pub fn into_patch(self) -> UserStoryPatch {
        UserStoryPatch {
            title: Some(self.title.trim().to_string()),
            description: Some(self.description),
            as_a: non_empty(self.as_a),
            i_want: non_empty(self.i_want),
            so_that: non_empty(self.so_that),
            story_points: Some(self.story_points),
            priority: Some(self.priority),
            item_type: Some(self.item_type),
            color: Some(self.item_type.color().to_string()),
            acceptance_criteria: Some(self.acceptance_criteria),
            tags: Some(self.tags),
            labels: Some(self.labels),
            ..UserStoryPatch::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReleaseForm {
    pub name: String,
    pub description: String,
    pub version: Option<String>,
    pub target_date: Option<DateTime<Utc>>,
    pub start_date: Option<DateTime<Utc>>,
    pub goals: Vec<String>,
    pub features: Vec<String>,
}

impl ReleaseForm {
    pub fn validate(&self) -> Result<(), Vec<FormError>> {
        Checks::default()
            .required("name", &self.name)
            .date_order(("startDate", self.start_date), ("targetDate", self.target_date))
            .finish()
    }

    pub fn into_patch(self) -> ReleasePatch {
        ReleasePatch {
            name: Some(self.name.trim().to_string()),
            description: Some(self.description),
            version: non_empty(self.version),
            target_date: Some(self.target_date),
            start_date: Some(self.start_date),
            goals: Some(self.goals),
            features: Some(self.features),
            ..ReleasePatch::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SprintForm {
    pub name: String,
    pub description: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub capacity: Option<f64>,
    pub goals: Vec<String>,
}

impl SprintForm {
    pub fn validate(&self) -> Result<(), Vec<FormError>> {
        Checks::default()
            .required("name", &self.name)
            .at_least("capacity", self.capacity, 0.0)
            .date_order(("startDate", self.start_date), ("endDate", self.end_date))
            .finish()
    }

    pub fn into_patch(self) -> SprintPatch {
        SprintPatch {
            name: Some(self.name.trim().to_string()),
            description: Some(self.description),
            start_date: Some(self.start_date),
            end_date: Some(self.end_date),
            capacity: Some(self.capacity),
            goals: Some(self.goals),
            ..SprintPatch::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonaForm {
    pub name: String,
    pub description: String,
    pub role: String,
    pub goals: Vec<String>,
    pub pain_points: Vec<String>,
}

impl PersonaForm {
    pub fn validate(&self) -> Result<(), Vec<FormError>> {
        Checks::default().required("name", &self.name).finish()
    }

    pub fn into_patch(self) -> PersonaPatch {
        PersonaPatch {
            name: Some(self.name.trim().to_string()),
            description: Some(self.description),
            role: Some(self.role),
            goals: Some(self.goals),
            pain_points: Some(self.pain_points),
            ..PersonaPatch::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityForm {
    pub title: String,
    pub description: String,
    pub estimated_duration: Option<String>,
    pub priority: MapPriority,
}

impl ActivityForm {
    pub fn validate(&self) -> Result<(), Vec<FormError>> {
        Checks::default().required("title", &self.title).finish()
    }

    pub fn into_patch(self) -> ActivityPatch {
        ActivityPatch {
            title: Some(self.title.trim().to_string()),
            description: Some(self.description),
            estimated_duration: non_empty(self.estimated_duration),
            priority: Some(self.priority),
            ..ActivityPatch::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub estimated_effort: Option<String>,
    pub priority: MapPriority,
    pub acceptance_criteria: Vec<String>,
    pub tags: Vec<String>,
}

impl TaskForm {
    pub fn validate(&self) -> Result<(), Vec<FormError>> {
        Checks::default().required("title", &self.title).finish()
    }

    pub fn into_patch(self) -> MapTaskPatch {
        MapTaskPatch {
            title: Some(self.title.trim().to_string()),
            description: Some(self.description),
            estimated_effort: non_empty(self.estimated_effort),
            priority: Some(self.priority),
            acceptance_criteria: Some(self.acceptance_criteria),
            tags: Some(self.tags),
            ..MapTaskPatch::default()
        }
    }
}

/// Story-map stories insist on the full "As a / I want / So that" sentence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapStoryForm {
    pub title: String,
    pub description: String,
    pub as_a: String,
    pub i_want: String,
    pub so_that: String,
    pub story_points: Option<f64>,
    pub priority: MapPriority,
    pub acceptance_criteria: Vec<String>,
    pub labels: Vec<String>,
}

impl MapStoryForm {
    pub fn validate(&self) -> Result<(), Vec<FormError>> {
        Checks::default()
            .required("title", &self.title)
            .required("asA", &self.as_a)
            .required("iWant", &self.i_want)
            .required("soThat", &self.so_that)
            .at_least("storyPoints", self.story_points, 0.0)
            .finish()
    }

    pub fn into_patch(self) -> MapStoryPatch {
        MapStoryPatch {
            title: Some(self.title.trim().to_string()),
            description: Some(self.description),
            as_a: Some(self.as_a),
            i_want: Some(self.i_want),
            so_that: Some(self.so_that),
            story_points: Some(self.story_points),
            priority: Some(self.priority),
            acceptance_criteria: Some(self.acceptance_criteria),
            labels: Some(self.labels),
            ..MapStoryPatch::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapReleaseForm {
    pub name: String,
    pub description: String,
    pub version: Option<String>,
    pub target_date: Option<DateTime<Utc>>,
    pub goals: Vec<String>,
    pub features: Vec<String>,
}

impl MapReleaseForm {
    pub fn validate(&self) -> Result<(), Vec<FormError>> {
        Checks::default().required("name", &self.name).finish()
    }

    pub fn into_patch(self) -> MapReleasePatch {
        MapReleasePatch {
            name: Some(self.name.trim().to_string()),
            description: Some(self.description),
            version: non_empty(self.version),
            target_date: Some(self.target_date),
            goals: Some(self.goals),
            features: Some(self.features),
            ..MapReleasePatch::default()
        }
    }
}
