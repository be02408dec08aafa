use super::common::{
    creation_stamp, generate_id, impl_entity, impl_ordered, overlay, EntityId, Timestamped,
};
use crate::services::ordering;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: EntityId,
    pub label: String,
    pub color: String,
    pub bg_color: String,
}

impl Category {
    pub fn new(label: &str, color: &str, bg_color: &str) -> Self {
        Self {
            id: generate_id(),
            label: label.to_string(),
            color: color.to_string(),
            bg_color: bg_color.to_string(),
        }
    }

    /// New, Important, Task, Personal, Work.
    pub fn defaults() -> Vec<Category> {
        vec![
            Category::new("New", "white", "#0A99FF"),
            Category::new("Important", "white", "#EA0B38"),
            Category::new("Task", "black", "#00F5DC"),
            Category::new("Personal", "white", "#629387"),
            Category::new("Work", "black", "#13F644"),
        ]
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CardPriority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<CardPriority>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub order: usize,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// Partial card data. Used both to create a card (fields overlay the defaults)
/// and to update one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardPatch {
    pub id: Option<EntityId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub date: Option<Option<String>>,
    pub assignee: Option<Option<String>>,
    pub priority: Option<Option<CardPriority>>,
    pub tags: Option<Vec<String>>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub order: Option<usize>,
    pub created_at: Option<DateTime<Utc>>,
    /// Honoured by `create` only; updates always refresh the timestamp.
    pub updated_at: Option<DateTime<Utc>>,
}

impl CardPatch {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    fn apply_to(&self, card: &mut Card) {
        overlay!(card, self;
            id, title, description, category, date, assignee, priority, tags, due_date, order,
            created_at,
        );
    }
}

impl Card {
    pub fn create(patch: CardPatch) -> Self {
        let now = Utc::now();
        let mut card = Self {
            id: generate_id(),
            title: "New Card".to_string(),
            description: String::new(),
            category: Category::new("New", "white", "#0A99FF"),
            date: Some(now.format("%Y-%m-%d").to_string()),
            assignee: None,
            priority: None,
            tags: Vec::new(),
            due_date: None,
            order: 0,
            created_at: now,
            updated_at: now,
        };
        patch.apply_to(&mut card);
        card.updated_at = creation_stamp(card.created_at, now, patch.updated_at);
        card
    }

    pub fn update(&self, patch: &CardPatch) -> Self {
        let mut card = self.clone();
        patch.apply_to(&mut card);
        card.touch();
        card
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub cards: Vec<Card>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_cards: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub collapsed: bool,
    pub order: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnPatch {
    pub id: Option<EntityId>,
    pub title: Option<String>,
    pub max_cards: Option<Option<usize>>,
    pub color: Option<Option<String>>,
    pub collapsed: Option<bool>,
    pub order: Option<usize>,
}

impl ColumnPatch {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}

impl Column {
    pub fn create(patch: ColumnPatch) -> Self {
        let mut column = Self {
            id: generate_id(),
            title: "New Column".to_string(),
            cards: Vec::new(),
            max_cards: None,
            color: None,
            collapsed: false,
            order: 0,
        };
        column.merge(&patch);
        column
    }

    /// Columns carry no timestamps, so updating is a plain merge.
    pub fn update(&self, patch: &ColumnPatch) -> Self {
        let mut column = self.clone();
        column.merge(patch);
        column
    }

    fn merge(&mut self, patch: &ColumnPatch) {
        overlay!(self, patch; id, title, max_cards, color, collapsed, order);
    }

    pub fn card(&self, card_id: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == card_id)
    }

    pub fn card_index(&self, card_id: &str) -> Option<usize> {
        self.cards.iter().position(|c| c.id == card_id)
    }

    pub fn is_at_capacity(&self) -> bool {
        self.max_cards.is_some_and(|limit| self.cards.len() >= limit)
    }

    /// Cards sorted by `order`.
    pub fn sorted_cards(&self) -> Vec<Card> {
        ordering::sorted_lane(&self.cards, |_| true)
    }

    /// Append a card at the end of the column.
    pub fn with_card(&self, card: Card) -> Self {
        let mut column = self.clone();
        column.cards = ordering::reindex(&column.cards);
        let mut card = card;
        card.order = column.cards.len();
        column.cards.push(card);
        column
    }

    pub fn with_card_updated(&self, card_id: &str, patch: &CardPatch) -> Self {
        let mut column = self.clone();
        column.cards = self
            .cards
            .iter()
            .map(|card| {
                if card.id == card_id {
                    card.update(patch)
                } else {
                    card.clone()
                }
            })
            .collect();
        column.cards = ordering::reindex(&column.cards);
        column
    }

    pub fn without_card(&self, card_id: &str) -> Self {
        let mut column = self.clone();
        let remaining: Vec<Card> = self
            .cards
            .iter()
            .filter(|c| c.id != card_id)
            .cloned()
            .collect();
        column.cards = ordering::reindex(&remaining);
        column
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KanbanBoard {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct KanbanBoardPatch {
    pub id: Option<EntityId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub columns: Option<Vec<Column>>,
    pub categories: Option<Vec<Category>>,
    pub created_at: Option<DateTime<Utc>>,
    /// Honoured by `create` only; updates always refresh the timestamp.
    pub updated_at: Option<DateTime<Utc>>,
}

impl KanbanBoard {
    /// A board with To Do / In Progress / Done and the default categories.
    pub fn create(patch: KanbanBoardPatch) -> Self {
        let now = Utc::now();
        let columns = ["To Do", "In Progress", "Done"]
            .iter()
            .enumerate()
            .map(|(order, title)| {
                Column::create(ColumnPatch {
                    title: Some(title.to_string()),
                    order: Some(order),
                    ..ColumnPatch::default()
                })
            })
            .collect();
        let mut board = Self {
            id: generate_id(),
            title: "My Kanban Board".to_string(),
            description: String::new(),
            columns,
            categories: Category::defaults(),
            created_at: now,
            updated_at: now,
        };
        overlay!(board, patch; id, title, description, columns, categories, created_at);
        board.updated_at = creation_stamp(board.created_at, now, patch.updated_at);
        board
    }

    pub fn update(&self, patch: &KanbanBoardPatch) -> Self {
        let mut board = self.clone();
        overlay!(board, patch; id, title, description, columns, categories, created_at);
        board.touch();
        board
    }

    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == column_id)
    }

    pub fn column_index(&self, column_id: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.id == column_id)
    }

    /// Locate a card anywhere on the board.
    pub fn find_card(&self, card_id: &str) -> Option<(&Column, &Card)> {
        self.columns
            .iter()
            .find_map(|col| col.card(card_id).map(|card| (col, card)))
    }

    pub fn card_count(&self) -> usize {
        self.columns.iter().map(|c| c.cards.len()).sum()
    }
}

impl_entity!(Card, KanbanBoard);
impl_ordered!(Card, Column);
