//! Stateful kanban view-model.

use crate::domain::common::{EntityId, Timestamped};
use crate::domain::drag::{ContainerKind, DragEvent, DragPosition, ItemKind};
use crate::domain::kanban::{
    Card, CardPatch, Category, Column, ColumnPatch, KanbanBoard, KanbanBoardPatch,
};
use crate::services::drag::{
    validate_move, DragError, DragMachine, DragState, DragSurface, MoveRejection,
};
use crate::services::events::{ListenerId, Listeners};
use crate::services::ordering::{self, Direction};
use crate::services::props::{KanbanPermissions, Theme, DEFAULT_LOCALE, DEFAULT_MAX_COLUMNS};
use crate::services::relations;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct KanbanProps {
    pub board: Option<KanbanBoard>,
    pub columns: Vec<Column>,
    pub categories: Vec<Category>,
    pub max_columns: usize,
    pub permissions: KanbanPermissions,
    pub theme: Theme,
    pub locale: String,
}

impl Default for KanbanProps {
    fn default() -> Self {
        Self {
            board: None,
            columns: Vec::new(),
            categories: Vec::new(),
            max_columns: DEFAULT_MAX_COLUMNS,
            permissions: KanbanPermissions::default(),
            theme: Theme::default(),
            locale: DEFAULT_LOCALE.to_string(),
        }
    }
}

impl KanbanProps {
    pub fn with_board(board: KanbanBoard) -> Self {
        Self {
            board: Some(board),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum KanbanChange {
    CardAdded {
        column_id: EntityId,
        card: Card,
    },
    CardUpdated {
        column_id: EntityId,
        card_id: EntityId,
        updates: CardPatch,
    },
    CardRemoved {
        column_id: EntityId,
        card_id: EntityId,
    },
    CardMoved(DragEvent),
    ColumnAdded(Column),
    ColumnUpdated {
        column_id: EntityId,
        updates: ColumnPatch,
    },
    ColumnRemoved {
        column_id: EntityId,
    },
    ColumnMoved {
        column_id: EntityId,
        from: usize,
        to: usize,
    },
    BoardUpdated(KanbanBoard),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardRef {
    pub column_id: EntityId,
    pub card_id: EntityId,
}

impl DragSurface for KanbanBoard {
    fn lane_ids(&self, position: &DragPosition, item: ItemKind) -> Option<Vec<EntityId>> {
        match (item, position.container_kind) {
            (ItemKind::Card, ContainerKind::Column) => self
                .column(&position.container_id)
                .map(|column| column.sorted_cards().into_iter().map(|c| c.id).collect()),
            (ItemKind::Column, ContainerKind::Board) if position.container_id == self.id => Some(
                ordering::sorted_lane(&self.columns, |_| true)
                    .into_iter()
                    .map(|c| c.id)
                    .collect(),
            ),
            _ => None,
        }
    }

    fn lane_capacity(&self, position: &DragPosition) -> Option<usize> {
        match position.container_kind {
            ContainerKind::Column => self
                .column(&position.container_id)
                .and_then(|column| column.max_cards),
            _ => None,
        }
    }
}

/// Renumber the columns and every column's cards of a freshly loaded board.
pub fn normalize(board: &mut KanbanBoard) {
    board.columns = ordering::reindex(&board.columns)
        .into_iter()
        .map(|mut column| {
            column.cards = ordering::reindex(&column.cards);
            column
        })
        .collect();
}

/// Move a card between (or within) columns. Assumes the event already passed
/// [`validate_move`]; returns `None` if either column or the card is missing.
pub fn apply_card_move(columns: &[Column], event: &DragEvent) -> Option<Vec<Column>> {
    let source = &event.source_position;
    let target = &event.target_position;
    let from = columns.iter().position(|c| c.id == source.container_id)?;
    let to = columns.iter().position(|c| c.id == target.container_id)?;

    let mut columns = columns.to_vec();
    let mut source_cards = columns[from].sorted_cards();
    let index = source_cards.iter().position(|c| c.id == event.item_id)?;
    let mut card = source_cards.remove(index);
    card.touch();

    if from == to {
        let index = target.item_index.min(source_cards.len());
        source_cards.insert(index, card);
        ordering::renumber(&mut source_cards);
        columns[from].cards = source_cards;
    } else {
        let mut target_cards = columns[to].sorted_cards();
        let index = target.item_index.min(target_cards.len());
        target_cards.insert(index, card);
        ordering::renumber(&mut source_cards);
        ordering::renumber(&mut target_cards);
        columns[from].cards = source_cards;
        columns[to].cards = target_cards;
    }
    Some(columns)
}

fn welcome_card(categories: &[Category]) -> Card {
    Card::create(CardPatch {
        description: Some(
            "This is a sample card. You can edit, move, or delete it.".to_string(),
        ),
        category: categories.first().cloned(),
        ..CardPatch::titled("Welcome to Kanban!")
    })
}

#[derive(Debug)]
pub struct KanbanBoardModel {
    props: KanbanProps,
    board: Option<KanbanBoard>,
    drag: DragMachine,
    editing_card: Option<CardRef>,
    editing_column: Option<EntityId>,
    add_card_form: Option<EntityId>,
    add_column_form: bool,
    listeners: Listeners<KanbanChange>,
}

impl KanbanBoardModel {
    pub fn new(props: KanbanProps) -> Self {
        let mut model = Self {
            props: KanbanProps::default(),
            board: None,
            drag: DragMachine::new(),
            editing_card: None,
            editing_column: None,
            add_card_form: None,
            add_column_form: false,
            listeners: Listeners::new(),
        };
        model.update_props(props);
        model
    }

    /// Replace all owned state from `props`. In-progress drags and edits are
    /// discarded; listeners stay subscribed.
    pub fn update_props(&mut self, props: KanbanProps) {
        self.drag.cancel();
        self.clear_ui_flags();

        let mut board = if let Some(board) = props.board.clone() {
            board
        } else if !props.columns.is_empty() {
            KanbanBoard::create(KanbanBoardPatch {
                columns: Some(props.columns.clone()),
                ..KanbanBoardPatch::default()
            })
        } else {
            let mut board = KanbanBoard::create(KanbanBoardPatch::default());
            if let Some(first) = board.columns.first_mut() {
                *first = first.with_card(welcome_card(&board.categories));
            }
            board
        };
        if !props.categories.is_empty() {
            board.categories = props.categories.clone();
        } else if board.categories.is_empty() {
            board.categories = Category::defaults();
        }
        normalize(&mut board);

        debug!(board_id = %board.id, columns = board.columns.len(), "kanban board initialised");
        self.board = Some(board);
        self.props = props;
    }

    /// Drop every collection, flag, drag and listener.
    pub fn destroy(&mut self) {
        self.board = None;
        self.drag.cancel();
        self.clear_ui_flags();
        self.listeners.clear();
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&KanbanChange) + 'static) -> ListenerId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    // Queries

    pub fn props(&self) -> &KanbanProps {
        &self.props
    }

    pub fn board(&self) -> Option<&KanbanBoard> {
        self.board.as_ref()
    }

    /// Columns ascending by `order`.
    pub fn columns(&self) -> Vec<Column> {
        self.board
            .as_ref()
            .map(|b| ordering::sorted_lane(&b.columns, |_| true))
            .unwrap_or_default()
    }

    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.board.as_ref()?.column(column_id)
    }

    pub fn cards(&self, column_id: &str) -> Vec<Card> {
        self.column(column_id)
            .map(Column::sorted_cards)
            .unwrap_or_default()
    }

    pub fn categories(&self) -> &[Category] {
        self.board
            .as_ref()
            .map(|b| b.categories.as_slice())
            .unwrap_or_default()
    }

    pub fn card_count(&self) -> usize {
        self.board.as_ref().map_or(0, KanbanBoard::card_count)
    }

    pub fn can_add_column(&self) -> bool {
        self.props.permissions.allow_add_column
            && self
                .board
                .as_ref()
                .is_some_and(|b| b.columns.len() < self.props.max_columns)
    }

    pub fn drag_state(&self) -> &DragState {
        self.drag.state()
    }

    pub fn editing_card(&self) -> Option<&CardRef> {
        self.editing_card.as_ref()
    }

    pub fn editing_column(&self) -> Option<&str> {
        self.editing_column.as_deref()
    }

    pub fn add_card_form(&self) -> Option<&str> {
        self.add_card_form.as_deref()
    }

    pub fn is_add_column_form_open(&self) -> bool {
        self.add_column_form
    }

    // Cards

    pub fn add_card(&mut self, column_id: &str, patch: CardPatch) -> Option<Card> {
        if !self.props.permissions.allow_add_card {
            debug!(column_id, "add card ignored: not allowed");
            return None;
        }
        let board = self.board.as_mut()?;
        let Some(index) = board.column_index(column_id) else {
            debug!(column_id, "add card ignored: unknown column");
            return None;
        };
        let mut patch = patch;
        if patch.category.is_none() {
            patch.category = board.categories.first().cloned();
        }
        let card = Card::create(patch);
        board.columns[index] = board.columns[index].with_card(card.clone());
        let card = board.columns[index].card(&card.id).cloned().unwrap_or(card);

        info!(board_id = %board.id, column_id, card_id = %card.id, "card added");
        self.listeners.emit(&KanbanChange::CardAdded {
            column_id: column_id.to_string(),
            card: card.clone(),
        });
        self.add_card_form = None;
        self.commit();
        Some(card)
    }

    pub fn update_card(&mut self, column_id: &str, card_id: &str, updates: CardPatch) -> Option<Card> {
        if !self.props.permissions.allow_edit_card {
            debug!(card_id, "update card ignored: not allowed");
            return None;
        }
        let board = self.board.as_mut()?;
        let Some(index) = board.column_index(column_id) else {
            debug!(column_id, "update card ignored: unknown column");
            return None;
        };
        if board.columns[index].card(card_id).is_none() {
            debug!(column_id, card_id, "update card ignored: unknown card");
            return None;
        }
        board.columns[index] = board.columns[index].with_card_updated(card_id, &updates);
        let current_id = updates.id.as_deref().unwrap_or(card_id);
        let card = board.columns[index].card(current_id).cloned();
        info!(board_id = %board.id, column_id, card_id = current_id, "card updated");

        self.listeners.emit(&KanbanChange::CardUpdated {
            column_id: column_id.to_string(),
            card_id: card_id.to_string(),
            updates,
        });
        self.editing_card = None;
        self.commit();
        card
    }

    pub fn remove_card(&mut self, column_id: &str, card_id: &str) -> bool {
        if !self.props.permissions.allow_remove_card {
            debug!(card_id, "remove card ignored: not allowed");
            return false;
        }
        let Some(board) = self.board.as_mut() else {
            return false;
        };
        let Some(index) = board.column_index(column_id) else {
            debug!(column_id, "remove card ignored: unknown column");
            return false;
        };
        if board.columns[index].card(card_id).is_none() {
            debug!(column_id, card_id, "remove card ignored: unknown card");
            return false;
        }
        board.columns[index] = board.columns[index].without_card(card_id);

        info!(board_id = %board.id, column_id, card_id, "card removed");
        self.listeners.emit(&KanbanChange::CardRemoved {
            column_id: column_id.to_string(),
            card_id: card_id.to_string(),
        });
        if self
            .editing_card
            .as_ref()
            .is_some_and(|editing| editing.card_id == card_id)
        {
            self.editing_card = None;
        }
        self.commit();
        true
    }

    /// Move a card one slot up or down inside its column.
    pub fn move_card_step(&mut self, card_id: &str, direction: Direction) -> bool {
        if !matches!(direction, Direction::Up | Direction::Down) {
            return false;
        }
        let Some(board) = self.board.as_ref() else {
            return false;
        };
        let Some((column, _)) = board.find_card(card_id) else {
            debug!(card_id, "move card ignored: unknown card");
            return false;
        };
        let cards = column.sorted_cards();
        let Some(from) = cards.iter().position(|c| c.id == card_id) else {
            return false;
        };
        let Some(to) = ordering::step_target(cards.len(), from, direction) else {
            debug!(card_id, ?direction, "move card ignored: already at the edge");
            return false;
        };
        let event = DragEvent {
            item_id: card_id.to_string(),
            item_kind: ItemKind::Card,
            source_position: DragPosition::new(column.id.clone(), from, ContainerKind::Column),
            target_position: DragPosition::new(column.id.clone(), to, ContainerKind::Column),
        };
        self.apply_move(event).is_ok()
    }

    // Columns

    pub fn add_column(&mut self, patch: ColumnPatch) -> Option<Column> {
        if !self.can_add_column() {
            debug!(max_columns = self.props.max_columns, "add column ignored");
            return None;
        }
        let board = self.board.as_mut()?;
        let mut column = Column::create(patch);
        column.order = board.columns.len();
        board.columns.push(column.clone());
        board.columns = ordering::reindex(&board.columns);
        let column = board.column(&column.id).cloned().unwrap_or(column);

        info!(board_id = %board.id, column_id = %column.id, "column added");
        self.listeners.emit(&KanbanChange::ColumnAdded(column.clone()));
        self.add_column_form = false;
        self.commit();
        Some(column)
    }

    pub fn update_column(&mut self, column_id: &str, updates: ColumnPatch) -> Option<Column> {
        let board = self.board.as_mut()?;
        let Some(index) = board.column_index(column_id) else {
            debug!(column_id, "update column ignored: unknown column");
            return None;
        };
        board.columns[index] = board.columns[index].update(&updates);
        board.columns = ordering::reindex(&board.columns);
        let current_id = updates.id.as_deref().unwrap_or(column_id);
        let column = board.column(current_id).cloned();
        info!(board_id = %board.id, column_id = current_id, "column updated");

        self.listeners.emit(&KanbanChange::ColumnUpdated {
            column_id: column_id.to_string(),
            updates,
        });
        self.editing_column = None;
        self.commit();
        column
    }

    /// Remove a column together with its cards.
    pub fn remove_column(&mut self, column_id: &str) -> bool {
        if !self.props.permissions.allow_remove_column {
            debug!(column_id, "remove column ignored: not allowed");
            return false;
        }
        let Some(board) = self.board.as_mut() else {
            return false;
        };
        let Some(columns) = relations::remove_column(&board.columns, column_id) else {
            debug!(column_id, "remove column ignored: unknown column");
            return false;
        };
        board.columns = columns;

        info!(board_id = %board.id, column_id, "column removed");
        self.listeners.emit(&KanbanChange::ColumnRemoved {
            column_id: column_id.to_string(),
        });
        if self.editing_column.as_deref() == Some(column_id) {
            self.editing_column = None;
        }
        if self.add_card_form.as_deref() == Some(column_id) {
            self.add_card_form = None;
        }
        if self
            .editing_card
            .as_ref()
            .is_some_and(|editing| editing.column_id == column_id)
        {
            self.editing_card = None;
        }
        self.commit();
        true
    }

    /// Swap a column with its left or right neighbour.
    pub fn move_column(&mut self, column_id: &str, direction: Direction) -> bool {
        if !matches!(direction, Direction::Left | Direction::Right) {
            return false;
        }
        let Some(board) = self.board.as_mut() else {
            return false;
        };
        let columns = ordering::sorted_lane(&board.columns, |_| true);
        let Some(from) = columns.iter().position(|c| c.id == column_id) else {
            debug!(column_id, "move column ignored: unknown column");
            return false;
        };
        let Some(to) = ordering::step_target(columns.len(), from, direction) else {
            debug!(column_id, ?direction, "move column ignored: already at the edge");
            return false;
        };
        board.columns = ordering::reorder(&columns, from, to);

        info!(board_id = %board.id, column_id, from, to, "column moved");
        self.listeners.emit(&KanbanChange::ColumnMoved {
            column_id: column_id.to_string(),
            from,
            to,
        });
        self.commit();
        true
    }

    // Drag and drop

    pub fn start_card_drag(&mut self, card_id: &str) -> Result<(), DragError> {
        if !self.props.permissions.allow_drag_card {
            return Err(DragError::Disabled {
                kind: ItemKind::Card,
            });
        }
        let unknown = || DragError::UnknownItem {
            kind: ItemKind::Card,
            item_id: card_id.to_string(),
        };
        let board = self.board.as_ref().ok_or_else(unknown)?;
        let (column, _) = board.find_card(card_id).ok_or_else(unknown)?;
        let index = column
            .sorted_cards()
            .iter()
            .position(|c| c.id == card_id)
            .ok_or_else(unknown)?;
        let source = DragPosition::new(column.id.clone(), index, ContainerKind::Column);
        self.drag.start(card_id, ItemKind::Card, source)
    }

    pub fn start_column_drag(&mut self, column_id: &str) -> Result<(), DragError> {
        if !self.props.permissions.allow_drag_column {
            return Err(DragError::Disabled {
                kind: ItemKind::Column,
            });
        }
        let unknown = || DragError::UnknownItem {
            kind: ItemKind::Column,
            item_id: column_id.to_string(),
        };
        let board = self.board.as_ref().ok_or_else(unknown)?;
        let index = ordering::sorted_lane(&board.columns, |_| true)
            .iter()
            .position(|c| c.id == column_id)
            .ok_or_else(unknown)?;
        let source = DragPosition::new(board.id.clone(), index, ContainerKind::Board);
        self.drag.start(column_id, ItemKind::Column, source)
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

    /// Finish the gesture and commit the move it describes. The machine is
    /// idle afterwards whatever the outcome.
    pub fn end_drag(&mut self) -> Result<DragEvent, MoveRejection> {
        let event = self.drag.finish().ok_or(MoveRejection::NoTarget)?;
        self.apply_move(event)
    }

    /// Validate and commit a move, whether it came from a gesture or from
    /// the host.
    pub fn apply_move(&mut self, event: DragEvent) -> Result<DragEvent, MoveRejection> {
        let allowed = match event.item_kind {
            ItemKind::Card => self.props.permissions.allow_drag_card,
            ItemKind::Column => self.props.permissions.allow_drag_column,
            other => {
                return Err(MoveRejection::UnsupportedKind {
                    item: other,
                    container: event.target_position.container_kind,
                })
            }
        };
        if !allowed {
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

        let change = match event.item_kind {
            ItemKind::Column => {
                let columns = ordering::sorted_lane(&board.columns, |_| true);
                let from = event.source_position.item_index;
                let to = event.target_position.item_index.min(columns.len() - 1);
                board.columns = ordering::reorder(&columns, from, to);
                KanbanChange::ColumnMoved {
                    column_id: event.item_id.clone(),
                    from,
                    to,
                }
            }
            _ => {
                let Some(columns) = apply_card_move(&board.columns, &event) else {
                    return Err(MoveRejection::ItemMismatch {
                        expected: event.item_id.clone(),
                        found: String::new(),
                    });
                };
                board.columns = columns;
                KanbanChange::CardMoved(event.clone())
            }
        };

        info!(
            board_id = %board.id,
            item_id = %event.item_id,
            from = %event.source_position.container_id,
            to = %event.target_position.container_id,
            "item moved"
        );
        self.listeners.emit(&change);
        self.commit();
        Ok(event)
    }

    // UI flags

    pub fn toggle_card_edit(&mut self, column_id: &str, card_id: &str) {
        let target = CardRef {
            column_id: column_id.to_string(),
            card_id: card_id.to_string(),
        };
        if self.editing_card.as_ref() == Some(&target) {
            self.editing_card = None;
        } else {
            self.editing_card = Some(target);
        }
    }

    pub fn toggle_column_edit(&mut self, column_id: &str) {
        if self.editing_column.as_deref() == Some(column_id) {
            self.editing_column = None;
        } else {
            self.editing_column = Some(column_id.to_string());
        }
    }

    pub fn toggle_add_card_form(&mut self, column_id: &str) {
        if self.add_card_form.as_deref() == Some(column_id) {
            self.add_card_form = None;
        } else {
            self.add_card_form = Some(column_id.to_string());
        }
    }

    pub fn toggle_add_column_form(&mut self) {
        self.add_column_form = !self.add_column_form;
    }

    fn clear_ui_flags(&mut self) {
        self.editing_card = None;
        self.editing_column = None;
        self.add_card_form = None;
        self.add_column_form = false;
    }

    fn commit(&mut self) {
        if let Some(board) = self.board.as_mut() {
            board.touch();
            let snapshot = board.clone();
            self.listeners.emit(&KanbanChange::BoardUpdated(snapshot));
        }
    }
}
