use boardkit::domain::backlog::{EpicPatch, ReleasePatch, SprintPatch, UserStoryPatch};
use boardkit::domain::kanban::{CardPatch, Column, ColumnPatch};
use boardkit::domain::story_map::{
    ActivityPatch, MapReleasePatch, MapStoryPatch, MapTaskPatch, PersonaPatch,
};
use boardkit::services::backlog_board::{BacklogBoardModel, BacklogProps, UNSCHEDULED_LANE};
use boardkit::services::kanban_board::{KanbanBoardModel, KanbanProps};
use boardkit::services::ordering::Direction;
use boardkit::services::story_map_board::{StoryMapBoardModel, StoryMapProps};
use boardkit::{ContainerKind, DragPosition, ItemKind};
use rstest::rstest;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

fn column_with(titles: &[&str]) -> (KanbanBoardModel, String) {
    let mut model = KanbanBoardModel::new(KanbanProps {
        columns: vec![
            Column::create(ColumnPatch {
                order: Some(0),
                ..ColumnPatch::titled("Todo")
            }),
            Column::create(ColumnPatch {
                order: Some(1),
                ..ColumnPatch::titled("Done")
            }),
        ],
        ..KanbanProps::default()
    });
    let column_id = model.columns()[0].id.clone();
    for title in titles {
        model.add_card(&column_id, CardPatch::titled(*title));
    }
    (model, column_id)
}

fn titles(model: &KanbanBoardModel, column_id: &str) -> Vec<String> {
    model.cards(column_id).into_iter().map(|c| c.title).collect()
}

fn assert_dense(model: &KanbanBoardModel) {
    for column in model.columns() {
        let orders: Vec<usize> = column.cards.iter().map(|c| c.order).collect();
        assert_eq!(orders, (0..column.cards.len()).collect::<Vec<_>>());
    }
    let orders: Vec<usize> = model.columns().iter().map(|c| c.order).collect();
    assert_eq!(orders, (0..orders.len()).collect::<Vec<_>>());
}

#[rstest]
#[case(0, 2, &["B", "C", "A"])]
#[case(2, 0, &["C", "A", "B"])]
#[case(1, 1, &["A", "B", "C"])]
#[case(0, 3, &["B", "C", "A"])]
fn test_move_within_column(#[case] from: usize, #[case] to: usize, #[case] expected: &[&str]) {
    let (mut model, column_id) = column_with(&["A", "B", "C"]);
    let card_id = model.cards(&column_id)[from].id.clone();

    model.start_card_drag(&card_id).unwrap();
    model
        .hover(DragPosition::new(column_id.clone(), to, ContainerKind::Column))
        .unwrap();
    model.end_drag().unwrap();

    assert_eq!(titles(&model, &column_id), expected);
    assert_dense(&model);
}

#[test]
fn test_drop_in_place_keeps_orders() {
    let (mut model, column_id) = column_with(&["A", "B", "C"]);
    let before: Vec<(String, usize)> = model
        .cards(&column_id)
        .into_iter()
        .map(|c| (c.id, c.order))
        .collect();

    model.start_card_drag(&before[1].0).unwrap();
    model
        .hover(DragPosition::new(column_id.clone(), 1, ContainerKind::Column))
        .unwrap();
    model.end_drag().unwrap();

    let after: Vec<(String, usize)> = model
        .cards(&column_id)
        .into_iter()
        .map(|c| (c.id, c.order))
        .collect();
    assert_eq!(after, before);
}

#[rstest]
#[case(0, Direction::Down, &["B", "A", "C"])]
#[case(2, Direction::Up, &["A", "C", "B"])]
#[case(0, Direction::Up, &["A", "B", "C"])]
#[case(2, Direction::Down, &["A", "B", "C"])]
fn test_step_moves(#[case] index: usize, #[case] direction: Direction, #[case] expected: &[&str]) {
    let (mut model, column_id) = column_with(&["A", "B", "C"]);
    let card_id = model.cards(&column_id)[index].id.clone();

    model.move_card_step(&card_id, direction);

    assert_eq!(titles(&model, &column_id), expected);
    assert_dense(&model);
}

#[test]
fn test_removal_keeps_orders_dense() {
    let (mut model, column_id) = column_with(&["A", "B", "C", "D"]);
    let second = model.cards(&column_id)[1].id.clone();

    assert!(model.remove_card(&column_id, &second));
    assert_eq!(titles(&model, &column_id), ["A", "C", "D"]);
    assert_dense(&model);
}

/// Every lane in `lanes` must hold exactly the orders `0..len`.
fn assert_lanes_dense<K: Eq + Hash + Debug>(
    step: &str,
    lanes: impl IntoIterator<Item = (K, usize)>,
) {
    let mut grouped: HashMap<K, Vec<usize>> = HashMap::new();
    for (lane, order) in lanes {
        grouped.entry(lane).or_default().push(order);
    }
    for (lane, mut orders) in grouped {
        orders.sort_unstable();
        let expected: Vec<usize> = (0..orders.len()).collect();
        assert_eq!(orders, expected, "after {step}: lane {lane:?}");
    }
}

fn check_kanban(model: &KanbanBoardModel, step: &str) {
    let board = model.board().unwrap();
    assert_lanes_dense(step, board.columns.iter().map(|c| ((), c.order)));
    for column in &board.columns {
        assert_lanes_dense(step, column.cards.iter().map(|c| (column.id.clone(), c.order)));
    }
}

fn check_backlog(model: &BacklogBoardModel, step: &str) {
    let board = model.board().unwrap();
    assert_lanes_dense(step, board.epics.iter().map(|e| ((), e.order)));
    assert_lanes_dense(step, board.releases.iter().map(|r| ((), r.order)));
    assert_lanes_dense(step, board.user_stories.iter().map(|s| (s.release_id.clone(), s.order)));
    assert_lanes_dense(step, board.sprints.iter().map(|s| (s.release_id.clone(), s.order)));
}

fn check_story_map(model: &StoryMapBoardModel, step: &str) {
    let board = model.board().unwrap();
    assert_lanes_dense(step, board.activities.iter().map(|a| (a.persona_id.clone(), a.order)));
    assert_lanes_dense(step, board.tasks.iter().map(|t| (t.activity_id.clone(), t.order)));
    assert_lanes_dense(step, board.user_stories.iter().map(|s| (s.task_id.clone(), s.order)));
    assert_lanes_dense(step, board.releases.iter().map(|r| ((), r.order)));
}

#[test]
fn test_kanban_lanes_stay_dense_through_mixed_edits() {
    let mut model = KanbanBoardModel::new(KanbanProps::default());
    let ids: Vec<String> = model.columns().iter().map(|c| c.id.clone()).collect();
    check_kanban(&model, "load");

    let a = model.add_card(&ids[0], CardPatch::titled("A")).unwrap();
    let b = model.add_card(&ids[0], CardPatch::titled("B")).unwrap();
    let c = model.add_card(&ids[0], CardPatch::titled("C")).unwrap();
    model.add_card(&ids[1], CardPatch::titled("D")).unwrap();
    check_kanban(&model, "adds");

    assert!(model.remove_card(&ids[0], &b.id));
    check_kanban(&model, "remove card");

    model.start_card_drag(&c.id).unwrap();
    model
        .hover(DragPosition::new(ids[1].clone(), 0, ContainerKind::Column))
        .unwrap();
    model.end_drag().unwrap();
    check_kanban(&model, "drag across columns");

    model.move_card_step(&a.id, Direction::Up);
    check_kanban(&model, "step move");

    assert!(model.remove_column(&ids[1]));
    check_kanban(&model, "remove column");

    model.add_column(ColumnPatch::titled("Later")).unwrap();
    check_kanban(&model, "add column");
}

#[test]
fn test_backlog_lanes_stay_dense_through_mixed_edits() {
    let mut model = BacklogBoardModel::new(BacklogProps::default());
    let r1 = model.add_release(ReleasePatch::named("R1")).unwrap();
    let r2 = model.add_release(ReleasePatch::named("R2")).unwrap();
    let epic = model.add_epic(EpicPatch::titled("E")).unwrap();
    let a = model.add_story(Some(&epic.id), Some(&r1.id), UserStoryPatch::titled("A")).unwrap();
    let b = model.add_story(None, Some(&r1.id), UserStoryPatch::titled("B")).unwrap();
    let c = model.add_story(None, None, UserStoryPatch::titled("C")).unwrap();
    model.add_story(None, Some(&r2.id), UserStoryPatch::titled("D")).unwrap();
    let sprint = model.add_sprint(Some(&r1.id), SprintPatch::named("S1")).unwrap();
    model.add_sprint(None, SprintPatch::named("Loose")).unwrap();
    check_backlog(&model, "adds");

    model.start_drag(ItemKind::Story, &a.id).unwrap();
    model
        .hover(DragPosition::new(UNSCHEDULED_LANE, 0, ContainerKind::Unscheduled))
        .unwrap();
    model.end_drag().unwrap();
    check_backlog(&model, "drag to unscheduled");

    model.start_drag(ItemKind::Story, &c.id).unwrap();
    model
        .hover(DragPosition::new(sprint.id.clone(), 0, ContainerKind::Sprint))
        .unwrap();
    model.end_drag().unwrap();
    check_backlog(&model, "drag onto sprint");

    model
        .update_story(
            &b.id,
            UserStoryPatch {
                release_id: Some(Some(r2.id.clone())),
                ..UserStoryPatch::default()
            },
        )
        .unwrap();
    check_backlog(&model, "release change");

    assert!(model.remove_release(&r1.id));
    check_backlog(&model, "release cascade");

    assert!(model.remove_story(&c.id));
    assert!(model.remove_epic(&epic.id));
    check_backlog(&model, "removals");
}

#[test]
fn test_story_map_lanes_stay_dense_through_mixed_edits() {
    let mut model = StoryMapBoardModel::new(StoryMapProps::default());
    let persona = model.add_persona(PersonaPatch::named("Buyer")).unwrap();
    let a1 = model.add_activity(&persona.id, ActivityPatch::titled("Find")).unwrap();
    let a2 = model.add_activity(&persona.id, ActivityPatch::titled("Pay")).unwrap();
    let t1 = model.add_task(&a1.id, MapTaskPatch::titled("Search")).unwrap();
    let t2 = model.add_task(&a1.id, MapTaskPatch::titled("Filter")).unwrap();
    model.add_task(&a1.id, MapTaskPatch::titled("Sort")).unwrap();
    model.add_task(&a2.id, MapTaskPatch::titled("Checkout")).unwrap();
    model.add_story(&t1.id, MapStoryPatch::titled("By name")).unwrap();
    model.add_story(&t1.id, MapStoryPatch::titled("By tag")).unwrap();
    let r1 = model.add_release(MapReleasePatch::named("MVP")).unwrap();
    model.add_release(MapReleasePatch::named("Later")).unwrap();
    check_story_map(&model, "adds");

    model.start_drag(ItemKind::Task, &t1.id).unwrap();
    model
        .hover(DragPosition::new(a2.id.clone(), 0, ContainerKind::Activity))
        .unwrap();
    model.end_drag().unwrap();
    check_story_map(&model, "drag task across activities");

    assert!(model.remove_task(&t2.id));
    check_story_map(&model, "remove task");

    assert!(model.remove_activity(&a2.id));
    check_story_map(&model, "activity cascade");

    assert!(model.remove_release(&r1.id));
    check_story_map(&model, "remove release");
}
