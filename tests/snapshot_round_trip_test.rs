use boardkit::domain::backlog::{EpicPatch, UserStoryPatch};
use boardkit::domain::kanban::{CardPatch, Column, ColumnPatch};
use boardkit::domain::story_map::{ActivityPatch, MapTaskPatch, PersonaPatch};
use boardkit::services::backlog_board::{BacklogBoardModel, BacklogProps};
use boardkit::services::kanban_board::{KanbanBoardModel, KanbanProps};
use boardkit::services::story_map_board::{StoryMapBoardModel, StoryMapProps};
use boardkit::{export_json, import_backlog, import_kanban, import_story_map, ImportError};

#[test]
fn test_kanban_edit_survives_round_trip() {
    let mut model = KanbanBoardModel::new(KanbanProps {
        columns: vec![Column::create(ColumnPatch {
            order: Some(0),
            ..ColumnPatch::titled("Todo")
        })],
        ..KanbanProps::default()
    });
    let column_id = model.columns()[0].id.clone();
    let card = model.add_card(&column_id, CardPatch::titled("Draft")).unwrap();
    model
        .update_card(&column_id, &card.id, CardPatch::titled("X"))
        .unwrap();

    let json = export_json(model.board().unwrap()).unwrap();
    let restored = import_kanban(&json).unwrap();

    let (_, restored_card) = restored.find_card(&card.id).unwrap();
    assert_eq!(restored_card.title, "X");
    assert!(restored_card.updated_at >= restored_card.created_at);
    assert_eq!(&restored, model.board().unwrap());
}

#[test]
fn test_backlog_round_trip() {
    let mut model = BacklogBoardModel::new(BacklogProps::default());
    let epic = model.add_epic(EpicPatch::titled("Checkout")).unwrap();
    model.add_story(Some(&epic.id), None, UserStoryPatch::titled("Pay by card"));

    let json = export_json(model.board().unwrap()).unwrap();
    assert!(json.contains("\"userStories\""));
    let restored = import_backlog(&json).unwrap();
    assert_eq!(&restored, model.board().unwrap());
}

#[test]
fn test_story_map_round_trip() {
    let mut model = StoryMapBoardModel::new(StoryMapProps::default());
    let persona = model.add_persona(PersonaPatch::named("Buyer")).unwrap();
    let activity = model.add_activity(&persona.id, ActivityPatch::titled("Find")).unwrap();
    model.add_task(&activity.id, MapTaskPatch::titled("Search")).unwrap();

    let json = export_json(model.board().unwrap()).unwrap();
    let restored = import_story_map(&json).unwrap();
    assert_eq!(&restored, model.board().unwrap());
}

#[test]
fn test_missing_required_field_is_reported() {
    let model = BacklogBoardModel::new(BacklogProps::default());
    let mut json: serde_json::Value =
        serde_json::from_str(&export_json(model.board().unwrap()).unwrap()).unwrap();
    json["epics"] = serde_json::json!([{"id": "e1", "title": "E"}]);

    let Err(ImportError::Invalid { errors }) = import_backlog(&json.to_string()) else {
        panic!("expected validation failure");
    };
    assert_eq!(errors, vec!["epics[0].order: is required".to_string()]);
}

#[test]
fn test_null_in_non_nullable_field_is_reported() {
    let model = BacklogBoardModel::new(BacklogProps::default());
    let mut json: serde_json::Value =
        serde_json::from_str(&export_json(model.board().unwrap()).unwrap()).unwrap();
    json["description"] = serde_json::Value::Null;
    json["userStories"] = serde_json::json!([
        {"id": "s1", "title": "S", "order": 0, "releaseId": null, "tags": null}
    ]);

    let Err(ImportError::Invalid { errors }) = import_backlog(&json.to_string()) else {
        panic!("expected validation failure");
    };
    assert_eq!(
        errors,
        vec![
            "description: expected string".to_string(),
            "userStories[0].tags: expected array".to_string(),
        ]
    );
}

#[test]
fn test_null_in_nullable_field_is_accepted() {
    let model = BacklogBoardModel::new(BacklogProps::default());
    let mut json: serde_json::Value =
        serde_json::from_str(&export_json(model.board().unwrap()).unwrap()).unwrap();
    json["userStories"] = serde_json::json!([
        {"id": "s1", "title": "S", "order": 0, "releaseId": null, "storyPoints": null}
    ]);

    let board = import_backlog(&json.to_string()).unwrap();
    let story = board.story("s1").unwrap();
    assert!(story.release_id.is_none());
    assert!(story.story_points.is_none());
}
