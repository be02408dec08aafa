use boardkit::domain::story_map::{
    ActivityPatch, MapReleasePatch, MapStoryPatch, MapTaskPatch, PersonaPatch,
};
use boardkit::services::story_map_board::{StoryMapBoardModel, StoryMapProps};

#[test]
fn test_removing_activity_leaves_no_orphans() {
    let mut model = StoryMapBoardModel::new(StoryMapProps::default());
    let persona = model.add_persona(PersonaPatch::named("Shopper")).unwrap();
    let keep = model.add_activity(&persona.id, ActivityPatch::titled("Keep")).unwrap();
    let doomed = model.add_activity(&persona.id, ActivityPatch::titled("Drop")).unwrap();

    let kept_task = model.add_task(&keep.id, MapTaskPatch::titled("Kept")).unwrap();
    let task = model.add_task(&doomed.id, MapTaskPatch::titled("Gone")).unwrap();
    let story = model.add_story(&task.id, MapStoryPatch::titled("Gone too")).unwrap();
    let kept_story = model.add_story(&kept_task.id, MapStoryPatch::titled("Stays")).unwrap();

    let release = model.add_release(MapReleasePatch::named("MVP")).unwrap();
    model.assign_story_to_release(&story.id, &release.id);
    model.assign_story_to_release(&kept_story.id, &release.id);

    assert!(model.remove_activity(&doomed.id));

    let board = model.board().unwrap();
    assert!(board.tasks.iter().all(|t| t.activity_id != doomed.id));
    assert!(board.user_stories.iter().all(|s| s.task_id != task.id));
    let release = board.release(&release.id).unwrap();
    assert!(!release.includes(&story.id));
    assert!(release.includes(&kept_story.id));

    assert_eq!(model.activities_for_persona(&persona.id).len(), 1);
    assert_eq!(model.tasks_for_activity(&keep.id).len(), 1);
    assert_eq!(model.stories_for_task(&kept_task.id).len(), 1);
}

#[test]
fn test_removing_persona_clears_the_whole_branch() {
    let mut model = StoryMapBoardModel::new(StoryMapProps::default());
    let persona = model.add_persona(PersonaPatch::named("Guest")).unwrap();
    let activity = model.add_activity(&persona.id, ActivityPatch::titled("Browse")).unwrap();
    let task = model.add_task(&activity.id, MapTaskPatch::titled("Search")).unwrap();
    model.add_story(&task.id, MapStoryPatch::titled("Filter")).unwrap();

    assert!(model.remove_persona(&persona.id));
    let board = model.board().unwrap();
    assert!(board.personas.is_empty());
    assert!(board.activities.is_empty());
    assert!(board.tasks.is_empty());
    assert!(board.user_stories.is_empty());
}

#[test]
fn test_release_removal_keeps_stories() {
    let mut model = StoryMapBoardModel::new(StoryMapProps::default());
    let persona = model.add_persona(PersonaPatch::named("Admin")).unwrap();
    let activity = model.add_activity(&persona.id, ActivityPatch::titled("Manage")).unwrap();
    let task = model.add_task(&activity.id, MapTaskPatch::titled("Users")).unwrap();
    let story = model.add_story(&task.id, MapStoryPatch::titled("Invite")).unwrap();
    let release = model.add_release(MapReleasePatch::named("MVP")).unwrap();
    model.assign_story_to_release(&story.id, &release.id);

    assert!(model.remove_release(&release.id));
    assert!(model.releases().is_empty());
    assert_eq!(model.stories_for_task(&task.id).len(), 1);
}
