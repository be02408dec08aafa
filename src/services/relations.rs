//! Parent/child cleanup when a container goes away.
//!
//! | relation                      | policy                        |
//! |-------------------------------|-------------------------------|
//! | column -> card                | delete                        |
//! | epic -> story                 | unassign `epic_id`            |
//! | release -> story, sprint      | unassign `release_id`         |
//! | sprint -> story               | unassign `sprint_id`          |
//! | persona -> activity -> task -> story | delete                 |
//! | map release -> story          | none                          |
//!
//! Every function takes the current board and returns the board with all of
//! its collections updated together, or `None` when the id is unknown. Board
//! timestamps are left to the caller.

use crate::domain::backlog::{BacklogBoard, StoryLane};
use crate::domain::common::{EntityId, Timestamped};
use crate::domain::kanban::Column;
use crate::domain::story_map::StoryMapBoard;
use crate::services::ordering;
use std::collections::HashSet;

/// Drop a column and every card inside it.
pub fn remove_column(columns: &[Column], column_id: &str) -> Option<Vec<Column>> {
    if !columns.iter().any(|c| c.id == column_id) {
        return None;
    }
    let remaining: Vec<Column> = columns.iter().filter(|c| c.id != column_id).cloned().collect();
    Some(ordering::reindex(&remaining))
}

pub fn remove_card(columns: &[Column], card_id: &str) -> Option<Vec<Column>> {
    let owner = columns.iter().position(|c| c.card(card_id).is_some())?;
    let mut columns = columns.to_vec();
    columns[owner] = columns[owner].without_card(card_id);
    Some(columns)
}

pub fn remove_epic(board: &BacklogBoard, epic_id: &str) -> Option<BacklogBoard> {
    board.epic(epic_id)?;
    let mut next = board.clone();
    next.epics.retain(|e| e.id != epic_id);
    next.epics = ordering::reindex(&next.epics);
    for story in next.user_stories.iter_mut() {
        if story.epic_id.as_deref() == Some(epic_id) {
            story.epic_id = None;
            story.touch();
        }
    }
    Some(next)
}

/// Stories and sprints of the release survive without it. Stories join the
/// Unscheduled lane and sprints the "no release" lane, after the items
/// already there.
pub fn remove_release(board: &BacklogBoard, release_id: &str) -> Option<BacklogBoard> {
    board.release(release_id)?;
    let mut next = board.clone();
    next.releases.retain(|r| r.id != release_id);
    next.releases = ordering::reindex(&next.releases);

    let mut moved_stories: HashSet<EntityId> = HashSet::new();
    for story in next.user_stories.iter_mut() {
        if story.release_id.as_deref() == Some(release_id) {
            story.release_id = None;
            story.touch();
            moved_stories.insert(story.id.clone());
        }
    }
    ordering::append_to_lane(
        &mut next.user_stories,
        |s| s.lane() == StoryLane::Unscheduled,
        |s| moved_stories.contains(&s.id),
    );

    let mut moved_sprints: HashSet<EntityId> = HashSet::new();
    for sprint in next.sprints.iter_mut() {
        if sprint.release_id.as_deref() == Some(release_id) {
            sprint.release_id = None;
            sprint.touch();
            moved_sprints.insert(sprint.id.clone());
        }
    }
    ordering::append_to_lane(
        &mut next.sprints,
        |s| s.release_id.is_none(),
        |s| moved_sprints.contains(&s.id),
    );
    Some(next)
}

pub fn remove_sprint(board: &BacklogBoard, sprint_id: &str) -> Option<BacklogBoard> {
    board.sprint(sprint_id)?;
    let mut next = board.clone();
    next.sprints.retain(|s| s.id != sprint_id);
    ordering::reindex_lanes(&mut next.sprints, |s| s.release_id.clone());
    for story in next.user_stories.iter_mut() {
        if story.sprint_id.as_deref() == Some(sprint_id) {
            story.sprint_id = None;
            story.touch();
        }
    }
    Some(next)
}

pub fn remove_story(board: &BacklogBoard, story_id: &str) -> Option<BacklogBoard> {
    board.story(story_id)?;
    let mut next = board.clone();
    next.user_stories.retain(|s| s.id != story_id);
    ordering::reindex_lanes(&mut next.user_stories, |s| s.lane());
    Some(next)
}

/// Removes the persona, its activities, their tasks and the tasks' stories.
pub fn remove_persona(board: &StoryMapBoard, persona_id: &str) -> Option<StoryMapBoard> {
    board.persona(persona_id)?;
    let activity_ids: HashSet<EntityId> = board
        .activities
        .iter()
        .filter(|a| a.persona_id == persona_id)
        .map(|a| a.id.clone())
        .collect();
    let mut next = prune_activities(board, &activity_ids);
    next.personas.retain(|p| p.id != persona_id);
    Some(next)
}

pub fn remove_activity(board: &StoryMapBoard, activity_id: &str) -> Option<StoryMapBoard> {
    board.activity(activity_id)?;
    let activity_ids = HashSet::from([activity_id.to_string()]);
    Some(prune_activities(board, &activity_ids))
}

pub fn remove_task(board: &StoryMapBoard, task_id: &str) -> Option<StoryMapBoard> {
    board.task(task_id)?;
    let task_ids = HashSet::from([task_id.to_string()]);
    Some(prune_tasks(board.clone(), &task_ids))
}

pub fn remove_map_story(board: &StoryMapBoard, story_id: &str) -> Option<StoryMapBoard> {
    board.story(story_id)?;
    let story_ids = HashSet::from([story_id.to_string()]);
    Some(prune_stories(board.clone(), &story_ids))
}

/// Releases only list story ids, so their stories stay where they are.
pub fn remove_map_release(board: &StoryMapBoard, release_id: &str) -> Option<StoryMapBoard> {
    board.release(release_id)?;
    let mut next = board.clone();
    next.releases.retain(|r| r.id != release_id);
    next.releases = ordering::reindex(&next.releases);
    Some(next)
}

fn prune_activities(board: &StoryMapBoard, activity_ids: &HashSet<EntityId>) -> StoryMapBoard {
    let mut next = board.clone();
    let task_ids: HashSet<EntityId> = next
        .tasks
        .iter()
        .filter(|t| activity_ids.contains(&t.activity_id))
        .map(|t| t.id.clone())
        .collect();
    next.activities.retain(|a| !activity_ids.contains(&a.id));
    ordering::reindex_lanes(&mut next.activities, |a| a.persona_id.clone());
    prune_tasks(next, &task_ids)
}

fn prune_tasks(mut board: StoryMapBoard, task_ids: &HashSet<EntityId>) -> StoryMapBoard {
    let story_ids: HashSet<EntityId> = board
        .user_stories
        .iter()
        .filter(|s| task_ids.contains(&s.task_id))
        .map(|s| s.id.clone())
        .collect();
    board.tasks.retain(|t| !task_ids.contains(&t.id));
    ordering::reindex_lanes(&mut board.tasks, |t| t.activity_id.clone());
    prune_stories(board, &story_ids)
}

fn prune_stories(mut board: StoryMapBoard, story_ids: &HashSet<EntityId>) -> StoryMapBoard {
    board.user_stories.retain(|s| !story_ids.contains(&s.id));
    ordering::reindex_lanes(&mut board.user_stories, |s| s.task_id.clone());
    for release in board.releases.iter_mut() {
        let before = release.user_story_ids.len();
        release.user_story_ids.retain(|id| !story_ids.contains(id));
        if release.user_story_ids.len() != before {
            release.touch();
        }
    }
    board
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::backlog::{
        BacklogBoardPatch, Epic, EpicPatch, Release, ReleasePatch, Sprint, SprintPatch, UserStory,
        UserStoryPatch,
    };
    use crate::domain::kanban::{Card, CardPatch, ColumnPatch};
    use crate::domain::story_map::{
        Activity, ActivityPatch, MapRelease, MapReleasePatch, MapStory, MapStoryPatch, MapTask,
        MapTaskPatch, Persona, PersonaPatch, StoryMapBoardPatch,
    };

    fn story(id: &str, release: Option<&str>, order: usize) -> UserStory {
        UserStory::create(UserStoryPatch {
            id: Some(id.to_string()),
            release_id: Some(release.map(str::to_string)),
            order: Some(order),
            ..UserStoryPatch::default()
        })
    }

    fn backlog() -> BacklogBoard {
        BacklogBoard::create(BacklogBoardPatch {
            epics: Some(vec![Epic::create(EpicPatch {
                id: Some("e1".to_string()),
                ..EpicPatch::default()
            })]),
            releases: Some(vec![
                Release::create(ReleasePatch {
                    id: Some("r1".to_string()),
                    order: Some(0),
                    ..ReleasePatch::default()
                }),
                Release::create(ReleasePatch {
                    id: Some("r2".to_string()),
                    order: Some(1),
                    ..ReleasePatch::default()
                }),
            ]),
            sprints: Some(vec![
                Sprint::create(SprintPatch {
                    id: Some("s1".to_string()),
                    release_id: Some(Some("r1".to_string())),
                    ..SprintPatch::default()
                }),
                Sprint::create(SprintPatch {
                    id: Some("s0".to_string()),
                    ..SprintPatch::default()
                }),
            ]),
            user_stories: Some(vec![
                story("u1", None, 0),
                story("a", Some("r1"), 0),
                story("b", Some("r1"), 1),
                story("c", Some("r2"), 0),
            ]),
            ..BacklogBoardPatch::default()
        })
    }

    fn unscheduled(board: &BacklogBoard) -> Vec<(String, usize)> {
        ordering::sorted_lane(&board.user_stories, |s| s.release_id.is_none())
            .into_iter()
            .map(|s| (s.id, s.order))
            .collect()
    }

    #[test]
    fn test_remove_column_drops_its_cards() {
        let todo = Column::create(ColumnPatch::titled("Todo"))
            .with_card(Card::create(CardPatch::titled("A")));
        let done = Column::create(ColumnPatch {
            order: Some(1),
            ..ColumnPatch::titled("Done")
        });
        let todo_id = todo.id.clone();

        let columns = remove_column(&[todo, done], &todo_id).unwrap();
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].title, "Done");
        assert_eq!(columns[0].order, 0);
        assert!(columns.iter().all(|c| c.cards.is_empty()));
    }

    #[test]
    fn test_remove_unknown_column() {
        let columns = vec![Column::create(ColumnPatch::default())];
        assert!(remove_column(&columns, "nope").is_none());
        assert!(remove_card(&columns, "nope").is_none());
    }

    #[test]
    fn test_remove_epic_unassigns_stories() {
        let mut board = backlog();
        board.user_stories[1].epic_id = Some("e1".to_string());

        let next = remove_epic(&board, "e1").unwrap();
        assert!(next.epics.is_empty());
        assert_eq!(next.user_stories.len(), 4);
        assert!(next.user_stories.iter().all(|s| s.epic_id.is_none()));
    }

    #[test]
    fn test_remove_release_moves_stories_to_unscheduled_end() {
        let board = backlog();
        let next = remove_release(&board, "r1").unwrap();

        assert_eq!(next.releases.len(), 1);
        assert_eq!(next.releases[0].order, 0);
        assert_eq!(
            unscheduled(&next),
            vec![
                ("u1".to_string(), 0),
                ("a".to_string(), 1),
                ("b".to_string(), 2)
            ]
        );
        assert!(next.sprints.iter().all(|s| s.release_id.is_none()));
        let sprint_orders: Vec<(String, usize)> =
            ordering::sorted_lane(&next.sprints, |s| s.release_id.is_none())
                .into_iter()
                .map(|s| (s.id, s.order))
                .collect();
        assert_eq!(
            sprint_orders,
            vec![("s0".to_string(), 0), ("s1".to_string(), 1)]
        );
    }

    #[test]
    fn test_remove_sprint_unassigns_stories() {
        let mut board = backlog();
        board.user_stories[2].sprint_id = Some("s1".to_string());
        let next = remove_sprint(&board, "s1").unwrap();
        assert_eq!(next.sprints.len(), 1);
        assert!(next.user_stories.iter().all(|s| s.sprint_id.is_none()));
    }

    #[test]
    fn test_remove_story_reindexes_its_lane() {
        let next = remove_story(&backlog(), "a").unwrap();
        let lane = ordering::sorted_lane(&next.user_stories, |s| {
            s.release_id.as_deref() == Some("r1")
        });
        assert_eq!(lane.len(), 1);
        assert_eq!(lane[0].id, "b");
        assert_eq!(lane[0].order, 0);
    }

    fn story_map() -> StoryMapBoard {
        let persona = Persona::create(PersonaPatch {
            id: Some("p1".to_string()),
            ..PersonaPatch::default()
        });
        let other = Persona::create(PersonaPatch {
            id: Some("p2".to_string()),
            ..PersonaPatch::default()
        });
        let activity = |id: &str, persona: &str, order: usize| {
            Activity::create(
                persona,
                ActivityPatch {
                    id: Some(id.to_string()),
                    order: Some(order),
                    ..ActivityPatch::default()
                },
            )
        };
        let task = |id: &str, activity: &str| {
            MapTask::create(
                activity,
                MapTaskPatch {
                    id: Some(id.to_string()),
                    ..MapTaskPatch::default()
                },
            )
        };
        let map_story = |id: &str, task: &str| {
            MapStory::create(
                task,
                MapStoryPatch {
                    id: Some(id.to_string()),
                    ..MapStoryPatch::default()
                },
            )
        };
        StoryMapBoard::create(StoryMapBoardPatch {
            personas: Some(vec![persona, other]),
            activities: Some(vec![
                activity("a1", "p1", 0),
                activity("a2", "p1", 1),
                activity("a3", "p2", 0),
            ]),
            tasks: Some(vec![task("t1", "a1"), task("t2", "a2"), task("t3", "a3")]),
            user_stories: Some(vec![
                map_story("s1", "t1"),
                map_story("s2", "t2"),
                map_story("s3", "t3"),
            ]),
            releases: Some(vec![MapRelease::create(MapReleasePatch {
                id: Some("mvp".to_string()),
                user_story_ids: Some(vec!["s1".to_string(), "s3".to_string()]),
                ..MapReleasePatch::default()
            })]),
            ..StoryMapBoardPatch::default()
        })
    }

    #[test]
    fn test_remove_persona_cascades_all_levels() {
        let next = remove_persona(&story_map(), "p1").unwrap();
        assert_eq!(next.personas.len(), 1);
        let activities: Vec<&str> = next.activities.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(activities, vec!["a3"]);
        let tasks: Vec<&str> = next.tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(tasks, vec!["t3"]);
        let stories: Vec<&str> = next.user_stories.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(stories, vec!["s3"]);
        assert_eq!(next.releases[0].user_story_ids, vec!["s3".to_string()]);
    }

    #[test]
    fn test_remove_activity_reindexes_persona_lane() {
        let next = remove_activity(&story_map(), "a1").unwrap();
        let a2 = next.activity("a2").unwrap();
        assert_eq!(a2.order, 0);
        assert!(next.task("t1").is_none());
        assert!(next.story("s1").is_none());
        assert!(next.story("s2").is_some());
    }

    #[test]
    fn test_remove_task_and_story() {
        let next = remove_task(&story_map(), "t3").unwrap();
        assert!(next.story("s3").is_none());
        assert_eq!(next.releases[0].user_story_ids, vec!["s1".to_string()]);

        let next = remove_map_story(&next, "s1").unwrap();
        assert!(next.releases[0].user_story_ids.is_empty());
    }

    #[test]
    fn test_remove_map_release_keeps_stories() {
        let next = remove_map_release(&story_map(), "mvp").unwrap();
        assert!(next.releases.is_empty());
        assert_eq!(next.user_stories.len(), 3);
        assert!(remove_map_release(&next, "mvp").is_none());
    }
}
