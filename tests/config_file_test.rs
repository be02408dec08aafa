use boardkit::domain::kanban::ColumnPatch;
use boardkit::services::kanban_board::KanbanBoardModel;
use boardkit::services::Theme;
use boardkit::BoardConfig;
use tempfile::TempDir;

#[test]
fn test_config_file_drives_model_props() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("boards.toml");
    std::fs::write(
        &path,
        r#"
        max_columns = 4
        theme = "dark"

        [kanban]
        allow_add_card = false
        "#,
    )
    .unwrap();

    let config = BoardConfig::load_from(&path).unwrap();
    assert_eq!(config.theme, Theme::Dark);
    assert!(config.backlog.allow_drag_drop);

    let mut model = KanbanBoardModel::new(config.kanban_props());
    assert_eq!(model.columns().len(), 3);
    let first = model.columns()[0].id.clone();
    assert!(model.add_card(&first, Default::default()).is_none());

    assert!(model.add_column(ColumnPatch::titled("Review")).is_some());
    assert!(!model.can_add_column());
    assert!(model.add_column(ColumnPatch::titled("Archive")).is_none());
    assert_eq!(model.columns().len(), 4);
}

#[test]
fn test_saved_config_reloads() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("boards.toml");
    let config = BoardConfig {
        locale: "de".to_string(),
        ..BoardConfig::default()
    };

    config.save_to(&path).unwrap();
    assert_eq!(BoardConfig::load_from(&path).unwrap(), config);
}
