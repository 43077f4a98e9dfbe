use std::path::Path;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use tempfile::TempDir;
use tuirealm::ratatui::layout::Rect;

use taskpulse::app::{App, Focus, InteractionLayer, Message, initial_theme_mode};
use taskpulse::settings::Settings;
use taskpulse::store::{InitialState, StoreWriter, TASKS_KEY, THEME_KEY, TaskStore};
use taskpulse::theme::ThemeMode;
use taskpulse::types::{ONBOARDING_TEXTS, TaskIdGenerator, TaskRecord};

fn reduced_settings() -> Settings {
    Settings {
        reduced_motion: true,
        ..Settings::default()
    }
}

/// Builds an app backed by an on-disk store, the way main wires it up.
fn app_with_store(path: &Path) -> Result<App> {
    let store = TaskStore::open(path)?;
    let mut ids = TaskIdGenerator::default();
    let initial = store.load_initial(&mut ids);
    let theme_mode = initial_theme_mode(None, None, initial.dark_mode, None);
    let writer = StoreWriter::spawn(store);
    Ok(App::new(
        initial,
        theme_mode,
        &reduced_settings(),
        ids,
        Some(writer),
    ))
}

fn offline_app(tasks: Vec<TaskRecord>) -> App {
    let mut ids = TaskIdGenerator::default();
    for task in &tasks {
        ids.observe(task.id);
    }
    App::new(
        InitialState {
            tasks,
            dark_mode: None,
            seeded: false,
        },
        ThemeMode::Dark,
        &reduced_settings(),
        ids,
        None,
    )
}

async fn drain(app: &mut App) {
    if let Some(writer) = app.take_writer() {
        writer.shutdown().await;
    }
}

fn press(app: &mut App, code: KeyCode) {
    app.update(Message::Key(KeyEvent::new(code, KeyModifiers::empty())));
}

fn type_and_add(app: &mut App, text: &str) {
    for ch in text.chars() {
        press(app, KeyCode::Char(ch));
    }
    press(app, KeyCode::Enter);
}

fn mouse(app: &mut App, kind: MouseEventKind, column: u16, row: u16) {
    app.update(Message::Mouse(MouseEvent {
        kind,
        column,
        row,
        modifiers: KeyModifiers::empty(),
    }));
}

/// Registers one hit-test row per task, standing in for a render pass.
fn lay_out_rows(app: &mut App) {
    app.row_width = 80;
    app.interaction_map.clear();
    let ids: Vec<i64> = app.tasks.iter().map(|task| task.id).collect();
    for (index, id) in ids.iter().enumerate() {
        app.interaction_map.register_row(
            InteractionLayer::Base,
            Rect::new(0, 8 + 2 * index as u16, 80, 2),
            Message::ToggleTask(*id),
        );
    }
}

fn stored_tasks(path: &Path) -> Result<Vec<TaskRecord>> {
    let store = TaskStore::open(path)?;
    let raw = store.get(TASKS_KEY)?.unwrap_or_else(|| "[]".to_string());
    Ok(serde_json::from_str(&raw)?)
}

#[tokio::test]
async fn test_first_launch_seeds_onboarding_tasks() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("taskpulse.sqlite");

    let mut app = app_with_store(&path)?;
    assert_eq!(app.tasks.len(), 3);
    for (task, text) in app.tasks.iter().zip(ONBOARDING_TEXTS) {
        assert_eq!(task.text, text);
        assert!(!task.completed);
    }
    assert_eq!(app.theme_mode, ThemeMode::Dark);
    let first_launch = app.tasks.clone();
    drain(&mut app).await;

    // the seed is durable: a second launch sees the same records
    let app = app_with_store(&path)?;
    assert_eq!(app.tasks, first_launch);
    Ok(())
}

#[tokio::test]
async fn test_startup_from_saved_state_writes_nothing() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("taskpulse.sqlite");

    // a loaded (not seeded) list gets no write-through at startup
    let writer = StoreWriter::spawn(TaskStore::open(&path)?);
    let mut ids = TaskIdGenerator::default();
    ids.observe(1);
    let mut app = App::new(
        InitialState {
            tasks: vec![TaskRecord::new(1, "carried over")],
            dark_mode: None,
            seeded: false,
        },
        ThemeMode::Dark,
        &reduced_settings(),
        ids,
        Some(writer),
    );
    drain(&mut app).await;

    let store = TaskStore::open(&path)?;
    assert_eq!(store.get(TASKS_KEY)?, None);
    Ok(())
}

#[tokio::test]
async fn test_add_toggle_delete_round_trip_through_restart() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("taskpulse.sqlite");

    let mut app = app_with_store(&path)?;
    type_and_add(&mut app, "Buy milk");
    type_and_add(&mut app, "Walk the dog");
    assert_eq!(app.tasks.len(), 5);

    // complete one, swipe away the onboarding rows
    let milk_id = app.tasks[3].id;
    app.update(Message::ToggleTask(milk_id));
    for task in app.tasks[..3].to_vec() {
        app.update(Message::SwipeDelete(task.id));
    }
    app.update(Message::Tick);
    assert_eq!(app.tasks.len(), 2);
    app.update(Message::ToggleTheme);
    let expected = app.tasks.clone();
    let expected_mode = app.theme_mode;
    drain(&mut app).await;

    // simulated restart reproduces the exact list and theme flag
    let mut app = app_with_store(&path)?;
    assert_eq!(app.tasks, expected);
    assert_eq!(app.theme_mode, expected_mode);
    assert!(app.tasks.iter().any(|task| task.completed));
    drain(&mut app).await;
    Ok(())
}

#[tokio::test]
async fn test_persisted_snapshot_matches_after_double_toggle() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("taskpulse.sqlite");

    let mut app = app_with_store(&path)?;
    let id = app.tasks[0].id;
    let before = app.tasks.clone();
    app.update(Message::ToggleTask(id));
    app.update(Message::ToggleTask(id));
    assert_eq!(app.tasks, before);
    drain(&mut app).await;

    assert_eq!(stored_tasks(&path)?, before);
    Ok(())
}

#[tokio::test]
async fn test_blank_add_never_reaches_the_store() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("taskpulse.sqlite");

    let mut app = app_with_store(&path)?;
    type_and_add(&mut app, "   ");
    assert_eq!(app.tasks.len(), 3);
    drain(&mut app).await;

    assert_eq!(stored_tasks(&path)?.len(), 3);
    Ok(())
}

#[test]
fn test_swipe_classification_through_mouse_events() {
    // past a quarter of the 80-cell row: delete
    let mut app = offline_app(vec![TaskRecord::new(1, "one")]);
    lay_out_rows(&mut app);
    mouse(&mut app, MouseEventKind::Down(MouseButton::Left), 4, 8);
    for col in [12, 20, 28] {
        mouse(&mut app, MouseEventKind::Drag(MouseButton::Left), col, 8);
    }
    mouse(&mut app, MouseEventKind::Up(MouseButton::Left), 28, 8);
    app.update(Message::Tick);
    assert!(app.tasks.is_empty());

    // a tenth of the row: snap back, task survives
    let mut app = offline_app(vec![TaskRecord::new(1, "one")]);
    lay_out_rows(&mut app);
    mouse(&mut app, MouseEventKind::Down(MouseButton::Left), 4, 8);
    mouse(&mut app, MouseEventKind::Drag(MouseButton::Left), 12, 8);
    mouse(&mut app, MouseEventKind::Up(MouseButton::Left), 12, 8);
    app.update(Message::Tick);
    assert_eq!(app.tasks.len(), 1);
    assert!(!app.tasks[0].completed);
}

#[test]
fn test_velocity_alone_deletes_without_distance() {
    use std::time::{Duration, Instant};
    use taskpulse::gesture::DragState;

    let mut app = offline_app(vec![TaskRecord::new(1, "one")]);
    lay_out_rows(&mut app);

    // a fast fling: barely any distance, but over 400 cells/sec at release
    let start = Instant::now() - Duration::from_millis(40);
    let mut drag = DragState::new(1, 10.0, start);
    drag.dragging = true;
    drag.tracker.push(15.0, start + Duration::from_millis(10));
    drag.tracker.push(28.0, start + Duration::from_millis(40));
    app.drag = Some(drag);

    mouse(&mut app, MouseEventKind::Up(MouseButton::Left), 28, 8);
    app.update(Message::Tick);
    assert!(app.tasks.is_empty());
}

#[test]
fn test_celebration_retriggers_after_uncomplete() {
    let mut app = offline_app(vec![TaskRecord::new(1, "one"), TaskRecord::new(2, "two")]);

    app.update(Message::ToggleTask(1));
    app.update(Message::ToggleTask(2));
    assert_eq!(app.celebration_cycles, 1);

    app.update(Message::ToggleTask(2));
    app.update(Message::ToggleTask(2));
    assert_eq!(app.celebration_cycles, 2);
}

#[tokio::test]
async fn test_saved_theme_overrides_host_preference() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("taskpulse.sqlite");

    {
        let store = TaskStore::open(&path)?;
        store.set(THEME_KEY, "false")?;
    }

    let store = TaskStore::open(&path)?;
    let mut ids = TaskIdGenerator::default();
    let initial = store.load_initial(&mut ids);
    // a dark host terminal loses to the saved light preference
    let mode = initial_theme_mode(None, None, initial.dark_mode, Some(ThemeMode::Dark));
    assert_eq!(mode, ThemeMode::Light);

    // an explicit CLI flag still wins for the session
    let mode = initial_theme_mode(
        Some(ThemeMode::Dark),
        None,
        initial.dark_mode,
        Some(ThemeMode::Dark),
    );
    assert_eq!(mode, ThemeMode::Dark);
    Ok(())
}

#[tokio::test]
async fn test_toggle_theme_persists_flag() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("taskpulse.sqlite");

    let mut app = app_with_store(&path)?;
    assert_eq!(app.theme_mode, ThemeMode::Dark);
    press(&mut app, KeyCode::Tab);
    press(&mut app, KeyCode::Char('t'));
    assert_eq!(app.theme_mode, ThemeMode::Light);
    drain(&mut app).await;

    let store = TaskStore::open(&path)?;
    assert_eq!(store.get(THEME_KEY)?.as_deref(), Some("false"));
    drop(store);

    let app = app_with_store(&path)?;
    assert_eq!(app.theme_mode, ThemeMode::Light);
    Ok(())
}

#[tokio::test]
async fn test_keyboard_only_session() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("taskpulse.sqlite");

    let mut app = app_with_store(&path)?;
    assert_eq!(app.focus, Focus::Entry);
    type_and_add(&mut app, "Ship it");

    // down to the list, select the new row, complete it, delete another
    press(&mut app, KeyCode::Tab);
    for _ in 0..4 {
        press(&mut app, KeyCode::Char('j'));
    }
    assert_eq!(app.selected, 3);
    press(&mut app, KeyCode::Char(' '));
    assert!(app.tasks[3].completed);

    press(&mut app, KeyCode::Char('k'));
    press(&mut app, KeyCode::Char('d'));
    app.update(Message::Tick);
    assert_eq!(app.tasks.len(), 3);
    drain(&mut app).await;

    assert_eq!(stored_tasks(&path)?.len(), 3);
    Ok(())
}
