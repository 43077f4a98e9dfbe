pub mod input;
pub mod interaction;
mod update;

use crossterm::event::{KeyEvent, MouseEvent};
use tracing::debug;

use crate::anim::{
    CELEBRATION_DWELL, CELEBRATION_IN, CELEBRATION_OUT, COMPLETE_PULSE, COMPLETE_PULSE_SCALE,
    COMPLETE_SETTLE, Curve, DELETE_SWEEP_FACTOR, FOCUS_SPRING, MOUNT_SPRING, MOUNT_STAGGER,
    MotionRegistry, PRESS_DIP, PRESS_RECOVER, PROGRESS_TWEEN, SWIPE_DELETE_SWEEP, THEME_DIP,
    Timeline, UNCOMPLETE_SETTLE,
};
use crate::gesture::{DragState, SwipePhase};
use crate::settings::Settings;
use crate::store::{InitialState, StoreWriter};
use crate::theme::{Theme, ThemeMode};
use crate::types::{TaskIdGenerator, TaskRecord, all_completed, completed_count, completion_ratio};

pub use interaction::{InteractionKind, InteractionLayer, InteractionMap, InteractionNode};

/// Events and user intents flowing through the update loop. Raw key/mouse
/// events arrive from the realm layer; the input handlers translate them into
/// the semantic variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    Tick,
    AddTask,
    ToggleTask(i64),
    /// Start the swipe-out exit animation; the row is removed once it has
    /// swept off-screen.
    SwipeDelete(i64),
    SelectRow(usize),
    ToggleTheme,
    FocusEntry,
    ToggleHelp,
    Quit,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum Focus {
    #[default]
    Entry,
    List,
}

/// Resolves the theme to start with. An explicit flag (CLI, then environment)
/// overrides everything for the session; otherwise the saved toggle wins over
/// the host signal, which only seeds the very first launch.
pub fn initial_theme_mode(
    cli: Option<ThemeMode>,
    env: Option<ThemeMode>,
    saved: Option<bool>,
    host: Option<ThemeMode>,
) -> ThemeMode {
    cli.or(env)
        .or(saved.map(ThemeMode::from_dark_flag))
        .or(host)
        .unwrap_or_default()
}

pub struct App {
    pub tasks: Vec<TaskRecord>,
    pub entry: String,
    pub theme_mode: ThemeMode,
    pub theme: Theme,
    pub focus: Focus,
    pub selected: usize,
    pub motion: MotionRegistry,
    pub drag: Option<DragState>,
    pub interaction_map: InteractionMap,
    pub viewport: (u16, u16),
    /// Width of the task rows as last laid out; swipe thresholds and the
    /// sweep-out distance scale with it.
    pub row_width: u16,
    /// Header mount spring, dipped by the theme toggle.
    pub header_pulse: Timeline,
    /// Input area: staggered mount spring, add-press dip, focus emphasis.
    pub input_pulse: Timeline,
    pub button_pulse: Timeline,
    pub progress: Timeline,
    pub celebration: Timeline,
    pub celebration_cycles: u64,
    pub show_help: bool,
    reduced_motion: bool,
    was_all_completed: bool,
    ids: TaskIdGenerator,
    writer: Option<StoreWriter>,
    should_quit: bool,
}

impl App {
    pub fn new(
        initial: InitialState,
        theme_mode: ThemeMode,
        settings: &Settings,
        ids: TaskIdGenerator,
        writer: Option<StoreWriter>,
    ) -> Self {
        let reduced_motion = settings.reduced_motion;
        let mut header_pulse = Timeline::new(0.0).then(1.0, MOUNT_SPRING, Curve::Spring(1.5));
        let mut input_pulse = Timeline::new(0.0)
            .then(0.0, MOUNT_STAGGER, Curve::Linear)
            .then(1.0, MOUNT_SPRING, Curve::Spring(1.5));
        let ratio = completion_ratio(&initial.tasks);
        let mut progress = Timeline::new(0.0).then(ratio, PROGRESS_TWEEN, Curve::EaseOutCubic);
        if reduced_motion {
            header_pulse.finish_now();
            input_pulse.finish_now();
            progress.finish_now();
        }

        let mut motion = MotionRegistry::default();
        motion.ensure_rows(initial.tasks.iter().map(|task| task.id), reduced_motion);

        // A freshly seeded onboarding list exists only in memory; persist it
        // so the next launch sees the same ids. Startups that read a saved
        // list write nothing. The theme flag is never written here: a CLI or
        // env override stays session-only until the user toggles.
        if initial.seeded && let Some(writer) = &writer {
            writer.enqueue_tasks(&initial.tasks);
        }

        Self {
            was_all_completed: all_completed(&initial.tasks),
            tasks: initial.tasks,
            entry: String::new(),
            theme_mode,
            theme: Theme::from_mode(theme_mode),
            focus: Focus::Entry,
            selected: 0,
            motion,
            drag: None,
            interaction_map: InteractionMap::default(),
            viewport: (80, 24),
            row_width: 76,
            header_pulse,
            input_pulse,
            button_pulse: Timeline::new(1.0),
            progress,
            celebration: Timeline::new(0.0),
            celebration_cycles: 0,
            show_help: false,
            reduced_motion,
            ids,
            writer,
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    /// Hands the persistence writer back to the caller for a drained shutdown.
    pub fn take_writer(&mut self) -> Option<StoreWriter> {
        self.writer.take()
    }

    pub fn task(&self, id: i64) -> Option<&TaskRecord> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn selected_task_id(&self) -> Option<i64> {
        self.tasks.get(self.selected).map(|task| task.id)
    }

    pub fn completed_count(&self) -> usize {
        completed_count(&self.tasks)
    }

    pub fn completion_ratio(&self) -> f32 {
        completion_ratio(&self.tasks)
    }

    pub fn celebration_visible(&self) -> bool {
        self.celebration.value() > 0.01
    }

    /// Appends the entry buffer as a new task. Whitespace-only input is a
    /// no-op and keeps the buffer as typed.
    pub fn add_task(&mut self) {
        let text = self.entry.trim();
        if text.is_empty() {
            return;
        }

        let id = self.ids.next_id();
        debug!("adding task {id}");
        self.tasks.push(TaskRecord::new(id, text));
        self.entry.clear();
        self.motion
            .ensure_rows(std::iter::once(id), self.reduced_motion);
        self.press_pulse();
        self.on_tasks_changed();
    }

    pub fn toggle_complete(&mut self, id: i64) {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            return;
        };
        task.completed = !task.completed;
        let completed = task.completed;

        if let Some(row) = self.motion.get_mut(id) {
            let from = row.scale.value();
            row.scale = if completed {
                Timeline::new(from)
                    .then(COMPLETE_PULSE_SCALE, COMPLETE_PULSE, Curve::BackOut(2.0))
                    .then(1.0, COMPLETE_SETTLE, Curve::Spring(1.5))
            } else {
                Timeline::new(from).then(1.0, UNCOMPLETE_SETTLE, Curve::Spring(1.5))
            };
            if self.reduced_motion {
                row.scale.finish_now();
            }
        }

        self.on_tasks_changed();
    }

    /// Kicks off the sweep-out exit for a row. The task itself is removed on
    /// the first tick after the sweep finishes; a row with no handles yet is
    /// removed immediately.
    pub fn begin_delete(&mut self, id: i64) {
        if !self.tasks.iter().any(|task| task.id == id) {
            return;
        }
        let sweep_to = self.row_width as f32 * DELETE_SWEEP_FACTOR;
        let reduced = self.reduced_motion;
        match self.motion.get_mut(id) {
            Some(row) => {
                row.phase = SwipePhase::Deleting;
                let from = row.offset.value();
                row.offset =
                    Timeline::new(from).then(sweep_to, SWIPE_DELETE_SWEEP, Curve::EaseOutCubic);
                if reduced {
                    row.offset.finish_now();
                }
            }
            None => self.delete_task(id),
        }
    }

    /// Removes the task and its animation handles. A no-op for unknown ids.
    pub fn delete_task(&mut self, id: i64) {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        self.motion.remove(id);
        if self.tasks.len() == before {
            return;
        }
        debug!("deleted task {id}");
        self.selected = self.selected.min(self.tasks.len().saturating_sub(1));
        self.on_tasks_changed();
    }

    pub fn toggle_theme(&mut self) {
        self.theme_mode = self.theme_mode.toggled();
        self.theme = Theme::from_mode(self.theme_mode);
        if let Some(writer) = &self.writer {
            writer.enqueue_theme(self.theme_mode.is_dark());
        }

        if !self.reduced_motion {
            let from = self.header_pulse.value();
            self.header_pulse = Timeline::new(from)
                .then(0.9, THEME_DIP, Curve::EaseOutCubic)
                .then(1.0, THEME_DIP, Curve::EaseOutCubic);
        }
    }

    pub fn focus_entry(&mut self) {
        if self.focus == Focus::Entry {
            return;
        }
        self.focus = Focus::Entry;
        if !self.reduced_motion {
            let from = self.input_pulse.value();
            self.input_pulse = Timeline::new(from).then(1.02, FOCUS_SPRING, Curve::Spring(1.5));
        }
    }

    pub fn focus_list(&mut self) {
        if self.focus == Focus::List {
            return;
        }
        self.focus = Focus::List;
        if !self.reduced_motion {
            let from = self.input_pulse.value();
            self.input_pulse = Timeline::new(from).then(1.0, FOCUS_SPRING, Curve::Spring(1.5));
        }
    }

    pub fn select_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_down(&mut self) {
        if !self.tasks.is_empty() {
            self.selected = (self.selected + 1).min(self.tasks.len() - 1);
        }
    }

    /// Per-frame housekeeping: finalize sweeps whose exit animation has
    /// ended, settle snap-backs, and keep the handle registry congruent with
    /// the task list.
    pub fn tick(&mut self) {
        let finished_deletes: Vec<i64> = self
            .motion
            .iter_mut()
            .filter(|(_, row)| row.phase == SwipePhase::Deleting && row.offset.is_finished())
            .map(|(id, _)| id)
            .collect();
        for id in finished_deletes {
            self.delete_task(id);
        }

        for (_, row) in self.motion.iter_mut() {
            if row.phase == SwipePhase::SnappingBack && row.offset.is_finished() {
                row.phase = SwipePhase::Idle;
            }
        }

        self.motion
            .ensure_rows(self.tasks.iter().map(|task| task.id), self.reduced_motion);
        let live: Vec<i64> = self.tasks.iter().map(|task| task.id).collect();
        self.motion.retain_live(|id| live.contains(&id));
    }

    fn press_pulse(&mut self) {
        if self.reduced_motion {
            return;
        }
        self.button_pulse = Timeline::new(self.button_pulse.value())
            .then(0.85, PRESS_DIP, Curve::EaseOutCubic)
            .then(1.0, PRESS_RECOVER, Curve::Spring(1.5));
        self.input_pulse = Timeline::new(self.input_pulse.value())
            .then(0.95, PRESS_DIP, Curve::EaseOutCubic)
            .then(1.0, PRESS_RECOVER, Curve::Spring(1.5));
    }

    /// Runs after every task-list mutation: write-through the full snapshot,
    /// retarget the progress tween, and re-check the celebration condition.
    fn on_tasks_changed(&mut self) {
        if let Some(writer) = &self.writer {
            writer.enqueue_tasks(&self.tasks);
        }

        let ratio = self.completion_ratio();
        self.progress =
            Timeline::new(self.progress.value()).then(ratio, PROGRESS_TWEEN, Curve::EaseOutCubic);
        if self.reduced_motion {
            self.progress.finish_now();
        }

        let all = all_completed(&self.tasks);
        if all && !self.was_all_completed {
            self.start_celebration();
        }
        self.was_all_completed = all;
    }

    fn start_celebration(&mut self) {
        self.celebration_cycles += 1;
        debug!("celebration cycle {}", self.celebration_cycles);
        // Replacing the timeline restarts a cycle that is still dwelling
        // instead of stacking a second one.
        self.celebration = Timeline::new(0.0)
            .then(1.0, CELEBRATION_IN, Curve::BackOut(2.0))
            .hold(CELEBRATION_DWELL)
            .then(0.0, CELEBRATION_OUT, Curve::EaseInCubic);
        if self.reduced_motion {
            self.celebration.finish_now();
        }
    }
}
