use chrono::Utc;
use serde::{Deserialize, Serialize};

pub const ONBOARDING_TEXTS: [&str; 3] = [
    "Welcome to your beautiful todo app! 🎉",
    "Try completing this task",
    "Swipe right to delete tasks",
];

/// One to-do item. Ids are epoch milliseconds at creation time and double as
/// the stable key for the animation registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: i64,
    pub text: String,
    pub completed: bool,
}

impl TaskRecord {
    pub fn new(id: i64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
        }
    }
}

/// Issues task ids from the wall clock, bumping past the last issued id so
/// two adds within the same millisecond never collide.
#[derive(Debug, Default)]
pub struct TaskIdGenerator {
    last: i64,
}

impl TaskIdGenerator {
    pub fn next_id(&mut self) -> i64 {
        let id = Utc::now().timestamp_millis().max(self.last + 1);
        self.last = id;
        id
    }

    pub fn observe(&mut self, id: i64) {
        self.last = self.last.max(id);
    }
}

pub fn onboarding_tasks(ids: &mut TaskIdGenerator) -> Vec<TaskRecord> {
    ONBOARDING_TEXTS
        .iter()
        .map(|text| TaskRecord::new(ids.next_id(), *text))
        .collect()
}

pub fn completed_count(tasks: &[TaskRecord]) -> usize {
    tasks.iter().filter(|task| task.completed).count()
}

/// Completed fraction in `[0, 1]`; an empty list counts as zero progress.
pub fn completion_ratio(tasks: &[TaskRecord]) -> f32 {
    if tasks.is_empty() {
        return 0.0;
    }
    completed_count(tasks) as f32 / tasks.len() as f32
}

pub fn all_completed(tasks: &[TaskRecord]) -> bool {
    !tasks.is_empty() && tasks.iter().all(|task| task.completed)
}
