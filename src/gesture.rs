use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Fraction of the row width a drag must cross to delete on release.
pub const SWIPE_DISTANCE_FRACTION: f32 = 0.25;
/// Release velocity (cells per second) that deletes regardless of distance.
pub const SWIPE_VELOCITY_THRESHOLD: f32 = 400.0;
/// Horizontal movement before a press turns into a drag instead of a click.
pub const DRAG_START_DISTANCE: f32 = 1.0;

/// Samples newer than this window feed the release velocity.
const VELOCITY_WINDOW: Duration = Duration::from_millis(120);
/// Minimum elapsed span before a velocity reading counts. The event listener
/// delivers mouse events in poll batches stamped at processing time, so
/// samples from one batch sit microseconds apart and would otherwise read a
/// slow drag as a fling.
const MIN_VELOCITY_SPAN: Duration = Duration::from_millis(20);
const MAX_SAMPLES: usize = 32;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum SwipePhase {
    #[default]
    Idle,
    Dragging,
    Deleting,
    SnappingBack,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SwipeOutcome {
    Delete,
    SnapBack,
}

/// Release rule: rightward distance past a quarter of the row, or a fast
/// rightward fling, deletes; anything else snaps back. Leftward values are
/// negative and can never pass either threshold.
pub fn classify_release(translation: f32, velocity: f32, row_width: f32) -> SwipeOutcome {
    if translation > row_width * SWIPE_DISTANCE_FRACTION || velocity > SWIPE_VELOCITY_THRESHOLD {
        SwipeOutcome::Delete
    } else {
        SwipeOutcome::SnapBack
    }
}

/// Folds raw pointer positions into the translation and velocity a release
/// decision needs. Positions are terminal columns, so velocity comes out in
/// cells per second.
#[derive(Debug, Clone)]
pub struct DragTracker {
    origin: f32,
    samples: VecDeque<(Instant, f32)>,
}

impl DragTracker {
    pub fn new(origin: f32, at: Instant) -> Self {
        let mut samples = VecDeque::with_capacity(MAX_SAMPLES);
        samples.push_back((at, origin));
        Self { origin, samples }
    }

    pub fn push(&mut self, position: f32, at: Instant) {
        if self.samples.len() == MAX_SAMPLES {
            self.samples.pop_front();
        }
        self.samples.push_back((at, position));
    }

    pub fn translation(&self) -> f32 {
        self.latest() - self.origin
    }

    /// Velocity over the trailing sample window. A single sample, or a span
    /// shorter than the trust floor, reads as zero and release classification
    /// falls back to distance alone.
    pub fn velocity(&self) -> f32 {
        let Some(&(newest_at, newest)) = self.samples.back() else {
            return 0.0;
        };
        let window_start = newest_at.checked_sub(VELOCITY_WINDOW);
        let (oldest_at, oldest) = self
            .samples
            .iter()
            .find(|(at, _)| window_start.is_none_or(|start| *at >= start))
            .copied()
            .unwrap_or((newest_at, newest));

        let span = newest_at.saturating_duration_since(oldest_at);
        if span < MIN_VELOCITY_SPAN {
            return 0.0;
        }
        (newest - oldest) / span.as_secs_f32()
    }

    fn latest(&self) -> f32 {
        self.samples
            .back()
            .map(|(_, position)| *position)
            .unwrap_or(self.origin)
    }
}

/// One in-flight pointer drag. At most one exists at a time; it pins the row
/// it started on, so the drag keeps feeding that row even when the pointer
/// strays off it.
#[derive(Debug, Clone)]
pub struct DragState {
    pub task_id: i64,
    pub tracker: DragTracker,
    pub dragging: bool,
}

impl DragState {
    pub fn new(task_id: i64, origin: f32, at: Instant) -> Self {
        Self {
            task_id,
            tracker: DragTracker::new(origin, at),
            dragging: false,
        }
    }
}
