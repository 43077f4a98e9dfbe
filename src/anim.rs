use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::gesture::SwipePhase;

pub const MOUNT_SPRING: Duration = Duration::from_millis(600);
pub const MOUNT_STAGGER: Duration = Duration::from_millis(200);
pub const ENTRANCE_SPRING: Duration = Duration::from_millis(450);
pub const COMPLETE_PULSE: Duration = Duration::from_millis(200);
pub const COMPLETE_SETTLE: Duration = Duration::from_millis(450);
pub const UNCOMPLETE_SETTLE: Duration = Duration::from_millis(500);
pub const PROGRESS_TWEEN: Duration = Duration::from_millis(800);
pub const CELEBRATION_IN: Duration = Duration::from_millis(300);
pub const CELEBRATION_DWELL: Duration = Duration::from_millis(2_500);
pub const CELEBRATION_OUT: Duration = Duration::from_millis(200);
pub const SWIPE_DELETE_SWEEP: Duration = Duration::from_millis(350);
pub const SNAP_BACK: Duration = Duration::from_millis(500);
pub const THEME_DIP: Duration = Duration::from_millis(150);
pub const PRESS_DIP: Duration = Duration::from_millis(100);
pub const PRESS_RECOVER: Duration = Duration::from_millis(400);
pub const FOCUS_SPRING: Duration = Duration::from_millis(350);

/// How far a completing task overshoots before settling back to rest.
pub const COMPLETE_PULSE_SCALE: f32 = 1.15;
/// Deleted rows sweep out to 1.2x the row width.
pub const DELETE_SWEEP_FACTOR: f32 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Curve {
    Linear,
    EaseOutCubic,
    EaseInCubic,
    /// Overshoots the target and comes back; the parameter sets how far.
    BackOut(f32),
    /// Damped oscillation around the target; the parameter sets how many
    /// half-swings fit in the segment.
    Spring(f32),
}

fn sample(curve: Curve, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    match curve {
        Curve::Linear => t,
        Curve::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
        Curve::EaseInCubic => t.powi(3),
        Curve::BackOut(overshoot) => {
            let u = t - 1.0;
            1.0 + (overshoot + 1.0) * u.powi(3) + overshoot * u.powi(2)
        }
        Curve::Spring(bounce) => {
            1.0 - (-6.0 * t).exp() * (bounce * std::f32::consts::PI * t).cos()
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    target: f32,
    duration: Duration,
    curve: Curve,
}

/// A declarative scalar animation: a start value plus a chain of eased
/// segments, sampled against the wall clock. Values outside the chain are
/// clamped to the endpoints, so a finished timeline always reads its exact
/// end value.
#[derive(Debug, Clone)]
pub struct Timeline {
    start_value: f32,
    segments: Vec<Segment>,
    started_at: Instant,
    force_finished: bool,
}

impl Timeline {
    pub fn new(start_value: f32) -> Self {
        Self {
            start_value,
            segments: Vec::new(),
            started_at: Instant::now(),
            force_finished: false,
        }
    }

    pub fn then(mut self, target: f32, duration: Duration, curve: Curve) -> Self {
        self.segments.push(Segment {
            target,
            duration,
            curve,
        });
        self
    }

    pub fn hold(self, duration: Duration) -> Self {
        let value = self.end_value();
        self.then(value, duration, Curve::Linear)
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    pub fn end_value(&self) -> f32 {
        self.segments
            .last()
            .map(|segment| segment.target)
            .unwrap_or(self.start_value)
    }

    pub fn total_duration(&self) -> Duration {
        self.segments
            .iter()
            .map(|segment| segment.duration)
            .sum()
    }

    pub fn value(&self) -> f32 {
        self.value_at(Instant::now())
    }

    pub fn value_at(&self, now: Instant) -> f32 {
        if self.force_finished {
            return self.end_value();
        }

        let mut elapsed = now.saturating_duration_since(self.started_at);
        let mut from = self.start_value;
        for segment in &self.segments {
            if elapsed >= segment.duration {
                elapsed -= segment.duration;
                from = segment.target;
                continue;
            }
            let t = elapsed.as_secs_f32() / segment.duration.as_secs_f32();
            return from + (segment.target - from) * sample(segment.curve, t);
        }
        from
    }

    pub fn is_finished(&self) -> bool {
        self.is_finished_at(Instant::now())
    }

    pub fn is_finished_at(&self, now: Instant) -> bool {
        self.force_finished
            || now.saturating_duration_since(self.started_at) >= self.total_duration()
    }

    /// Restarts the chain from its start value. Used to coalesce a retrigger
    /// into the running animation instead of stacking a second one.
    pub fn restart(&mut self) {
        self.started_at = Instant::now();
        self.force_finished = false;
    }

    /// Pins the timeline at its end value immediately.
    pub fn finish_now(&mut self) {
        self.force_finished = true;
    }
}

/// The two animated scalars attached to a live task row, plus the swipe
/// phase that drives them. Created lazily on first render, removed when the
/// row's task is deleted.
#[derive(Debug, Clone)]
pub struct RowMotion {
    pub scale: Timeline,
    pub offset: Timeline,
    pub phase: SwipePhase,
}

impl RowMotion {
    fn entering(reduced_motion: bool) -> Self {
        let mut scale = Timeline::new(0.0).then(1.0, ENTRANCE_SPRING, Curve::Spring(1.5));
        if reduced_motion {
            scale.finish_now();
        }
        Self {
            scale,
            offset: Timeline::new(0.0),
            phase: SwipePhase::Idle,
        }
    }
}

/// Explicit map from task id to its motion handles. Every rendered row has
/// exactly one entry; pruning against the live id set keeps deleted rows
/// from leaking handles.
#[derive(Debug, Default)]
pub struct MotionRegistry {
    rows: HashMap<i64, RowMotion>,
}

impl MotionRegistry {
    pub fn ensure_rows(&mut self, ids: impl Iterator<Item = i64>, reduced_motion: bool) {
        for id in ids {
            self.rows
                .entry(id)
                .or_insert_with(|| RowMotion::entering(reduced_motion));
        }
    }

    pub fn get(&self, id: i64) -> Option<&RowMotion> {
        self.rows.get(&id)
    }

    pub fn get_mut(&mut self, id: i64) -> Option<&mut RowMotion> {
        self.rows.get_mut(&id)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.rows.contains_key(&id)
    }

    pub fn remove(&mut self, id: i64) {
        self.rows.remove(&id);
    }

    pub fn retain_live(&mut self, is_live: impl Fn(i64) -> bool) {
        self.rows.retain(|id, _| is_live(*id));
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (i64, &mut RowMotion)> {
        self.rows.iter_mut().map(|(id, row)| (*id, row))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
