use std::time::Instant;

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

use crate::anim::{Curve, SNAP_BACK, Timeline};
use crate::app::{App, InteractionKind, Message};
use crate::gesture::{self, DragState, SwipeOutcome, SwipePhase};

impl App {
    pub(crate) fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.mouse_down(mouse.column, mouse.row),
            MouseEventKind::Drag(MouseButton::Left) => self.mouse_drag(mouse.column),
            MouseEventKind::Up(MouseButton::Left) => self.mouse_up(),
            MouseEventKind::ScrollUp => self.mouse_scroll(mouse.column, mouse.row, -1),
            MouseEventKind::ScrollDown => self.mouse_scroll(mouse.column, mouse.row, 1),
            _ => {}
        }
    }

    fn mouse_down(&mut self, col: u16, row: u16) {
        let Some(node) = self
            .interaction_map
            .resolve_node(col, row, InteractionKind::LeftClick)
        else {
            return;
        };

        // A press on a task row might become a drag; hold the click until
        // release decides. Everything else fires immediately.
        if node.draggable {
            if let Message::ToggleTask(id) = node.message {
                self.drag = Some(DragState::new(id, col as f32, Instant::now()));
                return;
            }
        }
        let message = node.message.clone();
        self.update(message);
    }

    fn mouse_drag(&mut self, col: u16) {
        let Some(drag) = &mut self.drag else {
            return;
        };
        drag.tracker.push(col as f32, Instant::now());
        let translation = drag.tracker.translation();

        if !drag.dragging && translation.abs() >= gesture::DRAG_START_DISTANCE {
            drag.dragging = true;
        }
        if !drag.dragging {
            return;
        }

        let id = drag.task_id;
        if let Some(row) = self.motion.get_mut(id) {
            row.phase = SwipePhase::Dragging;
            // live 1:1 tracking; leftward drags pin the offset at rest
            row.offset = Timeline::new(translation.max(0.0));
        }
    }

    fn mouse_up(&mut self) {
        let Some(drag) = self.drag.take() else {
            return;
        };

        if !drag.dragging {
            // a press-and-release without movement is a plain click
            self.update(Message::ToggleTask(drag.task_id));
            return;
        }

        let translation = drag.tracker.translation();
        let velocity = drag.tracker.velocity();
        match gesture::classify_release(translation, velocity, self.row_width as f32) {
            SwipeOutcome::Delete => self.update(Message::SwipeDelete(drag.task_id)),
            SwipeOutcome::SnapBack => {
                let reduced = self.reduced_motion();
                if let Some(row) = self.motion.get_mut(drag.task_id) {
                    row.phase = SwipePhase::SnappingBack;
                    let from = row.offset.value();
                    row.offset = Timeline::new(from).then(0.0, SNAP_BACK, Curve::Spring(1.5));
                    if reduced {
                        row.offset.finish_now();
                    }
                }
            }
        }
    }

    fn mouse_scroll(&mut self, col: u16, row: u16, delta: i32) {
        let over_list = self
            .interaction_map
            .resolve_node(col, row, InteractionKind::Scroll)
            .is_some();
        if !over_list {
            return;
        }
        self.focus_list();
        if delta > 0 {
            self.select_down();
        } else {
            self.select_up();
        }
    }
}
