use tuirealm::ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::app::{App, Focus, InteractionLayer, Message};
use crate::types::TaskRecord;

const HEADER_HEIGHT: u16 = 5;
const INPUT_HEIGHT: u16 = 3;
const ROW_HEIGHT: u16 = 2;

/// Stateless render pass: derives every visual property from the app state
/// and the current animation values, and rebuilds the mouse hit-test map.
pub fn render(frame: &mut Frame<'_>, app: &mut App) {
    app.interaction_map.clear();

    let area = frame.area();
    app.viewport = (area.width, area.height);
    frame.render_widget(
        Block::default().style(Style::default().bg(app.theme.base.canvas)),
        area,
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Min(0),
        ])
        .split(area);

    render_header(frame, chunks[0], app);
    render_input(frame, chunks[1], app);
    render_tasks(frame, chunks[2], app);

    if app.celebration_visible() {
        render_celebration(frame, app);
    }
    if app.show_help {
        render_help(frame, app);
    }
}

fn render_header(frame: &mut Frame<'_>, area: Rect, app: &mut App) {
    let theme = app.theme;
    // mount spring slides the header in; the theme toggle dips it briefly
    let pulse = app.header_pulse.value();
    let visible = pulse.clamp(0.0, 1.0);
    let slide = (2.0 * (1.0 - visible)).round() as u16;

    let block = Block::default()
        .borders(Borders::NONE)
        .style(Style::default().bg(theme.base.canvas));
    frame.render_widget(block, area);

    let inner = Rect {
        x: area.x + 2,
        y: area.y + slide.min(area.height.saturating_sub(1)),
        width: area.width.saturating_sub(4),
        height: area.height.saturating_sub(slide).max(1),
    };

    let mut lines = vec![Line::from(Span::styled(
        "My Tasks",
        Style::default()
            .fg(theme.fade(theme.header.title, visible))
            .add_modifier(Modifier::BOLD),
    ))];

    if inner.height > 1 && visible > 0.3 {
        lines.push(Line::from(Span::styled(
            format!(
                "{} of {} completed",
                app.completed_count(),
                app.tasks.len()
            ),
            Style::default().fg(theme.fade(theme.header.subtitle, visible)),
        )));
    }
    frame.render_widget(Paragraph::new(lines), inner);

    if inner.height > 3 {
        let bar_area = Rect {
            x: inner.x,
            y: inner.y + 3,
            width: inner.width,
            height: 1,
        };
        render_progress_bar(frame, bar_area, app);
    }

    // theme toggle glyph, top-right
    let glyph = if app.theme_mode.is_dark() {
        "🌙"
    } else {
        "☀"
    };
    let glyph_area = Rect {
        x: area.x + area.width.saturating_sub(5),
        y: area.y + slide.min(area.height.saturating_sub(1)),
        width: 4,
        height: 1,
    };
    frame.render_widget(
        Paragraph::new(glyph)
            .alignment(Alignment::Right)
            .style(Style::default().fg(theme.fade(theme.base.accent, visible))),
        glyph_area,
    );
    app.interaction_map
        .register_click(InteractionLayer::Base, glyph_area, Message::ToggleTheme);
}

fn render_progress_bar(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let theme = app.theme;
    let value = app.progress.value().clamp(0.0, 1.0);
    let filled = (value * area.width as f32).round() as u16;

    // the fill glows while the tween is still travelling
    let fill_color = if app.progress.is_finished() {
        theme.base.accent
    } else {
        brighten(theme.base.accent, 0.35)
    };

    let mut spans = Vec::with_capacity(2);
    if filled > 0 {
        spans.push(Span::styled(
            "━".repeat(filled as usize),
            Style::default().fg(fill_color),
        ));
    }
    if filled < area.width {
        spans.push(Span::styled(
            "━".repeat((area.width - filled) as usize),
            Style::default().fg(theme.header.progress_track),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_input(frame: &mut Frame<'_>, area: Rect, app: &mut App) {
    let theme = app.theme;
    let pulse = app.input_pulse.value();
    // still staggered off-screen during the mount sequence
    if pulse < 0.05 {
        return;
    }
    let visible = pulse.clamp(0.0, 1.0);
    let focused = app.focus == Focus::Entry;

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(7)])
        .split(area);

    let border_color = if focused || pulse > 1.01 {
        theme.interactive.focus
    } else {
        theme.base.border
    };
    let field = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.fade(border_color, visible)));
    let field_inner = field.inner(chunks[0]);
    frame.render_widget(field, chunks[0]);

    let content = if app.entry.is_empty() {
        Line::from(Span::styled(
            "Add a new task...",
            Style::default().fg(theme.fade(theme.interactive.placeholder, visible)),
        ))
    } else {
        let mut spans = vec![Span::styled(
            app.entry.clone(),
            Style::default().fg(theme.fade(theme.base.text, visible)),
        )];
        if focused {
            spans.push(Span::styled("█", Style::default().fg(theme.base.accent)));
        }
        Line::from(spans)
    };
    frame.render_widget(Paragraph::new(content), field_inner);
    app.interaction_map
        .register_click(InteractionLayer::Base, chunks[0], Message::FocusEntry);

    // the add button sinks while its press pulse is below rest
    let press = app.button_pulse.value();
    let button_style = if press < 0.99 {
        Style::default()
            .bg(theme.fade(theme.base.accent, 0.6))
            .fg(theme.interactive.button_fg)
    } else {
        Style::default()
            .bg(theme.fade(theme.base.accent, visible))
            .fg(theme.interactive.button_fg)
    };
    let button = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.fade(theme.base.accent, visible)))
        .style(button_style);
    let button_inner = button.inner(chunks[1]);
    frame.render_widget(button, chunks[1]);
    frame.render_widget(
        Paragraph::new("+").alignment(Alignment::Center),
        button_inner,
    );
    app.interaction_map
        .register_click(InteractionLayer::Base, chunks[1], Message::AddTask);
}

fn render_tasks(frame: &mut Frame<'_>, area: Rect, app: &mut App) {
    if area.height <= 1 {
        return;
    }
    let list_area = Rect {
        x: area.x + 2,
        y: area.y,
        width: area.width.saturating_sub(4),
        height: area.height.saturating_sub(1),
    };
    app.row_width = list_area.width;

    if app.tasks.is_empty() {
        render_empty_state(frame, list_area, app);
        render_footer(frame, area, app);
        return;
    }

    let reduced = app.reduced_motion();
    app.motion
        .ensure_rows(app.tasks.iter().map(|task| task.id), reduced);

    let visible_rows = (list_area.height / ROW_HEIGHT) as usize;
    let first = app
        .selected
        .saturating_sub(visible_rows.saturating_sub(1));
    let tasks: Vec<TaskRecord> = app.tasks.clone();
    for (index, task) in tasks.iter().enumerate().skip(first).take(visible_rows) {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + ((index - first) as u16) * ROW_HEIGHT,
            width: list_area.width,
            height: ROW_HEIGHT.min(list_area.height),
        };
        render_task_row(frame, row_area, app, task, index);
    }

    render_footer(frame, area, app);
}

fn render_task_row(
    frame: &mut Frame<'_>,
    area: Rect,
    app: &mut App,
    task: &TaskRecord,
    index: usize,
) {
    let theme = app.theme;
    let width = area.width as f32;
    let (scale, offset) = app
        .motion
        .get(task.id)
        .map(|row| (row.scale.value(), row.offset.value()))
        .unwrap_or((1.0, 0.0));

    // entrance: rows grow in from the left, faded
    let inset = (6.0 * (1.0 - scale.min(1.0))).round() as u16;
    let shift = offset.clamp(0.0, width).round() as u16;
    // title dissolves as the row approaches the delete threshold
    let swipe_fade = (1.0 - offset / (0.3 * width)).clamp(0.0, 1.0);
    let strength = scale.clamp(0.0, 1.0) * swipe_fade;

    let selected = app.focus == Focus::List && index == app.selected;
    let base_bg = if selected {
        theme.interactive.selected_bg
    } else {
        theme.base.surface
    };

    let checkbox = if task.completed { "✓" } else { "○" };
    let mut text_style = Style::default().fg(theme.fade(
        if task.completed {
            theme.task.completed_text
        } else {
            theme.base.text
        },
        strength,
    ));
    if task.completed {
        text_style = text_style.add_modifier(Modifier::CROSSED_OUT);
    }
    // completion pulse overshoot reads as emphasis
    let mut check_style = Style::default().fg(theme.fade(
        if task.completed {
            theme.base.accent
        } else {
            theme.base.text_muted
        },
        strength,
    ));
    if scale > 1.05 {
        check_style = check_style.add_modifier(Modifier::BOLD);
        text_style = text_style.add_modifier(Modifier::BOLD);
    }

    let mut spans = Vec::new();
    if shift > 0 {
        let hint = swipe_hint_strength(offset, width);
        if hint > 0.0 {
            spans.push(Span::styled(
                "delete →",
                Style::default().fg(theme.fade(theme.task.danger, hint)),
            ));
            spans.push(Span::raw(
                " ".repeat((shift as usize).saturating_sub(8).max(1)),
            ));
        } else {
            spans.push(Span::raw(" ".repeat(shift as usize)));
        }
    } else if inset > 0 {
        spans.push(Span::raw(" ".repeat(inset as usize)));
    }
    spans.push(Span::styled(format!("{checkbox} "), check_style));
    spans.push(Span::styled(task.text.clone(), text_style));

    let content = Rect {
        x: area.x,
        y: area.y,
        width: area.width,
        height: 1,
    };
    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(base_bg)),
        content,
    );

    app.interaction_map
        .register_row(InteractionLayer::Base, area, Message::ToggleTask(task.id));
}

fn render_empty_state(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let theme = app.theme;
    // joins the mount sequence alongside the input area
    let visible = app.input_pulse.value().clamp(0.0, 1.0);
    if visible < 0.05 || area.height < 2 {
        return;
    }
    let message = Paragraph::new("No tasks yet. Add one above")
        .alignment(Alignment::Center)
        .style(Style::default().fg(theme.fade(theme.base.text_muted, visible)));
    let centered = Rect {
        x: area.x,
        y: area.y + area.height / 3,
        width: area.width,
        height: 1,
    };
    frame.render_widget(message, centered);
}

fn render_footer(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let theme = app.theme;
    let footer_area = Rect {
        x: area.x,
        y: area.y + area.height - 1,
        width: area.width,
        height: 1,
    };
    let hints = match app.focus {
        Focus::Entry => " Enter: add  Tab: list  Ctrl+C: quit ",
        Focus::List => " Space: toggle  d: delete  t: theme  ?: help  q: quit ",
    };
    frame.render_widget(
        Paragraph::new(hints)
            .alignment(Alignment::Center)
            .style(Style::default().fg(theme.base.text_muted)),
        footer_area,
    );
}

fn render_celebration(frame: &mut Frame<'_>, app: &mut App) {
    let theme = app.theme;
    let value = app.celebration.value();
    // the overlay grows with the overshoot entrance and shrinks on fade-out
    let grow = value.clamp(0.0, 1.3);
    let width = (34.0 * grow).round().max(10.0) as u16;
    let height = 5u16;

    let area = frame.area();
    let overlay = Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: width.min(area.width),
        height: height.min(area.height),
    };

    frame.render_widget(Clear, overlay);
    let mut border_style = Style::default().fg(theme.base.accent);
    let mut text_style = Style::default().fg(theme.base.text);
    if value > 1.0 {
        border_style = border_style.add_modifier(Modifier::BOLD);
        text_style = text_style.add_modifier(Modifier::BOLD);
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(border_style)
        .style(Style::default().bg(theme.base.surface));
    let inner = block.inner(overlay);
    frame.render_widget(block, overlay);

    let lines = vec![
        Line::from(Span::styled("🎉  All tasks completed!", text_style)),
        Line::from(Span::styled(
            "Great job",
            Style::default().fg(theme.base.text_muted),
        )),
    ];
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        inner,
    );
}

fn render_help(frame: &mut Frame<'_>, app: &mut App) {
    let theme = app.theme;
    let area = centered_rect(60, 60, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .title(" Help ")
        .title_alignment(Alignment::Center)
        .style(Style::default().bg(theme.base.surface).fg(theme.base.text));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let text = [
        "Entry",
        "  type + Enter: add task",
        "  Tab / Esc: move to the list",
        "Task list",
        "  j/k or arrows: select task",
        "  Space or Enter: toggle complete",
        "  d or Delete: delete (swipes out)",
        "  drag a row right: delete",
        "  t: toggle light/dark theme",
        "General",
        "  ?: toggle help",
        "  q: quit",
    ]
    .join("\n");
    frame.render_widget(Paragraph::new(text), inner);

    app.interaction_map
        .register_click(InteractionLayer::Overlay, area, Message::ToggleHelp);
}

/// Scales the "delete →" affordance: fades in by a tenth of the row width,
/// out again by three tenths.
fn swipe_hint_strength(offset: f32, width: f32) -> f32 {
    if width <= 0.0 || offset <= 0.0 {
        return 0.0;
    }
    let fade_in = (offset / (0.1 * width)).clamp(0.0, 1.0);
    let fade_out = (1.0 - (offset - 0.1 * width) / (0.2 * width)).clamp(0.0, 1.0);
    fade_in * fade_out
}

fn brighten(color: Color, amount: f32) -> Color {
    let Color::Rgb(r, g, b) = color else {
        return color;
    };
    let k = amount.clamp(0.0, 1.0);
    let lift = |channel: u8| -> u8 {
        (channel as f32 + (255.0 - channel as f32) * k).round() as u8
    };
    Color::Rgb(lift(r), lift(g), lift(b))
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::App;
    use crate::settings::Settings;
    use crate::store::InitialState;
    use crate::theme::ThemeMode;
    use crate::types::{TaskIdGenerator, TaskRecord};
    use tuirealm::ratatui::{Terminal, backend::TestBackend};

    fn test_app(tasks: Vec<TaskRecord>) -> App {
        let settings = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
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
            &settings,
            ids,
            None,
        )
    }

    fn draw(app: &mut App) -> String {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).expect("test terminal");
        terminal
            .draw(|frame| render(frame, app))
            .expect("render should not fail");
        let buffer = terminal.backend().buffer().clone();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer.cell((x, y)).map(|cell| cell.symbol()).unwrap_or(" "));
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_render_shows_header_and_tasks() {
        let mut app = test_app(vec![
            TaskRecord::new(1, "Buy milk"),
            TaskRecord::new(2, "Walk the dog"),
        ]);
        let screen = draw(&mut app);
        assert!(screen.contains("My Tasks"));
        assert!(screen.contains("0 of 2 completed"));
        assert!(screen.contains("Buy milk"));
        assert!(screen.contains("Walk the dog"));
        assert!(screen.contains("Add a new task..."));
    }

    #[test]
    fn test_render_registers_hit_targets() {
        let mut app = test_app(vec![TaskRecord::new(1, "Buy milk")]);
        draw(&mut app);

        use crate::app::InteractionKind;
        let found_row = (0..24u16).any(|row| {
            matches!(
                app.interaction_map
                    .resolve_message(10, row, InteractionKind::Drag),
                Some(Message::ToggleTask(1))
            )
        });
        assert!(found_row, "task row should be draggable");

        let found_theme = (0..80u16).any(|col| {
            matches!(
                app.interaction_map
                    .resolve_message(col, 0, InteractionKind::LeftClick),
                Some(Message::ToggleTheme)
            )
        });
        assert!(found_theme, "theme glyph should be clickable");
    }

    #[test]
    fn test_render_empty_state() {
        let mut app = test_app(Vec::new());
        let screen = draw(&mut app);
        assert!(screen.contains("No tasks yet. Add one above"));
    }

    #[test]
    fn test_render_celebration_overlay() {
        let mut app = test_app(vec![TaskRecord::new(1, "one")]);
        app.toggle_complete(1);
        // reduced motion pins the celebration at its end value, so force a
        // visible one for the overlay path
        app.celebration = crate::anim::Timeline::new(1.0);
        let screen = draw(&mut app);
        assert!(screen.contains("All tasks completed!"));
        assert!(screen.contains("Great job"));
    }

    #[test]
    fn test_render_help_overlay() {
        let mut app = test_app(Vec::new());
        app.show_help = true;
        let screen = draw(&mut app);
        assert!(screen.contains("Help"));
        assert!(screen.contains("toggle complete"));
    }

    #[test]
    fn test_render_sets_row_width() {
        let mut app = test_app(vec![TaskRecord::new(1, "one")]);
        draw(&mut app);
        assert_eq!(app.row_width, 76);
    }

    #[test]
    fn test_swipe_hint_window() {
        assert_eq!(swipe_hint_strength(0.0, 80.0), 0.0);
        assert!(swipe_hint_strength(8.0, 80.0) > 0.99);
        assert!(swipe_hint_strength(16.0, 80.0) > 0.0);
        assert_eq!(swipe_hint_strength(24.0, 80.0), 0.0);
        assert_eq!(swipe_hint_strength(10.0, 0.0), 0.0);
    }

    #[test]
    fn test_centered_rect_is_centered() {
        let rect = centered_rect(50, 50, Rect::new(0, 0, 100, 40));
        assert_eq!(rect.width, 50);
        assert_eq!(rect.height, 20);
        assert_eq!(rect.x, 25);
        assert_eq!(rect.y, 10);
    }

    #[test]
    fn test_brighten_lifts_toward_white() {
        let Color::Rgb(r, g, b) = brighten(Color::Rgb(100, 100, 100), 0.5) else {
            panic!("brighten should stay rgb");
        };
        assert_eq!((r, g, b), (178, 178, 178));
        assert_eq!(brighten(Color::Reset, 0.5), Color::Reset);
    }
}
