//! Terminal UI rendering for the splash screen.
//!
//! Design philosophy:
//! - Minimal chrome: no box drawing, no ASCII borders, no decorative labels
//! - Whitespace as structure: position and spacing create hierarchy
//! - Grayscale plus status colors; the install dialog is the only overlay
//!
//! This module renders from RenderState (immutable snapshot) - it never
//! mutates application state.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph, Wrap},
    Frame,
};

use crate::render::{DialogView, RenderState};
use crate::tea::{Notification, NotificationLevel, Phase};
use crate::workflow::{Note, NoteLevel, Step, StepStatus, WorkflowResult};

const COLOR_TEXT_DIMMED: Color = Color::Gray;
const COLOR_TEXT_MUTED: Color = Color::DarkGray;
const COLOR_SEPARATOR: Color = Color::White;

// Step and note colors
const COLOR_DONE: Color = Color::Green;
const COLOR_RUNNING: Color = Color::Cyan;
const COLOR_WARNING: Color = Color::Yellow;
const COLOR_ERROR: Color = Color::Red;

/// Braille spinner for running steps, advanced by the render loop.
pub const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

const CONTENT_WIDTH: u16 = 72;
const DIALOG_WIDTH: u16 = 64;

/// A single keybinding entry for display.
struct Keybinding(&'static str, &'static str);

/// A group of related keybindings (separated by │).
struct KeybindingGroup(Vec<Keybinding>);

/// Keybindings for the current screen.
fn keybindings_for_state(state: &RenderState) -> Vec<KeybindingGroup> {
    if let Some(dialog) = &state.dialog {
        let mut extras = vec![Keybinding("c", "copy")];
        if dialog.has_homepage {
            extras.push(Keybinding("o", "website"));
        }
        return vec![
            KeybindingGroup(vec![Keybinding("Enter", "install"), Keybinding("Esc", "skip")]),
            KeybindingGroup(extras),
            KeybindingGroup(vec![Keybinding("q", "quit")]),
        ];
    }

    let mut run_group = Vec::new();
    if state.can_start {
        run_group.push(Keybinding("r", "run"));
    }
    if state.can_clear_cache {
        run_group.push(Keybinding("x", "clear cache"));
    }

    vec![
        KeybindingGroup(run_group),
        KeybindingGroup(vec![Keybinding("m", "mail support")]),
        KeybindingGroup(vec![Keybinding("q", "quit")]),
    ]
}

/// Main render function - entry point for all UI drawing.
/// Takes an immutable RenderState snapshot.
pub fn draw(frame: &mut Frame, state: &RenderState, spinner_frame: usize) {
    let area = frame.area();

    let chunks = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).split(area);
    render_body(frame, state, spinner_frame, content_area(chunks[0]));
    render_statusbar(frame, state, chunks[1]);

    if let Some(ref dialog) = state.dialog {
        render_dialog(frame, dialog, area);
    }

    if let Some(ref notification) = state.notification {
        render_notification(frame, notification, area);
    }
}

/// Horizontally centered column with a one-line top margin.
fn content_area(area: Rect) -> Rect {
    let width = CONTENT_WIDTH.min(area.width);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + area.height.min(1),
        width,
        height: area.height.saturating_sub(1),
    }
}

fn render_body(frame: &mut Frame, state: &RenderState, spinner_frame: usize, area: Rect) {
    let width = area.width as usize;
    let mut lines: Vec<Line> = Vec::with_capacity(state.steps.len() + 8);

    lines.push(Line::from(Span::styled(
        truncate(&state.app_name, width),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(Span::styled(
        "─".repeat(width.min(state.app_name.chars().count().max(24))),
        Style::default().fg(COLOR_SEPARATOR),
    )));
    lines.push(Line::default());

    for step in &state.steps {
        lines.push(render_step_row(step, spinner_frame, width));
    }
    lines.push(Line::default());

    match &state.note {
        Some(note) => lines.push(render_note(note)),
        None => lines.push(Line::from(Span::styled(
            phase_hint(state),
            Style::default().fg(COLOR_TEXT_DIMMED),
        ))),
    }
    lines.push(Line::default());
    lines.push(Line::from(vec![
        Span::styled("Support: ", Style::default().fg(COLOR_TEXT_MUTED)),
        Span::styled(state.contact.clone(), Style::default().fg(COLOR_TEXT_DIMMED)),
    ]));

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

/// One row of the step list: status icon, then the step text.
fn render_step_row(step: &Step, spinner_frame: usize, width: usize) -> Line<'static> {
    let (icon, color) = if step.is_awaiting_install() {
        WAITING_ICON
    } else {
        step_icon(step.status, spinner_frame)
    };
    let text_style = match step.status {
        StepStatus::Pending => Style::default().fg(COLOR_TEXT_MUTED),
        StepStatus::Running => Style::default(),
        StepStatus::Done => Style::default().fg(COLOR_TEXT_DIMMED),
        StepStatus::Warning => Style::default().fg(COLOR_WARNING),
        StepStatus::Error => Style::default().fg(COLOR_ERROR),
    };

    Line::from(vec![
        Span::styled(format!("{icon} "), Style::default().fg(color)),
        Span::styled(truncate(&step.display_text(), width.saturating_sub(2)), text_style),
    ])
}

/// Shown instead of the spinner while the install dialog waits for an answer.
const WAITING_ICON: (&str, Color) = ("◌", COLOR_WARNING);

fn step_icon(status: StepStatus, spinner_frame: usize) -> (&'static str, Color) {
    match status {
        StepStatus::Pending => ("○", COLOR_TEXT_MUTED),
        StepStatus::Running => (
            SPINNER_FRAMES[spinner_frame % SPINNER_FRAMES.len()],
            COLOR_RUNNING,
        ),
        StepStatus::Done => ("✓", COLOR_DONE),
        StepStatus::Warning => ("!", COLOR_WARNING),
        StepStatus::Error => ("✗", COLOR_ERROR),
    }
}

fn render_note(note: &Note) -> Line<'static> {
    let color = match note.level {
        NoteLevel::Progress => COLOR_RUNNING,
        NoteLevel::Success => COLOR_DONE,
        NoteLevel::Warning => COLOR_WARNING,
        NoteLevel::Error => COLOR_ERROR,
    };
    Line::from(Span::styled(note.message.clone(), Style::default().fg(color)))
}

/// Text under the steps when the workflow has not left a note.
fn phase_hint(state: &RenderState) -> &'static str {
    match state.phase {
        Phase::Idle => "Press r to check requirements and start the app.",
        Phase::Running => "Working...",
        Phase::Finished(WorkflowResult::Launched { .. }) => "App launched.",
        Phase::Finished(WorkflowResult::Aborted { .. }) | Phase::Failed => {
            "Setup did not finish. Press r to try again."
        }
    }
}

/// Render keybindings legend for the bottom line.
/// When show_keymap is false: Shows just "?" (grayed out)
/// When show_keymap is true: Shows "? │ <full keymap legend>" with bright "?"
/// The dialog keys are always shown while the dialog is open.
fn render_statusbar(frame: &mut Frame, state: &RenderState, area: Rect) {
    let key_style = Style::default().fg(COLOR_TEXT_DIMMED);
    let desc_style = Style::default().fg(COLOR_TEXT_MUTED);
    let sep_style = Style::default().fg(COLOR_TEXT_MUTED);

    let expanded = state.show_keymap || state.dialog.is_some();
    let help_style = if expanded {
        Style::default()
    } else {
        Style::default().fg(COLOR_TEXT_MUTED)
    };
    let mut spans: Vec<Span> = vec![Span::styled("?", help_style)];

    if expanded {
        for group in keybindings_for_state(state) {
            if group.0.is_empty() {
                continue;
            }
            spans.push(Span::styled(" │ ", sep_style));
            for (key_idx, keybinding) in group.0.iter().enumerate() {
                if key_idx > 0 {
                    spans.push(Span::styled(" • ", sep_style));
                }
                spans.push(Span::styled(keybinding.0, key_style));
                spans.push(Span::styled(format!(" {}", keybinding.1), desc_style));
            }
        }
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Centered install dialog over the step list.
fn render_dialog(frame: &mut Frame, dialog: &DialogView, area: Rect) {
    let width = DIALOG_WIDTH.min(area.width);
    let inner = width.saturating_sub(4) as usize;
    let lines = dialog_lines(dialog);
    let height = (wrapped_rows(&lines, inner) + 2).min(area.height);

    let dialog_area = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    };
    frame.render_widget(Clear, dialog_area);

    let text_area = Rect {
        x: dialog_area.x + 2.min(dialog_area.width),
        y: dialog_area.y + 1.min(dialog_area.height),
        width: dialog_area.width.saturating_sub(4),
        height: dialog_area.height.saturating_sub(2),
    };
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), text_area);
}

/// Rows `lines` take once wrapped to `width`. Word wrapping can break early,
/// so every wrapped line gets one spare row.
fn wrapped_rows(lines: &[Line], width: usize) -> u16 {
    let width = width.max(1);
    let rows: usize = lines
        .iter()
        .map(|line| match line.width() {
            w if w <= width => 1,
            w => w.div_ceil(width) + 1,
        })
        .sum();
    u16::try_from(rows).unwrap_or(u16::MAX)
}

fn dialog_lines(dialog: &DialogView) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            format!("{} is not installed", dialog.name),
            Style::default().fg(COLOR_WARNING).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(Span::styled(
            dialog.description.clone(),
            Style::default().fg(COLOR_TEXT_DIMMED),
        )),
        Line::default(),
        Line::from(Span::styled(
            "Install command:",
            Style::default().fg(COLOR_TEXT_MUTED),
        )),
        Line::from(Span::styled(
            dialog.command.clone(),
            Style::default().fg(Color::White),
        )),
        Line::default(),
    ];

    let mut hints = vec![
        Span::styled("Enter", Style::default().fg(COLOR_TEXT_DIMMED)),
        Span::styled(" install • ", Style::default().fg(COLOR_TEXT_MUTED)),
        Span::styled("c", Style::default().fg(COLOR_TEXT_DIMMED)),
        Span::styled(" copy", Style::default().fg(COLOR_TEXT_MUTED)),
    ];
    if dialog.has_homepage {
        hints.push(Span::styled(" • ", Style::default().fg(COLOR_TEXT_MUTED)));
        hints.push(Span::styled("o", Style::default().fg(COLOR_TEXT_DIMMED)));
        hints.push(Span::styled(" website", Style::default().fg(COLOR_TEXT_MUTED)));
    }
    hints.push(Span::styled(" • ", Style::default().fg(COLOR_TEXT_MUTED)));
    hints.push(Span::styled("Esc", Style::default().fg(COLOR_TEXT_DIMMED)));
    hints.push(Span::styled(" skip", Style::default().fg(COLOR_TEXT_MUTED)));
    lines.push(Line::from(hints));
    lines
}

fn render_notification(frame: &mut Frame, notification: &Notification, area: Rect) {
    let notification_area = Rect {
        x: area.x,
        y: area.y + area.height.saturating_sub(1),
        width: area.width,
        height: 1,
    };

    frame.render_widget(Clear, notification_area);

    let line = match notification.level {
        NotificationLevel::Error => Line::from(vec![
            Span::styled(
                "Error: ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                notification.message.clone(),
                Style::default().fg(Color::Red),
            ),
        ]),
        NotificationLevel::Info => Line::from(Span::styled(
            notification.message.clone(),
            Style::default().fg(Color::Green),
        )),
    };

    let paragraph = Paragraph::new(line);
    frame.render_widget(paragraph, notification_area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if max_len == 0 {
        return String::new();
    }
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 1).collect();
        format!("{}~", truncated)
    }
}
