use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Gauge, Paragraph, Widget},
};

use crate::catalog::{DifficultyPreset, PRESETS};
use crate::game::{Phase, SessionView, MAX_ANSWER_DIGITS};
use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;

fn preset_color(preset: &DifficultyPreset) -> Color {
    // presentation metadata is opaque to the core; the mapping lives here
    match preset.color {
        "green" => Color::Green,
        "cyan" => Color::Cyan,
        "yellow" => Color::Yellow,
        "red" => Color::Red,
        "magenta" => Color::Magenta,
        _ => Color::White,
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let view = self.session.snapshot();
        match view.phase {
            Phase::Start => render_start(&view, area, buf),
            Phase::Ready => render_ready(&view, area, buf),
            Phase::Flashing => render_flashing(&view, area, buf),
            Phase::Answering => render_answering(&view, area, buf),
            Phase::Result => render_result(self, &view, area, buf),
        }
    }
}

/// Vertically center `lines` inside `area` and render them.
fn render_centered(lines: Vec<Line>, area: Rect, buf: &mut Buffer) {
    let height = lines.len() as u16;
    let top = area.height.saturating_sub(height) / 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(top),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(chunks[1], buf);
}

fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn ledger_line(view: &SessionView) -> Line<'static> {
    Line::from(Span::styled(
        format!("score {}   streak {}", view.score, view.streak),
        dim(),
    ))
}

fn render_start(view: &SessionView, area: Rect, buf: &mut Buffer) {
    let mut lines = vec![
        Line::from(Span::styled("s u m f l a s h", bold())),
        Line::from(Span::styled("add the numbers before they fade", dim())),
        Line::from(""),
    ];

    for (index, preset) in PRESETS.iter().enumerate() {
        let selected = index == view.preset_index;
        let marker = if selected { "▸ " } else { "  " };
        let style = if selected {
            Style::default().fg(preset_color(preset)).patch(bold())
        } else {
            dim()
        };
        lines.push(Line::from(Span::styled(
            format!(
                "{}{} {:<8} {}",
                marker, preset.icon, preset.name, preset.tagline
            ),
            style,
        )));
    }

    lines.push(Line::from(""));
    if view.score > 0 || view.streak > 0 {
        lines.push(ledger_line(view));
    }
    lines.push(Line::from(Span::styled(
        "↑/↓ select   enter play   esc quit",
        dim(),
    )));

    render_centered(lines, area, buf);
}

fn render_ready(view: &SessionView, area: Rect, buf: &mut Buffer) {
    let preset = view.preset;
    let lines = vec![
        Line::from(Span::styled(
            format!("{} {}", preset.icon, preset.name),
            Style::default().fg(preset_color(preset)).patch(bold()),
        )),
        Line::from(""),
        Line::from(format!(
            "{} numbers will flash, one every {} ms",
            preset.count, preset.interval_ms
        )),
        Line::from("keep the running sum in your head"),
        Line::from(""),
        Line::from(Span::styled("press space to begin", dim())),
    ];
    render_centered(lines, area, buf);
}

fn render_flashing(view: &SessionView, area: Rect, buf: &mut Buffer) {
    let color = preset_color(view.preset);

    let value_text = match view.flash_value {
        Some(value) => value.to_string(),
        None => String::new(),
    };

    let top = area.height.saturating_sub(5) / 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN * 2)
        .constraints([
            Constraint::Length(top),
            Constraint::Length(1), // the flashed value
            Constraint::Length(2),
            Constraint::Length(1), // progress gauge
            Constraint::Min(0),
        ])
        .split(area);

    Paragraph::new(Span::styled(
        value_text,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    Gauge::default()
        .ratio(view.progress.clamp(0.0, 1.0))
        .gauge_style(Style::default().fg(color).bg(Color::DarkGray))
        .label("")
        .render(chunks[3], buf);
}

fn render_answering(view: &SessionView, area: Rect, buf: &mut Buffer) {
    let entry = if view.pending_input.len() < MAX_ANSWER_DIGITS {
        format!("{}_", view.pending_input)
    } else {
        view.pending_input.clone()
    };

    let submit_hint = if view.pending_input.is_empty() {
        Span::styled("type the sum to answer", dim())
    } else {
        Span::styled("enter submit   backspace clear", dim())
    };

    let lines = vec![
        Line::from("what was the sum?"),
        Line::from(""),
        Line::from(Span::styled(entry, bold())),
        Line::from(""),
        Line::from(submit_hint),
    ];
    render_centered(lines, area, buf);
}

fn render_result(app: &App, view: &SessionView, area: Rect, buf: &mut Buffer) {
    let (headline, headline_style) = match view.last_correct {
        Some(true) => ("correct!", Style::default().fg(Color::Green).patch(bold())),
        _ => ("wrong", Style::default().fg(Color::Red).patch(bold())),
    };

    let mut lines = vec![
        Line::from(Span::styled(headline, headline_style)),
        Line::from(Span::styled(
            view.praise.unwrap_or_default().to_string(),
            Style::default().add_modifier(Modifier::ITALIC),
        )),
        Line::from(""),
    ];

    if let Some(round) = app.session.round() {
        let breakdown = round.values().iter().map(u32::to_string).join(" + ");
        lines.push(Line::from(format!("{} = {}", breakdown, round.sum())));
    }
    if view.last_correct == Some(false) {
        if let Some(answer) = view.last_answer {
            lines.push(Line::from(Span::styled(
                format!("you said {}", answer),
                dim(),
            )));
        }
    }

    lines.push(Line::from(""));
    lines.push(ledger_line(view));
    lines.push(Line::from(Span::styled(
        "r play again   esc home",
        dim(),
    )));

    render_centered(lines, area, buf);
}
