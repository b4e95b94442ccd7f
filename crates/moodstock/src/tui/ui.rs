use super::input::PromptInput;
use crate::render::Scene;
use crate::trend::{Direction, TrendReport};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Block, Borders, Clear, Paragraph,
        canvas::{Canvas, Line as CanvasLine},
    },
};
use std::time::Duration;

/// Everything needed to paint one overlay frame
pub struct OverlayView<'a> {
    pub scene: &'a Scene,
    /// Overlay size in terminal cells (width, height), title row included
    pub size: (u16, u16),
    pub report: Option<&'a TrendReport>,
    pub status: &'a str,
    /// Time until the next prompt; `None` while prompting
    pub next_tick: Option<Duration>,
    pub samples: u64,
}

pub fn render(frame: &mut Frame, view: &OverlayView) {
    let chunks = Layout::vertical([
        Constraint::Min(1),    // Free space above the overlay
        Constraint::Length(1), // Footer
    ])
    .split(frame.area());

    render_overlay(frame, view, overlay_area(chunks[0], view.size));
    render_footer(frame, view, chunks[1]);
}

/// Overlay with the modal prompt on top
pub fn render_prompt(frame: &mut Frame, view: &OverlayView, input: &PromptInput) {
    render(frame, view);

    let area = centered(frame.area(), 36, 7);
    frame.render_widget(Clear, area);

    let request = input.request();
    let block = Block::default()
        .title(format!(" {} ", request.title()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let mut lines = vec![
        Line::from(request.question()),
        Line::from(vec![
            Span::raw("> "),
            Span::styled(
                input.text().to_string(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("_", Style::default().fg(Color::DarkGray)),
        ]),
    ];
    match input.error() {
        Some(err) => lines.push(Line::from(Span::styled(
            err.to_string(),
            Style::default().fg(Color::Red),
        ))),
        None => lines.push(Line::from("")),
    }
    lines.push(Line::from(vec![
        Span::styled(" Enter ", Style::default().bg(Color::DarkGray)),
        Span::raw(" ok "),
        Span::styled(" Esc ", Style::default().bg(Color::DarkGray)),
        Span::raw(" cancel "),
        Span::styled(" ↑/↓ ", Style::default().bg(Color::DarkGray)),
    ]));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Bottom-left corner of `area`, clamped to fit
fn overlay_area(area: Rect, (width, height): (u16, u16)) -> Rect {
    let width = width.min(area.width.saturating_sub(1));
    let height = height.min(area.height);
    Rect::new(
        area.x + 1u16.min(area.width),
        area.bottom().saturating_sub(height),
        width,
        height,
    )
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn render_overlay(frame: &mut Frame, view: &OverlayView, area: Rect) {
    if area.width == 0 || area.height < 2 {
        return;
    }
    let scene = view.scene;

    frame.render_widget(Clear, area);
    frame.render_widget(Block::default().style(Style::default().bg(scene.background)), area);

    let chunks = Layout::vertical([Constraint::Length(1), Constraint::Min(1)]).split(area);

    let title = Paragraph::new(scene.title)
        .alignment(Alignment::Center)
        .style(Style::default().fg(scene.title_color).bg(scene.background));
    frame.render_widget(title, chunks[0]);

    // Scene y grows downward; the canvas widget's y grows upward
    let plot_height = scene.canvas.plot_height();
    let canvas = Canvas::default()
        .background_color(scene.background)
        .marker(Marker::Braille)
        .x_bounds([0.0, scene.canvas.width])
        .y_bounds([0.0, plot_height])
        .paint(|ctx| {
            for &y in &scene.gridlines {
                let y = plot_height - y;
                ctx.draw(&CanvasLine::new(
                    0.0,
                    y,
                    scene.canvas.width,
                    y,
                    scene.grid_color,
                ));
            }
            ctx.layer();
            for path in &scene.paths {
                for ((x1, y1), (x2, y2)) in path.segments() {
                    ctx.draw(&CanvasLine::new(
                        x1,
                        plot_height - y1,
                        x2,
                        plot_height - y2,
                        path.color,
                    ));
                }
            }
        });
    frame.render_widget(canvas, chunks[1]);
}

fn render_footer(frame: &mut Frame, view: &OverlayView, area: Rect) {
    let mut spans = vec![
        Span::styled(
            "moodstock",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
    ];

    match view.next_tick {
        Some(remaining) => spans.push(Span::styled(
            format!(" next {} ", format_countdown(remaining)),
            Style::default().bg(Color::Green).fg(Color::Black),
        )),
        None => spans.push(Span::styled(
            " PROMPTING ",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        )),
    }
    spans.push(Span::raw(format!(" {} samples │ ", view.samples)));

    if let Some(report) = view.report {
        if report.crash {
            spans.push(Span::styled(
                " CRASH ",
                Style::default()
                    .bg(Color::Red)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::raw(" "));
        }
        spans.extend(trend_spans(report));
        spans.push(Span::raw("│ "));
    }

    if !view.status.is_empty() {
        spans.push(Span::styled(
            format!("{} ", view.status),
            Style::default().fg(Color::DarkGray),
        ));
    }

    spans.push(Span::styled(" s ", Style::default().bg(Color::DarkGray)));
    spans.push(Span::raw(" sample now "));
    spans.push(Span::styled(" q ", Style::default().bg(Color::DarkGray)));
    spans.push(Span::raw(" quit "));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Compact `↑Hap 60.0%` entries colored by direction
fn trend_spans(report: &TrendReport) -> Vec<Span<'static>> {
    report
        .changes
        .iter()
        .map(|(dim, change)| {
            let direction = Direction::of(change);
            let color = match direction {
                Direction::Up => Color::Green,
                Direction::Down if change < 0.0 => Color::Red,
                Direction::Down => Color::DarkGray,
            };
            let short: String = dim.label().chars().take(3).collect();
            Span::styled(
                format!("{}{} {:.1}% ", direction.arrow(), short, change.abs()),
                Style::default().fg(color),
            )
        })
        .collect()
}

/// Whole minutes (rounded up) while a minute or more is left, then seconds
pub fn format_countdown(remaining: Duration) -> String {
    let secs = remaining.as_secs();
    if secs >= 60 {
        format!("{}m", secs.div_ceil(60))
    } else {
        format!("{}s", secs)
    }
}
