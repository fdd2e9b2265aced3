use crate::tui::widgets::{BlockWithLegend, CountdownRing, TextPanel};
use crate::tui::{BreakScreen, DisplayData, ScheduleRow};
use tui::widgets::BorderType;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets, Frame,
};
use unicode_segmentation::UnicodeSegmentation;

fn split_initial(str: &str) -> (&str, &str) {
    let mut graphemes = str.graphemes(true);

    let initial = graphemes.next().unwrap_or("");
    let remainder = graphemes.as_str();

    (initial, remainder)
}

fn initials_style() -> Style {
    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
}

fn text_style() -> Style {
    Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD)
}

/// A key binding hint; unavailable ones are dimmed.
fn legend_entry(label: &str, available: bool) -> Spans<'_> {
    let (initial, remainder) = split_initial(label);

    if available {
        Spans::from(vec![
            Span::styled(initial, initials_style()),
            Span::styled(remainder, text_style()),
        ])
    } else {
        Spans::from(Span::styled(label, Style::default().fg(Color::DarkGray)))
    }
}

fn define_block<'a>(title: &'a str, legend: Vec<Spans<'a>>) -> BlockWithLegend<'a> {
    let (initial, remainder) = split_initial(title);

    let title = Spans::from(vec![
        Span::styled(initial, initials_style()),
        Span::styled(remainder, text_style()),
    ]);

    BlockWithLegend::default()
        .borders(widgets::Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(title)
        .legend(legend)
}

fn legend<'a>(labels: &[&'a str]) -> Vec<Spans<'a>> {
    labels.iter().map(|&label| legend_entry(label, true)).collect()
}

fn schedule_text(status: &str, rows: &[ScheduleRow]) -> String {
    let mut lines = vec![status.to_string(), String::new()];
    lines.extend(rows.iter().map(|row| match row.due_in {
        Some(due_in) => format!("{} in {} (every {})", row.name, due_in, row.every),
        None => format!("{} not scheduled", row.name),
    }));
    lines.join("\n")
}

fn render_break_screen<B: Backend>(frame: &mut Frame<B>, area: Rect, screen: &BreakScreen) {
    let mut legend_entries = vec![legend_entry("postpone", screen.can_postpone)];
    legend_entries.extend(legend(&["skip", "end", "quit"]));

    let title = format!("{} break", screen.name);
    let block = define_block(&title, legend_entries);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(inner);

    let ring = CountdownRing::default()
        .remaining(screen.remaining)
        .remaining_fraction(screen.remaining_fraction)
        .label("relax")
        .postpones(screen.postpones_used, screen.postpone_limit);
    frame.render_widget(ring, chunks[0]);

    if let Some(idea) = &screen.idea {
        frame.render_widget(TextPanel::default().text(idea), chunks[1]);
    }
}

pub fn render_ui<B: Backend>(
    frame: &mut Frame<B>,
    display_data: &DisplayData,
    show_schedule: bool,
    show_timer: bool,
) {
    let (main_area, message_area) = match display_data.message {
        Some(_) => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(1)])
                .split(frame.size());
            (chunks[0], Some(chunks[1]))
        }
        None => (frame.size(), None),
    };

    if let (Some(message), Some(area)) = (&display_data.message, message_area) {
        let line = widgets::Paragraph::new(message.as_str())
            .style(Style::default().fg(Color::Yellow));
        frame.render_widget(line, area);
    }

    if let Some(screen) = &display_data.break_screen {
        render_break_screen(frame, main_area, screen);
        return;
    }

    let (schedule_chunk, timer_chunk) = {
        let (schedule_pct, timer_pct) = match (show_schedule, show_timer) {
            (true, true) => (35, 65),
            (true, false) => (100, 0),
            (false, true) => (0, 100),
            (false, false) => (0, 0),
        };

        let direction = if main_area.width >= main_area.height * 2 {
            Direction::Horizontal
        } else {
            Direction::Vertical
        };

        let toplevel_chunks = Layout::default()
            .direction(direction)
            .constraints([
                Constraint::Percentage(schedule_pct),
                Constraint::Percentage(timer_pct),
            ])
            .split(main_area);

        (toplevel_chunks[0], toplevel_chunks[1])
    };

    if show_schedule {
        let text = schedule_text(&display_data.status, &display_data.schedule);
        let schedule_widget = TextPanel::default()
            .text(&text)
            .block(define_block("¹schedule", legend(&["reload", "x reset"])));

        frame.render_widget(schedule_widget, schedule_chunk);
    }
    if show_timer {
        let countdown = &display_data.countdown;
        let timer_widget = CountdownRing::default()
            .block(define_block(
                "²timer",
                legend(&["␣ pause", "hold 1h", "now", "skip", "quit"]),
            ))
            .label(countdown.label.as_str())
            .remaining(countdown.remaining)
            .remaining_fraction(countdown.remaining_fraction)
            .is_paused(countdown.is_paused);

        frame.render_widget(timer_widget, timer_chunk);
    }
}
