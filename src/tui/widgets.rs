use crate::timespan::TimeSpan;
use crate::tui::animation::{self, RING_HEIGHT, RING_WIDTH};
use std::iter::once;
use tui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    text::{Span, Spans},
    widgets::{Block, BorderType, Borders, Paragraph, Widget, Wrap},
};

/// A bordered block that lists key bindings along its bottom edge.
pub struct BlockWithLegend<'a> {
    legend: Vec<Spans<'a>>,
    block: Block<'a>,
    border_type: BorderType,
}

impl<'a> BlockWithLegend<'a> {
    pub fn title<T>(mut self, title: T) -> BlockWithLegend<'a>
    where
        T: Into<Spans<'a>>,
    {
        self.block = self.block.title(title);
        self
    }

    pub fn borders(mut self, borders: Borders) -> BlockWithLegend<'a> {
        self.block = self.block.borders(borders);
        self
    }

    pub fn border_type(mut self, border_type: BorderType) -> BlockWithLegend<'a> {
        self.block = self.block.border_type(border_type);
        self.border_type = border_type;
        self
    }

    pub fn inner(&self, area: Rect) -> Rect {
        self.block.inner(area)
    }

    pub fn legend<T>(mut self, legend: Vec<T>) -> BlockWithLegend<'a>
    where
        T: Into<Spans<'a>>,
    {
        self.legend = legend.into_iter().map(|l| l.into()).collect();
        self
    }
}

impl<'a> Default for BlockWithLegend<'a> {
    fn default() -> BlockWithLegend<'a> {
        BlockWithLegend {
            legend: vec![],
            block: Block::default(),
            border_type: BorderType::Plain,
        }
    }
}

impl<'a> Widget for BlockWithLegend<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.render(area, buf);
        if area.height == 0 {
            return;
        }
        let symbols = BorderType::line_symbols(self.border_type);

        let legend_y = area.y + area.height - 1;
        let mut legend_x = area.x + 1;

        for entry in self.legend.into_iter() {
            let entry: Spans = once(Span::from(symbols.bottom_right))
                .chain(entry.0.into_iter())
                .chain(once(Span::from(symbols.bottom_left)))
                .collect::<Vec<_>>()
                .into();

            let width_remaining = area.width.saturating_sub(legend_x - area.x + 1);
            let (x, _) = buf.set_spans(legend_x, legend_y, &entry, width_remaining);
            legend_x = x;
        }
    }
}

/// Centers a `width` x `height` box inside `area`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let vertical = {
        let leftover = area.height.saturating_sub(height);
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(leftover / 2),
                Constraint::Length(height),
                Constraint::Min(0),
            ])
            .split(area)[1]
    };
    let leftover = vertical.width.saturating_sub(width);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(leftover / 2),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(vertical)[1]
}

/// A countdown drawn as a shrinking ring with a few lines of text inside.
pub struct CountdownRing<'a> {
    block: Option<BlockWithLegend<'a>>,
    remaining_fraction: f64,
    remaining: TimeSpan,
    label: String,
    postpones_used: u32,
    postpone_limit: u32,
    is_paused: bool,
}

impl<'a> CountdownRing<'a> {
    pub fn block(mut self, block: BlockWithLegend<'a>) -> CountdownRing<'a> {
        self.block = Some(block);
        self
    }

    pub fn remaining_fraction(mut self, fraction: f64) -> CountdownRing<'a> {
        self.remaining_fraction = fraction.clamp(0.0, 1.0);
        self
    }

    pub fn remaining(mut self, remaining: TimeSpan) -> CountdownRing<'a> {
        self.remaining = remaining;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> CountdownRing<'a> {
        self.label = label.into();
        self
    }

    pub fn postpones(mut self, used: u32, limit: u32) -> CountdownRing<'a> {
        self.postpones_used = used;
        self.postpone_limit = limit;
        self
    }

    pub fn is_paused(mut self, is_paused: bool) -> CountdownRing<'a> {
        self.is_paused = is_paused;
        self
    }
}

impl<'a> Default for CountdownRing<'a> {
    fn default() -> CountdownRing<'a> {
        CountdownRing {
            block: None,
            remaining_fraction: 0.0,
            remaining: TimeSpan::default(),
            label: String::new(),
            postpones_used: 0,
            postpone_limit: 0,
            is_paused: false,
        }
    }
}

impl<'a> Widget for CountdownRing<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner_area = match &self.block {
            Some(block) => block.inner(area),
            None => area,
        };
        if let Some(block) = self.block {
            block.render(area, buf);
        }

        let ring_area = centered(inner_area, RING_WIDTH, RING_HEIGHT);
        Paragraph::new(animation::ring(self.remaining_fraction))
            .alignment(Alignment::Left)
            .render(ring_area, buf);

        let status_text = format!(
            "{}\n{}\n{}{}",
            animation::counter(self.postpones_used, self.postpone_limit),
            self.remaining,
            self.label,
            if self.is_paused { " ⏸" } else { "" }
        );

        let text_area = ring_area.inner(&Margin {
            horizontal: 1,
            vertical: 1,
        });
        let text_height = status_text.lines().count() as u16;
        let top_padding = (text_area.height / 2).saturating_sub(text_height / 2);
        let text_area = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(top_padding), Constraint::Min(0)])
            .split(text_area)[1];

        Paragraph::new(status_text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(text_area, buf);
    }
}

/// Centered free text, used for the schedule overview and break ideas.
#[derive(Default)]
pub struct TextPanel<'a> {
    block: Option<BlockWithLegend<'a>>,
    text: &'a str,
}

impl<'a> TextPanel<'a> {
    pub fn block(mut self, block: BlockWithLegend<'a>) -> TextPanel<'a> {
        self.block = Some(block);
        self
    }

    pub fn text(mut self, text: &'a str) -> TextPanel<'a> {
        self.text = text;
        self
    }
}

impl<'a> Widget for TextPanel<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner_area = match &self.block {
            Some(block) => block.inner(area),
            None => area,
        };
        if let Some(block) = self.block {
            block.render(area, buf);
        }

        let text_area = {
            let text_height = self.text.lines().count() as u16;
            let top_padding = (inner_area.height / 2).saturating_sub(text_height / 2);

            Layout::default()
                .constraints([Constraint::Length(top_padding), Constraint::Min(text_height)])
                .split(inner_area)[1]
        };

        Paragraph::new(self.text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(text_area, buf);
    }
}
