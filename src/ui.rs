use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, Paragraph, StatefulWidget, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::{
    field::{EditState, FieldKind},
    picker::{slider_labels, PickerPart, PickerProps},
    state::TimePickerState,
    time_value::{TimeValue, MAX_TOTAL_MINUTES},
};

const FIELD_WIDTH: u16 = 4;
const SEPARATOR_WIDTH: u16 = 1;
const TRACK_MARGIN: u16 = 1;
const TRACK_SYMBOL: &str = "─";
const THUMB_SYMBOL: &str = "●";

/// Screen regions of a rendered picker, kept for hit-testing mouse events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PickerLayout {
    pub label: Rect,
    pub hours: Rect,
    pub separator: Rect,
    pub minutes: Rect,
    pub track: Rect,
    pub ticks: Rect,
}

impl PickerLayout {
    pub fn new(area: Rect, has_label: bool) -> Self {
        let mut y = area.y;
        let row = |y: u16, x: u16, width: u16| area.intersection(Rect::new(x, y, width, 1));

        let label = if has_label {
            let r = row(y, area.x, area.width);
            y = y.saturating_add(1);
            r
        } else {
            Rect::default()
        };

        let display_width = FIELD_WIDTH * 2 + SEPARATOR_WIDTH;
        let start_x = area.x + area.width.saturating_sub(display_width) / 2;
        let hours = row(y, start_x, FIELD_WIDTH);
        let separator = row(y, start_x + FIELD_WIDTH, SEPARATOR_WIDTH);
        let minutes = row(y, start_x + FIELD_WIDTH + SEPARATOR_WIDTH, FIELD_WIDTH);

        let (track_x, track_width) = if area.width > TRACK_MARGIN * 2 + 1 {
            (area.x + TRACK_MARGIN, area.width - TRACK_MARGIN * 2)
        } else {
            (area.x, area.width)
        };
        let track = row(y.saturating_add(2), track_x, track_width);
        let ticks = row(y.saturating_add(3), area.x, area.width);

        Self {
            label,
            hours,
            separator,
            minutes,
            track,
            ticks,
        }
    }

    pub fn hit_test(&self, column: u16, row: u16) -> Option<PickerPart> {
        [
            (self.hours, PickerPart::Hours),
            (self.minutes, PickerPart::Minutes),
            (self.track, PickerPart::Slider),
        ]
        .into_iter()
        .find(|(rect, _)| contains(*rect, column, row))
        .map(|(_, part)| part)
    }

    /// Raw (unsnapped) total minutes under `column`; columns past either end
    /// of the track pin to that end.
    pub fn slider_value_at(&self, column: u16) -> i64 {
        if self.track.width <= 1 {
            return 0;
        }
        let offset = f64::from(column.saturating_sub(self.track.x));
        let fraction = (offset / f64::from(self.track.width - 1)).clamp(0.0, 1.0);
        (fraction * MAX_TOTAL_MINUTES as f64).round() as i64
    }

    pub fn thumb_column(&self, total_minutes: i64) -> u16 {
        let fraction = total_minutes.clamp(0, MAX_TOTAL_MINUTES) as f64 / MAX_TOTAL_MINUTES as f64;
        self.track_column(fraction)
    }

    fn track_column(&self, fraction: f64) -> u16 {
        let span = f64::from(self.track.width.saturating_sub(1));
        self.track.x + (fraction * span).round() as u16
    }
}

fn contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x && column < rect.right() && row >= rect.y && row < rect.bottom()
}

/// Renders a picker for the caller's current value.
///
/// Rendering records the layout in [`TimePickerState`] so later mouse events
/// can be hit-tested against what is on screen.
pub struct TimePicker<'a> {
    value: &'a str,
    props: &'a PickerProps,
    block: Option<Block<'a>>,
}

impl<'a> TimePicker<'a> {
    pub fn new(value: &'a str, props: &'a PickerProps) -> Self {
        Self {
            value,
            props,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl StatefulWidget for TimePicker<'_> {
    type State = TimePickerState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let inner = match self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.render(area, buf);
                inner
            }
            None => area,
        };

        let layout = PickerLayout::new(inner, self.props.label.is_some());
        state.set_layout(layout);

        let base = if self.props.disabled {
            Style::default().add_modifier(Modifier::DIM)
        } else {
            Style::default()
        };
        let bold_style = base.add_modifier(Modifier::BOLD);
        let dim_style = base.add_modifier(Modifier::DIM);

        if let Some(label) = &self.props.label {
            Paragraph::new(Span::styled(label.as_str(), bold_style.fg(Color::Cyan)))
                .alignment(Alignment::Center)
                .render(layout.label, buf);
        }

        let time = TimeValue::parse(self.value);
        for (kind, rect, alignment) in [
            (FieldKind::Hours, layout.hours, Alignment::Right),
            (FieldKind::Minutes, layout.minutes, Alignment::Left),
        ] {
            let value = match kind {
                FieldKind::Hours => time.hours(),
                FieldKind::Minutes => time.minutes(),
            };
            let (text, style) = field_appearance(kind, value, state, bold_style);
            Paragraph::new(Span::styled(text, style))
                .alignment(alignment)
                .render(rect, buf);
        }
        Paragraph::new(Span::styled(":", bold_style)).render(layout.separator, buf);

        render_track(&layout, time.total_minutes(), state, base, buf);
        render_ticks(&layout, self.props.divisions, dim_style, buf);
    }
}

fn field_appearance(
    kind: FieldKind,
    value: i64,
    state: &TimePickerState,
    bold_style: Style,
) -> (String, Style) {
    let focused = state.focus() == Some(kind.part());
    match state.field(kind).state() {
        EditState::Editing(buffer) => (
            format!("{}_", buffer),
            bold_style
                .fg(Color::Yellow)
                .add_modifier(Modifier::UNDERLINED),
        ),
        // A held capture renders reversed, the terminal stand-in for a resize cursor.
        EditState::Dragging(_) => (
            kind.format(value),
            bold_style.add_modifier(Modifier::REVERSED),
        ),
        EditState::Idle if focused => (kind.format(value), bold_style.fg(Color::Cyan)),
        EditState::Idle => (kind.format(value), bold_style),
    }
}

fn render_track(
    layout: &PickerLayout,
    total_minutes: i64,
    state: &TimePickerState,
    base: Style,
    buf: &mut Buffer,
) {
    let track = layout.track;
    if track.width == 0 || track.height == 0 {
        return;
    }
    buf.set_string(
        track.x,
        track.y,
        TRACK_SYMBOL.repeat(usize::from(track.width)),
        base.add_modifier(Modifier::DIM),
    );

    let mut thumb_style = base.fg(Color::Magenta);
    if state.is_scrubbing() {
        thumb_style = thumb_style.add_modifier(Modifier::REVERSED);
    } else if state.focus() == Some(PickerPart::Slider) {
        thumb_style = thumb_style.add_modifier(Modifier::BOLD);
    }
    buf.set_string(
        layout.thumb_column(total_minutes),
        track.y,
        THUMB_SYMBOL,
        thumb_style,
    );
}

fn render_ticks(layout: &PickerLayout, divisions: u32, style: Style, buf: &mut Buffer) {
    let ticks = layout.ticks;
    if ticks.width == 0 || ticks.height == 0 {
        return;
    }
    for label in slider_labels(divisions) {
        let text = label.hour.to_string();
        let width = text.width() as u16;
        if width > ticks.width {
            continue;
        }
        let center = layout.track_column(label.percent / 100.0);
        let x = center
            .saturating_sub(width / 2)
            .clamp(ticks.x, ticks.right() - width);
        buf.set_string(x, ticks.y, text, style);
    }
}
