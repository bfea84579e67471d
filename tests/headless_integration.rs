use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{buffer::Buffer, layout::Rect, widgets::StatefulWidget};
use scrubtime::runtime::{FixedTicker, PickerEvent, Runner, TestEventSource};
use scrubtime::{PickerProps, TimePicker, TimePickerState};

/// Caller-side harness: owns the value, renders once so the picker knows
/// its layout, then feeds events through the runtime.
struct Session {
    value: String,
    props: PickerProps,
    state: TimePickerState,
    changes: Vec<String>,
}

impl Session {
    fn new(value: &str, props: PickerProps) -> Self {
        let mut state = TimePickerState::new(&props);
        let area = Rect::new(0, 0, 60, 6);
        let mut buffer = Buffer::empty(area);
        TimePicker::new(value, &props).render(area, &mut buffer, &mut state);
        Self {
            value: value.to_string(),
            props,
            state,
            changes: Vec::new(),
        }
    }

    fn drive(&mut self, events: Vec<PickerEvent>) {
        let (tx, rx) = mpsc::channel();
        let count = events.len();
        for ev in events {
            tx.send(ev).unwrap();
        }
        let runner = Runner::new(
            TestEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(5)),
        );

        let mut handled = 0;
        for _ in 0..100u32 {
            let mut emitted = Vec::new();
            match runner.step() {
                PickerEvent::Tick | PickerEvent::Resize => {}
                PickerEvent::Closed => break,
                PickerEvent::Mouse(mouse) => {
                    self.state
                        .handle_mouse(mouse, &self.value, &self.props, &mut |v| emitted.push(v));
                    handled += 1;
                }
                PickerEvent::Key(key) => {
                    self.state
                        .handle_key(key, &self.value, &self.props, &mut |v| emitted.push(v));
                    handled += 1;
                }
            }
            if let Some(last) = emitted.last() {
                self.value = last.clone();
            }
            self.changes.extend(emitted);
            if handled == count {
                break;
            }
        }
    }
}

fn mouse(kind: MouseEventKind, column: u16, row: u16) -> PickerEvent {
    PickerEvent::Mouse(MouseEvent {
        kind,
        column,
        row,
        modifiers: KeyModifiers::NONE,
    })
}

fn key(code: KeyCode) -> PickerEvent {
    PickerEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

const DOWN: MouseEventKind = MouseEventKind::Down(MouseButton::Left);
const DRAG: MouseEventKind = MouseEventKind::Drag(MouseButton::Left);
const UP: MouseEventKind = MouseEventKind::Up(MouseButton::Left);

#[test]
fn headless_minutes_drag_rolls_into_next_hour() {
    let mut s = Session::new("9:50", PickerProps::default());
    let m = s.state.layout().minutes;
    let x = m.x + 1;

    s.drive(vec![
        mouse(DOWN, x, m.y),
        mouse(DRAG, x + 15, m.y),
        mouse(DRAG, x + 30, m.y + 4),
        mouse(UP, x + 30, m.y + 4),
    ]);

    assert_eq!(s.changes, vec!["9:55", "10:00"]);
    assert_eq!(s.state.captured(), None);
}

#[test]
fn headless_hours_drag_clamps_at_day_end() {
    let mut s = Session::new("23:10", PickerProps::default());
    let h = s.state.layout().hours;
    let x = h.x + 1;

    s.drive(vec![
        mouse(DOWN, x, h.y),
        mouse(DRAG, x + 15, h.y),
        mouse(UP, x + 15, h.y),
    ]);

    assert_eq!(s.value, "23:10");
    assert_eq!(s.changes, vec!["23:10"]);
}

#[test]
fn headless_click_then_type_commits_clamped_minutes() {
    let mut s = Session::new("5:30", PickerProps::default());
    let m = s.state.layout().minutes;
    let x = m.x + 1;

    s.drive(vec![
        mouse(DOWN, x, m.y),
        mouse(UP, x + 1, m.y),
        key(KeyCode::Backspace),
        key(KeyCode::Backspace),
        key(KeyCode::Char('7')),
        key(KeyCode::Char('5')),
        key(KeyCode::Enter),
    ]);

    assert_eq!(s.changes, vec!["5:59"]);
    assert!(!s.state.is_editing());
}

#[test]
fn headless_higher_sensitivity_needs_more_travel() {
    let props = PickerProps {
        drag_sensitivity: 6.0,
        ..PickerProps::default()
    };
    let mut s = Session::new("17:45", props);
    let m = s.state.layout().minutes;
    let x = m.x + 1;

    s.drive(vec![
        mouse(DOWN, x, m.y),
        mouse(DRAG, x + 3, m.y),
        mouse(DRAG, x + 6, m.y),
        mouse(DRAG, x + 12, m.y),
        mouse(UP, x + 12, m.y),
    ]);

    assert_eq!(s.changes, vec!["17:46", "17:47"]);
}

#[test]
fn headless_slider_respects_step() {
    let props = PickerProps {
        slider_step: 30,
        ..PickerProps::default()
    };
    let mut s = Session::new("8:00", props);
    let track = s.state.layout().track;
    let middle = track.x + (track.width - 1) / 2;

    s.drive(vec![mouse(DOWN, middle, track.y), mouse(UP, middle, track.y)]);

    assert_eq!(s.value, "12:00");
    s.drive(vec![key(KeyCode::Right), key(KeyCode::Right)]);
    assert_eq!(s.value, "13:00");
}

#[test]
fn headless_disabled_picker_ignores_everything() {
    let props = PickerProps {
        disabled: true,
        ..PickerProps::default()
    };
    let mut s = Session::new("12:00", props);
    let h = s.state.layout().hours;
    let track = s.state.layout().track;

    s.drive(vec![
        mouse(DOWN, h.x + 1, h.y),
        mouse(DRAG, h.x + 20, h.y),
        mouse(UP, h.x + 20, h.y),
        mouse(DOWN, track.x + 3, track.y),
        key(KeyCode::Tab),
        key(KeyCode::Char('7')),
        key(KeyCode::Enter),
    ]);

    assert!(s.changes.is_empty());
    assert_eq!(s.value, "12:00");
    assert_eq!(s.state.captured(), None);
}
