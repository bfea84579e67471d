use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use tracing::debug;

use crate::capture::{CaptureGuard, PointerCapture};
use crate::field::{DraggableField, FieldChange, FieldKey, FieldKind};
use crate::picker::{snap_to_step, PickerPart, PickerProps, TimePickerController};
use crate::time_value::MAX_TOTAL_MINUTES;
use crate::ui::PickerLayout;

const FOCUS_ORDER: [PickerPart; 3] = [PickerPart::Hours, PickerPart::Minutes, PickerPart::Slider];

/// Ephemeral interaction state for one rendered picker.
///
/// The caller keeps the authoritative `H:mm` string and passes it (with the
/// current props) into every handler; changes come back through `on_change`.
#[derive(Debug)]
pub struct TimePickerState {
    capture: PointerCapture,
    hours: DraggableField,
    minutes: DraggableField,
    slider_drag: Option<CaptureGuard>,
    focus: Option<PickerPart>,
    layout: PickerLayout,
}

impl TimePickerState {
    pub fn new(props: &PickerProps) -> Self {
        Self {
            capture: PointerCapture::new(),
            hours: DraggableField::new(FieldKind::Hours, props.drag_sensitivity),
            minutes: DraggableField::new(FieldKind::Minutes, props.drag_sensitivity),
            slider_drag: None,
            focus: None,
            layout: PickerLayout::default(),
        }
    }

    pub fn field(&self, kind: FieldKind) -> &DraggableField {
        match kind {
            FieldKind::Hours => &self.hours,
            FieldKind::Minutes => &self.minutes,
        }
    }

    fn field_mut(&mut self, kind: FieldKind) -> &mut DraggableField {
        match kind {
            FieldKind::Hours => &mut self.hours,
            FieldKind::Minutes => &mut self.minutes,
        }
    }

    pub fn focus(&self) -> Option<PickerPart> {
        self.focus
    }

    /// Part currently holding the pointer, if a drag is in progress
    pub fn captured(&self) -> Option<PickerPart> {
        self.capture.owner()
    }

    pub fn is_editing(&self) -> bool {
        self.hours.is_editing() || self.minutes.is_editing()
    }

    pub fn is_scrubbing(&self) -> bool {
        self.slider_drag.is_some()
    }

    pub fn layout(&self) -> &PickerLayout {
        &self.layout
    }

    pub(crate) fn set_layout(&mut self, layout: PickerLayout) {
        self.layout = layout;
    }

    /// Move focus, committing any edit in the part being left.
    pub fn set_focus(
        &mut self,
        part: Option<PickerPart>,
        value: &str,
        props: &PickerProps,
        on_change: &mut impl FnMut(String),
    ) {
        if props.disabled {
            self.abort();
            return;
        }
        if self.focus == part {
            return;
        }
        if let Some(kind) = self.focus.and_then(|p| p.field()) {
            if let Some(change) = self.field_mut(kind).blur() {
                emit(TimePickerController::new(value, false).apply(kind, change), on_change);
            }
        }
        debug!(from = ?self.focus, to = ?part, "focus moved");
        self.focus = part;
    }

    /// Drop every in-flight drag and edit without emitting anything.
    pub fn abort(&mut self) {
        self.hours.reset();
        self.minutes.reset();
        self.slider_drag = None;
    }

    fn end_stale_drag(&mut self) {
        debug!(owner = ?self.capture.owner(), "press while captured, dropping old drag");
        for field in [&mut self.hours, &mut self.minutes] {
            if field.is_dragging() {
                field.reset();
            }
        }
        self.slider_drag = None;
    }

    /// Returns true if the event was used by the picker.
    pub fn handle_mouse(
        &mut self,
        mouse: MouseEvent,
        value: &str,
        props: &PickerProps,
        on_change: &mut impl FnMut(String),
    ) -> bool {
        if props.disabled {
            self.abort();
            return false;
        }
        self.hours.set_sensitivity(props.drag_sensitivity);
        self.minutes.set_sensitivity(props.drag_sensitivity);

        let x = f64::from(mouse.column);
        let controller = TimePickerController::new(value, false);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if self.capture.is_captured() {
                    // The release for the previous gesture never arrived.
                    self.end_stale_drag();
                }
                let hit = self.layout.hit_test(mouse.column, mouse.row);
                self.set_focus(hit, value, props, on_change);

                match hit {
                    Some(PickerPart::Slider) => {
                        self.slider_drag = self.capture.acquire(PickerPart::Slider);
                        self.scrub_slider(mouse.column, &controller, props, on_change);
                        true
                    }
                    Some(part) => {
                        let field = match part.field() {
                            Some(FieldKind::Hours) => &mut self.hours,
                            Some(FieldKind::Minutes) => &mut self.minutes,
                            None => return true,
                        };
                        // Clicking the field already being edited keeps the edit open.
                        field.pointer_down(x, &self.capture);
                        true
                    }
                    None => false,
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => match self.capture.owner() {
                Some(PickerPart::Slider) => {
                    self.scrub_slider(mouse.column, &controller, props, on_change);
                    true
                }
                Some(part) => {
                    if let Some(kind) = part.field() {
                        if let Some(change) = self.field_mut(kind).pointer_move(x) {
                            emit(controller.apply(kind, change), on_change);
                        }
                    }
                    true
                }
                None => false,
            },
            MouseEventKind::Up(MouseButton::Left) => match self.capture.owner() {
                Some(PickerPart::Slider) => {
                    self.slider_drag = None;
                    true
                }
                Some(part) => {
                    if let Some(kind) = part.field() {
                        let time = controller.time();
                        let display = match kind {
                            FieldKind::Hours => kind.format(time.hours()),
                            FieldKind::Minutes => kind.format(time.minutes()),
                        };
                        self.field_mut(kind).pointer_up(x, &display);
                    }
                    true
                }
                None => false,
            },
            _ => false,
        }
    }

    /// Returns true if the key was used by the picker.
    pub fn handle_key(
        &mut self,
        key: KeyEvent,
        value: &str,
        props: &PickerProps,
        on_change: &mut impl FnMut(String),
    ) -> bool {
        if props.disabled {
            self.abort();
            return false;
        }
        if key.kind == KeyEventKind::Release || key.modifiers.contains(KeyModifiers::CONTROL) {
            return false;
        }

        match key.code {
            KeyCode::Tab => {
                let next = self.cycle_focus(1);
                self.set_focus(Some(next), value, props, on_change);
                return true;
            }
            KeyCode::BackTab => {
                let prev = self.cycle_focus(FOCUS_ORDER.len() - 1);
                self.set_focus(Some(prev), value, props, on_change);
                return true;
            }
            _ => {}
        }

        let controller = TimePickerController::new(value, false);
        match self.focus {
            Some(PickerPart::Slider) => self.slider_key(key.code, &controller, props, on_change),
            Some(part) => {
                let Some(kind) = part.field() else {
                    return false;
                };
                let field_key = match key.code {
                    KeyCode::Char(c) => Some(FieldKey::Char(c)),
                    KeyCode::Backspace => Some(FieldKey::Backspace),
                    KeyCode::Enter => Some(FieldKey::Enter),
                    KeyCode::Esc => Some(FieldKey::Escape),
                    _ => None,
                };
                if let Some(field_key) = field_key {
                    let outcome = self.field_mut(kind).key(field_key);
                    if let Some(change) = outcome.change {
                        emit(controller.apply(kind, change), on_change);
                    }
                    if outcome.consumed {
                        return true;
                    }
                }

                if !self.field(kind).is_idle() {
                    return false;
                }
                let delta = match key.code {
                    KeyCode::Up => 1,
                    KeyCode::Down => -1,
                    _ => return false,
                };
                emit(controller.apply(kind, FieldChange::Delta(delta)), on_change);
                true
            }
            None => false,
        }
    }

    fn cycle_focus(&self, offset: usize) -> PickerPart {
        let current = self
            .focus
            .and_then(|f| FOCUS_ORDER.iter().position(|p| *p == f));
        match current {
            Some(idx) => FOCUS_ORDER[(idx + offset) % FOCUS_ORDER.len()],
            None if offset == 1 => FOCUS_ORDER[0],
            None => FOCUS_ORDER[FOCUS_ORDER.len() - 1],
        }
    }

    fn slider_key(
        &mut self,
        code: KeyCode,
        controller: &TimePickerController,
        props: &PickerProps,
        on_change: &mut impl FnMut(String),
    ) -> bool {
        let step = i64::from(props.slider_step.max(1));
        let total = controller.time().total_minutes();
        let target = match code {
            KeyCode::Left => total - step,
            KeyCode::Right => total + step,
            KeyCode::Home => 0,
            KeyCode::End => MAX_TOTAL_MINUTES,
            _ => return false,
        };
        let target = snap_to_step(target.clamp(0, MAX_TOTAL_MINUTES), props.slider_step);
        if target != total {
            emit(controller.on_slider_change(target, props.slider_step), on_change);
        }
        true
    }

    fn scrub_slider(
        &self,
        column: u16,
        controller: &TimePickerController,
        props: &PickerProps,
        on_change: &mut impl FnMut(String),
    ) {
        let raw = self.layout.slider_value_at(column);
        if snap_to_step(raw, props.slider_step) != controller.time().total_minutes() {
            emit(controller.on_slider_change(raw, props.slider_step), on_change);
        }
    }
}

fn emit(value: Option<String>, on_change: &mut impl FnMut(String)) {
    if let Some(value) = value {
        debug!(%value, "time changed");
        on_change(value);
    }
}
