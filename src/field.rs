//! Per-field interaction state for the hours and minutes cells.
//!
//! ```text
//! Idle     --pointer down-->          Dragging   (capture acquired)
//! Dragging --pointer move-->          Dragging   (emits deltas)
//! Dragging --pointer up, dragged-->   Idle       (capture released)
//! Dragging --pointer up, <= 3 cols--> Editing(formatted value)
//! Idle     --click-->                 Editing(formatted value)
//! Idle     --digit-->                 Editing(digit)
//! Editing  --Enter / blur-->          Idle       (commit if parseable)
//! Editing  --Escape-->                Idle       (discard)
//! ```

use tracing::debug;

use crate::capture::{CaptureGuard, PointerCapture};
use crate::drag::{DragAccumulator, DragOutcome};
use crate::picker::PickerPart;
use crate::time_value::{MAX_HOURS, MAX_MINUTES};

/// Longest digit run the edit buffer keeps
const MAX_EDIT_DIGITS: usize = 6;

/// Which numeric cell a field edits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum FieldKind {
    Hours,
    Minutes,
}

impl FieldKind {
    pub fn max(&self) -> i64 {
        match self {
            FieldKind::Hours => MAX_HOURS,
            FieldKind::Minutes => MAX_MINUTES,
        }
    }

    /// Display text: hours unpadded, minutes padded to two digits
    pub fn format(&self, value: i64) -> String {
        match self {
            FieldKind::Hours => value.to_string(),
            FieldKind::Minutes => format!("{:02}", value),
        }
    }

    pub fn part(&self) -> PickerPart {
        match self {
            FieldKind::Hours => PickerPart::Hours,
            FieldKind::Minutes => PickerPart::Minutes,
        }
    }
}

/// An in-flight drag gesture. Owns the pointer capture for its lifetime.
#[derive(Debug)]
pub struct DragSession {
    accumulator: DragAccumulator,
    _capture: CaptureGuard,
}

impl DragSession {
    pub fn accumulator(&self) -> &DragAccumulator {
        &self.accumulator
    }
}

#[derive(Debug, Default)]
pub enum EditState {
    #[default]
    Idle,
    Dragging(DragSession),
    Editing(String),
}

/// A value change requested by a field, not yet clamped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldChange {
    Delta(i64),
    Set(i64),
}

/// Keys a field understands while focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKey {
    Char(char),
    Backspace,
    Enter,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyOutcome {
    /// The key was used by the field and should not reach anything else
    pub consumed: bool,
    pub change: Option<FieldChange>,
}

impl KeyOutcome {
    fn ignored() -> Self {
        Self::default()
    }

    fn consumed() -> Self {
        Self {
            consumed: true,
            change: None,
        }
    }

    fn committed(change: Option<FieldChange>) -> Self {
        Self {
            consumed: true,
            change,
        }
    }
}

#[derive(Debug)]
pub struct DraggableField {
    kind: FieldKind,
    sensitivity: f64,
    state: EditState,
}

impl DraggableField {
    pub fn new(kind: FieldKind, sensitivity: f64) -> Self {
        Self {
            kind,
            sensitivity,
            state: EditState::Idle,
        }
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn state(&self) -> &EditState {
        &self.state
    }

    pub fn set_sensitivity(&mut self, sensitivity: f64) {
        self.sensitivity = sensitivity;
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, EditState::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, EditState::Dragging(_))
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, EditState::Editing(_))
    }

    pub fn buffer(&self) -> Option<&str> {
        match &self.state {
            EditState::Editing(buffer) => Some(buffer),
            _ => None,
        }
    }

    /// Start a drag. Returns false if the field is busy or the pointer is
    /// already captured elsewhere.
    pub fn pointer_down(&mut self, x: f64, capture: &PointerCapture) -> bool {
        if !self.is_idle() {
            return false;
        }
        let Some(guard) = capture.acquire(self.kind.part()) else {
            return false;
        };

        let mut accumulator = DragAccumulator::new(self.sensitivity);
        accumulator.begin(x);
        self.state = EditState::Dragging(DragSession {
            accumulator,
            _capture: guard,
        });
        debug!(field = %self.kind, x, "drag started");
        true
    }

    pub fn pointer_move(&mut self, x: f64) -> Option<FieldChange> {
        let EditState::Dragging(session) = &mut self.state else {
            return None;
        };
        match session.accumulator.on_move(x) {
            0 => None,
            delta => Some(FieldChange::Delta(delta)),
        }
    }

    /// Finish a drag. A gesture that never left the click threshold switches
    /// the field into edit mode seeded with `display`.
    pub fn pointer_up(&mut self, x: f64, display: &str) -> Option<DragOutcome> {
        let EditState::Dragging(session) = &mut self.state else {
            return None;
        };
        let outcome = session.accumulator.end(x);
        // Dropping the session releases the capture.
        self.state = EditState::Idle;
        debug!(field = %self.kind, ?outcome, "drag ended");

        if outcome == DragOutcome::Click {
            self.click(display);
        }
        Some(outcome)
    }

    pub fn click(&mut self, display: &str) {
        if self.is_idle() {
            self.state = EditState::Editing(display.to_string());
            debug!(field = %self.kind, "edit started");
        }
    }

    pub fn key(&mut self, key: FieldKey) -> KeyOutcome {
        if self.is_idle() {
            return match key {
                FieldKey::Char(c) if c.is_ascii_digit() => {
                    self.state = EditState::Editing(c.to_string());
                    debug!(field = %self.kind, "edit started from keypress");
                    KeyOutcome::consumed()
                }
                _ => KeyOutcome::ignored(),
            };
        }

        let EditState::Editing(buffer) = &mut self.state else {
            return KeyOutcome::ignored();
        };
        match key {
            FieldKey::Char(c) => {
                if c.is_ascii_digit() && buffer.len() < MAX_EDIT_DIGITS {
                    buffer.push(c);
                }
                KeyOutcome::consumed()
            }
            FieldKey::Backspace => {
                buffer.pop();
                KeyOutcome::consumed()
            }
            FieldKey::Enter => KeyOutcome::committed(self.commit()),
            FieldKey::Escape => {
                self.state = EditState::Idle;
                debug!(field = %self.kind, "edit cancelled");
                KeyOutcome::consumed()
            }
        }
    }

    /// Focus left the field: a pending edit is committed.
    pub fn blur(&mut self) -> Option<FieldChange> {
        if self.is_editing() {
            self.commit()
        } else {
            None
        }
    }

    /// Abandon any drag or edit without producing a change.
    pub fn reset(&mut self) {
        if !self.is_idle() {
            debug!(field = %self.kind, "interaction reset");
        }
        self.state = EditState::Idle;
    }

    fn commit(&mut self) -> Option<FieldChange> {
        let EditState::Editing(buffer) = std::mem::take(&mut self.state) else {
            return None;
        };
        let parsed = parse_saturating(buffer.trim());
        debug!(field = %self.kind, buffer = %buffer, ?parsed, "edit committed");
        parsed.map(FieldChange::Set)
    }
}

/// Digits-only input too large for i64 saturates so it clamps like any
/// other out-of-range value.
fn parse_saturating(digits: &str) -> Option<i64> {
    match digits.parse::<i64>() {
        Ok(n) => Some(n),
        Err(_) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
            Some(i64::MAX)
        }
        Err(_) => None,
    }
}
