use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::drag::DEFAULT_DRAG_SENSITIVITY;
use crate::field::{FieldChange, FieldKind};
use crate::time_value::{
    clamp_hours, clamp_minutes, clamp_total_minutes, format_time, TimeValue, MAX_TOTAL_MINUTES,
};

pub const DEFAULT_SLIDER_STEP: u32 = 15;
pub const DEFAULT_DIVISIONS: u32 = 4;
const HOURS_PER_DAY: f64 = 24.0;

/// Interactive regions of the picker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum PickerPart {
    Hours,
    Minutes,
    Slider,
}

impl PickerPart {
    pub fn field(&self) -> Option<FieldKind> {
        match self {
            PickerPart::Hours => Some(FieldKind::Hours),
            PickerPart::Minutes => Some(FieldKind::Minutes),
            PickerPart::Slider => None,
        }
    }
}

/// Caller-supplied presentation and behaviour settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickerProps {
    pub label: Option<String>,
    pub disabled: bool,
    /// Slider granularity in minutes
    pub slider_step: u32,
    /// Columns of pointer travel per unit of change
    pub drag_sensitivity: f64,
    /// Number of equal slider partitions; one more label than this is drawn
    pub divisions: u32,
}

impl Default for PickerProps {
    fn default() -> Self {
        Self {
            label: None,
            disabled: false,
            slider_step: DEFAULT_SLIDER_STEP,
            drag_sensitivity: DEFAULT_DRAG_SENSITIVITY,
            divisions: DEFAULT_DIVISIONS,
        }
    }
}

/// Derives new canonical values from the current one.
///
/// Holds nothing between calls: build one from the caller's string whenever
/// an interaction needs it. Every operation returns the new `H:mm` string,
/// or `None` when disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimePickerController {
    time: TimeValue,
    disabled: bool,
}

impl TimePickerController {
    pub fn new(value: &str, disabled: bool) -> Self {
        Self {
            time: TimeValue::parse(value),
            disabled,
        }
    }

    pub fn time(&self) -> TimeValue {
        self.time
    }

    /// Hours clamp at the day boundary; they never roll into minutes.
    pub fn on_hours_delta(&self, delta: i64) -> Option<String> {
        self.emit(|t| format_time(clamp_hours(t.hours().saturating_add(delta)), t.minutes()))
    }

    pub fn on_hours_set(&self, hours: i64) -> Option<String> {
        self.emit(|t| format_time(clamp_hours(hours), t.minutes()))
    }

    /// Minutes move on the total, so dragging past :59 or below :00 carries
    /// into the hour.
    pub fn on_minutes_delta(&self, delta: i64) -> Option<String> {
        self.emit(|t| {
            TimeValue::from_total_minutes(t.total_minutes().saturating_add(delta)).to_string()
        })
    }

    /// Setting minutes directly clamps and leaves the hour alone.
    pub fn on_minutes_set(&self, minutes: i64) -> Option<String> {
        self.emit(|t| format_time(t.hours(), clamp_minutes(minutes)))
    }

    pub fn on_slider_change(&self, raw_total_minutes: i64, step: u32) -> Option<String> {
        self.emit(|_| {
            let snapped = snap_to_step(raw_total_minutes, step);
            TimeValue::from_total_minutes(clamp_total_minutes(snapped)).to_string()
        })
    }

    /// Route a field's requested change to the matching operation.
    pub fn apply(&self, kind: FieldKind, change: FieldChange) -> Option<String> {
        match (kind, change) {
            (FieldKind::Hours, FieldChange::Delta(d)) => self.on_hours_delta(d),
            (FieldKind::Hours, FieldChange::Set(v)) => self.on_hours_set(v),
            (FieldKind::Minutes, FieldChange::Delta(d)) => self.on_minutes_delta(d),
            (FieldKind::Minutes, FieldChange::Set(v)) => self.on_minutes_set(v),
        }
    }

    fn emit(&self, f: impl FnOnce(&TimeValue) -> String) -> Option<String> {
        if self.disabled {
            debug!("change suppressed, picker disabled");
            return None;
        }
        Some(f(&self.time))
    }
}

/// Snap to the nearest multiple of `step`, never past the last reachable
/// step at or below 23:59. Steps of 0 or 1, or longer than the day, leave
/// the value as is.
pub fn snap_to_step(raw_total_minutes: i64, step: u32) -> i64 {
    let step = i64::from(step);
    if step <= 1 || step > MAX_TOTAL_MINUTES {
        return raw_total_minutes;
    }
    let max_aligned = (MAX_TOTAL_MINUTES / step) * step;
    let snapped = ((raw_total_minutes as f64 / step as f64).round() as i64) * step;
    snapped.min(max_aligned)
}

/// One tick label under the slider track
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderLabel {
    pub hour: u32,
    /// Position along the track, 0.0 to 100.0
    pub percent: f64,
}

/// Evenly spaced hour labels across 0h..24h, `divisions + 1` of them.
pub fn slider_labels(divisions: u32) -> Vec<SliderLabel> {
    let divisions = divisions.max(1);
    let span = HOURS_PER_DAY / f64::from(divisions);
    (0..=divisions)
        .map(|i| SliderLabel {
            hour: (span * f64::from(i)).round() as u32,
            percent: f64::from(i) / f64::from(divisions) * 100.0,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(value: &str) -> TimePickerController {
        TimePickerController::new(value, false)
    }

    #[test]
    fn test_hours_delta_clamps_without_wrapping() {
        assert_eq!(at("23:10").on_hours_delta(5).as_deref(), Some("23:10"));
        assert_eq!(at("1:45").on_hours_delta(-3).as_deref(), Some("0:45"));
        assert_eq!(at("9:05").on_hours_delta(2).as_deref(), Some("11:05"));
    }

    #[test]
    fn test_hours_set_clamps() {
        assert_eq!(at("9:05").on_hours_set(30).as_deref(), Some("23:05"));
        assert_eq!(at("9:05").on_hours_set(-2).as_deref(), Some("0:05"));
    }

    #[test]
    fn test_minutes_delta_rolls_the_hour() {
        assert_eq!(at("9:55").on_minutes_delta(10).as_deref(), Some("10:05"));
        assert_eq!(at("10:05").on_minutes_delta(-10).as_deref(), Some("9:55"));
    }

    #[test]
    fn test_minutes_delta_clamps_at_day_edges() {
        // 23:55 + 10 would be 24:05; the total clamps to 1439.
        assert_eq!(at("23:55").on_minutes_delta(10).as_deref(), Some("23:59"));
        assert_eq!(at("0:03").on_minutes_delta(-10).as_deref(), Some("0:00"));
    }

    #[test]
    fn test_minutes_set_does_not_roll_the_hour() {
        assert_eq!(at("5:30").on_minutes_set(75).as_deref(), Some("5:59"));
        assert_eq!(at("5:30").on_minutes_set(-1).as_deref(), Some("5:00"));
    }

    #[test]
    fn test_slider_change_clamps_and_snaps() {
        assert_eq!(at("0:00").on_slider_change(600, 15).as_deref(), Some("10:00"));
        assert_eq!(at("0:00").on_slider_change(607, 15).as_deref(), Some("10:00"));
        assert_eq!(at("0:00").on_slider_change(-40, 15).as_deref(), Some("0:00"));
        assert_eq!(at("0:00").on_slider_change(5000, 15).as_deref(), Some("23:45"));
        assert_eq!(at("0:00").on_slider_change(5000, 1).as_deref(), Some("23:59"));
    }

    #[test]
    fn test_disabled_controller_emits_nothing() {
        let c = TimePickerController::new("12:00", true);
        assert_eq!(c.on_hours_delta(1), None);
        assert_eq!(c.on_hours_set(3), None);
        assert_eq!(c.on_minutes_delta(1), None);
        assert_eq!(c.on_minutes_set(3), None);
        assert_eq!(c.on_slider_change(60, 15), None);
    }

    #[test]
    fn test_apply_routes_by_field() {
        let c = at("5:30");
        assert_eq!(
            c.apply(FieldKind::Minutes, FieldChange::Delta(45)).as_deref(),
            Some("6:15")
        );
        assert_eq!(
            c.apply(FieldKind::Minutes, FieldChange::Set(75)).as_deref(),
            Some("5:59")
        );
        assert_eq!(
            c.apply(FieldKind::Hours, FieldChange::Set(7)).as_deref(),
            Some("7:30")
        );
    }

    #[test]
    fn test_snap_to_step() {
        assert_eq!(snap_to_step(7, 15), 0);
        assert_eq!(snap_to_step(8, 15), 15);
        assert_eq!(snap_to_step(1439, 15), 1425);
        assert_eq!(snap_to_step(1439, 0), 1439);
        assert_eq!(snap_to_step(500, 60), 480);
        assert_eq!(snap_to_step(1439, 1439), 1439);
        assert_eq!(snap_to_step(700, 1440), 700);
    }

    #[test]
    fn test_default_slider_labels() {
        let hours: Vec<u32> = slider_labels(DEFAULT_DIVISIONS).iter().map(|l| l.hour).collect();
        assert_eq!(hours, vec![0, 6, 12, 18, 24]);
    }

    #[test]
    fn test_six_divisions_give_seven_labels() {
        let labels = slider_labels(6);
        let hours: Vec<u32> = labels.iter().map(|l| l.hour).collect();
        assert_eq!(hours, vec![0, 4, 8, 12, 16, 20, 24]);
        assert_eq!(labels[0].percent, 0.0);
        assert_eq!(labels[6].percent, 100.0);
        assert!((labels[3].percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_uneven_divisions_round_labels() {
        let hours: Vec<u32> = slider_labels(5).iter().map(|l| l.hour).collect();
        assert_eq!(hours, vec![0, 5, 10, 14, 19, 24]);
        assert_eq!(slider_labels(0).len(), 2);
    }

    #[test]
    fn test_props_default_values() {
        let props = PickerProps::default();
        assert_eq!(props.slider_step, 15);
        assert_eq!(props.drag_sensitivity, 3.0);
        assert_eq!(props.divisions, 4);
        assert!(!props.disabled);
        assert!(props.label.is_none());
    }
}
