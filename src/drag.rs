use tracing::trace;

/// Position units per value unit. Smaller is more sensitive.
pub const DEFAULT_DRAG_SENSITIVITY: f64 = 3.0;

/// Distance from the press origin beyond which a gesture counts as a drag
/// rather than a click.
pub const DRAG_THRESHOLD: f64 = 3.0;

/// How a finished pointer gesture should be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    Click,
    Drag,
}

/// Turns continuous pointer motion into whole-unit deltas.
///
/// The fractional remainder is carried between moves, so slow motion still
/// adds up and nothing is lost to truncation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragAccumulator {
    sensitivity: f64,
    origin_x: f64,
    last_x: f64,
    accumulated: f64,
    exceeded_threshold: bool,
    active: bool,
}

impl DragAccumulator {
    pub fn new(sensitivity: f64) -> Self {
        let sensitivity = if sensitivity.is_finite() && sensitivity > 0.0 {
            sensitivity
        } else {
            DEFAULT_DRAG_SENSITIVITY
        };

        Self {
            sensitivity,
            origin_x: 0.0,
            last_x: 0.0,
            accumulated: 0.0,
            exceeded_threshold: false,
            active: false,
        }
    }

    pub fn begin(&mut self, origin_x: f64) {
        self.origin_x = origin_x;
        self.last_x = origin_x;
        self.accumulated = 0.0;
        self.exceeded_threshold = false;
        self.active = true;
    }

    /// Feed a new pointer position; returns the whole delta to apply (often 0).
    pub fn on_move(&mut self, current_x: f64) -> i64 {
        if !self.active {
            return 0;
        }

        self.track_threshold(current_x);

        let delta_x = current_x - self.last_x;
        self.accumulated += delta_x / self.sensitivity;
        self.last_x = current_x;

        let whole = self.accumulated.trunc();
        if whole == 0.0 {
            return 0;
        }
        self.accumulated -= whole;
        trace!(delta = whole, remainder = self.accumulated, "drag delta");
        whole as i64
    }

    /// Close the session. Later moves are ignored until the next `begin`.
    pub fn end(&mut self, release_x: f64) -> DragOutcome {
        if self.active {
            self.track_threshold(release_x);
        }
        self.active = false;
        self.outcome()
    }

    pub fn outcome(&self) -> DragOutcome {
        if self.exceeded_threshold {
            DragOutcome::Drag
        } else {
            DragOutcome::Click
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn sensitivity(&self) -> f64 {
        self.sensitivity
    }

    pub fn accumulated(&self) -> f64 {
        self.accumulated
    }

    fn track_threshold(&mut self, x: f64) {
        if (x - self.origin_x).abs() > DRAG_THRESHOLD {
            self.exceeded_threshold = true;
        }
    }
}

impl Default for DragAccumulator {
    fn default() -> Self {
        Self::new(DEFAULT_DRAG_SENSITIVITY)
    }
}
