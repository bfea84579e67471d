// Library surface for the picker widget, headless tests and the demo binary.
pub mod app_dirs;
pub mod capture;
pub mod config;
pub mod drag;
pub mod error;
pub mod field;
pub mod logging;
pub mod picker;
pub mod runtime;
pub mod state;
pub mod time_value;
pub mod ui;

pub use error::{Error, Result};
pub use picker::{PickerProps, TimePickerController};
pub use state::TimePickerState;
pub use time_value::TimeValue;
pub use ui::TimePicker;
