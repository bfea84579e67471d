use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, MouseEvent};
use tracing::warn;

/// Input reaching the picker's caller.
///
/// Mouse events drive the drag and scrub gestures; `Closed` means no more
/// input will arrive and the session should end.
#[derive(Clone, Debug)]
pub enum PickerEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize,
    Tick,
    Closed,
}

/// Where picker input comes from: the terminal, or a scripted channel in tests
pub trait PickerEventSource: Send + 'static {
    /// Wait up to `timeout` for the next event.
    fn recv_timeout(&self, timeout: Duration) -> Result<PickerEvent, RecvTimeoutError>;
}

/// Reads key, mouse and resize events from the terminal on a background thread
pub struct CrosstermEventSource {
    rx: Receiver<PickerEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let evt = match event::read() {
                Ok(CtEvent::Key(key)) => PickerEvent::Key(key),
                Ok(CtEvent::Mouse(mouse)) => PickerEvent::Mouse(mouse),
                Ok(CtEvent::Resize(_, _)) => PickerEvent::Resize,
                Ok(_) => continue,
                Err(err) => {
                    warn!(%err, "terminal event reader stopped");
                    break;
                }
            };
            if tx.send(evt).is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PickerEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<PickerEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// How long the runner waits for input before yielding a `Tick`
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Idle interval that never changes
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Channel-fed event source for tests and scripted sessions
pub struct TestEventSource {
    rx: Receiver<PickerEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<PickerEvent>) -> Self {
        Self { rx }
    }
}

impl PickerEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<PickerEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Pulls picker input one event at a time
pub struct Runner<E: PickerEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: PickerEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Next event, `Tick` when the interval passes quietly, or `Closed`
    /// once the source has hung up.
    pub fn step(&self) -> PickerEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => PickerEvent::Tick,
            Err(RecvTimeoutError::Disconnected) => PickerEvent::Closed,
        }
    }
}
