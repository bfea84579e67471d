//! Scoped pointer capture.
//!
//! While a drag gesture is in flight, every pointer move and release in the
//! terminal belongs to the part that started it, not to whatever happens to
//! be under the cursor. Capture is handed out as a [`CaptureGuard`]; the
//! capture is released when the guard drops, which happens exactly once no
//! matter how the gesture ends (release outside the widget, focus loss,
//! the widget being disabled or torn down mid-drag).

use std::cell::Cell;
use std::rc::Rc;

use tracing::debug;

use crate::picker::PickerPart;

/// Shared capture slot for one picker. Cloning shares the slot.
#[derive(Debug, Clone, Default)]
pub struct PointerCapture {
    owner: Rc<Cell<Option<PickerPart>>>,
}

impl PointerCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the capture for `part`. Returns `None` while another guard is alive.
    pub fn acquire(&self, part: PickerPart) -> Option<CaptureGuard> {
        if let Some(holder) = self.owner.get() {
            debug!(?part, ?holder, "pointer capture busy");
            return None;
        }
        self.owner.set(Some(part));
        debug!(?part, "pointer captured");
        Some(CaptureGuard {
            owner: Rc::clone(&self.owner),
            part,
        })
    }

    pub fn owner(&self) -> Option<PickerPart> {
        self.owner.get()
    }

    pub fn is_captured(&self) -> bool {
        self.owner.get().is_some()
    }
}

/// Proof of an active capture; dropping it releases the capture.
#[derive(Debug)]
pub struct CaptureGuard {
    owner: Rc<Cell<Option<PickerPart>>>,
    part: PickerPart,
}

impl CaptureGuard {
    pub fn part(&self) -> PickerPart {
        self.part
    }
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        self.owner.set(None);
        debug!(part = ?self.part, "pointer released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_and_release_on_drop() {
        let capture = PointerCapture::new();
        assert!(!capture.is_captured());

        let guard = capture.acquire(PickerPart::Hours).unwrap();
        assert_eq!(guard.part(), PickerPart::Hours);
        assert_eq!(capture.owner(), Some(PickerPart::Hours));

        drop(guard);
        assert_eq!(capture.owner(), None);
    }

    #[test]
    fn test_second_acquire_is_refused_while_held() {
        let capture = PointerCapture::new();
        let _guard = capture.acquire(PickerPart::Minutes).unwrap();
        assert!(capture.acquire(PickerPart::Slider).is_none());
        assert_eq!(capture.owner(), Some(PickerPart::Minutes));
    }

    #[test]
    fn test_clones_share_the_slot() {
        let capture = PointerCapture::new();
        let other = capture.clone();
        let guard = other.acquire(PickerPart::Slider).unwrap();
        assert!(capture.is_captured());
        drop(guard);
        assert!(!capture.is_captured());
        assert!(capture.acquire(PickerPart::Hours).is_some());
    }

    #[test]
    fn test_release_happens_on_unwind() {
        let capture = PointerCapture::new();
        let inner = capture.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _guard = inner.acquire(PickerPart::Hours).unwrap();
            panic!("gesture aborted");
        }));
        assert!(result.is_err());
        assert!(!capture.is_captured());
    }
}
