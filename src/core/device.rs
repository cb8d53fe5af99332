//! Capture device capability
//!
//! The measuring core never talks to a camera directly. Anything that can
//! start, stop, and hand over taps or decoded reference codes can drive a
//! session. [`DeviceGuard`] owns the device for the lifetime of a session and
//! releases it exactly once, whichever way the session ends.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::geometry::Point;

/// Errors from acquiring the capture device
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeviceError {
    #[error("Camera unavailable: {reason}. Check permissions and try again")]
    Unavailable { reason: String },
}

/// Something the device reports while running
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    /// The player tapped the video frame
    Tap(Point),
    /// The decoder recognised a reference marker; the payload is opaque
    ReferenceDetected(String),
}

/// A camera plus decoder, or anything that behaves like one
pub trait CaptureDevice {
    /// Acquire the device and begin delivering events
    fn start(&mut self) -> Result<(), DeviceError>;

    /// Release the device
    fn stop(&mut self);

    /// Next pending event, in arrival order
    fn poll_event(&mut self) -> Option<DeviceEvent>;
}

/// Exclusive, scoped ownership of a started device
///
/// Dropping the guard releases the device if [`DeviceGuard::release`] has not
/// already done so.
pub struct DeviceGuard {
    device: Box<dyn CaptureDevice>,
    released: bool,
}

impl DeviceGuard {
    /// Start `device` and take ownership of it
    pub fn acquire(mut device: Box<dyn CaptureDevice>) -> Result<Self, DeviceError> {
        device.start().inspect_err(|e| warn!(error = %e, "camera start failed"))?;
        info!("camera acquired");
        Ok(Self {
            device,
            released: false,
        })
    }

    pub fn poll_event(&mut self) -> Option<DeviceEvent> {
        if self.released {
            return None;
        }
        self.device.poll_event()
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Stop the device; later calls do nothing
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.device.stop();
        info!("camera released");
    }
}

impl Drop for DeviceGuard {
    fn drop(&mut self) {
        if !self.released {
            debug!("releasing camera on drop");
        }
        self.release();
    }
}

impl std::fmt::Debug for DeviceGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceGuard")
            .field("released", &self.released)
            .finish()
    }
}

/// A device driven by a scripted event queue instead of a camera
///
/// Used for replaying recorded sessions and in tests. The paired
/// [`SyntheticFeed`] pushes events and observes start/stop counts.
pub struct SyntheticDevice {
    queue: Rc<RefCell<VecDeque<DeviceEvent>>>,
    starts: Rc<Cell<u32>>,
    stops: Rc<Cell<u32>>,
    unavailable: Option<String>,
}

/// Handle for feeding a [`SyntheticDevice`] after it has been handed over
#[derive(Clone)]
pub struct SyntheticFeed {
    queue: Rc<RefCell<VecDeque<DeviceEvent>>>,
    starts: Rc<Cell<u32>>,
    stops: Rc<Cell<u32>>,
}

impl SyntheticDevice {
    pub fn new() -> (Self, SyntheticFeed) {
        let queue = Rc::new(RefCell::new(VecDeque::new()));
        let starts = Rc::new(Cell::new(0));
        let stops = Rc::new(Cell::new(0));
        let feed = SyntheticFeed {
            queue: Rc::clone(&queue),
            starts: Rc::clone(&starts),
            stops: Rc::clone(&stops),
        };
        let device = Self {
            queue,
            starts,
            stops,
            unavailable: None,
        };
        (device, feed)
    }

    /// A device whose `start` always fails with `reason`
    pub fn unavailable(reason: impl Into<String>) -> (Self, SyntheticFeed) {
        let (mut device, feed) = Self::new();
        device.unavailable = Some(reason.into());
        (device, feed)
    }
}

impl CaptureDevice for SyntheticDevice {
    fn start(&mut self) -> Result<(), DeviceError> {
        if let Some(reason) = &self.unavailable {
            return Err(DeviceError::Unavailable {
                reason: reason.clone(),
            });
        }
        self.starts.set(self.starts.get() + 1);
        Ok(())
    }

    fn stop(&mut self) {
        self.stops.set(self.stops.get() + 1);
    }

    fn poll_event(&mut self) -> Option<DeviceEvent> {
        self.queue.borrow_mut().pop_front()
    }
}

impl SyntheticFeed {
    pub fn push(&self, event: DeviceEvent) {
        self.queue.borrow_mut().push_back(event);
    }

    pub fn tap(&self, x: f64, y: f64) {
        self.push(DeviceEvent::Tap(Point::new(x, y)));
    }

    pub fn detect(&self, payload: impl Into<String>) {
        self.push(DeviceEvent::ReferenceDetected(payload.into()));
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn starts(&self) -> u32 {
        self.starts.get()
    }

    pub fn stops(&self) -> u32 {
        self.stops.get()
    }
}
