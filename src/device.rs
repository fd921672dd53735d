use crate::error::Disconnected;
use evdev::{Device, EventType, InputEvent, MiscType};
use std::io;
use std::os::unix::io::AsRawFd;
use std::time::Duration;
use tracing::{debug, warn};

/// Result of a readiness wait on the device fd.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Ready,
    TimedOut,
}

/// An open device. Exclusively owned; dropped on disconnect and replaced by
/// a fresh open.
pub trait DeviceHandle {
    /// Block until the device has input or the timeout elapses. `None`
    /// blocks indefinitely. An `Err` here means the wait primitive itself
    /// failed and the control loop cannot proceed safely.
    fn wait(&mut self, timeout: Option<Duration>) -> io::Result<WaitOutcome>;

    /// Drain the events queued on the device. Any read failure is a
    /// disconnect, never a transient condition.
    fn read_events(&mut self) -> Result<Vec<InputEvent>, Disconnected>;

    /// Write a brightness value to the pulse LED.
    fn write_led(&mut self, value: i32) -> io::Result<()>;
}

/// Opens device handles by path.
pub trait DeviceBackend {
    type Handle: DeviceHandle;

    fn open(&mut self, path: &str) -> io::Result<Self::Handle>;
}

/// The real evdev-backed knob device.
pub struct EvdevKnob {
    device: Device,
}

impl EvdevKnob {
    pub fn open(path: &str) -> io::Result<Self> {
        let device = Device::open(path)?;
        debug!(
            "Opened {} ({})",
            path,
            device.name().unwrap_or("unknown device")
        );

        // The PowerMate exposes EV_REL + EV_KEY for input and EV_MSC for the
        // LED. Anything else still works as far as reading goes, so only warn.
        let supported = device.supported_events();
        if !supported.contains(EventType::RELATIVE) || !supported.contains(EventType::KEY) {
            warn!("{} does not look like a rotary knob device", path);
        }
        if !supported.contains(EventType::MISC) {
            warn!("{} has no pulse LED; brightness writes will fail", path);
        }

        Ok(Self { device })
    }
}

impl DeviceHandle for EvdevKnob {
    fn wait(&mut self, timeout: Option<Duration>) -> io::Result<WaitOutcome> {
        let mut fds = [libc::pollfd {
            fd: self.device.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        }];
        let ret = unsafe { libc::poll(fds.as_mut_ptr(), 1, poll_timeout_ms(timeout)) };
        match ret {
            -1 => Err(io::Error::last_os_error()),
            0 => Ok(WaitOutcome::TimedOut),
            _ => Ok(WaitOutcome::Ready),
        }
    }

    fn read_events(&mut self) -> Result<Vec<InputEvent>, Disconnected> {
        match self.device.fetch_events() {
            Ok(events) => Ok(events.collect()),
            Err(e) => {
                debug!("Read failed, treating as disconnect: {}", e);
                Err(Disconnected)
            }
        }
    }

    fn write_led(&mut self, value: i32) -> io::Result<()> {
        let event = InputEvent::new(EventType::MISC, MiscType::MSC_PULSELED.0, value);
        self.device.send_events(&[event])
    }
}

/// Backend producing [`EvdevKnob`] handles.
pub struct EvdevBackend;

impl DeviceBackend for EvdevBackend {
    type Handle = EvdevKnob;

    fn open(&mut self, path: &str) -> io::Result<EvdevKnob> {
        EvdevKnob::open(path)
    }
}

/// poll(2) takes milliseconds; round partial milliseconds up so a deadline
/// is never woken before it can actually fire. -1 blocks indefinitely.
fn poll_timeout_ms(timeout: Option<Duration>) -> libc::c_int {
    match timeout {
        Some(t) => {
            let mut ms = t.as_millis();
            if t.as_nanos() % 1_000_000 != 0 {
                ms += 1;
            }
            ms.min(libc::c_int::MAX as u128) as libc::c_int
        }
        None => -1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_timeout_blocks_forever_without_deadline() {
        assert_eq!(poll_timeout_ms(None), -1);
    }

    #[test]
    fn poll_timeout_rounds_partial_milliseconds_up() {
        assert_eq!(poll_timeout_ms(Some(Duration::ZERO)), 0);
        assert_eq!(poll_timeout_ms(Some(Duration::from_millis(250))), 250);
        assert_eq!(poll_timeout_ms(Some(Duration::from_micros(1))), 1);
        assert_eq!(poll_timeout_ms(Some(Duration::from_micros(1500))), 2);
    }

    #[test]
    fn poll_timeout_saturates_on_huge_durations() {
        let huge = Duration::from_secs(u64::MAX);
        assert_eq!(poll_timeout_ms(Some(huge)), libc::c_int::MAX);
    }
}
