use crate::classify::classify;
use crate::config::Settings;
use crate::device::{DeviceBackend, DeviceHandle, WaitOutcome};
use crate::dispatch::{self, CommandRunner};
use crate::error::{PowermateError, Result};
use crate::knob::{KnobAction, KnobStateMachine};
use crate::led::{OverlayState, DEFAULT_BRIGHTNESS};
use std::thread::sleep;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Delay between failed open attempts. Fixed, no backoff growth and no
/// attempt limit: this daemon runs unattended with nobody to give up to.
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// The daemon's control loop and all of its mutable state: device handle,
/// overlay flags, press state. Single-threaded by design; each iteration
/// flows Device Connection → Event Classifier → Knob State Machine →
/// {LED Policy, Command Dispatcher}.
pub struct PowermateDaemon<B: DeviceBackend, R: CommandRunner> {
    settings: Settings,
    backend: B,
    runner: R,
    knob: KnobStateMachine,
    overlay: OverlayState,
    handle: Option<B::Handle>,
    reconnect_delay: Duration,
}

impl<B: DeviceBackend, R: CommandRunner> PowermateDaemon<B, R> {
    pub fn new(settings: Settings, backend: B, runner: R) -> Self {
        let knob = KnobStateMachine::new(
            settings.long_press_duration(),
            settings.long_press_enabled(),
        );
        Self {
            settings,
            backend,
            runner,
            knob,
            overlay: OverlayState::default(),
            handle: None,
            reconnect_delay: RECONNECT_DELAY,
        }
    }

    /// One early connection attempt so open problems surface on the terminal
    /// before the process forks away from it. Failure is fine; the control
    /// loop keeps retrying.
    pub fn probe(&mut self) {
        match self.backend.open(&self.settings.dev) {
            Ok(mut handle) => {
                info!("Device connected!");
                self.refresh_led(&mut handle);
                self.handle = Some(handle);
            }
            Err(e) => {
                warn!("Could not open {}: {}", self.settings.dev, e);
                warn!("Don't worry, it will be opened automatically once it appears.");
            }
        }
    }

    /// Run until the readiness wait itself fails. Every other failure mode
    /// (open, read, LED write, command exit) is recovered locally.
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.step()?;
        }
    }

    fn step(&mut self) -> Result<()> {
        let mut handle = match self.handle.take() {
            Some(handle) => handle,
            None => self.reconnect(),
        };

        let timeout = self.knob.timeout(Instant::now());
        let outcome = match handle.wait(timeout) {
            Ok(outcome) => outcome,
            Err(source) => return Err(PowermateError::Wait(source)),
        };

        // Deadline first: one wake-up can carry both an expired long-press
        // timer and pending input (or a disconnect).
        if let Some(action) = self.knob.poll_deadline(Instant::now()) {
            self.apply(action, &mut handle);
        }

        if outcome == WaitOutcome::Ready {
            match handle.read_events() {
                Ok(events) => {
                    let now = Instant::now();
                    for event in &events {
                        if let Some(input) = classify(event) {
                            if let Some(action) = self.knob.handle(input, now) {
                                self.apply(action, &mut handle);
                            }
                        }
                    }
                }
                Err(_) => {
                    info!("Device disappeared!");
                    // Drop the dead handle; the next step reconnects.
                    return Ok(());
                }
            }
        }

        self.handle = Some(handle);
        Ok(())
    }

    /// Reopen the device, retrying at a fixed interval until it appears.
    fn reconnect(&mut self) -> B::Handle {
        loop {
            info!("Attempting to open {}", self.settings.dev);
            match self.backend.open(&self.settings.dev) {
                Ok(mut handle) => {
                    info!("Device connected!");
                    // The kernel driver reset the LED to its own default on
                    // connect; bring it back in line with the overlay state.
                    self.refresh_led(&mut handle);
                    return handle;
                }
                Err(e) => {
                    warn!("Open failed: {}", e);
                    sleep(self.reconnect_delay);
                }
            }
        }
    }

    fn apply(&mut self, action: KnobAction, handle: &mut B::Handle) {
        match action {
            KnobAction::RotateClockwise => {
                dispatch::dispatch(&mut self.runner, self.settings.clock_wise_command.as_deref());
            }
            KnobAction::RotateCounterClockwise => {
                dispatch::dispatch(
                    &mut self.runner,
                    self.settings.counter_clock_wise_command.as_deref(),
                );
            }
            KnobAction::Click => {
                dispatch::dispatch(&mut self.runner, self.settings.knob_command.as_deref());
            }
            KnobAction::LongPress => {
                match self.settings.long_press_command.as_deref() {
                    None => {
                        self.overlay.movie_mode = !self.overlay.movie_mode;
                        info!("Movie mode: {}", self.overlay.movie_mode);
                    }
                    Some(command) => dispatch::dispatch(&mut self.runner, Some(command)),
                }
                self.refresh_led(handle);
            }
        }
    }

    fn refresh_led(&self, handle: &mut B::Handle) {
        let value = self.overlay.effective_value(DEFAULT_BRIGHTNESS);
        if let Err(e) = handle.write_led(value) {
            // Non-fatal: the value is simply not reflected on-device until
            // the next successful write.
            warn!("LED write failed: {}", e);
        }
    }
}
