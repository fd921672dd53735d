pub mod background;
pub mod classify;
pub mod config;
pub mod daemon;
pub mod device;
pub mod dispatch;
pub mod error;
pub mod knob;
pub mod led;

pub use classify::{classify, KnobInput};
pub use config::Settings;
pub use daemon::PowermateDaemon;
pub use device::{DeviceBackend, DeviceHandle, EvdevBackend, EvdevKnob, WaitOutcome};
pub use dispatch::{dispatch, CommandRunner, ShellRunner};
pub use error::{Disconnected, PowermateError, Result};
pub use knob::{KnobAction, KnobStateMachine};
pub use led::{OverlayState, DEFAULT_BRIGHTNESS};
