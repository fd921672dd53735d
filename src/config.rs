use crate::error::{PowermateError, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn};

const CONFIG_FILE_NAME: &str = "powermate.toml";
const SYSTEM_CONFIG_PATH: &str = "/etc/powermate.toml";

/// Immutable settings bundle supplied to the daemon at startup.
///
/// The four command strings are optional, and absent is not the same as
/// empty: an unset `long_press_command` leaves the long press toggling movie
/// mode, while an empty one disables long-press detection entirely.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Settings {
    /// Device node for the knob.
    pub dev: String,

    /// Detach from the terminal after startup.
    pub daemonize: bool,

    /// Run on click (press released before the long-press threshold).
    pub knob_command: Option<String>,

    /// Run on long press. Empty string disables long-press detection.
    pub long_press_command: Option<String>,

    /// Run on clockwise rotation.
    pub clock_wise_command: Option<String>,

    /// Run on counter-clockwise rotation.
    pub counter_clock_wise_command: Option<String>,

    /// Hold duration in milliseconds before a press counts as a long press.
    pub long_press_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dev: "/dev/input/powermate".to_string(),
            daemonize: false,
            knob_command: None,
            long_press_command: None,
            clock_wise_command: None,
            counter_clock_wise_command: None,
            long_press_ms: 1000,
        }
    }
}

impl Settings {
    /// Load settings, resolving the config path in order: explicit `-c`
    /// path, then `$XDG_CONFIG_HOME`/`$HOME/.config`, then `/etc`. A missing
    /// file (other than an explicit one) just means defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let Some(path) = resolve_config_path(explicit)? else {
            return Ok(Self::default());
        };
        info!("Loading config from {}", path.display());

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) => {
                error!("Failed to read {}: {}", path.display(), e);
                return Ok(Self::default());
            }
        };
        Ok(Self::parse(&raw))
    }

    /// Parse TOML with per-key fallback: a key of the wrong type is dropped
    /// with a warning and its default applies, without discarding the rest
    /// of the file. A file that does not parse at all yields defaults.
    pub fn parse(raw: &str) -> Self {
        let mut table = match raw.parse::<toml::Table>() {
            Ok(table) => table,
            Err(e) => {
                error!("Config parse error: {}", e);
                return Self::default();
            }
        };
        scrub_bad_keys(&mut table);
        match table.try_into() {
            Ok(settings) => settings,
            Err(e) => {
                // Scrubbing covers every recognized key, so this only fires
                // if the schema and the scrub table drift apart.
                error!("Config error: {}", e);
                Self::default()
            }
        }
    }

    pub fn long_press_duration(&self) -> Duration {
        Duration::from_millis(self.long_press_ms)
    }

    /// The long-press timeout is armed unless the command is present and
    /// empty.
    pub fn long_press_enabled(&self) -> bool {
        self.long_press_command.as_deref() != Some("")
    }
}

#[derive(Clone, Copy)]
enum Expected {
    Str,
    Bool,
    NonNegativeInt,
}

impl Expected {
    fn describe(self) -> &'static str {
        match self {
            Expected::Str => "a string",
            Expected::Bool => "a boolean",
            Expected::NonNegativeInt => "a non-negative integer",
        }
    }

    fn matches(self, value: &toml::Value) -> bool {
        match (self, value) {
            (Expected::Str, toml::Value::String(_)) => true,
            (Expected::Bool, toml::Value::Boolean(_)) => true,
            (Expected::NonNegativeInt, toml::Value::Integer(n)) => *n >= 0,
            _ => false,
        }
    }
}

const RECOGNIZED_KEYS: &[(&str, Expected)] = &[
    ("dev", Expected::Str),
    ("daemonize", Expected::Bool),
    ("knob_command", Expected::Str),
    ("long_press_command", Expected::Str),
    ("clock_wise_command", Expected::Str),
    ("counter_clock_wise_command", Expected::Str),
    ("long_press_ms", Expected::NonNegativeInt),
];

fn scrub_bad_keys(table: &mut toml::Table) {
    for (key, expected) in RECOGNIZED_KEYS {
        if let Some(value) = table.get(*key) {
            if !expected.matches(value) {
                warn!("Bad value in '{}', expected {}.", key, expected.describe());
                table.remove(*key);
            }
        }
    }
}

fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        // An explicitly requested file that is not there is a startup error,
        // unlike the search paths below which simply fall through.
        return match fs::metadata(path) {
            Ok(_) => Ok(Some(path.to_path_buf())),
            Err(e) => Err(PowermateError::config(format!(
                "Could not access {}: {}",
                path.display(),
                e
            ))),
        };
    }

    let mut checked = Vec::new();
    if let Some(dir) = config_home() {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Ok(Some(candidate));
        }
        checked.push(candidate);
    }
    let system = PathBuf::from(SYSTEM_CONFIG_PATH);
    if system.is_file() {
        return Ok(Some(system));
    }
    checked.push(system);

    info!("Config file not found, using defaults. Checked the following paths:");
    for path in &checked {
        info!("- {}", path.display());
    }
    Ok(None)
}

fn config_home() -> Option<PathBuf> {
    env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
}
