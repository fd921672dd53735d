use std::process::Command;
use tracing::{info, warn};

/// Executes a configured command string.
///
/// The control loop calls this synchronously on its own thread: a slow
/// command stalls input processing, the LED, and reconnection until it
/// returns. That is a contractual trade-off, not an oversight; this trait is
/// the seam where a spawn-and-forget runner could be substituted without
/// touching the state machine.
pub trait CommandRunner {
    fn run(&mut self, command: &str);
}

/// Runs commands through the host shell and reports non-zero exit statuses.
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    fn run(&mut self, command: &str) {
        info!("Executing: {}", command);
        match Command::new("sh").arg("-c").arg(command).status() {
            Ok(status) if status.success() => {}
            Ok(status) => warn!("Command exited with {}: {}", status, command),
            Err(e) => warn!("Failed to run '{}': {}", command, e),
        }
    }
}

/// Invoke the runner for a configured command; no-op when the setting is
/// absent or an empty string.
pub fn dispatch<R: CommandRunner>(runner: &mut R, command: Option<&str>) {
    if let Some(command) = command {
        if !command.is_empty() {
            runner.run(command);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingRunner {
        commands: Vec<String>,
    }

    impl CommandRunner for RecordingRunner {
        fn run(&mut self, command: &str) {
            self.commands.push(command.to_string());
        }
    }

    #[test]
    fn absent_and_empty_commands_are_no_ops() {
        let mut runner = RecordingRunner::default();
        dispatch(&mut runner, None);
        dispatch(&mut runner, Some(""));
        assert!(runner.commands.is_empty());
    }

    #[test]
    fn configured_command_is_run() {
        let mut runner = RecordingRunner::default();
        dispatch(&mut runner, Some("amixer set Master toggle"));
        assert_eq!(runner.commands, vec!["amixer set Master toggle"]);
    }

    #[test]
    fn shell_runner_survives_failing_commands() {
        // Non-zero exit and spawn are both logged, never propagated.
        let mut runner = ShellRunner;
        runner.run("true");
        runner.run("exit 3");
    }
}
