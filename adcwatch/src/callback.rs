use std::path::{Path, PathBuf};
use std::process::Command;

use log::trace;

use crate::errors::CallbackError;

/// Invocation side of a value change: hand `(value, min, max)` to whoever
/// needs to react.
pub trait Callback: Send {
    /// Reports a new value together with the configured limits.
    fn notify(&mut self, value: i32, min: i32, max: i32) -> Result<(), CallbackError>;
}

/// Runs an external program with the new value and limits as its three
/// positional arguments, in that order, all in decimal.
#[derive(Debug, Clone)]
pub struct CommandCallback {
    program: PathBuf,
}

impl CommandCallback {
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Callback for CommandCallback {
    /// Spawns the program and waits for it to terminate, so invocations never
    /// overlap. The child's exit status is not inspected.
    fn notify(&mut self, value: i32, min: i32, max: i32) -> Result<(), CallbackError> {
        let status = Command::new(&self.program)
            .arg(value.to_string())
            .arg(min.to_string())
            .arg(max.to_string())
            .status()
            .map_err(|source| CallbackError::SpawnFailed {
                program: self.program.display().to_string(),
                source,
            })?;
        trace!("{} {} {} {} -> {}", self.program.display(), value, min, max, status);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_callback_passes_positional_arguments() {
        // `true` swallows any arguments; what matters is that the spawn+wait
        // path succeeds and the (ignored) exit status does not bubble up.
        let mut callback = CommandCallback::new("true");
        assert!(callback.notify(10, 10, 2047).is_ok());
    }

    #[test]
    fn test_command_callback_ignores_exit_status() {
        let mut callback = CommandCallback::new("false");
        assert!(callback.notify(0, 0, 100).is_ok());
    }

    #[test]
    fn test_command_callback_reports_launch_failure() {
        let mut callback = CommandCallback::new("/nonexistent/program");
        let error = callback.notify(1, 0, 10).unwrap_err();
        assert!(format!("{}", error).starts_with("Failed to launch /nonexistent/program"));
    }
}
