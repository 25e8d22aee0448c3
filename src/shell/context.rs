use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use crate::shell::ast::ParsedCommand;
use crate::shell::commands::{CommandRegistry, run_guarded};
use crate::shell::commands::builtins::common::normalize;
use crate::shell::error::ShellError;
use crate::shell::parser::parse_command_line;
use crate::shell::result::CommandResult;

/// Interaction mode of a context. Only one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShellState {
    /// Plain command dispatch by name.
    #[default]
    Browsing,
}

impl ShellState {
    fn handle(self, ctx: &mut ShellContext, command: &ParsedCommand) -> CommandResult {
        match self {
            ShellState::Browsing => {
                let Some(executable) = ctx.registry.create(&command.name) else {
                    return CommandResult::failure(format!(
                        "Unknown command '{}'. Type 'help' to list available commands.",
                        command.name
                    ));
                };
                run_guarded(executable.as_ref(), &command.args, ctx)
            }
        }
    }
}

/// Per-session interpreter state: the working directory, the active
/// [`ShellState`], and a handle to the process-wide command table.
#[derive(Clone)]
pub struct ShellContext {
    cwd: PathBuf,
    state: ShellState,
    registry: Arc<CommandRegistry>,
}

impl ShellContext {
    /// Starts in the process working directory.
    pub fn new(registry: Arc<CommandRegistry>) -> Result<Self, ShellError> {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::with_dir(cwd, registry)
    }

    pub fn with_dir(start: impl AsRef<Path>, registry: Arc<CommandRegistry>) -> Result<Self, ShellError> {
        let start = std::path::absolute(start.as_ref())
            .map(|p| normalize(&p))
            .map_err(|_| ShellError::InvalidPath)?;
        if !start.is_dir() {
            return Err(ShellError::DirectoryNotFound(start.display().to_string()));
        }

        Ok(Self {
            cwd: start,
            state: ShellState::default(),
            registry,
        })
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    #[cfg(test)]
    pub fn state(&self) -> ShellState {
        self.state
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Parses and runs one input line. Never panics and never returns an
    /// error: every problem comes back as a failed [`CommandResult`].
    pub fn execute(&mut self, input: &str) -> CommandResult {
        match panic::catch_unwind(AssertUnwindSafe(|| self.dispatch(input))) {
            Ok(result) => result,
            Err(payload) => {
                log::error!("Command '{}' panicked", input);
                CommandResult::failure(panic_message(payload.as_ref()))
            }
        }
    }

    fn dispatch(&mut self, input: &str) -> CommandResult {
        let parsed = match parse_command_line(input) {
            Ok(parsed) => parsed,
            Err(e) => return CommandResult::failure(e.to_string()),
        };
        if parsed.is_empty() {
            return CommandResult::failure("Command cannot be empty.");
        }

        let state = self.state;
        state.handle(self, &parsed)
    }

    /// Replaces the working directory. Relative paths are taken against the
    /// current one. The target must exist now; it is not re-checked later.
    pub fn change_directory(&mut self, path: impl AsRef<Path>) -> Result<(), ShellError> {
        let path = path.as_ref();
        let target = if path.is_absolute() {
            normalize(path)
        } else {
            normalize(&self.cwd.join(path))
        };

        if !target.is_dir() {
            return Err(ShellError::DirectoryNotFound(target.display().to_string()));
        }
        self.cwd = target;
        Ok(())
    }

    #[cfg(test)]
    pub fn change_state(&mut self, state: ShellState) {
        self.state = state;
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Command failed unexpectedly.".to_string()
    }
}
