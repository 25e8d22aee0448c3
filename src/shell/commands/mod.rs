pub mod builtins;
pub mod registry;

use crate::shell::context::ShellContext;
use crate::shell::result::CommandResult;
use anyhow::Result;

pub use registry::CommandRegistry;

/// A named operation over a working directory and an argument list.
///
/// Implementations are stateless unit structs, so one instance can serve
/// every connection at once. Expected failures (bad arguments, missing
/// paths) come back as `Ok(CommandResult::failure(..))`; anything returned as
/// `Err` is folded into a failure by [`run_guarded`].
pub trait Executable: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn execute(&self, args: &[String], ctx: &mut ShellContext) -> Result<CommandResult>;
}

/// Runs a command so that no error escapes past the command boundary.
pub fn run_guarded(command: &dyn Executable, args: &[String], ctx: &mut ShellContext) -> CommandResult {
    match command.execute(args, ctx) {
        Ok(result) => result,
        Err(e) => {
            log::debug!("{} failed: {:#}", command.name(), e);
            CommandResult::failure(format!("{:#}", e))
        }
    }
}
