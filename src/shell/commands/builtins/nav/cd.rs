// Cd command

use crate::shell::commands::Executable;
use crate::shell::commands::builtins::common::resolve_path;
use crate::shell::context::ShellContext;
use crate::shell::result::CommandResult;
use anyhow::Result;

pub struct CdCommand;
impl Executable for CdCommand {
    fn name(&self) -> &'static str {
        "cd"
    }

    fn description(&self) -> &'static str {
        "Changes the current directory (supports drive switching)."
    }

    fn execute(&self, args: &[String], ctx: &mut ShellContext) -> Result<CommandResult> {
        // No argument: just report where we are.
        let Some(path_str) = args.first() else {
            return Ok(CommandResult::success(ctx.cwd().display().to_string(), None));
        };

        let target = resolve_path(ctx.cwd(), path_str)?;
        if !target.is_dir() {
            return Ok(CommandResult::failure(format!("Directory '{}' not found.", target.display())));
        }

        ctx.change_directory(&target)?;
        Ok(CommandResult::success(
            format!("Current directory: {}", ctx.cwd().display()),
            None,
        ))
    }
}
