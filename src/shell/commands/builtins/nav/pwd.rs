// Pwd command

use crate::shell::commands::Executable;
use crate::shell::context::ShellContext;
use crate::shell::result::CommandResult;
use anyhow::Result;

pub struct PwdCommand;
impl Executable for PwdCommand {
    fn name(&self) -> &'static str {
        "pwd"
    }

    fn description(&self) -> &'static str {
        "Displays the current directory path."
    }

    fn execute(&self, _args: &[String], ctx: &mut ShellContext) -> Result<CommandResult> {
        Ok(CommandResult::success(ctx.cwd().display().to_string(), None))
    }
}
