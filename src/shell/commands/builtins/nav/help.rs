// Help command

use crate::shell::commands::Executable;
use crate::shell::context::ShellContext;
use crate::shell::result::CommandResult;
use anyhow::Result;

pub struct HelpCommand;
impl Executable for HelpCommand {
    fn name(&self) -> &'static str {
        "help"
    }

    fn description(&self) -> &'static str {
        "Displays available commands."
    }

    fn execute(&self, _args: &[String], ctx: &mut ShellContext) -> Result<CommandResult> {
        let mut commands = ctx.registry().list_all();
        commands.sort_by_key(|c| c.name());

        let mut output = String::from("Available commands:");
        for command in commands {
            output.push_str(&format!("\n - {}: {}", command.name(), command.description()));
        }

        Ok(CommandResult::success(output, None))
    }
}
