// Del command

use crate::shell::commands::Executable;
use crate::shell::commands::builtins::common::resolve_path;
use crate::shell::context::ShellContext;
use crate::shell::result::CommandResult;
use anyhow::{Result, Context};
use std::fs;

pub struct DelCommand;
impl Executable for DelCommand {
    fn name(&self) -> &'static str {
        "del"
    }

    fn description(&self) -> &'static str {
        "Deletes files or directories. Usage: del <path>."
    }

    fn execute(&self, args: &[String], ctx: &mut ShellContext) -> Result<CommandResult> {
        let Some(path_str) = args.first() else {
            return Ok(CommandResult::failure("Usage: del <path>"));
        };

        let target = resolve_path(ctx.cwd(), path_str)?;
        // symlink_metadata: a link is removed itself, never its target.
        let Ok(metadata) = fs::symlink_metadata(&target) else {
            return Ok(CommandResult::failure(format!("Path '{}' not found.", target.display())));
        };

        if metadata.is_dir() {
            fs::remove_dir_all(&target)
                .with_context(|| format!("Failed to remove directory: {}", target.display()))?;
        } else {
            fs::remove_file(&target)
                .with_context(|| format!("Failed to remove file: {}", target.display()))?;
        }

        Ok(CommandResult::success(format!("Deleted '{}'.", target.display()), None))
    }
}
