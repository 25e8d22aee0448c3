// Copy command

use crate::shell::commands::Executable;
use crate::shell::commands::builtins::common::{copy_dir_recursive, resolve_path, same_entry};
use crate::shell::context::ShellContext;
use crate::shell::result::CommandResult;
use anyhow::{Result, Context};
use std::fs;

pub struct CopyCommand;
impl Executable for CopyCommand {
    fn name(&self) -> &'static str {
        "copy"
    }

    fn description(&self) -> &'static str {
        "Copies files or directories. Usage: copy <source> <destination>."
    }

    fn execute(&self, args: &[String], ctx: &mut ShellContext) -> Result<CommandResult> {
        if args.len() < 2 {
            return Ok(CommandResult::failure("Usage: copy <source> <destination>"));
        }

        let source = resolve_path(ctx.cwd(), &args[0])?;
        let destination = resolve_path(ctx.cwd(), &args[1])?;

        if source.is_dir() {
            if destination.starts_with(&source) {
                return Ok(CommandResult::failure(format!(
                    "Cannot copy '{}' into itself.",
                    source.display()
                )));
            }
            copy_dir_recursive(&source, &destination).with_context(|| {
                format!("Failed to copy {} to {}", source.display(), destination.display())
            })?;
        } else if source.is_file() {
            if same_entry(&source, &destination) {
                return Ok(CommandResult::failure(format!(
                    "'{}' and '{}' are the same file.",
                    source.display(),
                    destination.display()
                )));
            }
            if let Some(parent) = destination.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
            fs::copy(&source, &destination).with_context(|| {
                format!("Failed to copy {} to {}", source.display(), destination.display())
            })?;
        } else {
            return Ok(CommandResult::failure(format!("Source '{}' not found.", source.display())));
        }

        Ok(CommandResult::success(
            format!("Copied '{}' to '{}'.", source.display(), destination.display()),
            None,
        ))
    }
}
