// Rename command

use crate::shell::commands::Executable;
use crate::shell::commands::builtins::common::{resolve_path, same_entry};
use crate::shell::context::ShellContext;
use crate::shell::result::CommandResult;
use anyhow::Result;
use std::fs;
use std::path::{Component, Path};

pub struct RenameCommand;
impl Executable for RenameCommand {
    fn name(&self) -> &'static str {
        "rename"
    }

    fn description(&self) -> &'static str {
        "Renames a file or directory. Usage: rename <source> <newName>."
    }

    fn execute(&self, args: &[String], ctx: &mut ShellContext) -> Result<CommandResult> {
        if args.len() < 2 {
            return Ok(CommandResult::failure("Usage: rename <source> <newName>"));
        }

        let source = resolve_path(ctx.cwd(), &args[0])?;
        let new_name = &args[1];
        if !is_plain_name(new_name) {
            return Ok(CommandResult::failure(format!(
                "Invalid name '{}': the new name must not contain a path.",
                new_name
            )));
        }
        if !source.exists() {
            return Ok(CommandResult::failure(format!("Path '{}' not found.", source.display())));
        }

        let parent = source.parent().unwrap_or(ctx.cwd()).to_path_buf();
        let destination = parent.join(new_name);
        let message = format!("Renamed '{}' to '{}'.", source.display(), destination.display());

        // Renaming onto itself (possibly a case-only change) must not delete anything.
        if !same_entry(&source, &destination) {
            if let Err(e) = clear_destination(&source, &destination) {
                return Ok(CommandResult::failure(e.to_string()));
            }
        }
        if let Err(e) = fs::rename(&source, &destination) {
            return Ok(CommandResult::failure(e.to_string()));
        }

        Ok(CommandResult::success(message, None))
    }
}

fn is_plain_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}

/// Removes an existing destination of the same kind as `source`.
fn clear_destination(source: &Path, destination: &Path) -> std::io::Result<()> {
    if source.is_file() && destination.is_file() {
        fs::remove_file(destination)
    } else if source.is_dir() && destination.is_dir() {
        fs::remove_dir_all(destination)
    } else {
        Ok(())
    }
}
