// Move command

use crate::shell::commands::Executable;
use crate::shell::commands::builtins::common::{copy_dir_recursive, resolve_path, same_entry};
use crate::shell::context::ShellContext;
use crate::shell::result::CommandResult;
use anyhow::{Result, Context};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

pub struct MoveCommand;
impl Executable for MoveCommand {
    fn name(&self) -> &'static str {
        "move"
    }

    fn description(&self) -> &'static str {
        "Moves files or directories. Usage: move <source> <destination>."
    }

    fn execute(&self, args: &[String], ctx: &mut ShellContext) -> Result<CommandResult> {
        if args.len() < 2 {
            return Ok(CommandResult::failure("Usage: move <source> <destination>"));
        }

        let source = resolve_path(ctx.cwd(), &args[0])?;
        let destination = resolve_path(ctx.cwd(), &args[1])?;

        if source.is_dir() {
            if destination.starts_with(&source) || same_entry(&source, &destination) {
                return Ok(CommandResult::failure(format!(
                    "Cannot move '{}' into itself.",
                    source.display()
                )));
            }
            if destination.is_dir() {
                fs::remove_dir_all(&destination)
                    .with_context(|| format!("Failed to remove directory: {}", destination.display()))?;
            }
            move_entry(&source, &destination, true)?;
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
            if destination.is_file() {
                fs::remove_file(&destination)
                    .with_context(|| format!("Failed to remove file: {}", destination.display()))?;
            }
            move_entry(&source, &destination, false)?;
        } else {
            return Ok(CommandResult::failure(format!("Source '{}' not found.", source.display())));
        }

        Ok(CommandResult::success(
            format!("Moved '{}' to '{}'.", source.display(), destination.display()),
            None,
        ))
    }
}

/// `rename`, or copy + delete when source and destination sit on different
/// filesystems.
fn move_entry(source: &Path, destination: &Path, is_dir: bool) -> Result<()> {
    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::CrossesDevices => {
            log::debug!("rename across devices, copying {} instead", source.display());
            if is_dir {
                copy_dir_recursive(source, destination)?;
                fs::remove_dir_all(source)?;
            } else {
                fs::copy(source, destination)?;
                fs::remove_file(source)?;
            }
            Ok(())
        }
        Err(e) => Err(e).with_context(|| {
            format!("Failed to move {} to {}", source.display(), destination.display())
        }),
    }
}
