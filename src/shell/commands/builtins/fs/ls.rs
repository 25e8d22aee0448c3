// Ls command

use std::fs;
use crate::shell::commands::Executable;
use crate::shell::commands::builtins::common::resolve_path;
use crate::shell::context::ShellContext;
use crate::shell::result::{CommandResult, FileEntry};
use anyhow::{Result, Context};

pub struct LsCommand;
impl Executable for LsCommand {
    fn name(&self) -> &'static str {
        "ls"
    }

    fn description(&self) -> &'static str {
        "Lists files and directories in the current or specified path."
    }

    fn execute(&self, args: &[String], ctx: &mut ShellContext) -> Result<CommandResult> {
        let path = match args.first() {
            Some(path_str) => resolve_path(ctx.cwd(), path_str)?,
            None => ctx.cwd().to_path_buf(),
        };

        if !path.is_dir() {
            return Ok(CommandResult::failure(format!("Directory '{}' not found.", path.display())));
        }

        let entries = fs::read_dir(&path)
            .with_context(|| format!("Failed to read directory: {}", path.display()))?;

        let mut items = Vec::new();
        for entry in entries {
            // Entries that vanish or cannot be read mid-listing are left out.
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::debug!("ls: skipping an entry of {}: {}", path.display(), e);
                    continue;
                }
            };
            let entry_path = entry.path();
            // Follow symlinks; a dangling one is listed as the link itself.
            let metadata = match fs::metadata(&entry_path).or_else(|_| entry.metadata()) {
                Ok(m) => m,
                Err(e) => {
                    log::debug!("ls: skipping {}: {}", entry_path.display(), e);
                    continue;
                }
            };
            items.push(FileEntry::from_metadata(&entry_path, &metadata));
        }

        // Directories first, then by name.
        items.sort_by(|a, b| {
            b.is_directory
                .cmp(&a.is_directory)
                .then_with(|| a.name.cmp(&b.name))
        });

        Ok(CommandResult::success(format!("Listing for {}", path.display()), Some(items)))
    }
}
