// Search command

use crate::shell::commands::Executable;
use crate::shell::commands::builtins::common::resolve_path;
use crate::shell::context::ShellContext;
use crate::shell::result::{CommandResult, FileEntry};
use anyhow::{Result, Context};
use glob::{MatchOptions, Pattern};
use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub struct SearchCommand;
impl Executable for SearchCommand {
    fn name(&self) -> &'static str {
        "search"
    }

    fn description(&self) -> &'static str {
        "Searches for files or directories. Usage: search <pattern> [path]."
    }

    fn execute(&self, args: &[String], ctx: &mut ShellContext) -> Result<CommandResult> {
        let Some(pattern_str) = args.first() else {
            return Ok(CommandResult::failure("Usage: search <pattern> [path]"));
        };

        let pattern = Pattern::new(pattern_str)
            .with_context(|| format!("Invalid search pattern '{}'", pattern_str))?;
        let start = match args.get(1) {
            Some(path_str) => resolve_path(ctx.cwd(), path_str)?,
            None => ctx.cwd().to_path_buf(),
        };
        if !start.is_dir() {
            return Ok(CommandResult::failure(format!("Directory '{}' not found.", start.display())));
        }

        let options = MatchOptions {
            case_sensitive: !cfg!(windows),
            require_literal_separator: false,
            require_literal_leading_dot: false,
        };

        let mut walk = Walk::new(&pattern, options);
        walk.visit(&start)
            .with_context(|| format!("Failed to read directory: {}", start.display()))?;
        walk.drain();
        let results = walk.found;

        Ok(CommandResult::success(
            format!("Found {} item(s).", results.len()),
            Some(results),
        ))
    }
}

/// Breadth-first walk state. Only the starting directory has to be readable;
/// anything below it that cannot be read is skipped.
struct Walk<'a> {
    pattern: &'a Pattern,
    options: MatchOptions,
    queue: VecDeque<PathBuf>,
    found: Vec<FileEntry>,
}

impl<'a> Walk<'a> {
    fn new(pattern: &'a Pattern, options: MatchOptions) -> Self {
        Self {
            pattern,
            options,
            queue: VecDeque::new(),
            found: Vec::new(),
        }
    }

    /// Matches the entries of `dir` and queues its subdirectories.
    fn visit(&mut self, dir: &Path) -> io::Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::debug!("search: skipping an entry of {}: {}", dir.display(), e);
                    continue;
                }
            };
            let path = entry.path();

            if self.pattern.matches_with(&entry.file_name().to_string_lossy(), self.options) {
                self.found.push(FileEntry::from_path(&path));
            }
            // file_type() does not follow symlinks, so link cycles are never walked.
            if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                self.queue.push_back(path);
            }
        }
        Ok(())
    }

    fn drain(&mut self) {
        while let Some(dir) = self.queue.pop_front() {
            if let Err(e) = self.visit(&dir) {
                log::debug!("search: skipping {}: {}", dir.display(), e);
            }
        }
    }
}
