// Drives command

use crate::shell::commands::Executable;
use crate::shell::context::ShellContext;
use crate::shell::result::{CommandResult, FileEntry};
use anyhow::Result;
use std::path::PathBuf;

pub struct DrivesCommand;
impl Executable for DrivesCommand {
    fn name(&self) -> &'static str {
        "drives"
    }

    fn description(&self) -> &'static str {
        "Lists available logical drives."
    }

    fn execute(&self, _args: &[String], _ctx: &mut ShellContext) -> Result<CommandResult> {
        let items: Vec<FileEntry> = ready_roots().iter().map(|root| FileEntry::from_path(root)).collect();

        if items.is_empty() {
            return Ok(CommandResult::success("No drives available.", Some(items)));
        }
        Ok(CommandResult::success("Available drives:", Some(items)))
    }
}

#[cfg(windows)]
fn ready_roots() -> Vec<PathBuf> {
    // A drive whose root can be stat-ed is mounted and ready.
    (b'A'..=b'Z')
        .map(|letter| PathBuf::from(format!("{}:\\", letter as char)))
        .filter(|root| root.is_dir())
        .collect()
}

#[cfg(not(windows))]
fn ready_roots() -> Vec<PathBuf> {
    let mut roots = match std::fs::read_to_string("/proc/mounts") {
        Ok(content) => parse_mount_points(&content),
        Err(_) => Vec::new(),
    };
    roots.retain(|root| root.is_dir());
    roots.sort();
    roots.dedup();

    if roots.is_empty() {
        let root = PathBuf::from("/");
        if root.is_dir() {
            roots.push(root);
        }
    }
    roots
}

/// Second column of each `/proc/mounts` line, with the kernel's octal
/// escapes (`\040` for space and friends) decoded.
#[cfg(not(windows))]
fn parse_mount_points(content: &str) -> Vec<PathBuf> {
    content
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .map(|raw| PathBuf::from(unescape_octal(raw)))
        .collect()
}

#[cfg(not(windows))]
fn unescape_octal(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 3 < bytes.len() && bytes[i + 1..i + 4].iter().all(|b| (b'0'..=b'7').contains(b)) {
            let value = (bytes[i + 1] - b'0') as u32 * 64 + (bytes[i + 2] - b'0') as u32 * 8 + (bytes[i + 3] - b'0') as u32;
            if let Ok(byte) = u8::try_from(value) {
                out.push(byte);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
