pub mod fs;
pub mod nav;
pub mod common; // Path resolution + copy helpers

use crate::shell::commands::CommandRegistry;

/// Helper to register all built-in commands at once
pub fn register_all_builtins(registry: &mut CommandRegistry) {
    // Navigation
    registry.register(Box::new(nav::help::HelpCommand));
    registry.register(Box::new(nav::cd::CdCommand));
    registry.register(Box::new(nav::pwd::PwdCommand));
    registry.register(Box::new(nav::drives::DrivesCommand));

    // FS commands
    registry.register(Box::new(fs::ls::LsCommand));
    registry.register(Box::new(fs::copy::CopyCommand));
    registry.register(Box::new(fs::mv::MoveCommand));
    registry.register(Box::new(fs::del::DelCommand));
    registry.register(Box::new(fs::rename::RenameCommand));
    registry.register(Box::new(fs::search::SearchCommand));
}
