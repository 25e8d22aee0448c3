use std::collections::HashMap;
use std::sync::Arc;
use crate::shell::commands::Executable;
use crate::shell::commands::builtins::register_all_builtins;

/// Name -> command table. Built once at startup, then shared read-only
/// (behind an `Arc`) by every execution context.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Arc<dyn Executable>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        register_all_builtins(&mut registry);
        registry
    }

    /// Inserts or replaces by case-insensitive name.
    pub fn register(&mut self, command: Box<dyn Executable>) {
        self.commands.insert(command.name().to_lowercase(), Arc::from(command));
    }

    /// Commands carry no per-call state, so handing out a shared handle is
    /// as good as a private copy.
    pub fn create(&self, name: &str) -> Option<Arc<dyn Executable>> {
        self.commands.get(&name.to_lowercase()).cloned()
    }

    /// Every registered command, in no particular order.
    pub fn list_all(&self) -> Vec<Arc<dyn Executable>> {
        self.commands.values().cloned().collect()
    }
}
