/// Command registry: name → descriptor, populated once at startup.
use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::handlers::{DiceCommand, HelpCommand, WhoisCommand};
use crate::types::CommandDescriptor;

/// The fixed set of commands every bot loads.
pub fn builtin_commands() -> Vec<CommandDescriptor> {
    vec![
        CommandDescriptor::new(
            "dice",
            "Roll a number of dice, either with no argument for 1 d6, \
             one argument for a number of dice between 1 and 10 or with 2 arguments \
             to define the dices' sides. (2, 3, 4, 6, 8, 10, 12, 20, 100)",
            Arc::new(DiceCommand),
        ),
        CommandDescriptor::new(
            "help",
            "List all commands, or show the description of one command.",
            Arc::new(HelpCommand),
        ),
        CommandDescriptor::new(
            "whois",
            "Get information on a certain user.",
            Arc::new(WhoisCommand),
        ),
    ]
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Read-only after startup; lookups need no locking.
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    commands: HashMap<String, CommandDescriptor>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding [`builtin_commands`].
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for descriptor in builtin_commands() {
            registry.register(descriptor);
        }
        registry
    }

    /// Add a command. A duplicate name replaces the earlier entry.
    pub fn register(&mut self, descriptor: CommandDescriptor) -> Option<CommandDescriptor> {
        let name = descriptor.name.clone();
        let replaced = self.commands.insert(name.clone(), descriptor);
        if replaced.is_some() {
            debug!(command = %name, "Replaced command registration");
        } else {
            debug!(command = %name, "Registered command");
        }
        replaced
    }

    pub fn get(&self, name: &str) -> Option<&CommandDescriptor> {
        self.commands.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// All commands sorted by name.
    pub fn all(&self) -> Vec<&CommandDescriptor> {
        let mut all: Vec<_> = self.commands.values().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_registered() {
        let registry = CommandRegistry::with_builtins();
        assert!(registry.has("dice"));
        assert!(registry.has("whois"));
        assert!(registry.has("help"));
        assert!(!registry.has("ping"));
        let names: Vec<_> = registry.all().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["dice", "help", "whois"]);
    }

    #[test]
    fn duplicate_name_last_write_wins() {
        let mut registry = CommandRegistry::new();
        assert!(registry
            .register(CommandDescriptor::new("roll", "first", Arc::new(DiceCommand)))
            .is_none());
        let replaced = registry
            .register(CommandDescriptor::new("roll", "second", Arc::new(WhoisCommand)))
            .unwrap();

        assert_eq!(replaced.description, "first");
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("roll").unwrap().description, "second");
    }

    #[test]
    fn lookup_is_exact() {
        let registry = CommandRegistry::with_builtins();
        assert!(registry.get("Dice").is_none());
        assert!(registry.get("").is_none());
    }
}
