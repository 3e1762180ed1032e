//! Command index - which cog owns which command name

use std::collections::HashMap;

/// Authoritative command name -> owning cog id mapping.
///
/// At most one owner per name. A second owner is refused, never overwrites.
#[derive(Debug, Default)]
pub struct CommandIndex {
    owners: HashMap<String, String>,
}

impl CommandIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `owner_id` as owner of `name`. False if another cog owns it.
    pub fn register(&mut self, name: &str, owner_id: &str) -> bool {
        match self.owners.get(name) {
            Some(current) if current != owner_id => false,
            Some(_) => true,
            None => {
                self.owners.insert(name.to_string(), owner_id.to_string());
                true
            }
        }
    }

    /// Drop every name owned by `owner_id`, returning how many were removed
    pub fn unregister_all_owned_by(&mut self, owner_id: &str) -> usize {
        let before = self.owners.len();
        self.owners.retain(|_, owner| owner != owner_id);
        before - self.owners.len()
    }

    pub fn resolve_owner(&self, name: &str) -> Option<&str> {
        self.owners.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_resolve() {
        let mut index = CommandIndex::new();
        assert!(index.register("balance", "economy"));
        assert_eq!(index.resolve_owner("balance"), Some("economy"));
        assert_eq!(index.resolve_owner("kick"), None);
    }

    #[test]
    fn test_collision_is_refused_without_mutation() {
        let mut index = CommandIndex::new();
        index.register("info", "template");
        assert!(!index.register("info", "economy"));
        assert_eq!(index.resolve_owner("info"), Some("template"));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_unregister_only_touches_owner() {
        let mut index = CommandIndex::new();
        index.register("balance", "economy");
        index.register("daily", "economy");
        index.register("kick", "moderation");

        assert_eq!(index.unregister_all_owned_by("economy"), 2);
        assert_eq!(index.resolve_owner("balance"), None);
        assert_eq!(index.resolve_owner("kick"), Some("moderation"));
        assert_eq!(index.unregister_all_owned_by("economy"), 0);
        assert_eq!(index.unregister_all_owned_by("nobody"), 0);
    }
}
