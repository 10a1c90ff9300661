//! The librarian table.

use std::collections::HashMap;

use libreg_types::Identity;

/// Identity -> librarian flag.
///
/// Identities that were never toggled have no entry and read as
/// non-librarians. Writes are crate-private: only the [`crate::Library`]
/// engine flips flags, and only after the gate has accepted the change.
#[derive(Clone, Debug)]
pub struct LibrarianRegistry {
    roles: HashMap<Identity, bool>,
}

impl LibrarianRegistry {
    /// A registry whose only librarian is `creator`.
    pub fn genesis(creator: Identity) -> Self {
        let mut roles = HashMap::new();
        roles.insert(creator, true);
        Self { roles }
    }

    /// Whether `identity` currently holds the librarian role.
    pub fn is_librarian(&self, identity: &Identity) -> bool {
        self.roles.get(identity).copied().unwrap_or(false)
    }

    /// All current librarians, sorted.
    pub fn librarians(&self) -> Vec<Identity> {
        let mut out: Vec<Identity> = self
            .roles
            .iter()
            .filter(|(_, is_librarian)| **is_librarian)
            .map(|(id, _)| id.clone())
            .collect();
        out.sort();
        out
    }

    /// Flip the flag for `identity` and return the new value.
    pub(crate) fn toggle(&mut self, identity: &Identity) -> bool {
        let flag = self.roles.entry(identity.clone()).or_insert(false);
        *flag = !*flag;
        *flag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genesis_creator_is_only_librarian() {
        let head = Identity::from_label("head");
        let registry = LibrarianRegistry::genesis(head.clone());
        assert!(registry.is_librarian(&head));
        assert_eq!(registry.librarians(), vec![head]);
    }

    #[test]
    fn unknown_identities_are_not_librarians() {
        let registry = LibrarianRegistry::genesis(Identity::from_label("head"));
        assert!(!registry.is_librarian(&Identity::from_label("stranger")));
    }

    #[test]
    fn toggle_is_an_involution() {
        let mut registry = LibrarianRegistry::genesis(Identity::from_label("head"));
        let clerk = Identity::from_label("clerk");
        assert!(registry.toggle(&clerk));
        assert!(registry.is_librarian(&clerk));
        assert!(!registry.toggle(&clerk));
        assert!(!registry.is_librarian(&clerk));
    }

    #[test]
    fn demoted_identities_are_not_listed() {
        let head = Identity::from_label("head");
        let mut registry = LibrarianRegistry::genesis(head.clone());
        registry.toggle(&head);
        assert!(registry.librarians().is_empty());
    }
}
