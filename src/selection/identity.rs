use derive_more::Display;

/// The `(name, size, last_modified)` triple that decides whether two files
/// are the same selection entry. Compared by value, never by origin.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
#[display("{name} ({size} bytes, modified {last_modified})")]
pub struct IdentityKey {
    pub name: String,
    pub size: u64,
    pub last_modified: u64,
}

impl IdentityKey {
    pub fn new(name: impl Into<String>, size: u64, last_modified: u64) -> Self {
        Self {
            name: name.into(),
            size,
            last_modified,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn equal_triples_hash_together() {
        let keys: HashSet<_> = [
            IdentityKey::new("app.log", 10, 1_000),
            IdentityKey::new("app.log", 10, 1_000),
            IdentityKey::new("app.log", 11, 1_000),
            IdentityKey::new("app.log", 10, 1_001),
        ]
        .into_iter()
        .collect();

        assert_eq!(keys.len(), 3);
    }

    #[test]
    fn display_lists_the_triple() {
        let key = IdentityKey::new("app.log", 10, 1_000);
        assert_eq!(key.to_string(), "app.log (10 bytes, modified 1000)");
    }
}
