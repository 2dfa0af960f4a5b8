use std::collections::HashSet;

use crate::storage::traits::IdentityRepository;

#[derive(Debug, Default, Clone)]
pub struct MemoryIdentityRepository {
    known: HashSet<String>,
}

impl MemoryIdentityRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdentityRepository for MemoryIdentityRepository {
    fn mark_known(&mut self, keys: &[String]) {
        self.known.extend(keys.iter().cloned());
    }

    fn get_unknown(&self, keys: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        keys.iter()
            .filter(|k| !self.known.contains(k.as_str()) && seen.insert(k.as_str()))
            .cloned()
            .collect()
    }

    fn len(&self) -> usize {
        self.known.len()
    }
}
