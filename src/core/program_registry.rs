use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::core::constants::DEFAULT_EXCHANGES;

static DEFAULT_REGISTRY: Lazy<ProgramRegistry> = Lazy::new(|| {
    ProgramRegistry::from_entries(
        DEFAULT_EXCHANGES
            .iter()
            .map(|(name, ids)| (name.to_string(), ids.iter().map(|id| id.to_string()).collect())),
    )
});

/// Allow-list of exchange programs. One exchange may own several program ids
/// and one id may be listed under several exchanges.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProgramRegistry {
    exchanges: Vec<(String, Vec<String>)>,
    // program id -> exchange names, in registration order
    by_program: HashMap<String, Vec<String>>,
}

impl ProgramRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        let mut registry = Self::empty();
        for (name, ids) in entries {
            registry.insert(name, ids);
        }
        registry
    }

    /// Shared instance built from the built-in exchange table.
    pub fn builtin() -> &'static ProgramRegistry {
        &DEFAULT_REGISTRY
    }

    /// Returns a copy of `self` with `extra` merged in. Used while assembling
    /// configuration; the result is not modified afterwards.
    pub fn extended<I>(&self, extra: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        let mut registry = self.clone();
        for (name, ids) in extra {
            registry.insert(name, ids);
        }
        registry
    }

    fn insert(&mut self, name: String, ids: Vec<String>) {
        let position = match self.exchanges.iter().position(|(existing, _)| *existing == name) {
            Some(position) => position,
            None => {
                self.exchanges.push((name.clone(), Vec::new()));
                self.exchanges.len() - 1
            }
        };

        for id in ids {
            if id.is_empty() {
                continue;
            }
            let owned = &mut self.exchanges[position].1;
            if !owned.contains(&id) {
                owned.push(id.clone());
            }
            let names = self.by_program.entry(id).or_default();
            if !names.contains(&name) {
                names.push(name.clone());
            }
        }
    }

    pub fn contains(&self, program_id: &str) -> bool {
        self.by_program.contains_key(program_id)
    }

    pub fn exchanges_for(&self, program_id: &str) -> &[String] {
        self.by_program
            .get(program_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn program_ids_for(&self, exchange: &str) -> &[String] {
        self.exchanges
            .iter()
            .find(|(name, _)| name == exchange)
            .map(|(_, ids)| ids.as_slice())
            .unwrap_or(&[])
    }

    pub fn exchanges(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.exchanges
            .iter()
            .map(|(name, ids)| (name.as_str(), ids.as_slice()))
    }

    /// Every registered id once, in registration order.
    pub fn program_ids(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::with_capacity(self.by_program.len());
        for (_, ids) in &self.exchanges {
            for id in ids {
                if !out.contains(&id.as_str()) {
                    out.push(id);
                }
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.by_program.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_program.is_empty()
    }
}
