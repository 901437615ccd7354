//! Alias → canonical name mapping

use crate::errors::*;
use crate::types::*;
use std::collections::HashMap;

/// Alias resolver
///
/// Gives a second name to a single canonical entry. Resolution applies the
/// alias map exactly once: an alias whose target is itself an alias is not
/// followed any further, so the alias graph never needs cycle detection.
#[derive(Debug, Clone, Default)]
pub struct AliasResolver {
    aliases: HashMap<String, String>,
}

impl AliasResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point `alias` at `canonical`, replacing any earlier target.
    ///
    /// The canonical name is not required to exist yet.
    pub fn add_alias(&mut self, alias: &str, canonical: &str) -> Result<Option<String>> {
        self.check_alias(alias, canonical)?;
        Ok(self
            .aliases
            .insert(alias.to_string(), canonical.to_string()))
    }

    /// Validate an `add_alias` without applying it.
    pub fn check_alias(&self, alias: &str, canonical: &str) -> Result<()> {
        validate_name(alias)?;
        validate_name(canonical)?;
        if alias == canonical {
            return Err(RegistryError::SelfAlias {
                alias: alias.to_string(),
            });
        }
        Ok(())
    }

    pub fn remove_alias(&mut self, alias: &str) -> Result<String> {
        self.aliases
            .remove(alias)
            .ok_or_else(|| RegistryError::unknown(alias))
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.aliases.contains_key(alias)
    }

    /// Canonical target of `name`, or `name` itself when it is not an alias
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map(String::as_str).unwrap_or(name)
    }

    /// Aliases currently pointing at `canonical`
    pub fn aliases_of(&self, canonical: &str) -> Vec<String> {
        let mut found: Vec<String> = self
            .aliases
            .iter()
            .filter(|(_, target)| target.as_str() == canonical)
            .map(|(alias, _)| alias.clone())
            .collect();
        found.sort();
        found
    }

    /// All aliases, sorted by alias name
    pub fn aliases(&self) -> Vec<Alias> {
        let mut all: Vec<Alias> = self
            .aliases
            .iter()
            .map(|(alias, canonical)| Alias {
                alias: alias.clone(),
                canonical: canonical.clone(),
            })
            .collect();
        all.sort_by(|a, b| a.alias.cmp(&b.alias));
        all
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}
