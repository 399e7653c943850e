use std::{borrow::Cow, collections::HashMap, path::Path};

use anyhow::Context;
use serde::Deserialize;

#[derive(Deserialize)]
struct Hero {
    id: u16,
    localized_name: String,
}

/// Hero id to localized name, loaded once at startup.
#[derive(Debug, Default, Clone)]
pub struct HeroCatalog {
    names: HashMap<u16, String>,
}

impl HeroCatalog {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading hero catalog {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("parsing hero catalog {}", path.display()))
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        // entries without an id or a name are dropped rather than rejected
        let raw: Vec<serde_json::Value> = serde_json::from_str(content)?;
        let names = raw
            .into_iter()
            .filter_map(|value| serde_json::from_value::<Hero>(value).ok())
            .map(|hero| (hero.id, hero.localized_name))
            .collect();
        Ok(Self { names })
    }

    pub fn name(&self, hero_id: u16) -> Cow<'_, str> {
        match self.names.get(&hero_id) {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(format!("HeroID:{}", hero_id)),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<(u16, String)> for HeroCatalog {
    fn from_iter<I: IntoIterator<Item = (u16, String)>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_and_fallback() {
        let catalog = HeroCatalog::from_json(
            r#"[
                {"id": 1, "name": "npc_dota_hero_antimage", "localized_name": "Anti-Mage"},
                {"id": 74, "localized_name": "Invoker", "primary_attr": "all"},
                {"name": "broken entry"}
            ]"#,
        )
        .unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.name(74), "Invoker");
        assert_eq!(catalog.name(1), "Anti-Mage");
        assert_eq!(catalog.name(150), "HeroID:150");
    }

    #[test]
    fn not_a_list_is_rejected() {
        assert!(HeroCatalog::from_json(r#"{"1": "Anti-Mage"}"#).is_err());
    }
}
