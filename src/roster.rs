use std::{fmt::Display, path::Path};

use anyhow::Context;
use serde::{de, Deserialize, Deserializer};

/// How a player is named in reports, decided once when the roster loads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayIdentity {
    /// Chat handle, including the leading `@`.
    Handle(String),
    Name(String),
}

impl Display for DisplayIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayIdentity::Handle(handle) => f.write_str(handle),
            DisplayIdentity::Name(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub login: String,
    pub display: DisplayIdentity,
    pub account_id: Option<u64>,
}

#[derive(Deserialize)]
struct RawPlayer {
    #[serde(default)]
    login: String,
    #[serde(default, alias = "display_name")]
    name: Option<String>,
    #[serde(default, alias = "account_id", deserialize_with = "account_id")]
    steam_id: Option<u64>,
}

// steam_id shows up both as a number and as a numeric string
fn account_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(0)) => Ok(None),
        Some(Raw::Number(id)) => Ok(Some(id)),
        Some(Raw::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(Raw::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid steam_id {:?}", text))),
    }
}

impl From<RawPlayer> for Player {
    fn from(raw: RawPlayer) -> Self {
        let display = if raw.login.starts_with('@') {
            DisplayIdentity::Handle(raw.login.clone())
        } else {
            DisplayIdentity::Name(raw.name.unwrap_or_else(|| "Unknown".to_string()))
        };
        Self {
            login: raw.login,
            display,
            account_id: raw.steam_id,
        }
    }
}

impl Player {
    pub fn new(login: &str, name: &str, account_id: Option<u64>) -> Self {
        RawPlayer {
            login: login.to_string(),
            name: Some(name.to_string()),
            steam_id: account_id,
        }
        .into()
    }
}

/// The fixed list of tracked players, in file order.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    players: Vec<Player>,
}

impl Roster {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading roster {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("parsing roster {}", path.display()))
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        let raw: Vec<RawPlayer> = serde_json::from_str(content)?;
        Ok(raw.into_iter().map(Player::from).collect())
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Finds the player whose login is `@handle`, ignoring case.
    pub fn by_handle(&self, handle: &str) -> Option<&Player> {
        let login = format!("@{}", handle.trim_start_matches('@'));
        self.players
            .iter()
            .find(|p| p.login.eq_ignore_ascii_case(&login))
    }
}

impl FromIterator<Player> for Roster {
    fn from_iter<I: IntoIterator<Item = Player>>(iter: I) -> Self {
        Self {
            players: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROSTER: &str = r#"[
        {"login": "@Shadow", "name": "Vasya", "steam_id": 86745912},
        {"login": "petya", "name": "Petya", "steam_id": "105248644"},
        {"login": "@nobody", "name": "Nobody", "steam_id": ""},
        {"login": "ghost"}
    ]"#;

    #[test]
    fn display_identity_is_resolved_on_load() {
        let roster = Roster::from_json(ROSTER).unwrap();
        let players = roster.players();
        assert_eq!(players[0].display, DisplayIdentity::Handle("@Shadow".into()));
        assert_eq!(players[1].display, DisplayIdentity::Name("Petya".into()));
        assert_eq!(players[3].display.to_string(), "Unknown");
    }

    #[test]
    fn account_ids_from_numbers_and_strings() {
        let roster = Roster::from_json(ROSTER).unwrap();
        let ids: Vec<_> = roster.players().iter().map(|p| p.account_id).collect();
        assert_eq!(ids, vec![Some(86745912), Some(105248644), None, None]);
    }

    #[test]
    fn garbage_account_id_is_an_error() {
        assert!(Roster::from_json(r#"[{"login": "@a", "steam_id": "abc"}]"#).is_err());
    }

    #[test]
    fn lookup_by_handle_ignores_case() {
        let roster = Roster::from_json(ROSTER).unwrap();
        assert_eq!(roster.by_handle("shadow").unwrap().account_id, Some(86745912));
        assert_eq!(roster.by_handle("@SHADOW").unwrap().account_id, Some(86745912));
        // logins without `@` are not chat handles
        assert!(roster.by_handle("petya").is_none());
    }
}
