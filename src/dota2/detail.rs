// response of GET /matches/{match_id}, only the fields we report on

use serde::{Deserialize, Serialize};

use super::nullable;

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct Participant {
    // anonymous players come back as null
    #[serde(default)]
    pub account_id: Option<u64>,
    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub kills: u32,
    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub deaths: u32,
    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub assists: u32,
    #[serde(default)]
    pub hero_id: Option<u16>,
    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub gold_per_min: u32,
    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub hero_damage: u32,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct MatchDetail {
    pub match_id: u64,
    #[serde(default)]
    pub players: Vec<Participant>,
}

impl MatchDetail {
    pub fn participant(&self, account_id: u64) -> Option<&Participant> {
        self.players
            .iter()
            .find(|p| p.account_id == Some(account_id))
    }
}
