// response of GET /players/{account_id}/matches

use serde::{Deserialize, Serialize};

use super::{nullable, Side, LOBBY_RANKED};

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct MatchSummary {
    pub match_id: u64,
    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub start_time: i64,
    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub player_slot: u8,
    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub radiant_win: bool,
    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub lobby_type: i32,
    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub kills: u32,
    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub deaths: u32,
    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub assists: u32,
    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub hero_id: u16,
}

impl MatchSummary {
    pub fn side(&self) -> Side {
        self.player_slot.into()
    }

    pub fn is_win(&self) -> bool {
        (self.side() == Side::Radiant) == self.radiant_win
    }

    pub fn is_ranked(&self) -> bool {
        self.lobby_type == LOBBY_RANKED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_slot(player_slot: u8, radiant_win: bool) -> MatchSummary {
        MatchSummary {
            player_slot,
            radiant_win,
            ..MatchSummary::default()
        }
    }

    #[test]
    fn win_derivation() {
        assert!(with_slot(50, true).is_win());
        assert!(!with_slot(200, true).is_win());
        assert!(with_slot(200, false).is_win());
        assert!(!with_slot(3, false).is_win());
    }

    #[test]
    fn decode_player_matches() {
        let content = r#"[
            {"match_id": 7001, "player_slot": 130, "radiant_win": false, "duration": 2410,
             "game_mode": 22, "lobby_type": 7, "hero_id": 8, "start_time": 1717000000,
             "version": 21, "kills": 9, "deaths": 2, "assists": 11, "skill": null,
             "average_rank": 55, "leaver_status": 0, "party_size": 1},
            {"match_id": 7002, "player_slot": 2, "radiant_win": null, "lobby_type": 0,
             "hero_id": 1, "start_time": 1717003600, "kills": null, "deaths": 1, "assists": 0}
        ]"#;
        let matches: Vec<MatchSummary> = serde_json::from_str(content).unwrap();
        assert_eq!(matches.len(), 2);
        assert!(matches[0].is_ranked());
        assert!(matches[0].is_win());
        assert_eq!(matches[0].kills, 9);
        assert!(!matches[1].is_ranked());
        assert!(!matches[1].radiant_win);
        assert_eq!(matches[1].kills, 0);
    }
}
