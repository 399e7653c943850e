pub mod detail;
pub mod summary;

pub use detail::{MatchDetail, Participant};
pub use summary::MatchSummary;

// opendota sends `null` for stats it could not parse yet
mod nullable {
    use serde::de::{Deserialize, Deserializer};

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + Default,
    {
        let value: Option<T> = Deserialize::deserialize(deserializer)?;
        Ok(value.unwrap_or_default())
    }
}

/// Ranked matchmaking, the only lobby type we report on.
pub const LOBBY_RANKED: i32 = 7;

#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub enum Side {
    Radiant,
    Dire,
}

impl From<u8> for Side {
    fn from(value: u8) -> Self {
        if value & 0x80u8 != 0 {
            Self::Dire
        } else {
            Self::Radiant
        }
    }
}

/// Per-player stat line after merging the summary with the match detail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchStats {
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub hero_id: u16,
    pub gold_per_min: u32,
    pub hero_damage: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedMatch {
    pub summary: MatchSummary,
    pub stats: MatchStats,
}

impl EnrichedMatch {
    /// Merges the participant line belonging to `account_id` into the summary.
    ///
    /// Without a detail, or without a matching participant, the summary's own
    /// K/D/A and hero are kept and the detail-only fields stay zero.
    pub fn enrich(summary: &MatchSummary, detail: Option<&MatchDetail>, account_id: u64) -> Self {
        let fallback = MatchStats {
            kills: summary.kills,
            deaths: summary.deaths,
            assists: summary.assists,
            hero_id: summary.hero_id,
            ..MatchStats::default()
        };
        let stats = detail
            .and_then(|detail| detail.participant(account_id))
            .map_or(fallback, |p| MatchStats {
                kills: p.kills,
                deaths: p.deaths,
                assists: p.assists,
                hero_id: p.hero_id.unwrap_or(summary.hero_id),
                gold_per_min: p.gold_per_min,
                hero_damage: p.hero_damage,
            });
        Self {
            summary: summary.clone(),
            stats,
        }
    }

    pub fn is_win(&self) -> bool {
        self.summary.is_win()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> MatchSummary {
        MatchSummary {
            match_id: 42,
            start_time: 1_700_000_000,
            player_slot: 1,
            radiant_win: true,
            lobby_type: LOBBY_RANKED,
            kills: 3,
            deaths: 4,
            assists: 5,
            hero_id: 14,
        }
    }

    fn detail(account_id: Option<u64>) -> MatchDetail {
        MatchDetail {
            match_id: 42,
            players: vec![
                Participant {
                    account_id: Some(999),
                    kills: 20,
                    ..Participant::default()
                },
                Participant {
                    account_id,
                    kills: 7,
                    deaths: 1,
                    assists: 9,
                    hero_id: Some(74),
                    gold_per_min: 612,
                    hero_damage: 31_045,
                },
            ],
        }
    }

    #[test]
    fn side_from_slot() {
        assert_eq!(Side::from(0), Side::Radiant);
        assert_eq!(Side::from(4), Side::Radiant);
        assert_eq!(Side::from(128), Side::Dire);
        assert_eq!(Side::from(200), Side::Dire);
    }

    #[test]
    fn enrich_takes_matching_participant() {
        let detail = detail(Some(1234));
        let enriched = EnrichedMatch::enrich(&summary(), Some(&detail), 1234);
        assert_eq!(
            enriched.stats,
            MatchStats {
                kills: 7,
                deaths: 1,
                assists: 9,
                hero_id: 74,
                gold_per_min: 612,
                hero_damage: 31_045,
            }
        );
        // the summary itself is left untouched
        assert_eq!(enriched.summary, summary());
    }

    #[test]
    fn enrich_without_detail_keeps_summary_values() {
        let enriched = EnrichedMatch::enrich(&summary(), None, 1234);
        assert_eq!(enriched.stats.kills, 3);
        assert_eq!(enriched.stats.deaths, 4);
        assert_eq!(enriched.stats.assists, 5);
        assert_eq!(enriched.stats.hero_id, 14);
        assert_eq!(enriched.stats.gold_per_min, 0);
        assert_eq!(enriched.stats.hero_damage, 0);
    }

    #[test]
    fn enrich_with_anonymous_participant_is_skipped() {
        let detail = detail(None);
        let enriched = EnrichedMatch::enrich(&summary(), Some(&detail), 1234);
        assert_eq!(enriched.stats.kills, 3);
        assert_eq!(enriched.stats.gold_per_min, 0);
    }
}
