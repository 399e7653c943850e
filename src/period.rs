use std::{fmt::Display, str::FromStr, sync::Arc};

use chrono::{Duration, Utc};
use thiserror::Error;

use crate::{
    client::RequestError,
    dota2::MatchSummary,
    kda,
    source::{MatchSource, Provider},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Day,
    Week,
    Month,
}

impl Period {
    pub fn days(self) -> u32 {
        match self {
            Period::Day => 1,
            Period::Week => 7,
            Period::Month => 30,
        }
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "day" => Ok(Period::Day),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            other => Err(other.to_string()),
        }
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum PeriodStatsError {
    #[error("match provider unreachable: {0}")]
    ProviderUnreachable(#[from] RequestError),
    #[error("no ranked matches in the period")]
    NoMatches,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodStats {
    pub total: usize,
    pub wins: usize,
    pub win_rate: f64,
    pub avg_score: f64,
}

impl PeriodStats {
    /// `None` when there is nothing to average over.
    pub fn from_matches(matches: &[MatchSummary]) -> Option<Self> {
        if matches.is_empty() {
            return None;
        }
        let total = matches.len();
        let wins = matches.iter().filter(|m| m.is_win()).count();
        let score_sum: f64 = matches
            .iter()
            .map(|m| kda::score(m.kills, m.deaths, m.assists))
            .sum();
        Some(Self {
            total,
            wins,
            win_rate: wins as f64 / total as f64 * 100.0,
            avg_score: score_sum / total as f64,
        })
    }
}

/// Rolling-window stats for a single account, recomputed on every call.
pub struct PeriodStatsEngine<P> {
    source: Arc<MatchSource<P>>,
}

impl<P: Provider> PeriodStatsEngine<P> {
    pub fn new(source: Arc<MatchSource<P>>) -> Self {
        Self { source }
    }

    pub async fn compute_period_stats(
        &self,
        account_id: u64,
        days: u32,
    ) -> Result<PeriodStats, PeriodStatsError> {
        let since = (Utc::now() - Duration::days(i64::from(days))).timestamp();
        let matches = self.source.fetch_recent_matches(account_id, since).await?;
        log::debug!(
            "account {} played {} ranked matches in {} days",
            account_id,
            matches.len(),
            days
        );
        PeriodStats::from_matches(&matches).ok_or(PeriodStatsError::NoMatches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(player_slot: u8, radiant_win: bool, kda: (u32, u32, u32)) -> MatchSummary {
        MatchSummary {
            player_slot,
            radiant_win,
            kills: kda.0,
            deaths: kda.1,
            assists: kda.2,
            lobby_type: 7,
            ..MatchSummary::default()
        }
    }

    #[test]
    fn periods() {
        assert_eq!("Week".parse::<Period>(), Ok(Period::Week));
        assert_eq!("month".parse::<Period>().map(Period::days), Ok(30));
        assert_eq!("year".parse::<Period>(), Err("year".to_string()));
        assert_eq!(Period::Day.to_string(), "day");
    }

    #[test]
    fn three_wins_out_of_four() {
        let matches = [
            summary(1, true, (10, 2, 4)),  // win, 7.0
            summary(130, false, (2, 4, 2)), // win, 1.0
            summary(3, false, (0, 5, 5)),  // loss, 1.0
            summary(131, false, (3, 0, 0)), // win, 3.0
        ];
        let stats = PeriodStats::from_matches(&matches).unwrap();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.wins, 3);
        assert_eq!(format!("{:.2}", stats.win_rate), "75.00");
        assert_eq!(stats.avg_score, 3.0);
    }

    #[test]
    fn nothing_to_average() {
        assert!(PeriodStats::from_matches(&[]).is_none());
    }
}
