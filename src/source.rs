use async_trait::async_trait;
use chrono::{FixedOffset, NaiveDate, NaiveTime};
use tokio::sync::Semaphore;

use crate::{
    client::RequestError,
    dota2::{MatchDetail, MatchSummary},
};

/// Raw access to the match statistics provider.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Matches played by `account_id` since the unix timestamp `since`. The
    /// provider may return older or unranked matches as well.
    async fn player_matches(
        &self,
        account_id: u64,
        since: i64,
    ) -> Result<Vec<MatchSummary>, RequestError>;

    async fn match_detail(&self, match_id: u64) -> Result<MatchDetail, RequestError>;
}

/// Inclusive range of unix timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: i64,
    pub end: i64,
}

impl Window {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// The calendar day before `report_date`, midnight to 23:59:59 in `tz`.
    pub fn day_before(report_date: NaiveDate, tz: FixedOffset) -> Self {
        let day = report_date.pred_opt().unwrap_or(NaiveDate::MIN);
        let start = day.and_time(NaiveTime::MIN).and_utc().timestamp()
            - i64::from(tz.local_minus_utc());
        Self::new(start, start + 24 * 60 * 60 - 1)
    }

    pub fn contains(&self, timestamp: i64) -> bool {
        (self.start..=self.end).contains(&timestamp)
    }
}

/// Ranked-match access with the failure policy each caller needs.
///
/// Every provider call holds a permit, so at most `concurrency` requests are
/// in flight no matter how many players or matches are being fetched.
pub struct MatchSource<P> {
    provider: P,
    permits: Semaphore,
}

impl<P: Provider> MatchSource<P> {
    pub fn new(provider: P, concurrency: usize) -> Self {
        Self {
            provider,
            permits: Semaphore::new(concurrency.max(1)),
        }
    }

    /// Ranked matches at or after `since`. A failed call is reported as such,
    /// never as an empty list.
    pub async fn fetch_recent_matches(
        &self,
        account_id: u64,
        since: i64,
    ) -> Result<Vec<MatchSummary>, RequestError> {
        let matches = {
            let _permit = self.permits.acquire().await.ok();
            self.provider.player_matches(account_id, since).await?
        };
        Ok(matches
            .into_iter()
            .filter(|m| m.is_ranked() && m.start_time >= since)
            .collect())
    }

    /// Ranked matches inside `window`. Any failure degrades to no matches.
    pub async fn fetch_matches_in_window(
        &self,
        account_id: u64,
        window: Window,
    ) -> Vec<MatchSummary> {
        match self.fetch_recent_matches(account_id, window.start).await {
            Ok(matches) => matches
                .into_iter()
                .filter(|m| window.contains(m.start_time))
                .collect(),
            Err(err) => {
                log::warn!("matches of account {} unavailable: {}", account_id, err);
                vec![]
            }
        }
    }

    pub async fn fetch_match_detail(&self, match_id: u64) -> Option<MatchDetail> {
        let _permit = self.permits.acquire().await.ok();
        match self.provider.match_detail(match_id).await {
            Ok(detail) => Some(detail),
            Err(err) => {
                log::warn!("detail of match {} unavailable: {}", match_id, err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dota2::LOBBY_RANKED;

    struct Canned {
        matches: Vec<MatchSummary>,
        fail: bool,
    }

    #[async_trait]
    impl Provider for Canned {
        async fn player_matches(&self, _: u64, _: i64) -> Result<Vec<MatchSummary>, RequestError> {
            if self.fail {
                Err(RequestError::TooManyRequests)
            } else {
                Ok(self.matches.clone())
            }
        }

        async fn match_detail(&self, _: u64) -> Result<MatchDetail, RequestError> {
            Err(RequestError::OtherResponse(reqwest::StatusCode::NOT_FOUND))
        }
    }

    fn summary(match_id: u64, start_time: i64, lobby_type: i32) -> MatchSummary {
        MatchSummary {
            match_id,
            start_time,
            lobby_type,
            ..MatchSummary::default()
        }
    }

    fn source(fail: bool) -> MatchSource<Canned> {
        let matches = vec![
            summary(1, 1_000, LOBBY_RANKED),
            summary(2, 2_000, LOBBY_RANKED),
            summary(3, 2_500, 0),
            summary(4, 3_000, LOBBY_RANKED),
            summary(5, 3_001, LOBBY_RANKED),
        ];
        MatchSource::new(Canned { matches, fail }, 2)
    }

    fn ids(matches: &[MatchSummary]) -> Vec<u64> {
        matches.iter().map(|m| m.match_id).collect()
    }

    #[test]
    fn previous_day_in_moscow() {
        let msk = FixedOffset::east_opt(3 * 3600).unwrap();
        let report_date = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        let window = Window::day_before(report_date, msk);
        // 2024-06-01 00:00:00 MSK == 2024-05-31 21:00:00 UTC
        assert_eq!(window.start, 1_717_189_200);
        assert_eq!(window.end, 1_717_189_200 + 86_399);
        assert!(window.contains(window.start));
        assert!(window.contains(window.end));
        assert!(!window.contains(window.end + 1));
    }

    #[tokio::test]
    async fn recent_matches_are_ranked_and_bounded_below() {
        let matches = source(false).fetch_recent_matches(7, 2_000).await.unwrap();
        assert_eq!(ids(&matches), vec![2, 4, 5]);
    }

    #[tokio::test]
    async fn recent_matches_surface_failures() {
        let result = source(true).fetch_recent_matches(7, 0).await;
        assert!(matches!(result, Err(RequestError::TooManyRequests)));
    }

    #[tokio::test]
    async fn window_is_inclusive_on_both_ends() {
        let matches = source(false)
            .fetch_matches_in_window(7, Window::new(1_000, 3_000))
            .await;
        assert_eq!(ids(&matches), vec![1, 2, 4]);
    }

    #[tokio::test]
    async fn window_degrades_to_empty() {
        let matches = source(true)
            .fetch_matches_in_window(7, Window::new(0, i64::MAX))
            .await;
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn missing_detail_is_none() {
        assert!(source(false).fetch_match_detail(1).await.is_none());
    }
}
