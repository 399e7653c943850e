use std::{collections::HashMap, sync::Arc};

use chrono::{FixedOffset, NaiveDate, Utc};
use futures::future::join_all;
use tokio::sync::Mutex;

use crate::{
    cache::DailyCache,
    dota2::EnrichedMatch,
    heroes::HeroCatalog,
    report::{Awards, PlayerDay},
    roster::{Player, Roster},
    source::{MatchSource, Provider, Window},
};

/// Builds the once-a-day leaderboard and keeps one rendered copy per date.
pub struct AggregationEngine<P> {
    source: Arc<MatchSource<P>>,
    heroes: Arc<HeroCatalog>,
    cache: Arc<dyn DailyCache>,
    tz: FixedOffset,
    // one lock per report date still being computed
    running: Mutex<HashMap<NaiveDate, Arc<Mutex<()>>>>,
}

impl<P: Provider> AggregationEngine<P> {
    pub fn new(
        source: Arc<MatchSource<P>>,
        heroes: Arc<HeroCatalog>,
        cache: Arc<dyn DailyCache>,
        tz: FixedOffset,
    ) -> Self {
        Self {
            source,
            heroes,
            cache,
            tz,
            running: Mutex::new(HashMap::new()),
        }
    }

    /// Today's date in the reporting timezone; its report covers yesterday.
    pub fn current_report_date(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.tz).date_naive()
    }

    pub async fn cached(&self, report_date: NaiveDate) -> Option<String> {
        self.cache.get(&date_key(report_date)).await
    }

    /// Returns the report for `report_date`, computing and caching it on the
    /// first request. Concurrent callers for the same date wait for the first
    /// computation and then read its cached result.
    pub async fn compute_daily_report(&self, roster: &Roster, report_date: NaiveDate) -> String {
        let key = date_key(report_date);
        if let Some(report) = self.cache.get(&key).await {
            log::info!("serving cached report for {}", key);
            return report;
        }

        let lock = {
            let mut running = self.running.lock().await;
            running.entry(report_date).or_default().clone()
        };
        let guard = lock.lock().await;

        let report = match self.cache.get(&key).await {
            Some(report) => {
                log::info!("report for {} was computed while waiting", key);
                report
            }
            None => {
                let report = self.aggregate(roster, report_date).await;
                if let Err(err) = self.cache.put(&key, &report).await {
                    log::error!("failed to cache report for {}: {}", key, err);
                }
                report
            }
        };

        {
            let mut running = self.running.lock().await;
            if running
                .get(&report_date)
                .is_some_and(|current| Arc::ptr_eq(current, &lock))
            {
                running.remove(&report_date);
            }
        }
        drop(guard);
        report
    }

    async fn aggregate(&self, roster: &Roster, report_date: NaiveDate) -> String {
        let window = Window::day_before(report_date, self.tz);
        log::info!(
            "aggregating {} players for {} over [{}, {}]",
            roster.len(),
            report_date,
            window.start,
            window.end
        );

        let tasks = roster
            .players()
            .iter()
            .filter_map(|player| Some(self.player_day(player, player.account_id?, window)));
        let days: Vec<PlayerDay> = join_all(tasks).await.into_iter().flatten().collect();
        log::info!("{} players played in the window", days.len());

        Awards::compute(&days).render(&self.heroes)
    }

    async fn player_day(
        &self,
        player: &Player,
        account_id: u64,
        window: Window,
    ) -> Option<PlayerDay> {
        let summaries = self.source.fetch_matches_in_window(account_id, window).await;
        if summaries.is_empty() {
            log::debug!("no ranked matches for {}", player.login);
            return None;
        }

        let details = join_all(
            summaries
                .iter()
                .map(|m| self.source.fetch_match_detail(m.match_id)),
        )
        .await;
        let matches = summaries
            .iter()
            .zip(&details)
            .map(|(summary, detail)| EnrichedMatch::enrich(summary, detail.as_ref(), account_id))
            .collect();
        log::debug!("{} played {} ranked matches", player.login, summaries.len());
        PlayerDay::new(player.clone(), matches)
    }
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
