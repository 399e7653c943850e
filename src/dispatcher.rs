use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    aggregate::AggregationEngine,
    command::{command_help, Command},
    period::{Period, PeriodStats, PeriodStatsEngine, PeriodStatsError},
    roster::Roster,
    source::Provider,
};

/// Delivers text back to whoever sent the command.
#[async_trait]
pub trait Replier: Send + Sync {
    async fn reply(&self, text: String);
}

/// Routes parsed commands to the engines and answers in plain text.
pub struct Dispatcher<P> {
    roster: Arc<Roster>,
    aggregation: Arc<AggregationEngine<P>>,
    period_stats: PeriodStatsEngine<P>,
}

impl<P: Provider> Dispatcher<P> {
    pub fn new(
        roster: Arc<Roster>,
        aggregation: Arc<AggregationEngine<P>>,
        period_stats: PeriodStatsEngine<P>,
    ) -> Self {
        Self {
            roster,
            aggregation,
            period_stats,
        }
    }

    /// `requester` is the sender's chat handle, if they have one.
    pub async fn handle(&self, command: Command, requester: Option<&str>, replier: &dyn Replier) {
        match command {
            Command::Help => replier.reply(command_help().to_string()).await,
            Command::TopDay => self.top_day(replier).await,
            Command::Stats { period } => self.stats(period.as_deref(), requester, replier).await,
        }
    }

    async fn top_day(&self, replier: &dyn Replier) {
        let report_date = self.aggregation.current_report_date();
        let notice = match self.aggregation.cached(report_date).await {
            Some(_) => "⏳ Loading cached top stats for the day...",
            None => "⏳ Calculating top stats for the day...",
        };
        replier.reply(notice.to_string()).await;
        let report = self
            .aggregation
            .compute_daily_report(&self.roster, report_date)
            .await;
        replier.reply(report).await;
    }

    async fn stats(&self, period: Option<&str>, requester: Option<&str>, replier: &dyn Replier) {
        let Some(period) = period else {
            replier
                .reply(
                    "⚠️ Please specify period: day, week or month.\nExample: /stats week"
                        .to_string(),
                )
                .await;
            return;
        };
        let Ok(period) = period.parse::<Period>() else {
            replier
                .reply("⚠️ Invalid period. Use: day, week or month.".to_string())
                .await;
            return;
        };
        let Some(requester) = requester else {
            replier
                .reply("⚠️ Can't identify your Telegram login.".to_string())
                .await;
            return;
        };
        let Some(account_id) = self
            .roster
            .by_handle(requester)
            .and_then(|player| player.account_id)
        else {
            replier
                .reply("⚠️ Steam ID not found for your user.".to_string())
                .await;
            return;
        };

        replier
            .reply(format!(
                "⏳ Fetching your ranked matches for the last {}...",
                period
            ))
            .await;
        let text = match self
            .period_stats
            .compute_period_stats(account_id, period.days())
            .await
        {
            Ok(stats) => render_period_stats(period, &stats),
            Err(PeriodStatsError::ProviderUnreachable(err)) => {
                log::warn!("stats for {} failed: {}", requester, err);
                "⚠️ Failed to fetch matches from OpenDota.".to_string()
            }
            Err(PeriodStatsError::NoMatches) => {
                "⚠️ No ranked matches found for the specified period.".to_string()
            }
        };
        replier.reply(text).await;
    }
}

pub fn render_period_stats(period: Period, stats: &PeriodStats) -> String {
    format!(
        "📊 Your ranked matches stats for the last {}:\n\
         Matches played: {}\n\
         Win rate: {:.2}%\n\
         Average KDA: {:.2}\n",
        period, stats.total, stats.win_rate, stats.avg_score
    )
}
