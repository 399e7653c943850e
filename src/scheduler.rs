use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Days, FixedOffset, NaiveTime, Utc};

use crate::{
    aggregate::AggregationEngine,
    dispatcher::Replier,
    roster::Roster,
    source::Provider,
};

/// Posts the daily report once a day at a fixed local time.
pub struct Scheduler<P> {
    engine: Arc<AggregationEngine<P>>,
    roster: Arc<Roster>,
    at: NaiveTime,
    tz: FixedOffset,
}

impl<P: Provider> Scheduler<P> {
    pub fn new(
        engine: Arc<AggregationEngine<P>>,
        roster: Arc<Roster>,
        at: NaiveTime,
        tz: FixedOffset,
    ) -> Self {
        Self {
            engine,
            roster,
            at,
            tz,
        }
    }

    // ideally this loop never ends
    pub async fn run(&self, replier: &dyn Replier) {
        loop {
            let wait = until_next(Utc::now(), self.at, self.tz);
            log::info!("next daily post in {}s", wait.as_secs());
            tokio::time::sleep(wait).await;

            // serialized with /top_day by the per-date lock
            let report_date = self.engine.current_report_date();
            let report = self
                .engine
                .compute_daily_report(&self.roster, report_date)
                .await;
            replier.reply(report).await;
        }
    }
}

/// Time left until the next `at` o'clock in `tz`, strictly in the future.
fn until_next(now: DateTime<Utc>, at: NaiveTime, tz: FixedOffset) -> Duration {
    let local = now.with_timezone(&tz);
    let today = local.date_naive();
    let day = if local.time() < at {
        today
    } else {
        today.checked_add_days(Days::new(1)).unwrap_or(today)
    };
    let next = day.and_time(at).and_utc().timestamp() - i64::from(tz.local_minus_utc());
    let secs = (next - now.timestamp()).max(1);
    Duration::from_secs(secs as u64)
}
