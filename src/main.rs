use std::{sync::Arc, time::Duration};

use anyhow::Context;
use clap::Parser;
use teloxide::{types::ChatId, Bot};

use dota2_daily_top::{
    aggregate::AggregationEngine,
    args::Args,
    cache::{DailyCache, JsonFileCache},
    client::Client,
    dispatcher::Dispatcher,
    heroes::HeroCatalog,
    period::PeriodStatsEngine,
    rate::RateControl,
    roster::Roster,
    scheduler::Scheduler,
    source::MatchSource,
    telegram::{self, ChatReplier},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // a missing .env is fine, the environment may already be set
    dotenvy::dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let tz = args
        .timezone()
        .with_context(|| format!("invalid --utc-offset {}", args.utc_offset))?;

    let roster = Arc::new(Roster::load(&args.roster)?);
    let heroes = Arc::new(HeroCatalog::load(&args.heroes)?);
    log::info!(
        "loaded {} players and {} heroes",
        roster.len(),
        heroes.len()
    );

    let client = Client::new(
        &args.api_url,
        args.proxy.as_deref(),
        Duration::from_secs(args.request_timeout),
    )?
    .with_rate(RateControl::new(args.min_interval, args.max_interval))
    .with_retries(args.retries);
    let source = Arc::new(MatchSource::new(client, args.fetch_concurrency));

    let cache: Arc<dyn DailyCache> = Arc::new(JsonFileCache::new(args.cache.clone()));
    let aggregation = Arc::new(AggregationEngine::new(source.clone(), heroes, cache, tz));
    let dispatcher = Arc::new(Dispatcher::new(
        roster.clone(),
        aggregation.clone(),
        PeriodStatsEngine::new(source),
    ));

    let bot = Bot::new(&args.bot_token);
    if let Some(chat_id) = args.post_chat_id {
        log::info!("posting daily report to chat {} at {}", chat_id, args.post_at);
        let scheduler = Scheduler::new(aggregation, roster, args.post_at, tz);
        let replier = ChatReplier::new(bot.clone(), ChatId(chat_id));
        tokio::spawn(async move { scheduler.run(&replier).await });
    }

    telegram::run(bot, dispatcher).await;
    Ok(())
}
