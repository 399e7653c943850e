use std::path::PathBuf;

use chrono::{FixedOffset, NaiveTime};
use clap::Parser;

use crate::client::Client;

#[derive(Parser)]
#[command(about = "Telegram bot posting daily ranked Dota 2 awards for a fixed roster")]
pub struct Args {
    #[arg(long, env = "BOT_TOKEN", hide_env_values = true)]
    pub bot_token: String,
    #[arg(long, default_value = "data/players.json")]
    pub roster: PathBuf,
    #[arg(long, default_value = "data/heroes.json")]
    pub heroes: PathBuf,
    #[arg(long, default_value = "data/top_day_cache.json")]
    pub cache: PathBuf,
    #[arg(long, env = "OPENDOTA_URL", default_value = Client::DEFAULT_URL)]
    pub api_url: String,
    #[arg(long)]
    pub proxy: Option<String>,
    /// Hours east of UTC of the reporting timezone.
    #[arg(long, default_value_t = 3, allow_negative_numbers = true)]
    pub utc_offset: i32,
    #[arg(long, default_value_t = 4)]
    pub fetch_concurrency: usize,
    /// Seconds before a provider call counts as failed.
    #[arg(long, default_value_t = 30)]
    pub request_timeout: u64,
    #[arg(long, default_value_t = 100)]
    pub min_interval: u64,
    #[arg(long, default_value_t = 5000)]
    pub max_interval: u64,
    /// Extra attempts for transient provider errors.
    #[arg(long, default_value_t = 0)]
    pub retries: usize,
    /// Chat that receives the report every day at `--post-at`.
    #[arg(long, env = "POST_CHAT_ID")]
    pub post_chat_id: Option<i64>,
    #[arg(long, default_value = "09:00", value_parser = parse_time)]
    pub post_at: NaiveTime,
}

impl Args {
    pub fn timezone(&self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset.checked_mul(3600)?)
    }
}

fn parse_time(value: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(value, "%H:%M")
}
