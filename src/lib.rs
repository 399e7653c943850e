pub mod aggregate;
pub mod args;
pub mod cache;
pub mod client;
pub mod command;
pub mod dispatcher;
pub mod dota2;
pub mod heroes;
pub mod kda;
pub mod period;
pub mod rate;
pub mod report;
pub mod roster;
pub mod scheduler;
pub mod source;
pub mod telegram;
