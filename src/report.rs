use itertools::Itertools;

use crate::{
    dota2::{EnrichedMatch, MatchStats},
    heroes::HeroCatalog,
    kda,
    roster::Player,
};

const NOT_FOUND: &str = "Not found";

/// Returns the first item whose key beats every earlier one, so ties keep
/// the item seen first.
fn first_by<T, K, F, W>(items: impl IntoIterator<Item = T>, key: F, beats: W) -> Option<T>
where
    F: Fn(&T) -> K,
    W: Fn(&K, &K) -> bool,
{
    items
        .into_iter()
        .fold(None, |current: Option<(T, K)>, item| {
            let k = key(&item);
            match current {
                Some((held, held_key)) if !beats(&k, &held_key) => Some((held, held_key)),
                _ => Some((item, k)),
            }
        })
        .map(|(item, _)| item)
}

fn first_max<T, K: PartialOrd>(
    items: impl IntoIterator<Item = T>,
    key: impl Fn(&T) -> K,
) -> Option<T> {
    first_by(items, key, |a, b| a > b)
}

fn first_min<T, K: PartialOrd>(
    items: impl IntoIterator<Item = T>,
    key: impl Fn(&T) -> K,
) -> Option<T> {
    first_by(items, key, |a, b| a < b)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scored {
    pub index: usize,
    pub score: f64,
}

/// One roster player's matches inside the report window, with the best and
/// worst performance already picked.
#[derive(Debug, Clone)]
pub struct PlayerDay {
    pub player: Player,
    pub matches: Vec<EnrichedMatch>,
    pub best: Scored,
    pub worst: Scored,
}

impl PlayerDay {
    /// Scores come from the summary K/D/A, as reported before enrichment.
    /// Returns `None` for a player without matches.
    pub fn new(player: Player, matches: Vec<EnrichedMatch>) -> Option<Self> {
        let scored: Vec<Scored> = matches
            .iter()
            .enumerate()
            .map(|(index, m)| Scored {
                index,
                score: kda::score(m.summary.kills, m.summary.deaths, m.summary.assists),
            })
            .collect();
        let best = first_max(scored.iter().copied(), |s| s.score)?;
        let worst = first_min(scored.iter().copied(), |s| s.score)?;
        Some(Self {
            player,
            matches,
            best,
            worst,
        })
    }

    pub fn best_match(&self) -> &EnrichedMatch {
        &self.matches[self.best.index]
    }

    pub fn worst_match(&self) -> &EnrichedMatch {
        &self.matches[self.worst.index]
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Entry<'a> {
    pub player: &'a Player,
    pub record: &'a EnrichedMatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stat {
    Kills,
    Assists,
    Deaths,
    GoldPerMin,
    HeroDamage,
}

impl Stat {
    pub fn value(self, stats: &MatchStats) -> u32 {
        match self {
            Stat::Kills => stats.kills,
            Stat::Assists => stats.assists,
            Stat::Deaths => stats.deaths,
            Stat::GoldPerMin => stats.gold_per_min,
            Stat::HeroDamage => stats.hero_damage,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Stat::Kills => "Kills",
            Stat::Assists => "Assists",
            Stat::Deaths => "Deaths",
            Stat::GoldPerMin => "GPM",
            Stat::HeroDamage => "HeroDMG",
        }
    }
}

/// Every superlative of one reporting day.
#[derive(Debug, Clone, Default)]
pub struct Awards<'a> {
    pub mvp: Option<Entry<'a>>,
    pub loh: Option<Entry<'a>>,
    pub killer: Option<Entry<'a>>,
    pub miposhka: Option<Entry<'a>>,
    pub suicider: Option<Entry<'a>>,
    pub greedy: Option<Entry<'a>>,
    pub damager: Option<Entry<'a>>,
    pub nightfall: Vec<Entry<'a>>,
    pub timtim: Vec<Entry<'a>>,
}

impl<'a> Awards<'a> {
    pub fn compute(days: &'a [PlayerDay]) -> Self {
        let entries: Vec<Entry<'a>> = days
            .iter()
            .flat_map(|day| {
                day.matches.iter().map(move |record| Entry {
                    player: &day.player,
                    record,
                })
            })
            .collect();
        let top = |stat: Stat| first_max(entries.iter().copied(), |e| stat.value(&e.record.stats));

        let mvp = first_max(days, |day| day.best.score).map(|day| Entry {
            player: &day.player,
            record: day.best_match(),
        });
        let loh = first_min(days, |day| day.worst.score).map(|day| Entry {
            player: &day.player,
            record: day.worst_match(),
        });

        Self {
            mvp,
            loh,
            killer: top(Stat::Kills),
            miposhka: top(Stat::Assists),
            suicider: top(Stat::Deaths),
            greedy: top(Stat::GoldPerMin),
            damager: top(Stat::HeroDamage),
            nightfall: entries
                .iter()
                .filter(|e| e.record.stats.deaths == 0 && e.record.stats.kills > 0)
                .copied()
                .collect(),
            timtim: entries
                .iter()
                .filter(|e| e.record.stats.kills == 0)
                .copied()
                .collect(),
        }
    }

    pub fn render(&self, heroes: &HeroCatalog) -> String {
        let full = |entry: &Entry| {
            let stats = &entry.record.stats;
            format!(
                "{}, Hero: {}, {}, Kills: {}, Deaths: {}, Assists: {}, GPM: {}, HeroDMG: {}",
                entry.player.display,
                heroes.name(stats.hero_id),
                if entry.record.is_win() { "WIN" } else { "LOSE" },
                stats.kills,
                stats.deaths,
                stats.assists,
                stats.gold_per_min,
                stats.hero_damage,
            )
        };
        let short = |entry: &Entry, stat: Stat| {
            format!(
                "{}, Hero: {}, {}: {}",
                entry.player.display,
                heroes.name(entry.record.stats.hero_id),
                stat.label(),
                stat.value(&entry.record.stats),
            )
        };
        let single = |title: &str, entry: Option<&Entry>, stat: Stat| {
            let line = entry.map_or_else(|| NOT_FOUND.to_string(), |e| short(e, stat));
            format!("\n\n{}:\n{}", title, line)
        };

        let mut msg = String::from("🏆 Top Day Results:\n");
        match &self.mvp {
            Some(mvp) => msg += &format!("\nMVP (Best KDA):\n{}", full(mvp)),
            None => msg += &format!("\nMVP (Best KDA): {}", NOT_FOUND),
        }
        match &self.loh {
            Some(loh) => msg += &format!("\n\nLOH (Worst KDA):\n{}", full(loh)),
            None => msg += &format!("\n\nLOH (Worst KDA): {}", NOT_FOUND),
        }
        msg += &single("Killer (Most Kills)", self.killer.as_ref(), Stat::Kills);
        msg += &single("Miposhka (Most Assists)", self.miposhka.as_ref(), Stat::Assists);
        msg += &single("Suicider (Most Deaths)", self.suicider.as_ref(), Stat::Deaths);
        msg += &single("Greedy (Highest GPM)", self.greedy.as_ref(), Stat::GoldPerMin);
        msg += &single("Damager (Highest HeroDMG)", self.damager.as_ref(), Stat::HeroDamage);

        msg += "\n\nNightfall award (0 deaths):\n";
        if self.nightfall.is_empty() {
            msg += NOT_FOUND;
        } else {
            msg += &self.nightfall.iter().map(|e| short(e, Stat::Kills)).join("\n");
        }

        if !self.timtim.is_empty() {
            msg += "\n\nTimTim award (0 kills):\n";
            msg += &self.timtim.iter().map(|e| short(e, Stat::Deaths)).join("\n");
        }
        msg
    }
}
