// League-wide roster allocation.
//
// Turns the per-team roster shape into league-wide slot counts per position:
// how many players start, and how many are rostered at all (starters plus
// bench). Flex slots go to the best remaining flex-eligible players once the
// dedicated starters are taken, so the result depends on the ranked pool.

use std::collections::BTreeMap;
use tracing::debug;

use crate::config::{ConfigError, LeagueConfig};
use crate::player::Position;
use crate::pool::{PlayerId, PlayerPool};

/// League-wide slot counts derived from a `LeagueConfig` and a ranked pool.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterCounts {
    /// Starting slots per skill position, flex assignments included.
    pub starters: BTreeMap<Position, usize>,
    /// Starters plus bench slots per skill position.
    pub roster: BTreeMap<Position, usize>,
    /// Kicker slots league-wide. Budget deduction only.
    pub kickers: usize,
    /// Team defense slots league-wide. Budget deduction only.
    pub defenses: usize,
    /// Players that won a flex slot, best first.
    pub flex: Vec<PlayerId>,
}

impl RosterCounts {
    pub fn starter_count(&self, pos: Position) -> usize {
        self.starters.get(&pos).copied().unwrap_or(0)
    }

    pub fn roster_count(&self, pos: Position) -> usize {
        self.roster.get(&pos).copied().unwrap_or(0)
    }

    pub fn total_starters(&self) -> usize {
        self.starters.values().sum()
    }

    pub fn total_rostered(&self) -> usize {
        self.roster.values().sum()
    }

    /// Bench slots at `pos` (roster minus starters).
    pub fn bench_count(&self, pos: Position) -> usize {
        self.roster_count(pos).saturating_sub(self.starter_count(pos))
    }
}

// ---------------------------------------------------------------------------
// Starters and flex
// ---------------------------------------------------------------------------

/// Pick the flex starters: everyone at a flex-eligible position ranked below
/// that position's dedicated starters, merged and ranked, top `slots` taken.
///
/// Groups must already be sorted.
pub fn select_flex(
    pool: &PlayerPool,
    dedicated: &BTreeMap<Position, usize>,
    eligible: &[Position],
    slots: usize,
) -> Vec<PlayerId> {
    if slots == 0 {
        return Vec::new();
    }

    let mut remaining: Vec<PlayerId> = Vec::new();
    for &pos in Position::ALL.iter().filter(|p| eligible.contains(*p)) {
        let taken = dedicated.get(&pos).copied().unwrap_or(0);
        remaining.extend_from_slice(pool.rank_range(pos, taken, usize::MAX));
    }

    remaining.sort_by(|a, b| pool.rank_cmp(*a, *b));
    remaining.truncate(slots);
    remaining
}

/// Starting slots per skill position, with flex winners credited to their
/// own position. Returns the counts and the flex winners.
pub fn starter_counts(
    pool: &PlayerPool,
    league: &LeagueConfig,
) -> (BTreeMap<Position, usize>, Vec<PlayerId>) {
    let mut starters: BTreeMap<Position, usize> = Position::ALL
        .iter()
        .map(|&pos| (pos, league.starters.for_position(pos) * league.num_teams))
        .collect();

    let flex_slots = league.starters.flex * league.num_teams;
    let flex = select_flex(pool, &starters, &league.flex_positions, flex_slots);
    for &id in &flex {
        *starters.entry(pool.get(id).position).or_insert(0) += 1;
    }

    if flex.len() < flex_slots {
        debug!(
            "only {} of {} flex slots could be filled",
            flex.len(),
            flex_slots
        );
    }

    (starters, flex)
}

// ---------------------------------------------------------------------------
// Roster (starters + bench)
// ---------------------------------------------------------------------------

/// Total roster slots per skill position.
///
/// With an explicit `bench_allocation`, each position gets its listed bench
/// count (league-wide) on top of its starters; unlisted positions get none.
/// Otherwise the league's bench slots are spread in proportion to starter
/// counts, rounding each share down.
pub fn roster_counts(
    starters: &BTreeMap<Position, usize>,
    league: &LeagueConfig,
) -> Result<BTreeMap<Position, usize>, ConfigError> {
    let mut roster = BTreeMap::new();

    if let Some(allocation) = &league.bench_allocation {
        for &pos in &Position::ALL {
            let start = starters.get(&pos).copied().unwrap_or(0);
            let bench = allocation.get(&pos).copied().unwrap_or(0);
            roster.insert(pos, start + bench);
        }
        return Ok(roster);
    }

    let total_starters: usize = starters.values().sum();
    if total_starters == 0 {
        return Err(ConfigError::ZeroDivisor {
            quantity: "total starters".into(),
        });
    }

    let total_bench = (league.bench * league.num_teams) as f64;
    for &pos in &Position::ALL {
        let start = starters.get(&pos).copied().unwrap_or(0);
        let share = start as f64 / total_starters as f64 * total_bench;
        roster.insert(pos, start + share.floor() as usize);
    }

    Ok(roster)
}

/// Compute all league-wide slot counts. Groups must already be sorted.
pub fn allocate(pool: &PlayerPool, league: &LeagueConfig) -> Result<RosterCounts, ConfigError> {
    let (starters, flex) = starter_counts(pool, league);
    let roster = roster_counts(&starters, league)?;

    for &pos in &Position::ALL {
        debug!(
            "{}: {} starters, {} rostered",
            pos,
            starters.get(&pos).copied().unwrap_or(0),
            roster.get(&pos).copied().unwrap_or(0)
        );
    }

    Ok(RosterCounts {
        starters,
        roster,
        kickers: league.starters.k * league.num_teams,
        defenses: league.starters.def * league.num_teams,
        flex,
    })
}

/// Players holding bench slots at `pos`: the half-open rank range
/// `[starters, roster)`, clamped to the group.
pub fn bench_slice(pool: &PlayerPool, counts: &RosterCounts, pos: Position) -> Vec<PlayerId> {
    pool.rank_range(pos, counts.starter_count(pos), counts.roster_count(pos))
        .to_vec()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
