// Value-based drafting (VBD) over two replacement tiers.
//
// Each tier takes the top N players at every position, where N comes from
// the roster allocation (starters for the starter tier, starters plus bench
// for the bench tier). The last player inside the slice is the replacement
// baseline, and every sliced player gets `points - baseline` for that tier.

use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::player::Position;
use crate::pool::PlayerPool;
use crate::valuation::roster::RosterCounts;

/// Which VBD field a pass writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Starter,
    Bench,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Starter => f.write_str("starter"),
            Tier::Bench => f.write_str("bench"),
        }
    }
}

/// Replacement-level points per position for one tier. A position with no
/// slots (or no players) has no entry.
pub type Baselines = BTreeMap<Position, f64>;

/// Baselines for both tiers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TierBaselines {
    pub starter: Baselines,
    pub bench: Baselines,
}

impl TierBaselines {
    pub fn get(&self, tier: Tier, pos: Position) -> Option<f64> {
        match tier {
            Tier::Starter => self.starter.get(&pos).copied(),
            Tier::Bench => self.bench.get(&pos).copied(),
        }
    }
}

/// Write one tier's VBD for every position and return the baselines used.
///
/// `counts` gives the slice size per position; slices are clamped to the
/// group. Players outside a slice keep whatever value they had (zero after
/// a reset). Groups must already be sorted.
pub fn assign_tier_vbd(
    pool: &mut PlayerPool,
    counts: &BTreeMap<Position, usize>,
    tier: Tier,
) -> Baselines {
    let mut baselines = Baselines::new();

    for &pos in &Position::ALL {
        let n = counts.get(&pos).copied().unwrap_or(0);
        let slice = pool.top_n(pos, n).to_vec();
        let Some(&last) = slice.last() else {
            debug!("{tier} tier: no baseline for {pos} ({n} slots)");
            continue;
        };

        let baseline = pool.get(last).projected_points;
        for id in slice {
            let player = pool.get_mut(id);
            let value = player.projected_points - baseline;
            match tier {
                Tier::Starter => player.starter_vbd = value,
                Tier::Bench => player.bench_vbd = value,
            }
        }

        debug!("{tier} tier: {pos} baseline {baseline:.1} over {n} slots");
        baselines.insert(pos, baseline);
    }

    baselines
}

/// Compute starter-tier and bench-tier VBD for the whole pool.
///
/// Re-sorts the groups first so the slices always reflect current points.
pub fn calculate_vbd(pool: &mut PlayerPool, counts: &RosterCounts) -> TierBaselines {
    pool.sort_groups();
    let starter = assign_tier_vbd(pool, &counts.starters, Tier::Starter);
    let bench = assign_tier_vbd(pool, &counts.roster, Tier::Bench);
    TierBaselines { starter, bench }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
