// Output records for a finished valuation run.
//
// Flattens the pool and the run summary into plain serializable structs so
// presenters (table, TSV, JSON) never touch the arena directly.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;

use crate::config::LeagueConfig;
use crate::player::Position;
use crate::pool::PlayerPool;
use crate::valuation::price::{BudgetReport, PriceFactors};
use crate::valuation::ValuationRun;

/// Where a player landed in the league-wide allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Starter,
    Bench,
    Undrafted,
}

impl Role {
    /// Same spelling as the serialized value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Starter => "starter",
            Role::Bench => "bench",
            Role::Undrafted => "undrafted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationRecord {
    pub name: String,
    pub position: Position,
    pub team: String,
    /// 1-based rank within the position group.
    pub position_rank: usize,
    pub role: Role,
    pub projected_points: f64,
    #[serde(rename = "starterVBD")]
    pub starter_vbd: f64,
    #[serde(rename = "benchVBD")]
    pub bench_vbd: f64,
    pub price: f64,
}

/// Slot counts and baselines for one position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionSummary {
    pub position: Position,
    pub starters: usize,
    pub rostered: usize,
    pub starter_baseline: Option<f64>,
    pub bench_baseline: Option<f64>,
}

/// Run-level figures shown alongside the records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub positions: Vec<PositionSummary>,
    pub kickers: usize,
    pub defenses: usize,
    pub flex: Vec<String>,
    pub factors: PriceFactors,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValuationReport {
    pub generated_at: DateTime<Utc>,
    pub league: LeagueConfig,
    pub summary: RunSummary,
    pub records: Vec<ValuationRecord>,
    pub budget: BudgetReport,
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// One record per player, grouped by position (QB, RB, WR, TE) and in rank
/// order within each group.
pub fn records_from_pool(pool: &PlayerPool, run: &ValuationRun) -> Vec<ValuationRecord> {
    let mut records = Vec::with_capacity(pool.len());
    for &pos in &Position::ALL {
        let starters = run.counts.starter_count(pos);
        let rostered = run.counts.roster_count(pos);
        for (rank, &id) in pool.group(pos).iter().enumerate() {
            let player = pool.get(id);
            let role = if rank < starters {
                Role::Starter
            } else if rank < rostered {
                Role::Bench
            } else {
                Role::Undrafted
            };
            records.push(ValuationRecord {
                name: player.name.clone(),
                position: player.position,
                team: player.team.clone(),
                position_rank: rank + 1,
                role,
                projected_points: player.projected_points,
                starter_vbd: player.starter_vbd,
                bench_vbd: player.bench_vbd,
                price: player.price,
            });
        }
    }
    records
}

pub fn run_summary(pool: &PlayerPool, run: &ValuationRun) -> RunSummary {
    let positions = Position::ALL
        .iter()
        .map(|&pos| PositionSummary {
            position: pos,
            starters: run.counts.starter_count(pos),
            rostered: run.counts.roster_count(pos),
            starter_baseline: run.baselines.starter.get(&pos).copied(),
            bench_baseline: run.baselines.bench.get(&pos).copied(),
        })
        .collect();

    RunSummary {
        positions,
        kickers: run.counts.kickers,
        defenses: run.counts.defenses,
        flex: run.counts.flex.iter().map(|&id| pool.get(id).name.clone()).collect(),
        factors: run.factors,
    }
}

pub fn build_report(pool: &PlayerPool, league: &LeagueConfig, run: &ValuationRun) -> ValuationReport {
    ValuationReport {
        generated_at: Utc::now(),
        league: league.clone(),
        summary: run_summary(pool, run),
        records: records_from_pool(pool, run),
        budget: run.budget,
    }
}

/// Sort records league-wide by price, highest first. Equal prices fall back
/// to points, then name.
pub fn sort_by_price(records: &mut [ValuationRecord]) {
    records.sort_by(|a, b| {
        b.price
            .partial_cmp(&a.price)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                b.projected_points
                    .partial_cmp(&a.projected_points)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| a.name.cmp(&b.name))
    });
}

impl ValuationReport {
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
