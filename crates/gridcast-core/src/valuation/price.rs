// Auction price model.
//
// Splits the available budget into a starter share and a bench share, then
// solves two dollars-per-VBD factors so that paying every player
//
//   price = starter_vbd * starter_pf + (bench_vbd - starter_vbd) * bench_pf
//
// spends exactly the available budget. The bench factor is fixed by the
// bench-only players; the starter factor absorbs what starters already
// collect at the bench rate.

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{ConfigError, LeagueConfig};
use crate::player::Position;
use crate::pool::PlayerPool;
use crate::valuation::roster::{bench_slice, RosterCounts};
use crate::valuation::ValuationError;

// ---------------------------------------------------------------------------
// PriceFactors struct
// ---------------------------------------------------------------------------

/// League-wide conversion factors from VBD to dollars, plus the totals they
/// were derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceFactors {
    pub available_budget: f64,
    /// `available_budget * starter_budget_fraction`.
    pub starter_budget: f64,
    /// `available_budget * (1 - starter_budget_fraction)`.
    pub bench_budget: f64,
    /// Sum of starter VBD across every starter slice.
    pub total_starter_vbd: f64,
    /// Sum of bench VBD over the bench-only rank ranges.
    pub total_bench_vbd: f64,
    /// Dollars starters collect at the bench rate, in units of bench VBD.
    pub start_value_over_bench: f64,
    /// Dollars per unit of bench-tier VBD.
    pub bench_pf: f64,
    /// Dollars per unit of starter-tier VBD.
    pub starter_pf: f64,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Solve the bench and starter price factors.
///
/// Algorithm:
/// 1. `total_bench_vbd` = bench VBD summed over `[starters, roster)` per position
/// 2. `bench_pf` = `bench_budget / total_bench_vbd`
/// 3. `start_value_over_bench` = per position, the last starter's
///    `bench_vbd - starter_vbd` times the number of starters present
/// 4. `starter_pf` = `(starter_budget - start_value_over_bench * bench_pf) / total_starter_vbd`
///
/// Either VBD total being zero is a `ConfigError::ZeroDivisor`; a total that
/// overflows is `ValuationError::NonFinite`.
pub fn compute_price_factors(
    pool: &PlayerPool,
    counts: &RosterCounts,
    league: &LeagueConfig,
) -> Result<PriceFactors, ValuationError> {
    let available_budget = league.available_budget();
    let starter_budget = league.starter_budget();
    let bench_budget = league.bench_budget();

    let total_bench_vbd: f64 = Position::ALL
        .iter()
        .flat_map(|&pos| bench_slice(pool, counts, pos))
        .map(|id| pool.get(id).bench_vbd)
        .sum();

    ensure_finite("total bench VBD", total_bench_vbd)?;
    if total_bench_vbd <= 0.0 {
        return Err(ConfigError::ZeroDivisor {
            quantity: "total bench VBD".into(),
        }
        .into());
    }
    let bench_pf = bench_budget / total_bench_vbd;

    let mut total_starter_vbd = 0.0;
    let mut start_value_over_bench = 0.0;
    for &pos in &Position::ALL {
        let starters = pool.top_n(pos, counts.starter_count(pos));
        let Some(&last) = starters.last() else {
            continue;
        };
        let last = pool.get(last);
        start_value_over_bench += (last.bench_vbd - last.starter_vbd) * starters.len() as f64;
        total_starter_vbd += starters.iter().map(|&id| pool.get(id).starter_vbd).sum::<f64>();
    }

    ensure_finite("total starter VBD", total_starter_vbd)?;
    ensure_finite("start value over bench", start_value_over_bench)?;
    if total_starter_vbd <= 0.0 {
        return Err(ConfigError::ZeroDivisor {
            quantity: "total starter VBD".into(),
        }
        .into());
    }
    let starter_pf = (starter_budget - start_value_over_bench * bench_pf) / total_starter_vbd;

    debug!(
        "price factors: starter_pf={:.4} bench_pf={:.4} (starter VBD {:.1}, bench VBD {:.1})",
        starter_pf, bench_pf, total_starter_vbd, total_bench_vbd
    );

    Ok(PriceFactors {
        available_budget,
        starter_budget,
        bench_budget,
        total_starter_vbd,
        total_bench_vbd,
        start_value_over_bench,
        bench_pf,
        starter_pf,
    })
}

fn ensure_finite(quantity: &'static str, value: f64) -> Result<(), ValuationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValuationError::NonFinite {
            subject: "league".into(),
            quantity,
            value,
        })
    }
}

/// Dollar price for one player's VBD pair, before clamping.
pub fn raw_price(starter_vbd: f64, bench_vbd: f64, factors: &PriceFactors) -> f64 {
    starter_vbd * factors.starter_pf + (bench_vbd - starter_vbd) * factors.bench_pf
}

/// Price every player in the pool. Negative prices are clamped to $0.
/// Returns how many prices were clamped.
///
/// A NaN or infinite raw price aborts the pass; players already visited keep
/// their new price.
pub fn apply_prices(pool: &mut PlayerPool, factors: &PriceFactors) -> Result<usize, ValuationError> {
    let mut clamped = 0;
    for player in pool.players_mut() {
        let raw = raw_price(player.starter_vbd, player.bench_vbd, factors);
        if !raw.is_finite() {
            return Err(ValuationError::NonFinite {
                subject: player.name.clone(),
                quantity: "price",
                value: raw,
            });
        }
        if raw < 0.0 {
            warn!("clamping negative price for {} ({:.2}) to $0", player.name, raw);
            clamped += 1;
        }
        player.price = raw.max(0.0);
    }
    Ok(clamped)
}

// ---------------------------------------------------------------------------
// Budget check
// ---------------------------------------------------------------------------

/// How closely the assigned prices spend the available budget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BudgetReport {
    /// Sum of every player's price.
    pub allocated: f64,
    pub available_budget: f64,
    /// `(allocated - available) / available`; 0 when nothing is available.
    pub margin: f64,
    /// Players whose raw price was negative and got clamped.
    pub clamped: usize,
}

impl BudgetReport {
    /// Whether the allocation is within `tolerance` (fractional) of the budget.
    pub fn within(&self, tolerance: f64) -> bool {
        self.margin.abs() <= tolerance
    }
}

pub fn budget_report(pool: &PlayerPool, available_budget: f64, clamped: usize) -> BudgetReport {
    let allocated: f64 = pool.players().iter().map(|p| p.price).sum();
    let margin = if available_budget > 0.0 {
        (allocated - available_budget) / available_budget
    } else {
        0.0
    };
    BudgetReport {
        allocated,
        available_budget,
        margin,
        clamped,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StarterSlots;
    use crate::player::{Player, StatLine};
    use crate::valuation::roster::allocate;
    use crate::valuation::vbd::calculate_vbd;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn make_player(name: &str, position: Position, points: f64) -> Player {
        let mut player = Player::new(name, "TST", position, StatLine::default());
        player.projected_points = points;
        player
    }

    fn ladder(prefix: &str, pos: Position, count: usize, top: f64, step: f64) -> Vec<Player> {
        (0..count)
            .map(|i| make_player(&format!("{prefix}{}", i + 1), pos, top - step * i as f64))
            .collect()
    }

    /// Four-team league with a deep pool at every position.
    fn four_team_setup() -> (PlayerPool, LeagueConfig) {
        let mut players = ladder("QB", Position::Quarterback, 12, 360.0, 12.0);
        players.extend(ladder("RB", Position::RunningBack, 24, 280.0, 9.0));
        players.extend(ladder("WR", Position::WideReceiver, 24, 270.0, 8.0));
        players.extend(ladder("TE", Position::TightEnd, 12, 190.0, 11.0));
        let mut pool = PlayerPool::from_players(players);
        pool.sort_groups();

        let league = LeagueConfig {
            num_teams: 4,
            ..LeagueConfig::default()
        };
        (pool, league)
    }

    fn run(pool: &mut PlayerPool, league: &LeagueConfig) -> Result<(PriceFactors, BudgetReport), ValuationError> {
        let counts = allocate(pool, league)?;
        calculate_vbd(pool, &counts);
        let factors = compute_price_factors(pool, &counts, league)?;
        let clamped = apply_prices(pool, &factors)?;
        let report = budget_report(pool, factors.available_budget, clamped);
        Ok((factors, report))
    }

    #[test]
    fn prices_sum_to_available_budget() {
        let (mut pool, league) = four_team_setup();
        let (factors, report) = run(&mut pool, &league).unwrap();

        // 4 * 200 - (1 K + 1 DEF) * 4 * $1 = 792
        assert!(approx_eq(factors.available_budget, 792.0, 1e-9));
        assert!(
            approx_eq(report.allocated, 792.0, 1e-6),
            "allocated {} of 792",
            report.allocated
        );
        assert!(report.within(1e-9));
        assert_eq!(report.clamped, 0);
    }

    #[test]
    fn starters_priced_above_bench_players() {
        let (mut pool, league) = four_team_setup();
        run(&mut pool, &league).unwrap();

        let qb1 = pool.find("QB1").unwrap().price;
        let qb4 = pool.find("QB4").unwrap().price;
        let qb12 = pool.find("QB12").unwrap().price;
        assert!(qb1 > qb4);
        assert!(qb4 >= 0.0);
        // QB12 sits below the bench baseline.
        assert_eq!(qb12, 0.0);
    }

    #[test]
    fn bench_budget_share_goes_to_bench_tier() {
        let (mut pool, league) = four_team_setup();
        let counts = allocate(&pool, &league).unwrap();
        calculate_vbd(&mut pool, &counts);
        let factors = compute_price_factors(&pool, &counts, &league).unwrap();
        apply_prices(&mut pool, &factors).unwrap();

        let bench_spend: f64 = Position::ALL
            .iter()
            .flat_map(|&pos| bench_slice(&pool, &counts, pos))
            .map(|id| pool.get(id).price)
            .sum();
        // Bench-only players have starter_vbd 0, so they are paid at bench_pf alone.
        assert!(approx_eq(bench_spend, factors.bench_budget, 1e-6));
    }

    #[test]
    fn thin_position_still_sums_to_budget() {
        // Only 3 TEs for 4 starting slots plus bench.
        let mut players = ladder("QB", Position::Quarterback, 10, 340.0, 10.0);
        players.extend(ladder("RB", Position::RunningBack, 20, 260.0, 8.0));
        players.extend(ladder("WR", Position::WideReceiver, 20, 250.0, 8.0));
        players.extend(ladder("TE", Position::TightEnd, 3, 170.0, 20.0));
        let mut pool = PlayerPool::from_players(players);
        pool.sort_groups();
        let league = LeagueConfig {
            num_teams: 4,
            ..LeagueConfig::default()
        };

        let (_, report) = run(&mut pool, &league).unwrap();
        assert!(approx_eq(report.allocated, 792.0, 1e-6));
    }

    #[test]
    fn flat_pool_is_config_error() {
        // Every player scores the same, so all VBD is zero.
        let mut players = ladder("QB", Position::Quarterback, 4, 200.0, 0.0);
        players.extend(ladder("RB", Position::RunningBack, 4, 200.0, 0.0));
        let mut pool = PlayerPool::from_players(players);
        pool.sort_groups();
        let league = LeagueConfig {
            num_teams: 1,
            starters: StarterSlots {
                qb: 1,
                rb: 1,
                wr: 0,
                te: 0,
                flex: 0,
                k: 0,
                def: 0,
            },
            ..LeagueConfig::default()
        };

        match run(&mut pool, &league) {
            Err(ValuationError::Config(ConfigError::ZeroDivisor { quantity })) => {
                assert_eq!(quantity, "total bench VBD")
            },
            other => panic!("expected ZeroDivisor, got {other:?}"),
        }
        for player in pool.players() {
            assert!(player.price.is_finite());
        }
    }

    #[test]
    fn zero_starter_vbd_with_bench_value_is_config_error() {
        // One starter per position: each starter is its own baseline, so the
        // starter tier has no value while the bench tier does.
        let mut pool = PlayerPool::from_players(ladder("QB", Position::Quarterback, 6, 300.0, 10.0));
        pool.sort_groups();
        let league = LeagueConfig {
            num_teams: 1,
            starters: StarterSlots {
                qb: 1,
                rb: 0,
                wr: 0,
                te: 0,
                flex: 0,
                k: 0,
                def: 0,
            },
            bench: 4,
            ..LeagueConfig::default()
        };

        match run(&mut pool, &league) {
            Err(ValuationError::Config(ConfigError::ZeroDivisor { quantity })) => {
                assert_eq!(quantity, "total starter VBD")
            },
            other => panic!("expected ZeroDivisor, got {other:?}"),
        }
    }

    #[test]
    fn negative_raw_price_is_clamped() {
        let factors = PriceFactors {
            available_budget: 100.0,
            starter_budget: 88.0,
            bench_budget: 12.0,
            total_starter_vbd: 10.0,
            total_bench_vbd: 10.0,
            start_value_over_bench: 0.0,
            bench_pf: 1.0,
            starter_pf: -2.0,
        };
        let mut pool = PlayerPool::from_players(vec![
            make_player("Overpriced", Position::WideReceiver, 0.0),
            make_player("Bench", Position::WideReceiver, 0.0),
        ]);
        for player in pool.players_mut() {
            if player.name == "Overpriced" {
                player.starter_vbd = 5.0;
                player.bench_vbd = 6.0;
            } else {
                player.bench_vbd = 3.0;
            }
        }

        let clamped = apply_prices(&mut pool, &factors).unwrap();
        // Overpriced: 5 * -2 + 1 * 1 = -9 -> 0. Bench: 3 * 1 = 3.
        assert_eq!(clamped, 1);
        assert_eq!(pool.find("Overpriced").unwrap().price, 0.0);
        assert!(approx_eq(pool.find("Bench").unwrap().price, 3.0, 1e-9));
    }

    #[test]
    fn infinite_vbd_is_an_error_not_a_zero_price() {
        let factors = PriceFactors {
            available_budget: 100.0,
            starter_budget: 88.0,
            bench_budget: 12.0,
            total_starter_vbd: f64::INFINITY,
            total_bench_vbd: 10.0,
            start_value_over_bench: 0.0,
            bench_pf: 1.0,
            starter_pf: 0.0,
        };
        let mut pool = PlayerPool::from_players(vec![make_player("Runaway", Position::Quarterback, 0.0)]);
        for player in pool.players_mut() {
            player.starter_vbd = f64::INFINITY;
            player.bench_vbd = f64::INFINITY;
        }

        // inf * 0 + (inf - inf) * 1 is NaN.
        match apply_prices(&mut pool, &factors) {
            Err(ValuationError::NonFinite { subject, quantity, value }) => {
                assert_eq!(subject, "Runaway");
                assert_eq!(quantity, "price");
                assert!(value.is_nan());
            }
            other => panic!("expected NonFinite, got {other:?}"),
        }
    }

    #[test]
    fn overflowing_starter_total_is_an_error() {
        // Each starter VBD is finite; their sum is not.
        let mut pool = PlayerPool::from_players(vec![
            make_player("QB1", Position::Quarterback, 1.0e308),
            make_player("QB2", Position::Quarterback, 1.0e308),
            make_player("QB3", Position::Quarterback, 0.0),
            make_player("QB4", Position::Quarterback, -1.0),
            make_player("QB5", Position::Quarterback, -2.0),
        ]);
        pool.sort_groups();
        let league = LeagueConfig {
            num_teams: 3,
            starters: StarterSlots {
                qb: 1,
                rb: 0,
                wr: 0,
                te: 0,
                flex: 0,
                k: 0,
                def: 0,
            },
            bench: 0,
            bench_allocation: Some([(Position::Quarterback, 2)].into_iter().collect()),
            ..LeagueConfig::default()
        };

        match run(&mut pool, &league) {
            Err(ValuationError::NonFinite { subject, .. }) => assert_eq!(subject, "league"),
            other => panic!("expected NonFinite, got {other:?}"),
        }
    }

    #[test]
    fn budget_report_margin() {
        let mut pool = PlayerPool::from_players(vec![make_player("Only", Position::Quarterback, 0.0)]);
        for player in pool.players_mut() {
            player.price = 101.0;
        }
        let report = budget_report(&pool, 100.0, 0);
        assert!(approx_eq(report.margin, 0.01, 1e-12));
        assert!(!report.within(0.001));
    }
}
