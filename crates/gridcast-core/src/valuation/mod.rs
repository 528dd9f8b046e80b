// Valuation engine: points, roster allocation, two-tier VBD, auction prices.

pub mod price;
pub mod projections;
pub mod roster;
pub mod scoring;
pub mod vbd;

use tracing::info;

use crate::config::{ConfigError, LeagueConfig};
use crate::pool::PlayerPool;
use crate::valuation::price::{BudgetReport, PriceFactors};
use crate::valuation::roster::RosterCounts;
use crate::valuation::scoring::ScoringRules;
use crate::valuation::vbd::TierBaselines;

#[derive(Debug, thiserror::Error)]
pub enum ValuationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Arithmetic on finite inputs overflowed (huge projections times
    /// scoring weights, or VBD totals past `f64::MAX`).
    #[error("{quantity} for {subject} is not finite ({value})")]
    NonFinite {
        subject: String,
        quantity: &'static str,
        value: f64,
    },
}

/// Everything a valuation run derived besides the per-player fields.
#[derive(Debug, Clone)]
pub struct ValuationRun {
    pub counts: RosterCounts,
    pub baselines: TierBaselines,
    pub factors: PriceFactors,
    pub budget: BudgetReport,
}

/// Run the full pipeline over `pool`: points, roster allocation, VBD, prices.
///
/// Derived player fields are reset first, so the same pool can be valued
/// again under a different league or scoring table.
pub fn compute_valuations(
    pool: &mut PlayerPool,
    league: &LeagueConfig,
    rules: &ScoringRules,
) -> Result<ValuationRun, ValuationError> {
    league.validate()?;
    rules.validate()?;

    pool.reset_derived();

    scoring::calculate_points(pool, rules);
    if let Some(player) = pool.players().iter().find(|p| !p.projected_points.is_finite()) {
        return Err(ValuationError::NonFinite {
            subject: player.name.clone(),
            quantity: "projected points",
            value: player.projected_points,
        });
    }
    info!("Scored {} players", pool.len());

    let counts = roster::allocate(pool, league)?;
    info!(
        "Allocated {} starters and {} rostered slots ({} flex)",
        counts.total_starters(),
        counts.total_rostered(),
        counts.flex.len()
    );

    let baselines = vbd::calculate_vbd(pool, &counts);

    let factors = price::compute_price_factors(pool, &counts, league)?;
    let clamped = price::apply_prices(pool, &factors)?;
    let budget = price::budget_report(pool, factors.available_budget, clamped);
    info!(
        "Priced players: ${:.2} of ${:.2} allocated (margin {:+.4}%)",
        budget.allocated,
        budget.available_budget,
        budget.margin * 100.0
    );

    Ok(ValuationRun {
        counts,
        baselines,
        factors,
        budget,
    })
}
