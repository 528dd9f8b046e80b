// Fantasy points from projected stat lines.
//
// A scoring table maps category keys ("passYds", "rushTds", ...) to points
// per unit. Keys that name no known stat category are kept in the table but
// contribute nothing, so newer scoring files keep working against older
// projection formats.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::config::ConfigError;
use crate::player::{StatCategory, StatLine};
use crate::pool::PlayerPool;

/// Category key -> points per unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoringRules {
    weights: BTreeMap<String, f64>,
}

impl Default for ScoringRules {
    /// Standard non-PPR scoring with sack and turnover penalties.
    fn default() -> Self {
        let weights = [
            ("passAtt", 0.0),
            ("passComp", 0.0),
            ("passYds", 0.04),
            ("passTds", 4.0),
            ("twoPts", 2.0),
            ("sacks", -0.5),
            ("passInt", -2.0),
            ("rushAtt", 0.0),
            ("rushYds", 0.1),
            ("rushTds", 6.0),
            ("rec", 0.0),
            ("recYds", 0.1),
            ("recTds", 6.0),
            ("fumbles", -2.0),
        ];
        ScoringRules::from_pairs(weights)
    }
}

impl ScoringRules {
    pub fn from_pairs<K: Into<String>>(pairs: impl IntoIterator<Item = (K, f64)>) -> Self {
        ScoringRules {
            weights: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Set (or replace) the points for one key.
    pub fn set(&mut self, key: impl Into<String>, points: f64) {
        self.weights.insert(key.into(), points);
    }

    /// Points per unit for a known category, if the table mentions it.
    pub fn weight(&self, category: StatCategory) -> Option<f64> {
        self.weights.get(category.key()).copied()
    }

    /// Keys in the table that match no stat category.
    pub fn unknown_keys(&self) -> Vec<&str> {
        self.weights
            .keys()
            .filter(|k| StatCategory::from_key(k).is_none())
            .map(String::as_str)
            .collect()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, points) in &self.weights {
            if !points.is_finite() {
                return Err(ConfigError::ValidationError {
                    field: format!("scoring.{key}"),
                    message: format!("must be a finite number, got {points}"),
                });
            }
        }
        Ok(())
    }

    /// Resolve the table against the known categories once, dropping
    /// unknown keys.
    pub fn compile(&self) -> CompiledScoring {
        let unknown = self.unknown_keys();
        if !unknown.is_empty() {
            debug!("ignoring unknown scoring categories: {}", unknown.join(", "));
        }
        let terms = self
            .weights
            .iter()
            .filter_map(|(key, &points)| StatCategory::from_key(key).map(|c| (c, points)))
            .collect();
        CompiledScoring { terms }
    }
}

/// A scoring table resolved to (category, points per unit) terms.
#[derive(Debug, Clone)]
pub struct CompiledScoring {
    terms: Vec<(StatCategory, f64)>,
}

impl CompiledScoring {
    pub fn points_for(&self, stats: &StatLine) -> f64 {
        self.terms
            .iter()
            .map(|&(category, points)| stats.get(category) * points)
            .sum()
    }
}

/// Score every player in the pool, then re-rank each position group by
/// the new points.
pub fn calculate_points(pool: &mut PlayerPool, rules: &ScoringRules) {
    let scoring = rules.compile();
    for player in pool.players_mut() {
        player.projected_points = scoring.points_for(&player.stats);
    }
    pool.sort_groups();
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
