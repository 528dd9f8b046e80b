// Configuration loading and parsing (league.toml, scoring.toml).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::player::Position;
use crate::valuation::scoring::ScoringRules;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },

    /// A league-wide aggregate used as a divisor came out as zero, so the
    /// configuration cannot be valued against this player pool.
    #[error("{quantity} is zero; the league configuration cannot be valued")]
    ZeroDivisor { quantity: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub scoring: ScoringRules,
    pub data_paths: DataPaths,
    pub data: DataOptions,
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire league.toml file.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueConfig,
    #[serde(default)]
    data_paths: DataPaths,
    #[serde(default)]
    data: DataOptions,
}

/// Roster shape and budget rules for one league.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeagueConfig {
    pub name: String,
    pub num_teams: usize,
    /// Auction dollars per team.
    pub team_budget: f64,
    pub starters: StarterSlots,
    /// Positions eligible to fill a FLEX slot.
    pub flex_positions: Vec<Position>,
    /// Bench slots per team.
    pub bench: usize,
    /// League-wide bench slots per position. Replaces the proportional
    /// bench split when present.
    pub bench_allocation: Option<BTreeMap<Position, usize>>,
    /// Share of the available budget paid for starter-tier value.
    pub starter_budget_fraction: f64,
    /// Dollars reserved per kicker and defense roster slot.
    pub fixed_slot_cost: f64,
}

impl Default for LeagueConfig {
    fn default() -> Self {
        LeagueConfig {
            name: "Default League".into(),
            num_teams: 12,
            team_budget: 200.0,
            starters: StarterSlots::default(),
            flex_positions: vec![
                Position::RunningBack,
                Position::WideReceiver,
                Position::TightEnd,
            ],
            bench: 6,
            bench_allocation: None,
            starter_budget_fraction: 0.88,
            fixed_slot_cost: 1.0,
        }
    }
}

/// Starting lineup slots per team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarterSlots {
    #[serde(rename = "QB")]
    pub qb: usize,
    #[serde(rename = "RB")]
    pub rb: usize,
    #[serde(rename = "WR")]
    pub wr: usize,
    #[serde(rename = "TE")]
    pub te: usize,
    #[serde(rename = "FLEX")]
    pub flex: usize,
    #[serde(rename = "K")]
    pub k: usize,
    #[serde(rename = "DEF")]
    pub def: usize,
}

impl Default for StarterSlots {
    fn default() -> Self {
        StarterSlots {
            qb: 1,
            rb: 2,
            wr: 2,
            te: 1,
            flex: 1,
            k: 1,
            def: 1,
        }
    }
}

impl StarterSlots {
    /// Dedicated (non-flex) starters per team at a skill position.
    pub fn for_position(&self, pos: Position) -> usize {
        match pos {
            Position::Quarterback => self.qb,
            Position::RunningBack => self.rb,
            Position::WideReceiver => self.wr,
            Position::TightEnd => self.te,
        }
    }

    /// Total starting lineup size per team, kicker and defense included.
    pub fn per_team(&self) -> usize {
        self.qb + self.rb + self.wr + self.te + self.flex + self.k + self.def
    }
}

impl LeagueConfig {
    /// Roster size per team (all starters plus bench).
    pub fn roster_size(&self) -> usize {
        self.starters.per_team() + self.bench
    }

    /// Every dollar in the league before deductions.
    pub fn total_budget(&self) -> f64 {
        self.num_teams as f64 * self.team_budget
    }

    /// Dollars left for skill players once each team has reserved its
    /// kicker and defense slots.
    pub fn available_budget(&self) -> f64 {
        let fixed_slots = (self.starters.k + self.starters.def) * self.num_teams;
        self.total_budget() - fixed_slots as f64 * self.fixed_slot_cost
    }

    pub fn starter_budget(&self) -> f64 {
        self.available_budget() * self.starter_budget_fraction
    }

    pub fn bench_budget(&self) -> f64 {
        self.available_budget() * (1.0 - self.starter_budget_fraction)
    }

    /// League-wide roster slots: every starter and bench slot for every
    /// team, plus any explicit bench allocation. `None` when the count does
    /// not fit in a `usize`.
    pub fn league_slots(&self) -> Option<usize> {
        let s = &self.starters;
        let per_team = [s.qb, s.rb, s.wr, s.te, s.flex, s.k, s.def, self.bench]
            .into_iter()
            .try_fold(0usize, usize::checked_add)?;
        let allocated = self
            .bench_allocation
            .iter()
            .flat_map(|a| a.values())
            .try_fold(0usize, |acc, &n| acc.checked_add(n))?;
        per_team.checked_mul(self.num_teams)?.checked_add(allocated)
    }

    /// Check the league shape for values the valuation pipeline cannot use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_teams == 0 {
            return Err(invalid("league.num_teams", "must be greater than 0".into()));
        }

        // Every slot product used downstream is bounded by this total.
        if self.league_slots().is_none() {
            return Err(invalid(
                "league.num_teams",
                format!(
                    "{} teams with these roster slots overflows the slot count",
                    self.num_teams
                ),
            ));
        }

        if !self.team_budget.is_finite() || self.team_budget < 0.0 {
            return Err(invalid(
                "league.team_budget",
                format!("must be a finite value >= 0, got {}", self.team_budget),
            ));
        }

        if !self.fixed_slot_cost.is_finite() || self.fixed_slot_cost < 0.0 {
            return Err(invalid(
                "league.fixed_slot_cost",
                format!("must be a finite value >= 0, got {}", self.fixed_slot_cost),
            ));
        }

        let available = self.available_budget();
        if available < 0.0 {
            return Err(invalid(
                "league.team_budget",
                format!("kicker/defense reservations exceed the budget (available {available})"),
            ));
        }

        let frac = self.starter_budget_fraction;
        if !(frac > 0.0 && frac < 1.0) {
            return Err(invalid(
                "league.starter_budget_fraction",
                format!("must be strictly between 0.0 and 1.0, got {frac}"),
            ));
        }

        if self.starters.flex > 0 && self.flex_positions.is_empty() {
            return Err(invalid(
                "league.flex_positions",
                "must list at least one position when FLEX slots are configured".into(),
            ));
        }

        Ok(())
    }
}

/// Where projection data lives, relative to the base directory.
#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub projections: String,
}

impl Default for DataPaths {
    fn default() -> Self {
        DataPaths {
            projections: "data/projections.csv".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct DataOptions {
    /// Reject rows whose position is not QB/RB/WR/TE instead of skipping them.
    pub strict_positions: bool,
}

// ---------------------------------------------------------------------------
// scoring.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct ScoringFile {
    scoring: ScoringRules,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/league.toml` and
/// (optionally) `config/scoring.toml`, both relative to `base_dir`.
///
/// Does not copy defaults; call `ensure_config_files` first.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- league.toml (required) ---
    let league_path = config_dir.join("league.toml");
    let league_text = read_file(&league_path)?;
    let league_file: LeagueFile =
        toml::from_str(&league_text).map_err(|e| ConfigError::ParseError {
            path: league_path.clone(),
            source: e,
        })?;

    // --- scoring.toml (optional) ---
    let scoring_path = config_dir.join("scoring.toml");
    let scoring = if scoring_path.exists() {
        let scoring_text = read_file(&scoring_path)?;
        let scoring_file: ScoringFile =
            toml::from_str(&scoring_text).map_err(|e| ConfigError::ParseError {
                path: scoring_path.clone(),
                source: e,
            })?;
        scoring_file.scoring
    } else {
        ScoringRules::default()
    };

    let config = Config {
        league: league_file.league,
        scoring,
        data_paths: league_file.data_paths,
        data: league_file.data,
    };

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or pass --base-dir",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    let mut copied = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }

        let target = config_dir.join(file_name);
        if copy_if_missing(&path, &target)? {
            copied.push(target);
        }
    }

    Ok(copied)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

/// Copy `source` to `target` unless `target` already exists. Returns whether
/// a copy happened.
fn copy_if_missing(source: &Path, target: &Path) -> Result<bool, ConfigError> {
    let mut dest = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => {
            return Err(ConfigError::DefaultsCopyError {
                message: format!("failed to create {}: {e}", target.display()),
            })
        }
    };

    let content = std::fs::read(source).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read {}: {e}", source.display()),
    })?;
    std::io::Write::write_all(&mut dest, &content).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to write {}: {e}", target.display()),
    })?;

    Ok(true)
}

fn invalid(field: &str, message: String) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message,
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    config.league.validate()?;
    config.scoring.validate()?;

    if config.data_paths.projections.trim().is_empty() {
        return Err(invalid("data_paths.projections", "must not be empty".into()));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
