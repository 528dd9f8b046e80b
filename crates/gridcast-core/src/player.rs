// Player records: positions, raw stat lines, and derived valuation fields.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// Skill positions that take part in stat-based valuation.
///
/// Kickers and team defenses are not modeled here; they only reduce the
/// league budget (see `LeagueConfig::available_budget`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "QB", alias = "qb")]
    Quarterback,
    #[serde(rename = "RB", alias = "rb")]
    RunningBack,
    #[serde(rename = "WR", alias = "wr")]
    WideReceiver,
    #[serde(rename = "TE", alias = "te")]
    TightEnd,
}

impl Position {
    /// All skill positions in display order.
    pub const ALL: [Position; 4] = [
        Position::Quarterback,
        Position::RunningBack,
        Position::WideReceiver,
        Position::TightEnd,
    ];

    /// Parse a position abbreviation ("QB", "rb", ...). Returns `None` for
    /// anything outside the four skill positions, including "K" and "DEF".
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "QB" => Some(Position::Quarterback),
            "RB" => Some(Position::RunningBack),
            "WR" => Some(Position::WideReceiver),
            "TE" => Some(Position::TightEnd),
            _ => None,
        }
    }

    pub fn display_str(&self) -> &'static str {
        match self {
            Position::Quarterback => "QB",
            Position::RunningBack => "RB",
            Position::WideReceiver => "WR",
            Position::TightEnd => "TE",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.display_str())
    }
}

// ---------------------------------------------------------------------------
// Stat categories
// ---------------------------------------------------------------------------

/// Every raw statistic a projection row carries. The string keys are the
/// CSV column names and the keys used in scoring tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatCategory {
    PassAttempts,
    PassCompletions,
    PassYards,
    PassTouchdowns,
    TwoPointConversions,
    Sacks,
    Interceptions,
    RushAttempts,
    RushYards,
    RushTouchdowns,
    Receptions,
    ReceivingYards,
    ReceivingTouchdowns,
    Fumbles,
}

impl StatCategory {
    pub const ALL: [StatCategory; 14] = [
        StatCategory::PassAttempts,
        StatCategory::PassCompletions,
        StatCategory::PassYards,
        StatCategory::PassTouchdowns,
        StatCategory::TwoPointConversions,
        StatCategory::Sacks,
        StatCategory::Interceptions,
        StatCategory::RushAttempts,
        StatCategory::RushYards,
        StatCategory::RushTouchdowns,
        StatCategory::Receptions,
        StatCategory::ReceivingYards,
        StatCategory::ReceivingTouchdowns,
        StatCategory::Fumbles,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            StatCategory::PassAttempts => "passAtt",
            StatCategory::PassCompletions => "passComp",
            StatCategory::PassYards => "passYds",
            StatCategory::PassTouchdowns => "passTds",
            StatCategory::TwoPointConversions => "twoPts",
            StatCategory::Sacks => "sacks",
            StatCategory::Interceptions => "passInt",
            StatCategory::RushAttempts => "rushAtt",
            StatCategory::RushYards => "rushYds",
            StatCategory::RushTouchdowns => "rushTds",
            StatCategory::Receptions => "rec",
            StatCategory::ReceivingYards => "recYds",
            StatCategory::ReceivingTouchdowns => "recTds",
            StatCategory::Fumbles => "fumbles",
        }
    }

    /// Look up a category by its column/scoring key. Matching is exact.
    pub fn from_key(key: &str) -> Option<Self> {
        StatCategory::ALL.iter().copied().find(|c| c.key() == key)
    }
}

// ---------------------------------------------------------------------------
// Stat line
// ---------------------------------------------------------------------------

/// Projected season totals for one player.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatLine {
    pub pass_att: f64,
    pub pass_comp: f64,
    pub pass_yds: f64,
    pub pass_tds: f64,
    pub two_pts: f64,
    pub sacks: f64,
    pub pass_int: f64,
    pub rush_att: f64,
    pub rush_yds: f64,
    pub rush_tds: f64,
    pub rec: f64,
    pub rec_yds: f64,
    pub rec_tds: f64,
    pub fumbles: f64,
}

impl StatLine {
    pub fn get(&self, category: StatCategory) -> f64 {
        match category {
            StatCategory::PassAttempts => self.pass_att,
            StatCategory::PassCompletions => self.pass_comp,
            StatCategory::PassYards => self.pass_yds,
            StatCategory::PassTouchdowns => self.pass_tds,
            StatCategory::TwoPointConversions => self.two_pts,
            StatCategory::Sacks => self.sacks,
            StatCategory::Interceptions => self.pass_int,
            StatCategory::RushAttempts => self.rush_att,
            StatCategory::RushYards => self.rush_yds,
            StatCategory::RushTouchdowns => self.rush_tds,
            StatCategory::Receptions => self.rec,
            StatCategory::ReceivingYards => self.rec_yds,
            StatCategory::ReceivingTouchdowns => self.rec_tds,
            StatCategory::Fumbles => self.fumbles,
        }
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// A player carried through the valuation pipeline.
///
/// `projected_points`, `starter_vbd`, `bench_vbd` and `price` start at zero
/// and are written by the points, VBD and price passes respectively.
#[derive(Debug, Clone)]
pub struct Player {
    pub name: String,
    pub team: String,
    pub position: Position,
    pub stats: StatLine,
    pub projected_points: f64,
    pub starter_vbd: f64,
    pub bench_vbd: f64,
    pub price: f64,
}

impl Player {
    pub fn new(name: impl Into<String>, team: impl Into<String>, position: Position, stats: StatLine) -> Self {
        Player {
            name: name.into(),
            team: team.into(),
            position,
            stats,
            projected_points: 0.0,
            starter_vbd: 0.0,
            bench_vbd: 0.0,
            price: 0.0,
        }
    }

    /// Zero every derived field, leaving identity and raw stats untouched.
    pub fn reset_derived(&mut self) {
        self.projected_points = 0.0;
        self.starter_vbd = 0.0;
        self.bench_vbd = 0.0;
        self.price = 0.0;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
