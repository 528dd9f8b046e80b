// Projection data loading.
//
// Reads a season projection CSV (one row per player, camelCase stat columns)
// into `Player` records. Rows at positions other than QB/RB/WR/TE are
// dropped, or rejected in strict mode.

use serde::Deserialize;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::{Config, DataOptions};
use crate::player::{Player, Position, StatCategory, StatLine};
use crate::pool::PlayerPool;

/// Identity columns every projection file must carry.
pub const IDENTITY_COLUMNS: [&str; 3] = ["name", "team", "position"];

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ProjectionError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("projection file is missing required column `{column}`")]
    MissingColumn { column: String },

    #[error("line {line}: {source}")]
    Row { line: u64, source: csv::Error },

    #[error("line {line}: `{column}` for '{name}' is not a finite number")]
    NonFinite {
        line: u64,
        name: String,
        column: &'static str,
    },

    #[error("line {line}: unknown position '{position}' for '{name}'")]
    UnknownPosition {
        line: u64,
        name: String,
        position: String,
    },

    #[error("line {line}: duplicate player name '{name}'")]
    DuplicatePlayer { line: u64, name: String },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Raw CSV serde struct (private)
// ---------------------------------------------------------------------------

/// One projection row. Unlisted columns are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProjectionRow {
    name: String,
    team: String,
    position: String,
    pass_att: f64,
    pass_comp: f64,
    pass_yds: f64,
    pass_tds: f64,
    two_pts: f64,
    sacks: f64,
    pass_int: f64,
    rush_att: f64,
    rush_yds: f64,
    rush_tds: f64,
    rec: f64,
    rec_yds: f64,
    rec_tds: f64,
    fumbles: f64,
}

impl RawProjectionRow {
    fn stat_line(&self) -> StatLine {
        StatLine {
            pass_att: self.pass_att,
            pass_comp: self.pass_comp,
            pass_yds: self.pass_yds,
            pass_tds: self.pass_tds,
            two_pts: self.two_pts,
            sacks: self.sacks,
            pass_int: self.pass_int,
            rush_att: self.rush_att,
            rush_yds: self.rush_yds,
            rush_tds: self.rush_tds,
            rec: self.rec,
            rec_yds: self.rec_yds,
            rec_tds: self.rec_tds,
            fumbles: self.fumbles,
        }
    }
}

// ---------------------------------------------------------------------------
// Reader-based loader (enables testing without temp files)
// ---------------------------------------------------------------------------

/// Every column a projection file must provide, identity columns first.
pub fn required_columns() -> impl Iterator<Item = &'static str> {
    IDENTITY_COLUMNS
        .into_iter()
        .chain(StatCategory::ALL.into_iter().map(|c| c.key()))
}

fn check_headers(headers: &csv::StringRecord) -> Result<(), ProjectionError> {
    let present: HashSet<&str> = headers.iter().map(str::trim).collect();
    match required_columns().find(|col| !present.contains(col)) {
        Some(column) => Err(ProjectionError::MissingColumn {
            column: column.to_string(),
        }),
        None => Ok(()),
    }
}

/// Parse projection rows into players, in file order.
pub fn load_players_from_reader<R: Read>(
    rdr: R,
    options: &DataOptions,
) -> Result<Vec<Player>, ProjectionError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(rdr);

    let headers = reader
        .headers()
        .map_err(|e| ProjectionError::Row { line: 1, source: e })?
        .clone();
    check_headers(&headers)?;

    let mut players = Vec::new();
    let mut seen = HashSet::new();
    let mut skipped = 0usize;

    for result in reader.records() {
        let record = result.map_err(|e| ProjectionError::Row {
            line: e.position().map_or(0, csv::Position::line),
            source: e,
        })?;
        // Physical line the record starts on; blank lines are counted.
        let line = record.position().map_or(0, csv::Position::line);
        let raw: RawProjectionRow = record
            .deserialize(Some(&headers))
            .map_err(|e| ProjectionError::Row { line, source: e })?;
        let name = raw.name.trim().to_string();

        let stats = raw.stat_line();
        if let Some(category) = StatCategory::ALL.iter().find(|c| !stats.get(**c).is_finite()) {
            return Err(ProjectionError::NonFinite {
                line,
                name,
                column: category.key(),
            });
        }

        let Some(position) = Position::from_str_pos(&raw.position) else {
            if options.strict_positions {
                return Err(ProjectionError::UnknownPosition {
                    line,
                    name,
                    position: raw.position.trim().to_string(),
                });
            }
            debug!("skipping '{}': position '{}' is not valued", name, raw.position.trim());
            skipped += 1;
            continue;
        };

        if !seen.insert(name.clone()) {
            return Err(ProjectionError::DuplicatePlayer { line, name });
        }

        for category in StatCategory::ALL {
            if stats.get(category) < 0.0 {
                warn!(
                    "'{}' has a negative `{}` projection ({})",
                    name,
                    category.key(),
                    stats.get(category)
                );
            }
        }

        players.push(Player::new(name, raw.team.trim(), position, stats));
    }

    if skipped > 0 {
        info!("skipped {} rows outside QB/RB/WR/TE", skipped);
    }

    Ok(players)
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

/// Load projections from a CSV file into a position-partitioned pool.
pub fn load_projections(path: &Path, options: &DataOptions) -> Result<PlayerPool, ProjectionError> {
    let file = std::fs::File::open(path).map_err(|e| ProjectionError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let players = load_players_from_reader(file, options)?;

    if players.is_empty() {
        return Err(ProjectionError::Validation(format!(
            "{} produced zero QB/RB/WR/TE rows",
            path.display()
        )));
    }

    info!("Loaded {} players from {}", players.len(), path.display());
    Ok(PlayerPool::from_players(players))
}

/// Load projections using the path and options from the config, resolving
/// a relative path against `base_dir`.
pub fn load_all(config: &Config, base_dir: &Path) -> Result<PlayerPool, ProjectionError> {
    let path = base_dir.join(&config.data_paths.projections);
    load_projections(&path, &config.data)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
