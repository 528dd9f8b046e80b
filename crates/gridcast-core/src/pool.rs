// Player arena partitioned into per-position groups.
//
// Players are stored once and addressed by `PlayerId` (their insertion
// index). Each position keeps an ordered list of ids; ranking-dependent code
// reads those lists after `sort_groups` has run.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::player::{Player, Position};

/// Stable handle to a player in a `PlayerPool`. Ids follow input order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlayerId(pub usize);

#[derive(Debug, Clone, Default)]
pub struct PlayerPool {
    players: Vec<Player>,
    groups: BTreeMap<Position, Vec<PlayerId>>,
}

impl PlayerPool {
    pub fn new() -> Self {
        let groups = Position::ALL.iter().map(|&pos| (pos, Vec::new())).collect();
        PlayerPool {
            players: Vec::new(),
            groups,
        }
    }

    pub fn from_players(players: impl IntoIterator<Item = Player>) -> Self {
        let mut pool = PlayerPool::new();
        for player in players {
            pool.push(player);
        }
        pool
    }

    /// Add a player to the arena and to the tail of its position group.
    pub fn push(&mut self, player: Player) -> PlayerId {
        let id = PlayerId(self.players.len());
        self.groups.entry(player.position).or_default().push(id);
        self.players.push(player);
        id
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn get(&self, id: PlayerId) -> &Player {
        &self.players[id.0]
    }

    pub fn get_mut(&mut self, id: PlayerId) -> &mut Player {
        &mut self.players[id.0]
    }

    /// All players in input order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn players_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        self.players.iter_mut()
    }

    pub fn find(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }

    /// Ids at `pos` in current group order.
    pub fn group(&self, pos: Position) -> &[PlayerId] {
        self.groups.get(&pos).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The first `n` ids of a group, clamped to the group size.
    pub fn top_n(&self, pos: Position, n: usize) -> &[PlayerId] {
        let group = self.group(pos);
        &group[..n.min(group.len())]
    }

    /// The half-open rank range `[start, end)` of a group, clamped.
    pub fn rank_range(&self, pos: Position, start: usize, end: usize) -> &[PlayerId] {
        let group = self.group(pos);
        let end = end.min(group.len());
        let start = start.min(end);
        &group[start..end]
    }

    /// Sort every group by projected points, descending. Equal points keep
    /// input order (lower id first), so repeated sorts are deterministic.
    pub fn sort_groups(&mut self) {
        let players = &self.players;
        for ids in self.groups.values_mut() {
            ids.sort_by(|a, b| rank_order(players, *a, *b));
        }
    }

    /// Compare two players for ranking: higher points first, then input order.
    pub fn rank_cmp(&self, a: PlayerId, b: PlayerId) -> Ordering {
        rank_order(&self.players, a, b)
    }

    /// Zero points, VBD and price on every player.
    pub fn reset_derived(&mut self) {
        for player in &mut self.players {
            player.reset_derived();
        }
    }
}

fn rank_order(players: &[Player], a: PlayerId, b: PlayerId) -> Ordering {
    players[b.0]
        .projected_points
        .partial_cmp(&players[a.0].projected_points)
        .unwrap_or(Ordering::Equal)
        .then(a.cmp(&b))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::StatLine;

    fn make_player(name: &str, position: Position, points: f64) -> Player {
        let mut player = Player::new(name, "TST", position, StatLine::default());
        player.projected_points = points;
        player
    }

    fn names(pool: &PlayerPool, ids: &[PlayerId]) -> Vec<String> {
        ids.iter().map(|&id| pool.get(id).name.clone()).collect()
    }

    #[test]
    fn players_partitioned_by_position() {
        let pool = PlayerPool::from_players(vec![
            make_player("QB1", Position::Quarterback, 300.0),
            make_player("RB1", Position::RunningBack, 200.0),
            make_player("QB2", Position::Quarterback, 250.0),
            make_player("TE1", Position::TightEnd, 120.0),
        ]);

        assert_eq!(pool.len(), 4);
        assert_eq!(names(&pool, pool.group(Position::Quarterback)), vec!["QB1", "QB2"]);
        assert_eq!(names(&pool, pool.group(Position::RunningBack)), vec!["RB1"]);
        assert!(pool.group(Position::WideReceiver).is_empty());
        assert_eq!(names(&pool, pool.group(Position::TightEnd)), vec!["TE1"]);

        let grouped: usize = Position::ALL.iter().map(|&p| pool.group(p).len()).sum();
        assert_eq!(grouped, pool.len());
    }

    #[test]
    fn sort_groups_descending_by_points() {
        let mut pool = PlayerPool::from_players(vec![
            make_player("WR_low", Position::WideReceiver, 90.0),
            make_player("WR_high", Position::WideReceiver, 210.0),
            make_player("WR_mid", Position::WideReceiver, 150.0),
        ]);
        pool.sort_groups();

        assert_eq!(
            names(&pool, pool.group(Position::WideReceiver)),
            vec!["WR_high", "WR_mid", "WR_low"]
        );
    }

    #[test]
    fn equal_points_keep_input_order() {
        let mut pool = PlayerPool::from_players(vec![
            make_player("First", Position::RunningBack, 100.0),
            make_player("Top", Position::RunningBack, 180.0),
            make_player("Second", Position::RunningBack, 100.0),
            make_player("Third", Position::RunningBack, 100.0),
        ]);
        pool.sort_groups();
        pool.sort_groups();

        assert_eq!(
            names(&pool, pool.group(Position::RunningBack)),
            vec!["Top", "First", "Second", "Third"]
        );
    }

    #[test]
    fn top_n_and_rank_range_clamp() {
        let mut pool = PlayerPool::from_players(vec![
            make_player("TE1", Position::TightEnd, 150.0),
            make_player("TE2", Position::TightEnd, 120.0),
        ]);
        pool.sort_groups();

        assert_eq!(pool.top_n(Position::TightEnd, 1).len(), 1);
        assert_eq!(pool.top_n(Position::TightEnd, 10).len(), 2);
        assert!(pool.top_n(Position::TightEnd, 0).is_empty());
        assert!(pool.top_n(Position::Quarterback, 3).is_empty());

        assert_eq!(names(&pool, pool.rank_range(Position::TightEnd, 1, 5)), vec!["TE2"]);
        assert!(pool.rank_range(Position::TightEnd, 4, 9).is_empty());
    }

    #[test]
    fn reset_derived_zeroes_every_player() {
        let mut pool = PlayerPool::from_players(vec![
            make_player("QB1", Position::Quarterback, 300.0),
            make_player("RB1", Position::RunningBack, 200.0),
        ]);
        for player in pool.players_mut() {
            player.price = 12.0;
        }
        pool.reset_derived();

        for player in pool.players() {
            assert_eq!(player.projected_points, 0.0);
            assert_eq!(player.price, 0.0);
        }
    }
}
