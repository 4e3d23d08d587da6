//! The simulation of one game.
//!
//! A `Game` owns its map, its armies, and its random source. `tick` advances
//! the world by one step; the command methods apply player input between
//! ticks. Commands either succeed or return a `CommandError` and leave the
//! state exactly as it was.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::board::{Army, ArmyId, Building, Map, Node, NodeId, Team};
use crate::config::GameConfig;
use crate::resolve::resolve_armies;
use crate::route::route;

/// Reasons a command can be refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    #[error("node {node} is not owned by {team}")]
    NotOwner { team: Team, node: NodeId },

    #[error("node {0} already has that building")]
    AlreadyBuilt(NodeId),

    #[error("cannot build nothing")]
    InvalidBuilding,

    #[error("need {needed} troops, have {available}")]
    InsufficientTroops { needed: u32, available: u32 },

    #[error("source and target are both node {0}")]
    SameNode(NodeId),

    #[error("no path from {from} to {to}")]
    Unreachable { from: NodeId, to: NodeId },

    #[error("an enemy army is about to reach node {0}")]
    Blocked(NodeId),

    #[error("{0} has nothing left to forfeit")]
    NothingToForfeit(Team),

    #[error("army ids exhausted")]
    ArmyIdsExhausted,
}

/// One running game.
#[derive(Debug, Clone)]
pub struct Game<R = SmallRng> {
    config: GameConfig,
    map: Map,
    armies: Vec<Army>,
    tick: u64,
    next_army_id: u64,
    rng: R,
}

impl Game<SmallRng> {
    /// Creates a game from a seed, or from entropy when `seed` is `None`.
    pub fn seeded(config: GameConfig, teams: &[Team], seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => SmallRng::seed_from_u64(s),
            None => SmallRng::from_entropy(),
        };
        Game::new(config, teams, rng)
    }
}

impl<R: Rng> Game<R> {
    /// Generates a map and places each team on its own starting node.
    ///
    /// Starting nodes are spread out by farthest-point selection. Teams
    /// beyond the number of generated nodes get no node.
    pub fn new(config: GameConfig, teams: &[Team], mut rng: R) -> Self {
        let mut map = Map::generate(&config.map, &mut rng);

        let setup = &config.setup;
        for node in map.nodes_mut() {
            node.troops = rng.gen_range(setup.neutral_troops_min..=setup.neutral_troops_max);
        }

        let starts = spread_start_nodes(&map, teams.len(), &mut rng);
        for (&team, id) in teams.iter().zip(starts) {
            if let Some(node) = map.node_mut(id) {
                node.owner = Some(team);
                node.troops = setup.start_troops;
            }
        }

        tracing::info!(
            nodes = map.len(),
            edges = map.edges().len(),
            teams = teams.len(),
            "game created"
        );

        Game::from_parts(config, map, Vec::new(), 0, rng)
    }

    /// Builds a game around an existing state.
    pub fn from_parts(config: GameConfig, map: Map, armies: Vec<Army>, tick: u64, rng: R) -> Self {
        let next_army_id = armies
            .iter()
            .map(|a| a.id.0.saturating_add(1))
            .max()
            .unwrap_or(0);
        Game {
            config,
            map,
            armies,
            tick,
            next_army_id,
            rng,
        }
    }

    /// Advances the simulation by one tick.
    ///
    /// Armies move and fight first, then every node produces, then standing
    /// orders fire (on their interval), and finally troops that reached a
    /// waypoint are sent on toward their destination.
    pub fn tick(&mut self) {
        self.tick += 1;
        let tick = self.tick;

        let armies = std::mem::take(&mut self.armies);
        let outcome = resolve_armies(&mut self.map, armies, &self.config.rules, &mut self.rng);
        self.armies = outcome.armies;
        for (node, team) in outcome.captures {
            tracing::info!(%node, %team, tick, "node captured");
        }

        self.produce(tick);

        if tick % self.config.rules.standing_order_interval == 0 {
            self.run_standing_orders();
        }

        for c in outcome.continuations {
            if let Err(e) = self.send_army(c.team, c.from, c.to, c.troops) {
                tracing::debug!(from = %c.from, to = %c.to, error = %e, "continuation dropped");
            }
        }
    }

    fn produce(&mut self, tick: u64) {
        let neutral_interval = self.config.rules.neutral_growth_interval;
        for idx in 0..self.map.len() {
            let id = NodeId(idx as u32);
            match self.map.nodes()[idx].owner {
                Some(team) => {
                    let plants = self.map.adjacent_power_plants(id, team);
                    self.map.nodes_mut()[idx].produce(tick, plants);
                }
                None => {
                    let node = &mut self.map.nodes_mut()[idx];
                    if tick % neutral_interval == 0 {
                        node.produce(tick, 0);
                    } else {
                        node.attacked = false;
                    }
                }
            }
        }
    }

    fn run_standing_orders(&mut self) {
        let orders: Vec<(NodeId, NodeId, Option<Team>, u32)> = self
            .map
            .nodes()
            .iter()
            .filter_map(|n| n.standing_order.map(|t| (n.id, t, n.owner, n.troops)))
            .collect();

        for (from, to, owner, troops) in orders {
            let result = match owner {
                Some(team) => self.send_army(team, from, to, troops),
                None => Err(CommandError::UnknownNode(from)),
            };
            if let Err(e) = result {
                tracing::debug!(%from, %to, error = %e, "standing order cancelled");
                if let Some(node) = self.map.node_mut(from) {
                    node.standing_order = None;
                }
            }
        }
    }

    /// Builds `building` on `node`, paying its troop cost.
    pub fn build(&mut self, team: Team, node: NodeId, building: Building) -> Result<(), CommandError> {
        let cost = self
            .config
            .rules
            .building_cost(building)
            .ok_or(CommandError::InvalidBuilding)?;
        let n = self.map.node_mut(node).ok_or(CommandError::UnknownNode(node))?;
        if !n.is_owned_by(team) {
            return Err(CommandError::NotOwner { team, node });
        }
        if n.building == building {
            return Err(CommandError::AlreadyBuilt(node));
        }
        if n.troops < cost {
            return Err(CommandError::InsufficientTroops {
                needed: cost,
                available: n.troops,
            });
        }
        n.troops -= cost;
        n.building = building;
        Ok(())
    }

    /// Sends up to `troops` from `from` toward `to`.
    ///
    /// The request is clamped to the troops available; sending zero is a
    /// successful no-op. The army heads for the first hop of the shortest
    /// path through `team`'s territory.
    pub fn send_army(
        &mut self,
        team: Team,
        from: NodeId,
        to: NodeId,
        troops: u32,
    ) -> Result<(), CommandError> {
        let source = self.map.node(from).ok_or(CommandError::UnknownNode(from))?;
        if !self.map.contains(to) {
            return Err(CommandError::UnknownNode(to));
        }
        if !source.is_owned_by(team) {
            return Err(CommandError::NotOwner { team, node: from });
        }
        if from == to {
            return Err(CommandError::SameNode(from));
        }
        if self.approach_blocked(team, from, to) {
            return Err(CommandError::Blocked(from));
        }

        let troops = troops.min(source.troops);
        if troops == 0 {
            return Ok(());
        }

        let hop = route(&self.map, from, to, team).ok_or(CommandError::Unreachable { from, to })?;
        if hop != to && self.approach_blocked(team, from, hop) {
            return Err(CommandError::Blocked(from));
        }
        // `next_army_id` saturates at u64::MAX, which is never handed out.
        if self.next_army_id == u64::MAX {
            return Err(CommandError::ArmyIdsExhausted);
        }

        if let Some(node) = self.map.node_mut(from) {
            node.troops -= troops;
        }
        let id = ArmyId(self.next_army_id);
        self.next_army_id += 1;
        self.armies.push(Army {
            id,
            owner: team,
            from,
            to: hop,
            destination: to,
            troops,
            progress: 0,
        });
        Ok(())
    }

    /// True if a hostile army on the edge `via -> node` is about to arrive.
    fn approach_blocked(&self, team: Team, node: NodeId, via: NodeId) -> bool {
        let adjacent = self.map.node(node).is_some_and(|n| n.is_adjacent(via));
        if !adjacent {
            return false;
        }
        let length = self.map.edge_ticks(via, node);
        self.armies.iter().any(|a| {
            a.owner != team
                && a.is_alive()
                && a.from == via
                && a.to == node
                && a.progress + 1 >= length
        })
    }

    /// Gives `from` a standing order to ship its troops to `to`.
    pub fn assign(&mut self, team: Team, from: NodeId, to: NodeId) -> Result<(), CommandError> {
        let source = self.map.node(from).ok_or(CommandError::UnknownNode(from))?;
        if !self.map.contains(to) {
            return Err(CommandError::UnknownNode(to));
        }
        if !source.is_owned_by(team) {
            return Err(CommandError::NotOwner { team, node: from });
        }
        if from == to {
            return Err(CommandError::SameNode(from));
        }
        if route(&self.map, from, to, team).is_none() {
            return Err(CommandError::Unreachable { from, to });
        }
        if let Some(node) = self.map.node_mut(from) {
            node.standing_order = Some(to);
        }
        Ok(())
    }

    /// Clears the standing order on `from`, if any.
    pub fn unassign(&mut self, team: Team, from: NodeId) -> Result<(), CommandError> {
        let node = self.map.node_mut(from).ok_or(CommandError::UnknownNode(from))?;
        if !node.is_owned_by(team) {
            return Err(CommandError::NotOwner { team, node: from });
        }
        node.standing_order = None;
        Ok(())
    }

    /// Removes `team` from the game: its nodes turn neutral and its armies
    /// disappear.
    pub fn forfeit(&mut self, team: Team) -> Result<(), CommandError> {
        let mut touched = false;
        for node in self.map.nodes_mut() {
            if node.is_owned_by(team) {
                node.reset();
                touched = true;
            }
        }
        let before = self.armies.len();
        self.armies.retain(|a| a.owner != team);
        touched |= self.armies.len() != before;

        if !touched {
            return Err(CommandError::NothingToForfeit(team));
        }
        tracing::info!(%team, tick = self.tick, "team forfeited");
        Ok(())
    }

    /// Bounds-checked node lookup.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.map.node(id)
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn armies(&self) -> &[Army] {
        &self.armies
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Number of ticks run so far.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn nodes_owned(&self, team: Team) -> usize {
        self.map.nodes().iter().filter(|n| n.is_owned_by(team)).count()
    }

    /// Troops on `team`'s nodes plus troops in its armies.
    pub fn troops_of(&self, team: Team) -> u64 {
        let garrisons: u64 = self
            .map
            .nodes()
            .iter()
            .filter(|n| n.is_owned_by(team))
            .map(|n| u64::from(n.troops))
            .sum();
        let field: u64 = self
            .armies
            .iter()
            .filter(|a| a.owner == team)
            .map(|a| u64::from(a.troops))
            .sum();
        garrisons + field
    }

    /// Teams that still own a node or an army, in team order.
    pub fn alive_teams(&self) -> Vec<Team> {
        let mut teams: Vec<Team> = self
            .map
            .nodes()
            .iter()
            .filter_map(|n| n.owner)
            .chain(self.armies.iter().map(|a| a.owner))
            .collect();
        teams.sort();
        teams.dedup();
        teams
    }

    /// The last team standing, if exactly one remains.
    pub fn winner(&self) -> Option<Team> {
        match self.alive_teams().as_slice() {
            [team] => Some(*team),
            _ => None,
        }
    }

    /// Mutable access for callers that stage positions directly.
    pub fn map_mut(&mut self) -> &mut Map {
        &mut self.map
    }
}

/// Picks `count` distinct nodes, each as far as possible from those already
/// picked. The first pick is random.
fn spread_start_nodes(map: &Map, count: usize, rng: &mut impl Rng) -> Vec<NodeId> {
    let mut picks: Vec<NodeId> = Vec::with_capacity(count);
    if map.is_empty() || count == 0 {
        return picks;
    }
    picks.push(NodeId(rng.gen_range(0..map.len()) as u32));

    while picks.len() < count.min(map.len()) {
        let next = map
            .nodes()
            .iter()
            .filter(|n| !picks.contains(&n.id))
            .map(|n| {
                let nearest = picks
                    .iter()
                    .map(|&p| map.distance(p, n.id))
                    .fold(f64::INFINITY, f64::min);
                (n.id, nearest)
            })
            .max_by(|a, b| a.1.total_cmp(&b.1));
        match next {
            Some((id, _)) => picks.push(id),
            None => break,
        }
    }
    picks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Point;
    use rand::rngs::mock::StepRng;

    /// 0 -- 1 -- 2 -- 3 along a line, ten units apart.
    fn staged() -> Game<StepRng> {
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(20.0, 0.0),
            Point::new(30.0, 0.0),
        ];
        let map = Map::from_edges(&pts, &[(0, 1), (1, 2), (2, 3)]);
        Game::from_parts(GameConfig::default(), map, Vec::new(), 0, StepRng::new(0, 0))
    }

    fn own(game: &mut Game<StepRng>, id: u32, team: Team, troops: u32) {
        let n = game.map_mut().node_mut(NodeId(id)).unwrap();
        n.owner = Some(team);
        n.troops = troops;
    }

    #[test]
    fn new_game_places_every_team() {
        let teams = [Team::Red, Team::Blue, Team::Green];
        let game = Game::seeded(GameConfig::default(), &teams, Some(3));
        for team in teams {
            assert_eq!(game.nodes_owned(team), 1);
            assert_eq!(game.troops_of(team), 50);
        }
        assert_eq!(game.alive_teams(), teams.to_vec());
        assert_eq!(game.winner(), None);
    }

    #[test]
    fn build_pays_cost() {
        let mut game = staged();
        own(&mut game, 0, Team::Red, 250);
        game.build(Team::Red, NodeId(0), Building::Factory).unwrap();
        let n = game.node(NodeId(0)).unwrap();
        assert_eq!(n.building, Building::Factory);
        assert_eq!(n.troops, 50);
        assert_eq!(
            game.build(Team::Red, NodeId(0), Building::Factory),
            Err(CommandError::AlreadyBuilt(NodeId(0)))
        );
    }

    #[test]
    fn build_requires_troops_and_ownership() {
        let mut game = staged();
        own(&mut game, 0, Team::Red, 199);
        assert!(matches!(
            game.build(Team::Red, NodeId(0), Building::Factory),
            Err(CommandError::InsufficientTroops { needed: 200, available: 199 })
        ));
        assert!(matches!(
            game.build(Team::Blue, NodeId(0), Building::Factory),
            Err(CommandError::NotOwner { .. })
        ));
        assert_eq!(
            game.build(Team::Red, NodeId(0), Building::None),
            Err(CommandError::InvalidBuilding)
        );
        assert_eq!(
            game.build(Team::Red, NodeId(9), Building::Fort),
            Err(CommandError::UnknownNode(NodeId(9)))
        );
        let n = game.node(NodeId(0)).unwrap();
        assert_eq!((n.troops, n.building), (199, Building::None));
    }

    #[test]
    fn send_creates_army_toward_first_hop() {
        let mut game = staged();
        own(&mut game, 0, Team::Red, 40);
        own(&mut game, 1, Team::Red, 0);
        game.send_army(Team::Red, NodeId(0), NodeId(2), 30).unwrap();
        assert_eq!(game.node(NodeId(0)).unwrap().troops, 10);
        let army = &game.armies()[0];
        assert_eq!(army.to, NodeId(1));
        assert_eq!(army.destination, NodeId(2));
        assert_eq!(army.troops, 30);
        assert_eq!(army.progress, 0);
    }

    #[test]
    fn send_zero_is_noop_success() {
        let mut game = staged();
        own(&mut game, 0, Team::Red, 0);
        assert_eq!(game.send_army(Team::Red, NodeId(0), NodeId(1), 10), Ok(()));
        assert!(game.armies().is_empty());
    }

    #[test]
    fn send_through_hostile_territory_fails() {
        let mut game = staged();
        own(&mut game, 0, Team::Red, 40);
        assert_eq!(
            game.send_army(Team::Red, NodeId(0), NodeId(2), 10),
            Err(CommandError::Unreachable {
                from: NodeId(0),
                to: NodeId(2)
            })
        );
        assert_eq!(game.node(NodeId(0)).unwrap().troops, 40);
        assert_eq!(
            game.send_army(Team::Red, NodeId(0), NodeId(0), 10),
            Err(CommandError::SameNode(NodeId(0)))
        );
    }

    #[test]
    fn send_blocked_by_arriving_enemy() {
        let mut game = staged();
        own(&mut game, 0, Team::Red, 40);
        own(&mut game, 1, Team::Blue, 40);
        game.send_army(Team::Blue, NodeId(1), NodeId(0), 20).unwrap();
        game.armies[0].progress = 9;
        assert_eq!(
            game.send_army(Team::Red, NodeId(0), NodeId(1), 10),
            Err(CommandError::Blocked(NodeId(0)))
        );
        game.armies[0].progress = 3;
        assert_eq!(game.send_army(Team::Red, NodeId(0), NodeId(1), 10), Ok(()));
    }

    fn enemy(id: u64, team: Team, from: u32, to: u32, troops: u32, progress: u32) -> Army {
        Army {
            id: ArmyId(id),
            owner: team,
            from: NodeId(from),
            to: NodeId(to),
            destination: NodeId(to),
            troops,
            progress,
        }
    }

    #[test]
    fn send_blocked_at_first_hop_of_longer_route() {
        let mut game = staged();
        own(&mut game, 0, Team::Red, 40);
        own(&mut game, 1, Team::Red, 0);
        game.armies.push(enemy(7, Team::Blue, 1, 0, 5, 9));
        assert_eq!(
            game.send_army(Team::Red, NodeId(0), NodeId(2), 10),
            Err(CommandError::Blocked(NodeId(0)))
        );
        assert_eq!(game.node(NodeId(0)).unwrap().troops, 40);
        assert_eq!(game.armies().len(), 1);

        game.armies[0].progress = 3;
        assert_eq!(game.send_army(Team::Red, NodeId(0), NodeId(2), 10), Ok(()));
        assert_eq!(game.armies()[1].to, NodeId(1));
    }

    #[test]
    fn tick_razes_node_on_mutual_destruction() {
        let mut game = staged();
        own(&mut game, 0, Team::Red, 0);
        own(&mut game, 1, Team::Blue, 10);
        own(&mut game, 2, Team::Blue, 0);
        {
            let n = game.map_mut().node_mut(NodeId(1)).unwrap();
            n.building = Building::Fort;
            n.standing_order = Some(NodeId(2));
        }
        game.armies.push(enemy(0, Team::Red, 0, 1, 10, 9));

        game.tick();

        let n = game.node(NodeId(1)).unwrap();
        assert_eq!(n.owner, None);
        assert_eq!(n.troops, 0);
        assert_eq!(n.building, Building::None);
        assert_eq!(n.standing_order, None);
        assert!(game.armies().is_empty());
    }

    #[test]
    fn tick_capture_clears_standing_order() {
        let mut game = staged();
        own(&mut game, 0, Team::Red, 0);
        own(&mut game, 1, Team::Blue, 10);
        own(&mut game, 2, Team::Blue, 0);
        game.map_mut().node_mut(NodeId(1)).unwrap().standing_order = Some(NodeId(2));
        game.armies.push(enemy(0, Team::Red, 0, 1, 20, 9));

        game.tick();

        let n = game.node(NodeId(1)).unwrap();
        assert_eq!(n.owner, Some(Team::Red));
        assert_eq!(n.troops, 10);
        assert_eq!(n.standing_order, None);
        assert!(game.armies().is_empty());
    }

    #[test]
    fn army_ids_are_monotonic() {
        let mut game = staged();
        own(&mut game, 0, Team::Red, 40);
        game.send_army(Team::Red, NodeId(0), NodeId(1), 10).unwrap();
        game.send_army(Team::Red, NodeId(0), NodeId(1), 10).unwrap();
        let ids: Vec<u64> = game.armies().iter().map(|a| a.id.0).collect();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn send_refuses_once_army_ids_run_out() {
        let mut game = staged();
        own(&mut game, 0, Team::Red, 40);
        game.next_army_id = u64::MAX - 1;
        game.send_army(Team::Red, NodeId(0), NodeId(1), 10).unwrap();
        assert_eq!(game.armies()[0].id, ArmyId(u64::MAX - 1));
        assert_eq!(
            game.send_army(Team::Red, NodeId(0), NodeId(1), 10),
            Err(CommandError::ArmyIdsExhausted)
        );
        assert_eq!(game.node(NodeId(0)).unwrap().troops, 30);
        assert_eq!(game.armies().len(), 1);
    }

    #[test]
    fn from_parts_saturates_next_army_id() {
        let mut game = staged();
        own(&mut game, 0, Team::Red, 40);
        game.send_army(Team::Red, NodeId(0), NodeId(1), 10).unwrap();
        let mut armies = game.armies().to_vec();
        armies[0].id = ArmyId(u64::MAX);
        let mut game = Game::from_parts(
            GameConfig::default(),
            game.map().clone(),
            armies,
            0,
            StepRng::new(0, 0),
        );
        assert_eq!(
            game.send_army(Team::Red, NodeId(0), NodeId(1), 10),
            Err(CommandError::ArmyIdsExhausted)
        );
    }

    #[test]
    fn assign_validates_reachability() {
        let mut game = staged();
        own(&mut game, 0, Team::Red, 10);
        assert!(matches!(
            game.assign(Team::Red, NodeId(0), NodeId(3)),
            Err(CommandError::Unreachable { .. })
        ));
        assert_eq!(game.node(NodeId(0)).unwrap().standing_order, None);
        game.assign(Team::Red, NodeId(0), NodeId(1)).unwrap();
        assert_eq!(game.node(NodeId(0)).unwrap().standing_order, Some(NodeId(1)));
    }

    #[test]
    fn unassign_is_idempotent() {
        let mut game = staged();
        own(&mut game, 0, Team::Red, 10);
        game.assign(Team::Red, NodeId(0), NodeId(1)).unwrap();
        game.unassign(Team::Red, NodeId(0)).unwrap();
        let once = game.node(NodeId(0)).unwrap().clone();
        game.unassign(Team::Red, NodeId(0)).unwrap();
        assert_eq!(game.node(NodeId(0)).unwrap(), &once);
        assert!(game.unassign(Team::Blue, NodeId(0)).is_err());
    }

    #[test]
    fn standing_order_ships_troops_on_interval() {
        let mut game = staged();
        own(&mut game, 0, Team::Red, 10);
        own(&mut game, 1, Team::Red, 0);
        game.assign(Team::Red, NodeId(0), NodeId(1)).unwrap();
        for _ in 0..7 {
            game.tick();
        }
        assert!(game.armies().is_empty());
        game.tick();
        assert_eq!(game.armies().len(), 1);
        assert_eq!(game.node(NodeId(0)).unwrap().troops, 0);
    }

    #[test]
    fn standing_order_cancelled_when_target_unreachable() {
        let mut game = staged();
        own(&mut game, 0, Team::Red, 10);
        own(&mut game, 1, Team::Red, 0);
        game.assign(Team::Red, NodeId(0), NodeId(2)).unwrap();
        own(&mut game, 1, Team::Blue, 500);
        for _ in 0..8 {
            game.tick();
        }
        assert_eq!(game.node(NodeId(0)).unwrap().standing_order, None);
    }

    #[test]
    fn production_runs_on_even_ticks() {
        let mut game = staged();
        own(&mut game, 0, Team::Red, 0);
        game.tick();
        assert_eq!(game.node(NodeId(0)).unwrap().troops, 0);
        game.tick();
        assert_eq!(game.node(NodeId(0)).unwrap().troops, 1);
    }

    #[test]
    fn neutral_nodes_grow_slowly() {
        let mut game = staged();
        for _ in 0..16 {
            game.tick();
        }
        assert_eq!(game.node(NodeId(3)).unwrap().troops, 2);
    }

    #[test]
    fn multi_hop_send_continues_at_waypoint() {
        let mut game = staged();
        own(&mut game, 0, Team::Red, 20);
        own(&mut game, 1, Team::Red, 0);
        game.send_army(Team::Red, NodeId(0), NodeId(2), 20).unwrap();
        for _ in 0..10 {
            game.tick();
        }
        let army = &game.armies()[0];
        assert_eq!(army.from, NodeId(1));
        assert_eq!(army.to, NodeId(2));
        assert_eq!(army.troops, 20);
        // Node 2 has grown two neutral troops by the time the army arrives.
        for _ in 0..12 {
            game.tick();
        }
        assert_eq!(game.node(NodeId(2)).unwrap().owner, Some(Team::Red));
    }

    #[test]
    fn forfeit_clears_team() {
        let mut game = staged();
        own(&mut game, 0, Team::Red, 40);
        own(&mut game, 1, Team::Red, 40);
        own(&mut game, 3, Team::Blue, 40);
        game.send_army(Team::Red, NodeId(0), NodeId(1), 10).unwrap();
        game.forfeit(Team::Red).unwrap();
        assert_eq!(game.nodes_owned(Team::Red), 0);
        assert!(game.armies().is_empty());
        assert_eq!(game.winner(), Some(Team::Blue));
        assert_eq!(
            game.forfeit(Team::Red),
            Err(CommandError::NothingToForfeit(Team::Red))
        );
    }

    #[test]
    fn spread_start_nodes_are_distinct() {
        let game = staged();
        let mut rng = StepRng::new(0, 0);
        let picks = spread_start_nodes(game.map(), 2, &mut rng);
        assert_eq!(picks, vec![NodeId(0), NodeId(3)]);
        let all = spread_start_nodes(game.map(), 10, &mut rng);
        assert_eq!(all.len(), 4);
    }
}
