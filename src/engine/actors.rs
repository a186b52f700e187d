use crate::constants::{ACTOR_BOX, ADVERSARY_BOX};
use crate::engine::mover::Mover;
use crate::pathfind::shortest_first_step;
use crate::rng::Rng;
use crate::types::{AdversaryPhase, Direction, TileCoord, TileKind};
use crate::world::GridMap;

/// Input-driven actor. Holds at most one pending direction; the latest
/// request overwrites any earlier one.
#[derive(Clone, Debug)]
pub struct Player {
    pub mover: Mover,
    pending_dir: Direction,
}

impl Player {
    pub fn new(spawn: TileCoord, speed: f32) -> Self {
        Self {
            mover: Mover::at_tile(spawn, speed, ACTOR_BOX),
            pending_dir: Direction::None,
        }
    }

    pub fn request_direction(&mut self, dir: Direction) {
        self.pending_dir = dir;
    }

    pub fn step(&mut self, map: &GridMap, gates_open: bool) {
        let pending = self.pending_dir;
        self.mover.step(map, gates_open, |tile, current| {
            let (dx, dy) = pending.offset();
            if pending != Direction::None && map.is_passable(tile.x + dx, tile.y + dy, gates_open)
            {
                pending
            } else {
                current
            }
        });
    }
}

/// Random-walk actor with a no-reverse bias: at a junction it never turns
/// straight back unless that is the only legal move.
#[derive(Clone, Debug)]
pub struct Wanderer {
    pub id: u32,
    pub mover: Mover,
}

impl Wanderer {
    pub fn new(id: u32, spawn: TileCoord, speed: f32) -> Self {
        Self {
            id,
            mover: Mover::at_tile(spawn, speed, ACTOR_BOX),
        }
    }

    pub fn step(&mut self, map: &GridMap, gates_open: bool, rng: &mut Rng) {
        self.mover.step(map, gates_open, |tile, current| {
            let mut candidates: Vec<Direction> = Direction::CARDINALS
                .iter()
                .copied()
                .filter(|dir| {
                    let (dx, dy) = dir.offset();
                    map.is_passable(tile.x + dx, tile.y + dy, gates_open)
                })
                .collect();
            if candidates.is_empty() {
                return Direction::None;
            }
            if candidates.len() > 1 && current != Direction::None {
                candidates.retain(|dir| *dir != current.reverse());
            }
            rng.pick(&candidates).copied().unwrap_or(Direction::None)
        });
    }
}

/// Goal-seeking actor. The engine supplies the goal set (hunt targets or a
/// flee tile); the first BFS step is recomputed at every tile center.
#[derive(Clone, Debug)]
pub struct Adversary {
    pub mover: Mover,
    pub phase: AdversaryPhase,
}

impl Adversary {
    pub fn new(spawn: TileCoord, speed: f32) -> Self {
        Self {
            mover: Mover::at_tile(spawn, speed, ADVERSARY_BOX),
            phase: AdversaryPhase::Hunting,
        }
    }

    pub fn step(&mut self, map: &GridMap, gates_open: bool, goals: &[TileCoord]) {
        self.mover.step(map, gates_open, |tile, _| {
            shortest_first_step(tile, goals, |x, y| map.is_passable(x, y, gates_open))
        });
    }
}

/// Hunt targets: the player's tile plus every wanderer's tile (the nearest
/// by graph distance wins inside the pathfinder).
pub fn hunting_goals(player_tile: TileCoord, wanderers: &[Wanderer]) -> Vec<TileCoord> {
    let mut goals = Vec::with_capacity(wanderers.len() + 1);
    goals.push(player_tile);
    goals.extend(wanderers.iter().map(|w| w.mover.tile()));
    goals
}

/// The single non-wall tile with maximum squared Euclidean distance to the
/// player's tile; ties resolve to the first found in row-major order. Falls
/// back to the player's own tile on a degenerate all-wall map. Full grid
/// scan, O(tiles) per flee re-plan.
pub fn flee_goal(map: &GridMap, player_tile: TileCoord) -> TileCoord {
    let mut best: Option<(i64, TileCoord)> = None;
    for y in 0..map.height() {
        for x in 0..map.width() {
            if map.tile_at(x, y) == TileKind::Wall {
                continue;
            }
            let dx = (x - player_tile.x) as i64;
            let dy = (y - player_tile.y) as i64;
            let dist = dx * dx + dy * dy;
            if best.map(|(d, _)| dist > d).unwrap_or(true) {
                best = Some((dist, TileCoord { x, y }));
            }
        }
    }
    best.map(|(_, tile)| tile).unwrap_or(player_tile)
}

#[cfg(test)]
mod tests {
    use super::{flee_goal, hunting_goals, Adversary, Player, Wanderer};
    use crate::constants::TILE_SIZE;
    use crate::rng::Rng;
    use crate::types::{Direction, TileCoord};
    use crate::world::GridMap;

    fn corridor() -> GridMap {
        GridMap::parse(&["#######", "#P...M#", "#######"]).unwrap()
    }

    #[test]
    fn player_adopts_pending_direction_at_center() {
        let map = corridor();
        let mut player = Player::new(map.player_spawn(), 4.0);
        player.request_direction(Direction::Right);
        player.step(&map, false);
        assert_eq!(player.mover.dir, Direction::Right);
        assert_eq!(player.mover.x, 1.5 * TILE_SIZE + 4.0);
    }

    #[test]
    fn player_keeps_current_direction_when_pending_is_blocked() {
        let map = corridor();
        let mut player = Player::new(map.player_spawn(), 4.0);
        player.request_direction(Direction::Right);
        player.step(&map, false);

        // Up is a wall the whole way; the pending turn never commits.
        player.request_direction(Direction::Up);
        for _ in 0..12 {
            player.step(&map, false);
        }
        assert_eq!(player.mover.dir, Direction::Right);
    }

    #[test]
    fn player_stops_when_current_direction_hits_a_wall() {
        let map = corridor();
        let mut player = Player::new(map.player_spawn(), 4.0);
        player.request_direction(Direction::Left);
        player.step(&map, false);
        assert_eq!(player.mover.dir, Direction::None);
        assert_eq!(player.mover.x, 1.5 * TILE_SIZE);
    }

    #[test]
    fn latest_input_overwrites_pending_direction() {
        let map = corridor();
        let mut player = Player::new(map.player_spawn(), 4.0);
        player.request_direction(Direction::Up);
        player.request_direction(Direction::Right);
        player.step(&map, false);
        assert_eq!(player.mover.dir, Direction::Right);
    }

    #[test]
    fn wanderer_does_not_reverse_in_a_corridor() {
        let map = GridMap::parse(&["########", "#P....M#", "########"]).unwrap();
        let mut rng = Rng::new(11);
        let mut wanderer = Wanderer::new(0, TileCoord { x: 3, y: 1 }, 1.5);

        wanderer.step(&map, false, &mut rng);
        let first = wanderer.mover.dir;
        assert_ne!(first, Direction::None);

        // Two tiles of travel, one junction decision in between. The
        // corridor offers exactly {continue, reverse} there and the reverse
        // is always discarded.
        for _ in 0..30 {
            wanderer.step(&map, false, &mut rng);
            assert_eq!(wanderer.mover.dir, first);
        }
    }

    #[test]
    fn wanderer_reverses_at_dead_end() {
        let map = GridMap::parse(&["####", "#PM#", "####"]).unwrap();
        let mut rng = Rng::new(5);
        let mut wanderer = Wanderer::new(0, TileCoord { x: 1, y: 1 }, 1.5);

        // Only one legal move from either end, so the walk is deterministic
        // regardless of the seed: right, then back.
        wanderer.step(&map, false, &mut rng);
        assert_eq!(wanderer.mover.dir, Direction::Right);
        for _ in 0..16 {
            wanderer.step(&map, false, &mut rng);
        }
        assert_eq!(wanderer.mover.dir, Direction::Left);
    }

    #[test]
    fn wanderer_stops_when_no_neighbor_is_passable() {
        let map = GridMap::parse(&["#####", "#P#M#", "#####"]).unwrap();
        let mut rng = Rng::new(5);
        let mut wanderer = Wanderer::new(0, TileCoord { x: 3, y: 1 }, 1.5);
        wanderer.step(&map, false, &mut rng);
        assert_eq!(wanderer.mover.dir, Direction::None);
    }

    #[test]
    fn adversary_takes_first_bfs_step_toward_goal() {
        let map = corridor();
        let mut adversary = Adversary::new(map.adversary_spawn(), 3.0);
        adversary.step(&map, false, &[map.player_spawn()]);
        assert_eq!(adversary.mover.dir, Direction::Left);
    }

    #[test]
    fn adversary_stops_when_goal_unreachable() {
        let map = GridMap::parse(&["#####", "#P#M#", "#####"]).unwrap();
        let mut adversary = Adversary::new(map.adversary_spawn(), 3.0);
        adversary.step(&map, false, &[map.player_spawn()]);
        assert_eq!(adversary.mover.dir, Direction::None);
    }

    #[test]
    fn hunting_goals_include_player_and_all_wanderers() {
        let map = corridor();
        let wanderers = vec![
            Wanderer::new(0, TileCoord { x: 2, y: 1 }, 1.5),
            Wanderer::new(1, TileCoord { x: 3, y: 1 }, 1.5),
        ];
        let goals = hunting_goals(map.player_spawn(), &wanderers);
        assert_eq!(goals.len(), 3);
        assert_eq!(goals[0], map.player_spawn());
    }

    #[test]
    fn flee_goal_maximizes_distance_from_player() {
        let map = corridor();
        let goal = flee_goal(&map, map.player_spawn());
        assert_eq!(goal, TileCoord { x: 5, y: 1 });
    }

    #[test]
    fn flee_goal_ties_break_in_row_major_order() {
        let map = GridMap::parse(&["#####", "#. .#", "#.P.#", "#.M.#", "#####"]).unwrap();
        // Corners (1, 1) and (3, 1) tie among the top row; row-major scan
        // keeps the first one found.
        let goal = flee_goal(&map, TileCoord { x: 2, y: 2 });
        assert_eq!(goal, TileCoord { x: 1, y: 1 });
    }
}
