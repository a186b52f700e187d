use std::mem;

use crate::constants::{
    ADVERSARY_SPEED, HALF_TILE, MAP_LAYOUT, PICKUP_BOX, PICKUP_SCORE, PLAYER_SPEED, TILE_SIZE,
    WANDERER_SPAWN_TILES, WANDERER_SPEED,
};
use crate::rng::Rng;
use crate::types::{
    AdversaryPhase, AdversaryView, BoundingBox, Direction, PickupSize, PickupView, PlayerView,
    RoundState, RoundSummary, RuntimeEvent, Snapshot, TileCoord, WandererView,
};
use crate::world::{GridMap, WorldError};

mod actors;
mod mover;

pub use actors::{Adversary, Player, Wanderer};
pub use mover::Mover;

use actors::{flee_goal, hunting_goals};

#[derive(Clone, Debug)]
pub struct RoundConfig {
    pub layout: Vec<String>,
    pub seed: u32,
    pub wanderer_spawns: Vec<(i32, i32)>,
    pub player_speed: f32,
    pub wanderer_speed: f32,
    pub adversary_speed: f32,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            layout: MAP_LAYOUT.iter().map(|row| row.to_string()).collect(),
            seed: 1,
            wanderer_spawns: WANDERER_SPAWN_TILES.to_vec(),
            player_speed: PLAYER_SPEED,
            wanderer_speed: WANDERER_SPEED,
            adversary_speed: ADVERSARY_SPEED,
        }
    }
}

impl RoundConfig {
    pub fn with_seed(seed: u32) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug)]
struct Pickup {
    tile: TileCoord,
    size: PickupSize,
    bounding_box: BoundingBox,
}

/// Owns the whole round: the map, every actor, the pickup set, scoring and
/// the round state machine. Sole mutator of all shared state; actors only
/// ever mutate their own motion.
#[derive(Clone, Debug)]
pub struct RoundEngine {
    config: RoundConfig,
    map: GridMap,
    rng: Rng,
    player: Player,
    wanderers: Vec<Wanderer>,
    adversary: Adversary,
    pickups: Vec<Pickup>,
    pickups_total: usize,
    score: i32,
    gates_open: bool,
    round_state: RoundState,
    events: Vec<RuntimeEvent>,
    tick: u64,
}

fn tile_center(tile: TileCoord) -> (f32, f32) {
    (
        tile.x as f32 * TILE_SIZE + HALF_TILE,
        tile.y as f32 * TILE_SIZE + HALF_TILE,
    )
}

fn tile_box(tile: TileCoord, size: f32) -> BoundingBox {
    let (cx, cy) = tile_center(tile);
    BoundingBox::new(cx, cy, size)
}

impl RoundEngine {
    pub fn new(config: RoundConfig) -> Result<Self, WorldError> {
        let rows: Vec<&str> = config.layout.iter().map(String::as_str).collect();
        let map = GridMap::parse(&rows)?;
        for &(x, y) in &config.wanderer_spawns {
            if !map.is_passable(x, y, false) {
                return Err(WorldError::BlockedSpawn { x, y });
            }
        }
        Ok(Self::from_parts(map, config))
    }

    fn from_parts(map: GridMap, config: RoundConfig) -> Self {
        let player = Player::new(map.player_spawn(), config.player_speed);
        let adversary = Adversary::new(map.adversary_spawn(), config.adversary_speed);
        let wanderers = config
            .wanderer_spawns
            .iter()
            .enumerate()
            .map(|(id, &(x, y))| {
                Wanderer::new(id as u32, TileCoord { x, y }, config.wanderer_speed)
            })
            .collect();
        let pickups: Vec<Pickup> = map
            .pickup_tiles()
            .iter()
            .map(|&(tile, size)| Pickup {
                tile,
                size,
                bounding_box: tile_box(tile, PICKUP_BOX),
            })
            .collect();
        let pickups_total = pickups.len();
        let rng = Rng::new(config.seed);

        Self {
            config,
            map,
            rng,
            player,
            wanderers,
            adversary,
            pickups,
            pickups_total,
            score: 0,
            gates_open: false,
            round_state: RoundState::Active,
            events: Vec::new(),
            tick: 0,
        }
    }

    /// Discards and rebuilds every entity from the validated map. The only
    /// way back to `RoundState::Active`.
    pub fn reset(&mut self) {
        let map = self.map.clone();
        let config = self.config.clone();
        *self = Self::from_parts(map, config);
    }

    /// Latest directional input wins; consumed at the player's next
    /// tile-center alignment.
    pub fn set_player_direction(&mut self, dir: Direction) {
        self.player.request_direction(dir);
    }

    /// One fixed simulation tick. No-op once the round has resolved.
    /// Transition order within a tick: movement, pickup collection, flee
    /// activation, player/adversary collision, adversary/wanderer collision,
    /// gate escape check.
    pub fn step(&mut self) {
        if self.round_state != RoundState::Active {
            return;
        }
        self.tick += 1;

        self.advance_actors();
        self.collect_pickups();
        self.activate_flee();
        self.resolve_player_adversary();
        self.resolve_adversary_wanderers();
        self.check_escape();
    }

    fn advance_actors(&mut self) {
        self.player.step(&self.map, self.gates_open);
        for wanderer in &mut self.wanderers {
            wanderer.step(&self.map, self.gates_open, &mut self.rng);
        }

        if self.adversary.phase == AdversaryPhase::Defeated {
            return;
        }
        // Goal sets are only consulted at tile centers; skip the build
        // (including the O(tiles) flee scan) mid-transit.
        let goals = if self.adversary.mover.at_tile_center() {
            match self.adversary.phase {
                AdversaryPhase::Hunting => {
                    hunting_goals(self.player.mover.tile(), &self.wanderers)
                }
                AdversaryPhase::Fleeing => {
                    vec![flee_goal(&self.map, self.player.mover.tile())]
                }
                AdversaryPhase::Defeated => Vec::new(),
            }
        } else {
            Vec::new()
        };
        self.adversary.step(&self.map, self.gates_open, &goals);
    }

    fn collect_pickups(&mut self) {
        let player_box = self.player.mover.bounding_box();
        let mut remaining = Vec::with_capacity(self.pickups.len());
        for pickup in mem::take(&mut self.pickups) {
            if pickup.bounding_box.overlaps(&player_box) {
                self.score += PICKUP_SCORE;
                self.events
                    .push(RuntimeEvent::PickupCollected { tile: pickup.tile });
            } else {
                remaining.push(pickup);
            }
        }
        self.pickups = remaining;
    }

    fn activate_flee(&mut self) {
        if self.pickups.is_empty() && self.adversary.phase == AdversaryPhase::Hunting {
            self.adversary.phase = AdversaryPhase::Fleeing;
            self.events.push(RuntimeEvent::FleeStarted);
        }
    }

    fn resolve_player_adversary(&mut self) {
        if self.adversary.phase == AdversaryPhase::Defeated {
            return;
        }
        let overlap = self
            .player
            .mover
            .bounding_box()
            .overlaps(&self.adversary.mover.bounding_box());
        if !overlap {
            return;
        }

        if self.adversary.phase == AdversaryPhase::Fleeing {
            self.adversary.phase = AdversaryPhase::Defeated;
            self.gates_open = true;
            self.events.push(RuntimeEvent::AdversaryDefeated);
        } else {
            self.round_state = RoundState::PlayerDefeated;
            self.events.push(RuntimeEvent::PlayerDefeated);
        }
    }

    fn resolve_adversary_wanderers(&mut self) {
        if self.adversary.phase != AdversaryPhase::Hunting {
            return;
        }
        let adversary_box = self.adversary.mover.bounding_box();
        let mut survivors = Vec::with_capacity(self.wanderers.len());
        for wanderer in mem::take(&mut self.wanderers) {
            if wanderer.mover.bounding_box().overlaps(&adversary_box) {
                self.events
                    .push(RuntimeEvent::WandererCaught { id: wanderer.id });
            } else {
                survivors.push(wanderer);
            }
        }
        self.wanderers = survivors;
    }

    fn check_escape(&mut self) {
        if !self.gates_open || self.round_state != RoundState::Active {
            return;
        }
        let player_box = self.player.mover.bounding_box();
        let escaped = self
            .map
            .gate_tiles()
            .iter()
            .any(|&gate| tile_box(gate, TILE_SIZE).overlaps(&player_box));
        if escaped {
            self.round_state = RoundState::PlayerEscaped;
            self.events.push(RuntimeEvent::PlayerEscaped);
        }
    }

    pub fn round_state(&self) -> RoundState {
        self.round_state
    }

    pub fn adversary_phase(&self) -> AdversaryPhase {
        self.adversary.phase
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn gates_open(&self) -> bool {
        self.gates_open
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn map(&self) -> &GridMap {
        &self.map
    }

    pub fn player_tile(&self) -> TileCoord {
        self.player.mover.tile()
    }

    pub fn adversary_tile(&self) -> TileCoord {
        self.adversary.mover.tile()
    }

    pub fn pickups_remaining(&self) -> usize {
        self.pickups.len()
    }

    pub fn remaining_pickup_tiles(&self) -> Vec<TileCoord> {
        self.pickups.iter().map(|p| p.tile).collect()
    }

    pub fn wanderers_surviving(&self) -> usize {
        self.wanderers.len()
    }

    /// Read-only view for the rendering collaborator. Pending cue events are
    /// drained when `include_events` is set, so each event is delivered at
    /// most once.
    pub fn snapshot(&mut self, include_events: bool) -> Snapshot {
        Snapshot {
            tick: self.tick,
            round_state: self.round_state,
            score: self.score,
            gates_open: self.gates_open,
            player: PlayerView {
                x: self.player.mover.x,
                y: self.player.mover.y,
                dir: self.player.mover.dir,
                bounding_box: self.player.mover.bounding_box(),
            },
            wanderers: self
                .wanderers
                .iter()
                .map(|w| WandererView {
                    id: w.id,
                    x: w.mover.x,
                    y: w.mover.y,
                    dir: w.mover.dir,
                    bounding_box: w.mover.bounding_box(),
                })
                .collect(),
            adversary: AdversaryView {
                x: self.adversary.mover.x,
                y: self.adversary.mover.y,
                dir: self.adversary.mover.dir,
                phase: self.adversary.phase,
                bounding_box: self.adversary.mover.bounding_box(),
            },
            pickups: self
                .pickups
                .iter()
                .map(|p| PickupView {
                    tile: p.tile,
                    size: p.size,
                    bounding_box: p.bounding_box,
                })
                .collect(),
            events: if include_events {
                mem::take(&mut self.events)
            } else {
                Vec::new()
            },
        }
    }

    pub fn summary(&self) -> RoundSummary {
        RoundSummary {
            outcome: self.round_state,
            ticks: self.tick,
            score: self.score,
            pickups_collected: self.pickups_total - self.pickups.len(),
            pickups_remaining: self.pickups.len(),
            wanderers_surviving: self.wanderers.len(),
            adversary_defeated: self.adversary.phase == AdversaryPhase::Defeated,
        }
    }
}
