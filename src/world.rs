use thiserror::Error;

use crate::types::{PickupSize, TileCoord, TileKind};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    #[error("layout has no rows")]
    EmptyLayout,
    #[error("row {row} has length {found}, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("unknown tile code {code:?} at ({x}, {y})")]
    UnknownCode { code: char, x: i32, y: i32 },
    #[error("layout has no player spawn")]
    MissingPlayerSpawn,
    #[error("layout has more than one player spawn")]
    DuplicatePlayerSpawn,
    #[error("layout has no adversary spawn")]
    MissingAdversarySpawn,
    #[error("layout has more than one adversary spawn")]
    DuplicateAdversarySpawn,
    #[error("spawn tile ({x}, {y}) is not passable")]
    BlockedSpawn { x: i32, y: i32 },
}

/// Immutable tile classification for one round. Built once from the static
/// character layout; read-only afterwards.
#[derive(Clone, Debug)]
pub struct GridMap {
    width: i32,
    height: i32,
    tiles: Vec<TileKind>,
    player_spawn: TileCoord,
    adversary_spawn: TileCoord,
    pickup_tiles: Vec<(TileCoord, PickupSize)>,
    gate_tiles: Vec<TileCoord>,
}

impl GridMap {
    pub fn parse(rows: &[&str]) -> Result<Self, WorldError> {
        if rows.is_empty() || rows[0].is_empty() {
            return Err(WorldError::EmptyLayout);
        }
        let width = rows[0].chars().count();
        let height = rows.len();

        let mut tiles = Vec::with_capacity(width * height);
        let mut player_spawn = None;
        let mut adversary_spawn = None;
        let mut pickup_tiles = Vec::new();
        let mut gate_tiles = Vec::new();

        for (y, row) in rows.iter().enumerate() {
            let row_len = row.chars().count();
            if row_len != width {
                return Err(WorldError::RaggedRow {
                    row: y,
                    found: row_len,
                    expected: width,
                });
            }
            for (x, code) in row.chars().enumerate() {
                let coord = TileCoord {
                    x: x as i32,
                    y: y as i32,
                };
                let kind = match code {
                    '#' => TileKind::Wall,
                    ' ' => TileKind::Open,
                    '.' => TileKind::Pickup(PickupSize::Small),
                    'o' => TileKind::Pickup(PickupSize::Large),
                    'G' => TileKind::Gate,
                    'P' => {
                        if player_spawn.replace(coord).is_some() {
                            return Err(WorldError::DuplicatePlayerSpawn);
                        }
                        TileKind::PlayerSpawn
                    }
                    'M' => {
                        if adversary_spawn.replace(coord).is_some() {
                            return Err(WorldError::DuplicateAdversarySpawn);
                        }
                        TileKind::AdversarySpawn
                    }
                    other => {
                        return Err(WorldError::UnknownCode {
                            code: other,
                            x: coord.x,
                            y: coord.y,
                        })
                    }
                };
                match kind {
                    TileKind::Pickup(size) => pickup_tiles.push((coord, size)),
                    TileKind::Gate => gate_tiles.push(coord),
                    _ => {}
                }
                tiles.push(kind);
            }
        }

        Ok(Self {
            width: width as i32,
            height: height as i32,
            tiles,
            player_spawn: player_spawn.ok_or(WorldError::MissingPlayerSpawn)?,
            adversary_spawn: adversary_spawn.ok_or(WorldError::MissingAdversarySpawn)?,
            pickup_tiles,
            gate_tiles,
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Out-of-bounds coordinates classify as `Wall`; bounds are checked
    /// before any indexing.
    pub fn tile_at(&self, x: i32, y: i32) -> TileKind {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return TileKind::Wall;
        }
        self.tiles[(y * self.width + x) as usize]
    }

    pub fn is_passable(&self, x: i32, y: i32, gates_open: bool) -> bool {
        match self.tile_at(x, y) {
            TileKind::Wall => false,
            TileKind::Gate => gates_open,
            _ => true,
        }
    }

    pub fn player_spawn(&self) -> TileCoord {
        self.player_spawn
    }

    pub fn adversary_spawn(&self) -> TileCoord {
        self.adversary_spawn
    }

    pub fn pickup_tiles(&self) -> &[(TileCoord, PickupSize)] {
        &self.pickup_tiles
    }

    pub fn gate_tiles(&self) -> &[TileCoord] {
        &self.gate_tiles
    }
}
