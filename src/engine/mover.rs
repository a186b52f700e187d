use crate::constants::{HALF_TILE, TILE_SIZE};
use crate::types::{BoundingBox, Direction, TileCoord};
use crate::world::GridMap;

/// Shared movement state for every mobile actor: a continuous position that
/// glides between tiles, and a tile coordinate that is resynced only at
/// exact tile-center alignment. Between alignments the tile coordinate is
/// stale on purpose; decisions only ever happen at alignment.
#[derive(Clone, Debug)]
pub struct Mover {
    pub x: f32,
    pub y: f32,
    tx: i32,
    ty: i32,
    pub dir: Direction,
    pub speed: f32,
    box_size: f32,
}

impl Mover {
    pub fn at_tile(tile: TileCoord, speed: f32, box_size: f32) -> Self {
        Self {
            x: tile.x as f32 * TILE_SIZE + HALF_TILE,
            y: tile.y as f32 * TILE_SIZE + HALF_TILE,
            tx: tile.x,
            ty: tile.y,
            dir: Direction::None,
            speed,
            box_size,
        }
    }

    /// Exact compare, not epsilon: speeds are multiples of 0.5 dividing
    /// TILE_SIZE, so positions stay on an exact f32 lattice.
    pub fn at_tile_center(&self) -> bool {
        (self.x - HALF_TILE).rem_euclid(TILE_SIZE) == 0.0
            && (self.y - HALF_TILE).rem_euclid(TILE_SIZE) == 0.0
    }

    pub fn tile(&self) -> TileCoord {
        TileCoord {
            x: self.tx,
            y: self.ty,
        }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::new(self.x, self.y, self.box_size)
    }

    /// One simulation tick. At a tile center the behavior closure picks the
    /// next direction from the freshly resynced tile; an illegal pick is
    /// forced to `None`. The position then advances along the committed
    /// direction, so a direction change never cuts a corner mid-tile.
    pub fn step<F>(&mut self, map: &GridMap, gates_open: bool, decide: F)
    where
        F: FnOnce(TileCoord, Direction) -> Direction,
    {
        if self.at_tile_center() {
            self.tx = ((self.x - HALF_TILE) / TILE_SIZE).floor() as i32;
            self.ty = ((self.y - HALF_TILE) / TILE_SIZE).floor() as i32;

            self.dir = decide(self.tile(), self.dir);
            if self.dir != Direction::None {
                let (dx, dy) = self.dir.offset();
                if !map.is_passable(self.tx + dx, self.ty + dy, gates_open) {
                    self.dir = Direction::None;
                }
            }
        }

        let (dx, dy) = self.dir.offset();
        self.x += dx as f32 * self.speed;
        self.y += dy as f32 * self.speed;
    }
}

#[cfg(test)]
mod tests {
    use super::Mover;
    use crate::constants::{ACTOR_BOX, TILE_SIZE};
    use crate::types::{Direction, TileCoord};
    use crate::world::GridMap;

    fn open_map() -> GridMap {
        GridMap::parse(&["######", "#P.. #", "#M.. #", "######"]).unwrap()
    }

    fn mover_at(x: i32, y: i32, speed: f32) -> Mover {
        Mover::at_tile(TileCoord { x, y }, speed, ACTOR_BOX)
    }

    #[test]
    fn spawns_centered_on_tile() {
        let mover = mover_at(1, 1, 4.0);
        assert!(mover.at_tile_center());
        assert_eq!(mover.x, 1.5 * TILE_SIZE);
        assert_eq!(mover.y, 1.5 * TILE_SIZE);
    }

    #[test]
    fn decision_runs_exactly_once_per_alignment() {
        let map = open_map();
        let mut mover = mover_at(1, 1, 4.0);
        let mut decisions = 0;
        // 24 / 4 = 6 ticks per tile: decisions at tick 1 and tick 7 only.
        for _ in 0..7 {
            mover.step(&map, false, |_, _| {
                decisions += 1;
                Direction::Right
            });
        }
        assert_eq!(decisions, 2);
    }

    #[test]
    fn tile_coordinate_is_stale_between_alignments() {
        let map = open_map();
        let mut mover = mover_at(1, 1, 4.0);
        for _ in 0..3 {
            mover.step(&map, false, |_, _| Direction::Right);
        }
        // Halfway into the next tile, the derived coordinate still reads
        // the previous tile.
        assert!(!mover.at_tile_center());
        assert_eq!(mover.tile(), TileCoord { x: 1, y: 1 });

        for _ in 0..3 {
            mover.step(&map, false, |_, _| Direction::Right);
        }
        assert_eq!(mover.tile(), TileCoord { x: 2, y: 1 });
    }

    #[test]
    fn fractional_speed_still_realigns_exactly() {
        let map = open_map();
        let mut mover = mover_at(1, 1, 1.5);
        mover.step(&map, false, |_, _| Direction::Right);
        for _ in 0..15 {
            assert!(!mover.at_tile_center());
            mover.step(&map, false, |_, _| Direction::Right);
        }
        assert!(mover.at_tile_center());
    }

    #[test]
    fn illegal_direction_is_forced_to_none() {
        let map = open_map();
        let mut mover = mover_at(1, 1, 4.0);
        mover.step(&map, false, |_, _| Direction::Up);
        assert_eq!(mover.dir, Direction::None);
        assert_eq!(mover.x, 1.5 * TILE_SIZE);
        assert_eq!(mover.y, 1.5 * TILE_SIZE);
    }

    #[test]
    fn closed_gate_blocks_until_flag_opens() {
        let map = GridMap::parse(&["####", "#PG#", "#M.#", "####"]).unwrap();
        let mut mover = mover_at(1, 1, 4.0);
        mover.step(&map, false, |_, _| Direction::Right);
        assert_eq!(mover.dir, Direction::None);

        mover.step(&map, true, |_, _| Direction::Right);
        assert_eq!(mover.dir, Direction::Right);
        assert_eq!(mover.x, 1.5 * TILE_SIZE + 4.0);
    }

    #[test]
    fn bounding_box_tracks_continuous_position() {
        let map = open_map();
        let mut mover = mover_at(1, 1, 4.0);
        mover.step(&map, false, |_, _| Direction::Down);
        let bb = mover.bounding_box();
        assert_eq!(bb.cx, 1.5 * TILE_SIZE);
        assert_eq!(bb.cy, 1.5 * TILE_SIZE + 4.0);
        assert_eq!(bb.size, ACTOR_BOX);
    }
}
