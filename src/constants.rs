pub const TICK_RATE: u32 = 60;
pub const TICK_MS: u64 = 1000 / TICK_RATE as u64;

pub const TILE_SIZE: f32 = 24.0;
pub const HALF_TILE: f32 = TILE_SIZE / 2.0;

// Distance per tick. Each value divides TILE_SIZE into a whole number of
// ticks, so tile-center alignment stays exact in f32.
pub const PLAYER_SPEED: f32 = 4.0;
pub const WANDERER_SPEED: f32 = 1.5;
pub const ADVERSARY_SPEED: f32 = 3.0;

// Collision boxes are squares centered on the continuous position.
pub const ACTOR_BOX: f32 = TILE_SIZE;
pub const ADVERSARY_BOX: f32 = TILE_SIZE * 3.0;
pub const PICKUP_BOX: f32 = TILE_SIZE * 3.0 / 8.0;

pub const PICKUP_SCORE: i32 = 10;

pub const WANDERER_SPAWN_TILES: [(i32, i32); 9] = [
    (1, 1),
    (26, 1),
    (1, 20),
    (26, 20),
    (1, 23),
    (26, 23),
    (13, 5),
    (14, 5),
    (12, 26),
];

pub const MAP_LAYOUT: [&str; 31] = [
    "############################",
    "#............##............#",
    "#.####.#####.##.#####.####.#",
    "#o####.#####.##.#####.####o#",
    "#.####.#####.##.#####.####.#",
    "#..........................#",
    "#.####.##.########.##.####.#",
    "#.####.##.########.##.####.#",
    "#......##....##....##......#",
    "######.#####.##.#####.######",
    "     #.#####.##.#####.#     ",
    "     #.##..........##.#     ",
    "     #.##.###  ###.##.#     ",
    "######.##.#      #.##.######",
    "G P   .   #   M  #   .     G",
    "######.##.#      #.##.######",
    "     #.##.########.##.#     ",
    "     #.##..........##.#     ",
    "     #.##.########.##.#     ",
    "######.##.########.##.######",
    "#............##............#",
    "#.####.#####.##.#####.####.#",
    "#.####.#####.##.#####.####.#",
    "#o..##................##..o#",
    "###.##.##.########.##.##.###",
    "###.##.##.########.##.##.###",
    "#......##....##....##......#",
    "#.##########.##.##########.#",
    "#.##########.##.##########.#",
    "#..........................#",
    "############################",
];
