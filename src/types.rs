use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    None,
}

impl Direction {
    pub const CARDINALS: [Direction; 4] = [
        Direction::Right,
        Direction::Left,
        Direction::Down,
        Direction::Up,
    ];

    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::None => (0, 0),
        }
    }

    pub fn reverse(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::None => Direction::None,
        }
    }

}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PickupSize {
    Small,
    Large,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TileKind {
    Wall,
    Open,
    Gate,
    Pickup(PickupSize),
    PlayerSpawn,
    AdversarySpawn,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundState {
    Active,
    PlayerDefeated,
    PlayerEscaped,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdversaryPhase {
    Hunting,
    Fleeing,
    Defeated,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

/// Axis-aligned square collision box centered on a continuous position.
/// Overlap is strict on both axes: boxes that merely touch do not collide.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BoundingBox {
    pub cx: f32,
    pub cy: f32,
    pub size: f32,
}

impl BoundingBox {
    pub fn new(cx: f32, cy: f32, size: f32) -> Self {
        Self { cx, cy, size }
    }

    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        let limit = (self.size + other.size) / 2.0;
        (self.cx - other.cx).abs() < limit && (self.cy - other.cy).abs() < limit
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct PlayerView {
    pub x: f32,
    pub y: f32,
    pub dir: Direction,
    #[serde(rename = "boundingBox")]
    pub bounding_box: BoundingBox,
}

#[derive(Clone, Debug, Serialize)]
pub struct WandererView {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub dir: Direction,
    #[serde(rename = "boundingBox")]
    pub bounding_box: BoundingBox,
}

#[derive(Clone, Debug, Serialize)]
pub struct AdversaryView {
    pub x: f32,
    pub y: f32,
    pub dir: Direction,
    pub phase: AdversaryPhase,
    #[serde(rename = "boundingBox")]
    pub bounding_box: BoundingBox,
}

#[derive(Clone, Debug, Serialize)]
pub struct PickupView {
    pub tile: TileCoord,
    pub size: PickupSize,
    #[serde(rename = "boundingBox")]
    pub bounding_box: BoundingBox,
}

/// Discrete cue notifications for audio/asset collaborators. The engine has
/// no awareness of what a collaborator does with them.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    PickupCollected { tile: TileCoord },
    FleeStarted,
    WandererCaught { id: u32 },
    AdversaryDefeated,
    PlayerDefeated,
    PlayerEscaped,
}

/// Read-only per-tick view for the rendering collaborator.
#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    #[serde(rename = "roundState")]
    pub round_state: RoundState,
    pub score: i32,
    #[serde(rename = "gatesOpen")]
    pub gates_open: bool,
    pub player: PlayerView,
    pub wanderers: Vec<WandererView>,
    pub adversary: AdversaryView,
    pub pickups: Vec<PickupView>,
    pub events: Vec<RuntimeEvent>,
}

#[derive(Clone, Debug, Serialize)]
pub struct RoundSummary {
    pub outcome: RoundState,
    pub ticks: u64,
    pub score: i32,
    #[serde(rename = "pickupsCollected")]
    pub pickups_collected: usize,
    #[serde(rename = "pickupsRemaining")]
    pub pickups_remaining: usize,
    #[serde(rename = "wanderersSurviving")]
    pub wanderers_surviving: usize,
    #[serde(rename = "adversaryDefeated")]
    pub adversary_defeated: bool,
}
