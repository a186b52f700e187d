//! Deterministic round core for a tile-based chase game: grid map, BFS
//! pursuit, pickup scoring and the gate-escape endgame. Rendering and input
//! frontends consume [`types::Snapshot`] and feed directions back in.

pub mod constants;
pub mod engine;
pub mod pathfind;
pub mod rng;
pub mod types;
pub mod world;
