//! delve-core: procedural dungeon generation engine
//!
//! Turns an empty rectangular tile grid into a connected, explorable layout
//! using cellular automata, backtracking corridor search, maze growth,
//! flood-fill segmentation and largest-rectangle search.
//!
//! All operators work in place on a [`dungeon::Grid`] and draw randomness
//! from a single seeded [`GameRng`], so a seed fully determines the result.

pub mod config;
pub mod dungeon;

mod rng;

pub use config::{ConfigError, DEFAULT_CORRIDOR_STEP_BUDGET, GenConfig, Setting};
pub use rng::GameRng;
