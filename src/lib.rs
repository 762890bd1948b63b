//! Procedural maze generation and the grid game built on top of it.
//!
//! [`generator::MazeGenerator`] turns a level number into a [`generator::MazeResult`];
//! [`spawns`] picks power-up and enemy cells from it; [`game::Game`] owns the
//! per-level state the terminal front end drives.

pub mod config;
pub mod error;
pub mod game;
pub mod generator;
pub mod grid;
pub mod spawns;

pub use generator::{GeneratorConfig, MazeGenerator, MazeResult};
pub use grid::{Cell, Dir, Grid, Pos};
