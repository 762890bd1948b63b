//! Owned per-session game state: the current maze plus everything moving in it.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;

use crate::generator::{MazeGenerator, MazeResult};
use crate::grid::{Dir, Grid, Pos};
use crate::spawns::{self, PowerUpKind};

const PLAYER_MOVE_INTERVAL: u32 = 2;
const ENEMY_BASE_INTERVAL: f32 = 4.0;
const ENEMY_SPEEDUP_PER_LEVEL: f32 = 0.15;
const ENEMY_MIN_RUN: u32 = 8;
const ENEMY_MAX_RUN: u32 = 24;
const ENEMY_TURN_CHANCE: f64 = 0.3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Playing,
    LevelComplete,
    GameOver,
    Won,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PowerUp {
    pub pos: Pos,
    pub kind: PowerUpKind,
    pub collected: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Enemy {
    pub pos: Pos,
    pub dir: Dir,
    run: u32,
    run_limit: u32,
}

impl Enemy {
    fn spawn(pos: Pos, rng: &mut impl Rng) -> Self {
        Self {
            pos,
            dir: Dir::ALL[rng.gen_range(0..Dir::ALL.len())],
            run: 0,
            run_limit: rng.gen_range(ENEMY_MIN_RUN..=ENEMY_MAX_RUN),
        }
    }

    /// Points the enemy at a random open direction; keeps the old one if boxed in.
    fn turn(&mut self, grid: &Grid, rng: &mut impl Rng) {
        let mut dirs = Dir::ALL;
        dirs.shuffle(rng);
        if let Some(dir) = dirs.into_iter().find(|&d| step(grid, self.pos, d).is_some()) {
            self.dir = dir;
            self.run = 0;
            self.run_limit = rng.gen_range(ENEMY_MIN_RUN..=ENEMY_MAX_RUN);
        }
    }
}

pub struct Game {
    generator: MazeGenerator,
    pub maze: MazeResult,
    pub level: u32,
    pub max_level: u32,
    pub player: Pos,
    pub dir: Option<Dir>,
    pub power_up: Option<PowerUp>,
    pub active_power: Option<PowerUpKind>,
    pub enemies: Vec<Enemy>,
    pub phase: Phase,
    tick: u32,
}

impl Game {
    pub fn new(generator: MazeGenerator, level: u32, max_level: u32, rng: &mut impl Rng) -> Self {
        let maze = generator.generate(level, rng);
        let mut game = Self {
            generator,
            player: maze.start,
            maze,
            level,
            max_level,
            dir: None,
            power_up: None,
            active_power: None,
            enemies: Vec::new(),
            phase: Phase::Playing,
            tick: 0,
        };
        game.populate(rng);
        game
    }

    fn populate(&mut self, rng: &mut impl Rng) {
        self.player = self.maze.start;
        self.dir = None;
        self.active_power = None;
        self.phase = Phase::Playing;
        self.tick = 0;

        self.power_up = spawns::find_powerup_positions(&self.maze, 1, rng)
            .first()
            .map(|&pos| PowerUp {
                pos,
                kind: PowerUpKind::random(rng),
                collected: false,
            });

        let wanted = spawns::enemy_count(self.level);
        self.enemies = spawns::find_enemy_positions(&self.maze, wanted, rng)
            .into_iter()
            .map(|pos| Enemy::spawn(pos, rng))
            .collect();

        info!(
            level = self.level,
            width = self.maze.width,
            height = self.maze.height,
            enemies = self.enemies.len(),
            power_up = ?self.power_up.map(|p| p.kind),
            "level started"
        );
    }

    fn start_level(&mut self, rng: &mut impl Rng) {
        self.maze = self.generator.generate(self.level, rng);
        self.populate(rng);
    }

    /// Advances to the following level, or back to level 1 after the last one.
    pub fn next_level(&mut self, rng: &mut impl Rng) {
        self.level = if self.level < self.max_level {
            self.level + 1
        } else {
            1
        };
        self.start_level(rng);
    }

    pub fn restart_level(&mut self, rng: &mut impl Rng) {
        self.start_level(rng);
    }

    pub fn tick(&mut self, rng: &mut impl Rng, desired_dir: Option<Dir>) {
        if self.phase != Phase::Playing {
            return;
        }
        self.tick = self.tick.wrapping_add(1);

        // Movement follows the held key only; nothing is buffered across ticks.
        self.dir = desired_dir;
        if self.tick % self.player_move_interval() == 0 {
            self.move_player();
        }
        if self.player == self.maze.end {
            self.complete_level();
            return;
        }
        self.try_collect_power_up();
        self.handle_collisions();
        if self.phase != Phase::Playing {
            return;
        }
        self.update_enemies(rng);
        self.handle_collisions();
    }

    pub fn enemy_at(&self, pos: Pos) -> bool {
        self.enemies.iter().any(|e| e.pos == pos)
    }

    fn player_move_interval(&self) -> u32 {
        if self.active_power == Some(PowerUpKind::Speed) {
            1
        } else {
            PLAYER_MOVE_INTERVAL
        }
    }

    fn move_player(&mut self) {
        if let Some(next) = self.dir.and_then(|dir| step(&self.maze.grid, self.player, dir)) {
            self.player = next;
        }
    }

    fn complete_level(&mut self) {
        self.phase = if self.level >= self.max_level {
            Phase::Won
        } else {
            Phase::LevelComplete
        };
        info!(level = self.level, phase = ?self.phase, "exit reached");
    }

    fn try_collect_power_up(&mut self) {
        if self.active_power.is_some() {
            return;
        }
        if let Some(power_up) = self.power_up.as_mut() {
            if !power_up.collected && power_up.pos == self.player {
                power_up.collected = true;
                self.active_power = Some(power_up.kind);
                info!(kind = power_up.kind.name(), "power-up collected");
            }
        }
    }

    fn update_enemies(&mut self, rng: &mut impl Rng) {
        if self.tick % enemy_move_interval(self.level) != 0 {
            return;
        }
        let grid = &self.maze.grid;
        for enemy in &mut self.enemies {
            match step(grid, enemy.pos, enemy.dir) {
                Some(next) => {
                    enemy.pos = next;
                    enemy.run += 1;
                    if enemy.run > enemy.run_limit && rng.gen_bool(ENEMY_TURN_CHANCE) {
                        enemy.turn(grid, rng);
                    }
                }
                None => enemy.turn(grid, rng),
            }
        }
    }

    fn handle_collisions(&mut self) {
        if self.active_power == Some(PowerUpKind::Invincibility) {
            return;
        }
        if self.enemy_at(self.player) {
            self.phase = Phase::GameOver;
            info!(level = self.level, x = self.player.x, y = self.player.y, "caught by enemy");
        }
    }
}

/// Ticks between enemy moves; enemies speed up with the level.
pub fn enemy_move_interval(level: u32) -> u32 {
    let speed = 1.0 + level as f32 * ENEMY_SPEEDUP_PER_LEVEL;
    ((ENEMY_BASE_INTERVAL / speed).round() as u32).max(1)
}

fn step(grid: &Grid, pos: Pos, dir: Dir) -> Option<Pos> {
    grid.offset(pos, dir, 1).filter(|&next| grid.is_path(next))
}
