use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, trace, warn};

use crate::grid::{Cell, Dir, Grid, Pos};

pub const MIN_BASE_DIM: usize = 5;

/// Tunables for maze construction. `Default` gives the stock game values.
/// [`MazeGenerator::with_config`] raises base dimensions to at least
/// [`MIN_BASE_DIM`] and clamps the extend chance into `[0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratorConfig {
    pub base_width: usize,
    pub base_height: usize,
    pub max_extra_connections: usize,
    pub connection_tries: usize,
    /// Dead ends are only added for levels strictly above this one.
    pub dead_end_min_level: u32,
    pub dead_end_tries: usize,
    /// Probability that a dead-end branch grows one more segment.
    pub dead_end_extend_chance: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_width: 15,
            base_height: 11,
            max_extra_connections: 15,
            connection_tries: 50,
            dead_end_min_level: 2,
            dead_end_tries: 30,
            dead_end_extend_chance: 0.3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MazeResult {
    pub grid: Grid,
    pub width: usize,
    pub height: usize,
    pub start: Pos,
    pub end: Pos,
}

#[derive(Clone, Debug, Default)]
pub struct MazeGenerator {
    config: GeneratorConfig,
}

impl MazeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut config: GeneratorConfig) -> Self {
        config.base_width = config.base_width.max(MIN_BASE_DIM);
        config.base_height = config.base_height.max(MIN_BASE_DIM);
        config.dead_end_extend_chance = if config.dead_end_extend_chance.is_nan() {
            0.0
        } else {
            config.dead_end_extend_chance.clamp(0.0, 1.0)
        };
        Self { config }
    }

    pub fn dimensions(&self, level: u32) -> (usize, usize) {
        let level = level as usize;
        let width = self.config.base_width + (level / 2) * 2;
        let height = self.config.base_height + (level / 3) * 2;
        (make_odd(width), make_odd(height))
    }

    pub fn extra_connection_attempts(&self, level: u32) -> usize {
        (level as usize)
            .saturating_mul(2)
            .min(self.config.max_extra_connections)
    }

    pub fn dead_end_count(&self, level: u32) -> usize {
        if level > self.config.dead_end_min_level {
            level as usize / 2
        } else {
            0
        }
    }

    pub fn generate(&self, level: u32, rng: &mut impl Rng) -> MazeResult {
        let (width, height) = self.dimensions(level);
        let mut grid = Grid::filled(width, height, Cell::Wall);
        let start = Pos::new(1, 1);
        let end = Pos::new(width - 2, height - 2);

        carve(&mut grid, start, rng);
        let loops = self.add_extra_connections(&mut grid, level, rng);
        let dead_ends = self.add_dead_ends(&mut grid, level, rng);

        grid.set(start, Cell::Path);
        grid.set(end, Cell::Path);
        let repaired = ensure_path_to_end(&mut grid, start, end);

        debug!(level, width, height, loops, dead_ends, repaired, "generated maze");
        trace!("maze layout:\n{}", grid);

        MazeResult {
            grid,
            width,
            height,
            start,
            end,
        }
    }

    /// Opens walls that join exactly two paths, creating loops. Returns how many were opened.
    fn add_extra_connections(&self, grid: &mut Grid, level: u32, rng: &mut impl Rng) -> usize {
        let (width, height) = (grid.width(), grid.height());
        if width < 3 || height < 3 {
            return 0;
        }
        let mut opened = 0;
        for _ in 0..self.extra_connection_attempts(level) {
            for _ in 0..self.config.connection_tries {
                let pos = Pos::new(rng.gen_range(1..width - 1), rng.gen_range(1..height - 1));
                if grid.is_wall(pos) && grid.path_neighbors(pos) == 2 {
                    grid.set(pos, Cell::Path);
                    opened += 1;
                    break;
                }
            }
        }
        opened
    }

    fn add_dead_ends(&self, grid: &mut Grid, level: u32, rng: &mut impl Rng) -> usize {
        let (width, height) = (grid.width(), grid.height());
        if width < 5 || height < 5 {
            return 0;
        }
        let mut added = 0;
        for _ in 0..self.dead_end_count(level) {
            for _ in 0..self.config.dead_end_tries {
                let pos = Pos::new(rng.gen_range(2..width - 2), rng.gen_range(2..height - 2));
                if grid.is_path(pos) && Dir::ALL.iter().any(|&d| branch_end(grid, pos, d).is_some()) {
                    self.grow_dead_end(grid, pos, rng);
                    added += 1;
                    break;
                }
            }
        }
        added
    }

    /// Carves a two-cell branch out of `from`, then keeps extending it from the
    /// new tip while the continuation coin flip succeeds.
    fn grow_dead_end(&self, grid: &mut Grid, from: Pos, rng: &mut impl Rng) {
        let mut tip = from;
        loop {
            let mut dirs = Dir::ALL;
            dirs.shuffle(rng);
            let Some((wall, end)) = dirs.iter().find_map(|&d| branch_end(grid, tip, d)) else {
                break;
            };
            grid.set(wall, Cell::Path);
            grid.set(end, Cell::Path);
            tip = end;
            if !rng.gen_bool(self.config.dead_end_extend_chance) {
                break;
            }
        }
    }
}

fn make_odd(n: usize) -> usize {
    if n % 2 == 0 {
        n + 1
    } else {
        n
    }
}

/// Recursive backtracking from `start` over the odd sublattice. Unvisited cells
/// are the ones still walled, so no separate visited set is kept.
fn carve(grid: &mut Grid, start: Pos, rng: &mut impl Rng) {
    grid.set(start, Cell::Path);
    let mut stack = vec![start];

    while let Some(&current) = stack.last() {
        let neighbors: Vec<Pos> = Dir::ALL
            .iter()
            .filter_map(|&dir| grid.offset(current, dir, 2))
            .filter(|&next| grid.is_interior(next) && grid.is_wall(next))
            .collect();

        let Some(&next) = neighbors.choose(rng) else {
            stack.pop();
            continue;
        };
        let between = Pos::new((current.x + next.x) / 2, (current.y + next.y) / 2);
        grid.set(next, Cell::Path);
        grid.set(between, Cell::Path);
        stack.push(next);
    }
}

/// Wall cell and tip of a branch going `dir` from `pos`, if both are still
/// unexplored wall and the tip stays inside the border.
fn branch_end(grid: &Grid, pos: Pos, dir: Dir) -> Option<(Pos, Pos)> {
    let wall = grid.offset(pos, dir, 1)?;
    let end = grid.offset(pos, dir, 2)?;
    (grid.is_interior(end) && grid.is_wall(wall) && grid.is_wall(end)).then_some((wall, end))
}

/// Makes sure `end` is reachable from `start`, carving an L-shaped corridor
/// along row 1 and column `width - 2` when it is not. Returns true if it carved.
pub(crate) fn ensure_path_to_end(grid: &mut Grid, start: Pos, end: Pos) -> bool {
    if grid.is_reachable(start, end) {
        return false;
    }
    warn!(
        width = grid.width(),
        height = grid.height(),
        "start cannot reach end; carving fallback corridor"
    );
    let (width, height) = (grid.width(), grid.height());
    for x in 1..=width - 2 {
        grid.set(Pos::new(x, 1), Cell::Path);
    }
    for y in 1..=height - 2 {
        grid.set(Pos::new(width - 2, y), Cell::Path);
    }
    true
}
