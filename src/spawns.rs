//! Picks power-up and enemy spawn cells out of a generated maze.

use rand::Rng;

use crate::generator::MazeResult;
use crate::grid::Pos;

/// Enemies never spawn within this Manhattan distance of the start or the exit.
pub const ENEMY_CLEARANCE: usize = 3;
pub const MAX_ENEMIES: u32 = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PowerUpKind {
    Speed,
    Invincibility,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 2] = [PowerUpKind::Speed, PowerUpKind::Invincibility];

    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    pub fn name(self) -> &'static str {
        match self {
            PowerUpKind::Speed => "Speed",
            PowerUpKind::Invincibility => "Invincibility",
        }
    }
}

pub fn enemy_count(level: u32) -> usize {
    level.min(MAX_ENEMIES) as usize
}

pub fn find_powerup_positions(maze: &MazeResult, count: usize, rng: &mut impl Rng) -> Vec<Pos> {
    let grid = &maze.grid;
    let candidates = grid
        .positions()
        .filter(|&p| grid.is_interior(p) && grid.is_path(p))
        .filter(|&p| p != maze.start && p != maze.end)
        .collect();
    sample(candidates, count, rng)
}

/// Path cells at least two cells in from the border and more than
/// [`ENEMY_CLEARANCE`] steps from both the start and the exit.
pub fn find_enemy_positions(maze: &MazeResult, count: usize, rng: &mut impl Rng) -> Vec<Pos> {
    let grid = &maze.grid;
    let candidates = grid
        .positions()
        .filter(|p| p.x >= 2 && p.y >= 2 && p.x + 2 < maze.width && p.y + 2 < maze.height)
        .filter(|&p| grid.is_path(p))
        .filter(|&p| {
            p.manhattan(maze.start) > ENEMY_CLEARANCE && p.manhattan(maze.end) > ENEMY_CLEARANCE
        })
        .collect();
    sample(candidates, count, rng)
}

fn sample(mut candidates: Vec<Pos>, count: usize, rng: &mut impl Rng) -> Vec<Pos> {
    let take = count.min(candidates.len());
    let mut picked = Vec::with_capacity(take);
    for _ in 0..take {
        let idx = rng.gen_range(0..candidates.len());
        picked.push(candidates.swap_remove(idx));
    }
    picked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn maze_from(text: &str) -> MazeResult {
        let grid: Grid = text.parse().unwrap();
        let (width, height) = (grid.width(), grid.height());
        MazeResult {
            grid,
            width,
            height,
            start: Pos::new(1, 1),
            end: Pos::new(width - 2, height - 2),
        }
    }

    #[test]
    fn powerups_skip_start_and_end() {
        let maze = maze_from(
            "
            #####
            #...#
            #####
            #...#
            #####
            ",
        );
        let mut rng = StdRng::seed_from_u64(1);
        let picked = find_powerup_positions(&maze, 10, &mut rng);
        let picked: HashSet<Pos> = picked.into_iter().collect();
        let expected: HashSet<Pos> = [
            Pos::new(2, 1),
            Pos::new(3, 1),
            Pos::new(1, 3),
            Pos::new(2, 3),
        ]
        .into_iter()
        .collect();
        assert_eq!(picked, expected);
    }

    #[test]
    fn samples_are_distinct() {
        let maze = maze_from(
            "
            #########
            #.......#
            #.......#
            #.......#
            #########
            ",
        );
        let mut rng = StdRng::seed_from_u64(9);
        let picked = find_powerup_positions(&maze, 8, &mut rng);
        assert_eq!(picked.len(), 8);
        let unique: HashSet<Pos> = picked.iter().copied().collect();
        assert_eq!(unique.len(), 8);
    }

    #[test]
    fn zero_count_returns_nothing() {
        let maze = maze_from(
            "
            #####
            #...#
            #...#
            #...#
            #####
            ",
        );
        let mut rng = StdRng::seed_from_u64(2);
        assert!(find_powerup_positions(&maze, 0, &mut rng).is_empty());
        assert!(find_enemy_positions(&maze, 0, &mut rng).is_empty());
    }

    #[test]
    fn enemies_keep_clear_of_start_and_end() {
        // Open 11x9 room: the band [2, dim-3] has 7x5 cells, of which those
        // within 3 steps of (1,1) or (9,7) are excluded.
        let maze = maze_from(
            "
            ###########
            #.........#
            #.........#
            #.........#
            #.........#
            #.........#
            #.........#
            #.........#
            ###########
            ",
        );
        let mut rng = StdRng::seed_from_u64(4);
        let picked = find_enemy_positions(&maze, 100, &mut rng);
        let band = (2..=8)
            .flat_map(|x| (2..=6).map(move |y| Pos::new(x, y)))
            .filter(|p| p.manhattan(maze.start) > 3 && p.manhattan(maze.end) > 3)
            .count();
        assert_eq!(picked.len(), band);
        for p in picked {
            assert!(p.manhattan(maze.start) > ENEMY_CLEARANCE);
            assert!(p.manhattan(maze.end) > ENEMY_CLEARANCE);
            assert!(p.x >= 2 && p.x <= 8 && p.y >= 2 && p.y <= 6);
        }
    }

    #[test]
    fn enemy_count_caps_at_six() {
        assert_eq!(enemy_count(1), 1);
        assert_eq!(enemy_count(6), 6);
        assert_eq!(enemy_count(11), 6);
    }

    #[test]
    fn both_powerup_kinds_appear() {
        let mut rng = StdRng::seed_from_u64(5);
        let kinds: HashSet<_> = (0..64)
            .map(|_| PowerUpKind::random(&mut rng))
            .map(PowerUpKind::name)
            .collect();
        assert_eq!(kinds.len(), 2);
    }
}
