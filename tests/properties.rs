use maze_runner::spawns::{enemy_count, find_enemy_positions, find_powerup_positions};
use maze_runner::{Cell, MazeGenerator, MazeResult, Pos};
use rand::rngs::StdRng;
use rand::SeedableRng;

const LEVELS: u32 = 30;
const SEEDS: u64 = 8;

fn mazes() -> impl Iterator<Item = (u32, u64, MazeResult)> {
    let maze_gen = MazeGenerator::new();
    (1..=LEVELS).flat_map(move |level| {
        let maze_gen = maze_gen.clone();
        (0..SEEDS).map(move |seed| {
            let mut rng = StdRng::seed_from_u64(seed * 1_000 + u64::from(level));
            (level, seed, maze_gen.generate(level, &mut rng))
        })
    })
}

#[test]
fn dimensions_are_odd_and_at_least_base() {
    for (level, _, maze) in mazes() {
        assert_eq!(maze.width % 2, 1, "level {level}");
        assert_eq!(maze.height % 2, 1, "level {level}");
        assert!(maze.width >= 15 && maze.height >= 11, "level {level}");
        assert_eq!(maze.grid.width(), maze.width);
        assert_eq!(maze.grid.height(), maze.height);
    }
}

#[test]
fn start_and_end_are_open_and_connected() {
    for (level, seed, maze) in mazes() {
        assert_eq!(maze.start, Pos::new(1, 1));
        assert_eq!(maze.end, Pos::new(maze.width - 2, maze.height - 2));
        assert!(maze.grid.is_path(maze.start));
        assert!(maze.grid.is_path(maze.end));
        assert!(
            maze.grid.is_reachable(maze.start, maze.end),
            "level {level} seed {seed}:\n{}",
            maze.grid
        );
    }
}

#[test]
fn border_is_always_wall() {
    for (level, seed, maze) in mazes() {
        for x in 0..maze.width {
            assert_eq!(maze.grid.get(Pos::new(x, 0)), Some(Cell::Wall));
            assert_eq!(maze.grid.get(Pos::new(x, maze.height - 1)), Some(Cell::Wall));
        }
        for y in 0..maze.height {
            assert_eq!(maze.grid.get(Pos::new(0, y)), Some(Cell::Wall), "level {level} seed {seed}");
            assert_eq!(maze.grid.get(Pos::new(maze.width - 1, y)), Some(Cell::Wall));
        }
    }
}

#[test]
fn every_path_cell_is_reachable_from_start() {
    // Complexity injection only ever adds paths to a spanning tree.
    for (_, _, maze) in mazes().filter(|(level, _, _)| level % 5 == 0) {
        let grid = &maze.grid;
        for pos in grid.positions().filter(|&p| grid.is_path(p)) {
            assert!(grid.is_reachable(maze.start, pos));
        }
    }
}

#[test]
fn powerup_never_on_start_or_end() {
    for (level, seed, maze) in mazes() {
        let mut rng = StdRng::seed_from_u64(seed + 77);
        let picked = find_powerup_positions(&maze, 1, &mut rng);
        assert_eq!(picked.len(), 1, "level {level}");
        let pos = picked[0];
        assert_ne!(pos, maze.start);
        assert_ne!(pos, maze.end);
        assert!(maze.grid.is_path(pos));
    }
}

#[test]
fn enemies_respect_clearance_and_shortfall() {
    for (level, seed, maze) in mazes() {
        let mut rng = StdRng::seed_from_u64(seed + 99);
        let picked = find_enemy_positions(&maze, enemy_count(level), &mut rng);
        assert!(picked.len() <= enemy_count(level));
        for pos in &picked {
            assert!(maze.grid.is_path(*pos));
            assert!(pos.manhattan(maze.start) > 3);
            assert!(pos.manhattan(maze.end) > 3);
            assert!(pos.x >= 2 && pos.y >= 2);
            assert!(pos.x <= maze.width - 3 && pos.y <= maze.height - 3);
        }

        let available = maze
            .grid
            .positions()
            .filter(|p| p.x >= 2 && p.y >= 2 && p.x <= maze.width - 3 && p.y <= maze.height - 3)
            .filter(|&p| maze.grid.is_path(p))
            .filter(|p| p.manhattan(maze.start) > 3 && p.manhattan(maze.end) > 3)
            .count();
        let everything = find_enemy_positions(&maze, available + 50, &mut rng);
        assert_eq!(everything.len(), available);
    }
}

#[test]
fn level_one_scenario() {
    let maze_gen = MazeGenerator::new();
    let mut rng = StdRng::seed_from_u64(1);
    let maze = maze_gen.generate(1, &mut rng);
    assert_eq!((maze.width, maze.height), (15, 11));
    assert_eq!(maze.start, Pos::new(1, 1));
    assert_eq!(maze.end, Pos::new(13, 9));
    assert_eq!(maze_gen.extra_connection_attempts(1), 2);
    assert_eq!(maze_gen.dead_end_count(1), 0);
}

#[test]
fn level_five_scenario() {
    let maze_gen = MazeGenerator::new();
    let mut rng = StdRng::seed_from_u64(5);
    let maze = maze_gen.generate(5, &mut rng);
    assert_eq!((maze.width, maze.height), (19, 13));
    assert_eq!(maze.end, Pos::new(17, 11));
    assert_eq!(maze_gen.dead_end_count(5), 2);
}

#[test]
fn same_seed_same_maze() {
    let maze_gen = MazeGenerator::new();
    let a = maze_gen.generate(6, &mut StdRng::seed_from_u64(42));
    let b = maze_gen.generate(6, &mut StdRng::seed_from_u64(42));
    assert_eq!(a, b);
}

#[test]
fn different_seeds_vary_layout() {
    let maze_gen = MazeGenerator::new();
    let first = maze_gen.generate(4, &mut StdRng::seed_from_u64(0));
    let distinct = (1..10)
        .map(|seed| maze_gen.generate(4, &mut StdRng::seed_from_u64(seed)))
        .filter(|maze| maze.grid != first.grid)
        .count();
    assert!(distinct > 0);
}

#[test]
fn sequential_generation_does_not_leak_state() {
    let maze_gen = MazeGenerator::new();
    let mut rng = StdRng::seed_from_u64(12);
    let big = maze_gen.generate(20, &mut rng);
    let small = maze_gen.generate(1, &mut rng);
    assert_eq!((big.width, big.height), (35, 23));
    assert_eq!((small.width, small.height), (15, 11));
    assert!(small.grid.is_reachable(small.start, small.end));
}
