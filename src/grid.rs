use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use crate::error::GridParseError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cell {
    Wall,
    Path,
}

impl Cell {
    fn glyph(self) -> char {
        match self {
            Cell::Wall => '#',
            Cell::Path => '.',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    pub fn manhattan(self, other: Pos) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dir {
    Up,
    Right,
    Down,
    Left,
}

impl Dir {
    pub const ALL: [Dir; 4] = [Dir::Up, Dir::Right, Dir::Down, Dir::Left];

    pub fn delta(self) -> (isize, isize) {
        match self {
            Dir::Up => (0, -1),
            Dir::Right => (1, 0),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn filled(width: usize, height: usize, cell: Cell) -> Self {
        Self {
            width,
            height,
            cells: vec![cell; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, pos: Pos) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    pub fn is_interior(&self, pos: Pos) -> bool {
        pos.x > 0 && pos.y > 0 && pos.x + 1 < self.width && pos.y + 1 < self.height
    }

    pub fn get(&self, pos: Pos) -> Option<Cell> {
        if self.contains(pos) {
            Some(self.cells[pos.y * self.width + pos.x])
        } else {
            None
        }
    }

    pub fn set(&mut self, pos: Pos, cell: Cell) -> bool {
        if !self.contains(pos) {
            return false;
        }
        self.cells[pos.y * self.width + pos.x] = cell;
        true
    }

    pub fn is_path(&self, pos: Pos) -> bool {
        self.get(pos) == Some(Cell::Path)
    }

    pub fn is_wall(&self, pos: Pos) -> bool {
        self.get(pos) == Some(Cell::Wall)
    }

    pub fn offset(&self, pos: Pos, dir: Dir, dist: usize) -> Option<Pos> {
        let (dx, dy) = dir.delta();
        let nx = pos.x.checked_add_signed(dx * dist as isize)?;
        let ny = pos.y.checked_add_signed(dy * dist as isize)?;
        let next = Pos::new(nx, ny);
        self.contains(next).then_some(next)
    }

    pub fn path_neighbors(&self, pos: Pos) -> usize {
        Dir::ALL
            .iter()
            .filter_map(|&dir| self.offset(pos, dir, 1))
            .filter(|&next| self.is_path(next))
            .count()
    }

    pub fn positions(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Pos::new(x, y)))
    }

    pub fn count(&self, cell: Cell) -> usize {
        self.cells.iter().filter(|&&c| c == cell).count()
    }

    /// Breadth-first search over path cells using axis moves.
    pub fn is_reachable(&self, from: Pos, to: Pos) -> bool {
        if !self.is_path(from) || !self.is_path(to) {
            return false;
        }
        let mut seen = vec![false; self.cells.len()];
        let mut q = VecDeque::new();
        seen[from.y * self.width + from.x] = true;
        q.push_back(from);

        while let Some(pos) = q.pop_front() {
            if pos == to {
                return true;
            }
            for dir in Dir::ALL {
                let Some(next) = self.offset(pos, dir, 1) else {
                    continue;
                };
                let idx = next.y * self.width + next.x;
                if seen[idx] || !self.is_path(next) {
                    continue;
                }
                seen[idx] = true;
                q.push_back(next);
            }
        }
        false
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (y, row) in self.cells.chunks(self.width.max(1)).enumerate() {
            if y > 0 {
                writeln!(f)?;
            }
            for cell in row {
                write!(f, "{}", cell.glyph())?;
            }
        }
        Ok(())
    }
}

impl FromStr for Grid {
    type Err = GridParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<&str> = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let Some(first) = rows.first() else {
            return Err(GridParseError::Empty);
        };
        let width = first.chars().count();
        let mut cells = Vec::with_capacity(width * rows.len());
        for (row, line) in rows.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(GridParseError::Ragged {
                    row,
                    expected: width,
                    found,
                });
            }
            for (col, glyph) in line.chars().enumerate() {
                let cell = match glyph {
                    '#' => Cell::Wall,
                    '.' => Cell::Path,
                    _ => return Err(GridParseError::UnknownGlyph { glyph, row, col }),
                };
                cells.push(cell);
            }
        }
        Ok(Self {
            width,
            height: rows.len(),
            cells,
        })
    }
}
