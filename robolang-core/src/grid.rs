//! Arena geometry: cells, facings and agent-relative offsets
//!
//! `y` grows southwards, so north is `(0, -1)`.

use glam::IVec2;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A cell of the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell(pub IVec2);

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self(IVec2::new(x, y))
    }

    pub fn x(self) -> i32 {
        self.0.x
    }

    pub fn y(self) -> i32 {
        self.0.y
    }
}

// Row-major, so ordered collections of cells iterate deterministically
impl Ord for Cell {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.0.y, self.0.x).cmp(&(other.0.y, other.0.x))
    }
}

impl PartialOrd for Cell {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.0.x, self.0.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub fn turn_left(self) -> Self {
        match self {
            Direction::North => Direction::West,
            Direction::West => Direction::South,
            Direction::South => Direction::East,
            Direction::East => Direction::North,
        }
    }

    pub fn turn_right(self) -> Self {
        match self {
            Direction::North => Direction::East,
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
        }
    }

    pub fn reverse(self) -> Self {
        self.turn_left().turn_left()
    }

    pub fn delta(self) -> IVec2 {
        match self {
            Direction::North => IVec2::NEG_Y,
            Direction::East => IVec2::X,
            Direction::South => IVec2::Y,
            Direction::West => IVec2::NEG_X,
        }
    }

    /// Express a world-space displacement as (left-right, front-back) seen
    /// from this facing: right and ahead are positive
    pub fn relative(self, d: IVec2) -> IVec2 {
        match self {
            Direction::North => IVec2::new(d.x, -d.y),
            Direction::South => IVec2::new(-d.x, d.y),
            Direction::West => IVec2::new(-d.y, -d.x),
            Direction::East => IVec2::new(d.y, d.x),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::North => "N",
            Direction::East => "E",
            Direction::South => "S",
            Direction::West => "W",
        };
        f.write_str(name)
    }
}

/// Square arena of `size` x `size` cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    pub size: i32,
}

impl Grid {
    pub fn new(size: i32) -> Self {
        Self { size }
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.0.cmpge(IVec2::ZERO).all() && cell.0.cmplt(IVec2::splat(self.size)).all()
    }

    /// The neighbouring cell in `dir`, or `cell` itself at a wall
    pub fn step(&self, cell: Cell, dir: Direction) -> Cell {
        Cell((cell.0 + dir.delta()).clamp(IVec2::ZERO, IVec2::splat(self.size - 1)))
    }

    pub fn wall_distance(&self, cell: Cell, dir: Direction) -> i32 {
        let far = self.size - 1;
        match dir {
            Direction::North => cell.0.y,
            Direction::South => far - cell.0.y,
            Direction::West => cell.0.x,
            Direction::East => far - cell.0.x,
        }
    }

    /// All cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        let size = self.size;
        (0..size).flat_map(move |y| (0..size).map(move |x| Cell::new(x, y)))
    }
}
