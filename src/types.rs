// Core value types shared by the board, the segment chain and the engine

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 2D coordinate on the board
///
/// Coordinates are signed so that a head stepping off the board surfaces as an
/// out-of-range value rather than wrapping silently.
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub fn new(x: i32, y: i32) -> Self {
        Coord { x, y }
    }

    /// Folds the coordinate back onto a `width` x `height` torus
    pub fn wrapped(&self, width: i32, height: i32) -> Coord {
        Coord {
            x: self.x.rem_euclid(width),
            y: self.y.rem_euclid(height),
        }
    }

    /// Returns true if the coordinate lies inside [0, width) x [0, height)
    pub fn in_bounds(&self, width: i32, height: i32) -> bool {
        self.x >= 0 && self.x < width && self.y >= 0 && self.y < height
    }
}

/// The four cardinal directions the head can travel in
///
/// The grid uses screen orientation: North decreases `y`, South increases it.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Returns all possible directions
    pub fn all() -> [Direction; 4] {
        [Direction::North, Direction::South, Direction::East, Direction::West]
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    /// Returns true if turning from self to other would be a 180-degree turn
    pub fn is_opposite(&self, other: Direction) -> bool {
        self.opposite() == other
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
        }
    }

    /// Calculates the next coordinate when moving in this direction
    pub fn apply(&self, coord: &Coord) -> Coord {
        match self {
            Direction::North => Coord { x: coord.x, y: coord.y - 1 },
            Direction::South => Coord { x: coord.x, y: coord.y + 1 },
            Direction::East => Coord { x: coord.x + 1, y: coord.y },
            Direction::West => Coord { x: coord.x - 1, y: coord.y },
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "north" | "n" | "up" => Ok(Direction::North),
            "south" | "s" | "down" => Ok(Direction::South),
            "east" | "e" | "right" => Ok(Direction::East),
            "west" | "w" | "left" => Ok(Direction::West),
            _ => Err(format!("Invalid direction: {}", s)),
        }
    }
}

/// Classification of a single grid cell
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Cell {
    #[default]
    Empty,
    Obstacle,
    Food,
}

/// Session status; transitions only move forward
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Idle,
    Running,
    Over,
}

/// One element of the read-only chain snapshot handed to collaborators
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Segment {
    pub coord: Coord,
    pub is_head: bool,
}
