// Grid state and food placement
//
// The board knows nothing about the snake itself. Callers hand it the set of
// coordinates the chain currently covers whenever food has to be placed.

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use std::collections::HashSet;
use thiserror::Error;

use crate::types::{Cell, Coord};

/// Largest number of cells a board may hold
pub const MAX_BOARD_CELLS: u64 = 1 << 24;

/// Failures reported by board operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("board dimensions {width}x{height} must be positive and within the cell limit")]
    InvalidDimensions { width: i32, height: i32 },
    #[error("coordinate ({x}, {y}) is outside the board")]
    OutOfBounds { x: i32, y: i32 },
    #[error("no free cell left to place food")]
    Starvation,
    #[error("there is no food on the board to consume")]
    NoFood,
}

/// Fixed-size grid holding obstacles and at most one food cell
#[derive(Debug, Clone)]
pub struct Board {
    width: i32,
    height: i32,
    grid: Vec<Cell>,
    food: Option<Coord>,
    rng: StdRng,
}

impl Board {
    /// Creates a board, marks the obstacles and places the first food
    ///
    /// # Arguments
    /// * `width`, `height` - Grid dimensions, both must be positive
    /// * `obstacles` - Cells permanently blocked for the whole session
    /// * `occupied` - Coordinates covered by the chain at session start
    /// * `rng` - Source of randomness for food placement
    ///
    /// A board too crowded for the first food is still returned, just without
    /// food; the condition is logged.
    pub fn new(
        width: i32,
        height: i32,
        obstacles: &[Coord],
        occupied: &HashSet<Coord>,
        rng: StdRng,
    ) -> Result<Self, BoardError> {
        if width <= 0 || height <= 0 || (width as u64) * (height as u64) > MAX_BOARD_CELLS {
            return Err(BoardError::InvalidDimensions { width, height });
        }

        let mut board = Board {
            width,
            height,
            grid: vec![Cell::Empty; (width as usize) * (height as usize)],
            food: None,
            rng,
        };

        for obstacle in obstacles {
            let idx = board.index(*obstacle)?;
            board.grid[idx] = Cell::Obstacle;
        }

        if let Err(e) = board.place_food(occupied) {
            warn!("Board created without food: {}", e);
        }

        Ok(board)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Current food coordinate, if any
    pub fn food(&self) -> Option<Coord> {
        self.food
    }

    /// Looks up the classification of a single cell
    pub fn cell_at(&self, x: i32, y: i32) -> Result<Cell, BoardError> {
        let idx = self.index(Coord { x, y })?;
        Ok(self.grid[idx])
    }

    /// Row-major copy of every cell classification
    pub fn rows(&self) -> Vec<Vec<Cell>> {
        self.grid
            .chunks(self.width as usize)
            .map(|row| row.to_vec())
            .collect()
    }

    /// Places one food cell uniformly at random on a free cell
    ///
    /// A free cell is neither an obstacle nor in `occupied`. Any food already
    /// on the board is removed first, so at most one food cell ever exists.
    /// Returns `Starvation` instead of retrying when no free cell is left.
    pub fn place_food(&mut self, occupied: &HashSet<Coord>) -> Result<Coord, BoardError> {
        self.clear_food();

        let candidates: Vec<Coord> = (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| Coord { x, y }))
            .filter(|c| self.grid[self.offset(*c)] == Cell::Empty && !occupied.contains(c))
            .collect();

        let chosen = *candidates
            .choose(&mut self.rng)
            .ok_or(BoardError::Starvation)?;

        let idx = self.offset(chosen);
        self.grid[idx] = Cell::Food;
        self.food = Some(chosen);

        debug!(
            "Placed food at ({}, {}) among {} free cells",
            chosen.x,
            chosen.y,
            candidates.len()
        );
        Ok(chosen)
    }

    /// Clears the current food cell and places a replacement
    ///
    /// Fails with `NoFood` if nothing was on the board. When the replacement
    /// cannot be placed the old food is still gone and `Starvation` is returned.
    pub fn consume_food(&mut self, occupied: &HashSet<Coord>) -> Result<Coord, BoardError> {
        if self.food.is_none() {
            return Err(BoardError::NoFood);
        }
        self.place_food(occupied)
    }

    fn clear_food(&mut self) {
        if let Some(food) = self.food.take() {
            let idx = self.offset(food);
            self.grid[idx] = Cell::Empty;
        }
    }

    fn index(&self, coord: Coord) -> Result<usize, BoardError> {
        if !coord.in_bounds(self.width, self.height) {
            return Err(BoardError::OutOfBounds { x: coord.x, y: coord.y });
        }
        Ok(self.offset(coord))
    }

    // Caller guarantees `coord` is in bounds
    fn offset(&self, coord: Coord) -> usize {
        (coord.y as usize) * (self.width as usize) + coord.x as usize
    }
}
