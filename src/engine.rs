// Fixed-interval tick state machine
//
// The engine owns the board and the segment chain outright. It never runs on
// its own: callers poll `step()` and the engine decides whether a tick is due.

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::board::{Board, BoardError};
use crate::chain::SegmentChain;
use crate::config::{Config, ConfigError};
use crate::types::{Cell, Coord, Direction, Segment, Status};

/// What ended the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionKind {
    /// Head ran into its own body
    SelfCollision,
    /// Head left the board with wrapping disabled
    Wall,
    /// Head entered an obstacle cell
    Obstacle,
}

/// Effect of a completed tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TickEvent {
    /// Head entered an empty cell
    Moved,
    /// Head ate food; `food_replaced` is false when the board had no room left
    Ate { food_replaced: bool },
    /// Session is over
    Collided { kind: CollisionKind },
}

/// Summary of one completed tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    pub direction: Direction,
    pub head: Coord,
    pub event: TickEvent,
}

/// Result of polling the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Engine is Idle or Over, nothing happens
    Inactive,
    /// Running, but the tick interval has not elapsed yet
    NotDue,
    Ticked(TickReport),
}

pub struct Engine {
    board: Board,
    chain: SegmentChain,
    status: Status,
    score: u32,
    tick_interval: Duration,
    wrap_enabled: bool,
    last_tick: Option<Instant>,
    ticks: u64,
    seed: u64,
}

impl Engine {
    /// Creates a session from configuration
    ///
    /// Uses `session.seed` when present, otherwise a fresh random seed.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let seed = config.session.seed.unwrap_or_else(rand::random);
        Self::with_seed(config, seed)
    }

    /// Creates a session whose food placement is fully determined by `seed`
    ///
    /// The head starts alone at the board centre facing East and the first
    /// food is placed immediately.
    pub fn with_seed(config: &Config, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;

        let width = config.board.width as i32;
        let height = config.board.height as i32;
        let chain = SegmentChain::new(config.board.center(), Direction::East);
        let board = Board::new(
            width,
            height,
            &config.board.obstacles,
            &chain.occupied_set(),
            StdRng::seed_from_u64(seed),
        )
        .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        Self::from_parts(
            board,
            chain,
            Duration::from_millis(config.timing.tick_interval_ms),
            config.rules.wrap_enabled,
            seed,
        )
    }

    /// Assembles a session from an already built board and chain
    ///
    /// # Arguments
    /// * `board` - Board the chain lives on
    /// * `chain` - Chain whose segments are distinct, inside `board`, and off
    ///   obstacles and food
    /// * `tick_interval` - Minimum time between ticks, must be non-zero
    /// * `wrap_enabled` - Whether leaving an edge re-enters on the opposite one
    /// * `seed` - Seed recorded for replays
    pub fn from_parts(
        board: Board,
        chain: SegmentChain,
        tick_interval: Duration,
        wrap_enabled: bool,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        if tick_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "tick interval must be positive".to_string(),
            ));
        }

        for segment in chain.occupied_coordinates() {
            let Coord { x, y } = segment.coord;
            match board.cell_at(x, y) {
                Ok(Cell::Obstacle) => {
                    return Err(ConfigError::Invalid(format!(
                        "segment ({}, {}) starts on an obstacle",
                        x, y
                    )))
                }
                Err(e) => return Err(ConfigError::Invalid(e.to_string())),
                Ok(_) => {}
            }
            if board.food() == Some(segment.coord) {
                return Err(ConfigError::Invalid(format!(
                    "segment ({}, {}) starts on the food",
                    x, y
                )));
            }
        }
        if chain.occupied_set().len() != chain.len() {
            return Err(ConfigError::Invalid(
                "chain segments overlap".to_string(),
            ));
        }

        Ok(Engine {
            board,
            chain,
            status: Status::Idle,
            score: 0,
            tick_interval,
            wrap_enabled,
            last_tick: None,
            ticks: 0,
            seed,
        })
    }

    /// Idle -> Running, stamping now as the last tick
    pub fn start(&mut self) -> bool {
        self.start_at(Instant::now())
    }

    /// Same as `start` with an explicit timestamp
    ///
    /// Returns false if the session was already started.
    pub fn start_at(&mut self, now: Instant) -> bool {
        if self.status != Status::Idle {
            return false;
        }
        self.status = Status::Running;
        self.last_tick = Some(now);
        info!(
            "Session started on {}x{} board (wrap: {}, tick: {:?}, seed: {})",
            self.board.width(),
            self.board.height(),
            self.wrap_enabled,
            self.tick_interval,
            self.seed
        );
        true
    }

    /// Buffers a direction for the next tick
    ///
    /// Ignored (returns false) while not Running or when it would reverse the
    /// committed direction.
    pub fn set_pending_direction(&mut self, direction: Direction) -> bool {
        if self.status != Status::Running {
            return false;
        }
        self.chain.set_pending_direction(direction)
    }

    /// Advances simulated time if a tick is due
    pub fn step(&mut self) -> StepOutcome {
        self.step_at(Instant::now())
    }

    /// Same as `step` with an explicit timestamp
    pub fn step_at(&mut self, now: Instant) -> StepOutcome {
        if self.status != Status::Running {
            return StepOutcome::Inactive;
        }
        let Some(last_tick) = self.last_tick else {
            return StepOutcome::Inactive;
        };
        if now.saturating_duration_since(last_tick) < self.tick_interval {
            return StepOutcome::NotDue;
        }

        self.chain.commit_pending_direction();
        self.chain
            .advance(self.board.width(), self.board.height(), self.wrap_enabled);
        let event = self.resolve_collisions();

        self.last_tick = Some(now);
        self.ticks += 1;

        let report = TickReport {
            tick: self.ticks,
            direction: self.chain.direction(),
            head: self.chain.head_coordinate(),
            event,
        };
        debug!(
            "Tick {}: {} -> ({}, {}) {:?}",
            report.tick, report.direction, report.head.x, report.head.y, report.event
        );
        StepOutcome::Ticked(report)
    }

    /// Applies self-collision, boundary/obstacle and food rules in that order
    fn resolve_collisions(&mut self) -> TickEvent {
        let head = self.chain.head_coordinate();
        if self.chain.collides_with_body(head) {
            return self.game_over(CollisionKind::SelfCollision);
        }

        let cell = match self.lookup_head() {
            Ok(cell) => cell,
            Err(kind) => return self.game_over(kind),
        };

        match cell {
            Cell::Obstacle => self.game_over(CollisionKind::Obstacle),
            Cell::Food => {
                self.chain.queue_growth();
                self.score += 1;
                let occupied = self.chain.occupied_set();
                match self.board.consume_food(&occupied) {
                    Ok(_) => TickEvent::Ate { food_replaced: true },
                    Err(e) => {
                        warn!("Tick {}: food not replaced: {}", self.ticks + 1, e);
                        TickEvent::Ate { food_replaced: false }
                    }
                }
            }
            Cell::Empty => TickEvent::Moved,
        }
    }

    /// Looks up the head's cell, folding an out-of-range head once when wrapping
    ///
    /// `advance` already folds the head when wrapping, so the fold here only
    /// fires for a head that reached this point unfolded.
    fn lookup_head(&mut self) -> Result<Cell, CollisionKind> {
        let head = self.chain.head_coordinate();
        match self.board.cell_at(head.x, head.y) {
            Ok(cell) => Ok(cell),
            Err(BoardError::OutOfBounds { .. }) if self.wrap_enabled => {
                let folded = head.wrapped(self.board.width(), self.board.height());
                self.chain.relocate_head(folded);
                if self.chain.collides_with_body(folded) {
                    return Err(CollisionKind::SelfCollision);
                }
                self.board
                    .cell_at(folded.x, folded.y)
                    .map_err(|_| CollisionKind::Wall)
            }
            Err(_) => Err(CollisionKind::Wall),
        }
    }

    fn game_over(&mut self, kind: CollisionKind) -> TickEvent {
        self.status = Status::Over;
        info!(
            "Game over after {} ticks ({:?}), score {}",
            self.ticks + 1,
            kind,
            self.score
        );
        TickEvent::Collided { kind }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn length(&self) -> usize {
        self.chain.len()
    }

    pub fn head(&self) -> Coord {
        self.chain.head_coordinate()
    }

    /// Committed direction of the head
    pub fn direction(&self) -> Direction {
        self.chain.direction()
    }

    /// Snapshot of the chain, head first
    pub fn segments(&self) -> Vec<Segment> {
        self.chain.occupied_coordinates()
    }

    pub fn food(&self) -> Option<Coord> {
        self.board.food()
    }

    pub fn cell_at(&self, x: i32, y: i32) -> Result<Cell, BoardError> {
        self.board.cell_at(x, y)
    }

    /// Row-major classification of the whole grid
    pub fn grid(&self) -> Vec<Vec<Cell>> {
        self.board.rows()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn chain(&self) -> &SegmentChain {
        &self.chain
    }

    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn wrap_enabled(&self) -> bool {
        self.wrap_enabled
    }

    pub fn width(&self) -> i32 {
        self.board.width()
    }

    pub fn height(&self) -> i32 {
        self.board.height()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}
